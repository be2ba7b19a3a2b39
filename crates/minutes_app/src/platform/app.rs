use std::io::BufRead;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use chrono::Utc;
use client_logging::client_info;
use minutes_core::{update, AppState, Msg, Phase, SubmissionMode, SCRIPT_TICK_MS};

use super::effects::EffectRunner;
use super::logging::{self, LogDestination};
use super::render;
use super::session::SessionStore;
use super::LoopEvent;

pub fn run_app() -> Result<(), Box<dyn std::error::Error>> {
    logging::initialize(LogDestination::File);

    let session = SessionStore::new(Path::new("."));
    let (event_tx, event_rx) = mpsc::channel::<LoopEvent>();
    let unload_guard = Arc::new(AtomicBool::new(false));
    let runner = EffectRunner::new(event_tx.clone(), session.clone(), unload_guard.clone())?;

    let mut state = AppState::new();

    // Session restore runs before any user input, like a page load.
    state = dispatch(state, Msg::ChatHistoryRestored(session.load_chat()), &runner);
    state = dispatch(
        state,
        Msg::Started {
            marker: session.load_marker(),
            now_ms: now_ms(),
        },
        &runner,
    );

    spawn_tick_thread(event_tx.clone());
    spawn_input_thread(event_tx);

    print_help();

    while let Ok(event) = event_rx.recv() {
        match event {
            LoopEvent::Quit => {
                if unload_guard.load(Ordering::Relaxed) {
                    // Best-effort confirm-before-leaving, the terminal analog
                    // of a beforeunload prompt.
                    println!(
                        "A note is still being created; leaving may lose it. Type 'quit!' to leave anyway."
                    );
                    continue;
                }
                break;
            }
            LoopEvent::ForceQuit => break,
            LoopEvent::Core(msg) => {
                state = dispatch(state, msg, &runner);
                if matches!(state.phase(), Phase::NavigatedAway) {
                    break;
                }
            }
        }
    }

    client_info!("Session ended");
    Ok(())
}

fn dispatch(state: AppState, msg: Msg, runner: &EffectRunner) -> AppState {
    let (mut state, effects) = update(state, msg);
    runner.run(effects);

    let view = state.view();
    if state.consume_dirty() {
        for line in render::render_lines(&view) {
            println!("{line}");
        }
    }
    state
}

// Drives the synthetic script-mode progress animation.
fn spawn_tick_thread(event_tx: mpsc::Sender<LoopEvent>) {
    thread::spawn(move || {
        let interval = Duration::from_millis(SCRIPT_TICK_MS);
        while event_tx.send(LoopEvent::Core(Msg::Tick)).is_ok() {
            thread::sleep(interval);
        }
    });
}

fn spawn_input_thread(event_tx: mpsc::Sender<LoopEvent>) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if let Some(event) = parse_command(&line) {
                if event_tx.send(event).is_err() {
                    return;
                }
            }
        }
        // Stdin is gone; no further confirmation is possible.
        let _ = event_tx.send(LoopEvent::ForceQuit);
    });
}

fn parse_command(line: &str) -> Option<LoopEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    let msg = match command {
        "title" => Msg::TitleChanged(rest.to_string()),
        "file" => Msg::FileChosen((!rest.is_empty()).then(|| rest.to_string())),
        "mode" => match rest {
            "audio" => Msg::ModeChanged(SubmissionMode::Audio),
            "script" => Msg::ModeChanged(SubmissionMode::Script),
            _ => {
                println!("mode is 'audio' or 'script'");
                return None;
            }
        },
        "script" => Msg::TranscriptChanged(rest.to_string()),
        "submit" => Msg::SubmitClicked { now_ms: now_ms() },
        "retry" => Msg::RetryClicked { now_ms: now_ms() },
        "close" => Msg::ErrorDismissed,
        "cancel" => Msg::ForceCancelClicked,
        "chat" => Msg::ChatSendClicked {
            text: rest.to_string(),
            now_iso: Utc::now().to_rfc3339(),
        },
        "quit" => return Some(LoopEvent::Quit),
        "quit!" => return Some(LoopEvent::ForceQuit),
        _ => {
            println!("unknown command: {command}");
            return None;
        }
    };
    Some(LoopEvent::Core(msg))
}

fn print_help() {
    println!("commands: mode audio|script, title <text>, file <path>, script <text>,");
    println!("          submit, retry, close, cancel, chat <text>, quit");
}

fn now_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}
