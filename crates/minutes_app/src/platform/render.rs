use minutes_core::{ChatRole, SubmissionMode, UiViewModel};

/// Pure projection from the view model to terminal lines; the loop prints a
/// fresh snapshot whenever the state is dirty.
pub fn render_lines(view: &UiViewModel) -> Vec<String> {
    let mut lines = Vec::new();

    if view.blocked {
        lines.push("! A note is already being created from an earlier session.".to_string());
        lines.push(
            "  Wait for it to finish, or type 'cancel' to force-cancel. Any server-side work keeps running."
                .to_string(),
        );
    }

    if let Some(message) = &view.validation_message {
        lines.push(format!("! {message}"));
    }

    if view.input_enabled {
        let source = match view.mode {
            SubmissionMode::Audio => format!("file: {}", view.file.as_deref().unwrap_or("<none>")),
            SubmissionMode::Script => format!(
                "transcript: {}",
                if view.has_transcript { "set" } else { "<empty>" }
            ),
        };
        lines.push(format!("form | title: {:?} | {source}", view.title));
    }

    if view.progress_visible {
        let steps = view
            .steps
            .iter()
            .map(|step| {
                let mark = if step.completed {
                    "x"
                } else if step.active {
                    ">"
                } else {
                    " "
                };
                format!("[{mark}] {}", step.label)
            })
            .collect::<Vec<_>>()
            .join("  ");
        lines.push(steps);
        lines.push(format!("{} {}", view.status_icon, view.status_message));
        if let Some(percent) = view.script_percent {
            lines.push(format!("{percent}%"));
        }
        if view.failed {
            lines.push("Type 'retry' to try again, or 'close' to dismiss.".to_string());
        }
    }

    // Chat tail: enough context without scrolling the progress away.
    let tail_start = view.chat.messages.len().saturating_sub(3);
    for message in &view.chat.messages[tail_start..] {
        let speaker = match message.role {
            ChatRole::User => "you",
            ChatRole::Assistant => "assistant",
        };
        lines.push(format!("{speaker}: {}", message.content));
    }
    if view.chat.pending_placeholder {
        lines.push("assistant: generating an answer...".to_string());
    }

    lines
}
