use minutes_core::{
    update, AppState, ChatMessage, ChatRole, Effect, Msg, CHAT_CAPACITY,
};

fn init_logging() {
    client_logging::initialize_for_tests();
}

const NOW_ISO: &str = "2024-03-01T10:00:00+00:00";

fn send(text: &str) -> Msg {
    Msg::ChatSendClicked {
        text: text.to_string(),
        now_iso: NOW_ISO.to_string(),
    }
}

fn answer(result: Result<&str, &str>) -> Msg {
    Msg::ChatAnswerReceived {
        result: result.map(ToOwned::to_owned).map_err(ToOwned::to_owned),
        now_iso: NOW_ISO.to_string(),
    }
}

fn user_message(content: &str) -> ChatMessage {
    ChatMessage {
        role: ChatRole::User,
        content: content.to_string(),
        is_source_annotation: false,
        timestamp_iso: NOW_ISO.to_string(),
    }
}

#[test]
fn send_appends_the_question_and_persists() {
    init_logging();
    let (state, effects) = update(AppState::new(), send("What was decided?"));

    let view = state.view();
    assert_eq!(view.chat.messages.len(), 1);
    assert_eq!(view.chat.messages[0].role, ChatRole::User);
    assert_eq!(view.chat.messages[0].content, "What was decided?");
    assert!(view.chat.sending);
    assert!(view.chat.pending_placeholder);

    assert_eq!(
        effects,
        vec![
            Effect::SendChat {
                query: "What was decided?".to_string(),
            },
            Effect::PersistChat {
                messages: vec![user_message("What was decided?")],
            },
        ]
    );
}

#[test]
fn send_trims_surrounding_whitespace() {
    init_logging();
    let (state, effects) = update(AppState::new(), send("  hello  "));

    assert_eq!(state.view().chat.messages[0].content, "hello");
    assert_eq!(
        effects[0],
        Effect::SendChat {
            query: "hello".to_string(),
        }
    );
}

#[test]
fn empty_input_is_rejected_without_taking_the_lock() {
    init_logging();
    let (state, effects) = update(AppState::new(), send("   "));

    assert!(effects.is_empty());
    assert!(!state.view().chat.sending);
    assert!(state.chat().is_empty());
}

#[test]
fn second_send_while_one_is_outstanding_is_dropped() {
    init_logging();
    let (state, _) = update(AppState::new(), send("first"));
    let (state, effects) = update(state, send("second"));

    assert!(effects.is_empty());
    assert_eq!(state.view().chat.messages.len(), 1);
    assert_eq!(state.view().chat.messages[0].content, "first");
}

#[test]
fn answer_releases_the_lock_and_persists_the_pair() {
    init_logging();
    let (state, _) = update(AppState::new(), send("first"));
    let (state, effects) = update(state, answer(Ok("We agreed on Tuesday.")));

    let view = state.view();
    assert!(!view.chat.sending);
    assert!(!view.chat.pending_placeholder);
    assert_eq!(view.chat.messages.len(), 2);
    assert_eq!(view.chat.messages[1].role, ChatRole::Assistant);
    assert_eq!(view.chat.messages[1].content, "We agreed on Tuesday.");

    let [Effect::PersistChat { messages }] = effects.as_slice() else {
        panic!("expected a single persist effect, got {effects:?}");
    };
    assert_eq!(messages.len(), 2);

    // The lock is free again.
    let (state, _) = update(state, send("second"));
    assert!(state.view().chat.sending);
}

#[test]
fn failed_answer_becomes_an_error_bubble() {
    init_logging();
    let (state, _) = update(AppState::new(), send("first"));
    let (state, _) = update(state, answer(Err("service unavailable")));

    let view = state.view();
    assert!(!view.chat.sending);
    assert_eq!(view.chat.messages[1].content, "Error: service unavailable");
}

#[test]
fn answer_without_an_outstanding_send_is_ignored() {
    init_logging();
    let state = AppState::new();
    let (next, effects) = update(state.clone(), answer(Ok("stray")));

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn transcript_is_capped_at_capacity_with_oldest_evicted() {
    init_logging();
    let mut state = AppState::new();
    for index in 0..CHAT_CAPACITY {
        state = update(state, send(&format!("question {index}"))).0;
        state = update(state, answer(Ok(&format!("answer {index}")))).0;
    }
    assert_eq!(state.chat().len(), CHAT_CAPACITY);

    // One more exchange pushes the oldest pair out the front.
    let state = update(state, send("the newest question")).0;
    let (state, _) = update(state, answer(Ok("the newest answer")));

    let view = state.view();
    assert_eq!(view.chat.messages.len(), CHAT_CAPACITY);
    assert_eq!(
        view.chat.messages.last().unwrap().content,
        "the newest answer"
    );
    assert_eq!(view.chat.messages[0].content, "question 26");
}

#[test]
fn restored_history_is_trimmed_to_capacity() {
    init_logging();
    let history: Vec<ChatMessage> = (0..CHAT_CAPACITY + 10)
        .map(|index| user_message(&format!("message {index}")))
        .collect();
    let (state, effects) = update(AppState::new(), Msg::ChatHistoryRestored(history));

    assert!(effects.is_empty());
    assert_eq!(state.chat().len(), CHAT_CAPACITY);
    assert_eq!(state.view().chat.messages[0].content, "message 10");
}

#[test]
fn placeholder_is_never_part_of_the_persisted_payload() {
    init_logging();
    let (state, effects) = update(AppState::new(), send("question"));

    assert!(state.view().chat.pending_placeholder);
    let Some(Effect::PersistChat { messages }) = effects.last() else {
        panic!("expected a persist effect, got {effects:?}");
    };
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, ChatRole::User);
}
