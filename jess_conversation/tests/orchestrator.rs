//! Turn-level behaviour of the dialog orchestrator.

mod common;

use common::{FlakyStore, ScriptedProvider};
use jess_core::{DialogError, DialogId, Message, MessageStore, Role};
use jess_conversation::{ConversationConfig, DialogOrchestrator, SessionEnd, TurnOutcome};
use jess_store::MemoryMessageStore;
use std::sync::Arc;

const CHAT_MODEL: &str = "gpt-4";
const JUDGE_MODEL: &str = "gpt-3.5-turbo";

fn orchestrator<S>(
    provider: &Arc<ScriptedProvider>,
    store: &Arc<S>,
    config: ConversationConfig,
) -> DialogOrchestrator<Arc<ScriptedProvider>, Arc<S>>
where
    S: MessageStore + 'static,
{
    DialogOrchestrator::new(Arc::clone(provider), Arc::clone(store), config)
}

async fn run(
    orchestrator: &DialogOrchestrator<Arc<ScriptedProvider>, Arc<impl MessageStore + 'static>>,
    dialog: &DialogId,
    input: &str,
) -> (jess_core::Result<SessionEnd>, String) {
    let mut output = Vec::new();
    let result = orchestrator
        .run_dialog(dialog, input.as_bytes(), &mut output)
        .await;
    (result, String::from_utf8(output).expect("utf-8 transcript"))
}

#[tokio::test]
async fn successful_turn_persists_user_message_then_reply() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .verdict(Ok("false"))
            .reply(Ok("hi there")),
    );
    let store = Arc::new(MemoryMessageStore::new());
    let dialog = DialogId::new("work");
    let orchestrator = orchestrator(&provider, &store, ConversationConfig::default());

    let (result, transcript) = run(&orchestrator, &dialog, "hello\n").await;

    assert!(matches!(result, Ok(SessionEnd::InputClosed)));
    assert!(transcript.contains("You: "));
    assert!(transcript.contains("assistant: hi there"));
    assert!(transcript.contains("Goodbye!"));

    let stored = store.messages_by_dialog(&dialog).await.expect("read");
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].role(), Role::User);
    assert_eq!(stored[0].content(), "hello");
    assert_eq!(stored[1].role(), Role::Assistant);
    assert_eq!(stored[1].content(), "hi there");
    assert!(stored.iter().all(|m| m.dialog_id() == &dialog));
    assert!(stored[0].timestamp() <= stored[1].timestamp());
}

#[tokio::test]
async fn judge_and_completion_receive_framed_contexts() {
    let provider = Arc::new(ScriptedProvider::new());
    let store = Arc::new(MemoryMessageStore::new());
    let dialog = DialogId::new("work");
    let earlier = Message::user("earlier question", dialog.clone());
    store.store_message(&earlier).await.expect("seed");
    let orchestrator = orchestrator(&provider, &store, ConversationConfig::default());

    let (result, _) = run(&orchestrator, &dialog, "what now?\n").await;
    assert!(result.is_ok());

    let calls = provider.calls();
    assert_eq!(calls.len(), 2);

    let judge = &calls[0];
    assert_eq!(judge.model, JUDGE_MODEL);
    assert_eq!(judge.context.len(), 4);
    assert_eq!(judge.context[0].role(), Role::System);
    assert!(judge.context[0].content().contains("Jess"));
    assert_eq!(judge.context[1].id(), earlier.id());
    assert_eq!(judge.context[2].content(), "what now?");
    assert_eq!(judge.context[3].role(), Role::System);
    assert!(judge.context[3].content().contains("true/false"));

    let chat = &calls[1];
    assert_eq!(chat.model, CHAT_MODEL);
    assert_eq!(chat.context.len(), 3);
    assert_eq!(chat.context[0].role(), Role::System);
    assert_eq!(chat.context[2].content(), "what now?");
    assert!(chat.context.iter().all(|m| m.dialog_id() == &dialog));
}

#[tokio::test]
async fn completion_failure_persists_nothing_and_session_continues() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .reply(Err(DialogError::transport("connection refused")))
            .reply(Ok("second answer")),
    );
    let store = Arc::new(MemoryMessageStore::new());
    let dialog = DialogId::new("work");
    let seeded = [
        Message::user("old question", dialog.clone()),
        Message::assistant("old answer", dialog.clone()),
    ];
    for message in &seeded {
        store.store_message(message).await.expect("seed");
    }
    let orchestrator = orchestrator(&provider, &store, ConversationConfig::default());

    let (result, transcript) = run(&orchestrator, &dialog, "first\nsecond\n").await;

    assert!(matches!(result, Ok(SessionEnd::InputClosed)));
    assert!(transcript.contains("Error: transport error: connection refused"));
    assert!(transcript.contains("assistant: second answer"));

    let contents: Vec<String> = store
        .messages_by_dialog(&dialog)
        .await
        .expect("read")
        .into_iter()
        .map(Message::into_content)
        .collect();
    assert_eq!(
        contents,
        ["old question", "old answer", "second", "second answer"]
    );

    // The failed turn's user message is gone from memory as well.
    let second_chat = &provider.calls_for(CHAT_MODEL)[1];
    assert!(second_chat.context.iter().all(|m| m.content() != "first"));
}

#[tokio::test]
async fn empty_response_is_reported_and_not_persisted() {
    let provider = Arc::new(ScriptedProvider::new().reply(Err(DialogError::EmptyResponse)));
    let store = Arc::new(MemoryMessageStore::new());
    let dialog = DialogId::new("work");
    let orchestrator = orchestrator(&provider, &store, ConversationConfig::default());

    let (result, transcript) = run(&orchestrator, &dialog, "hello\n").await;

    assert!(matches!(result, Ok(SessionEnd::InputClosed)));
    assert!(transcript.contains("Error: empty response"));
    assert!(store.is_empty().expect("len"));
}

#[tokio::test]
async fn true_verdict_ends_session_after_one_line_without_writes() {
    let provider = Arc::new(ScriptedProvider::new().verdict(Ok("TRUE")));
    let store = Arc::new(MemoryMessageStore::new());
    let dialog = DialogId::new("work");
    let orchestrator = orchestrator(&provider, &store, ConversationConfig::default());

    let (result, transcript) = run(&orchestrator, &dialog, "bye\nnever read\n").await;

    assert!(matches!(result, Ok(SessionEnd::DialogOver)));
    assert!(transcript.ends_with("Goodbye!\n"));
    assert_eq!(transcript.matches("You: ").count(), 1);
    assert!(store.is_empty().expect("len"));

    let calls = provider.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].model, JUDGE_MODEL);
}

#[tokio::test]
async fn unparseable_verdict_aborts_without_writes() {
    let provider = Arc::new(ScriptedProvider::new().verdict(Ok("maybe")));
    let store = Arc::new(MemoryMessageStore::new());
    let dialog = DialogId::new("work");
    let orchestrator = orchestrator(&provider, &store, ConversationConfig::default());

    let (result, transcript) = run(&orchestrator, &dialog, "hello\nagain\n").await;

    assert!(matches!(
        result,
        Ok(SessionEnd::Aborted(DialogError::Parse(_)))
    ));
    assert!(transcript.contains("Error: parse error"));
    assert!(!transcript.contains("Goodbye!"));
    assert!(store.is_empty().expect("len"));
    assert!(provider.calls_for(CHAT_MODEL).is_empty());
}

#[tokio::test]
async fn unreachable_judge_aborts_without_writes() {
    let provider = Arc::new(
        ScriptedProvider::new().verdict(Err(DialogError::transport("connection reset"))),
    );
    let store = Arc::new(MemoryMessageStore::new());
    let dialog = DialogId::new("work");
    let orchestrator = orchestrator(&provider, &store, ConversationConfig::default());

    let (result, _) = run(&orchestrator, &dialog, "hello\n").await;

    assert!(matches!(
        result,
        Ok(SessionEnd::Aborted(DialogError::Transport(_)))
    ));
    assert!(store.is_empty().expect("len"));
    assert_eq!(provider.calls().len(), 1);
}

#[tokio::test]
async fn storage_failure_ends_the_session() {
    let provider = Arc::new(ScriptedProvider::new());
    let store = Arc::new(FlakyStore::new(0));
    let dialog = DialogId::new("work");
    let orchestrator = orchestrator(&provider, &store, ConversationConfig::default());

    let (result, _) = run(&orchestrator, &dialog, "hello\nsecond line\n").await;

    match result {
        Err(DialogError::Storage(message)) => assert!(message.contains("disk full")),
        other => panic!("expected storage error, got {other:?}"),
    }
    // Judge and completion for the first line only.
    assert_eq!(provider.calls().len(), 2);
}

#[tokio::test]
async fn reply_is_not_persisted_when_user_write_succeeds_but_reply_write_fails() {
    let provider = Arc::new(ScriptedProvider::new().reply(Ok("answer")));
    let store = Arc::new(FlakyStore::new(1));
    let dialog = DialogId::new("work");
    let orchestrator = orchestrator(&provider, &store, ConversationConfig::default());

    let mut conversation = Vec::new();
    let err = orchestrator
        .process_turn(&mut conversation, &dialog, "hello")
        .await
        .expect_err("second write fails");

    assert!(err.is_fatal());
    let stored = store.inner.messages_by_dialog(&dialog).await.expect("read");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].role(), Role::User);
}

#[tokio::test]
async fn long_history_is_trimmed_before_completion_but_not_for_the_judge() {
    let provider = Arc::new(ScriptedProvider::new());
    let store = Arc::new(MemoryMessageStore::new());
    let dialog = DialogId::new("work");
    for content in ["a".repeat(40), "b".repeat(40), "c".repeat(40)] {
        store
            .store_message(&Message::user(content, dialog.clone()))
            .await
            .expect("seed");
    }
    let config = ConversationConfig::default().with_context_char_budget(50);
    let orchestrator = orchestrator(&provider, &store, config);

    let (result, _) = run(&orchestrator, &dialog, "latest\n").await;
    assert!(result.is_ok());

    let judge = &provider.calls_for(JUDGE_MODEL)[0];
    assert_eq!(judge.context.len(), 6);

    let chat = &provider.calls_for(CHAT_MODEL)[0];
    let contents: Vec<&str> = chat.context[1..]
        .iter()
        .map(Message::content)
        .collect();
    let newest_seed = "c".repeat(40);
    assert_eq!(contents, vec![newest_seed.as_str(), "latest"]);
}

#[tokio::test]
async fn stored_history_is_rendered_before_the_first_prompt() {
    let provider = Arc::new(ScriptedProvider::new());
    let store = Arc::new(MemoryMessageStore::new());
    let dialog = DialogId::new("work");
    store
        .store_message(&Message::assistant("welcome back", dialog.clone()))
        .await
        .expect("seed");
    let orchestrator = orchestrator(&provider, &store, ConversationConfig::default());

    let (result, transcript) = run(&orchestrator, &dialog, "").await;

    assert!(matches!(result, Ok(SessionEnd::InputClosed)));
    let first_line = transcript.lines().next().expect("history line");
    assert!(first_line.starts_with('['));
    assert!(first_line.ends_with("] assistant: welcome back"));
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn blank_lines_do_not_start_a_turn() {
    let provider = Arc::new(ScriptedProvider::new());
    let store = Arc::new(MemoryMessageStore::new());
    let dialog = DialogId::new("work");
    let orchestrator = orchestrator(&provider, &store, ConversationConfig::default());

    let (result, _) = run(&orchestrator, &dialog, "\n   \nhello\n").await;

    assert!(result.is_ok());
    assert_eq!(provider.calls_for(JUDGE_MODEL).len(), 1);
    assert_eq!(store.len().expect("len"), 2);
}

#[tokio::test]
async fn process_turn_keeps_memory_in_step_with_the_store() {
    let provider = Arc::new(ScriptedProvider::new().reply(Ok("hi there")));
    let store = Arc::new(MemoryMessageStore::new());
    let dialog = DialogId::new("work");
    let orchestrator = orchestrator(&provider, &store, ConversationConfig::default());

    let mut conversation = Vec::new();
    let outcome = orchestrator
        .process_turn(&mut conversation, &dialog, "hello")
        .await
        .expect("turn");

    let TurnOutcome::Replied(reply) = outcome else {
        panic!("expected a reply, got {outcome:?}");
    };
    assert_eq!(reply.content(), "hi there");
    assert_eq!(
        conversation,
        store.messages_by_dialog(&dialog).await.expect("read")
    );
}

#[tokio::test]
async fn ad_hoc_questions_are_not_persisted() {
    let provider = Arc::new(ScriptedProvider::new().reply(Ok("42")));
    let store = Arc::new(MemoryMessageStore::new());
    let orchestrator = orchestrator(&provider, &store, ConversationConfig::default());

    let answer = orchestrator.ask("meaning of life?", None).await.expect("ask");

    assert_eq!(answer, "42");
    assert!(store.is_empty().expect("len"));
    let calls = provider.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].model, CHAT_MODEL);
    assert!(calls[0].context.iter().all(|m| m.dialog_id().is_ad_hoc()));
}

#[tokio::test]
async fn asking_within_a_dialog_uses_its_history_without_writing() {
    let provider = Arc::new(ScriptedProvider::new().reply(Ok("yes")));
    let store = Arc::new(MemoryMessageStore::new());
    let dialog = DialogId::new("work");
    store
        .store_message(&Message::user("remember the number 7", dialog.clone()))
        .await
        .expect("seed");
    let orchestrator = orchestrator(&provider, &store, ConversationConfig::default());

    let answer = orchestrator
        .ask("do you remember?", Some(&dialog))
        .await
        .expect("ask");

    assert_eq!(answer, "yes");
    assert_eq!(store.len().expect("len"), 1);
    let context = &provider.calls()[0].context;
    assert_eq!(context.len(), 3);
    assert_eq!(context[1].content(), "remember the number 7");
    assert_eq!(context[2].content(), "do you remember?");
}

#[tokio::test]
async fn ad_hoc_dialog_session_keeps_turns_in_memory_only() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .reply(Ok("hi there"))
            .reply(Ok("still here")),
    );
    let store = Arc::new(MemoryMessageStore::new());
    let ad_hoc = DialogId::ad_hoc();
    let orchestrator = orchestrator(&provider, &store, ConversationConfig::default());

    let (result, transcript) = run(&orchestrator, &ad_hoc, "hello\nanyone?\n").await;

    assert!(matches!(result, Ok(SessionEnd::InputClosed)));
    assert!(transcript.contains("assistant: hi there"));
    assert!(transcript.contains("assistant: still here"));
    assert!(store.is_empty().expect("len"));
    assert!(store.list_dialog_ids().await.expect("list").is_empty());

    let second_chat = &provider.calls_for(CHAT_MODEL)[1];
    let contents: Vec<&str> = second_chat.context[1..]
        .iter()
        .map(Message::content)
        .collect();
    assert_eq!(contents, vec!["hello", "hi there", "anyone?"]);
}
