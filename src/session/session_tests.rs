//! State-machine tests for [`Session`].
//!
//! The gateway is mocked with mockall; storage is in-memory unless a test
//! needs to inject failures.

use super::*;
use crate::error::{GatewayError, StorageError};
use crate::gateway::MockModelGateway;
use crate::storage::{MemoryStorage, MockStorage};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn single_json() -> Value {
    json!({"reply": "Thanks for checking in, here is the update.", "analysis": "Firm and direct."})
}

fn variations_json() -> Value {
    json!({"variations": [
        {"title": "Variation 1: More Formal", "reply": "Dear Sarah, ..."},
        {"title": "Variation 2: Friendly", "reply": "Hey Sarah, ..."},
        {"title": "Variation 3: Brief", "reply": "New ETA: Monday."}
    ]})
}

fn comparison_json() -> Value {
    json!({
        "comparison": [
            {"strategyName": "BUILD_RAPPORT", "reply": "rapport reply", "analysis": "warm"},
            {"strategyName": "PROVIDE_CLARITY", "reply": "clear reply", "analysis": "plain"},
            {"strategyName": "ASSERT_BOUNDARIES", "reply": "firm reply", "analysis": "direct"}
        ],
        "bestStrategy": "Provide_Clarity"
    })
}

fn gateway_returning(times: usize, value: Value) -> MockModelGateway {
    let mut gateway = MockModelGateway::new();
    gateway
        .expect_invoke()
        .times(times)
        .returning(move |_| Ok(value.clone()));
    gateway
}

fn no_calls() -> MockModelGateway {
    let mut gateway = MockModelGateway::new();
    gateway.expect_invoke().times(0);
    gateway
}

async fn session_with(gateway: MockModelGateway) -> (Session, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    let session = Session::hydrate(storage.clone(), Arc::new(gateway))
        .await
        .unwrap();
    (session, storage)
}

fn fill(session: &mut Session, strategy: Option<Strategy>) {
    session.set_message("Hi");
    session.set_context("boss asking for update");
    session.select_strategy(strategy);
}

async fn stored_stats(storage: &MemoryStorage) -> UsageStats {
    load_json::<UsageStats>(storage, STATS_KEY).await.unwrap().unwrap()
}

#[tokio::test]
async fn test_single_generation_populates_slot_and_credits_stats() {
    let (mut session, storage) = session_with(gateway_returning(1, single_json())).await;
    fill(&mut session, Some(Strategy::AssertBoundaries));

    session.generate().await.unwrap();

    let single = session.single_result().unwrap();
    assert_eq!(single.reply, "Thanks for checking in, here is the update.");
    assert_eq!(single.analysis, "Firm and direct.");
    assert_eq!(
        session.stats(),
        UsageStats {
            total_responses: 1,
            time_saved_minutes: 5
        }
    );
    assert_eq!(stored_stats(&storage).await, session.stats());
    assert_eq!(session.status(), Status::Idle);
    assert_eq!(
        session.notifications_mut().latest().unwrap().message,
        "Response generated!"
    );
}

#[tokio::test]
async fn test_n_single_generations_add_n_and_5n() {
    let (mut session, _) = session_with(gateway_returning(4, single_json())).await;
    fill(&mut session, Some(Strategy::BuildRapport));

    for _ in 0..4 {
        session.generate().await.unwrap();
    }

    assert_eq!(session.stats().total_responses, 4);
    assert_eq!(session.stats().time_saved_minutes, 20);
}

#[tokio::test]
async fn test_blank_inputs_fail_without_calling_gateway() {
    let (mut session, storage) = session_with(no_calls()).await;
    session.set_message("Hi");
    session.set_context("   ");
    session.select_strategy(Some(Strategy::ProvideClarity));

    let err = session.generate().await.unwrap_err();

    assert!(matches!(err, AppError::Validation { .. }));
    assert_eq!(err.to_string(), "Please fill in both message and context");
    assert_eq!(session.stats(), UsageStats::default());
    assert!(storage.is_empty());
    assert_eq!(
        session.notifications_mut().latest().unwrap().level,
        NoticeLevel::Error
    );
}

#[tokio::test]
async fn test_missing_strategy_fails_in_single_and_multiple() {
    let (mut session, _) = session_with(no_calls()).await;
    fill(&mut session, None);

    for mode in [GenerationMode::Single, GenerationMode::Multiple] {
        session.set_mode(mode);
        let err = session.generate().await.unwrap_err();
        assert_eq!(err.to_string(), "Please select a strategy");
    }
}

#[tokio::test]
async fn test_validation_failure_keeps_existing_results() {
    let (mut session, _) = session_with(gateway_returning(1, single_json())).await;
    fill(&mut session, Some(Strategy::AssertBoundaries));
    session.generate().await.unwrap();

    session.set_message("");
    assert!(session.generate().await.is_err());

    assert!(session.single_result().is_some());
}

#[tokio::test]
async fn test_compare_needs_no_strategy() {
    let (mut session, _) = session_with(gateway_returning(1, comparison_json())).await;
    fill(&mut session, None);
    session.set_mode(GenerationMode::Compare);

    session.generate().await.unwrap();

    let comparison = session.comparison_result().unwrap();
    assert_eq!(comparison.best().unwrap().strategy_name, "PROVIDE_CLARITY");
    assert_eq!(
        session.stats(),
        UsageStats {
            total_responses: 3,
            time_saved_minutes: 10
        }
    );
}

#[tokio::test]
async fn test_variations_credit_per_variation() {
    let (mut session, _) = session_with(gateway_returning(1, variations_json())).await;
    fill(&mut session, Some(Strategy::GentlePersuasion));
    session.set_mode(GenerationMode::Multiple);

    session.generate().await.unwrap();

    assert_eq!(session.variations_result().unwrap().variations.len(), 3);
    assert_eq!(session.stats().total_responses, 3);
    assert_eq!(session.stats().time_saved_minutes, 5);
    assert_eq!(
        session.notifications_mut().latest().unwrap().message,
        "3 variations generated!"
    );
}

#[tokio::test]
async fn test_malformed_output_fails_and_leaves_stats() {
    let mut gateway = MockModelGateway::new();
    gateway.expect_invoke().times(1).returning(|_| {
        Err(GatewayError::InvalidResponse {
            message: "Response is not valid JSON".to_string(),
        })
    });
    let (mut session, storage) = session_with(gateway).await;
    fill(&mut session, Some(Strategy::AssertBoundaries));

    let err = session.generate().await.unwrap_err();

    assert!(matches!(err, AppError::GenerationFailed { .. }));
    assert!(session.current_result().is_none());
    assert_eq!(session.stats(), UsageStats::default());
    assert!(storage.get(STATS_KEY).await.unwrap().is_none());
    assert_eq!(session.status(), Status::Idle);
}

#[tokio::test]
async fn test_missing_credential_surfaces_config_error() {
    let mut gateway = MockModelGateway::new();
    gateway
        .expect_invoke()
        .times(1)
        .returning(|_| Err(GatewayError::NotConfigured));
    let (mut session, _) = session_with(gateway).await;
    fill(&mut session, Some(Strategy::AssertBoundaries));

    let err = session.generate().await.unwrap_err();
    assert!(matches!(err, AppError::Config { .. }));
}

#[tokio::test]
async fn test_new_generation_clears_every_slot() {
    let mut gateway = MockModelGateway::new();
    let mut calls = 0;
    gateway.expect_invoke().times(2).returning(move |_| {
        calls += 1;
        if calls == 1 {
            Ok(single_json())
        } else {
            Err(GatewayError::Api {
                status: 503,
                message: "overloaded".to_string(),
            })
        }
    });
    let (mut session, _) = session_with(gateway).await;
    fill(&mut session, Some(Strategy::BuildRapport));
    session.generate().await.unwrap();

    session.set_mode(GenerationMode::Multiple);
    assert!(session.generate().await.is_err());

    assert!(session.single_result().is_none());
    assert!(session.variations_result().is_none());
}

#[tokio::test]
async fn test_switching_mode_keeps_results() {
    let (mut session, _) = session_with(gateway_returning(1, single_json())).await;
    fill(&mut session, Some(Strategy::BuildRapport));
    session.generate().await.unwrap();

    session.set_mode(GenerationMode::Compare);
    assert!(session.current_result().is_none());
    assert!(session.single_result().is_some());

    session.set_mode(GenerationMode::Single);
    assert!(matches!(
        session.current_result(),
        Some(ReplyResult::Single(_))
    ));
}

#[tokio::test]
async fn test_clear_output_resets_slots_and_strategy_only() {
    let (mut session, _) = session_with(gateway_returning(1, single_json())).await;
    fill(&mut session, Some(Strategy::BuildRapport));
    session.generate().await.unwrap();
    session.save_to_history().await.unwrap();
    let stats = session.stats();

    session.clear_output();

    assert!(session.single_result().is_none());
    assert!(session.variations_result().is_none());
    assert!(session.comparison_result().is_none());
    assert_eq!(session.strategy(), None);
    assert_eq!(session.stats(), stats);
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.message(), "Hi");
}

#[tokio::test]
async fn test_save_without_result_is_rejected() {
    let (mut session, storage) = session_with(no_calls()).await;

    let err = session.save_to_history().await.unwrap_err();

    assert_eq!(err.to_string(), "Nothing to save");
    assert!(session.history().is_empty());
    assert!(storage.get(HISTORY_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn test_save_prepends_and_persists() {
    let (mut session, storage) = session_with(gateway_returning(1, single_json())).await;
    fill(&mut session, Some(Strategy::AssertBoundaries));
    session.generate().await.unwrap();

    let entry = session.save_to_history().await.unwrap().clone();

    assert_eq!(entry.strategy, Some(Strategy::AssertBoundaries));
    assert_eq!(entry.response, "Thanks for checking in, here is the update.");
    let stored: Vec<HistoryEntry> = load_json(&*storage, HISTORY_KEY)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored, vec![entry]);
}

#[tokio::test]
async fn test_fifty_first_save_evicts_oldest() {
    let (mut session, _) = session_with(gateway_returning(1, single_json())).await;
    fill(&mut session, Some(Strategy::ProvideClarity));
    session.generate().await.unwrap();

    for _ in 0..HISTORY_CAPACITY {
        session.save_to_history().await.unwrap();
    }
    let oldest = session.history().entries()[HISTORY_CAPACITY - 1].id;
    let newest = session.history().entries()[0].id;

    let added = session.save_to_history().await.unwrap().id;

    assert_eq!(session.history().len(), HISTORY_CAPACITY);
    assert_eq!(session.history().entries()[0].id, added);
    assert!(added > newest);
    assert!(session.history().get(oldest).is_none());
}

#[tokio::test]
async fn test_load_history_entry_round_trips() {
    let (mut session, _) = session_with(gateway_returning(1, single_json())).await;
    fill(&mut session, Some(Strategy::DeescalateConflict));
    session.generate().await.unwrap();
    let saved = session.save_to_history().await.unwrap().clone();

    session.set_mode(GenerationMode::Compare);
    session.select_strategy(Some(Strategy::BuildRapport));
    session.load_history_entry(saved.id).unwrap();

    assert_eq!(session.mode(), GenerationMode::Single);
    assert_eq!(session.strategy(), Some(Strategy::DeescalateConflict));
    let single = session.single_result().unwrap();
    assert_eq!(single.reply, saved.response);
    assert_eq!(single.analysis, LOADED_ANALYSIS);
}

#[tokio::test]
async fn test_load_entry_without_strategy_clears_selection() {
    let storage = Arc::new(MemoryStorage::new());
    storage
        .set(
            HISTORY_KEY,
            r#"[{"id":7,"strategy":"N/A","response":"old reply","timestamp":"2024-06-10T06:13:20.000Z"}]"#,
        )
        .await
        .unwrap();
    let mut session = Session::hydrate(storage, Arc::new(no_calls()))
        .await
        .unwrap();
    session.select_strategy(Some(Strategy::BuildRapport));

    session.load_history_entry(7).unwrap();

    assert_eq!(session.strategy(), None);
    assert_eq!(session.single_result().unwrap().reply, "old reply");
    assert!(session.load_history_entry(8).is_err());
}

#[tokio::test]
async fn test_hydrate_reads_existing_state() {
    let storage = Arc::new(MemoryStorage::new());
    storage
        .set(STATS_KEY, r#"{"responses":12,"timeSaved":60}"#)
        .await
        .unwrap();

    let session = Session::hydrate(storage, Arc::new(no_calls()))
        .await
        .unwrap();

    assert_eq!(session.stats().total_responses, 12);
    assert_eq!(session.stats().time_saved_minutes, 60);
    assert!(session.history().is_empty());
    assert_eq!(session.mode(), GenerationMode::Single);
}

#[tokio::test]
async fn test_hydrate_falls_back_on_corrupt_blobs() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set(STATS_KEY, "not json").await.unwrap();
    storage.set(HISTORY_KEY, "{}").await.unwrap();

    let session = Session::hydrate(storage, Arc::new(no_calls()))
        .await
        .unwrap();

    assert_eq!(session.stats(), UsageStats::default());
    assert!(session.history().is_empty());
}

#[tokio::test]
async fn test_storage_write_failure_does_not_fail_generation() {
    let mut storage = MockStorage::new();
    storage.expect_get().returning(|_| Ok(None));
    storage.expect_set().times(1).returning(|_, _| {
        Err(StorageError::Query {
            message: "disk full".to_string(),
        })
    });
    let gateway = gateway_returning(1, single_json());
    let mut session = Session::hydrate(Arc::new(storage), Arc::new(gateway))
        .await
        .unwrap();
    fill(&mut session, Some(Strategy::ProvideClarity));

    session.generate().await.unwrap();

    assert_eq!(session.stats().total_responses, 1);
    let notices = session.notifications_mut().drain();
    assert!(notices
        .iter()
        .any(|n| n.level == NoticeLevel::Error && n.message.contains("disk full")));
}

#[tokio::test]
async fn test_hydrate_propagates_read_errors() {
    let mut storage = MockStorage::new();
    storage.expect_get().returning(|_| {
        Err(StorageError::Connection {
            message: "locked".to_string(),
        })
    });

    let result = Session::hydrate(Arc::new(storage), Arc::new(no_calls())).await;
    assert!(matches!(result, Err(AppError::Storage(_))));
}

#[tokio::test]
async fn test_toggle_strategy() {
    let (mut session, _) = session_with(no_calls()).await;
    session.toggle_strategy(Strategy::BuildRapport);
    assert_eq!(session.strategy(), Some(Strategy::BuildRapport));
    session.toggle_strategy(Strategy::ProvideClarity);
    assert_eq!(session.strategy(), Some(Strategy::ProvideClarity));
    session.toggle_strategy(Strategy::ProvideClarity);
    assert_eq!(session.strategy(), None);
}

#[tokio::test]
async fn test_apply_template_fills_inputs() {
    let (mut session, _) = session_with(no_calls()).await;
    session.apply_template(Template::Friend);
    assert_eq!(session.message(), Template::Friend.message());
    assert_eq!(session.context(), Template::Friend.context());
}

struct FakeClipboard {
    fail: bool,
    contents: Option<String>,
}

impl ClipboardSink for FakeClipboard {
    fn set_text(&mut self, text: &str) -> AppResult<()> {
        if self.fail {
            return Err(AppError::Clipboard {
                message: "no display".to_string(),
            });
        }
        self.contents = Some(text.to_string());
        Ok(())
    }
}

#[tokio::test]
async fn test_copy_uses_recommended_strategy_in_compare() {
    let (mut session, _) = session_with(gateway_returning(1, comparison_json())).await;
    fill(&mut session, None);
    session.set_mode(GenerationMode::Compare);
    session.generate().await.unwrap();

    assert_eq!(session.copyable_text(None).as_deref(), Some("clear reply"));
    assert_eq!(session.copyable_text(Some(2)).as_deref(), Some("firm reply"));
    assert_eq!(session.copyable_text(Some(9)), None);

    let text = session.copyable_text(None).unwrap();
    let mut clipboard = FakeClipboard {
        fail: false,
        contents: None,
    };
    session.copy_text(&mut clipboard, &text).unwrap();
    assert_eq!(clipboard.contents.as_deref(), Some("clear reply"));
}

#[tokio::test]
async fn test_copy_failure_is_reported() {
    let (mut session, _) = session_with(no_calls()).await;
    let mut clipboard = FakeClipboard {
        fail: true,
        contents: None,
    };

    let err = session.copy_text(&mut clipboard, "hello").unwrap_err();

    assert!(matches!(err, AppError::Clipboard { .. }));
    assert_eq!(
        session.notifications_mut().latest().unwrap().message,
        "Failed to copy"
    );
}

#[tokio::test]
async fn test_export_single_reply() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, _) = session_with(gateway_returning(1, single_json())).await;

    assert!(session.export_single(dir.path()).await.is_err());

    fill(&mut session, Some(Strategy::AssertBoundaries));
    session.generate().await.unwrap();
    let path = session.export_single(dir.path()).await.unwrap();

    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("response-") && name.ends_with(".txt"));
    assert_eq!(
        std::fs::read_to_string(path).unwrap(),
        "Thanks for checking in, here is the update."
    );
}
