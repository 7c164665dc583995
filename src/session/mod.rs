//! Application state for drafting replies.
//!
//! A [`Session`] owns the current inputs, the active mode, one result slot per
//! mode, and two persisted collections: usage statistics and the saved-reply
//! history. It is built explicitly with [`Session::hydrate`] and passed around
//! by the caller; there is no global state.
//!
//! All transitions are synchronous except [`Session::generate`], whose gateway
//! call is the only suspension point. Persisted collections are written in full
//! after every change; write failures are logged and reported as notices but
//! never undo the in-memory change.

mod history;
mod notifications;
mod stats;

pub use history::*;
pub use notifications::*;
pub use stats::*;

use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::gateway::ModelGateway;
use crate::output::{export_reply, ClipboardSink};
use crate::replies::{
    generate_reply, ComparisonResult, GenerationMode, GenerationRequest, ReplyResult,
    SingleResult, VariationsResult,
};
use crate::storage::{load_json, save_json, Storage, HISTORY_KEY, STATS_KEY};
use crate::strategy::{Strategy, Template};

/// Analysis shown for a reply restored from history.
pub const LOADED_ANALYSIS: &str = "Loaded from history.";

/// Whether a generation is in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Status {
    #[default]
    Idle,
    Loading,
}

/// The reply-drafting state machine.
pub struct Session {
    storage: Arc<dyn Storage>,
    gateway: Arc<dyn ModelGateway>,
    message: String,
    context: String,
    strategy: Option<Strategy>,
    mode: GenerationMode,
    status: Status,
    single: Option<SingleResult>,
    variations: Option<VariationsResult>,
    comparison: Option<ComparisonResult>,
    stats: UsageStats,
    history: History,
    notifications: Notifications,
}

impl Session {
    /// Build a session, reading stats and history from `storage`.
    ///
    /// Missing keys yield defaults. Values that no longer decode are replaced
    /// by defaults with a warning.
    pub async fn hydrate(
        storage: Arc<dyn Storage>,
        gateway: Arc<dyn ModelGateway>,
    ) -> AppResult<Self> {
        let stats = load_or_default::<UsageStats>(storage.as_ref(), STATS_KEY).await?;
        let history = History::from_entries(
            load_or_default::<Vec<HistoryEntry>>(storage.as_ref(), HISTORY_KEY).await?,
        );

        info!(
            responses = stats.total_responses,
            history = history.len(),
            "Session hydrated"
        );

        Ok(Self {
            storage,
            gateway,
            message: String::new(),
            context: String::new(),
            strategy: None,
            mode: GenerationMode::default(),
            status: Status::Idle,
            single: None,
            variations: None,
            comparison: None,
            stats,
            history,
            notifications: Notifications::default(),
        })
    }

    // ------------------------------------------------------------------
    // Inputs
    // ------------------------------------------------------------------

    /// Store the incoming message verbatim.
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    /// Store the context/goal verbatim.
    pub fn set_context(&mut self, context: impl Into<String>) {
        self.context = context.into();
    }

    /// Fill both inputs from a template.
    pub fn apply_template(&mut self, template: Template) {
        self.message = template.message().to_string();
        self.context = template.context().to_string();
    }

    /// Select a strategy, or clear the selection with `None`.
    pub fn select_strategy(&mut self, strategy: Option<Strategy>) {
        self.strategy = strategy;
    }

    /// Select `strategy`, or deselect it if it is already selected.
    pub fn toggle_strategy(&mut self, strategy: Strategy) {
        if self.strategy == Some(strategy) {
            self.strategy = None;
        } else {
            self.strategy = Some(strategy);
        }
    }

    /// Switch the active mode. Existing results are kept and nothing is generated.
    pub fn set_mode(&mut self, mode: GenerationMode) {
        self.mode = mode;
    }

    // ------------------------------------------------------------------
    // Generation
    // ------------------------------------------------------------------

    /// Whether a new generation may start.
    pub fn can_generate(&self) -> bool {
        self.status == Status::Idle
    }

    /// Generate for the active mode.
    ///
    /// Fails with a validation error, without touching state or the network,
    /// when an input is blank or a required strategy is missing. Otherwise all
    /// result slots are cleared and exactly one gateway call is made; on
    /// success the active mode's slot is filled and usage is credited.
    pub async fn generate(&mut self) -> AppResult<()> {
        let request = GenerationRequest::new(
            self.message.clone(),
            self.context.clone(),
            self.mode,
            self.strategy,
        );
        if let Err(e) = request.validate() {
            self.notify_error(&e);
            return Err(e);
        }

        self.status = Status::Loading;
        self.clear_results();

        let outcome = generate_reply(self.gateway.as_ref(), &request).await;
        self.status = Status::Idle;

        let result = match outcome {
            Ok(result) => result,
            Err(e) => {
                self.notify_error(&e);
                return Err(e);
            }
        };

        let credit = result.stats_credit();
        let message = match &result {
            ReplyResult::Single(_) => "Response generated!".to_string(),
            ReplyResult::Variations(v) => format!("{} variations generated!", v.variations.len()),
            ReplyResult::Comparison(_) => "Strategies compared!".to_string(),
        };

        self.store_result(result);
        self.stats.apply(credit);
        self.persist_stats().await;
        self.notifications.push(NoticeLevel::Success, message);

        Ok(())
    }

    /// Clear every result slot and the selected strategy.
    pub fn clear_output(&mut self) {
        self.clear_results();
        self.strategy = None;
        self.notifications.push(NoticeLevel::Info, "Output cleared");
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// Save the current single reply to history.
    pub async fn save_to_history(&mut self) -> AppResult<&HistoryEntry> {
        let reply = match self.single.as_ref().filter(|s| !s.reply.is_empty()) {
            Some(single) => single.reply.clone(),
            None => {
                let err = AppError::validation("Nothing to save");
                self.notify_error(&err);
                return Err(err);
            }
        };

        let id = self.history.record(self.strategy, reply, Utc::now()).id;
        self.persist_history().await;
        self.notifications.push(NoticeLevel::Success, "Saved to history!");

        self.history
            .get(id)
            .ok_or_else(|| AppError::validation("Saved entry was evicted"))
    }

    /// Restore a saved reply into the single-result slot.
    ///
    /// Clears all slots, restores the entry's strategy (or none) and switches
    /// to single mode.
    pub fn load_history_entry(&mut self, id: i64) -> AppResult<()> {
        let Some(entry) = self.history.get(id).cloned() else {
            let err = AppError::validation(format!("No history entry with id {}", id));
            self.notify_error(&err);
            return Err(err);
        };

        self.clear_results();
        self.single = Some(SingleResult {
            reply: entry.response,
            analysis: LOADED_ANALYSIS.to_string(),
        });
        self.strategy = entry.strategy;
        self.mode = GenerationMode::Single;
        self.notifications.push(NoticeLevel::Info, "Loaded from history");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Peripheral output
    // ------------------------------------------------------------------

    /// Text of the active result suitable for copying.
    ///
    /// `index` picks a variation or compared strategy; without it the first
    /// variation or the recommended strategy is used.
    pub fn copyable_text(&self, index: Option<usize>) -> Option<String> {
        match self.mode {
            GenerationMode::Single => self.single.as_ref().map(|s| s.reply.clone()),
            GenerationMode::Multiple => self
                .variations
                .as_ref()
                .and_then(|v| v.variations.get(index.unwrap_or(0)))
                .map(|v| v.reply.clone()),
            GenerationMode::Compare => self.comparison.as_ref().and_then(|c| {
                match index {
                    Some(i) => c.comparison.get(i),
                    None => c.best(),
                }
                .map(|item| item.reply.clone())
            }),
        }
    }

    /// Copy `text` to `clipboard`. Failures are reported and returned.
    pub fn copy_text(&mut self, clipboard: &mut dyn ClipboardSink, text: &str) -> AppResult<()> {
        match clipboard.set_text(text) {
            Ok(()) => {
                self.notifications.push(NoticeLevel::Success, "Copied to clipboard!");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Clipboard copy failed");
                self.notifications.push(NoticeLevel::Error, "Failed to copy");
                Err(e)
            }
        }
    }

    /// Write the current single reply to `dir` as a text file.
    pub async fn export_single(&mut self, dir: &Path) -> AppResult<PathBuf> {
        let reply = match self.single.as_ref().filter(|s| !s.reply.is_empty()) {
            Some(single) => single.reply.clone(),
            None => {
                let err = AppError::validation("Nothing to export");
                self.notify_error(&err);
                return Err(err);
            }
        };

        match export_reply(dir, &reply, Utc::now()).await {
            Ok(path) => {
                self.notifications
                    .push(NoticeLevel::Success, "Exported successfully!");
                Ok(path)
            }
            Err(e) => {
                self.notify_error(&e);
                Err(e)
            }
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Result for the active mode, if any.
    pub fn current_result(&self) -> Option<ReplyResult> {
        match self.mode {
            GenerationMode::Single => self.single.clone().map(ReplyResult::Single),
            GenerationMode::Multiple => self.variations.clone().map(ReplyResult::Variations),
            GenerationMode::Compare => self.comparison.clone().map(ReplyResult::Comparison),
        }
    }

    pub fn single_result(&self) -> Option<&SingleResult> {
        self.single.as_ref()
    }

    pub fn variations_result(&self) -> Option<&VariationsResult> {
        self.variations.as_ref()
    }

    pub fn comparison_result(&self) -> Option<&ComparisonResult> {
        self.comparison.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn strategy(&self) -> Option<Strategy> {
        self.strategy
    }

    pub fn mode(&self) -> GenerationMode {
        self.mode
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn stats(&self) -> UsageStats {
        self.stats
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Pending notices.
    pub fn notifications_mut(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn clear_results(&mut self) {
        self.single = None;
        self.variations = None;
        self.comparison = None;
    }

    fn store_result(&mut self, result: ReplyResult) {
        match result {
            ReplyResult::Single(r) => self.single = Some(r),
            ReplyResult::Variations(r) => self.variations = Some(r),
            ReplyResult::Comparison(r) => self.comparison = Some(r),
        }
    }

    fn notify_error(&mut self, err: &AppError) {
        self.notifications.push(NoticeLevel::Error, err.to_string());
    }

    async fn persist_stats(&mut self) {
        if let Err(e) = save_json(self.storage.as_ref(), STATS_KEY, &self.stats).await {
            warn!(error = %e, "Failed to persist usage stats");
            self.notifications
                .push(NoticeLevel::Error, format!("Could not save stats: {}", e));
        }
    }

    async fn persist_history(&mut self) {
        if let Err(e) = save_json(self.storage.as_ref(), HISTORY_KEY, &self.history).await {
            warn!(error = %e, "Failed to persist history");
            self.notifications
                .push(NoticeLevel::Error, format!("Could not save history: {}", e));
        }
    }
}

async fn load_or_default<T>(storage: &dyn Storage, key: &str) -> AppResult<T>
where
    T: serde::de::DeserializeOwned + Default,
{
    match load_json::<T>(storage, key).await {
        Ok(value) => Ok(value.unwrap_or_default()),
        Err(crate::error::StorageError::Serialization { key, message }) => {
            warn!(key = %key, error = %message, "Stored value unreadable, using default");
            Ok(T::default())
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod session_tests;
