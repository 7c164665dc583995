//! Clipboard copy and plain-text export.
//!
//! Both are best-effort: failures are reported to the user and never touch
//! session state.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};

/// Destination for copied text.
pub trait ClipboardSink {
    /// Replace the clipboard contents with `text`.
    fn set_text(&mut self, text: &str) -> AppResult<()>;
}

/// The system clipboard.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> AppResult<()> {
        let mut clipboard = arboard::Clipboard::new().map_err(|e| AppError::Clipboard {
            message: e.to_string(),
        })?;
        clipboard
            .set_text(text.to_owned())
            .map_err(|e| AppError::Clipboard {
                message: e.to_string(),
            })?;
        debug!(chars = text.len(), "Copied text to clipboard");
        Ok(())
    }
}

/// File name for an export created at `at`.
pub fn export_file_name(at: DateTime<Utc>) -> String {
    format!("response-{}.txt", at.timestamp_millis())
}

/// Write `text` to `dir/response-<millis>.txt` and return the path.
pub async fn export_reply(dir: &Path, text: &str, at: DateTime<Utc>) -> AppResult<PathBuf> {
    let path = dir.join(export_file_name(at));

    tokio::fs::write(&path, text).await.map_err(|e| {
        warn!(path = %path.display(), error = %e, "Export failed");
        AppError::Export {
            message: format!("{}: {}", path.display(), e),
        }
    })?;

    debug!(path = %path.display(), "Exported reply");
    Ok(path)
}
