use async_trait::async_trait;

use crate::error::ClipboardError;

/// Platform clipboard capability.
#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;

    /// Selection-based fallback used when [`Clipboard::write_text`] fails.
    fn copy_via_selection(&self, _text: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError::Unavailable)
    }
}
