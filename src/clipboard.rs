// Clipboard access.
//
// The system clipboard is optional: it may be compiled out (no `clipboard`
// feature) or unavailable at runtime (headless session). `detect` decides
// once at startup and hands out either a working clipboard or `NoClipboard`,
// so callers never check for support themselves.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClipboardError {
    #[error("Clipboard is not available")]
    Unavailable,

    #[error("Clipboard error: {0}")]
    Backend(String),
}

pub trait Clipboard {
    fn is_available(&self) -> bool;

    /// Current clipboard text, trimmed.
    fn paste(&self) -> Result<String, ClipboardError>;

    fn copy(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Stand-in used when there is no clipboard. Copying is silently skipped,
/// pasting is an error.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoClipboard;

impl Clipboard for NoClipboard {
    fn is_available(&self) -> bool {
        false
    }

    fn paste(&self) -> Result<String, ClipboardError> {
        Err(ClipboardError::Unavailable)
    }

    fn copy(&self, _text: &str) -> Result<(), ClipboardError> {
        Ok(())
    }
}

#[cfg(feature = "clipboard")]
pub use system::SystemClipboard;

#[cfg(feature = "clipboard")]
mod system {
    use super::{Clipboard, ClipboardError};
    use std::sync::Mutex;

    /// The desktop clipboard, through `arboard`.
    pub struct SystemClipboard {
        inner: Mutex<arboard::Clipboard>,
    }

    impl SystemClipboard {
        pub fn open() -> Result<Self, ClipboardError> {
            let inner = arboard::Clipboard::new()
                .map_err(|e| ClipboardError::Backend(e.to_string()))?;
            Ok(Self {
                inner: Mutex::new(inner),
            })
        }

        fn with<T>(
            &self,
            f: impl FnOnce(&mut arboard::Clipboard) -> Result<T, arboard::Error>,
        ) -> Result<T, ClipboardError> {
            let mut guard = self
                .inner
                .lock()
                .map_err(|e| ClipboardError::Backend(e.to_string()))?;
            f(&mut *guard).map_err(|e| ClipboardError::Backend(e.to_string()))
        }
    }

    impl Clipboard for SystemClipboard {
        fn is_available(&self) -> bool {
            true
        }

        fn paste(&self) -> Result<String, ClipboardError> {
            self.with(|clipboard| clipboard.get_text())
                .map(|text| text.trim().to_string())
        }

        fn copy(&self, text: &str) -> Result<(), ClipboardError> {
            self.with(|clipboard| clipboard.set_text(text.to_string()))
        }
    }
}

/// Resolve the clipboard once for the whole process.
pub fn detect() -> Box<dyn Clipboard> {
    #[cfg(feature = "clipboard")]
    {
        match SystemClipboard::open() {
            Ok(clipboard) => return Box::new(clipboard),
            Err(e) => log::debug!("System clipboard unavailable: {}", e),
        }
    }
    Box::new(NoClipboard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_clipboard() {
        let clipboard = NoClipboard;
        assert!(!clipboard.is_available());
        assert!(matches!(clipboard.paste(), Err(ClipboardError::Unavailable)));
        assert!(clipboard.copy("https://ptpimg.me/ulkm79.jpg").is_ok());
    }
}
