//! Authorization window abstraction
//!
//! The poller never reads or writes the window's content (it is cross-origin
//! territory owned by the external provider); the only things it may do are
//! ask "is it closed?" and request a close. Launchers own the mechanics of
//! opening one, which keeps the poll loop independent of any concrete
//! windowing environment.

use crate::errors::{ClientError, ClientResult};
use crate::logger::{self, LogTag};

/// Requested geometry for the authorization window.
#[derive(Debug, Clone, Copy)]
pub struct PopupFeatures {
    pub width: u32,
    pub height: u32,
}

impl PopupFeatures {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Top-left position that centers the window on a screen of the given
    /// dimensions. A window larger than the screen pins to the top-left
    /// corner instead of going negative.
    pub fn centered_on(&self, screen_width: u32, screen_height: u32) -> (u32, u32) {
        let left = screen_width.saturating_sub(self.width) / 2;
        let top = screen_height.saturating_sub(self.height) / 2;
        (left, top)
    }
}

impl Default for PopupFeatures {
    fn default() -> Self {
        Self {
            width: 600,
            height: 700,
        }
    }
}

/// Handle to an externally-owned authorization window.
///
/// The user or the external site may close it at any moment; the poller
/// only observes.
pub trait PopupWindow: Send + Sync {
    /// Whether the window has been closed (by anyone).
    fn is_closed(&self) -> bool;

    /// Request a close. Must be idempotent; closing an already-closed
    /// window does nothing.
    fn close(&self);
}

/// Opens authorization windows.
pub trait PopupLauncher: Send + Sync {
    /// Open `url` in a new window. An environment that refuses to open one
    /// (popup blocker, headless session) returns an error and the linking
    /// attempt never starts polling.
    fn open(&self, url: &str, features: &PopupFeatures) -> ClientResult<Box<dyn PopupWindow>>;
}

/// Launcher that hands the URL to the system browser.
///
/// The resulting tab is fully detached: it cannot be observed or closed, so
/// the handle never reports closed and `close` is a no-op. Completion is
/// detected purely by the linked-status poll.
pub struct SystemBrowserLauncher;

struct DetachedWindow;

impl PopupWindow for DetachedWindow {
    fn is_closed(&self) -> bool {
        false
    }

    fn close(&self) {}
}

impl PopupLauncher for SystemBrowserLauncher {
    fn open(&self, url: &str, _features: &PopupFeatures) -> ClientResult<Box<dyn PopupWindow>> {
        open::that(url).map_err(|e| {
            ClientError::PopupBlocked(format!("Could not open system browser: {}", e))
        })?;
        logger::info(LogTag::Link, "Opened authorization page in system browser");
        Ok(Box::new(DetachedWindow))
    }
}
