//! Consent page shown in the system browser.
//!
//! A browser tab is not a window this process owns: it cannot be sized,
//! observed, or closed from here. The popup geometry is only logged, and the
//! handle reports closed once the coordinator has closed it. A user who
//! abandons the tab is caught by the login timeout.

use std::sync::atomic::{AtomicBool, Ordering};

use talkreport_common::auth::{ConsentWindow, PopupHandle, PopupRequest};
use tracing::{debug, info, warn};

type Opener = dyn Fn(&str) -> std::io::Result<()> + Send + Sync;

/// [`ConsentWindow`] that hands the consent URL to the default browser.
pub struct BrowserConsentWindow {
    opener: Box<Opener>,
}

impl BrowserConsentWindow {
    pub fn new() -> Self {
        Self::with_opener(|url| open::that(url))
    }

    /// Use `opener` instead of the system browser.
    pub fn with_opener(opener: impl Fn(&str) -> std::io::Result<()> + Send + Sync + 'static) -> Self {
        Self { opener: Box::new(opener) }
    }
}

impl Default for BrowserConsentWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsentWindow for BrowserConsentWindow {
    fn open(&self, request: &PopupRequest) -> Option<Box<dyn PopupHandle>> {
        debug!(
            name = %request.name,
            width = request.width,
            height = request.height,
            left = request.left,
            top = request.top,
            "Opening consent page"
        );
        match (self.opener)(&request.url) {
            Ok(()) => {
                info!("Consent page opened in the browser");
                Some(Box::new(BrowserTab::default()))
            }
            Err(err) => {
                warn!(error = %err, "Could not open the browser");
                None
            }
        }
    }
}

#[derive(Default)]
struct BrowserTab {
    closed: AtomicBool,
}

impl PopupHandle for BrowserTab {
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
