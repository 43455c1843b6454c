//! Popup-based authorization code login
//!
//! ```text
//!  login() ──► open consent popup ──► AwaitingCode ──┬─ AuthCode ──► exchange ──► Ok(token)
//!                    │                               ├─ popup closed + grace ──► PopupClosed
//!                    └─ blocked ──► PopupBlocked     ├─ timeout ──► TimedOut
//!                                                    └─ cancel() ──► Cancelled
//! ```
//!
//! One attempt runs at a time. The message path and the popup-closed path
//! race inside a single `select!`; whichever wins, the attempt guard drops
//! the mailbox listener and the poll timer exactly once.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::mailbox::{CallbackListener, CallbackMailbox, CallbackMessage};
use super::state::{generate_state, validate_state};
use super::token_manager::TokenManager;
use super::traits::OAuthClientTrait;

/// Screen area used to center the popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Default for ScreenRect {
    fn default() -> Self {
        Self { x: 0, y: 0, width: 1920, height: 1080 }
    }
}

/// Everything a [`ConsentWindow`] needs to open the popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupRequest {
    pub url: String,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub left: i32,
    pub top: i32,
}

impl PopupRequest {
    #[must_use]
    pub fn centered(
        url: impl Into<String>,
        name: impl Into<String>,
        width: u32,
        height: u32,
        parent: ScreenRect,
    ) -> Self {
        let left = parent.x + (i64::from(parent.width) - i64::from(width)).div_euclid(2) as i32;
        let top = parent.y + (i64::from(parent.height) - i64::from(height)).div_euclid(2) as i32;
        Self { url: url.into(), name: name.into(), width, height, left, top }
    }
}

/// A window opened by [`ConsentWindow::open`].
pub trait PopupHandle: Send + Sync {
    fn is_closed(&self) -> bool;
    fn close(&self);
}

/// Port that shows the provider's consent page to the user.
pub trait ConsentWindow: Send + Sync {
    /// `None` when the window could not be opened (e.g. a popup blocker).
    fn open(&self, request: &PopupRequest) -> Option<Box<dyn PopupHandle>>;

    fn parent_bounds(&self) -> ScreenRect {
        ScreenRect::default()
    }
}

/// Why a login did not produce an access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    AlreadyInProgress,
    PopupBlocked,
    PopupClosed,
    /// The provider redirected back with an error instead of a code.
    Denied { error: String, description: Option<String> },
    TimedOut,
    Cancelled,
    ExchangeFailed,
}

impl std::fmt::Display for LoginError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyInProgress => write!(f, "A login is already in progress"),
            Self::PopupBlocked => write!(f, "Login popup was blocked; allow popups and retry"),
            Self::PopupClosed => write!(f, "Login window was closed before authorization"),
            Self::Denied { error, description } => match description {
                Some(desc) => write!(f, "Authorization denied: {error}: {desc}"),
                None => write!(f, "Authorization denied: {error}"),
            },
            Self::TimedOut => write!(f, "Login timed out"),
            Self::Cancelled => write!(f, "Login was cancelled"),
            Self::ExchangeFailed => write!(f, "Failed to exchange authorization code"),
        }
    }
}

impl std::error::Error for LoginError {}

/// Where the coordinator is in its current (or last) attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptPhase {
    Idle,
    AwaitingCode,
    Resolved,
}

/// Popup geometry and timing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowSettings {
    pub popup_name: String,
    pub popup_width: u32,
    pub popup_height: u32,
    pub poll_interval: Duration,
    pub grace_period: Duration,
    pub login_timeout: Duration,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            popup_name: "kakao-login".to_string(),
            popup_width: 500,
            popup_height: 600,
            poll_interval: Duration::from_millis(500),
            grace_period: Duration::from_millis(500),
            login_timeout: Duration::from_secs(300),
        }
    }
}

/// Resources owned by one login; released exactly once.
struct AuthorizationAttempt {
    popup: Option<Box<dyn PopupHandle>>,
    listener: Option<CallbackListener>,
    poll: Option<Interval>,
    cancel: CancellationToken,
    expected_state: String,
    phase: Arc<Mutex<AttemptPhase>>,
}

impl AuthorizationAttempt {
    async fn wait_for_code(&mut self, settings: &FlowSettings) -> Result<String, LoginError> {
        let Self { popup, listener, poll, cancel, expected_state, .. } = self;
        let (Some(popup), Some(listener), Some(poll)) =
            (popup.as_ref(), listener.as_mut(), poll.as_mut())
        else {
            return Err(LoginError::Cancelled);
        };
        let expected_state: &str = expected_state;

        let deadline = tokio::time::sleep(settings.login_timeout);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                () = cancel.cancelled() => return Err(LoginError::Cancelled),
                message = listener.recv() => {
                    let Some(message) = message else { return Err(LoginError::Cancelled) };
                    if let Some(outcome) = accept(expected_state, message) {
                        return outcome;
                    }
                }
                _ = poll.tick() => {
                    if popup.is_closed() {
                        debug!("Consent popup closed, waiting for a late callback");
                        let grace = tokio::time::sleep(settings.grace_period);
                        tokio::pin!(grace);
                        loop {
                            tokio::select! {
                                () = cancel.cancelled() => return Err(LoginError::Cancelled),
                                message = listener.recv() => {
                                    let Some(message) = message else {
                                        return Err(LoginError::PopupClosed);
                                    };
                                    if let Some(outcome) = accept(expected_state, message) {
                                        return outcome;
                                    }
                                }
                                () = &mut grace => return Err(LoginError::PopupClosed),
                                () = &mut deadline => return Err(LoginError::TimedOut),
                            }
                        }
                    }
                }
                () = &mut deadline => return Err(LoginError::TimedOut),
            }
        }
    }

    fn release(&mut self) {
        if self.listener.take().is_some() {
            debug!("Callback listener removed");
        }
        self.poll = None;
        if let Some(popup) = self.popup.take() {
            if !popup.is_closed() {
                popup.close();
            }
        }
        self.cancel.cancel();
        *self.phase.lock() = AttemptPhase::Resolved;
    }
}

impl Drop for AuthorizationAttempt {
    fn drop(&mut self) {
        self.release();
    }
}

/// `None` keeps waiting; mismatched `state` values are ignored.
fn accept(expected_state: &str, message: CallbackMessage) -> Option<Result<String, LoginError>> {
    if !validate_state(expected_state, message.state()) {
        warn!("Ignoring callback with mismatched state");
        return None;
    }
    match message {
        CallbackMessage::AuthCode { code, .. } => Some(Ok(code)),
        CallbackMessage::AuthError { error, description, .. } => {
            Some(Err(LoginError::Denied { error, description }))
        }
    }
}

/// Single-flight login coordinator.
pub struct AuthorizationFlow<C: OAuthClientTrait + 'static> {
    token_manager: Arc<TokenManager<C>>,
    window: Arc<dyn ConsentWindow>,
    mailbox: CallbackMailbox,
    settings: FlowSettings,
    in_flight: tokio::sync::Mutex<()>,
    phase: Arc<Mutex<AttemptPhase>>,
    current_cancel: Mutex<Option<CancellationToken>>,
}

impl<C: OAuthClientTrait + 'static> AuthorizationFlow<C> {
    #[must_use]
    pub fn new(
        token_manager: Arc<TokenManager<C>>,
        window: Arc<dyn ConsentWindow>,
        mailbox: CallbackMailbox,
        settings: FlowSettings,
    ) -> Self {
        Self {
            token_manager,
            window,
            mailbox,
            settings,
            in_flight: tokio::sync::Mutex::new(()),
            phase: Arc::new(Mutex::new(AttemptPhase::Idle)),
            current_cancel: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn mailbox(&self) -> &CallbackMailbox {
        &self.mailbox
    }

    #[must_use]
    pub fn phase(&self) -> AttemptPhase {
        *self.phase.lock()
    }

    /// Abort the pending attempt, if any.
    pub fn cancel(&self) {
        if let Some(token) = self.current_cancel.lock().as_ref() {
            token.cancel();
        }
    }

    /// Run the consent popup and exchange the resulting code.
    ///
    /// # Errors
    /// See [`LoginError`]; a second call while one is pending fails with
    /// `AlreadyInProgress`
    pub async fn login(&self) -> Result<String, LoginError> {
        let Ok(_in_flight) = self.in_flight.try_lock() else {
            warn!("Login requested while another attempt is pending");
            return Err(LoginError::AlreadyInProgress);
        };

        let state = generate_state();
        let client = self.token_manager.oauth_client();
        let request = PopupRequest::centered(
            client.authorization_url(&state),
            self.settings.popup_name.clone(),
            self.settings.popup_width,
            self.settings.popup_height,
            self.window.parent_bounds(),
        );

        // Listen before opening so an instant redirect is not lost.
        let listener = self.mailbox.listen();
        let Some(popup) = self.window.open(&request) else {
            warn!("Consent popup was blocked");
            return Err(LoginError::PopupBlocked);
        };

        let mut poll = tokio::time::interval(self.settings.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let cancel = CancellationToken::new();
        *self.current_cancel.lock() = Some(cancel.clone());
        *self.phase.lock() = AttemptPhase::AwaitingCode;
        info!(width = request.width, height = request.height, "Consent popup opened");

        let mut attempt = AuthorizationAttempt {
            popup: Some(popup),
            listener: Some(listener),
            poll: Some(poll),
            cancel,
            expected_state: state,
            phase: Arc::clone(&self.phase),
        };
        let outcome = attempt.wait_for_code(&self.settings).await;
        attempt.release();
        *self.current_cancel.lock() = None;

        let code = outcome.inspect_err(|e| info!(reason = %e, "Login ended without a code"))?;

        let redirect_uri = client.redirect_uri().to_string();
        match self.token_manager.complete_authorization_code(&code, &redirect_uri).await {
            Some(token) => {
                info!("Login completed");
                Ok(token)
            }
            None => Err(LoginError::ExchangeFailed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn popup_is_centered_on_parent() {
        let request = PopupRequest::centered(
            "https://auth",
            "kakao-login",
            500,
            600,
            ScreenRect { x: 100, y: 50, width: 1500, height: 900 },
        );
        assert_eq!((request.left, request.top), (600, 200));
    }

    #[test]
    fn popup_larger_than_parent_goes_negative() {
        let request =
            PopupRequest::centered("u", "n", 500, 600, ScreenRect { x: 0, y: 0, width: 400, height: 400 });
        assert_eq!((request.left, request.top), (-50, -100));
    }

    #[test]
    fn accept_ignores_foreign_state() {
        let message = CallbackMessage::AuthCode { code: "c".into(), state: Some("other".into()) };
        assert!(accept("mine", message).is_none());
    }

    #[test]
    fn accept_maps_provider_error() {
        let message = CallbackMessage::AuthError {
            error: "access_denied".into(),
            description: Some("User denied access".into()),
            state: Some("mine".into()),
        };
        assert_eq!(
            accept("mine", message),
            Some(Err(LoginError::Denied {
                error: "access_denied".into(),
                description: Some("User denied access".into()),
            }))
        );
    }
}
