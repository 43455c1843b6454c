//! Session commands: restore, login, logout, status.

use serde::Serialize;
use talkreport_domain::{Result, TalkReportError};
use talkreport_infra::{InfraError, KakaoCallbackServer};
use tracing::{info, warn};

use crate::context::AppContext;
use crate::utils::command_helpers::execute_logged;

/// What the UI needs to decide between "send" and "log in".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatus {
    pub authenticated: bool,
    /// Seconds until the access token expires; negative once it has.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in_secs: Option<i64>,
}

fn domain_error(err: impl Into<InfraError>) -> TalkReportError {
    let infra: InfraError = err.into();
    infra.into()
}

/// Load persisted credentials, refreshing them if they already expired.
///
/// # Errors
/// Returns `Credentials` when the store cannot be read.
pub async fn restore_session(ctx: &AppContext) -> Result<AuthStatus> {
    execute_logged("auth::restore", || async {
        let restored = ctx.tokens.restore().await.map_err(domain_error)?;
        info!(restored = restored.is_some(), "Session restore finished");
        Ok(status(ctx).await)
    })
    .await
}

/// Current session state, without touching the network.
pub async fn status(ctx: &AppContext) -> AuthStatus {
    AuthStatus {
        authenticated: ctx.tokens.is_authenticated().await,
        expires_in_secs: ctx.tokens.seconds_until_expiry().await,
    }
}

/// Run the browser login and wait for the redirect.
///
/// The loopback callback server only runs for the duration of the login.
///
/// # Errors
/// Returns `Network` if the redirect port is taken and `Auth` when the
/// login ends without a token.
pub async fn login(ctx: &AppContext) -> Result<AuthStatus> {
    execute_logged("auth::login", || async {
        let server =
            KakaoCallbackServer::start(&ctx.config.kakao.redirect_uri, ctx.login.mailbox().clone())
                .await?;

        let outcome = ctx.login.login().await;
        if let Err(err) = server.shutdown().await {
            warn!(error = %err, "Callback server did not stop cleanly");
        }

        outcome.map_err(domain_error)?;
        Ok(status(ctx).await)
    })
    .await
}

/// Forget the session locally and in the credential store.
///
/// # Errors
/// Returns `Credentials` when the store cannot be cleared.
pub async fn logout(ctx: &AppContext) -> Result<()> {
    execute_logged("auth::logout", || async {
        ctx.login.cancel();
        ctx.tokens.clear().await.map_err(domain_error)
    })
    .await
}
