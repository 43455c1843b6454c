//! Loopback HTTP server that receives the OAuth redirect.
//!
//! The consent page redirects the browser to `redirect_uri`; this server
//! answers that request, forwards what it carried to the login coordinator's
//! [`CallbackMailbox`], and tells the user to close the window. State
//! validation happens in the coordinator, not here.

use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use talkreport_common::auth::{CallbackMailbox, CallbackMessage};
use talkreport_domain::constants::CALLBACK_PATH;
use talkreport_domain::{Result, TalkReportError};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use url::Url;

const CLOSE_WINDOW_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>TalkReport</title></head>
<body><h1>카카오 로그인 완료</h1><p>이 창을 닫아도 됩니다. You may close this window.</p></body>
</html>"#;

const NO_LOGIN_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>TalkReport</title></head>
<body><h1>로그인 요청이 없습니다</h1><p>No login is waiting for this response. Start the login again from TalkReport.</p></body>
</html>"#;

const BAD_REQUEST_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>TalkReport</title></head>
<body><h1>잘못된 요청</h1><p>The redirect did not carry an authorization code.</p></body>
</html>"#;

/// Running callback server; stops when dropped.
pub struct KakaoCallbackServer {
    local_addr: SocketAddr,
    path: String,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl KakaoCallbackServer {
    /// Bind the port and path of `redirect_uri` on the loopback interface.
    ///
    /// A port of `0` picks a free port; [`Self::redirect_uri`] reports it.
    ///
    /// # Errors
    /// Returns `Config` for an unusable redirect URI and `Network` if the
    /// port cannot be bound.
    pub async fn start(redirect_uri: &str, mailbox: CallbackMailbox) -> Result<Self> {
        let url = Url::parse(redirect_uri).map_err(|err| {
            TalkReportError::Config(format!("invalid redirect URI {redirect_uri}: {err}"))
        })?;
        let port = url.port_or_known_default().ok_or_else(|| {
            TalkReportError::Config(format!("redirect URI {redirect_uri} has no port"))
        })?;
        let path = match url.path() {
            "" | "/" => CALLBACK_PATH.to_string(),
            other => other.to_string(),
        };

        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, port)).await.map_err(|err| {
            TalkReportError::Network(format!("failed to bind OAuth loopback server: {err}"))
        })?;
        let local_addr = listener
            .local_addr()
            .map_err(|err| TalkReportError::Network(format!("failed to determine port: {err}")))?;

        let app = Router::new().route(&path, get(handle_callback)).with_state(mailbox);

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
            {
                error!("OAuth callback server error: {}", err);
            }
        });

        info!(addr = %local_addr, %path, "OAuth callback server listening");
        Ok(Self { local_addr, path, shutdown_tx: Some(shutdown_tx), handle: Some(handle) })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Redirect URI that reaches this server.
    pub fn redirect_uri(&self) -> String {
        format!("http://localhost:{}{}", self.local_addr.port(), self.path)
    }

    /// Shut down the loopback server gracefully.
    ///
    /// # Errors
    /// Returns `Internal` if the server task panicked.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                if err.is_panic() {
                    return Err(TalkReportError::Internal(format!(
                        "OAuth callback server panicked: {err}"
                    )));
                }
            }
        }

        Ok(())
    }
}

impl Drop for KakaoCallbackServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if !handle.is_finished() {
                handle.abort();
            }
        }
    }
}

/// Map the redirect query onto a mailbox message.
fn parse_callback(mut params: HashMap<String, String>) -> Option<CallbackMessage> {
    let state = params.remove("state");
    if let Some(code) = params.remove("code") {
        return Some(CallbackMessage::AuthCode { code, state });
    }
    params.remove("error").map(|error| CallbackMessage::AuthError {
        error,
        description: params.remove("error_description"),
        state,
    })
}

async fn handle_callback(
    State(mailbox): State<CallbackMailbox>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Html<&'static str>) {
    let Some(message) = parse_callback(params) else {
        debug!("Callback request without code or error");
        return (StatusCode::BAD_REQUEST, Html(BAD_REQUEST_PAGE));
    };

    let delivered = mailbox.post(message);
    debug!(listeners = delivered, "Forwarded OAuth callback");
    if delivered == 0 {
        (StatusCode::OK, Html(NO_LOGIN_PAGE))
    } else {
        (StatusCode::OK, Html(CLOSE_WINDOW_PAGE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    #[test]
    fn code_wins_over_error() {
        let message = parse_callback(params(&[("code", "c1"), ("state", "s1"), ("error", "x")]));
        assert_eq!(
            message,
            Some(CallbackMessage::AuthCode { code: "c1".into(), state: Some("s1".into()) })
        );
    }

    #[test]
    fn error_carries_description() {
        let message = parse_callback(params(&[
            ("error", "access_denied"),
            ("error_description", "User denied access"),
        ]));
        assert_eq!(
            message,
            Some(CallbackMessage::AuthError {
                error: "access_denied".into(),
                description: Some("User denied access".into()),
                state: None,
            })
        );
    }

    #[test]
    fn empty_query_is_ignored() {
        assert_eq!(parse_callback(HashMap::new()), None);
    }

    #[tokio::test]
    async fn forwards_code_to_pending_listener() {
        let mailbox = CallbackMailbox::new();
        let mut listener = mailbox.listen();
        let server = KakaoCallbackServer::start("http://localhost:0/kakao-callback", mailbox)
            .await
            .unwrap();

        let url = format!(
            "http://{}/kakao-callback?code=abc&state=xyz",
            server.local_addr()
        );
        let response = reqwest::Client::builder().no_proxy().build().unwrap().get(url).send().await.unwrap();
        assert_eq!(response.status(), 200);
        assert!(response.text().await.unwrap().contains("close this window"));

        assert_eq!(
            listener.recv().await,
            Some(CallbackMessage::AuthCode { code: "abc".into(), state: Some("xyz".into()) })
        );
        assert!(server.redirect_uri().ends_with("/kakao-callback"));
        server.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn answers_without_pending_login() {
        let server =
            KakaoCallbackServer::start("http://localhost:0/kakao-callback", CallbackMailbox::new())
                .await
                .unwrap();
        let client = reqwest::Client::builder().no_proxy().build().unwrap();

        let url = format!("http://{}/kakao-callback?code=abc", server.local_addr());
        let body = client.get(url).send().await.unwrap().text().await.unwrap();
        assert!(body.contains("No login is waiting"));

        let url = format!("http://{}/kakao-callback", server.local_addr());
        assert_eq!(client.get(url).send().await.unwrap().status(), 400);
    }

    #[tokio::test]
    async fn rejects_unparsable_redirect_uri() {
        let result = KakaoCallbackServer::start("not a url", CallbackMailbox::new()).await;
        assert!(matches!(result, Err(TalkReportError::Config(_))));
    }
}
