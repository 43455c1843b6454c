//! Client for Kakao's "send to me" memo endpoint.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use talkreport_core::{MessageSender, SendError, TextMessage};
use talkreport_domain::constants::KAKAO_MEMO_SEND_PATH;
use talkreport_domain::Result;
use tracing::{debug, warn};

use crate::http::HttpClient;

/// Kakao API error code for an invalid or expired access token.
const INVALID_TOKEN_CODE: i64 = -401;

#[derive(Serialize)]
struct TemplateLink<'a> {
    web_url: &'a str,
    mobile_web_url: &'a str,
}

#[derive(Serialize)]
struct TextTemplate<'a> {
    object_type: &'static str,
    text: &'a str,
    link: TemplateLink<'a>,
}

/// Body of both success (`result_code`) and error (`code`, `msg`) replies.
#[derive(Debug, Default, Deserialize)]
struct ApiReply {
    #[serde(default)]
    result_code: Option<i64>,
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    msg: Option<String>,
}

/// [`MessageSender`] over the Kakao REST API.
#[derive(Clone)]
pub struct KakaoTalkClient {
    http: HttpClient,
    send_url: String,
}

impl KakaoTalkClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_base_url: &str) -> Result<Self> {
        Ok(Self::with_http(HttpClient::new()?, api_base_url))
    }

    pub fn with_http(http: HttpClient, api_base_url: &str) -> Self {
        let send_url = format!("{}{KAKAO_MEMO_SEND_PATH}", api_base_url.trim_end_matches('/'));
        Self { http, send_url }
    }

    fn template_object(message: &TextMessage) -> std::result::Result<String, SendError> {
        let template = TextTemplate {
            object_type: "text",
            text: &message.text,
            link: TemplateLink { web_url: &message.link_url, mobile_web_url: &message.link_url },
        };
        serde_json::to_string(&template).map_err(|e| SendError::Transport(e.to_string()))
    }
}

#[async_trait]
impl MessageSender for KakaoTalkClient {
    async fn send_to_self(
        &self,
        access_token: &str,
        message: &TextMessage,
    ) -> std::result::Result<(), SendError> {
        let template = Self::template_object(message)?;
        let request = self
            .http
            .request(Method::POST, &self.send_url)
            .bearer_auth(access_token)
            .form(&[("template_object", template.as_str())]);

        let response =
            self.http.send(request).await.map_err(|e| SendError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| SendError::Transport(e.to_string()))?;
        let reply: ApiReply = serde_json::from_str(&body).unwrap_or_default();

        if status == StatusCode::UNAUTHORIZED || reply.code == Some(INVALID_TOKEN_CODE) {
            warn!(status = status.as_u16(), "Memo send rejected the access token");
            return Err(SendError::Unauthorized { body });
        }
        if !status.is_success() {
            warn!(status = status.as_u16(), msg = ?reply.msg, "Memo send failed");
            return Err(SendError::Rejected { status: status.as_u16(), body });
        }
        if let Some(code) = reply.result_code.filter(|code| *code != 0) {
            warn!(result_code = code, "Memo send returned a non-zero result code");
            return Err(SendError::Rejected { status: status.as_u16(), body });
        }

        debug!("Memo delivered");
        Ok(())
    }
}
