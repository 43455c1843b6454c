//! KakaoTalk integration: OAuth wiring, the loopback callback page, the
//! consent window, and the "send to me" memo endpoint.

mod callback_server;
mod consent_window;
mod oauth;
mod talk_client;

pub use callback_server::KakaoCallbackServer;
pub use consent_window::BrowserConsentWindow;
pub use oauth::{flow_settings, oauth_config};
pub use talk_client::KakaoTalkClient;
