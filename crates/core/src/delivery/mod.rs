//! Report delivery through the authenticated chat channel.

pub mod digest;
pub mod ports;
pub mod service;

pub use digest::{build_digest, TextMessage};
pub use ports::{AccessTokenSource, DeliveryHistory, MessageSender, SendError};
pub use service::DeliveryService;
