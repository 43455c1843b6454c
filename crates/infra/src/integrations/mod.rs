//! External service integrations

pub mod kakao;
