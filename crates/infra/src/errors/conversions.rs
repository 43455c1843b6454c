//! Conversions from external infrastructure errors into domain errors.

use image::ImageError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;
use talkreport_common::auth::{
    CredentialStoreError, LoginError, OAuthClientError, TokenManagerError,
};
use talkreport_domain::TalkReportError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub TalkReportError);

impl From<InfraError> for TalkReportError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<TalkReportError> for InfraError {
    fn from(value: TalkReportError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoTalkReportError {
    fn into_talkreport(self) -> TalkReportError;
}

macro_rules! infra_from {
    ($($source:ty),+ $(,)?) => {
        $(
            impl From<$source> for InfraError {
                fn from(value: $source) -> Self {
                    InfraError(value.into_talkreport())
                }
            }
        )+
    };
}

infra_from!(
    SqlError,
    HttpError,
    ImageError,
    OAuthClientError,
    TokenManagerError,
    CredentialStoreError,
    LoginError,
);

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → TalkReportError */
/* -------------------------------------------------------------------------- */

impl IntoTalkReportError for SqlError {
    fn into_talkreport(self) -> TalkReportError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        TalkReportError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        TalkReportError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 1555 | 2067) => {
                        TalkReportError::Database("unique constraint violation".into())
                    }
                    (ErrorCode::NotADatabase, _) => TalkReportError::Database(
                        "file is not a TalkReport database".into(),
                    ),
                    _ => TalkReportError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => TalkReportError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                TalkReportError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                TalkReportError::Database(format!("invalid column type: {ty}"))
            }
            RE::InvalidPath(path) => TalkReportError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => TalkReportError::Database(other.to_string()),
        }
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → TalkReportError */
/* -------------------------------------------------------------------------- */

impl IntoTalkReportError for HttpError {
    fn into_talkreport(self) -> TalkReportError {
        if self.is_timeout() {
            return TalkReportError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return TalkReportError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => TalkReportError::Auth(message),
                404 => TalkReportError::NotFound(message),
                400..=499 => TalkReportError::InvalidInput(message),
                _ => TalkReportError::Network(message),
            };
        }

        TalkReportError::Network(self.to_string())
    }
}

/* -------------------------------------------------------------------------- */
/* image::ImageError → TalkReportError */
/* -------------------------------------------------------------------------- */

impl IntoTalkReportError for ImageError {
    fn into_talkreport(self) -> TalkReportError {
        match self {
            ImageError::IoError(err) if err.kind() == std::io::ErrorKind::NotFound => {
                TalkReportError::NotFound(format!("rendered surface missing: {err}"))
            }
            other => TalkReportError::Export(format!("image codec failure: {other}")),
        }
    }
}

/* -------------------------------------------------------------------------- */
/* auth errors → TalkReportError */
/* -------------------------------------------------------------------------- */

impl IntoTalkReportError for OAuthClientError {
    fn into_talkreport(self) -> TalkReportError {
        match self {
            OAuthClientError::RequestFailed(err) => err.into_talkreport(),
            OAuthClientError::NoRefreshToken => {
                TalkReportError::Auth("no refresh token available".into())
            }
            other => TalkReportError::Auth(other.to_string()),
        }
    }
}

impl IntoTalkReportError for CredentialStoreError {
    fn into_talkreport(self) -> TalkReportError {
        TalkReportError::Credentials(self.to_string())
    }
}

impl IntoTalkReportError for TokenManagerError {
    fn into_talkreport(self) -> TalkReportError {
        match self {
            TokenManagerError::Store(err) => err.into_talkreport(),
        }
    }
}

impl IntoTalkReportError for LoginError {
    fn into_talkreport(self) -> TalkReportError {
        TalkReportError::Auth(self.to_string())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use reqwest::{Client, StatusCode};
    use rusqlite::ffi::{Error as FfiError, ErrorCode};
    use tokio::runtime::Runtime;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn sqlite_busy_maps_to_database_error() {
        let err = SqlError::SqliteFailure(
            FfiError { code: ErrorCode::DatabaseBusy, extended_code: 5 },
            Some("database is locked".into()),
        );

        let mapped: TalkReportError = InfraError::from(err).into();
        match mapped {
            TalkReportError::Database(msg) => {
                assert!(msg.contains("busy") || msg.contains("locked"));
            }
            other => panic!("expected database error, got {:?}", other),
        }
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        let mapped: TalkReportError = InfraError::from(SqlError::QueryReturnedNoRows).into();
        assert!(matches!(mapped, TalkReportError::NotFound(_)));
    }

    #[test]
    fn http_status_401_maps_to_auth_error() {
        Runtime::new().unwrap().block_on(async {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(StatusCode::UNAUTHORIZED))
                .mount(&server)
                .await;

            let client = Client::builder().no_proxy().build().unwrap();
            let error =
                client.get(server.uri()).send().await.unwrap().error_for_status().unwrap_err();

            let mapped: TalkReportError = InfraError::from(error).into();
            match mapped {
                TalkReportError::Auth(msg) => assert!(msg.contains("401")),
                other => panic!("expected auth error, got {:?}", other),
            }
        });
    }

    #[test]
    fn login_errors_surface_as_auth() {
        let mapped: TalkReportError = InfraError::from(LoginError::PopupBlocked).into();
        assert_eq!(mapped.user_message(), "Please log in to KakaoTalk again.");
        assert!(matches!(mapped, TalkReportError::Auth(msg) if msg.contains("blocked")));
    }

    #[test]
    fn store_failures_surface_as_credentials() {
        let err = TokenManagerError::Store(CredentialStoreError::Backend("locked".into()));
        let mapped: TalkReportError = InfraError::from(err).into();
        assert!(matches!(mapped, TalkReportError::Credentials(msg) if msg.contains("locked")));
    }

    #[test]
    fn missing_image_file_is_not_found() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "report-1.png");
        let mapped: TalkReportError = InfraError::from(ImageError::IoError(io)).into();
        assert!(matches!(mapped, TalkReportError::NotFound(_)));
    }
}
