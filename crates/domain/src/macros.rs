//! Macro for implementing Display and FromStr for status enums
//!
//! Status enums are stored as lowercase text in SQLite and echoed in CLI
//! output, so both directions go through one mapping.
//!
//! # Example
//!
//! ```rust
//! use talkreport_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum ExportFormat {
//!     Pdf,
//!     Png,
//! }
//!
//! impl_domain_status_conversions!(ExportFormat {
//!     Pdf => "pdf",
//!     Png => "png",
//! });
//!
//! assert_eq!(ExportFormat::Pdf.to_string(), "pdf");
//! assert_eq!("PNG".parse::<ExportFormat>().unwrap(), ExportFormat::Png);
//! ```

/// Implements Display and FromStr traits for status enums
///
/// Parsing is case-insensitive; display is always the mapped lowercase
/// string.
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Channel {
        Memo,
        Friend,
    }

    impl_domain_status_conversions!(Channel {
        Memo => "memo",
        Friend => "friend",
    });

    #[test]
    fn test_display_is_lowercase() {
        assert_eq!(Channel::Memo.to_string(), "memo");
        assert_eq!(Channel::Friend.to_string(), "friend");
    }

    #[test]
    fn test_fromstr_ignores_case() {
        assert_eq!(Channel::from_str("MEMO").unwrap(), Channel::Memo);
        assert_eq!(Channel::from_str("Friend").unwrap(), Channel::Friend);
    }

    #[test]
    fn test_fromstr_invalid() {
        let result = Channel::from_str("sms");
        assert!(result.unwrap_err().contains("Invalid Channel: sms"));
    }
}
