//! Error types for trap-ingest.
//!
//! Configuration problems are collected into [`ConfigErrors`] so that a
//! single validation pass reports every violated constraint at once.
//! All errors are `#[non_exhaustive]` to allow adding new variants without
//! breaking changes.

use std::net::SocketAddr;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// A single configuration violation.
///
/// One variant per validation rule, so tests can assert on the exact
/// failure rather than matching message substrings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// `listen_address` is empty.
    EmptyListenAddress,
    /// `listen_address` does not parse as `scheme://host:port`.
    InvalidListenAddress { address: String },
    /// `listen_address` scheme is outside the allowed set.
    BadScheme,
    /// `version` is empty.
    EmptyVersion,
    /// `version` is not v1, v2c, or v3.
    BadVersion,
    /// `user` is empty on a v3 config.
    EmptyUser,
    /// `security_level` is empty on a v3 config.
    EmptySecurityLevel,
    /// `security_level` is not a known level.
    BadSecurityLevel,
    /// `auth_type` is empty at auth_no_priv or auth_priv.
    EmptyAuthType,
    /// `auth_type` is not a known authentication protocol.
    BadAuthType,
    /// `auth_password` is empty at auth_no_priv or auth_priv.
    EmptyAuthPassword,
    /// `privacy_type` is empty at auth_priv.
    EmptyPrivacyType,
    /// `privacy_type` is not a known privacy protocol.
    BadPrivacyType,
    /// `privacy_password` is empty at auth_priv.
    EmptyPrivacyPassword,
    /// A descriptor's column or scalar OID is not dotted-numeric.
    InvalidDescriptorOid { name: String, oid: String },
    /// An indexed_value_prefix descriptor has no column-OID resource
    /// attribute to establish its index set, so it can never resolve.
    UnresolvablePrefix { name: String },
    /// An attribute binding names an attribute that is not configured.
    UnknownAttribute { name: String },
    /// An attribute binding's value is not one of the enum values.
    ValueNotInEnum { name: String, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyListenAddress => write!(f, "listen_address must be specified"),
            Self::InvalidListenAddress { address } => write!(
                f,
                "invalid listen_address '{}': must be in '[scheme]://[host]:[port]' format",
                address
            ),
            Self::BadScheme => write!(
                f,
                "listen_address scheme must be either tcp, tcp4, tcp6, udp, udp4, or udp6"
            ),
            Self::EmptyVersion => write!(f, "version must be specified"),
            Self::BadVersion => write!(f, "version must be either v1, v2c, or v3"),
            Self::EmptyUser => write!(f, "user must be specified when version is v3"),
            Self::EmptySecurityLevel => {
                write!(f, "security_level must be specified when version is v3")
            }
            Self::BadSecurityLevel => write!(
                f,
                "security_level must be either no_auth_no_priv, auth_no_priv, or auth_priv"
            ),
            Self::EmptyAuthType => write!(
                f,
                "auth_type must be specified when security_level is auth_no_priv or auth_priv"
            ),
            Self::BadAuthType => write!(
                f,
                "auth_type must be either MD5, SHA, SHA224, SHA256, SHA384, or SHA512"
            ),
            Self::EmptyAuthPassword => write!(
                f,
                "auth_password must be specified when security_level is auth_no_priv or auth_priv"
            ),
            Self::EmptyPrivacyType => write!(
                f,
                "privacy_type must be specified when security_level is auth_priv"
            ),
            Self::BadPrivacyType => write!(
                f,
                "privacy_type must be either DES, AES, AES192, AES192C, AES256, or AES256C"
            ),
            Self::EmptyPrivacyPassword => write!(
                f,
                "privacy_password must be specified when security_level is auth_priv"
            ),
            Self::InvalidDescriptorOid { name, oid } => {
                write!(f, "attribute '{}' has invalid OID '{}'", name, oid)
            }
            Self::UnresolvablePrefix { name } => write!(
                f,
                "attribute '{}' uses indexed_value_prefix but no column-OID resource attribute establishes an index",
                name
            ),
            Self::UnknownAttribute { name } => {
                write!(f, "attribute binding '{}' does not match any configured attribute", name)
            }
            Self::ValueNotInEnum { name, value } => write!(
                f,
                "attribute binding '{}' value '{}' is not one of the attribute's enum values",
                name, value
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// A collection of configuration violations, reported together.
///
/// Validation accumulates every applicable error instead of stopping at the
/// first; `Display` joins them one per line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfigErrors {
    errors: Vec<ConfigError>,
}

impl ConfigErrors {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one violation.
    pub fn push(&mut self, error: ConfigError) {
        self.errors.push(error);
    }

    /// Add a violation if `result` carries one.
    pub fn extend(&mut self, result: std::result::Result<(), ConfigError>) {
        if let Err(e) = result {
            self.errors.push(e);
        }
    }

    /// The accumulated violations, in detection order.
    pub fn errors(&self) -> &[ConfigError] {
        &self.errors
    }

    /// Number of accumulated violations.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether no violation was recorded.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Check whether a specific violation was recorded.
    pub fn contains(&self, error: &ConfigError) -> bool {
        self.errors.contains(error)
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    pub fn into_result(self) -> std::result::Result<(), ConfigErrors> {
        if self.errors.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for ConfigErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", e)?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigErrors {}

impl From<ConfigError> for ConfigErrors {
    fn from(error: ConfigError) -> Self {
        Self { errors: vec![error] }
    }
}

impl FromIterator<ConfigError> for ConfigErrors {
    fn from_iter<I: IntoIterator<Item = ConfigError>>(iter: I) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

/// Failure to decode a single received packet into a trap PDU.
///
/// Decode errors are isolated per packet: the receiver logs them and keeps
/// running. They never escalate into a receiver-level [`Error`].
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct DecodeError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl DecodeError {
    /// Create a decode error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create a decode error wrapping an underlying cause.
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Library error type.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The configuration failed validation. Carries every violated
    /// constraint, not just the first.
    #[error("invalid configuration:\n{0}")]
    Config(#[from] ConfigErrors),

    /// I/O error while binding or using the listening socket.
    #[error("I/O error{}: {source}", target.map(|t| format!(" on {}", t)).unwrap_or_default())]
    Io {
        target: Option<SocketAddr>,
        #[source]
        source: std::io::Error,
    },

    /// The listen address scheme validated but is not a transport this
    /// receiver can bind (only UDP listeners are implemented).
    #[error("unsupported listen scheme '{scheme}': only udp, udp4, and udp6 listeners are implemented")]
    UnsupportedTransport { scheme: String },

    /// The receiver was shut down and cannot be restarted.
    #[error("receiver has been shut down and cannot be restarted")]
    ReceiverStopped,

    /// The downstream record sink rejected a batch of records.
    #[error("record sink error: {source}")]
    Sink {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl Error {
    /// Create an I/O error without a target address.
    pub fn io(source: std::io::Error) -> Self {
        Self::Io {
            target: None,
            source,
        }
    }

    /// Create an I/O error tagged with the socket address involved.
    pub fn io_at(target: SocketAddr, source: std::io::Error) -> Self {
        Self::Io {
            target: Some(target),
            source,
        }
    }

    /// Create a sink error from any consumer-side failure.
    pub fn sink(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Sink {
            source: Box::new(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_join_one_per_line() {
        let mut errs = ConfigErrors::new();
        errs.push(ConfigError::EmptyVersion);
        errs.push(ConfigError::EmptyUser);

        let text = errs.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("version"));
        assert!(lines[1].contains("user"));
    }

    #[test]
    fn test_config_errors_into_result() {
        assert!(ConfigErrors::new().into_result().is_ok());

        let errs: ConfigErrors = ConfigError::BadVersion.into();
        let err = errs.into_result().unwrap_err();
        assert_eq!(err.len(), 1);
        assert!(err.contains(&ConfigError::BadVersion));
    }

    #[test]
    fn test_decode_error_preserves_source() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "short read");
        let err = DecodeError::with_source("truncated varbind list", io);
        assert!(err.to_string().contains("truncated"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_error_display_mentions_every_violation() {
        let mut errs = ConfigErrors::new();
        errs.push(ConfigError::EmptyAuthPassword);
        errs.push(ConfigError::BadPrivacyType);

        let err = Error::from(errs);
        let text = err.to_string();
        assert!(text.contains("auth_password"));
        assert!(text.contains("privacy_type"));
    }
}
