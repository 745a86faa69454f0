//! SNMPv3 security configuration types.
//!
//! This module holds the credential *configuration* vocabulary of the
//! User-based Security Model (RFC 3414, RFC 7860): security levels and the
//! authentication/privacy protocol identifiers. Key derivation and the
//! cryptographic operations themselves live in the wire-protocol decoding
//! collaborator, not in this crate.

/// SNMPv3 security level.
///
/// Required credential fields escalate strictly with the level:
/// `NoAuthNoPriv` needs only a user, `AuthNoPriv` adds the auth type and
/// password, `AuthPriv` adds the privacy type and password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Default)]
pub enum SecurityLevel {
    /// No authentication, no privacy.
    #[default]
    NoAuthNoPriv,
    /// Authentication, no privacy.
    AuthNoPriv,
    /// Authentication and privacy.
    AuthPriv,
}

impl SecurityLevel {
    /// Whether this level requires authentication credentials.
    pub const fn requires_auth(self) -> bool {
        matches!(self, Self::AuthNoPriv | Self::AuthPriv)
    }

    /// Whether this level requires privacy credentials.
    pub const fn requires_privacy(self) -> bool {
        matches!(self, Self::AuthPriv)
    }
}

impl std::fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoAuthNoPriv => write!(f, "no_auth_no_priv"),
            Self::AuthNoPriv => write!(f, "auth_no_priv"),
            Self::AuthPriv => write!(f, "auth_priv"),
        }
    }
}

impl std::str::FromStr for SecurityLevel {
    type Err = ParseProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NO_AUTH_NO_PRIV" => Ok(Self::NoAuthNoPriv),
            "AUTH_NO_PRIV" => Ok(Self::AuthNoPriv),
            "AUTH_PRIV" => Ok(Self::AuthPriv),
            _ => Err(ParseProtocolError {
                input: s.to_string(),
                kind: ProtocolKind::Level,
            }),
        }
    }
}

/// Error returned when parsing a security level or protocol name fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseProtocolError {
    input: String,
    kind: ProtocolKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProtocolKind {
    Level,
    Auth,
    Priv,
}

impl std::fmt::Display for ParseProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            ProtocolKind::Level => write!(
                f,
                "unknown security level '{}'; expected one of: no_auth_no_priv, auth_no_priv, auth_priv",
                self.input
            ),
            ProtocolKind::Auth => write!(
                f,
                "unknown authentication protocol '{}'; expected one of: MD5, SHA, SHA224, SHA256, SHA384, SHA512",
                self.input
            ),
            ProtocolKind::Priv => write!(
                f,
                "unknown privacy protocol '{}'; expected one of: DES, AES, AES192, AES192C, AES256, AES256C",
                self.input
            ),
        }
    }
}

impl std::error::Error for ParseProtocolError {}

/// Authentication protocol identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthProtocol {
    /// HMAC-MD5-96 (RFC 3414)
    Md5,
    /// HMAC-SHA-96 (RFC 3414)
    Sha1,
    /// HMAC-SHA-224 (RFC 7860)
    Sha224,
    /// HMAC-SHA-256 (RFC 7860)
    Sha256,
    /// HMAC-SHA-384 (RFC 7860)
    Sha384,
    /// HMAC-SHA-512 (RFC 7860)
    Sha512,
}

impl std::fmt::Display for AuthProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Md5 => write!(f, "MD5"),
            Self::Sha1 => write!(f, "SHA"),
            Self::Sha224 => write!(f, "SHA224"),
            Self::Sha256 => write!(f, "SHA256"),
            Self::Sha384 => write!(f, "SHA384"),
            Self::Sha512 => write!(f, "SHA512"),
        }
    }
}

impl std::str::FromStr for AuthProtocol {
    type Err = ParseProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MD5" => Ok(Self::Md5),
            "SHA" | "SHA1" | "SHA-1" => Ok(Self::Sha1),
            "SHA224" | "SHA-224" => Ok(Self::Sha224),
            "SHA256" | "SHA-256" => Ok(Self::Sha256),
            "SHA384" | "SHA-384" => Ok(Self::Sha384),
            "SHA512" | "SHA-512" => Ok(Self::Sha512),
            _ => Err(ParseProtocolError {
                input: s.to_string(),
                kind: ProtocolKind::Auth,
            }),
        }
    }
}

/// Privacy protocol identifiers.
///
/// The `C` suffixed AES variants use the Blumenthal key extension common on
/// Cisco equipment; the plain variants use Reeder-style extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrivProtocol {
    /// DES-CBC (RFC 3414)
    Des,
    /// AES-128-CFB (RFC 3826)
    Aes,
    /// AES-192-CFB, Reeder key extension
    Aes192,
    /// AES-192-CFB, Blumenthal key extension
    Aes192c,
    /// AES-256-CFB, Reeder key extension
    Aes256,
    /// AES-256-CFB, Blumenthal key extension
    Aes256c,
}

impl std::fmt::Display for PrivProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Des => write!(f, "DES"),
            Self::Aes => write!(f, "AES"),
            Self::Aes192 => write!(f, "AES192"),
            Self::Aes192c => write!(f, "AES192C"),
            Self::Aes256 => write!(f, "AES256"),
            Self::Aes256c => write!(f, "AES256C"),
        }
    }
}

impl std::str::FromStr for PrivProtocol {
    type Err = ParseProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DES" => Ok(Self::Des),
            "AES" | "AES128" | "AES-128" => Ok(Self::Aes),
            "AES192" | "AES-192" => Ok(Self::Aes192),
            "AES192C" => Ok(Self::Aes192c),
            "AES256" | "AES-256" => Ok(Self::Aes256),
            "AES256C" => Ok(Self::Aes256c),
            _ => Err(ParseProtocolError {
                input: s.to_string(),
                kind: ProtocolKind::Priv,
            }),
        }
    }
}
