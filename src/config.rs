//! Receiver configuration: connection parameters, v3 security parameters,
//! and the declarative OID-to-attribute maps the correlation engine compiles.
//!
//! The host loads a [`Config`] through serde, runs it through
//! [`Config::normalized`] to fill in the default scheme and port, and then
//! [`Config::validate`] enforces the version- and security-level-dependent
//! field requirements. Validation collects every violation instead of
//! stopping at the first one, so an operator sees the full list at startup.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{ConfigError, ConfigErrors};
use crate::oid::Oid;
use crate::v3::{AuthProtocol, PrivProtocol, SecurityLevel};
use crate::version::Version;

/// Default listen address when none is configured.
pub const DEFAULT_LISTEN_ADDRESS: &str = "udp://localhost:162";
/// Default SNMP version.
pub const DEFAULT_VERSION: &str = "v2c";
/// Default community string for v1/v2c.
pub const DEFAULT_COMMUNITY: &str = "public";
/// Default v3 security level.
pub const DEFAULT_SECURITY_LEVEL: &str = "no_auth_no_priv";
/// Default v3 authentication protocol.
pub const DEFAULT_AUTH_TYPE: &str = "MD5";
/// Default v3 privacy protocol.
pub const DEFAULT_PRIVACY_TYPE: &str = "DES";
/// Default graceful-close wait during shutdown.
pub const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_secs(5);
/// Default maximum datagram size accepted by the listener.
pub const DEFAULT_MAX_PACKET_SIZE: usize = 65535;

/// A secret string that never appears in logs.
///
/// `Debug` and `Display` render `[redacted]`; the backing memory is zeroized
/// on drop.
#[derive(Clone, PartialEq, Eq, Default, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct Opaque(String);

impl Opaque {
    /// Create a secret from a string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the secret value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Opaque {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Debug for Opaque {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[redacted]")
    }
}

impl std::fmt::Display for Opaque {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[redacted]")
    }
}

/// Source of a resource-identifying attribute: exactly one of a column OID,
/// a scalar OID, or an indexed value prefix.
///
/// Deserialization enforces the exactly-one invariant: a descriptor with
/// zero or several source keys is rejected.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceAttributeSource {
    /// Column OID: one value per trailing index, one resource per index.
    Oid(String),
    /// Scalar OID: a single value for the single implicit resource.
    ScalarOid(String),
    /// Synthetic value built as `prefix + "." + index` over the index set
    /// established by column-OID resource attributes.
    IndexedValuePrefix(String),
}

/// Declarative description of one resource-identifying attribute.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResourceAttributeConfig {
    /// Optional human-readable description.
    #[serde(default)]
    pub description: Option<String>,
    /// Where the attribute value comes from.
    #[serde(flatten)]
    pub source: ResourceAttributeSource,
}

/// Source of a record attribute: exactly one of an enumerated value set, a
/// column OID, or an indexed value prefix.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeSource {
    /// Fixed set of allowed values; a record picks one via an
    /// [`AttributeBinding`].
    Enum(Vec<String>),
    /// Column OID: index-correlated values attached to the matching resource.
    Oid(String),
    /// Synthetic `prefix + "." + index` value per indexed resource.
    IndexedValuePrefix(String),
}

/// Declarative description of one record attribute.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AttributeConfig {
    /// Optional output key override; the attribute name is used when absent.
    #[serde(default)]
    pub value: Option<String>,
    /// Optional human-readable description.
    #[serde(default)]
    pub description: Option<String>,
    /// Where the attribute value comes from.
    #[serde(flatten)]
    pub source: AttributeSource,
}

/// Binds a named enum-typed attribute to one of its allowed values for the
/// records this receiver emits.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AttributeBinding {
    /// Key of the [`AttributeConfig`] this binding refers to.
    pub name: String,
    /// The chosen value; must be one of the attribute's enum values.
    #[serde(default)]
    pub value: String,
}

/// Receiver configuration.
///
/// String-typed enumeration fields (`version`, `security_level`,
/// `auth_type`, `privacy_type`) are validated case-insensitively and keep
/// their original spelling.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Host and port to listen on, as `[scheme]://[host]:[port]`.
    /// A missing scheme defaults to `udp`, a missing port to `162`.
    pub listen_address: String,
    /// SNMP version for this listener: `v1`, `v2c`, or `v3`.
    pub version: String,
    /// Community string (v1/v2c only).
    pub community: String,
    /// USM user (v3 only).
    pub user: String,
    /// v3 security level: `no_auth_no_priv`, `auth_no_priv`, or `auth_priv`.
    pub security_level: String,
    /// v3 authentication protocol; required above `no_auth_no_priv`.
    pub auth_type: String,
    /// v3 authentication password; required above `no_auth_no_priv`.
    pub auth_password: Opaque,
    /// v3 privacy protocol; required at `auth_priv`.
    pub privacy_type: String,
    /// v3 privacy password; required at `auth_priv`.
    pub privacy_password: Opaque,
    /// Maximum time shutdown waits for the listener and in-flight traps to
    /// drain before forcing closure.
    #[serde(with = "humantime_serde")]
    pub listener_close_timeout: Duration,
    /// Receive buffer length per datagram.
    pub max_packet_size: usize,
    /// Optional socket receive buffer size (kernel may cap it).
    pub recv_buffer_size: Option<usize>,
    /// Resource-identifying attribute descriptors, keyed by attribute name.
    pub resource_attributes: BTreeMap<String, ResourceAttributeConfig>,
    /// Record attribute descriptors, keyed by attribute name.
    pub attributes: BTreeMap<String, AttributeConfig>,
    /// Enum attribute selections for emitted records.
    pub attribute_bindings: Vec<AttributeBinding>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_address: DEFAULT_LISTEN_ADDRESS.to_string(),
            version: DEFAULT_VERSION.to_string(),
            community: DEFAULT_COMMUNITY.to_string(),
            user: String::new(),
            security_level: DEFAULT_SECURITY_LEVEL.to_string(),
            auth_type: DEFAULT_AUTH_TYPE.to_string(),
            auth_password: Opaque::default(),
            privacy_type: DEFAULT_PRIVACY_TYPE.to_string(),
            privacy_password: Opaque::default(),
            listener_close_timeout: DEFAULT_CLOSE_TIMEOUT,
            max_packet_size: DEFAULT_MAX_PACKET_SIZE,
            recv_buffer_size: None,
            resource_attributes: BTreeMap::new(),
            attributes: BTreeMap::new(),
            attribute_bindings: Vec::new(),
        }
    }
}

impl Config {
    /// Apply listen-address normalization, returning the updated config.
    ///
    /// Runs before [`validate`](Self::validate) in the receiver constructor;
    /// kept separate so validation can be exercised on raw input.
    pub fn normalized(mut self) -> Self {
        self.listen_address = normalize_listen_address(&self.listen_address);
        self
    }

    /// Validate the configuration, collecting every violated constraint.
    ///
    /// Never mutates the config. Security rules only apply when `version`
    /// is v3; which credential fields are required then depends on
    /// `security_level`.
    pub fn validate(&self) -> Result<(), ConfigErrors> {
        let mut errs = ConfigErrors::new();

        errs.extend(validate_listen_address(&self.listen_address));
        errs.extend(validate_version(&self.version));
        if self.version.eq_ignore_ascii_case(Version::V3.as_str()) {
            self.validate_security(&mut errs);
        }
        self.validate_correlation(&mut errs);

        errs.into_result()
    }

    /// Validate the v3 security block.
    ///
    /// A missing security level short-circuits the auth/privacy checks:
    /// without a level those checks have no defined meaning.
    fn validate_security(&self, errs: &mut ConfigErrors) {
        if self.user.is_empty() {
            errs.push(ConfigError::EmptyUser);
        }

        if self.security_level.is_empty() {
            errs.push(ConfigError::EmptySecurityLevel);
            return;
        }

        match self.security_level.parse::<SecurityLevel>() {
            Ok(SecurityLevel::NoAuthNoPriv) => {}
            Ok(SecurityLevel::AuthNoPriv) => self.validate_auth(errs),
            Ok(SecurityLevel::AuthPriv) => {
                self.validate_auth(errs);
                self.validate_privacy(errs);
            }
            Err(_) => errs.push(ConfigError::BadSecurityLevel),
        }
    }

    fn validate_auth(&self, errs: &mut ConfigErrors) {
        if self.auth_password.is_empty() {
            errs.push(ConfigError::EmptyAuthPassword);
        }

        if self.auth_type.is_empty() {
            errs.push(ConfigError::EmptyAuthType);
            return;
        }
        if self.auth_type.parse::<AuthProtocol>().is_err() {
            errs.push(ConfigError::BadAuthType);
        }
    }

    fn validate_privacy(&self, errs: &mut ConfigErrors) {
        if self.privacy_password.is_empty() {
            errs.push(ConfigError::EmptyPrivacyPassword);
        }

        if self.privacy_type.is_empty() {
            errs.push(ConfigError::EmptyPrivacyType);
            return;
        }
        if self.privacy_type.parse::<PrivProtocol>().is_err() {
            errs.push(ConfigError::BadPrivacyType);
        }
    }

    /// Validate the declarative correlation maps: descriptor OIDs must
    /// parse, prefix descriptors need an index source, and bindings must
    /// refer to configured enum values.
    fn validate_correlation(&self, errs: &mut ConfigErrors) {
        let has_index_source = self
            .resource_attributes
            .values()
            .any(|ra| matches!(ra.source, ResourceAttributeSource::Oid(_)));

        for (name, ra) in &self.resource_attributes {
            match &ra.source {
                ResourceAttributeSource::Oid(oid) | ResourceAttributeSource::ScalarOid(oid) => {
                    if Oid::parse(oid).is_err() {
                        errs.push(ConfigError::InvalidDescriptorOid {
                            name: name.clone(),
                            oid: oid.clone(),
                        });
                    }
                }
                ResourceAttributeSource::IndexedValuePrefix(_) => {
                    if !has_index_source {
                        errs.push(ConfigError::UnresolvablePrefix { name: name.clone() });
                    }
                }
            }
        }

        for (name, attr) in &self.attributes {
            match &attr.source {
                AttributeSource::Oid(oid) => {
                    if Oid::parse(oid).is_err() {
                        errs.push(ConfigError::InvalidDescriptorOid {
                            name: name.clone(),
                            oid: oid.clone(),
                        });
                    }
                }
                AttributeSource::IndexedValuePrefix(_) => {
                    if !has_index_source {
                        errs.push(ConfigError::UnresolvablePrefix { name: name.clone() });
                    }
                }
                AttributeSource::Enum(_) => {}
            }
        }

        for binding in &self.attribute_bindings {
            match self.attributes.get(&binding.name) {
                None => errs.push(ConfigError::UnknownAttribute {
                    name: binding.name.clone(),
                }),
                Some(attr) => {
                    if let AttributeSource::Enum(values) = &attr.source
                        && !values.contains(&binding.value)
                    {
                        errs.push(ConfigError::ValueNotInEnum {
                            name: binding.name.clone(),
                            value: binding.value.clone(),
                        });
                    }
                }
            }
        }
    }
}

/// Transport scheme of a listen address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportScheme {
    Udp,
    Udp4,
    Udp6,
    Tcp,
    Tcp4,
    Tcp6,
}

impl TransportScheme {
    /// Whether this is a datagram scheme.
    pub const fn is_udp(self) -> bool {
        matches!(self, Self::Udp | Self::Udp4 | Self::Udp6)
    }

    /// The configuration spelling of this scheme.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Udp => "udp",
            Self::Udp4 => "udp4",
            Self::Udp6 => "udp6",
            Self::Tcp => "tcp",
            Self::Tcp4 => "tcp4",
            Self::Tcp6 => "tcp6",
        }
    }
}

impl std::str::FromStr for TransportScheme {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "udp" => Ok(Self::Udp),
            "udp4" => Ok(Self::Udp4),
            "udp6" => Ok(Self::Udp6),
            "tcp" => Ok(Self::Tcp),
            "tcp4" => Ok(Self::Tcp4),
            "tcp6" => Ok(Self::Tcp6),
            _ => Err(()),
        }
    }
}

/// A fully parsed `scheme://host:port` listen address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenAddress {
    /// Transport scheme.
    pub scheme: TransportScheme,
    /// Host name or IP literal (brackets stripped for IPv6).
    pub host: String,
    /// Port number.
    pub port: u16,
}

/// Reason a listen address failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenAddressError {
    /// Not in `scheme://host:port` shape, or host/port missing or invalid.
    Malformed,
    /// Parsed, but the scheme is outside the allowed set.
    BadScheme,
}

impl ListenAddress {
    /// Parse a normalized listen address.
    ///
    /// Requires an explicit scheme, a non-empty host, and a numeric port.
    /// IPv6 hosts use bracket notation (`udp://[::1]:162`).
    pub fn parse(s: &str) -> Result<Self, ListenAddressError> {
        let (scheme_str, rest) = s.split_once("://").ok_or(ListenAddressError::Malformed)?;

        let (host, port_str) = split_host_port(rest).map_err(|_| ListenAddressError::Malformed)?;
        if host.is_empty() {
            return Err(ListenAddressError::Malformed);
        }
        let port: u16 = port_str
            .ok_or(ListenAddressError::Malformed)?
            .parse()
            .map_err(|_| ListenAddressError::Malformed)?;

        let scheme = scheme_str
            .parse::<TransportScheme>()
            .map_err(|_| ListenAddressError::BadScheme)?;

        Ok(Self {
            scheme,
            host: host.to_string(),
            port,
        })
    }

    /// The `host:port` pair in the form `ToSocketAddrs` accepts.
    pub fn authority(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

struct MalformedHostPort;

/// Split the authority part of an address into host and optional port.
///
/// A bare trailing colon counts as "no port" so normalization can complete
/// it; a host containing stray colons (unbracketed IPv6, `a:a:a:a`) is
/// malformed.
fn split_host_port(rest: &str) -> Result<(&str, Option<&str>), MalformedHostPort> {
    if let Some(after_bracket) = rest.strip_prefix('[') {
        let end = after_bracket.find(']').ok_or(MalformedHostPort)?;
        let host = &after_bracket[..end];
        let after = &after_bracket[end + 1..];
        return match after.strip_prefix(':') {
            None if after.is_empty() => Ok((host, None)),
            None => Err(MalformedHostPort),
            Some("") => Ok((host, None)),
            Some(port) => Ok((host, Some(port))),
        };
    }

    match rest.rfind(':') {
        None => Ok((rest, None)),
        Some(i) => {
            let host = &rest[..i];
            let port = &rest[i + 1..];
            if host.contains(':') {
                return Err(MalformedHostPort);
            }
            if port.is_empty() {
                Ok((host, None))
            } else {
                Ok((host, Some(port)))
            }
        }
    }
}

/// Fill in the default scheme and port of a listen address.
///
/// Never fails: a missing `://` gets a `udp://` prefix, a parseable address
/// without a port gets `:162` appended (just `162` after a bare trailing
/// colon), and anything malformed is returned as-is so validation can report
/// it.
pub fn normalize_listen_address(address: &str) -> String {
    let mut addr = if address.contains("://") {
        address.to_string()
    } else {
        format!("udp://{}", address)
    };

    let Some((_scheme, rest)) = addr.split_once("://") else {
        return addr;
    };
    if let Ok((_host, None)) = split_host_port(rest) {
        if !addr.ends_with(':') {
            addr.push(':');
        }
        addr.push_str("162");
    }

    addr
}

fn validate_listen_address(address: &str) -> Result<(), ConfigError> {
    if address.is_empty() {
        return Err(ConfigError::EmptyListenAddress);
    }

    match ListenAddress::parse(address) {
        Ok(_) => Ok(()),
        Err(ListenAddressError::BadScheme) => Err(ConfigError::BadScheme),
        Err(ListenAddressError::Malformed) => Err(ConfigError::InvalidListenAddress {
            address: address.to_string(),
        }),
    }
}

fn validate_version(version: &str) -> Result<(), ConfigError> {
    if version.is_empty() {
        return Err(ConfigError::EmptyVersion);
    }
    if version.parse::<Version>().is_err() {
        return Err(ConfigError::BadVersion);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v3_config(security_level: &str) -> Config {
        Config {
            version: "v3".to_string(),
            user: "u".to_string(),
            security_level: security_level.to_string(),
            auth_type: String::new(),
            privacy_type: String::new(),
            ..Config::default()
        }
    }

    // ========================================================================
    // Normalization
    // ========================================================================

    #[test]
    fn test_normalize_adds_scheme_and_port() {
        assert_eq!(normalize_listen_address("localhost"), "udp://localhost:162");
    }

    #[test]
    fn test_normalize_trailing_colon_appends_bare_port() {
        assert_eq!(
            normalize_listen_address("localhost:"),
            "udp://localhost:162"
        );
    }

    #[test]
    fn test_normalize_keeps_scheme_adds_port() {
        assert_eq!(normalize_listen_address("tcp://host"), "tcp://host:162");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize_listen_address("udp://localhost:162");
        assert_eq!(once, "udp://localhost:162");
        assert_eq!(normalize_listen_address(&once), once);
    }

    #[test]
    fn test_normalize_leaves_malformed_address_alone() {
        // Unbracketed multi-colon host cannot take a default port; validation
        // reports it instead.
        assert_eq!(
            normalize_listen_address("udp://a:a:a:a:a:a"),
            "udp://a:a:a:a:a:a"
        );
    }

    #[test]
    fn test_normalize_bracketed_ipv6() {
        assert_eq!(normalize_listen_address("udp://[::1]"), "udp://[::1]:162");
        assert_eq!(
            normalize_listen_address("udp://[::1]:1162"),
            "udp://[::1]:1162"
        );
    }

    // ========================================================================
    // Listen address parsing
    // ========================================================================

    #[test]
    fn test_listen_address_parse() {
        let addr = ListenAddress::parse("udp://localhost:162").unwrap();
        assert_eq!(addr.scheme, TransportScheme::Udp);
        assert_eq!(addr.host, "localhost");
        assert_eq!(addr.port, 162);
        assert_eq!(addr.authority(), "localhost:162");
    }

    #[test]
    fn test_listen_address_parse_ipv6() {
        let addr = ListenAddress::parse("udp6://[::1]:1162").unwrap();
        assert_eq!(addr.scheme, TransportScheme::Udp6);
        assert_eq!(addr.host, "::1");
        assert_eq!(addr.authority(), "[::1]:1162");
    }

    #[test]
    fn test_listen_address_rejects_missing_parts() {
        assert_eq!(
            ListenAddress::parse("localhost:162").unwrap_err(),
            ListenAddressError::Malformed
        );
        assert_eq!(
            ListenAddress::parse("udp://localhost").unwrap_err(),
            ListenAddressError::Malformed
        );
        assert_eq!(
            ListenAddress::parse("udp://localhost:").unwrap_err(),
            ListenAddressError::Malformed
        );
        assert_eq!(
            ListenAddress::parse("udp://:162").unwrap_err(),
            ListenAddressError::Malformed
        );
        assert_eq!(
            ListenAddress::parse("udp://host:port").unwrap_err(),
            ListenAddressError::Malformed
        );
    }

    #[test]
    fn test_listen_address_rejects_bad_scheme() {
        assert_eq!(
            ListenAddress::parse("http://localhost:162").unwrap_err(),
            ListenAddressError::BadScheme
        );
    }

    // ========================================================================
    // Connection validation
    // ========================================================================

    #[test]
    fn test_default_config_validates_clean() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_v2c_defaults_scenario() {
        // listen_address + version + community explicit, everything else
        // untouched defaults.
        let cfg = Config {
            listen_address: "udp://localhost:162".to_string(),
            version: "v2c".to_string(),
            community: "public".to_string(),
            ..Config::default()
        };
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.security_level, DEFAULT_SECURITY_LEVEL);
        assert_eq!(cfg.auth_type, DEFAULT_AUTH_TYPE);
        assert_eq!(cfg.privacy_type, DEFAULT_PRIVACY_TYPE);
    }

    #[test]
    fn test_empty_listen_address_errors() {
        let cfg = Config {
            listen_address: String::new(),
            ..Config::default()
        };
        let errs = cfg.validate().unwrap_err();
        assert!(errs.contains(&ConfigError::EmptyListenAddress));
    }

    #[test]
    fn test_invalid_listen_address_errors() {
        let cfg = Config {
            listen_address: "udp://a:a:a:a:a:a".to_string(),
            ..Config::default()
        };
        let errs = cfg.validate().unwrap_err();
        assert_eq!(errs.len(), 1);
        assert!(errs.to_string().contains("udp://a:a:a:a:a:a"));
    }

    #[test]
    fn test_missing_port_errors() {
        for addr in ["udp://localhost", "udp://localhost:"] {
            let cfg = Config {
                listen_address: addr.to_string(),
                ..Config::default()
            };
            let errs = cfg.validate().unwrap_err();
            assert!(
                errs.contains(&ConfigError::InvalidListenAddress {
                    address: addr.to_string()
                }),
                "{addr} should be invalid"
            );
        }
    }

    #[test]
    fn test_missing_scheme_errors() {
        let cfg = Config {
            listen_address: "localhost:162".to_string(),
            ..Config::default()
        };
        assert!(
            cfg.validate()
                .unwrap_err()
                .contains(&ConfigError::InvalidListenAddress {
                    address: "localhost:162".to_string()
                })
        );
    }

    #[test]
    fn test_bad_scheme_errors() {
        let cfg = Config {
            listen_address: "http://localhost:162".to_string(),
            ..Config::default()
        };
        assert!(cfg.validate().unwrap_err().contains(&ConfigError::BadScheme));
    }

    #[test]
    fn test_scheme_case_insensitive() {
        let cfg = Config {
            listen_address: "UDP://localhost:162".to_string(),
            ..Config::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_empty_version_errors() {
        let cfg = Config {
            version: String::new(),
            ..Config::default()
        };
        assert!(
            cfg.validate()
                .unwrap_err()
                .contains(&ConfigError::EmptyVersion)
        );
    }

    #[test]
    fn test_bad_version_errors() {
        let cfg = Config {
            version: "9999".to_string(),
            ..Config::default()
        };
        assert!(cfg.validate().unwrap_err().contains(&ConfigError::BadVersion));
    }

    // ========================================================================
    // Security validation
    // ========================================================================

    #[test]
    fn test_non_v3_ignores_security_fields() {
        // Security fields in any state never matter below v3.
        let cfg = Config {
            version: "v2c".to_string(),
            user: String::new(),
            security_level: "bogus".to_string(),
            auth_type: "bogus".to_string(),
            privacy_type: "bogus".to_string(),
            ..Config::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_v3_no_user_errors() {
        let cfg = Config {
            user: String::new(),
            ..v3_config("no_auth_no_priv")
        };
        let errs = cfg.validate().unwrap_err();
        assert_eq!(errs.errors(), &[ConfigError::EmptyUser]);
    }

    #[test]
    fn test_v3_no_auth_no_priv_needs_only_user() {
        let cfg = v3_config("no_auth_no_priv");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_v3_missing_security_level_short_circuits() {
        let cfg = Config {
            user: String::new(),
            ..v3_config("")
        };
        let errs = cfg.validate().unwrap_err();
        // User error accumulates, level error is terminal, auth/privacy are
        // never reached.
        assert_eq!(
            errs.errors(),
            &[ConfigError::EmptyUser, ConfigError::EmptySecurityLevel]
        );
    }

    #[test]
    fn test_v3_bad_security_level_errors() {
        let cfg = v3_config("super");
        let errs = cfg.validate().unwrap_err();
        assert_eq!(errs.errors(), &[ConfigError::BadSecurityLevel]);
    }

    #[test]
    fn test_v3_auth_no_priv_requires_auth_fields() {
        let cfg = v3_config("auth_no_priv");
        let errs = cfg.validate().unwrap_err();
        assert!(errs.contains(&ConfigError::EmptyAuthPassword));
        assert!(errs.contains(&ConfigError::EmptyAuthType));
        // Privacy is not required at this level.
        assert!(!errs.contains(&ConfigError::EmptyPrivacyPassword));
        assert!(!errs.contains(&ConfigError::EmptyPrivacyType));
    }

    #[test]
    fn test_v3_auth_no_priv_missing_type_only() {
        let cfg = Config {
            auth_password: "p".into(),
            ..v3_config("auth_no_priv")
        };
        let errs = cfg.validate().unwrap_err();
        assert_eq!(errs.errors(), &[ConfigError::EmptyAuthType]);
    }

    #[test]
    fn test_v3_bad_auth_type_errors() {
        let cfg = Config {
            auth_type: "super".to_string(),
            auth_password: "p".into(),
            ..v3_config("auth_no_priv")
        };
        let errs = cfg.validate().unwrap_err();
        assert_eq!(errs.errors(), &[ConfigError::BadAuthType]);
    }

    #[test]
    fn test_v3_empty_auth_type_skips_membership_check() {
        // Empty type short-circuits: no BadAuthType piles on.
        let cfg = v3_config("auth_no_priv");
        let errs = cfg.validate().unwrap_err();
        assert!(!errs.contains(&ConfigError::BadAuthType));
    }

    #[test]
    fn test_v3_auth_priv_collects_auth_and_privacy() {
        let cfg = v3_config("auth_priv");
        let errs = cfg.validate().unwrap_err();
        assert!(errs.contains(&ConfigError::EmptyAuthPassword));
        assert!(errs.contains(&ConfigError::EmptyAuthType));
        assert!(errs.contains(&ConfigError::EmptyPrivacyPassword));
        assert!(errs.contains(&ConfigError::EmptyPrivacyType));
    }

    #[test]
    fn test_v3_auth_priv_missing_privacy_password_is_the_only_error() {
        let cfg = Config {
            auth_type: "md5".to_string(),
            auth_password: "p".into(),
            privacy_type: "des".to_string(),
            ..v3_config("auth_priv")
        };
        let errs = cfg.validate().unwrap_err();
        assert_eq!(errs.errors(), &[ConfigError::EmptyPrivacyPassword]);
        assert!(errs.to_string().contains("privacy_password"));
    }

    #[test]
    fn test_v3_bad_privacy_type_errors() {
        let cfg = Config {
            auth_type: "md5".to_string(),
            auth_password: "p".into(),
            privacy_type: "super".to_string(),
            privacy_password: "pp".into(),
            ..v3_config("auth_priv")
        };
        let errs = cfg.validate().unwrap_err();
        assert_eq!(errs.errors(), &[ConfigError::BadPrivacyType]);
    }

    #[test]
    fn test_v3_good_auth_priv_validates() {
        let cfg = Config {
            auth_type: "SHA256".to_string(),
            auth_password: "p".into(),
            privacy_type: "AES256C".to_string(),
            privacy_password: "pp".into(),
            ..v3_config("AUTH_PRIV")
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_security_level_preserves_original_case() {
        let cfg = v3_config("No_Auth_No_Priv");
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.security_level, "No_Auth_No_Priv");
    }

    // ========================================================================
    // Correlation config validation
    // ========================================================================

    fn column_resource(oid: &str) -> ResourceAttributeConfig {
        ResourceAttributeConfig {
            description: None,
            source: ResourceAttributeSource::Oid(oid.to_string()),
        }
    }

    #[test]
    fn test_descriptor_oid_must_parse() {
        let mut cfg = Config::default();
        cfg.resource_attributes
            .insert("ra1".to_string(), column_resource("not.an.oid"));
        let errs = cfg.validate().unwrap_err();
        assert_eq!(
            errs.errors(),
            &[ConfigError::InvalidDescriptorOid {
                name: "ra1".to_string(),
                oid: "not.an.oid".to_string()
            }]
        );
    }

    #[test]
    fn test_prefix_without_index_source_errors() {
        let mut cfg = Config::default();
        cfg.resource_attributes.insert(
            "ra1".to_string(),
            ResourceAttributeConfig {
                description: None,
                source: ResourceAttributeSource::IndexedValuePrefix("if".to_string()),
            },
        );
        let errs = cfg.validate().unwrap_err();
        assert_eq!(
            errs.errors(),
            &[ConfigError::UnresolvablePrefix {
                name: "ra1".to_string()
            }]
        );
    }

    #[test]
    fn test_prefix_with_column_source_validates() {
        let mut cfg = Config::default();
        cfg.resource_attributes
            .insert("ra1".to_string(), column_resource("1.3.6.1.2.1.2.2.1.2"));
        cfg.resource_attributes.insert(
            "ra2".to_string(),
            ResourceAttributeConfig {
                description: None,
                source: ResourceAttributeSource::IndexedValuePrefix("if".to_string()),
            },
        );
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_binding_must_match_configured_attribute() {
        let mut cfg = Config::default();
        cfg.attribute_bindings.push(AttributeBinding {
            name: "missing".to_string(),
            value: String::new(),
        });
        let errs = cfg.validate().unwrap_err();
        assert_eq!(
            errs.errors(),
            &[ConfigError::UnknownAttribute {
                name: "missing".to_string()
            }]
        );
    }

    #[test]
    fn test_binding_value_must_be_in_enum() {
        let mut cfg = Config::default();
        cfg.attributes.insert(
            "direction".to_string(),
            AttributeConfig {
                value: None,
                description: None,
                source: AttributeSource::Enum(vec!["in".to_string(), "out".to_string()]),
            },
        );
        cfg.attribute_bindings.push(AttributeBinding {
            name: "direction".to_string(),
            value: "sideways".to_string(),
        });
        let errs = cfg.validate().unwrap_err();
        assert_eq!(
            errs.errors(),
            &[ConfigError::ValueNotInEnum {
                name: "direction".to_string(),
                value: "sideways".to_string()
            }]
        );
    }

    // ========================================================================
    // Serde surface
    // ========================================================================

    #[test]
    fn test_deserialize_uses_defaults() {
        let cfg: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn test_deserialize_full_config() {
        let cfg: Config = serde_json::from_str(
            r#"{
                "listen_address": "udp://0.0.0.0:1162",
                "version": "v3",
                "user": "trapuser",
                "security_level": "auth_priv",
                "auth_type": "SHA",
                "auth_password": "authpass",
                "privacy_type": "AES",
                "privacy_password": "privpass",
                "listener_close_timeout": "2s",
                "resource_attributes": {
                    "if.index": { "oid": "1.3.6.1.2.1.2.2.1.1" },
                    "host.name": { "scalar_oid": "1.3.6.1.2.1.1.5.0" }
                },
                "attributes": {
                    "if.descr": { "oid": "1.3.6.1.2.1.2.2.1.2", "description": "interface description" },
                    "direction": { "enum": ["in", "out"], "value": "net.direction" }
                },
                "attribute_bindings": [
                    { "name": "direction", "value": "in" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(cfg.listener_close_timeout, Duration::from_secs(2));
        assert_eq!(cfg.auth_password.as_str(), "authpass");
        assert_eq!(
            cfg.resource_attributes["if.index"].source,
            ResourceAttributeSource::Oid("1.3.6.1.2.1.2.2.1.1".to_string())
        );
        assert_eq!(
            cfg.attributes["direction"].source,
            AttributeSource::Enum(vec!["in".to_string(), "out".to_string()])
        );
        assert_eq!(
            cfg.attributes["direction"].value.as_deref(),
            Some("net.direction")
        );
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_descriptor_requires_exactly_one_source() {
        // No source at all.
        assert!(serde_json::from_str::<ResourceAttributeConfig>(r#"{ "description": "x" }"#).is_err());
        // Two sources at once.
        assert!(
            serde_json::from_str::<ResourceAttributeConfig>(
                r#"{ "oid": "1.2", "scalar_oid": "1.3" }"#
            )
            .is_err()
        );
        // Exactly one parses.
        assert!(
            serde_json::from_str::<ResourceAttributeConfig>(r#"{ "scalar_oid": "1.3" }"#).is_ok()
        );
    }

    #[test]
    fn test_v3_loaded_with_defaults_misses_only_privacy_password() {
        // auth_type and privacy_type fall back to their defaults, so the
        // sole violation is the missing privacy password.
        let cfg: Config = serde_json::from_str(
            r#"{
                "version": "v3",
                "user": "u",
                "security_level": "auth_priv",
                "auth_password": "p"
            }"#,
        )
        .unwrap();
        let errs = cfg.validate().unwrap_err();
        assert_eq!(errs.errors(), &[ConfigError::EmptyPrivacyPassword]);
    }

    #[test]
    fn test_opaque_redacts_debug_output() {
        let cfg = Config {
            auth_password: "hunter2".into(),
            ..Config::default()
        };
        let debug = format!("{:?}", cfg);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[redacted]"));
    }
}
