//! Decoded trap PDU types.
//!
//! These are the types handed to this crate by the wire-protocol decoding
//! collaborator: a [`TrapPdu`] with its [`VarBind`] list. No BER parsing
//! happens here.

use bytes::Bytes;

use crate::oid::Oid;
use crate::version::Version;

/// SNMP value carried by a varbind.
///
/// Covers the SMIv2 scalar set. Values render to strings with
/// [`Value::render`] when they become record attributes.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Value {
    /// INTEGER (signed 32-bit)
    Integer(i32),
    /// OCTET STRING (arbitrary bytes)
    OctetString(Bytes),
    /// NULL
    Null,
    /// OBJECT IDENTIFIER
    ObjectIdentifier(Oid),
    /// IpAddress (4 bytes, big-endian)
    IpAddress([u8; 4]),
    /// Counter32 (unsigned 32-bit, wrapping)
    Counter32(u32),
    /// Gauge32 / Unsigned32
    Gauge32(u32),
    /// TimeTicks (hundredths of seconds)
    TimeTicks(u32),
    /// Counter64 (SNMPv2c/v3 only)
    Counter64(u64),
    /// Opaque (legacy, arbitrary bytes)
    Opaque(Bytes),
}

impl Value {
    /// Render the value as an attribute string.
    ///
    /// Octet strings that are valid UTF-8 render verbatim; any other byte
    /// payload renders as `0x`-prefixed lowercase hex so binary values stay
    /// representable.
    pub fn render(&self) -> String {
        match self {
            Value::Integer(v) => v.to_string(),
            Value::OctetString(b) | Value::Opaque(b) => render_bytes(b),
            Value::Null => String::new(),
            Value::ObjectIdentifier(oid) => oid.to_string(),
            Value::IpAddress(octets) => {
                format!("{}.{}.{}.{}", octets[0], octets[1], octets[2], octets[3])
            }
            Value::Counter32(v) | Value::Gauge32(v) | Value::TimeTicks(v) => v.to_string(),
            Value::Counter64(v) => v.to_string(),
        }
    }
}

fn render_bytes(bytes: &Bytes) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let mut out = String::with_capacity(2 + bytes.len() * 2);
            out.push_str("0x");
            for b in bytes {
                use std::fmt::Write;
                let _ = write!(out, "{:02x}", b);
            }
            out
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            other => write!(f, "{}", other.render()),
        }
    }
}

/// Variable binding - an OID-value pair.
#[derive(Debug, Clone, PartialEq)]
pub struct VarBind {
    /// The object identifier.
    pub oid: Oid,
    /// The value.
    pub value: Value,
}

impl VarBind {
    /// Create a new VarBind.
    pub fn new(oid: Oid, value: Value) -> Self {
        Self { oid, value }
    }
}

impl std::fmt::Display for VarBind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.oid, self.value)
    }
}

/// One decoded SNMP trap/notification.
///
/// Produced by the decoding collaborator, one per received packet. The
/// varbind list is the correlation input; trap OID and uptime, when the
/// version carries them, travel into the emitted records as envelope data.
#[derive(Debug, Clone, PartialEq)]
pub struct TrapPdu {
    /// Protocol version the trap arrived with.
    pub version: Version,
    /// snmpTrapOID.0 for v2c/v3 traps, the enterprise OID for v1 traps.
    pub trap_oid: Option<Oid>,
    /// sysUpTime.0 in hundredths of seconds, when present.
    pub uptime: Option<u32>,
    /// The payload varbinds.
    pub varbinds: Vec<VarBind>,
}

impl TrapPdu {
    /// Create a trap PDU from its varbinds, with no envelope data.
    pub fn new(version: Version, varbinds: Vec<VarBind>) -> Self {
        Self {
            version,
            trap_oid: None,
            uptime: None,
            varbinds,
        }
    }

    /// Look up the value bound to an exact OID.
    pub fn find(&self, oid: &Oid) -> Option<&Value> {
        self.varbinds
            .iter()
            .find(|vb| &vb.oid == oid)
            .map(|vb| &vb.value)
    }
}
