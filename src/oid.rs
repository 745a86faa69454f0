//! Object Identifier (OID) type.
//!
//! OIDs are stored as `SmallVec<[u32; 16]>` to avoid heap allocation for
//! common OIDs. This crate consumes OIDs from decoded trap PDUs and from
//! configuration strings; BER encoding lives in the decoding collaborator.

use smallvec::SmallVec;
use std::fmt;

/// Error returned when parsing a dotted OID string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOidError {
    input: String,
}

impl fmt::Display for ParseOidError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid OID '{}': expected dotted numeric arcs", self.input)
    }
}

impl std::error::Error for ParseOidError {}

/// Object Identifier.
///
/// A sequence of arc values in dotted-numeric notation. Ordered
/// lexicographically by arcs, which matches SNMP table index order and gives
/// the deterministic resource ordering the correlation output relies on.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Oid {
    arcs: SmallVec<[u32; 16]>,
}

impl Oid {
    /// Create an empty OID.
    pub fn empty() -> Self {
        Self {
            arcs: SmallVec::new(),
        }
    }

    /// Create an OID from arc values.
    pub fn new(arcs: impl IntoIterator<Item = u32>) -> Self {
        Self {
            arcs: arcs.into_iter().collect(),
        }
    }

    /// Create an OID from a slice of arcs.
    pub fn from_slice(arcs: &[u32]) -> Self {
        Self {
            arcs: SmallVec::from_slice(arcs),
        }
    }

    /// Parse an OID from dotted string notation (e.g. `1.3.6.1.2.1.2.2.1.2`).
    ///
    /// A leading dot is accepted (`".1.3.6"` is common in SNMP tooling);
    /// empty input or non-numeric arcs are rejected.
    pub fn parse(s: &str) -> Result<Self, ParseOidError> {
        let trimmed = s.strip_prefix('.').unwrap_or(s);
        if trimmed.is_empty() {
            return Err(ParseOidError {
                input: s.to_string(),
            });
        }

        let mut arcs = SmallVec::new();
        for part in trimmed.split('.') {
            let arc: u32 = part.parse().map_err(|_| ParseOidError {
                input: s.to_string(),
            })?;
            arcs.push(arc);
        }

        Ok(Self { arcs })
    }

    /// Get the arc values.
    pub fn arcs(&self) -> &[u32] {
        &self.arcs
    }

    /// Get the number of arcs.
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    /// Check if the OID is empty.
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Check if this OID starts with another OID.
    ///
    /// An OID always starts with itself, and any OID starts with the empty
    /// OID.
    pub fn starts_with(&self, other: &Oid) -> bool {
        self.arcs.len() >= other.arcs.len() && self.arcs[..other.arcs.len()] == other.arcs[..]
    }

    /// The trailing arcs after `prefix`, if `self` is strictly longer than
    /// `prefix` and starts with it.
    ///
    /// For a column OID `1.3.6.1.2.1.2.2.1.2` and an instance
    /// `1.3.6.1.2.1.2.2.1.2.7`, the suffix is `7`: the table index used as
    /// the correlation key.
    pub fn suffix(&self, prefix: &Oid) -> Option<Oid> {
        if self.len() > prefix.len() && self.starts_with(prefix) {
            Some(Oid::from_slice(&self.arcs[prefix.len()..]))
        } else {
            None
        }
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arc) in self.arcs.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", arc)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({})", self)
    }
}

impl std::str::FromStr for Oid {
    type Err = ParseOidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<&[u32]> for Oid {
    fn from(arcs: &[u32]) -> Self {
        Self::from_slice(arcs)
    }
}

/// Construct an [`Oid`] from literal arcs: `oid!(1, 3, 6, 1)`.
#[macro_export]
macro_rules! oid {
    ($($arc:expr),+ $(,)?) => {
        $crate::oid::Oid::from_slice(&[$($arc),+])
    };
}
