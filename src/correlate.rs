//! Index correlation: mapping one decoded trap's varbinds onto resources.
//!
//! The engine compiles the declarative maps of a validated [`Config`] into
//! rule lists once, then [`CorrelationEngine::correlate`] runs them against
//! each trap PDU. Correlation is pure per call and keeps no state between
//! calls, so any number of packets may be processed concurrently against the
//! same engine.

use std::collections::BTreeMap;
use std::net::SocketAddr;

use crate::config::{AttributeSource, Config, ResourceAttributeSource};
use crate::error::{ConfigError, ConfigErrors};
use crate::oid::Oid;
use crate::pdu::TrapPdu;

/// Correlation key of a resource within one trap.
///
/// Ordered so the scalar resource sorts before any indexed resource and
/// indexed resources sort by ascending index arcs, which is the output order of
/// [`CorrelationEngine::correlate`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceIndex {
    /// The single implicit resource produced by scalar-OID descriptors.
    Scalar,
    /// A resource keyed by the trailing OID suffix of column values.
    Indexed(Oid),
}

impl std::fmt::Display for ResourceIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scalar => write!(f, "scalar"),
            Self::Indexed(oid) => write!(f, "{}", oid),
        }
    }
}

/// One correlated resource with its resolved attributes.
///
/// Resources live for a single trap: they are built by one `correlate` call,
/// handed downstream, and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// Correlation key this resource was assembled under.
    pub index: ResourceIndex,
    /// Resource-identifying attributes, in configuration order.
    pub resource_attributes: Vec<(String, String)>,
    /// Record attributes, in configuration order (bindings last).
    pub attributes: Vec<(String, String)>,
}

/// One finished record, ready for the downstream consumer.
///
/// One record is produced per resource per trap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrapRecord {
    /// Address the trap arrived from.
    pub source: SocketAddr,
    /// snmpTrapOID.0 (or v1 enterprise OID), when the PDU carried one.
    pub trap_oid: Option<Oid>,
    /// sysUpTime.0 in hundredths of seconds, when the PDU carried one.
    pub uptime: Option<u32>,
    /// The correlated resource.
    pub resource: Resource,
}

enum ResourceRule {
    Column { name: String, oid: Oid },
    Scalar { name: String, oid: Oid },
    Prefix { name: String, prefix: String },
}

enum AttributeRule {
    Column { key: String, oid: Oid },
    Prefix { key: String, prefix: String },
    Bound { key: String, value: String },
}

/// Compiled correlation rules for one receiver.
///
/// Shareable read-only across concurrent correlation calls; `correlate`
/// takes `&self` and allocates all intermediate state per call.
pub struct CorrelationEngine {
    resource_rules: Vec<ResourceRule>,
    attribute_rules: Vec<AttributeRule>,
}

impl CorrelationEngine {
    /// Compile the declarative maps of a validated config.
    ///
    /// Re-checks the constraints `Config::validate` enforces on the maps
    /// (parseable OIDs, resolvable prefixes, coherent bindings) so an engine
    /// can never be built from descriptors that could not resolve.
    pub fn new(config: &Config) -> Result<Self, ConfigErrors> {
        let mut errs = ConfigErrors::new();
        let mut resource_rules = Vec::with_capacity(config.resource_attributes.len());
        let mut attribute_rules = Vec::with_capacity(config.attributes.len());

        let has_index_source = config
            .resource_attributes
            .values()
            .any(|ra| matches!(ra.source, ResourceAttributeSource::Oid(_)));

        for (name, ra) in &config.resource_attributes {
            match &ra.source {
                ResourceAttributeSource::Oid(oid) => match Oid::parse(oid) {
                    Ok(oid) => resource_rules.push(ResourceRule::Column {
                        name: name.clone(),
                        oid,
                    }),
                    Err(_) => errs.push(ConfigError::InvalidDescriptorOid {
                        name: name.clone(),
                        oid: oid.clone(),
                    }),
                },
                ResourceAttributeSource::ScalarOid(oid) => match Oid::parse(oid) {
                    Ok(oid) => resource_rules.push(ResourceRule::Scalar {
                        name: name.clone(),
                        oid,
                    }),
                    Err(_) => errs.push(ConfigError::InvalidDescriptorOid {
                        name: name.clone(),
                        oid: oid.clone(),
                    }),
                },
                ResourceAttributeSource::IndexedValuePrefix(prefix) => {
                    if has_index_source {
                        resource_rules.push(ResourceRule::Prefix {
                            name: name.clone(),
                            prefix: prefix.clone(),
                        });
                    } else {
                        errs.push(ConfigError::UnresolvablePrefix { name: name.clone() });
                    }
                }
            }
        }

        for (name, attr) in &config.attributes {
            // An attribute publishes under its configured value override
            // when present, otherwise under its own name.
            let key = attr.value.clone().unwrap_or_else(|| name.clone());
            match &attr.source {
                AttributeSource::Oid(oid) => match Oid::parse(oid) {
                    Ok(oid) => attribute_rules.push(AttributeRule::Column { key, oid }),
                    Err(_) => errs.push(ConfigError::InvalidDescriptorOid {
                        name: name.clone(),
                        oid: oid.clone(),
                    }),
                },
                AttributeSource::IndexedValuePrefix(prefix) => {
                    if has_index_source {
                        attribute_rules.push(AttributeRule::Prefix {
                            key,
                            prefix: prefix.clone(),
                        });
                    } else {
                        errs.push(ConfigError::UnresolvablePrefix { name: name.clone() });
                    }
                }
                AttributeSource::Enum(values) => {
                    // Enum attributes only materialize through a binding.
                    if let Some(binding) = config
                        .attribute_bindings
                        .iter()
                        .find(|b| &b.name == name)
                    {
                        if values.contains(&binding.value) {
                            attribute_rules.push(AttributeRule::Bound {
                                key,
                                value: binding.value.clone(),
                            });
                        } else {
                            errs.push(ConfigError::ValueNotInEnum {
                                name: name.clone(),
                                value: binding.value.clone(),
                            });
                        }
                    }
                }
            }
        }

        for binding in &config.attribute_bindings {
            if !config.attributes.contains_key(&binding.name) {
                errs.push(ConfigError::UnknownAttribute {
                    name: binding.name.clone(),
                });
            }
        }

        errs.into_result()?;
        Ok(Self {
            resource_rules,
            attribute_rules,
        })
    }

    /// Correlate one decoded trap into its resources.
    ///
    /// Returns resources in ascending index order (the scalar resource
    /// first), each with attributes in configuration order. Deterministic:
    /// identical input yields identical, identically-ordered output.
    pub fn correlate(&self, pdu: &TrapPdu) -> Vec<Resource> {
        // Pass 1: resolve column and scalar resource values, establishing
        // the index set.
        let mut columns: BTreeMap<ResourceIndex, Vec<(usize, String)>> = BTreeMap::new();
        for (rule_pos, rule) in self.resource_rules.iter().enumerate() {
            match rule {
                ResourceRule::Column { oid, .. } => {
                    for vb in &pdu.varbinds {
                        if let Some(index) = vb.oid.suffix(oid) {
                            columns
                                .entry(ResourceIndex::Indexed(index))
                                .or_default()
                                .push((rule_pos, vb.value.render()));
                        }
                    }
                }
                ResourceRule::Scalar { oid, .. } => {
                    if let Some(value) = pdu.find(oid) {
                        columns
                            .entry(ResourceIndex::Scalar)
                            .or_default()
                            .push((rule_pos, value.render()));
                    }
                }
                ResourceRule::Prefix { .. } => {}
            }
        }

        // Pass 2: synthesize prefix values over the established indexes.
        let indexed: Vec<ResourceIndex> = columns
            .keys()
            .filter(|idx| matches!(idx, ResourceIndex::Indexed(_)))
            .cloned()
            .collect();
        for (rule_pos, rule) in self.resource_rules.iter().enumerate() {
            if let ResourceRule::Prefix { prefix, .. } = rule {
                for idx in &indexed {
                    let ResourceIndex::Indexed(index) = idx else {
                        continue;
                    };
                    columns
                        .entry(idx.clone())
                        .or_default()
                        .push((rule_pos, format!("{}.{}", prefix, index)));
                }
            }
        }

        // Assemble resources in index order, attributes in rule order.
        let mut resources = Vec::with_capacity(columns.len());
        for (index, mut values) in columns {
            values.sort_by_key(|(pos, _)| *pos);
            let resource_attributes = values
                .into_iter()
                .map(|(pos, value)| (self.resource_rule_name(pos).to_string(), value))
                .collect();

            let attributes = self.resolve_attributes(pdu, &index);

            resources.push(Resource {
                index,
                resource_attributes,
                attributes,
            });
        }

        resources
    }

    fn resource_rule_name(&self, pos: usize) -> &str {
        match &self.resource_rules[pos] {
            ResourceRule::Column { name, .. }
            | ResourceRule::Scalar { name, .. }
            | ResourceRule::Prefix { name, .. } => name,
        }
    }

    /// Resolve the record attributes attaching to one resource.
    ///
    /// Column attributes attach only to the resource sharing their index;
    /// prefix attributes synthesize against indexed resources; bound enum
    /// attributes have no index and attach to every resource.
    fn resolve_attributes(&self, pdu: &TrapPdu, index: &ResourceIndex) -> Vec<(String, String)> {
        let mut out = Vec::new();
        for rule in &self.attribute_rules {
            match rule {
                AttributeRule::Column { key, oid } => {
                    let ResourceIndex::Indexed(index) = index else {
                        continue;
                    };
                    for vb in &pdu.varbinds {
                        if vb.oid.suffix(oid).is_some_and(|suffix| &suffix == index) {
                            out.push((key.clone(), vb.value.render()));
                        }
                    }
                }
                AttributeRule::Prefix { key, prefix } => {
                    if let ResourceIndex::Indexed(index) = index {
                        out.push((key.clone(), format!("{}.{}", prefix, index)));
                    }
                }
                AttributeRule::Bound { key, value } => {
                    out.push((key.clone(), value.clone()));
                }
            }
        }
        out
    }
}
