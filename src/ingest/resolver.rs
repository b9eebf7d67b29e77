//! Entity resolution
//!
//! An entity's URI is `namespace + label + "#" + digest`, where the digest
//! covers the entity's identity fields concatenated in declared order. The
//! digest is only an identity key: SHA-256 truncated to 128 bits, hex
//! encoded. Equal normalized identity tuples always give equal URIs, in any
//! process and on any run.

use super::schema::{EntityKind, EntitySpec};
use super::table::Record;
use oxigraph::model::NamedNode;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Bytes of the SHA-256 output kept in the identity digest
const DIGEST_BYTES: usize = 16;

/// Resolution errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// A record lacks a field required for identity
    #[error("Missing field '{field}' required for {kind} identity")]
    MissingField { kind: EntityKind, field: String },

    /// The namespace does not form valid IRIs
    #[error("Invalid namespace: {0}")]
    InvalidNamespace(String),
}

pub type ResolveResult<T> = Result<T, ResolveError>;

/// Hex digest of an identity tuple
pub fn identity_digest<'a>(values: impl IntoIterator<Item = &'a str>) -> String {
    let mut hasher = Sha256::new();
    for value in values {
        hasher.update(value.as_bytes());
    }
    hex::encode(&hasher.finalize()[..DIGEST_BYTES])
}

/// Maps identity tuples to entity URIs under one namespace
#[derive(Debug, Clone)]
pub struct EntityResolver {
    namespace: String,
}

impl EntityResolver {
    pub fn new(namespace: impl Into<String>) -> ResolveResult<Self> {
        let namespace = namespace.into();
        NamedNode::new(format!("{}Report#00", namespace))
            .map_err(|e| ResolveError::InvalidNamespace(format!("{}: {}", namespace, e)))?;
        Ok(Self { namespace })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// URI of an entity from its already-extracted identity values
    pub fn resolve_values<'a>(
        &self,
        kind: EntityKind,
        values: impl IntoIterator<Item = &'a str>,
    ) -> NamedNode {
        NamedNode::new_unchecked(format!(
            "{}{}#{}",
            self.namespace,
            kind.label(),
            identity_digest(values)
        ))
    }

    /// URI of the entity `spec` describes within `record`
    pub fn resolve(&self, spec: &EntitySpec, record: &Record<'_>) -> ResolveResult<NamedNode> {
        let values = spec
            .identity
            .iter()
            .map(|field| {
                record.get(field).ok_or_else(|| ResolveError::MissingField {
                    kind: spec.kind,
                    field: field.to_string(),
                })
            })
            .collect::<ResolveResult<Vec<&str>>>()?;

        Ok(self.resolve_values(spec.kind, values))
    }
}
