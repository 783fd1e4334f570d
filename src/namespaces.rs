//! XML namespace handling
//!
//! This module provides qualified names (QNames) and the ordered
//! prefix-to-URI binding table that a schema flattens its namespace
//! declarations into. Every compiled XPath handle shares one such table.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use std::fmt;

/// Qualified name - combination of namespace URI and local name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// Namespace URI (None for no namespace)
    pub namespace: Option<String>,
    /// Local name
    pub local: String,
}

impl QName {
    /// Create a QName without a namespace
    pub fn local(local: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local: local.into(),
        }
    }

    /// Create a QName with a namespace
    pub fn namespaced(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local: local.into(),
        }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local),
            None => write!(f, "{}", self.local),
        }
    }
}

/// Ordered prefix-to-URI binding table
///
/// Declaration order is preserved so that schema summaries and merged
/// tables are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceBindings {
    bindings: IndexMap<String, String>,
}

impl NamespaceBindings {
    /// Create an empty binding table
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a prefix binding; a redeclared prefix is overwritten in place
    pub fn declare(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        self.bindings.insert(prefix.into(), uri.into());
    }

    /// Look up the URI bound to a prefix
    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.bindings.get(prefix).map(|s| s.as_str())
    }

    /// Resolve a prefix, failing on an undeclared one
    pub fn resolve(&self, prefix: &str) -> Result<&str> {
        self.get(prefix)
            .ok_or_else(|| Error::Namespace(format!("unknown prefix: {}", prefix)))
    }

    /// Resolve a possibly prefixed name to a QName
    pub fn resolve_qname(&self, name: &str) -> Result<QName> {
        if let Some((prefix, local)) = name.split_once(':') {
            Ok(QName::namespaced(self.resolve(prefix)?, local))
        } else {
            Ok(QName::local(name))
        }
    }

    /// Union of two tables; `other`'s bindings win on collision
    pub fn merged(&self, other: &NamespaceBindings) -> NamespaceBindings {
        let mut bindings = self.bindings.clone();
        for (prefix, uri) in &other.bindings {
            bindings.insert(prefix.clone(), uri.clone());
        }
        NamespaceBindings { bindings }
    }

    /// Iterate bindings in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings.iter().map(|(p, u)| (p.as_str(), u.as_str()))
    }

    /// Number of declared prefixes
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Check whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
