//! Schema configuration files
//!
//! A schema can be populated from a JSON document instead of source code.
//! The mirror structs here deserialize that form and drive the fluent
//! builder; direction and required-ness fall back to their rule defaults
//! when omitted.
//!
//! ```json
//! {
//!   "title": "site links",
//!   "namespaces": [{ "prefix": "auc", "uri": "http://auc.example" }],
//!   "patterns": [{
//!     "title": "measures",
//!     "context": "/auc:Audits",
//!     "scopes": [{
//!       "context": "//auc:Site",
//!       "rules": [{
//!         "source": "//auc:Measure/@ID/text()",
//!         "direction": "both",
//!         "required": "forward",
//!         "asserts": [{
//!           "child": "@ID/text()",
//!           "target": "//auc:MeasureRef/@IDref/text()"
//!         }]
//!       }]
//!     }]
//!   }]
//! }
//! ```

use crate::error::Result;
use crate::validators::{
    Direction, Pattern, PatternBuilder, Required, Rule, RuleBuilder, Schema, Scope, ScopeBuilder,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Serialized form of a schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaConfig {
    /// Schema title
    pub title: String,
    /// Namespace declarations
    #[serde(default)]
    pub namespaces: Vec<NamespaceConfig>,
    /// Patterns in declaration order
    #[serde(default)]
    pub patterns: Vec<PatternConfig>,
}

/// One namespace declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamespaceConfig {
    /// Prefix used in rule expressions
    pub prefix: String,
    /// Namespace URI
    pub uri: String,
}

/// Serialized form of a pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternConfig {
    /// Pattern title
    pub title: String,
    /// Root context expression
    pub context: String,
    /// Scopes in declaration order
    #[serde(default)]
    pub scopes: Vec<ScopeConfig>,
}

/// Serialized form of a scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScopeConfig {
    /// Context expression
    pub context: String,
    /// Nested scopes
    #[serde(default)]
    pub scopes: Vec<ScopeConfig>,
    /// Rules in declaration order
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

/// Serialized form of a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    /// Source expression
    pub source: String,
    /// Which passes run
    #[serde(default)]
    pub direction: Direction,
    /// Which directions escalate missing links
    #[serde(default)]
    pub required: Required,
    /// Assertions in declaration order
    pub asserts: Vec<AssertConfig>,
}

/// One serialized assertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssertConfig {
    /// Child expression, relative to a source node
    pub child: String,
    /// Target expression, relative to the rule's context node
    pub target: String,
}

impl SchemaConfig {
    /// Deserialize from a JSON string
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Deserialize from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            crate::error::Error::Resource(format!(
                "failed to read schema config '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&text)
    }

    /// Compile into a [`Schema`]
    pub fn into_schema(self) -> Result<Schema> {
        let mut builder = Schema::builder(self.title);
        for ns in self.namespaces {
            builder = builder.namespace(ns.prefix, ns.uri);
        }
        for pattern in self.patterns {
            builder = builder.pattern(pattern.into_builder());
        }
        builder.build()
    }
}

impl PatternConfig {
    fn into_builder(self) -> PatternBuilder {
        let mut builder = Pattern::builder(self.title, self.context);
        for scope in self.scopes {
            builder = builder.scope(scope.into_builder());
        }
        builder
    }
}

impl ScopeConfig {
    fn into_builder(self) -> ScopeBuilder {
        let mut builder = Scope::builder(self.context);
        for scope in self.scopes {
            builder = builder.scope(scope.into_builder());
        }
        for rule in self.rules {
            builder = builder.rule(rule.into_builder());
        }
        builder
    }
}

impl RuleConfig {
    fn into_builder(self) -> RuleBuilder {
        let mut builder = Rule::builder(self.source)
            .direction(self.direction)
            .required(self.required);
        for assert in self.asserts {
            builder = builder.assert(assert.child, assert.target);
        }
        builder
    }
}
