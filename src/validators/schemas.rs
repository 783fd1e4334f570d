//! Schema assembly and the validation entry point
//!
//! A [`Schema`] is the immutable root of the rule tree: a namespace
//! binding table plus patterns in declaration order. The builder compiles
//! every XPath expression up front, so malformed expressions and unknown
//! prefixes surface as build errors and [`Schema::validate`] itself cannot
//! fault.

use crate::error::Result;
use crate::namespaces::NamespaceBindings;
use crate::validators::diagnostics::Diagnostic;
use crate::validators::scopes::{Pattern, PatternBuilder};
use std::fmt;
use std::sync::Arc;

/// A compiled link-rule schema
#[derive(Debug, Clone)]
pub struct Schema {
    title: String,
    namespaces: Arc<NamespaceBindings>,
    patterns: Vec<Pattern>,
}

impl Schema {
    /// Start building a schema
    pub fn builder(title: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(title)
    }

    /// The schema's title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The flattened namespace binding table
    pub fn namespaces(&self) -> &NamespaceBindings {
        &self.namespaces
    }

    /// The patterns in declaration order
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Validate a document, returning findings in evaluation order
    ///
    /// The result is deterministic: pattern order, scope traversal, rule
    /// order, then document order within each rule, forward pass before
    /// backward. An empty result means the document satisfies the schema.
    pub fn validate(&self, document: &roxmltree::Document) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        for pattern in &self.patterns {
            let before = out.len();
            pattern.validate(document, &mut out);
            log::debug!(
                "pattern '{}' produced {} finding(s)",
                pattern.title(),
                out.len() - before
            );
        }
        out
    }

    /// Summarize the schema for inspection
    pub fn summary(&self) -> SchemaSummary {
        SchemaSummary {
            title: self.title.clone(),
            namespaces: self
                .namespaces
                .iter()
                .map(|(p, u)| (p.to_string(), u.to_string()))
                .collect(),
            patterns: self
                .patterns
                .iter()
                .map(|p| PatternSummary {
                    title: p.title().to_string(),
                    context: p.context().expression().to_string(),
                    scopes: p.scope_count(),
                    rules: p.rule_count(),
                })
                .collect(),
        }
    }
}

/// Human-readable overview of a schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaSummary {
    /// Schema title
    pub title: String,
    /// Declared namespaces in declaration order
    pub namespaces: Vec<(String, String)>,
    /// Per-pattern counts
    pub patterns: Vec<PatternSummary>,
}

/// Per-pattern counts for [`SchemaSummary`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternSummary {
    /// Pattern title
    pub title: String,
    /// Root context expression
    pub context: String,
    /// Scope count, including nested scopes
    pub scopes: usize,
    /// Rule count across all scopes
    pub rules: usize,
}

impl fmt::Display for SchemaSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Schema: {}", self.title)?;
        if !self.namespaces.is_empty() {
            writeln!(f, "Namespaces:")?;
            for (prefix, uri) in &self.namespaces {
                writeln!(f, "  {} = {}", prefix, uri)?;
            }
        }
        writeln!(f, "Patterns: {}", self.patterns.len())?;
        for pattern in &self.patterns {
            writeln!(
                f,
                "  {} (context {}): {} scope(s), {} rule(s)",
                pattern.title, pattern.context, pattern.scopes, pattern.rules
            )?;
        }
        Ok(())
    }
}

/// Builder for [`Schema`]
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    title: String,
    namespaces: NamespaceBindings,
    patterns: Vec<PatternBuilder>,
}

impl SchemaBuilder {
    /// Create a builder with the given title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            namespaces: NamespaceBindings::new(),
            patterns: Vec::new(),
        }
    }

    /// Declare a namespace prefix
    pub fn namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.namespaces.declare(prefix, uri);
        self
    }

    /// Add a pattern
    pub fn pattern(mut self, pattern: PatternBuilder) -> Self {
        self.patterns.push(pattern);
        self
    }

    /// Compile every expression and assemble the schema
    pub fn build(self) -> Result<Schema> {
        let namespaces = Arc::new(self.namespaces);
        let patterns = self
            .patterns
            .into_iter()
            .map(|p| p.compile(&namespaces))
            .collect::<Result<Vec<_>>>()?;

        log::debug!(
            "compiled schema '{}': {} pattern(s), {} namespace(s)",
            self.title,
            patterns.len(),
            namespaces.len()
        );

        Ok(Schema {
            title: self.title,
            namespaces,
            patterns,
        })
    }
}
