//! Contextual scopes and patterns
//!
//! A [`Scope`] narrows where its rules apply: its context expression
//! composes onto the enclosing prefix, nested scopes cascade further, and
//! each rule runs once per node the composed path selects. A [`Pattern`]
//! is the top-level grouping that anchors its scopes at every match of a
//! root context expression.

use crate::error::Result;
use crate::namespaces::NamespaceBindings;
use crate::validators::diagnostics::Diagnostic;
use crate::validators::rules::{Rule, RuleBuilder};
use crate::xpath::XPathHandle;
use roxmltree::Node;
use std::sync::Arc;

/// A nested evaluation context holding rules and child scopes
#[derive(Debug, Clone)]
pub struct Scope {
    context: XPathHandle,
    scopes: Vec<Scope>,
    rules: Vec<Rule>,
}

impl Scope {
    /// Start building a scope from its context expression
    pub fn builder(context: impl Into<String>) -> ScopeBuilder {
        ScopeBuilder::new(context)
    }

    /// The scope's context handle
    pub fn context(&self) -> &XPathHandle {
        &self.context
    }

    /// Evaluate nested scopes, then this scope's rules, against `node`
    ///
    /// The composed prefix labels diagnostics; rule anchors are found by
    /// re-resolving the full composed path against the original `node`,
    /// so nesting never double-applies a path during selection.
    pub fn validate(&self, node: Node, prefix: Option<&XPathHandle>, out: &mut Vec<Diagnostic>) {
        let composed = match prefix {
            Some(p) => p.compose(&self.context),
            None => self.context.clone(),
        };

        for scope in &self.scopes {
            scope.validate(node, Some(&composed), out);
        }

        if !self.rules.is_empty() {
            for anchor in composed.select(node) {
                for rule in &self.rules {
                    rule.validate(anchor, Some(&composed), out);
                }
            }
        }
    }

    /// Number of rules in this scope and all nested scopes
    pub fn rule_count(&self) -> usize {
        self.rules.len() + self.scopes.iter().map(Scope::rule_count).sum::<usize>()
    }

    /// Number of scopes, counting this one and all nested scopes
    pub fn scope_count(&self) -> usize {
        1 + self.scopes.iter().map(Scope::scope_count).sum::<usize>()
    }
}

/// Builder for [`Scope`]
#[derive(Debug, Clone)]
pub struct ScopeBuilder {
    context: String,
    scopes: Vec<ScopeBuilder>,
    rules: Vec<RuleBuilder>,
}

impl ScopeBuilder {
    /// Create a builder for a scope with the given context expression
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            scopes: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Nest a child scope
    pub fn scope(mut self, scope: ScopeBuilder) -> Self {
        self.scopes.push(scope);
        self
    }

    /// Add a rule
    pub fn rule(mut self, rule: RuleBuilder) -> Self {
        self.rules.push(rule);
        self
    }

    /// Compile against a namespace binding table
    pub fn compile(self, namespaces: &Arc<NamespaceBindings>) -> Result<Scope> {
        Ok(Scope {
            context: XPathHandle::compile(self.context, Arc::clone(namespaces))?,
            scopes: self
                .scopes
                .into_iter()
                .map(|s| s.compile(namespaces))
                .collect::<Result<Vec<_>>>()?,
            rules: self
                .rules
                .into_iter()
                .map(|r| r.compile(namespaces))
                .collect::<Result<Vec<_>>>()?,
        })
    }
}

/// Top-level grouping with a root context and its scopes
#[derive(Debug, Clone)]
pub struct Pattern {
    title: String,
    context: XPathHandle,
    scopes: Vec<Scope>,
}

impl Pattern {
    /// Start building a pattern
    pub fn builder(title: impl Into<String>, context: impl Into<String>) -> PatternBuilder {
        PatternBuilder::new(title, context)
    }

    /// The pattern's title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The pattern's root context handle
    pub fn context(&self) -> &XPathHandle {
        &self.context
    }

    /// Evaluate every scope against each root context match
    pub fn validate(&self, document: &roxmltree::Document, out: &mut Vec<Diagnostic>) {
        for ctx in self.context.select(document.root()) {
            for scope in &self.scopes {
                scope.validate(ctx, None, out);
            }
        }
    }

    /// Number of rules across all scopes
    pub fn rule_count(&self) -> usize {
        self.scopes.iter().map(Scope::rule_count).sum()
    }

    /// Number of scopes, including nested ones
    pub fn scope_count(&self) -> usize {
        self.scopes.iter().map(Scope::scope_count).sum()
    }
}

/// Builder for [`Pattern`]
#[derive(Debug, Clone)]
pub struct PatternBuilder {
    title: String,
    context: String,
    scopes: Vec<ScopeBuilder>,
}

impl PatternBuilder {
    /// Create a builder for a pattern with a title and root context
    pub fn new(title: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            context: context.into(),
            scopes: Vec::new(),
        }
    }

    /// Add a scope
    pub fn scope(mut self, scope: ScopeBuilder) -> Self {
        self.scopes.push(scope);
        self
    }

    /// Compile against a namespace binding table
    pub fn compile(self, namespaces: &Arc<NamespaceBindings>) -> Result<Pattern> {
        Ok(Pattern {
            title: self.title,
            context: XPathHandle::compile(self.context, Arc::clone(namespaces))?,
            scopes: self
                .scopes
                .into_iter()
                .map(|s| s.compile(namespaces))
                .collect::<Result<Vec<_>>>()?,
        })
    }
}
