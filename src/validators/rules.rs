//! Link rules
//!
//! A [`Rule`] pairs a source expression with an ordered set of
//! child-to-target assertions, a direction and a required-ness mode. Rules
//! are compiled once, when the owning schema is built: every expression is
//! resolved to an [`XPathHandle`] there, so evaluation cannot fault.

use crate::error::{Error, Result};
use crate::namespaces::NamespaceBindings;
use crate::validators::diagnostics::Diagnostic;
use crate::validators::links::LinkValidator;
use crate::xpath::XPathHandle;
use indexmap::IndexMap;
use roxmltree::Node;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Which passes a rule runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Source values must resolve to targets
    #[default]
    Forward,
    /// Target values must be referred back to
    Backward,
    /// Both passes
    Both,
}

impl Direction {
    /// Whether the forward pass runs
    pub fn runs_forward(self) -> bool {
        matches!(self, Direction::Forward | Direction::Both)
    }

    /// Whether the backward pass runs
    pub fn runs_backward(self) -> bool {
        matches!(self, Direction::Backward | Direction::Both)
    }
}

/// Which directions escalate "no link found" to a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Required {
    /// Neither direction escalates
    #[default]
    None,
    /// Unlinked sources are errors
    Forward,
    /// Unreferenced targets are errors
    Backward,
    /// Both
    Both,
}

impl Required {
    /// Whether unlinked sources are escalated
    pub fn on_forward(self) -> bool {
        matches!(self, Required::Forward | Required::Both)
    }

    /// Whether unreferenced targets are escalated
    pub fn on_backward(self) -> bool {
        matches!(self, Required::Backward | Required::Both)
    }
}

/// One child-to-target link assertion
#[derive(Debug, Clone)]
pub struct Assertion {
    /// Selects the referring value relative to a source node
    pub child: XPathHandle,
    /// Selects candidate targets relative to the rule's context node
    pub target: XPathHandle,
}

/// A compiled link rule
#[derive(Debug, Clone)]
pub struct Rule {
    source: XPathHandle,
    assertions: IndexMap<String, Assertion>,
    direction: Direction,
    required: Required,
}

impl Rule {
    /// Start building a rule from its source expression
    pub fn builder(source: impl Into<String>) -> RuleBuilder {
        RuleBuilder::new(source)
    }

    /// The source handle
    pub fn source(&self) -> &XPathHandle {
        &self.source
    }

    /// The rule's direction
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The rule's required-ness mode
    pub fn required(&self) -> Required {
        self.required
    }

    /// The assertions in declaration order
    pub fn assertions(&self) -> impl Iterator<Item = &Assertion> {
        self.assertions.values()
    }

    /// Number of assertions
    pub fn assertion_count(&self) -> usize {
        self.assertions.len()
    }

    /// Check link integrity at `node`, appending findings to `out`
    ///
    /// `prefix` qualifies diagnostic XPaths only; selection stays relative
    /// to `node`.
    pub fn validate(&self, node: Node, prefix: Option<&XPathHandle>, out: &mut Vec<Diagnostic>) {
        LinkValidator::new(&self.source, &self.assertions, self.direction, self.required)
            .validate(node, prefix, out);
    }
}

/// Builder for [`Rule`]
#[derive(Debug, Clone)]
pub struct RuleBuilder {
    source: String,
    direction: Direction,
    required: Required,
    asserts: Vec<(String, String)>,
}

impl RuleBuilder {
    /// Create a builder for a rule with the given source expression
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            direction: Direction::default(),
            required: Required::default(),
            asserts: Vec::new(),
        }
    }

    /// Set the direction
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Set the required-ness mode
    pub fn required(mut self, required: Required) -> Self {
        self.required = required;
        self
    }

    /// Add a child-to-target assertion
    pub fn assert(mut self, child: impl Into<String>, target: impl Into<String>) -> Self {
        self.asserts.push((child.into(), target.into()));
        self
    }

    /// Compile against a namespace binding table
    pub fn compile(self, namespaces: &Arc<NamespaceBindings>) -> Result<Rule> {
        let source = scalar_handle(self.source, namespaces)?;

        if self.asserts.is_empty() {
            return Err(Error::Schema(format!(
                "rule '{}' must have at least one assertion",
                source.expression()
            )));
        }

        let mut assertions = IndexMap::new();
        for (child_expr, target_expr) in self.asserts {
            let child = scalar_handle(child_expr.clone(), namespaces)?;
            let target = scalar_handle(target_expr, namespaces)?;
            if assertions
                .insert(child_expr.clone(), Assertion { child, target })
                .is_some()
            {
                return Err(Error::Schema(format!(
                    "duplicate assertion child '{}' in rule '{}'",
                    child_expr,
                    source.expression()
                )));
            }
        }

        Ok(Rule {
            source,
            assertions,
            direction: self.direction,
            required: self.required,
        })
    }
}

/// Rule expressions must extract a comparable string.
fn scalar_handle(expression: String, namespaces: &Arc<NamespaceBindings>) -> Result<XPathHandle> {
    let handle = XPathHandle::compile(expression, Arc::clone(namespaces))?;
    if !handle.value_kind().is_scalar() {
        return Err(Error::Schema(format!(
            "expression '{}' must end in /text() or /@NAME/text()",
            handle.expression()
        )));
    }
    Ok(handle)
}
