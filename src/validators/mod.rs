//! Link-rule validators
//!
//! The schema object model and the engine that evaluates it: leaf
//! diagnostics, the bidirectional [`LinkValidator`], rules, contextual
//! scopes, patterns, and the [`Schema`] root with its builder.

pub mod diagnostics;
pub mod links;
pub mod rules;
pub mod schemas;
pub mod scopes;

pub use diagnostics::Diagnostic;
pub use links::LinkValidator;
pub use rules::{Assertion, Direction, Required, Rule, RuleBuilder};
pub use schemas::{PatternSummary, Schema, SchemaBuilder, SchemaSummary};
pub use scopes::{Pattern, PatternBuilder, Scope, ScopeBuilder};
