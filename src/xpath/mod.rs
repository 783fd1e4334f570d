//! XPath support for link rules
//!
//! Link rules locate and compare nodes through a restricted XPath subset:
//! the [`selectors`] module parses and evaluates selection steps, and the
//! [`handles`] module layers value extraction on top via the expression's
//! trailing value suffix.
//!
//! ## Limitations
//!
//! This is not a general XPath 1.0 engine. Supported: child/self/parent
//! axes, descendant search (`//`), wildcards, prefixed name tests, and
//! positional or attribute-equality predicates. Everything else is
//! rejected when a schema is built.

pub mod handles;
pub mod selectors;

pub use handles::{ValueKind, XPathHandle};
pub use selectors::{is_ncname, split_steps, NameTest, Predicate, Step, StepKind};
