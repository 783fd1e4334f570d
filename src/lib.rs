//! # linkschema
//!
//! Cross-reference link validation for XML documents.
//!
//! A document carries `@ID` identifiers and `@IDref` (or textual)
//! references between elements; a [`Schema`] of declarative link rules
//! checks that every configured reference resolves to a matching
//! identifier under the rule's direction and required-ness policy, and
//! reports one typed [`Diagnostic`](validators::Diagnostic) per broken or
//! missing link.
//!
//! ## Example
//!
//! ```rust
//! use linkschema::validators::{Pattern, Required, Rule, Schema, Scope};
//!
//! let schema = Schema::builder("site links")
//!     .pattern(
//!         Pattern::builder("measures", "/r").scope(
//!             Scope::builder(".").rule(
//!                 Rule::builder("//measure/@id/text()")
//!                     .required(Required::Forward)
//!                     .assert("@id/text()", "//measureRef/@idref/text()"),
//!             ),
//!         ),
//!     )
//!     .build()?;
//!
//! let text = r#"<r><measure id="m1"/><measureRef idref="m1"/></r>"#;
//! let doc = roxmltree::Document::parse(text)?;
//! assert!(schema.validate(&doc).is_empty());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Validation findings are plain data returned in evaluation order;
//! engine faults (malformed expressions, unknown prefixes, unreadable
//! files) surface as [`Error`] values when the schema is built or the
//! document is loaded, never mixed into the finding stream.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod namespaces;

// Document access
pub mod documents;

// XPath subset
pub mod xpath;

// Link-rule engine
pub mod validators;

// Schema configuration files
pub mod config;

// Re-exports for convenience
pub use config::SchemaConfig;
pub use error::{Error, Result};
pub use validators::{Diagnostic, Schema};

/// Version of the linkschema library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
