//! Validation diagnostics
//!
//! A [`Diagnostic`] describes one broken or missing link. Diagnostics are
//! plain data accumulated in evaluation order; the `Display` impl renders
//! the one-line wire format the CLI writes to standard error.

use std::fmt;

/// One validation finding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A selected node produced no extractable string
    ValueMissing {
        /// Qualified XPath of the handle that selected the node
        xpath: String,
        /// Source line of the offending node
        line: u32,
    },
    /// A required-forward rule found a source with no assertion child at all
    ChildMissing {
        /// Qualified XPath of the source
        parent_xpath: String,
        /// Qualified XPath of the missing child
        child_xpath: String,
        /// Source line of the source node
        line: u32,
        /// The source node's extracted value
        value: String,
    },
    /// A value extracted on one side has no matching value on the other
    LinkBroken {
        /// Qualified XPath of the side the value was read from
        source_xpath: String,
        /// Qualified XPath of the side that failed to match it
        target_xpath: String,
        /// Source line of the node carrying the value
        line: u32,
        /// The unmatched value
        value: String,
    },
}

impl Diagnostic {
    /// Source line the finding points at
    pub fn line(&self) -> u32 {
        match self {
            Diagnostic::ValueMissing { line, .. }
            | Diagnostic::ChildMissing { line, .. }
            | Diagnostic::LinkBroken { line, .. } => *line,
        }
    }
}

/// Escape embedded quotes for the quoted substrings of the wire format
fn escape(s: &str) -> String {
    s.replace('"', "\\\"")
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ValueMissing { xpath, line } => {
                write!(f, "element \"{}\" on line {} is REQUIRED", escape(xpath), line)
            }
            Diagnostic::ChildMissing {
                parent_xpath,
                child_xpath,
                line,
                value,
            } => write!(
                f,
                "parent element \"{}\" on line {} with text \"{}\": child element \"{}\" IS REQUIRED",
                escape(parent_xpath),
                line,
                escape(value),
                escape(child_xpath),
            ),
            Diagnostic::LinkBroken {
                source_xpath,
                target_xpath,
                line,
                value,
            } => write!(
                f,
                "source element \"{}\" on line {}: target element \"{}\" with text \"{}\" is NOT FOUND",
                escape(source_xpath),
                line,
                escape(target_xpath),
                escape(value),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_value_missing_format() {
        let d = Diagnostic::ValueMissing {
            xpath: "//s/@id/text()".to_string(),
            line: 4,
        };
        assert_eq!(
            d.to_string(),
            "element \"//s/@id/text()\" on line 4 is REQUIRED"
        );
    }

    #[test]
    fn test_child_missing_format() {
        let d = Diagnostic::ChildMissing {
            parent_xpath: "//s/@id/text()".to_string(),
            child_xpath: "//s/ref/@IDref/text()".to_string(),
            line: 2,
            value: "site-1".to_string(),
        };
        assert_eq!(
            d.to_string(),
            "parent element \"//s/@id/text()\" on line 2 with text \"site-1\": \
             child element \"//s/ref/@IDref/text()\" IS REQUIRED"
        );
    }

    #[test]
    fn test_link_broken_format() {
        let d = Diagnostic::LinkBroken {
            source_xpath: "//s/@id/text()".to_string(),
            target_xpath: "//t/@id/text()".to_string(),
            line: 7,
            value: "m-42".to_string(),
        };
        assert_eq!(
            d.to_string(),
            "source element \"//s/@id/text()\" on line 7: \
             target element \"//t/@id/text()\" with text \"m-42\" is NOT FOUND"
        );
    }

    #[test]
    fn test_quote_escaping() {
        let d = Diagnostic::ValueMissing {
            xpath: "//s[@k=\"v\"]".to_string(),
            line: 1,
        };
        assert_eq!(
            d.to_string(),
            "element \"//s[@k=\\\"v\\\"]\" on line 1 is REQUIRED"
        );
    }
}
