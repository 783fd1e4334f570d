//! XML document handling
//!
//! The thin seam between the link engine and `roxmltree`: parse and load
//! helpers plus the node-level accessors (line attribution, namespaced
//! attribute lookup, text extraction) that value handles read through.

use crate::error::{Error, Result};
use crate::namespaces::QName;
use roxmltree::Node;
use std::fs;
use std::path::Path;

/// Maximum accepted document size in bytes
pub const MAX_DOCUMENT_BYTES: usize = 64 * 1024 * 1024;

/// Read a document's text from a file, enforcing the size limit
pub fn read_document_text(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| {
        Error::Resource(format!("failed to read file '{}': {}", path.display(), e))
    })?;

    if text.len() > MAX_DOCUMENT_BYTES {
        return Err(Error::Resource(format!(
            "document '{}' exceeds the {} byte limit",
            path.display(),
            MAX_DOCUMENT_BYTES
        )));
    }

    Ok(text)
}

/// Parse document text into a roxmltree document
pub fn parse_document(text: &str) -> Result<roxmltree::Document<'_>> {
    Ok(roxmltree::Document::parse(text)?)
}

/// 1-based line number of a node in its source text
pub fn node_line(node: Node) -> u32 {
    node.document().text_pos_at(node.range().start).row
}

/// Look up an attribute by qualified name, untrimmed
pub fn attribute_value<'a>(node: Node<'a, '_>, name: &QName) -> Option<&'a str> {
    match &name.namespace {
        Some(ns) => node.attribute((ns.as_str(), name.local.as_str())),
        None => node.attribute(name.local.as_str()),
    }
}

/// Concatenated text of a node whose children are all text nodes
///
/// Mixed content and element children disqualify the node; the result is
/// trimmed and an all-whitespace or empty result is `None`.
pub fn text_content(node: Node) -> Option<String> {
    let mut buf = String::new();
    for child in node.children() {
        if !child.is_text() {
            return None;
        }
        buf.push_str(child.text().unwrap_or(""));
    }

    let trimmed = buf.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "<root>test</root>").unwrap();

        let text = read_document_text(file.path()).unwrap();
        assert!(text.contains("<root>test</root>"));
    }

    #[test]
    fn test_read_missing_file() {
        let result = read_document_text("/nonexistent/document.xml");
        assert!(matches!(result, Err(Error::Resource(_))));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(parse_document("<r><unclosed></r>").is_err());
    }

    #[test]
    fn test_node_line() {
        let text = "<r>\n  <a/>\n  <b/>\n</r>";
        let doc = parse_document(text).unwrap();
        let b = doc
            .descendants()
            .find(|n| n.has_tag_name("b"))
            .unwrap();
        assert_eq!(node_line(b), 3);
    }

    #[test]
    fn test_attribute_value_plain_and_namespaced() {
        let text = r#"<r xmlns:x="http://x.example"><a id="1" x:ref="2"/></r>"#;
        let doc = parse_document(text).unwrap();
        let a = doc.descendants().find(|n| n.has_tag_name("a")).unwrap();

        assert_eq!(attribute_value(a, &QName::local("id")), Some("1"));
        assert_eq!(
            attribute_value(a, &QName::namespaced("http://x.example", "ref")),
            Some("2")
        );
        assert_eq!(attribute_value(a, &QName::local("missing")), None);
    }

    #[test]
    fn test_text_content() {
        let doc = parse_document("<r><a>  hello  </a><b><c/></b><d/><e>   </e></r>").unwrap();
        let find = |name: &str| doc.descendants().find(|n| n.has_tag_name(name)).unwrap();

        assert_eq!(text_content(find("a")).as_deref(), Some("hello"));
        // element child disqualifies
        assert_eq!(text_content(find("b")), None);
        // no children at all yields no value
        assert_eq!(text_content(find("d")), None);
        // whitespace-only collapses to no value
        assert_eq!(text_content(find("e")), None);
    }
}
