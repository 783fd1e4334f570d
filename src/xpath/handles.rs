//! XPath value handles
//!
//! An [`XPathHandle`] wraps an XPath expression together with its namespace
//! bindings and the kind of value it extracts. The trailing *value suffix*
//! of the expression decides how a selected node is converted to a string:
//! `/@NAME/text()` reads attribute NAME, `/text()` reads the element's text
//! content, and anything else selects nodes without producing a value.
//!
//! Classification happens once, at handle construction, so evaluation is a
//! match on the derived [`ValueKind`] rather than repeated regex work.

use crate::documents;
use crate::error::{Error, Result};
use crate::namespaces::{NamespaceBindings, QName};
use crate::xpath::selectors::{self, Step};
use once_cell::sync::Lazy;
use regex::Regex;
use roxmltree::Node;
use std::fmt;
use std::sync::Arc;

static ATTRIBUTE_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|/)@([A-Za-z_][A-Za-z0-9_.\-]*(?::[A-Za-z_][A-Za-z0-9_.\-]*)?)/text\(\)$")
        .unwrap()
});
static TEXT_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|/)text\(\)$").unwrap());

/// How a handle converts a selected node to a comparable string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueKind {
    /// Read the named attribute, trimmed
    Attribute(QName),
    /// Read the element's text content, trimmed; mixed content disqualifies
    Text,
    /// Selection only, no value extraction
    Opaque,
}

impl ValueKind {
    /// Whether this kind extracts a scalar string
    pub fn is_scalar(&self) -> bool {
        !matches!(self, ValueKind::Opaque)
    }
}

/// A compiled XPath expression with namespace bindings and value kind
#[derive(Debug, Clone, PartialEq)]
pub struct XPathHandle {
    expression: String,
    namespaces: Arc<NamespaceBindings>,
    value_kind: ValueKind,
    selection: String,
    steps: Vec<Step>,
}

impl XPathHandle {
    /// Compile an expression against a namespace binding table
    ///
    /// Fails on out-of-subset syntax or an undeclared prefix, so a handle
    /// that compiles can always be evaluated.
    pub fn compile(
        expression: impl Into<String>,
        namespaces: Arc<NamespaceBindings>,
    ) -> Result<Self> {
        let expression = expression.into();
        let (selection, value_kind) = classify(&expression, &namespaces)?;
        let steps = selectors::parse_steps(&selection, &namespaces).map_err(|e| match e {
            Error::Xpath { message, .. } => Error::Xpath {
                expression: expression.clone(),
                message,
            },
            other => other,
        })?;

        Ok(Self {
            expression,
            namespaces,
            value_kind,
            selection,
            steps,
        })
    }

    /// The full original expression, as used in diagnostics
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// The expression with its value suffix stripped, used for selection
    pub fn without_value_suffix(&self) -> &str {
        &self.selection
    }

    /// The derived value kind
    pub fn value_kind(&self) -> &ValueKind {
        &self.value_kind
    }

    /// The namespace bindings this handle was compiled with
    pub fn namespaces(&self) -> &Arc<NamespaceBindings> {
        &self.namespaces
    }

    /// Select nodes relative to `node`, in document order
    pub fn select<'a, 'input>(&self, node: Node<'a, 'input>) -> Vec<Node<'a, 'input>> {
        selectors::select(&self.steps, node)
    }

    /// Extract this handle's value from a selected node
    ///
    /// `None` marks a node with no usable value: a missing or empty
    /// attribute, empty or mixed-content text, or an opaque handle.
    pub fn value_of(&self, node: Node) -> Option<String> {
        match &self.value_kind {
            ValueKind::Attribute(name) => documents::attribute_value(node, name)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string),
            ValueKind::Text => documents::text_content(node),
            ValueKind::Opaque => None,
        }
    }

    /// Compose this handle with another
    ///
    /// The result selects `other` relative to this handle's selection and
    /// extracts `other`'s value. Namespace maps are unioned with `other`'s
    /// bindings winning on collision.
    pub fn compose(&self, other: &XPathHandle) -> XPathHandle {
        let expression = format!("{}/{}", self.selection, other.expression);
        let selection = if other.selection.is_empty() {
            self.selection.clone()
        } else {
            format!("{}/{}", self.selection, other.selection)
        };
        let namespaces = if Arc::ptr_eq(&self.namespaces, &other.namespaces) {
            Arc::clone(&self.namespaces)
        } else {
            Arc::new(self.namespaces.merged(&other.namespaces))
        };
        let mut steps = self.steps.clone();
        steps.extend(other.steps.iter().cloned());

        XPathHandle {
            expression,
            namespaces,
            value_kind: other.value_kind.clone(),
            selection,
            steps,
        }
    }
}

impl fmt::Display for XPathHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expression)
    }
}

fn classify(expression: &str, ns: &NamespaceBindings) -> Result<(String, ValueKind)> {
    if let Some(caps) = ATTRIBUTE_SUFFIX.captures(expression) {
        let whole = caps.get(0).unwrap();
        let name = ns.resolve_qname(&caps[1])?;
        return Ok((
            expression[..whole.start()].to_string(),
            ValueKind::Attribute(name),
        ));
    }
    if let Some(m) = TEXT_SUFFIX.find(expression) {
        return Ok((expression[..m.start()].to_string(), ValueKind::Text));
    }
    Ok((expression.to_string(), ValueKind::Opaque))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bindings() -> Arc<NamespaceBindings> {
        let mut ns = NamespaceBindings::new();
        ns.declare("x", "http://x.example");
        Arc::new(ns)
    }

    fn handle(expr: &str) -> XPathHandle {
        XPathHandle::compile(expr, bindings()).unwrap()
    }

    #[test]
    fn test_attribute_suffix() {
        let h = handle("//s/@id/text()");
        assert_eq!(h.value_kind(), &ValueKind::Attribute(QName::local("id")));
        assert_eq!(h.without_value_suffix(), "//s");
        assert_eq!(h.expression(), "//s/@id/text()");
    }

    #[test]
    fn test_bare_attribute_suffix_selects_context() {
        let h = handle("@id/text()");
        assert_eq!(h.value_kind(), &ValueKind::Attribute(QName::local("id")));
        assert_eq!(h.without_value_suffix(), "");

        let doc = roxmltree::Document::parse(r#"<r><s id="7"/></r>"#).unwrap();
        let s = doc.descendants().find(|n| n.has_tag_name("s")).unwrap();
        let selected = h.select(s);
        assert_eq!(selected, vec![s]);
        assert_eq!(h.value_of(s).as_deref(), Some("7"));
    }

    #[test]
    fn test_prefixed_attribute_suffix() {
        let h = handle("//s/@x:ref/text()");
        assert_eq!(
            h.value_kind(),
            &ValueKind::Attribute(QName::namespaced("http://x.example", "ref"))
        );
    }

    #[test]
    fn test_text_suffix() {
        let h = handle("measure/name/text()");
        assert_eq!(h.value_kind(), &ValueKind::Text);
        assert_eq!(h.without_value_suffix(), "measure/name");
    }

    #[test]
    fn test_opaque() {
        let h = handle("//site/measure");
        assert_eq!(h.value_kind(), &ValueKind::Opaque);
        assert_eq!(h.without_value_suffix(), "//site/measure");
        assert!(!h.value_kind().is_scalar());
    }

    #[test]
    fn test_value_of_trims_and_rejects_empty() {
        let doc = roxmltree::Document::parse(r#"<r><s id="  1 "/><t id="   "/></r>"#).unwrap();
        let find = |name: &str| doc.descendants().find(|n| n.has_tag_name(name)).unwrap();

        let h = handle("@id/text()");
        assert_eq!(h.value_of(find("s")).as_deref(), Some("1"));
        assert_eq!(h.value_of(find("t")), None);
    }

    #[test]
    fn test_value_of_text_mixed_content() {
        let doc =
            roxmltree::Document::parse("<r><a> id-9 </a><b>text<i/>more</b></r>").unwrap();
        let find = |name: &str| doc.descendants().find(|n| n.has_tag_name(name)).unwrap();

        let h = handle("text()");
        assert_eq!(h.value_of(find("a")).as_deref(), Some("id-9"));
        assert_eq!(h.value_of(find("b")), None);
    }

    #[test]
    fn test_compose_display() {
        let prefix = handle("//p");
        let source = handle("//s/@id/text()");
        let composed = prefix.compose(&source);

        // display(A . B) = display(A).strip_value_suffix() + "/" + display(B)
        assert_eq!(composed.to_string(), "//p///s/@id/text()");
        assert_eq!(composed.without_value_suffix(), "//p///s");
        assert_eq!(composed.value_kind(), source.value_kind());
    }

    #[test]
    fn test_compose_strips_own_suffix_first() {
        let source = handle("//s/@id/text()");
        let child = handle("@id/text()");
        let composed = source.compose(&child);
        assert_eq!(composed.to_string(), "//s/@id/text()");
        assert_eq!(composed.without_value_suffix(), "//s");
    }

    #[test]
    fn test_compose_merges_namespaces_other_wins() {
        let mut a = NamespaceBindings::new();
        a.declare("n", "http://a.example");
        let mut b = NamespaceBindings::new();
        b.declare("n", "http://b.example");
        b.declare("m", "http://m.example");

        let ha = XPathHandle::compile("//p", Arc::new(a)).unwrap();
        let hb = XPathHandle::compile("//q", Arc::new(b)).unwrap();
        let composed = ha.compose(&hb);

        assert_eq!(composed.namespaces().get("n"), Some("http://b.example"));
        assert_eq!(composed.namespaces().get("m"), Some("http://m.example"));
    }

    #[test]
    fn test_compose_selects_through_prefix() {
        let doc = roxmltree::Document::parse("<r><p><s id='1'/></p><s id='2'/></r>").unwrap();
        let prefix = handle("//p");
        let source = handle("//s/@id/text()");
        let composed = prefix.compose(&source);

        let found = composed.select(doc.root());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].attribute("id"), Some("1"));
    }

    #[test]
    fn test_compile_rejects_bad_expressions() {
        assert!(XPathHandle::compile("//a[b", bindings()).is_err());
        assert!(XPathHandle::compile("//y:a", bindings()).is_err());
        assert!(XPathHandle::compile("//s/@y:ref/text()", bindings()).is_err());
    }
}
