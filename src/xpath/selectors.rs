//! Restricted XPath step parsing and evaluation
//!
//! Link rules use a restricted subset of XPath for node selection: the
//! child axis (default), `.`, `..`, `//` (descendant search), wildcard
//! and prefixed name tests, and predicates limited to a position index or
//! an attribute equality test. Anything outside the subset is rejected
//! when the schema is built.
//!
//! The attribute axis never appears in selection position; it is carried
//! by an expression's value suffix instead (see the handles module).

use crate::documents;
use crate::error::{Error, Result};
use crate::namespaces::{NamespaceBindings, QName};
use roxmltree::Node;

/// Kind of selection step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Self axis (`.`)
    SelfNode,
    /// Parent axis (`..`)
    Parent,
    /// Descendant-or-self axis (`//`)
    DescendantOrSelf,
    /// Child axis (default)
    Child,
}

/// Element name test within a step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameTest {
    /// Wildcard test (`*`)
    Any,
    /// Namespace wildcard (`prefix:*`), resolved to its URI
    NamespaceAny(String),
    /// Name test, prefix resolved to its URI at parse time
    Named {
        /// Required namespace URI; `None` matches the local name in any namespace
        namespace: Option<String>,
        /// Local element name
        local: String,
    },
}

impl NameTest {
    /// Check whether an element node satisfies this test
    pub fn matches(&self, node: Node) -> bool {
        let tag = node.tag_name();
        match self {
            NameTest::Any => true,
            NameTest::NamespaceAny(uri) => tag.namespace() == Some(uri.as_str()),
            NameTest::Named { namespace, local } => {
                if tag.name() != local {
                    return false;
                }
                match namespace {
                    Some(uri) => tag.namespace() == Some(uri.as_str()),
                    None => true,
                }
            }
        }
    }
}

/// Predicate within a step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Positional predicate (`[1]`), 1-based
    Position(usize),
    /// Attribute equality predicate (`[@name='value']`)
    AttributeEquals {
        /// Attribute name, prefix resolved at parse time
        name: QName,
        /// Required attribute value, compared untrimmed
        value: String,
    },
}

/// A single parsed selection step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// The axis
    pub kind: StepKind,
    /// The name test (always [`NameTest::Any`] for `.`, `..` and `//`)
    pub test: NameTest,
    /// Predicates, applied in order
    pub predicates: Vec<Predicate>,
}

impl Step {
    fn axis(kind: StepKind) -> Self {
        Self {
            kind,
            test: NameTest::Any,
            predicates: Vec::new(),
        }
    }
}

/// Split a selection expression into raw step strings
///
/// Handles `/` and `//` separators, with `//` emitted as its own `"//"`
/// pseudo-step. A leading `/` is tolerated; selection is always relative
/// to the node the steps are evaluated against.
pub fn split_steps(path: &str) -> Vec<&str> {
    let path = path.trim();
    if path.is_empty() {
        return Vec::new();
    }

    let mut steps = Vec::new();
    let mut rest = path;

    if let Some(tail) = rest.strip_prefix(".//") {
        steps.push(".");
        steps.push("//");
        rest = tail;
    } else if let Some(tail) = rest.strip_prefix("./") {
        steps.push(".");
        rest = tail;
    } else if rest == "." {
        return vec!["."];
    } else if let Some(tail) = rest.strip_prefix("//") {
        steps.push("//");
        rest = tail;
    } else if let Some(tail) = rest.strip_prefix('/') {
        rest = tail;
    }

    let bytes = rest.as_bytes();
    let mut depth = 0;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'[' => depth += 1,
            b']' => depth -= 1,
            b'/' if depth == 0 => {
                if i > start {
                    steps.push(&rest[start..i]);
                }
                if bytes.get(i + 1) == Some(&b'/') {
                    steps.push("//");
                    i += 1;
                }
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    if start < rest.len() {
        steps.push(&rest[start..]);
    }

    steps
}

/// Parse a selection expression into evaluatable steps
///
/// Prefixes are resolved against `ns` here, so evaluation never fails.
pub fn parse_steps(expression: &str, ns: &NamespaceBindings) -> Result<Vec<Step>> {
    split_steps(expression)
        .into_iter()
        .map(|raw| parse_step(expression, raw, ns))
        .collect()
}

fn parse_step(expression: &str, raw: &str, ns: &NamespaceBindings) -> Result<Step> {
    match raw {
        "." => return Ok(Step::axis(StepKind::SelfNode)),
        ".." => return Ok(Step::axis(StepKind::Parent)),
        "//" => return Ok(Step::axis(StepKind::DescendantOrSelf)),
        _ => {}
    }

    if raw.starts_with('@') || raw.starts_with("attribute::") {
        return Err(Error::xpath(
            expression,
            "attribute axis is only supported in a value suffix",
        ));
    }
    if let Some(pos) = raw.find("::") {
        let axis = &raw[..pos];
        if axis != "child" {
            return Err(Error::xpath(
                expression,
                format!("unsupported axis: {}", axis),
            ));
        }
    }

    let rest = raw.strip_prefix("child::").unwrap_or(raw);
    let (name_part, predicates) = extract_predicates(expression, rest, ns)?;
    let test = parse_name_test(expression, &name_part, ns)?;

    Ok(Step {
        kind: StepKind::Child,
        test,
        predicates,
    })
}

fn extract_predicates(
    expression: &str,
    step: &str,
    ns: &NamespaceBindings,
) -> Result<(String, Vec<Predicate>)> {
    let Some(first_bracket) = step.find('[') else {
        return Ok((step.to_string(), Vec::new()));
    };

    let mut predicates = Vec::new();
    let mut current = String::new();
    let mut depth = 0;

    for c in step[first_bracket..].chars() {
        match c {
            '[' => {
                if depth > 0 {
                    current.push(c);
                }
                depth += 1;
            }
            ']' => {
                depth -= 1;
                if depth == 0 {
                    predicates.push(parse_predicate(expression, &current, ns)?);
                    current.clear();
                } else {
                    current.push(c);
                }
            }
            _ if depth > 0 => current.push(c),
            _ => {
                return Err(Error::xpath(
                    expression,
                    "unexpected text after predicate",
                ));
            }
        }
    }
    if depth != 0 {
        return Err(Error::xpath(expression, "unclosed predicate"));
    }

    Ok((step[..first_bracket].to_string(), predicates))
}

fn parse_predicate(expression: &str, pred: &str, ns: &NamespaceBindings) -> Result<Predicate> {
    let pred = pred.trim();

    if let Ok(position) = pred.parse::<usize>() {
        if position == 0 {
            return Err(Error::xpath(expression, "positions are 1-based"));
        }
        return Ok(Predicate::Position(position));
    }

    if let Some(rest) = pred.strip_prefix('@') {
        if let Some((name, value)) = rest.split_once('=') {
            let name = name.trim();
            let value = value.trim();
            let unquoted = value
                .strip_prefix('\'')
                .and_then(|v| v.strip_suffix('\''))
                .or_else(|| value.strip_prefix('"').and_then(|v| v.strip_suffix('"')))
                .ok_or_else(|| {
                    Error::xpath(expression, "predicate value must be quoted")
                })?;
            return Ok(Predicate::AttributeEquals {
                name: ns.resolve_qname(name)?,
                value: unquoted.to_string(),
            });
        }
    }

    Err(Error::xpath(
        expression,
        format!("unsupported predicate: [{}]", pred),
    ))
}

fn parse_name_test(expression: &str, name: &str, ns: &NamespaceBindings) -> Result<NameTest> {
    if name == "*" {
        return Ok(NameTest::Any);
    }

    if let Some(prefix) = name.strip_suffix(":*") {
        return Ok(NameTest::NamespaceAny(ns.resolve(prefix)?.to_string()));
    }

    let (namespace, local) = match name.split_once(':') {
        Some((prefix, local)) => (Some(ns.resolve(prefix)?.to_string()), local),
        None => (None, name),
    };

    if !is_ncname(local) {
        return Err(Error::xpath(
            expression,
            format!("invalid element name: {}", local),
        ));
    }

    Ok(NameTest::Named {
        namespace,
        local: local.to_string(),
    })
}

/// Evaluate parsed steps against a context node
///
/// Returns matching nodes in document order without duplicates. An empty
/// step list selects the context node itself.
pub fn select<'a, 'input>(steps: &[Step], context: Node<'a, 'input>) -> Vec<Node<'a, 'input>> {
    let mut current = vec![context];

    for step in steps {
        let mut next: Vec<Node> = Vec::new();
        for &node in &current {
            match step.kind {
                StepKind::SelfNode => push_unique(&mut next, node),
                StepKind::Parent => {
                    if let Some(parent) = node.parent() {
                        push_unique(&mut next, parent);
                    }
                }
                StepKind::DescendantOrSelf => {
                    for descendant in node.descendants() {
                        push_unique(&mut next, descendant);
                    }
                }
                StepKind::Child => {
                    let mut matched: Vec<Node> = node
                        .children()
                        .filter(|c| c.is_element() && step.test.matches(*c))
                        .collect();
                    for predicate in &step.predicates {
                        matched = apply_predicate(predicate, matched);
                    }
                    for m in matched {
                        push_unique(&mut next, m);
                    }
                }
            }
        }
        next.sort_by_key(|n| n.range().start);
        current = next;
    }

    current
}

fn apply_predicate<'a, 'input>(
    predicate: &Predicate,
    nodes: Vec<Node<'a, 'input>>,
) -> Vec<Node<'a, 'input>> {
    match predicate {
        Predicate::Position(position) => {
            nodes.into_iter().nth(position - 1).into_iter().collect()
        }
        Predicate::AttributeEquals { name, value } => nodes
            .into_iter()
            .filter(|n| documents::attribute_value(*n, name) == Some(value.as_str()))
            .collect(),
    }
}

fn push_unique<'a, 'input>(nodes: &mut Vec<Node<'a, 'input>>, node: Node<'a, 'input>) {
    if !nodes.contains(&node) {
        nodes.push(node);
    }
}

/// Check if a string is a valid NCName (non-colonized name)
pub fn is_ncname(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names<'a>(nodes: &[Node<'a, '_>]) -> Vec<&'a str> {
        nodes.iter().map(|n| n.tag_name().name()).collect()
    }

    #[test]
    fn test_split_steps_simple() {
        assert_eq!(split_steps("a/b/c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_split_steps_leading_slash() {
        assert_eq!(split_steps("/a/b"), vec!["a", "b"]);
    }

    #[test]
    fn test_split_steps_descendant() {
        assert_eq!(split_steps("//a/b"), vec!["//", "a", "b"]);
        assert_eq!(split_steps(".//a"), vec![".", "//", "a"]);
        assert_eq!(split_steps("a//b"), vec!["a", "//", "b"]);
    }

    #[test]
    fn test_split_steps_composed_triple_slash() {
        // produced by prefix composition of two descendant searches
        assert_eq!(split_steps("//p///s"), vec!["//", "p", "//", "s"]);
    }

    #[test]
    fn test_split_steps_predicate_guard() {
        assert_eq!(split_steps("a[@href='x/y']/b"), vec!["a[@href='x/y']", "b"]);
    }

    #[test]
    fn test_split_steps_dot() {
        assert_eq!(split_steps("."), vec!["."]);
        assert_eq!(split_steps("./a"), vec![".", "a"]);
    }

    #[test]
    fn test_parse_rejects_attribute_step() {
        let ns = NamespaceBindings::new();
        assert!(parse_steps("@id", &ns).is_err());
        assert!(parse_steps("a/attribute::id", &ns).is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_axis() {
        let ns = NamespaceBindings::new();
        assert!(parse_steps("following-sibling::a", &ns).is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_prefix() {
        let ns = NamespaceBindings::new();
        let err = parse_steps("x:a", &ns).unwrap_err();
        assert!(matches!(err, Error::Namespace(_)));
    }

    #[test]
    fn test_parse_rejects_unsupported_predicate() {
        let ns = NamespaceBindings::new();
        assert!(parse_steps("a[last()]", &ns).is_err());
        assert!(parse_steps("a[@id=unquoted]", &ns).is_err());
        assert!(parse_steps("a[0]", &ns).is_err());
    }

    #[test]
    fn test_parse_resolves_prefix() {
        let mut ns = NamespaceBindings::new();
        ns.declare("x", "http://x.example");
        let steps = parse_steps("x:a", &ns).unwrap();
        assert_eq!(
            steps[0].test,
            NameTest::Named {
                namespace: Some("http://x.example".to_string()),
                local: "a".to_string(),
            }
        );
    }

    #[test]
    fn test_select_children_and_descendants() {
        let doc = roxmltree::Document::parse("<r><a><b/></a><b/><c/></r>").unwrap();
        let ns = NamespaceBindings::new();

        let steps = parse_steps("//b", &ns).unwrap();
        let found = select(&steps, doc.root());
        assert_eq!(found.len(), 2);
        assert_eq!(names(&found), vec!["b", "b"]);

        let root = doc.root_element();
        let steps = parse_steps("b", &ns).unwrap();
        assert_eq!(select(&steps, root).len(), 1);
    }

    #[test]
    fn test_select_document_order() {
        let doc = roxmltree::Document::parse("<r><a><x i='1'/></a><x i='2'/></r>").unwrap();
        let ns = NamespaceBindings::new();
        let steps = parse_steps("//x", &ns).unwrap();
        let found = select(&steps, doc.root());
        let order: Vec<_> = found
            .iter()
            .map(|n| n.attribute("i").unwrap())
            .collect();
        assert_eq!(order, vec!["1", "2"]);
    }

    #[test]
    fn test_select_namespaced() {
        let doc = roxmltree::Document::parse(
            r#"<r xmlns="http://u.example"><s/><s/></r>"#,
        )
        .unwrap();

        // unprefixed test matches the local name in any namespace
        let ns = NamespaceBindings::new();
        let steps = parse_steps("//s", &ns).unwrap();
        assert_eq!(select(&steps, doc.root()).len(), 2);

        // a prefixed test requires the resolved URI
        let mut ns = NamespaceBindings::new();
        ns.declare("u", "http://u.example");
        ns.declare("v", "http://other.example");
        let steps = parse_steps("//u:s", &ns).unwrap();
        assert_eq!(select(&steps, doc.root()).len(), 2);
        let steps = parse_steps("//v:s", &ns).unwrap();
        assert_eq!(select(&steps, doc.root()).len(), 0);
    }

    #[test]
    fn test_select_wildcard_and_parent() {
        let doc = roxmltree::Document::parse("<r><a/><b/></r>").unwrap();
        let ns = NamespaceBindings::new();

        let steps = parse_steps("*", &ns).unwrap();
        let found = select(&steps, doc.root_element());
        assert_eq!(names(&found), vec!["a", "b"]);

        let steps = parse_steps("a/..", &ns).unwrap();
        let found = select(&steps, doc.root_element());
        assert_eq!(names(&found), vec!["r"]);
    }

    #[test]
    fn test_select_predicates() {
        let doc =
            roxmltree::Document::parse("<r><i k='x'/><i k='y'/><i k='x'/></r>").unwrap();
        let ns = NamespaceBindings::new();

        let steps = parse_steps("i[2]", &ns).unwrap();
        let found = select(&steps, doc.root_element());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].attribute("k"), Some("y"));

        let steps = parse_steps("i[@k='x']", &ns).unwrap();
        assert_eq!(select(&steps, doc.root_element()).len(), 2);
    }

    #[test]
    fn test_select_no_duplicates() {
        let doc = roxmltree::Document::parse("<r><a><a/></a></r>").unwrap();
        let ns = NamespaceBindings::new();
        // nested same-name elements reached through two descendant hops
        let steps = parse_steps("//a//a", &ns).unwrap();
        let found = select(&steps, doc.root());
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_is_ncname() {
        assert!(is_ncname("element"));
        assert!(is_ncname("_private"));
        assert!(is_ncname("my-element.v2"));
        assert!(!is_ncname(""));
        assert!(!is_ncname("123start"));
        assert!(!is_ncname("ns:element"));
    }
}
