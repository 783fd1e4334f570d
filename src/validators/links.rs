//! Bidirectional link validation
//!
//! The [`LinkValidator`] is the engine core: given a source handle, an
//! ordered child-to-target assertion map, a direction and a required-ness
//! mode, it checks link integrity at one context node and appends typed
//! diagnostics in evaluation order.
//!
//! A node that selects but yields no value is always reported as
//! [`Diagnostic::ValueMissing`]. Aggregate findings (a source with no
//! surviving link or no assertion child at all, a target no child value
//! refers back to) are gated by the required mode for their direction.
//! A source must link through at least one of its assertions, so that
//! judgement is made only after every assertion has been scanned.

use crate::documents::node_line;
use crate::validators::diagnostics::Diagnostic;
use crate::validators::rules::{Assertion, Direction, Required};
use crate::xpath::XPathHandle;
use indexmap::IndexMap;
use roxmltree::Node;

/// Checks link integrity for one rule at one context node
///
/// Stateless across calls; the borrowed handles live in the owning
/// [`Rule`](crate::validators::Rule).
pub struct LinkValidator<'r> {
    source: &'r XPathHandle,
    targets: &'r IndexMap<String, Assertion>,
    direction: Direction,
    required: Required,
}

/// Prefix is a display construct only; selection never goes through it.
fn qualify(prefix: Option<&XPathHandle>, handle: &XPathHandle) -> String {
    match prefix {
        Some(p) => p.compose(handle).to_string(),
        None => handle.to_string(),
    }
}

impl<'r> LinkValidator<'r> {
    /// Create a validator over borrowed rule parts
    pub fn new(
        source: &'r XPathHandle,
        targets: &'r IndexMap<String, Assertion>,
        direction: Direction,
        required: Required,
    ) -> Self {
        Self {
            source,
            targets,
            direction,
            required,
        }
    }

    /// Run the configured passes at `context`, appending to `out`
    pub fn validate(
        &self,
        context: Node,
        prefix: Option<&XPathHandle>,
        out: &mut Vec<Diagnostic>,
    ) {
        if self.direction.runs_forward() {
            self.forward(context, prefix, out);
        }
        if self.direction.runs_backward() {
            self.backward(context, prefix, out);
        }
    }

    /// Every source value must link through at least one assertion.
    fn forward(&self, context: Node, prefix: Option<&XPathHandle>, out: &mut Vec<Diagnostic>) {
        for sn in self.source.select(context) {
            let Some(sv) = self.source.value_of(sn) else {
                out.push(Diagnostic::ValueMissing {
                    xpath: qualify(prefix, self.source),
                    line: node_line(sn),
                });
                continue;
            };

            let mut any_link = false;
            let mut is_parent = false;
            for assertion in self.targets.values() {
                let child_path = self.source.compose(&assertion.child);
                for cn in assertion.child.select(sn) {
                    let Some(cv) = assertion.child.value_of(cn) else {
                        out.push(Diagnostic::ValueMissing {
                            xpath: qualify(prefix, &child_path),
                            line: node_line(cn),
                        });
                        continue;
                    };
                    is_parent = true;

                    let mut matched = false;
                    for tn in assertion.target.select(context) {
                        match assertion.target.value_of(tn) {
                            Some(tv) => {
                                if tv == cv {
                                    matched = true;
                                }
                            }
                            None => out.push(Diagnostic::ValueMissing {
                                xpath: qualify(prefix, &assertion.target),
                                line: node_line(tn),
                            }),
                        }
                    }
                    if matched {
                        any_link = true;
                    }
                }
            }

            if !self.required.on_forward() {
                continue;
            }
            if is_parent && !any_link {
                for assertion in self.targets.values() {
                    out.push(Diagnostic::LinkBroken {
                        source_xpath: qualify(prefix, &self.source.compose(&assertion.child)),
                        target_xpath: qualify(prefix, &assertion.target),
                        line: node_line(sn),
                        value: sv.clone(),
                    });
                }
            } else if !is_parent {
                for assertion in self.targets.values() {
                    out.push(Diagnostic::ChildMissing {
                        parent_xpath: qualify(prefix, self.source),
                        child_xpath: qualify(prefix, &self.source.compose(&assertion.child)),
                        line: node_line(sn),
                        value: sv.clone(),
                    });
                }
            }
        }
    }

    /// Every target value must be referred back to by some child value.
    fn backward(&self, context: Node, prefix: Option<&XPathHandle>, out: &mut Vec<Diagnostic>) {
        for assertion in self.targets.values() {
            for tn in assertion.target.select(context) {
                let Some(tv) = assertion.target.value_of(tn) else {
                    out.push(Diagnostic::ValueMissing {
                        xpath: qualify(prefix, &assertion.target),
                        line: node_line(tn),
                    });
                    continue;
                };

                let mut any = false;
                for referrer in self.targets.values() {
                    let child_path = self.source.compose(&referrer.child);
                    for sn in self.source.select(context) {
                        if self.source.value_of(sn).is_none() {
                            out.push(Diagnostic::ValueMissing {
                                xpath: qualify(prefix, self.source),
                                line: node_line(sn),
                            });
                            continue;
                        }
                        for cn in referrer.child.select(sn) {
                            match referrer.child.value_of(cn) {
                                Some(cv) => {
                                    if cv == tv {
                                        any = true;
                                    }
                                }
                                None => out.push(Diagnostic::ValueMissing {
                                    xpath: qualify(prefix, &child_path),
                                    line: node_line(cn),
                                }),
                            }
                        }
                    }
                }

                if !any && self.required.on_backward() {
                    for referrer in self.targets.values() {
                        out.push(Diagnostic::LinkBroken {
                            source_xpath: qualify(prefix, &assertion.target),
                            target_xpath: qualify(
                                prefix,
                                &self.source.compose(&referrer.child),
                            ),
                            line: node_line(tn),
                            value: tv.clone(),
                        });
                    }
                }
            }
        }
    }
}
