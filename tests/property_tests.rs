//! Property-based tests
//!
//! Generative check of the core contract: a document whose references all
//! resolve produces no findings, and removing any target surfaces the
//! dangling value.

use linkschema::validators::{Diagnostic, Direction, Pattern, Required, Rule, Schema, Scope};
use proptest::prelude::*;
use std::collections::HashSet;

fn id_schema() -> Schema {
    Schema::builder("ids")
        .pattern(
            Pattern::builder("links", "/r").scope(
                Scope::builder(".").rule(
                    Rule::builder("//s/@id/text()")
                        .direction(Direction::Both)
                        .required(Required::Both)
                        .assert("@id/text()", "//t/@id/text()"),
                ),
            ),
        )
        .build()
        .unwrap()
}

fn document_text(sources: &HashSet<String>, targets: &HashSet<String>) -> String {
    let mut xml = String::from("<r>");
    for id in sources {
        xml.push_str(&format!("<s id=\"{}\"/>", id));
    }
    for id in targets {
        xml.push_str(&format!("<t id=\"{}\"/>", id));
    }
    xml.push_str("</r>");
    xml
}

proptest! {
    #[test]
    fn resolvable_documents_are_clean(ids in prop::collection::hash_set("[a-z]{1,8}", 1..8)) {
        let text = document_text(&ids, &ids);
        let doc = roxmltree::Document::parse(&text).unwrap();
        prop_assert!(id_schema().validate(&doc).is_empty());
    }

    #[test]
    fn dropping_a_target_surfaces_the_value(ids in prop::collection::hash_set("[a-z]{1,8}", 2..8)) {
        let victim = ids.iter().next().unwrap().clone();
        let mut targets = ids.clone();
        targets.remove(&victim);

        let text = document_text(&ids, &targets);
        let doc = roxmltree::Document::parse(&text).unwrap();
        let out = id_schema().validate(&doc);

        prop_assert!(!out.is_empty());
        let victim_surfaced = out.iter().any(|d| matches!(
            d,
            Diagnostic::LinkBroken { value, .. } if value == &victim
        ));
        prop_assert!(victim_surfaced);
    }

    #[test]
    fn repeated_runs_agree(ids in prop::collection::hash_set("[a-z]{1,6}", 0..6)) {
        let mut targets = ids.clone();
        // drop every other target so some links dangle
        for id in ids.iter().skip(1).step_by(2) {
            targets.remove(id);
        }

        let text = document_text(&ids, &targets);
        let doc = roxmltree::Document::parse(&text).unwrap();
        let schema = id_schema();
        prop_assert_eq!(schema.validate(&doc), schema.validate(&doc));
    }
}
