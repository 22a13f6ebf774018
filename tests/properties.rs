use proptest::prelude::*;
use std::collections::BTreeMap;
use xmlentity::{Document, decode_content, legalize_comment, legalize_content, legalize_name};

/// A name that legalization leaves unchanged
fn legal_name() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z_][a-zA-Z0-9_.-]{0,8}").unwrap()
}

/// Printable single-line text, without surrounding whitespace
fn content() -> impl Strategy<Value = String> {
    prop::string::string_regex("([!-~]([ -~]{0,20}[!-~])?)?").unwrap()
}

/// Any printable single-line text
fn value() -> impl Strategy<Value = String> {
    prop::string::string_regex("[ -~]{0,20}").unwrap()
}

#[derive(Debug, Clone)]
struct Item {
    name: String,
    content: String,
    attributes: BTreeMap<String, String>,
}

fn item() -> impl Strategy<Value = Item> {
    (
        legal_name(),
        content(),
        prop::collection::btree_map(legal_name(), value(), 0..4),
    )
        .prop_map(|(name, content, attributes)| Item {
            name,
            content,
            attributes,
        })
}

fn build(root: &Item, children: &[Item]) -> Document {
    let mut doc = Document::new();
    doc.new_root(&root.name);
    for (name, value) in &root.attributes {
        doc.attribute(name, value);
    }

    for child in children {
        doc.begin(&child.name);
        for (name, value) in &child.attributes {
            doc.attribute(name, value);
        }
        doc.content(&child.content);
        doc.end();
    }

    doc.end();
    doc
}

proptest! {
    #[test]
    fn legalize_name_is_idempotent(text in any::<String>()) {
        let once = legalize_name(&text);
        prop_assert!(!once.is_empty());
        prop_assert_eq!(legalize_name(&once), once);
    }

    #[test]
    fn legal_names_are_unchanged(name in legal_name()) {
        prop_assert_eq!(legalize_name(&name), name);
    }

    #[test]
    fn decode_reverses_legalize_content(text in any::<String>()) {
        prop_assert_eq!(decode_content(&legalize_content(&text)), text);
    }

    #[test]
    fn legalized_comments_have_no_double_dash(text in "[-a ]{0,30}") {
        prop_assert!(!legalize_comment(&text).contains("--"));
    }

    #[test]
    fn built_tree_survives_parsing(root in item(), children in prop::collection::vec(item(), 0..6)) {
        let mut doc = build(&root, &children);
        let xml = doc.to_xml().unwrap();

        let parsed = match Document::parse_str(&xml) {
            Ok(parsed) => parsed,
            Err(e) => return Err(TestCaseError::fail(format!("{e}\n{xml}"))),
        };
        prop_assert_eq!(parsed.root(), doc.root());
    }
}
