//! Property tests over generated expressions.

mod common;

use common::tokens;
use packrat::{GrammarSource, TokenKind};
use proptest::prelude::*;
use pygram::{parse_eval, Python};

fn name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,2}".prop_filter("reserved keyword", |s| {
        !Python::RESERVED_KEYWORDS.contains(&s.as_str())
    })
}

/// Words of a well formed expression.
fn expr_strategy() -> impl Strategy<Value = Vec<String>> {
    let leaf = prop_oneof![
        name_strategy().prop_map(|s| vec![s]),
        "[0-9]{1,3}".prop_map(|s| vec![s]),
    ];
    leaf.prop_recursive(4, 32, 3, |inner| {
        prop_oneof![
            (
                inner.clone(),
                prop::sample::select(vec![
                    "+", "-", "*", "/", "%", "**", "<<", "|", "&", "^", "==", "<",
                ]),
                inner.clone(),
            )
                .prop_map(|(mut left, op, right)| {
                    left.push(op.to_owned());
                    left.extend(right);
                    left
                }),
            inner.clone().prop_map(|e| {
                let mut words = vec!["(".to_owned()];
                words.extend(e);
                words.push(")".to_owned());
                words
            }),
            inner.clone().prop_map(|e| {
                let mut words = vec!["-".to_owned()];
                words.extend(e);
                words
            }),
            (name_strategy(), inner).prop_map(|(func, arg)| {
                let mut words = vec![func, "(".to_owned()];
                words.extend(arg);
                words.push(")".to_owned());
                words
            }),
        ]
    })
}

proptest! {
    #[test]
    fn generated_expressions_parse(words in expr_strategy()) {
        let toks = tokens(&words.join(" "));
        let ast = parse_eval(&toks);
        prop_assert!(ast.is_ok(), "{:?}: {:?}", words, ast);
        let ast = ast.unwrap();
        prop_assert_eq!(ast.end.index(), toks.len());

        // Every name, number and operator lands in the tree exactly once, in
        // source order.
        let leaves: Vec<&str> = ast
            .root
            .leaves()
            .into_iter()
            .filter(|leaf| leaf.kind() != TokenKind::EndMarker)
            .map(|leaf| leaf.text())
            .collect();
        let values: Vec<&str> = words
            .iter()
            .map(String::as_str)
            .filter(|w| *w != "(" && *w != ")")
            .collect();
        prop_assert_eq!(leaves, values);
    }

    #[test]
    fn repeated_parses_agree(words in expr_strategy()) {
        let toks = tokens(&words.join(" "));
        let first = parse_eval(&toks).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let second = parse_eval(&toks).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(first, second);
    }
}
