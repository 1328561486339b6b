//! Property-based tests for name validation and output line reassembly.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use odoo_ci::domain::{AppName, LineSplitter};
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_valid_names_are_accepted(name in "[a-z0-9][a-z0-9_]{0,62}") {
        let parsed = AppName::parse(&name).expect("valid name");
        prop_assert_eq!(parsed.as_str(), name.as_str());
    }

    #[test]
    fn prop_names_with_shell_or_path_characters_are_rejected(
        prefix in "[a-z]{1,8}",
        bad in prop::sample::select(vec![' ', ';', '$', '`', '/', '.', '-', '"', '\'', '\n', 'A']),
        suffix in "[a-z]{0,8}",
    ) {
        let name = format!("{prefix}{bad}{suffix}");
        prop_assert!(AppName::parse(&name).is_err(), "accepted {name:?}");
    }

    #[test]
    fn prop_overlong_names_are_rejected(name in "[a-z]{64,80}") {
        prop_assert!(AppName::parse(&name).is_err());
    }

    #[test]
    fn prop_splitter_is_independent_of_chunking(
        lines in prop::collection::vec("[a-zA-Z0-9 :./]{0,20}", 0..8),
        cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..6),
    ) {
        let text: String = lines.iter().map(|l| format!("{l}\n")).collect();
        let bytes = text.as_bytes();

        let mut points: Vec<usize> = cuts.iter().map(|i| i.index(bytes.len() + 1)).collect();
        points.sort_unstable();
        points.dedup();

        let mut splitter = LineSplitter::new();
        let mut got = Vec::new();
        let mut start = 0;
        for point in points.into_iter().chain(std::iter::once(bytes.len())) {
            got.extend(splitter.push(&bytes[start..point]));
            start = point;
        }
        prop_assert_eq!(splitter.finish(), None);

        let expected: Vec<String> = lines.iter().map(|l| l.trim().to_string()).collect();
        prop_assert_eq!(got, expected);
    }
}
