//! Property-based tests for module id classification.
//!
//! The classifier must be total over arbitrary strings and agree with the
//! segment rules for generated paths.

use bundle_sbom::resolve::is_external;
use proptest::prelude::*;

/// A path segment that is never `node_modules` and carries no separator
fn segment() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_.@-]{1,12}".prop_filter("not the vendor directory", |s| s != "node_modules")
}

fn path_of(segments: &[String], separator: char) -> String {
    let sep = separator.to_string();
    format!("{sep}{}", segments.join(&sep))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn classifier_doesnt_panic(s in "\\PC{0,200}") {
        let _ = is_external(&s);
    }

    #[test]
    fn virtual_ids_are_never_external(prefix in "\\PC{0,40}", suffix in "\\PC{0,40}") {
        let id = format!("{prefix}\0{suffix}");
        prop_assert!(!is_external(&id));

        let vendored = format!("{prefix}\0/proj/node_modules/{suffix}");
        prop_assert!(!is_external(&vendored));
    }

    #[test]
    fn vendor_segment_makes_external(
        before in prop::collection::vec(segment(), 0..4),
        after in prop::collection::vec(segment(), 1..4),
        separator in prop::sample::select(vec!['/', '\\']),
    ) {
        let mut segments = before;
        segments.push("node_modules".to_string());
        segments.extend(after);
        prop_assert!(is_external(&path_of(&segments, separator)));
    }

    #[test]
    fn first_party_paths_are_not_external(
        segments in prop::collection::vec(segment(), 1..6),
        separator in prop::sample::select(vec!['/', '\\']),
    ) {
        prop_assert!(!is_external(&path_of(&segments, separator)));
    }

    #[test]
    fn vendor_name_inside_a_segment_is_not_external(
        prefix in "[a-z]{1,6}",
        rest in prop::collection::vec(segment(), 0..3),
    ) {
        let mut segments = vec![format!("{prefix}node_modules")];
        segments.extend(rest);
        prop_assert!(!is_external(&path_of(&segments, '/')));
    }
}
