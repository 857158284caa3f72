use extract::Triple;
use proptest::prelude::*;
use query::{MAX_MERGED, merge_unique};
use std::collections::HashSet;

fn triple() -> impl Strategy<Value = Triple> {
    ("[a-c]", "[x-z]", "[0-2]").prop_map(|(s, p, o)| Triple::new(&s, &p, &o).unwrap())
}

proptest! {
    #[test]
    fn prop_merge_never_repeats_a_triple(
        passes in prop::collection::vec(prop::collection::vec(triple(), 0..12), 0..5)
    ) {
        let merged = merge_unique(passes.clone());
        let unique: HashSet<&Triple> = merged.iter().collect();
        prop_assert_eq!(unique.len(), merged.len());
        prop_assert!(merged.len() <= MAX_MERGED);

        let distinct: HashSet<&Triple> = passes.iter().flatten().collect();
        prop_assert_eq!(merged.len(), distinct.len().min(MAX_MERGED));
    }
}
