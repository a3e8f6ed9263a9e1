//! Property tests for data path text handling

use lcm_datapath::{DataPath, DataPathJoin};
use proptest::prelude::*;

fn name() -> impl Strategy<Value = String> {
    "[A-Z][A-Z0-9_]{0,9}"
}

fn field() -> impl Strategy<Value = String> {
    (any::<bool>(), name()).prop_map(|(calc, n)| if calc { format!("@{n}") } else { n })
}

/// Root table, `(from_field, to_table, to_field)` hops, target field
fn path() -> impl Strategy<Value = DataPath> {
    (
        name(),
        proptest::collection::vec((name(), name(), name()), 0..5),
        field(),
    )
        .prop_map(|(root, hops, target)| {
            let mut current = root.clone();
            let mut joins = Vec::with_capacity(hops.len());
            for (from_field, to_table, to_field) in hops {
                joins.push(DataPathJoin::new(current.clone(), from_field, to_table.clone(), to_field));
                current = to_table;
            }
            DataPath::new(root, joins, target).unwrap()
        })
}

proptest! {
    #[test]
    fn prop_parse_display_round_trip(path in path()) {
        let parsed = DataPath::parse(&path.to_string()).unwrap();
        prop_assert_eq!(parsed, path);
    }

    #[test]
    fn prop_reverse_is_involution(path in path()) {
        prop_assert_eq!(path.reverse().reverse(), path);
    }

    #[test]
    fn prop_reverse_swaps_ends(path in path()) {
        let reversed = path.reverse();
        prop_assert_eq!(reversed.root_table(), path.target_table());
        prop_assert_eq!(reversed.target_table(), path.root_table());
        prop_assert_eq!(reversed.joins().len(), path.joins().len());
    }

    #[test]
    fn prop_equality_ignores_case(path in path()) {
        let lowered = DataPath::parse(&path.to_string().to_lowercase()).unwrap();
        prop_assert_eq!(lowered, path);
    }

    #[test]
    fn prop_parsed_chain_is_connected(path in path()) {
        let parsed = DataPath::parse(&path.to_string()).unwrap();
        for pair in parsed.joins().windows(2) {
            prop_assert!(pair[1].continues(&pair[0]));
        }
    }
}
