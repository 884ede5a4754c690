//! Property tests for the modifier laws.

use std::sync::Arc;

use proptest::prelude::*;
use tabmod_model::{Cell, Table};
use tabmod_transform::{
    ChainModifier, ChainOptions, GroupModifier, GroupOptions, InvertModifier, Modifier,
    RangeModifier, RangeOptions, RangeSpec, SortDirection, SortModifier, SortOptions,
    sorted_indices,
};

fn cell() -> impl Strategy<Value = Cell> {
    prop_oneof![
        Just(Cell::Undefined),
        any::<bool>().prop_map(Cell::Boolean),
        (-1000i32..1000).prop_map(Cell::from),
        "[a-c]{0,2}".prop_map(Cell::String),
    ]
}

/// Tables with up to four uniquely named columns and up to six rows.
fn table() -> impl Strategy<Value = Table> {
    (
        prop::collection::btree_set("[a-z]{1,4}", 0..4),
        0usize..6,
    )
        .prop_flat_map(|(names, rows)| {
            let names: Vec<String> = names.into_iter().collect();
            let width = names.len();
            (
                Just(names),
                prop::collection::vec(prop::collection::vec(cell(), rows), width),
            )
        })
        .prop_map(|(names, columns)| Table::from_columns(names.into_iter().zip(columns)))
}

/// Tables with a numeric `y` column and a `label` column of row indices.
fn labeled() -> impl Strategy<Value = Table> {
    prop::collection::vec(-5i32..5, 0..12).prop_map(|ys| {
        let labels = (0..ys.len()).map(|i| Cell::from(i as i32)).collect();
        Table::from_columns([
            ("y", ys.into_iter().map(Cell::from).collect()),
            ("label", labels),
        ])
    })
}

proptest! {
    #[test]
    fn invert_is_an_involution(original in table()) {
        let invert = InvertModifier::new();
        let mut table = original.clone();
        invert.modify(&mut table, None);
        invert.modify(&mut table, None);
        prop_assert_eq!(table, original);
    }

    #[test]
    fn sort_is_stable_in_both_directions(keys in prop::collection::vec(-3i32..3, 0..20)) {
        let cells: Vec<Cell> = keys.iter().map(|&k| Cell::from(k)).collect();
        for direction in [SortDirection::Asc, SortDirection::Desc] {
            let order = sorted_indices(&cells, direction);
            for pair in order.windows(2) {
                let (a, b) = (keys[pair[0]], keys[pair[1]]);
                match direction {
                    SortDirection::Asc => prop_assert!(a <= b),
                    SortDirection::Desc => prop_assert!(a >= b),
                }
                if a == b {
                    prop_assert!(pair[0] < pair[1]);
                }
            }
        }
    }

    #[test]
    fn chain_equals_sequential_application(original in labeled(), low in -5i32..5, span in 0i32..6) {
        let range: Arc<dyn Modifier> = Arc::new(
            RangeModifier::new(
                RangeOptions::default().with_range(RangeSpec::new("y", low, low + span)),
            )
            .unwrap(),
        );
        let sort: Arc<dyn Modifier> = Arc::new(SortModifier::new(
            SortOptions::default().with_direction(SortDirection::Asc),
        ));

        let mut expected = original.clone();
        sort.modify(range.modify(&mut expected, None), None);

        let forward = ChainModifier::new(
            ChainOptions::default(),
            vec![Arc::clone(&range), Arc::clone(&sort)],
        );
        let mut chained = original.clone();
        forward.modify(&mut chained, None);
        prop_assert_eq!(&chained, &expected);

        let reversed = ChainModifier::new(
            ChainOptions { reverse: true },
            vec![Arc::clone(&sort), Arc::clone(&range)],
        );
        let mut reversed_table = original.clone();
        reversed.modify(&mut reversed_table, None);
        prop_assert_eq!(&reversed_table, &expected);
        prop_assert_eq!(reversed.modifiers()[0].kind(), sort.kind());
    }

    #[test]
    fn groups_partition_the_defined_rows(keys in prop::collection::vec(
        prop_oneof![Just(Cell::Undefined), (0i32..4).prop_map(Cell::from)],
        0..15,
    )) {
        let defined = keys.iter().filter(|k| !k.is_undefined()).count();
        let mut table = Table::from_columns([("k", keys)]);
        GroupModifier::new(GroupOptions::default())
            .unwrap()
            .modify(&mut table, None);

        let subtables = table.column("table").unwrap();
        let total: usize = subtables
            .iter()
            .map(|cell| cell.as_table().map_or(0, Table::row_count))
            .sum();
        prop_assert_eq!(total, defined);

        let values = table.column("value").unwrap();
        for (index, value) in values.iter().enumerate() {
            prop_assert!(!values[..index].contains(value));
            let group = subtables[index].as_table().unwrap();
            prop_assert!(group.column("k").unwrap().iter().all(|k| k == value));
        }
    }
}
