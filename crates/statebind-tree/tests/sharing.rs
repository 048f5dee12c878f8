//! Structural-sharing guarantees of `advance`, exercised the way the
//! engine relies on them.

use statebind_tree::{Path, Value, advance, tree};

#[test]
fn identity_mutator_changes_nothing() {
    let old = tree!({ "state": { "foo": {}, "bar": [1, 2] } });
    let new = advance(&old, |_draft| {});
    assert!(old.same(&new));
    assert!(old.at("state.bar").unwrap().same(new.at("state.bar").unwrap()));
}

#[test]
fn edit_copies_only_the_spine() {
    let old = tree!({
        "state": {
            "items": [ { "name": "a" }, { "name": "b" } ],
            "meta": { "count": 2 },
        }
    });
    let new = advance(&old, |draft| {
        draft.set_at("state.items[1].name", "B").unwrap();
    });

    // Spine: root, state, items, items[1] are new allocations.
    assert!(!old.same(&new));
    assert!(!old.at("state").unwrap().same(new.at("state").unwrap()));
    assert!(!old.at("state.items").unwrap().same(new.at("state.items").unwrap()));
    assert!(!old.at("state.items[1]").unwrap().same(new.at("state.items[1]").unwrap()));

    // Siblings off the spine stay shared.
    assert!(old.at("state.meta").unwrap().same(new.at("state.meta").unwrap()));
    assert!(old.at("state.items[0]").unwrap().same(new.at("state.items[0]").unwrap()));
}

#[test]
fn pop_keeps_survivors_shared() {
    let old = tree!({ "xs": [ { "n": 1 }, { "n": 2 }, { "n": 3 } ] });
    let new = advance(&old, |draft| {
        let _ = draft.pop_at("xs").unwrap();
    });
    assert_eq!(new.at("xs").unwrap().len(), 2);
    assert!(old.at("xs[0]").unwrap().same(new.at("xs[0]").unwrap()));
    assert!(old.at("xs[1]").unwrap().same(new.at("xs[1]").unwrap()));
    assert_eq!(old.at("xs").unwrap().len(), 3);
}

#[test]
fn chained_advances_accumulate() {
    let s0 = Value::empty_map();
    let s1 = advance(&s0, |d| *d = tree!({ "n": 0 }));
    let s2 = advance(&s1, |d| {
        let n = d.at("n").unwrap().as_int().unwrap();
        d.set_at("n", n + 1).unwrap();
    });
    let s3 = advance(&s2, |d| {
        let n = d.at("n").unwrap().as_int().unwrap();
        d.set_at("n", n + 1).unwrap();
    });
    assert_eq!(s1.at("n").unwrap().as_int(), Some(0));
    assert_eq!(s2.at("n").unwrap().as_int(), Some(1));
    assert_eq!(s3.at("n").unwrap().as_int(), Some(2));
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    fn segment_strategy() -> impl Strategy<Value = statebind_tree::Segment> {
        prop_oneof![
            "[a-z][a-z0-9_]{0,6}".prop_map(statebind_tree::Segment::from),
            (0usize..50).prop_map(statebind_tree::Segment::from),
        ]
    }

    proptest! {
        #[test]
        fn path_display_parse_round_trip(
            segs in prop::collection::vec(segment_strategy(), 1..8)
                .prop_filter("first segment must be a key", |s| {
                    matches!(s[0], statebind_tree::Segment::Key(_))
                })
        ) {
            let path: Path = segs.into_iter().collect();
            let text = path.to_string();
            prop_assert_eq!(Path::parse(&text).unwrap(), path);
        }

        #[test]
        fn untouched_sibling_stays_shared(n in 0i64..1000) {
            let old = tree!({ "touched": { "n": 0 }, "frozen": { "n": n } });
            let new = advance(&old, |d| d.set_at("touched.n", n).unwrap());
            prop_assert!(old.at("frozen").unwrap().same(new.at("frozen").unwrap()));
        }
    }
}
