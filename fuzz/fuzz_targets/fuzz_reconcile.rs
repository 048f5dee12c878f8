//! Random mutation scripts through the engine: no panics, and the live
//! binding count always equals the number of currently matched keys.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use statebind::{Binding, Engine};
use statebind_tree::tree;

#[derive(Arbitrary, Debug)]
enum Op {
    Set(u8, i64),
    Remove(u8),
    Push(i64),
    Pop,
    Clear,
    Noop,
}

fuzz_target!(|script: Vec<Op>| {
    let mut engine = Engine::builder()
        .bind("root.*", Binding::new)
        .bind("root.xs[*]", Binding::new)
        .build();
    engine
        .apply(|d| *d = tree!({ "root": { "xs": [] } }))
        .unwrap();

    for op in script {
        engine
            .apply(move |draft| match op {
                Op::Set(k, v) => {
                    let key = format!("root.k{}", k % 8);
                    draft.set_at(&key, v).unwrap();
                }
                Op::Remove(k) => {
                    let key = format!("root.k{}", k % 8);
                    let _ = draft.remove_at(&key);
                }
                Op::Push(v) => {
                    let _ = draft.push_at("root.xs", v);
                }
                Op::Pop => {
                    let _ = draft.pop_at("root.xs");
                }
                Op::Clear => *draft = tree!({ "root": { "xs": [] } }),
                Op::Noop => {}
            })
            .unwrap();

        let root = engine.state().at("root").unwrap();
        let keys = root.len();
        let xs = root.at("xs").map_or(0, statebind_tree::Value::len);
        assert_eq!(engine.active_bindings(), keys + xs);
    }
});
