#![forbid(unsafe_code)]

//! The [`tree!`](crate::tree!) literal macro.
//!
//! Builds a [`Value`](crate::Value) from JSON-ish syntax:
//!
//! ```
//! use statebind_tree::tree;
//!
//! let v = tree!({
//!     "user": { "name": "ada", "age": 36 },
//!     "tags": ["a", "b"],
//!     "flag": true,
//!     "nothing": null,
//! });
//! assert_eq!(v.at("user.age").unwrap().as_int(), Some(36));
//! ```
//!
//! Values may be arbitrary expressions convertible via `Into<Value>`; keys
//! are string literals (or any expression yielding `Into<String>` when
//! parenthesized).

/// Construct a [`Value`](crate::Value) from a JSON-like literal.
#[macro_export]
macro_rules! tree {
    // Hide the internal rules from rustdoc.
    ($($t:tt)+) => {
        $crate::tree_internal!($($t)+)
    };
    () => {
        compile_error!("tree! needs a value; use tree!(null) for null")
    };
}

/// Implementation detail of [`tree!`]. Not public API.
#[doc(hidden)]
#[macro_export]
macro_rules! tree_internal {
    // ---- arrays -----------------------------------------------------
    // Done: collected elements.
    (@array [$($elems:expr,)*]) => {
        vec![$($elems,)*]
    };
    (@array [$($elems:expr,)*] null $($rest:tt)*) => {
        $crate::tree_internal!(@array_next [$($elems,)* $crate::Value::Null,] $($rest)*)
    };
    (@array [$($elems:expr,)*] [$($arr:tt)*] $($rest:tt)*) => {
        $crate::tree_internal!(@array_next [$($elems,)* $crate::tree_internal!([$($arr)*]),] $($rest)*)
    };
    (@array [$($elems:expr,)*] {$($map:tt)*} $($rest:tt)*) => {
        $crate::tree_internal!(@array_next [$($elems,)* $crate::tree_internal!({$($map)*}),] $($rest)*)
    };
    // Expression element: munch up to the next top-level comma.
    (@array [$($elems:expr,)*] $next:expr, $($rest:tt)*) => {
        $crate::tree_internal!(@array [$($elems,)* $crate::Value::from($next),] $($rest)*)
    };
    (@array [$($elems:expr,)*] $last:expr) => {
        $crate::tree_internal!(@array [$($elems,)* $crate::Value::from($last),])
    };
    // After a completed composite element: expect `,` or end.
    (@array_next [$($elems:expr,)*] , $($rest:tt)*) => {
        $crate::tree_internal!(@array [$($elems,)*] $($rest)*)
    };
    (@array_next [$($elems:expr,)*]) => {
        $crate::tree_internal!(@array [$($elems,)*])
    };

    // ---- objects ----------------------------------------------------
    // Done.
    (@object $map:ident () () ()) => {};
    // Insert the current entry and loop.
    (@object $map:ident [$($key:tt)+] ($value:expr) , $($rest:tt)*) => {
        let _ = $map.insert(($($key)+).into(), $value);
        $crate::tree_internal!(@object $map () ($($rest)*) ($($rest)*));
    };
    (@object $map:ident [$($key:tt)+] ($value:expr)) => {
        let _ = $map.insert(($($key)+).into(), $value);
    };
    // Current entry's value is a composite or null.
    (@object $map:ident ($($key:tt)+) (: null $($rest:tt)*) $copy:tt) => {
        $crate::tree_internal!(@object $map [$($key)+] ($crate::Value::Null) $($rest)*);
    };
    (@object $map:ident ($($key:tt)+) (: [$($arr:tt)*] $($rest:tt)*) $copy:tt) => {
        $crate::tree_internal!(@object $map [$($key)+] ($crate::tree_internal!([$($arr)*])) $($rest)*);
    };
    (@object $map:ident ($($key:tt)+) (: {$($inner:tt)*} $($rest:tt)*) $copy:tt) => {
        $crate::tree_internal!(@object $map [$($key)+] ($crate::tree_internal!({$($inner)*})) $($rest)*);
    };
    // Current entry's value is an expression followed by a comma.
    (@object $map:ident ($($key:tt)+) (: $value:expr , $($rest:tt)*) $copy:tt) => {
        $crate::tree_internal!(@object $map [$($key)+] ($crate::Value::from($value)) , $($rest)*);
    };
    // Last entry, expression value.
    (@object $map:ident ($($key:tt)+) (: $value:expr) $copy:tt) => {
        $crate::tree_internal!(@object $map [$($key)+] ($crate::Value::from($value)));
    };
    // Accumulate key tokens until the `:`.
    (@object $map:ident ($($key:tt)*) ($tt:tt $($rest:tt)*) $copy:tt) => {
        $crate::tree_internal!(@object $map ($($key)* $tt) ($($rest)*) ($($rest)*));
    };

    // ---- entry points ----------------------------------------------
    (null) => {
        $crate::Value::Null
    };
    ([]) => {
        $crate::Value::empty_list()
    };
    ([ $($tt:tt)+ ]) => {
        $crate::Value::from($crate::tree_internal!(@array [] $($tt)+))
    };
    ({}) => {
        $crate::Value::empty_map()
    };
    ({ $($tt:tt)+ }) => {
        $crate::Value::from({
            let mut map = $crate::Map::new();
            $crate::tree_internal!(@object map () ($($tt)+) ($($tt)+));
            map
        })
    };
    ($other:expr) => {
        $crate::Value::from($other)
    };
}

#[cfg(test)]
mod tests {
    use crate::Value;

    #[test]
    fn scalars() {
        assert_eq!(tree!(null), Value::Null);
        assert_eq!(tree!(true), Value::Bool(true));
        assert_eq!(tree!(7), Value::Int(7));
        assert_eq!(tree!("hi"), Value::from("hi"));
        assert_eq!(tree!(1 + 2), Value::Int(3));
    }

    #[test]
    fn arrays() {
        let v = tree!([1, "two", null, [3], { "k": 4 }]);
        let list = v.as_list().unwrap();
        assert_eq!(list.len(), 5);
        assert_eq!(list[0].as_int(), Some(1));
        assert_eq!(list[1].as_str(), Some("two"));
        assert!(list[2].is_null());
        assert_eq!(list[3].as_list().unwrap()[0].as_int(), Some(3));
        assert_eq!(list[4].at("k").unwrap().as_int(), Some(4));
    }

    #[test]
    fn objects() {
        let n = 5;
        let v = tree!({
            "a": 1,
            "b": { "c": [true, false] },
            "n": n * 2,
        });
        assert_eq!(v.at("a").unwrap().as_int(), Some(1));
        assert_eq!(v.at("b.c").unwrap().len(), 2);
        assert_eq!(v.at("n").unwrap().as_int(), Some(10));
    }

    #[test]
    fn empties() {
        assert_eq!(tree!([]).len(), 0);
        assert_eq!(tree!({}).len(), 0);
        assert!(tree!({}).as_map().is_some());
    }
}
