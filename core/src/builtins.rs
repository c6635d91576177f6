//! Names of the operators KRL provides on its built-in value types.

use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;

pub const ARRAY_OPERATORS: &[&str] = &[
    "all", "any", "append", "collect", "filter", "head", "index", "join", "length", "map", "none", "notall",
    "pairwise", "reduce", "reverse", "slice", "splice", "sort", "tail",
];

pub const STRING_OPERATORS: &[&str] = &[
    "capitalize", "decode", "extract", "lc", "length", "match", "ord", "replace", "split", "sprintf", "substr", "uc",
];

pub const NUMBER_OPERATORS: &[&str] = &["chr", "range", "sprintf"];

pub const UNIVERSAL_OPERATORS: &[&str] = &["as", "defaultsTo", "encode", "isnull", "klog", "typeof"];

pub const MAP_OPERATORS: &[&str] = &["get", "delete", "filter", "keys", "length", "map", "put", "set", "values"];

pub const SET_OPERATORS: &[&str] = &["intersection", "union", "difference", "has", "once", "duplicates", "unique"];

/// Every operator name once, in table order (set, map, universal, number, string, array).
pub static BUILTIN_OPERATORS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    let mut seen = FxHashSet::default();
    [
        SET_OPERATORS,
        MAP_OPERATORS,
        UNIVERSAL_OPERATORS,
        NUMBER_OPERATORS,
        STRING_OPERATORS,
        ARRAY_OPERATORS,
    ]
    .into_iter()
    .flatten()
    .copied()
    .filter(|name| seen.insert(*name))
    .collect()
});

static BUILTIN_OPERATOR_SET: Lazy<FxHashSet<&'static str>> = Lazy::new(|| BUILTIN_OPERATORS.iter().copied().collect());

pub fn is_builtin_operator(name: &str) -> bool {
    BUILTIN_OPERATOR_SET.contains(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_list_is_deduplicated() {
        let unique: FxHashSet<&str> = BUILTIN_OPERATORS.iter().copied().collect();
        assert_eq!(unique.len(), BUILTIN_OPERATORS.len());
        assert_eq!(BUILTIN_OPERATORS.iter().filter(|n| **n == "length").count(), 1);
    }

    #[test]
    fn test_membership() {
        assert!(is_builtin_operator("defaultsTo"));
        assert!(is_builtin_operator("sprintf"));
        assert!(!is_builtin_operator("hello"));
    }
}
