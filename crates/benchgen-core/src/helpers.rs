//! Helper functions exposed to fixture templates
//!
//! Templates call helpers by name (`{{ Sum(Length) }}`,
//! `{{ each Items(Length) |i| }}`). The set of callable helpers is an explicit
//! [`Helpers`] map handed to compile and render; there is no global registry.

use std::collections::BTreeMap;
use toml::Value;

/// Name of the sequence helper in templates
pub const ITEMS: &str = "Items";

/// Name of the triangular-sum helper in templates
pub const SUM: &str = "Sum";

/// Largest argument accepted by a sequence helper. Each item becomes one
/// rendered block, so anything bigger is a mistake rather than a fixture.
pub const MAX_SEQUENCE_LEN: u32 = 1_000_000;

/// Returns `[1, 2, ..., n]`; empty for `n == 0`.
pub fn items(n: u32) -> Vec<u32> {
    (1..=n).collect()
}

/// Closed-form sum of `1..=n`.
pub fn sum(n: u32) -> i64 {
    let n = u64::from(n);
    // (2^32 - 1) * 2^32 / 2 < 2^63, so the cast never truncates
    (n * (n + 1) / 2) as i64
}

/// A plain function callable from a template
#[derive(Debug, Clone, Copy)]
pub enum Helper {
    /// Produces a sequence, iterated with `{{each}}`
    Sequence(fn(u32) -> Vec<u32>),
    /// Produces a single integer, substituted inline
    Scalar(fn(u32) -> i64),
}

impl Helper {
    /// Largest argument [`Helper::call`] accepts
    pub fn max_argument(&self) -> u32 {
        match self {
            Helper::Sequence(_) => MAX_SEQUENCE_LEN,
            Helper::Scalar(_) => u32::MAX,
        }
    }

    /// Invoke the helper and convert its result into a template value
    pub fn call(&self, arg: u32) -> Value {
        match self {
            Helper::Sequence(f) => Value::Array(
                f(arg)
                    .into_iter()
                    .map(|item| Value::Integer(i64::from(item)))
                    .collect(),
            ),
            Helper::Scalar(f) => Value::Integer(f(arg)),
        }
    }
}

/// Looks up a helper from the standard catalogue (`Items`, `Sum`)
pub fn standard_helper(name: &str) -> Option<Helper> {
    match name {
        ITEMS => Some(Helper::Sequence(items)),
        SUM => Some(Helper::Scalar(sum)),
        _ => None,
    }
}

/// Named helpers available to one template invocation
#[derive(Debug, Clone, Default)]
pub struct Helpers {
    map: BTreeMap<String, Helper>,
}

impl Helpers {
    /// Empty helper set
    pub fn new() -> Self {
        Self::default()
    }

    /// `Items` and `Sum`
    pub fn standard() -> Self {
        Self::new()
            .with(ITEMS, Helper::Sequence(items))
            .with(SUM, Helper::Scalar(sum))
    }

    /// Resolve a list of names against the standard catalogue.
    ///
    /// Returns the first unknown name as the error.
    pub fn from_standard_names<S: AsRef<str>>(names: &[S]) -> Result<Self, String> {
        let mut helpers = Self::new();
        for name in names {
            let name = name.as_ref();
            let helper = standard_helper(name).ok_or_else(|| name.to_string())?;
            helpers.insert(name, helper);
        }
        Ok(helpers)
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, helper: Helper) -> Self {
        self.insert(name, helper);
        self
    }

    /// Insert a helper, returning the one previously registered under `name`
    pub fn insert(&mut self, name: impl Into<String>, helper: Helper) -> Option<Helper> {
        self.map.insert(name.into(), helper)
    }

    pub fn get(&self, name: &str) -> Option<Helper> {
        self.map.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    /// Helper names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_items_ascending_with_exact_length() {
        for n in [1u32, 2, 7, 30, 60] {
            let seq = items(n);
            assert_eq!(seq.len(), n as usize);
            assert_eq!(seq.first(), Some(&1));
            assert_eq!(seq.last(), Some(&n));
            assert!(seq.windows(2).all(|w| w[1] == w[0] + 1));
        }
    }

    #[test]
    fn test_items_zero_is_empty() {
        assert!(items(0).is_empty());
    }

    #[test]
    fn test_items_is_recomputed_each_call() {
        let mut first = items(3);
        first.push(99);
        assert_eq!(items(3), vec![1, 2, 3]);
    }

    #[test]
    fn test_sum_known_values() {
        assert_eq!(sum(0), 0);
        assert_eq!(sum(1), 1);
        assert_eq!(sum(30), 465);
        assert_eq!(sum(60), 1830);
    }

    #[test]
    fn test_sum_matches_items_total() {
        for n in 0..200u32 {
            let total: i64 = items(n).into_iter().map(i64::from).sum();
            assert_eq!(sum(n), total, "n = {}", n);
        }
    }

    #[test]
    fn test_sum_max_input_does_not_overflow() {
        let n = u64::from(u32::MAX);
        assert_eq!(sum(u32::MAX) as u64, n * (n + 1) / 2);
        assert!(sum(u32::MAX) > 0);
    }

    #[test]
    fn test_helper_call_converts_results() {
        let seq = Helper::Sequence(items).call(3);
        assert_eq!(
            seq,
            Value::Array(vec![
                Value::Integer(1),
                Value::Integer(2),
                Value::Integer(3)
            ])
        );

        let scalar = Helper::Scalar(sum).call(30);
        assert_eq!(scalar, Value::Integer(465));
    }

    #[test]
    fn test_max_argument_bounds_sequences_only() {
        assert_eq!(Helper::Sequence(items).max_argument(), MAX_SEQUENCE_LEN);
        assert_eq!(Helper::Scalar(sum).max_argument(), u32::MAX);
    }

    #[test]
    fn test_standard_set_contains_items_and_sum() {
        let helpers = Helpers::standard();
        assert_eq!(helpers.names().collect::<Vec<_>>(), vec![ITEMS, SUM]);
        assert!(matches!(helpers.get(ITEMS), Some(Helper::Sequence(_))));
        assert!(matches!(helpers.get(SUM), Some(Helper::Scalar(_))));
    }

    #[test]
    fn test_from_standard_names_subset() {
        let helpers = Helpers::from_standard_names(&["Items"]).unwrap();
        assert!(helpers.contains(ITEMS));
        assert!(!helpers.contains(SUM));
    }

    #[test]
    fn test_from_standard_names_rejects_unknown() {
        let err = Helpers::from_standard_names(&["Items", "Product"]).unwrap_err();
        assert_eq!(err, "Product");
    }

    #[test]
    fn test_insert_replaces_existing() {
        let mut helpers = Helpers::new();
        assert!(helpers.is_empty());
        assert!(helpers.insert("Items", Helper::Sequence(items)).is_none());
        assert!(helpers.insert("Items", Helper::Scalar(sum)).is_some());
        assert!(matches!(helpers.get("Items"), Some(Helper::Scalar(_))));
    }
}
