//! Rebuild a tree from path-keyed entries, a key list, or a single key.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::merge::{merge, ConflictPolicy};
use crate::domain::value::{FlatEntries, Tree, Value, DEFAULT_DELIMITER};

/// Input accepted by [`pack`].
#[derive(Debug, Clone, PartialEq)]
pub enum PackItems {
    /// Path key to value.
    Entries(FlatEntries),
    /// Path keys whose values come from [`Fill`].
    Keys(Vec<String>),
    /// One path key whose value comes from [`Fill`].
    Key(String),
}

impl From<FlatEntries> for PackItems {
    fn from(entries: FlatEntries) -> Self {
        PackItems::Entries(entries)
    }
}

impl From<Vec<String>> for PackItems {
    fn from(keys: Vec<String>) -> Self {
        PackItems::Keys(keys)
    }
}

impl From<Vec<&str>> for PackItems {
    fn from(keys: Vec<&str>) -> Self {
        PackItems::Keys(keys.into_iter().map(String::from).collect())
    }
}

impl From<&str> for PackItems {
    fn from(key: &str) -> Self {
        PackItems::Key(key.to_string())
    }
}

/// Source of leaf values when packing bare keys.
#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    /// Each key becomes its own value.
    Key,
    /// Values zipped positionally with the keys.
    Each(Vec<Value>),
    /// The same value for every key.
    Value(Value),
}

impl Default for Fill {
    fn default() -> Self {
        Fill::Value(Value::Null)
    }
}

/// Which end of a path key keeps its own levels once the depth limit is spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FoldOrder {
    /// Trailing components become levels; leading ones collapse into the top key.
    #[default]
    RightToLeft,
    /// Leading components become levels; trailing ones collapse into the leaf key.
    LeftToRight,
}

impl fmt::Display for FoldOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FoldOrder::RightToLeft => write!(f, "right-to-left"),
            FoldOrder::LeftToRight => write!(f, "left-to-right"),
        }
    }
}

impl FromStr for FoldOrder {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "right-to-left" | "-1" => Ok(FoldOrder::RightToLeft),
            "left-to-right" | "+1" | "1" => Ok(FoldOrder::LeftToRight),
            _ => Err(DomainError::InvalidOption {
                kind: "fold order",
                value: s.to_string(),
            }),
        }
    }
}

/// Options for [`pack`].
#[derive(Debug, Clone, PartialEq)]
pub struct PackOptions {
    pub delimiter: String,
    /// Number of discrete levels kept before the remaining components are re-joined.
    pub limit: Option<usize>,
    pub order: FoldOrder,
    /// Prefix kept as a single leading component.
    pub base: Option<String>,
    pub fill: Fill,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
            limit: None,
            order: FoldOrder::default(),
            base: None,
            fill: Fill::default(),
        }
    }
}

impl PackOptions {
    pub fn with_delimiter(delimiter: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
            ..Self::default()
        }
    }
}

/// Build a nested tree from `items`.
///
/// Every pair becomes a one-branch tree; branches are folded together with
/// [`ConflictPolicy::Append`] so siblings accumulate and repeated leaves
/// collect into sequences. `items` is not modified.
pub fn pack(items: &PackItems, options: &PackOptions) -> DomainResult<Tree> {
    if options.delimiter.is_empty() {
        return Err(DomainError::EmptyDelimiter);
    }
    let pairs = normalize(items, &options.fill);
    debug!("pack: {} entries, order={}", pairs.len(), options.order);

    let mut tree = Tree::new();
    for (key, value) in pairs {
        let components = split_components(&key, &options.delimiter, options.base.as_deref());
        let branch = build_branch(&components, value, options);
        tree = merge(&tree, &branch, ConflictPolicy::Append);
    }
    Ok(tree)
}

fn normalize(items: &PackItems, fill: &Fill) -> Vec<(String, Value)> {
    match items {
        PackItems::Entries(entries) => entries
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
        PackItems::Keys(keys) => match fill {
            Fill::Key => keys
                .iter()
                .map(|key| (key.clone(), Value::from(key.as_str())))
                .collect(),
            Fill::Each(values) => {
                if values.len() != keys.len() {
                    warn!(
                        "fill has {} values for {} keys, extra items are dropped",
                        values.len(),
                        keys.len()
                    );
                }
                keys.iter().cloned().zip(values.iter().cloned()).collect()
            }
            Fill::Value(value) => keys
                .iter()
                .map(|key| (key.clone(), value.clone()))
                .collect(),
        },
        PackItems::Key(key) => {
            let value = match fill {
                Fill::Key => Value::from(key.as_str()),
                Fill::Each(values) => values.first().cloned().unwrap_or_default(),
                Fill::Value(value) => value.clone(),
            };
            vec![(key.clone(), value)]
        }
    }
}

/// Split a path key into components.
///
/// With a `base`, the base is kept as one leading component and only the
/// remainder is split; empty remainder components are dropped. A base that is
/// not a prefix is removed wherever it occurs.
pub fn split_components(key: &str, delimiter: &str, base: Option<&str>) -> Vec<String> {
    let Some(base) = base else {
        return key.split(delimiter).map(String::from).collect();
    };
    let remainder = match key.strip_prefix(base) {
        Some(rest) => rest.to_string(),
        None => {
            debug!("base {base:?} is not a prefix of {key:?}");
            key.replace(base, "")
        }
    };
    std::iter::once(base.to_string())
        .chain(
            remainder
                .split(delimiter)
                .filter(|component| !component.is_empty())
                .map(String::from),
        )
        .collect()
}

/// Nest `value` under the levels derived from `components`.
fn build_branch(components: &[String], value: Value, options: &PackOptions) -> Tree {
    let mut levels = fold_levels(components, options);
    let leaf_key = levels.pop().unwrap_or_default();
    let mut tree = Tree::from([(leaf_key, value)]);
    for key in levels.into_iter().rev() {
        tree = Tree::from([(key, Value::Mapping(tree))]);
    }
    tree
}

fn fold_levels(components: &[String], options: &PackOptions) -> Vec<String> {
    let n = components.len();
    let separate = options
        .limit
        .map_or(n.saturating_sub(1), |limit| limit.min(n.saturating_sub(1)));
    let delimiter = &options.delimiter;
    match options.order {
        FoldOrder::RightToLeft => {
            let (head, tail) = components.split_at(n - separate);
            std::iter::once(head.join(delimiter))
                .chain(tail.iter().cloned())
                .collect()
        }
        FoldOrder::LeftToRight => {
            let (head, tail) = components.split_at(separate);
            head.iter()
                .cloned()
                .chain(std::iter::once(tail.join(delimiter)))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn given_base_prefix_when_splitting_then_keeps_base_whole() {
        let components = split_components("/home/me/docs/a.txt", "/", Some("/home/me"));
        assert_eq!(components, strings(&["/home/me", "docs", "a.txt"]));
    }

    #[test]
    fn given_base_not_prefix_when_splitting_then_best_effort() {
        let components = split_components("x/base/y", "/", Some("base"));
        assert_eq!(components, strings(&["base", "x", "y"]));
    }

    #[test]
    fn given_limit_when_folding_right_to_left_then_collapses_leading_components() {
        let components = strings(&["a", "b", "c", "d"]);
        let options = PackOptions {
            limit: Some(1),
            ..PackOptions::with_delimiter("/")
        };
        assert_eq!(fold_levels(&components, &options), strings(&["a/b/c", "d"]));

        let options = PackOptions {
            limit: Some(0),
            ..options
        };
        assert_eq!(fold_levels(&components, &options), strings(&["a/b/c/d"]));
    }

    #[test]
    fn given_limit_when_folding_left_to_right_then_collapses_trailing_components() {
        let components = strings(&["a", "b", "c", "d"]);
        let options = PackOptions {
            limit: Some(1),
            order: FoldOrder::LeftToRight,
            ..PackOptions::with_delimiter("/")
        };
        assert_eq!(fold_levels(&components, &options), strings(&["a", "b/c/d"]));
    }

    #[test]
    fn given_no_limit_when_folding_then_full_nesting_both_ways() {
        let components = strings(&["a", "b", "c"]);
        for order in [FoldOrder::RightToLeft, FoldOrder::LeftToRight] {
            let options = PackOptions {
                order,
                ..PackOptions::with_delimiter("/")
            };
            assert_eq!(fold_levels(&components, &options), components);
        }
    }

    #[test]
    fn test_fold_order_from_str() {
        assert_eq!("-1".parse::<FoldOrder>(), Ok(FoldOrder::RightToLeft));
        assert_eq!("+1".parse::<FoldOrder>(), Ok(FoldOrder::LeftToRight));
        assert_eq!(
            "left-to-right".parse::<FoldOrder>(),
            Ok(FoldOrder::LeftToRight)
        );
        assert!("sideways".parse::<FoldOrder>().is_err());
    }
}
