//! Recursive structural merge of two trees under a conflict policy.

use std::fmt;
use std::str::FromStr;

use indexmap::map::Entry;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::domain::error::DomainError;
use crate::domain::value::{Tree, Value};

/// Rule applied when both trees define the same key with differing values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictPolicy {
    /// Keep the base value; conflicts are only reported.
    #[default]
    #[serde(alias = "false")]
    Strict,
    /// Take the incoming value.
    #[serde(alias = "true")]
    Overwrite,
    /// Accumulate base and incoming values into a sequence.
    Append,
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictPolicy::Strict => write!(f, "strict"),
            ConflictPolicy::Overwrite => write!(f, "overwrite"),
            ConflictPolicy::Append => write!(f, "append"),
        }
    }
}

impl FromStr for ConflictPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" | "false" => Ok(ConflictPolicy::Strict),
            "overwrite" | "true" => Ok(ConflictPolicy::Overwrite),
            "append" => Ok(ConflictPolicy::Append),
            _ => Err(DomainError::InvalidOption {
                kind: "conflict policy",
                value: s.to_string(),
            }),
        }
    }
}

/// A single decision taken while merging, reported to the observer.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeEvent<'a> {
    /// Key absent in base; incoming value taken wholesale.
    Inserted { path: &'a [String], value: &'a Value },
    /// Base value replaced (overwrite policy, or a null base).
    Replaced {
        path: &'a [String],
        previous: &'a Value,
        value: &'a Value,
    },
    /// Incoming value appended to the accumulated sequence.
    Appended { path: &'a [String], value: &'a Value },
    /// Conflict left unresolved; base value kept.
    Kept {
        path: &'a [String],
        existing: &'a Value,
        incoming: &'a Value,
    },
}

impl MergeEvent<'_> {
    pub fn path(&self) -> &[String] {
        match self {
            MergeEvent::Inserted { path, .. }
            | MergeEvent::Replaced { path, .. }
            | MergeEvent::Appended { path, .. }
            | MergeEvent::Kept { path, .. } => path,
        }
    }
}

impl fmt::Display for MergeEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.path().join(".");
        match self {
            MergeEvent::Inserted { value, .. } => write!(f, "setting {path} = {value}"),
            MergeEvent::Replaced {
                previous, value, ..
            } => write!(f, "replacing {path} = {previous} with {value}"),
            MergeEvent::Appended { value, .. } => write!(f, "adding {value} to {path}"),
            MergeEvent::Kept {
                existing, incoming, ..
            } => write!(f, "keeping {path} = {existing}, ignoring {incoming}"),
        }
    }
}

/// Merge `incoming` into a copy of `base`.
///
/// Neither input is modified. Unresolved conflicts are logged at debug level,
/// every other decision at trace level.
pub fn merge(base: &Tree, incoming: &Tree, policy: ConflictPolicy) -> Tree {
    merge_with(base, incoming, policy, |event| match event {
        MergeEvent::Kept { .. } => debug!("{policy}: {event}"),
        _ => trace!("{event}"),
    })
}

/// Same as [`merge`], reporting every decision to `observer`.
pub fn merge_with<F>(base: &Tree, incoming: &Tree, policy: ConflictPolicy, mut observer: F) -> Tree
where
    F: FnMut(&MergeEvent<'_>),
{
    if same_tree(base, incoming) {
        return base.clone();
    }
    let mut path = Vec::new();
    merge_tree(base.clone(), incoming, policy, &mut path, &mut observer)
}

/// Fold trees left to right, starting from an empty tree.
pub fn merge_all<'a, I>(trees: I, policy: ConflictPolicy) -> Tree
where
    I: IntoIterator<Item = &'a Tree>,
{
    trees
        .into_iter()
        .fold(Tree::new(), |acc, tree| merge(&acc, tree, policy))
}

fn merge_tree<F>(
    mut result: Tree,
    incoming: &Tree,
    policy: ConflictPolicy,
    path: &mut Vec<String>,
    observer: &mut F,
) -> Tree
where
    F: FnMut(&MergeEvent<'_>),
{
    for (key, value) in incoming {
        path.push(key.clone());
        match result.entry(key.clone()) {
            Entry::Vacant(slot) => {
                observer(&MergeEvent::Inserted {
                    path: path.as_slice(),
                    value,
                });
                slot.insert(value.clone());
            }
            Entry::Occupied(mut slot) => resolve(slot.get_mut(), value, policy, path, observer),
        }
        path.pop();
    }
    result
}

fn resolve<F>(
    existing: &mut Value,
    incoming: &Value,
    policy: ConflictPolicy,
    path: &mut Vec<String>,
    observer: &mut F,
) where
    F: FnMut(&MergeEvent<'_>),
{
    if let (Value::Mapping(current), Value::Mapping(next)) = (&mut *existing, incoming) {
        let taken = std::mem::take(current);
        *current = merge_tree(taken, next, policy, path, observer);
        return;
    }
    if same_value(existing, incoming) {
        return;
    }
    if existing.is_null() {
        let previous = std::mem::replace(existing, incoming.clone());
        observer(&MergeEvent::Replaced {
            path: path.as_slice(),
            previous: &previous,
            value: incoming,
        });
        return;
    }
    match policy {
        ConflictPolicy::Overwrite => {
            let previous = std::mem::replace(existing, incoming.clone());
            observer(&MergeEvent::Replaced {
                path: path.as_slice(),
                previous: &previous,
                value: incoming,
            });
        }
        ConflictPolicy::Append => {
            append(existing, incoming);
            observer(&MergeEvent::Appended {
                path: path.as_slice(),
                value: incoming,
            });
        }
        ConflictPolicy::Strict => observer(&MergeEvent::Kept {
            path: path.as_slice(),
            existing: &*existing,
            incoming,
        }),
    }
}

fn append(existing: &mut Value, incoming: &Value) {
    match existing {
        Value::Sequence(items) => match incoming {
            Value::Sequence(more) => {
                // a flat list of scalars becomes the first accumulated entry
                if !holds_entries(items) {
                    let flat = std::mem::take(items);
                    items.push(Value::Sequence(flat));
                }
                items.extend(more.iter().cloned());
            }
            scalar => items.push(scalar.clone()),
        },
        other => {
            let previous = std::mem::take(other);
            *other = Value::Sequence(vec![previous, incoming.clone()]);
        }
    }
}

/// Structural equality with floats compared bitwise, so a `NaN` leaf equals itself.
fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Float(x), Value::Float(y)) => x.to_bits() == y.to_bits(),
        (Value::Sequence(xs), Value::Sequence(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| same_value(x, y))
        }
        (Value::Mapping(x), Value::Mapping(y)) => same_tree(x, y),
        _ => a == b,
    }
}

fn same_tree(a: &Tree, b: &Tree) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .all(|(key, value)| b.get(key).is_some_and(|other| same_value(value, other)))
}

/// Whether a sequence already holds accumulated entries (sequences or mappings).
fn holds_entries(items: &[Value]) -> bool {
    items
        .first()
        .map_or(true, |first| first.is_sequence() || first.is_mapping())
}
