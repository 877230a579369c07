//! Flatten a tree into path-keyed entries.

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::value::{FlatEntries, Tree, Value};

/// Flatten `tree` into a mapping from delimiter-joined path keys to leaf values.
///
/// Traversal is depth-first in insertion order. With `limit = Some(n)` at most
/// `n + 1` components are joined into a key; deeper content is emitted as a
/// nested sub-tree value. Empty mappings produce no entry.
///
/// # Errors
/// * [`DomainError::InvalidRoot`] if `tree` is not a mapping
/// * [`DomainError::EmptyDelimiter`] if `delimiter` is empty
pub fn unpack(tree: &Value, delimiter: &str, limit: Option<usize>) -> DomainResult<FlatEntries> {
    if delimiter.is_empty() {
        return Err(DomainError::EmptyDelimiter);
    }
    let Value::Mapping(root) = tree else {
        return Err(DomainError::InvalidRoot { kind: tree.kind() });
    };
    let mut entries = FlatEntries::new();
    flatten_into(&mut entries, root, None, delimiter, limit);
    Ok(entries)
}

fn flatten_into(
    entries: &mut FlatEntries,
    node: &Tree,
    prefix: Option<&str>,
    delimiter: &str,
    limit: Option<usize>,
) {
    for (key, value) in node {
        let path = match prefix {
            Some(prefix) => format!("{prefix}{delimiter}{key}"),
            None => key.clone(),
        };
        match value {
            Value::Mapping(child) if child.is_empty() => {}
            Value::Mapping(child) if limit != Some(0) => {
                flatten_into(entries, child, Some(&path), delimiter, limit.map(|l| l - 1));
            }
            _ => {
                entries.insert(path, value.clone());
            }
        }
    }
}
