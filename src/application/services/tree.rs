//! Tree use cases over documents
//!
//! Flatten, pack, merge and inspect documents loaded through [`DocumentService`].

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::services::document::{Document, DocumentService};
use crate::application::ApplicationResult;
use crate::domain::{
    merge, merge_with, pack, unpack, ConflictPolicy, DomainError, FlatEntries, MergeEvent,
    PackItems, PackOptions, Tree, Value,
};

/// A `KEY=VALUE` override with an inferred value type.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub key: String,
    pub value: Value,
}

impl FromStr for Assignment {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((key, raw)) if !key.trim().is_empty() => Ok(Self {
                key: key.trim().to_string(),
                value: Value::infer(raw),
            }),
            _ => Err(DomainError::InvalidOption {
                kind: "assignment (expected KEY=VALUE)",
                value: s.to_string(),
            }),
        }
    }
}

/// Result of merging several documents.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// Merged tree, carrying the base document's header.
    pub document: Document,
    /// Conflicts left unresolved under the strict policy.
    pub conflicts: Vec<String>,
}

/// Service for file-level tree operations.
pub struct TreeService {
    documents: Arc<DocumentService>,
}

impl TreeService {
    /// Create a new tree service.
    pub fn new(documents: Arc<DocumentService>) -> Self {
        Self { documents }
    }

    /// Flatten a document into path-keyed entries.
    #[instrument(skip(self))]
    pub fn flatten(
        &self,
        path: &Path,
        delimiter: &str,
        limit: Option<usize>,
    ) -> ApplicationResult<FlatEntries> {
        let document = self.documents.load(path)?;
        let entries = unpack(&Value::Mapping(document.tree), delimiter, limit)?;
        debug!("flatten: {} entries", entries.len());
        Ok(entries)
    }

    /// Rebuild a tree from a document holding flat path-keyed entries.
    ///
    /// The source header is carried over.
    #[instrument(skip(self, options))]
    pub fn pack_file(&self, path: &Path, options: &PackOptions) -> ApplicationResult<Document> {
        let source = self.documents.load(path)?;
        let header = source.header;
        let tree = pack(&PackItems::Entries(source.tree), options)?;
        Ok(Document::new(tree).with_header(header))
    }

    /// Rebuild a tree from bare path keys.
    pub fn pack_keys(&self, keys: &[String], options: &PackOptions) -> ApplicationResult<Tree> {
        Ok(pack(&PackItems::Keys(keys.to_vec()), options)?)
    }

    /// Merge `incoming` documents onto `base`, then apply `overrides`.
    ///
    /// Documents are merged left to right with `policy`; overrides are packed
    /// with `delimiter` and always overwrite.
    #[instrument(skip(self, overrides))]
    pub fn merge_files(
        &self,
        base: &Path,
        incoming: &[PathBuf],
        policy: ConflictPolicy,
        overrides: &[Assignment],
        delimiter: &str,
    ) -> ApplicationResult<MergeOutcome> {
        let Document { mut tree, header } = self.documents.load(base)?;
        let mut conflicts = Vec::new();

        for path in incoming {
            let next = self.documents.load(path)?;
            tree = merge_with(&tree, &next.tree, policy, |event| {
                if let MergeEvent::Kept { .. } = event {
                    conflicts.push(format!("{}: {}", path.display(), event));
                }
            });
        }

        if !overrides.is_empty() {
            let entries: FlatEntries = overrides
                .iter()
                .map(|a| (a.key.clone(), a.value.clone()))
                .collect();
            let options = PackOptions::with_delimiter(delimiter);
            let patch = pack(&PackItems::Entries(entries), &options)?;
            tree = merge(&tree, &patch, ConflictPolicy::Overwrite);
        }

        info!(
            "merged {} document(s) onto {}, {} conflict(s)",
            incoming.len(),
            base.display(),
            conflicts.len()
        );
        Ok(MergeOutcome {
            document: Document { tree, header },
            conflicts,
        })
    }

    /// Look up the value stored under a path key.
    pub fn lookup(&self, path: &Path, key: &str, delimiter: &str) -> ApplicationResult<Option<Value>> {
        let document = self.documents.load(path)?;
        Ok(Value::Mapping(document.tree)
            .get_path(key, delimiter)
            .cloned())
    }

    /// Build a printable outline of a document.
    pub fn outline(&self, path: &Path) -> ApplicationResult<termtree::Tree<String>> {
        let document = self.documents.load(path)?;
        let mut root = termtree::Tree::new(path.display().to_string());
        for (key, value) in &document.tree {
            root.push(outline_node(key, value));
        }
        Ok(root)
    }
}

fn outline_node(label: &str, value: &Value) -> termtree::Tree<String> {
    match value {
        Value::Mapping(map) => termtree::Tree::new(label.to_string()).with_leaves(
            map.iter().map(|(key, child)| outline_node(key, child)),
        ),
        Value::Sequence(items) => termtree::Tree::new(label.to_string()).with_leaves(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| outline_node(&format!("[{i}]"), item)),
        ),
        scalar => termtree::Tree::new(format!("{label}: {scalar}")),
    }
}
