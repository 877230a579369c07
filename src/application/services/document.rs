//! Structured document service
//!
//! Loads and saves YAML/JSON documents as trees, keeping a leading YAML
//! comment header intact across a load/save cycle.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{DomainError, Tree, Value};
use crate::infrastructure::traits::FileSystem;

/// Separates a YAML comment header from the document body.
pub const HEADER_MARKER: &str = "\n---\n";

/// Serialization format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    #[default]
    Yaml,
    Json,
}

impl DocumentFormat {
    /// Detect the format from a path extension (`.yml`, `.yaml`, `.json`).
    pub fn from_path(path: &Path) -> ApplicationResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yml") | Some("yaml") => Ok(DocumentFormat::Yaml),
            Some("json") => Ok(DocumentFormat::Json),
            _ => Err(ApplicationError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Yaml => write!(f, "yaml"),
            DocumentFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for DocumentFormat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(DocumentFormat::Yaml),
            "json" => Ok(DocumentFormat::Json),
            _ => Err(DomainError::InvalidOption {
                kind: "format",
                value: s.to_string(),
            }),
        }
    }
}

/// A loaded document: its tree and the optional comment header.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub tree: Tree,
    /// Verbatim text before the `---` marker (YAML only).
    pub header: Option<String>,
}

impl Document {
    pub fn new(tree: Tree) -> Self {
        Self { tree, header: None }
    }

    pub fn with_header(mut self, header: Option<String>) -> Self {
        self.header = header;
        self
    }
}

/// Service for reading and writing documents through the filesystem boundary.
pub struct DocumentService {
    fs: Arc<dyn FileSystem>,
    json_pretty: bool,
}

impl DocumentService {
    /// Create a new document service.
    pub fn new(fs: Arc<dyn FileSystem>, json_pretty: bool) -> Self {
        Self { fs, json_pretty }
    }

    /// Load a document; a missing file is an error.
    #[instrument(skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<Document> {
        let format = DocumentFormat::from_path(path)?;
        if !self.fs.is_file(path) {
            return Err(ApplicationError::DocumentNotFound(path.to_path_buf()));
        }
        let text = self
            .fs
            .read_to_string(path)
            .with_path_context("read document", path)?;

        let header = match format {
            DocumentFormat::Yaml => extract_header(&text),
            DocumentFormat::Json => None,
        };
        let tree = parse(&text, format)
            .map_err(|message| ApplicationError::Parse {
                path: path.to_path_buf(),
                message,
            })?
            .into_tree()?;
        debug!(
            "loaded {} top-level keys from {}",
            tree.len(),
            path.display()
        );
        Ok(Document { tree, header })
    }

    /// Load a document, creating it from `template` when the file is missing.
    #[instrument(skip(self, template))]
    pub fn load_or_create(&self, path: &Path, template: &Tree) -> ApplicationResult<Document> {
        if self.fs.exists(path) {
            return self.load(path);
        }
        debug!("{} does not exist, creating it from template", path.display());
        let document = Document::new(template.clone());
        self.save(&document, path)?;
        Ok(document)
    }

    /// Save a document, creating intermediate directories.
    #[instrument(skip(self, document))]
    pub fn save(&self, document: &Document, path: &Path) -> ApplicationResult<()> {
        let format = DocumentFormat::from_path(path)?;
        let mut content = String::new();
        if let Some(header) = document.header.as_deref() {
            match format {
                DocumentFormat::Yaml => {
                    content.push_str(&comment_header(header));
                    content.push_str(HEADER_MARKER);
                }
                DocumentFormat::Json => debug!("header dropped for JSON output"),
            }
        }
        content.push_str(&self.render(&Value::Mapping(document.tree.clone()), format)?);

        self.fs
            .ensure_parent(path)
            .with_path_context("create parent directory", path)?;
        self.fs
            .write(path, &content)
            .with_path_context("write document", path)?;
        debug!("saved {}", path.display());
        Ok(())
    }

    /// Serialize a value to text in the given format.
    pub fn render(&self, value: &Value, format: DocumentFormat) -> ApplicationResult<String> {
        let rendered = match format {
            DocumentFormat::Yaml => serde_yaml::to_string(value).map_err(|e| e.to_string()),
            DocumentFormat::Json if self.json_pretty => serde_json::to_string_pretty(value)
                .map(|json| json + "\n")
                .map_err(|e| e.to_string()),
            DocumentFormat::Json => serde_json::to_string(value)
                .map(|json| json + "\n")
                .map_err(|e| e.to_string()),
        };
        rendered.map_err(|message| ApplicationError::Serialize { message })
    }
}

/// Parse document text into a value.
fn parse(text: &str, format: DocumentFormat) -> Result<Value, String> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    match format {
        DocumentFormat::Yaml => {
            let yaml: serde_yaml::Value = serde_yaml::from_str(text).map_err(|e| e.to_string())?;
            Value::try_from(yaml).map_err(|e| e.to_string())
        }
        DocumentFormat::Json => serde_json::from_str::<serde_json::Value>(text)
            .map(Value::from)
            .map_err(|e| e.to_string()),
    }
}

fn extract_header(text: &str) -> Option<String> {
    text.split_once(HEADER_MARKER)
        .map(|(header, _)| header.to_string())
}

/// Prefix every header line that is not already a comment.
fn comment_header(header: &str) -> String {
    header
        .split('\n')
        .map(|line| {
            if line.starts_with('#') {
                line.to_string()
            } else {
                format!("# {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
