use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use export_logging::export_warn;
use flatexport_core::{Document, DocumentError, DocumentRecord};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot read store {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot parse store {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid record {slug:?}: {source}")]
    Invalid {
        slug: String,
        #[source]
        source: DocumentError,
    },
    #[error("no document with slug {0:?}")]
    NotFound(String),
}

/// Source of documents. Records are read fresh on every call.
pub trait DocumentStore {
    fn documents(&self) -> Result<Vec<Document>, StoreError>;

    fn document(&self, slug: &str) -> Result<Document, StoreError> {
        self.documents()?
            .into_iter()
            .find(|document| document.slug() == slug)
            .ok_or_else(|| StoreError::NotFound(slug.to_string()))
    }
}

/// A JSON array of document records on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn records(&self) -> Result<Vec<DocumentRecord>, StoreError> {
        let raw = fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

impl DocumentStore for JsonFileStore {
    fn documents(&self) -> Result<Vec<Document>, StoreError> {
        let mut documents = Vec::new();
        for record in self.records()? {
            let slug = record.slug.clone();
            match Document::new(record) {
                Ok(document) => documents.push(document),
                Err(err) => export_warn!("Skipping invalid record {:?}: {}", slug, err),
            }
        }
        Ok(documents)
    }

    fn document(&self, slug: &str) -> Result<Document, StoreError> {
        let record = self
            .records()?
            .into_iter()
            .find(|record| record.slug.trim() == slug)
            .ok_or_else(|| StoreError::NotFound(slug.to_string()))?;
        Document::new(record).map_err(|source| StoreError::Invalid {
            slug: slug.to_string(),
            source,
        })
    }
}
