//! JSON file record store for extracted icons.
//!
//! The whole store is one JSON document, loaded on open and rewritten on
//! every change. Writes go to a sibling temp file first and are renamed into
//! place, so a crash never leaves a half-written store behind.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::IconFragment;
use crate::svg::Strategy;

const STORE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access icon store {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("icon store {} is not valid JSON: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A persisted icon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconRecord {
    pub id: String,
    pub name: String,
    pub svg: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub license: String,
    #[serde(default)]
    pub author: String,
    pub size: usize,
    pub width: f64,
    pub height: f64,
    pub source: String,
    pub strategy: Strategy,
}

impl From<&IconFragment> for IconRecord {
    fn from(f: &IconFragment) -> Self {
        Self {
            id: f.id.clone(),
            name: f.name.clone(),
            svg: f.svg_content.clone(),
            category: f.category.clone(),
            description: f.description.clone(),
            keywords: f.keywords.clone(),
            license: f.license.clone(),
            author: f.author.clone(),
            size: f.file_size,
            width: f.dimensions.width,
            height: f.dimensions.height,
            source: f.source.clone(),
            strategy: f.strategy,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    icons: Vec<IconRecord>,
}

/// Records in save order, backed by one JSON file.
#[derive(Debug)]
pub struct IconStore {
    path: PathBuf,
    records: Vec<IconRecord>,
}

impl IconStore {
    /// Load the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = match fs::read_to_string(&path) {
            Ok(json) => {
                let file: StoreFile = serde_json::from_str(&json).map_err(|source| StoreError::Json {
                    path: path.clone(),
                    source,
                })?;
                file.icons
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        crate::debug!("store"; "loaded {} records from {}", records.len(), path.display());
        Ok(Self { path, records })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn list(&self) -> &[IconRecord] {
        &self.records
    }

    /// Insert or replace (by id) records with a single write.
    pub fn save(&mut self, records: impl IntoIterator<Item = IconRecord>) -> Result<usize, StoreError> {
        let mut count = 0;
        for record in records {
            self.upsert(record);
            count += 1;
        }
        if count > 0 {
            self.persist()?;
        }
        Ok(count)
    }

    /// Delete by id. Returns whether a record was removed.
    pub fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        if self.records.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    fn upsert(&mut self, record: IconRecord) {
        match self.records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
    }

    fn persist(&self) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let file = StoreFile {
            version: STORE_VERSION,
            icons: self.records.clone(),
        };
        let json = serde_json::to_string_pretty(&file).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, json).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;

        crate::debug!("store"; "saved {} records", self.records.len());
        Ok(())
    }
}
