//! Filesystem connection for the JSON document store.

use anyhow::{Context, Result};
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// A file-per-key JSON store rooted at a base directory.
///
/// Layout:
/// ```text
/// <base>/parents/<safe_name>.json
/// <base>/children/<safe_name>/child.json
/// <base>/children/<safe_name>/accounts/<safe_name>.json
/// ```
///
/// Every write goes through a temp file and keeps the previous version of the
/// document in a single `.bak` slot next to it.
#[derive(Debug, Clone)]
pub struct JsonConnection {
    base_directory: PathBuf,
}

impl JsonConnection {
    pub fn new(base_directory: impl Into<PathBuf>) -> Result<Self> {
        let base_directory = base_directory.into();
        fs::create_dir_all(&base_directory)
            .with_context(|| format!("Failed to create base directory {:?}", base_directory))?;
        Ok(Self { base_directory })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    pub fn parents_directory(&self) -> PathBuf {
        self.base_directory.join("parents")
    }

    pub fn children_directory(&self) -> PathBuf {
        self.base_directory.join("children")
    }

    pub fn child_directory(&self, child_name: &str) -> Result<PathBuf> {
        Ok(self.children_directory().join(Self::safe_key(child_name)?))
    }

    pub fn accounts_directory(&self, child_name: &str) -> Result<PathBuf> {
        Ok(self.child_directory(child_name)?.join("accounts"))
    }

    /// Filesystem-safe key for a display name. Rejects names with no
    /// alphanumeric content at all: those would map to an empty key, and an
    /// empty key addresses the store's directories themselves rather than a
    /// document inside them.
    pub fn safe_key(name: &str) -> Result<String> {
        let key = Self::safe_name(name);
        if key.is_empty() {
            return Err(anyhow::anyhow!(
                "Name must contain at least one letter or digit: {:?}",
                name
            ));
        }
        Ok(key)
    }

    /// Turn a display name into a filesystem-safe key:
    /// "Emma Smith" -> "emma_smith".
    fn safe_name(name: &str) -> String {
        let mut result = String::with_capacity(name.len());
        let mut last_was_underscore = false;
        for c in name.chars() {
            if c.is_ascii_alphanumeric() {
                result.push(c.to_ascii_lowercase());
                last_was_underscore = false;
            } else if !last_was_underscore {
                // Whitespace, punctuation and non-ASCII all collapse to one
                // underscore.
                result.push('_');
                last_was_underscore = true;
            }
        }
        result.trim_matches('_').to_string()
    }

    /// Serialize `value` as one JSON document at `path`: write to a temp
    /// file, rotate the current document into its `.bak` slot, then move the
    /// temp file into place.
    pub fn write_document<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(value)?;
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, json)
            .with_context(|| format!("Failed to write {:?}", tmp_path))?;
        if path.exists() {
            fs::rename(path, path.with_extension("json.bak"))
                .with_context(|| format!("Failed to rotate backup for {:?}", path))?;
        }
        fs::rename(&tmp_path, path)
            .with_context(|| format!("Failed to move {:?} into place", tmp_path))?;
        debug!("Wrote document {:?}", path);
        Ok(())
    }

    /// Read one JSON document, or None when the key does not exist.
    pub fn read_document<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {:?}", path))?;
        let value = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse {:?}", path))?;
        Ok(Some(value))
    }

    /// Delete a document and its backup slot. Returns true if the document
    /// existed.
    pub fn delete_document(&self, path: &Path) -> Result<bool> {
        let existed = path.exists();
        if existed {
            fs::remove_file(path).with_context(|| format!("Failed to delete {:?}", path))?;
        }
        let backup = path.with_extension("json.bak");
        if backup.exists() {
            fs::remove_file(&backup)
                .with_context(|| format!("Failed to delete backup {:?}", backup))?;
        }
        Ok(existed)
    }
}
