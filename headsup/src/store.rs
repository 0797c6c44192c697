use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use headsup_ipc::Scope;

/// Key-value settings store with per-user and global scopes.
/// This abstraction allows mocking in tests.
pub trait SettingsStore {
    fn get_int(&self, key: &str, default: i64, scope: Scope) -> i64;
    fn put_int(&mut self, key: &str, value: i64, scope: Scope) -> Result<()>;

    /// Pick up writes made by other clients since the last read.
    fn reload(&mut self) -> Result<()> {
        Ok(())
    }

    /// Booleans are stored as 0/1; anything other than 1 reads as false.
    fn get_bool(&self, key: &str, default: bool, scope: Scope) -> bool {
        self.get_int(key, i64::from(default), scope) == 1
    }

    fn put_bool(&mut self, key: &str, value: bool, scope: Scope) -> Result<()> {
        self.put_int(key, i64::from(value), scope)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    global: BTreeMap<String, i64>,
    #[serde(default)]
    users: BTreeMap<u32, BTreeMap<String, i64>>,
}

/// JSON-file backed store. Every put re-reads the file, changes the one key
/// and renames a fresh copy into place.
pub struct FileStore {
    path: PathBuf,
    user_id: u32,
    doc: Document,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>, user_id: u32) -> Result<Self> {
        let path = path.into();
        let doc = read_document(&path)?;
        Ok(Self { path, user_id, doc })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, doc: &Document) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(doc)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

fn read_document(path: &Path) -> Result<Document> {
    match std::fs::read_to_string(path) {
        Ok(contents) => serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings store {}", path.display())),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("No settings store at {}, starting empty", path.display());
            Ok(Document::default())
        }
        Err(e) => {
            Err(e).with_context(|| format!("Failed to read settings store {}", path.display()))
        }
    }
}

impl Document {
    fn table(&self, scope: Scope, user_id: u32) -> Option<&BTreeMap<String, i64>> {
        match scope {
            Scope::Global => Some(&self.global),
            Scope::CurrentUser => self.users.get(&user_id),
        }
    }

    fn table_mut(&mut self, scope: Scope, user_id: u32) -> &mut BTreeMap<String, i64> {
        match scope {
            Scope::Global => &mut self.global,
            Scope::CurrentUser => self.users.entry(user_id).or_default(),
        }
    }
}

impl SettingsStore for FileStore {
    fn get_int(&self, key: &str, default: i64, scope: Scope) -> i64 {
        self.doc
            .table(scope, self.user_id)
            .and_then(|table| table.get(key).copied())
            .unwrap_or(default)
    }

    fn put_int(&mut self, key: &str, value: i64, scope: Scope) -> Result<()> {
        // Start from the file so keys written by other clients survive
        let mut doc = read_document(&self.path)?;
        doc.table_mut(scope, self.user_id).insert(key.to_string(), value);
        self.persist(&doc)?;
        self.doc = doc;
        tracing::debug!("Stored {}={} ({:?})", key, value, scope);
        Ok(())
    }

    fn reload(&mut self) -> Result<()> {
        self.doc = read_document(&self.path)?;
        Ok(())
    }
}
