use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

pub const SYSTEMUI_PACKAGE: &str = "com.android.systemui";
pub const DECAY_RESOURCE: &str = "heads_up_notification_decay";

/// Supplies the platform default for the notification decay timeout.
pub trait DefaultProvider {
    fn decay_default(&self) -> Result<u64>;
}

#[derive(Debug, Default, Deserialize)]
struct ResourceTable {
    #[serde(default)]
    integer: HashMap<String, i64>,
}

/// Resources exposed by another installed package, read from
/// `<dir>/<package>.json`.
pub struct PackageResources {
    dir: PathBuf,
    package: String,
}

impl PackageResources {
    pub fn new(dir: impl Into<PathBuf>, package: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            package: package.into(),
        }
    }

    pub fn systemui(dir: impl Into<PathBuf>) -> Self {
        Self::new(dir, SYSTEMUI_PACKAGE)
    }

    fn resolve(&self) -> Result<ResourceTable> {
        let path = self.dir.join(format!("{}.json", self.package));
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Package {} not available", self.package))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse resources of {}", self.package))
    }

    pub fn integer(&self, name: &str) -> Result<i64> {
        let table = self.resolve()?;
        table
            .integer
            .get(name)
            .copied()
            .with_context(|| format!("{}:integer/{} not found", self.package, name))
    }
}

impl DefaultProvider for PackageResources {
    fn decay_default(&self) -> Result<u64> {
        let value = self.integer(DECAY_RESOURCE)?;
        u64::try_from(value)
            .with_context(|| format!("{} must not be negative, got {}", DECAY_RESOURCE, value))
    }
}

pub struct FixedDefault(pub u64);

impl DefaultProvider for FixedDefault {
    fn decay_default(&self) -> Result<u64> {
        Ok(self.0)
    }
}

/// The collaborating package is not installed.
pub struct Unavailable;

impl DefaultProvider for Unavailable {
    fn decay_default(&self) -> Result<u64> {
        anyhow::bail!("Package {} not available", SYSTEMUI_PACKAGE)
    }
}
