use std::path::PathBuf;

const STORE_ENV: &str = "HEADSUP_STORE";
const RESOURCES_ENV: &str = "HEADSUP_RESOURCES";

/// Where settings and package resources are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub store_path: PathBuf,
    pub resources_dir: PathBuf,
    pub user_id: u32,
}

impl Config {
    /// Defaults under the user config directory, overridable via
    /// `HEADSUP_STORE` and `HEADSUP_RESOURCES`.
    pub fn new() -> Self {
        Self::resolve(
            base_dir(),
            std::env::var_os(STORE_ENV).map(PathBuf::from),
            std::env::var_os(RESOURCES_ENV).map(PathBuf::from),
            current_user_id(),
        )
    }

    fn resolve(
        base: PathBuf,
        store_path: Option<PathBuf>,
        resources_dir: Option<PathBuf>,
        user_id: u32,
    ) -> Self {
        Self {
            store_path: store_path.unwrap_or_else(|| base.join("settings.json")),
            resources_dir: resources_dir.unwrap_or_else(|| base.join("packages")),
            user_id,
        }
    }

    pub fn with_store_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.store_path = path;
        }
        self
    }

    pub fn with_resources_dir(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(dir) = dir {
            self.resources_dir = dir;
        }
        self
    }

    pub fn with_user_id(mut self, user_id: Option<u32>) -> Self {
        if let Some(user_id) = user_id {
            self.user_id = user_id;
        }
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn base_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("headsup")
}

fn current_user_id() -> u32 {
    // SAFETY: getuid has no preconditions and cannot fail
    unsafe { libc::getuid() }
}
