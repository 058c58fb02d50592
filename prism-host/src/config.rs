//! Host configuration from the environment

use prism_plugin::{ResourceError, ResourceRegistry};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

const DEFAULT_DATA_PATH: &str = "./data";
const MANIFEST_NAME: &str = "resources.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Directory holding the resource manifest and data files
    pub data_path: PathBuf,
    /// Resource manifest listing files, connections and tables
    pub resources_path: PathBuf,
}

impl HostConfig {
    /// Read `PRISM_DATA_PATH` and `PRISM_RESOURCES`
    pub fn from_env() -> Self {
        Self::from_vars(env::var("PRISM_DATA_PATH").ok(), env::var("PRISM_RESOURCES").ok())
    }

    fn from_vars(data_path: Option<String>, resources_path: Option<String>) -> Self {
        let data_path = data_path
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));
        let resources_path = resources_path
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| data_path.join(MANIFEST_NAME));
        Self {
            data_path,
            resources_path,
        }
    }

    /// Load the resource manifest. A missing manifest gives an empty registry.
    pub fn load_resources(&self) -> Result<ResourceRegistry, ResourceError> {
        if !self.resources_path.exists() {
            warn!(
                path = %self.resources_path.display(),
                "resource manifest not found, starting with no resources"
            );
            return Ok(ResourceRegistry::new());
        }
        info!(path = %self.resources_path.display(), "loading resource manifest");
        ResourceRegistry::load(&self.resources_path)
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self::from_vars(None, None)
    }
}
