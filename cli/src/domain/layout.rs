//! Deterministic names and paths derived from an application name.

use std::path::{Path, PathBuf};

use crate::domain::config::AppName;

/// Directory under the workspace root that holds every instance.
pub const FILES_DIR: &str = "files";
/// Directory under the workspace root holding the shared base source.
pub const BASE_SOURCE_DIR: &str = "odoo";
pub const IMAGE_DEFINITION_FILE: &str = "Dockerfile";
pub const COMPOSITION_FILE: &str = "docker-compose.yml";

/// Everything the pipeline names after one application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingLayout {
    root: PathBuf,
    app: AppName,
    tag_suffix: String,
}

impl WorkingLayout {
    #[must_use]
    pub fn new(root: &Path, app: &AppName, tag_suffix: &str) -> Self {
        Self {
            root: root.to_path_buf(),
            app: app.clone(),
            tag_suffix: tag_suffix.to_string(),
        }
    }

    #[must_use]
    pub fn app(&self) -> &AppName {
        &self.app
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `files/<app>`
    #[must_use]
    pub fn working_dir(&self) -> PathBuf {
        self.root.join(FILES_DIR).join(self.app.as_str())
    }

    /// `files/<app>/instance`
    #[must_use]
    pub fn instance_dir(&self) -> PathBuf {
        self.working_dir().join("instance")
    }

    /// `files/<app>/instance/extra_addons`
    #[must_use]
    pub fn extra_addons_dir(&self) -> PathBuf {
        self.instance_dir().join("extra_addons")
    }

    /// `files/<app>/instance/odoo`
    #[must_use]
    pub fn base_source_copy(&self) -> PathBuf {
        self.instance_dir().join(BASE_SOURCE_DIR)
    }

    /// `files/<app>/instance/extra_addons/<app>`
    #[must_use]
    pub fn app_checkout(&self) -> PathBuf {
        self.extra_addons_dir().join(self.app.as_str())
    }

    /// Directories created by `PREPARE_DIRS`, parents first.
    #[must_use]
    pub fn directories(&self) -> [PathBuf; 3] {
        [
            self.working_dir(),
            self.instance_dir(),
            self.extra_addons_dir(),
        ]
    }

    #[must_use]
    pub fn image_tag(&self) -> String {
        format!("{}{}", self.app, self.tag_suffix)
    }

    #[must_use]
    pub fn container_name(&self) -> String {
        format!("test_{}", self.image_tag())
    }

    #[must_use]
    pub fn install_db(&self) -> String {
        format!("{}_install", self.app)
    }

    #[must_use]
    pub fn test_db(&self) -> String {
        format!("{}_test", self.app)
    }
}
