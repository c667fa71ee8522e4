use std::path::{Path, PathBuf};

use crate::config::TilerConfig;
use crate::identity::{IdentityAssigner, PAINTING_NAMESPACE, base_id_from_clock};

/// Per-invocation settings, built once at startup and read-only afterwards.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub author: String,
    pub title: String,
    pub out_dir: PathBuf,
    /// Input file name without extension; prefix of every output file.
    pub name_root: String,
    /// Wall-clock nanoseconds captured at run start.
    pub base_id: i64,
    pub namespace: &'static str,
}

impl RunContext {
    /// Context for `cfg`, seeding `base_id` from the clock.
    pub fn new(cfg: &TilerConfig, name_root: impl Into<String>) -> Self {
        Self::with_base_id(cfg, name_root, base_id_from_clock())
    }

    pub fn with_base_id(cfg: &TilerConfig, name_root: impl Into<String>, base_id: i64) -> Self {
        Self {
            author: cfg.author.clone(),
            title: cfg.title.clone(),
            out_dir: cfg.out_dir.clone(),
            name_root: name_root.into(),
            base_id,
            namespace: PAINTING_NAMESPACE,
        }
    }

    /// Fresh identity sequence for this run, counter at zero.
    pub fn identity_assigner(&self) -> IdentityAssigner {
        IdentityAssigner::new(self.namespace, self.base_id)
    }

    pub fn raster_path(&self, file_base: &str) -> PathBuf {
        self.out_dir.join(format!("{file_base}.{}", crate::export::RASTER_EXT))
    }

    pub fn descriptor_path(&self, file_base: &str) -> PathBuf {
        self.out_dir
            .join(format!("{file_base}.{}", crate::export::DESCRIPTOR_EXT))
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }
}
