use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::model::UNIT_PX;

/// Ceiling on image width/height used by earlier releases of the tool.
/// Not enforced unless set through [`TilerConfig::max_dimension`].
pub const DEFAULT_MAX_DIMENSION: u32 = 512;

/// Run configuration shared by planning and export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TilerConfig {
    /// Author written into every descriptor.
    #[serde(default = "default_author")]
    pub author: String,
    /// Title written into every descriptor.
    #[serde(default = "default_title")]
    pub title: String,
    /// Directory receiving the `.bmp` and `.paint` files.
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
    /// Optional ceiling on image width and height in pixels.
    #[serde(default)]
    pub max_dimension: Option<u32>,
    /// Export tiles in parallel when feature "parallel" is on.
    #[serde(default)]
    pub parallel: bool,
}

impl Default for TilerConfig {
    fn default() -> Self {
        Self {
            author: default_author(),
            title: default_title(),
            out_dir: default_out_dir(),
            max_dimension: None,
            parallel: false,
        }
    }
}

impl TilerConfig {
    /// Validates the configuration parameters.
    ///
    /// A configured ceiling must be non-zero and a multiple of the 16px unit,
    /// otherwise no image could satisfy both constraints at that bound.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::TilerError;

        if let Some(max) = self.max_dimension {
            if max == 0 {
                return Err(TilerError::InvalidConfig(
                    "max_dimension must be greater than zero".into(),
                ));
            }
            if max % UNIT_PX != 0 {
                return Err(TilerError::InvalidConfig(format!(
                    "max_dimension ({max}) must be a multiple of {UNIT_PX}"
                )));
            }
        }
        if self.out_dir.as_os_str().is_empty() {
            return Err(TilerError::InvalidConfig("out_dir is empty".into()));
        }
        Ok(())
    }

    /// Create a fluent builder for `TilerConfig`.
    pub fn builder() -> TilerConfigBuilder {
        TilerConfigBuilder::new()
    }
}

fn default_author() -> String {
    "Unknown".into()
}
fn default_title() -> String {
    "Untitled".into()
}
fn default_out_dir() -> PathBuf {
    PathBuf::from("tiles")
}

/// Builder for `TilerConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct TilerConfigBuilder {
    cfg: TilerConfig,
}

impl TilerConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: TilerConfig::default(),
        }
    }
    pub fn author(mut self, v: impl Into<String>) -> Self {
        self.cfg.author = v.into();
        self
    }
    pub fn title(mut self, v: impl Into<String>) -> Self {
        self.cfg.title = v.into();
        self
    }
    pub fn out_dir(mut self, v: impl Into<PathBuf>) -> Self {
        self.cfg.out_dir = v.into();
        self
    }
    pub fn max_dimension(mut self, v: Option<u32>) -> Self {
        self.cfg.max_dimension = v;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }
    pub fn build(self) -> TilerConfig {
        self.cfg
    }
}
