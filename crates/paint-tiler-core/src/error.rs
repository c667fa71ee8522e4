use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TilerError {
    #[error("Image dimensions {width}x{height} rejected: {reason}")]
    Dimension {
        width: u32,
        height: u32,
        reason: String,
    },
    #[error("No canvas fits at grid cell (row {row}, col {col})")]
    NoFit { row: u32, col: u32 },
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Image error at {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("NBT error: {0}")]
    Nbt(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl TilerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TilerError::Io {
            path: path.into(),
            source,
        }
    }

    /// Codec failures that are really I/O keep their `Io` shape.
    pub(crate) fn image(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        match source {
            image::ImageError::IoError(e) => TilerError::io(path, e),
            other => TilerError::Image {
                path: path.into(),
                source: other,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, TilerError>;
