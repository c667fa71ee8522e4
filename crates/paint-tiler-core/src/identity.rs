//! Tile naming: file base names and descriptor identities.

use std::fmt;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Namespace identifying paintings produced for the Joy of Painting renderer.
pub const PAINTING_NAMESPACE: &str = "d1ebe29f-f4e9-4572-83cd-8b2cdbfc2420";

/// `<name_root>_<row_index>_<tile_index>`
pub fn file_base_name(name_root: &str, row_index: u32, tile_index: u32) -> String {
    format!("{name_root}_{row_index}_{tile_index}")
}

/// File name of `path` cut at its last `.` (`art/cat.v2.png` -> `cat.v2`).
///
/// A dot-only name such as `.png` yields an empty root, which
/// [`plan_tiles`](crate::planner::plan_tiles) rejects.
pub fn name_root_from_path(path: &Path) -> String {
    let base = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match base.rfind('.') {
        Some(dot) => base[..dot].to_string(),
        None => base,
    }
}

/// Nanoseconds since the Unix epoch, captured once per run.
pub fn base_id_from_clock() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as i64)
        .unwrap_or_default()
}

/// Unique name stored in the descriptor's `name` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileIdentity(String);

impl TileIdentity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TileIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<TileIdentity> for String {
    fn from(id: TileIdentity) -> Self {
        id.0
    }
}

/// Hands out identities `<namespace>_<base_id + counter>` in export order.
///
/// The counter starts at 0 and advances by exactly one per call.
#[derive(Debug, Clone)]
pub struct IdentityAssigner {
    namespace: &'static str,
    base_id: i64,
    counter: i64,
}

impl IdentityAssigner {
    pub fn new(namespace: &'static str, base_id: i64) -> Self {
        Self {
            namespace,
            base_id,
            counter: 0,
        }
    }

    /// Assigner for the painting namespace seeded from the wall clock.
    pub fn from_clock() -> Self {
        Self::new(PAINTING_NAMESPACE, base_id_from_clock())
    }

    pub fn base_id(&self) -> i64 {
        self.base_id
    }

    /// Number of identities handed out so far.
    pub fn counter(&self) -> i64 {
        self.counter
    }

    pub fn next_identity(&mut self) -> TileIdentity {
        let id = TileIdentity(format!(
            "{}_{}",
            self.namespace,
            self.base_id.wrapping_add(self.counter)
        ));
        self.counter += 1;
        id
    }

    /// Pre-computes the next `n` identities in order.
    pub fn assign_all(&mut self, n: usize) -> Vec<TileIdentity> {
        (0..n).map(|_| self.next_identity()).collect()
    }
}
