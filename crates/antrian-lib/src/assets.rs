//! Segment clips on disk — `<audio_dir>/<segment>.<ext>`.

use std::path::{Path, PathBuf};

use antrian_core::sequence::{SegmentAvailability, SegmentId};
use antrian_core::types::AssetConfig;

/// Resolves segment ids to clip files and answers availability checks.
#[derive(Debug, Clone)]
pub struct AssetDirectory {
    config: AssetConfig,
}

impl AssetDirectory {
    pub fn new(config: AssetConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AssetConfig {
        &self.config
    }

    pub fn dir(&self) -> &Path {
        &self.config.audio_dir
    }

    /// Path of a segment's clip, whether or not it exists.
    pub fn path_for(&self, id: &SegmentId) -> PathBuf {
        self.config.audio_dir.join(self.config.file_name(id))
    }

    pub fn exists(&self, id: &SegmentId) -> bool {
        self.path_for(id).is_file()
    }

    /// The ids among `ids` that have no clip.
    pub fn missing(&self, ids: impl IntoIterator<Item = SegmentId>) -> Vec<SegmentId> {
        ids.into_iter().filter(|id| !self.exists(id)).collect()
    }
}

impl SegmentAvailability for AssetDirectory {
    fn has_segment(&self, id: &SegmentId) -> bool {
        self.exists(id)
    }
}
