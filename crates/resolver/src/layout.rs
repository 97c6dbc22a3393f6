use locview_protocol::META_KEY;
use std::path::{Path, PathBuf};

/// Where the game keeps its manifest, master database and asset shards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    game_path: PathBuf,
    meta_key: String,
}

impl StoreLayout {
    pub fn new(game_path: impl Into<PathBuf>) -> Self {
        Self {
            game_path: game_path.into(),
            meta_key: META_KEY.to_string(),
        }
    }

    pub fn game_path(&self) -> &Path {
        &self.game_path
    }

    /// Asset manifest database.
    pub fn meta_path(&self) -> PathBuf {
        self.game_path.join("meta")
    }

    pub fn meta_key(&self) -> &str {
        &self.meta_key
    }

    /// Master database. It is not encrypted, so its key is empty.
    pub fn master_path(&self) -> PathBuf {
        self.game_path.join("master").join("master.mdb")
    }

    /// Root of the `{prefix}/{hash}` shard tree.
    pub fn data_dir(&self) -> PathBuf {
        self.game_path.join("dat")
    }
}

pub(crate) fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
