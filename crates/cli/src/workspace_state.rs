use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

const STATE_FILE: &str = "workspace.json";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeState {
    pub open: bool,
    pub children_start: usize,
}

/// Explorer state carried between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkspaceState {
    pub current_path: Vec<String>,
    pub explorer_scroll_top: f64,
    pub node_states: BTreeMap<String, NodeState>,
    /// Node id to number of selected content slots.
    pub selected_nodes: BTreeMap<String, usize>,
    pub copying_nodes: BTreeMap<String, usize>,
    pub user_data: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct WorkspaceStore {
    path: PathBuf,
}

impl WorkspaceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(STATE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unreadable state restores defaults.
    pub async fn restore(&self) -> WorkspaceState {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(_) => return WorkspaceState::default(),
        };
        match serde_json::from_slice(&bytes) {
            Ok(state) => state,
            Err(err) => {
                log::warn!("Workspace state {} corrupted: {err}", self.path.display());
                WorkspaceState::default()
            }
        }
    }

    pub async fn save(&self, state: &WorkspaceState) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Cannot create state dir {}", dir.display()))?;
        }
        let bytes = serde_json::to_vec_pretty(state)?;
        fs::write(&self.path, bytes)
            .await
            .with_context(|| format!("Cannot write workspace state {}", self.path.display()))
    }
}
