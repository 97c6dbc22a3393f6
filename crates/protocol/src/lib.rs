use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub mod tree;

pub use tree::{CategoryNode, EntryNode, TextSlot, TreeNode};

/// Access key for the asset manifest database (JP client).
pub const META_KEY: &str = "532b4631e4a7b9473e7cfb";

/// Opaque scalar cell returned by the query collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) if value.is_finite() && value.fract() == 0.0 => {
                write!(f, "{}", *value as i64)
            }
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// One query row. Arity is fixed by the query's column list.
pub type Record = Vec<Scalar>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    #[serde(rename = "db_path")]
    pub store_path: String,
    pub query: String,
    pub key: String,
}

/// Rows come back in the collaborator's order; nothing downstream re-sorts them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(alias = "header", default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Record>,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First cell of every row rendered as text. Rows with no cells are skipped.
    pub fn first_column(&self) -> Vec<String> {
        self.rows
            .iter()
            .filter_map(|row| row.first())
            .map(ToString::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Story,
    Lyrics,
    RaceStory,
    Voice,
}

impl AssetKind {
    /// Bridge command that extracts this kind.
    pub fn command(self) -> &'static str {
        match self {
            Self::Story => "extract_story_data",
            Self::Lyrics => "extract_lyrics_data",
            Self::RaceStory => "extract_race_story_data",
            Self::Voice => "extract_voice",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Story => "story",
            Self::Lyrics => "lyrics",
            Self::RaceStory => "race_story",
            Self::Voice => "voice",
        };
        f.write_str(name)
    }
}

/// Parameters for story, lyrics and race narration bundles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleExtraction {
    pub asset_path: String,
    pub asset_name: String,
    pub use_decryption: bool,
    pub meta_path: String,
    pub bundle_hash: String,
    pub meta_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceExtraction {
    pub awb_path: String,
    pub cue_ids: Vec<i64>,
    pub hca_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtractionParams {
    Bundle(BundleExtraction),
    Voice(VoiceExtraction),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRequest {
    pub kind: AssetKind,
    pub params: ExtractionParams,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LyricsPayload {
    pub csv_data: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RaceStoryPayload {
    pub json_data: serde_json::Value,
}

/// Cue id (as text) to a playable file path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoicePayload {
    #[serde(default)]
    pub uris: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewConfig {
    pub no_wrap: bool,
    pub is_story_view: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryView {
    pub story_id: String,
    pub config: ViewConfig,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LyricItem {
    pub id: String,
    pub index: String,
    pub path: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceStoryItem {
    pub id: String,
    pub label: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryListing {
    pub id: String,
    pub path: String,
    pub rel_path: String,
    pub category: String,
    pub group: String,
}

pub fn serialize_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}
