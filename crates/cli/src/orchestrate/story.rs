use super::report;
use crate::loading::LoadKind;
use crate::session::Session;
use anyhow::Result;
use locview_protocol::{AssetKind, StoryView, ViewConfig, VoicePayload};
use locview_resolver::{ExtractionExtra, LikePattern, ResolveError};
use serde_json::Value;
use std::collections::HashSet;

/// Story id prefixes rendered as dialogue rather than plain text.
const STORY_VIEW_CATEGORIES: [&str; 3] = ["02", "04", "09"];

/// Cue id meaning "no voice line" in a story block.
const NO_CUE: i64 = -1;

pub fn is_story_view(story_id: &str) -> bool {
    story_id
        .get(..2)
        .is_some_and(|prefix| STORY_VIEW_CATEGORIES.contains(&prefix))
}

/// `sound/c/snd_voi_story_{CCGGGG}.awb`, from the first six id characters.
pub fn voice_asset_name(story_id: &str) -> String {
    let end = story_id
        .char_indices()
        .nth(6)
        .map_or(story_id.len(), |(idx, _)| idx);
    format!("sound/c/snd_voi_story_{}.awb", &story_id[..end])
}

/// Distinct voiced cue ids of a story payload, in first-seen order.
///
/// `None` when the payload has no `blockList`.
pub fn collect_cue_ids(story: &Value) -> Option<Vec<i64>> {
    let blocks = story.get("blockList")?.as_array()?;
    let mut seen = HashSet::new();
    Some(
        blocks
            .iter()
            .filter_map(|block| block.get("cueId").and_then(Value::as_i64))
            .filter(|&cue| cue != NO_CUE && seen.insert(cue))
            .collect(),
    )
}

impl Session {
    pub async fn open_story(&self, story_id: &str) -> Result<StoryView> {
        let _loading = self.begin(LoadKind::Story);
        report(
            &format!("open story {story_id}"),
            self.open_story_inner(story_id).await,
        )
    }

    async fn open_story_inner(&self, story_id: &str) -> Result<StoryView> {
        anyhow::ensure!(!story_id.trim().is_empty(), "story id is empty");
        self.require_game()?;
        log::info!("Opening story {story_id}");

        let asset = self
            .locator
            .locate_matching(&LikePattern::suffix(&format!("storytimeline_{story_id}")))
            .await?;
        let request = self
            .requests
            .build(AssetKind::Story, &asset, ExtractionExtra::default());
        let data: Value = self.extract_as(&request).await?;

        Ok(StoryView {
            story_id: story_id.to_string(),
            config: ViewConfig {
                no_wrap: false,
                is_story_view: is_story_view(story_id),
            },
            data,
        })
    }

    /// Extract the voice cues referenced by an opened story.
    ///
    /// `Ok(None)` when the story has no voiced blocks.
    pub async fn load_voice(&self, story_id: &str, story: &Value) -> Result<Option<VoicePayload>> {
        let _loading = self.begin(LoadKind::Voice);
        report(
            &format!("load voice for {story_id}"),
            self.load_voice_inner(story_id, story).await,
        )
    }

    async fn load_voice_inner(&self, story_id: &str, story: &Value) -> Result<Option<VoicePayload>> {
        self.require_game()?;
        let Some(cue_ids) = collect_cue_ids(story) else {
            log::warn!("Story {story_id} has no block list, no cues to extract");
            return Ok(None);
        };
        if cue_ids.is_empty() {
            log::info!("Story {story_id} has no voiced blocks");
            return Ok(None);
        }

        let asset = self.locator.locate(&voice_asset_name(story_id)).await?;
        log::info!("Extracting {} cues from {}", cue_ids.len(), asset.name);

        let request = self
            .requests
            .build(AssetKind::Voice, &asset, ExtractionExtra::cues(cue_ids));
        let payload: VoicePayload = self.extract_as(&request).await?;
        if let Some(error) = &payload.error {
            return Err(ResolveError::external(format!("voice extraction: {error}")).into());
        }
        Ok(Some(payload))
    }
}
