use super::report;
use crate::loading::LoadKind;
use crate::session::Session;
use anyhow::Result;
use locview_protocol::{AssetKind, RaceStoryItem, RaceStoryPayload};
use locview_resolver::{ExtractionExtra, LikePattern, NameCategory, NameTable};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static RACE_STORY_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"storytimeline_(\d+)").expect("valid race story regex"));

const RACE_STORY_PREFIX: &str = "race/storytimeline/";

/// List item for one race narration asset path.
pub fn parse_race_item(path: &str, story_names: &NameTable) -> RaceStoryItem {
    let id = RACE_STORY_ID
        .captures(path)
        .and_then(|caps| caps.get(1))
        .map_or("unknown", |m| m.as_str())
        .to_string();
    let label = story_names
        .get_number(&id)
        .map_or_else(|| format!("Race {id}"), str::to_string);

    RaceStoryItem {
        id,
        label,
        path: path.to_string(),
    }
}

impl Session {
    pub async fn list_race_stories(&self) -> Result<Vec<RaceStoryItem>> {
        let _loading = self.begin(LoadKind::RaceStory);
        report("list race stories", self.list_race_stories_inner().await)
    }

    async fn list_race_stories_inner(&self) -> Result<Vec<RaceStoryItem>> {
        self.require_game()?;
        let paths = self
            .locator
            .list_names(&LikePattern::prefix(RACE_STORY_PREFIX))
            .await?;
        let story_names = self.names.resolve_category_names(NameCategory::STORY).await;

        Ok(paths
            .iter()
            .map(|path| parse_race_item(path, &story_names))
            .collect())
    }

    pub async fn open_race_story(&self, path: &str) -> Result<Value> {
        let _loading = self.begin(LoadKind::RaceStory);
        report(
            &format!("open race story {path}"),
            self.open_race_story_inner(path).await,
        )
    }

    async fn open_race_story_inner(&self, path: &str) -> Result<Value> {
        self.require_game()?;
        let asset = self.locator.locate(path).await?;
        let request = self
            .requests
            .build(AssetKind::RaceStory, &asset, ExtractionExtra::default());
        let payload: RaceStoryPayload = self.extract_as(&request).await?;
        Ok(payload.json_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn race_items_fall_back_to_generic_label() {
        let names: NameTable = [("9001".to_string(), "Arima Kinen".to_string())]
            .into_iter()
            .collect();

        let known = parse_race_item("race/storytimeline/storytimeline_9001", &names);
        assert_eq!(known.id, "9001");
        assert_eq!(known.label, "Arima Kinen");

        let unnamed = parse_race_item("race/storytimeline/storytimeline_0012", &names);
        assert_eq!(unnamed.label, "Race 0012");

        let broken = parse_race_item("race/storytimeline/readme", &names);
        assert_eq!((broken.id.as_str(), broken.label.as_str()), ("unknown", "Race unknown"));
    }
}
