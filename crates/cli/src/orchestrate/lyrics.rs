use super::report;
use crate::loading::LoadKind;
use crate::session::Session;
use anyhow::Result;
use locview_protocol::{AssetKind, LyricItem, LyricsPayload};
use locview_resolver::{ExtractionExtra, LikePattern, NameCategory, NameTable};
use once_cell::sync::Lazy;
use regex::Regex;

static LYRICS_INDEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"m(\d{4})_lyrics").expect("valid lyrics regex"));

fn lyrics_pattern() -> LikePattern {
    LikePattern::prefix("live/musicscores/").literal("_lyrics")
}

/// List item for one lyrics asset path, labelled with the song name when known.
pub fn parse_lyric_item(path: &str, song_names: &NameTable) -> LyricItem {
    let index = LYRICS_INDEX
        .captures(path)
        .and_then(|caps| caps.get(1))
        .map_or("0000", |m| m.as_str())
        .to_string();
    let label = song_names
        .get_number(&index)
        .map_or_else(|| format!("Song {index}"), str::to_string);

    LyricItem {
        id: format!("m{index}"),
        index,
        path: path.to_string(),
        label,
    }
}

impl Session {
    pub async fn list_lyrics(&self) -> Result<Vec<LyricItem>> {
        let _loading = self.begin(LoadKind::Lyrics);
        report("list lyrics", self.list_lyrics_inner().await)
    }

    async fn list_lyrics_inner(&self) -> Result<Vec<LyricItem>> {
        self.require_game()?;
        let paths = self.locator.list_names(&lyrics_pattern()).await?;
        let song_names = self.names.resolve_category_names(NameCategory::SONG).await;
        log::info!("Found {} lyrics assets", paths.len());

        Ok(paths
            .iter()
            .map(|path| parse_lyric_item(path, &song_names))
            .collect())
    }

    /// Lyrics sheet of one asset, as CSV text.
    pub async fn open_lyrics(&self, path: &str) -> Result<String> {
        let _loading = self.begin(LoadKind::Lyrics);
        report(
            &format!("open lyrics {path}"),
            self.open_lyrics_inner(path).await,
        )
    }

    async fn open_lyrics_inner(&self, path: &str) -> Result<String> {
        self.require_game()?;
        let asset = self.locator.locate(path).await?;
        let request = self
            .requests
            .build(AssetKind::Lyrics, &asset, ExtractionExtra::default());
        let payload: LyricsPayload = self.extract_as(&request).await?;
        Ok(payload.csv_data)
    }
}
