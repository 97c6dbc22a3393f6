//! Per-source call sequences: locate, build the request, extract, build trees.
//!
//! Every entry point raises its loading flag for the duration of the call,
//! logs failures and hands them back to the caller. Only name resolution is
//! allowed to fail quietly.

mod dict;
mod lyrics;
mod mdb;
mod race;
mod story;

pub use dict::dictionary_tree;
pub use lyrics::parse_lyric_item;
pub use mdb::MdbTable;
pub use race::parse_race_item;
pub use story::{collect_cue_ids, is_story_view, voice_asset_name};

use crate::session::Session;
use anyhow::{Context, Result};
use locview_protocol::ExtractionRequest;
use locview_resolver::ResolveError;
use serde::de::DeserializeOwned;

fn report<T>(what: &str, result: Result<T>) -> Result<T> {
    if let Err(err) = &result {
        log::error!("Failed to {what}: {err:#}");
    }
    result
}

impl Session {
    pub(crate) async fn extract_as<T: DeserializeOwned>(
        &self,
        request: &ExtractionRequest,
    ) -> Result<T> {
        let payload = self
            .extraction
            .extract(request)
            .await
            .with_context(|| format!("{} extraction failed", request.kind))?;
        serde_json::from_value(payload).map_err(|err| {
            ResolveError::malformed(format!("{} payload: {err}", request.kind)).into()
        })
    }
}
