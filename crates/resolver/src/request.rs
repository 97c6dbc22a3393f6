use crate::layout::{path_string, StoreLayout};
use crate::locator::AssetReference;
use locview_protocol::{
    AssetKind, BundleExtraction, ExtractionParams, ExtractionRequest, VoiceExtraction,
};

/// Audio decode key sent with every voice request.
pub const HCA_KEY: &str = "0";

/// Kind-specific inputs that do not come from the manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionExtra {
    pub cue_ids: Vec<i64>,
}

impl ExtractionExtra {
    pub fn cues(cue_ids: Vec<i64>) -> Self {
        Self { cue_ids }
    }
}

/// Assembles extraction parameters. Pure: no I/O, same input, same request.
#[derive(Debug, Clone)]
pub struct ExtractionRequestBuilder {
    layout: StoreLayout,
}

impl ExtractionRequestBuilder {
    pub fn new(layout: StoreLayout) -> Self {
        Self { layout }
    }

    pub fn build(
        &self,
        kind: AssetKind,
        asset: &AssetReference,
        extra: ExtractionExtra,
    ) -> ExtractionRequest {
        let asset_path = path_string(&asset.storage_path(&self.layout.data_dir()));
        let params = match kind {
            AssetKind::Story | AssetKind::Lyrics | AssetKind::RaceStory => {
                ExtractionParams::Bundle(BundleExtraction {
                    asset_path,
                    asset_name: asset.name.clone(),
                    use_decryption: true,
                    meta_path: path_string(&self.layout.meta_path()),
                    bundle_hash: asset.hash.clone(),
                    meta_key: self.layout.meta_key().to_string(),
                })
            }
            AssetKind::Voice => ExtractionParams::Voice(VoiceExtraction {
                awb_path: asset_path,
                cue_ids: extra.cue_ids,
                hca_key: HCA_KEY.to_string(),
            }),
        };
        ExtractionRequest { kind, params }
    }
}
