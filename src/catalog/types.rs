//! Google Books wire types.
//!
//! These mirror the `/volumes` response envelope verbatim. Everything the
//! provider treats as optional is `Option` here so a sparse record still
//! decodes; defaults are applied later during normalization, not at the
//! serde layer.

use serde::Deserialize;

/// The search envelope returned by `GET /volumes`.
#[derive(Deserialize, Debug)]
pub struct VolumesResponse {
    pub items: Option<Vec<Volume>>,
    #[serde(rename = "totalItems")]
    pub total_items: Option<u64>,
}

/// One catalog record. `GET /volumes/{id}` returns this shape directly.
#[derive(Deserialize, Debug)]
pub struct Volume {
    pub id: String,
    #[serde(rename = "volumeInfo", default)]
    pub volume_info: VolumeInfo,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    pub title: Option<String>,
    pub authors: Option<Vec<String>>,
    pub published_date: Option<String>,
    pub description: Option<String>,
    pub image_links: Option<ImageLinks>,
    pub average_rating: Option<f64>,
    pub ratings_count: Option<u32>,
    pub page_count: Option<u32>,
    pub categories: Option<Vec<String>>,
    pub language: Option<String>,
    pub industry_identifiers: Option<Vec<IndustryIdentifier>>,
    pub publisher: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ImageLinks {
    pub thumbnail: Option<String>,
    pub small_thumbnail: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct IndustryIdentifier {
    /// `ISBN_10`, `ISBN_13`, `ISSN` or `OTHER`.
    #[serde(rename = "type")]
    pub kind: String,
    pub identifier: String,
}

/// Error body the provider attaches to non-success statuses.
#[derive(Deserialize, Debug)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Deserialize, Debug)]
pub struct ErrorBody {
    pub code: Option<u16>,
    pub message: Option<String>,
}
