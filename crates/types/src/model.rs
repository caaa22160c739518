//! The data an export consumes: captured rasters, the branding asset and the
//! metric rows handed over by the dashboard's data layer.

use serde::{Deserialize, Deserializer};
use std::fmt;
use std::sync::Arc;

/// Encoding of an embeddable raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageFormat::Png => f.write_str("PNG"),
            ImageFormat::Jpeg => f.write_str("JPEG"),
        }
    }
}

/// A PNG raster of one captured section.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    data: Vec<u8>,
    pixel_width: u32,
    pixel_height: u32,
}

impl Snapshot {
    pub fn new(data: Vec<u8>, pixel_width: u32, pixel_height: u32) -> Self {
        Self {
            data,
            pixel_width,
            pixel_height,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel_width(&self) -> u32 {
        self.pixel_width
    }

    pub fn pixel_height(&self) -> u32 {
        self.pixel_height
    }
}

/// The branding image stamped on every page. Cheap to clone; the bytes are shared.
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    pub data: Arc<Vec<u8>>,
    pub format: ImageFormat,
    pub pixel_width: u32,
    pub pixel_height: u32,
}

impl Asset {
    /// Height-to-width ratio, `1.0` when the height is unknown.
    pub fn aspect(&self) -> f32 {
        if self.pixel_height > 0 && self.pixel_width > 0 {
            self.pixel_height as f32 / self.pixel_width as f32
        } else {
            1.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Default)]
pub enum Platform {
    Facebook,
    Instagram,
    TikTok,
    YouTube,
    X,
    #[default]
    #[serde(other)]
    Other,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Facebook => "Facebook",
            Platform::Instagram => "Instagram",
            Platform::TikTok => "TikTok",
            Platform::YouTube => "YouTube",
            Platform::X => "X",
            Platform::Other => "Other",
        };
        f.write_str(name)
    }
}

/// Precomputed aggregates for one report. Read-only input.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Totals {
    pub total_view: u64,
    pub total_likes: u64,
    pub total_comments: u64,
    pub total_shares: u64,
    pub total_save: u64,
    pub total_engagement: u64,
    #[serde(alias = "avgER")]
    pub average_er: Option<f64>,
    #[serde(alias = "avgERV")]
    pub average_erv: Option<f64>,
}

/// Per-KOL metrics of one campaign, as computed by the data layer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KolRow {
    pub id: u32,
    pub name: String,
    #[serde(deserialize_with = "string_or_number", default)]
    pub followers: String,
    #[serde(default)]
    pub platform: Platform,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub view: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub shares: u64,
    #[serde(default)]
    pub save: u64,
    #[serde(default)]
    pub total_engagement: u64,
    #[serde(default)]
    pub er: f64,
    #[serde(default)]
    pub erv: f64,
}

/// Per-campaign aggregates shown on the summary report.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRow {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub total_kols: u64,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub total_view: u64,
    #[serde(default)]
    pub total_likes: u64,
    #[serde(default)]
    pub total_comments: u64,
    #[serde(default)]
    pub total_shares: u64,
    #[serde(default)]
    pub total_save: u64,
    #[serde(default)]
    pub total_engagement: u64,
    #[serde(default, rename = "avgER")]
    pub avg_er: f64,
    #[serde(default, rename = "avgERV")]
    pub avg_erv: f64,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Int(i) => i.to_string(),
        Raw::Float(f) => f.to_string(),
    })
}
