use crate::error::ConfigError;
use kolreport_layout::TableMargins;
use kolreport_types::{Orientation, PageGeometry, PaperSize};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct MarginsConfig {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Default for MarginsConfig {
    fn default() -> Self {
        let m = TableMargins::default();
        Self { left: m.left, right: m.right, top: m.top, bottom: m.bottom }
    }
}

impl From<MarginsConfig> for TableMargins {
    fn from(m: MarginsConfig) -> Self {
        TableMargins { left: m.left, right: m.right, top: m.top, bottom: m.bottom }
    }
}

/// Layout and pipeline settings for an export. All lengths are millimetres.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Horizontal resolution every section is captured at, in logical pixels.
    pub capture_width_px: u32,
    /// Device pixel ratio applied on top of the capture size.
    pub pixel_ratio: u32,
    pub image_margin_mm: f32,
    pub title_y_mm: f32,
    pub title_font_size: f32,
    pub logo_width_mm: f32,
    pub logo_margin_mm: f32,
    pub table_start_y_mm: f32,
    pub table_margins: MarginsConfig,
    pub paper: PaperSize,
    pub orientation: Orientation,
    pub asset_timeout_ms: Option<u64>,
    pub capture_timeout_ms: Option<u64>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            capture_width_px: 1600,
            pixel_ratio: 2,
            image_margin_mm: 10.0,
            title_y_mm: 40.0,
            title_font_size: 20.0,
            logo_width_mm: 32.0,
            logo_margin_mm: 6.0,
            table_start_y_mm: 50.0,
            table_margins: MarginsConfig::default(),
            paper: PaperSize::A4,
            orientation: Orientation::Landscape,
            asset_timeout_ms: None,
            capture_timeout_ms: None,
        }
    }
}

impl ExportConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&source)
    }

    pub fn page_geometry(&self) -> PageGeometry {
        PageGeometry::new(self.paper, self.orientation)
    }

    pub fn table_margins(&self) -> TableMargins {
        self.table_margins.into()
    }

    pub fn asset_timeout(&self) -> Option<Duration> {
        self.asset_timeout_ms.map(Duration::from_millis)
    }

    pub fn capture_timeout(&self) -> Option<Duration> {
        self.capture_timeout_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));
        let page = self.page_geometry().size_mm();

        if self.capture_width_px == 0 {
            return invalid("capture_width_px must be positive".into());
        }
        if self.pixel_ratio == 0 {
            return invalid("pixel_ratio must be positive".into());
        }
        if self.image_margin_mm < 0.0
            || 2.0 * self.image_margin_mm >= page.width
            || 2.0 * self.image_margin_mm >= page.height
        {
            return invalid(format!(
                "image_margin_mm {} leaves no printable area on a {}x{} mm page",
                self.image_margin_mm, page.width, page.height
            ));
        }
        if self.title_font_size <= 0.0 {
            return invalid("title_font_size must be positive".into());
        }
        if self.logo_width_mm <= 0.0 || self.logo_width_mm + self.logo_margin_mm > page.width {
            return invalid(format!("logo_width_mm {} does not fit the page", self.logo_width_mm));
        }
        let m = &self.table_margins;
        if [m.left, m.right, m.top, m.bottom].iter().any(|v| *v < 0.0) {
            return invalid("table margins must not be negative".into());
        }
        if m.left + m.right >= page.width {
            return invalid("table margins leave no room for columns".into());
        }
        if self.table_start_y_mm < 0.0 || self.table_start_y_mm >= page.height - m.bottom {
            return invalid(format!("table_start_y_mm {} is outside the page", self.table_start_y_mm));
        }
        if self.asset_timeout_ms == Some(0) || self.capture_timeout_ms == Some(0) {
            return invalid("timeouts must be positive when set".into());
        }
        Ok(())
    }
}
