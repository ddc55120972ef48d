use crate::constants::{CAPTION_FONT_SIZE_PT, CAPTION_GRAY, DEFAULT_MARGIN_MM, MAX_MARGIN_MM};
use crate::normalize::NormalizeOptions;
use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Caption drawn under each image (the image's display name)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CaptionStyle {
    pub enabled: bool,
    pub font_size_pt: f32,
    /// RGB fill color, each channel in 0.0..=1.0
    pub color: [f32; 3],
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            enabled: false,
            font_size_pt: CAPTION_FONT_SIZE_PT,
            color: CAPTION_GRAY,
        }
    }
}

/// Page layout configuration shared by every page of a conversion
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LayoutSettings {
    pub page_size: PageSize,
    pub orientation: Orientation,
    /// Margin on every side, in millimeters
    pub margin_mm: f32,
    pub caption: CaptionStyle,
    /// Downscale images whose longer side exceeds this many pixels
    pub max_image_dimension: Option<u32>,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            orientation: Orientation::Portrait,
            margin_mm: DEFAULT_MARGIN_MM,
            caption: CaptionStyle::default(),
            max_image_dimension: None,
        }
    }
}

impl LayoutSettings {
    /// Page dimensions after the orientation swap
    pub fn effective_page_size(&self) -> EffectivePageSize {
        self.page_size.effective(self.orientation)
    }

    /// Margin clamped to `[0, MAX_MARGIN_MM]`; non-finite values become 0
    pub fn clamped_margin(&self) -> f32 {
        if self.margin_mm.is_finite() {
            self.margin_mm.clamp(0.0, MAX_MARGIN_MM)
        } else {
            0.0
        }
    }

    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            max_dimension: self.max_image_dimension,
        }
    }

    /// Load settings from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let settings = serde_json::from_slice(&bytes)
            .map_err(|e| ConvertError::Config(format!("Failed to parse settings: {}", e)))?;
        Ok(settings)
    }

    /// Save settings to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConvertError::Config(format!("Failed to serialize settings: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        let (width, height) = self.page_size.dimensions_mm();
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(ConvertError::Config(format!(
                "Page size must be positive, got {}x{} mm",
                width, height
            )));
        }

        if !self.margin_mm.is_finite() {
            return Err(ConvertError::Config("Margin must be a number".to_string()));
        }

        if self.max_image_dimension == Some(0) {
            return Err(ConvertError::Config(
                "Maximum image dimension must be at least 1 pixel".to_string(),
            ));
        }

        if self.caption.enabled && self.caption.font_size_pt <= 0.0 {
            return Err(ConvertError::Config(
                "Caption font size must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
