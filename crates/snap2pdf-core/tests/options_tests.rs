use snap2pdf_core::constants::MAX_MARGIN_MM;
use snap2pdf_core::*;

#[test]
fn test_default_settings() {
    let settings = LayoutSettings::default();
    assert_eq!(settings.page_size, PageSize::A4);
    assert_eq!(settings.orientation, Orientation::Portrait);
    assert_eq!(settings.margin_mm, 10.0);
    assert!(!settings.caption.enabled);
    assert!(settings.validate().is_ok());
}

#[test]
fn test_margin_clamping() {
    let mut settings = LayoutSettings::default();

    settings.margin_mm = -3.0;
    assert_eq!(settings.clamped_margin(), 0.0);

    settings.margin_mm = 500.0;
    assert_eq!(settings.clamped_margin(), MAX_MARGIN_MM);

    settings.margin_mm = 24.0;
    assert_eq!(settings.clamped_margin(), 24.0);

    settings.margin_mm = f32::NAN;
    assert_eq!(settings.clamped_margin(), 0.0);
}

#[test]
fn test_validation() {
    let mut settings = LayoutSettings::default();

    settings.page_size = PageSize::Custom {
        width_mm: -1.0,
        height_mm: 100.0,
    };
    match settings.validate() {
        Err(ConvertError::Config(msg)) => assert!(msg.contains("Page size")),
        other => panic!("Expected Config error, got {:?}", other),
    }

    settings.page_size = PageSize::Square;
    settings.max_image_dimension = Some(0);
    assert!(settings.validate().is_err());

    settings.max_image_dimension = Some(4000);
    assert!(settings.validate().is_ok());

    settings.margin_mm = f32::INFINITY;
    assert!(settings.validate().is_err());
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_save_and_load_settings() {
    use tempfile::NamedTempFile;

    let settings = LayoutSettings {
        page_size: PageSize::Letter,
        orientation: Orientation::Landscape,
        margin_mm: 24.0,
        caption: CaptionStyle {
            enabled: true,
            ..Default::default()
        },
        max_image_dimension: Some(4000),
    };

    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path();

    settings.save(path).await.unwrap();
    let loaded = LayoutSettings::load(path).await.unwrap();

    assert_eq!(loaded, settings);
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_partial_settings_file_uses_defaults() {
    use tempfile::NamedTempFile;

    let temp_file = NamedTempFile::new().unwrap();
    std::fs::write(temp_file.path(), r#"{ "orientation": "Landscape" }"#).unwrap();

    let loaded = LayoutSettings::load(temp_file.path()).await.unwrap();
    assert_eq!(loaded.orientation, Orientation::Landscape);
    assert_eq!(loaded.page_size, PageSize::A4);
    assert_eq!(loaded.margin_mm, 10.0);
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_malformed_settings_file() {
    use tempfile::NamedTempFile;

    let temp_file = NamedTempFile::new().unwrap();
    std::fs::write(temp_file.path(), "not json").unwrap();

    match LayoutSettings::load(temp_file.path()).await {
        Err(ConvertError::Config(msg)) => assert!(msg.contains("parse")),
        other => panic!("Expected Config error, got {:?}", other),
    }
}
