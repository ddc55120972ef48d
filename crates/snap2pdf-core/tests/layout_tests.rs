use snap2pdf_core::*;

fn a4_portrait() -> EffectivePageSize {
    PageSize::A4.effective(Orientation::Portrait)
}

fn assert_within_margins(p: &Placement, page: EffectivePageSize, margin: f32) {
    let tolerance = 1e-3;
    assert!(p.x >= margin - tolerance, "x={} margin={}", p.x, margin);
    assert!(p.y >= margin - tolerance, "y={} margin={}", p.y, margin);
    assert!(p.right() <= page.width_mm - margin + tolerance);
    assert!(p.top() <= page.height_mm - margin + tolerance);
    assert!(p.width >= 0.0 && p.height >= 0.0);
}

#[test]
fn test_landscape_photo_on_a4_portrait() {
    let p = resolve_placement(800, 600, a4_portrait(), 10.0);

    assert!((p.scale - 0.2375).abs() < 1e-6);
    assert!((p.width - 190.0).abs() < 1e-3);
    assert!((p.height - 142.5).abs() < 1e-3);
    assert!((p.x - 10.0).abs() < 1e-3);
    // Centered vertically: 10 + (277 - 142.5) / 2
    assert!((p.y - 77.25).abs() < 1e-3);
}

#[test]
fn test_aspect_ratio_and_bounds_across_inputs() {
    let dimensions = [
        (1, 1),
        (800, 600),
        (600, 800),
        (4000, 3),
        (3, 4000),
        (1920, 1080),
        (17, 31),
        (65535, 65535),
    ];
    let margins = [0.0, 5.0, 10.0, 24.0, 50.0];
    let orientations = [Orientation::Portrait, Orientation::Landscape];

    for size in PageSize::CATALOG {
        for orientation in orientations {
            let page = size.effective(orientation);
            for &margin in &margins {
                for &(w, h) in &dimensions {
                    let p = resolve_placement(w, h, page, margin);

                    let expected = f64::from(w) / f64::from(h);
                    let actual = f64::from(p.width) / f64::from(p.height);
                    assert!(
                        ((actual - expected) / expected).abs() < 1e-6,
                        "{}x{} on {:?} {:?} margin {}: ratio {} vs {}",
                        w,
                        h,
                        size,
                        orientation,
                        margin,
                        actual,
                        expected
                    );
                    assert_within_margins(&p, page, margin);
                }
            }
        }
    }
}

#[test]
fn test_resolver_is_deterministic() {
    let page = PageSize::Letter.effective(Orientation::Landscape);
    let first = resolve_placement(1234, 987, page, 12.5);
    let second = resolve_placement(1234, 987, page, 12.5);

    assert_eq!(first.x.to_bits(), second.x.to_bits());
    assert_eq!(first.y.to_bits(), second.y.to_bits());
    assert_eq!(first.width.to_bits(), second.width.to_bits());
    assert_eq!(first.height.to_bits(), second.height.to_bits());
    assert_eq!(first.scale.to_bits(), second.scale.to_bits());
}

#[test]
fn test_degenerate_margins_never_go_negative() {
    let page = a4_portrait();
    // Half of the shorter side, and beyond
    for margin in [105.0, 148.5, 200.0, f32::INFINITY, f32::NAN] {
        let p = resolve_placement(800, 600, page, margin);
        assert!(p.width > 0.0 && p.height > 0.0, "margin {}", margin);
        assert!(p.x >= 0.0 && p.y >= 0.0);
        assert!(p.right() <= page.width_mm + 1e-3);
        assert!(p.top() <= page.height_mm + 1e-3);
    }
}

#[test]
fn test_missing_dimension_uses_full_usable_area() {
    for (w, h) in [(0, 600), (800, 0), (0, 0)] {
        let p = resolve_placement(w, h, a4_portrait(), 10.0);
        assert!((p.x - 10.0).abs() < 1e-3);
        assert!((p.y - 10.0).abs() < 1e-3);
        assert!((p.width - 190.0).abs() < 1e-3);
        assert!((p.height - 277.0).abs() < 1e-3);
    }
}

#[test]
fn test_landscape_swaps_dimensions() {
    let page = PageSize::A4.effective(Orientation::Landscape);
    assert_eq!(page.width_mm, 297.0);
    assert_eq!(page.height_mm, 210.0);

    let custom = PageSize::Custom {
        width_mm: 100.0,
        height_mm: 50.0,
    };
    assert_eq!(custom.effective(Orientation::Portrait).width_mm, 100.0);
    assert_eq!(custom.effective(Orientation::Landscape).width_mm, 50.0);
}

#[test]
fn test_page_size_lookup() {
    assert_eq!(PageSize::from_name("letter"), Some(PageSize::Letter));
    assert_eq!(PageSize::from_name("SQUARE"), Some(PageSize::Square));
    assert_eq!(PageSize::from_name("Custom"), None);
}
