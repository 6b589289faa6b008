use super::*;
use crate::assets::resolve::AssetResolver;
use crate::config::RenderConfig;
use crate::fonts::FontManager;
use crate::foundation::color::Color;
use crate::model::record::DataRecord;
use crate::model::template::LayerCommon;

fn decode(s: &Surface) -> Option<String> {
    let mut img = rqrr::PreparedImage::prepare_from_greyscale(
        s.width() as usize,
        s.height() as usize,
        |x, y| {
            let [r, g, b, _] = s.pixel(x as u32, y as u32).unwrap_or([255; 4]);
            ((u16::from(r) + u16::from(g) + u16::from(b)) / 3) as u8
        },
    );
    let grids = img.detect_grids();
    grids.first()?.decode().ok().map(|(_, content)| content)
}

fn render(layer: &QrCodeLayer, record: &DataRecord) -> (LayerOutcome, Surface) {
    let fonts = FontManager::builtin_only();
    let assets = AssetResolver::new(&RenderConfig::default());
    let mut canvas = Surface::filled(300, 300, Color::WHITE).unwrap();
    let mut cx = LayerContext::new(&fonts, &assets, record, None);
    let outcome = render_qr(layer, &mut cx, &mut canvas).unwrap();
    (outcome, canvas)
}

fn qr(x: f64, y: f64, size: f64) -> QrCodeLayer {
    QrCodeLayer::new(LayerCommon::new("qr", x, y, size, size), "id_number")
}

#[test]
fn symbol_has_module_grid_and_quiet_zone() {
    let layer = qr(0.0, 0.0, 100.0);
    let symbol = qr_symbol("2024-001", &layer).unwrap();
    // version 1 is 21 modules wide
    assert_eq!(symbol.dimensions(), (230, 230));
    assert_eq!(symbol.get_pixel(5, 5).0, [255, 255, 255, 255]);
    // top-left finder pattern corner
    assert_eq!(symbol.get_pixel(12, 12).0, [0, 0, 0, 255]);
}

#[test]
fn rendered_code_decodes_to_the_bound_field() {
    let record = DataRecord::new().with("id_number", "2024-001");
    let (outcome, canvas) = render(&qr(20.0, 20.0, 230.0), &record);
    assert_eq!(outcome, LayerOutcome::Painted);
    assert_eq!(decode(&canvas).as_deref(), Some("2024-001"));
}

#[test]
fn resampled_code_still_decodes() {
    let record = DataRecord::new().with("id_number", "2024-001");
    let mut layer = qr(40.0, 40.0, 150.0);
    layer.error_correction_level = ErrorCorrection::H;
    let (_, canvas) = render(&layer, &record);
    assert_eq!(decode(&canvas).as_deref(), Some("2024-001"));
}

#[test]
fn background_fills_the_whole_box_opaquely() {
    let record = DataRecord::new().with("id_number", "X");
    let mut layer = qr(10.0, 10.0, 230.0);
    layer.background_color = Color::rgb(255, 255, 0);
    let (_, canvas) = render(&layer, &record);
    assert_eq!(canvas.pixel(11, 11), Some([255, 255, 0, 255]));
    assert_eq!(canvas.pixel(238, 238), Some([255, 255, 0, 255]));
    assert_eq!(canvas.pixel(9, 9), Some([255, 255, 255, 255]));
}

#[test]
fn missing_field_is_skipped() {
    let (outcome, canvas) = render(&qr(0.0, 0.0, 100.0), &DataRecord::new());
    assert_eq!(outcome, LayerOutcome::Skipped(SkipReason::EmptyContent));
    assert!(canvas.to_rgba_image().pixels().all(|p| p.0 == [255; 4]));
}

#[test]
fn error_correction_level_maps_onto_the_encoder() {
    let layer = qr(0.0, 0.0, 100.0);
    let low = {
        let mut l = layer.clone();
        l.error_correction_level = ErrorCorrection::L;
        qr_symbol("https://example.org/verify/2024-001", &l).unwrap()
    };
    let high = {
        let mut l = layer;
        l.error_correction_level = ErrorCorrection::H;
        qr_symbol("https://example.org/verify/2024-001", &l).unwrap()
    };
    assert!(high.width() > low.width());
}
