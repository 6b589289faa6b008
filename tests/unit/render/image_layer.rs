use super::*;
use crate::assets::resolve::AssetResolver;
use crate::config::RenderConfig;
use crate::fonts::FontManager;
use crate::foundation::color::Color;
use crate::foundation::error::CardError;
use crate::model::record::DataRecord;
use crate::model::template::LayerCommon;

const WHITE: [u8; 4] = [255, 255, 255, 255];

fn solid(w: u32, h: u32, px: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(w, h, image::Rgba(px))
}

struct Fixture {
    dir: tempfile::TempDir,
    fonts: FontManager,
    assets: AssetResolver,
    record: DataRecord,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let assets = AssetResolver::new(&RenderConfig::rooted(dir.path()));
        Self {
            dir,
            fonts: FontManager::builtin_only(),
            assets,
            record: DataRecord::new(),
        }
    }

    fn write_png(&self, name: &str, img: &RgbaImage) {
        img.save(self.dir.path().join(name)).unwrap();
    }

    fn render(&self, layer: &ImageLayer, photo: Option<&RgbaImage>) -> (CardResult<LayerOutcome>, Surface) {
        let mut canvas = Surface::filled(100, 100, Color::WHITE).unwrap();
        let mut cx = LayerContext::new(&self.fonts, &self.assets, &self.record, photo);
        let outcome = render_image(layer, &mut cx, &mut canvas);
        (outcome, canvas)
    }
}

fn layer(src: Option<&str>, x: f64, y: f64, w: f64, h: f64) -> ImageLayer {
    ImageLayer::new(LayerCommon::new("img", x, y, w, h), None, src)
}

#[test]
fn portrait_binds_to_photo_field() {
    let fx = Fixture::new();
    let photo = solid(30, 40, [0, 128, 0, 255]);
    let l = ImageLayer::new(LayerCommon::new("p", 10.0, 10.0, 30.0, 40.0), Some("photo"), None);
    let (outcome, canvas) = fx.render(&l, Some(&photo));
    assert_eq!(outcome.unwrap(), LayerOutcome::Painted);
    assert_eq!(canvas.pixel(10, 10), Some([0, 128, 0, 255]));
    assert_eq!(canvas.pixel(39, 49), Some([0, 128, 0, 255]));
    assert_eq!(canvas.pixel(40, 10), Some(WHITE));
}

#[test]
fn static_src_is_loaded_from_the_template_root() {
    let fx = Fixture::new();
    fx.write_png("logo.png", &solid(20, 20, [0, 0, 200, 255]));
    let (outcome, canvas) = fx.render(&layer(Some("logo.png"), 0.0, 0.0, 20.0, 20.0), None);
    assert_eq!(outcome.unwrap(), LayerOutcome::Painted);
    assert_eq!(canvas.pixel(5, 5), Some([0, 0, 200, 255]));
}

#[test]
fn missing_file_is_a_skip() {
    let fx = Fixture::new();
    let (outcome, canvas) = fx.render(&layer(Some("nope.png"), 0.0, 0.0, 20.0, 20.0), None);
    assert!(matches!(
        outcome.unwrap(),
        LayerOutcome::Skipped(SkipReason::AssetMissing(_))
    ));
    assert!(canvas.to_rgba_image().pixels().all(|p| p.0 == WHITE));
}

#[test]
fn remote_reference_is_a_skip() {
    let fx = Fixture::new();
    let (outcome, _) = fx.render(&layer(Some("https://example.org/a.png"), 0.0, 0.0, 20.0, 20.0), None);
    assert!(matches!(
        outcome.unwrap(),
        LayerOutcome::Skipped(SkipReason::AssetMissing(_))
    ));
}

#[test]
fn corrupt_file_is_an_error() {
    let fx = Fixture::new();
    std::fs::write(fx.dir.path().join("broken.png"), b"not a png").unwrap();
    let (outcome, _) = fx.render(&layer(Some("broken.png"), 0.0, 0.0, 20.0, 20.0), None);
    assert!(matches!(outcome, Err(CardError::Decode(_))));
}

#[test]
fn no_source_is_empty_content() {
    let fx = Fixture::new();
    let (outcome, _) = fx.render(&layer(None, 0.0, 0.0, 20.0, 20.0), None);
    assert_eq!(outcome.unwrap(), LayerOutcome::Skipped(SkipReason::EmptyContent));
}

#[test]
fn cover_fills_the_box_without_transparency() {
    let img = solid(200, 100, [10, 20, 30, 255]);
    let fitted = fit_image(&img, ObjectFit::Cover, 50, 50);
    assert_eq!(fitted.dimensions(), (50, 50));
    assert!(fitted.pixels().all(|p| p.0[3] == 255));
}

#[test]
fn cover_crops_the_centre() {
    // left third red, middle third green, right third blue
    let img = RgbaImage::from_fn(300, 100, |x, _| match x / 100 {
        0 => image::Rgba([255, 0, 0, 255]),
        1 => image::Rgba([0, 255, 0, 255]),
        _ => image::Rgba([0, 0, 255, 255]),
    });
    let fitted = fit_image(&img, ObjectFit::Cover, 40, 40);
    assert_eq!(fitted.get_pixel(20, 20).0, [0, 255, 0, 255]);
    assert_eq!(fitted.get_pixel(1, 20).0, [0, 255, 0, 255]);
}

#[test]
fn contain_letterboxes_with_transparency() {
    let img = solid(200, 100, [10, 20, 30, 255]);
    let fitted = fit_image(&img, ObjectFit::Contain, 50, 50);
    assert_eq!(fitted.dimensions(), (50, 50));
    assert_eq!(fitted.get_pixel(25, 2).0[3], 0);
    assert_eq!(fitted.get_pixel(25, 25).0, [10, 20, 30, 255]);
    assert_eq!(fitted.get_pixel(25, 47).0[3], 0);
}

#[test]
fn contain_scales_up_small_images() {
    let img = solid(10, 5, [10, 20, 30, 255]);
    let fitted = fit_image(&img, ObjectFit::Contain, 40, 40);
    assert_eq!(fitted.get_pixel(0, 20).0, [10, 20, 30, 255]);
    assert_eq!(fitted.get_pixel(39, 20).0, [10, 20, 30, 255]);
}

#[test]
fn fill_ignores_aspect_and_none_keeps_native_size() {
    let img = solid(200, 100, [1, 2, 3, 255]);
    assert_eq!(fit_image(&img, ObjectFit::Fill, 30, 60).dimensions(), (30, 60));
    assert_eq!(fit_image(&img, ObjectFit::None, 30, 60).dimensions(), (200, 100));
}

#[test]
fn none_is_anchored_top_left_and_clipped_to_canvas() {
    let fx = Fixture::new();
    let photo = solid(300, 300, [0, 0, 0, 255]);
    let mut l = ImageLayer::new(LayerCommon::new("p", 50.0, 50.0, 10.0, 10.0), Some("photo"), None);
    l.object_fit = ObjectFit::None;
    let (outcome, canvas) = fx.render(&l, Some(&photo));
    assert_eq!(outcome.unwrap(), LayerOutcome::Painted);
    assert_eq!(canvas.pixel(49, 49), Some(WHITE));
    assert_eq!(canvas.pixel(99, 99), Some([0, 0, 0, 255]));
}

#[test]
fn border_radius_rounds_the_corners() {
    let fx = Fixture::new();
    let photo = solid(40, 40, [0, 0, 0, 255]);
    let mut l = ImageLayer::new(LayerCommon::new("p", 0.0, 0.0, 40.0, 40.0), Some("photo"), None);
    l.border_radius = 20.0;
    let (_, canvas) = fx.render(&l, Some(&photo));
    assert_eq!(canvas.pixel(0, 0), Some(WHITE));
    assert_eq!(canvas.pixel(20, 20), Some([0, 0, 0, 255]));
}

#[test]
fn solid_border_is_stroked_inside_the_box() {
    let fx = Fixture::new();
    let photo = solid(40, 40, [0, 0, 0, 255]);
    let mut l = ImageLayer::new(LayerCommon::new("p", 10.0, 10.0, 40.0, 40.0), Some("photo"), None);
    l.border = Some(ImageBorder {
        width: 2.0,
        color: Color::rgb(255, 0, 0),
        style: BorderStyle::Solid,
    });
    let (_, canvas) = fx.render(&l, Some(&photo));
    assert_eq!(canvas.pixel(10, 30), Some([255, 0, 0, 255]));
    assert_eq!(canvas.pixel(49, 30), Some([255, 0, 0, 255]));
    assert_eq!(canvas.pixel(30, 30), Some([0, 0, 0, 255]));
    assert_eq!(canvas.pixel(9, 30), Some(WHITE));
}

#[test]
fn dashed_border_leaves_gaps() {
    let fx = Fixture::new();
    let photo = solid(60, 60, [0, 0, 0, 0]);
    let mut l = ImageLayer::new(LayerCommon::new("p", 10.0, 10.0, 60.0, 60.0), Some("photo"), None);
    l.border = Some(ImageBorder {
        width: 2.0,
        color: Color::rgb(255, 0, 0),
        style: BorderStyle::Dashed,
    });
    let (_, canvas) = fx.render(&l, Some(&photo));
    let top_edge = (10..70).map(|x| canvas.pixel(x, 10).unwrap()).collect::<Vec<_>>();
    assert!(top_edge.iter().any(|p| *p == [255, 0, 0, 255]));
    assert!(top_edge.iter().any(|p| *p == WHITE));
}

#[test]
fn shadow_is_drawn_beneath_and_offset() {
    let fx = Fixture::new();
    let photo = solid(20, 20, [0, 0, 255, 255]);
    let mut l = ImageLayer::new(LayerCommon::new("p", 20.0, 20.0, 20.0, 20.0), Some("photo"), None);
    l.shadow = Some(ImageShadow {
        offset_x: 5.0,
        offset_y: 5.0,
        blur: 0.0,
        spread: 0.0,
        color: Color::rgb(0, 0, 0),
    });
    let (_, canvas) = fx.render(&l, Some(&photo));
    assert_eq!(canvas.pixel(30, 30), Some([0, 0, 255, 255]));
    assert_eq!(canvas.pixel(42, 42), Some([0, 0, 0, 255]));
    assert_eq!(canvas.pixel(46, 46), Some(WHITE));
}
