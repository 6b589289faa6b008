use image::RgbaImage;

use crate::assets::resolve::AssetResolver;
use crate::fonts::FontManager;
use crate::model::record::DataRecord;
use crate::model::template::LayerCommon;
use crate::text::TextShaper;

/// Separable Gaussian blur.
pub mod blur;
/// Premultiplied source-over blending.
pub mod composite;
/// Side and card rendering entry points.
pub mod compositor;
/// Working raster.
pub mod surface;

mod image_layer;
mod qr_layer;
mod shape_layer;
mod text_layer;

/// Per-call inputs shared by the layer renderers.
pub(crate) struct LayerContext<'a> {
    pub(crate) fonts: &'a FontManager,
    pub(crate) assets: &'a AssetResolver,
    pub(crate) shaper: TextShaper,
    pub(crate) record: &'a DataRecord,
    pub(crate) photo: Option<&'a RgbaImage>,
}

impl<'a> LayerContext<'a> {
    pub(crate) fn new(
        fonts: &'a FontManager,
        assets: &'a AssetResolver,
        record: &'a DataRecord,
        photo: Option<&'a RgbaImage>,
    ) -> Self {
        Self {
            fonts,
            assets,
            shaper: TextShaper::new(),
            record,
            photo,
        }
    }
}

/// Integer pixel box of a layer: floored origin, rounded size. `None` when the box has no area.
pub(crate) fn pixel_box(common: &LayerCommon) -> Option<(i64, i64, u32, u32)> {
    let w = common.width.round();
    let h = common.height.round();
    if !(w >= 1.0 && h >= 1.0) {
        return None;
    }
    Some((
        common.x.floor() as i64,
        common.y.floor() as i64,
        w.min(f64::from(u16::MAX)) as u32,
        h.min(f64::from(u16::MAX)) as u32,
    ))
}
