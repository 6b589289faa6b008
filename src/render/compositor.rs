use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use image::RgbaImage;
use image::imageops::FilterType;
use rayon::prelude::*;

use crate::assets::decode::load_image_file;
use crate::assets::resolve::{AssetLookup, AssetResolver};
use crate::config::RenderConfig;
use crate::fonts::FontManager;
use crate::foundation::error::{CardError, CardResult};
use crate::model::record::DataRecord;
use crate::model::template::{Layer, LayerSlot, SideKind, Template};
use crate::render::LayerContext;
use crate::render::surface::Surface;
use crate::render::{image_layer, qr_layer, shape_layer, text_layer};

/// Why a layer left the canvas untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The bound text, QR payload or image source resolved to nothing.
    EmptyContent,
    /// The referenced asset does not exist or cannot map to a local file.
    AssetMissing(String),
    /// The layer's type tag is outside the supported set.
    UnsupportedType(String),
    /// The layer box has no area.
    EmptyBox,
    /// The layer opacity is zero.
    Transparent,
}

/// Result of drawing one layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayerOutcome {
    /// The layer was drawn.
    Painted,
    /// Nothing was drawn, for a benign reason.
    Skipped(SkipReason),
    /// The renderer failed; the message describes the failure.
    Failed(String),
}

impl LayerOutcome {
    /// Whether the layer was drawn.
    pub fn is_painted(&self) -> bool {
        matches!(self, Self::Painted)
    }
}

/// Per-layer entry of a [`RenderedSide`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerReport {
    /// Layer id.
    pub layer_id: String,
    /// Type tag.
    pub kind: String,
    /// What happened.
    pub outcome: LayerOutcome,
}

/// What happened to the side's background image.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum BackgroundOutcome {
    /// The side has no background image.
    #[default]
    None,
    /// The background was scaled to the canvas and drawn.
    Painted,
    /// The reference did not resolve to a file.
    Missing(String),
    /// The file exists but could not be decoded.
    Failed(String),
}

/// A rendered side plus its per-layer report.
#[derive(Clone, Debug)]
pub struct RenderedSide {
    /// Which side this is.
    pub side: SideKind,
    /// Straight-alpha raster of exactly the canvas size.
    pub image: RgbaImage,
    /// Background image outcome.
    pub background: BackgroundOutcome,
    /// One report per visible layer, in paint order.
    pub layers: Vec<LayerReport>,
}

impl RenderedSide {
    /// Report for the layer with `id`, if it was visible.
    pub fn report(&self, id: &str) -> Option<&LayerReport> {
        self.layers.iter().find(|r| r.layer_id == id)
    }

    /// Number of layers that were drawn.
    pub fn painted_count(&self) -> usize {
        self.layers.iter().filter(|r| r.outcome.is_painted()).count()
    }
}

/// Both sides of a card.
#[derive(Clone, Debug)]
pub struct CardImages {
    /// Front side.
    pub front: RenderedSide,
    /// Back side.
    pub back: RenderedSide,
}

/// Renders template sides.
///
/// A compositor owns the asset resolver and shares a [`FontManager`]; everything else is
/// allocated per call, so one compositor can serve concurrent renders from many threads.
#[derive(Clone, Debug)]
pub struct Compositor {
    fonts: Arc<FontManager>,
    assets: AssetResolver,
}

impl Compositor {
    /// Compositor with a fresh font manager built from `config`.
    pub fn new(config: &RenderConfig) -> Self {
        Self::with_font_manager(config, Arc::new(FontManager::new(config)))
    }

    /// Compositor sharing an existing font manager.
    pub fn with_font_manager(config: &RenderConfig, fonts: Arc<FontManager>) -> Self {
        Self {
            fonts,
            assets: AssetResolver::new(config),
        }
    }

    /// Shared font manager.
    pub fn fonts(&self) -> &Arc<FontManager> {
        &self.fonts
    }

    /// Asset resolver.
    pub fn assets(&self) -> &AssetResolver {
        &self.assets
    }

    /// Render one side.
    ///
    /// Only structural template problems are returned as errors. Missing assets, unsupported
    /// layer types and failing layers are reported in the returned [`RenderedSide`].
    #[tracing::instrument(skip_all, fields(template = %template.id, side = %side))]
    pub fn render(
        &self,
        template: &Template,
        record: &DataRecord,
        photo: Option<&RgbaImage>,
        side: SideKind,
    ) -> CardResult<RenderedSide> {
        template.validate()?;
        let canvas_def = template.canvas;
        let mut canvas = Surface::filled(
            canvas_def.width,
            canvas_def.height,
            canvas_def.background_color,
        )
        .map_err(|e| CardError::configuration(e.to_string()))?;

        let face = template.side(side);
        let background = self.paint_background(face.background_image.as_deref(), &mut canvas);

        let mut cx = LayerContext::new(&self.fonts, &self.assets, record, photo);
        let layers = face
            .paint_order()
            .into_iter()
            .map(|slot| {
                let outcome = paint_slot(slot, &mut cx, &mut canvas);
                log_outcome(slot, &outcome);
                LayerReport {
                    layer_id: slot.id().to_string(),
                    kind: slot.type_tag().to_string(),
                    outcome,
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            layers = layers.len(),
            painted = layers.iter().filter(|r| r.outcome.is_painted()).count(),
            "side rendered"
        );
        Ok(RenderedSide {
            side,
            image: canvas.to_rgba_image(),
            background,
            layers,
        })
    }

    /// Render front and back in parallel.
    pub fn render_both(
        &self,
        template: &Template,
        record: &DataRecord,
        photo: Option<&RgbaImage>,
    ) -> CardResult<CardImages> {
        let (front, back) = rayon::join(
            || self.render(template, record, photo, SideKind::Front),
            || self.render(template, record, photo, SideKind::Back),
        );
        Ok(CardImages {
            front: front?,
            back: back?,
        })
    }

    /// Render both sides of a card, failing loudly when there is no template to render.
    pub fn render_card(
        &self,
        template: Option<&Template>,
        record: &DataRecord,
        photo: Option<&RgbaImage>,
    ) -> CardResult<CardImages> {
        let template =
            template.ok_or_else(|| CardError::configuration("no renderable template"))?;
        self.render_both(template, record, photo)
    }

    /// Render one side for many records in parallel. Output order follows `inputs`.
    #[tracing::instrument(skip_all, fields(template = %template.id, side = %side, count = inputs.len()))]
    pub fn render_batch(
        &self,
        template: &Template,
        inputs: &[(DataRecord, Option<RgbaImage>)],
        side: SideKind,
    ) -> CardResult<Vec<RenderedSide>> {
        template.validate()?;
        inputs
            .par_iter()
            .map(|(record, photo)| self.render(template, record, photo.as_ref(), side))
            .collect()
    }

    fn paint_background(
        &self,
        reference: Option<&str>,
        canvas: &mut Surface,
    ) -> BackgroundOutcome {
        let Some(reference) = reference.filter(|r| !r.trim().is_empty()) else {
            return BackgroundOutcome::None;
        };

        let path = match self.assets.resolve(reference) {
            AssetLookup::Found(path) => path,
            AssetLookup::Missing(path) => {
                tracing::warn!(
                    reference,
                    path = %path.display(),
                    "background image not found; keeping flat fill"
                );
                return BackgroundOutcome::Missing(path.display().to_string());
            }
            AssetLookup::Unsupported(msg) => {
                tracing::warn!(reference, %msg, "background reference not resolvable");
                return BackgroundOutcome::Missing(msg);
            }
        };

        let (w, h) = (canvas.width(), canvas.height());
        let painted = load_image_file(&path, Some((w, h))).and_then(|img| {
            let img = if img.dimensions() == (w, h) {
                img
            } else {
                image::imageops::resize(&img, w, h, FilterType::Lanczos3)
            };
            let layer = Surface::from_rgba_image(&img)?;
            canvas.draw_over(&layer, 0, 0, 1.0);
            Ok(())
        });

        match painted {
            Ok(()) => BackgroundOutcome::Painted,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "background image failed");
                BackgroundOutcome::Failed(e.to_string())
            }
        }
    }
}

fn paint_slot(slot: &LayerSlot, cx: &mut LayerContext<'_>, canvas: &mut Surface) -> LayerOutcome {
    let layer = match slot {
        LayerSlot::Known(layer) => layer,
        LayerSlot::Unsupported { type_tag, .. } => {
            return LayerOutcome::Skipped(SkipReason::UnsupportedType(type_tag.clone()));
        }
        LayerSlot::Invalid { error, .. } => return LayerOutcome::Failed(error.clone()),
    };
    if let Err(msg) = layer.check() {
        return LayerOutcome::Failed(msg);
    }

    let opacity = layer.common().opacity;
    if opacity.is_nan() || opacity <= 0.0 {
        return LayerOutcome::Skipped(SkipReason::Transparent);
    }

    let result = catch_unwind(AssertUnwindSafe(|| paint_layer(layer, cx, canvas)));
    match result {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(CardError::AssetMissing(msg))) => {
            LayerOutcome::Skipped(SkipReason::AssetMissing(msg))
        }
        Ok(Err(e)) => LayerOutcome::Failed(e.to_string()),
        Err(payload) => LayerOutcome::Failed(panic_message(payload.as_ref())),
    }
}

/// Draw `layer`, isolating it on its own surface when it is partially transparent.
fn paint_layer(
    layer: &Layer,
    cx: &mut LayerContext<'_>,
    canvas: &mut Surface,
) -> CardResult<LayerOutcome> {
    let opacity = layer.common().opacity;
    if opacity >= 1.0 {
        return dispatch(layer, cx, canvas);
    }

    let mut isolated = Surface::new(canvas.width(), canvas.height())?;
    let outcome = dispatch(layer, cx, &mut isolated)?;
    if outcome.is_painted() {
        canvas.draw_over(&isolated, 0, 0, opacity);
    }
    Ok(outcome)
}

fn dispatch(
    layer: &Layer,
    cx: &mut LayerContext<'_>,
    target: &mut Surface,
) -> CardResult<LayerOutcome> {
    match layer {
        Layer::Text(l) => text_layer::render_text(l, cx, target),
        Layer::Image(l) => image_layer::render_image(l, cx, target),
        Layer::Shape(l) => shape_layer::render_shape(l, target),
        Layer::QrCode(l) => qr_layer::render_qr(l, cx, target),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("renderer panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("renderer panicked: {s}")
    } else {
        "renderer panicked".to_string()
    }
}

fn log_outcome(slot: &LayerSlot, outcome: &LayerOutcome) {
    let (layer_id, kind) = (slot.id(), slot.type_tag());
    match outcome {
        LayerOutcome::Painted => tracing::trace!(layer_id, kind, "layer painted"),
        LayerOutcome::Skipped(SkipReason::UnsupportedType(tag)) => {
            tracing::warn!(layer_id, kind, tag = %tag, "unsupported layer type skipped");
        }
        LayerOutcome::Skipped(SkipReason::AssetMissing(msg)) => {
            tracing::warn!(layer_id, kind, %msg, "layer asset missing");
        }
        LayerOutcome::Skipped(reason) => tracing::debug!(layer_id, kind, ?reason, "layer skipped"),
        LayerOutcome::Failed(msg) => tracing::warn!(layer_id, kind, error = %msg, "layer failed"),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
