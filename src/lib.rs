//! cardsmith renders ID cards from layer-based templates.
//!
//! A [`Template`] describes a fixed-size canvas and two sides (front and back). Each side is an
//! ordered stack of typed layers (text, image, shape, QR code). Rendering binds a
//! [`DataRecord`] (one student, teacher or staff member) and an optional portrait bitmap into
//! those layers and produces one straight-alpha RGBA raster per side.
//!
//! # Pipeline overview
//!
//! 1. **Allocate**: a canvas filled with the template background color
//! 2. **Background**: the side's background image, resolved through [`AssetResolver`] and
//!    scaled to the canvas
//! 3. **Layers**: visible layers stable-sorted by `zIndex`, each bound through [`binding`] and
//!    painted by its renderer
//! 4. **Report**: every layer yields a [`LayerOutcome`]; only structural template errors fail
//!    a render
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Read-only inputs**: renderers never mutate the template or the record.
//! - **One shared cache**: the [`FontManager`] is the only state shared across render calls.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;

/// Data binding between layer field references and the data record.
pub mod binding;
/// Renderer configuration (asset roots, fonts).
pub mod config;
/// Font lookup with fallback and a process-wide cache.
pub mod fonts;
/// Template and data record model.
pub mod model;
/// Layer renderers and the compositor.
pub mod render;
/// Line splitting and glyph shaping.
pub mod text;

pub use crate::assets::decode::{decode_image, load_image_file};
pub use crate::assets::encode::encode_png;
pub use crate::assets::resolve::{AssetLookup, AssetResolver, normalize_rel_path};
pub use crate::config::RenderConfig;
pub use crate::fonts::{FontKey, FontManager, FontResolution, FontResource};
pub use crate::foundation::color::Color;
pub use crate::foundation::error::{CardError, CardResult};
pub use crate::model::record::DataRecord;
pub use crate::model::template::{
    BorderStyle, Canvas, EntityType, ErrorCorrection, FontWeight, ImageBorder, ImageLayer,
    ImageShadow, Layer, LayerCommon, LayerSlot, ObjectFit, QrCodeLayer, SchoolLevel, ShapeKind,
    ShapeLayer, Side, SideKind, Template, TextAlign, TextDecoration, TextLayer, TextShadow,
};
pub use crate::render::compositor::{
    BackgroundOutcome, CardImages, Compositor, LayerOutcome, LayerReport, RenderedSide,
    SkipReason,
};
pub use crate::render::surface::Surface;
