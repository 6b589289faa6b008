//! Field references are resolved against the record here and nowhere else, so renderers only
//! ever see final content.

use image::RgbaImage;

use crate::model::record::DataRecord;
use crate::model::template::{ImageLayer, PHOTO_FIELD, QrCodeLayer, STATIC_FIELD, TextLayer};

/// Where an image layer's pixels come from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ImageSource<'a> {
    /// The portrait supplied by the caller.
    Portrait(&'a RgbaImage),
    /// An asset reference to resolve and decode.
    Reference(&'a str),
    /// Nothing to draw.
    Empty,
}

/// Final display text of a text layer, case transform applied.
pub fn resolve_text(layer: &TextLayer, record: &DataRecord) -> String {
    let literal = layer.text.as_deref().unwrap_or_default();
    let raw = if layer.field == STATIC_FIELD {
        literal.to_string()
    } else {
        record
            .text(&layer.field)
            .unwrap_or_else(|| literal.to_string())
    };

    if layer.uppercase {
        raw.to_uppercase()
    } else if layer.lowercase {
        raw.to_lowercase()
    } else {
        raw
    }
}

/// Source of an image layer.
///
/// `"photo"` binds to the portrait; without one it falls back to `src`. Any other non-static
/// field names a record value holding an asset reference, again falling back to `src`.
pub fn resolve_image_source<'a>(
    layer: &'a ImageLayer,
    record: &'a DataRecord,
    photo: Option<&'a RgbaImage>,
) -> ImageSource<'a> {
    let static_src = || {
        layer
            .src
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map_or(ImageSource::Empty, ImageSource::Reference)
    };

    match layer.field.as_deref() {
        Some(PHOTO_FIELD) => photo.map_or_else(static_src, ImageSource::Portrait),
        Some(field) if field != STATIC_FIELD && !field.is_empty() => match record.get(field) {
            Some(serde_json::Value::String(path)) if !path.trim().is_empty() => {
                ImageSource::Reference(path.as_str())
            }
            _ => static_src(),
        },
        _ => static_src(),
    }
}

/// Text a QR layer encodes. Empty means the layer is skipped.
pub fn resolve_qr_content(layer: &QrCodeLayer, record: &DataRecord) -> String {
    record.text(&layer.field).unwrap_or_default()
}

#[cfg(test)]
#[path = "../tests/unit/binding.rs"]
mod tests;
