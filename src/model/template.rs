use serde::{Deserialize, Serialize};

use crate::foundation::color::Color;
use crate::foundation::error::{CardError, CardResult};

/// Field sentinel meaning "use the literal value, skip the record lookup".
pub const STATIC_FIELD: &str = "static";
/// Reserved image field bound to the externally supplied portrait.
pub const PHOTO_FIELD: &str = "photo";

#[derive(Clone, Debug, Serialize, Deserialize)]
/// A two-sided card template.
///
/// Templates are read-only for the duration of a render call; renderers only read them.
pub struct Template {
    /// Template identifier (numeric ids are kept as their decimal text).
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    /// Human-readable template name.
    #[serde(rename = "templateName", alias = "name", default)]
    pub name: String,
    /// Kind of entity this template is meant for.
    #[serde(rename = "templateType", alias = "entityType", default)]
    pub entity_type: EntityType,
    /// School level tag.
    #[serde(rename = "schoolLevel", default)]
    pub school_level: SchoolLevel,
    /// Whether this is the active template for its entity type.
    #[serde(rename = "isActive", alias = "active", default)]
    pub active: bool,
    /// Canvas shared by both sides.
    #[serde(default)]
    pub canvas: Canvas,
    /// Front side.
    #[serde(default)]
    pub front: Side,
    /// Back side.
    #[serde(default)]
    pub back: Side,
}

impl Template {
    /// Parse and validate a template JSON document.
    ///
    /// Shape errors (a side that is not an object, an out-of-range canvas) are reported as
    /// [`CardError::Configuration`]. A known layer with mistyped properties does not fail the
    /// template; it is kept as [`LayerSlot::Invalid`].
    pub fn from_json_str(json: &str) -> CardResult<Self> {
        let template: Template = serde_json::from_str(json)
            .map_err(|e| CardError::configuration(format!("invalid template: {e}")))?;
        template.validate()?;
        Ok(template)
    }

    /// Parse and validate a template from an already-decoded JSON value.
    pub fn from_json_value(value: serde_json::Value) -> CardResult<Self> {
        let template: Template = serde_json::from_value(value)
            .map_err(|e| CardError::configuration(format!("invalid template: {e}")))?;
        template.validate()?;
        Ok(template)
    }

    /// Structural checks that make a template unrenderable. Per-layer problems are left to
    /// the layer (see [`Layer::check`]).
    pub fn validate(&self) -> CardResult<()> {
        let Canvas { width, height, .. } = self.canvas;
        if width == 0 || height == 0 || width > u32::from(u16::MAX) || height > u32::from(u16::MAX)
        {
            return Err(CardError::configuration(format!(
                "canvas size {width}x{height} must be within 1..={}",
                u16::MAX
            )));
        }
        Ok(())
    }

    /// Side selected by `kind`.
    pub fn side(&self, kind: SideKind) -> &Side {
        match kind {
            SideKind::Front => &self.front,
            SideKind::Back => &self.back,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Entity a template is designed for.
pub enum EntityType {
    /// Student card.
    #[default]
    Student,
    /// Teacher card.
    Teacher,
    /// Non-teaching staff card.
    Staff,
    /// Visitor pass.
    Visitor,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// School level tag.
pub enum SchoolLevel {
    /// Elementary school.
    Elementary,
    /// Junior high school.
    JuniorHigh,
    /// Senior high school.
    SeniorHigh,
    /// College.
    College,
    /// Any level.
    #[default]
    All,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Fixed-size pixel surface a side is rendered into.
pub struct Canvas {
    /// Width in pixels.
    #[serde(default = "default_canvas_width")]
    pub width: u32,
    /// Height in pixels.
    #[serde(default = "default_canvas_height")]
    pub height: u32,
    /// Flat fill painted before anything else.
    #[serde(default = "default_canvas_color")]
    pub background_color: Color,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: default_canvas_width(),
            height: default_canvas_height(),
            background_color: default_canvas_color(),
        }
    }
}

fn default_canvas_width() -> u32 {
    591
}

fn default_canvas_height() -> u32 {
    1004
}

fn default_canvas_color() -> Color {
    Color::WHITE
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// One of the two printable faces of a card.
pub enum SideKind {
    /// Front face.
    Front,
    /// Back face.
    Back,
}

impl std::fmt::Display for SideKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Front => "front",
            Self::Back => "back",
        })
    }
}

impl std::str::FromStr for SideKind {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "front" => Ok(Self::Front),
            "back" => Ok(Self::Back),
            other => Err(CardError::configuration(format!("unknown side \"{other}\""))),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Background plus layer stack of one side.
pub struct Side {
    /// Optional background image reference (see [`crate::AssetResolver`]).
    #[serde(default)]
    pub background_image: Option<String>,
    /// Layers in storage order. Paint order comes from `zIndex`.
    #[serde(default)]
    pub layers: Vec<LayerSlot>,
}

impl Side {
    /// Visible layers, stable-sorted by ascending `zIndex`.
    pub fn paint_order(&self) -> Vec<&LayerSlot> {
        let mut out = self
            .layers
            .iter()
            .filter(|slot| slot.visible())
            .collect::<Vec<_>>();
        out.sort_by_key(|slot| slot.z_index());
        out
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
/// A stored layer: either a supported [`Layer`] or a record of an unrecognized type tag.
pub enum LayerSlot {
    /// A layer of a supported type.
    Known(Layer),
    /// A layer whose `type` is not part of the supported set; skipped at render time.
    Unsupported {
        /// Layer id as stored.
        id: String,
        /// The unrecognized type tag.
        #[serde(rename = "type")]
        type_tag: String,
        /// Paint order.
        #[serde(rename = "zIndex")]
        z_index: i32,
        /// Visibility flag.
        visible: bool,
    },
    /// A layer of a supported type whose properties failed to parse; reported as failed.
    Invalid {
        /// Layer id as stored.
        id: String,
        /// The layer's type tag.
        #[serde(rename = "type")]
        type_tag: String,
        /// Paint order.
        #[serde(rename = "zIndex")]
        z_index: i32,
        /// Visibility flag.
        visible: bool,
        /// Why the layer could not be read.
        #[serde(skip)]
        error: String,
    },
}

impl LayerSlot {
    /// Layer id.
    pub fn id(&self) -> &str {
        match self {
            Self::Known(l) => &l.common().id,
            Self::Unsupported { id, .. } | Self::Invalid { id, .. } => id,
        }
    }

    /// Paint order key.
    pub fn z_index(&self) -> i32 {
        match self {
            Self::Known(l) => l.common().z_index,
            Self::Unsupported { z_index, .. } | Self::Invalid { z_index, .. } => *z_index,
        }
    }

    /// Visibility flag.
    pub fn visible(&self) -> bool {
        match self {
            Self::Known(l) => l.common().visible,
            Self::Unsupported { visible, .. } | Self::Invalid { visible, .. } => *visible,
        }
    }

    /// Type tag as written in the template.
    pub fn type_tag(&self) -> &str {
        match self {
            Self::Known(l) => l.kind_name(),
            Self::Unsupported { type_tag, .. } | Self::Invalid { type_tag, .. } => type_tag,
        }
    }
}

impl From<Layer> for LayerSlot {
    fn from(layer: Layer) -> Self {
        Self::Known(layer)
    }
}

impl<'de> Deserialize<'de> for LayerSlot {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error as _;

        let mut value = serde_json::Value::deserialize(deserializer)?;
        let Some(fields) = value.as_object_mut() else {
            return Err(D::Error::custom("layer must be a JSON object"));
        };

        let tag = fields
            .get("type")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string();
        let id = match fields.get("id") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        let z_index = fields
            .get("zIndex")
            .and_then(serde_json::Value::as_i64)
            .map(|z| z.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
            .unwrap_or_else(default_z_index);
        let visible = fields
            .get("visible")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(true);

        let Some((width, height)) = Layer::default_size(&tag) else {
            return Ok(Self::Unsupported {
                id,
                type_tag: tag,
                z_index,
                visible,
            });
        };

        fields.entry("width").or_insert_with(|| width.into());
        fields.entry("height").or_insert_with(|| height.into());
        match Layer::deserialize(value)
            .map_err(|e| e.to_string())
            .and_then(|layer| layer.check().map(|()| layer))
        {
            Ok(layer) => Ok(Self::Known(layer)),
            Err(error) => Ok(Self::Invalid {
                id,
                type_tag: tag,
                z_index,
                visible,
                error,
            }),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
/// A positioned, typed visual element. Closed set of layer kinds.
pub enum Layer {
    /// Text bound to a record field or a literal.
    Text(TextLayer),
    /// Bitmap from the portrait, the record, or a static source.
    Image(ImageLayer),
    /// Rectangle, circle or line.
    Shape(ShapeLayer),
    /// QR code encoding a record field.
    #[serde(rename = "qr_code", alias = "qrcode")]
    QrCode(QrCodeLayer),
}

impl Layer {
    /// Type tags accepted for [`Layer`].
    pub const KNOWN_TAGS: [&'static str; 5] = ["text", "image", "shape", "qr_code", "qrcode"];

    /// Whether `tag` names a supported layer type.
    pub fn is_known_tag(tag: &str) -> bool {
        Self::KNOWN_TAGS.contains(&tag)
    }

    /// Box size used when a layer of type `tag` leaves `width` or `height` out.
    /// `None` for unsupported tags.
    pub fn default_size(tag: &str) -> Option<(f64, f64)> {
        match tag {
            "text" => Some((200.0, 50.0)),
            "image" => Some((200.0, 200.0)),
            "shape" | "qr_code" | "qrcode" => Some((100.0, 100.0)),
            _ => None,
        }
    }

    /// Properties shared by every layer kind.
    pub fn common(&self) -> &LayerCommon {
        match self {
            Self::Text(l) => &l.common,
            Self::Image(l) => &l.common,
            Self::Shape(l) => &l.common,
            Self::QrCode(l) => &l.common,
        }
    }

    /// Property checks that make this layer undrawable: non-finite geometry, a font size that
    /// is not positive.
    pub fn check(&self) -> Result<(), String> {
        let c = self.common();
        if ![c.x, c.y, c.width, c.height, c.rotation]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(format!("layer '{}' has a non-finite geometry", c.id));
        }
        if let Self::Text(t) = self
            && !(t.font_size.is_finite() && t.font_size > 0.0)
        {
            return Err(format!("text layer '{}' fontSize must be > 0", c.id));
        }
        Ok(())
    }

    /// Canonical type tag.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Image(_) => "image",
            Self::Shape(_) => "shape",
            Self::QrCode(_) => "qr_code",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Geometry and flags shared by all layer kinds. Coordinates are canvas pixels.
pub struct LayerCommon {
    /// Layer id.
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    /// Left edge.
    #[serde(default)]
    pub x: f64,
    /// Top edge.
    #[serde(default)]
    pub y: f64,
    /// Box width.
    pub width: f64,
    /// Box height.
    pub height: f64,
    /// Paint order, ascending.
    #[serde(default = "default_z_index")]
    pub z_index: i32,
    /// Hidden layers never touch a pixel.
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Editor-only lock; no render effect.
    #[serde(default)]
    pub locked: bool,
    /// Rotation in degrees, clockwise positive.
    #[serde(default)]
    pub rotation: f64,
    /// Opacity applied when compositing the layer.
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
}

impl LayerCommon {
    /// Common properties for a box at `(x, y, width, height)`.
    pub fn new(id: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            width,
            height,
            z_index: default_z_index(),
            visible: true,
            locked: false,
            rotation: 0.0,
            opacity: default_opacity(),
            name: None,
        }
    }

    /// Builder-style `zIndex` override.
    pub fn with_z(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }
}

fn default_z_index() -> i32 {
    1
}

fn default_true() -> bool {
    true
}

fn default_opacity() -> f32 {
    1.0
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Horizontal alignment inside the layer box.
pub enum TextAlign {
    /// Flush left.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Flush right.
    Right,
    /// Laid out as `Left`.
    Justify,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Line decoration.
pub enum TextDecoration {
    /// Plain text.
    #[default]
    #[serde(rename = "none")]
    None,
    /// Bar under each line.
    #[serde(rename = "underline")]
    Underline,
    /// Bar through each line.
    #[serde(rename = "line-through")]
    LineThrough,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// CSS-style numeric font weight (`normal` = 400, `bold` = 700).
pub struct FontWeight(pub u16);

impl FontWeight {
    /// Regular weight.
    pub const NORMAL: Self = Self(400);
    /// Bold weight.
    pub const BOLD: Self = Self(700);

    /// Weights of 600 and above select bold faces.
    pub fn is_bold(self) -> bool {
        self.0 >= 600
    }

    /// Parse `normal`, `bold` or a numeric weight.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" | "regular" => Ok(Self::NORMAL),
            "bold" => Ok(Self::BOLD),
            n => n
                .parse::<u16>()
                .ok()
                .filter(|w| (1..=1000).contains(w))
                .map(Self)
                .ok_or_else(|| format!("invalid font weight \"{s}\"")),
        }
    }
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl Serialize for FontWeight {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u16(self.0)
    }
}

impl<'de> Deserialize<'de> for FontWeight {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Num(u16),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Num(n) => Ok(Self(n)),
            Repr::Text(s) => Self::parse(&s).map_err(serde::de::Error::custom),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Text shadow drawn beneath the glyphs.
pub struct TextShadow {
    /// Horizontal offset in pixels.
    #[serde(default)]
    pub offset_x: f32,
    /// Vertical offset in pixels.
    #[serde(default = "default_text_shadow_offset_y")]
    pub offset_y: f32,
    /// Blur radius in pixels; 0 draws a flat copy.
    #[serde(default = "default_text_shadow_blur")]
    pub blur: f32,
    /// Shadow color.
    #[serde(default = "default_shadow_color")]
    pub color: Color,
}

fn default_text_shadow_offset_y() -> f32 {
    1.0
}

fn default_text_shadow_blur() -> f32 {
    0.0
}

fn default_shadow_color() -> Color {
    Color::rgba(0, 0, 0, 64)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Text layer.
pub struct TextLayer {
    /// Shared geometry and flags.
    #[serde(flatten)]
    pub common: LayerCommon,
    /// Record field, or `"static"`.
    #[serde(default = "default_static_field")]
    pub field: String,
    /// Literal text for static layers, fallback for missing fields.
    #[serde(default)]
    pub text: Option<String>,
    /// Font family name.
    #[serde(default = "default_font_family")]
    pub font_family: String,
    /// Font size in pixels.
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    /// Font weight.
    #[serde(default)]
    pub font_weight: FontWeight,
    /// Glyph color.
    #[serde(default)]
    pub color: Color,
    /// Horizontal alignment.
    #[serde(default)]
    pub text_align: TextAlign,
    /// Line spacing multiplier.
    #[serde(default = "default_line_height")]
    pub line_height: f32,
    /// Extra advance between characters, in pixels.
    #[serde(default)]
    pub letter_spacing: f32,
    /// Wrap long text using the character-count heuristic.
    #[serde(default)]
    pub word_wrap: bool,
    /// Wrap width override.
    #[serde(default)]
    pub max_width: Option<f32>,
    /// Upper-case the resolved text.
    #[serde(default)]
    pub uppercase: bool,
    /// Lower-case the resolved text (ignored when `uppercase` is set).
    #[serde(default)]
    pub lowercase: bool,
    /// Underline or strike-through.
    #[serde(default)]
    pub text_decoration: TextDecoration,
    /// Optional shadow.
    #[serde(default)]
    pub text_shadow: Option<TextShadow>,
}

impl TextLayer {
    /// Static text layer with default styling.
    pub fn new(common: LayerCommon, field: impl Into<String>, text: Option<&str>) -> Self {
        Self {
            common,
            field: field.into(),
            text: text.map(str::to_string),
            font_family: default_font_family(),
            font_size: default_font_size(),
            font_weight: FontWeight::NORMAL,
            color: Color::BLACK,
            text_align: TextAlign::Left,
            line_height: default_line_height(),
            letter_spacing: 0.0,
            word_wrap: false,
            max_width: None,
            uppercase: false,
            lowercase: false,
            text_decoration: TextDecoration::None,
            text_shadow: None,
        }
    }
}

fn default_static_field() -> String {
    STATIC_FIELD.to_string()
}

fn default_font_family() -> String {
    "Arial".to_string()
}

fn default_font_size() -> f32 {
    16.0
}

fn default_line_height() -> f32 {
    1.2
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Strategy mapping a source bitmap into the layer box.
pub enum ObjectFit {
    /// Cover the box, center-crop overflow.
    #[default]
    Cover,
    /// Fit inside the box, center on transparent padding.
    Contain,
    /// Stretch to the exact box.
    Fill,
    /// Native size at the box's top-left.
    None,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Border line style.
pub enum BorderStyle {
    /// Continuous line.
    #[default]
    Solid,
    /// Dashes three widths long.
    Dashed,
    /// Dots one width long.
    Dotted,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Rectangle outline drawn over an image layer.
pub struct ImageBorder {
    /// Line width in pixels.
    #[serde(default = "default_border_width")]
    pub width: f32,
    /// Line color.
    #[serde(default)]
    pub color: Color,
    /// Line style.
    #[serde(default)]
    pub style: BorderStyle,
}

fn default_border_width() -> f32 {
    1.0
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Drop shadow painted beneath an image layer.
pub struct ImageShadow {
    /// Horizontal offset in pixels.
    #[serde(default)]
    pub offset_x: f32,
    /// Vertical offset in pixels.
    #[serde(default = "default_image_shadow_offset_y")]
    pub offset_y: f32,
    /// Blur radius in pixels.
    #[serde(default = "default_image_shadow_blur")]
    pub blur: f32,
    /// Outset applied to the shadow box.
    #[serde(default)]
    pub spread: f32,
    /// Shadow color.
    #[serde(default = "default_shadow_color")]
    pub color: Color,
}

fn default_image_shadow_offset_y() -> f32 {
    2.0
}

fn default_image_shadow_blur() -> f32 {
    4.0
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Image layer.
pub struct ImageLayer {
    /// Shared geometry and flags.
    #[serde(flatten)]
    pub common: LayerCommon,
    /// `"photo"` for the portrait, another record field holding a path, or absent.
    #[serde(default)]
    pub field: Option<String>,
    /// Static source reference, also the fallback for missing fields.
    #[serde(default)]
    pub src: Option<String>,
    /// Fit strategy.
    #[serde(default)]
    pub object_fit: ObjectFit,
    /// Corner radius of the alpha mask.
    #[serde(default)]
    pub border_radius: f32,
    /// Optional outline.
    #[serde(default)]
    pub border: Option<ImageBorder>,
    /// Optional drop shadow.
    #[serde(default)]
    pub shadow: Option<ImageShadow>,
}

impl ImageLayer {
    /// Image layer with default styling.
    pub fn new(common: LayerCommon, field: Option<&str>, src: Option<&str>) -> Self {
        Self {
            common,
            field: field.map(str::to_string),
            src: src.map(str::to_string),
            object_fit: ObjectFit::Cover,
            border_radius: 0.0,
            border: None,
            shadow: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Shape kind.
pub enum ShapeKind {
    /// Axis-aligned rectangle, optionally rounded.
    #[default]
    Rectangle,
    /// Ellipse inscribed in the box.
    Circle,
    /// Segment from the box's top-left to `(x + width, y + height)`.
    Line,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Shape layer.
pub struct ShapeLayer {
    /// Shared geometry and flags.
    #[serde(flatten)]
    pub common: LayerCommon,
    /// Shape kind.
    #[serde(default)]
    pub shape: ShapeKind,
    /// Fill color.
    #[serde(default, deserialize_with = "optional_color")]
    pub fill: Option<Color>,
    /// Stroke color.
    #[serde(default, deserialize_with = "optional_color")]
    pub stroke: Option<Color>,
    /// Stroke width in pixels; zero suppresses the stroke.
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f32,
    /// Corner radius (rectangles only).
    #[serde(default)]
    pub border_radius: f32,
}

impl ShapeLayer {
    /// Filled shape without stroke.
    pub fn filled(common: LayerCommon, shape: ShapeKind, fill: Color) -> Self {
        Self {
            common,
            shape,
            fill: Some(fill),
            stroke: None,
            stroke_width: default_stroke_width(),
            border_radius: 0.0,
        }
    }
}

fn default_stroke_width() -> f32 {
    1.0
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
/// QR error-correction level.
pub enum ErrorCorrection {
    /// ~7% recovery.
    L,
    /// ~15% recovery.
    #[default]
    M,
    /// ~25% recovery.
    Q,
    /// ~30% recovery.
    H,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// QR code layer. There is no static-text variant.
pub struct QrCodeLayer {
    /// Shared geometry and flags.
    #[serde(flatten)]
    pub common: LayerCommon,
    /// Record field to encode.
    #[serde(default = "default_qr_field")]
    pub field: String,
    /// Dark module color.
    #[serde(default)]
    pub foreground_color: Color,
    /// Light module and quiet-zone color.
    #[serde(default = "default_qr_background")]
    pub background_color: Color,
    /// Error-correction level.
    #[serde(default)]
    pub error_correction_level: ErrorCorrection,
}

impl QrCodeLayer {
    /// Black-on-white QR layer at level M.
    pub fn new(common: LayerCommon, field: impl Into<String>) -> Self {
        Self {
            common,
            field: field.into(),
            foreground_color: Color::BLACK,
            background_color: default_qr_background(),
            error_correction_level: ErrorCorrection::M,
        }
    }
}

fn default_qr_field() -> String {
    "id_number".to_string()
}

fn default_qr_background() -> Color {
    Color::WHITE
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Int(i64),
        Float(f64),
        Null,
    }

    Ok(match Repr::deserialize(deserializer)? {
        Repr::Text(s) => s,
        Repr::Int(n) => n.to_string(),
        Repr::Float(n) => n.to_string(),
        Repr::Null => String::new(),
    })
}

fn optional_color<'de, D>(deserializer: D) -> Result<Option<Color>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    match raw {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(v) => Color::deserialize(v).map(Some).map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/template.rs"]
mod tests;
