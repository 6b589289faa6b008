use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

use usvg::fontdb;

use crate::config::RenderConfig;
use crate::model::template::FontWeight;

/// 5x7 bitmap fallback font.
pub mod builtin;

/// Families tried, in order, as the generic sans-serif face.
const SANS_SERIF_CANDIDATES: [&str; 6] = [
    "Arial",
    "Liberation Sans",
    "Helvetica",
    "DejaVu Sans",
    "Noto Sans",
    "FreeSans",
];

/// Cache key: lower-cased family, size bits, bold flag.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FontKey {
    family: String,
    size_bits: u32,
    bold: bool,
}

impl FontKey {
    /// Key for a request.
    pub fn new(family: &str, size: f32, weight: FontWeight) -> Self {
        Self {
            family: family.trim().to_lowercase(),
            size_bits: size.to_bits(),
            bold: weight.is_bold(),
        }
    }

    /// Lower-cased family name.
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Requested pixel size.
    pub fn size(&self) -> f32 {
        f32::from_bits(self.size_bits)
    }

    /// Whether a bold face was requested.
    pub fn bold(&self) -> bool {
        self.bold
    }
}

/// Step of the fallback chain that produced a [`FontResource`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontResolution {
    /// Requested family with matching weight.
    Exact,
    /// Requested family, closest available weight.
    FamilyDefault,
    /// Generic sans-serif face from the font database.
    PlatformFallback,
    /// Built-in bitmap font.
    Builtin,
}

/// A drawable font at a fixed pixel size.
#[derive(Clone)]
pub struct FontResource {
    family: String,
    size: f32,
    bold: bool,
    resolution: FontResolution,
    face: Face,
}

#[derive(Clone)]
enum Face {
    Outline {
        id: fontdb::ID,
        bytes: Arc<Vec<u8>>,
        index: u32,
        cpu: vello_cpu::peniko::FontData,
    },
    Builtin,
}

impl std::fmt::Debug for FontResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontResource")
            .field("family", &self.family)
            .field("size", &self.size)
            .field("bold", &self.bold)
            .field("resolution", &self.resolution)
            .field("face_bytes", &self.font_bytes().map_or(0, <[u8]>::len))
            .finish()
    }
}

impl FontResource {
    /// The built-in bitmap font at `size`.
    pub fn builtin(size: f32, bold: bool) -> Self {
        Self {
            family: "builtin".to_string(),
            size,
            bold,
            resolution: FontResolution::Builtin,
            face: Face::Builtin,
        }
    }

    /// Family name of the resolved face.
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Pixel size.
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Whether bold was requested.
    pub fn bold(&self) -> bool {
        self.bold
    }

    /// Fallback step that produced this resource.
    pub fn resolution(&self) -> FontResolution {
        self.resolution
    }

    /// Whether this is the built-in bitmap font.
    pub fn is_builtin(&self) -> bool {
        matches!(self.face, Face::Builtin)
    }

    /// Raw font file bytes, `None` for the built-in font.
    pub fn font_bytes(&self) -> Option<&[u8]> {
        match &self.face {
            Face::Outline { bytes, .. } => Some(bytes.as_slice()),
            Face::Builtin => None,
        }
    }

    /// Face index inside a collection file.
    pub fn face_index(&self) -> u32 {
        match &self.face {
            Face::Outline { index, .. } => *index,
            Face::Builtin => 0,
        }
    }

    pub(crate) fn face_id(&self) -> Option<fontdb::ID> {
        match &self.face {
            Face::Outline { id, .. } => Some(*id),
            Face::Builtin => None,
        }
    }

    pub(crate) fn cpu_font(&self) -> Option<&vello_cpu::peniko::FontData> {
        match &self.face {
            Face::Outline { cpu, .. } => Some(cpu),
            Face::Builtin => None,
        }
    }
}

/// Font lookup with a four-step fallback chain and a shared cache.
///
/// [`FontManager::get_font`] never fails. The cache is read-mostly; two callers racing on the
/// same cold key both resolve it and whichever inserts first wins. Both handles are
/// equivalent.
pub struct FontManager {
    db: fontdb::Database,
    cache: RwLock<HashMap<FontKey, Arc<FontResource>>>,
}

impl std::fmt::Debug for FontManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontManager")
            .field("faces", &self.db.len())
            .field("cached", &self.cached_len())
            .finish()
    }
}

impl FontManager {
    /// Build the face database from the configured directories and, if enabled, the system
    /// fonts.
    pub fn new(config: &RenderConfig) -> Self {
        let mut db = fontdb::Database::new();
        if config.load_system_fonts {
            db.load_system_fonts();
        }
        for dir in &config.font_dirs {
            load_fonts_from_dir(&mut db, dir);
        }
        tracing::debug!(faces = db.len(), "font database ready");
        Self::from_database(db)
    }

    /// Manager over an existing database.
    pub fn from_database(mut db: fontdb::Database) -> Self {
        if let Some(name) = SANS_SERIF_CANDIDATES
            .iter()
            .find(|name| has_family(&db, name))
        {
            db.set_sans_serif_family(*name);
        }
        Self {
            db,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Manager without any faces; every request resolves to the built-in font.
    pub fn builtin_only() -> Self {
        Self::from_database(fontdb::Database::new())
    }

    /// Number of faces in the database.
    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    /// Number of cached resources.
    pub fn cached_len(&self) -> usize {
        match self.cache.read() {
            Ok(g) => g.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    /// Font for `(family, size, weight)`, cached per [`FontKey`].
    pub fn get_font(&self, family: &str, size: f32, weight: FontWeight) -> Arc<FontResource> {
        let key = FontKey::new(family, size, weight);

        let hit = match self.cache.read() {
            Ok(g) => g.get(&key).cloned(),
            Err(poisoned) => poisoned.into_inner().get(&key).cloned(),
        };
        if let Some(font) = hit {
            return font;
        }

        let resolved = Arc::new(self.resolve(&key));
        let mut cache = match self.cache.write() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        cache.entry(key).or_insert(resolved).clone()
    }

    fn resolve(&self, key: &FontKey) -> FontResource {
        let family_faces = self
            .db
            .faces()
            .filter(|f| {
                f.families
                    .iter()
                    .any(|(name, _)| name.to_lowercase() == key.family)
            })
            .collect::<Vec<_>>();

        let target = if key.bold { 700 } else { 400 };

        let exact = closest_face(
            family_faces
                .iter()
                .copied()
                .filter(|f| (f.weight.0 >= 600) == key.bold),
            target,
        );
        if let Some(font) = exact.and_then(|id| self.load(id, key, FontResolution::Exact)) {
            return font;
        }

        let family_default = closest_face(family_faces.iter().copied(), target);
        if let Some(font) =
            family_default.and_then(|id| self.load(id, key, FontResolution::FamilyDefault))
        {
            return font;
        }

        let query = fontdb::Query {
            families: &[fontdb::Family::SansSerif],
            weight: fontdb::Weight(if key.bold { 700 } else { 400 }),
            ..fontdb::Query::default()
        };
        let platform = self
            .db
            .query(&query)
            .or_else(|| self.db.faces().next().map(|f| f.id));
        if let Some(font) =
            platform.and_then(|id| self.load(id, key, FontResolution::PlatformFallback))
        {
            tracing::debug!(family = %key.family, resolved = %font.family, "font family not found, using platform fallback");
            return font;
        }

        tracing::warn!(family = %key.family, "no usable font faces, using built-in bitmap font");
        FontResource::builtin(key.size(), key.bold)
    }

    fn load(&self, id: fontdb::ID, key: &FontKey, resolution: FontResolution) -> Option<FontResource> {
        let family = self
            .db
            .face(id)
            .and_then(|f| f.families.first().map(|(name, _)| name.clone()))
            .unwrap_or_default();
        let (bytes, index) = self.db.with_face_data(id, |data, index| (data.to_vec(), index))?;
        let bytes = Arc::new(bytes);
        let cpu = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(bytes.as_ref().clone()),
            index,
        );
        Some(FontResource {
            family,
            size: key.size(),
            bold: key.bold,
            resolution,
            face: Face::Outline {
                id,
                bytes,
                index,
                cpu,
            },
        })
    }
}

fn closest_face<'a>(
    faces: impl Iterator<Item = &'a fontdb::FaceInfo>,
    target_weight: i32,
) -> Option<fontdb::ID> {
    faces
        .min_by_key(|f| {
            (
                f.style != fontdb::Style::Normal,
                (i32::from(f.weight.0) - target_weight).abs(),
            )
        })
        .map(|f| f.id)
}

fn has_family(db: &fontdb::Database, name: &str) -> bool {
    db.faces()
        .any(|f| f.families.iter().any(|(n, _)| n.eq_ignore_ascii_case(name)))
}

fn load_fonts_from_dir(db: &mut fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(e) = db.load_font_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "skipping unreadable font file");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/fonts/manager.rs"]
mod tests;
