use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::foundation::error::{StillcutError, StillcutResult};

/// Pixel size used for script text.
pub const DEFAULT_FONT_SIZE_PX: f32 = 50.0;

/// Font files tried before querying the system font database.
pub const DEFAULT_FONT_FILES: &[&str] = &[
    "/System/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Helvetica.ttc",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
];

/// Family names queried in the system font database.
pub const DEFAULT_SYSTEM_FAMILIES: &[&str] = &["Arial", "Helvetica", "DejaVu Sans", "Liberation Sans"];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub struct TextBrushRgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

#[derive(Clone)]
/// Raw face data produced by a [`FontProvider`].
pub struct LoadedFont {
    /// Font file bytes (a single face or a whole collection).
    pub bytes: Arc<Vec<u8>>,
    /// Face index inside `bytes`.
    pub index: u32,
    /// Primary family name reported by the face.
    pub family: String,
    /// Human-readable origin of the face.
    pub source: String,
}

impl std::fmt::Debug for LoadedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedFont")
            .field("bytes_len", &self.bytes.len())
            .field("index", &self.index)
            .field("family", &self.family)
            .field("source", &self.source)
            .finish()
    }
}

/// One candidate in a [`FontChain`].
///
/// `load` returning an error means "this candidate is not available here"; the chain moves on.
pub trait FontProvider {
    /// Short description used in logs and dependency reports.
    fn describe(&self) -> String;

    /// Load the candidate's face data.
    fn load(&self) -> StillcutResult<LoadedFont>;
}

/// Candidate backed by a font file on disk.
#[derive(Clone, Debug)]
pub struct FontFile {
    path: PathBuf,
}

impl FontFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FontProvider for FontFile {
    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }

    fn load(&self) -> StillcutResult<LoadedFont> {
        let bytes = std::fs::read(&self.path).map_err(|e| {
            StillcutError::missing_dependency(format!(
                "font file '{}' is not readable: {e}",
                self.path.display()
            ))
        })?;

        let mut db = usvg::fontdb::Database::new();
        db.load_font_data(bytes.clone());
        let face = db.faces().next().ok_or_else(|| {
            StillcutError::missing_dependency(format!(
                "'{}' does not contain a usable font face",
                self.path.display()
            ))
        })?;

        Ok(LoadedFont {
            index: face.index,
            family: primary_family(face),
            bytes: Arc::new(bytes),
            source: self.describe(),
        })
    }
}

/// Candidate resolved through the system font database.
#[derive(Clone, Debug)]
pub struct SystemFamily {
    families: Vec<String>,
}

impl SystemFamily {
    /// Query `families` in order, then the generic sans-serif family.
    pub fn new<I, S>(families: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            families: families.into_iter().map(Into::into).collect(),
        }
    }
}

impl FontProvider for SystemFamily {
    fn describe(&self) -> String {
        format!("system:{}", self.families.join(","))
    }

    fn load(&self) -> StillcutResult<LoadedFont> {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();

        let mut families = self
            .families
            .iter()
            .map(|s| usvg::fontdb::Family::Name(s.as_str()))
            .collect::<Vec<_>>();
        families.push(usvg::fontdb::Family::SansSerif);

        let query = usvg::fontdb::Query {
            families: &families,
            weight: usvg::fontdb::Weight::NORMAL,
            stretch: usvg::fontdb::Stretch::Normal,
            style: usvg::fontdb::Style::Normal,
        };
        let id = db.query(&query).ok_or_else(|| {
            StillcutError::missing_dependency("no matching face in the system font database")
        })?;

        let family = db
            .face(id)
            .map(primary_family)
            .unwrap_or_else(|| "unknown".to_string());
        let (bytes, index) = db
            .with_face_data(id, |data, index| (data.to_vec(), index))
            .ok_or_else(|| {
                StillcutError::missing_dependency("system face data is not readable")
            })?;

        Ok(LoadedFont {
            bytes: Arc::new(bytes),
            index,
            family,
            source: self.describe(),
        })
    }
}

fn primary_family(face: &usvg::fontdb::FaceInfo) -> String {
    face.families
        .first()
        .map(|(name, _)| name.clone())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Ordered font candidates at a fixed pixel size with a built-in last resort.
pub struct FontChain {
    candidates: Vec<Box<dyn FontProvider>>,
    size_px: f32,
}

impl FontChain {
    /// Empty chain; [`FontChain::resolve`] yields the built-in block font.
    pub fn new(size_px: f32) -> Self {
        Self {
            candidates: Vec::new(),
            size_px,
        }
    }

    /// Standard chain: `extra_files` first, then well-known font paths, then the system database.
    pub fn with_defaults(extra_files: &[PathBuf], size_px: f32) -> Self {
        let mut chain = Self::new(size_px);
        for path in extra_files {
            chain.push(FontFile::new(path));
        }
        for path in DEFAULT_FONT_FILES {
            chain.push(FontFile::new(path));
        }
        chain.push(SystemFamily::new(DEFAULT_SYSTEM_FAMILIES.iter().copied()));
        chain
    }

    pub fn push(&mut self, candidate: impl FontProvider + 'static) {
        self.candidates.push(Box::new(candidate));
    }

    pub fn size_px(&self) -> f32 {
        self.size_px
    }

    pub fn candidates(&self) -> impl Iterator<Item = String> + '_ {
        self.candidates.iter().map(|c| c.describe())
    }

    /// Resolve the first usable candidate. Never fails.
    pub fn resolve(&self) -> Typeface {
        for candidate in &self.candidates {
            let attempt = candidate
                .load()
                .and_then(|font| Typeface::outline(font, self.size_px));
            match attempt {
                Ok(face) => {
                    tracing::debug!(source = %candidate.describe(), "font candidate resolved");
                    return face;
                }
                Err(err) => {
                    tracing::debug!(source = %candidate.describe(), error = %err, "font candidate unavailable");
                }
            }
        }
        tracing::info!("no font candidate available; using built-in block font");
        Typeface::builtin(self.size_px)
    }
}

/// Font-file-free fallback: every visible character is a filled block on a fixed advance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockFont {
    size_px: f32,
}

impl BlockFont {
    pub fn new(size_px: f32) -> Self {
        Self { size_px }
    }

    pub fn advance(&self) -> f32 {
        self.size_px * 0.6
    }

    pub fn measure(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.advance()
    }

    /// Glyph boxes for `text`, relative to the line's top-left corner.
    pub fn glyph_boxes(&self, text: &str) -> Vec<GlyphBox> {
        let advance = self.advance();
        text.chars()
            .enumerate()
            .filter(|(_, ch)| !ch.is_whitespace())
            .map(|(i, _)| {
                let x = i as f32 * advance;
                GlyphBox {
                    x0: x + advance * 0.15,
                    y0: self.size_px * 0.1,
                    x1: x + advance * 0.85,
                    y1: self.size_px * 0.8,
                }
            })
            .collect()
    }
}

/// Axis-aligned box drawn for one [`BlockFont`] glyph.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

/// Rendered-width measurement used by the wrapping engine.
pub trait TextMeasure {
    fn measure(&mut self, text: &str) -> f32;
}

/// A single line laid out by a [`Typeface`], ready for drawing.
pub enum LineLayout {
    /// Shaped glyphs from an outline font.
    Outline {
        layout: parley::Layout<TextBrushRgba8>,
        font: vello_cpu::peniko::FontData,
    },
    /// Blocks from the built-in font.
    Block { boxes: Vec<GlyphBox>, width: f32 },
}

impl LineLayout {
    pub fn width(&self) -> f32 {
        match self {
            LineLayout::Outline { layout, .. } => layout.width(),
            LineLayout::Block { width, .. } => *width,
        }
    }
}

struct OutlineFace {
    font: LoadedFont,
    family_name: String,
    data: vello_cpu::peniko::FontData,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
}

enum Face {
    Outline(Box<OutlineFace>),
    Block(BlockFont),
}

/// A resolved font bound to a pixel size.
pub struct Typeface {
    face: Face,
    size_px: f32,
}

impl Typeface {
    /// Bind loaded face data, registering it with Parley.
    pub fn outline(font: LoadedFont, size_px: f32) -> StillcutResult<Self> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(StillcutError::validation(
                "font size_px must be finite and > 0",
            ));
        }

        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::new(font.bytes.clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            StillcutError::missing_dependency("no font families registered from font bytes")
        })?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| {
                StillcutError::missing_dependency("registered font family has no name")
            })?
            .to_string();

        let data = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::new(font.bytes.clone()),
            font.index,
        );

        Ok(Self {
            face: Face::Outline(Box::new(OutlineFace {
                font,
                family_name,
                data,
                font_ctx,
                layout_ctx: parley::LayoutContext::new(),
            })),
            size_px,
        })
    }

    pub fn builtin(size_px: f32) -> Self {
        Self {
            face: Face::Block(BlockFont::new(size_px)),
            size_px,
        }
    }

    pub fn size_px(&self) -> f32 {
        self.size_px
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self.face, Face::Block(_))
    }

    /// Face data when an outline font was resolved.
    pub fn loaded_font(&self) -> Option<&LoadedFont> {
        match &self.face {
            Face::Outline(o) => Some(&o.font),
            Face::Block(_) => None,
        }
    }

    pub fn source(&self) -> String {
        match &self.face {
            Face::Outline(o) => o.font.source.clone(),
            Face::Block(_) => "builtin".to_string(),
        }
    }

    pub fn family(&self) -> String {
        match &self.face {
            Face::Outline(o) => o.family_name.clone(),
            Face::Block(_) => "builtin-block".to_string(),
        }
    }

    /// Lay out `text` as one unbroken line.
    pub fn layout_line(&mut self, text: &str, brush: TextBrushRgba8) -> LineLayout {
        match &mut self.face {
            Face::Outline(o) => {
                let o = &mut **o;
                let mut builder = o
                    .layout_ctx
                    .ranged_builder(&mut o.font_ctx, text, 1.0, true);
                builder.push_default(parley::style::StyleProperty::FontStack(
                    parley::style::FontStack::Source(std::borrow::Cow::Owned(
                        o.family_name.clone(),
                    )),
                ));
                builder.push_default(parley::style::StyleProperty::FontSize(self.size_px));
                builder.push_default(parley::style::StyleProperty::Brush(brush));

                let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
                layout.break_all_lines(None);
                LineLayout::Outline {
                    layout,
                    font: o.data.clone(),
                }
            }
            Face::Block(block) => LineLayout::Block {
                boxes: block.glyph_boxes(text),
                width: block.measure(text),
            },
        }
    }
}

impl TextMeasure for Typeface {
    fn measure(&mut self, text: &str) -> f32 {
        self.layout_line(text, TextBrushRgba8::default()).width()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
