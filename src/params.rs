//! Parameter store – the print tunables (paper size, margin, density, font
//! sizes, zoom) as one explicit value object.
//!
//! Every tunable goes through a single `set(field, raw)` dispatch with
//! uniform validation: malformed input falls back to the field's captured
//! default, and each setter reports whether it can change page geometry or
//! content extent so the caller knows to schedule a repagination pass.

use serde::{Deserialize, Serialize};

use crate::units::{Length, Scale};

// ---------------------------------------------------------------------------
// Defaults (seed values mirrored from the initial presentation markup)
// ---------------------------------------------------------------------------

pub const DEFAULT_MARGIN: Length = Length::inches(0.75);
pub const DEFAULT_PRINT_WIDTH: Length = Length::inches(6.5);
pub const DEFAULT_CODE_SIZE: Length = Length::px(13.0);
pub const DEFAULT_TABLE_PADDING: Length = Length::px(6.0);
pub const DEFAULT_EDITOR_SIZE: Length = Length::px(14.0);
pub const DEFAULT_PREVIEW_ZOOM: f32 = 1.0;

// ---------------------------------------------------------------------------
// Enumerated tunables
// ---------------------------------------------------------------------------

/// Vertical density of the rendered preview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Density {
    Compact,
    #[default]
    Normal,
    Roomy,
}

impl Density {
    /// Line-height multiplier applied to body text.
    pub fn line_height_factor(self) -> f32 {
        match self {
            Density::Compact => 1.2,
            Density::Normal => 1.5,
            Density::Roomy => 1.8,
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" => Some(Density::Compact),
            "normal" => Some(Density::Normal),
            "roomy" => Some(Density::Roomy),
            _ => None,
        }
    }
}

/// Physical paper formats supported by the print layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperSize {
    #[default]
    Letter,
    A4,
    Legal,
}

impl PaperSize {
    /// (width, height) of the sheet.
    pub fn dimensions(self) -> (Length, Length) {
        match self {
            PaperSize::Letter => (Length::inches(8.5), Length::inches(11.0)),
            PaperSize::A4 => (Length::mm(210.0), Length::mm(297.0)),
            PaperSize::Legal => (Length::inches(8.5), Length::inches(14.0)),
        }
    }

    pub fn height(self) -> Length {
        self.dimensions().1
    }

    /// CSS `@page size` keyword for this format.
    pub fn css_keyword(self) -> &'static str {
        match self {
            PaperSize::Letter => "letter",
            PaperSize::A4 => "A4",
            PaperSize::Legal => "legal",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "letter" => Some(PaperSize::Letter),
            "a4" => Some(PaperSize::A4),
            "legal" => Some(PaperSize::Legal),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// The tunable record
// ---------------------------------------------------------------------------

/// Live values of every print tunable.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintParameters {
    pub density: Density,
    pub paper_size: PaperSize,
    pub margin: Length,
    pub print_width: Length,
    pub code_size: Length,
    pub table_padding: Length,
    pub editor_size: Length,
    pub preview_zoom: f32,
}

impl Default for PrintParameters {
    fn default() -> Self {
        Self {
            density: Density::Normal,
            paper_size: PaperSize::Letter,
            margin: DEFAULT_MARGIN,
            print_width: DEFAULT_PRINT_WIDTH,
            code_size: DEFAULT_CODE_SIZE,
            table_padding: DEFAULT_TABLE_PADDING,
            editor_size: DEFAULT_EDITOR_SIZE,
            preview_zoom: DEFAULT_PREVIEW_ZOOM,
        }
    }
}

impl PrintParameters {
    /// Scale for resolving symbolic lengths at the current zoom.
    pub fn scale(&self) -> Scale {
        Scale::with_zoom(self.preview_zoom)
    }
}

/// Externally supplied seed values, e.g. read off the initial markup or a
/// saved snapshot. Absent or malformed entries fall back to the built-in
/// defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParameterSeed {
    pub density: Option<String>,
    pub paper_size: Option<String>,
    pub margin: Option<String>,
    pub print_width: Option<String>,
    pub code_size: Option<String>,
    pub table_padding: Option<String>,
    pub editor_size: Option<String>,
    pub preview_zoom: Option<f32>,
}

impl ParameterSeed {
    fn materialise(&self) -> PrintParameters {
        let base = PrintParameters::default();
        PrintParameters {
            density: self
                .density
                .as_deref()
                .and_then(Density::parse)
                .unwrap_or(base.density),
            paper_size: self
                .paper_size
                .as_deref()
                .and_then(PaperSize::parse)
                .unwrap_or(base.paper_size),
            margin: parse_positive(self.margin.as_deref()).unwrap_or(base.margin),
            print_width: parse_positive(self.print_width.as_deref()).unwrap_or(base.print_width),
            code_size: parse_positive(self.code_size.as_deref()).unwrap_or(base.code_size),
            table_padding: parse_positive(self.table_padding.as_deref())
                .unwrap_or(base.table_padding),
            editor_size: parse_positive(self.editor_size.as_deref()).unwrap_or(base.editor_size),
            preview_zoom: self
                .preview_zoom
                .filter(|z| z.is_finite() && *z > 0.0)
                .unwrap_or(base.preview_zoom),
        }
    }
}

fn parse_positive(raw: Option<&str>) -> Option<Length> {
    let length = Length::parse(raw?)?;
    (length.value > 0.0).then_some(length)
}

// ---------------------------------------------------------------------------
// Store with uniform set/reset dispatch
// ---------------------------------------------------------------------------

/// A settable field of [`PrintParameters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Density,
    PaperSize,
    Margin,
    PrintWidth,
    CodeSize,
    TablePadding,
    EditorSize,
    PreviewZoom,
}

impl Field {
    /// True when a change to this field can move page geometry or content
    /// extent and therefore requires a repagination pass.
    pub fn affects_geometry(self) -> bool {
        !matches!(self, Field::EditorSize)
    }
}

/// Holds the live parameter values plus the defaults captured at startup.
#[derive(Debug, Clone)]
pub struct ParamStore {
    live: PrintParameters,
    defaults: PrintParameters,
    /// Settings panel visibility; independent state, no geometry effect.
    pub settings_open: bool,
}

impl ParamStore {
    /// Capture `seed` as the defaults and start live values there.
    pub fn new(seed: &ParameterSeed) -> Self {
        let defaults = seed.materialise();
        Self {
            live: defaults.clone(),
            defaults,
            settings_open: false,
        }
    }

    pub fn live(&self) -> &PrintParameters {
        &self.live
    }

    pub fn defaults(&self) -> &PrintParameters {
        &self.defaults
    }

    /// Set one field from raw user input.
    ///
    /// Malformed input silently falls back to the field's captured default.
    /// Returns true when the change requires a repagination pass.
    pub fn set(&mut self, field: Field, raw: &str) -> bool {
        match field {
            Field::Density => {
                self.live.density = Density::parse(raw).unwrap_or(self.defaults.density);
            }
            Field::PaperSize => {
                self.live.paper_size = PaperSize::parse(raw).unwrap_or(self.defaults.paper_size);
            }
            Field::Margin => {
                self.live.margin = parse_positive(Some(raw)).unwrap_or(self.defaults.margin);
            }
            Field::PrintWidth => {
                self.live.print_width =
                    parse_positive(Some(raw)).unwrap_or(self.defaults.print_width);
            }
            Field::CodeSize => {
                self.live.code_size = parse_positive(Some(raw)).unwrap_or(self.defaults.code_size);
            }
            Field::TablePadding => {
                self.live.table_padding =
                    parse_positive(Some(raw)).unwrap_or(self.defaults.table_padding);
            }
            Field::EditorSize => {
                self.live.editor_size =
                    parse_positive(Some(raw)).unwrap_or(self.defaults.editor_size);
            }
            Field::PreviewZoom => {
                self.live.preview_zoom = raw
                    .trim()
                    .parse::<f32>()
                    .ok()
                    .filter(|z| z.is_finite() && *z > 0.0)
                    .unwrap_or(self.defaults.preview_zoom);
            }
        }
        field.affects_geometry()
    }

    /// Restore every field to its captured default, with the same observable
    /// effects as setting each field manually.
    pub fn reset_all(&mut self) {
        self.live = self.defaults.clone();
    }

    /// Dynamic print stylesheet so printed pages match the on-screen
    /// pagination. Regenerated whenever paper size or margin changes.
    pub fn print_css(&self) -> String {
        let p = &self.live;
        let (width, height) = p.paper_size.dimensions();
        format!(
            "@page {{ size: {keyword}; margin: {margin}; }}\n\
             .preview-page {{ width: {width}; height: {height}; }}\n\
             .preview-content {{ max-width: {print_width}; line-height: {line_height}; }}\n\
             .preview-content pre, .preview-content code {{ font-size: {code_size}; }}\n\
             .preview-content th, .preview-content td {{ padding: {table_padding}; }}\n",
            keyword = p.paper_size.css_keyword(),
            margin = p.margin,
            width = width,
            height = height,
            print_width = p.print_width,
            line_height = p.density.line_height_factor(),
            code_size = p.code_size,
            table_padding = p.table_padding,
        )
    }
}

impl Default for ParamStore {
    fn default() -> Self {
        Self::new(&ParameterSeed::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_falls_back_per_field() {
        let seed = ParameterSeed {
            margin: Some("1in".to_string()),
            print_width: Some("not a number".to_string()),
            paper_size: Some("a4".to_string()),
            preview_zoom: Some(-2.0),
            ..ParameterSeed::default()
        };
        let store = ParamStore::new(&seed);
        assert_eq!(store.live().margin, Length::inches(1.0));
        assert_eq!(store.live().print_width, DEFAULT_PRINT_WIDTH);
        assert_eq!(store.live().paper_size, PaperSize::A4);
        assert_eq!(store.live().preview_zoom, DEFAULT_PREVIEW_ZOOM);
    }

    #[test]
    fn seed_survives_json_round_trip() {
        let seed = ParameterSeed {
            density: Some("compact".to_string()),
            margin: Some("15mm".to_string()),
            preview_zoom: Some(1.5),
            ..ParameterSeed::default()
        };
        let json = serde_json::to_string(&seed).unwrap();
        let restored: ParameterSeed = serde_json::from_str(&json).unwrap();
        let store = ParamStore::new(&restored);
        assert_eq!(store.live().density, Density::Compact);
        assert_eq!(store.live().margin, Length::mm(15.0));
        assert_eq!(store.live().preview_zoom, 1.5);
        // Unset fields come back as absent and take the built-ins.
        assert_eq!(store.live().paper_size, PaperSize::Letter);
    }

    #[test]
    fn set_valid_values() {
        let mut store = ParamStore::default();
        assert!(store.set(Field::Margin, "0.5in"));
        assert_eq!(store.live().margin, Length::inches(0.5));
        assert!(store.set(Field::Density, "roomy"));
        assert_eq!(store.live().density, Density::Roomy);
        assert!(store.set(Field::PreviewZoom, "1.25"));
        assert_eq!(store.live().preview_zoom, 1.25);
    }

    #[test]
    fn set_invalid_falls_back_to_default() {
        let mut store = ParamStore::default();
        store.set(Field::Margin, "2in");
        store.set(Field::Margin, "garbage");
        assert_eq!(store.live().margin, DEFAULT_MARGIN);
        store.set(Field::CodeSize, "-4px");
        assert_eq!(store.live().code_size, DEFAULT_CODE_SIZE);
        store.set(Field::Density, "airy");
        assert_eq!(store.live().density, Density::Normal);
    }

    #[test]
    fn editor_size_does_not_touch_geometry() {
        let mut store = ParamStore::default();
        assert!(!store.set(Field::EditorSize, "16px"));
        assert_eq!(store.live().editor_size, Length::px(16.0));
    }

    #[test]
    fn reset_restores_captured_defaults() {
        let seed = ParameterSeed {
            margin: Some("1in".to_string()),
            ..ParameterSeed::default()
        };
        let mut store = ParamStore::new(&seed);
        store.set(Field::Margin, "0.25in");
        store.set(Field::Density, "compact");
        store.set(Field::PreviewZoom, "2.0");
        store.reset_all();
        assert_eq!(store.live(), store.defaults());
        // Defaults are the *captured* seed, not the built-ins.
        assert_eq!(store.live().margin, Length::inches(1.0));
    }

    #[test]
    fn print_css_tracks_paper_and_margin() {
        let mut store = ParamStore::default();
        store.set(Field::PaperSize, "a4");
        store.set(Field::Margin, "20mm");
        let css = store.print_css();
        assert!(css.contains("size: A4"));
        assert!(css.contains("margin: 20mm"));
        assert!(css.contains("line-height: 1.5"));
    }

    #[test]
    fn paper_heights() {
        assert_eq!(PaperSize::Letter.height(), Length::inches(11.0));
        assert_eq!(PaperSize::Legal.height(), Length::inches(14.0));
        assert_eq!(PaperSize::A4.height(), Length::mm(297.0));
    }
}
