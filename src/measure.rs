//! Content measurement – estimates the vertical extent of a rendered HTML
//! fragment.
//!
//! The pagination engine never touches a concrete rendering surface; it asks
//! a [`Measure`] capability for the content height. A real presentation
//! layer measures its own DOM and implements the trait. For headless use
//! (CLI, tests) the [`FragmentEstimator`] scans the fragment with a
//! hand-written tag scanner and prices each block from the live parameters:
//! density line height, code size, table padding, and print width wrapping.

use crate::params::PrintParameters;
use crate::units::{Length, Scale};

/// Capability interface supplied by the presentation layer.
pub trait Measure {
    /// Total vertical extent of the rendered fragment, in device pixels.
    fn extent(&self, html: &str, params: &PrintParameters, scale: &Scale) -> f32;
}

impl<M: Measure + ?Sized> Measure for &M {
    fn extent(&self, html: &str, params: &PrintParameters, scale: &Scale) -> f32 {
        (**self).extent(html, params, scale)
    }
}

/// Test double returning a fixed extent.
#[derive(Debug, Clone, Copy)]
pub struct FixedMeasure(pub f32);

impl Measure for FixedMeasure {
    fn extent(&self, _html: &str, _params: &PrintParameters, _scale: &Scale) -> f32 {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Deterministic fragment estimator
// ---------------------------------------------------------------------------

/// Base body font size in CSS pixels at zoom 1.0.
const BASE_FONT_PX: f32 = 16.0;

/// Average glyph advance as a fraction of the font size.
const AVG_CHAR_WIDTH_EM: f32 = 0.5;

/// Vertical gap after each block as a fraction of the base font.
const BLOCK_GAP_EM: f32 = 0.75;

/// Headless extent estimator over the converter's HTML fragment.
#[derive(Debug, Clone, Copy, Default)]
pub struct FragmentEstimator;

#[derive(Debug, Clone, Copy, PartialEq)]
enum BlockKind {
    Paragraph,
    Heading(u8),
    ListItem,
    TableRow,
    CodeBlock,
    Rule,
}

struct Block {
    kind: BlockKind,
    /// Character count for wrap estimation; newline count for code blocks.
    text_len: usize,
    code_lines: usize,
}

impl Measure for FragmentEstimator {
    fn extent(&self, html: &str, params: &PrintParameters, scale: &Scale) -> f32 {
        let blocks = scan_blocks(html);
        if blocks.is_empty() {
            return 0.0;
        }

        let base_font = BASE_FONT_PX * scale.zoom;
        let line_height = base_font * params.density.line_height_factor();
        let block_gap = base_font * BLOCK_GAP_EM;
        let code_line = scale.resolve(Some(params.code_size)).max(1.0) * 1.4;
        let table_padding = scale.resolve(Some(params.table_padding));
        let content_width = scale.resolve(Some(params.print_width));

        blocks
            .iter()
            .map(|block| match block.kind {
                BlockKind::Paragraph | BlockKind::ListItem => {
                    wrapped_lines(block.text_len, base_font, content_width) as f32 * line_height
                        + block_gap
                }
                BlockKind::Heading(level) => {
                    let font = base_font * heading_scale(level);
                    font * 1.25 + block_gap * 1.5
                }
                BlockKind::TableRow => line_height + 2.0 * table_padding,
                BlockKind::CodeBlock => {
                    block.code_lines.max(1) as f32 * code_line + block_gap
                }
                BlockKind::Rule => block_gap * 2.0,
            })
            .sum()
    }
}

fn heading_scale(level: u8) -> f32 {
    match level {
        1 => 2.0,
        2 => 1.5,
        _ => 1.17,
    }
}

/// Estimated number of wrapped lines for a run of `chars` characters.
fn wrapped_lines(chars: usize, base_font: f32, content_width: f32) -> usize {
    if content_width <= 0.0 {
        return 1;
    }
    let chars_per_line = (content_width / (base_font * AVG_CHAR_WIDTH_EM)).floor() as usize;
    if chars_per_line == 0 {
        return chars.max(1);
    }
    chars.div_ceil(chars_per_line).max(1)
}

// ---------------------------------------------------------------------------
// Tag scanner – single pass over the fragment
// ---------------------------------------------------------------------------

fn scan_blocks(html: &str) -> Vec<Block> {
    let mut scanner = Scanner::new(html);
    scanner.run();
    scanner.blocks
}

struct Scanner<'a> {
    input: &'a str,
    pos: usize,
    blocks: Vec<Block>,
    /// Depth inside `<pre>`; text is counted as code lines while > 0.
    pre_depth: usize,
    current: Option<Block>,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            blocks: Vec::new(),
            pre_depth: 0,
            current: None,
        }
    }

    fn run(&mut self) {
        while !self.eof() {
            if self.starts_with("<!--") {
                self.skip_comment();
            } else if self.starts_with("</") {
                self.advance(2);
                let name = self.read_tag_name();
                self.skip_past('>');
                self.close_tag(&name);
            } else if self.starts_with("<") {
                self.advance(1);
                let name = self.read_tag_name();
                self.skip_past('>');
                self.open_tag(&name);
            } else {
                self.read_text();
            }
        }
        self.flush();
    }

    fn open_tag(&mut self, name: &str) {
        let kind = match name {
            "p" | "blockquote" => Some(BlockKind::Paragraph),
            "h1" => Some(BlockKind::Heading(1)),
            "h2" => Some(BlockKind::Heading(2)),
            "h3" | "h4" | "h5" | "h6" => Some(BlockKind::Heading(3)),
            "li" => Some(BlockKind::ListItem),
            "tr" => Some(BlockKind::TableRow),
            "pre" => {
                self.pre_depth += 1;
                Some(BlockKind::CodeBlock)
            }
            "hr" => Some(BlockKind::Rule),
            _ => None,
        };
        if let Some(kind) = kind {
            self.flush();
            self.current = Some(Block {
                kind,
                text_len: 0,
                code_lines: 0,
            });
        }
    }

    fn close_tag(&mut self, name: &str) {
        if name == "pre" {
            self.pre_depth = self.pre_depth.saturating_sub(1);
            self.flush();
        }
    }

    fn flush(&mut self) {
        if let Some(block) = self.current.take() {
            self.blocks.push(block);
        }
    }

    fn read_text(&mut self) {
        let start = self.pos;
        while !self.eof() && !self.starts_with("<") {
            self.advance(1);
        }
        let raw = &self.input[start..self.pos];
        let text = decode_entities(raw);
        if self.pre_depth > 0 {
            if let Some(block) = self.current.as_mut() {
                block.code_lines += text.lines().filter(|l| !l.trim().is_empty()).count();
            }
            return;
        }
        let visible = text.trim();
        if visible.is_empty() {
            return;
        }
        match self.current.as_mut() {
            Some(block) => block.text_len += visible.chars().count(),
            None => {
                // Bare text outside any block renders as a paragraph run.
                self.current = Some(Block {
                    kind: BlockKind::Paragraph,
                    text_len: visible.chars().count(),
                    code_lines: 0,
                });
            }
        }
    }

    fn read_tag_name(&mut self) -> String {
        let start = self.pos;
        while !self.eof() {
            let c = self.current_char();
            if c.is_ascii_alphanumeric() {
                self.advance(1);
            } else {
                break;
            }
        }
        self.input[start..self.pos].to_ascii_lowercase()
    }

    fn skip_comment(&mut self) {
        self.advance(4);
        while !self.eof() && !self.starts_with("-->") {
            self.advance(1);
        }
        if !self.eof() {
            self.advance(3);
        }
    }

    fn skip_past(&mut self, end: char) {
        while !self.eof() && self.current_char() != end {
            self.advance(1);
        }
        if !self.eof() {
            self.advance(1);
        }
    }

    fn starts_with(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    fn eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn current_char(&self) -> char {
        self.input[self.pos..].chars().next().unwrap_or('\0')
    }

    fn advance(&mut self, n: usize) {
        for _ in 0..n {
            if let Some(c) = self.input[self.pos..].chars().next() {
                self.pos += c.len_utf8();
            }
        }
    }
}

fn decode_entities(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", "\u{00A0}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{Field, ParamStore};

    fn extent(html: &str) -> f32 {
        let store = ParamStore::default();
        FragmentEstimator.extent(html, store.live(), &store.live().scale())
    }

    #[test]
    fn empty_fragment_has_zero_extent() {
        assert_eq!(extent(""), 0.0);
        assert_eq!(extent("   \n "), 0.0);
    }

    #[test]
    fn single_paragraph_is_one_line_plus_gap() {
        // Normal density: 16px base × 1.5 line height, 12px block gap.
        assert_eq!(extent("<p>short</p>"), 24.0 + 12.0);
    }

    #[test]
    fn long_paragraph_wraps() {
        let long = format!("<p>{}</p>", "x".repeat(400));
        assert!(extent(&long) > extent("<p>short</p>") * 3.0);
    }

    #[test]
    fn code_block_counts_lines_at_code_size() {
        let code = "<pre><code>line one\nline two\nline three</code></pre>";
        // 3 lines × 13px × 1.4 + 12px gap.
        let expected = 3.0 * 13.0 * 1.4 + 12.0;
        assert!((extent(code) - expected).abs() < 1e-3);
    }

    #[test]
    fn table_rows_include_padding() {
        let table = "<table><tr><td>a</td></tr><tr><td>b</td></tr></table>";
        // 2 rows × (24px line + 2 × 6px padding).
        assert_eq!(extent(table), 2.0 * (24.0 + 12.0));
    }

    #[test]
    fn density_orders_extent() {
        let doc = "<p>one</p><p>two</p><p>three</p>";
        let mut compact = ParamStore::default();
        compact.set(Field::Density, "compact");
        let mut roomy = ParamStore::default();
        roomy.set(Field::Density, "roomy");
        let estimator = FragmentEstimator;
        let c = estimator.extent(doc, compact.live(), &compact.live().scale());
        let n = extent(doc);
        let r = estimator.extent(doc, roomy.live(), &roomy.live().scale());
        assert!(c < n && n < r);
    }

    #[test]
    fn zoom_scales_extent() {
        let doc = "<h1>Title</h1><p>body</p>";
        let mut zoomed = ParamStore::default();
        zoomed.set(Field::PreviewZoom, "2.0");
        let estimator = FragmentEstimator;
        let at_two = estimator.extent(doc, zoomed.live(), &zoomed.live().scale());
        assert!((at_two - 2.0 * extent(doc)).abs() < 1e-3);
    }

    #[test]
    fn scanner_survives_malformed_markup() {
        assert!(extent("<p>unclosed") > 0.0);
        assert!(extent("<<<>>><p>x</p") > 0.0);
        assert_eq!(extent("<!-- comment only -->"), 0.0);
    }

    #[test]
    fn headings_outrank_paragraph_lines() {
        assert!(extent("<h1>T</h1>") > extent("<p>T</p>"));
    }
}
