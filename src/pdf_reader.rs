use std::collections::BTreeMap;
use std::path::Path;

use encoding_rs::{BIG5, UTF_16BE};
use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};
use tracing::debug;

use crate::error::ExtractError;
use crate::geometry::Rect;
use crate::model::{TextFragment, render_plain_text};
use crate::reader::DocumentReader;

/// Glyph widths are not read from font programs; every glyph is assumed to
/// advance by this fraction of the font size.
const GLYPH_WIDTH_RATIO: f64 = 0.5;

/// `TJ` adjustments wider than this (thousandths of text space) read as a word gap.
const WORD_GAP_ADJUSTMENT: f64 = 100.0;

fn looks_decoding_broken(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }

    if text.contains("?Identity-H Unimplemented?") {
        return true;
    }

    let total = text.chars().count();
    let replacement = text.matches('\u{FFFD}').count();
    let control = text
        .chars()
        .filter(|ch| ch.is_control() && !matches!(ch, '\n' | '\r' | '\t'))
        .count();

    replacement * 8 > total || control * 5 > total
}

fn decode_pdf_bytes(encoding: Option<&str>, bytes: &[u8]) -> String {
    let decoded = Document::decode_text(encoding, bytes);
    if !looks_decoding_broken(&decoded) {
        return decoded;
    }

    if bytes.starts_with(&[0xFE, 0xFF]) || bytes.starts_with(&[0xFF, 0xFE]) {
        let bytes = if bytes.len() > 2 { &bytes[2..] } else { bytes };
        let (utf16, had_errors) = UTF_16BE.decode_without_bom_handling(bytes);
        if !had_errors && !utf16.is_empty() {
            return utf16.into_owned();
        }
    }

    if let Some(name) = encoding {
        let lower = name.to_ascii_lowercase();

        if lower.contains("utf16")
            || lower.contains("ucs2")
            || lower.contains("identity-h")
            || lower.contains("unicode")
        {
            let (utf16, had_errors) = UTF_16BE.decode_without_bom_handling(bytes);
            if !had_errors && !utf16.is_empty() {
                return utf16.into_owned();
            }
        }

        if lower.contains("big5") || lower.contains("b5") || lower.contains("eten") {
            let (big5, _, had_errors) = BIG5.decode(bytes);
            if !had_errors && !big5.is_empty() {
                return big5.into_owned();
            }
        }
    }

    String::from_utf8_lossy(bytes).to_string()
}

fn number(object: Option<&Object>) -> Option<f64> {
    match object? {
        #[allow(clippy::cast_precision_loss)]
        Object::Integer(value) => Some(*value as f64),
        Object::Real(value) => Some(f64::from(*value)),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
}

impl Matrix {
    const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn from_operands(operands: &[Object]) -> Option<Self> {
        Some(Self {
            a: number(operands.first())?,
            b: number(operands.get(1))?,
            c: number(operands.get(2))?,
            d: number(operands.get(3))?,
            e: number(operands.get(4))?,
            f: number(operands.get(5))?,
        })
    }

    /// Pre-multiplies by a translation in text space.
    fn translate(self, tx: f64, ty: f64) -> Self {
        Self {
            e: tx * self.a + ty * self.c + self.e,
            f: tx * self.b + ty * self.d + self.f,
            ..self
        }
    }

    fn horizontal_scale(&self) -> f64 {
        self.a.hypot(self.b)
    }

    fn vertical_scale(&self) -> f64 {
        self.c.hypot(self.d)
    }
}

struct TextState<'a> {
    matrix: Matrix,
    line: Matrix,
    font_size: f64,
    leading: f64,
    encoding: Option<&'a str>,
}

impl TextState<'_> {
    fn begin(&mut self) {
        self.matrix = Matrix::IDENTITY;
        self.line = Matrix::IDENTITY;
    }

    fn move_line(&mut self, tx: f64, ty: f64) {
        self.line = self.line.translate(tx, ty);
        self.matrix = self.line;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.leading);
    }

    fn glyph_advance(&self, text: &str) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let glyphs = text.chars().count() as f64;
        glyphs * self.font_size * GLYPH_WIDTH_RATIO
    }

    fn show(&mut self, text: String, fragments: &mut Vec<TextFragment>) {
        let advance = self.glyph_advance(&text);
        self.emit(text, advance, fragments);
    }

    /// Emits a fragment at the pen and advances it by `advance` in text space.
    fn emit(&mut self, text: String, advance: f64, fragments: &mut Vec<TextFragment>) {
        let x = self.matrix.e;
        let y = self.matrix.f;
        let width = advance * self.matrix.horizontal_scale();
        let height = self.font_size * self.matrix.vertical_scale();
        if !text.is_empty() {
            fragments.push(TextFragment::new(
                text,
                Rect::new(x, y, x + width, y + height),
            ));
        }

        self.matrix = self.matrix.translate(advance, 0.0);
    }

    fn decode_strings(&self, operands: &[Object]) -> String {
        operands
            .iter()
            .filter_map(|operand| match operand {
                Object::String(bytes, _) => Some(decode_pdf_bytes(self.encoding, bytes)),
                _ => None,
            })
            .collect()
    }

    fn show_array(&mut self, items: &[Object], fragments: &mut Vec<TextFragment>) {
        let mut text = String::new();
        let mut advance = 0.0;
        for item in items {
            match item {
                Object::String(bytes, _) => {
                    let decoded = decode_pdf_bytes(self.encoding, bytes);
                    advance += self.glyph_advance(&decoded);
                    text.push_str(&decoded);
                }
                other => {
                    if let Some(value) = number(Some(other)) {
                        advance -= value / 1000.0 * self.font_size;
                        if value < -WORD_GAP_ADJUSTMENT {
                            text.push(' ');
                        }
                    }
                }
            }
        }
        self.emit(text.trim_end().to_string(), advance, fragments);
    }
}

/// Reader over a PDF loaded with `lopdf`.
pub struct PdfDocument {
    document: Document,
    pages: BTreeMap<u32, ObjectId>,
}

impl PdfDocument {
    pub fn open(path: &Path) -> Result<Self, ExtractError> {
        Ok(Self::from_document(Document::load(path)?))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ExtractError> {
        Ok(Self::from_document(Document::load_mem(bytes)?))
    }

    fn from_document(document: Document) -> Self {
        let pages = document.get_pages();
        debug!(pages = pages.len(), "loaded PDF");
        Self { document, pages }
    }

    fn page_id(&self, page: u32) -> Result<ObjectId, ExtractError> {
        self.pages
            .get(&page)
            .copied()
            .ok_or(ExtractError::PageNotFound(page))
    }
}

impl DocumentReader for PdfDocument {
    fn page_count(&self) -> u32 {
        u32::try_from(self.pages.len()).unwrap_or(u32::MAX)
    }

    fn page_text(&self, page: u32) -> Result<String, ExtractError> {
        match self.page_fragments(page) {
            Ok(fragments) => Ok(render_plain_text(&fragments)),
            Err(ExtractError::PageFragments { page, reason }) => {
                Err(ExtractError::PageText { page, reason })
            }
            Err(error) => Err(error),
        }
    }

    fn page_fragments(&self, page: u32) -> Result<Vec<TextFragment>, ExtractError> {
        let page_id = self.page_id(page)?;
        let failure = |error: lopdf::Error| ExtractError::PageFragments {
            page,
            reason: error.to_string(),
        };

        let raw_content = self.document.get_page_content(page_id).map_err(failure)?;
        let content = Content::decode(&raw_content).map_err(failure)?;
        let encodings = self
            .document
            .get_page_fonts(page_id)
            .into_iter()
            .map(|(name, font)| (name, font.get_font_encoding()))
            .collect::<BTreeMap<Vec<u8>, &str>>();

        let mut state = TextState {
            matrix: Matrix::IDENTITY,
            line: Matrix::IDENTITY,
            font_size: 0.0,
            leading: 0.0,
            encoding: None,
        };
        let mut fragments = Vec::new();
        for operation in content.operations {
            let operands = operation.operands.as_slice();
            match operation.operator.as_str() {
                "BT" => state.begin(),
                "Tf" => {
                    if let Some(font_name) = operands
                        .first()
                        .and_then(|operand| operand.as_name().ok())
                    {
                        state.encoding = encodings.get(font_name).copied();
                    }
                    if let Some(size) = number(operands.get(1)) {
                        state.font_size = size;
                    }
                }
                "TL" => {
                    if let Some(leading) = number(operands.first()) {
                        state.leading = leading;
                    }
                }
                "Td" | "TD" => {
                    if let (Some(tx), Some(ty)) = (number(operands.first()), number(operands.get(1)))
                    {
                        if operation.operator == "TD" {
                            state.leading = -ty;
                        }
                        state.move_line(tx, ty);
                    }
                }
                "Tm" => {
                    if let Some(matrix) = Matrix::from_operands(operands) {
                        state.matrix = matrix;
                        state.line = matrix;
                    }
                }
                "T*" => state.next_line(),
                "Tj" => {
                    let text = state.decode_strings(operands);
                    state.show(text, &mut fragments);
                }
                "'" => {
                    state.next_line();
                    let text = state.decode_strings(operands);
                    state.show(text, &mut fragments);
                }
                "\"" => {
                    state.next_line();
                    let text = state.decode_strings(operands.get(2..).unwrap_or_default());
                    state.show(text, &mut fragments);
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = operands.first() {
                        state.show_array(items, &mut fragments);
                    }
                }
                _ => {}
            }
        }

        debug!(page, fragments = fragments.len(), "extracted page fragments");
        Ok(fragments)
    }
}
