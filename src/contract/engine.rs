//! Built-in PDF engine.
//!
//! Lays blocks out top to bottom on A4 pages the way the contract was
//! originally typeset (50pt margins, bold Helvetica, greedy word wrap) and
//! serializes them with `pdf-writer`. The output carries no timestamps or
//! random identifiers, so equal documents give equal bytes.

use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str, TextStr};

use super::metrics::{self, ASCENT, LINE_HEIGHT};
use super::{Align, Block, Document, GeneratorError};

const FONT_NAME: Name<'static> = Name(b"F1");
const DEFAULT_SIZE: f32 = 12.0;

/// Turns a [`Document`] into PDF bytes.
pub trait DocumentRenderer: Send + Sync {
    fn render(&self, document: &Document) -> Result<Vec<u8>, GeneratorError>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl PageGeometry {
    pub const A4: PageGeometry = PageGeometry {
        width: 595.28,
        height: 841.89,
        margin: 50.0,
    };

    fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::A4
    }
}

/// One wrapped line in page coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub x: f32,
    pub baseline: f32,
    pub size: f32,
    pub width: f32,
    pub underline: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaidOutPage {
    pub lines: Vec<PlacedLine>,
}

#[derive(Debug, Clone, Default)]
pub struct PdfRenderEngine {
    geometry: PageGeometry,
}

impl PdfRenderEngine {
    pub fn new(geometry: PageGeometry) -> Self {
        Self { geometry }
    }

    /// Position every line of the document.
    pub fn layout(&self, document: &Document) -> Vec<LaidOutPage> {
        let geometry = self.geometry;
        let top = geometry.height - geometry.margin;
        let bottom = geometry.margin;
        let max_width = geometry.content_width();

        let mut pages = vec![LaidOutPage::default()];
        let mut cursor = top;
        let mut current_size = DEFAULT_SIZE;

        for block in &document.blocks {
            match block {
                Block::Gap(lines) => {
                    cursor -= current_size * LINE_HEIGHT * lines;
                }
                Block::Text(text) => {
                    current_size = text.size;
                    let line_height = text.size * LINE_HEIGHT;
                    for line in wrap(&text.text, text.size, max_width) {
                        if cursor - line_height < bottom {
                            if pages.last().is_some_and(|page| !page.lines.is_empty()) {
                                pages.push(LaidOutPage::default());
                            }
                            cursor = top;
                        }
                        let width = metrics::text_width(&line, text.size);
                        let x = match text.align {
                            Align::Left => geometry.margin,
                            Align::Center => geometry.margin + (max_width - width) / 2.0,
                            Align::Right => geometry.margin + max_width - width,
                        };
                        if let Some(page) = pages.last_mut() {
                            page.lines.push(PlacedLine {
                                text: line,
                                x,
                                baseline: cursor - text.size * ASCENT,
                                size: text.size,
                                width,
                                underline: text.underline,
                            });
                        }
                        cursor -= line_height;
                    }
                }
            }
        }

        pages
    }

    fn write(&self, title: &str, pages: &[LaidOutPage]) -> Vec<u8> {
        let catalog_id = Ref::new(1);
        let page_tree_id = Ref::new(2);
        let font_id = Ref::new(3);
        let info_id = Ref::new(4);
        let page_ids: Vec<(Ref, Ref)> = (0..pages.len() as i32)
            .map(|index| (Ref::new(5 + 2 * index), Ref::new(6 + 2 * index)))
            .collect();

        let mut pdf = Pdf::new();
        pdf.catalog(catalog_id).pages(page_tree_id);
        pdf.pages(page_tree_id)
            .kids(page_ids.iter().map(|(page_id, _)| *page_id))
            .count(pages.len() as i32);
        pdf.type1_font(font_id)
            .base_font(Name(b"Helvetica-Bold"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
        pdf.document_info(info_id)
            .title(TextStr(title))
            .producer(TextStr(env!("CARGO_PKG_NAME")));

        for (page, (page_id, content_id)) in pages.iter().zip(&page_ids) {
            let mut writer = pdf.page(*page_id);
            writer.media_box(Rect::new(0.0, 0.0, self.geometry.width, self.geometry.height));
            writer.parent(page_tree_id);
            writer.contents(*content_id);
            writer.resources().fonts().pair(FONT_NAME, font_id);
            writer.finish();

            let content = page_content(page);
            pdf.stream(*content_id, &content);
        }

        pdf.finish()
    }
}

impl DocumentRenderer for PdfRenderEngine {
    fn render(&self, document: &Document) -> Result<Vec<u8>, GeneratorError> {
        if document.is_empty() {
            return Err(GeneratorError::EmptyDocument);
        }
        let pages = self.layout(document);
        Ok(self.write(&document.title, &pages))
    }
}

fn page_content(page: &LaidOutPage) -> Vec<u8> {
    let mut content = Content::new();
    for line in page.lines.iter().filter(|line| !line.text.is_empty()) {
        let encoded = metrics::encode_win_ansi(&line.text);
        content.begin_text();
        content.set_font(FONT_NAME, line.size);
        content.next_line(line.x, line.baseline);
        content.show(Str(encoded.as_slice()));
        content.end_text();

        if line.underline {
            let y = line.baseline - line.size * 0.12;
            content.set_line_width(line.size / 20.0);
            content.move_to(line.x, y);
            content.line_to(line.x + line.width, y);
            content.stroke();
        }
    }
    content.finish()
}

/// Greedy word wrap that keeps runs of spaces inside a line.
fn wrap(text: &str, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        for token in paragraph.split_inclusive(' ') {
            let token = if current.is_empty() { token.trim_start() } else { token };
            let candidate = format!("{current}{token}");
            if current.is_empty() || metrics::text_width(candidate.trim_end(), size) <= max_width {
                current = candidate;
            } else {
                lines.push(current.trim_end().to_string());
                current = token.trim_start().to_string();
            }
            while metrics::text_width(current.trim_end(), size) > max_width {
                let (head, tail) = split_at_width(&current, size, max_width);
                lines.push(head);
                current = tail;
            }
        }
        lines.push(current.trim_end().to_string());
    }
    lines
}

/// Split a word that is wider than the line on its own.
fn split_at_width(text: &str, size: f32, max_width: f32) -> (String, String) {
    let mut width = 0.0;
    let mut split = 0;
    for (index, ch) in text.char_indices() {
        let advance = f32::from(metrics::char_width(ch)) * size / 1000.0;
        if width + advance > max_width && index > 0 {
            break;
        }
        width += advance;
        split = index + ch.len_utf8();
    }
    (text[..split].to_string(), text[split..].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::DocumentBuilder;

    fn sample() -> Document {
        let mut builder = DocumentBuilder::new("Muestra");
        builder
            .heading(12.0, "DECLARACIONES")
            .gap(0.5)
            .text(10.0, "1. QUE ES UNA AGENCIA DE VIAJES.")
            .right(10.0, "TURISTA");
        builder.build()
    }

    #[test]
    fn test_wrap_keeps_short_text_on_one_line() {
        assert_eq!(wrap("PRESTACION  DEL SERVICIO", 10.0, 495.0), vec!["PRESTACION  DEL SERVICIO"]);
    }

    #[test]
    fn test_wrap_breaks_long_text_within_width() {
        let text = "PALABRA ".repeat(60);
        let lines = wrap(&text, 10.0, 200.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(metrics::text_width(line, 10.0) <= 200.0, "line too wide: {line}");
            assert!(!line.starts_with(' '));
        }
    }

    #[test]
    fn test_wrap_splits_single_overlong_word() {
        let word = "X".repeat(80);
        let lines = wrap(&word, 10.0, 100.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn test_wrap_preserves_explicit_newlines() {
        assert_eq!(wrap("uno\ndos", 12.0, 495.0), vec!["uno", "dos"]);
    }

    #[test]
    fn test_layout_alignment() {
        let engine = PdfRenderEngine::default();
        let pages = engine.layout(&sample());
        assert_eq!(pages.len(), 1);
        let lines = &pages[0].lines;
        assert_eq!(lines.len(), 3);

        let geometry = PageGeometry::A4;
        let heading = &lines[0];
        let centre = heading.x + heading.width / 2.0;
        assert!((centre - geometry.width / 2.0).abs() < 0.01);
        assert!(heading.underline);

        assert_eq!(lines[1].x, geometry.margin);
        let right = &lines[2];
        assert!((right.x + right.width - (geometry.width - geometry.margin)).abs() < 0.01);
        assert!(lines[0].baseline > lines[1].baseline);
        assert!(lines[1].baseline > lines[2].baseline);
    }

    #[test]
    fn test_layout_starts_new_page_when_full() {
        let mut builder = DocumentBuilder::new("Largo");
        for index in 0..120 {
            builder.text(10.0, format!("RENGLON {index}"));
        }
        let pages = PdfRenderEngine::default().layout(&builder.build());
        assert!(pages.len() >= 2);
        let total: usize = pages.iter().map(|page| page.lines.len()).sum();
        assert_eq!(total, 120);
        for page in &pages {
            for line in &page.lines {
                assert!(line.baseline > PageGeometry::A4.margin - 10.0);
            }
        }
    }

    #[test]
    fn test_render_produces_pdf_bytes() {
        let bytes = PdfRenderEngine::default().render(&sample()).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        let tail = String::from_utf8_lossy(&bytes[bytes.len().saturating_sub(32)..]).to_string();
        assert!(tail.contains("%%EOF"));
        assert!(bytes.windows(b"Helvetica-Bold".len()).any(|w| w == b"Helvetica-Bold"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let engine = PdfRenderEngine::default();
        assert_eq!(engine.render(&sample()).unwrap(), engine.render(&sample()).unwrap());
    }

    #[test]
    fn test_render_rejects_empty_document() {
        let mut builder = DocumentBuilder::new("Vacio");
        builder.gap(2.0);
        let result = PdfRenderEngine::default().render(&builder.build());
        assert!(matches!(result, Err(GeneratorError::EmptyDocument)));
    }
}
