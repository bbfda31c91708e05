//! Typst rendering engine.
//!
//! Translates a [`Document`] into Typst markup, writes it to a temporary
//! directory and invokes the Typst CLI to compile it.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::tempdir;

use super::common::escape_typst_string;
use super::engine::DocumentRenderer;
use super::metrics::LINE_HEIGHT;
use super::{Align, Block, Document, GeneratorError};

const SOURCE_FILE: &str = "documento.typ";
const OUTPUT_FILE: &str = "documento.pdf";

#[derive(Debug, Clone)]
pub struct TypstRenderEngine {
    binary: String,
}

impl TypstRenderEngine {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Typst source for `document`. The document date is disabled so the
    /// compiled PDF only depends on the blocks.
    pub fn source(document: &Document) -> String {
        let mut source = String::new();
        let _ = writeln!(
            source,
            "#set document(title: \"{}\", date: none)",
            escape_typst_string(&document.title)
        );
        source.push_str("#set page(paper: \"a4\", margin: 50pt)\n");
        source.push_str("#set text(weight: \"bold\", lang: \"es\")\n");
        source.push_str("#set par(justify: false, leading: 0.3em, spacing: 0.3em)\n\n");

        let mut current_size = 12.0_f32;
        for block in &document.blocks {
            match block {
                Block::Gap(lines) => {
                    let _ = writeln!(source, "#v({:.2}pt)", current_size * LINE_HEIGHT * lines);
                }
                Block::Text(text) => {
                    current_size = text.size;
                    let align = match text.align {
                        Align::Left => "left",
                        Align::Center => "center",
                        Align::Right => "right",
                    };
                    let mut body = format!(
                        "text(size: {}pt, \"{}\")",
                        text.size,
                        escape_typst_string(&text.text)
                    );
                    if text.underline {
                        body = format!("underline({body})");
                    }
                    let _ = writeln!(source, "#align({align}, {body})");
                }
            }
        }
        source
    }
}

impl Default for TypstRenderEngine {
    fn default() -> Self {
        Self::new("typst")
    }
}

impl DocumentRenderer for TypstRenderEngine {
    fn render(&self, document: &Document) -> Result<Vec<u8>, GeneratorError> {
        if document.is_empty() {
            return Err(GeneratorError::EmptyDocument);
        }

        let temp_dir = tempdir().map_err(GeneratorError::TempDir)?;
        let typ_path = temp_dir.path().join(SOURCE_FILE);
        fs::write(&typ_path, Self::source(document)).map_err(GeneratorError::WriteTypst)?;

        compile(&self.binary, temp_dir.path())
    }
}

fn compile(binary: &str, dir: &Path) -> Result<Vec<u8>, GeneratorError> {
    let output_path = dir.join(OUTPUT_FILE);

    let status = Command::new(binary)
        .arg("compile")
        .arg(dir.join(SOURCE_FILE))
        .arg(&output_path)
        .current_dir(dir)
        .status()
        .map_err(GeneratorError::TypstIo)?;

    if !status.success() {
        return Err(GeneratorError::TypstExit(status.code().unwrap_or(-1)));
    }

    fs::read(&output_path).map_err(GeneratorError::ReadPdf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::DocumentBuilder;

    #[test]
    fn test_source_maps_blocks_to_markup() {
        let mut builder = DocumentBuilder::new("Contrato \"12\"");
        builder
            .heading(12.0, "DECLARACIONES")
            .gap(1.0)
            .text(10.0, "SE \"INVOLUCRARA\"")
            .right(10.0, "TURISTA");
        let source = TypstRenderEngine::source(&builder.build());

        assert!(source.contains("#set document(title: \"Contrato \\\"12\\\"\", date: none)"));
        assert!(source.contains("#align(center, underline(text(size: 12pt, \"DECLARACIONES\")))"));
        assert!(source.contains("#v(13.87pt)"));
        assert!(source.contains("#align(left, text(size: 10pt, \"SE \\\"INVOLUCRARA\\\"\"))"));
        assert!(source.contains("#align(right, text(size: 10pt, \"TURISTA\"))"));
    }

    #[test]
    fn test_missing_binary_is_an_io_error() {
        let mut builder = DocumentBuilder::new("Prueba");
        builder.text(10.0, "texto");
        let engine = TypstRenderEngine::new("/nonexistent/typst-binary");
        let result = engine.render(&builder.build());
        assert!(matches!(result, Err(GeneratorError::TypstIo(_))));
    }

    #[test]
    fn test_empty_document_is_rejected_before_compiling() {
        let engine = TypstRenderEngine::new("/nonexistent/typst-binary");
        let result = engine.render(&DocumentBuilder::new("Vacio").build());
        assert!(matches!(result, Err(GeneratorError::EmptyDocument)));
    }
}
