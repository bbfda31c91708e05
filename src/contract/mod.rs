//! Contract and itinerary documents.
//!
//! Templates produce a [`Document`]: an ordered list of styled text blocks.
//! A [`DocumentRenderer`] turns that list into PDF bytes. Two engines exist:
//! - `PdfRenderEngine` - built-in layout over the PDF base-14 Helvetica-Bold font
//! - `TypstRenderEngine` - emits Typst markup and compiles it with the Typst CLI

pub mod builder;
pub mod common;
pub mod engine;
pub mod itinerary;
pub mod metrics;
pub mod template;
pub mod typst;

pub use builder::DocumentBuilder;
pub use engine::{DocumentRenderer, PdfRenderEngine};
pub use template::{contract_document, ContractFields, ContractSettings};
pub use typst::TypstRenderEngine;

use thiserror::Error;

/// Errors that can occur during document generation.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("document has no text content")]
    EmptyDocument,
    #[error("failed to create temporary directory: {0}")]
    TempDir(#[source] std::io::Error),
    #[error("failed to write Typst source: {0}")]
    WriteTypst(#[source] std::io::Error),
    #[error("Typst CLI execution failed: {0}")]
    TypstIo(#[source] std::io::Error),
    #[error("Typst CLI exited with status {0}")]
    TypstExit(i32),
    #[error("failed to read generated PDF: {0}")]
    ReadPdf(#[source] std::io::Error),
    #[error("render task aborted: {0}")]
    Task(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// A run of text set in one size and alignment. Wrapped by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub text: String,
    pub size: f32,
    pub align: Align,
    pub underline: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Text(TextBlock),
    /// Vertical space, in lines of the most recent font size.
    Gap(f32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub title: String,
    pub blocks: Vec<Block>,
}

impl Document {
    /// Text of every text block, in order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Text(text) => Some(text.text.as_str()),
            Block::Gap(_) => None,
        })
    }

    pub fn text_blocks(&self) -> impl Iterator<Item = &TextBlock> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Text(text) => Some(text),
            Block::Gap(_) => None,
        })
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.texts().any(|text| text.contains(needle))
    }

    pub fn is_empty(&self) -> bool {
        self.texts().next().is_none()
    }
}

/// Result of a successful document generation.
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub filename: String,
    pub pdf: Vec<u8>,
}
