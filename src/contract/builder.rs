use super::{Align, Block, Document, TextBlock};

/// Accumulates blocks in reading order.
#[derive(Debug)]
pub struct DocumentBuilder {
    title: String,
    blocks: Vec<Block>,
}

impl DocumentBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            blocks: Vec::new(),
        }
    }

    fn push(&mut self, size: f32, align: Align, underline: bool, text: impl Into<String>) -> &mut Self {
        self.blocks.push(Block::Text(TextBlock {
            text: text.into(),
            size,
            align,
            underline,
        }));
        self
    }

    pub fn text(&mut self, size: f32, text: impl Into<String>) -> &mut Self {
        self.push(size, Align::Left, false, text)
    }

    pub fn centered(&mut self, size: f32, text: impl Into<String>) -> &mut Self {
        self.push(size, Align::Center, false, text)
    }

    pub fn right(&mut self, size: f32, text: impl Into<String>) -> &mut Self {
        self.push(size, Align::Right, false, text)
    }

    /// Centered and underlined.
    pub fn heading(&mut self, size: f32, text: impl Into<String>) -> &mut Self {
        self.push(size, Align::Center, true, text)
    }

    pub fn underlined(&mut self, size: f32, text: impl Into<String>) -> &mut Self {
        self.push(size, Align::Left, true, text)
    }

    /// One left-aligned block per row.
    pub fn rows<I, S>(&mut self, size: f32, rows: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for row in rows {
            self.text(size, row);
        }
        self
    }

    pub fn gap(&mut self, lines: f32) -> &mut Self {
        self.blocks.push(Block::Gap(lines));
        self
    }

    pub fn build(self) -> Document {
        Document {
            title: self.title,
            blocks: self.blocks,
        }
    }
}
