use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockError {
    #[error("heading level must be 1, 2 or 3, got {0}")]
    InvalidHeadingLevel(u8),
    #[error("no block with id {0}")]
    NotFound(String),
    #[error("block {0} is not a list")]
    NotAList(String),
    #[error("block {0} cannot be replaced by an unknown block")]
    UnknownReplacement(String),
}

/// Heading level, restricted to `h1`..`h3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct HeadingLevel(u8);

impl HeadingLevel {
    pub const H1: HeadingLevel = HeadingLevel(1);
    pub const H2: HeadingLevel = HeadingLevel(2);
    pub const H3: HeadingLevel = HeadingLevel(3);

    pub fn new(level: u8) -> Result<Self, BlockError> {
        match level {
            1..=3 => Ok(HeadingLevel(level)),
            other => Err(BlockError::InvalidHeadingLevel(other)),
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn tag(self) -> &'static str {
        match self.0 {
            1 => "h1",
            3 => "h3",
            _ => "h2",
        }
    }
}

impl Default for HeadingLevel {
    fn default() -> Self {
        HeadingLevel::H2
    }
}

impl TryFrom<u8> for HeadingLevel {
    type Error = BlockError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        HeadingLevel::new(level)
    }
}

impl From<HeadingLevel> for u8 {
    fn from(level: HeadingLevel) -> u8 {
        level.0
    }
}

/// One typed unit of editable content.
///
/// `Text` and `Quote` carry inline markup (bold, links, ...) verbatim with
/// line breaks as `\n`. `Heading` text and list items are plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    Text {
        id: String,
        text: String,
    },
    Heading {
        id: String,
        level: HeadingLevel,
        text: String,
    },
    Image {
        id: String,
        src: String,
        alt: String,
    },
    List {
        id: String,
        ordered: bool,
        items: Vec<String>,
    },
    Quote {
        id: String,
        text: String,
    },
    /// A block type this version does not know. Kept so editor payloads from
    /// newer clients deserialize; it renders to nothing.
    #[serde(other)]
    Unknown,
}

/// Block variants without payload, used to add new blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Text,
    Heading,
    Image,
    List,
    Quote,
}

pub fn new_block_id() -> String {
    Uuid::new_v4().to_string()
}

impl Block {
    pub fn text(text: impl Into<String>) -> Self {
        Block::Text {
            id: new_block_id(),
            text: text.into(),
        }
    }

    pub fn heading(level: HeadingLevel, text: impl Into<String>) -> Self {
        Block::Heading {
            id: new_block_id(),
            level,
            text: text.into(),
        }
    }

    pub fn image(src: impl Into<String>, alt: impl Into<String>) -> Self {
        Block::Image {
            id: new_block_id(),
            src: src.into(),
            alt: alt.into(),
        }
    }

    pub fn list(ordered: bool, items: Vec<String>) -> Self {
        Block::List {
            id: new_block_id(),
            ordered,
            items,
        }
    }

    pub fn quote(text: impl Into<String>) -> Self {
        Block::Quote {
            id: new_block_id(),
            text: text.into(),
        }
    }

    /// A fresh block with the editor's default payload for `kind`.
    pub fn empty(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Text => Block::text(""),
            BlockKind::Heading => Block::heading(HeadingLevel::default(), ""),
            BlockKind::Image => Block::image("", ""),
            BlockKind::List => Block::list(false, Vec::new()),
            BlockKind::Quote => Block::quote(""),
        }
    }

    pub fn kind(&self) -> Option<BlockKind> {
        match self {
            Block::Text { .. } => Some(BlockKind::Text),
            Block::Heading { .. } => Some(BlockKind::Heading),
            Block::Image { .. } => Some(BlockKind::Image),
            Block::List { .. } => Some(BlockKind::List),
            Block::Quote { .. } => Some(BlockKind::Quote),
            Block::Unknown => None,
        }
    }

    /// The block id; unknown blocks have none and report `""`.
    pub fn id(&self) -> &str {
        match self {
            Block::Text { id, .. }
            | Block::Heading { id, .. }
            | Block::Image { id, .. }
            | Block::List { id, .. }
            | Block::Quote { id, .. } => id,
            Block::Unknown => "",
        }
    }

    fn set_id(&mut self, new_id: String) {
        match self {
            Block::Text { id, .. }
            | Block::Heading { id, .. }
            | Block::Image { id, .. }
            | Block::List { id, .. }
            | Block::Quote { id, .. } => *id = new_id,
            Block::Unknown => {}
        }
    }

    /// Equality of type and payload, ignoring ids.
    pub fn content_eq(&self, other: &Block) -> bool {
        match (self, other) {
            (Block::Text { text: a, .. }, Block::Text { text: b, .. }) => a == b,
            (Block::Quote { text: a, .. }, Block::Quote { text: b, .. }) => a == b,
            (
                Block::Heading {
                    level: la, text: a, ..
                },
                Block::Heading {
                    level: lb, text: b, ..
                },
            ) => la == lb && a == b,
            (
                Block::Image {
                    src: sa, alt: aa, ..
                },
                Block::Image {
                    src: sb, alt: ab, ..
                },
            ) => sa == sb && aa == ab,
            (
                Block::List {
                    ordered: oa,
                    items: a,
                    ..
                },
                Block::List {
                    ordered: ob,
                    items: b,
                    ..
                },
            ) => oa == ob && a == b,
            (Block::Unknown, Block::Unknown) => true,
            _ => false,
        }
    }

    /// True for the empty text block that stands in for an empty document.
    pub fn is_empty_text(&self) -> bool {
        matches!(self, Block::Text { text, .. } if text.is_empty())
    }
}

/// Ordered sequence of blocks making up one post's editable content.
///
/// Never empty: an empty document is a single empty text block. Block ids
/// are unique within a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Block>", into = "Vec<Block>")]
pub struct Document {
    blocks: Vec<Block>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<Block>> for Document {
    fn from(blocks: Vec<Block>) -> Self {
        Document::from_blocks(blocks)
    }
}

impl From<Document> for Vec<Block> {
    fn from(doc: Document) -> Self {
        doc.blocks
    }
}

impl Document {
    /// A document holding one empty text block.
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::text("")],
        }
    }

    /// Build a document, restoring the invariants: duplicate or missing ids
    /// are regenerated and an empty sequence becomes one empty text block.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        if blocks.is_empty() {
            return Self::new();
        }
        let mut seen = std::collections::HashSet::new();
        let blocks = blocks
            .into_iter()
            .map(|mut block| {
                let needs_id = block.id().is_empty() || !seen.insert(block.id().to_string());
                if block.kind().is_some() && needs_id {
                    let id = new_block_id();
                    seen.insert(id.clone());
                    block.set_id(id);
                }
                block
            })
            .collect();
        Self { blocks }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    /// True when the document is the canonical empty document.
    pub fn is_blank(&self) -> bool {
        self.blocks.len() == 1 && self.blocks[0].is_empty_text()
    }

    pub fn get(&self, id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.kind().is_some() && b.id() == id)
    }

    fn position(&self, id: &str) -> Result<usize, BlockError> {
        self.blocks
            .iter()
            .position(|b| b.kind().is_some() && b.id() == id)
            .ok_or_else(|| BlockError::NotFound(id.to_string()))
    }

    /// Append a new default block of `kind`, returning its id.
    pub fn push(&mut self, kind: BlockKind) -> String {
        let block = Block::empty(kind);
        let id = block.id().to_string();
        self.blocks.push(block);
        id
    }

    /// Replace the payload of block `id`; the replacement keeps the old id.
    /// List items are trimmed and blank ones dropped.
    pub fn update(&mut self, id: &str, mut replacement: Block) -> Result<(), BlockError> {
        let index = self.position(id)?;
        if replacement.kind().is_none() {
            return Err(BlockError::UnknownReplacement(id.to_string()));
        }
        if let Block::List { items, .. } = &mut replacement {
            *items = clean_items(items.iter().map(String::as_str));
        }
        replacement.set_id(id.to_string());
        self.blocks[index] = replacement;
        Ok(())
    }

    /// Remove block `id`. Removing the last block leaves one empty text block.
    pub fn remove(&mut self, id: &str) -> Result<Block, BlockError> {
        let index = self.position(id)?;
        let removed = self.blocks.remove(index);
        if self.blocks.is_empty() {
            self.blocks.push(Block::text(""));
        }
        Ok(removed)
    }

    /// Swap block `id` with its predecessor; no-op at the top.
    pub fn move_up(&mut self, id: &str) -> Result<(), BlockError> {
        let index = self.position(id)?;
        if index > 0 {
            self.blocks.swap(index, index - 1);
        }
        Ok(())
    }

    /// Swap block `id` with its successor; no-op at the bottom.
    pub fn move_down(&mut self, id: &str) -> Result<(), BlockError> {
        let index = self.position(id)?;
        if index + 1 < self.blocks.len() {
            self.blocks.swap(index, index + 1);
        }
        Ok(())
    }

    /// Set list items from one-item-per-line editor input, dropping blank lines.
    pub fn set_list_items(&mut self, id: &str, raw: &str) -> Result<(), BlockError> {
        let index = self.position(id)?;
        match &mut self.blocks[index] {
            Block::List { items, .. } => {
                *items = clean_items(raw.lines());
                Ok(())
            }
            _ => Err(BlockError::NotAList(id.to_string())),
        }
    }

    /// Same block types, order and payloads, ignoring ids.
    pub fn content_eq(&self, other: &Document) -> bool {
        self.blocks.len() == other.blocks.len()
            && self
                .blocks
                .iter()
                .zip(&other.blocks)
                .all(|(a, b)| a.content_eq(b))
    }

    pub fn to_markup(&self) -> String {
        super::serialize(&self.blocks)
    }
}

fn clean_items<'a>(items: impl Iterator<Item = &'a str>) -> Vec<String> {
    items
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
