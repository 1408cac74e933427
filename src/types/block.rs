//! Layout block definitions.
//!
//! Blocks arrive from an upstream layout parser. Decoding is deliberately
//! lenient: a block with a missing or wrong-typed field still decodes, with
//! the field treated as absent or empty.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// The structural role of a layout block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    /// Section heading (levels 1-3)
    Heading,
    /// Body text; also the fallback for unknown types
    #[default]
    Paragraph,
    /// Bulleted or numbered list
    List,
    /// Table rendered as text
    Table,
    /// Figure, possibly without text
    Figure,
    /// Caption attached to a figure or table
    Caption,
}

impl BlockType {
    /// Atomic blocks always form a group of their own.
    pub fn is_atomic(&self) -> bool {
        matches!(
            self,
            BlockType::List | BlockType::Table | BlockType::Figure | BlockType::Caption
        )
    }
}

impl std::fmt::Display for BlockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockType::Heading => write!(f, "heading"),
            BlockType::Paragraph => write!(f, "paragraph"),
            BlockType::List => write!(f, "list"),
            BlockType::Table => write!(f, "table"),
            BlockType::Figure => write!(f, "figure"),
            BlockType::Caption => write!(f, "caption"),
        }
    }
}

/// Normalized heading depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

/// Map a raw heading level onto 1-3. Anything else counts as level 2.
pub fn normalize_level(level: Option<i64>) -> HeadingLevel {
    match level {
        Some(1) => HeadingLevel::H1,
        Some(3) => HeadingLevel::H3,
        _ => HeadingLevel::H2,
    }
}

/// The atomic input unit of the chunking pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutBlock {
    /// Identifier, unique within a document
    #[serde(default, deserialize_with = "lenient_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Structural role of the block
    #[serde(rename = "type", default, deserialize_with = "lenient_type")]
    pub block_type: BlockType,

    /// Raw text; empty for text-less figures
    #[serde(default, deserialize_with = "lenient_text")]
    pub text: String,

    /// Heading level, only meaningful for headings
    #[serde(default, deserialize_with = "lenient_level", skip_serializing_if = "Option::is_none")]
    pub level: Option<i64>,

    /// Source page number (1-based)
    #[serde(default, deserialize_with = "lenient_page", skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl LayoutBlock {
    /// Create a block of the given type.
    pub fn new(id: impl Into<String>, block_type: BlockType, text: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            block_type,
            text: text.into(),
            level: None,
            page: None,
        }
    }

    /// Create a heading block.
    pub fn heading(id: impl Into<String>, level: i64, text: impl Into<String>) -> Self {
        Self {
            level: Some(level),
            ..Self::new(id, BlockType::Heading, text)
        }
    }

    /// Create a paragraph block.
    pub fn paragraph(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, BlockType::Paragraph, text)
    }

    /// Set the page number.
    pub fn on_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Drop the identifier.
    pub fn without_id(mut self) -> Self {
        self.id = None;
        self
    }

    /// Whether the block carries any non-whitespace text.
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_type<'de, D>(deserializer: D) -> Result<BlockType, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

fn lenient_level<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_i64())
}

fn lenient_page<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?
        .as_u64()
        .filter(|p| *p > 0)
        .and_then(|p| u32::try_from(p).ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_level() {
        assert_eq!(normalize_level(Some(1)), HeadingLevel::H1);
        assert_eq!(normalize_level(Some(2)), HeadingLevel::H2);
        assert_eq!(normalize_level(Some(3)), HeadingLevel::H3);
        assert_eq!(normalize_level(Some(7)), HeadingLevel::H2);
        assert_eq!(normalize_level(Some(0)), HeadingLevel::H2);
        assert_eq!(normalize_level(None), HeadingLevel::H2);
    }

    #[test]
    fn test_decode_well_formed_block() {
        let block: LayoutBlock = serde_json::from_value(serde_json::json!({
            "id": "b1",
            "type": "heading",
            "text": "Intro",
            "level": 1,
            "page": 3
        }))
        .unwrap();

        assert_eq!(block, LayoutBlock::heading("b1", 1, "Intro").on_page(3));
    }

    #[test]
    fn test_decode_malformed_block() {
        let block: LayoutBlock = serde_json::from_value(serde_json::json!({
            "id": 42,
            "type": "sidebar",
            "text": ["not", "a", "string"],
            "level": "high",
            "page": -2
        }))
        .unwrap();

        assert_eq!(block.id.as_deref(), Some("42"));
        assert_eq!(block.block_type, BlockType::Paragraph);
        assert_eq!(block.text, "");
        assert_eq!(block.level, None);
        assert_eq!(block.page, None);
    }

    #[test]
    fn test_block_type_wire_names() {
        let table: BlockType = serde_json::from_str("\"table\"").unwrap();
        assert_eq!(table, BlockType::Table);
        assert_eq!(serde_json::to_string(&BlockType::Caption).unwrap(), "\"caption\"");

        let block: LayoutBlock =
            serde_json::from_value(serde_json::json!({"type": "marginalia", "text": "x"})).unwrap();
        assert_eq!(block.block_type, BlockType::Paragraph);
    }

    #[test]
    fn test_decode_missing_fields() {
        let block: LayoutBlock = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(block.id, None);
        assert_eq!(block.block_type, BlockType::Paragraph);
        assert!(!block.has_text());
    }

    #[test]
    fn test_atomic_types() {
        assert!(BlockType::Table.is_atomic());
        assert!(BlockType::Figure.is_atomic());
        assert!(BlockType::Caption.is_atomic());
        assert!(BlockType::List.is_atomic());
        assert!(!BlockType::Paragraph.is_atomic());
        assert!(!BlockType::Heading.is_atomic());
    }
}
