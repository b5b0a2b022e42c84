//! Content description with a raw and an operation mode.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Content given either verbatim or through a named operation.
///
/// Serialized as a bare string for raw content, or as a single-entry map
/// `{ "<operation>": "<value>" }` otherwise:
///
/// ```toml
/// text = "hello"
/// file = { template = "greeting.txt" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "TextContainerRepr", into = "TextContainerRepr")]
pub enum TextContainer {
    /// The value is the content.
    Raw(String),
    /// The value is interpreted by `operation`.
    Operation { operation: String, text: String },
}

impl TextContainer {
    pub fn raw(text: impl Into<String>) -> Self {
        TextContainer::Raw(text.into())
    }

    pub fn template(text: impl Into<String>) -> Self {
        Self::with_operation("template", text)
    }

    pub fn with_operation(operation: impl Into<String>, text: impl Into<String>) -> Self {
        TextContainer::Operation {
            operation: operation.into(),
            text: text.into(),
        }
    }

    pub fn is_raw_text(&self) -> bool {
        matches!(self, TextContainer::Raw(_))
    }

    /// Name of the operation, `None` in raw mode.
    pub fn operation(&self) -> Option<&str> {
        match self {
            TextContainer::Raw(_) => None,
            TextContainer::Operation { operation, .. } => Some(operation),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            TextContainer::Raw(text) => text,
            TextContainer::Operation { text, .. } => text,
        }
    }
}

impl fmt::Display for TextContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextContainer::Raw(text) => write!(f, "{text:?}"),
            TextContainer::Operation { operation, text } => write!(f, "{operation}({text:?})"),
        }
    }
}

#[derive(Clone, Deserialize, Serialize)]
#[serde(untagged)]
enum TextContainerRepr {
    Raw(String),
    Operation(BTreeMap<String, String>),
}

impl TryFrom<TextContainerRepr> for TextContainer {
    type Error = String;

    fn try_from(repr: TextContainerRepr) -> Result<Self, Self::Error> {
        match repr {
            TextContainerRepr::Raw(text) => Ok(TextContainer::Raw(text)),
            TextContainerRepr::Operation(map) => {
                if map.len() != 1 {
                    return Err(format!(
                        "expected exactly one operation, found {}",
                        map.len()
                    ));
                }
                let (operation, text) = map
                    .into_iter()
                    .next()
                    .ok_or_else(|| "expected exactly one operation".to_string())?;
                Ok(TextContainer::Operation { operation, text })
            }
        }
    }
}

impl From<TextContainer> for TextContainerRepr {
    fn from(container: TextContainer) -> Self {
        match container {
            TextContainer::Raw(text) => TextContainerRepr::Raw(text),
            TextContainer::Operation { operation, text } => {
                TextContainerRepr::Operation(BTreeMap::from([(operation, text)]))
            }
        }
    }
}
