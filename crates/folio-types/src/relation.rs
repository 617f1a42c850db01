//! Relation definitions: typed, named fields applied to objects.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::EnumString;

use crate::ids::RelationKey;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive, serialize_all = "snake_case")]
pub enum RelationFormat {
    #[strum(serialize = "short_text", serialize = "text")]
    ShortText,
    LongText,
    Number,
    Status,
    Tag,
    Object,
    File,
    Checkbox,
    Date,
    Url,
    Email,
    Phone,
    Emoji,
}

impl RelationFormat {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    /// Formats whose value is a list of option ids.
    pub fn is_option_based(&self) -> bool {
        matches!(self, RelationFormat::Status | RelationFormat::Tag)
    }
}

/// A selectable option of a status or tag relation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationOption {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub key: RelationKey,
    pub name: String,
    pub format: RelationFormat,
    #[serde(default)]
    pub options: Vec<RelationOption>,
    #[serde(default)]
    pub is_hidden: bool,
}

impl Relation {
    pub fn new(key: impl Into<RelationKey>, name: impl Into<String>, format: RelationFormat) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            format,
            options: Vec::new(),
            is_hidden: false,
        }
    }

    pub fn with_options(mut self, options: Vec<RelationOption>) -> Self {
        self.options = options;
        self
    }

    pub fn option(&self, id: &str) -> Option<&RelationOption> {
        self.options.iter().find(|o| o.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_aliases() {
        assert_eq!(RelationFormat::from_str("text"), Some(RelationFormat::ShortText));
        assert_eq!(RelationFormat::from_str("STATUS"), Some(RelationFormat::Status));
        assert_eq!(RelationFormat::from_str("bogus"), None);
    }

    #[test]
    fn test_option_lookup() {
        let relation = Relation::new("status", "Status", RelationFormat::Status).with_options(vec![
            RelationOption { id: "o1".into(), text: "Done".into(), color: Some("green".into()) },
        ]);
        assert_eq!(relation.option("o1").map(|o| o.text.as_str()), Some("Done"));
        assert!(relation.option("o2").is_none());
        assert!(relation.format.is_option_based());
    }
}
