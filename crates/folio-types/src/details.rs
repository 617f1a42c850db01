//! Per-object details: a loosely typed field bag with typed accessors.
//!
//! Details arrive from the sync layer as arbitrary JSON maps and are merged
//! key by key. Numbers may come in as floats, so numeric accessors accept
//! both integer and float encodings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::EnumString;

use crate::ids::{ObjectId, RelationKey};

/// Well-known detail keys.
pub mod keys {
    pub const NAME: &str = "name";
    pub const ICON_EMOJI: &str = "iconEmoji";
    pub const ICON_IMAGE: &str = "iconImage";
    pub const COVER_ID: &str = "coverId";
    pub const COVER_TYPE: &str = "coverType";
    pub const LAYOUT: &str = "layout";
    pub const IS_ARCHIVED: &str = "isArchived";
    pub const IS_DELETED: &str = "isDeleted";
    pub const FEATURED_RELATIONS: &str = "featuredRelations";
    pub const TYPE: &str = "type";
    pub const DESCRIPTION: &str = "description";
    pub const DONE: &str = "done";
}

/// Object layout, encoded on the wire as a numeric code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive, serialize_all = "snake_case")]
pub enum ObjectLayout {
    Basic,
    Profile,
    Todo,
    Set,
    ObjectType,
    Relation,
    File,
    Dashboard,
    Image,
    Note,
}

impl ObjectLayout {
    pub fn from_code(code: i64) -> Option<Self> {
        Some(match code {
            0 => ObjectLayout::Basic,
            1 => ObjectLayout::Profile,
            2 => ObjectLayout::Todo,
            3 => ObjectLayout::Set,
            4 => ObjectLayout::ObjectType,
            5 => ObjectLayout::Relation,
            6 => ObjectLayout::File,
            7 => ObjectLayout::Dashboard,
            8 => ObjectLayout::Image,
            9 => ObjectLayout::Note,
            _ => return None,
        })
    }

    pub fn code(&self) -> i64 {
        match self {
            ObjectLayout::Basic => 0,
            ObjectLayout::Profile => 1,
            ObjectLayout::Todo => 2,
            ObjectLayout::Set => 3,
            ObjectLayout::ObjectType => 4,
            ObjectLayout::Relation => 5,
            ObjectLayout::File => 6,
            ObjectLayout::Dashboard => 7,
            ObjectLayout::Image => 8,
            ObjectLayout::Note => 9,
        }
    }
}

/// How `coverId` is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverType {
    /// Uploaded image, `coverId` is a file hash.
    Image,
    Color,
    Gradient,
    /// Image shipped with the app, `coverId` is its name.
    Bundled,
}

impl CoverType {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(CoverType::Image),
            2 => Some(CoverType::Color),
            3 => Some(CoverType::Gradient),
            4 => Some(CoverType::Bundled),
            _ => None,
        }
    }
}

/// Field bag describing one object.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectDetails(BTreeMap<String, Value>);

impl ObjectDetails {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Overwrite every key present in `other`; keys absent there are kept.
    pub fn merge(&mut self, other: &ObjectDetails) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn unset<S: AsRef<str>>(&mut self, keys: &[S]) {
        for key in keys {
            self.0.remove(key.as_ref());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    fn get_str(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    fn get_i64(&self, key: &str) -> Option<i64> {
        let value = self.0.get(key)?;
        value.as_i64().or_else(|| value.as_f64().map(|f| f as i64))
    }

    fn get_bool(&self, key: &str) -> bool {
        self.0.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn name(&self) -> Option<&str> {
        self.get_str(keys::NAME)
    }

    pub fn icon_emoji(&self) -> Option<&str> {
        self.get_str(keys::ICON_EMOJI)
    }

    pub fn icon_image(&self) -> Option<&str> {
        self.get_str(keys::ICON_IMAGE)
    }

    pub fn cover_id(&self) -> Option<&str> {
        self.get_str(keys::COVER_ID)
    }

    pub fn cover_type(&self) -> Option<CoverType> {
        self.get_i64(keys::COVER_TYPE).and_then(CoverType::from_code)
    }

    pub fn layout_code(&self) -> Option<i64> {
        self.get_i64(keys::LAYOUT)
    }

    /// `None` when the code is absent or unknown.
    pub fn layout(&self) -> Option<ObjectLayout> {
        self.layout_code().and_then(ObjectLayout::from_code)
    }

    pub fn is_archived(&self) -> bool {
        self.get_bool(keys::IS_ARCHIVED)
    }

    pub fn is_deleted(&self) -> bool {
        self.get_bool(keys::IS_DELETED)
    }

    pub fn is_done(&self) -> bool {
        self.get_bool(keys::DONE)
    }

    pub fn description(&self) -> Option<&str> {
        self.get_str(keys::DESCRIPTION)
    }

    /// Object type id. Some producers send a one-element list.
    pub fn object_type(&self) -> Option<ObjectId> {
        match self.0.get(keys::TYPE)? {
            Value::String(s) if !s.is_empty() => Some(ObjectId::new(s.clone())),
            Value::Array(items) => items.first().and_then(Value::as_str).map(ObjectId::from),
            _ => None,
        }
    }

    pub fn featured_relations(&self) -> Vec<RelationKey> {
        self.string_list(keys::FEATURED_RELATIONS)
            .into_iter()
            .map(RelationKey::new)
            .collect()
    }

    pub fn has_featured(&self, key: &str) -> bool {
        self.featured_relations().iter().any(|k| k.as_str() == key)
    }

    /// Value of a relation on this object.
    pub fn relation_value(&self, key: &RelationKey) -> Option<&Value> {
        self.0.get(key.as_str()).filter(|v| !v.is_null())
    }

    /// A string or list-of-strings value, normalized to a list.
    pub fn string_list(&self, key: &str) -> Vec<String> {
        match self.0.get(key) {
            Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl FromIterator<(String, Value)> for ObjectDetails {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_layout_codes() {
        for code in 0..=9 {
            let layout = ObjectLayout::from_code(code).unwrap();
            assert_eq!(layout.code(), code);
        }
        assert_eq!(ObjectLayout::from_code(42), None);
    }

    #[test]
    fn test_float_encoded_numbers() {
        let details = ObjectDetails::new()
            .with(keys::LAYOUT, 9.0)
            .with(keys::COVER_TYPE, 2.0);
        assert_eq!(details.layout(), Some(ObjectLayout::Note));
        assert_eq!(details.cover_type(), Some(CoverType::Color));
    }

    #[test]
    fn test_merge_overwrites_present_keys_only() {
        let mut details = ObjectDetails::new().with(keys::NAME, "old").with(keys::ICON_EMOJI, "🌲");
        details.merge(&ObjectDetails::new().with(keys::NAME, "new"));
        assert_eq!(details.name(), Some("new"));
        assert_eq!(details.icon_emoji(), Some("🌲"));
    }

    #[test]
    fn test_unset_removes_keys() {
        let mut details = ObjectDetails::new().with(keys::NAME, "n").with(keys::IS_ARCHIVED, true);
        assert!(details.is_archived());
        details.unset(&[keys::IS_ARCHIVED]);
        assert!(!details.is_archived());
        assert_eq!(details.name(), Some("n"));
    }

    #[test]
    fn test_featured_relations_and_type() {
        let details = ObjectDetails::new()
            .with(keys::FEATURED_RELATIONS, json!(["type", "description"]))
            .with(keys::TYPE, json!(["_otpage"]));
        assert!(details.has_featured("description"));
        assert!(!details.has_featured("tag"));
        assert_eq!(details.object_type(), Some(ObjectId::new("_otpage")));
    }

    #[test]
    fn test_empty_strings_read_as_absent() {
        let details = ObjectDetails::new().with(keys::NAME, "");
        assert_eq!(details.name(), None);
    }
}
