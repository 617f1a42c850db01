//! Typed identifiers for blocks, objects and relations.
//!
//! Ids are opaque strings minted by the synchronization engine. The editor
//! never generates them; it only compares, hashes and forwards them. The root
//! block of a document shares its id with the document object, so a
//! [`BlockId`] converts losslessly into an [`ObjectId`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Address of one block inside a document tree.
#[derive(Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

/// Address of an object (document, link target, mention target, type).
#[derive(Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

/// Key of a relation definition (e.g. `"status"`, `"tag"`).
#[derive(Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationKey(String);

// ── Shared behavior ─────────────────────────────────────────────────────────

macro_rules! impl_string_id {
    ($T:ident, $name:literal) => {
        impl $T {
            /// Wrap a raw id string.
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// The raw id string.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Check if this id is empty (never valid as a lookup key).
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            /// First 8 characters — for human display only, not lookup.
            pub fn short(&self) -> &str {
                match self.0.char_indices().nth(8) {
                    Some((idx, _)) => &self.0[..idx],
                    None => &self.0,
                }
            }
        }

        impl From<&str> for $T {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $T {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl AsRef<str> for $T {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $T {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl fmt::Debug for $T {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($name, "({})"), self.0)
            }
        }
    };
}

impl_string_id!(BlockId, "BlockId");
impl_string_id!(ObjectId, "ObjectId");
impl_string_id!(RelationKey, "RelationKey");

impl From<&BlockId> for ObjectId {
    fn from(id: &BlockId) -> Self {
        ObjectId(id.0.clone())
    }
}

impl From<&ObjectId> for BlockId {
    fn from(id: &ObjectId) -> Self {
        BlockId(id.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_block_and_object_share_identity() {
        let root = BlockId::new("doc-1");
        let object = ObjectId::from(&root);
        assert_eq!(object.as_str(), "doc-1");
        assert_eq!(BlockId::from(&object), root);
    }

    #[test]
    fn test_short_is_char_safe() {
        assert_eq!(BlockId::new("abc").short(), "abc");
        assert_eq!(BlockId::new("0123456789").short(), "01234567");
        assert_eq!(BlockId::new("ブロックブロックブロック").short(), "ブロックブロック");
    }

    #[test]
    fn test_serde_transparent() {
        let id = RelationKey::new("status");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"status\"");
        let back: RelationKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_debug_names_the_type() {
        assert_eq!(format!("{:?}", BlockId::new("p1")), "BlockId(p1)");
        assert_eq!(format!("{}", ObjectId::new("o1")), "o1");
    }
}
