//! Projection of relation values into [`RelationView`]s.

use std::collections::HashMap;

use serde_json::Value;

use folio_types::{ObjectDetails, ObjectId, Relation, RelationFormat, RelationKey};

use crate::urls::UrlBuilder;
use crate::view::{ObjectRef, RelationView};

/// Details of every known object, keyed by object id.
pub type DetailsSnapshot = HashMap<ObjectId, ObjectDetails>;

/// Relation definitions, keyed by relation key.
pub type RelationsSnapshot = HashMap<RelationKey, Relation>;

/// Resolve an object id to its inline presentation.
pub fn object_ref(id: &ObjectId, details: &DetailsSnapshot, urls: &UrlBuilder) -> ObjectRef {
    match details.get(id) {
        Some(found) => ObjectRef {
            id: id.clone(),
            name: found.name().map(str::to_owned),
            emoji: found.icon_emoji().map(str::to_owned),
            image: found.icon_image().map(|hash| urls.thumbnail(hash)),
            loading: false,
            deleted: found.is_deleted(),
        },
        None => ObjectRef {
            id: id.clone(),
            name: None,
            emoji: None,
            image: None,
            loading: true,
            deleted: false,
        },
    }
}

/// Project `relation` as stored on an object whose details are `values`.
///
/// Returns `None` for hidden relations.
pub fn relation_view(
    relation: &Relation,
    values: &ObjectDetails,
    details: &DetailsSnapshot,
    urls: &UrlBuilder,
) -> Option<RelationView> {
    if relation.is_hidden {
        return None;
    }
    let key = relation.key.clone();
    let name = relation.name.clone();
    let raw = values.relation_value(&relation.key);

    let view = match relation.format {
        RelationFormat::Checkbox => RelationView::Checkbox {
            key,
            name,
            checked: raw.and_then(Value::as_bool).unwrap_or(false),
        },
        RelationFormat::Status | RelationFormat::Tag => {
            let options = values
                .string_list(relation.key.as_str())
                .iter()
                .filter_map(|id| relation.option(id).cloned())
                .collect();
            if relation.format == RelationFormat::Status {
                RelationView::Status { key, name, options }
            } else {
                RelationView::Tags { key, name, options }
            }
        }
        RelationFormat::Object => RelationView::Object {
            key,
            name,
            objects: linked_objects(values, &relation.key, details, urls),
        },
        RelationFormat::File => RelationView::File {
            key,
            name,
            files: linked_objects(values, &relation.key, details, urls),
        },
        format => RelationView::Default {
            key,
            name,
            format,
            value: raw.and_then(display_value),
        },
    };
    Some(view)
}

fn linked_objects(
    values: &ObjectDetails,
    key: &RelationKey,
    details: &DetailsSnapshot,
    urls: &UrlBuilder,
) -> Vec<ObjectRef> {
    values
        .string_list(key.as_str())
        .into_iter()
        .map(|id| object_ref(&ObjectId::new(id), details, urls))
        .collect()
}

/// Human-readable form of a scalar relation value; `None` when empty.
fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(int), _) => Some(int.to_string()),
            (None, Some(float)) if float.fract() == 0.0 => Some(format!("{float:.0}")),
            _ => Some(n.to_string()),
        },
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(display_value).collect();
            if parts.is_empty() { None } else { Some(parts.join(", ")) }
        }
        Value::Object(_) => Some(value.to_string()),
    }
}
