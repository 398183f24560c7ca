// ABOUTME: Entity field registry for detail panels
// ABOUTME: Maps each entity type to an ordered list of typed field descriptors

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Entity types the browser can show details for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Folder,
    Product,
    Version,
    Task,
    Representation,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Folder => "folder",
            EntityType::Product => "product",
            EntityType::Version => "version",
            EntityType::Task => "task",
            EntityType::Representation => "representation",
        }
    }

    /// Ordered fields shown for this entity type
    pub fn fields(&self) -> &'static [FieldDescriptor] {
        match self {
            EntityType::Folder => FOLDER_FIELDS,
            EntityType::Product => PRODUCT_FIELDS,
            EntityType::Version => VERSION_FIELDS,
            EntityType::Task => TASK_FIELDS,
            EntityType::Representation => REPRESENTATION_FIELDS,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown entity type: {0}")]
pub struct UnknownEntityType(pub String);

impl FromStr for EntityType {
    type Err = UnknownEntityType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "folder" => Ok(EntityType::Folder),
            "product" => Ok(EntityType::Product),
            "version" => Ok(EntityType::Version),
            "task" => Ok(EntityType::Task),
            "representation" => Ok(EntityType::Representation),
            _ => Err(UnknownEntityType(s.to_string())),
        }
    }
}

/// How a field value is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Status,
    DateTime,
    User,
    Tags,
    Integer,
    Path,
}

impl FieldKind {
    /// Render a raw JSON value for display. Null renders as an empty string.
    pub fn render(&self, value: &Value) -> String {
        match (self, value) {
            (_, Value::Null) => String::new(),
            (FieldKind::DateTime, Value::String(raw)) => raw
                .parse::<DateTime<Utc>>()
                .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|_| raw.clone()),
            (FieldKind::Tags, Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(", "),
            (FieldKind::Integer, Value::Number(n)) => n
                .as_i64()
                .map(|i| i.to_string())
                .unwrap_or_else(|| n.to_string()),
            (FieldKind::Path, Value::String(path)) => {
                if path.starts_with('/') {
                    path.clone()
                } else {
                    format!("/{}", path)
                }
            }
            (_, Value::String(s)) => s.clone(),
            (_, other) => other.to_string(),
        }
    }
}

/// One field of an entity's detail panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Key into the entity JSON. Dots descend into nested objects.
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    const fn new(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self { key, label, kind }
    }

    /// Look the field up in an entity payload
    pub fn lookup<'a>(&self, entity: &'a Value) -> Option<&'a Value> {
        self.key
            .split('.')
            .try_fold(entity, |current, part| current.get(part))
    }
}

const FOLDER_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("name", "Name", FieldKind::Text),
    FieldDescriptor::new("folderType", "Folder Type", FieldKind::Text),
    FieldDescriptor::new("status", "Status", FieldKind::Status),
    FieldDescriptor::new("path", "Path", FieldKind::Path),
    FieldDescriptor::new("tags", "Tags", FieldKind::Tags),
    FieldDescriptor::new("attrib.fps", "FPS", FieldKind::Text),
    FieldDescriptor::new("attrib.frameStart", "Frame Start", FieldKind::Integer),
    FieldDescriptor::new("attrib.frameEnd", "Frame End", FieldKind::Integer),
    FieldDescriptor::new("updatedAt", "Updated", FieldKind::DateTime),
];

const PRODUCT_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("name", "Name", FieldKind::Text),
    FieldDescriptor::new("productType", "Product Type", FieldKind::Text),
    FieldDescriptor::new("folder", "Folder", FieldKind::Text),
    FieldDescriptor::new("taskName", "Task", FieldKind::Text),
    FieldDescriptor::new("status", "Status", FieldKind::Status),
    FieldDescriptor::new("tags", "Tags", FieldKind::Tags),
    FieldDescriptor::new("createdAt", "Created", FieldKind::DateTime),
];

const VERSION_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("name", "Name", FieldKind::Text),
    FieldDescriptor::new("version", "Version", FieldKind::Integer),
    FieldDescriptor::new("status", "Status", FieldKind::Status),
    FieldDescriptor::new("author", "Author", FieldKind::User),
    FieldDescriptor::new("tags", "Tags", FieldKind::Tags),
    FieldDescriptor::new("attrib.comment", "Comment", FieldKind::Text),
    FieldDescriptor::new("attrib.families", "Families", FieldKind::Tags),
    FieldDescriptor::new("createdAt", "Created", FieldKind::DateTime),
];

const TASK_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("name", "Name", FieldKind::Text),
    FieldDescriptor::new("taskType", "Task Type", FieldKind::Text),
    FieldDescriptor::new("status", "Status", FieldKind::Status),
    FieldDescriptor::new("assignees", "Assignees", FieldKind::Tags),
    FieldDescriptor::new("tags", "Tags", FieldKind::Tags),
    FieldDescriptor::new("updatedAt", "Updated", FieldKind::DateTime),
];

const REPRESENTATION_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("name", "Name", FieldKind::Text),
    FieldDescriptor::new("status", "Status", FieldKind::Status),
    FieldDescriptor::new("attrib.path", "Path", FieldKind::Path),
    FieldDescriptor::new("fileCount", "Files", FieldKind::Integer),
    FieldDescriptor::new("tags", "Tags", FieldKind::Tags),
    FieldDescriptor::new("createdAt", "Created", FieldKind::DateTime),
];

/// `(label, rendered value)` pairs for a detail panel, in registry order.
/// Fields absent from the payload are skipped.
pub fn detail_fields(entity_type: EntityType, entity: &Value) -> Vec<(&'static str, String)> {
    entity_type
        .fields()
        .iter()
        .filter_map(|field| {
            field
                .lookup(entity)
                .map(|value| (field.label, field.kind.render(value)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_entity_type_parsing() {
        assert_eq!("Version".parse::<EntityType>(), Ok(EntityType::Version));
        assert_eq!("folder".parse::<EntityType>(), Ok(EntityType::Folder));
        assert!("workfile".parse::<EntityType>().is_err());
    }

    #[test]
    fn test_unknown_entity_type_error_message() {
        let err = "workfile".parse::<EntityType>().unwrap_err();
        assert_eq!(err, UnknownEntityType("workfile".to_string()));
        assert_eq!(err.to_string(), "Unknown entity type: workfile");
    }

    #[test]
    fn test_every_entity_type_has_a_name_field_first() {
        for entity in [
            EntityType::Folder,
            EntityType::Product,
            EntityType::Version,
            EntityType::Task,
            EntityType::Representation,
        ] {
            let fields = entity.fields();
            assert!(!fields.is_empty(), "{} has no fields", entity);
            assert_eq!(fields[0].key, "name");
        }
    }

    #[test]
    fn test_render_kinds() {
        assert_eq!(FieldKind::Text.render(&Value::Null), "");
        assert_eq!(
            FieldKind::Tags.render(&json!(["hero", "lookdev"])),
            "hero, lookdev"
        );
        assert_eq!(FieldKind::Integer.render(&json!(1001)), "1001");
        assert_eq!(FieldKind::Path.render(&json!("assets/chair")), "/assets/chair");
        assert_eq!(
            FieldKind::DateTime.render(&json!("2024-03-01T10:30:00Z")),
            "2024-03-01 10:30"
        );
        assert_eq!(FieldKind::DateTime.render(&json!("yesterday")), "yesterday");
    }

    #[test]
    fn test_detail_fields_follow_registry_order() {
        let version = json!({
            "createdAt": "2024-03-01T10:30:00Z",
            "name": "v003",
            "status": "Approved",
            "attrib": { "comment": "fixed uvs" },
        });

        let rows = detail_fields(EntityType::Version, &version);
        assert_eq!(
            rows,
            vec![
                ("Name", "v003".to_string()),
                ("Status", "Approved".to_string()),
                ("Comment", "fixed uvs".to_string()),
                ("Created", "2024-03-01 10:30".to_string()),
            ]
        );
    }
}
