use std::fmt;

use serde::{Deserialize, Serialize};

/// Cache tag used to group cached results for invalidation.
///
/// A tag without an id matches every tag of the same type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    #[serde(rename = "type")]
    pub tag_type: String,
    pub id: Option<String>,
}

impl Tag {
    pub fn new(tag_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            tag_type: tag_type.into(),
            id: Some(id.into()),
        }
    }

    /// Tag covering every id of a type
    pub fn list(tag_type: impl Into<String>) -> Self {
        Self {
            tag_type: tag_type.into(),
            id: None,
        }
    }

    /// Whether invalidating `self` invalidates an entry that provided `provided`
    pub fn matches(&self, provided: &Tag) -> bool {
        self.tag_type == provided.tag_type && (self.id.is_none() || self.id == provided.id)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{}:{}", self.tag_type, id),
            None => write!(f, "{}:*", self.tag_type),
        }
    }
}
