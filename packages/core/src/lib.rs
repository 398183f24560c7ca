// ABOUTME: Core types for the Ayon product browser
// ABOUTME: Product/version data model and the entity field registry shared by all packages

pub mod fields;
pub mod types;

// Re-export main types
pub use fields::{detail_fields, EntityType, FieldDescriptor, FieldKind, UnknownEntityType};
pub use types::{Product, ProductRow, SelectedVersion, Version, VersionFields};
