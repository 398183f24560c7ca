pub mod fields;
pub mod products;
pub mod status;
pub mod versions;
