use anyhow::Result;
use ayon_core::EntityType;
use colored::*;

pub fn list_fields(entity_type: EntityType) -> Result<()> {
    println!("{}", format!("Fields of {}", entity_type).blue().bold());
    println!("{}", ayon_cli::fields_table(entity_type.fields()));
    Ok(())
}
