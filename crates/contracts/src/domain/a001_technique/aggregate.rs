use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{slugify, EntityMetadata};

/// Textile technique (block printing, hand embroidery, weaving, ...).
/// Products reference a technique by id; the bulk import resolves the
/// human-readable name to this id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Technique {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    #[serde(rename = "displayOrder")]
    pub display_order: i32,
    #[serde(flatten)]
    pub metadata: EntityMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechniqueDto {
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "displayOrder")]
    pub display_order: Option<i32>,
    pub active: Option<bool>,
}

impl Technique {
    pub fn new_for_insert(name: String, display_order: i32) -> Self {
        let slug = slugify(&name);
        Self {
            id: Uuid::new_v4(),
            name,
            slug,
            display_order,
            metadata: EntityMetadata::new(),
        }
    }

    pub fn apply(&mut self, dto: &TechniqueDto) {
        self.name = dto.name.clone();
        self.slug = slugify(&dto.name);
        if let Some(order) = dto.display_order {
            self.display_order = order;
        }
        if let Some(active) = dto.active {
            self.metadata.active = active;
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Technique name is required".to_string());
        }
        if self.slug.is_empty() {
            return Err("Technique slug is required".to_string());
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.metadata.touch();
    }
}
