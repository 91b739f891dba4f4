use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::EntityMetadata;

/// One catalog image. The first image of a product is the primary one
/// shown on listing pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductImage {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(rename = "isPrimary")]
    pub is_primary: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSize {
    pub size: String,
    pub available: bool,
}

/// Free-text specification sheet. Every field is optional; empty
/// strings are normalized to `None` before persistence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specifications {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fabric: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#use: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closure_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_technique: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_of_origin: Option<String>,
}

impl Specifications {
    /// Drop sub-fields that hold only whitespace so they never reach
    /// persistence as empty strings.
    pub fn normalized(self) -> Self {
        fn keep(v: Option<String>) -> Option<String> {
            v.filter(|s| !s.trim().is_empty())
        }
        Self {
            material: keep(self.material),
            fabric: keep(self.fabric),
            pattern: keep(self.pattern),
            style: keep(self.style),
            shape: keep(self.shape),
            r#use: keep(self.r#use),
            closure_type: keep(self.closure_type),
            color_technique: keep(self.color_technique),
            place_of_origin: keep(self.place_of_origin),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customization {
    pub available: bool,
    pub options: Vec<String>,
}

impl Default for Customization {
    fn default() -> Self {
        Self {
            available: true,
            options: Vec::new(),
        }
    }
}

/// Catalog product aggregate. `technique_id` is mandatory, `season_id`
/// optional; both are resolved from human-readable names during bulk
/// import.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    pub technique_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_id: Option<Uuid>,
    pub images: Vec<ProductImage>,
    pub sizes: Vec<ProductSize>,
    pub specifications: Specifications,
    pub features: Vec<String>,
    pub customization: Customization,
    pub oem_service: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub in_stock: bool,
    pub featured: bool,
    #[serde(flatten)]
    pub metadata: EntityMetadata,
}

/// Admin form payload for single-product create/update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub model_number: Option<String>,
    #[serde(default)]
    pub brand_name: Option<String>,
    pub technique_id: String,
    #[serde(default)]
    pub season_id: Option<String>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub sizes: Vec<ProductSize>,
    #[serde(default)]
    pub specifications: Specifications,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub customization: Option<Customization>,
    #[serde(default)]
    pub oem_service: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub in_stock: Option<bool>,
    #[serde(default)]
    pub featured: Option<bool>,
}

impl Product {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Product name is required".to_string());
        }
        if self.slug.trim().is_empty() {
            return Err("Product slug is required".to_string());
        }
        if self.technique_id.is_nil() {
            return Err("Technique is required".to_string());
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.metadata.touch();
    }
}
