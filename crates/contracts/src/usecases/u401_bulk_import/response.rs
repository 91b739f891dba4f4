use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::a003_product::aggregate::{
    Customization, ProductImage, ProductSize, Specifications,
};

/// One successfully stored image, keyed by its original filename. The
/// operator feeds the filename→url mapping back into the CSV parse
/// step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    pub filename: String,
    pub url: String,
    pub original_url: String,
    pub size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadFailure {
    pub filename: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageIngestResult {
    pub uploaded: Vec<UploadedImage>,
    pub failed: Vec<UploadFailure>,
    pub total: usize,
    pub success_count: usize,
    pub failed_count: usize,
}

/// How the images of a parsed row were resolved. A direct projection
/// of the strategy chosen for the row, so a manual row whose tokens
/// all resolved to nothing still reports `manual`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchedBy {
    None,
    Manual,
    Auto,
}

/// A validated CSV row, ready for the bulk-create step. `technique`
/// and `season` still hold raw names; they are resolved to ids at
/// creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedProductRow {
    pub name: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    pub technique: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
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
    // Diagnostics; stripped before persistence.
    pub row_number: usize,
    pub image_count: usize,
    pub matched_by: MatchedBy,
}

/// A CSV row that failed validation, with the original cells so the
/// operator can fix and resubmit just the failing subset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowError {
    pub row: usize,
    pub data: BTreeMap<String, String>,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvParseResult {
    pub products: Vec<ParsedProductRow>,
    pub errors: Vec<RowError>,
    pub total: usize,
    pub valid_count: usize,
    pub error_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedProductSummary {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreationError {
    pub product: String,
    pub row: usize,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCreateResult {
    pub created: Vec<CreatedProductSummary>,
    pub errors: Vec<CreationError>,
    pub total: usize,
    pub success_count: usize,
    pub error_count: usize,
}
