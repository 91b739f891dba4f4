use serde::{Deserialize, Serialize};

use super::response::ParsedProductRow;

/// Body of the bulk-create call. The rows come from the parse step,
/// possibly edited by the operator in between.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkCreateRequest {
    #[serde(default)]
    pub products: Vec<ParsedProductRow>,
}
