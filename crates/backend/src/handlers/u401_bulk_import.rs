use std::collections::HashMap;

use axum::extract::Multipart;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};

use contracts::usecases::u401_bulk_import::request::BulkCreateRequest;
use contracts::usecases::u401_bulk_import::response::ImageIngestResult;

use crate::shared::storage::{self, StorageError};
use crate::usecases::u401_bulk_import::{create_products, csv_parse, image_upload, CSV_TEMPLATE};

type Envelope = Result<Json<Value>, (StatusCode, Json<Value>)>;

fn ok(message: String, data: Value) -> Envelope {
    Ok(Json(json!({
        "success": true,
        "message": message,
        "data": data,
    })))
}

fn fail(status: StatusCode, message: String) -> Envelope {
    Err((
        status,
        Json(json!({
            "success": false,
            "message": message,
        })),
    ))
}

/// POST /api/bulk-upload/images — multipart fields named `images`.
/// Per-file failures are reported inside the payload; only a broken
/// multipart stream or missing storage configuration fails the call.
pub async fn upload_images(mut multipart: Multipart) -> Envelope {
    let mut files: Vec<(String, Vec<u8>)> = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return fail(
                    StatusCode::BAD_REQUEST,
                    format!("Invalid multipart payload: {}", e),
                )
            }
        };
        if field.name() != Some("images") {
            continue;
        }
        let filename = field.file_name().unwrap_or("unnamed").to_string();
        match field.bytes().await {
            Ok(bytes) => files.push((filename, bytes.to_vec())),
            Err(e) => {
                return fail(
                    StatusCode::BAD_REQUEST,
                    format!("Failed to read file {}: {}", filename, e),
                )
            }
        }
    }

    if files.is_empty() {
        let empty = ImageIngestResult {
            uploaded: Vec::new(),
            failed: Vec::new(),
            total: 0,
            success_count: 0,
            failed_count: 0,
        };
        return ok(
            "No images provided - you can upload CSV without images".to_string(),
            serde_json::to_value(empty).unwrap_or(Value::Null),
        );
    }

    let storage = match storage::client() {
        Ok(storage) => storage,
        Err(StorageError::NotConfigured) => {
            return fail(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Object storage is not configured".to_string(),
            )
        }
        Err(e) => return fail(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };

    let result = image_upload::ingest_images(files, storage.as_ref()).await;
    let message = format!("Uploaded {} images successfully", result.success_count);
    ok(message, serde_json::to_value(result).unwrap_or(Value::Null))
}

/// POST /api/bulk-upload/parse-csv — multipart with a `csv` file field
/// and an optional `imageMapping` text field holding filename→url JSON
/// produced by the upload step.
pub async fn parse_csv(mut multipart: Multipart) -> Envelope {
    let mut csv_text: Option<String> = None;
    let mut image_mapping: HashMap<String, String> = HashMap::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return fail(
                    StatusCode::BAD_REQUEST,
                    format!("Invalid multipart payload: {}", e),
                )
            }
        };
        match field.name() {
            Some("csv") => match field.text().await {
                Ok(text) => csv_text = Some(text),
                Err(e) => {
                    return fail(
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read CSV file: {}", e),
                    )
                }
            },
            Some("imageMapping") => {
                let raw = match field.text().await {
                    Ok(raw) => raw,
                    Err(e) => {
                        return fail(
                            StatusCode::BAD_REQUEST,
                            format!("Failed to read image mapping: {}", e),
                        )
                    }
                };
                match serde_json::from_str(&raw) {
                    Ok(mapping) => image_mapping = mapping,
                    Err(e) => {
                        return fail(
                            StatusCode::BAD_REQUEST,
                            format!("Invalid image mapping JSON: {}", e),
                        )
                    }
                }
            }
            _ => {}
        }
    }

    let csv_text = match csv_text {
        Some(text) => text,
        None => return fail(StatusCode::BAD_REQUEST, "No CSV file provided".to_string()),
    };

    match csv_parse::parse_products_csv(&csv_text, &image_mapping) {
        Ok(result) => {
            let message = format!("Parsed {} products successfully", result.valid_count);
            ok(message, serde_json::to_value(result).unwrap_or(Value::Null))
        }
        Err(e) => {
            tracing::error!("CSV parse failed: {}", e);
            fail(
                StatusCode::BAD_REQUEST,
                format!("Failed to parse CSV: {}", e),
            )
        }
    }
}

/// POST /api/bulk-upload/create-products — persists the parsed rows.
/// Per-record failures stay inside the payload with their source row
/// numbers; only a missing batch or an unreachable database fails the
/// call.
pub async fn create_products(Json(request): Json<BulkCreateRequest>) -> Envelope {
    if request.products.is_empty() {
        return fail(StatusCode::BAD_REQUEST, "No products provided".to_string());
    }

    match create_products::create_products(&request.products).await {
        Ok(result) => {
            let message = format!("Created {} products successfully", result.success_count);
            ok(message, serde_json::to_value(result).unwrap_or(Value::Null))
        }
        Err(e) => {
            tracing::error!("Bulk create failed: {}", e);
            fail(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to create products: {}", e),
            )
        }
    }
}

/// GET /api/bulk-upload/template — the CSV the operator starts from.
pub async fn download_template() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=product-upload-template.csv",
            ),
        ],
        CSV_TEMPLATE,
    )
}
