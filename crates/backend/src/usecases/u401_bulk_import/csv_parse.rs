use std::collections::{BTreeMap, HashMap};

use contracts::domain::a003_product::aggregate::{
    Customization, ProductImage, ProductSize, Specifications,
};
use contracts::domain::common::slugify;
use contracts::usecases::u401_bulk_import::response::{
    CsvParseResult, MatchedBy, ParsedProductRow, RowError,
};

/// How the images of one row are resolved, decided once per row by
/// the shape of its data and dispatched from there. `matched_by` on
/// the parsed row is a direct projection of this choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImageResolution {
    /// The `images` cell is non-empty: filenames/URLs listed by hand.
    Manual,
    /// No `images` cell, but a model number and an uploaded-image
    /// mapping exist: match filenames against the model number.
    Auto,
    /// Nothing to resolve; the product is created without images.
    None,
}

/// Parse raw CSV text into validated product rows. A structurally
/// broken CSV is a fatal error; a bad row is collected into `errors`
/// and never aborts the batch.
///
/// `image_mapping` is the filename→URL mapping from the upload step;
/// an empty mapping means no images were uploaded this session.
pub fn parse_products_csv(
    csv_text: &str,
    image_mapping: &HashMap<String, String>,
) -> anyhow::Result<CsvParseResult> {
    // Strip UTF-8 BOM if present
    let text = csv_text.trim_start_matches('\u{FEFF}');

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| anyhow::anyhow!("Failed to read CSV headers: {}", e))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut products = Vec::new();
    let mut errors = Vec::new();
    let mut total = 0usize;

    for (index, result) in reader.records().enumerate() {
        // Ragged or unquotable records mean the file itself is broken.
        let record = result.map_err(|e| anyhow::anyhow!("CSV parsing error: {}", e))?;
        total += 1;

        // +2: the header occupies logical row 1, data rows are 0-indexed.
        let row_number = index + 2;
        let row: BTreeMap<String, String> = headers
            .iter()
            .cloned()
            .zip(record.iter().map(|v| v.to_string()))
            .collect();

        match parse_row(row_number, &row, image_mapping) {
            Ok(product) => products.push(product),
            Err(error) => {
                tracing::warn!("Bulk import row {} rejected: {}", row_number, error);
                errors.push(RowError {
                    row: row_number,
                    data: row,
                    error,
                });
            }
        }
    }

    Ok(CsvParseResult {
        valid_count: products.len(),
        error_count: errors.len(),
        total,
        products,
        errors,
    })
}

fn parse_row(
    row_number: usize,
    row: &BTreeMap<String, String>,
    image_mapping: &HashMap<String, String>,
) -> Result<ParsedProductRow, String> {
    // Whitespace-only cells count as absent.
    let field = |name: &str| -> Option<&str> {
        row.get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    };

    let (name, technique) = match (field("name"), field("technique")) {
        (Some(name), Some(technique)) => (name, technique),
        _ => return Err("Missing required fields: name and technique".to_string()),
    };

    let strategy = if field("images").is_some() {
        ImageResolution::Manual
    } else if field("modelNumber").is_some() && !image_mapping.is_empty() {
        ImageResolution::Auto
    } else {
        ImageResolution::None
    };

    let images = match strategy {
        ImageResolution::Manual => {
            resolve_manual_images(field("images").unwrap_or_default(), name, image_mapping)?
        }
        ImageResolution::Auto => {
            auto_match_images(field("modelNumber").unwrap_or_default(), name, image_mapping)
        }
        ImageResolution::None => Vec::new(),
    };

    let sizes: Vec<ProductSize> = split_list(field("sizes"))
        .into_iter()
        .map(|size| ProductSize {
            size,
            available: true,
        })
        .collect();

    Ok(ParsedProductRow {
        name: name.to_string(),
        slug: slugify(name),
        model_number: field("modelNumber").map(str::to_string),
        brand_name: field("brandName").map(str::to_string),
        technique: technique.to_string(),
        season: field("season").map(str::to_string),
        image_count: images.len(),
        images,
        sizes,
        specifications: Specifications {
            material: field("material").map(str::to_string),
            fabric: field("fabric").map(str::to_string),
            pattern: field("pattern").map(str::to_string),
            style: field("style").map(str::to_string),
            shape: field("shape").map(str::to_string),
            r#use: field("use").map(str::to_string),
            closure_type: field("closureType").map(str::to_string),
            color_technique: field("colorTechnique").map(str::to_string),
            place_of_origin: field("placeOfOrigin").map(str::to_string),
        },
        features: split_list(field("features")),
        customization: Customization {
            available: bool_cell_default_true(field("customizationAvailable")),
            options: split_list(field("customizationOptions")),
        },
        oem_service: field("oemService").unwrap_or("Available").to_string(),
        description: field("description").map(str::to_string),
        in_stock: bool_cell_default_true(field("inStock")),
        featured: bool_cell_default_false(field("featured")),
        row_number,
        matched_by: match strategy {
            ImageResolution::Manual => MatchedBy::Manual,
            ImageResolution::Auto => MatchedBy::Auto,
            ImageResolution::None => MatchedBy::None,
        },
    })
}

/// Resolve a hand-written `images` cell. Tokens are either literal
/// URLs (used verbatim) or filenames looked up in the uploaded-image
/// mapping. A filename missing from a non-empty mapping fails the
/// row; with no mapping at all the reference is silently dropped
/// (nothing was uploaded this session, images stay optional). The
/// first surviving image becomes primary.
fn resolve_manual_images(
    cell: &str,
    alt: &str,
    image_mapping: &HashMap<String, String>,
) -> Result<Vec<ProductImage>, String> {
    let mut images: Vec<ProductImage> = Vec::new();

    for token in cell.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let url = if token.starts_with("http://") || token.starts_with("https://") {
            Some(token.to_string())
        } else if let Some(mapped) = image_mapping.get(token) {
            Some(mapped.clone())
        } else if !image_mapping.is_empty() {
            return Err(format!("Image not found in uploaded images: {}", token));
        } else {
            None
        };

        if let Some(url) = url {
            images.push(ProductImage {
                url,
                alt: Some(alt.to_string()),
                is_primary: images.is_empty(),
            });
        }
    }

    Ok(images)
}

/// Match uploaded filenames against a model number: a filename whose
/// lower-cased form starts with or contains the lower-cased model
/// number is taken. Matches are sorted lexicographically so the image
/// order is stable across runs. The contains rule is deliberately
/// permissive: "MC-1" also matches "MC-10-front.jpg".
fn auto_match_images(
    model_number: &str,
    alt: &str,
    image_mapping: &HashMap<String, String>,
) -> Vec<ProductImage> {
    let prefix = model_number.to_lowercase();

    let mut matched: Vec<&String> = image_mapping
        .keys()
        .filter(|filename| {
            let lower = filename.to_lowercase();
            lower.starts_with(&prefix) || lower.contains(&prefix)
        })
        .collect();
    matched.sort();

    matched
        .into_iter()
        .enumerate()
        .map(|(index, filename)| ProductImage {
            url: image_mapping[filename].clone(),
            alt: Some(alt.to_string()),
            is_primary: index == 0,
        })
        .collect()
}

/// Comma-separated cell into trimmed, non-empty tokens.
fn split_list(cell: Option<&str>) -> Vec<String> {
    cell.map(|v| {
        v.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Opt-out flag: everything (including an absent cell) means true,
/// except the literal "false" compared case-insensitively. Used for
/// `inStock` and `customizationAvailable`.
fn bool_cell_default_true(cell: Option<&str>) -> bool {
    !cell.is_some_and(|v| v.eq_ignore_ascii_case("false"))
}

/// Opt-in flag: only the literal "true" compared case-insensitively
/// means true; everything else (including an absent cell) is false.
/// Used for `featured`.
fn bool_cell_default_false(cell: Option<&str>) -> bool {
    cell.is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn empty_mapping() -> HashMap<String, String> {
        HashMap::new()
    }

    #[test]
    fn every_row_is_accounted_for_exactly_once() {
        let csv = "name,technique\nCushion,Weaving\n,Weaving\nRunner,Embroidery\n";
        let result = parse_products_csv(csv, &empty_mapping()).unwrap();
        assert_eq!(result.total, 3);
        assert_eq!(result.valid_count, 2);
        assert_eq!(result.error_count, 1);
        assert_eq!(result.valid_count + result.error_count, result.total);
    }

    #[test]
    fn missing_name_or_technique_lands_in_errors() {
        let csv = "name,technique\nCushion,\n   ,Weaving\n";
        let result = parse_products_csv(csv, &empty_mapping()).unwrap();
        assert!(result.products.is_empty());
        assert_eq!(result.errors.len(), 2);
        for error in &result.errors {
            assert!(error.error.contains("name and technique"));
        }
        // Header is logical row 1, so the first data row reports 2.
        assert_eq!(result.errors[0].row, 2);
        assert_eq!(result.errors[1].row, 3);
    }

    #[test]
    fn row_errors_carry_the_original_cells() {
        let csv = "name,technique,modelNumber\n,Weaving,MC-9\n";
        let result = parse_products_csv(csv, &empty_mapping()).unwrap();
        let error = &result.errors[0];
        assert_eq!(error.data.get("modelNumber").unwrap(), "MC-9");
        assert_eq!(error.data.get("technique").unwrap(), "Weaving");
    }

    #[test]
    fn manual_images_keep_token_order_and_flag_first_primary() {
        let map = mapping(&[("a.jpg", "U1"), ("b.jpg", "U2")]);
        let csv = "name,technique,images\nCushion,Weaving,\"a.jpg,b.jpg\"\n";
        let result = parse_products_csv(csv, &map).unwrap();
        let row = &result.products[0];
        assert_eq!(row.matched_by, MatchedBy::Manual);
        assert_eq!(row.image_count, 2);
        assert_eq!(row.images[0].url, "U1");
        assert!(row.images[0].is_primary);
        assert_eq!(row.images[1].url, "U2");
        assert!(!row.images[1].is_primary);
        assert_eq!(row.images[0].alt.as_deref(), Some("Cushion"));
    }

    #[test]
    fn manual_url_tokens_are_used_verbatim() {
        let csv =
            "name,technique,images\nCushion,Weaving,https://cdn.example.com/img.jpg\n";
        let result = parse_products_csv(csv, &empty_mapping()).unwrap();
        let row = &result.products[0];
        assert_eq!(row.images[0].url, "https://cdn.example.com/img.jpg");
        assert_eq!(row.matched_by, MatchedBy::Manual);
    }

    #[test]
    fn unknown_filename_with_empty_mapping_is_silently_dropped() {
        // "No images uploaded" must not be conflated with "image not found".
        let csv = "name,technique,images\nCushion,Weaving,x.jpg\n";
        let result = parse_products_csv(csv, &empty_mapping()).unwrap();
        assert_eq!(result.error_count, 0);
        let row = &result.products[0];
        assert_eq!(row.image_count, 0);
        // The manual strategy was still chosen; the diagnostic reflects it.
        assert_eq!(row.matched_by, MatchedBy::Manual);
    }

    #[test]
    fn unknown_filename_with_non_empty_mapping_fails_the_row() {
        let map = mapping(&[("a.jpg", "U1")]);
        let csv = "name,technique,images\nCushion,Weaving,missing.jpg\n";
        let result = parse_products_csv(csv, &map).unwrap();
        assert_eq!(result.valid_count, 0);
        assert_eq!(result.error_count, 1);
        assert!(result.errors[0].error.contains("missing.jpg"));
    }

    #[test]
    fn one_bad_image_reference_does_not_abort_other_rows() {
        let map = mapping(&[("a.jpg", "U1")]);
        let csv = "name,technique,images\nCushion,Weaving,missing.jpg\nRunner,Weaving,a.jpg\n";
        let result = parse_products_csv(csv, &map).unwrap();
        assert_eq!(result.valid_count, 1);
        assert_eq!(result.error_count, 1);
        assert_eq!(result.products[0].name, "Runner");
    }

    #[test]
    fn auto_match_is_lexicographically_sorted() {
        let map = mapping(&[
            ("MC-001-2.jpg", "U2"),
            ("MC-001-1.jpg", "U1"),
            ("other.jpg", "U3"),
        ]);
        let csv = "name,technique,modelNumber\nCushion,Weaving,MC-001\n";
        let result = parse_products_csv(csv, &map).unwrap();
        let row = &result.products[0];
        assert_eq!(row.matched_by, MatchedBy::Auto);
        assert_eq!(row.image_count, 2);
        assert_eq!(row.images[0].url, "U1");
        assert!(row.images[0].is_primary);
        assert_eq!(row.images[1].url, "U2");
        assert!(!row.images[1].is_primary);
    }

    #[test]
    fn auto_match_contains_rule_matches_substrings_anywhere() {
        // Known permissiveness: "mc-1" is a substring of "mc-10".
        let map = mapping(&[("front-MC-10.jpg", "U1")]);
        let csv = "name,technique,modelNumber\nCushion,Weaving,MC-1\n";
        let result = parse_products_csv(csv, &map).unwrap();
        assert_eq!(result.products[0].image_count, 1);
    }

    #[test]
    fn auto_match_needs_model_number_and_mapping() {
        // Mapping present but no model number: nothing to match on.
        let map = mapping(&[("a.jpg", "U1")]);
        let csv = "name,technique\nCushion,Weaving\n";
        let result = parse_products_csv(csv, &map).unwrap();
        assert_eq!(result.products[0].matched_by, MatchedBy::None);
        assert_eq!(result.products[0].image_count, 0);
    }

    #[test]
    fn manual_cell_wins_over_auto_match() {
        let map = mapping(&[("MC-001-1.jpg", "AUTO"), ("chosen.jpg", "MANUAL")]);
        let csv = "name,technique,modelNumber,images\nCushion,Weaving,MC-001,chosen.jpg\n";
        let result = parse_products_csv(csv, &map).unwrap();
        let row = &result.products[0];
        assert_eq!(row.matched_by, MatchedBy::Manual);
        assert_eq!(row.images[0].url, "MANUAL");
    }

    #[test]
    fn boolean_cells_have_asymmetric_defaults() {
        let csv = "name,technique,inStock,featured,customizationAvailable\n\
                   A,Weaving,,,\n\
                   B,Weaving,false,TRUE,FALSE\n\
                   C,Weaving,yes,no,whatever\n";
        let result = parse_products_csv(csv, &empty_mapping()).unwrap();
        let [a, b, c] = &result.products[..] else {
            panic!("expected three rows");
        };
        // Absent cells: stock and customization on, featured off.
        assert!(a.in_stock);
        assert!(!a.featured);
        assert!(a.customization.available);
        // Explicit literals, any case.
        assert!(!b.in_stock);
        assert!(b.featured);
        assert!(!b.customization.available);
        // Non-literal junk falls back to the defaults.
        assert!(c.in_stock);
        assert!(!c.featured);
        assert!(c.customization.available);
    }

    #[test]
    fn slug_collapses_punctuation_without_trailing_hyphen() {
        let csv = "name,technique\nHand-Woven Cotton!,Weaving\n";
        let result = parse_products_csv(csv, &empty_mapping()).unwrap();
        assert_eq!(result.products[0].slug, "hand-woven-cotton");
    }

    #[test]
    fn list_cells_are_trimmed_and_empty_tokens_dropped() {
        let csv = "name,technique,sizes,features,customizationOptions\n\
                   Cushion,Weaving,\"12x12, 16x16 ,\",\" Handmade ,, Washable\",\"Color\"\n";
        let result = parse_products_csv(csv, &empty_mapping()).unwrap();
        let row = &result.products[0];
        assert_eq!(row.sizes.len(), 2);
        assert_eq!(row.sizes[0].size, "12x12");
        assert!(row.sizes[0].available);
        assert_eq!(row.features, vec!["Handmade", "Washable"]);
        assert_eq!(row.customization.options, vec!["Color"]);
    }

    #[test]
    fn headers_are_trimmed_before_use() {
        let csv = " name , technique \nCushion,Weaving\n";
        let result = parse_products_csv(csv, &empty_mapping()).unwrap();
        assert_eq!(result.valid_count, 1);
        assert_eq!(result.products[0].name, "Cushion");
    }

    #[test]
    fn oem_service_defaults_to_available() {
        let csv = "name,technique,oemService\nA,Weaving,\nB,Weaving,Customizable\n";
        let result = parse_products_csv(csv, &empty_mapping()).unwrap();
        assert_eq!(result.products[0].oem_service, "Available");
        assert_eq!(result.products[1].oem_service, "Customizable");
    }

    #[test]
    fn ragged_record_is_a_fatal_error() {
        let csv = "name,technique\nCushion,Weaving,extra-cell\n";
        assert!(parse_products_csv(csv, &empty_mapping()).is_err());
    }

    #[test]
    fn bom_is_stripped_before_parsing() {
        let csv = "\u{FEFF}name,technique\nCushion,Weaving\n";
        let result = parse_products_csv(csv, &empty_mapping()).unwrap();
        assert_eq!(result.valid_count, 1);
    }

    #[test]
    fn template_parses_without_errors() {
        let result = parse_products_csv(super::super::CSV_TEMPLATE, &empty_mapping()).unwrap();
        assert_eq!(result.total, 3);
        assert_eq!(result.valid_count, 3);
        assert_eq!(result.error_count, 0);
        // No images were uploaded, so the filename references drop out.
        assert!(result.products.iter().all(|p| p.image_count == 0));
    }
}
