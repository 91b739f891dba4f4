use std::collections::HashMap;

use contracts::domain::a003_product::aggregate::Product;
use contracts::domain::common::{slugify, EntityMetadata};
use contracts::usecases::u401_bulk_import::response::{
    BulkCreateResult, CreatedProductSummary, CreationError, ParsedProductRow,
};
use uuid::Uuid;

use crate::domain::{a001_technique, a002_season, a003_product};

/// Case-insensitive name→id lookup table, built once per call and
/// shared read-only across the whole batch.
pub fn name_lookup(pairs: impl IntoIterator<Item = (String, Uuid)>) -> HashMap<String, Uuid> {
    pairs
        .into_iter()
        .map(|(name, id)| (name.trim().to_lowercase(), id))
        .collect()
}

/// Turn one parsed row into a persistable product. Technique is
/// mandatory: an unknown name fails this record (and only this
/// record). An unknown season is silently omitted. Empty-string
/// optional fields are dropped so they never reach persistence — the
/// operator may have edited rows between the parse and create steps.
pub fn resolve_product(
    row: &ParsedProductRow,
    techniques: &HashMap<String, Uuid>,
    seasons: &HashMap<String, Uuid>,
) -> Result<Product, String> {
    let technique_id = techniques
        .get(&row.technique.trim().to_lowercase())
        .copied()
        .ok_or_else(|| format!("Technique not found: {}", row.technique))?;

    let season_id = row
        .season
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| seasons.get(&s.to_lowercase()).copied());

    fn keep(value: &Option<String>) -> Option<String> {
        value
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    let name = row.name.trim().to_string();
    let slug = if row.slug.trim().is_empty() {
        slugify(&name)
    } else {
        row.slug.trim().to_string()
    };

    Ok(Product {
        id: Uuid::new_v4(),
        name,
        slug,
        model_number: keep(&row.model_number),
        brand_name: keep(&row.brand_name),
        technique_id,
        season_id,
        images: row.images.clone(),
        sizes: row.sizes.clone(),
        specifications: row.specifications.clone().normalized(),
        features: row.features.clone(),
        customization: row.customization.clone(),
        oem_service: if row.oem_service.trim().is_empty() {
            "Available".to_string()
        } else {
            row.oem_service.trim().to_string()
        },
        description: keep(&row.description),
        in_stock: row.in_stock,
        featured: row.featured,
        metadata: EntityMetadata::new(),
    })
}

/// Create the whole batch, one insert per record, collecting
/// per-record failures. No transaction spans the batch: partial
/// success is the expected outcome, and errors keep the source row
/// number so the operator can resubmit just the failing subset.
pub async fn create_products(rows: &[ParsedProductRow]) -> anyhow::Result<BulkCreateResult> {
    // One bulk fetch for the whole batch; no per-row queries.
    let techniques = a001_technique::service::list_all().await?;
    let seasons = a002_season::service::list_all().await?;
    let technique_map = name_lookup(techniques.into_iter().map(|t| (t.name, t.id)));
    let season_map = name_lookup(seasons.into_iter().map(|s| (s.name, s.id)));

    let mut created = Vec::new();
    let mut errors = Vec::new();

    for row in rows {
        match resolve_product(row, &technique_map, &season_map) {
            Ok(product) => {
                let name = product.name.clone();
                let slug = product.slug.clone();
                match a003_product::service::create_imported(product).await {
                    Ok(id) => created.push(CreatedProductSummary { id, name, slug }),
                    Err(e) => {
                        tracing::warn!("Bulk create failed for row {}: {}", row.row_number, e);
                        errors.push(CreationError {
                            product: row.name.clone(),
                            row: row.row_number,
                            error: e.to_string(),
                        });
                    }
                }
            }
            Err(error) => {
                tracing::warn!("Bulk create failed for row {}: {}", row.row_number, error);
                errors.push(CreationError {
                    product: row.name.clone(),
                    row: row.row_number,
                    error,
                });
            }
        }
    }

    Ok(BulkCreateResult {
        total: rows.len(),
        success_count: created.len(),
        error_count: errors.len(),
        created,
        errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::u401_bulk_import::csv_parse::parse_products_csv;
    use contracts::domain::a003_product::aggregate::Specifications;
    use contracts::usecases::u401_bulk_import::response::MatchedBy;

    fn lookup(names: &[&str]) -> HashMap<String, Uuid> {
        name_lookup(names.iter().map(|n| (n.to_string(), Uuid::new_v4())))
    }

    fn sample_row(technique: &str, season: Option<&str>) -> ParsedProductRow {
        ParsedProductRow {
            name: "Cushion Cover".to_string(),
            slug: "cushion-cover".to_string(),
            model_number: Some("MC-001".to_string()),
            brand_name: None,
            technique: technique.to_string(),
            season: season.map(str::to_string),
            images: Vec::new(),
            sizes: Vec::new(),
            specifications: Specifications::default(),
            features: Vec::new(),
            customization: Default::default(),
            oem_service: "Available".to_string(),
            description: None,
            in_stock: true,
            featured: false,
            row_number: 2,
            image_count: 0,
            matched_by: MatchedBy::None,
        }
    }

    #[test]
    fn unknown_technique_fails_the_record_with_its_name() {
        let techniques = lookup(&["Weaving"]);
        let seasons = lookup(&[]);
        let row = sample_row("Block Printing", None);
        let err = resolve_product(&row, &techniques, &seasons).unwrap_err();
        assert_eq!(err, "Technique not found: Block Printing");
    }

    #[test]
    fn technique_lookup_is_case_insensitive() {
        let techniques = lookup(&["Block Printing"]);
        let seasons = lookup(&[]);
        let row = sample_row("  bLoCk pRiNtInG ", None);
        let product = resolve_product(&row, &techniques, &seasons).unwrap();
        assert_eq!(product.technique_id, techniques["block printing"]);
    }

    #[test]
    fn unknown_season_is_silently_omitted() {
        let techniques = lookup(&["Weaving"]);
        let seasons = lookup(&["Summer"]);
        let row = sample_row("Weaving", Some("Unknown Season"));
        let product = resolve_product(&row, &techniques, &seasons).unwrap();
        assert!(product.season_id.is_none());
    }

    #[test]
    fn known_season_resolves() {
        let techniques = lookup(&["Weaving"]);
        let seasons = lookup(&["Summer"]);
        let row = sample_row("Weaving", Some("summer"));
        let product = resolve_product(&row, &techniques, &seasons).unwrap();
        assert_eq!(product.season_id, Some(seasons["summer"]));
    }

    #[test]
    fn empty_string_optionals_are_stripped() {
        let techniques = lookup(&["Weaving"]);
        let seasons = lookup(&[]);
        let mut row = sample_row("Weaving", Some("   "));
        row.model_number = Some("  ".to_string());
        row.description = Some(String::new());
        row.specifications = Specifications {
            material: Some("Cotton".to_string()),
            fabric: Some("".to_string()),
            ..Default::default()
        };
        let product = resolve_product(&row, &techniques, &seasons).unwrap();
        assert!(product.model_number.is_none());
        assert!(product.description.is_none());
        assert!(product.season_id.is_none());
        assert_eq!(product.specifications.material.as_deref(), Some("Cotton"));
        assert!(product.specifications.fabric.is_none());
    }

    #[test]
    fn one_bad_record_does_not_poison_resolution_of_the_next() {
        let techniques = lookup(&["Weaving"]);
        let seasons = lookup(&[]);
        let bad = sample_row("Unknown", None);
        let good = sample_row("Weaving", None);
        assert!(resolve_product(&bad, &techniques, &seasons).is_err());
        assert!(resolve_product(&good, &techniques, &seasons).is_ok());
    }

    #[tokio::test]
    async fn bulk_create_isolates_failures_and_keeps_row_numbers() {
        use contracts::domain::a001_technique::aggregate::TechniqueDto;

        let db_file =
            std::env::temp_dir().join(format!("storefront-test-{}.db", Uuid::new_v4()));
        crate::shared::data::db::initialize_database(db_file.to_str())
            .await
            .unwrap();

        a001_technique::service::create(TechniqueDto {
            id: None,
            name: "Weaving".to_string(),
            display_order: None,
            active: None,
        })
        .await
        .unwrap();

        // Row 2 names an unknown technique; rows 3 and 4 share a name,
        // so the second insert hits the UNIQUE slug index; row 5 must
        // still be created after that failure.
        let mut unknown = sample_row("Block Printing", None);
        unknown.row_number = 2;
        let mut first = sample_row("Weaving", None);
        first.row_number = 3;
        let mut duplicate = sample_row("Weaving", None);
        duplicate.row_number = 4;
        let mut last = sample_row("Weaving", None);
        last.name = "Table Runner".to_string();
        last.slug = "table-runner".to_string();
        last.row_number = 5;

        let result = create_products(&[unknown, first, duplicate, last])
            .await
            .unwrap();

        assert_eq!(result.total, 4);
        assert_eq!(result.success_count, 2);
        assert_eq!(result.error_count, 2);
        assert_eq!(result.success_count, result.created.len());

        assert_eq!(result.created[0].name, "Cushion Cover");
        assert_eq!(result.created[1].name, "Table Runner");

        assert_eq!(result.errors[0].row, 2);
        assert!(result.errors[0].error.contains("Block Printing"));
        assert_eq!(result.errors[1].row, 4);
        assert_eq!(result.errors[1].product, "Cushion Cover");
        assert!(result.errors[1].error.contains("UNIQUE"));

        let _ = std::fs::remove_file(&db_file);
    }

    #[test]
    fn end_to_end_parse_then_resolve() {
        let mapping: HashMap<String, String> = [
            ("MC-002-2.jpg".to_string(), "U2".to_string()),
            ("MC-002-1.jpg".to_string(), "U1".to_string()),
            ("manual.jpg".to_string(), "UM".to_string()),
        ]
        .into_iter()
        .collect();

        // Row 2 misses technique; row 3 lists an image by hand; row 4
        // auto-matches on its model number.
        let csv = "name,technique,modelNumber,images\n\
                   Broken Row,,MC-001,\n\
                   Manual Row,Weaving,,manual.jpg\n\
                   Auto Row,Block Printing,MC-002,\n";
        let parsed = parse_products_csv(csv, &mapping).unwrap();
        assert_eq!(parsed.total, 3);
        assert_eq!(parsed.valid_count, 2);
        assert_eq!(parsed.error_count, 1);

        let auto_row = &parsed.products[1];
        assert_eq!(auto_row.matched_by, MatchedBy::Auto);
        assert_eq!(auto_row.images[0].url, "U1");
        assert_eq!(auto_row.images[1].url, "U2");

        let techniques = lookup(&["Weaving", "Block Printing"]);
        let seasons = lookup(&["Summer"]);
        let resolved: Vec<_> = parsed
            .products
            .iter()
            .map(|row| resolve_product(row, &techniques, &seasons))
            .collect();
        assert!(resolved.iter().all(Result::is_ok));
    }
}
