use super::repository;
use contracts::domain::a003_product::aggregate::{Product, ProductDto};
use contracts::domain::common::{slugify, EntityMetadata};
use uuid::Uuid;

fn product_from_dto(dto: ProductDto) -> anyhow::Result<Product> {
    let technique_id = Uuid::parse_str(dto.technique_id.trim())
        .map_err(|_| anyhow::anyhow!("Invalid technique id"))?;
    let season_id = match dto.season_id.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => {
            Some(Uuid::parse_str(s).map_err(|_| anyhow::anyhow!("Invalid season id"))?)
        }
        _ => None,
    };

    let name = dto.name.trim().to_string();
    Ok(Product {
        id: Uuid::new_v4(),
        slug: slugify(&name),
        name,
        model_number: dto.model_number.filter(|s| !s.trim().is_empty()),
        brand_name: dto.brand_name.filter(|s| !s.trim().is_empty()),
        technique_id,
        season_id,
        images: dto.images,
        sizes: dto.sizes,
        specifications: dto.specifications.normalized(),
        features: dto.features,
        customization: dto.customization.unwrap_or_default(),
        oem_service: dto
            .oem_service
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "Available".to_string()),
        description: dto.description.filter(|s| !s.trim().is_empty()),
        in_stock: dto.in_stock.unwrap_or(true),
        featured: dto.featured.unwrap_or(false),
        metadata: EntityMetadata::new(),
    })
}

pub async fn create(dto: ProductDto) -> anyhow::Result<Uuid> {
    let mut aggregate = product_from_dto(dto)?;

    aggregate
        .validate()
        .map_err(|e| anyhow::anyhow!("Validation failed: {}", e))?;
    aggregate.before_write();

    repository::insert(&aggregate).await
}

/// Persist one record produced by the bulk import. Validation errors
/// and constraint violations are the caller's per-record errors.
pub async fn create_imported(mut aggregate: Product) -> anyhow::Result<Uuid> {
    aggregate
        .validate()
        .map_err(|e| anyhow::anyhow!("Validation failed: {}", e))?;
    aggregate.before_write();

    repository::insert(&aggregate).await
}

pub async fn update(dto: ProductDto) -> anyhow::Result<()> {
    let id = dto
        .id
        .as_ref()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| anyhow::anyhow!("Invalid ID"))?;

    let existing = repository::get_by_id(id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Not found"))?;

    let mut aggregate = product_from_dto(dto)?;
    aggregate.id = existing.id;
    aggregate.metadata.created_at = existing.metadata.created_at;
    aggregate.metadata.active = existing.metadata.active;

    aggregate
        .validate()
        .map_err(|e| anyhow::anyhow!("Validation failed: {}", e))?;
    aggregate.before_write();

    repository::update(&aggregate).await
}

pub async fn delete(id: Uuid) -> anyhow::Result<bool> {
    repository::deactivate(id).await
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Product>> {
    repository::get_by_id(id).await
}

pub async fn get_by_slug(slug: &str) -> anyhow::Result<Option<Product>> {
    repository::get_by_slug(slug).await
}

pub async fn list_all() -> anyhow::Result<Vec<Product>> {
    repository::list_all().await
}
