use super::repository;
use contracts::domain::a002_season::aggregate::{Season, SeasonDto};
use uuid::Uuid;

pub async fn create(dto: SeasonDto) -> anyhow::Result<Uuid> {
    let mut aggregate =
        Season::new_for_insert(dto.name.trim().to_string(), dto.display_order.unwrap_or(0));

    aggregate
        .validate()
        .map_err(|e| anyhow::anyhow!("Validation failed: {}", e))?;
    aggregate.before_write();

    repository::insert(&aggregate).await
}

pub async fn update(dto: SeasonDto) -> anyhow::Result<()> {
    let id = dto
        .id
        .as_ref()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| anyhow::anyhow!("Invalid ID"))?;

    let mut aggregate = repository::get_by_id(id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Not found"))?;

    aggregate.apply(&dto);
    aggregate
        .validate()
        .map_err(|e| anyhow::anyhow!("Validation failed: {}", e))?;
    aggregate.before_write();

    repository::update(&aggregate).await
}

pub async fn delete(id: Uuid) -> anyhow::Result<bool> {
    repository::deactivate(id).await
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Season>> {
    repository::get_by_id(id).await
}

pub async fn list_all() -> anyhow::Result<Vec<Season>> {
    repository::list_all().await
}
