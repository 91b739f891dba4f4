use chrono::Utc;
use contracts::domain::a003_product::aggregate::Product;
use contracts::domain::common::EntityMetadata;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::shared::data::db::get_connection;

/// Nested collections (images, sizes, specifications, features,
/// customization) are stored as JSON columns.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a003_product")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub slug: String,
    pub model_number: Option<String>,
    pub brand_name: Option<String>,
    pub technique_id: String,
    pub season_id: Option<String>,
    pub images: Json,
    pub sizes: Json,
    pub specifications: Json,
    pub features: Json,
    pub customization: Json,
    pub oem_service: String,
    pub description: Option<String>,
    pub in_stock: bool,
    pub featured: bool,
    pub active: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Product {
    fn from(m: Model) -> Self {
        Product {
            id: Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4()),
            name: m.name,
            slug: m.slug,
            model_number: m.model_number,
            brand_name: m.brand_name,
            technique_id: Uuid::parse_str(&m.technique_id).unwrap_or_else(|_| Uuid::nil()),
            season_id: m
                .season_id
                .as_deref()
                .and_then(|s| Uuid::parse_str(s).ok()),
            images: serde_json::from_value(m.images).unwrap_or_default(),
            sizes: serde_json::from_value(m.sizes).unwrap_or_default(),
            specifications: serde_json::from_value(m.specifications).unwrap_or_default(),
            features: serde_json::from_value(m.features).unwrap_or_default(),
            customization: serde_json::from_value(m.customization).unwrap_or_default(),
            oem_service: m.oem_service,
            description: m.description,
            in_stock: m.in_stock,
            featured: m.featured,
            metadata: EntityMetadata {
                created_at: m.created_at.unwrap_or_else(Utc::now),
                updated_at: m.updated_at.unwrap_or_else(Utc::now),
                active: m.active,
            },
        }
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

fn to_active_model(aggregate: &Product) -> anyhow::Result<ActiveModel> {
    Ok(ActiveModel {
        id: Set(aggregate.id.to_string()),
        name: Set(aggregate.name.clone()),
        slug: Set(aggregate.slug.clone()),
        model_number: Set(aggregate.model_number.clone()),
        brand_name: Set(aggregate.brand_name.clone()),
        technique_id: Set(aggregate.technique_id.to_string()),
        season_id: Set(aggregate.season_id.map(|id| id.to_string())),
        images: Set(serde_json::to_value(&aggregate.images)?),
        sizes: Set(serde_json::to_value(&aggregate.sizes)?),
        specifications: Set(serde_json::to_value(&aggregate.specifications)?),
        features: Set(serde_json::to_value(&aggregate.features)?),
        customization: Set(serde_json::to_value(&aggregate.customization)?),
        oem_service: Set(aggregate.oem_service.clone()),
        description: Set(aggregate.description.clone()),
        in_stock: Set(aggregate.in_stock),
        featured: Set(aggregate.featured),
        active: Set(aggregate.metadata.active),
        created_at: Set(Some(aggregate.metadata.created_at)),
        updated_at: Set(Some(aggregate.metadata.updated_at)),
    })
}

pub async fn list_all() -> anyhow::Result<Vec<Product>> {
    let items = Entity::find()
        .filter(Column::Active.eq(true))
        .order_by_asc(Column::Name)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Product>> {
    let result = Entity::find_by_id(id.to_string()).one(conn()).await?;
    Ok(result.map(Into::into))
}

pub async fn get_by_slug(slug: &str) -> anyhow::Result<Option<Product>> {
    let result = Entity::find()
        .filter(Column::Slug.eq(slug))
        .one(conn())
        .await?;
    Ok(result.map(Into::into))
}

/// Inserts a single product. A duplicate slug violates the UNIQUE
/// constraint and surfaces as an error on this call only.
pub async fn insert(aggregate: &Product) -> anyhow::Result<Uuid> {
    to_active_model(aggregate)?.insert(conn()).await?;
    Ok(aggregate.id)
}

pub async fn update(aggregate: &Product) -> anyhow::Result<()> {
    let mut active = to_active_model(aggregate)?;
    active.created_at = sea_orm::ActiveValue::NotSet;
    active.update(conn()).await?;
    Ok(())
}

pub async fn deactivate(id: Uuid) -> anyhow::Result<bool> {
    use sea_orm::sea_query::Expr;
    let result = Entity::update_many()
        .col_expr(Column::Active, Expr::value(false))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(id.to_string()))
        .exec(conn())
        .await?;
    Ok(result.rows_affected > 0)
}
