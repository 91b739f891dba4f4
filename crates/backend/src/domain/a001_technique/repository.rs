use chrono::Utc;
use contracts::domain::a001_technique::aggregate::Technique;
use contracts::domain::common::EntityMetadata;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a001_technique")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub slug: String,
    pub display_order: i32,
    pub active: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Technique {
    fn from(m: Model) -> Self {
        Technique {
            id: Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4()),
            name: m.name,
            slug: m.slug,
            display_order: m.display_order,
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

fn to_active_model(aggregate: &Technique) -> ActiveModel {
    ActiveModel {
        id: Set(aggregate.id.to_string()),
        name: Set(aggregate.name.clone()),
        slug: Set(aggregate.slug.clone()),
        display_order: Set(aggregate.display_order),
        active: Set(aggregate.metadata.active),
        created_at: Set(Some(aggregate.metadata.created_at)),
        updated_at: Set(Some(aggregate.metadata.updated_at)),
    }
}

pub async fn list_all() -> anyhow::Result<Vec<Technique>> {
    let items = Entity::find()
        .order_by_asc(Column::DisplayOrder)
        .order_by_asc(Column::Name)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Technique>> {
    let result = Entity::find_by_id(id.to_string()).one(conn()).await?;
    Ok(result.map(Into::into))
}

pub async fn insert(aggregate: &Technique) -> anyhow::Result<Uuid> {
    to_active_model(aggregate).insert(conn()).await?;
    Ok(aggregate.id)
}

pub async fn update(aggregate: &Technique) -> anyhow::Result<()> {
    let mut active = to_active_model(aggregate);
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
