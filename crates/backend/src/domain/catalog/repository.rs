use chrono::Utc;
use contracts::domain::catalog::{CatalogEntity, ResourceKind};
use contracts::shared::metadata::FieldMap;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Expr, Order};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set};

mod entity {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "catalog_entity")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub resource: String,
        pub name: String,
        pub code: Option<String>,
        pub description: Option<String>,
        pub is_active: bool,
        pub display_order: Option<i32>,
        /// Kind-specific fields as a JSON object
        pub attributes: String,
        pub created_at: Option<chrono::DateTime<chrono::Utc>>,
        pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

impl From<entity::Model> for CatalogEntity {
    fn from(m: entity::Model) -> Self {
        let attributes = serde_json::from_str::<FieldMap>(&m.attributes).unwrap_or_else(|e| {
            tracing::warn!("Broken attributes JSON in catalog_entity {}: {}", m.id, e);
            FieldMap::new()
        });

        CatalogEntity {
            id: m.id,
            name: m.name,
            code: m.code,
            description: m.description,
            is_active: m.is_active,
            display_order: m.display_order,
            created_at: m.created_at,
            updated_at: m.updated_at,
            attributes,
        }
    }
}

fn attributes_json(entity: &CatalogEntity) -> String {
    serde_json::Value::Object(entity.attributes.clone()).to_string()
}

// ============================================================================
// Filters
// ============================================================================

/// Parsed list filters of one resource kind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFilter {
    /// Substring of name or code
    pub search: Option<String>,
    pub is_active: Option<bool>,
    /// Reference field key and required target ID
    pub references: Vec<(String, i64)>,
}

fn scoped(kind: ResourceKind, filter: &ListFilter) -> Select<entity::Entity> {
    let mut query = entity::Entity::find().filter(entity::Column::Resource.eq(kind.collection_name()));

    if let Some(search) = filter.search.as_deref() {
        let pattern = format!("%{}%", escape_like(search));
        query = query.filter(Expr::cust_with_values(
            "(name LIKE ? ESCAPE '!' OR code LIKE ? ESCAPE '!')",
            [sea_orm::Value::from(pattern.clone()), sea_orm::Value::from(pattern)],
        ));
    }

    if let Some(is_active) = filter.is_active {
        query = query.filter(entity::Column::IsActive.eq(is_active));
    }

    for (key, id) in &filter.references {
        query = query.filter(Expr::cust_with_values(
            "json_extract(attributes, ?) = ?",
            [sea_orm::Value::from(format!("$.{}", key)), sea_orm::Value::from(*id)],
        ));
    }

    query
}

const LIKE_ESCAPE: char = '!';

/// Escape LIKE wildcards so the search matches them literally
fn escape_like(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len());
    for ch in search.chars() {
        if matches!(ch, LIKE_ESCAPE | '%' | '_') {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(ch);
    }
    escaped
}

// ============================================================================
// Repository Functions
// ============================================================================

/// Количество записей справочника с учётом фильтров
pub async fn count(
    db: &DatabaseConnection,
    kind: ResourceKind,
    filter: &ListFilter,
) -> Result<u64, DbErr> {
    scoped(kind, filter).count(db).await
}

/// Страница записей: `display_order` (пустые в конце), затем `id`
pub async fn fetch_page(
    db: &DatabaseConnection,
    kind: ResourceKind,
    filter: &ListFilter,
    offset: u64,
    limit: u64,
) -> Result<Vec<CatalogEntity>, DbErr> {
    let models = scoped(kind, filter)
        .order_by(Expr::cust("display_order IS NULL"), Order::Asc)
        .order_by_asc(entity::Column::DisplayOrder)
        .order_by_asc(entity::Column::Id)
        .offset(offset)
        .limit(limit)
        .all(db)
        .await?;

    Ok(models.into_iter().map(Into::into).collect())
}

pub async fn find_by_id(
    db: &DatabaseConnection,
    kind: ResourceKind,
    id: i64,
) -> Result<Option<CatalogEntity>, DbErr> {
    let model = entity::Entity::find_by_id(id)
        .filter(entity::Column::Resource.eq(kind.collection_name()))
        .one(db)
        .await?;
    Ok(model.map(Into::into))
}

pub async fn find_many(
    db: &DatabaseConnection,
    kind: ResourceKind,
    ids: &[i64],
) -> Result<Vec<CatalogEntity>, DbErr> {
    let models = entity::Entity::find()
        .filter(entity::Column::Resource.eq(kind.collection_name()))
        .filter(entity::Column::Id.is_in(ids.iter().copied()))
        .all(db)
        .await?;
    Ok(models.into_iter().map(Into::into).collect())
}

/// Whether `code` is used by another record of the same kind
pub async fn code_taken(
    db: &DatabaseConnection,
    kind: ResourceKind,
    code: &str,
    except_id: Option<i64>,
) -> Result<bool, DbErr> {
    let mut query = entity::Entity::find()
        .filter(entity::Column::Resource.eq(kind.collection_name()))
        .filter(entity::Column::Code.eq(code));
    if let Some(id) = except_id {
        query = query.filter(entity::Column::Id.ne(id));
    }
    Ok(query.count(db).await? > 0)
}

pub async fn insert(db: &DatabaseConnection, kind: ResourceKind, entity: &CatalogEntity) -> Result<i64, DbErr> {
    let now = Utc::now();
    let active = entity::ActiveModel {
        id: sea_orm::ActiveValue::NotSet,
        resource: Set(kind.collection_name().to_string()),
        name: Set(entity.name.clone()),
        code: Set(entity.code.clone()),
        description: Set(entity.description.clone()),
        is_active: Set(entity.is_active),
        display_order: Set(entity.display_order),
        attributes: Set(attributes_json(entity)),
        created_at: Set(Some(now)),
        updated_at: Set(Some(now)),
    };
    let model = active.insert(db).await?;
    Ok(model.id)
}

pub async fn update(db: &DatabaseConnection, kind: ResourceKind, entity: &CatalogEntity) -> Result<(), DbErr> {
    let active = entity::ActiveModel {
        id: Set(entity.id),
        resource: Set(kind.collection_name().to_string()),
        name: Set(entity.name.clone()),
        code: Set(entity.code.clone()),
        description: Set(entity.description.clone()),
        is_active: Set(entity.is_active),
        display_order: Set(entity.display_order),
        attributes: Set(attributes_json(entity)),
        created_at: sea_orm::ActiveValue::NotSet,
        updated_at: Set(Some(Utc::now())),
    };
    active.update(db).await?;
    Ok(())
}

pub async fn delete(db: &DatabaseConnection, kind: ResourceKind, id: i64) -> Result<bool, DbErr> {
    let result = entity::Entity::delete_many()
        .filter(entity::Column::Resource.eq(kind.collection_name()))
        .filter(entity::Column::Id.eq(id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

pub async fn delete_many(db: &DatabaseConnection, kind: ResourceKind, ids: &[i64]) -> Result<u64, DbErr> {
    if ids.is_empty() {
        return Ok(0);
    }
    let result = entity::Entity::delete_many()
        .filter(entity::Column::Resource.eq(kind.collection_name()))
        .filter(entity::Column::Id.is_in(ids.iter().copied()))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}
