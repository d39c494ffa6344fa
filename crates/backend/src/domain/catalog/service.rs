use contracts::domain::catalog::{BulkDeleteResponse, CatalogEntity, ResourceKind};
use contracts::shared::api_error::FieldErrors;
use contracts::shared::metadata::FieldMap;
use contracts::shared::pagination::{Page, PageMeta, PageQuery};
use contracts::shared::upload::{self, ImageChange};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use std::path::Path;

use super::error::CatalogError;
use super::repository::{self, ListFilter};
use crate::shared::config::PaginationConfig;
use crate::shared::uploads::{self, MultipartForm};

/// Resolve the collection segment of a URL
pub fn resolve_kind(collection: &str) -> Result<ResourceKind, CatalogError> {
    ResourceKind::from_collection(collection)
        .ok_or_else(|| CatalogError::UnknownCollection(collection.to_string()))
}

/// Build repository filters from query parameters; keys the kind does not
/// filter by and malformed values are ignored
pub fn parse_filter(kind: ResourceKind, query: &PageQuery) -> ListFilter {
    let mut filter = ListFilter::default();
    for (key, value) in &query.filters {
        let value = value.trim();
        if value.is_empty() || !kind.is_filter_key(key) {
            continue;
        }
        match key.as_str() {
            "search" => filter.search = Some(value.to_string()),
            "is_active" => filter.is_active = upload::parse_flag(value),
            reference => match value.parse::<i64>() {
                Ok(id) => filter.references.push((reference.to_string(), id)),
                Err(_) => tracing::debug!("Ignoring non-numeric filter {}={}", reference, value),
            },
        }
    }
    filter
}

/// Страница справочника; `page` приводится к диапазону `[1, last_page]`
pub async fn list(
    db: &DatabaseConnection,
    kind: ResourceKind,
    query: &PageQuery,
    limits: PaginationConfig,
) -> Result<Page<CatalogEntity>, CatalogError> {
    let filter = parse_filter(kind, query);
    let per_page = limits.clamp_per_page(query.per_page);

    let total = repository::count(db, kind, &filter).await?;
    let meta = PageMeta::compute(total, per_page, query.page);
    let items = repository::fetch_page(db, kind, &filter, meta.offset(), meta.per_page).await?;

    Ok(Page::new(items, meta))
}

pub async fn get_by_id(
    db: &DatabaseConnection,
    kind: ResourceKind,
    id: i64,
) -> Result<CatalogEntity, CatalogError> {
    repository::find_by_id(db, kind, id)
        .await?
        .ok_or(CatalogError::NotFound(id))
}

/// Создание записи
pub async fn create(
    db: &DatabaseConnection,
    kind: ResourceKind,
    input: &FieldMap,
) -> Result<CatalogEntity, CatalogError> {
    // Start from the blank record so omitted flags keep their defaults
    let mut entity = CatalogEntity::blank();
    entity.patch_fields(kind, input);
    check(db, kind, input, &entity, None, false).await?;

    let id = repository::insert(db, kind, &entity).await?;
    tracing::info!("Created {} {}", kind, id);
    get_by_id(db, kind, id).await
}

/// Полная замена редактируемых полей (PUT)
pub async fn update(
    db: &DatabaseConnection,
    kind: ResourceKind,
    id: i64,
    input: &FieldMap,
) -> Result<CatalogEntity, CatalogError> {
    let mut entity = get_by_id(db, kind, id).await?;
    entity.replace_fields(kind, input);
    check(db, kind, input, &entity, Some(id), false).await?;

    repository::update(db, kind, &entity).await?;
    get_by_id(db, kind, id).await
}

/// Изменение только переданных полей (PATCH)
pub async fn patch(
    db: &DatabaseConnection,
    kind: ResourceKind,
    id: i64,
    input: &FieldMap,
) -> Result<CatalogEntity, CatalogError> {
    let mut entity = get_by_id(db, kind, id).await?;
    entity.patch_fields(kind, input);
    check(db, kind, input, &entity, Some(id), true).await?;

    repository::update(db, kind, &entity).await?;
    get_by_id(db, kind, id).await
}

/// Field rules, code uniqueness and existence of referenced records
async fn check(
    db: &DatabaseConnection,
    kind: ResourceKind,
    input: &FieldMap,
    entity: &CatalogEntity,
    self_id: Option<i64>,
    partial: bool,
) -> Result<(), CatalogError> {
    let mut errors = CatalogEntity::validate_input(kind, input, partial);

    if let Some(code) = entity.code.as_deref() {
        let touched = !partial || input.contains_key("code");
        if touched
            && !errors.contains_key("code")
            && repository::code_taken(db, kind, code, self_id).await?
        {
            errors.insert("code".to_string(), "Код уже используется".to_string());
        }
    }

    for spec in kind.reference_fields() {
        // a changed parent re-checks its dependents even when they are not in the payload
        let touched = input.contains_key(spec.key)
            || spec.depends_on.is_some_and(|parent| input.contains_key(parent));
        if errors.contains_key(spec.key) || (partial && !touched) {
            continue;
        }
        let (Some(target), Some(ref_id)) = (spec.options_from, entity.reference_id(spec.key)) else {
            continue;
        };
        let Some(referenced) = repository::find_by_id(db, target, ref_id).await? else {
            errors.insert(
                spec.key.to_string(),
                format!("{}: выбранное значение не найдено", spec.label),
            );
            continue;
        };
        if let Some(parent) = spec.depends_on {
            if referenced.reference_id(parent) != entity.reference_id(parent) {
                errors.insert(
                    spec.key.to_string(),
                    format!("{}: значение относится к другому родителю", spec.label),
                );
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(CatalogError::Validation(errors))
    }
}

/// Удаление записи; защищённые записи удалять нельзя
pub async fn delete(
    db: &DatabaseConnection,
    kind: ResourceKind,
    id: i64,
    uploads_dir: &Path,
) -> Result<(), CatalogError> {
    let entity = get_by_id(db, kind, id).await?;
    if entity.is_protected(kind) {
        return Err(CatalogError::Protected(id));
    }

    repository::delete(db, kind, id).await?;
    remove_images(kind, &entity, uploads_dir);
    tracing::info!("Deleted {} {}", kind, id);
    Ok(())
}

/// Массовое удаление: защищённые записи пропускаются и возвращаются в `skipped`
pub async fn bulk_delete(
    db: &DatabaseConnection,
    kind: ResourceKind,
    ids: &[i64],
    uploads_dir: &Path,
) -> Result<BulkDeleteResponse, CatalogError> {
    if ids.is_empty() {
        return Err(CatalogError::field("ids", "Не выбрано ни одной записи"));
    }

    let found = repository::find_many(db, kind, ids).await?;
    let (protected, deletable): (Vec<CatalogEntity>, Vec<CatalogEntity>) =
        found.into_iter().partition(|e| e.is_protected(kind));

    let deletable_ids: Vec<i64> = deletable.iter().map(|e| e.id).collect();
    let deleted = repository::delete_many(db, kind, &deletable_ids).await?;
    for entity in &deletable {
        remove_images(kind, entity, uploads_dir);
    }

    let skipped: Vec<i64> = protected.iter().map(|e| e.id).collect();
    tracing::info!("Bulk deleted {} {} (skipped {:?})", deleted, kind, skipped);
    Ok(BulkDeleteResponse { deleted, skipped })
}

/// Apply image changes from a multipart form to a record
pub async fn store_images(
    db: &DatabaseConnection,
    kind: ResourceKind,
    id: i64,
    form: &MultipartForm,
    uploads_dir: &Path,
) -> Result<CatalogEntity, CatalogError> {
    let mut entity = get_by_id(db, kind, id).await?;

    let mut errors = FieldErrors::new();
    for spec in kind.image_fields() {
        if let Some(file) = form.files.get(spec.key) {
            if uploads::image_extension(&file.file_name).is_none() {
                errors.insert(
                    spec.key.to_string(),
                    format!("{}: допустимы только изображения", spec.label),
                );
            }
        }
    }
    if !errors.is_empty() {
        return Err(CatalogError::Validation(errors));
    }

    // New files are written first; old ones go only once the row points away from them
    let mut stored = Vec::new();
    let mut replaced = Vec::new();
    for spec in kind.image_fields() {
        let previous = entity.attributes.get(spec.key).and_then(Value::as_str).map(str::to_string);
        match form.image_change(spec.key) {
            ImageChange::Keep => continue,
            ImageChange::Replace { .. } => {
                let Some(file) = form.files.get(spec.key) else {
                    continue;
                };
                let url = match uploads::store(uploads_dir, kind.collection_name(), file) {
                    Ok(url) => url,
                    Err(e) => {
                        discard(uploads_dir, &stored);
                        return Err(e.into());
                    }
                };
                stored.push(url.clone());
                entity.attributes.insert(spec.key.to_string(), Value::String(url));
            }
            ImageChange::Remove => {
                entity.attributes.remove(spec.key);
            }
        }
        replaced.extend(previous);
    }

    if stored.is_empty() && replaced.is_empty() {
        return get_by_id(db, kind, id).await;
    }

    if let Err(e) = repository::update(db, kind, &entity).await {
        discard(uploads_dir, &stored);
        return Err(e.into());
    }
    discard(uploads_dir, &replaced);
    get_by_id(db, kind, id).await
}

fn discard(uploads_dir: &Path, urls: &[String]) {
    for url in urls {
        uploads::remove(uploads_dir, url);
    }
}

fn remove_images(kind: ResourceKind, entity: &CatalogEntity, uploads_dir: &Path) {
    for spec in kind.image_fields() {
        if let Some(url) = entity.attributes.get(spec.key).and_then(Value::as_str) {
            uploads::remove(uploads_dir, url);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db;
    use crate::shared::uploads::UploadedFile;
    use sea_orm::ConnectionTrait;
    use serde_json::json;

    async fn test_db() -> (tempfile::TempDir, DatabaseConnection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = db::connect(&dir.path().join("test.db")).await.unwrap();
        (dir, conn)
    }

    fn fields(value: Value) -> FieldMap {
        match value {
            Value::Object(map) => map,
            _ => panic!("object expected"),
        }
    }

    fn cover_form(file_name: &str) -> MultipartForm {
        let mut form = MultipartForm::default();
        form.files.insert(
            "cover".into(),
            UploadedFile {
                file_name: file_name.into(),
                bytes: vec![7; 16],
            },
        );
        form
    }

    fn limits() -> PaginationConfig {
        PaginationConfig {
            default_per_page: 10,
            max_per_page: 100,
        }
    }

    async fn seed_metals(db: &DatabaseConnection, count: usize) -> Vec<CatalogEntity> {
        let mut created = Vec::new();
        for i in 1..=count {
            let input = fields(json!({"name": format!("Металл {}", i), "code": format!("M{:02}", i)}));
            created.push(create(db, ResourceKind::Metal, &input).await.unwrap());
        }
        created
    }

    #[tokio::test]
    async fn second_page_of_twenty_five_metals() {
        let (_dir, db) = test_db().await;
        let metals = seed_metals(&db, 25).await;

        let mut query = PageQuery::new(10);
        query.page = 2;
        let page = list(&db, ResourceKind::Metal, &query, limits()).await.unwrap();

        assert_eq!(page.meta.current_page, 2);
        assert_eq!(page.meta.last_page, 3);
        assert_eq!(page.meta.total, 25);
        assert_eq!((page.meta.from, page.meta.to), (Some(11), Some(20)));
        let ids: Vec<i64> = page.items.iter().map(|e| e.id).collect();
        let expected: Vec<i64> = metals[10..20].iter().map(|e| e.id).collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn page_size_is_capped_and_page_clamped() {
        let (_dir, db) = test_db().await;
        seed_metals(&db, 12).await;

        let mut query = PageQuery::new(500);
        query.page = 9;
        let small = PaginationConfig {
            default_per_page: 5,
            max_per_page: 5,
        };
        let page = list(&db, ResourceKind::Metal, &query, small).await.unwrap();
        assert_eq!(page.meta.per_page, 5);
        assert_eq!(page.meta.current_page, 3);
        assert_eq!(page.items.len(), 2);
    }

    #[tokio::test]
    async fn display_order_sorts_before_id() {
        let (_dir, db) = test_db().await;
        let a = create(&db, ResourceKind::Size, &fields(json!({"name": "16", "code": "16"}))).await.unwrap();
        let b = create(
            &db,
            ResourceKind::Size,
            &fields(json!({"name": "17", "code": "17", "display_order": 2})),
        )
        .await
        .unwrap();
        let c = create(
            &db,
            ResourceKind::Size,
            &fields(json!({"name": "18", "code": "18", "display_order": 1})),
        )
        .await
        .unwrap();

        let page = list(&db, ResourceKind::Size, &PageQuery::new(10), limits()).await.unwrap();
        let ids: Vec<i64> = page.items.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![c.id, b.id, a.id]);
    }

    #[tokio::test]
    async fn filters_by_search_flag_and_reference() {
        let (_dir, db) = test_db().await;
        let natural = create(&db, ResourceKind::DiamondType, &fields(json!({"name": "Природный", "code": "NAT"})))
            .await
            .unwrap();
        let lab = create(&db, ResourceKind::DiamondType, &fields(json!({"name": "Выращенный", "code": "LAB"})))
            .await
            .unwrap();
        for (code, parent) in [("VVS1", natural.id), ("VS2", natural.id), ("SI1", lab.id)] {
            create(
                &db,
                ResourceKind::Clarity,
                &fields(json!({"name": code, "code": code, "diamond_type_id": parent})),
            )
            .await
            .unwrap();
        }

        let query = PageQuery::new(10).with_filter("diamond_type_id", natural.id.to_string());
        let page = list(&db, ResourceKind::Clarity, &query, limits()).await.unwrap();
        assert_eq!(page.meta.total, 2);

        let query = PageQuery::new(10).with_filter("search", "VS");
        let page = list(&db, ResourceKind::Clarity, &query, limits()).await.unwrap();
        assert_eq!(page.meta.total, 2);

        let first = page.items[0].clone();
        let mut input = FieldMap::new();
        input.insert("is_active".into(), json!(false));
        patch(&db, ResourceKind::Clarity, first.id, &input).await.unwrap();
        let query = PageQuery::new(10).with_filter("is_active", "true");
        let page = list(&db, ResourceKind::Clarity, &query, limits()).await.unwrap();
        assert_eq!(page.meta.total, 2);

        // diamond types are not filtered by a key they do not have
        let query = PageQuery::new(10).with_filter("diamond_type_id", "999");
        let page = list(&db, ResourceKind::DiamondType, &query, limits()).await.unwrap();
        assert_eq!(page.meta.total, 2);
    }

    #[tokio::test]
    async fn patch_changes_only_is_active() {
        let (_dir, db) = test_db().await;
        let created = create(
            &db,
            ResourceKind::Metal,
            &fields(json!({
                "name": "Серебро 925", "code": "AG925", "purity": "925", "display_order": 4, "is_active": false
            })),
        )
        .await
        .unwrap();
        assert!(!created.is_active);

        let updated = patch(&db, ResourceKind::Metal, created.id, &fields(json!({"is_active": true})))
            .await
            .unwrap();
        assert!(updated.is_active);
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.code, created.code);
        assert_eq!(updated.display_order, created.display_order);
        assert_eq!(updated.attributes, created.attributes);
    }

    #[tokio::test]
    async fn put_replaces_editable_fields() {
        let (_dir, db) = test_db().await;
        let created = create(
            &db,
            ResourceKind::Metal,
            &fields(json!({"name": "Золото 585", "code": "AU585", "purity": 585})),
        )
        .await
        .unwrap();

        let updated = update(
            &db,
            ResourceKind::Metal,
            created.id,
            &fields(json!({"name": "Золото 585 (красное)", "code": "AU585R"})),
        )
        .await
        .unwrap();
        assert_eq!(updated.code.as_deref(), Some("AU585R"));
        assert!(!updated.attributes.contains_key("purity"));
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn invalid_input_is_rejected_with_field_errors() {
        let (_dir, db) = test_db().await;
        let err = create(&db, ResourceKind::Metal, &fields(json!({"name": "", "purity": "abc"})))
            .await
            .unwrap_err();
        let CatalogError::Validation(errors) = err else {
            panic!("validation error expected");
        };
        assert!(errors.contains_key("name"));
        assert!(errors.contains_key("code"));
        assert!(errors.contains_key("purity"));

        create(&db, ResourceKind::Metal, &fields(json!({"name": "Платина", "code": "PT"})))
            .await
            .unwrap();
        let err = create(&db, ResourceKind::Metal, &fields(json!({"name": "Платина 2", "code": "PT"})))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(ref e) if e.contains_key("code")));

        // same code in another collection is fine
        create(&db, ResourceKind::Size, &fields(json!({"name": "PT", "code": "PT"})))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn missing_reference_target_is_a_field_error() {
        let (_dir, db) = test_db().await;
        let err = create(
            &db,
            ResourceKind::Color,
            &fields(json!({"name": "D", "code": "D", "diamond_type_id": 404})),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(ref e) if e.contains_key("diamond_type_id")));
    }

    #[tokio::test]
    async fn bulk_delete_skips_protected_admin() {
        let (dir, db) = test_db().await;
        let root = create(
            &db,
            ResourceKind::Admin,
            &fields(json!({"name": "root", "email": "root@example.com"})),
        )
        .await
        .unwrap();
        // protection flag is read-only through the API; set it directly
        let mut protected = root.clone();
        protected.attributes.insert("is_super_admin".into(), json!(true));
        repository::update(&db, ResourceKind::Admin, &protected).await.unwrap();

        let mut ids = vec![root.id];
        for i in 0..3 {
            let admin = create(
                &db,
                ResourceKind::Admin,
                &fields(json!({"name": format!("ops{}", i), "email": format!("ops{}@example.com", i)})),
            )
            .await
            .unwrap();
            ids.push(admin.id);
        }

        let result = bulk_delete(&db, ResourceKind::Admin, &ids, dir.path()).await.unwrap();
        assert_eq!(result.deleted, 3);
        assert_eq!(result.skipped, vec![root.id]);

        let page = list(&db, ResourceKind::Admin, &PageQuery::new(10), limits()).await.unwrap();
        let remaining: Vec<i64> = page.items.iter().map(|e| e.id).collect();
        assert_eq!(remaining, vec![root.id]);

        let err = delete(&db, ResourceKind::Admin, root.id, dir.path()).await.unwrap_err();
        assert!(matches!(err, CatalogError::Protected(_)));
    }

    #[tokio::test]
    async fn delete_of_other_collection_id_is_not_found() {
        let (dir, db) = test_db().await;
        let metal = seed_metals(&db, 1).await.remove(0);
        let err = delete(&db, ResourceKind::Size, metal.id, dir.path()).await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
        delete(&db, ResourceKind::Metal, metal.id, dir.path()).await.unwrap();
        assert!(matches!(
            get_by_id(&db, ResourceKind::Metal, metal.id).await,
            Err(CatalogError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn brand_cover_upload_and_removal() {
        let (dir, db) = test_db().await;
        let uploads_dir = dir.path().join("uploads");
        let brand = create(&db, ResourceKind::Brand, &fields(json!({"name": "Cartier", "code": "CAR"})))
            .await
            .unwrap();

        let mut form = MultipartForm::default();
        form.files.insert(
            "cover".into(),
            UploadedFile {
                file_name: "cover.webp".into(),
                bytes: vec![7; 16],
            },
        );
        let saved = store_images(&db, ResourceKind::Brand, brand.id, &form, &uploads_dir)
            .await
            .unwrap();
        let url = saved.attributes.get("cover").and_then(Value::as_str).unwrap().to_string();
        assert!(url.starts_with("/uploads/brands/"));
        let file_path = uploads_dir.join(url.trim_start_matches("/uploads/"));
        assert!(file_path.exists());

        let mut form = MultipartForm::default();
        form.texts.insert("remove_cover".into(), "true".into());
        let cleared = store_images(&db, ResourceKind::Brand, brand.id, &form, &uploads_dir)
            .await
            .unwrap();
        assert!(!cleared.attributes.contains_key("cover"));
        assert!(!file_path.exists());
        assert_eq!(cleared.name, "Cartier");
    }

    #[tokio::test]
    async fn non_image_upload_is_rejected() {
        let (dir, db) = test_db().await;
        let brand = create(&db, ResourceKind::Brand, &fields(json!({"name": "Bvlgari", "code": "BVL"})))
            .await
            .unwrap();
        let mut form = MultipartForm::default();
        form.files.insert(
            "cover".into(),
            UploadedFile {
                file_name: "cover.exe".into(),
                bytes: vec![1],
            },
        );
        let err = store_images(&db, ResourceKind::Brand, brand.id, &form, dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(ref e) if e.contains_key("cover")));
    }

    #[test]
    fn unknown_filters_are_ignored() {
        let query = PageQuery::new(10)
            .with_filter("search", " gold ")
            .with_filter("is_active", "maybe")
            .with_filter("purity", "750");
        let filter = parse_filter(ResourceKind::Metal, &query);
        assert_eq!(filter.search.as_deref(), Some("gold"));
        assert_eq!(filter.is_active, None);
        assert!(filter.references.is_empty());
        assert!(resolve_kind("invoices").is_err());
    }

    #[tokio::test]
    async fn failed_cover_update_keeps_previous_file() {
        let (dir, db) = test_db().await;
        let uploads_dir = dir.path().join("uploads");
        let brand = create(&db, ResourceKind::Brand, &fields(json!({"name": "Tiffany", "code": "TIF"})))
            .await
            .unwrap();
        let first = store_images(&db, ResourceKind::Brand, brand.id, &cover_form("a.png"), &uploads_dir)
            .await
            .unwrap();
        let old_url = first.attributes.get("cover").and_then(Value::as_str).unwrap().to_string();

        db.execute_unprepared(
            "CREATE TRIGGER block_update BEFORE UPDATE ON catalog_entity
             BEGIN SELECT RAISE(ABORT, 'blocked'); END;",
        )
        .await
        .unwrap();

        let result = store_images(&db, ResourceKind::Brand, brand.id, &cover_form("b.png"), &uploads_dir).await;
        assert!(result.is_err());

        let current = get_by_id(&db, ResourceKind::Brand, brand.id).await.unwrap();
        assert_eq!(current.attributes.get("cover").and_then(Value::as_str), Some(old_url.as_str()));
        assert!(uploads_dir.join(old_url.trim_start_matches("/uploads/")).exists());
        let on_disk = std::fs::read_dir(uploads_dir.join("brands")).unwrap().count();
        assert_eq!(on_disk, 1);
    }

    #[tokio::test]
    async fn diamond_children_must_share_its_type() {
        let (_dir, db) = test_db().await;
        let natural = create(&db, ResourceKind::DiamondType, &fields(json!({"name": "Природный", "code": "NAT"})))
            .await
            .unwrap();
        let lab = create(&db, ResourceKind::DiamondType, &fields(json!({"name": "Выращенный", "code": "LAB"})))
            .await
            .unwrap();
        let lab_clarity = create(
            &db,
            ResourceKind::Clarity,
            &fields(json!({"name": "IF", "code": "IF-LAB", "diamond_type_id": lab.id})),
        )
        .await
        .unwrap();
        let natural_clarity = create(
            &db,
            ResourceKind::Clarity,
            &fields(json!({"name": "IF", "code": "IF-NAT", "diamond_type_id": natural.id})),
        )
        .await
        .unwrap();

        let err = create(
            &db,
            ResourceKind::Diamond,
            &fields(json!({
                "name": "Круг 1 ct", "code": "D1",
                "diamond_type_id": natural.id, "clarity_id": lab_clarity.id
            })),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(ref e) if e.contains_key("clarity_id")));

        let diamond = create(
            &db,
            ResourceKind::Diamond,
            &fields(json!({
                "name": "Круг 1 ct", "code": "D1",
                "diamond_type_id": natural.id, "clarity_id": natural_clarity.id
            })),
        )
        .await
        .unwrap();

        // moving the diamond to another type re-checks the children it keeps
        let err = patch(&db, ResourceKind::Diamond, diamond.id, &fields(json!({"diamond_type_id": lab.id})))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(ref e) if e.contains_key("clarity_id")));
    }

    #[tokio::test]
    async fn search_wildcards_match_literally() {
        let (_dir, db) = test_db().await;
        for (name, code) in [("Кольцо_16", "R16"), ("Кольцо 17", "R17"), ("100% золото", "AU")] {
            create(&db, ResourceKind::Size, &fields(json!({"name": name, "code": code})))
                .await
                .unwrap();
        }

        let query = PageQuery::new(10).with_filter("search", "_");
        let page = list(&db, ResourceKind::Size, &query, limits()).await.unwrap();
        assert_eq!(page.meta.total, 1);

        let query = PageQuery::new(10).with_filter("search", "%");
        let page = list(&db, ResourceKind::Size, &query, limits()).await.unwrap();
        assert_eq!(page.meta.total, 1);
        assert_eq!(page.items[0].code.as_deref(), Some("AU"));
    }
}
