use contracts::shared::upload::ImageChange;
use contracts::system::settings::{SiteSettings, SETTINGS_IMAGE_FIELDS};
use sea_orm::{DatabaseConnection, TransactionTrait};
use std::path::Path;

use super::repository;
use crate::domain::catalog::error::CatalogError;
use crate::shared::uploads::{self, MultipartForm};

const SITE_NAME: &str = "site_name";
const SUPPORT_EMAIL: &str = "support_email";

/// Folder under the uploads directory for logo and favicon
const UPLOAD_FOLDER: &str = "settings";

fn url_key(image_field: &str) -> String {
    format!("{}_url", image_field)
}

/// Текущие настройки сайта
pub async fn get(conn: &DatabaseConnection) -> Result<SiteSettings, CatalogError> {
    let mut values = repository::load_all(conn).await?;
    Ok(SiteSettings {
        site_name: values.remove(SITE_NAME).unwrap_or_default(),
        support_email: values.remove(SUPPORT_EMAIL),
        logo_url: values.remove(&url_key("logo")),
        favicon_url: values.remove(&url_key("favicon")),
    })
}

/// Save settings from a multipart form.
///
/// Text parts that are absent keep their stored value; image fields follow
/// the file / `remove_<field>` convention.
pub async fn save(
    conn: &DatabaseConnection,
    form: &MultipartForm,
    uploads_dir: &Path,
) -> Result<SiteSettings, CatalogError> {
    let mut next = get(conn).await?;

    if let Some(name) = form.text(SITE_NAME) {
        next.site_name = name.trim().to_string();
    }
    if let Some(email) = form.text(SUPPORT_EMAIL) {
        let email = email.trim();
        next.support_email = (!email.is_empty()).then(|| email.to_string());
    }

    let mut errors = next.validate();
    for field in SETTINGS_IMAGE_FIELDS {
        if let Some(file) = form.files.get(field) {
            if uploads::image_extension(&file.file_name).is_none() {
                errors.insert(field.to_string(), "Допустимы только изображения".to_string());
            }
        }
    }
    if !errors.is_empty() {
        return Err(CatalogError::Validation(errors));
    }

    // New files are written first; old ones go only once the settings point away from them
    let mut stored = Vec::new();
    let mut replaced = Vec::new();
    for field in SETTINGS_IMAGE_FIELDS {
        let slot = match field {
            "logo" => &mut next.logo_url,
            _ => &mut next.favicon_url,
        };
        let previous = slot.clone();
        match form.image_change(field) {
            ImageChange::Keep => continue,
            ImageChange::Replace { .. } => {
                let Some(file) = form.files.get(field) else {
                    continue;
                };
                let url = match uploads::store(uploads_dir, UPLOAD_FOLDER, file) {
                    Ok(url) => url,
                    Err(e) => {
                        discard(uploads_dir, &stored);
                        return Err(e.into());
                    }
                };
                stored.push(url.clone());
                *slot = Some(url);
            }
            ImageChange::Remove => *slot = None,
        }
        replaced.extend(previous);
    }

    if let Err(e) = persist(conn, &next).await {
        discard(uploads_dir, &stored);
        return Err(e);
    }
    discard(uploads_dir, &replaced);
    tracing::info!("Site settings saved");
    Ok(next)
}

fn discard(uploads_dir: &Path, urls: &[String]) {
    for url in urls {
        uploads::remove(uploads_dir, url);
    }
}

/// All keys are written in one transaction
async fn persist(conn: &DatabaseConnection, settings: &SiteSettings) -> Result<(), CatalogError> {
    let txn = conn.begin().await?;
    repository::upsert(&txn, SITE_NAME, &settings.site_name).await?;

    let optional = [
        (SUPPORT_EMAIL.to_string(), settings.support_email.as_deref()),
        (url_key("logo"), settings.logo_url.as_deref()),
        (url_key("favicon"), settings.favicon_url.as_deref()),
    ];
    for (key, value) in optional {
        match value {
            Some(value) => repository::upsert(&txn, &key, value).await?,
            None => repository::delete(&txn, &key).await?,
        }
    }
    txn.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db;
    use crate::shared::uploads::UploadedFile;
    use sea_orm::ConnectionTrait;

    fn form(texts: &[(&str, &str)]) -> MultipartForm {
        let mut form = MultipartForm::default();
        for (k, v) in texts {
            form.texts.insert(k.to_string(), v.to_string());
        }
        form
    }

    #[tokio::test]
    async fn settings_round_trip_with_logo() {
        let dir = tempfile::tempdir().unwrap();
        let conn = db::connect(&dir.path().join("settings.db")).await.unwrap();
        let uploads_dir = dir.path().join("uploads");

        assert_eq!(get(&conn).await.unwrap(), SiteSettings::default());

        let mut first = form(&[("site_name", "Jewel"), ("support_email", "help@jewel.test")]);
        first.files.insert(
            "logo".into(),
            UploadedFile {
                file_name: "logo.svg".into(),
                bytes: b"<svg/>".to_vec(),
            },
        );
        let saved = save(&conn, &first, &uploads_dir).await.unwrap();
        let logo = saved.logo_url.clone().unwrap();
        assert!(logo.starts_with("/uploads/settings/"));
        assert_eq!(get(&conn).await.unwrap(), saved);

        // only the remove flag: name and email stay, logo goes
        let cleared = save(&conn, &form(&[("remove_logo", "true")]), &uploads_dir)
            .await
            .unwrap();
        assert_eq!(cleared.site_name, "Jewel");
        assert_eq!(cleared.support_email.as_deref(), Some("help@jewel.test"));
        assert_eq!(cleared.logo_url, None);
        assert!(!uploads_dir.join(logo.trim_start_matches("/uploads/")).exists());
    }

    #[tokio::test]
    async fn blank_site_name_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let conn = db::connect(&dir.path().join("settings.db")).await.unwrap();

        let err = save(&conn, &form(&[("site_name", "  ")]), dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(ref e) if e.contains_key("site_name")));

        let err = save(&conn, &form(&[("site_name", "Jewel"), ("support_email", "x")]), dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(ref e) if e.contains_key("support_email")));
    }

    #[tokio::test]
    async fn failed_save_keeps_previous_logo() {
        let dir = tempfile::tempdir().unwrap();
        let conn = db::connect(&dir.path().join("settings.db")).await.unwrap();
        let uploads_dir = dir.path().join("uploads");

        let mut first = form(&[("site_name", "Jewel")]);
        first.files.insert(
            "logo".into(),
            UploadedFile {
                file_name: "a.png".into(),
                bytes: vec![1; 8],
            },
        );
        let saved = save(&conn, &first, &uploads_dir).await.unwrap();
        let old_logo = saved.logo_url.clone().unwrap();

        conn.execute_unprepared(
            "CREATE TRIGGER block_settings BEFORE UPDATE ON sys_settings
             BEGIN SELECT RAISE(ABORT, 'blocked'); END;",
        )
        .await
        .unwrap();

        let mut second = form(&[("site_name", "Jewel 2")]);
        second.files.insert(
            "logo".into(),
            UploadedFile {
                file_name: "b.png".into(),
                bytes: vec![2; 8],
            },
        );
        assert!(save(&conn, &second, &uploads_dir).await.is_err());

        let current = get(&conn).await.unwrap();
        assert_eq!(current, saved);
        assert!(uploads_dir.join(old_logo.trim_start_matches("/uploads/")).exists());
        let on_disk = std::fs::read_dir(uploads_dir.join("settings")).unwrap().count();
        assert_eq!(on_disk, 1);
    }
}
