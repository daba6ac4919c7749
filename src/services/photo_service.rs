// src/services/photo_service.rs
use crate::{
    backend::Query,
    cache::QueryKey,
    error::{AppError, AppResult},
    models::{
        non_empty,
        photo::{AnniversaryPhoto, PhotoCategory, PhotoInput, UploadedFile},
    },
    state::Store,
};
use chrono::Utc;
use uuid::Uuid;

const TABLE: &str = "anniversary_photos";

const AFFECTED: &[&str] = &["anniversary-photos"];

/// Fotos da galeria (todas ou de uma categoria), pela ordem de exibição e depois de envio.
pub async fn list(store: &Store, category: Option<PhotoCategory>) -> AppResult<Vec<AnniversaryPhoto>> {
    let mut query = Query::new();
    if let Some(category) = category {
        query = query.eq("category", category);
    }
    store
        .cached_rows(
            QueryKey::new("anniversary-photos").with_opt(category),
            TABLE,
            query.order("display_order", true).order("created_at", true),
            None,
        )
        .await
}

pub async fn find(store: &Store, id: &str) -> AppResult<Option<AnniversaryPhoto>> {
    Ok(list(store, None).await?.into_iter().find(|p| p.id == id))
}

pub async fn count_all(store: &Store, auth: &str) -> AppResult<u64> {
    store
        .cached_count(QueryKey::new("anniversary-photos").with("count"), TABLE, Some(auth))
        .await
}

/// Separa as fotos pelas três categorias, na ordem fixa das abas.
pub fn group_by_category(photos: &[AnniversaryPhoto]) -> Vec<(PhotoCategory, Vec<&AnniversaryPhoto>)> {
    PhotoCategory::ALL
        .iter()
        .map(|cat| (*cat, photos.iter().filter(|p| p.category == *cat).collect()))
        .collect()
}

/// Caminho do objeto no bucket: `{categoria}/{millis}-{aleatório}.{ext}`.
fn object_path(category: PhotoCategory, file: &UploadedFile) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!(
        "{}/{}-{}.{}",
        category,
        Utc::now().timestamp_millis(),
        &random[..10],
        file.extension()
    )
}

/// Caminho do objeto a partir do URL público (parte depois de `/{bucket}/`).
pub fn object_path_from_url(url: &str, bucket: &str) -> Option<String> {
    let marker = format!("/{}/", bucket);
    let (_, rest) = url.split_once(&marker)?;
    let rest = rest.split(['?', '#']).next().unwrap_or_default();
    if rest.is_empty() {
        return None;
    }
    urlencoding::decode(rest).ok().map(|p| p.into_owned())
}

/// Envia um ficheiro e regista a foto. Falha no registo deixa o ficheiro no bucket.
pub async fn upload(
    store: &Store,
    file: UploadedFile,
    category: PhotoCategory,
    caption: &str,
    auth: &str,
) -> AppResult<AnniversaryPhoto> {
    if !file.content_type.starts_with("image/") {
        return Err(AppError::Upload(format!(
            "{} não é uma imagem.",
            file.file_name
        )));
    }
    let path = object_path(category, &file);
    let name = file.file_name.clone();
    store
        .backend
        .upload(&store.photo_bucket, &path, file.bytes, &file.content_type, Some(auth))
        .await?;
    let photo_url = store.backend.public_url(&store.photo_bucket, &path);

    let input = PhotoInput {
        category,
        photo_url,
        caption: non_empty(caption),
    };
    let row = store
        .backend
        .insert(TABLE, serde_json::to_value(&input)?, Some(auth))
        .await?;
    store.cache.invalidate_all(AFFECTED).await;
    tracing::info!("Foto enviada: {} -> {}", name, path);
    Ok(serde_json::from_value(row)?)
}

/// Resultado de um envio de vários ficheiros.
#[derive(Debug)]
pub struct UploadOutcome {
    pub uploaded: usize,
    pub failed: Option<(String, AppError)>,
}

/// Envia os ficheiros um a um e pára no primeiro erro; os anteriores ficam gravados.
pub async fn upload_many(
    store: &Store,
    files: Vec<UploadedFile>,
    category: PhotoCategory,
    caption: &str,
    auth: &str,
) -> UploadOutcome {
    let mut uploaded = 0;
    for file in files {
        let name = file.file_name.clone();
        match upload(store, file, category, caption, auth).await {
            Ok(_) => uploaded += 1,
            Err(e) => {
                tracing::error!("Falha ao enviar {}: {}", name, e);
                return UploadOutcome {
                    uploaded,
                    failed: Some((name, e)),
                };
            }
        }
    }
    UploadOutcome { uploaded, failed: None }
}

/// Remove a foto. O ficheiro é apagado do bucket quando possível; a linha é sempre removida.
pub async fn delete(store: &Store, photo: &AnniversaryPhoto, auth: &str) -> AppResult<()> {
    match object_path_from_url(&photo.photo_url, &store.photo_bucket) {
        Some(path) => {
            if let Err(e) = store
                .backend
                .remove(&store.photo_bucket, &[path.clone()], Some(auth))
                .await
            {
                tracing::warn!("Não foi possível apagar o ficheiro {}: {}", path, e);
            }
        }
        None => tracing::warn!("URL sem caminho no bucket: {}", photo.photo_url),
    }
    store.backend.delete(TABLE, &photo.id, Some(auth)).await?;
    store.cache.invalidate_all(AFFECTED).await;
    tracing::info!("Foto removida: {}", photo.id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::memory_store;
    use rstest::rstest;
    use serde_json::json;

    fn image(name: &str) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            content_type: "image/jpeg".to_string(),
            bytes: vec![0xff, 0xd8, 0xff],
        }
    }

    #[rstest]
    #[case(
        "https://proj.example.co/storage/v1/object/public/anniversary-photos/sexta/1700-abc.jpg",
        Some("sexta/1700-abc.jpg")
    )]
    #[case(
        "https://proj.example.co/storage/v1/object/public/anniversary-photos/sabado/foto%201.png?t=1",
        Some("sabado/foto 1.png")
    )]
    #[case("https://cdn.example.com/outra/foto.jpg", None)]
    fn paths_from_public_urls(#[case] url: &str, #[case] expected: Option<&str>) {
        assert_eq!(
            object_path_from_url(url, "anniversary-photos").as_deref(),
            expected
        );
    }

    #[tokio::test]
    async fn upload_stores_object_and_row() {
        let (store, backend) = memory_store();
        let photo = upload(&store, image("Culto.JPG"), PhotoCategory::Sexta, "  ", "t")
            .await
            .unwrap();
        assert_eq!(photo.category, PhotoCategory::Sexta);
        assert_eq!(photo.caption, None);

        let path = object_path_from_url(&photo.photo_url, "anniversary-photos").unwrap();
        assert!(path.starts_with("sexta/"));
        assert!(path.ends_with(".jpg"));
        assert!(backend.object_exists("anniversary-photos", &path));
        assert_eq!(list(&store, Some(PhotoCategory::Sexta)).await.unwrap().len(), 1);
        assert!(list(&store, Some(PhotoCategory::Domingo)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn multi_upload_stops_at_first_failure() {
        let (store, backend) = memory_store();
        backend.allow_uploads(2);
        let files = vec![image("a.jpg"), image("b.jpg"), image("c.jpg"), image("d.jpg")];
        let outcome = upload_many(&store, files, PhotoCategory::Sabado, "Aniversário", "t").await;
        assert_eq!(outcome.uploaded, 2);
        let (name, _) = outcome.failed.unwrap();
        assert_eq!(name, "c.jpg");
        // Os dois primeiros continuam gravados
        assert_eq!(backend.object_count("anniversary-photos"), 2);
        assert_eq!(backend.rows(TABLE).len(), 2);
    }

    #[tokio::test]
    async fn non_images_are_refused() {
        let (store, backend) = memory_store();
        let file = UploadedFile {
            content_type: "application/pdf".to_string(),
            ..image("boletim.pdf")
        };
        let err = upload(&store, file, PhotoCategory::Domingo, "", "t").await.unwrap_err();
        assert!(matches!(err, AppError::Upload(_)));
        assert_eq!(backend.object_count("anniversary-photos"), 0);
    }

    #[tokio::test]
    async fn delete_survives_storage_failure() {
        let (store, backend) = memory_store();
        let photo = upload(&store, image("x.png"), PhotoCategory::Domingo, "", "t")
            .await
            .unwrap();
        backend.break_removals("anniversary-photos");
        delete(&store, &photo, "t").await.unwrap();
        assert!(backend.rows(TABLE).is_empty());
        assert!(list(&store, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_removes_the_object() {
        let (store, backend) = memory_store();
        let photo = upload(&store, image("x.png"), PhotoCategory::Domingo, "", "t")
            .await
            .unwrap();
        delete(&store, &photo, "t").await.unwrap();
        assert_eq!(backend.object_count("anniversary-photos"), 0);
    }

    #[tokio::test]
    async fn ordered_by_display_order_then_upload_time() {
        let (store, backend) = memory_store();
        backend.seed(
            TABLE,
            vec![
                json!({"id": "p1", "category": "sexta", "photo_url": "u1", "display_order": null, "created_at": "2024-01-01T10:00:00Z"}),
                json!({"id": "p2", "category": "sexta", "photo_url": "u2", "display_order": 1, "created_at": "2024-01-03T10:00:00Z"}),
                json!({"id": "p3", "category": "domingo", "photo_url": "u3", "display_order": 1, "created_at": "2024-01-02T10:00:00Z"}),
            ],
        );
        let all = list(&store, None).await.unwrap();
        assert_eq!(all.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(), vec!["p3", "p2", "p1"]);

        let groups = group_by_category(&all);
        assert_eq!(groups[0].0, PhotoCategory::Sexta);
        assert_eq!(groups[0].1.len(), 2);
        assert!(groups[1].1.is_empty());
        assert_eq!(groups[2].1.len(), 1);
    }
}
