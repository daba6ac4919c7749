// src/web/photo_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::photo::PhotoCategory,
    services::photo_service::{self, UploadOutcome},
    state::AppState,
    templates::{AdminFotosPage, ConfirmDeletePage, PhotoTab},
    web::{admin_chrome, flash::Flash, mw_auth::SignedInUser, notify, or_empty, render, upload},
};
use axum::{
    extract::{Extension, Multipart, Path, Query, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_cookies::Cookies;

const LIST_PATH: &str = "/admin/fotos";

#[derive(Deserialize, Debug, Default)]
pub struct FotosParams {
    categoria: Option<String>,
}

/// Categoria pedida na query; valores desconhecidos caem na primeira aba.
fn selected_category(raw: Option<&str>) -> PhotoCategory {
    raw.and_then(|c| c.parse().ok()).unwrap_or(PhotoCategory::Sexta)
}

fn list_url(category: PhotoCategory) -> String {
    format!("{}?categoria={}", LIST_PATH, category)
}

/// Texto da notificação depois de um envio em lote.
fn outcome_flash(outcome: UploadOutcome) -> Flash {
    match outcome.failed {
        None => Flash::success(format!("{} foto(s) enviada(s) com sucesso!", outcome.uploaded)),
        Some((name, e)) if outcome.uploaded == 0 => {
            Flash::error(format!("Erro ao enviar {}: {}", name, e.user_message()))
        }
        Some((name, e)) => Flash::error(format!(
            "{} foto(s) enviada(s); o envio parou em {}: {}",
            outcome.uploaded,
            name,
            e.user_message()
        )),
    }
}

// GET /admin/fotos?categoria=...
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<SignedInUser>,
    cookies: Cookies,
    Query(params): Query<FotosParams>,
) -> AppResult<impl IntoResponse> {
    let category = selected_category(params.categoria.as_deref());
    let photos = or_empty(photo_service::list(&state.store, None).await, "fotos");

    let mut current = Vec::new();
    let tabs = photo_service::group_by_category(&photos)
        .into_iter()
        .map(|(cat, items)| {
            if cat == category {
                current = items.iter().map(|p| (*p).clone()).collect();
            }
            PhotoTab {
                value: cat.value().to_string(),
                label: cat.label().to_string(),
                count: items.len(),
                active: cat == category,
            }
        })
        .collect();

    let page = AdminFotosPage {
        chrome: admin_chrome(&state, &cookies, &user, LIST_PATH),
        tabs,
        category: category.value().to_string(),
        category_label: category.label().to_string(),
        photos: current,
    };
    render(&page)
}

// POST /admin/fotos (multipart: category, files[], caption)
pub async fn upload_photos(
    State(state): State<AppState>,
    Extension(user): Extension<SignedInUser>,
    cookies: Cookies,
    multipart: Multipart,
) -> AppResult<Redirect> {
    let form = match upload::read_upload_form(multipart).await {
        Ok(form) => form,
        Err(e) => {
            notify(&state, &cookies, Flash::error(e.user_message()));
            return Ok(Redirect::to(LIST_PATH));
        }
    };
    let category = selected_category(Some(form.field("category")));
    if form.files.is_empty() {
        notify(&state, &cookies, Flash::error("Selecione ao menos uma foto."));
        return Ok(Redirect::to(&list_url(category)));
    }

    let caption = form.field("caption").to_string();
    tracing::info!("Envio de {} foto(s) para {}", form.files.len(), category);
    let outcome =
        photo_service::upload_many(&state.store, form.files, category, &caption, &user.token).await;
    notify(&state, &cookies, outcome_flash(outcome));
    Ok(Redirect::to(&list_url(category)))
}

// GET /admin/fotos/{id}/excluir
pub async fn confirm_delete(
    State(state): State<AppState>,
    Extension(user): Extension<SignedInUser>,
    cookies: Cookies,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let photo = photo_service::find(&state.store, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    let page = ConfirmDeletePage {
        chrome: admin_chrome(&state, &cookies, &user, LIST_PATH),
        heading: "Excluir foto".to_string(),
        message: format!(
            "Excluir esta foto de \"{}\"? O arquivo também será removido.",
            photo.category.label()
        ),
        action: format!("{}/{}/excluir", LIST_PATH, id),
        cancel: list_url(photo.category),
    };
    render(&page)
}

// POST /admin/fotos/{id}/excluir
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<SignedInUser>,
    cookies: Cookies,
    Path(id): Path<String>,
) -> AppResult<Redirect> {
    let photo = photo_service::find(&state.store, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    let flash = match photo_service::delete(&state.store, &photo, &user.token).await {
        Ok(()) => Flash::success("Foto excluída."),
        Err(e) => Flash::error(e.user_message()),
    };
    notify(&state, &cookies, flash);
    Ok(Redirect::to(&list_url(photo.category)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::test_support::{app, body_text, get, location, login, post_form, send};
    use axum::{
        body::Body,
        http::{header, Request},
    };
    use rstest::rstest;
    use serde_json::json;

    const BOUNDARY: &str = "----tabernaculo-test";

    fn multipart_request(cookie: &str, category: &str, files: &[(&str, &str)]) -> Request<Body> {
        let mut body = String::new();
        body.push_str(&format!(
            "--{}\r\nContent-Disposition: form-data; name=\"category\"\r\n\r\n{}\r\n",
            BOUNDARY, category
        ));
        for (name, content_type) in files {
            body.push_str(&format!(
                "--{}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{}\"\r\n\
Content-Type: {}\r\n\r\nconteudo\r\n",
                BOUNDARY, name, content_type
            ));
        }
        body.push_str(&format!(
            "--{}\r\nContent-Disposition: form-data; name=\"caption\"\r\n\r\nAniversário\r\n--{}--\r\n",
            BOUNDARY, BOUNDARY
        ));
        Request::builder()
            .method("POST")
            .uri("/admin/fotos")
            .header(header::COOKIE, cookie)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[rstest]
    #[case(None, PhotoCategory::Sexta)]
    #[case(Some("domingo"), PhotoCategory::Domingo)]
    #[case(Some("SABADO"), PhotoCategory::Sabado)]
    #[case(Some("segunda"), PhotoCategory::Sexta)]
    fn category_from_query(#[case] raw: Option<&str>, #[case] expected: PhotoCategory) {
        assert_eq!(selected_category(raw), expected);
    }

    #[test]
    fn partial_batch_reports_both_counts() {
        let flash = outcome_flash(UploadOutcome {
            uploaded: 2,
            failed: Some(("c.jpg".to_string(), AppError::Upload("grande demais".to_string()))),
        });
        assert_eq!(flash.css(), "error");
        assert_eq!(flash.message, "2 foto(s) enviada(s); o envio parou em c.jpg: grande demais");
    }

    #[tokio::test]
    async fn uploaded_photos_appear_in_gallery() {
        let (app, _store, backend) = app();
        let cookie = login(&app, &backend, "pastor@igreja.org", true).await;
        let response = send(
            &app,
            multipart_request(&cookie, "sabado", &[("a.jpg", "image/jpeg"), ("b.png", "image/png")]),
        )
        .await;
        assert_eq!(location(&response), "/admin/fotos?categoria=sabado");
        assert_eq!(backend.object_count("anniversary-photos"), 2);

        let rows = backend.rows("anniversary_photos");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["category"], "sabado");
        assert_eq!(rows[0]["caption"], "Aniversário");

        let html = body_text(send(&app, get("/admin/fotos?categoria=sabado", &cookie)).await).await;
        assert!(html.contains("Culto de Sábado (2)"));
        let html = body_text(send(&app, get("/galeria", "")).await).await;
        assert!(html.contains("https://memory.test/storage/v1/object/public/anniversary-photos/sabado/"));
    }

    #[tokio::test]
    async fn batch_stops_at_first_failure() {
        let (app, _store, backend) = app();
        backend.allow_uploads(1);
        let cookie = login(&app, &backend, "pastor@igreja.org", true).await;
        let response = send(
            &app,
            multipart_request(
                &cookie,
                "sexta",
                &[("a.jpg", "image/jpeg"), ("b.jpg", "image/jpeg"), ("c.jpg", "image/jpeg")],
            ),
        )
        .await;
        assert_eq!(location(&response), "/admin/fotos?categoria=sexta");
        assert_eq!(backend.rows("anniversary_photos").len(), 1);
    }

    #[tokio::test]
    async fn delete_removes_row_and_file() {
        let (app, _store, backend) = app();
        let cookie = login(&app, &backend, "pastor@igreja.org", true).await;
        send(&app, multipart_request(&cookie, "domingo", &[("a.jpg", "image/jpeg")])).await;
        let id = backend.rows("anniversary_photos")[0]["id"]
            .as_str()
            .unwrap()
            .to_string();

        let html = body_text(send(&app, get(&format!("/admin/fotos/{}/excluir", id), &cookie)).await).await;
        assert!(html.contains("Companheirismo Domingo"));

        let response = send(&app, post_form(&format!("/admin/fotos/{}/excluir", id), &cookie, "")).await;
        assert_eq!(location(&response), "/admin/fotos?categoria=domingo");
        assert!(backend.rows("anniversary_photos").is_empty());
        assert_eq!(backend.object_count("anniversary-photos"), 0);
    }

    #[tokio::test]
    async fn non_image_is_refused() {
        let (app, _store, backend) = app();
        let cookie = login(&app, &backend, "pastor@igreja.org", true).await;
        send(&app, multipart_request(&cookie, "sexta", &[("notas.txt", "text/plain")])).await;
        assert!(backend.rows("anniversary_photos").is_empty());
        assert_eq!(backend.object_count("anniversary-photos"), 0);
    }

    #[tokio::test]
    async fn seeded_photo_is_listed_under_its_tab() {
        let (app, _store, backend) = app();
        backend.seed(
            "anniversary_photos",
            vec![json!({"id": "f1", "category": "domingo", "photo_url": "https://x.test/a.jpg", "display_order": 1})],
        );
        let cookie = login(&app, &backend, "pastor@igreja.org", true).await;
        let html = body_text(send(&app, get("/admin/fotos?categoria=domingo", &cookie)).await).await;
        assert!(html.contains("https://x.test/a.jpg"));
        assert!(html.contains("Companheirismo Domingo (1)"));
    }
}
