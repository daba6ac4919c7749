// src/web/page_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::page::PageForm,
    services::page_service,
    state::AppState,
    templates::{AdminPaginasPage, ConfirmDeletePage, EditorToolbar, PageGroup, PaginaFormPage},
    web::{admin_chrome, flash::Flash, mw_auth::SignedInUser, notify, or_empty, render},
};
use axum::{
    extract::{Extension, Form, Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tower_cookies::Cookies;

const LIST_PATH: &str = "/admin/paginas";

fn form_page(
    state: &AppState,
    cookies: &Cookies,
    user: &SignedInUser,
    id: Option<&str>,
    form: PageForm,
    error: Option<String>,
) -> PaginaFormPage {
    let (heading, action) = match id {
        Some(id) => ("Editar Página".to_string(), format!("{}/{}/editar", LIST_PATH, id)),
        None => ("Nova Página".to_string(), format!("{}/novo", LIST_PATH)),
    };
    PaginaFormPage {
        chrome: admin_chrome(state, cookies, user, LIST_PATH),
        heading,
        action,
        form,
        error,
        toolbar: EditorToolbar::new(),
    }
}

// GET /admin/paginas (agrupadas pelo menu pai)
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<SignedInUser>,
    cookies: Cookies,
) -> AppResult<impl IntoResponse> {
    let pages = or_empty(page_service::list_all(&state.store, &user.token).await, "páginas");
    let groups = page_service::group_by_menu(&pages)
        .into_iter()
        .map(|(label, pages)| PageGroup {
            label,
            pages: pages.into_iter().cloned().collect(),
        })
        .collect();
    let page = AdminPaginasPage {
        chrome: admin_chrome(&state, &cookies, &user, LIST_PATH),
        groups,
    };
    render(&page)
}

pub async fn new_form(
    State(state): State<AppState>,
    Extension(user): Extension<SignedInUser>,
    cookies: Cookies,
) -> AppResult<impl IntoResponse> {
    render(&form_page(&state, &cookies, &user, None, PageForm::blank(), None))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<SignedInUser>,
    cookies: Cookies,
    Form(form): Form<PageForm>,
) -> AppResult<Response> {
    match page_service::create(&state.store, &form, &user.token).await {
        Ok(page) => {
            notify(
                &state,
                &cookies,
                Flash::success(format!("Página criada em {}", page.path())),
            );
            Ok(Redirect::to(LIST_PATH).into_response())
        }
        Err(e) => {
            let page = form_page(&state, &cookies, &user, None, form, Some(e.user_message()));
            Ok((StatusCode::UNPROCESSABLE_ENTITY, render(&page)?).into_response())
        }
    }
}

pub async fn edit_form(
    State(state): State<AppState>,
    Extension(user): Extension<SignedInUser>,
    cookies: Cookies,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let page = page_service::find_by_id(&state.store, &id, &user.token)
        .await?
        .ok_or(AppError::NotFound)?;
    render(&form_page(
        &state,
        &cookies,
        &user,
        Some(&id),
        PageForm::from_page(&page),
        None,
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<SignedInUser>,
    cookies: Cookies,
    Path(id): Path<String>,
    Form(form): Form<PageForm>,
) -> AppResult<Response> {
    match page_service::update(&state.store, &id, &form, &user.token).await {
        Ok(_) => {
            notify(&state, &cookies, Flash::success("Página atualizada com sucesso!"));
            Ok(Redirect::to(LIST_PATH).into_response())
        }
        Err(e) => {
            let page = form_page(&state, &cookies, &user, Some(&id), form, Some(e.user_message()));
            Ok((StatusCode::UNPROCESSABLE_ENTITY, render(&page)?).into_response())
        }
    }
}

pub async fn confirm_delete(
    State(state): State<AppState>,
    Extension(user): Extension<SignedInUser>,
    cookies: Cookies,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let page = page_service::find_by_id(&state.store, &id, &user.token)
        .await?
        .ok_or(AppError::NotFound)?;
    let confirm = ConfirmDeletePage {
        chrome: admin_chrome(&state, &cookies, &user, LIST_PATH),
        heading: "Excluir página".to_string(),
        message: format!(
            "Tem certeza que deseja excluir a página \"{}\" ({})? Esta ação não pode ser desfeita.",
            page.title,
            page.path()
        ),
        action: format!("{}/{}/excluir", LIST_PATH, id),
        cancel: LIST_PATH.to_string(),
    };
    render(&confirm)
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<SignedInUser>,
    cookies: Cookies,
    Path(id): Path<String>,
) -> AppResult<Redirect> {
    let flash = match page_service::delete(&state.store, &id, &user.token).await {
        Ok(()) => Flash::success("Página excluída com sucesso!"),
        Err(e) => Flash::error(e.user_message()),
    };
    notify(&state, &cookies, flash);
    Ok(Redirect::to(LIST_PATH))
}

#[cfg(test)]
mod tests {
    use crate::web::test_support::{app, body_text, get, location, login, post_form, send};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn new_page_gets_slug_and_enters_menu() {
        let (app, _store, backend) = app();
        let cookie = login(&app, &backend, "pastor@igreja.org", true).await;
        let response = send(
            &app,
            post_form(
                "/admin/paginas/novo",
                &cookie,
                "title=Minist%C3%A9rio+de+Louvor&slug=&content=%23+Louvor&parent_menu=Minist%C3%A9rios\
&menu_order=1&show_in_menu=on&published=on",
            ),
        )
        .await;
        assert_eq!(location(&response), "/admin/paginas");
        assert_eq!(backend.rows("pages")[0]["slug"], "ministerio-de-louvor");

        let html = body_text(send(&app, get("/", "")).await).await;
        assert!(html.contains("Ministérios"));
        assert!(html.contains("/pagina/ministerio-de-louvor"));

        let response = send(&app, get("/pagina/ministerio-de-louvor", "")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn admin_list_groups_by_parent_menu() {
        let (app, _store, backend) = app();
        backend.seed(
            "pages",
            vec![
                json!({"id": "p1", "title": "Louvor", "slug": "louvor", "parent_menu": "Ministérios", "menu_order": 1}),
                json!({"id": "p2", "title": "Avisos", "slug": "avisos", "parent_menu": null, "menu_order": 2}),
            ],
        );
        let cookie = login(&app, &backend, "pastor@igreja.org", true).await;
        let html = body_text(send(&app, get("/admin/paginas", &cookie)).await).await;
        assert!(html.contains("<h2>Ministérios</h2>"));
        assert!(html.contains("<h2>Sem Menu</h2>"));
    }

    #[tokio::test]
    async fn untitled_page_is_rejected() {
        let (app, _store, backend) = app();
        let cookie = login(&app, &backend, "pastor@igreja.org", true).await;
        let response = send(
            &app,
            post_form("/admin/paginas/novo", &cookie, "title=&content=texto"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response).await.contains("Informe o título."));
        assert!(backend.rows("pages").is_empty());
    }
}
