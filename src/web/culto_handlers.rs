// src/web/culto_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::culto::CultoForm,
    services::culto_service,
    state::AppState,
    templates::{AdminCultosPage, ConfirmDeletePage, CultoCard, CultoFormPage, EditorToolbar},
    web::{admin_chrome, flash::Flash, mw_auth::SignedInUser, notify, or_empty, render},
};
use axum::{
    extract::{Extension, Form, Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tower_cookies::Cookies;

const LIST_PATH: &str = "/admin/cultos";

fn form_page(
    state: &AppState,
    cookies: &Cookies,
    user: &SignedInUser,
    id: Option<&str>,
    form: CultoForm,
    error: Option<String>,
) -> CultoFormPage {
    let (heading, action) = match id {
        Some(id) => ("Editar Culto".to_string(), format!("{}/{}/editar", LIST_PATH, id)),
        None => ("Novo Culto".to_string(), format!("{}/novo", LIST_PATH)),
    };
    CultoFormPage {
        chrome: admin_chrome(state, cookies, user, LIST_PATH),
        heading,
        action,
        form,
        error,
        toolbar: EditorToolbar::new(),
    }
}

// GET /admin/cultos
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<SignedInUser>,
    cookies: Cookies,
) -> AppResult<impl IntoResponse> {
    let cultos = or_empty(culto_service::list_all(&state.store, &user.token).await, "cultos");
    let page = AdminCultosPage {
        chrome: admin_chrome(&state, &cookies, &user, LIST_PATH),
        cultos: cultos.iter().map(CultoCard::from).collect(),
    };
    render(&page)
}

// GET /admin/cultos/novo
pub async fn new_form(
    State(state): State<AppState>,
    Extension(user): Extension<SignedInUser>,
    cookies: Cookies,
) -> AppResult<impl IntoResponse> {
    render(&form_page(&state, &cookies, &user, None, CultoForm::blank(), None))
}

// POST /admin/cultos/novo
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<SignedInUser>,
    cookies: Cookies,
    Form(form): Form<CultoForm>,
) -> AppResult<Response> {
    match culto_service::create(&state.store, &form, &user.token).await {
        Ok(_) => {
            notify(&state, &cookies, Flash::success("Culto criado com sucesso!"));
            Ok(Redirect::to(LIST_PATH).into_response())
        }
        Err(e) => {
            let page = form_page(&state, &cookies, &user, None, form, Some(e.user_message()));
            Ok((StatusCode::UNPROCESSABLE_ENTITY, render(&page)?).into_response())
        }
    }
}

// GET /admin/cultos/{id}/editar
pub async fn edit_form(
    State(state): State<AppState>,
    Extension(user): Extension<SignedInUser>,
    cookies: Cookies,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let culto = culto_service::find_by_id(&state.store, &id, &user.token)
        .await?
        .ok_or(AppError::NotFound)?;
    render(&form_page(
        &state,
        &cookies,
        &user,
        Some(&id),
        CultoForm::from_culto(&culto),
        None,
    ))
}

// POST /admin/cultos/{id}/editar
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<SignedInUser>,
    cookies: Cookies,
    Path(id): Path<String>,
    Form(form): Form<CultoForm>,
) -> AppResult<Response> {
    match culto_service::update(&state.store, &id, &form, &user.token).await {
        Ok(_) => {
            notify(&state, &cookies, Flash::success("Culto atualizado com sucesso!"));
            Ok(Redirect::to(LIST_PATH).into_response())
        }
        Err(e) => {
            let page = form_page(&state, &cookies, &user, Some(&id), form, Some(e.user_message()));
            Ok((StatusCode::UNPROCESSABLE_ENTITY, render(&page)?).into_response())
        }
    }
}

// GET /admin/cultos/{id}/excluir
pub async fn confirm_delete(
    State(state): State<AppState>,
    Extension(user): Extension<SignedInUser>,
    cookies: Cookies,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let culto = culto_service::find_by_id(&state.store, &id, &user.token)
        .await?
        .ok_or(AppError::NotFound)?;
    let page = ConfirmDeletePage {
        chrome: admin_chrome(&state, &cookies, &user, LIST_PATH),
        heading: "Excluir culto".to_string(),
        message: format!(
            "Tem certeza que deseja excluir \"{}\"? Esta ação não pode ser desfeita.",
            culto.title
        ),
        action: format!("{}/{}/excluir", LIST_PATH, id),
        cancel: LIST_PATH.to_string(),
    };
    render(&page)
}

// POST /admin/cultos/{id}/excluir
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<SignedInUser>,
    cookies: Cookies,
    Path(id): Path<String>,
) -> AppResult<Redirect> {
    let flash = match culto_service::delete(&state.store, &id, &user.token).await {
        Ok(()) => Flash::success("Culto excluído com sucesso!"),
        Err(e) => Flash::error(e.user_message()),
    };
    notify(&state, &cookies, flash);
    Ok(Redirect::to(LIST_PATH))
}
