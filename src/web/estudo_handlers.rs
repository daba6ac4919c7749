// src/web/estudo_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::estudo::EstudoForm,
    services::estudo_service,
    state::AppState,
    templates::{AdminEstudosPage, ConfirmDeletePage, EditorToolbar, EstudoCard, EstudoFormPage},
    web::{admin_chrome, flash::Flash, mw_auth::SignedInUser, notify, or_empty, render},
};
use axum::{
    extract::{Extension, Form, Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tower_cookies::Cookies;

const LIST_PATH: &str = "/admin/estudos";

fn form_page(
    state: &AppState,
    cookies: &Cookies,
    user: &SignedInUser,
    id: Option<&str>,
    form: EstudoForm,
    error: Option<String>,
) -> EstudoFormPage {
    let (heading, action) = match id {
        Some(id) => ("Editar Estudo".to_string(), format!("{}/{}/editar", LIST_PATH, id)),
        None => ("Novo Estudo".to_string(), format!("{}/novo", LIST_PATH)),
    };
    EstudoFormPage {
        chrome: admin_chrome(state, cookies, user, LIST_PATH),
        heading,
        action,
        form,
        error,
        toolbar: EditorToolbar::new(),
    }
}

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<SignedInUser>,
    cookies: Cookies,
) -> AppResult<impl IntoResponse> {
    let estudos = or_empty(estudo_service::list_all(&state.store, &user.token).await, "estudos");
    let page = AdminEstudosPage {
        chrome: admin_chrome(&state, &cookies, &user, LIST_PATH),
        estudos: estudos.iter().map(EstudoCard::from).collect(),
    };
    render(&page)
}

pub async fn new_form(
    State(state): State<AppState>,
    Extension(user): Extension<SignedInUser>,
    cookies: Cookies,
) -> AppResult<impl IntoResponse> {
    render(&form_page(&state, &cookies, &user, None, EstudoForm::blank(), None))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<SignedInUser>,
    cookies: Cookies,
    Form(form): Form<EstudoForm>,
) -> AppResult<Response> {
    match estudo_service::create(&state.store, &form, &user.token).await {
        Ok(_) => {
            notify(&state, &cookies, Flash::success("Estudo criado com sucesso!"));
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
    let estudo = estudo_service::find_by_id(&state.store, &id, &user.token)
        .await?
        .ok_or(AppError::NotFound)?;
    render(&form_page(
        &state,
        &cookies,
        &user,
        Some(&id),
        EstudoForm::from_estudo(&estudo),
        None,
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<SignedInUser>,
    cookies: Cookies,
    Path(id): Path<String>,
    Form(form): Form<EstudoForm>,
) -> AppResult<Response> {
    match estudo_service::update(&state.store, &id, &form, &user.token).await {
        Ok(_) => {
            notify(&state, &cookies, Flash::success("Estudo atualizado com sucesso!"));
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
    let estudo = estudo_service::find_by_id(&state.store, &id, &user.token)
        .await?
        .ok_or(AppError::NotFound)?;
    let page = ConfirmDeletePage {
        chrome: admin_chrome(&state, &cookies, &user, LIST_PATH),
        heading: "Excluir estudo".to_string(),
        message: format!(
            "Tem certeza que deseja excluir \"{}\"? Esta ação não pode ser desfeita.",
            estudo.title
        ),
        action: format!("{}/{}/excluir", LIST_PATH, id),
        cancel: LIST_PATH.to_string(),
    };
    render(&page)
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<SignedInUser>,
    cookies: Cookies,
    Path(id): Path<String>,
) -> AppResult<Redirect> {
    let flash = match estudo_service::delete(&state.store, &id, &user.token).await {
        Ok(()) => Flash::success("Estudo excluído com sucesso!"),
        Err(e) => Flash::error(e.user_message()),
    };
    notify(&state, &cookies, flash);
    Ok(Redirect::to(LIST_PATH))
}
