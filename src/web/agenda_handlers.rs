// src/web/agenda_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::schedule::ScheduleForm,
    services::schedule_service,
    state::AppState,
    templates::{AdminAgendaPage, AgendaFormPage, ConfirmDeletePage},
    web::{admin_chrome, flash::Flash, mw_auth::SignedInUser, notify, or_empty, render},
};
use axum::{
    extract::{Extension, Form, Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tower_cookies::Cookies;

const LIST_PATH: &str = "/admin/agenda";

fn form_page(
    state: &AppState,
    cookies: &Cookies,
    user: &SignedInUser,
    id: Option<&str>,
    form: ScheduleForm,
    error: Option<String>,
) -> AgendaFormPage {
    let (heading, action) = match id {
        Some(id) => ("Editar Evento".to_string(), format!("{}/{}/editar", LIST_PATH, id)),
        None => ("Novo Evento".to_string(), format!("{}/novo", LIST_PATH)),
    };
    AgendaFormPage {
        chrome: admin_chrome(state, cookies, user, LIST_PATH),
        heading,
        action,
        form,
        error,
    }
}

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<SignedInUser>,
    cookies: Cookies,
) -> AppResult<impl IntoResponse> {
    let page = AdminAgendaPage {
        chrome: admin_chrome(&state, &cookies, &user, LIST_PATH),
        items: or_empty(schedule_service::list(&state.store).await, "agenda"),
    };
    render(&page)
}

pub async fn new_form(
    State(state): State<AppState>,
    Extension(user): Extension<SignedInUser>,
    cookies: Cookies,
) -> AppResult<impl IntoResponse> {
    render(&form_page(&state, &cookies, &user, None, ScheduleForm::default(), None))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<SignedInUser>,
    cookies: Cookies,
    Form(form): Form<ScheduleForm>,
) -> AppResult<Response> {
    match schedule_service::create(&state.store, &form, &user.token).await {
        Ok(_) => {
            notify(&state, &cookies, Flash::success("Evento adicionado à programação!"));
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
    let item = schedule_service::find(&state.store, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    render(&form_page(
        &state,
        &cookies,
        &user,
        Some(&id),
        ScheduleForm::from_item(&item),
        None,
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<SignedInUser>,
    cookies: Cookies,
    Path(id): Path<String>,
    Form(form): Form<ScheduleForm>,
) -> AppResult<Response> {
    match schedule_service::update(&state.store, &id, &form, &user.token).await {
        Ok(_) => {
            notify(&state, &cookies, Flash::success("Evento atualizado!"));
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
    let item = schedule_service::find(&state.store, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    let page = ConfirmDeletePage {
        chrome: admin_chrome(&state, &cookies, &user, LIST_PATH),
        heading: "Excluir evento".to_string(),
        message: format!(
            "Remover \"{}\" ({} {}) da programação?",
            item.event, item.day, item.time
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
    let flash = match schedule_service::delete(&state.store, &id, &user.token).await {
        Ok(()) => Flash::success("Evento removido."),
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
    async fn new_event_goes_to_end_of_schedule() {
        let (app, _store, backend) = app();
        backend.seed(
            "schedule",
            vec![json!({"id": "s1", "day": "Domingo", "time": "18h", "event": "Culto", "order_index": 4})],
        );
        let cookie = login(&app, &backend, "pastor@igreja.org", true).await;
        let response = send(
            &app,
            post_form(
                "/admin/agenda/novo",
                &cookie,
                "day=Quarta&time=20h&event=Estudo+B%C3%ADblico&is_highlight=on",
            ),
        )
        .await;
        assert_eq!(location(&response), "/admin/agenda");

        let rows = backend.rows("schedule");
        assert_eq!(rows[1]["order_index"], 5);
        assert_eq!(rows[1]["is_highlight"], true);

        let html = body_text(send(&app, get("/", "")).await).await;
        assert!(html.contains("Estudo Bíblico"));
    }

    #[tokio::test]
    async fn blank_event_is_rejected() {
        let (app, _store, backend) = app();
        let cookie = login(&app, &backend, "pastor@igreja.org", true).await;
        let response = send(
            &app,
            post_form("/admin/agenda/novo", &cookie, "day=Quarta&time=20h&event="),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response).await.contains("Informe o evento."));
    }

    #[tokio::test]
    async fn removing_event_updates_public_schedule() {
        let (app, _store, backend) = app();
        backend.seed(
            "schedule",
            vec![json!({"id": "s1", "day": "Sábado", "time": "19h30", "event": "Culto de Jovens", "order_index": 1})],
        );
        let cookie = login(&app, &backend, "pastor@igreja.org", true).await;
        assert!(body_text(send(&app, get("/", "")).await).await.contains("Culto de Jovens"));

        let response = send(&app, post_form("/admin/agenda/s1/excluir", &cookie, "")).await;
        assert_eq!(location(&response), "/admin/agenda");
        assert!(!body_text(send(&app, get("/", "")).await).await.contains("Culto de Jovens"));
    }
}
