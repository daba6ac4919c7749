// src/web/auth_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::user::{LoginForm, LoginMode},
    services::auth_service::{self, AuthEvent, AuthStatus},
    state::AppState,
    templates::LoginPage,
    web::{
        flash::{self, Flash},
        notify, render,
    },
};
use axum::{
    extract::{Form, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_cookies::Cookies;
use tower_sessions::Session;

#[derive(Deserialize, Debug, Default)]
pub struct LoginParams {
    #[serde(default)]
    mode: LoginMode,
}

// GET /admin/login
pub async fn show_login_form(
    State(state): State<AppState>,
    session: Session,
    cookies: Cookies,
    Query(params): Query<LoginParams>,
) -> AppResult<Response> {
    let mut expired = None;
    // Quem já é admin vai direto para o painel, desde que o token ainda valha
    if let AuthStatus::Admin { .. } = auth_service::current_status(&state.store, &session).await? {
        if auth_service::token_is_valid(&state.store, &session).await? {
            tracing::debug!("GET /admin/login: sessão de admin ativa, redirecionando");
            return Ok(Redirect::to("/admin").into_response());
        }
        tracing::info!("GET /admin/login: token da sessão já não vale, encerrando");
        auth_service::handle_event(&state.store, &session, AuthEvent::SignedOut).await?;
        expired = Some(Flash::error(AppError::SessionExpired.user_message()));
    }

    let page = LoginPage {
        signup: params.mode == LoginMode::Signup,
        email: String::new(),
        error: None,
        flash: expired.or_else(|| flash::take(&cookies, &state.cookie_key)),
    };
    Ok(render(&page)?.into_response())
}

// POST /admin/login (entrar ou criar conta, conforme `mode`)
pub async fn handle_login(
    State(state): State<AppState>,
    session: Session,
    cookies: Cookies,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    tracing::info!("Tentativa de {:?} para {}", form.mode, form.email);

    let result = match form.mode {
        LoginMode::Signin => auth_service::sign_in(&state.store, &session, &form)
            .await
            .map(|status| {
                if let AuthStatus::Admin { .. } = status {
                    notify(&state, &cookies, Flash::success("Login realizado com sucesso!"));
                }
                // O guarda do /admin decide o que mostrar nos outros estados
                Redirect::to("/admin").into_response()
            }),
        LoginMode::Signup => auth_service::sign_up(&state.store, &form).await.map(|_| {
            notify(
                &state,
                &cookies,
                Flash::success("Conta criada! Verifique seu e-mail para confirmar o cadastro."),
            );
            Redirect::to("/admin/login").into_response()
        }),
    };

    match result {
        Ok(response) => Ok(response),
        Err(e) => {
            tracing::warn!("Falha de autenticação para {}: {}", form.email, e);
            let page = LoginPage {
                signup: form.mode == LoginMode::Signup,
                email: form.email.clone(),
                error: Some(e.user_message()),
                flash: None,
            };
            Ok(render(&page)?.into_response())
        }
    }
}

// POST /admin/logout
pub async fn handle_logout(
    State(state): State<AppState>,
    session: Session,
    cookies: Cookies,
) -> AppResult<Redirect> {
    auth_service::sign_out(&state.store, &session).await?;
    notify(&state, &cookies, Flash::success("Sessão encerrada."));
    Ok(Redirect::to("/admin/login"))
}
