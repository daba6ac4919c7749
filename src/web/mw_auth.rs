// src/web/mw_auth.rs
use crate::{
    backend::watch::TokenWatch,
    error::{AppError, AppResult},
    models::user::AuthUser,
    services::auth_service::{self, AuthEvent, AuthStatus},
    state::AppState,
    templates::AdminLoadingPage,
    web::{flash::Flash, notify, render},
};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_cookies::Cookies;
use tower_sessions::Session;

/// Utilizador com sessão aberta, posto nas extensões do pedido.
#[derive(Clone, Debug)]
pub struct SignedInUser {
    pub user: AuthUser,
    // Token para as escritas no backend
    pub token: String,
    pub is_admin: bool,
}

impl SignedInUser {
    pub fn email(&self) -> String {
        self.user.email.clone().unwrap_or_else(|| self.user.id.clone())
    }
}

// Segundos até a página de espera se recarregar
const LOADING_REFRESH_SECS: u32 = 2;

// Middleware que resolve o estado de autenticação da sessão.
// Se o backend recusar o token durante o pedido, a sessão termina aqui.
pub async fn require_auth(
    State(state): State<AppState>,
    session: Session,
    cookies: Cookies,
    request: Request,
    next: Next,
) -> AppResult<Response> {
    let (response, token_rejected) =
        TokenWatch::scope(guard(&state, &session, request, next)).await;
    if !token_rejected {
        return response;
    }

    tracing::info!("Autenticação MW: token recusado pelo backend, encerrando sessão");
    auth_service::handle_event(&state.store, &session, AuthEvent::SignedOut).await?;
    notify(&state, &cookies, Flash::error(AppError::SessionExpired.user_message()));
    Ok(Redirect::to("/admin/login").into_response())
}

async fn guard(
    state: &AppState,
    session: &Session,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let status = auth_service::current_status(&state.store, session).await?;
    let (user, is_admin) = match status {
        AuthStatus::Unauthenticated => {
            tracing::debug!("Autenticação MW: sem sessão, redirecionando para /admin/login");
            return Ok(Redirect::to("/admin/login").into_response());
        }
        AuthStatus::Loading => {
            tracing::debug!("Autenticação MW: verificação de admin pendente");
            let page = AdminLoadingPage {
                refresh_secs: LOADING_REFRESH_SECS,
            };
            return Ok(render(&page)?.into_response());
        }
        AuthStatus::Authenticated { user } => (user, false),
        AuthStatus::Admin { user } => (user, true),
    };

    let token = auth_service::access_token(session)
        .await?
        .ok_or(AppError::SessionExpired)?;
    tracing::debug!("Autenticação MW: utilizador '{}' autenticado", user.id);
    request.extensions_mut().insert(SignedInUser {
        user,
        token,
        is_admin,
    });
    Ok(next.run(request).await)
}
