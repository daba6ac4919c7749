// src/web/mw_admin.rs
use crate::{
    error::AppResult,
    templates::AccessDeniedPage,
    web::{mw_auth::SignedInUser, render},
};
use axum::{
    extract::{Extension, Request},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Só deixa passar quem tem o papel de administrador.
/// Corre *depois* de `require_auth`, que põe o `SignedInUser` nas extensões.
pub async fn require_admin(
    Extension(signed_in): Extension<SignedInUser>,
    request: Request,
    next: Next,
) -> AppResult<Response> {
    if signed_in.is_admin {
        return Ok(next.run(request).await);
    }

    tracing::warn!("Admin MW: acesso negado para {} (sem papel admin)", signed_in.user.id);
    let page = AccessDeniedPage {
        email: signed_in.email(),
    };
    Ok((StatusCode::FORBIDDEN, render(&page)?).into_response())
}
