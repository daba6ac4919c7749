// src/web/mod.rs
pub mod admin_handlers;
pub mod agenda_handlers;
pub mod auth_handlers;
pub mod culto_handlers;
pub mod editor_handlers;
pub mod estudo_handlers;
pub mod flash;
pub mod mw_admin;
pub mod mw_auth;
pub mod page_handlers;
pub mod photo_handlers;
pub mod public_handlers;
pub mod routes;
pub mod upload;

use crate::{
    error::AppResult,
    state::AppState,
    templates::AdminChrome,
    web::{flash::Flash, mw_auth::SignedInUser},
};
use askama::Template;
use axum::response::Html;
use tower_cookies::Cookies;

/// Renderiza um template Askama para uma resposta HTML.
pub(crate) fn render<T: Template>(template: &T) -> AppResult<Html<String>> {
    Ok(Html(template.render()?))
}

/// Leituras que falham deixam a secção vazia (o erro fica no log).
pub(crate) fn or_empty<T>(result: AppResult<Vec<T>>, what: &str) -> Vec<T> {
    result.unwrap_or_else(|e| {
        tracing::error!("Erro ao carregar {}: {}", what, e);
        Vec::new()
    })
}

/// Barra lateral do admin com a notificação pendente.
pub(crate) fn admin_chrome(
    state: &AppState,
    cookies: &Cookies,
    user: &SignedInUser,
    section: &str,
) -> AdminChrome {
    AdminChrome::new(&user.email(), section, flash::take(cookies, &state.cookie_key))
}

/// Guarda a notificação para a página seguinte.
pub(crate) fn notify(state: &AppState, cookies: &Cookies, flash: Flash) {
    flash::push(cookies, &state.cookie_key, flash);
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Utilitários dos testes de rotas: app completa sobre o backend em memória.

    use crate::{
        backend::memory::MemoryBackend,
        session_store::SessionMemory,
        state::{test_support::{app_state, memory_store}, Store},
        web::routes::create_router,
    };
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, Response, StatusCode},
        Router,
    };
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt;
    use tower_cookies::CookieManagerLayer;
    use tower_sessions::SessionManagerLayer;

    pub fn app() -> (Router, Store, Arc<MemoryBackend>) {
        let (store, backend) = memory_store();
        let router = create_router(app_state(store.clone()))
            .layer(CookieManagerLayer::new())
            .layer(SessionManagerLayer::new(SessionMemory::default()).with_secure(false));
        (router, store, backend)
    }

    pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
        app.clone().oneshot(request).await.unwrap()
    }

    pub fn get(uri: &str, cookie: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap()
    }

    pub fn post_form(uri: &str, cookie: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::COOKIE, cookie)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub async fn body_text(response: Response<Body>) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    /// Cabeçalho `Cookie` com os cookies definidos pela resposta.
    pub fn cookies_from(response: &Response<Body>) -> String {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn location(response: &Response<Body>) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    /// Cria um utilizador (admin ou não), faz login e devolve o cookie de sessão.
    pub async fn login(app: &Router, backend: &MemoryBackend, email: &str, admin: bool) -> String {
        let (user, _) = backend.add_user(email, "segredo");
        if admin {
            backend.seed("user_roles", vec![json!({"user_id": user.id, "role": "admin"})]);
        }
        let body = format!("email={}&password=segredo&mode=signin", urlencoding::encode(email));
        let response = send(app, post_form("/admin/login", "", &body)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        cookies_from(&response)
    }
}
