// src/web/editor_handlers.rs
//! Endpoints do editor de texto rico usados pelo script dos formulários.

use crate::services::{
    content,
    editor::{self, Edit, EditorAction},
};
use axum::{
    extract::{Form, Json},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct ApplyRequest {
    // Botão da barra de ferramentas...
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    value: Option<String>,
    // ...ou atalho de teclado
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    modifier: bool,
    text: String,
    #[serde(default)]
    start: usize,
    #[serde(default)]
    end: usize,
}

impl ApplyRequest {
    fn resolve(&self) -> Option<EditorAction> {
        match (&self.action, &self.key) {
            (Some(name), _) => EditorAction::parse(name, self.value.as_deref()),
            (None, Some(key)) => editor::shortcut(key, self.modifier),
            (None, None) => None,
        }
    }
}

// POST /admin/editor/apply
// Sem ação reconhecida responde 204 e o navegador mantém o texto.
pub async fn apply(Json(request): Json<ApplyRequest>) -> Response {
    match request.resolve() {
        Some(action) => {
            let edit: Edit = editor::apply(&action, &request.text, request.start, request.end);
            Json(edit).into_response()
        }
        None => {
            tracing::debug!(
                "Editor: nada a fazer para action={:?} key={:?}",
                request.action,
                request.key
            );
            StatusCode::NO_CONTENT.into_response()
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct PreviewForm {
    #[serde(default)]
    content: String,
}

// POST /admin/editor/preview
pub async fn preview(Form(form): Form<PreviewForm>) -> Html<String> {
    Html(content::render_rich(&form.content))
}

#[cfg(test)]
mod tests {
    use crate::web::test_support::{app, body_text, login, post_form, send};
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};

    fn json_request(cookie: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/admin/editor/apply")
            .header(header::COOKIE, cookie)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn toolbar_bold_wraps_selection() {
        let (app, _store, backend) = app();
        let cookie = login(&app, &backend, "pastor@igreja.org", true).await;
        let response = send(
            &app,
            json_request(&cookie, json!({"action": "bold", "text": "Deus é amor", "start": 7, "end": 11})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let edit: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(edit["text"], "Deus é **amor**");
        assert_eq!(edit["cursor"], 15);
    }

    #[tokio::test]
    async fn shortcut_without_modifier_is_ignored() {
        let (app, _store, backend) = app();
        let cookie = login(&app, &backend, "pastor@igreja.org", true).await;
        let response = send(
            &app,
            json_request(&cookie, json!({"key": "b", "modifier": false, "text": "x", "start": 0, "end": 1})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn preview_sanitises_html() {
        let (app, _store, backend) = app();
        let cookie = login(&app, &backend, "pastor@igreja.org", true).await;
        let response = send(
            &app,
            post_form(
                "/admin/editor/preview",
                &cookie,
                "content=%23+Salmo+23%0A%3Cscript%3Ealert(1)%3C%2Fscript%3E",
            ),
        )
        .await;
        let html = body_text(response).await;
        assert!(html.contains("<h1>Salmo 23</h1>"));
        assert!(!html.contains("<script>"));
    }

    #[tokio::test]
    async fn editor_requires_login() {
        let (app, _store, _backend) = app();
        let response = send(&app, json_request("", json!({"action": "bold", "text": "x"}))).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }
}
