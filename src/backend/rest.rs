// src/backend/rest.rs
use super::{watch::TokenWatch, Backend, Query};
use crate::{
    error::{AppError, AppResult},
    models::user::{AuthSession, AuthUser},
};
use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};

/// Cliente HTTP para o backend alojado (REST estilo PostgREST, storage e auth).
#[derive(Clone)]
pub struct RestBackend {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl RestBackend {
    pub fn new(base_url: &str, anon_key: &str) -> AppResult<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        })
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn object_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, encode_path(path))
    }

    fn auth_url(&self, endpoint: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, endpoint)
    }

    /// Cabeçalhos comuns: chave pública + bearer (token do utilizador ou a própria chave).
    fn authorized(&self, req: RequestBuilder, auth: Option<&str>) -> RequestBuilder {
        req.header("apikey", &self.anon_key)
            .bearer_auth(auth.unwrap_or(&self.anon_key))
    }

    /// Converte respostas de erro em `AppError`, preservando a mensagem do backend.
    async fn check(resp: Response, user_token: bool) -> AppResult<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED && user_token {
            tracing::warn!("Backend recusou o token do utilizador (401): {}", body);
            TokenWatch::reject();
            return Err(AppError::SessionExpired);
        }
        let message = backend_message(&body, status.as_u16());
        tracing::warn!(status = status.as_u16(), "Erro do backend: {}", message);
        Err(AppError::Backend {
            status: status.as_u16(),
            message,
        })
    }
}

/// Codifica cada segmento do caminho do objeto.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Extrai a mensagem legível de um corpo de erro do backend.
pub(crate) fn backend_message(body: &str, status: u16) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for field in ["message", "msg", "error_description", "error"] {
            if let Some(msg) = value.get(field).and_then(Value::as_str) {
                if !msg.is_empty() {
                    return msg.to_string();
                }
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("Erro {} do servidor", status)
    } else {
        trimmed.to_string()
    }
}

/// Total de um cabeçalho `Content-Range` ("0-9/42" ou "*/42").
pub(crate) fn parse_content_range(value: &str) -> Option<u64> {
    value.rsplit_once('/').and_then(|(_, total)| total.trim().parse().ok())
}

#[async_trait]
impl Backend for RestBackend {
    async fn select(&self, table: &str, query: &Query, auth: Option<&str>) -> AppResult<Vec<Value>> {
        tracing::debug!("SELECT {} {:?}", table, query);
        let req = self.client.get(self.rest_url(table)).query(&query.to_params());
        let resp = Self::check(self.authorized(req, auth).send().await?, auth.is_some()).await?;
        Ok(resp.json::<Vec<Value>>().await?)
    }

    async fn count(&self, table: &str, query: &Query, auth: Option<&str>) -> AppResult<u64> {
        let req = self
            .client
            .head(self.rest_url(table))
            .query(&query.to_params())
            .header("Prefer", "count=exact");
        let resp = Self::check(self.authorized(req, auth).send().await?, auth.is_some()).await?;
        let total = resp
            .headers()
            .get(header::CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range)
            .unwrap_or(0);
        Ok(total)
    }

    async fn insert(&self, table: &str, row: Value, auth: Option<&str>) -> AppResult<Value> {
        tracing::debug!("INSERT {}", table);
        let req = self
            .client
            .post(self.rest_url(table))
            .header("Prefer", "return=representation")
            .json(&row);
        let resp = Self::check(self.authorized(req, auth).send().await?, auth.is_some()).await?;
        let mut rows = resp.json::<Vec<Value>>().await?;
        rows.pop().ok_or(AppError::InternalServerError)
    }

    async fn update(&self, table: &str, id: &str, patch: Value, auth: Option<&str>) -> AppResult<Value> {
        tracing::debug!("UPDATE {} id={}", table, id);
        let req = self
            .client
            .patch(self.rest_url(table))
            .query(&Query::new().eq("id", id).to_params())
            .header("Prefer", "return=representation")
            .json(&patch);
        let resp = Self::check(self.authorized(req, auth).send().await?, auth.is_some()).await?;
        let mut rows = resp.json::<Vec<Value>>().await?;
        // Nenhuma linha devolvida: id inexistente (ou bloqueado pelas políticas)
        rows.pop().ok_or(AppError::NotFound)
    }

    async fn delete(&self, table: &str, id: &str, auth: Option<&str>) -> AppResult<()> {
        tracing::debug!("DELETE {} id={}", table, id);
        let req = self
            .client
            .delete(self.rest_url(table))
            .query(&[("id", format!("eq.{}", id))]);
        Self::check(self.authorized(req, auth).send().await?, auth.is_some()).await?;
        Ok(())
    }

    async fn upsert(
        &self,
        table: &str,
        rows: Vec<Value>,
        on_conflict: &str,
        auth: Option<&str>,
    ) -> AppResult<()> {
        tracing::debug!("UPSERT {} ({} linhas)", table, rows.len());
        let req = self
            .client
            .post(self.rest_url(table))
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&rows);
        Self::check(self.authorized(req, auth).send().await?, auth.is_some()).await?;
        Ok(())
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        auth: Option<&str>,
    ) -> AppResult<()> {
        tracing::debug!("UPLOAD {}/{} ({} bytes)", bucket, path, bytes.len());
        let req = self
            .client
            .post(self.object_url(bucket, path))
            .header(header::CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes);
        Self::check(self.authorized(req, auth).send().await?, auth.is_some()).await?;
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            bucket,
            encode_path(path)
        )
    }

    async fn remove(&self, bucket: &str, paths: &[String], auth: Option<&str>) -> AppResult<()> {
        tracing::debug!("REMOVE {} {:?}", bucket, paths);
        let req = self
            .client
            .delete(format!("{}/storage/v1/object/{}", self.base_url, bucket))
            .json(&json!({ "prefixes": paths }));
        Self::check(self.authorized(req, auth).send().await?, auth.is_some()).await?;
        Ok(())
    }

    async fn sign_up(&self, email: &str, password: &str) -> AppResult<AuthUser> {
        let req = self
            .client
            .post(self.auth_url("signup"))
            .json(&json!({ "email": email, "password": password }));
        let resp = Self::check(self.authorized(req, None).send().await?, false).await?;
        let body = resp.json::<Value>().await?;
        // Com confirmação por e-mail vem só o utilizador; sem ela vem uma sessão completa
        let user = match body.get("user") {
            Some(user) if !user.is_null() => user.clone(),
            _ => body,
        };
        Ok(serde_json::from_value(user)?)
    }

    async fn sign_in(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        let req = self
            .client
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));
        let resp = self.authorized(req, None).send().await?;
        if resp.status() == StatusCode::BAD_REQUEST {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!("Login recusado: {}", backend_message(&body, 400));
            return Err(AppError::InvalidCredentials);
        }
        let resp = Self::check(resp, false).await?;
        Ok(resp.json::<AuthSession>().await?)
    }

    async fn sign_out(&self, token: &str) -> AppResult<()> {
        let req = self.client.post(self.auth_url("logout"));
        match Self::check(self.authorized(req, Some(token)).send().await?, true).await {
            // Token já expirado: para nós a sessão termina na mesma
            Ok(_) | Err(AppError::SessionExpired) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn get_user(&self, token: &str) -> AppResult<Option<AuthUser>> {
        let req = self.client.get(self.auth_url("user"));
        match Self::check(self.authorized(req, Some(token)).send().await?, true).await {
            Ok(resp) => Ok(Some(resp.json::<AuthUser>().await?)),
            Err(AppError::SessionExpired) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
