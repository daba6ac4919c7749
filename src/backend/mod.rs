// src/backend/mod.rs
//! Fronteira com o backend alojado (tabelas, armazenamento de ficheiros e autenticação).
//!
//! A aplicação não guarda estado próprio: todas as leituras e escritas passam
//! pelo trait [`Backend`]. Em produção usa-se [`rest::RestBackend`]; os testes
//! usam a implementação em memória.

#[cfg(test)]
pub mod memory;
pub mod rest;
pub mod watch;

use crate::{
    error::AppResult,
    models::user::{AuthSession, AuthUser},
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Consulta filtrada: igualdade, ordenação, limite e seleção de colunas.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<(String, String)>,
    pub order: Vec<(String, bool)>,
    pub limit: Option<usize>,
    pub columns: Option<Vec<String>>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.filters.push((column.to_string(), value.to_string()));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order.push((column.to_string(), ascending));
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = Some(columns.iter().map(|c| c.to_string()).collect());
        self
    }

    /// Parâmetros no formato de query string do PostgREST.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        let select = self
            .columns
            .as_ref()
            .map(|cols| cols.join(","))
            .unwrap_or_else(|| "*".to_string());
        params.push(("select".to_string(), select));
        for (column, value) in &self.filters {
            params.push((column.clone(), format!("eq.{}", value)));
        }
        if !self.order.is_empty() {
            let order = self
                .order
                .iter()
                .map(|(col, asc)| format!("{}.{}", col, if *asc { "asc" } else { "desc" }))
                .collect::<Vec<_>>()
                .join(",");
            params.push(("order".to_string(), order));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }
}

/// Operações oferecidas pelo backend. `auth` é o token do utilizador;
/// `None` significa acesso anónimo com a chave pública.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn select(&self, table: &str, query: &Query, auth: Option<&str>) -> AppResult<Vec<Value>>;

    async fn count(&self, table: &str, query: &Query, auth: Option<&str>) -> AppResult<u64>;

    async fn insert(&self, table: &str, row: Value, auth: Option<&str>) -> AppResult<Value>;

    async fn update(&self, table: &str, id: &str, patch: Value, auth: Option<&str>) -> AppResult<Value>;

    async fn delete(&self, table: &str, id: &str, auth: Option<&str>) -> AppResult<()>;

    /// Escrita em lote: insere ou substitui as linhas que colidem em `on_conflict`.
    async fn upsert(
        &self,
        table: &str,
        rows: Vec<Value>,
        on_conflict: &str,
        auth: Option<&str>,
    ) -> AppResult<()>;

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        auth: Option<&str>,
    ) -> AppResult<()>;

    fn public_url(&self, bucket: &str, path: &str) -> String;

    async fn remove(&self, bucket: &str, paths: &[String], auth: Option<&str>) -> AppResult<()>;

    async fn sign_up(&self, email: &str, password: &str) -> AppResult<AuthUser>;

    async fn sign_in(&self, email: &str, password: &str) -> AppResult<AuthSession>;

    async fn sign_out(&self, token: &str) -> AppResult<()>;

    /// `None` quando o token já não é válido.
    async fn get_user(&self, token: &str) -> AppResult<Option<AuthUser>>;
}

/// Converte as linhas JSON no tipo do modelo.
pub fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> AppResult<Vec<T>> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(Into::into))
        .collect()
}
