// src/backend/memory.rs
//! Backend em memória para os testes: mesmas regras de filtro/ordem do REST,
//! sem rede.

use super::{watch::TokenWatch, Backend, Query};
use crate::{
    error::{AppError, AppResult},
    models::user::{AuthSession, AuthUser},
};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::{
    cmp::Ordering,
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicUsize, Ordering as AtomicOrdering},
        Mutex,
    },
};

#[derive(Default)]
struct Inner {
    tables: HashMap<String, Vec<Value>>,
    objects: HashMap<(String, String), Vec<u8>>,
    // email -> (id, password)
    users: HashMap<String, (String, String)>,
    // token -> user
    tokens: HashMap<String, AuthUser>,
    expired_tokens: HashSet<String>,
    failing_tables: HashMap<String, String>,
    failing_reads: HashMap<String, String>,
    uploads_left: Option<usize>,
    broken_removals: HashSet<String>,
    next_id: u64,
}

#[derive(Default)]
pub struct MemoryBackend {
    inner: Mutex<Inner>,
    pub select_calls: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        let mut inner = self.inner.lock().unwrap();
        inner.tables.entry(table.to_string()).or_default().extend(rows);
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        let inner = self.inner.lock().unwrap();
        inner.tables.get(table).cloned().unwrap_or_default()
    }

    pub fn object_exists(&self, bucket: &str, path: &str) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.objects.contains_key(&(bucket.to_string(), path.to_string()))
    }

    pub fn object_count(&self, bucket: &str) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.objects.keys().filter(|(b, _)| b == bucket).count()
    }

    /// Escritas nesta tabela passam a falhar com `message`.
    pub fn fail_writes(&self, table: &str, message: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.failing_tables.insert(table.to_string(), message.to_string());
    }

    /// Leituras desta tabela passam a falhar com `message`.
    pub fn fail_reads(&self, table: &str, message: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.failing_reads.insert(table.to_string(), message.to_string());
    }

    fn check_readable(&self, table: &str) -> AppResult<()> {
        let inner = self.inner.lock().unwrap();
        match inner.failing_reads.get(table) {
            Some(message) => Err(AppError::Backend {
                status: 503,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Apenas `n` uploads terão sucesso; os seguintes falham.
    pub fn allow_uploads(&self, n: usize) {
        self.inner.lock().unwrap().uploads_left = Some(n);
    }

    pub fn break_removals(&self, bucket: &str) {
        self.inner.lock().unwrap().broken_removals.insert(bucket.to_string());
    }

    /// Cria um utilizador e devolve o token de uma sessão já aberta.
    pub fn add_user(&self, email: &str, password: &str) -> (AuthUser, String) {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = format!("user-{}", inner.next_id);
        inner
            .users
            .insert(email.to_string(), (id.clone(), password.to_string()));
        let user = AuthUser {
            id: id.clone(),
            email: Some(email.to_string()),
        };
        let token = format!("token-{}", id);
        inner.tokens.insert(token.clone(), user.clone());
        (user, token)
    }

    /// Todos os tokens emitidos até agora passam a ser recusados com 401.
    pub fn expire_sessions(&self) {
        let mut inner = self.inner.lock().unwrap();
        let issued: Vec<String> = inner.tokens.keys().cloned().collect();
        inner.expired_tokens.extend(issued);
    }

    fn check_token(&self, auth: Option<&str>) -> AppResult<()> {
        let inner = self.inner.lock().unwrap();
        match auth {
            Some(token) if inner.expired_tokens.contains(token) => {
                TokenWatch::reject();
                Err(AppError::SessionExpired)
            }
            _ => Ok(()),
        }
    }

    fn check_writable(inner: &Inner, table: &str) -> AppResult<()> {
        match inner.failing_tables.get(table) {
            Some(message) => Err(AppError::Backend {
                status: 400,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

fn as_filter_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn matches(row: &Value, query: &Query) -> bool {
    query.filters.iter().all(|(column, expected)| {
        row.get(column)
            .map(|v| as_filter_string(v) == *expected)
            .unwrap_or(false)
    })
}

// Nulos ficam por último, como no Postgres em ordem ascendente.
fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (x, y) => as_filter_string(x).cmp(&as_filter_string(y)),
    }
}

fn apply_query(mut rows: Vec<Value>, query: &Query) -> Vec<Value> {
    rows.retain(|row| matches(row, query));
    rows.sort_by(|a, b| {
        for (column, ascending) in &query.order {
            let left = a.get(column).unwrap_or(&Value::Null);
            let right = b.get(column).unwrap_or(&Value::Null);
            let ord = compare(left, right);
            let ord = if *ascending { ord } else { ord.reverse() };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
    if let Some(limit) = query.limit {
        rows.truncate(limit);
    }
    if let Some(columns) = &query.columns {
        rows = rows
            .into_iter()
            .map(|row| {
                let mut projected = Map::new();
                for column in columns {
                    if let Some(v) = row.get(column) {
                        projected.insert(column.clone(), v.clone());
                    }
                }
                Value::Object(projected)
            })
            .collect();
    }
    rows
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn select(&self, table: &str, query: &Query, auth: Option<&str>) -> AppResult<Vec<Value>> {
        self.select_calls.fetch_add(1, AtomicOrdering::SeqCst);
        // Cede a vez para que pedidos concorrentes se sobreponham nos testes
        tokio::task::yield_now().await;
        self.check_token(auth)?;
        self.check_readable(table)?;
        let rows = self.rows(table);
        Ok(apply_query(rows, query))
    }

    async fn count(&self, table: &str, query: &Query, auth: Option<&str>) -> AppResult<u64> {
        self.check_token(auth)?;
        self.check_readable(table)?;
        let rows = self.rows(table);
        Ok(rows.iter().filter(|row| matches(row, query)).count() as u64)
    }

    async fn insert(&self, table: &str, mut row: Value, auth: Option<&str>) -> AppResult<Value> {
        self.check_token(auth)?;
        let mut inner = self.inner.lock().unwrap();
        Self::check_writable(&inner, table)?;
        inner.next_id += 1;
        let id = format!("{}-{}", table, inner.next_id);
        if let Value::Object(map) = &mut row {
            map.entry("id").or_insert_with(|| Value::String(id));
            map.entry("created_at")
                .or_insert_with(|| Value::String(format!("2024-01-01T00:00:{:02}Z", inner.next_id % 60)));
        }
        inner
            .tables
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn update(&self, table: &str, id: &str, patch: Value, auth: Option<&str>) -> AppResult<Value> {
        self.check_token(auth)?;
        let mut inner = self.inner.lock().unwrap();
        Self::check_writable(&inner, table)?;
        let rows = inner.tables.entry(table.to_string()).or_default();
        let row = rows
            .iter_mut()
            .find(|r| r.get("id").map(as_filter_string).as_deref() == Some(id))
            .ok_or(AppError::NotFound)?;
        if let (Value::Object(target), Value::Object(changes)) = (row, patch) {
            for (k, v) in changes {
                target.insert(k, v);
            }
            return Ok(Value::Object(target.clone()));
        }
        Err(AppError::InternalServerError)
    }

    async fn delete(&self, table: &str, id: &str, auth: Option<&str>) -> AppResult<()> {
        self.check_token(auth)?;
        let mut inner = self.inner.lock().unwrap();
        Self::check_writable(&inner, table)?;
        if let Some(rows) = inner.tables.get_mut(table) {
            rows.retain(|r| r.get("id").map(as_filter_string).as_deref() != Some(id));
        }
        Ok(())
    }

    async fn upsert(
        &self,
        table: &str,
        rows: Vec<Value>,
        on_conflict: &str,
        auth: Option<&str>,
    ) -> AppResult<()> {
        self.check_token(auth)?;
        let mut inner = self.inner.lock().unwrap();
        Self::check_writable(&inner, table)?;
        let existing = inner.tables.entry(table.to_string()).or_default();
        for row in rows {
            let key = row.get(on_conflict).cloned();
            match existing.iter_mut().find(|r| r.get(on_conflict).cloned() == key) {
                Some(slot) => *slot = row,
                None => existing.push(row),
            }
        }
        Ok(())
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
        auth: Option<&str>,
    ) -> AppResult<()> {
        self.check_token(auth)?;
        let mut inner = self.inner.lock().unwrap();
        if let Some(left) = inner.uploads_left {
            if left == 0 {
                return Err(AppError::Backend {
                    status: 413,
                    message: "Payload too large".to_string(),
                });
            }
            inner.uploads_left = Some(left - 1);
        }
        inner
            .objects
            .insert((bucket.to_string(), path.to_string()), bytes);
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("https://memory.test/storage/v1/object/public/{}/{}", bucket, path)
    }

    async fn remove(&self, bucket: &str, paths: &[String], auth: Option<&str>) -> AppResult<()> {
        self.check_token(auth)?;
        let mut inner = self.inner.lock().unwrap();
        if inner.broken_removals.contains(bucket) {
            return Err(AppError::Backend {
                status: 500,
                message: "storage unavailable".to_string(),
            });
        }
        for path in paths {
            inner.objects.remove(&(bucket.to_string(), path.clone()));
        }
        Ok(())
    }

    async fn sign_up(&self, email: &str, password: &str) -> AppResult<AuthUser> {
        {
            let inner = self.inner.lock().unwrap();
            if inner.users.contains_key(email) {
                return Err(AppError::Backend {
                    status: 422,
                    message: "User already registered".to_string(),
                });
            }
        }
        let (user, _) = self.add_user(email, password);
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        let mut inner = self.inner.lock().unwrap();
        let (id, stored) = inner.users.get(email).ok_or(AppError::InvalidCredentials)?;
        if stored != password {
            return Err(AppError::InvalidCredentials);
        }
        let token = format!("token-{}", id);
        // Novo login: o token volta a valer
        inner.expired_tokens.remove(&token);
        let user = inner
            .tokens
            .get(&token)
            .cloned()
            .ok_or(AppError::InvalidCredentials)?;
        Ok(AuthSession {
            access_token: token,
            refresh_token: None,
            user,
        })
    }

    async fn sign_out(&self, _token: &str) -> AppResult<()> {
        Ok(())
    }

    async fn get_user(&self, token: &str) -> AppResult<Option<AuthUser>> {
        let inner = self.inner.lock().unwrap();
        if inner.expired_tokens.contains(token) {
            return Ok(None);
        }
        Ok(inner.tokens.get(token).cloned())
    }
}
