// src/state.rs
use crate::{
    backend::{decode_rows, Backend, Query},
    cache::{QueryCache, QueryKey},
    config::AppConfig,
    error::AppResult,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tower_cookies::Key;

/// Acesso aos dados: backend + cache de consultas.
/// É o que os serviços recebem (no lugar de um pool de base de dados).
#[derive(Clone)]
pub struct Store {
    pub backend: Arc<dyn Backend>,
    pub cache: Arc<QueryCache>,
    pub photo_bucket: String,
    pub asset_bucket: String,
}

impl Store {
    pub fn new(backend: Arc<dyn Backend>, cache: QueryCache, config: &AppConfig) -> Self {
        Self {
            backend,
            cache: Arc::new(cache),
            photo_bucket: config.photo_bucket.clone(),
            asset_bucket: config.asset_bucket.clone(),
        }
    }

    /// Leitura em cache de uma lista de linhas, já convertidas para o modelo.
    pub async fn cached_rows<T: DeserializeOwned>(
        &self,
        key: QueryKey,
        table: &'static str,
        query: Query,
        auth: Option<&str>,
    ) -> AppResult<Vec<T>> {
        let backend = self.backend.clone();
        let auth = auth.map(str::to_string);
        let value = self
            .cache
            .get_or_fetch(key, || async move {
                let rows = backend.select(table, &query, auth.as_deref()).await?;
                Ok(Value::Array(rows))
            })
            .await?;
        let rows: Vec<Value> = serde_json::from_value(value)?;
        decode_rows(rows)
    }

    /// Contagem em cache (painel de administração).
    pub async fn cached_count(
        &self,
        key: QueryKey,
        table: &'static str,
        auth: Option<&str>,
    ) -> AppResult<u64> {
        let backend = self.backend.clone();
        let auth = auth.map(str::to_string);
        let value = self
            .cache
            .get_or_fetch(key, || async move {
                let total = backend.count(table, &Query::new(), auth.as_deref()).await?;
                Ok(Value::from(total))
            })
            .await?;
        Ok(value.as_u64().unwrap_or(0))
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    // Chave para os cookies assinados das notificações
    pub cookie_key: Key,
    pub live_stream_channel: Option<String>,
}

// Permite extrair o Store diretamente
impl axum::extract::FromRef<AppState> for Store {
    fn from_ref(state: &AppState) -> Store {
        state.store.clone()
    }
}

impl axum::extract::FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Key {
        state.cookie_key.clone()
    }
}

#[cfg(test)]
pub mod test_support {
    use super::*;
    use crate::backend::memory::MemoryBackend;
    use std::time::Duration;

    pub fn test_config() -> AppConfig {
        AppConfig {
            backend_url: "https://memory.test".to_string(),
            backend_anon_key: "anon".to_string(),
            session_secret: "x".repeat(64),
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            cache_ttl: Duration::from_secs(60),
            photo_bucket: "anniversary-photos".to_string(),
            asset_bucket: "site-assets".to_string(),
            live_stream_channel: None,
        }
    }

    /// Store sobre um backend em memória; devolve também o backend para inspeção.
    pub fn memory_store() -> (Store, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new());
        let store = Store::new(
            backend.clone(),
            QueryCache::new(Duration::from_secs(60)),
            &test_config(),
        );
        (store, backend)
    }

    pub fn app_state(store: Store) -> AppState {
        AppState {
            store,
            cookie_key: Key::from(&[7u8; 64]),
            live_stream_channel: None,
        }
    }
}
