// src/cache.rs
//! Cache de consultas com chave composta (entidade + filtros).
//!
//! Leituras concorrentes da mesma chave partilham um único pedido ao backend.
//! Escritas nunca alteram valores em cache: invalidam por prefixo e a próxima
//! leitura volta a buscar. Entradas vencidas saem quando uma chave nova entra.

use crate::error::AppResult;
use serde_json::Value;
use std::{
    collections::HashMap,
    fmt,
    future::Future,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{Mutex, OnceCell};

/// Identidade de uma consulta: nome da entidade seguido dos valores dos filtros.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new(entity: &str) -> Self {
        Self(vec![entity.to_string()])
    }

    pub fn with(mut self, part: impl ToString) -> Self {
        self.0.push(part.to_string());
        self
    }

    /// Filtro opcional: ausência fica registada como segmento vazio.
    pub fn with_opt<T: ToString>(self, part: Option<T>) -> Self {
        match part {
            Some(p) => self.with(p),
            None => self.with(""),
        }
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.len() >= prefix.0.len() && self.0.iter().zip(&prefix.0).all(|(a, b)| a == b)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

#[derive(Debug)]
struct Cached {
    fetched_at: Instant,
    value: Value,
}

type Slot = Arc<OnceCell<Cached>>;

pub struct QueryCache {
    ttl: Duration,
    entries: Mutex<HashMap<QueryKey, Slot>>,
}

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Devolve o valor em cache ou executa `fetch`. Erros não ficam em cache.
    pub async fn get_or_fetch<F, Fut>(&self, key: QueryKey, fetch: F) -> AppResult<Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<Value>>,
    {
        let slot = {
            let mut entries = self.entries.lock().await;
            let reusable = entries.get(&key).filter(|slot| match slot.get() {
                Some(cached) => cached.fetched_at.elapsed() < self.ttl,
                // Ainda em curso: junta-se ao pedido existente
                None => true,
            });
            match reusable {
                Some(slot) => {
                    tracing::debug!("Cache: reutilizando {}", key);
                    slot.clone()
                }
                None => {
                    self.sweep(&mut entries);
                    let slot: Slot = Arc::new(OnceCell::new());
                    entries.insert(key.clone(), slot.clone());
                    slot
                }
            }
        };

        let result = slot
            .get_or_try_init(|| async {
                tracing::debug!("Cache: buscando {}", key);
                let value = fetch().await?;
                Ok::<_, crate::error::AppError>(Cached {
                    fetched_at: Instant::now(),
                    value,
                })
            })
            .await;
        match result {
            Ok(cached) => Ok(cached.value.clone()),
            Err(e) => {
                // A chave falhada não fica a ocupar lugar
                let mut entries = self.entries.lock().await;
                let same_slot = entries
                    .get(&key)
                    .is_some_and(|current| Arc::ptr_eq(current, &slot) && !current.initialized());
                if same_slot {
                    entries.remove(&key);
                }
                Err(e)
            }
        }
    }

    /// Tira as entradas já buscadas que passaram do TTL. Pedidos em curso ficam.
    fn sweep(&self, entries: &mut HashMap<QueryKey, Slot>) {
        let before = entries.len();
        entries.retain(|_, slot| match slot.get() {
            Some(cached) => cached.fetched_at.elapsed() < self.ttl,
            None => true,
        });
        let swept = before - entries.len();
        if swept > 0 {
            tracing::debug!("Cache: {} entradas vencidas removidas", swept);
        }
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Remove todas as entradas cuja chave começa por `prefix`.
    pub async fn invalidate(&self, prefix: &QueryKey) {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        tracing::debug!("Cache: invalidado {} ({} entradas)", prefix, before - entries.len());
    }

    pub async fn invalidate_all(&self, entities: &[&str]) {
        for entity in entities {
            self.invalidate(&QueryKey::new(entity)).await;
        }
    }
}
