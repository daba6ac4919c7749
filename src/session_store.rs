// src/session_store.rs
//! Sessões em memória com limpeza periódica das vencidas.
//! Um reinício do processo termina todas as sessões.

use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc};
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tower_sessions::{
    session::{Id, Record},
    session_store, ExpiredDeletion, SessionStore,
};

#[derive(Clone, Debug, Default)]
pub struct SessionMemory {
    records: Arc<Mutex<HashMap<Id, Record>>>,
}

fn is_active(record: &Record) -> bool {
    record.expiry_date > OffsetDateTime::now_utc()
}

impl SessionMemory {
    /// Apaga as sessões vencidas a cada `period`, para sempre.
    pub async fn purge_every(self, period: std::time::Duration) {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            if let Err(e) = self.delete_expired().await {
                tracing::error!("Erro na limpeza de sessões: {:?}", e);
            }
        }
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.records.lock().await.len()
    }
}

#[async_trait]
impl SessionStore for SessionMemory {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        let mut records = self.records.lock().await;
        // IDs em colisão são sorteados de novo
        while records.contains_key(&record.id) {
            record.id = Id::default();
        }
        records.insert(record.id, record.clone());
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.records.lock().await.insert(record.id, record.clone());
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let records = self.records.lock().await;
        Ok(records.get(session_id).filter(|r| is_active(r)).cloned())
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.records.lock().await.remove(session_id);
        Ok(())
    }
}

#[async_trait]
impl ExpiredDeletion for SessionMemory {
    async fn delete_expired(&self) -> session_store::Result<()> {
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|_, record| is_active(record));
        tracing::debug!("Sessões vencidas removidas: {}", before - records.len());
        Ok(())
    }
}
