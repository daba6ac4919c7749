// src/config.rs
use crate::error::{AppError, AppResult};
use std::{env, net::SocketAddr, time::Duration};

/// Configuração de arranque lida das variáveis de ambiente (.env incluído).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend_url: String,
    pub backend_anon_key: String,
    pub session_secret: String,
    pub bind_addr: SocketAddr,
    pub cache_ttl: Duration,
    pub photo_bucket: String,
    pub asset_bucket: String,
    pub live_stream_channel: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Constrói a configuração a partir de uma função de busca.
    /// Separado de `from_env` para ser testável sem mexer no ambiente do processo.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> AppResult<String> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AppError::Config(format!("variável {} não definida", key)))
        };

        let backend_url = required("BACKEND_URL")?.trim_end_matches('/').to_string();
        let backend_anon_key = required("BACKEND_ANON_KEY")?;
        let session_secret = required("SESSION_SECRET")?;
        if session_secret.len() < 64 {
            tracing::warn!("⚠️ SESSION_SECRET tem menos de 64 bytes; a chave dos cookies não pode ser criada.");
        }

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:3000".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("BIND_ADDR inválido: {}", e)))?;

        let cache_ttl = match lookup("CACHE_TTL_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| AppError::Config(format!("CACHE_TTL_SECS inválido: {}", e)))?,
            None => Duration::from_secs(60),
        };

        Ok(Self {
            backend_url,
            backend_anon_key,
            session_secret,
            bind_addr,
            cache_ttl,
            photo_bucket: lookup("PHOTO_BUCKET").unwrap_or_else(|| "anniversary-photos".to_string()),
            asset_bucket: lookup("ASSET_BUCKET").unwrap_or_else(|| "site-assets".to_string()),
            live_stream_channel: lookup("LIVE_STREAM_CHANNEL").filter(|v| !v.trim().is_empty()),
        })
    }
}
