// src/services/config_service.rs
use crate::{
    backend::Query,
    cache::QueryKey,
    error::{AppError, AppResult},
    models::{
        photo::UploadedFile,
        site_config::{ConfigRow, SiteConfig},
    },
    state::Store,
};
use chrono::Utc;
use std::collections::HashMap;

const TABLE: &str = "church_info";

/// Configuração completa do site. Sem linhas (ou com o backend em baixo) ficam os valores por omissão.
pub async fn load(store: &Store) -> SiteConfig {
    let query = Query::new().columns(&["key", "value"]);
    let rows: AppResult<Vec<ConfigRow>> = store
        .cached_rows(QueryKey::new("site-config"), TABLE, query, None)
        .await;
    match rows {
        Ok(rows) => {
            let (config, unknown) = SiteConfig::from_rows(rows);
            if !unknown.is_empty() {
                tracing::debug!("Chaves de configuração ignoradas: {:?}", unknown);
            }
            config
        }
        Err(e) => {
            tracing::error!("Erro ao carregar configurações: {}", e);
            SiteConfig::default()
        }
    }
}

/// Aplica os valores submetidos no formulário sobre a configuração atual.
/// Só chaves conhecidas são consideradas.
pub fn merge_form(mut config: SiteConfig, form: HashMap<String, String>) -> SiteConfig {
    for (key, value) in form {
        if !config.apply(&key, value) {
            tracing::debug!("Campo de formulário ignorado: {}", key);
        }
    }
    config
}

/// Grava todas as chaves numa única escrita em lote.
pub async fn save(store: &Store, config: &SiteConfig, auth: &str) -> AppResult<()> {
    let rows = config
        .to_rows()
        .into_iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    let total = rows.len();
    store.backend.upsert(TABLE, rows, "key", Some(auth)).await?;
    store.cache.invalidate(&QueryKey::new("site-config")).await;
    tracing::info!("Configurações gravadas ({} chaves)", total);
    Ok(())
}

/// Envia a imagem de fundo da página inicial e devolve o URL público.
pub async fn upload_hero_image(store: &Store, file: UploadedFile, auth: &str) -> AppResult<String> {
    if !file.content_type.starts_with("image/") {
        return Err(AppError::Upload(format!("{} não é uma imagem.", file.file_name)));
    }
    let path = format!("hero/{}.{}", Utc::now().timestamp_millis(), file.extension());
    store
        .backend
        .upload(&store.asset_bucket, &path, file.bytes, &file.content_type, Some(auth))
        .await?;
    let url = store.backend.public_url(&store.asset_bucket, &path);
    tracing::info!("Imagem de destaque enviada: {}", url);
    Ok(url)
}
