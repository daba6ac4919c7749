// src/main.rs

// --- Declaração dos Módulos ---
mod backend;
mod cache;
mod config;
mod error;
mod models;
mod services;
mod session_store;
mod state;
mod templates;
mod web;

// --- Imports ---
use crate::{
    backend::rest::RestBackend,
    cache::QueryCache,
    config::AppConfig,
    session_store::SessionMemory,
    state::{AppState, Store},
};
use axum::serve;
use std::{env, sync::Arc};
use time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_cookies::{CookieManagerLayer, Key};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, SessionManagerLayer};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Configuração do Logging (Tracing) ---
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                env::var("RUST_LOG")
                    .unwrap_or_else(|_| "tabernaculo=debug,tower_http=info,tower_sessions=info".into())
                    .into()
            }),
        )
        .with(fmt::layer())
        .init();

    tracing::info!("🚀 Iniciando o site do Tabernáculo...");

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuração inválida: {}", e);
            return Err(anyhow::anyhow!("Falha ao ler a configuração: {}", e));
        }
    };

    // --- Backend + cache de consultas ---
    let backend = RestBackend::new(&config.backend_url, &config.backend_anon_key)
        .map_err(|e| anyhow::anyhow!("Falha ao criar o cliente do backend: {}", e))?;
    let store = Store::new(Arc::new(backend), QueryCache::new(config.cache_ttl), &config);
    tracing::info!(
        "🗄️ Backend em {} (cache de {}s)",
        config.backend_url,
        config.cache_ttl.as_secs()
    );

    // --- Chave dos cookies assinados (notificações) ---
    let cookie_key = Key::try_from(config.session_secret.as_bytes()).map_err(|e| {
        anyhow::anyhow!("SESSION_SECRET precisa de pelo menos 64 bytes: {}", e)
    })?;

    // --- Configuração das Sessões ---
    // A sessão guarda apenas o token do backend; perdê-la num reinício obriga a novo login
    let session_store = SessionMemory::default();
    tokio::spawn(
        session_store
            .clone()
            .purge_every(std::time::Duration::from_secs(60 * 60)),
    );
    tracing::info!("🧹 Tarefa de limpeza de sessões iniciada.");

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::days(1)));
    tracing::info!("🔑 Camada de sessão configurada.");

    // --- Criação do Estado da Aplicação ---
    let app_state = AppState {
        store,
        cookie_key,
        live_stream_channel: config.live_stream_channel.clone(),
    };

    // --- Configuração do Endereço e Listener ---
    let addr = config.bind_addr;
    tracing::info!("📡 Servidor escutando em http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("❌ Falha ao iniciar listener em {}: {}", addr, e);
            return Err(e.into());
        }
    };

    // --- Criação do Router e Aplicação das Camadas (Middlewares) ---
    let app = web::routes::create_router(app_state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CookieManagerLayer::new())
            .layer(session_layer),
    );
    tracing::info!("✅ Router e middlewares configurados.");

    // --- Início do Servidor ---
    if let Err(e) = serve(listener, app.into_make_service()).await {
        tracing::error!("❌ Erro fatal no servidor: {}", e);
        return Err(e.into());
    }

    Ok(())
}
