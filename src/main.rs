// src/main.rs

// --- Declaração dos Módulos ---
mod config;
mod error;
mod models;
mod services;
mod state;
mod templates;
mod web;

// --- Imports ---
use crate::{
    config::Config,
    services::{activity_service::ActivityLog, planilha_service::Planilha},
    state::AppState,
};
use axum::serve;
use std::{env, sync::Arc};
use time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_cookies::{CookieManagerLayer, Key};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, fmt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Configuração do Logging (Tracing) ---
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                env::var("RUST_LOG")
                    .unwrap_or_else(|_| "consulta_estoque=debug,atividade=info,tower_http=info,tower_sessions=info".into())
                    .into()
            }),
        )
        .with(fmt::layer())
        .init();

    tracing::info!("🚀 Iniciando servidor Consulta de Estoque...");

    let config = Config::from_env()?;

    // --- Registo de Atividades ---
    let activity = ActivityLog::open(&config.activity_log).map_err(|e| {
        anyhow::anyhow!("Falha ao abrir {}: {}", config.activity_log.display(), e)
    })?;
    tracing::info!("📝 Registo de atividades em {}", config.activity_log.display());

    // --- Ligação à Planilha ---
    // Uma falha aqui não é fatal: as consultas devolvem resultados vazios
    let planilha = Planilha::connect(&config);
    if !planilha.is_connected() {
        tracing::warn!("⚠️ Sem ligação à planilha: todas as consultas vão devolver resultados vazios.");
    }
    if config.fallback_admin.is_some() {
        tracing::warn!("⚠️ FALLBACK_ADMIN_PASSWORD definida: existe um login de recurso se a aba de utilizadores faltar.");
    }

    // --- Chave dos cookies assinados (mensagens flash) ---
    let cookie_key = match &config.session_secret {
        Some(secret) => Key::try_from(secret.as_bytes()).map_err(|e| {
            anyhow::anyhow!("!!! SESSION_SECRET inválida (mínimo 64 bytes): {}", e)
        })?,
        None => {
            tracing::warn!("⚠️ SESSION_SECRET não definida, a gerar uma chave aleatória para este processo.");
            Key::generate()
        }
    };

    // --- Configuração das Sessões ---
    // Sessões em memória: o processo não guarda nada em disco além do registo
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::days(1)));

    tracing::info!("🔑 Camada de sessão configurada.");

    // --- Criação do Estado da Aplicação ---
    let app_state = AppState {
        planilha: Arc::new(planilha),
        activity,
        cookie_key,
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
    let app = web::routes::create_router(app_state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CookieManagerLayer::new())
                .layer(session_layer)
        );
    tracing::info!("✅ Router e middlewares configurados.");

    // --- Início do Servidor ---
    tracing::info!("👂 Servidor pronto para aceitar conexões...");
    if let Err(e) = serve(listener, app.into_make_service()).await {
        tracing::error!("❌ Erro fatal no servidor: {}", e);
        return Err(e.into());
    }

    Ok(())
}
