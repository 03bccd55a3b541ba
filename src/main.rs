//src/main.rs

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod routes;
mod services;

use crate::config::{AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // O .env é opcional: em produção as variáveis vêm do ambiente
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;
    let app_state = AppState::new(config.clone()).await?;

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .context("Falha ao rodar as migrações do banco de dados")?;

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    if let Some(admin) = &config.admin_inicial {
        app_state
            .auth_service
            .bootstrap_admin(&admin.email, &admin.senha, &admin.nome)
            .await
            .context("Falha ao criar a conta admin inicial")?;
    }

    let app = routes::build_router(app_state);

    let listener = TcpListener::bind(&config.server_addr)
        .await
        .with_context(|| format!("Falha ao iniciar o listener TCP em {}", config.server_addr))?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("Erro no servidor Axum")?;
    Ok(())
}
