// src/config.rs
use crate::{
    models::user::UserRecord,
    services::{planilha_service::SheetNames, sheets_client::SpreadsheetRef},
};
use anyhow::Context;
use std::{env, net::SocketAddr, path::PathBuf};

const NOME_ADMIN_RECURSO: &str = "Admin Padrão";

/// Configuração lida das variáveis de ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub credentials_file: PathBuf,
    pub spreadsheet: SpreadsheetRef,
    pub sheets: SheetNames,
    pub activity_log: PathBuf,
    pub session_secret: Option<String>,
    // Só existe se FALLBACK_ADMIN_PASSWORD estiver definida
    pub fallback_admin: Option<UserRecord>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let bind_addr: SocketAddr = var_or("BIND_ADDR", "0.0.0.0:8080")
            .parse()
            .context("BIND_ADDR inválido")?;

        let spreadsheet = match env::var("SPREADSHEET_ID") {
            Ok(id) if !id.trim().is_empty() => SpreadsheetRef::Id(id.trim().to_string()),
            _ => SpreadsheetRef::Name(var_or("SPREADSHEET_NAME", "Importrange-matriz")),
        };

        let fallback_admin = env::var("FALLBACK_ADMIN_PASSWORD")
            .ok()
            .filter(|p| !p.is_empty())
            .map(|password| UserRecord {
                username: var_or("FALLBACK_ADMIN_USERNAME", "admin"),
                password,
                name: Some(NOME_ADMIN_RECURSO.to_string()),
            });

        Ok(Self {
            bind_addr,
            credentials_file: var_or("CREDENTIALS_FILE", "credenciais.json").into(),
            spreadsheet,
            sheets: SheetNames {
                matriz: var_or("SHEET_MATRIZ", "import_ran_Matriz"),
                usuarios: var_or("SHEET_USUARIOS", "Usuarios"),
                solicitacoes: var_or("SHEET_SOLICITACOES", "import_ran_Solicitacoes"),
                compras: var_or("SHEET_COMPRAS", "import_ran_Pedido_Compra"),
            },
            activity_log: var_or("ACTIVITY_LOG", "activity.log").into(),
            session_secret: env::var("SESSION_SECRET").ok().filter(|s| !s.is_empty()),
            fallback_admin,
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        tracing::debug!("{key} não definida, a usar: {default}");
        default.to_string()
    })
}
