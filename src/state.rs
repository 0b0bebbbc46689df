// src/state.rs
use crate::services::{activity_service::ActivityLog, planilha_service::Planilha};
use std::sync::Arc;
use tower_cookies::Key;

// Estado partilhado por todos os handlers, construído uma vez no arranque
#[derive(Clone)]
pub struct AppState {
    pub planilha: Arc<Planilha>,
    pub activity: ActivityLog,
    // Chave que assina o cookie das mensagens flash
    pub cookie_key: Key,
}
