// src/services/mod.rs
pub mod activity_service;
pub mod auth_service;
pub mod planilha_service;
pub mod sheets_client;

#[cfg(test)]
pub mod fake_sheets;
