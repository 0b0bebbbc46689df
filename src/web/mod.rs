// src/web/mod.rs
pub mod auth_handlers;
pub mod consulta_handlers;
pub mod flash;
pub mod mw_auth;
pub mod routes;
