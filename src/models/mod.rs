// src/models/mod.rs
pub mod item;
pub mod supply;
pub mod user;
