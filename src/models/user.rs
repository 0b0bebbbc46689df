// src/models/user.rs
use serde::Deserialize;
use std::collections::HashMap;

/// Nome mostrado quando a linha do utilizador não tem a coluna `name`.
pub const NOME_PADRAO: &str = "Utilizador";

// Representa um utilizador lido da aba de utilizadores
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub username: String,
    pub password: String, // Texto simples ou hash bcrypt, tal como está na planilha
    pub name: Option<String>,
}

impl UserRecord {
    /// Constrói o registo a partir de uma linha já com as chaves normalizadas
    /// (minúsculas, sem espaços). Linhas sem `username` são ignoradas.
    pub fn from_normalized(row: &HashMap<String, String>) -> Option<Self> {
        let username = row.get("username")?.clone();
        Some(UserRecord {
            username,
            password: row.get("password").cloned().unwrap_or_default(),
            name: row.get("name").cloned(),
        })
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(NOME_PADRAO)
    }
}

/// Utilizadores permitidos, indexados pelo username.
pub type UserMap = HashMap<String, UserRecord>;

// Struct para dados do formulário de login.
// Todos os campos são opcionais: um formulário incompleto falha a validação
// em vez de ser rejeitado pelo extractor.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    pub username: Option<String>,
    pub password: Option<String>,
    pub captcha: Option<String>,
}
