// src/error.rs
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Json},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Erro na sessão: {0}")]
    SessionError(String),

    #[error("Erro ao renderizar template: {0}")]
    TemplateError(#[from] askama::Error),

    // Rotas da API: 401 com o corpo neutro da rota
    #[error("Não autorizado")]
    Unauthorized(serde_json::Value),
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(e: tower_sessions::session::Error) -> Self {
        AppError::SessionError(e.to_string())
    }
}

// Como converter AppError numa resposta HTTP
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        if let AppError::Unauthorized(body) = &self {
            tracing::debug!("Pedido à API sem sessão autenticada");
            return (StatusCode::UNAUTHORIZED, Json(body.clone())).into_response();
        }

        // Loga o erro detalhado no servidor
        tracing::error!("Erro processado: {:?}", self);

        let user_message = match self {
            AppError::SessionError(_) => "Erro na gestão da sua sessão.",
            AppError::TemplateError(_) => "Erro ao carregar a página.",
            AppError::Unauthorized(_) => "Acesso não autorizado.",
        };
        let status = StatusCode::INTERNAL_SERVER_ERROR;

        // Página HTML simples, sem template, para não depender do Askama aqui
        (status, Html(format!(r#"
            <!DOCTYPE html><html><head><title>Erro</title><style>body{{font-family:sans-serif;}}</style></head>
            <body><h1>Erro {status_code}</h1><p>{message}</p><a href="/">Voltar</a></body></html>
         "#, status_code=status.as_u16(), message=user_message))).into_response()
    }
}

// Tipo Result padrão para a aplicação
pub type AppResult<T = ()> = Result<T, AppError>;
