// src/web/consulta_handlers.rs
use crate::{
    error::AppResult,
    models::supply::{BuscaPayload, Supplies, SuprimentosPayload},
    state::AppState,
    templates::ConsultaPage,
    web::{flash, mw_auth::SessionUser},
};
use askama::Template;
use axum::{
    extract::{Extension, Json, State},
    response::{Html, IntoResponse},
};
use serde_json::json;
use tower_cookies::Cookies;

/// Colunas numéricas do item normalizadas antes de responder.
pub const CAMPOS_NUMERICOS: &[&str] = &[
    "SALDO ESTOQUE",
    "MEDIA MENSAL",
    "EM COMPRA",
    "PROJECAO DO ESTOQUE (DIAS)",
];

// GET /consulta
pub async fn consulta_page(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    cookies: Cookies,
) -> AppResult<Html<String>> {
    let template = ConsultaPage {
        user_fullname: user.fullname,
        flashes: flash::take(&cookies, &state.cookie_key),
    };
    Ok(Html(template.render()?))
}

// POST /buscar  { "termo": "..." }
pub async fn handle_buscar(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Json(payload): Json<BuscaPayload>,
) -> impl IntoResponse {
    let termo = payload.termo.unwrap_or_default();
    state.activity.info(format!(
        "SEARCH | {} ({}) | Termo: '{}'",
        user.fullname, user.username, termo
    ));

    match state.planilha.search_item(&termo).await {
        Some(mut item) => {
            for campo in CAMPOS_NUMERICOS {
                item.coerce_field(campo);
            }
            Json(json!({ "status": "sucesso", "data": item }))
        }
        None => Json(json!({
            "status": "erro",
            "mensagem": "Código ou descrição não encontrados."
        })),
    }
}

// GET /sugestoes
pub async fn handle_sugestoes(State(state): State<AppState>) -> Json<Vec<String>> {
    match state.planilha.try_list_suggestions().await {
        Ok(lista) => {
            if lista.is_empty() {
                state.activity.warning(
                    "SUGGESTION_WARN | A lista de sugestões retornou vazia. Verifique os nomes das colunas na planilha.",
                );
            }
            Json(lista)
        }
        Err(e) => {
            state
                .activity
                .error(format!("SUGGESTION_ERROR | Erro ao buscar sugestões: {}", e));
            Json(Vec::new())
        }
    }
}

// POST /suprimentos  { "codigo": "..." }
pub async fn handle_suprimentos(
    State(state): State<AppState>,
    Json(payload): Json<SuprimentosPayload>,
) -> Json<Supplies> {
    match payload.codigo.filter(|c| !c.is_empty()) {
        Some(codigo) => Json(state.planilha.lookup_supplies(&codigo).await),
        None => Json(Supplies::default()),
    }
}
