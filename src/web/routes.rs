// src/web/routes.rs
use crate::{
    state::AppState,
    web::{auth_handlers, consulta_handlers, mw_auth},
};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};

pub fn create_router(app_state: AppState) -> Router {

    // --- Rotas Públicas ---
    let public_routes = Router::new()
        .route("/", get(auth_handlers::show_login_form).post(auth_handlers::handle_login))
        .route("/logout", get(auth_handlers::handle_logout));

    // --- Página protegida ---
    // Sem login: redireciona para / com mensagem flash
    let page_routes = Router::new()
        .route("/consulta", get(consulta_handlers::consulta_page))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            mw_auth::require_login_page,
        ));

    // --- API protegida ---
    // Sem login: 401 com corpo neutro, sem tocar na planilha
    let api_routes = Router::new()
        .route("/buscar", post(consulta_handlers::handle_buscar))
        .route("/sugestoes", get(consulta_handlers::handle_sugestoes))
        .route("/suprimentos", post(consulta_handlers::handle_suprimentos))
        .route_layer(middleware::from_fn(mw_auth::require_login_api));

    // --- Router Final ---
    Router::new()
        .merge(public_routes)
        .merge(page_routes)
        .merge(api_routes)
        .with_state(app_state)
}
