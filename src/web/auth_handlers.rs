// src/web/auth_handlers.rs
use crate::{
    error::AppResult,
    models::user::LoginForm,
    services::auth_service::{self, Captcha, LoginOutcome},
    state::AppState,
    templates::LoginPage,
    web::{
        flash,
        mw_auth::{SessionUser, SESSION_CAPTCHA, SESSION_FULLNAME, SESSION_LOGGED_IN, SESSION_USERNAME},
    },
};
use askama::Template; // Trait Template para render()
use axum::{
    extract::{Form, State},
    response::{Html, Redirect},
};
use tower_cookies::Cookies;
use tower_sessions::Session;

// GET / — gera uma nova verificação e mostra o formulário
pub async fn show_login_form(
    State(state): State<AppState>,
    session: Session,
    cookies: Cookies,
) -> AppResult<Html<String>> {
    let captcha = Captcha::generate();
    session.insert(SESSION_CAPTCHA, captcha.solution()).await?;

    let template = LoginPage {
        captcha_question: captcha.question(),
        flashes: flash::take(&cookies, &state.cookie_key),
    };
    Ok(Html(template.render()?))
}

// POST / — verificação humana primeiro, depois as credenciais
pub async fn handle_login(
    State(state): State<AppState>,
    session: Session,
    cookies: Cookies,
    Form(form): Form<LoginForm>,
) -> AppResult<Redirect> {
    let key = &state.cookie_key;

    // 1. Resposta da verificação. Em caso de erro a solução guardada fica igual.
    let Some(answer) = auth_service::parse_captcha_answer(form.captcha.as_deref()) else {
        flash::error(&cookies, key, "Resposta da verificação inválida.");
        return Ok(Redirect::to("/"));
    };
    let expected = session.get::<i64>(SESSION_CAPTCHA).await?;
    if expected != Some(answer) {
        tracing::debug!("Verificação incorreta: esperado {:?}, recebido {}", expected, answer);
        flash::error(&cookies, key, "Resposta da verificação incorreta.");
        return Ok(Redirect::to("/"));
    }

    // 2. Credenciais contra a aba de utilizadores (relida a cada tentativa)
    let username = form.username.unwrap_or_default();
    let users = state.planilha.load_users().await;

    match auth_service::authenticate(&users, &username, form.password.as_deref()).await {
        LoginOutcome::Success(user) => {
            let fullname = user.display_name().to_string();

            session.cycle_id().await?; // Novo ID de sessão
            session.insert(SESSION_LOGGED_IN, true).await?;
            session.insert(SESSION_USERNAME, &user.username).await?;
            session.insert(SESSION_FULLNAME, &fullname).await?;

            state
                .activity
                .info(format!("LOGIN_SUCCESS | {} ({}) | Acesso concedido", fullname, username));
            flash::info(&cookies, key, format!("Bem-vindo, {}!", fullname));
            Ok(Redirect::to("/consulta"))
        }
        outcome => {
            let cause = if outcome == LoginOutcome::UserNotFound {
                "Utilizador não encontrado"
            } else {
                "Senha incorreta"
            };
            state
                .activity
                .warning(format!("LOGIN_FAIL | {} | {}", username, cause));
            // Mensagem genérica: não revela qual das duas falhou
            flash::error(&cookies, key, "Utilizador ou senha inválidos.");
            Ok(Redirect::to("/"))
        }
    }
}

// GET /logout — limpa sempre a sessão, mesmo anónima
pub async fn handle_logout(
    State(state): State<AppState>,
    session: Session,
    cookies: Cookies,
) -> AppResult<Redirect> {
    let user = SessionUser::describe(&session).await?;
    state
        .activity
        .info(format!("LOGOUT | {} ({}) | Sessão terminada", user.fullname, user.username));

    // Apaga todos os dados da sessão atual
    session.flush().await?;

    flash::info(&cookies, &state.cookie_key, "Sessão terminada com sucesso.");
    Ok(Redirect::to("/"))
}
