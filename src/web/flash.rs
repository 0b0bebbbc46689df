// src/web/flash.rs
//
// Mensagens flash: guardadas num cookie assinado até à próxima página
// renderizada, que as lê e apaga. O JSON vai em base64 URL-safe: o valor não
// tem '%', e a descodificação percentual do cookie deixa a assinatura intacta.
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use tower_cookies::{Cookie, Cookies, Key};

pub const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub category: String, // "info" ou "error"
    pub message: String,
}

pub fn info(cookies: &Cookies, key: &Key, message: impl Into<String>) {
    push(cookies, key, "info", message.into());
}

pub fn error(cookies: &Cookies, key: &Key, message: impl Into<String>) {
    push(cookies, key, "error", message.into());
}

/// Acrescenta uma mensagem às que já estão pendentes.
fn push(cookies: &Cookies, key: &Key, category: &str, message: String) {
    let mut pending = read(cookies, key);
    pending.push(FlashMessage {
        category: category.to_string(),
        message,
    });

    match serde_json::to_string(&pending) {
        Ok(json) => {
            let cookie = Cookie::build((FLASH_COOKIE, URL_SAFE_NO_PAD.encode(json)))
                .path("/")
                .http_only(true)
                .build();
            cookies.signed(key).add(cookie);
        }
        Err(e) => tracing::error!("Falha ao serializar mensagens flash: {}", e),
    }
}

/// Devolve as mensagens pendentes e remove o cookie.
pub fn take(cookies: &Cookies, key: &Key) -> Vec<FlashMessage> {
    let messages = read(cookies, key);
    if !messages.is_empty() {
        cookies
            .signed(key)
            .remove(Cookie::build((FLASH_COOKIE, "")).path("/").build());
    }
    messages
}

fn read(cookies: &Cookies, key: &Key) -> Vec<FlashMessage> {
    let Some(cookie) = cookies.signed(key).get(FLASH_COOKIE) else {
        return Vec::new();
    };

    // Cookie adulterado ou de outra versão: descarta em silêncio
    URL_SAFE_NO_PAD
        .decode(cookie.value())
        .ok()
        .and_then(|json| serde_json::from_slice(&json).ok())
        .unwrap_or_default()
}
