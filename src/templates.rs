// src/templates.rs
use crate::web::flash::FlashMessage;
use askama::Template; // Trait necessário para Askama

// Struct para o template `login.html` (ficheiro na pasta templates/)
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    // Pergunta da verificação, ex.: "Quanto é 3 + 4?"
    pub captcha_question: String,
    pub flashes: Vec<FlashMessage>,
}

// Página principal da consulta (protegida)
#[derive(Template)]
#[template(path = "index.html")]
pub struct ConsultaPage {
    pub user_fullname: String,
    pub flashes: Vec<FlashMessage>,
}
