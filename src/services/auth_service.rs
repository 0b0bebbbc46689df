// src/services/auth_service.rs
use crate::models::user::{UserMap, UserRecord};
use rand::Rng;

// --- Verificação humana (soma de dois números) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Captcha {
    pub a: i64,
    pub b: i64,
}

impl Captcha {
    /// Dois inteiros aleatórios entre 1 e 10 (inclusive).
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            a: rng.gen_range(1..=10),
            b: rng.gen_range(1..=10),
        }
    }

    pub fn solution(&self) -> i64 {
        self.a + self.b
    }

    pub fn question(&self) -> String {
        format!("Quanto é {} + {}?", self.a, self.b)
    }
}

/// Interpreta a resposta do formulário. `None` se não for um inteiro.
pub fn parse_captcha_answer(raw: Option<&str>) -> Option<i64> {
    raw?.trim().parse().ok()
}

// --- Credenciais ---

/// Resultado da verificação de credenciais. As duas falhas são distintas
/// apenas para o registo de atividades; o utilizador vê a mesma mensagem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Success(UserRecord),
    UserNotFound,
    WrongPassword,
}

/// Procura o utilizador e compara a senha.
pub async fn authenticate(users: &UserMap, username: &str, password: Option<&str>) -> LoginOutcome {
    let Some(user) = users.get(username) else {
        return LoginOutcome::UserNotFound;
    };
    let Some(password) = password else {
        return LoginOutcome::WrongPassword;
    };

    if verify_password(password, &user.password).await {
        LoginOutcome::Success(user.clone())
    } else {
        LoginOutcome::WrongPassword
    }
}

/// Compara a senha com o valor guardado na planilha.
/// Valores com prefixo bcrypt são verificados com bcrypt; os restantes são
/// comparados como texto, de forma exata.
pub async fn verify_password(password: &str, stored: &str) -> bool {
    if !is_bcrypt_hash(stored) {
        return password == stored;
    }

    let password = password.to_string();
    let stored_hash = stored.to_string();
    let result = tokio::task::spawn_blocking(move || {
        tracing::debug!("Verificando hash bcrypt...");
        bcrypt::verify(&password, &stored_hash)
    })
    .await;

    match result {
        Ok(Ok(valid)) => valid,
        Ok(Err(e)) => {
            tracing::error!("Erro bcrypt ao verificar senha: {:?}", e);
            false
        }
        Err(e) => {
            tracing::error!("Erro na task spawn_blocking (verify_password): {:?}", e);
            false
        }
    }
}

fn is_bcrypt_hash(stored: &str) -> bool {
    ["$2a$", "$2b$", "$2y$"].iter().any(|p| stored.starts_with(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> UserMap {
        let ana = UserRecord {
            username: "ana".into(),
            password: "Segredo1".into(),
            name: Some("Ana".into()),
        };
        UserMap::from([(ana.username.clone(), ana)])
    }

    #[test]
    fn test_captcha_generation_range() {
        for _ in 0..200 {
            let c = Captcha::generate();
            assert!((1..=10).contains(&c.a));
            assert!((1..=10).contains(&c.b));
            assert!((2..=20).contains(&c.solution()));
        }
        assert_eq!(Captcha { a: 3, b: 4 }.question(), "Quanto é 3 + 4?");
    }

    #[test]
    fn test_parse_captcha_answer() {
        assert_eq!(parse_captcha_answer(Some(" 7 ")), Some(7));
        assert_eq!(parse_captcha_answer(Some("sete")), None);
        assert_eq!(parse_captcha_answer(Some("")), None);
        assert_eq!(parse_captcha_answer(None), None);
    }

    #[tokio::test]
    async fn test_authenticate_outcomes() {
        let users = users();
        assert!(matches!(
            authenticate(&users, "ana", Some("Segredo1")).await,
            LoginOutcome::Success(u) if u.username == "ana"
        ));
        // Comparação exata, sensível a maiúsculas
        assert_eq!(authenticate(&users, "ana", Some("segredo1")).await, LoginOutcome::WrongPassword);
        assert_eq!(authenticate(&users, "ana", None).await, LoginOutcome::WrongPassword);
        assert_eq!(authenticate(&users, "ANA", Some("Segredo1")).await, LoginOutcome::UserNotFound);
    }

    #[tokio::test]
    async fn test_verify_bcrypt_hash() {
        let hash = bcrypt::hash("senha", 4).unwrap();
        assert!(verify_password("senha", &hash).await);
        assert!(!verify_password("outra", &hash).await);
        // Um hash inválido nunca autentica
        assert!(!verify_password("$2b$nada", "$2b$nada").await);
    }
}
