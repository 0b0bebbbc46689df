// src/services/sheets_client.rs
//
// Cliente HTTP da API do Google Sheets, autenticado com uma conta de serviço.
// O resto da aplicação só conhece o trait `SheetSource`.
use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};
use thiserror::Error;
use tokio::sync::Mutex;

const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive",
];
const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DRIVE_FILES_API: &str = "https://www.googleapis.com/drive/v3/files";
const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_LIFETIME_SECS: i64 = 3600;
// Renova o token um minuto antes de expirar
const TOKEN_MARGIN_SECS: i64 = 60;

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Aba '{0}' não encontrada na planilha")]
    WorksheetNotFound(String),

    #[error("Planilha '{0}' não encontrada")]
    SpreadsheetNotFound(String),

    #[error("Credenciais inválidas: {0}")]
    Credentials(String),

    #[error("Erro ao ler ficheiro de credenciais: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro ao assinar token: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Erro HTTP: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Resposta inesperada da API ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("JSON inválido: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fonte de dados tabulares: devolve todas as células de uma aba, linha a
/// linha, como texto formatado. Linhas podem ter comprimentos diferentes.
#[async_trait]
pub trait SheetSource: Send + Sync {
    async fn read_values(&self, sheet: &str) -> Result<Vec<Vec<String>>, SheetError>;
}

/// Como localizar a planilha: pelo nome (pesquisa no Drive) ou pelo ID.
#[derive(Debug, Clone)]
pub enum SpreadsheetRef {
    Name(String),
    Id(String),
}

// --- Ficheiro de credenciais da conta de serviço ---

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self, SheetError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: i64,
}

// --- Respostas da API ---

#[derive(Debug, Deserialize)]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

/// Cliente da API do Google Sheets.
pub struct GoogleSheetsClient {
    http: reqwest::Client,
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    spreadsheet: SpreadsheetRef,
    // Único estado mutável do cliente: o token de acesso em uso
    token: Mutex<Option<AccessToken>>,
}

impl GoogleSheetsClient {
    /// Lê o ficheiro de credenciais e prepara o cliente. Não faz chamadas de rede.
    pub fn from_service_account_file(
        path: &Path,
        spreadsheet: SpreadsheetRef,
    ) -> Result<Self, SheetError> {
        let key = ServiceAccountKey::from_file(path)?;
        Self::new(key, spreadsheet)
    }

    pub fn new(key: ServiceAccountKey, spreadsheet: SpreadsheetRef) -> Result<Self, SheetError> {
        if key.client_email.trim().is_empty() {
            return Err(SheetError::Credentials("client_email vazio".into()));
        }
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            key,
            encoding_key,
            spreadsheet,
            token: Mutex::new(None),
        })
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    /// Devolve um token válido, pedindo um novo ao servidor OAuth se necessário.
    async fn access_token(&self) -> Result<String, SheetError> {
        let now = chrono::Utc::now().timestamp();
        let mut slot = self.token.lock().await;

        if let Some(token) = slot.as_ref() {
            if token.expires_at - TOKEN_MARGIN_SECS > now {
                return Ok(token.value.clone());
            }
        }

        tracing::debug!("Pedindo novo token de acesso para {}", self.key.client_email);
        let claims = Claims {
            iss: &self.key.client_email,
            scope: SCOPES.join(" "),
            aud: &self.key.token_uri,
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();
        let assertion = jsonwebtoken::encode(&header, &claims, &self.encoding_key)?;

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;
        let token: TokenResponse = check_status(response).await?.json().await?;

        let expires_at = now + token.expires_in.unwrap_or(TOKEN_LIFETIME_SECS);
        *slot = Some(AccessToken {
            value: token.access_token.clone(),
            expires_at,
        });
        Ok(token.access_token)
    }

    /// Resolve o ID da planilha. Pelo nome, usa a pesquisa do Drive a cada chamada.
    async fn spreadsheet_id(&self, token: &str) -> Result<String, SheetError> {
        let name = match &self.spreadsheet {
            SpreadsheetRef::Id(id) => return Ok(id.clone()),
            SpreadsheetRef::Name(name) => name,
        };

        let query = format!(
            "name = '{}' and mimeType = '{}' and trashed = false",
            name.replace('\\', "\\\\").replace('\'', "\\'"),
            SPREADSHEET_MIME
        );
        let response = self
            .http
            .get(DRIVE_FILES_API)
            .bearer_auth(token)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id,name)"),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ])
            .send()
            .await?;
        let list: DriveFileList = check_status(response).await?.json().await?;

        list.files
            .into_iter()
            .next()
            .map(|f| f.id)
            .ok_or_else(|| SheetError::SpreadsheetNotFound(name.clone()))
    }

    async fn sheet_titles(&self, token: &str, spreadsheet_id: &str) -> Result<Vec<String>, SheetError> {
        let response = self
            .http
            .get(format!("{}/{}", SHEETS_API, spreadsheet_id))
            .bearer_auth(token)
            .query(&[("fields", "sheets.properties.title")])
            .send()
            .await?;
        let meta: SpreadsheetMeta = check_status(response).await?.json().await?;
        Ok(meta.sheets.into_iter().map(|s| s.properties.title).collect())
    }
}

#[async_trait]
impl SheetSource for GoogleSheetsClient {
    async fn read_values(&self, sheet: &str) -> Result<Vec<Vec<String>>, SheetError> {
        let token = self.access_token().await?;
        let spreadsheet_id = self.spreadsheet_id(&token).await?;

        let titles = self.sheet_titles(&token, &spreadsheet_id).await?;
        if !titles.iter().any(|t| t == sheet) {
            return Err(SheetError::WorksheetNotFound(sheet.to_string()));
        }

        let url = format!(
            "{}/{}/values/{}",
            SHEETS_API,
            spreadsheet_id,
            urlencoding::encode(&sheet_range(sheet))
        );
        let response = self
            .http
            .get(url)
            .bearer_auth(&token)
            .query(&[
                ("majorDimension", "ROWS"),
                ("valueRenderOption", "FORMATTED_VALUE"),
            ])
            .send()
            .await?;
        let range: ValueRange = check_status(response).await?.json().await?;

        tracing::debug!("Aba '{}': {} linhas lidas", sheet, range.values.len());
        Ok(stringify_values(range.values))
    }
}

/// Intervalo A1 que cobre a aba inteira. Aspas simples no nome são duplicadas.
fn sheet_range(sheet: &str) -> String {
    format!("'{}'", sheet.replace('\'', "''"))
}

fn stringify_values(values: Vec<Vec<serde_json::Value>>) -> Vec<Vec<String>> {
    values
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| match cell {
                    serde_json::Value::String(s) => s,
                    serde_json::Value::Null => String::new(),
                    other => other.to_string(),
                })
                .collect()
        })
        .collect()
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SheetError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::error!("Google API respondeu {}: {}", status, body);
    Err(SheetError::Api {
        status: status.as_u16(),
        body,
    })
}
