// src/services/planilha_service.rs
//
// Adaptador da planilha de estoque: lê as abas e expõe as quatro consultas da
// aplicação. Nenhum erro é propagado: tudo é registado e degrada para um
// resultado vazio.
use crate::{
    config::Config,
    models::{
        item::{coerce_number, Item, Row},
        supply::{PurchaseOrder, Supplies, SupplyRequest, NAO_DISPONIVEL},
        user::{UserMap, UserRecord},
    },
    services::sheets_client::{GoogleSheetsClient, SheetError, SheetSource},
};
use std::{collections::HashMap, sync::Arc};

/// Variantes aceites para a coluna de descrição, por ordem de preferência.
pub const COLUNAS_DESCRICAO: &[&str] = &[
    "DESCRIÇÃO COMPLETA",
    "DESCRICAO COMPLETA",
    "DESCRIÇÃO",
    "DESCRICAO",
];

const STATUS_PENDENTE: &str = "PENDENTE";
const STATUS_EM_ABERTO: &str = "EM ABERTO";

/// Nomes das quatro abas usadas pela aplicação.
#[derive(Debug, Clone)]
pub struct SheetNames {
    pub matriz: String,
    pub usuarios: String,
    pub solicitacoes: String,
    pub compras: String,
}

pub struct Planilha {
    // None quando a ligação à API falhou no arranque
    client: Option<Arc<dyn SheetSource>>,
    abas: SheetNames,
    fallback_admin: Option<UserRecord>,
}

impl Planilha {
    pub fn new(
        client: Option<Arc<dyn SheetSource>>,
        abas: SheetNames,
        fallback_admin: Option<UserRecord>,
    ) -> Self {
        Self {
            client,
            abas,
            fallback_admin,
        }
    }

    /// Liga-se à API do Google Sheets com as credenciais configuradas.
    /// Uma falha não impede o arranque: o adaptador fica sem cliente.
    pub fn connect(config: &Config) -> Self {
        let client: Option<Arc<dyn SheetSource>> =
            match GoogleSheetsClient::from_service_account_file(
                &config.credentials_file,
                config.spreadsheet.clone(),
            ) {
                Ok(client) => {
                    tracing::info!("📊 Cliente da planilha pronto ({})", client.client_email());
                    Some(Arc::new(client))
                }
                Err(e) => {
                    tracing::error!("❌ Erro ao conectar com a API: {}", e);
                    None
                }
            };

        Self::new(client, config.sheets.clone(), config.fallback_admin.clone())
    }

    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    /// Carrega os utilizadores da aba de utilizadores, com os cabeçalhos em
    /// minúsculas. Relido a cada chamada.
    pub async fn load_users(&self) -> UserMap {
        let Some(client) = &self.client else {
            return UserMap::new();
        };

        match read_rows(client.as_ref(), &self.abas.usuarios).await {
            Ok(rows) => rows
                .iter()
                .filter_map(|row| {
                    let normalized: HashMap<String, String> = row
                        .iter()
                        .map(|(k, v)| (k.to_lowercase().trim().to_string(), v.to_string()))
                        .collect();
                    UserRecord::from_normalized(&normalized)
                })
                .map(|user| (user.username.clone(), user))
                .collect(),
            Err(SheetError::WorksheetNotFound(aba)) => {
                tracing::error!("ERRO: A aba de utilizadores '{}' não foi encontrada na planilha.", aba);
                match &self.fallback_admin {
                    Some(admin) => {
                        tracing::warn!(
                            "⚠️ A usar o administrador de recurso '{}' configurado em FALLBACK_ADMIN_PASSWORD",
                            admin.username
                        );
                        UserMap::from([(admin.username.clone(), admin.clone())])
                    }
                    None => UserMap::new(),
                }
            }
            Err(e) => {
                tracing::error!("Erro ao carregar utilizadores da planilha: {}", e);
                UserMap::new()
            }
        }
    }

    /// Procura um item pelo código exato (coluna COD, sem distinguir caixa no cabeçalho).
    /// A primeira linha que corresponde ganha.
    pub async fn search_item(&self, termo: &str) -> Option<Item> {
        let client = self.client.as_ref()?;
        let termo = termo.trim();
        if termo.is_empty() {
            return None;
        }

        match read_rows(client.as_ref(), &self.abas.matriz).await {
            Ok(rows) => rows
                .into_iter()
                .find(|row| {
                    row.get_ignore_case("COD")
                        .is_some_and(|cod| cod.trim() == termo)
                })
                .map(Item::from),
            Err(e) => {
                tracing::error!("Erro durante a busca do item: {}", e);
                None
            }
        }
    }

    /// Lista "código - descrição" para o autocompletar.
    pub async fn list_suggestions(&self) -> Vec<String> {
        self.try_list_suggestions().await.unwrap_or_else(|e| {
            tracing::error!("Erro ao obter sugestões: {}", e);
            Vec::new()
        })
    }

    /// Como `list_suggestions`, mas devolve o erro de leitura a quem chama.
    /// Sem ligação à planilha a lista é vazia.
    pub async fn try_list_suggestions(&self) -> Result<Vec<String>, SheetError> {
        let Some(client) = &self.client else {
            return Ok(Vec::new());
        };
        let values = client.read_values(&self.abas.matriz).await?;
        Ok(suggestions_from_values(&values))
    }

    /// Solicitações pendentes e compras em aberto para um código.
    pub async fn lookup_supplies(&self, codigo: &str) -> Supplies {
        let Some(client) = &self.client else {
            return Supplies::default();
        };

        match self.try_lookup_supplies(client.as_ref(), codigo).await {
            Ok(supplies) => supplies,
            Err(e) => {
                tracing::error!("Erro ao buscar suprimentos: {}", e);
                Supplies::default()
            }
        }
    }

    async fn try_lookup_supplies(
        &self,
        client: &dyn SheetSource,
        codigo: &str,
    ) -> Result<Supplies, SheetError> {
        let do_codigo = |row: &Row| row.get("COD").unwrap_or_default().trim() == codigo;
        let com_status = |row: &Row, coluna: &str, status: &str| {
            row.get(coluna).unwrap_or_default().trim().to_uppercase() == status
        };
        let texto = |row: &Row, coluna: &str| row.get(coluna).unwrap_or(NAO_DISPONIVEL).to_string();

        let solicitacoes = read_rows(client, &self.abas.solicitacoes)
            .await?
            .into_iter()
            .filter(|row| do_codigo(row) && com_status(row, "STATUS SOLICITACAO", STATUS_PENDENTE))
            .map(|row| SupplyRequest {
                data_solicitacao: texto(&row, "DATA SOLICITACAO"),
                status: texto(&row, "STATUS SOLICITACAO"),
                prioridade: texto(&row, "NIVEL PRIORIDADE"),
                quantidade: coerce_number(row.get("SOLICITACAO")),
            })
            .collect();

        let compras = read_rows(client, &self.abas.compras)
            .await?
            .into_iter()
            .filter(|row| do_codigo(row) && com_status(row, "STATUS PEDIDO", STATUS_EM_ABERTO))
            .map(|row| PurchaseOrder {
                quantidade: coerce_number(row.get("QUANTIDADE")),
                fornecedor: texto(&row, "FORNECEDOR"),
                data_pedido: texto(&row, "DATA DO PEDIDO"),
                previsao_chegada: texto(&row, "PREVISAO DE ENTREGA"),
            })
            .collect();

        Ok(Supplies {
            solicitacoes,
            compras,
        })
    }
}

async fn read_rows(client: &dyn SheetSource, sheet: &str) -> Result<Vec<Row>, SheetError> {
    Ok(rows_from_values(client.read_values(sheet).await?))
}

/// Monta as linhas com o cabeçalho da primeira linha. Linhas curtas são
/// completadas com "" e linhas longas cortadas ao tamanho do cabeçalho.
pub fn rows_from_values(values: Vec<Vec<String>>) -> Vec<Row> {
    let mut values = values.into_iter();
    let Some(header) = values.next() else {
        return Vec::new();
    };
    let header: Vec<String> = header.iter().map(|h| h.trim().to_string()).collect();

    values
        .map(|raw| {
            let cells = raw.into_iter().chain(std::iter::repeat(String::new()));
            Row::from_pairs(header.iter().cloned().zip(cells))
        })
        .collect()
}

fn suggestions_from_values(values: &[Vec<String>]) -> Vec<String> {
    let Some(first) = values.first() else {
        return Vec::new();
    };
    let header: Vec<String> = first.iter().map(|h| h.to_uppercase().trim().to_string()).collect();
    let position = |name: &str| header.iter().position(|h| h == name);

    let cod_index = position("COD");
    let desc_index = COLUNAS_DESCRICAO.iter().find_map(|name| position(name));

    let (Some(cod_index), Some(desc_index)) = (cod_index, desc_index) else {
        tracing::error!("ERRO: Não foi possível encontrar as colunas 'COD' e/ou 'DESCRIÇÃO' na aba principal.");
        tracing::error!("Cabeçalhos encontrados na planilha: {:?}", header);
        return Vec::new();
    };

    values[1..]
        .iter()
        .filter(|row| row.len() > cod_index && row.len() > desc_index)
        .filter_map(|row| {
            let codigo = row[cod_index].trim();
            let descricao = row[desc_index].trim();
            (!codigo.is_empty() && !descricao.is_empty())
                .then(|| format!("{} - {}", codigo, descricao))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::item::CellValue, services::fake_sheets::FakeSheets};

    fn abas() -> SheetNames {
        SheetNames {
            matriz: "Matriz".into(),
            usuarios: "Usuarios".into(),
            solicitacoes: "Solicitacoes".into(),
            compras: "Compras".into(),
        }
    }

    fn planilha(fake: FakeSheets) -> Planilha {
        Planilha::new(Some(Arc::new(fake)), abas(), None)
    }

    fn matriz() -> FakeSheets {
        FakeSheets::default().with_sheet(
            "Matriz",
            &[
                &[" cod ", "DESCRIÇÃO", "SALDO ESTOQUE"],
                &["A1 ", "Parafuso", "1.234,56"],
                &["B2", "Porca"],
                &["A1", "Duplicado", "1"],
                &["", "Sem código", "3"],
                &["C3"],
            ],
        )
    }

    #[test]
    fn test_rows_from_values_pads_and_truncates() {
        let values = vec![
            vec![" COD ".to_string(), "DESC".to_string()],
            vec!["1".to_string()],
            vec!["2".to_string(), "b".to_string(), "extra".to_string()],
        ];
        let rows = rows_from_values(values);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("COD"), Some("1"));
        assert_eq!(rows[0].get("DESC"), Some(""));
        assert_eq!(rows[1].iter().count(), 2);
        assert_eq!(rows[1].get("DESC"), Some("b"));
        assert!(rows_from_values(Vec::new()).is_empty());
    }

    #[tokio::test]
    async fn test_search_item_first_match_wins() {
        let p = planilha(matriz());
        let item = p.search_item(" A1").await.expect("item deveria existir");
        assert_eq!(item.get("DESCRIÇÃO"), Some(&CellValue::from("Parafuso")));
        assert_eq!(item.get("SALDO ESTOQUE"), Some(&CellValue::from("1.234,56")));

        let item = p.search_item("B2").await.unwrap();
        assert_eq!(item.get("SALDO ESTOQUE"), Some(&CellValue::from("")));

        assert!(p.search_item("ZZ").await.is_none());
        assert!(p.search_item("  ").await.is_none());
    }

    #[tokio::test]
    async fn test_search_item_degrades_on_error() {
        let p = planilha(matriz().failing());
        assert!(p.search_item("A1").await.is_none());

        let desligada = Planilha::new(None, abas(), None);
        assert!(!desligada.is_connected());
        assert!(desligada.search_item("A1").await.is_none());
    }

    #[tokio::test]
    async fn test_list_suggestions() {
        let p = planilha(matriz());
        assert_eq!(
            p.list_suggestions().await,
            vec!["A1 - Parafuso", "B2 - Porca", "A1 - Duplicado"]
        );
    }

    #[tokio::test]
    async fn test_list_suggestions_prefers_first_description_variant() {
        let fake = FakeSheets::default().with_sheet(
            "Matriz",
            &[
                &["DESCRICAO", "COD", "Descrição Completa"],
                &["curta", "X9", "longa"],
            ],
        );
        assert_eq!(planilha(fake).list_suggestions().await, vec!["X9 - longa"]);
    }

    #[tokio::test]
    async fn test_list_suggestions_degrades_on_error() {
        let p = planilha(matriz().failing());
        assert!(p.list_suggestions().await.is_empty());
        assert!(matches!(
            p.try_list_suggestions().await,
            Err(SheetError::Api { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn test_without_connection_everything_is_empty() {
        let p = Planilha::new(None, abas(), None);
        assert!(!p.is_connected());
        assert!(p.load_users().await.is_empty());
        assert!(p.list_suggestions().await.is_empty());
        assert!(p.try_list_suggestions().await.unwrap().is_empty());
        assert!(p.search_item("A1").await.is_none());
        assert_eq!(p.lookup_supplies("A1").await, Supplies::default());
    }

    #[tokio::test]
    async fn test_list_suggestions_without_columns_is_empty() {
        let fake = FakeSheets::default().with_sheet("Matriz", &[&["CODIGO", "NOME"], &["1", "x"]]);
        assert!(planilha(fake).list_suggestions().await.is_empty());
        assert!(planilha(FakeSheets::default()).list_suggestions().await.is_empty());
    }

    #[tokio::test]
    async fn test_load_users_normalizes_headers() {
        let fake = FakeSheets::default().with_sheet(
            "Usuarios",
            &[
                &[" USERNAME ", "Password", "Name"],
                &["ana", "segredo", "Ana Silva"],
                &["bob", "123"],
            ],
        );
        let users = planilha(fake).load_users().await;
        assert_eq!(users.len(), 2);
        assert_eq!(users["ana"].password, "segredo");
        assert_eq!(users["ana"].display_name(), "Ana Silva");
        assert_eq!(users["bob"].name.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_load_users_skips_rows_without_username_column() {
        let fake = FakeSheets::default().with_sheet("Usuarios", &[&["login", "password"], &["ana", "x"]]);
        assert!(planilha(fake).load_users().await.is_empty());
    }

    #[tokio::test]
    async fn test_load_users_missing_sheet_uses_configured_fallback_only() {
        assert!(planilha(FakeSheets::default()).load_users().await.is_empty());

        let admin = UserRecord {
            username: "admin".into(),
            password: "troque-me".into(),
            name: Some("Admin Padrão".into()),
        };
        let p = Planilha::new(Some(Arc::new(FakeSheets::default())), abas(), Some(admin.clone()));
        let users = p.load_users().await;
        assert_eq!(users.len(), 1);
        assert_eq!(users["admin"], admin);

        // Outros erros nunca usam o administrador de recurso
        let p = Planilha::new(Some(Arc::new(FakeSheets::default().failing())), abas(), Some(admin));
        assert!(p.load_users().await.is_empty());
    }

    fn suprimentos() -> FakeSheets {
        FakeSheets::default()
            .with_sheet(
                "Solicitacoes",
                &[
                    &["COD", "DATA SOLICITACAO", "STATUS SOLICITACAO", "NIVEL PRIORIDADE", "SOLICITACAO"],
                    &["A1", "01/02/2025", " pendente ", "ALTA", "1.500"],
                    &["A1", "02/02/2025", "CONCLUIDO", "BAIXA", "3"],
                    &["B2", "03/02/2025", "PENDENTE", "MEDIA", "4"],
                    &[" A1 ", "04/02/2025", "Pendente"],
                ],
            )
            .with_sheet(
                "Compras",
                &[
                    &["COD", "STATUS PEDIDO", "QUANTIDADE", "FORNECEDOR", "DATA DO PEDIDO"],
                    &["A1", "em aberto", "12,5", "ACME", "05/02/2025"],
                    &["A1", "ENTREGUE", "1", "ACME", "06/02/2025"],
                ],
            )
    }

    #[tokio::test]
    async fn test_lookup_supplies_filters_by_code_and_status() {
        let supplies = planilha(suprimentos()).lookup_supplies("A1").await;

        assert_eq!(supplies.solicitacoes.len(), 2);
        let primeira = &supplies.solicitacoes[0];
        assert_eq!(primeira.data_solicitacao, "01/02/2025");
        assert_eq!(primeira.status, " pendente ");
        assert_eq!(primeira.prioridade, "ALTA");
        assert_eq!(primeira.quantidade, CellValue::Decimal(1500.0));
        // Linha curta: células completadas com ""
        assert_eq!(supplies.solicitacoes[1].prioridade, "");
        assert_eq!(supplies.solicitacoes[1].quantidade, CellValue::Integer(0));

        assert_eq!(supplies.compras.len(), 1);
        let compra = &supplies.compras[0];
        assert_eq!(compra.quantidade, CellValue::Decimal(12.5));
        assert_eq!(compra.fornecedor, "ACME");
        // Coluna inexistente na aba
        assert_eq!(compra.previsao_chegada, NAO_DISPONIVEL);
    }

    #[tokio::test]
    async fn test_lookup_supplies_any_error_empties_both() {
        // Falta a aba de compras: as solicitações também são descartadas
        let fake = FakeSheets::default().with_sheet(
            "Solicitacoes",
            &[&["COD", "STATUS SOLICITACAO"], &["A1", "PENDENTE"]],
        );
        assert_eq!(planilha(fake).lookup_supplies("A1").await, Supplies::default());

        let desligada = Planilha::new(None, abas(), None);
        assert_eq!(desligada.lookup_supplies("A1").await, Supplies::default());
    }
}
