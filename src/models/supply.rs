// src/models/supply.rs
use super::item::CellValue;
use serde::{Deserialize, Serialize};

/// Valor mostrado quando uma coluna não existe na aba.
pub const NAO_DISPONIVEL: &str = "N/D";

// --- Payloads das rotas JSON ---

#[derive(Debug, Default, Deserialize)]
pub struct BuscaPayload {
    pub termo: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SuprimentosPayload {
    pub codigo: Option<String>,
}

// --- Projeções devolvidas por /suprimentos ---

/// Solicitação pendente (aba de solicitações, STATUS SOLICITACAO = PENDENTE).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplyRequest {
    #[serde(rename = "Data da Solicitacao")]
    pub data_solicitacao: String,
    #[serde(rename = "Status de Pendencia")]
    pub status: String,
    #[serde(rename = "Nivel de Prioridade")]
    pub prioridade: String,
    #[serde(rename = "Quantidade")]
    pub quantidade: CellValue,
}

/// Pedido de compra em aberto (aba de compras, STATUS PEDIDO = EM ABERTO).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseOrder {
    #[serde(rename = "Quantidade")]
    pub quantidade: CellValue,
    #[serde(rename = "Fornecedor")]
    pub fornecedor: String,
    #[serde(rename = "Data do Pedido")]
    pub data_pedido: String,
    #[serde(rename = "Previsao de Chegada")]
    pub previsao_chegada: String,
}

/// Resposta de /suprimentos. `Default` é a resposta neutra (listas vazias).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Supplies {
    pub solicitacoes: Vec<SupplyRequest>,
    pub compras: Vec<PurchaseOrder>,
}
