// src/models/item.rs
use serde::{ser::SerializeMap, Serialize, Serializer};

// --- Valor de uma célula depois da normalização numérica ---

/// Valor de célula devolvido ao cliente. Serializa como número JSON
/// (inteiro ou decimal) ou como a string original.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Integer(i64),
    Decimal(f64),
    Text(String),
}

impl CellValue {
    /// Aplica a coerção numérica. Valores já numéricos passam sem alteração.
    pub fn coerce(self) -> CellValue {
        match self {
            CellValue::Text(s) => coerce_text(&s),
            numeric => numeric,
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, CellValue::Text(_))
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

/// Converte uma célula no formato BR ou EN para número sem inflar valores.
///
/// Ordem de decisão (não alterar, é ela que separa "1.234,56", "1234.56" e "1.234"):
/// 1. ausente ou vazio -> `0`
/// 2. só dígitos -> inteiro
/// 3. tem vírgula -> ponto é milhar, vírgula é decimal
/// 4. tem ponto com até 2 casas depois do último -> ponto decimal
/// 5. tem ponto com mais casas -> ponto é milhar
///
/// Qualquer falha devolve o valor original como texto.
pub fn coerce_number(value: Option<&str>) -> CellValue {
    match value {
        None => CellValue::Integer(0),
        Some(s) => coerce_text(s),
    }
}

fn coerce_text(original: &str) -> CellValue {
    let s = original.trim();
    let keep = || CellValue::Text(original.to_string());

    if s.is_empty() {
        return CellValue::Integer(0);
    }

    if s.chars().all(|c| c.is_ascii_digit()) {
        return s.parse::<i64>().map(CellValue::Integer).unwrap_or_else(|_| keep());
    }

    if s.contains(',') {
        let normalizado = s.replace('.', "").replace(',', ".");
        return parse_decimal(&normalizado).unwrap_or_else(keep);
    }

    if let Some((_, casas)) = s.rsplit_once('.') {
        if casas.len() <= 2 {
            if let Some(valor) = parse_decimal(s) {
                return valor;
            }
        }
        return parse_decimal(&s.replace('.', "")).unwrap_or_else(keep);
    }

    keep()
}

fn parse_decimal(s: &str) -> Option<CellValue> {
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(CellValue::Decimal)
}

// --- Linha tipada de uma aba ---

/// Uma linha da planilha: pares (cabeçalho, valor) na ordem das colunas.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, String)>,
}

impl Row {
    /// Junta cabeçalho e células. Cabeçalhos repetidos ficam na posição da
    /// primeira ocorrência com o valor da última.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut cells: Vec<(String, String)> = Vec::new();
        for (header, value) in pairs {
            match cells.iter_mut().find(|(h, _)| *h == header) {
                Some(existing) => existing.1 = value,
                None => cells.push((header, value)),
            }
        }
        Row { cells }
    }

    /// Valor da coluna com nome exato.
    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    }

    /// Primeira coluna cujo cabeçalho, em maiúsculas e sem espaços nas pontas,
    /// é igual a `header`.
    pub fn get_ignore_case(&self, header: &str) -> Option<&str> {
        self.find_header(header)
            .and_then(|h| self.get(h))
    }

    /// Nome real do cabeçalho que corresponde a `header` sem distinguir caixa.
    pub fn find_header(&self, header: &str) -> Option<&str> {
        let alvo = header.trim().to_uppercase();
        self.cells
            .iter()
            .find(|(h, _)| h.trim().to_uppercase() == alvo)
            .map(|(h, _)| h.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(h, v)| (h.as_str(), v.as_str()))
    }
}

// --- Item devolvido por /buscar ---

/// Registo de um item encontrado. Mantém a ordem das colunas da planilha.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    fields: Vec<(String, CellValue)>,
}

impl Item {
    pub fn get(&self, header: &str) -> Option<&CellValue> {
        self.fields
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v)
    }

    /// Normaliza o primeiro campo cujo cabeçalho corresponde a `header`
    /// sem distinguir maiúsculas. Não faz nada se a coluna não existir.
    pub fn coerce_field(&mut self, header: &str) {
        let alvo = header.trim().to_uppercase();
        if let Some((_, valor)) = self
            .fields
            .iter_mut()
            .find(|(h, _)| h.trim().to_uppercase() == alvo)
        {
            *valor = std::mem::replace(valor, CellValue::Integer(0)).coerce();
        }
    }
}

impl From<Row> for Item {
    fn from(row: Row) -> Self {
        Item {
            fields: row
                .cells
                .into_iter()
                .map(|(h, v)| (h, CellValue::Text(v)))
                .collect(),
        }
    }
}

impl Serialize for Item {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (header, value) in &self.fields {
            map.serialize_entry(header, value)?;
        }
        map.end()
    }
}
