// src/services/fake_sheets.rs
//
// Planilha em memória para os testes.
use super::sheets_client::{SheetError, SheetSource};
use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

#[derive(Clone, Default)]
pub struct FakeSheets {
    sheets: HashMap<String, Vec<Vec<String>>>,
    failing: bool,
    broken: Vec<String>,
    // Número de leituras feitas, partilhado entre clones
    reads: Arc<AtomicUsize>,
}

impl FakeSheets {
    pub fn with_sheet(mut self, name: &str, rows: &[&[&str]]) -> Self {
        let values = rows
            .iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect();
        self.sheets.insert(name.to_string(), values);
        self
    }

    /// Todas as leituras falham com um erro da API.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Só as leituras desta aba falham.
    pub fn with_broken_sheet(mut self, name: &str) -> Self {
        self.broken.push(name.to_string());
        self
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SheetSource for FakeSheets {
    async fn read_values(&self, sheet: &str) -> Result<Vec<Vec<String>>, SheetError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.failing || self.broken.iter().any(|b| b == sheet) {
            return Err(SheetError::Api {
                status: 503,
                body: "indisponível".into(),
            });
        }
        self.sheets
            .get(sheet)
            .cloned()
            .ok_or_else(|| SheetError::WorksheetNotFound(sheet.to_string()))
    }
}
