// src/services/activity_service.rs
//
// Registo de atividades (login, logout, pesquisas): ficheiro só de acréscimo,
// uma linha por evento no formato `dd/mm/aaaa hh:mm:ss | EVENTO | ...`.
use std::{
    fs::OpenOptions,
    io::Write,
    path::Path,
    sync::{Arc, Mutex},
};

const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

type Sink = Box<dyn Write + Send>;

#[derive(Clone)]
pub struct ActivityLog {
    sink: Arc<Mutex<Sink>>,
}

#[derive(Debug, Clone, Copy)]
enum Level {
    Info,
    Warning,
    Error,
}

impl ActivityLog {
    /// Abre (ou cria) o ficheiro de registo em modo de acréscimo.
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::from_writer(file))
    }

    pub fn from_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.record(Level::Info, message.as_ref());
    }

    pub fn warning(&self, message: impl AsRef<str>) {
        self.record(Level::Warning, message.as_ref());
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.record(Level::Error, message.as_ref());
    }

    fn record(&self, level: Level, message: &str) {
        // Espelha no tracing para aparecer também na consola
        match level {
            Level::Info => tracing::info!(target: "atividade", "{}", message),
            Level::Warning => tracing::warn!(target: "atividade", "{}", message),
            Level::Error => tracing::error!(target: "atividade", "{}", message),
        }

        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT);
        let mut sink = self.sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let resultado = writeln!(sink, "{} | {}", timestamp, message);
        if let Err(e) = resultado.and_then(|_| sink.flush()) {
            tracing::error!("Falha ao escrever no registo de atividades: {}", e);
        }
    }
}

/// Destino em memória, usado nos testes para inspecionar as linhas escritas.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct MemorySink(pub Arc<Mutex<Vec<u8>>>);

#[cfg(test)]
impl MemorySink {
    pub fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap();
        String::from_utf8_lossy(&bytes)
            .lines()
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
impl Write for MemorySink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
