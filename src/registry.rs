use std::sync::Arc;

use dashmap::DashMap;

use crate::board::{Board, BoardConfig};
use crate::limits::*;
use crate::notify::NotifyHub;

#[derive(Debug, PartialEq, Eq)]
pub enum RegistryError {
    NameTooLong(usize),
    EmptyName,
    TooManyClinics,
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::NameTooLong(len) => write!(f, "clinic name too long: {len} bytes"),
            RegistryError::EmptyName => write!(f, "empty clinic name"),
            RegistryError::TooManyClinics => write!(f, "too many clinics"),
        }
    }
}

impl std::error::Error for RegistryError {}

/// One board per clinic, created on first use. All boards share one notify hub.
pub struct ClinicRegistry {
    boards: DashMap<String, Arc<Board>>,
    config: BoardConfig,
    notify: Arc<NotifyHub>,
}

impl ClinicRegistry {
    pub fn new(config: BoardConfig) -> Self {
        Self {
            boards: DashMap::new(),
            config,
            notify: Arc::new(NotifyHub::new()),
        }
    }

    /// Get or lazily create the board for `clinic`.
    pub fn get_or_create(&self, clinic: &str) -> Result<Arc<Board>, RegistryError> {
        if clinic.len() > MAX_CLINIC_NAME_LEN {
            return Err(RegistryError::NameTooLong(clinic.len()));
        }
        let name = sanitize(clinic);
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if let Some(board) = self.boards.get(&name) {
            return Ok(board.value().clone());
        }
        if self.boards.len() >= MAX_CLINICS {
            return Err(RegistryError::TooManyClinics);
        }

        let board = self
            .boards
            .entry(name.clone())
            .or_insert_with(|| Arc::new(Board::new(name, self.config, self.notify.clone())))
            .value()
            .clone();
        metrics::gauge!(crate::observability::CLINICS_ACTIVE).set(self.boards.len() as f64);
        Ok(board)
    }

    pub fn get(&self, clinic: &str) -> Option<Arc<Board>> {
        self.boards.get(&sanitize(clinic)).map(|b| b.value().clone())
    }

    /// Drop a clinic's board. Its subscribers see their stream close, and a
    /// board later created under the same name gets a fresh channel.
    pub fn remove(&self, clinic: &str) -> Option<Arc<Board>> {
        let (_, board) = self.boards.remove(&sanitize(clinic))?;
        self.notify.remove(board.id());
        metrics::gauge!(crate::observability::CLINICS_ACTIVE).set(self.boards.len() as f64);
        Some(board)
    }

    pub fn clinics(&self) -> Vec<String> {
        let mut names: Vec<String> = self.boards.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}

fn sanitize(clinic: &str) -> String {
    clinic
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}
