//! A fixed catalog of invoices that users can be assigned.
//!
//! The catalog is injected at startup, either from a compact string (`id=amount:currency,id=amount:currency`) or
//! from a JSON document mapping invoice ids to `{"amount": .., "currency": ".."}`.
use std::{collections::HashMap, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub amount: f64,
    pub currency: String,
}

#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("Invalid catalog entry '{0}'. Expected id=amount:currency")]
    InvalidEntry(String),
    #[error("Could not read invoice catalog: {0}")]
    Io(String),
    #[error("Could not parse invoice catalog: {0}")]
    Json(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceCatalog {
    entries: HashMap<String, CatalogEntry>,
}

impl InvoiceCatalog {
    pub fn new(entries: HashMap<String, CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Parses `id=amount:currency` entries separated by commas. Blank entries are skipped.
    pub fn from_spec(spec: &str) -> Result<Self, CatalogError> {
        let mut entries = HashMap::new();
        for item in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let invalid = || CatalogError::InvalidEntry(item.to_string());
            let (id, price) = item.split_once('=').ok_or_else(invalid)?;
            let (amount, currency) = price.split_once(':').ok_or_else(invalid)?;
            let amount = amount.trim().parse::<f64>().map_err(|_| invalid())?;
            let (id, currency) = (id.trim(), currency.trim());
            if id.is_empty() || currency.is_empty() || amount <= 0.0 {
                return Err(invalid());
            }
            entries.insert(id.to_string(), CatalogEntry { amount, currency: currency.to_string() });
        }
        Ok(Self { entries })
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let entries = serde_json::from_str(json).map_err(|e| CatalogError::Json(e.to_string()))?;
        Ok(Self { entries })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|e| CatalogError::Io(e.to_string()))?;
        Self::from_json(&json)
    }

    pub fn get(&self, invoice_id: &str) -> Option<&CatalogEntry> {
        self.entries.get(invoice_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds the entries of `other`, overwriting any with the same id.
    pub fn merge(&mut self, other: InvoiceCatalog) {
        self.entries.extend(other.entries);
    }
}
