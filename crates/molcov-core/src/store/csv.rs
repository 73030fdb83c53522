//! Flat-file store backed by a directory of CSV files.
//!
//! Layout under the store directory:
//!
//! * `molecules.csv`, `fragments.csv` — input records with the columns
//!   `id,smiles,inchikey,natoms,elements`, the element bitmask as
//!   hexadecimal. A missing file is an empty table.
//! * `matches/<run>.csv` — one row per (pattern, structure) pair with the
//!   columns `param_id,smarts,kind,smiles`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::models::record::MolRecord;
use crate::engine::registry::MatchRegistry;

use super::{Store, StoreError};

#[derive(Debug, Deserialize)]
struct StructureRow {
    id: i64,
    smiles: String,
    inchikey: String,
    natoms: usize,
    elements: String,
}

#[derive(Debug, Serialize)]
struct MatchRow<'a> {
    param_id: &'a str,
    smarts: &'a str,
    kind: &'a str,
    smiles: &'a str,
}

#[derive(Debug, Clone)]
pub struct CsvStore {
    dir: PathBuf,
}

impl CsvStore {
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn read_records(
        &self,
        file: &str,
        limit: Option<usize>,
    ) -> Result<Vec<MolRecord>, StoreError> {
        let path = self.dir.join(file);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let mut reader =
            csv::Reader::from_path(&path).map_err(|source| StoreError::Csv {
                path: path.clone(),
                source,
            })?;
        let mut records = Vec::new();
        for row in reader.deserialize::<StructureRow>() {
            if limit.is_some_and(|cap| records.len() >= cap) {
                break;
            }
            let row = row.map_err(|source| StoreError::Csv {
                path: path.clone(),
                source,
            })?;
            records.push(row_to_record(row)?);
        }
        Ok(records)
    }

    fn run_path(&self, name: &str) -> PathBuf {
        self.dir.join("matches").join(format!("{name}.csv"))
    }
}

fn row_to_record(row: StructureRow) -> Result<MolRecord, StoreError> {
    let elements = u128::from_str_radix(row.elements.trim(), 16).map_err(|_| {
        StoreError::BadElementMask {
            value: row.elements.clone(),
        }
    })?;
    Ok(MolRecord {
        id: row.id,
        smiles: row.smiles,
        inchikey: row.inchikey,
        natoms: row.natoms,
        elements,
    })
}

fn io_err(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl Store for CsvStore {
    fn get_molecules(&mut self, limit: Option<usize>) -> Result<Vec<MolRecord>, StoreError> {
        self.read_records("molecules.csv", limit)
    }

    fn get_fragments(&mut self, limit: Option<usize>) -> Result<Vec<MolRecord>, StoreError> {
        self.read_records("fragments.csv", limit)
    }

    fn reset_run(&mut self, name: &str) -> Result<(), StoreError> {
        let path = self.run_path(name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_err(&path, e)),
        }
    }

    fn insert_run(&mut self, name: &str, registry: &MatchRegistry) -> Result<(), StoreError> {
        let path = self.run_path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
        let mut writer =
            csv::Writer::from_path(&path).map_err(|source| StoreError::Csv {
                path: path.clone(),
                source,
            })?;
        for (id, set) in registry.iter() {
            for smiles in &set.molecules {
                writer
                    .serialize(MatchRow {
                        param_id: id,
                        smarts: &set.smarts,
                        kind: "molecule",
                        smiles,
                    })
                    .map_err(|source| StoreError::Csv {
                        path: path.clone(),
                        source,
                    })?;
            }
            for smiles in &set.fragments {
                writer
                    .serialize(MatchRow {
                        param_id: id,
                        smarts: &set.smarts,
                        kind: "fragment",
                        smiles,
                    })
                    .map_err(|source| StoreError::Csv {
                        path: path.clone(),
                        source,
                    })?;
            }
        }
        writer.flush().map_err(|e| io_err(&path, e))
    }
}
