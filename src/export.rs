//! Result Export
//!
//! One flat record per accepted model, wrapped in an envelope that names
//! the run. Records are plain data; nothing in them needs the scanner to
//! be read back.

use crate::config::{Block, ScanConfiguration};
use crate::error::Result;
use crate::scanner::{CandidateModel, ScanReport, Signature};
use crate::spectrum::{Fermion, Spectrum};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRecord {
    pub description: String,
    pub block: Block,
    /// The configuration the model was found under
    pub scan_config: ScanConfiguration,
    pub base_spectrum: Spectrum,
    /// Full resulting fermion list, base first
    pub fermions: Vec<Fermion>,
    pub is_anomaly_free: bool,
    pub signature: Signature,
}

impl ModelRecord {
    pub fn from_model(model: &CandidateModel, config: &ScanConfiguration) -> Self {
        Self {
            description: model.description.clone(),
            block: model.block,
            scan_config: config.clone(),
            base_spectrum: config.base_spectrum.clone(),
            fermions: model.spectrum.fermions().to_vec(),
            is_anomaly_free: model.is_anomaly_free(),
            signature: model.signature.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanExport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub config_name: String,
    pub truncated: bool,
    pub anomaly_free_models: Vec<ModelRecord>,
}

impl ScanExport {
    /// `config` is the configuration `report` was produced from.
    pub fn from_report(report: &ScanReport, config: &ScanConfiguration) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            config_name: report.config_name.clone(),
            truncated: report.truncated,
            anomaly_free_models: report
                .models
                .iter()
                .map(|m| ModelRecord::from_model(m, config))
                .collect(),
        }
    }

    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        info!(
            "Exported {} models from '{}' to {}",
            self.anomaly_free_models.len(),
            self.config_name,
            path.display()
        );
        Ok(())
    }

    pub fn read_json(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }
}
