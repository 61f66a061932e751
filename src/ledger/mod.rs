use std::fs::OpenOptions;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    domain::{metadata_keys, IntentSnapshot, IntentStatus},
    error::{AppError, Result},
};

/// One row per observed terminal state. Rows are not unique per intent:
/// canceled and failed intents get a row on every poll, so repeated polls of
/// the same terminal state append duplicate rows. That duplication is kept
/// as-is for audit purposes.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionLogRecord {
    pub timestamp: DateTime<Utc>,
    pub payment_intent_id: String,
    pub payer_name: String,
    pub payer_email: String,
    pub amount_cents: i64,
    pub payment_type: String,
    pub status: String,
    pub cover_fees: String,
    pub fee_amount_cents: String,
}

impl TransactionLogRecord {
    pub fn from_snapshot(snapshot: &IntentSnapshot, status: IntentStatus) -> Self {
        Self {
            timestamp: Utc::now(),
            payment_intent_id: snapshot.id.clone(),
            payer_name: snapshot.payer_name().to_string(),
            payer_email: snapshot.payer_email().unwrap_or_default().to_string(),
            amount_cents: snapshot.amount_cents,
            payment_type: snapshot
                .payment_type()
                .map(|t| t.as_str().to_string())
                .unwrap_or_default(),
            status: status.as_str().to_string(),
            cover_fees: snapshot
                .metadata
                .get(metadata_keys::COVER_FEES)
                .cloned()
                .unwrap_or_default(),
            fee_amount_cents: snapshot
                .metadata
                .get(metadata_keys::FEE_AMOUNT)
                .cloned()
                .unwrap_or_default(),
        }
    }
}

/// Append-only audit sink for observed terminal states.
pub trait TransactionLedger: Send + Sync {
    fn append(&self, record: &TransactionLogRecord) -> Result<()>;
}

/// CSV-file ledger, partitioned monthly (`transactions-YYYY-MM.csv`).
pub struct CsvLedger {
    dir: PathBuf,
}

impl CsvLedger {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn partition_path(&self, timestamp: DateTime<Utc>) -> PathBuf {
        self.dir
            .join(format!("transactions-{}.csv", timestamp.format("%Y-%m")))
    }
}

impl TransactionLedger for CsvLedger {
    fn append(&self, record: &TransactionLogRecord) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| AppError::Internal(format!("Failed to create audit dir: {}", e)))?;

        let path = self.partition_path(record.timestamp);
        let write_headers = !path.exists();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| AppError::Internal(format!("Failed to open audit log: {}", e)))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(write_headers)
            .from_writer(file);

        writer
            .serialize(record)
            .map_err(|e| AppError::Internal(format!("Failed to write audit row: {}", e)))?;
        writer
            .flush()
            .map_err(|e| AppError::Internal(format!("Failed to flush audit log: {}", e)))?;

        Ok(())
    }
}
