//! Flat-file snapshot cache.
//!
//! Persists the raw cross-sectional snapshot and the filtered symbol list
//! as CSV between runs so repeated backtests do not hammer the provider.
//! The data directory is an explicit constructor argument, never ambient
//! process state. Writes are serialized across concurrent requests.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::domain::error::EodtraderError;
use crate::domain::screening::SnapshotRow;

const SNAPSHOT_FILE: &str = "realtime_quotes.csv";
const FILTERED_FILE: &str = "filtered_stocks.csv";
const HEADER: [&str; 7] = [
    "code",
    "name",
    "price",
    "pct_change",
    "turnover_pct",
    "volume_ratio",
    "market_cap",
];

pub struct SnapshotCache {
    data_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl SnapshotCache {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            write_lock: Mutex::new(()),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn load_snapshot(&self) -> Result<Option<Vec<SnapshotRow>>, EodtraderError> {
        self.load(SNAPSHOT_FILE)
    }

    pub fn store_snapshot(&self, rows: &[SnapshotRow]) -> Result<(), EodtraderError> {
        self.store(SNAPSHOT_FILE, rows)
    }

    pub fn load_filtered(&self) -> Result<Option<Vec<SnapshotRow>>, EodtraderError> {
        self.load(FILTERED_FILE)
    }

    pub fn store_filtered(&self, rows: &[SnapshotRow]) -> Result<(), EodtraderError> {
        self.store(FILTERED_FILE, rows)
    }

    fn load(&self, file: &str) -> Result<Option<Vec<SnapshotRow>>, EodtraderError> {
        let path = self.data_dir.join(file);
        if !path.exists() {
            return Ok(None);
        }

        let mut reader = csv::Reader::from_path(&path).map_err(|e| EodtraderError::Cache {
            reason: format!("failed to open {}: {}", path.display(), e),
        })?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| EodtraderError::Cache {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;

            let code = record.get(0).unwrap_or_default();
            if code.is_empty() {
                continue;
            }

            let numeric = |i: usize| -> Option<f64> { record.get(i)?.parse().ok() };

            rows.push(SnapshotRow {
                code: code.to_string(),
                name: record.get(1).unwrap_or_default().to_string(),
                price: numeric(2),
                pct_change: numeric(3),
                turnover_pct: numeric(4),
                volume_ratio: numeric(5),
                market_cap_billions: numeric(6),
            });
        }

        Ok(Some(rows))
    }

    fn store(&self, file: &str, rows: &[SnapshotRow]) -> Result<(), EodtraderError> {
        let _guard = self.write_lock.lock().map_err(|_| EodtraderError::Cache {
            reason: "cache write lock poisoned".into(),
        })?;

        fs::create_dir_all(&self.data_dir)?;
        let path = self.data_dir.join(file);

        let mut writer = csv::Writer::from_path(&path).map_err(|e| EodtraderError::Cache {
            reason: format!("failed to create {}: {}", path.display(), e),
        })?;

        let write_err = |e: csv::Error| EodtraderError::Cache {
            reason: format!("failed to write {}: {}", path.display(), e),
        };

        writer.write_record(HEADER).map_err(write_err)?;
        for row in rows {
            let fmt = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
            let fields = [
                row.code.clone(),
                row.name.clone(),
                fmt(row.price),
                fmt(row.pct_change),
                fmt(row.turnover_pct),
                fmt(row.volume_ratio),
                fmt(row.market_cap_billions),
            ];
            writer.write_record(&fields).map_err(write_err)?;
        }

        writer.flush()?;
        Ok(())
    }
}
