//! Alarm API over a local fleet: an in-memory list of raw alarm
//! descriptions, optionally persisted as a JSON file.

use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use alarmshift_core::{RawAlarm, WritePayload};

use crate::api::{AlarmApi, AlarmPage};
use crate::error::AlarmApiError;
use crate::fs_util::write_atomic;

pub const DEFAULT_PAGE_SIZE: usize = 100;

#[derive(Debug)]
pub struct MemoryFleet {
    alarms: Mutex<Vec<RawAlarm>>,
    page_size: usize,
    writes: AtomicUsize,
}

fn poisoned() -> AlarmApiError {
    AlarmApiError::Io(std::io::Error::other("fleet lock poisoned"))
}

impl MemoryFleet {
    pub fn new(alarms: Vec<RawAlarm>) -> Self {
        Self::with_page_size(alarms, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(alarms: Vec<RawAlarm>, page_size: usize) -> Self {
        Self {
            alarms: Mutex::new(alarms),
            page_size: page_size.max(1),
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of accepted `put` calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    pub fn get(&self, name: &str) -> Option<RawAlarm> {
        self.alarms
            .lock()
            .ok()?
            .iter()
            .find(|a| a.alarm_name == name)
            .cloned()
    }

    pub fn alarms(&self) -> Vec<RawAlarm> {
        self.alarms.lock().map(|a| a.clone()).unwrap_or_default()
    }
}

impl AlarmApi for MemoryFleet {
    fn list_page(&self, next_token: Option<&str>) -> Result<AlarmPage, AlarmApiError> {
        let start = match next_token {
            None => 0,
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| AlarmApiError::Validation(format!("invalid next token {token:?}")))?,
        };
        let alarms = self.alarms.lock().map_err(|_| poisoned())?;
        let end = (start + self.page_size).min(alarms.len());
        let page = alarms.get(start..end).map(<[RawAlarm]>::to_vec).unwrap_or_default();
        Ok(AlarmPage {
            alarms: page,
            next_token: (end < alarms.len()).then(|| end.to_string()),
        })
    }

    fn describe(&self, name: &str) -> Result<Option<RawAlarm>, AlarmApiError> {
        let alarms = self.alarms.lock().map_err(|_| poisoned())?;
        Ok(alarms.iter().find(|a| a.alarm_name == name).cloned())
    }

    fn put(&self, payload: &WritePayload) -> Result<(), AlarmApiError> {
        payload
            .validate()
            .map_err(|e| AlarmApiError::Validation(e.to_string()))?;

        let mut alarms = self.alarms.lock().map_err(|_| poisoned())?;
        match alarms.iter_mut().find(|a| a.alarm_name == payload.alarm_name) {
            Some(existing) => {
                let updated = payload.to_raw(Some(&*existing));
                *existing = updated;
            }
            None => alarms.push(payload.to_raw(None)),
        }
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Fleet persisted as a JSON array of raw alarm descriptions.
/// Every accepted write rewrites the file atomically.
#[derive(Debug)]
pub struct FleetFile {
    path: PathBuf,
    fleet: MemoryFleet,
}

impl FleetFile {
    pub fn open(path: impl Into<PathBuf>, page_size: usize) -> Result<Self, AlarmApiError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)?;
        let alarms: Vec<RawAlarm> = serde_json::from_str(&content)?;
        tracing::debug!(path = %path.display(), alarms = alarms.len(), "fleet file loaded");
        Ok(Self {
            path,
            fleet: MemoryFleet::with_page_size(alarms, page_size),
        })
    }

    pub fn fleet(&self) -> &MemoryFleet {
        &self.fleet
    }

    fn persist(&self) -> Result<(), AlarmApiError> {
        let body = serde_json::to_vec_pretty(&self.fleet.alarms())?;
        write_atomic(&self.path, &body)?;
        Ok(())
    }
}

impl AlarmApi for FleetFile {
    fn list_page(&self, next_token: Option<&str>) -> Result<AlarmPage, AlarmApiError> {
        self.fleet.list_page(next_token)
    }

    fn describe(&self, name: &str) -> Result<Option<RawAlarm>, AlarmApiError> {
        self.fleet.describe(name)
    }

    fn put(&self, payload: &WritePayload) -> Result<(), AlarmApiError> {
        self.fleet.put(payload)?;
        self.persist()
    }
}
