//! AlarmApi trait (describe/enumerate/write) and the lazy paginated
//! enumeration built on it.

use alarmshift_core::{AlarmDefinition, ModelError, RawAlarm, WritePayload};
use thiserror::Error;

use crate::error::AlarmApiError;

/// One page of the describe listing.
#[derive(Debug, Clone, Default)]
pub struct AlarmPage {
    pub alarms: Vec<RawAlarm>,
    pub next_token: Option<String>,
}

/// Trait for the external alarm API. Enables fake injection for testing.
pub trait AlarmApi: Send + Sync {
    /// Fetch the page after `next_token` (`None` for the first page).
    fn list_page(&self, next_token: Option<&str>) -> Result<AlarmPage, AlarmApiError>;

    fn describe(&self, name: &str) -> Result<Option<RawAlarm>, AlarmApiError>;

    /// Upsert by alarm name.
    fn put(&self, payload: &WritePayload) -> Result<(), AlarmApiError>;
}

impl<T: AlarmApi + ?Sized> AlarmApi for &T {
    fn list_page(&self, next_token: Option<&str>) -> Result<AlarmPage, AlarmApiError> {
        (**self).list_page(next_token)
    }

    fn describe(&self, name: &str) -> Result<Option<RawAlarm>, AlarmApiError> {
        (**self).describe(name)
    }

    fn put(&self, payload: &WritePayload) -> Result<(), AlarmApiError> {
        (**self).put(payload)
    }
}

impl<T: AlarmApi + ?Sized> AlarmApi for Box<T> {
    fn list_page(&self, next_token: Option<&str>) -> Result<AlarmPage, AlarmApiError> {
        (**self).list_page(next_token)
    }

    fn describe(&self, name: &str) -> Result<Option<RawAlarm>, AlarmApiError> {
        (**self).describe(name)
    }

    fn put(&self, payload: &WritePayload) -> Result<(), AlarmApiError> {
        (**self).put(payload)
    }
}

#[derive(Debug, Error)]
pub enum ListError {
    /// A page fetch failed; enumeration cannot continue past it.
    #[error("listing alarms failed: {0}")]
    Page(#[source] AlarmApiError),

    /// One listed alarm could not be normalized.
    #[error("alarm {name:?} is malformed: {source}")]
    Malformed {
        name: String,
        #[source]
        source: ModelError,
    },
}

impl ListError {
    /// Alarm the error belongs to, when it belongs to one.
    pub fn alarm_name(&self) -> Option<&str> {
        match self {
            Self::Page(_) => None,
            Self::Malformed { name, .. } => Some(name),
        }
    }
}

/// Lazy, front-to-back enumeration of single-metric alarms.
///
/// Pages are fetched on demand. Composite/metric-math alarms are dropped
/// here and never reach the caller. After a page error the iterator ends.
pub struct AlarmPages<'a, A: ?Sized> {
    api: &'a A,
    buffer: std::vec::IntoIter<RawAlarm>,
    next_token: Option<String>,
    started: bool,
    done: bool,
}

pub fn list_alarms<A: AlarmApi + ?Sized>(api: &A) -> AlarmPages<'_, A> {
    AlarmPages {
        api,
        buffer: Vec::new().into_iter(),
        next_token: None,
        started: false,
        done: false,
    }
}

impl<A: AlarmApi + ?Sized> Iterator for AlarmPages<'_, A> {
    type Item = Result<AlarmDefinition, ListError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(raw) = self.buffer.next() {
                if raw.is_composite() {
                    continue;
                }
                let name = raw.alarm_name.clone();
                return Some(
                    AlarmDefinition::try_from(raw)
                        .map_err(|source| ListError::Malformed { name, source }),
                );
            }

            if self.done || (self.started && self.next_token.is_none()) {
                return None;
            }

            self.started = true;
            match self.api.list_page(self.next_token.as_deref()) {
                Ok(page) => {
                    self.buffer = page.alarms.into_iter();
                    self.next_token = page.next_token;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(ListError::Page(e)));
                }
            }
        }
    }
}

/// Describe one alarm and normalize it. Composite alarms read as absent.
pub fn describe_definition<A: AlarmApi + ?Sized>(
    api: &A,
    name: &str,
) -> Result<Option<AlarmDefinition>, ListError> {
    let raw = api.describe(name).map_err(ListError::Page)?;
    match raw {
        Some(raw) if !raw.is_composite() => AlarmDefinition::try_from(raw)
            .map(Some)
            .map_err(|source| ListError::Malformed {
                name: name.to_string(),
                source,
            }),
        _ => Ok(None),
    }
}
