//! Reference date used to derive ages.

use chrono::{NaiveDate, Utc};

/// Port for getting the current calendar date.
pub trait Clock: Send + Sync {
    /// Today's date, in UTC.
    fn today(&self) -> NaiveDate;
}

/// System clock using the OS time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

#[cfg(test)]
pub struct FixedClock(pub NaiveDate);

#[cfg(test)]
impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
