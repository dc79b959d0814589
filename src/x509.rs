//! Time values taken from X.509 certificates and signed objects.
//!
//! Certificates and signed objects carry their times with a resolution of
//! one second. The [`Time`] type here wraps a `chrono` UTC date-time and is
//! used for all the timestamps kept with a Signed Prefix List.

use std::fmt;
use chrono::{DateTime, TimeZone, Utc};


//------------ Time ----------------------------------------------------------

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Time(DateTime<Utc>);

impl Time {
    /// Creates a time value from its components.
    ///
    /// # Panics
    ///
    /// The function panics if the components do not describe a valid
    /// point in time.
    pub fn utc(
        year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32
    ) -> Self {
        match Utc.with_ymd_and_hms(year, month, day, hour, min, sec) {
            chrono::LocalResult::Single(dt) => Time(dt),
            _ => panic!("invalid time components"),
        }
    }

    /// Creates a time value from seconds since the Unix epoch.
    ///
    /// Returns `None` if the value is outside of the range `chrono` can
    /// represent.
    pub fn from_timestamp(secs: i64) -> Option<Self> {
        match Utc.timestamp_opt(secs, 0) {
            chrono::LocalResult::Single(dt) => Some(Time(dt)),
            _ => None
        }
    }

    /// Returns the number of seconds since the Unix epoch.
    pub fn timestamp(self) -> i64 {
        self.0.timestamp()
    }
}


//--- Display

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%SZ"))
    }
}


//============ Tests =========================================================
