//! Application settings that shape how badge schedules are evaluated.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_LATE_GRACE_DAYS, DEFAULT_TIMEZONE};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Days after a missed due date during which an open badge reads as
    /// `late` instead of `missed`. Zero disables the late state.
    pub late_grace_days: u32,
    /// IANA timezone used to decide what "today" is.
    pub timezone: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            late_grace_days: DEFAULT_LATE_GRACE_DAYS,
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub late_grace_days: Option<u32>,
    pub timezone: Option<String>,
}
