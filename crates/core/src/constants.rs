/// Decimal places kept for money amounts
pub const MONEY_DECIMAL_PRECISION: u32 = 2;

/// Days after a missed due date during which the badge reads as late
pub const DEFAULT_LATE_GRACE_DAYS: u32 = 3;

/// Timezone used to derive "today" when none is configured
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Settings keys stored in `app_settings`
pub const SETTING_LATE_GRACE_DAYS: &str = "late_grace_days";
pub const SETTING_TIMEZONE: &str = "timezone";
