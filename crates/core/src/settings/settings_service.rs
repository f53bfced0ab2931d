use super::SettingsRepositoryTrait;
use crate::errors::{DatabaseError, Error, Result};
use crate::settings::{Settings, SettingsUpdate};
use crate::utils::time_utils::{parse_timezone, today_in};
use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, warn};
use std::sync::Arc;

#[async_trait]
pub trait SettingsServiceTrait: Send + Sync {
    fn get_settings(&self) -> Result<Settings>;

    async fn update_settings(&self, new_settings: &SettingsUpdate) -> Result<()>;

    /// Today's date in the configured timezone.
    fn today(&self) -> Result<NaiveDate>;

    /// Get a single setting value by key. Returns None if not found.
    fn get_setting_value(&self, key: &str) -> Result<Option<String>>;
}

pub struct SettingsService {
    settings_repository: Arc<dyn SettingsRepositoryTrait>,
}

impl SettingsService {
    pub fn new(settings_repository: Arc<dyn SettingsRepositoryTrait>) -> Self {
        SettingsService {
            settings_repository,
        }
    }
}

#[async_trait]
impl SettingsServiceTrait for SettingsService {
    fn get_settings(&self) -> Result<Settings> {
        self.settings_repository.get_settings()
    }

    async fn update_settings(&self, new_settings: &SettingsUpdate) -> Result<()> {
        if let Some(ref timezone) = new_settings.timezone {
            parse_timezone(timezone)?;
        }
        debug!("Updating settings: {:?}", new_settings);
        self.settings_repository.update_settings(new_settings).await
    }

    fn today(&self) -> Result<NaiveDate> {
        let settings = self.get_settings()?;
        let tz = match parse_timezone(&settings.timezone) {
            Ok(tz) => tz,
            Err(e) => {
                warn!("{}; falling back to UTC", e);
                chrono_tz::UTC
            }
        };
        Ok(today_in(tz))
    }

    fn get_setting_value(&self, key: &str) -> Result<Option<String>> {
        match self.settings_repository.get_setting(key) {
            Ok(value) => Ok(Some(value)),
            Err(Error::Database(DatabaseError::NotFound(_))) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
