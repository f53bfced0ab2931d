use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::warn;
use std::sync::Arc;

use super::model::AppSettingDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::app_settings::dsl::*;
use goalpace_core::constants::{
    DEFAULT_LATE_GRACE_DAYS, DEFAULT_TIMEZONE, SETTING_LATE_GRACE_DAYS, SETTING_TIMEZONE,
};
use goalpace_core::errors::Result;
use goalpace_core::settings::{Settings, SettingsRepositoryTrait, SettingsUpdate};

pub struct SettingsRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SettingsRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        SettingsRepository { pool, writer }
    }
}

fn default_value(key: &str) -> Option<String> {
    match key {
        SETTING_LATE_GRACE_DAYS => Some(DEFAULT_LATE_GRACE_DAYS.to_string()),
        SETTING_TIMEZONE => Some(DEFAULT_TIMEZONE.to_string()),
        _ => None,
    }
}

fn upsert(conn: &mut SqliteConnection, row: AppSettingDB) -> Result<()> {
    diesel::replace_into(app_settings)
        .values(&row)
        .execute(conn)
        .map_err(StorageError::from)?;
    Ok(())
}

#[async_trait]
impl SettingsRepositoryTrait for SettingsRepository {
    fn get_settings(&self) -> Result<Settings> {
        let mut conn = get_connection(&self.pool)?;
        let all_settings: Vec<(String, String)> = app_settings
            .select((setting_key, setting_value))
            .load::<(String, String)>(&mut conn)
            .map_err(StorageError::from)?;

        let mut settings = Settings::default();

        for (key, value) in all_settings {
            match key.as_str() {
                SETTING_LATE_GRACE_DAYS => match value.trim().parse::<u32>() {
                    Ok(days) => settings.late_grace_days = days,
                    Err(_) => warn!(
                        "Ignoring invalid {} '{}', using {}",
                        SETTING_LATE_GRACE_DAYS, value, DEFAULT_LATE_GRACE_DAYS
                    ),
                },
                SETTING_TIMEZONE => {
                    if !value.trim().is_empty() {
                        settings.timezone = value.trim().to_string();
                    }
                }
                _ => {}
            }
        }

        Ok(settings)
    }

    async fn update_settings(&self, new_settings: &SettingsUpdate) -> Result<()> {
        let settings = new_settings.clone();
        self.writer
            .exec(move |conn| {
                if let Some(days) = settings.late_grace_days {
                    upsert(conn, AppSettingDB::new(SETTING_LATE_GRACE_DAYS, days))?;
                }
                if let Some(ref tz) = settings.timezone {
                    upsert(conn, AppSettingDB::new(SETTING_TIMEZONE, tz))?;
                }
                Ok(())
            })
            .await
    }

    fn get_setting(&self, setting_key_param: &str) -> Result<String> {
        let mut conn = get_connection(&self.pool)?;
        let result = app_settings
            .filter(setting_key.eq(setting_key_param))
            .select(setting_value)
            .first::<String>(&mut conn);

        match result {
            Ok(value) => Ok(value),
            Err(diesel::result::Error::NotFound) => default_value(setting_key_param)
                .ok_or_else(|| StorageError::from(diesel::result::Error::NotFound).into()),
            Err(e) => Err(StorageError::from(e).into()),
        }
    }

    async fn update_setting(
        &self,
        setting_key_param: &str,
        setting_value_param: &str,
    ) -> Result<()> {
        let row = AppSettingDB::new(setting_key_param, setting_value_param);
        self.writer.exec(move |conn| upsert(conn, row)).await
    }
}
