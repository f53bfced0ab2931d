//! Row type of the `app_settings` key-value table.

use diesel::prelude::*;

#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::app_settings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AppSettingDB {
    pub setting_key: String,
    pub setting_value: String,
}

impl AppSettingDB {
    pub fn new(key: impl Into<String>, value: impl ToString) -> Self {
        Self {
            setting_key: key.into(),
            setting_value: value.to_string(),
        }
    }
}
