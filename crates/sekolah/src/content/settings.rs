//! Singleton site settings stored in the `settings` collection.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::{BatchOp, Collection, DocumentStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettingKey {
    #[serde(rename = "schoolInfo")]
    SchoolInfo,
    #[serde(rename = "homepageContent")]
    HomepageContent,
    #[serde(rename = "profileContent")]
    ProfileContent,
    #[serde(rename = "ppdbSchedule")]
    PpdbSchedule,
}

impl SettingKey {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::SchoolInfo,
            Self::HomepageContent,
            Self::ProfileContent,
            Self::PpdbSchedule,
        ]
    }

    /// Document id inside the settings collection.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SchoolInfo => "schoolInfo",
            Self::HomepageContent => "homepageContent",
            Self::ProfileContent => "profileContent",
            Self::PpdbSchedule => "ppdbSchedule",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(raw.trim()))
    }
}

/// A typed settings document.
pub trait Setting: Serialize + DeserializeOwned + Default {
    const KEY: SettingKey;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchoolInfo {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub principal: String,
    pub accreditation: String,
}

impl Setting for SchoolInfo {
    const KEY: SettingKey = SettingKey::SchoolInfo;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomepageContent {
    pub hero_title: String,
    pub hero_subtitle: String,
    pub welcome_message: String,
    pub highlights: Vec<String>,
}

impl Setting for HomepageContent {
    const KEY: SettingKey = SettingKey::HomepageContent;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileContent {
    pub history: String,
    pub vision: String,
    pub mission: Vec<String>,
}

impl Setting for ProfileContent {
    const KEY: SettingKey = SettingKey::ProfileContent;
}

/// Admission window. Missing bounds leave that side of the window open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PpdbSchedule {
    pub academic_year: String,
    pub opens_on: Option<NaiveDate>,
    pub closes_on: Option<NaiveDate>,
    pub announcement_on: Option<NaiveDate>,
}

impl PpdbSchedule {
    pub fn is_open(&self, today: NaiveDate) -> bool {
        let after_open = self.opens_on.map_or(true, |opens| today >= opens);
        let before_close = self.closes_on.map_or(true, |closes| today <= closes);
        after_open && before_close
    }
}

impl Setting for PpdbSchedule {
    const KEY: SettingKey = SettingKey::PpdbSchedule;
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("invalid {key} payload: {source}")]
    InvalidPayload {
        key: &'static str,
        source: serde_json::Error,
    },
}

/// Reads and writes the singleton settings documents.
#[derive(Debug)]
pub struct SiteSettings<S> {
    store: Arc<S>,
}

impl<S> Clone for SiteSettings<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: DocumentStore> SiteSettings<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Stored value, or the type's default when nothing was saved yet.
    pub fn load<T: Setting>(&self) -> Result<T, StoreError> {
        match self.store.get(Collection::Settings, T::KEY.as_str())? {
            Some(document) => Ok(serde_json::from_value(document.data)?),
            None => Ok(T::default()),
        }
    }

    pub fn save<T: Setting>(&self, value: &T) -> Result<(), StoreError> {
        let data = serde_json::to_value(value)?;
        self.store.batch(vec![BatchOp::Set {
            collection: Collection::Settings,
            id: T::KEY.as_str().to_string(),
            data,
        }])
    }

    /// Untyped read used by the HTTP layer.
    pub fn load_value(&self, key: SettingKey) -> Result<Value, SettingsError> {
        let value = match key {
            SettingKey::SchoolInfo => serde_json::to_value(self.load::<SchoolInfo>()?),
            SettingKey::HomepageContent => serde_json::to_value(self.load::<HomepageContent>()?),
            SettingKey::ProfileContent => serde_json::to_value(self.load::<ProfileContent>()?),
            SettingKey::PpdbSchedule => serde_json::to_value(self.load::<PpdbSchedule>()?),
        };
        value.map_err(|err| SettingsError::Store(StoreError::Decode(err)))
    }

    /// Untyped write used by the HTTP layer. The payload must decode as the key's type.
    pub fn save_value(&self, key: SettingKey, payload: Value) -> Result<Value, SettingsError> {
        match key {
            SettingKey::SchoolInfo => self.save_checked::<SchoolInfo>(payload),
            SettingKey::HomepageContent => self.save_checked::<HomepageContent>(payload),
            SettingKey::ProfileContent => self.save_checked::<ProfileContent>(payload),
            SettingKey::PpdbSchedule => self.save_checked::<PpdbSchedule>(payload),
        }
    }

    fn save_checked<T: Setting>(&self, payload: Value) -> Result<Value, SettingsError> {
        let typed: T =
            serde_json::from_value(payload).map_err(|source| SettingsError::InvalidPayload {
                key: T::KEY.as_str(),
                source,
            })?;
        self.save(&typed)?;
        serde_json::to_value(&typed).map_err(|err| SettingsError::Store(StoreError::Decode(err)))
    }
}
