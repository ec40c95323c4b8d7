// Copyright 2025 Crrow
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


//! Typed access to user preferences.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use snafu::{OptionExt, ResultExt};
use strum::EnumProperty;
use tilawa_store::KVStore;

use crate::{
    err::{InvalidSettingValueSnafu, SettingCodecSnafu, SettingsError},
    repeat::{RepeatAmount, RepeatCount, RepeatInfo},
    request::AudioDownloadAmount,
};

/// Preference keys. The `default` property holds the JSON value used while a
/// key has never been written.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
    strum_macros::EnumIter,
    strum_macros::EnumProperty,
)]
#[strum(serialize_all = "snake_case")]
pub enum SettingKey {
    #[strum(props(default = r#""Minshawi Murattal""#))]
    ActiveReciter,
    #[strum(props(default = "false"))]
    AudioRepeat,
    #[strum(props(default = r#""none""#))]
    RepeatAmount,
    #[strum(props(default = r#"{"times":1}"#))]
    RepeatTimes,
    #[strum(props(default = r#""page""#))]
    DownloadAmount,
    #[strum(props(default = "false"))]
    PreferStreaming,
}

impl SettingKey {
    /// Value reported for a key that has never been written.
    pub fn default_value(self) -> Result<Value, SettingsError> {
        let raw = self.get_str("default").unwrap_or("null");
        serde_json::from_str(raw).context(SettingCodecSnafu { key: self })
    }
}

/// Raw JSON key-value storage for preferences.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load(&self, key: SettingKey) -> Result<Option<Value>, SettingsError>;

    async fn store(&self, key: SettingKey, value: Value) -> Result<(), SettingsError>;
}

#[async_trait]
impl SettingsStore for KVStore {
    async fn load(&self, key: SettingKey) -> Result<Option<Value>, SettingsError> {
        Ok(self.get(key.as_ref()).await?)
    }

    async fn store(&self, key: SettingKey, value: Value) -> Result<(), SettingsError> {
        Ok(self.set(key.as_ref(), &value).await?)
    }
}

/// Process-local settings, used by tests and hosts without a database.
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: RwLock<HashMap<SettingKey, Value>>,
}

#[async_trait]
impl SettingsStore for MemorySettings {
    async fn load(&self, key: SettingKey) -> Result<Option<Value>, SettingsError> {
        Ok(self.values.read().get(&key).cloned())
    }

    async fn store(&self, key: SettingKey, value: Value) -> Result<(), SettingsError> {
        self.values.write().insert(key, value);
        Ok(())
    }
}

/// Typed preference accessors over a [`SettingsStore`].
#[derive(Clone)]
pub struct Settings {
    store: Arc<dyn SettingsStore>,
}

impl Settings {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self { Self { store } }

    /// Settings kept in memory only.
    #[must_use]
    pub fn in_memory() -> Self { Self::new(Arc::new(MemorySettings::default())) }

    pub async fn get<T: DeserializeOwned>(&self, key: SettingKey) -> Result<T, SettingsError> {
        let value = match self.store.load(key).await? {
            Some(value) => value,
            None => key.default_value()?,
        };
        serde_json::from_value(value).context(SettingCodecSnafu { key })
    }

    pub async fn set<T: Serialize + Sync + ?Sized>(
        &self,
        key: SettingKey,
        value: &T,
    ) -> Result<(), SettingsError> {
        let value = serde_json::to_value(value).context(SettingCodecSnafu { key })?;
        self.store.store(key, value).await?;
        tracing::debug!(key = %key, "setting updated");
        Ok(())
    }

    /// Parses `raw` as the type stored under `key` and saves it.
    pub async fn set_from_str(&self, key: SettingKey, raw: &str) -> Result<(), SettingsError> {
        let invalid = || InvalidSettingValueSnafu { key, value: raw };
        match key {
            SettingKey::ActiveReciter => self.set(key, raw.trim()).await,
            SettingKey::AudioRepeat | SettingKey::PreferStreaming => {
                let value: bool = raw.trim().parse().ok().with_context(invalid)?;
                self.set(key, &value).await
            }
            SettingKey::RepeatAmount => {
                let value: RepeatAmount = raw.trim().parse().ok().with_context(invalid)?;
                self.set(key, &value).await
            }
            SettingKey::RepeatTimes => {
                let value: RepeatCount = raw.parse().ok().with_context(invalid)?;
                self.set(key, &value).await
            }
            SettingKey::DownloadAmount => {
                let value: AudioDownloadAmount = raw.trim().parse().ok().with_context(invalid)?;
                self.set(key, &value).await
            }
        }
    }

    /// Current value of `key` in the form accepted by
    /// [`Settings::set_from_str`].
    pub async fn get_display(&self, key: SettingKey) -> Result<String, SettingsError> {
        Ok(match key {
            SettingKey::ActiveReciter => self.active_reciter().await?,
            SettingKey::AudioRepeat => self.audio_repeat().await?.to_string(),
            SettingKey::RepeatAmount => self.repeat_amount().await?.to_string(),
            SettingKey::RepeatTimes => self.repeat_times().await?.to_string(),
            SettingKey::DownloadAmount => self.download_amount().await?.to_string(),
            SettingKey::PreferStreaming => self.prefer_streaming().await?.to_string(),
        })
    }

    pub async fn active_reciter(&self) -> Result<String, SettingsError> {
        self.get(SettingKey::ActiveReciter).await
    }

    pub async fn audio_repeat(&self) -> Result<bool, SettingsError> {
        self.get(SettingKey::AudioRepeat).await
    }

    pub async fn repeat_amount(&self) -> Result<RepeatAmount, SettingsError> {
        self.get(SettingKey::RepeatAmount).await
    }

    pub async fn repeat_times(&self) -> Result<RepeatCount, SettingsError> {
        self.get(SettingKey::RepeatTimes).await
    }

    pub async fn download_amount(&self) -> Result<AudioDownloadAmount, SettingsError> {
        self.get(SettingKey::DownloadAmount).await
    }

    pub async fn prefer_streaming(&self) -> Result<bool, SettingsError> {
        self.get(SettingKey::PreferStreaming).await
    }

    /// Repeat policy for a new request.
    pub async fn repeat_info(&self) -> Result<RepeatInfo, SettingsError> {
        Ok(RepeatInfo::from_preferences(
            self.audio_repeat().await?,
            self.repeat_amount().await?,
            self.repeat_times().await?,
        ))
    }
}
