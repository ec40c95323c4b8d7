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


use std::{path::PathBuf, time::Duration};

use bon::Builder;
use smart_default::SmartDefault;

use crate::resolver::AudioLayout;

/// Location of the ayah-position index the audio timing relies on.
pub const DEFAULT_AYAH_INDEX_URL: &str =
    "https://android.quran.com/data/databases/ayahinfo/ayahinfo_1024.db";

/// Audio session configuration
#[derive(Debug, Clone, SmartDefault, Builder)]
pub struct AudioConfig {
    /// How long a stop-like provider state must persist before the session
    /// reports Stopped
    #[default(_code = "Duration::from_millis(500)")]
    #[builder(default = Duration::from_millis(500), getter)]
    pub stop_debounce: Duration,

    /// Pause between switching to a new page and selecting the playing verse
    #[default(_code = "Duration::from_millis(500)")]
    #[builder(default = Duration::from_millis(500), getter)]
    pub page_switch_delay: Duration,

    #[default(_code = "DEFAULT_AYAH_INDEX_URL.to_string()")]
    #[builder(default = DEFAULT_AYAH_INDEX_URL.to_string(), into)]
    pub ayah_index_url: String,

    /// Where the ayah-position index is stored
    #[default(_code = "tilawa_paths::ayah_index_file().clone()")]
    #[builder(default = tilawa_paths::ayah_index_file().clone(), into)]
    pub ayah_index_path: PathBuf,

    /// Root of the per-reciter audio directories
    #[default(_code = "tilawa_paths::audio_dir().clone()")]
    #[builder(default = tilawa_paths::audio_dir().clone(), into)]
    pub audio_root: PathBuf,

    /// Album reported for every track
    #[default = "Quran"]
    #[builder(default = "Quran".to_string(), into)]
    pub album: String,

    #[default = "mp3"]
    #[builder(default = "mp3".to_string(), into)]
    pub audio_extension: String,
}

impl AudioConfig {
    #[must_use]
    pub fn layout(&self) -> AudioLayout {
        AudioLayout::new(self.ayah_index_path.clone(), self.audio_extension.clone())
    }
}
