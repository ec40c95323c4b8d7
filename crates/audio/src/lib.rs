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


//! Recitation audio for a reading view: which recordings a verse needs,
//! fetching the missing ones, and keeping the view in step with the player.

pub mod config;
pub mod download;
pub mod err;
pub mod player;
pub mod quran;
pub mod reciter;
pub mod repeat;
pub mod request;
pub mod resolver;
pub mod session;
pub mod settings;
pub mod state;

pub use config::AudioConfig;
pub use download::{AudioFetcher, DownloadOrchestrator, DownloadStep};
pub use player::{AudioProvider, LogNotifier, Notifier, ProviderState, Track};
pub use quran::{Ayah, PageBounds, PageIndex, PageTable};
pub use reciter::{DEFAULT_RECITER, Reciter, ReciterCatalog};
pub use repeat::{RepeatAmount, RepeatCount, RepeatInfo};
pub use request::{AudioDownloadAmount, AudioRequest};
pub use resolver::{AssetPlan, AudioFile, AudioLayout};
pub use session::{DOWNLOAD_FAILED_MESSAGE, PlayOutcome, SessionController};
pub use settings::{MemorySettings, SettingKey, Settings, SettingsStore};
pub use state::{DownloadProgress, PlaybackState, SessionEvent, SessionSnapshot};
