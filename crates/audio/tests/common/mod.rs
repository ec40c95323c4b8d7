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


#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use async_trait::async_trait;
use parking_lot::Mutex;
use tempfile::TempDir;
use tilawa_audio::{
    AudioConfig, AudioFetcher, AudioProvider, AudioRequest, Ayah, DownloadOrchestrator, Notifier,
    PageTable, ProviderState, ReciterCatalog, SessionController, Settings, Track,
};
use tilawa_downloader::{DownloadError, ProgressCallback, TransferProgress};
use tokio::sync::{Notify, oneshot};

pub const AYAH_INDEX_URL: &str = "https://cdn.test/databases/ayahinfo.db";
pub const VERSE_RECITER: u32 = 1;
pub const GAPLESS_RECITER: u32 = 2;
pub const GAPLESS_DB_URL: &str = "https://cdn.test/databases/gapless.db";

/// Pages: 1 = 1:1.., 2 = 2:1..2:5, 3 = 2:6..2:16, 4 = 2:17..
pub const PAGES: &str = "[[1,1],[2,1],[2,6],[2,17]]";

const CATALOG: &str = r#"[
    {
        "id": 1,
        "name": "Minshawi Murattal",
        "server_url": "https://cdn.test/minshawi/",
        "directory": "minshawi"
    },
    {
        "id": 2,
        "name": "Gapless Reader",
        "server_url": "https://cdn.test/gapless",
        "directory": "gapless",
        "gapless": true,
        "gapless_database_url": "https://cdn.test/databases/gapless.db"
    }
]"#;

/// Lets a test hold a fetch open until it says so.
pub struct Gate {
    started: Mutex<Option<oneshot::Sender<()>>>,
    release: Arc<Notify>,
}

impl Gate {
    pub fn new() -> (Self, oneshot::Receiver<()>, Arc<Notify>) {
        let (tx, rx) = oneshot::channel();
        let release = Arc::new(Notify::new());
        (
            Self {
                started: Mutex::new(Some(tx)),
                release: Arc::clone(&release),
            },
            rx,
            release,
        )
    }
}

/// Writes a small file for every fetch and records the URLs it was asked
/// for.
#[derive(Default)]
pub struct FakeFetcher {
    calls:     Mutex<Vec<String>>,
    fail_when: Mutex<Option<String>>,
    gate:      Option<Gate>,
}

impl FakeFetcher {
    pub fn gated(gate: Gate) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    /// Fail every URL containing `needle`.
    pub fn fail_on(&self, needle: &str) { *self.fail_when.lock() = Some(needle.to_string()); }

    pub fn succeed(&self) { *self.fail_when.lock() = None; }

    pub fn calls(&self) -> Vec<String> { self.calls.lock().clone() }
}

#[async_trait]
impl AudioFetcher for FakeFetcher {
    async fn fetch(
        &self,
        url: &str,
        destination: &Path,
        _label: &str,
        progress: ProgressCallback,
    ) -> Result<(), DownloadError> {
        self.calls.lock().push(url.to_string());

        if let Some(gate) = &self.gate {
            let started = gate.started.lock().take();
            if let Some(tx) = started {
                let _ = tx.send(());
                gate.release.notified().await;
            }
        }

        let fail = self
            .fail_when
            .lock()
            .as_deref()
            .is_some_and(|needle| url.contains(needle));
        if fail {
            return Err(DownloadError::Http {
                status: 404,
                url:    url.to_string(),
            });
        }

        progress.report(TransferProgress {
            downloaded: 2,
            total:      Some(5),
        });
        std::fs::create_dir_all(destination.parent().unwrap()).unwrap();
        std::fs::write(destination, b"audio").unwrap();
        progress.report(TransferProgress {
            downloaded: 5,
            total:      Some(5),
        });
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Play,
    Pause,
    Stop,
    SetTrack(Track),
    SetPosition(Duration),
}

/// Player that records commands. `set_track` starts playing, like a real
/// player would.
pub struct FakeProvider {
    state:    Mutex<ProviderState>,
    track:    Mutex<Option<Track>>,
    position: Mutex<Duration>,
    calls:    Mutex<Vec<Call>>,
}

impl Default for FakeProvider {
    fn default() -> Self {
        Self {
            state:    Mutex::new(ProviderState::Stopped),
            track:    Mutex::new(None),
            position: Mutex::new(Duration::ZERO),
            calls:    Mutex::new(Vec::new()),
        }
    }
}

impl FakeProvider {
    pub fn set_state(&self, state: ProviderState) { *self.state.lock() = state; }

    pub fn load(&self, track: Option<Track>) { *self.track.lock() = track; }

    pub fn seek(&self, position: Duration) { *self.position.lock() = position; }

    pub fn calls(&self) -> Vec<Call> { self.calls.lock().clone() }

    pub fn clear_calls(&self) { self.calls.lock().clear(); }

    /// Track of the last `set_track` call.
    pub fn last_track(&self) -> Option<Track> {
        self.calls.lock().iter().rev().find_map(|call| match call {
            Call::SetTrack(track) => Some(track.clone()),
            _ => None,
        })
    }
}

impl AudioProvider for FakeProvider {
    fn play(&self) {
        self.calls.lock().push(Call::Play);
        self.set_state(ProviderState::Playing);
    }

    fn pause(&self) {
        self.calls.lock().push(Call::Pause);
        self.set_state(ProviderState::Paused);
    }

    fn stop(&self) {
        self.calls.lock().push(Call::Stop);
        self.set_state(ProviderState::Stopped);
    }

    fn set_track(&self, track: Track) {
        self.calls.lock().push(Call::SetTrack(track.clone()));
        self.load(Some(track));
        self.set_state(ProviderState::Playing);
    }

    fn position(&self) -> Duration { *self.position.lock() }

    fn set_position(&self, position: Duration) {
        self.calls.lock().push(Call::SetPosition(position));
        self.seek(position);
    }

    fn state(&self) -> ProviderState { *self.state.lock() }

    fn current_track(&self) -> Option<Track> { self.track.lock().clone() }
}

#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> { self.messages.lock().clone() }
}

impl Notifier for RecordingNotifier {
    fn show_error(&self, message: &str) { self.messages.lock().push(message.to_string()); }
}

pub struct Fixture {
    pub dir:        TempDir,
    pub config:     AudioConfig,
    pub pages:      Arc<PageTable>,
    pub settings:   Settings,
    pub fetcher:    Arc<FakeFetcher>,
    pub provider:   Arc<FakeProvider>,
    pub notifier:   Arc<RecordingNotifier>,
    pub downloads:  Arc<DownloadOrchestrator>,
    pub controller: SessionController,
}

impl Fixture {
    pub fn new() -> Self { Self::with_fetcher(FakeFetcher::default()) }

    pub fn with_fetcher(fetcher: FakeFetcher) -> Self {
        let dir = TempDir::new().unwrap();
        let config = AudioConfig::builder()
            .ayah_index_path(dir.path().join("databases").join("ayahinfo.db"))
            .audio_root(dir.path().join("audio"))
            .ayah_index_url(AYAH_INDEX_URL)
            .build();

        let catalog = Arc::new(ReciterCatalog::from_json(CATALOG, &config.audio_root).unwrap());
        let pages = Arc::new(PageTable::from_json(PAGES).unwrap());
        let fetcher = Arc::new(fetcher);
        let provider = Arc::new(FakeProvider::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let settings = Settings::in_memory();

        let downloads = Arc::new(DownloadOrchestrator::new(
            fetcher.clone(),
            catalog,
            config.layout(),
            config.ayah_index_url.clone(),
        ));

        let controller = SessionController::builder()
            .config(config.clone())
            .settings(settings.clone())
            .pages(pages.clone())
            .provider(provider.clone())
            .notifier(notifier.clone())
            .downloads(downloads.clone())
            .build();

        Self {
            dir,
            config,
            pages,
            settings,
            fetcher,
            provider,
            notifier,
            downloads,
            controller,
        }
    }

    /// Request for `current` that fetches up to the end of its page.
    pub fn request(&self, reciter_id: u32, current: Ayah) -> AudioRequest {
        AudioRequest::new(
            reciter_id,
            current,
            tilawa_audio::RepeatInfo::default(),
            tilawa_audio::AudioDownloadAmount::Page,
            self.pages.as_ref(),
        )
        .unwrap()
    }

    pub fn cache_ayah_index(&self) { write_file(&self.config.ayah_index_path); }

    /// Puts every file `request` needs into the cache.
    pub fn cache_everything(&self, request: &AudioRequest) {
        self.cache_ayah_index();
        let reciter = self.downloads.catalog().by_id(request.reciter_id).unwrap();
        let layout = self.downloads.layout();
        if let Some(db) = layout.gapless_database_path(reciter) {
            write_file(&db);
        }
        for file in layout.required_files(reciter, request) {
            write_file(&file.path);
        }
    }

    pub fn reciter_dir(&self, reciter_id: u32) -> PathBuf {
        self.downloads
            .catalog()
            .by_id(reciter_id)
            .unwrap()
            .local_path
            .clone()
    }
}

fn write_file(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, b"cached").unwrap();
}

/// Track carrying `tag`, the way the player would hand it back.
pub fn tagged_track(tag: impl Into<String>) -> Track {
    Track::builder()
        .uri("/tmp/track.mp3")
        .title("track")
        .artist("reciter")
        .album("Quran")
        .tag(tag)
        .build()
}
