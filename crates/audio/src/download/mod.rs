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


//! Fills the local cache with every asset a request needs.

mod fetcher;
pub mod metrics;

use std::{
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

pub use fetcher::AudioFetcher;
use snafu::{OptionExt, ResultExt, ensure};
use tilawa_downloader::{ProgressCallback, TransferProgress};
use tilawa_paths::{file_exists, make_directory};
use tokio::sync::watch;
use tracing::{info, warn};

use self::metrics::{DOWNLOAD_ACTIVE, DOWNLOAD_FAILURES, DOWNLOAD_STEPS, DOWNLOADED_FILES};
use crate::{
    err::{
        AcquireError, AudioFileDownloadSnafu, AyahIndexDownloadSnafu, BusySnafu,
        CreateReciterDirSnafu, GaplessDatabaseDownloadSnafu, UnknownReciterSnafu,
    },
    quran::title_for,
    reciter::{Reciter, ReciterCatalog},
    request::AudioRequest,
    resolver::{AssetPlan, AudioFile, AudioLayout},
    state::DownloadProgress,
};

/// Label shown while reference databases download.
const LOADING_DATA: &str = "Loading data";

/// Stages of an acquisition, in the order they run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display, strum_macros::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum DownloadStep {
    AyahIndex,
    GaplessDatabase,
    AudioRange,
}

/// Sequences the downloads of one session. At most one acquisition runs at a
/// time; a second caller is turned away instead of queued.
pub struct DownloadOrchestrator {
    fetcher:        Arc<dyn AudioFetcher>,
    catalog:        Arc<ReciterCatalog>,
    layout:         AudioLayout,
    ayah_index_url: String,
    busy:           AtomicBool,
    progress:       Arc<watch::Sender<DownloadProgress>>,
}

/// Clears the busy flag and idles progress when an acquisition ends.
struct ActiveDownload<'a> {
    orchestrator: &'a DownloadOrchestrator,
}

impl Drop for ActiveDownload<'_> {
    fn drop(&mut self) {
        self.orchestrator
            .progress
            .send_replace(DownloadProgress::default());
        self.orchestrator.busy.store(false, Ordering::Release);
        DOWNLOAD_ACTIVE.set(0);
    }
}

impl DownloadOrchestrator {
    pub fn new(
        fetcher: Arc<dyn AudioFetcher>,
        catalog: Arc<ReciterCatalog>,
        layout: AudioLayout,
        ayah_index_url: impl Into<String>,
    ) -> Self {
        let (progress, _) = watch::channel(DownloadProgress::default());
        Self {
            fetcher,
            catalog,
            layout,
            ayah_index_url: ayah_index_url.into(),
            busy: AtomicBool::new(false),
            progress: Arc::new(progress),
        }
    }

    pub const fn layout(&self) -> &AudioLayout { &self.layout }

    pub fn catalog(&self) -> &ReciterCatalog { &self.catalog }

    pub fn is_downloading(&self) -> bool { self.busy.load(Ordering::Acquire) }

    /// Current progress.
    pub fn progress(&self) -> DownloadProgress { self.progress.borrow().clone() }

    pub fn subscribe(&self) -> watch::Receiver<DownloadProgress> { self.progress.subscribe() }

    /// What `request` still needs, without downloading anything.
    pub fn plan(&self, request: &AudioRequest) -> Result<AssetPlan, AcquireError> {
        let reciter = self.reciter(request)?;
        Ok(self.layout.resolve(reciter, request))
    }

    /// Downloads every missing asset of `request`: the ayah-position index,
    /// then the reciter's gapless database, then the audio range. Stops at
    /// the first failure; files fetched before it stay cached.
    pub async fn acquire(&self, request: &AudioRequest) -> Result<(), AcquireError> {
        ensure!(
            self.busy
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_ok(),
            BusySnafu
        );
        let _active = ActiveDownload { orchestrator: self };
        DOWNLOAD_ACTIVE.set(1);

        let reciter = self.reciter(request)?;
        info!(
            reciter = %reciter.name,
            chapter = request.current_ayah.chapter,
            verse = request.current_ayah.verse,
            "acquiring audio"
        );

        if !file_exists(self.layout.ayah_index_path()) {
            self.run_step(DownloadStep::AyahIndex, self.fetch_ayah_index())
                .await?;
        }

        if let Some(path) = self.layout.gapless_database_path(reciter) {
            if !file_exists(&path) {
                self.run_step(
                    DownloadStep::GaplessDatabase,
                    self.fetch_gapless_database(reciter, &path),
                )
                .await?;
            }
        }

        let missing = self.layout.missing_files(reciter, request);
        if !missing.is_empty() {
            self.run_step(DownloadStep::AudioRange, self.fetch_range(reciter, &missing))
                .await?;
        }
        Ok(())
    }

    fn reciter(&self, request: &AudioRequest) -> Result<&Reciter, AcquireError> {
        self.catalog
            .by_id(request.reciter_id)
            .context(UnknownReciterSnafu {
                id: request.reciter_id,
            })
    }

    async fn run_step(
        &self,
        step: DownloadStep,
        work: impl Future<Output = Result<(), AcquireError>>,
    ) -> Result<(), AcquireError> {
        DOWNLOAD_STEPS.with_label_values(&[step.as_ref()]).inc();
        let result = work.await;
        if let Err(err) = &result {
            DOWNLOAD_FAILURES.with_label_values(&[step.as_ref()]).inc();
            warn!(step = %step, error = %err, "download step failed");
        }
        result
    }

    async fn fetch_ayah_index(&self) -> Result<(), AcquireError> {
        let path = self.layout.ayah_index_path();
        self.fetch_one(&self.ayah_index_url, path, LOADING_DATA, 0, 1)
            .await
            .context(AyahIndexDownloadSnafu)
    }

    async fn fetch_gapless_database(
        &self,
        reciter: &Reciter,
        path: &Path,
    ) -> Result<(), AcquireError> {
        let Some(url) = reciter.gapless_database_url.as_deref() else {
            return Ok(());
        };
        self.fetch_one(url, path, LOADING_DATA, 0, 1)
            .await
            .context(GaplessDatabaseDownloadSnafu {
                reciter: &reciter.name,
            })
    }

    async fn fetch_range(
        &self,
        reciter: &Reciter,
        files: &[AudioFile],
    ) -> Result<(), AcquireError> {
        make_directory(&reciter.local_path).context(CreateReciterDirSnafu {
            path: &reciter.local_path,
        })?;

        for (index, file) in files.iter().enumerate() {
            let label = if reciter.gapless {
                format!("Surah {}", file.ayah.chapter)
            } else {
                title_for(file.ayah)
            };
            self.fetch_one(&file.url, &file.path, &label, index, files.len())
                .await
                .context(AudioFileDownloadSnafu { url: &file.url })?;
        }
        Ok(())
    }

    /// Fetch file `index` of `count` in the current step, mapping its
    /// progress onto the step's 0..=100 range.
    async fn fetch_one(
        &self,
        url: &str,
        destination: &Path,
        label: &str,
        index: usize,
        count: usize,
    ) -> Result<(), tilawa_downloader::DownloadError> {
        let step_percent = move |file_percent: u8| {
            let done = index * 100 + usize::from(file_percent);
            u8::try_from(done / count.max(1)).unwrap_or(100)
        };

        self.progress.send_replace(DownloadProgress {
            is_downloading: true,
            percent:        step_percent(0),
            label:          Some(label.to_string()),
        });

        let sender = Arc::clone(&self.progress);
        let callback = ProgressCallback::new(move |transfer: TransferProgress| {
            let percent = step_percent(transfer.percent());
            sender.send_if_modified(|progress| {
                if progress.percent == percent {
                    false
                } else {
                    progress.percent = percent;
                    true
                }
            });
        });

        self.fetcher
            .fetch(url, destination, label, callback)
            .await?;
        DOWNLOADED_FILES.inc();
        Ok(())
    }
}
