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


//! Host wiring: opens the settings database, loads the reciter catalog and
//! page layout, and hands out download and playback services built on them.

use std::{path::PathBuf, sync::Arc};

use bon::Builder;
use smart_default::SmartDefault;
use snafu::{OptionExt, ResultExt, Whatever};
use tilawa_audio::{
    AssetPlan, AudioConfig, AudioProvider, AudioRequest, Ayah, DownloadOrchestrator, Notifier,
    PageIndex, PageTable, Reciter, ReciterCatalog, SessionController, Settings,
};
use tilawa_common_telemetry::LoggingOptions;
use tilawa_downloader::{Downloader, DownloaderConfig};
use tilawa_store::{DBStore, DatabaseConfig};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Configuration for the application
#[derive(Debug, Clone, SmartDefault, Builder)]
pub struct AppConfig {
    #[builder(default)]
    pub audio:                    AudioConfig,
    #[builder(default)]
    pub downloader:               DownloaderConfig,
    /// Settings database, stored under the data directory
    #[default(_code = "default_database()")]
    #[builder(default = default_database())]
    pub database:                 DatabaseConfig,
    #[builder(default)]
    pub logging:                  LoggingOptions,
    /// Optional reciter catalog replacing the built-in one
    #[default(_code = "tilawa_paths::reciters_file().clone()")]
    #[builder(default = tilawa_paths::reciters_file().clone(), into)]
    pub reciters_file:            PathBuf,
    /// Mushaf page layout as a JSON list of page start verses. Without one
    /// every chapter is its own page.
    #[builder(into)]
    pub page_table:               Option<PathBuf>,
    /// Whether long running commands stop on Ctrl+C / SIGTERM
    #[default = true]
    #[builder(default = true)]
    pub enable_graceful_shutdown: bool,
}

fn default_database() -> DatabaseConfig {
    DatabaseConfig::builder()
        .db_path(tilawa_paths::settings_db_file().clone())
        .build()
}

impl AppConfig {
    /// Opens every resource the host needs.
    pub async fn open(self) -> Result<App, Whatever> {
        let store = DBStore::new(self.database.clone())
            .await
            .whatever_context("Failed to open settings database")?;
        let settings = Settings::new(Arc::new(store.kv_store()));

        let catalog = ReciterCatalog::load_or_builtin(&self.reciters_file, &self.audio.audio_root)
            .whatever_context("Failed to load reciter catalog")?;

        let pages: Arc<dyn PageIndex> = match &self.page_table {
            Some(path) => {
                Arc::new(PageTable::load(path).whatever_context("Failed to load page table")?)
            }
            None => Arc::new(PageTable::by_chapter()),
        };

        let downloader = Downloader::new(self.downloader.clone())
            .whatever_context("Failed to build downloader")?;
        let downloads = Arc::new(DownloadOrchestrator::new(
            Arc::new(downloader),
            Arc::new(catalog),
            self.audio.layout(),
            self.audio.ayah_index_url.clone(),
        ));

        info!(
            reciters = downloads.catalog().len(),
            pages = pages.page_count(),
            "tilawa opened"
        );

        Ok(App {
            config: self,
            store,
            settings,
            pages,
            downloads,
            cancellation_token: CancellationToken::new(),
        })
    }
}

/// An opened host with its shared services.
pub struct App {
    pub config:             AppConfig,
    store:                  DBStore,
    settings:               Settings,
    pages:                  Arc<dyn PageIndex>,
    downloads:              Arc<DownloadOrchestrator>,
    /// Cancelled on shutdown; session loops started through the app stop
    /// with it
    pub cancellation_token: CancellationToken,
}

impl App {
    pub const fn settings(&self) -> &Settings { &self.settings }

    pub fn catalog(&self) -> &ReciterCatalog { self.downloads.catalog() }

    pub fn pages(&self) -> &dyn PageIndex { self.pages.as_ref() }

    pub const fn downloads(&self) -> &Arc<DownloadOrchestrator> { &self.downloads }

    /// The reciter named by the `active_reciter` preference.
    pub async fn active_reciter(&self) -> Result<Reciter, Whatever> {
        let name = self
            .settings
            .active_reciter()
            .await
            .whatever_context("Failed to read active reciter")?;
        self.catalog()
            .by_name(&name)
            .cloned()
            .with_whatever_context(|| format!("Reciter {name:?} is not in the catalog"))
    }

    /// Request for playing from `ayah` under the stored preferences.
    pub async fn request_for(&self, ayah: Ayah) -> Result<AudioRequest, Whatever> {
        let reciter = self.active_reciter().await?;
        let repeat = self
            .settings
            .repeat_info()
            .await
            .whatever_context("Failed to read repeat preferences")?;
        let amount = self
            .settings
            .download_amount()
            .await
            .whatever_context("Failed to read download amount")?;
        AudioRequest::new(reciter.id, ayah, repeat, amount, self.pages())
            .whatever_context("Cannot play this verse")
    }

    /// What playing from `ayah` would still download.
    pub async fn plan(&self, ayah: Ayah) -> Result<(AudioRequest, AssetPlan), Whatever> {
        let request = self.request_for(ayah).await?;
        let plan = self
            .downloads
            .plan(&request)
            .whatever_context("Failed to plan download")?;
        Ok((request, plan))
    }

    /// Downloads everything playing from `ayah` needs.
    pub async fn fetch(&self, ayah: Ayah) -> Result<AudioRequest, Whatever> {
        let request = self.request_for(ayah).await?;
        self.downloads
            .acquire(&request)
            .await
            .whatever_context("Failed to download audio")?;
        Ok(request)
    }

    /// A playback session driving `provider`, with its event loop running
    /// until the app shuts down.
    pub fn session(
        &self,
        provider: Arc<dyn AudioProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> (SessionController, Option<JoinHandle<()>>) {
        let session = SessionController::builder()
            .config(self.config.audio.clone())
            .settings(self.settings.clone())
            .pages(Arc::clone(&self.pages))
            .provider(provider)
            .notifier(notifier)
            .downloads(Arc::clone(&self.downloads))
            .build();
        let handle = session.start(self.cancellation_token.child_token());
        (session, handle)
    }

    /// Runs `work` until it completes, or until a shutdown signal arrives
    /// when graceful shutdown is enabled.
    pub async fn run_until_shutdown<F, T>(&self, work: F) -> Option<T>
    where
        F: Future<Output = T>,
    {
        if !self.config.enable_graceful_shutdown {
            return Some(work.await);
        }
        tokio::select! {
            output = work => Some(output),
            () = shutdown_signal() => {
                self.cancellation_token.cancel();
                None
            }
        }
    }

    /// Stops running sessions and closes the settings database.
    pub async fn shutdown(self) {
        info!("Initiating graceful shutdown");
        self.cancellation_token.cancel();
        self.store.close().await;
        info!("Application shutdown complete");
    }
}

/// Resolves on Ctrl+C or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("Received Ctrl+C signal"); },
        () = terminate => { info!("Received terminate signal"); },
    }
}
