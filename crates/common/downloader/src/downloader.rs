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


use std::{
    ffi::OsString,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use fd_lock::RwLock;
use jiff::Timestamp;
use snafu::ResultExt;
use tokio::fs;
use tracing::{debug, info};

use crate::{
    config::DownloaderConfig,
    error::{ClientSnafu, DownloadError, DownloadInProgressSnafu, FileWriteSnafu},
    single_downloader::SingleThreadDownloader,
    types::{DownloadRequest, DownloadResult},
};

/// Resumable HTTP downloader.
///
/// A transfer for `dir/name` writes to `dir/name.part` and is guarded by an
/// exclusive lock on `dir/name.lock`, so two downloads of the same
/// destination never interleave, even across processes.
pub struct Downloader {
    config: DownloaderConfig,
    single: SingleThreadDownloader,
}

impl Downloader {
    /// Create a new downloader with the given configuration
    pub fn new(config: DownloaderConfig) -> Result<Self, DownloadError> {
        let client = Self::build_client(&config)?;
        let single = SingleThreadDownloader::new(client, config.resume);
        Ok(Self { config, single })
    }

    pub const fn config(&self) -> &DownloaderConfig { &self.config }

    /// Download `request.url` to `request.output_path`.
    ///
    /// Fails with [`DownloadError::DownloadInProgress`] when another transfer
    /// currently holds the destination's lock.
    pub async fn download(
        &self,
        request: DownloadRequest,
    ) -> Result<DownloadResult, DownloadError> {
        let start_time = Timestamp::now();
        let output = request.output_path.clone();

        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)
                .await
                .context(FileWriteSnafu { path: parent })?;
        }

        let lock_path = self.lock_path(&output);
        let file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .context(FileWriteSnafu { path: &lock_path })?;
        let mut lock = RwLock::new(file);
        let guard = match lock.try_write() {
            Ok(guard) => guard,
            Err(err) if err.kind() == ErrorKind::WouldBlock => {
                return DownloadInProgressSnafu { path: output }.fail();
            }
            Err(source) => {
                return Err(DownloadError::FileWrite {
                    path: lock_path,
                    source,
                });
            }
        };

        let label = request.label.as_deref().unwrap_or(&request.url);
        debug!(url = %request.url, path = %output.display(), "downloading {label}");

        let transfer = self
            .single
            .download(&request, &self.part_path(&output))
            .await;

        drop(guard);
        if transfer.is_ok() {
            let _ = fs::remove_file(&lock_path).await;
        }
        let transfer = transfer?;

        let duration = start_time.until(Timestamp::now()).unwrap_or_default();
        info!(
            url = %request.url,
            size = transfer.size,
            resumed = transfer.resumed,
            "downloaded {label}"
        );

        Ok(DownloadResult {
            path: output,
            size: transfer.size,
            sha256: transfer.sha256,
            resumed: transfer.resumed,
            duration,
        })
    }

    /// Remove the partial and lock files left behind for `output_path`.
    pub async fn cleanup(&self, output_path: &Path) -> Result<(), DownloadError> {
        for path in [self.part_path(output_path), self.lock_path(output_path)] {
            match fs::remove_file(&path).await {
                Ok(()) => {}
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(source) => return Err(DownloadError::FileWrite { path, source }),
            }
        }
        Ok(())
    }

    /// Location of the in-flight file for `output_path`.
    #[must_use]
    pub fn part_path(&self, output_path: &Path) -> PathBuf {
        with_suffix(output_path, &self.config.partial_extension)
    }

    fn lock_path(&self, output_path: &Path) -> PathBuf { with_suffix(output_path, "lock") }

    fn build_client(config: &DownloaderConfig) -> Result<reqwest::Client, DownloadError> {
        let timeout = std::time::Duration::try_from(config.timeout)
            .unwrap_or(std::time::Duration::from_secs(30));

        let mut builder = reqwest::Client::builder().timeout(timeout);

        if let Some(ref ua) = config.user_agent {
            builder = builder.user_agent(ua);
        }

        builder.build().context(ClientSnafu)
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sidecar_files_keep_the_original_extension() {
        let downloader = Downloader::new(DownloaderConfig::default()).unwrap();
        let output = Path::new("/tmp/audio/minshawi/002255.mp3");
        assert_eq!(
            downloader.part_path(output),
            PathBuf::from("/tmp/audio/minshawi/002255.mp3.part")
        );
        assert_eq!(
            downloader.lock_path(output),
            PathBuf::from("/tmp/audio/minshawi/002255.mp3.lock")
        );
    }
}
