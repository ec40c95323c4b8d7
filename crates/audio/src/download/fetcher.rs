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


use std::path::Path;

use async_trait::async_trait;
use tilawa_downloader::{DownloadError, DownloadRequest, Downloader, ProgressCallback};

/// Fetches one remote file to a local destination.
#[async_trait]
pub trait AudioFetcher: Send + Sync {
    async fn fetch(
        &self,
        url: &str,
        destination: &Path,
        label: &str,
        progress: ProgressCallback,
    ) -> Result<(), DownloadError>;
}

#[async_trait]
impl AudioFetcher for Downloader {
    async fn fetch(
        &self,
        url: &str,
        destination: &Path,
        label: &str,
        progress: ProgressCallback,
    ) -> Result<(), DownloadError> {
        let request = DownloadRequest::builder()
            .url(url)
            .output_path(destination)
            .label(label)
            .progress(progress)
            .build();
        self.download(request).await.map(|_| ())
    }
}
