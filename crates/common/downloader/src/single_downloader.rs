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

use futures::StreamExt;
use reqwest::{StatusCode, header::RANGE};
use sha2::{Digest, Sha256};
use snafu::{ResultExt, ensure};
use tokio::{
    fs::{self, File, OpenOptions},
    io::{AsyncReadExt, AsyncWriteExt},
};
use tracing::debug;

use crate::{
    error::{DownloadError, FileReadSnafu, FileWriteSnafu, HttpSnafu, NetworkSnafu, TruncatedSnafu},
    types::{DownloadRequest, TransferProgress},
};

/// Outcome of streaming one body into a partial file.
pub(crate) struct Transfer {
    pub size:    u64,
    pub sha256:  String,
    pub resumed: bool,
}

/// Streams a single response body to disk, continuing from an existing
/// partial file when the server honours `Range`.
pub(crate) struct SingleThreadDownloader {
    client: reqwest::Client,
    resume: bool,
}

impl SingleThreadDownloader {
    pub const fn new(client: reqwest::Client, resume: bool) -> Self { Self { client, resume } }

    /// Download `request.url` into `part_path` and rename it to
    /// `request.output_path` once the body is complete.
    pub async fn download(
        &self,
        request: &DownloadRequest,
        part_path: &Path,
    ) -> Result<Transfer, DownloadError> {
        let mut offset = if self.resume {
            partial_len(part_path).await
        } else {
            0
        };

        let response = loop {
            let response = self.send(&request.url, offset).await?;
            if offset > 0 && response.status() == StatusCode::RANGE_NOT_SATISFIABLE {
                debug!(url = %request.url, offset, "partial file rejected by server, starting over");
                fs::remove_file(part_path).await.context(FileWriteSnafu { path: part_path })?;
                offset = 0;
                continue;
            }
            break response;
        };

        ensure!(
            response.status().is_success(),
            HttpSnafu {
                status: response.status().as_u16(),
                url:    &request.url,
            }
        );

        let resumed = offset > 0 && response.status() == StatusCode::PARTIAL_CONTENT;
        let mut hasher = Sha256::new();
        let (mut file, mut downloaded) = if resumed {
            let seeded = hash_existing(part_path, &mut hasher).await?;
            let file = OpenOptions::new()
                .append(true)
                .open(part_path)
                .await
                .context(FileWriteSnafu { path: part_path })?;
            (file, seeded)
        } else {
            let file = File::create(part_path)
                .await
                .context(FileWriteSnafu { path: part_path })?;
            (file, 0)
        };
        if resumed {
            debug!(url = %request.url, offset = downloaded, "resuming partial download");
        }

        let total = response.content_length().map(|len| len + downloaded);
        let report = |downloaded| {
            if let Some(progress) = &request.progress {
                progress.report(TransferProgress { downloaded, total });
            }
        };
        report(downloaded);

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.context(NetworkSnafu)?;
            file.write_all(&chunk)
                .await
                .context(FileWriteSnafu { path: part_path })?;
            hasher.update(&chunk);
            downloaded += chunk.len() as u64;
            report(downloaded);
        }

        file.sync_all()
            .await
            .context(FileWriteSnafu { path: part_path })?;
        drop(file);

        // Short bodies stay behind as partial files for the next attempt.
        if let Some(expected) = total {
            ensure!(
                downloaded == expected,
                TruncatedSnafu {
                    url: &request.url,
                    expected,
                    received: downloaded,
                }
            );
        }

        fs::rename(part_path, &request.output_path)
            .await
            .context(FileWriteSnafu {
                path: &request.output_path,
            })?;

        Ok(Transfer {
            size: downloaded,
            sha256: format!("{:x}", hasher.finalize()),
            resumed,
        })
    }

    async fn send(&self, url: &str, offset: u64) -> Result<reqwest::Response, DownloadError> {
        let mut builder = self.client.get(url);
        if offset > 0 {
            builder = builder.header(RANGE, format!("bytes={offset}-"));
        }
        builder.send().await.context(NetworkSnafu)
    }
}

async fn partial_len(path: &Path) -> u64 {
    fs::metadata(path)
        .await
        .map(|meta| if meta.is_file() { meta.len() } else { 0 })
        .unwrap_or(0)
}

async fn hash_existing(path: &Path, hasher: &mut Sha256) -> Result<u64, DownloadError> {
    let mut file = File::open(path).await.context(FileReadSnafu { path })?;
    let mut buf = vec![0u8; 64 * 1024];
    let mut read_total = 0u64;
    loop {
        let n = file.read(&mut buf).await.context(FileReadSnafu { path })?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        read_total += n as u64;
    }
    Ok(read_total)
}
