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


use std::path::PathBuf;

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum DownloadError {
    #[snafu(display("Failed to build HTTP client: {source}"))]
    Client { source: reqwest::Error },

    #[snafu(display("Network error: {source}"))]
    Network { source: reqwest::Error },

    #[snafu(display("HTTP error {status} for URL: {url}"))]
    Http { status: u16, url: String },

    #[snafu(display("File write error at {}: {source}", path.display()))]
    FileWrite {
        path:   PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("File read error at {}: {source}", path.display()))]
    FileRead {
        path:   PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Download already in progress for {}", path.display()))]
    DownloadInProgress { path: PathBuf },

    #[snafu(display("Server sent {received} bytes for {url}, expected {expected}"))]
    Truncated {
        url:      String,
        expected: u64,
        received: u64,
    },
}

impl DownloadError {
    /// Whether retrying the same request later could succeed.
    ///
    /// Client errors (4xx) are permanent; everything else may be transient.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        !matches!(self, Self::Http { status, .. } if *status >= 400 && *status < 500)
    }
}
