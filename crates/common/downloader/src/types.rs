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


use std::{fmt, path::PathBuf, sync::Arc};

use bon::Builder;
use jiff::Span;

/// Bytes received so far for one transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    /// Bytes on disk for this file, including any resumed prefix
    pub downloaded: u64,
    /// Full size of the file, when the server announced it
    pub total:      Option<u64>,
}

impl TransferProgress {
    /// Completion in whole percent, clamped to 0..=100. Unknown totals report
    /// 0 until the transfer finishes.
    #[must_use]
    pub fn percent(&self) -> u8 {
        match self.total {
            Some(0) => 100,
            Some(total) => {
                let pct = self.downloaded.saturating_mul(100) / total;
                u8::try_from(pct.min(100)).unwrap_or(100)
            }
            None => 0,
        }
    }
}

/// Callback invoked as bytes arrive.
#[derive(Clone)]
pub struct ProgressCallback(Arc<dyn Fn(TransferProgress) + Send + Sync>);

impl ProgressCallback {
    pub fn new(f: impl Fn(TransferProgress) + Send + Sync + 'static) -> Self { Self(Arc::new(f)) }

    pub fn report(&self, progress: TransferProgress) { (self.0)(progress); }
}

impl fmt::Debug for ProgressCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("ProgressCallback") }
}

/// A request to download a file
#[derive(Debug, Clone, Builder)]
pub struct DownloadRequest {
    /// URL to download from
    #[builder(into)]
    pub url:         String,
    /// Path where the downloaded file should be saved
    #[builder(into)]
    pub output_path: PathBuf,
    /// Human readable name used in logs
    #[builder(into)]
    pub label:       Option<String>,
    /// Receives progress updates while the body streams in
    pub progress:    Option<ProgressCallback>,
}

/// Result of a successful download
#[derive(Debug, Clone)]
pub struct DownloadResult {
    /// Path where the file was saved
    pub path:     PathBuf,
    /// Size of the downloaded file in bytes
    pub size:     u64,
    /// SHA256 hash of the file (lowercase hex)
    pub sha256:   String,
    /// Whether the transfer continued from an existing partial file
    pub resumed:  bool,
    /// Total duration of the download operation
    pub duration: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_is_clamped() {
        let half = TransferProgress {
            downloaded: 50,
            total:      Some(100),
        };
        assert_eq!(half.percent(), 50);

        let over = TransferProgress {
            downloaded: 150,
            total:      Some(100),
        };
        assert_eq!(over.percent(), 100);

        let unknown = TransferProgress {
            downloaded: 10,
            total:      None,
        };
        assert_eq!(unknown.percent(), 0);

        let empty = TransferProgress {
            downloaded: 0,
            total:      Some(0),
        };
        assert_eq!(empty.percent(), 100);
    }
}
