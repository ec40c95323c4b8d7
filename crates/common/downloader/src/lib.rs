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


//! HTTP downloader used to fill the local recitation cache.
//!
//! Every transfer streams into a `<file>.part` sibling which is renamed into
//! place once complete. An interrupted transfer leaves the partial file
//! behind and the next attempt for the same destination continues from its
//! length with a `Range` request.

mod config;
mod downloader;
mod error;
mod single_downloader;
mod types;

pub use config::DownloaderConfig;
pub use downloader::Downloader;
pub use error::DownloadError;
pub use types::{DownloadRequest, DownloadResult, ProgressCallback, TransferProgress};
