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


use std::{num::ParseIntError, path::PathBuf};

use snafu::Snafu;
use tilawa_downloader::DownloadError;

use crate::{quran::Ayah, settings::SettingKey};

#[derive(Snafu, Debug)]
#[snafu(visibility(pub))]
pub enum ParseAyahError {
    #[snafu(display("Expected `chapter:verse`, got {input:?}"))]
    Format { input: String },
    #[snafu(display("Invalid number in {input:?}"))]
    Number {
        input:  String,
        source: ParseIntError,
    },
    #[snafu(display("Verse {ayah} does not exist"))]
    OutOfRange { ayah: Ayah },
}

#[derive(Snafu, Debug)]
#[snafu(visibility(pub))]
pub enum PageTableError {
    #[snafu(display("Page table has no pages"))]
    EmptyPageTable {
        #[snafu(implicit)]
        loc: snafu::Location,
    },
    #[snafu(display("First page must start at 1:1, got {start}"))]
    FirstPage {
        start: Ayah,
        #[snafu(implicit)]
        loc:   snafu::Location,
    },
    #[snafu(display("Page {page} starts at invalid verse {ayah}"))]
    InvalidPageStart {
        page: usize,
        ayah: Ayah,
        #[snafu(implicit)]
        loc:  snafu::Location,
    },
    #[snafu(display("Page {page} does not start after the page before it"))]
    UnorderedPages {
        page: usize,
        #[snafu(implicit)]
        loc:  snafu::Location,
    },
    #[snafu(display("Failed to read page table {}", path.display()))]
    ReadPageTable {
        path:   PathBuf,
        source: std::io::Error,
        #[snafu(implicit)]
        loc:    snafu::Location,
    },
    #[snafu(display("Malformed page table"))]
    ParsePageTable {
        source: serde_json::Error,
        #[snafu(implicit)]
        loc:    snafu::Location,
    },
}

#[derive(Snafu, Debug)]
#[snafu(visibility(pub))]
pub enum CatalogError {
    #[snafu(display("Failed to read reciter catalog {}", path.display()))]
    ReadCatalog {
        path:   PathBuf,
        source: std::io::Error,
        #[snafu(implicit)]
        loc:    snafu::Location,
    },
    #[snafu(display("Malformed reciter catalog"))]
    ParseCatalog {
        source: serde_json::Error,
        #[snafu(implicit)]
        loc:    snafu::Location,
    },
    #[snafu(display("Reciter id {id} is listed twice"))]
    DuplicateReciterId {
        id:  u32,
        #[snafu(implicit)]
        loc: snafu::Location,
    },
    #[snafu(display("Reciter name {name:?} is listed twice"))]
    DuplicateReciterName {
        name: String,
        #[snafu(implicit)]
        loc:  snafu::Location,
    },
    #[snafu(display("Gapless reciter {name:?} has no gapless database URL"))]
    MissingGaplessDatabase {
        name: String,
        #[snafu(implicit)]
        loc:  snafu::Location,
    },
    #[snafu(display("Reciter {name:?} has no server URL"))]
    EmptyServerUrl {
        name: String,
        #[snafu(implicit)]
        loc:  snafu::Location,
    },
}

#[derive(Snafu, Debug)]
#[snafu(visibility(pub))]
pub enum RequestError {
    #[snafu(display("Cannot build an audio request for invalid verse {ayah}"))]
    InvalidAyah {
        ayah: Ayah,
        #[snafu(implicit)]
        loc:  snafu::Location,
    },
}

/// Failures decoding the opaque tag attached to a track.
#[derive(Snafu, Debug)]
#[snafu(visibility(pub))]
pub enum TagError {
    #[snafu(display("Track tag was not written by tilawa"))]
    ForeignTag {
        #[snafu(implicit)]
        loc: snafu::Location,
    },
    #[snafu(display("Unsupported track tag version {version:?}"))]
    UnsupportedTagVersion {
        version: String,
        #[snafu(implicit)]
        loc:     snafu::Location,
    },
    #[snafu(display("Track tag is not valid base64"))]
    TagEncoding {
        source: base64::DecodeError,
        #[snafu(implicit)]
        loc:    snafu::Location,
    },
    #[snafu(display("Track tag payload is corrupt"))]
    TagPayload {
        source: bincode::error::DecodeError,
        #[snafu(implicit)]
        loc:    snafu::Location,
    },
    #[snafu(display("Track tag names invalid verse {ayah}"))]
    TagAyah {
        ayah: Ayah,
        #[snafu(implicit)]
        loc:  snafu::Location,
    },
    #[snafu(display("Failed to encode track tag"))]
    EncodeTag {
        source: bincode::error::EncodeError,
        #[snafu(implicit)]
        loc:    snafu::Location,
    },
}

#[derive(Snafu, Debug)]
#[snafu(visibility(pub))]
pub enum SettingsError {
    #[snafu(transparent)]
    Store {
        source: tilawa_store::err::Error,
        #[snafu(implicit)]
        loc:    snafu::Location,
    },
    #[snafu(display("Setting {key} holds a value of the wrong type"))]
    SettingCodec {
        key:    SettingKey,
        source: serde_json::Error,
        #[snafu(implicit)]
        loc:    snafu::Location,
    },
    #[snafu(display("{value:?} is not a valid value for setting {key}"))]
    InvalidSettingValue {
        key:   SettingKey,
        value: String,
        #[snafu(implicit)]
        loc:   snafu::Location,
    },
}

/// Failures of one asset acquisition attempt.
#[derive(Snafu, Debug)]
#[snafu(visibility(pub))]
pub enum AcquireError {
    #[snafu(display("Another download is already in progress"))]
    Busy {
        #[snafu(implicit)]
        loc: snafu::Location,
    },
    #[snafu(display("No reciter with id {id}"))]
    UnknownReciter {
        id:  u32,
        #[snafu(implicit)]
        loc: snafu::Location,
    },
    #[snafu(display("Failed to download the ayah position index"))]
    AyahIndexDownload {
        source: DownloadError,
        #[snafu(implicit)]
        loc:    snafu::Location,
    },
    #[snafu(display("Failed to download the gapless database of {reciter}"))]
    GaplessDatabaseDownload {
        reciter: String,
        source:  DownloadError,
        #[snafu(implicit)]
        loc:     snafu::Location,
    },
    #[snafu(display("Failed to download {url}"))]
    AudioFileDownload {
        url:    String,
        source: DownloadError,
        #[snafu(implicit)]
        loc:    snafu::Location,
    },
    #[snafu(display("Failed to create reciter directory {}", path.display()))]
    CreateReciterDir {
        path:   PathBuf,
        source: std::io::Error,
        #[snafu(implicit)]
        loc:    snafu::Location,
    },
}

#[derive(Snafu, Debug)]
#[snafu(visibility(pub))]
pub enum SessionError {
    #[snafu(transparent)]
    Settings {
        source: SettingsError,
        #[snafu(implicit)]
        loc:    snafu::Location,
    },
    #[snafu(transparent)]
    Tag {
        source: TagError,
        #[snafu(implicit)]
        loc:    snafu::Location,
    },
}
