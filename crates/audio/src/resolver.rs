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


//! Decides which files a request needs and which of them are missing.

use std::path::{Path, PathBuf};

use tilawa_paths::file_exists;

use crate::{quran::Ayah, reciter::Reciter, request::AudioRequest};

/// What must be downloaded before a request can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AssetPlan {
    pub needs_ayah_index: bool,
    pub needs_gapless_db: bool,
    pub needs_range:      bool,
}

impl AssetPlan {
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        !(self.needs_ayah_index || self.needs_gapless_db || self.needs_range)
    }
}

/// One recording of a reciter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFile {
    /// First verse the file covers
    pub ayah: Ayah,
    pub url:  String,
    pub path: PathBuf,
}

/// On-disk and remote naming of every asset.
///
/// Per-verse recordings are named `SSSAAA.<ext>` and gapless recordings
/// `SSS.<ext>`, both inside the reciter's directory and below its server URL.
#[derive(Debug, Clone)]
pub struct AudioLayout {
    ayah_index_path: PathBuf,
    extension:       String,
}

impl AudioLayout {
    pub fn new(ayah_index_path: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            ayah_index_path: ayah_index_path.into(),
            extension:       extension.into(),
        }
    }

    pub fn ayah_index_path(&self) -> &Path { &self.ayah_index_path }

    /// Local copy of the reciter's gapless timing database, named after the
    /// last segment of its URL.
    #[must_use]
    pub fn gapless_database_path(&self, reciter: &Reciter) -> Option<PathBuf> {
        if !reciter.gapless {
            return None;
        }
        let url = reciter.gapless_database_url.as_deref()?;
        let name = url
            .split(['?', '#'])
            .next()
            .unwrap_or(url)
            .rsplit('/')
            .find(|segment| !segment.is_empty())?;
        Some(reciter.local_path.join(name))
    }

    /// File name of the recording that contains `ayah`.
    #[must_use]
    pub fn file_name(&self, reciter: &Reciter, ayah: Ayah) -> String {
        let ayah = ayah.audio_ayah();
        if reciter.gapless {
            format!("{:03}.{}", ayah.chapter, self.extension)
        } else {
            format!("{:03}{:03}.{}", ayah.chapter, ayah.verse, self.extension)
        }
    }

    #[must_use]
    pub fn local_file(&self, reciter: &Reciter, ayah: Ayah) -> PathBuf {
        reciter.local_path.join(self.file_name(reciter, ayah))
    }

    #[must_use]
    pub fn remote_url(&self, reciter: &Reciter, ayah: Ayah) -> String {
        let base = &reciter.server_url;
        let name = self.file_name(reciter, ayah);
        if base.ends_with('/') {
            format!("{base}{name}")
        } else {
            format!("{base}/{name}")
        }
    }

    /// Every recording needed to play `request`, in playback order and
    /// without duplicates. A basmala start also needs the recording of 1:1.
    #[must_use]
    pub fn required_files(&self, reciter: &Reciter, request: &AudioRequest) -> Vec<AudioFile> {
        let mut files: Vec<AudioFile> = Vec::new();
        let mut push = |ayah: Ayah| {
            let path = self.local_file(reciter, ayah);
            if files.iter().all(|f| f.path != path) {
                files.push(AudioFile {
                    ayah: ayah.audio_ayah(),
                    url: self.remote_url(reciter, ayah),
                    path,
                });
            }
        };

        if request.current_ayah.is_bismillah() {
            push(request.current_ayah);
        }
        if reciter.gapless {
            for chapter in request.from_ayah.chapter..=request.to_ayah.chapter {
                push(Ayah::new(chapter, 1));
            }
        } else {
            request.verses().for_each(&mut push);
        }
        files
    }

    /// Required recordings that are not cached yet.
    #[must_use]
    pub fn missing_files(&self, reciter: &Reciter, request: &AudioRequest) -> Vec<AudioFile> {
        self.required_files(reciter, request)
            .into_iter()
            .filter(|file| !file_exists(&file.path))
            .collect()
    }

    /// Presence check for every asset `request` depends on.
    #[must_use]
    pub fn resolve(&self, reciter: &Reciter, request: &AudioRequest) -> AssetPlan {
        AssetPlan {
            needs_ayah_index: !file_exists(&self.ayah_index_path),
            needs_gapless_db: self
                .gapless_database_path(reciter)
                .is_some_and(|path| !file_exists(path)),
            needs_range:      !self.missing_files(reciter, request).is_empty(),
        }
    }
}
