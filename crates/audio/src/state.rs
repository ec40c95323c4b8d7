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


use crate::quran::Ayah;

/// Playback state as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
    /// Nothing reported by the player yet
    #[default]
    Unknown,
}

/// Progress of the running asset download, idle when none is running.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DownloadProgress {
    pub is_downloading: bool,
    /// 0..=100 across the whole step
    pub percent:        u8,
    pub label:          Option<String>,
}

/// Point-in-time view of a playback session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub playback:      PlaybackState,
    /// Displayed page, numbered from 1
    pub page:          u16,
    pub selected_ayah: Option<Ayah>,
    pub download:      DownloadProgress,
}

/// Changes published by a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    PlaybackStateChanged(PlaybackState),
    PageChanged(u16),
    SelectedAyahChanged(Option<Ayah>),
    DownloadProgress(DownloadProgress),
}
