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


//! Seams to the host platform: the audio player and the error dialog.

use std::{path::PathBuf, time::Duration};

use bon::Builder;

/// State reported by the platform player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum ProviderState {
    Stopped,
    Playing,
    Paused,
    Unknown,
    Error,
}

impl ProviderState {
    /// States that end up as Stopped once they persist.
    #[must_use]
    pub const fn is_stop_like(self) -> bool {
        matches!(self, Self::Stopped | Self::Unknown | Self::Error)
    }
}

/// Track handed to the player.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct Track {
    #[builder(into)]
    pub uri:     PathBuf,
    #[builder(into)]
    pub title:   String,
    #[builder(into)]
    pub artist:  String,
    #[builder(into)]
    pub album:   String,
    #[builder(into)]
    pub artwork: Option<String>,
    /// Opaque metadata the player hands back with the current track
    #[builder(into)]
    pub tag:     String,
}

/// The platform audio player.
///
/// State changes are not polled: the host forwards every change of
/// [`AudioProvider::state`] into the session's notification channel.
pub trait AudioProvider: Send + Sync {
    fn play(&self);

    fn pause(&self);

    fn stop(&self);

    /// Loads `track` and starts playing it.
    fn set_track(&self, track: Track);

    fn position(&self) -> Duration;

    fn set_position(&self, position: Duration);

    fn state(&self) -> ProviderState;

    fn current_track(&self) -> Option<Track>;
}

/// Surfaces errors to the user.
pub trait Notifier: Send + Sync {
    fn show_error(&self, message: &str);
}

/// Notifier for hosts without a UI; errors only reach the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show_error(&self, message: &str) {
        tracing::error!("{message}");
    }
}
