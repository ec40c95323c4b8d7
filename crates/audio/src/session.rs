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


//! The playback session behind a reading view.
//!
//! Commands (`play`, `pause`, `stop`, `set_repeat`) run on the caller's task.
//! State reported by the platform player arrives on a channel and is folded
//! into the session by a single event loop started with
//! [`SessionController::start`]. Stop-like reports only take effect once they
//! persist for the debounce delay, so the stop/start pair a player emits
//! between tracks never reaches observers.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use parking_lot::{Mutex, RwLock};
use tokio::{
    sync::{broadcast, mpsc},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    config::AudioConfig,
    download::DownloadOrchestrator,
    err::{AcquireError, SessionError, TagError},
    player::{AudioProvider, Notifier, ProviderState, Track},
    quran::{Ayah, PageIndex, title_for},
    reciter::Reciter,
    request::AudioRequest,
    settings::{SettingKey, Settings},
    state::{PlaybackState, SessionEvent, SessionSnapshot},
};

/// Message shown when the audio for a play request could not be fetched.
pub const DOWNLOAD_FAILED_MESSAGE: &str = "Something went wrong. Unable to download audio.";

const EVENT_CAPACITY: usize = 64;

/// What a play command ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum PlayOutcome {
    /// A paused track continued
    Resumed,
    /// A new track was handed to the player
    Started,
    /// Streaming is preferred but not available; nothing played
    Streaming,
    /// A download was already running; nothing played
    Busy,
    InvalidAyah,
    UnknownReciter,
    /// The user was told the download failed
    DownloadFailed,
}

#[derive(Debug, Default)]
struct SessionState {
    playback:     PlaybackState,
    page:         u16,
    selected:     Option<Ayah>,
    last_request: Option<AudioRequest>,
}

/// Drives one playback session.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<Inner>,
}

struct Inner {
    config:        AudioConfig,
    settings:      Settings,
    pages:         Arc<dyn PageIndex>,
    provider:      Arc<dyn AudioProvider>,
    notifier:      Arc<dyn Notifier>,
    downloads:     Arc<DownloadOrchestrator>,
    state:         RwLock<SessionState>,
    events:        broadcast::Sender<SessionEvent>,
    notifications: mpsc::UnboundedSender<ProviderState>,
    receiver:      Mutex<Option<mpsc::UnboundedReceiver<ProviderState>>>,
    /// Bumped on every Playing report; a delayed selection only lands if no
    /// newer report arrived meanwhile
    generation:    AtomicU64,
}

#[bon::bon]
impl SessionController {
    #[builder]
    pub fn new(
        #[builder(default)] config: AudioConfig,
        settings: Settings,
        pages: Arc<dyn PageIndex>,
        provider: Arc<dyn AudioProvider>,
        notifier: Arc<dyn Notifier>,
        downloads: Arc<DownloadOrchestrator>,
        #[builder(default = 1)] initial_page: u16,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (notifications, receiver) = mpsc::unbounded_channel();
        Self {
            inner: Arc::new(Inner {
                config,
                settings,
                pages,
                provider,
                notifier,
                downloads,
                state: RwLock::new(SessionState {
                    page: initial_page,
                    ..SessionState::default()
                }),
                events,
                notifications,
                receiver: Mutex::new(Some(receiver)),
                generation: AtomicU64::new(0),
            }),
        }
    }
}

impl SessionController {
    /// Channel the host forwards player state changes into.
    pub fn notifications(&self) -> mpsc::UnboundedSender<ProviderState> {
        self.inner.notifications.clone()
    }

    /// Starts the event loop. Returns `None` when it was already started.
    pub fn start(&self, cancel: CancellationToken) -> Option<JoinHandle<()>> {
        let receiver = self.inner.receiver.lock().take()?;
        let inner = Arc::clone(&self.inner);
        Some(tokio::spawn(inner.run(receiver, cancel)))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> { self.inner.events.subscribe() }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.inner.state.read();
        SessionSnapshot {
            playback:      state.playback,
            page:          state.page,
            selected_ayah: state.selected,
            download:      self.inner.downloads.progress(),
        }
    }

    /// Records the page the reader is looking at.
    pub fn set_page(&self, page: u16) { self.inner.update_page(page); }

    pub fn select_ayah(&self, ayah: Option<Ayah>) { self.inner.update_selection(ayah); }

    /// Resumes a paused track, or starts playing from the selected verse.
    /// Without a selection playback starts at the top of the displayed page,
    /// announcing a chapter that begins there with its basmala.
    pub async fn play(&self) -> Result<PlayOutcome, SessionError> {
        let inner = &self.inner;
        if inner.provider.state() == ProviderState::Paused {
            inner.provider.play();
            return Ok(PlayOutcome::Resumed);
        }

        let (selected, page) = {
            let state = inner.state.read();
            (state.selected, state.page)
        };
        let ayah = match selected {
            Some(ayah) => ayah,
            None => {
                let Some(bounds) = inner.pages.page_bounds(page) else {
                    debug!(page, "displayed page has no bounds");
                    return Ok(PlayOutcome::InvalidAyah);
                };
                if bounds.start.opens_with_bismillah() {
                    Ayah::bismillah(bounds.start.chapter)
                } else {
                    bounds.start
                }
            }
        };

        if !ayah.is_valid() {
            debug!(%ayah, "refusing to play invalid verse");
            return Ok(PlayOutcome::InvalidAyah);
        }
        self.play_from(ayah).await
    }

    /// Builds a request from the stored preferences and plays it.
    pub async fn play_from(&self, ayah: Ayah) -> Result<PlayOutcome, SessionError> {
        let inner = &self.inner;
        let name = inner.settings.active_reciter().await?;
        let Some(reciter) = inner.downloads.catalog().by_name(&name).cloned() else {
            warn!(reciter = %name, "active reciter is not in the catalog");
            return Ok(PlayOutcome::UnknownReciter);
        };

        let repeat = inner.settings.repeat_info().await?;
        let amount = inner.settings.download_amount().await?;
        let request = AudioRequest::new(reciter.id, ayah, repeat, amount, inner.pages.as_ref());
        let request = match request {
            Ok(request) => request,
            Err(err) => {
                debug!(error = %err, "not playing");
                return Ok(PlayOutcome::InvalidAyah);
            }
        };

        if inner.settings.prefer_streaming().await? {
            info!(%ayah, "streaming playback is not available yet, ignoring play request");
            return Ok(PlayOutcome::Streaming);
        }

        self.download_and_play(&reciter, request).await
    }

    pub fn pause(&self) { self.inner.provider.pause(); }

    pub fn stop(&self) { self.inner.provider.stop(); }

    /// Turns repeating on or off. A playing track restarts at its current
    /// position under the new policy.
    pub async fn set_repeat(&self, enabled: bool) -> Result<(), SessionError> {
        let inner = &self.inner;
        if inner.settings.audio_repeat().await? == enabled {
            return Ok(());
        }
        inner.settings.set(SettingKey::AudioRepeat, &enabled).await?;

        if inner.state.read().playback != PlaybackState::Playing {
            return Ok(());
        }

        let position = inner.provider.position();
        let playing = inner
            .provider
            .current_track()
            .and_then(|track| AudioRequest::from_tag(&track.tag).ok())
            .or_else(|| inner.state.read().last_request.clone());
        inner.provider.stop();

        let replay = match playing {
            Some(request) => {
                let reciter = inner.downloads.catalog().by_id(request.reciter_id).cloned();
                match reciter {
                    Some(reciter) => {
                        let repeat = inner.settings.repeat_info().await?;
                        self.download_and_play(&reciter, request.with_repeat(repeat))
                            .await?
                    }
                    None => self.play().await?,
                }
            }
            None => self.play().await?,
        };

        if replay == PlayOutcome::Started {
            inner.provider.set_position(position);
        }
        info!(enabled, outcome = %replay, "repeat toggled");
        Ok(())
    }

    async fn download_and_play(
        &self,
        reciter: &Reciter,
        request: AudioRequest,
    ) -> Result<PlayOutcome, SessionError> {
        let inner = &self.inner;
        if inner.downloads.is_downloading() {
            return Ok(PlayOutcome::Busy);
        }

        match inner.downloads.acquire(&request).await {
            Ok(()) => {}
            Err(AcquireError::Busy { .. }) => return Ok(PlayOutcome::Busy),
            Err(err) => {
                warn!(error = %err, "audio download failed");
                inner.notifier.show_error(DOWNLOAD_FAILED_MESSAGE);
                return Ok(PlayOutcome::DownloadFailed);
            }
        }

        let track = inner.track_for(reciter, &request)?;
        info!(reciter = %reciter.name, ayah = %request.current_ayah, "starting playback");
        inner.state.write().last_request = Some(request);
        inner.provider.set_track(track);
        Ok(PlayOutcome::Started)
    }
}

impl Inner {
    async fn run(
        self: Arc<Self>,
        mut notifications: mpsc::UnboundedReceiver<ProviderState>,
        cancel: CancellationToken,
    ) {
        let mut progress = self.downloads.subscribe();
        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                state = notifications.recv() => match state {
                    Some(state) => self.on_provider_state(state, &cancel),
                    None => break,
                },
                Ok(()) = progress.changed() => {
                    let snapshot = progress.borrow_and_update().clone();
                    self.emit(SessionEvent::DownloadProgress(snapshot));
                }
            }
        }
        debug!("session event loop stopped");
    }

    fn on_provider_state(self: &Arc<Self>, state: ProviderState, cancel: &CancellationToken) {
        debug!(%state, "player state changed");
        match state {
            ProviderState::Paused => self.update_playback(PlaybackState::Paused),
            ProviderState::Playing => {
                self.update_playback(PlaybackState::Playing);
                self.follow_current_track(cancel);
            }
            ProviderState::Stopped | ProviderState::Unknown | ProviderState::Error => {
                let inner = Arc::clone(self);
                let cancel = cancel.clone();
                tokio::spawn(async move {
                    tokio::select! {
                        () = cancel.cancelled() => {}
                        () = tokio::time::sleep(inner.config.stop_debounce) => {
                            if inner.provider.state().is_stop_like() {
                                inner.update_playback(PlaybackState::Stopped);
                            }
                        }
                    }
                });
            }
        }
    }

    /// Moves the page and selection to the verse the player is on.
    fn follow_current_track(self: &Arc<Self>, cancel: &CancellationToken) {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;

        let Some(track) = self.provider.current_track() else {
            return;
        };
        let request = match AudioRequest::from_tag(&track.tag) {
            Ok(request) => request,
            Err(err) => {
                debug!(error = %err, "ignoring track without a usable tag");
                return;
            }
        };

        let ayah = request.current_ayah.normalized();
        let page_changed = self
            .pages
            .page_for(ayah)
            .is_some_and(|page| self.update_page(page));

        if !page_changed {
            self.update_selection(Some(ayah));
            return;
        }

        let inner = Arc::clone(self);
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => {}
                () = tokio::time::sleep(inner.config.page_switch_delay) => {
                    if inner.generation.load(Ordering::Acquire) == generation {
                        inner.update_selection(Some(ayah));
                    }
                }
            }
        });
    }

    fn track_for(&self, reciter: &Reciter, request: &AudioRequest) -> Result<Track, TagError> {
        Ok(Track::builder()
            .uri(self.downloads.layout().local_file(reciter, request.current_ayah))
            .title(title_for(request.current_ayah))
            .artist(reciter.name.clone())
            .album(self.config.album.clone())
            .tag(request.to_tag()?)
            .build())
    }

    fn update_playback(&self, playback: PlaybackState) {
        {
            let mut state = self.state.write();
            if state.playback == playback {
                return;
            }
            state.playback = playback;
        }
        info!(%playback, "playback state changed");
        self.emit(SessionEvent::PlaybackStateChanged(playback));
    }

    fn update_page(&self, page: u16) -> bool {
        {
            let mut state = self.state.write();
            if state.page == page {
                return false;
            }
            state.page = page;
        }
        self.emit(SessionEvent::PageChanged(page));
        true
    }

    fn update_selection(&self, ayah: Option<Ayah>) {
        {
            let mut state = self.state.write();
            if state.selected == ayah {
                return;
            }
            state.selected = ayah;
        }
        self.emit(SessionEvent::SelectedAyahChanged(ayah));
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}
