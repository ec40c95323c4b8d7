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


mod common;

use std::time::Duration;

use common::{
    Call, FakeFetcher, Fixture, Gate, VERSE_RECITER, tagged_track,
};
use tilawa_audio::{
    AudioRequest, Ayah, DOWNLOAD_FAILED_MESSAGE, PlayOutcome, PlaybackState, ProviderState,
    RepeatAmount, RepeatCount, RepeatInfo, SessionEvent, SettingKey,
};
use tokio::{
    sync::broadcast::{self, error::TryRecvError},
    time::Instant,
};
use tokio_util::sync::CancellationToken;

async fn next_event(events: &mut broadcast::Receiver<SessionEvent>) -> SessionEvent {
    tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("no session event")
        .unwrap()
}

fn drain(events: &mut broadcast::Receiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut seen = Vec::new();
    loop {
        match events.try_recv() {
            Ok(event) => seen.push(event),
            Err(TryRecvError::Empty | TryRecvError::Closed) => return seen,
            Err(TryRecvError::Lagged(_)) => {}
        }
    }
}

fn started_request(fixture: &Fixture) -> AudioRequest {
    let track = fixture.provider.last_track().expect("no track was set");
    AudioRequest::from_tag(&track.tag).unwrap()
}

/// Runs the session loop and hands back its event stream.
fn start(fixture: &Fixture) -> (CancellationToken, broadcast::Receiver<SessionEvent>) {
    let cancel = CancellationToken::new();
    let events = fixture.controller.subscribe();
    fixture.controller.start(cancel.clone()).unwrap();
    (cancel, events)
}

fn report(fixture: &Fixture, state: ProviderState) {
    fixture.provider.set_state(state);
    fixture.controller.notifications().send(state).unwrap();
}

#[tokio::test(start_paused = true)]
async fn play_without_selection_starts_with_the_page_basmala() {
    let fixture = Fixture::new();
    fixture.controller.set_page(2);

    let outcome = fixture.controller.play().await.unwrap();

    assert_eq!(outcome, PlayOutcome::Started);
    let track = fixture.provider.last_track().unwrap();
    assert_eq!(track.title, "Bismillah");
    assert_eq!(track.artist, "Minshawi Murattal");
    assert_eq!(track.album, "Quran");
    assert!(track.uri.ends_with("001001.mp3"));

    let request = started_request(&fixture);
    assert_eq!(request.current_ayah, Ayah::bismillah(2));
    assert_eq!(request.from_ayah, Ayah::new(2, 1));
    assert_eq!(request.to_ayah, Ayah::new(2, 5));
}

#[tokio::test(start_paused = true)]
async fn first_page_starts_at_the_opening_verse() {
    let fixture = Fixture::new();

    assert_eq!(fixture.controller.play().await.unwrap(), PlayOutcome::Started);

    let track = fixture.provider.last_track().unwrap();
    assert_eq!(track.title, "Surah 1, Ayah 1");
    assert_eq!(started_request(&fixture).current_ayah, Ayah::FIRST);
}

#[tokio::test(start_paused = true)]
async fn selection_wins_over_the_displayed_page() {
    let fixture = Fixture::new();
    fixture.controller.set_page(2);
    fixture.controller.select_ayah(Some(Ayah::new(2, 7)));

    assert_eq!(fixture.controller.play().await.unwrap(), PlayOutcome::Started);

    let track = fixture.provider.last_track().unwrap();
    assert!(track.uri.ends_with("002007.mp3"));
    let request = started_request(&fixture);
    assert_eq!(request.current_ayah, Ayah::new(2, 7));
    assert_eq!(request.to_ayah, Ayah::new(2, 16));
}

#[tokio::test(start_paused = true)]
async fn paused_track_resumes_without_downloading() {
    let fixture = Fixture::new();
    fixture.provider.set_state(ProviderState::Paused);

    assert_eq!(fixture.controller.play().await.unwrap(), PlayOutcome::Resumed);
    assert_eq!(fixture.provider.calls(), vec![Call::Play]);
    assert!(fixture.fetcher.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn unknown_reciter_plays_nothing() {
    let fixture = Fixture::new();
    fixture
        .settings
        .set(SettingKey::ActiveReciter, "Nobody")
        .await
        .unwrap();

    assert_eq!(fixture.controller.play().await.unwrap(), PlayOutcome::UnknownReciter);
    assert!(fixture.provider.calls().is_empty());
    assert!(fixture.fetcher.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn streaming_preference_is_a_no_op() {
    let fixture = Fixture::new();
    fixture
        .settings
        .set(SettingKey::PreferStreaming, &true)
        .await
        .unwrap();

    assert_eq!(fixture.controller.play().await.unwrap(), PlayOutcome::Streaming);
    assert!(fixture.provider.calls().is_empty());
    assert!(fixture.fetcher.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn download_failure_is_reported_once() {
    let fixture = Fixture::new();
    fixture.fetcher.fail_on("ayahinfo");

    assert_eq!(fixture.controller.play().await.unwrap(), PlayOutcome::DownloadFailed);
    assert_eq!(fixture.notifier.messages(), vec![DOWNLOAD_FAILED_MESSAGE.to_string()]);
    assert!(fixture.provider.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn play_is_ignored_while_a_download_runs() {
    let (gate, started, release) = Gate::new();
    let fixture = Fixture::with_fetcher(FakeFetcher::gated(gate));

    let controller = fixture.controller.clone();
    let first = tokio::spawn(async move { controller.play().await });
    started.await.unwrap();

    assert_eq!(fixture.controller.play().await.unwrap(), PlayOutcome::Busy);

    release.notify_one();
    assert_eq!(first.await.unwrap().unwrap(), PlayOutcome::Started);
    assert_eq!(
        fixture
            .provider
            .calls()
            .iter()
            .filter(|call| matches!(call, Call::SetTrack(_)))
            .count(),
        1
    );
}

#[tokio::test(start_paused = true)]
async fn toggling_repeat_restarts_the_track_at_its_position() {
    let fixture = Fixture::new();
    let (_cancel, mut events) = start(&fixture);
    fixture
        .settings
        .set(SettingKey::RepeatAmount, &RepeatAmount::Verse)
        .await
        .unwrap();
    fixture.controller.set_page(2);

    fixture.controller.play().await.unwrap();
    let before = started_request(&fixture);
    assert!(!before.repeat.is_active());
    report(&fixture, ProviderState::Playing);
    while next_event(&mut events).await != SessionEvent::PlaybackStateChanged(PlaybackState::Playing) {}

    fixture.provider.seek(Duration::from_secs(42));
    fixture.provider.clear_calls();
    fixture.controller.set_repeat(true).await.unwrap();

    let calls = fixture.provider.calls();
    assert_eq!(calls.len(), 3, "{calls:?}");
    assert_eq!(calls[0], Call::Stop);
    assert!(matches!(calls[1], Call::SetTrack(_)));
    assert_eq!(calls[2], Call::SetPosition(Duration::from_secs(42)));

    let after = started_request(&fixture);
    assert_eq!(after.current_ayah, before.current_ayah);
    assert_eq!(after.to_ayah, before.to_ayah);
    assert_eq!(after.repeat, RepeatInfo {
        amount: RepeatAmount::Verse,
        count:  RepeatCount::Times(1),
    });
    assert!(fixture.settings.audio_repeat().await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn toggling_repeat_while_idle_only_saves_it() {
    let fixture = Fixture::new();

    fixture.controller.set_repeat(true).await.unwrap();
    fixture.controller.set_repeat(true).await.unwrap();

    assert!(fixture.settings.audio_repeat().await.unwrap());
    assert!(fixture.provider.calls().is_empty());
    assert!(fixture.fetcher.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn brief_stop_between_tracks_is_not_reported() {
    let fixture = Fixture::new();
    let (_cancel, mut events) = start(&fixture);

    report(&fixture, ProviderState::Playing);
    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::PlaybackStateChanged(PlaybackState::Playing)
    );

    report(&fixture, ProviderState::Stopped);
    tokio::time::sleep(Duration::from_millis(200)).await;
    report(&fixture, ProviderState::Playing);
    tokio::time::sleep(Duration::from_millis(600)).await;

    assert_eq!(fixture.controller.snapshot().playback, PlaybackState::Playing);
    assert!(drain(&mut events).is_empty());
}

#[tokio::test(start_paused = true)]
async fn lasting_stop_is_reported_after_the_debounce() {
    let fixture = Fixture::new();
    let (_cancel, mut events) = start(&fixture);

    report(&fixture, ProviderState::Playing);
    next_event(&mut events).await;

    let stopped_at = Instant::now();
    report(&fixture, ProviderState::Error);
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(fixture.controller.snapshot().playback, PlaybackState::Playing);

    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::PlaybackStateChanged(PlaybackState::Stopped)
    );
    assert!(stopped_at.elapsed() >= Duration::from_millis(500));
}

#[tokio::test(start_paused = true)]
async fn pause_is_reported_immediately() {
    let fixture = Fixture::new();
    let (_cancel, mut events) = start(&fixture);

    report(&fixture, ProviderState::Paused);

    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::PlaybackStateChanged(PlaybackState::Paused)
    );
}

#[tokio::test(start_paused = true)]
async fn foreign_track_keeps_the_selection() {
    let fixture = Fixture::new();
    fixture.controller.select_ayah(Some(Ayah::new(2, 7)));
    let (_cancel, mut events) = start(&fixture);

    fixture.provider.load(Some(tagged_track("some-other-app")));
    report(&fixture, ProviderState::Playing);
    tokio::time::sleep(Duration::from_secs(1)).await;

    let snapshot = fixture.controller.snapshot();
    assert_eq!(snapshot.selected_ayah, Some(Ayah::new(2, 7)));
    assert_eq!(snapshot.page, 1);
    assert_eq!(drain(&mut events), vec![SessionEvent::PlaybackStateChanged(
        PlaybackState::Playing
    )]);
}

#[tokio::test(start_paused = true)]
async fn track_on_another_page_switches_page_before_selecting() {
    let fixture = Fixture::new();
    let (_cancel, mut events) = start(&fixture);
    let tag = fixture
        .request(VERSE_RECITER, Ayah::new(2, 7))
        .to_tag()
        .unwrap();

    let reported_at = Instant::now();
    fixture.provider.load(Some(tagged_track(tag)));
    report(&fixture, ProviderState::Playing);

    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::PlaybackStateChanged(PlaybackState::Playing)
    );
    assert_eq!(next_event(&mut events).await, SessionEvent::PageChanged(3));
    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::SelectedAyahChanged(Some(Ayah::new(2, 7)))
    );
    assert!(reported_at.elapsed() >= Duration::from_millis(500));
}

#[tokio::test(start_paused = true)]
async fn basmala_track_selects_the_first_verse() {
    let fixture = Fixture::new();
    fixture.controller.set_page(2);
    let (_cancel, mut events) = start(&fixture);
    let tag = fixture
        .request(VERSE_RECITER, Ayah::bismillah(2))
        .to_tag()
        .unwrap();

    fixture.provider.load(Some(tagged_track(tag)));
    report(&fixture, ProviderState::Playing);

    next_event(&mut events).await;
    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::SelectedAyahChanged(Some(Ayah::new(2, 1)))
    );
}

#[tokio::test(start_paused = true)]
async fn newer_track_supersedes_a_pending_selection() {
    let fixture = Fixture::new();
    let (_cancel, mut events) = start(&fixture);
    let first = fixture
        .request(VERSE_RECITER, Ayah::new(2, 7))
        .to_tag()
        .unwrap();
    let second = fixture
        .request(VERSE_RECITER, Ayah::new(2, 17))
        .to_tag()
        .unwrap();

    fixture.provider.load(Some(tagged_track(first)));
    report(&fixture, ProviderState::Playing);
    tokio::time::sleep(Duration::from_millis(100)).await;
    fixture.provider.load(Some(tagged_track(second)));
    report(&fixture, ProviderState::Playing);
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(drain(&mut events), vec![
        SessionEvent::PlaybackStateChanged(PlaybackState::Playing),
        SessionEvent::PageChanged(3),
        SessionEvent::PageChanged(4),
        SessionEvent::SelectedAyahChanged(Some(Ayah::new(2, 17))),
    ]);
    let snapshot = fixture.controller.snapshot();
    assert_eq!(snapshot.page, 4);
    assert_eq!(snapshot.selected_ayah, Some(Ayah::new(2, 17)));
}

#[tokio::test(start_paused = true)]
async fn track_on_the_displayed_page_selects_immediately() {
    let fixture = Fixture::new();
    fixture.controller.set_page(3);
    let (_cancel, mut events) = start(&fixture);
    let tag = fixture
        .request(VERSE_RECITER, Ayah::new(2, 7))
        .to_tag()
        .unwrap();

    let reported_at = Instant::now();
    fixture.provider.load(Some(tagged_track(tag)));
    report(&fixture, ProviderState::Playing);

    next_event(&mut events).await;
    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::SelectedAyahChanged(Some(Ayah::new(2, 7)))
    );
    assert_eq!(reported_at.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn download_progress_reaches_subscribers() {
    let (gate, started, release) = Gate::new();
    let fixture = Fixture::with_fetcher(FakeFetcher::gated(gate));
    let (_cancel, mut events) = start(&fixture);

    let controller = fixture.controller.clone();
    let playing = tokio::spawn(async move { controller.play().await });
    started.await.unwrap();

    let SessionEvent::DownloadProgress(progress) = next_event(&mut events).await else {
        panic!("expected a progress event");
    };
    assert!(progress.is_downloading);
    assert!(fixture.controller.snapshot().download.is_downloading);

    release.notify_one();
    assert_eq!(playing.await.unwrap().unwrap(), PlayOutcome::Started);
    loop {
        if let SessionEvent::DownloadProgress(progress) = next_event(&mut events).await {
            if !progress.is_downloading {
                break;
            }
        }
    }
    assert!(!fixture.controller.snapshot().download.is_downloading);
}
