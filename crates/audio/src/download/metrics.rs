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


use std::sync::LazyLock;

use prometheus::{
    IntCounter, IntCounterVec, IntGauge, register_int_counter, register_int_counter_vec,
    register_int_gauge,
};

pub const STEP_LABEL: &str = "step";

pub static DOWNLOAD_STEPS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "tilawa_audio_download_steps_total",
        "Total number of asset download steps started",
        &[STEP_LABEL]
    )
    .unwrap()
});

pub static DOWNLOAD_FAILURES: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "tilawa_audio_download_failures_total",
        "Total number of asset download steps that failed",
        &[STEP_LABEL]
    )
    .unwrap()
});

pub static DOWNLOADED_FILES: LazyLock<IntCounter> = LazyLock::new(|| {
    register_int_counter!(
        "tilawa_audio_downloaded_files_total",
        "Total number of files fetched into the audio cache"
    )
    .unwrap()
});

pub static DOWNLOAD_ACTIVE: LazyLock<IntGauge> = LazyLock::new(|| {
    register_int_gauge!(
        "tilawa_audio_download_active",
        "Whether an asset download is currently running (1) or not (0)"
    )
    .unwrap()
});
