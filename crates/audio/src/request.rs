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


use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use bon::Builder;
use serde::{Deserialize, Serialize};
use snafu::{OptionExt, ResultExt, ensure};

use crate::{
    err::{
        EncodeTagSnafu, ForeignTagSnafu, InvalidAyahSnafu, RequestError, TagAyahSnafu,
        TagEncodingSnafu, TagError, TagPayloadSnafu, UnsupportedTagVersionSnafu,
    },
    quran::{Ayah, PageIndex, chapter_end, is_valid, juz_end, juz_for},
    repeat::RepeatInfo,
};

const TAG_PREFIX: &str = "tilawa:";
const TAG_VERSION: &str = "v1";

/// How far ahead of the starting verse audio is fetched.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AudioDownloadAmount {
    /// Up to the last verse of the current page
    #[default]
    Page,
    /// Up to the last verse of the chapter
    Chapter,
    /// Up to the last verse of the juz
    Juz,
}

/// One play intent: who recites, where to start and how much to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
pub struct AudioRequest {
    pub reciter_id:      u32,
    /// Starting verse, possibly a basmala marker
    pub current_ayah:    Ayah,
    #[builder(default)]
    pub repeat:          RepeatInfo,
    pub from_ayah:       Ayah,
    pub to_ayah:         Ayah,
    #[builder(default)]
    pub download_amount: AudioDownloadAmount,
}

impl AudioRequest {
    /// Request starting at `current`, with the fetched range derived from
    /// `amount`. When the page layout does not know the verse the range
    /// falls back to the end of its chapter.
    pub fn new(
        reciter_id: u32,
        current: Ayah,
        repeat: RepeatInfo,
        amount: AudioDownloadAmount,
        pages: &dyn PageIndex,
    ) -> Result<Self, RequestError> {
        ensure!(is_valid(current), InvalidAyahSnafu { ayah: current });

        let from_ayah = current.normalized();
        let chapter_last = chapter_end(from_ayah.chapter).context(InvalidAyahSnafu { ayah: current })?;
        let to_ayah = match amount {
            AudioDownloadAmount::Page => pages
                .page_for(from_ayah)
                .and_then(|page| pages.page_bounds(page))
                .map(|bounds| bounds.end),
            AudioDownloadAmount::Chapter => None,
            AudioDownloadAmount::Juz => juz_for(from_ayah).and_then(juz_end),
        }
        .filter(|end| *end >= from_ayah)
        .unwrap_or(chapter_last);

        Ok(Self {
            reciter_id,
            current_ayah: current,
            repeat,
            from_ayah,
            to_ayah,
            download_amount: amount,
        })
    }

    /// Same request with a different repeat policy.
    #[must_use]
    pub const fn with_repeat(mut self, repeat: RepeatInfo) -> Self {
        self.repeat = repeat;
        self
    }

    /// Verses from `from_ayah` to `to_ayah` inclusive, in reading order.
    pub fn verses(&self) -> impl Iterator<Item = Ayah> + '_ {
        std::iter::successors(Some(self.from_ayah), |ayah| ayah.next())
            .take_while(|ayah| *ayah <= self.to_ayah)
    }

    /// Verses a repeat pass covers.
    #[must_use]
    pub fn repeat_span(&self) -> Option<(Ayah, Ayah)> {
        self.repeat
            .span(self.current_ayah, self.from_ayah, self.to_ayah)
    }

    /// Encodes the request as `tilawa:v1:<base64>` for use as track metadata.
    pub fn to_tag(&self) -> Result<String, TagError> {
        let payload = bincode::serde::encode_to_vec(self, bincode::config::standard())
            .context(EncodeTagSnafu)?;
        Ok(format!(
            "{TAG_PREFIX}{TAG_VERSION}:{}",
            URL_SAFE_NO_PAD.encode(payload)
        ))
    }

    /// Decodes a tag produced by [`AudioRequest::to_tag`].
    pub fn from_tag(tag: &str) -> Result<Self, TagError> {
        let rest = tag.strip_prefix(TAG_PREFIX).context(ForeignTagSnafu)?;
        let (version, payload) = rest.split_once(':').context(ForeignTagSnafu)?;
        ensure!(
            version == TAG_VERSION,
            UnsupportedTagVersionSnafu { version }
        );

        let bytes = URL_SAFE_NO_PAD.decode(payload).context(TagEncodingSnafu)?;
        let (request, _): (Self, usize) =
            bincode::serde::decode_from_slice(&bytes, bincode::config::standard())
                .context(TagPayloadSnafu)?;
        ensure!(
            is_valid(request.current_ayah),
            TagAyahSnafu {
                ayah: request.current_ayah,
            }
        );
        Ok(request)
    }
}
