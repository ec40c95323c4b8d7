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


use std::str::FromStr;

use serde::{Deserialize, Serialize};
use snafu::{OptionExt, ResultExt};

use crate::err::{FormatSnafu, NumberSnafu, OutOfRangeSnafu, ParseAyahError};

/// Number of chapters in the Quran.
pub const CHAPTER_COUNT: u16 = 114;

/// Total number of verses across all chapters.
pub const VERSE_TOTAL: u32 = 6236;

/// Chapter that opens without a basmala.
pub const CHAPTER_TAWBA: u16 = 9;

const VERSE_COUNTS: [u16; CHAPTER_COUNT as usize] = [
    7, 286, 200, 176, 120, 165, 206, 75, 129, 109, 123, 111, 43, 52, 99, 128, 111, 110, 98, 135,
    112, 78, 118, 64, 77, 227, 93, 88, 69, 60, 34, 30, 73, 54, 45, 83, 182, 88, 75, 85, 54, 53, 89,
    59, 37, 35, 38, 29, 18, 45, 60, 49, 62, 55, 78, 96, 29, 22, 24, 13, 14, 11, 11, 18, 12, 12, 30,
    52, 52, 44, 28, 28, 20, 56, 40, 31, 50, 40, 46, 42, 29, 19, 36, 25, 22, 17, 19, 26, 30, 20, 15,
    21, 11, 8, 8, 19, 5, 8, 8, 11, 11, 8, 3, 9, 5, 4, 7, 3, 6, 3, 5, 4, 5, 6,
];

/// A verse reference. Verse `0` marks the basmala recited before a chapter.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display("{chapter}:{verse}")]
pub struct Ayah {
    pub chapter: u16,
    pub verse:   u16,
}

impl Ayah {
    pub const FIRST: Self = Self::new(1, 1);
    pub const LAST: Self = Self::new(114, 6);

    #[must_use]
    pub const fn new(chapter: u16, verse: u16) -> Self { Self { chapter, verse } }

    /// The basmala marker of `chapter`.
    #[must_use]
    pub const fn bismillah(chapter: u16) -> Self { Self::new(chapter, 0) }

    #[must_use]
    pub const fn is_bismillah(&self) -> bool { self.verse == 0 }

    #[must_use]
    pub fn is_valid(&self) -> bool { is_valid(*self) }

    /// First real verse this reference stands for: the basmala marker becomes
    /// verse 1 of the same chapter.
    #[must_use]
    pub const fn normalized(&self) -> Self {
        if self.verse == 0 {
            Self::new(self.chapter, 1)
        } else {
            *self
        }
    }

    /// The verse whose recording is played for this reference. Every basmala
    /// is served by the recording of 1:1.
    #[must_use]
    pub const fn audio_ayah(&self) -> Self {
        if self.verse == 0 { Self::FIRST } else { *self }
    }

    /// Whether a chapter starting at this verse is announced with a basmala
    /// marker before its first verse.
    #[must_use]
    pub const fn opens_with_bismillah(&self) -> bool {
        self.verse == 1 && self.chapter != 1 && self.chapter != CHAPTER_TAWBA
    }

    /// Following verse in reading order, crossing chapter boundaries.
    #[must_use]
    pub fn next(&self) -> Option<Self> {
        let count = verse_count(self.chapter)?;
        if self.verse < count {
            Some(Self::new(self.chapter, self.verse + 1))
        } else if self.chapter < CHAPTER_COUNT {
            Some(Self::new(self.chapter + 1, 1))
        } else {
            None
        }
    }

    /// Preceding verse in reading order, crossing chapter boundaries.
    #[must_use]
    pub fn prev(&self) -> Option<Self> {
        if self.verse > 1 {
            Some(Self::new(self.chapter, self.verse - 1))
        } else if self.chapter > 1 {
            chapter_end(self.chapter - 1)
        } else {
            None
        }
    }
}

impl FromStr for Ayah {
    type Err = ParseAyahError;

    /// Parses `chapter:verse`, e.g. `2:255`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (chapter, verse) = s.trim().split_once(':').context(FormatSnafu { input: s })?;
        let chapter = chapter.parse().context(NumberSnafu { input: s })?;
        let verse = verse.parse().context(NumberSnafu { input: s })?;
        let ayah = Self::new(chapter, verse);
        snafu::ensure!(ayah.is_valid(), OutOfRangeSnafu { ayah });
        Ok(ayah)
    }
}

/// Verses in `chapter`, or `None` outside 1..=114.
#[must_use]
pub fn verse_count(chapter: u16) -> Option<u16> {
    let index = usize::from(chapter.checked_sub(1)?);
    VERSE_COUNTS.get(index).copied()
}

/// Whether `ayah` names an existing verse or a chapter's basmala marker.
#[must_use]
pub fn is_valid(ayah: Ayah) -> bool {
    verse_count(ayah.chapter).is_some_and(|count| ayah.verse <= count)
}

/// Last verse of `chapter`.
#[must_use]
pub fn chapter_end(chapter: u16) -> Option<Ayah> {
    verse_count(chapter).map(|count| Ayah::new(chapter, count))
}

/// Display title of a verse used for track metadata.
#[must_use]
pub fn title_for(ayah: Ayah) -> String {
    if ayah.is_bismillah() {
        "Bismillah".to_string()
    } else {
        format!("Surah {}, Ayah {}", ayah.chapter, ayah.verse)
    }
}
