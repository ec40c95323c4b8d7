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


use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::quran::{Ayah, chapter_end};

/// What a repeat applies to.
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
pub enum RepeatAmount {
    #[default]
    None,
    Verse,
    Range,
    Chapter,
}

/// How many extra passes a repeat makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatCount {
    Times(u32),
    Forever,
}

impl Default for RepeatCount {
    fn default() -> Self { Self::Times(1) }
}

impl fmt::Display for RepeatCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Times(n) => write!(f, "{n}"),
            Self::Forever => f.write_str("forever"),
        }
    }
}

impl FromStr for RepeatCount {
    type Err = std::num::ParseIntError;

    /// Accepts a number of repeats or `forever`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("forever") {
            return Ok(Self::Forever);
        }
        s.parse().map(Self::Times)
    }
}

/// Repeat policy attached to an audio request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RepeatInfo {
    pub amount: RepeatAmount,
    pub count:  RepeatCount,
}

impl RepeatInfo {
    /// Policy for the stored preferences. Nothing repeats unless repeating is
    /// switched on.
    #[must_use]
    pub fn from_preferences(enabled: bool, amount: RepeatAmount, count: RepeatCount) -> Self {
        if enabled {
            Self { amount, count }
        } else {
            Self::default()
        }
    }

    #[must_use]
    pub const fn is_active(&self) -> bool { !matches!(self.amount, RepeatAmount::None) }

    /// Verses a repeat pass covers, given the verse being played and the
    /// request's range.
    #[must_use]
    pub fn span(&self, current: Ayah, from: Ayah, to: Ayah) -> Option<(Ayah, Ayah)> {
        match self.amount {
            RepeatAmount::None => None,
            RepeatAmount::Verse => {
                let verse = current.normalized();
                Some((verse, verse))
            }
            RepeatAmount::Range => Some((from, to)),
            RepeatAmount::Chapter => {
                let chapter = current.chapter;
                Some((Ayah::new(chapter, 1), chapter_end(chapter)?))
            }
        }
    }

    /// Whether another pass is due after `completed_passes` full passes. The
    /// first play counts as a pass, so `Times(n)` plays the span `n + 1`
    /// times.
    #[must_use]
    pub fn has_more(&self, completed_passes: u32) -> bool {
        if !self.is_active() {
            return false;
        }
        match self.count {
            RepeatCount::Times(n) => completed_passes <= n,
            RepeatCount::Forever => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_preferences_never_repeat() {
        let repeat = RepeatInfo::from_preferences(false, RepeatAmount::Chapter, RepeatCount::Forever);
        assert_eq!(repeat, RepeatInfo::default());
        assert!(!repeat.is_active());
        assert!(!repeat.has_more(0));
    }

    #[test]
    fn spans_follow_amount() {
        let current = Ayah::new(2, 255);
        let from = Ayah::new(2, 253);
        let to = Ayah::new(2, 257);
        let with = |amount| RepeatInfo::from_preferences(true, amount, RepeatCount::Times(2));

        assert_eq!(with(RepeatAmount::None).span(current, from, to), None);
        assert_eq!(
            with(RepeatAmount::Verse).span(current, from, to),
            Some((current, current))
        );
        assert_eq!(
            with(RepeatAmount::Range).span(current, from, to),
            Some((from, to))
        );
        assert_eq!(
            with(RepeatAmount::Chapter).span(current, from, to),
            Some((Ayah::new(2, 1), Ayah::new(2, 286)))
        );
        assert_eq!(
            with(RepeatAmount::Verse).span(Ayah::bismillah(3), from, to),
            Some((Ayah::new(3, 1), Ayah::new(3, 1)))
        );
    }

    #[test]
    fn counts_passes() {
        let twice = RepeatInfo::from_preferences(true, RepeatAmount::Verse, RepeatCount::Times(1));
        assert!(twice.has_more(1));
        assert!(!twice.has_more(2));

        let forever = RepeatInfo::from_preferences(true, RepeatAmount::Range, RepeatCount::Forever);
        assert!(forever.has_more(u32::MAX));
    }

    #[test]
    fn count_parses_from_text() {
        assert_eq!("3".parse::<RepeatCount>().unwrap(), RepeatCount::Times(3));
        assert_eq!("Forever".parse::<RepeatCount>().unwrap(), RepeatCount::Forever);
        assert!("often".parse::<RepeatCount>().is_err());
        assert_eq!(RepeatCount::Forever.to_string(), "forever");
        assert_eq!("chapter".parse::<RepeatAmount>().unwrap(), RepeatAmount::Chapter);
    }
}
