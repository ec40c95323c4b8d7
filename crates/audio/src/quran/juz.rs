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


use super::ayah::{Ayah, is_valid};

/// Number of juz (thirtieths) the text is divided into.
pub const JUZ_COUNT: u8 = 30;

const JUZ_STARTS: [Ayah; JUZ_COUNT as usize] = [
    Ayah::new(1, 1),
    Ayah::new(2, 142),
    Ayah::new(2, 253),
    Ayah::new(3, 93),
    Ayah::new(4, 24),
    Ayah::new(4, 148),
    Ayah::new(5, 82),
    Ayah::new(6, 111),
    Ayah::new(7, 88),
    Ayah::new(8, 41),
    Ayah::new(9, 93),
    Ayah::new(11, 6),
    Ayah::new(12, 53),
    Ayah::new(15, 1),
    Ayah::new(17, 1),
    Ayah::new(18, 75),
    Ayah::new(21, 1),
    Ayah::new(23, 1),
    Ayah::new(25, 21),
    Ayah::new(27, 56),
    Ayah::new(29, 46),
    Ayah::new(33, 31),
    Ayah::new(36, 28),
    Ayah::new(39, 32),
    Ayah::new(41, 47),
    Ayah::new(46, 1),
    Ayah::new(51, 31),
    Ayah::new(58, 1),
    Ayah::new(67, 1),
    Ayah::new(78, 1),
];

/// Juz (1-based) containing `ayah`. A basmala marker belongs to the juz of
/// its chapter's first verse.
#[must_use]
pub fn juz_for(ayah: Ayah) -> Option<u8> {
    if !is_valid(ayah) {
        return None;
    }
    let ayah = ayah.normalized();
    let index = JUZ_STARTS.partition_point(|start| *start <= ayah);
    u8::try_from(index).ok()
}

/// First verse of `juz`.
#[must_use]
pub fn juz_start(juz: u8) -> Option<Ayah> {
    let index = usize::from(juz.checked_sub(1)?);
    JUZ_STARTS.get(index).copied()
}

/// Last verse of `juz`.
#[must_use]
pub fn juz_end(juz: u8) -> Option<Ayah> {
    if juz == JUZ_COUNT {
        return Some(Ayah::LAST);
    }
    juz_start(juz)?;
    juz_start(juz + 1)?.prev()
}
