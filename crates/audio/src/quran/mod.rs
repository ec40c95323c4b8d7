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


//! Reference data about the text: chapters, verse counts, juz boundaries and
//! the page layout of a mushaf.

mod ayah;
mod juz;
mod page;

pub use ayah::{
    Ayah, CHAPTER_COUNT, CHAPTER_TAWBA, VERSE_TOTAL, chapter_end, is_valid, title_for,
    verse_count,
};
pub use juz::{JUZ_COUNT, juz_end, juz_for, juz_start};
pub use page::{PageBounds, PageIndex, PageTable};
