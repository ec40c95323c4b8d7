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


use std::path::Path;

use snafu::{ResultExt, ensure};

use super::ayah::{Ayah, CHAPTER_COUNT, is_valid};
use crate::err::{
    EmptyPageTableSnafu, FirstPageSnafu, InvalidPageStartSnafu, PageTableError,
    ParsePageTableSnafu, ReadPageTableSnafu, UnorderedPagesSnafu,
};

/// First and last verse printed on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBounds {
    pub start: Ayah,
    pub end:   Ayah,
}

/// Maps mushaf pages to verses. Pages are numbered from 1.
pub trait PageIndex: Send + Sync {
    fn page_count(&self) -> u16;

    fn page_bounds(&self, page: u16) -> Option<PageBounds>;

    /// Page on which `ayah` is printed. A basmala marker resolves to the page
    /// of its chapter's first verse.
    fn page_for(&self, ayah: Ayah) -> Option<u16>;
}

/// A page index built from the first verse of every page.
#[derive(Debug, Clone)]
pub struct PageTable {
    starts: Vec<Ayah>,
}

impl PageTable {
    pub fn from_starts(starts: Vec<Ayah>) -> Result<Self, PageTableError> {
        ensure!(!starts.is_empty(), EmptyPageTableSnafu);
        ensure!(starts[0] == Ayah::FIRST, FirstPageSnafu { start: starts[0] });
        for (index, start) in starts.iter().enumerate() {
            ensure!(
                is_valid(*start) && !start.is_bismillah(),
                InvalidPageStartSnafu {
                    page: index + 1,
                    ayah: *start,
                }
            );
        }
        if let Some(index) = starts.windows(2).position(|w| w[0] >= w[1]) {
            return UnorderedPagesSnafu { page: index + 2 }.fail();
        }
        Ok(Self { starts })
    }

    /// Parses a JSON array of `[chapter, verse]` pairs, one per page.
    pub fn from_json(json: &str) -> Result<Self, PageTableError> {
        let pairs: Vec<(u16, u16)> = serde_json::from_str(json).context(ParsePageTableSnafu)?;
        Self::from_starts(
            pairs
                .into_iter()
                .map(|(chapter, verse)| Ayah::new(chapter, verse))
                .collect(),
        )
    }

    pub fn load(path: &Path) -> Result<Self, PageTableError> {
        let json = std::fs::read_to_string(path).context(ReadPageTableSnafu { path })?;
        Self::from_json(&json)
    }

    /// One page per chapter, for hosts without a mushaf layout.
    #[must_use]
    pub fn by_chapter() -> Self {
        Self {
            starts: (1..=CHAPTER_COUNT).map(|chapter| Ayah::new(chapter, 1)).collect(),
        }
    }
}

impl PageIndex for PageTable {
    fn page_count(&self) -> u16 { u16::try_from(self.starts.len()).unwrap_or(u16::MAX) }

    fn page_bounds(&self, page: u16) -> Option<PageBounds> {
        let index = usize::from(page.checked_sub(1)?);
        let start = *self.starts.get(index)?;
        let end = match self.starts.get(index + 1) {
            Some(next) => next.prev()?,
            None => Ayah::LAST,
        };
        Some(PageBounds { start, end })
    }

    fn page_for(&self, ayah: Ayah) -> Option<u16> {
        if !is_valid(ayah) {
            return None;
        }
        let ayah = ayah.normalized();
        let index = self.starts.partition_point(|start| *start <= ayah);
        u16::try_from(index).ok()
    }
}
