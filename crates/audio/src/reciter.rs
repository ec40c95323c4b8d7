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


use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use snafu::{ResultExt, ensure};
use tracing::debug;

use crate::err::{
    CatalogError, DuplicateReciterIdSnafu, DuplicateReciterNameSnafu, EmptyServerUrlSnafu,
    MissingGaplessDatabaseSnafu, ParseCatalogSnafu, ReadCatalogSnafu,
};

/// Name of the reciter used until the user picks another one.
pub const DEFAULT_RECITER: &str = "Minshawi Murattal";

const BUILTIN_CATALOG: &str = r#"[
    {
        "id": 1,
        "name": "Minshawi Murattal",
        "server_url": "https://everyayah.com/data/Minshawy_Murattal_128kbps/",
        "directory": "minshawi_murattal"
    },
    {
        "id": 2,
        "name": "Mishari Rashid al-Afasy",
        "server_url": "https://everyayah.com/data/Alafasy_128kbps/",
        "directory": "mishari_alafasy"
    },
    {
        "id": 3,
        "name": "Abdul Basit Murattal",
        "server_url": "https://everyayah.com/data/Abdul_Basit_Murattal_192kbps/",
        "directory": "abdul_basit_murattal"
    },
    {
        "id": 4,
        "name": "Mahmoud Khalil Al-Husary",
        "server_url": "https://everyayah.com/data/Husary_128kbps/",
        "directory": "husary"
    },
    {
        "id": 5,
        "name": "Saad al-Ghamdi (Gapless)",
        "server_url": "https://download.quranicaudio.com/quran/sa3d_al-ghaamidi/complete/",
        "directory": "saad_alghamdi_gapless",
        "gapless": true,
        "gapless_database_url": "https://download.quranicaudio.com/quran/databases/saad_alghamdi.db"
    }
]"#;

/// A reciter whose recordings can be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reciter {
    pub id:                   u32,
    pub name:                 String,
    /// Base URL the audio file names are appended to
    pub server_url:           String,
    /// Directory holding this reciter's cached files
    pub local_path:           PathBuf,
    /// Whether recordings come as one file per chapter with a timing database
    pub gapless:              bool,
    pub gapless_database_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReciterEntry {
    id:                   u32,
    name:                 String,
    server_url:           String,
    directory:            String,
    #[serde(default)]
    gapless:              bool,
    #[serde(default)]
    gapless_database_url: Option<String>,
}

/// Read-only list of known reciters.
#[derive(Debug, Clone)]
pub struct ReciterCatalog {
    reciters: Vec<Reciter>,
}

impl ReciterCatalog {
    /// Catalog shipped with the crate, storing audio below `audio_root`.
    pub fn builtin(audio_root: &Path) -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG, audio_root)
    }

    /// Parses a JSON array of reciter entries. Each entry's `directory` is
    /// resolved against `audio_root`.
    pub fn from_json(json: &str, audio_root: &Path) -> Result<Self, CatalogError> {
        let entries: Vec<ReciterEntry> = serde_json::from_str(json).context(ParseCatalogSnafu)?;

        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        let mut reciters = Vec::with_capacity(entries.len());
        for entry in entries {
            ensure!(ids.insert(entry.id), DuplicateReciterIdSnafu { id: entry.id });
            ensure!(
                names.insert(entry.name.clone()),
                DuplicateReciterNameSnafu { name: entry.name }
            );
            ensure!(
                !entry.server_url.trim().is_empty(),
                EmptyServerUrlSnafu { name: entry.name }
            );
            ensure!(
                !entry.gapless || entry.gapless_database_url.is_some(),
                MissingGaplessDatabaseSnafu { name: entry.name }
            );

            reciters.push(Reciter {
                id:                   entry.id,
                name:                 entry.name,
                server_url:           entry.server_url,
                local_path:           audio_root.join(entry.directory),
                gapless:              entry.gapless,
                gapless_database_url: entry.gapless_database_url,
            });
        }
        Ok(Self { reciters })
    }

    pub fn load(path: &Path, audio_root: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).context(ReadCatalogSnafu { path })?;
        Self::from_json(&json, audio_root)
    }

    /// Loads `path` when it exists, the built-in catalog otherwise.
    pub fn load_or_builtin(path: &Path, audio_root: &Path) -> Result<Self, CatalogError> {
        if path.is_file() {
            debug!(path = %path.display(), "loading reciter catalog");
            Self::load(path, audio_root)
        } else {
            Self::builtin(audio_root)
        }
    }

    #[must_use]
    pub fn by_id(&self, id: u32) -> Option<&Reciter> { self.reciters.iter().find(|r| r.id == id) }

    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&Reciter> {
        self.reciters.iter().find(|r| r.name == name)
    }

    /// Id of the reciter called `name`.
    #[must_use]
    pub fn id_by_name(&self, name: &str) -> Option<u32> { self.by_name(name).map(|r| r.id) }

    pub fn iter(&self) -> impl Iterator<Item = &Reciter> { self.reciters.iter() }

    #[must_use]
    pub fn len(&self) -> usize { self.reciters.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.reciters.is_empty() }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn builtin_catalog_is_well_formed() {
        let catalog = ReciterCatalog::builtin(Path::new("/data/audio")).unwrap();
        assert!(!catalog.is_empty());

        let minshawi = catalog.by_name(DEFAULT_RECITER).unwrap();
        assert_eq!(catalog.id_by_name(DEFAULT_RECITER), Some(minshawi.id));
        assert_eq!(
            minshawi.local_path,
            PathBuf::from("/data/audio/minshawi_murattal")
        );
        assert!(!minshawi.gapless);

        assert!(catalog.iter().filter(|r| r.gapless).all(|r| r.gapless_database_url.is_some()));
    }

    #[test]
    fn lookups_miss_cleanly() {
        let catalog = ReciterCatalog::builtin(Path::new("/data/audio")).unwrap();
        assert_eq!(catalog.id_by_name("Nobody"), None);
        assert!(catalog.by_id(9999).is_none());
    }

    #[test]
    fn rejects_invalid_entries() {
        let root = Path::new("/a");
        let duplicate_id = r#"[
            {"id": 1, "name": "A", "server_url": "https://a/", "directory": "a"},
            {"id": 1, "name": "B", "server_url": "https://b/", "directory": "b"}
        ]"#;
        assert!(matches!(
            ReciterCatalog::from_json(duplicate_id, root),
            Err(CatalogError::DuplicateReciterId { id: 1, .. })
        ));

        let gapless = r#"[{"id": 1, "name": "A", "server_url": "https://a/", "directory": "a", "gapless": true}]"#;
        assert!(matches!(
            ReciterCatalog::from_json(gapless, root),
            Err(CatalogError::MissingGaplessDatabase { .. })
        ));

        let no_server = r#"[{"id": 1, "name": "A", "server_url": " ", "directory": "a"}]"#;
        assert!(matches!(
            ReciterCatalog::from_json(no_server, root),
            Err(CatalogError::EmptyServerUrl { .. })
        ));
    }

    #[test]
    fn user_catalog_overrides_builtin() {
        let tempdir = TempDir::new().unwrap();
        let path = tempdir.path().join("reciters.json");
        let audio_root = tempdir.path().join("audio");

        let fallback = ReciterCatalog::load_or_builtin(&path, &audio_root).unwrap();
        assert!(fallback.by_name(DEFAULT_RECITER).is_some());

        std::fs::write(
            &path,
            r#"[{"id": 42, "name": "Local", "server_url": "http://localhost/", "directory": "local"}]"#,
        )
        .unwrap();
        let catalog = ReciterCatalog::load_or_builtin(&path, &audio_root).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.by_id(42).unwrap().local_path, audio_root.join("local"));
    }
}
