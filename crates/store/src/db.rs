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


use snafu::ResultExt;
use sqlx::{
    Sqlite, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use crate::{config::DatabaseConfig, err::*, kv::KVStore};

/// Database store that manages the SQLite connection pool
#[derive(Clone)]
pub struct DBStore {
    pool: SqlitePool,
}

impl DBStore {
    /// Open (creating if missing) the database described by `config` and run
    /// pending migrations.
    #[tracing::instrument(level = "trace", skip_all, fields(path = %config.db_path.display()), err)]
    pub async fn new(config: DatabaseConfig) -> Result<Self> {
        if let Some(parent) = config.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).context(CreateDirSnafu {
                    path: parent.to_path_buf(),
                })?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(&config.db_path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        tracing::trace!("Initialized DBStore with path: {}", config.db_path.display());

        Ok(Self { pool })
    }

    /// Get a KV store instance
    pub fn kv_store(&self) -> KVStore { KVStore::new(self.pool.clone()) }

    /// Get the underlying SQLite pool
    pub const fn pool(&self) -> &SqlitePool { &self.pool }

    /// Acquire a connection from the pool
    pub async fn acquire(&self) -> Result<sqlx::pool::PoolConnection<Sqlite>> {
        Ok(self.pool.acquire().await?)
    }

    /// Close every pooled connection.
    pub async fn close(&self) { self.pool.close().await }
}
