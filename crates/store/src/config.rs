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


use std::{path::PathBuf, time::Duration};

use smart_default::SmartDefault;

/// Settings database configuration
#[derive(Debug, Clone, SmartDefault, bon::Builder)]
#[builder(on(Duration, into))]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    #[default(_code = "PathBuf::from(\"tilawa.db\")")]
    #[builder(default = PathBuf::from("tilawa.db"), into, getter)]
    pub db_path: PathBuf,

    /// Maximum number of connections in the pool. Preferences are read on
    /// every play request and written rarely, so a small pool is enough.
    #[default = 4]
    #[builder(default = 4, getter)]
    pub max_connections: u32,

    /// Minimum number of idle connections
    #[default = 1]
    #[builder(default = 1, getter)]
    pub min_connections: u32,

    /// Connection timeout (default: 10 seconds)
    #[default(_code = "Duration::from_secs(10)")]
    #[builder(default = Duration::from_secs(10), getter)]
    pub connect_timeout: Duration,

    /// Idle timeout for connections (default: 10 minutes)
    #[default(_code = "Duration::from_secs(600)")]
    #[builder(default = Duration::from_secs(600), getter)]
    pub idle_timeout: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_matches_default() {
        let built = DatabaseConfig::builder().build();
        let default = DatabaseConfig::default();

        assert_eq!(built.db_path, default.db_path);
        assert_eq!(built.max_connections, default.max_connections);
        assert_eq!(built.connect_timeout, default.connect_timeout);
        assert_eq!(built.idle_timeout, default.idle_timeout);
    }
}
