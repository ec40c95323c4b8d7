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


use bon::Builder;
use jiff::SignedDuration;
use smart_default::SmartDefault;

/// Configuration for the downloader
#[derive(Debug, Clone, SmartDefault, Builder)]
pub struct DownloaderConfig {
    /// Timeout for HTTP requests
    #[default(SignedDuration::from_secs(30))]
    #[builder(default = SignedDuration::from_secs(30))]
    pub timeout: SignedDuration,

    /// Extension given to in-flight files next to their destination
    #[default = "part"]
    #[builder(default = "part".to_string(), into)]
    pub partial_extension: String,

    /// Continue an interrupted transfer from its `.part` file instead of
    /// starting over
    #[default = true]
    #[builder(default = true)]
    pub resume: bool,

    /// Custom User-Agent header
    #[builder(into)]
    pub user_agent: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_resumes_into_part_files() {
        let config = DownloaderConfig::default();
        assert!(config.resume);
        assert_eq!(config.partial_extension, "part");
        assert_eq!(config.timeout, SignedDuration::from_secs(30));
        assert!(config.user_agent.is_none());
    }

    #[test]
    fn builder_overrides() {
        let config = DownloaderConfig::builder()
            .resume(false)
            .user_agent("tilawa/test")
            .build();
        assert!(!config.resume);
        assert_eq!(config.user_agent.as_deref(), Some("tilawa/test"));
        assert_eq!(config.partial_extension, "part");
    }
}
