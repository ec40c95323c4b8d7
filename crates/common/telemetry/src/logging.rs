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
    env,
    io::IsTerminal,
    sync::{Arc, Mutex, Once},
};

use bon::Builder;
use once_cell::sync::{Lazy, OnceCell};
use serde::{Deserialize, Deserializer, Serialize, de};
use smart_default::SmartDefault;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_log::LogTracer;
use tracing_subscriber::{EnvFilter, Registry, filter, layer::SubscriberExt, prelude::*};

/// Deserializes a string value, using `Default::default()` if the string is
/// empty.
///
/// Configuration files frequently carry `log_format = ""`; both a missing
/// value and an empty one mean "use the default".
pub fn empty_string_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    let s = String::deserialize(deserializer)?;
    if s.is_empty() {
        Ok(T::default())
    } else {
        T::deserialize(de::value::StrDeserializer::new(&s)).map_err(|e: de::value::Error| {
            de::Error::custom(format!("invalid value, expect empty string, err: {e}"))
        })
    }
}

/// The default directory name for log files when file logging is enabled.
pub const DEFAULT_LOGGING_DIR: &str = "logs";

/// Global handle for dynamically reloading log levels at runtime.
///
/// Only available after `init_global_logging` has been called.
pub static RELOAD_HANDLE: OnceCell<tracing_subscriber::reload::Handle<filter::Targets, Registry>> =
    OnceCell::new();

/// Configuration options for the logging system.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, SmartDefault, Builder)]
#[serde(default)]
pub struct LoggingOptions {
    /// Directory path for storing log files.
    ///
    /// When non-empty, log files are created in this directory with hourly
    /// rotation, plus a separate error-only file. If empty, only stdout
    /// logging is used.
    #[default = ""]
    #[builder(default, into)]
    pub dir: String,

    /// Log level filter string, e.g. "info" or "info,tilawa_audio=debug".
    /// Falls back to `RUST_LOG` and then to "info".
    #[builder(into)]
    pub level: Option<String>,

    /// Output format for log messages.
    #[serde(default, deserialize_with = "empty_string_as_default")]
    #[builder(default)]
    pub log_format: LogFormat,

    /// Maximum number of rotated log files to retain (default: 72, three
    /// days of hourly files).
    #[default = 72]
    #[builder(default = 72)]
    pub max_log_files: usize,

    /// Whether to output logs to stdout in addition to files.
    #[default = true]
    #[builder(default = true)]
    pub append_stdout: bool,
}

/// Available log output formats.
#[derive(
    Clone, Debug, Copy, PartialEq, Eq, Serialize, Deserialize, Default, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// JSON-structured log lines, one object per event.
    Json,

    /// Human-readable text format.
    #[default]
    Text,
}

/// Initialize tracing with default configuration.
///
/// Logs go to stdout in text format. The returned guards must be kept alive
/// for as long as logging is needed.
#[must_use]
pub fn init_tracing_subscriber(app_name: &str) -> Vec<WorkerGuard> {
    init_global_logging(app_name, &LoggingOptions::default())
}

/// Initialize logging for unit tests.
///
/// Safe to call from every test; only the first call does anything.
///
/// # Environment Variables
///
/// * `UNITTEST_LOG_DIR` - Directory for test logs (default:
///   "/tmp/__unittest_logs")
/// * `UNITTEST_LOG_LEVEL` - Log level filter (default: "debug" with noisy
///   dependencies turned down)
pub fn init_default_ut_logging() {
    static START: Once = Once::new();

    START.call_once(|| {
        let mut g = GLOBAL_UT_LOG_GUARD
            .as_ref()
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let dir =
            env::var("UNITTEST_LOG_DIR").unwrap_or_else(|_| "/tmp/__unittest_logs".to_string());

        let level = env::var("UNITTEST_LOG_LEVEL").unwrap_or_else(|_| {
            "debug,hyper=warn,hyper_util=warn,reqwest=warn,sqlx=warn,h2=info".to_string()
        });
        let opts = LoggingOptions {
            dir: dir.clone(),
            level: Some(level),
            ..Default::default()
        };
        *g = Some(init_global_logging("unittest", &opts));

        tracing::info!("logs dir = {}", dir);
    });
}

/// Worker guards for unit test logging, kept alive for the whole test binary.
static GLOBAL_UT_LOG_GUARD: Lazy<Arc<Mutex<Option<Vec<WorkerGuard>>>>> =
    Lazy::new(|| Arc::new(Mutex::new(None)));

/// Default log level filter when no specific configuration is provided.
const DEFAULT_LOG_TARGETS: &str = "info";

/// Initialize logging with full configuration options.
///
/// Sets up, depending on `opts`:
///
/// - **Stdout Layer**: if `append_stdout` is true
/// - **File Layer**: hourly-rotated `<app_name>.*` files if `dir` is set
/// - **Error File Layer**: error-only `<app_name>-err.*` files if `dir` is set
///
/// Only the first call per process installs a subscriber; later calls return
/// no guards.
///
/// # Panics
///
/// Panics when the log directory cannot be used or the level string does not
/// parse, so that misconfigured observability is caught at startup.
#[allow(clippy::print_stdout)]
pub fn init_global_logging(app_name: &str, opts: &LoggingOptions) -> Vec<WorkerGuard> {
    static START: Once = Once::new();
    let mut guards = vec![];

    START.call_once(|| {
        // Another logger may already be installed by the host; that is fine.
        let _ = LogTracer::init();

        let stdout_logging_layer = if opts.append_stdout {
            let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());
            guards.push(guard);

            if opts.log_format == LogFormat::Json {
                Some(
                    tracing_subscriber::fmt::Layer::new()
                        .json()
                        .with_writer(writer)
                        .with_ansi(std::io::stdout().is_terminal())
                        .with_current_span(true)
                        .with_span_list(true)
                        .boxed(),
                )
            } else {
                Some(
                    tracing_subscriber::fmt::Layer::new()
                        .with_writer(writer)
                        .with_ansi(std::io::stdout().is_terminal())
                        .boxed(),
                )
            }
        } else {
            None
        };

        let file_logging_layer = if opts.dir.is_empty() {
            None
        } else {
            let (writer, guard) =
                tracing_appender::non_blocking(rolling_appender(app_name, "", opts));
            guards.push(guard);

            if opts.log_format == LogFormat::Json {
                Some(
                    tracing_subscriber::fmt::Layer::new()
                        .json()
                        .with_writer(writer)
                        .with_ansi(false)
                        .with_current_span(true)
                        .with_span_list(true)
                        .boxed(),
                )
            } else {
                Some(
                    tracing_subscriber::fmt::Layer::new()
                        .with_writer(writer)
                        .with_ansi(false)
                        .boxed(),
                )
            }
        };

        let err_file_logging_layer = if opts.dir.is_empty() {
            None
        } else {
            let (writer, guard) =
                tracing_appender::non_blocking(rolling_appender(app_name, "-err", opts));
            guards.push(guard);

            if opts.log_format == LogFormat::Json {
                Some(
                    tracing_subscriber::fmt::Layer::new()
                        .json()
                        .with_writer(writer)
                        .with_ansi(false)
                        .with_filter(filter::LevelFilter::ERROR)
                        .boxed(),
                )
            } else {
                Some(
                    tracing_subscriber::fmt::Layer::new()
                        .with_writer(writer)
                        .with_ansi(false)
                        .with_filter(filter::LevelFilter::ERROR)
                        .boxed(),
                )
            }
        };

        let filter = opts
            .level
            .as_deref()
            .or(env::var(EnvFilter::DEFAULT_ENV).ok().as_deref())
            .unwrap_or(DEFAULT_LOG_TARGETS)
            .parse::<filter::Targets>()
            .expect("error parsing log level string");

        let (dyn_filter, reload_handle) = tracing_subscriber::reload::Layer::new(filter);

        RELOAD_HANDLE
            .set(reload_handle)
            .expect("reload handle already set, maybe init_global_logging get called twice?");

        let subscriber = Registry::default()
            .with(dyn_filter)
            .with(stdout_logging_layer)
            .with(file_logging_layer)
            .with(err_file_logging_layer);

        tracing::subscriber::set_global_default(subscriber)
            .expect("error setting global tracing subscriber");
    });

    guards
}

fn rolling_appender(app_name: &str, suffix: &str, opts: &LoggingOptions) -> RollingFileAppender {
    RollingFileAppender::builder()
        .rotation(Rotation::HOURLY)
        .filename_prefix(format!("{app_name}{suffix}"))
        .max_log_files(opts.max_log_files)
        .build(&opts.dir)
        .unwrap_or_else(|e| {
            panic!(
                "initializing rolling file appender at {} failed: {}",
                &opts.dir, e
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_log_format_falls_back_to_text() {
        let opts: LoggingOptions =
            serde_json::from_str(r#"{"dir": "logs", "log_format": ""}"#).unwrap();
        assert_eq!(opts.log_format, LogFormat::Text);
        assert_eq!(opts.dir, "logs");
        assert_eq!(opts.max_log_files, 72);
        assert!(opts.append_stdout);
    }

    #[test]
    fn json_log_format_parses() {
        let opts: LoggingOptions = serde_json::from_str(r#"{"log_format": "json"}"#).unwrap();
        assert_eq!(opts.log_format, LogFormat::Json);
        assert!(opts.dir.is_empty());
    }

    #[test]
    fn builder_defaults_match_serde_defaults() {
        let built = LoggingOptions::builder().level("debug").build();
        assert_eq!(built.level.as_deref(), Some("debug"));
        assert_eq!(built.max_log_files, LoggingOptions::default().max_log_files);
        assert_eq!(built.append_stdout, LoggingOptions::default().append_stdout);
    }
}
