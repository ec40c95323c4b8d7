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


use std::{io::Write, path::PathBuf};

use clap::{Args, Parser, Subcommand};
use snafu::{ResultExt, Whatever};
use strum::IntoEnumIterator;
use tilawa_app::{App, AppConfig};
use tilawa_audio::{AudioRequest, Ayah, SettingKey, quran::title_for};
use tilawa_common_telemetry as telemetry;

#[derive(Debug, Parser)]
#[clap(name = "tilawa", about = "Quran recitation audio downloader", version)]
struct Cli {
    /// Keep all data below this directory instead of the platform default
    #[arg(long, global = true)]
    data_dir:   Option<PathBuf>,
    /// Mushaf page layout: JSON list of `[chapter, verse]` page starts
    #[arg(long, global = true)]
    page_table: Option<PathBuf>,
    /// Log filter, e.g. "debug" or "tilawa_audio=trace"
    #[arg(long, global = true, default_value = "warn")]
    log_level:  String,
    #[command(subcommand)]
    commands:   Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Reciters(RecitersArgs),
    Plan(PlanArgs),
    Fetch(FetchArgs),
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Debug, Clone, Args)]
#[command(long_about = r"

List the reciters audio can be downloaded for.
Examples:

tilawa reciters

")]
struct RecitersArgs {}

impl RecitersArgs {
    async fn run(&self, app: &App) -> Result<(), Whatever> {
        let active = app.active_reciter().await.ok().map(|reciter| reciter.id);
        for reciter in app.catalog().iter() {
            let marker = if active == Some(reciter.id) { "*" } else { " " };
            let mode = if reciter.gapless { "gapless" } else { "per verse" };
            println!("{marker} {:>3}  {}  ({mode})", reciter.id, reciter.name);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Args)]
#[command(long_about = r"

Show what playing from a verse would download, without downloading.
Examples:

tilawa plan 2:255

")]
struct PlanArgs {
    /// Verse as `chapter:verse`; verse 0 is the chapter's basmala
    ayah: Ayah,
}

impl PlanArgs {
    async fn run(&self, app: &App) -> Result<(), Whatever> {
        let (request, plan) = app.plan(self.ayah).await?;
        print_request(&request);
        println!("ayah index needed:       {}", plan.needs_ayah_index);
        println!("gapless database needed: {}", plan.needs_gapless_db);
        println!("audio files needed:      {}", plan.needs_range);
        Ok(())
    }
}

#[derive(Debug, Clone, Args)]
#[command(long_about = r"

Download everything needed to play from a verse with the active reciter.
Examples:

tilawa fetch 2:255
tilawa fetch 36:0

")]
struct FetchArgs {
    /// Verse as `chapter:verse`; verse 0 is the chapter's basmala
    ayah: Ayah,
}

impl FetchArgs {
    async fn run(&self, app: &App) -> Result<(), Whatever> {
        let mut progress = app.downloads().subscribe();
        let printer = tokio::spawn(async move {
            while progress.changed().await.is_ok() {
                let current = progress.borrow_and_update().clone();
                if current.is_downloading {
                    let label = current.label.unwrap_or_default();
                    eprint!("\r{label}: {:>3}%   ", current.percent);
                    let _ = std::io::stderr().flush();
                }
            }
        });

        let outcome = app.run_until_shutdown(app.fetch(self.ayah)).await;
        printer.abort();
        eprintln!();

        match outcome {
            Some(request) => {
                let request = request?;
                print_request(&request);
                println!("ready: {}", title_for(request.current_ayah));
            }
            None => println!("interrupted, partial downloads resume next time"),
        }
        Ok(())
    }
}

#[derive(Debug, Subcommand)]
enum SettingsCommand {
    /// Print one preference, or all of them
    Get {
        key: Option<SettingKey>,
    },
    /// Store a preference
    Set {
        key:   SettingKey,
        value: String,
    },
}

impl SettingsCommand {
    async fn run(&self, app: &App) -> Result<(), Whatever> {
        let settings = app.settings();
        match self {
            Self::Get { key: Some(key) } => {
                let value = settings
                    .get_display(*key)
                    .await
                    .whatever_context("Failed to read setting")?;
                println!("{value}");
            }
            Self::Get { key: None } => {
                for key in SettingKey::iter() {
                    let value = settings
                        .get_display(key)
                        .await
                        .whatever_context("Failed to read setting")?;
                    println!("{key} = {value}");
                }
            }
            Self::Set { key, value } => {
                settings
                    .set_from_str(*key, value)
                    .await
                    .whatever_context("Failed to store setting")?;
            }
        }
        Ok(())
    }
}

fn print_request(request: &AudioRequest) {
    println!("reciter:  {}", request.reciter_id);
    println!("start:    {}", request.current_ayah);
    println!("range:    {} - {}", request.from_ayah, request.to_ayah);
    println!("amount:   {}", request.download_amount);
}

#[tokio::main]
async fn main() -> Result<(), Whatever> {
    let cli = Cli::parse();
    if let Some(dir) = &cli.data_dir {
        tilawa_paths::set_custom_data_dir(dir);
    }

    let mut config = AppConfig::default();
    config.logging.level = Some(cli.log_level.clone());
    config.page_table.clone_from(&cli.page_table);

    let _guards = telemetry::init_global_logging("tilawa", &config.logging);
    telemetry::set_panic_hook();

    let app = config.open().await?;
    let result = match &cli.commands {
        Commands::Reciters(args) => args.run(&app).await,
        Commands::Plan(args) => args.run(&app).await,
        Commands::Fetch(args) => args.run(&app).await,
        Commands::Settings(command) => command.run(&app).await,
    };
    app.shutdown().await;
    result
}
