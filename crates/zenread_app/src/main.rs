use std::net::SocketAddr;

use anyhow::Context;
use clap::{Parser, Subcommand};
use zenread_app::platform::logging;
use zenread_app::{list_voices, run_reader, serve, AppConfig, LogDestination, ReadOptions};
use zenread_core::SummaryKind;
use zenread_engine::ArticlePipeline;
use zenread_logging::reader_info;

#[derive(Debug, Parser)]
#[command(name = "zenread", version, about = "Distraction-free reader with AI summaries")]
struct Cli {
    /// Where log lines go.
    #[arg(long, value_enum, default_value_t = LogDestination::Terminal, global = true)]
    log: LogDestination,
    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP service (`POST /parse`, `GET /health`).
    Serve {
        /// Listen address; overrides the config file and ZENREAD_ADDR.
        #[arg(long)]
        addr: Option<SocketAddr>,
    },
    /// Fetch an article and print it in reader form.
    Read {
        url: String,
        /// Summary style to generate; repeat for several.
        #[arg(long = "summary", value_name = "STYLE")]
        summaries: Vec<SummaryKind>,
        /// Read the last summary (or the article) aloud with espeak-ng.
        #[arg(long)]
        speak: bool,
        #[arg(long)]
        voice: Option<String>,
        /// Speech rate, 0.1 to 10.
        #[arg(long)]
        rate: Option<f32>,
    },
    /// List speech voices for the configured language.
    Voices,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::initialize(cli.log, cli.verbose);

    let config = AppConfig::load().context("loading configuration")?;

    match cli.command {
        Command::Serve { addr } => {
            let addr = match addr {
                Some(addr) => addr,
                None => config
                    .server
                    .addr
                    .parse()
                    .with_context(|| format!("invalid listen address {:?}", config.server.addr))?,
            };
            let pipeline = ArticlePipeline::with_settings(config.fetch_settings());
            let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
            runtime
                .block_on(serve(addr, pipeline, config.server.max_body_bytes))
                .with_context(|| format!("serving on {addr}"))?;
        }
        Command::Read {
            url,
            summaries,
            speak,
            voice,
            rate,
        } => {
            run_reader(
                &config,
                ReadOptions {
                    url,
                    summaries,
                    speak,
                    voice,
                    rate,
                },
            )?;
        }
        Command::Voices => {
            for voice in list_voices(&config)? {
                println!("{:<12} {:<32} {}", voice.id, voice.name, voice.lang);
            }
        }
    }
    reader_info!("done");
    Ok(())
}
