use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use rewind::api::GqlClient;
use rewind::cli::Args;
use rewind::common::HttpClient;
use rewind::config::Config;
use rewind::sources::twitch::TwitchTarget;
use rewind::sources::{StreamResolver, TwitchSource, VOD_PREFIX};
use rewind::vods::{StdioConsole, VodResolver};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = Config::load()?;

    let default_level = args
        .log_level
        .clone()
        .or_else(|| config.logging.as_ref().and_then(|l| l.level.clone()))
        .unwrap_or_else(|| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // Logs go to stderr; stdout carries only the resolved URLs.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let http = HttpClient::new()?;
    let engine = Arc::new(TwitchSource::new(http.clone()));

    let Some(target) = engine.parse_target(&args.target) else {
        eprintln!("error: '{}' is not a channel or a video", args.target);
        std::process::exit(2);
    };

    let streams = match target {
        TwitchTarget::Video(id) => {
            info!("resolving past broadcast {}", id);
            match engine.resolve(&format!("{}{}", VOD_PREFIX, id)).await {
                Ok(set) if !set.is_empty() => Some(set),
                Ok(_) => None,
                Err(e) => {
                    warn!("resolving broadcast {} failed: {}", id, e);
                    None
                }
            }
        }
        TwitchTarget::Channel(login) => {
            let api = Arc::new(GqlClient::new(http.clone()));
            let options = args.vod_options(&config);
            let mut resolver =
                VodResolver::new(engine.clone(), api, Box::new(StdioConsole), options);
            resolver.resolve_for_channel(&login).await
        }
    };

    let Some(streams) = streams else {
        eprintln!("unable to find a stream");
        std::process::exit(1);
    };

    match args.quality.as_deref() {
        Some(name) => {
            let url = if name == "best" {
                streams.best().map(|(_, url)| url)
            } else {
                streams.get(name)
            };
            match url {
                Some(url) => println!("{}", url),
                None => {
                    eprintln!(
                        "quality '{}' not available (have: {})",
                        name,
                        streams.names().join(", ")
                    );
                    std::process::exit(1);
                }
            }
        }
        None => {
            for (name, url) in streams.iter() {
                println!("{}: {}", name, url);
            }
        }
    }

    Ok(())
}
