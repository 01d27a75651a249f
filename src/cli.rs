use clap::Parser;

use crate::config::Config;
use crate::vods::VodOptions;
use crate::vods::table;

#[derive(Parser, Debug)]
#[command(author, version, about = "Resolve a Twitch stream URL, falling back to past broadcasts when the channel is offline", long_about = None)]
pub struct Args {
    /// Channel URL, channel login, or video URL to resolve
    pub target: String,

    /// Check for past broadcasts (VODs) if the selected streamer is not
    /// currently streaming
    #[arg(long, default_value_t = false)]
    pub check_vods: bool,

    /// Pick the most recent resolvable past broadcast without prompting
    #[arg(long, default_value_t = false)]
    pub pick_most_recent: bool,

    /// Limit past broadcasts to the X most recent
    #[arg(long)]
    pub vod_limit: Option<usize>,

    /// Maximum characters per text column in the selection table
    #[arg(long)]
    pub width: Option<usize>,

    /// Quality to print, as named by the streaming edge; "best" picks the
    /// first listed. All qualities are printed when omitted.
    #[arg(long)]
    pub quality: Option<String>,

    /// Logging level {off, error, warn, info, debug, trace}
    #[arg(long = "loglevel")]
    pub log_level: Option<String>,
}

impl Args {
    /// Flags win over the config file; unset values fall back to it.
    pub fn vod_options(&self, config: &Config) -> VodOptions {
        VodOptions {
            check_vods: self.check_vods || config.vods.enabled,
            pick_most_recent: self.pick_most_recent || config.vods.pick_most_recent,
            limit: self.vod_limit.unwrap_or(config.vods.limit),
            table_width: self
                .width
                .or(config.display.width)
                .unwrap_or_else(table::default_width),
            fields: Vec::new(),
        }
    }
}
