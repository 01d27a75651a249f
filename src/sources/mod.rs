pub mod plugin;
pub mod twitch;

pub use plugin::{StreamResolver, StreamSet};
pub use twitch::TwitchSource;

/// Identifier scheme marking a past broadcast, e.g. `vod:2233445566`.
///
/// A bare identifier is a channel login and resolves the live stream.
pub const VOD_PREFIX: &str = "vod:";
