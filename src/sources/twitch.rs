use async_trait::async_trait;
use rand::Rng;
use regex::Regex;

use super::{StreamSet, VOD_PREFIX, plugin::StreamResolver};
use crate::api::GqlClient;
use crate::common::{ApiError, ChannelLogin, ResolveError, VideoId};

const USHER_LIVE_URL: &str = "https://usher.ttvnw.net/api/channel/hls";
const USHER_VOD_URL: &str = "https://usher.ttvnw.net/vod";

/// What a piece of user input points at.
#[derive(Debug, Clone, PartialEq)]
pub enum TwitchTarget {
    Channel(ChannelLogin),
    Video(VideoId),
}

/// Stream engine for Twitch.
///
/// Resolution is a two-step dance: ask GraphQL for a playback access
/// token, then hand the token to the usher edge and parse the variant
/// playlist it serves. The same steps cover live channels and past
/// broadcasts; only the token query and the usher path differ.
pub struct TwitchSource {
    client: reqwest::Client,
    gql: GqlClient,
    channel_url_re: Regex,
    video_url_re: Regex,
}

impl TwitchSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            gql: GqlClient::new(client.clone()),
            client,
            channel_url_re: Regex::new(
                r"(?i)^https?://(?:(?:www|m)\.)?twitch\.tv/(?P<login>[A-Za-z0-9_]+)/?$",
            )
            .unwrap(),
            video_url_re: Regex::new(
                r"(?i)^https?://(?:(?:www|m)\.)?twitch\.tv/videos/(?P<id>\d+)",
            )
            .unwrap(),
        }
    }

    /// Turns raw user input (a channel URL, a video URL, a bare login, or
    /// a `vod:` identifier) into a resolvable target.
    pub fn parse_target(&self, input: &str) -> Option<TwitchTarget> {
        let input = input.trim();
        if let Some(id) = input.strip_prefix(VOD_PREFIX) {
            if is_video_id(id) {
                return Some(TwitchTarget::Video(VideoId(id.to_string())));
            }
            return None;
        }
        if let Some(caps) = self.video_url_re.captures(input) {
            return Some(TwitchTarget::Video(VideoId(caps["id"].to_string())));
        }
        if let Some(caps) = self.channel_url_re.captures(input) {
            return ChannelLogin::new(&caps["login"]).map(TwitchTarget::Channel);
        }
        ChannelLogin::new(input).map(TwitchTarget::Channel)
    }

    /// Runs one access-token query; `None` when the token is not granted,
    /// which is how the API says "nothing to play here".
    async fn playback_token(
        &self,
        query: &str,
        field: &str,
    ) -> Result<Option<(String, String)>, ResolveError> {
        let body = self.gql.request(query).await.map_err(|e| match e {
            ApiError::Transport(e) => ResolveError::Transport(e),
            ApiError::Protocol(message) => ResolveError::Upstream(message),
        })?;

        let token = &body["data"][field];
        match (token["value"].as_str(), token["signature"].as_str()) {
            (Some(value), Some(signature)) => {
                Ok(Some((value.to_string(), signature.to_string())))
            }
            _ => Ok(None),
        }
    }

    async fn fetch_variants(&self, url: &str) -> Result<StreamSet, ResolveError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if status.is_client_error() {
            // Offline channel or expired broadcast.
            return Ok(StreamSet::new());
        }
        if !status.is_success() {
            return Err(ResolveError::Upstream(format!(
                "usher returned status {}",
                status
            )));
        }
        let text = resp.text().await?;
        Ok(parse_variant_playlist(&text))
    }

    async fn resolve_live(&self, login: &ChannelLogin) -> Result<StreamSet, ResolveError> {
        let query = format!(
            "{{ streamPlaybackAccessToken(channelName: \"{}\", params: {{platform: \"web\", playerBackend: \"mediaplayer\", playerType: \"site\"}}) {{ value signature }} }}",
            login.as_str()
        );
        let Some((token, signature)) = self
            .playback_token(&query, "streamPlaybackAccessToken")
            .await?
        else {
            return Ok(StreamSet::new());
        };

        let url = format!(
            "{}/{}.m3u8?sig={}&token={}&allow_source=true&allow_audio_only=true&p={}",
            USHER_LIVE_URL,
            login.as_str(),
            signature,
            urlencoding::encode(&token),
            play_session_nonce()
        );
        self.fetch_variants(&url).await
    }

    async fn resolve_vod(&self, id: &str) -> Result<StreamSet, ResolveError> {
        if !is_video_id(id) {
            return Err(ResolveError::Unsupported(format!("{}{}", VOD_PREFIX, id)));
        }

        let query = format!(
            "{{ videoPlaybackAccessToken(id: \"{}\", params: {{platform: \"web\", playerBackend: \"mediaplayer\", playerType: \"site\"}}) {{ value signature }} }}",
            id
        );
        let Some((token, signature)) = self
            .playback_token(&query, "videoPlaybackAccessToken")
            .await?
        else {
            return Ok(StreamSet::new());
        };

        let url = format!(
            "{}/{}.m3u8?sig={}&token={}&allow_source=true&allow_audio_only=true&p={}",
            USHER_VOD_URL,
            id,
            signature,
            urlencoding::encode(&token),
            play_session_nonce()
        );
        self.fetch_variants(&url).await
    }
}

#[async_trait]
impl StreamResolver for TwitchSource {
    fn name(&self) -> &str {
        "twitch"
    }

    fn can_handle(&self, identifier: &str) -> bool {
        match identifier.strip_prefix(VOD_PREFIX) {
            Some(id) => is_video_id(id),
            None => ChannelLogin::new(identifier).is_some(),
        }
    }

    async fn resolve(&self, identifier: &str) -> Result<StreamSet, ResolveError> {
        if let Some(id) = identifier.strip_prefix(VOD_PREFIX) {
            return self.resolve_vod(id).await;
        }
        match ChannelLogin::new(identifier) {
            Some(login) => self.resolve_live(&login).await,
            None => Err(ResolveError::Unsupported(identifier.to_string())),
        }
    }
}

fn is_video_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_digit())
}

// The usher edge wants a numeric nonce per playback session.
fn play_session_nonce() -> u32 {
    rand::thread_rng().gen_range(1_000_000..10_000_000)
}

/// Walks a variant playlist and pairs each `#EXT-X-MEDIA` NAME with the
/// URI following its stream-inf tag. Playlist order is preserved, which
/// keeps the best quality first.
pub fn parse_variant_playlist(text: &str) -> StreamSet {
    let mut set = StreamSet::new();
    let mut pending: Option<String> = None;
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(attrs) = line.strip_prefix("#EXT-X-MEDIA:") {
            pending = attr_value(attrs, "NAME");
        } else if !line.starts_with('#') {
            if let Some(name) = pending.take() {
                set.insert(name, line);
            }
        }
    }
    set
}

fn attr_value(attrs: &str, key: &str) -> Option<String> {
    let marker = format!("{}=\"", key);
    let start = attrs.find(&marker)? + marker.len();
    let rest = &attrs[start..];
    Some(rest[..rest.find('"')?].to_string())
}
