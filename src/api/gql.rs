use async_trait::async_trait;
use serde_json::{Value, json};

use super::BroadcastApi;
use crate::common::{ApiError, ChannelLogin, DeviceId};
use crate::vods::BroadcastRecord;

const GQL_URL: &str = "https://gql.twitch.tv/gql";
// Client id of the public web player.
const CLIENT_ID: &str = "kimne78kx3ncx6brgo4mv6wki5h0ko";

/// Thin client for the Twitch GraphQL endpoint.
pub struct GqlClient {
    client: reqwest::Client,
    device_id: DeviceId,
}

impl GqlClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            device_id: DeviceId::generate(),
        }
    }

    /// POSTs one raw GraphQL document and returns the response body.
    pub async fn request(&self, query: &str) -> Result<Value, ApiError> {
        let resp = self
            .client
            .post(GQL_URL)
            .header("Client-ID", CLIENT_ID)
            .header("Device-ID", self.device_id.0.as_str())
            .json(&json!({ "query": query }))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ApiError::Protocol(format!(
                "gql returned status {}",
                resp.status()
            )));
        }

        let body: Value = resp.json().await?;
        if let Some(errors) = body["errors"].as_array() {
            if let Some(first) = errors.first() {
                let message = first["message"].as_str().unwrap_or("unknown error");
                return Err(ApiError::Protocol(format!("gql error: {}", message)));
            }
        }
        Ok(body)
    }
}

/// Maps a `user { videos }` response body onto broadcast records.
///
/// A null `data.user` is a protocol error (no such channel); nodes that
/// cannot produce a record are skipped.
fn records_from_response(
    body: &Value,
    channel: &ChannelLogin,
) -> Result<Vec<BroadcastRecord>, ApiError> {
    let user = &body["data"]["user"];
    if user.is_null() {
        return Err(ApiError::Protocol(format!("no such channel: {}", channel)));
    }

    let mut records = Vec::new();
    if let Some(edges) = user["videos"]["edges"].as_array() {
        for edge in edges {
            if let Some(record) = BroadcastRecord::from_json(&edge["node"]) {
                records.push(record);
            }
        }
    }
    Ok(records)
}

#[async_trait]
impl BroadcastApi for GqlClient {
    async fn fetch_broadcasts(
        &self,
        channel: &ChannelLogin,
        limit: usize,
    ) -> Result<Vec<BroadcastRecord>, ApiError> {
        // ChannelLogin is validated to [a-z0-9_], so it can be inlined
        // into the document without escaping.
        let query = format!(
            "{{
        user(login: \"{}\") {{
          videos(first: {}, type: ARCHIVE, sort: TIME) {{
            edges {{
              node {{ id title publishedAt lengthSeconds viewable game {{ name }} }}
            }}
          }}
        }}
      }}",
            channel.as_str(),
            limit.max(1)
        );

        let body = self.request(&query).await?;
        records_from_response(&body, channel)
    }
}
