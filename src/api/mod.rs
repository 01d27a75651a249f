use async_trait::async_trait;

use crate::common::{ApiError, ChannelLogin};
use crate::vods::BroadcastRecord;

pub mod gql;

pub use gql::GqlClient;

/// Metadata API seam: lists a channel's past broadcasts.
///
/// Implementations fail with [`ApiError`]; callers that can degrade treat
/// any failure as "no broadcasts found".
#[async_trait]
pub trait BroadcastApi: Send + Sync {
    /// Fetch up to `limit` past broadcasts for `channel`, most recent
    /// first as served by the API.
    async fn fetch_broadcasts(
        &self,
        channel: &ChannelLogin,
        limit: usize,
    ) -> Result<Vec<BroadcastRecord>, ApiError>;
}
