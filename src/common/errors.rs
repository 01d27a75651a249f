use thiserror::Error;

/// Failures of the metadata API client.
///
/// Both variants are non-fatal at the call sites that matter: the resolver
/// logs them and carries on as if the channel had no past broadcasts.
#[derive(Debug, Error)]
pub enum ApiError {
  /// The request never produced a usable HTTP response.
  #[error("transport error: {0}")]
  Transport(#[from] reqwest::Error),

  /// The response arrived but was not what the API contract promises
  /// (bad status, GraphQL errors, missing fields).
  #[error("protocol error: {0}")]
  Protocol(String),
}

/// Failures of the stream engine while turning an identifier into streams.
#[derive(Debug, Error)]
pub enum ResolveError {
  #[error("transport error: {0}")]
  Transport(#[from] reqwest::Error),

  /// The streaming edge answered with something other than a variant
  /// playlist or a clean "not available".
  #[error("upstream error: {0}")]
  Upstream(String),

  /// The identifier is not in any form this engine understands.
  #[error("unrecognized stream identifier: {0}")]
  Unsupported(String),
}
