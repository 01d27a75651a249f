use async_trait::async_trait;

use crate::common::ResolveError;

/// Ordered mapping of quality name to playable stream URL.
///
/// Order follows the upstream variant playlist, best quality first, so
/// `best()` is simply the first entry. Empty means "nothing to play"
/// (an offline channel or an expired broadcast) and is not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamSet {
  entries: Vec<(String, String)>,
}

impl StreamSet {
  pub fn new() -> Self {
    Self::default()
  }

  /// Appends a quality; a name already present is ignored.
  pub fn insert(&mut self, name: impl Into<String>, url: impl Into<String>) {
    let name = name.into();
    if self.get(&name).is_none() {
      self.entries.push((name, url.into()));
    }
  }

  pub fn get(&self, name: &str) -> Option<&str> {
    self
      .entries
      .iter()
      .find(|(n, _)| n == name)
      .map(|(_, u)| u.as_str())
  }

  pub fn best(&self) -> Option<(&str, &str)> {
    self.entries.first().map(|(n, u)| (n.as_str(), u.as_str()))
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.entries.iter().map(|(n, u)| (n.as_str(), u.as_str()))
  }

  pub fn names(&self) -> Vec<&str> {
    self.entries.iter().map(|(n, _)| n.as_str()).collect()
  }
}

/// Trait implemented by stream engines.
///
/// An engine turns an identifier into a set of playable streams. The
/// identifier is always an explicit argument: engines must not keep
/// per-call state between invocations, so resolving a broadcast can never
/// leave the channel identifier of a later live resolution dirty.
#[async_trait]
pub trait StreamResolver: Send + Sync {
  /// Unique identifier for this engine (e.g., "twitch").
  fn name(&self) -> &str;

  /// Check if this engine can handle the given identifier.
  fn can_handle(&self, identifier: &str) -> bool;

  /// Resolve the identifier into streams.
  ///
  /// `Ok` with an empty set means the target exists but has nothing to
  /// play right now; `Err` is reserved for transport and upstream faults.
  async fn resolve(&self, identifier: &str) -> Result<StreamSet, ResolveError>;
}
