use rand::{Rng, distributions::Alphanumeric};

/// A generic boxed error type.
pub type AnyError = Box<dyn std::error::Error + Send + Sync>;

/// A convenient Result alias returning `AnyError`.
pub type AnyResult<T> = std::result::Result<T, AnyError>;

/// A Twitch channel login name (the lowercase name in the channel URL).
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ChannelLogin(pub String);

impl ChannelLogin {
  /// Validates and normalizes a login: 1-25 chars of `[a-z0-9_]`,
  /// case-folded. Returns `None` for anything else.
  pub fn new(raw: &str) -> Option<Self> {
    let login = raw.trim().to_ascii_lowercase();
    if login.is_empty() || login.len() > 25 {
      return None;
    }
    if !login
      .chars()
      .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
      return None;
    }
    Some(Self(login))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl std::ops::Deref for ChannelLogin {
  type Target = str;
  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

impl std::fmt::Display for ChannelLogin {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// The identifier of a single past broadcast, as issued by the API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl From<String> for VideoId {
  fn from(s: String) -> Self {
    Self(s)
  }
}

impl VideoId {
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl std::ops::Deref for VideoId {
  type Target = str;
  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

impl std::fmt::Display for VideoId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Per-process device identifier sent alongside API requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceId(pub String);

impl DeviceId {
  /// Generates a random 32-character alphanumeric device ID (a-z, 0-9).
  pub fn generate() -> Self {
    let rng = rand::thread_rng();
    let s: String = rng
      .sample_iter(&Alphanumeric)
      .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
      .take(32)
      .map(char::from)
      .collect();
    Self(s)
  }
}

impl std::fmt::Display for DeviceId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}
