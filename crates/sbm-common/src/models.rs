use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Seconds between boots used by the server when a machine omits it.
pub const DEFAULT_TIME_BETWEEN: i64 = 600;

/// The three REST collections exposed under `/api/v1/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    BootConfig,
    Machine,
    Variable,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::BootConfig,
        ResourceKind::Machine,
        ResourceKind::Variable,
    ];

    /// Path segment of the collection, e.g. `boot_config`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::BootConfig => "boot_config",
            ResourceKind::Machine => "machine",
            ResourceKind::Variable => "variable",
        }
    }

    /// Name of the field that identifies a record of this kind.
    pub fn key_field(&self) -> &'static str {
        match self {
            ResourceKind::BootConfig => "title",
            ResourceKind::Machine => "hostname",
            ResourceKind::Variable => "key",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::BootConfig => write!(f, "boot config"),
            ResourceKind::Machine => write!(f, "machine"),
            ResourceKind::Variable => write!(f, "variable"),
        }
    }
}

/// A record stored in one of the SBM collections.
pub trait Resource: Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync {
    const KIND: ResourceKind;

    /// The identifying value (title, hostname or key).
    fn key(&self) -> &str;

    /// True when every field the client can write matches `other`.
    /// Read-only fields reported by the server are ignored.
    fn same_definition(&self, other: &Self) -> bool;
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct BootConfig {
    pub title: String,
    pub config: String,
}

impl Resource for BootConfig {
    const KIND: ResourceKind = ResourceKind::BootConfig;

    fn key(&self) -> &str {
        &self.title
    }

    fn same_definition(&self, other: &Self) -> bool {
        self == other
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Variable {
    pub key: String,
    pub value: String,
}

impl Resource for Variable {
    const KIND: ResourceKind = ResourceKind::Variable;

    fn key(&self) -> &str {
        &self.key
    }

    fn same_definition(&self, other: &Self) -> bool {
        self == other
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Machine {
    pub hostname: String,
    pub default_boot: String,
    pub alternate_boot: String,
    #[serde(default)]
    pub switch_type: SwitchType,
    #[serde(default)]
    pub time_between: TimeBetween,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_alternate: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_boot: Option<String>,
}

impl Machine {
    pub fn new(hostname: impl Into<String>, default_boot: impl Into<String>, alternate_boot: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            default_boot: default_boot.into(),
            alternate_boot: alternate_boot.into(),
            switch_type: SwitchType::default(),
            time_between: TimeBetween::default(),
            use_alternate: None,
            last_boot: None,
        }
    }

    /// Parses `last_boot`, which the server sends as an HTTP date
    /// (`Thu, 01 Jan 1970 00:00:00 GMT`).
    pub fn last_boot_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.last_boot.as_deref()?;
        DateTime::parse_from_rfc2822(raw)
            .or_else(|_| DateTime::parse_from_rfc3339(raw))
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    }
}

impl Resource for Machine {
    const KIND: ResourceKind = ResourceKind::Machine;

    fn key(&self) -> &str {
        &self.hostname
    }

    fn same_definition(&self, other: &Self) -> bool {
        self.hostname == other.hostname
            && self.default_boot == other.default_boot
            && self.alternate_boot == other.alternate_boot
            && self.switch_type == other.switch_type
            && self.time_between.seconds() == other.time_between.seconds()
    }
}

/// How a machine moves between its default and alternate boot configs.
///
/// Values the client does not know are kept verbatim so they survive a
/// read/write cycle.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(from = "String", into = "String")]
pub enum SwitchType {
    #[default]
    Switched,
    Alternating,
    Timed,
    Other(String),
}

impl SwitchType {
    pub fn as_str(&self) -> &str {
        match self {
            SwitchType::Switched => "switched",
            SwitchType::Alternating => "alternating",
            SwitchType::Timed => "timed",
            SwitchType::Other(name) => name,
        }
    }

    pub fn is_timed(&self) -> bool {
        matches!(self, SwitchType::Timed)
    }
}

impl From<String> for SwitchType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "switched" => SwitchType::Switched,
            "alternating" => SwitchType::Alternating,
            "timed" => SwitchType::Timed,
            _ => SwitchType::Other(s),
        }
    }
}

impl From<&str> for SwitchType {
    fn from(s: &str) -> Self {
        SwitchType::from(s.to_string())
    }
}

impl From<SwitchType> for String {
    fn from(st: SwitchType) -> Self {
        st.as_str().to_string()
    }
}

impl fmt::Display for SwitchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Interval for `timed` machines. The server stores an integer but form
/// submissions send it back as a string, so both shapes are accepted and
/// written back unchanged.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum TimeBetween {
    Seconds(i64),
    Text(String),
}

impl TimeBetween {
    /// Numeric value when the text form holds an integer.
    pub fn seconds(&self) -> Option<i64> {
        match self {
            TimeBetween::Seconds(s) => Some(*s),
            TimeBetween::Text(t) => t.trim().parse().ok(),
        }
    }
}

impl Default for TimeBetween {
    fn default() -> Self {
        TimeBetween::Seconds(DEFAULT_TIME_BETWEEN)
    }
}

impl fmt::Display for TimeBetween {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeBetween::Seconds(s) => write!(f, "{}", s),
            TimeBetween::Text(t) => write!(f, "{}", t),
        }
    }
}

/// Body of a successful DELETE.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Body the server sends with any non-2xx status.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub err: String,
}
