//! The cached install-status snapshot.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::types::{Error, Result};

/// Last-known install status of the external tool.
///
/// Fields are private: a value is either `installed` with a path, or not
/// installed with empty `version` and `path`. Deserialized values go through
/// the same check. `last_checked_utc` is kept at microsecond precision and
/// always serialized with all six fractional digits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawToolStatus")]
pub struct ToolStatus {
    installed: bool,
    version: String,
    path: String,
    #[serde(serialize_with = "serialize_utc_micros")]
    last_checked_utc: DateTime<Utc>,
}

fn serialize_utc_micros<S: Serializer>(
    at: &DateTime<Utc>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Micros, true))
}

impl ToolStatus {
    /// Tool found at `path`. `version` is the trimmed `--version` output, or
    /// empty when that probe failed.
    pub fn installed(
        path: impl Into<String>,
        version: impl Into<String>,
        checked_at: DateTime<Utc>,
    ) -> Self {
        Self {
            installed: true,
            version: version.into().trim().to_string(),
            path: path.into(),
            last_checked_utc: checked_at.trunc_subsecs(6),
        }
    }

    /// Tool not found anywhere.
    pub fn not_installed(checked_at: DateTime<Utc>) -> Self {
        Self {
            installed: false,
            version: String::new(),
            path: String::new(),
            last_checked_utc: checked_at.trunc_subsecs(6),
        }
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn last_checked_utc(&self) -> DateTime<Utc> {
        self.last_checked_utc
    }

    /// Human-readable one-liner, as shown by the tab and the CLI.
    pub fn summary(&self) -> String {
        if self.installed {
            format!("Installed: {} ({})", self.version, self.path)
        } else {
            "Not installed".to_string()
        }
    }
}

/// Wire shape, validated into [`ToolStatus`].
#[derive(Deserialize)]
struct RawToolStatus {
    installed: bool,
    #[serde(default)]
    version: String,
    #[serde(default)]
    path: String,
    last_checked_utc: DateTime<Utc>,
}

impl TryFrom<RawToolStatus> for ToolStatus {
    type Error = Error;

    fn try_from(raw: RawToolStatus) -> Result<Self> {
        if !raw.installed && !(raw.version.is_empty() && raw.path.is_empty()) {
            return Err(Error::validation(
                "tool status reports not installed but carries a version or path",
            ));
        }
        Ok(Self {
            installed: raw.installed,
            version: raw.version,
            path: raw.path,
            last_checked_utc: raw.last_checked_utc.trunc_subsecs(6),
        })
    }
}
