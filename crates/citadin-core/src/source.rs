use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Canonical identifiers of the upstream public-data providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Atmo,
    Geodair,
    Melodi,
    Sdes,
}

impl ProviderId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Atmo => "atmo",
            Self::Geodair => "geodair",
            Self::Melodi => "melodi",
            Self::Sdes => "sdes",
        }
    }

    /// Human-readable provider name used in upstream error details.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Atmo => "ATMO",
            Self::Geodair => "Geod'air",
            Self::Melodi => "INSEE Melodi",
            Self::Sdes => "SDES",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_wire_and_display_names() {
        assert_eq!(ProviderId::Geodair.to_string(), "geodair");
        assert_eq!(ProviderId::Geodair.display_name(), "Geod'air");
        assert_eq!(
            serde_json::to_value(ProviderId::Melodi).expect("serializable"),
            serde_json::json!("melodi")
        );
    }
}
