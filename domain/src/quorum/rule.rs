//! Approval thresholds for consensus determination
//!
//! A threshold is the approval percentage a round needs to be APPROVED. Its
//! mirror image, `100 - threshold`, is the boundary below which the round is
//! REJECTED; anything in between is SPLIT.

use crate::core::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Threshold policy for a consensus round
///
/// # Example
///
/// ```
/// use autopilot_domain::quorum::ApprovalThreshold;
///
/// let t: ApprovalThreshold = "supermajority".parse().unwrap();
/// assert_eq!(t.percent(), 67);
/// assert_eq!(t.rejection_boundary(), 33);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApprovalThreshold {
    /// 50%
    #[default]
    Majority,
    /// 67%
    Supermajority,
    /// 100%
    Unanimous,
    /// Any percentage 0-100
    Percentage(u8),
}

impl ApprovalThreshold {
    /// Required approval percentage
    pub fn percent(&self) -> u8 {
        match self {
            ApprovalThreshold::Majority => 50,
            ApprovalThreshold::Supermajority => 67,
            ApprovalThreshold::Unanimous => 100,
            ApprovalThreshold::Percentage(p) => (*p).min(100),
        }
    }

    /// Approval percentages strictly below this are REJECTED
    pub fn rejection_boundary(&self) -> u8 {
        100 - self.percent()
    }

    /// Get a human-readable description of this threshold
    pub fn description(&self) -> String {
        match self {
            ApprovalThreshold::Majority => "majority (50%)".to_string(),
            ApprovalThreshold::Supermajority => "supermajority (67%)".to_string(),
            ApprovalThreshold::Unanimous => "unanimous (100%)".to_string(),
            ApprovalThreshold::Percentage(p) => format!("at least {}%", p),
        }
    }

    fn config_name(&self) -> String {
        match self {
            ApprovalThreshold::Majority => "majority".to_string(),
            ApprovalThreshold::Supermajority => "supermajority".to_string(),
            ApprovalThreshold::Unanimous => "unanimous".to_string(),
            ApprovalThreshold::Percentage(p) => format!("{}%", p),
        }
    }
}

impl std::fmt::Display for ApprovalThreshold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl std::str::FromStr for ApprovalThreshold {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "majority" => Ok(ApprovalThreshold::Majority),
            "supermajority" => Ok(ApprovalThreshold::Supermajority),
            "unanimous" => Ok(ApprovalThreshold::Unanimous),
            s if s.starts_with("percentage:") || s.ends_with('%') || s.parse::<u8>().is_ok() => {
                let num_str = s.trim_start_matches("percentage:").trim_end_matches('%');
                let p: u8 = num_str.trim().parse().map_err(|_| {
                    DomainError::InvalidThreshold(format!("invalid percentage: {}", s))
                })?;
                if p > 100 {
                    return Err(DomainError::InvalidThreshold(format!(
                        "percentage above 100: {}",
                        p
                    )));
                }
                Ok(ApprovalThreshold::Percentage(p))
            }
            other => Err(DomainError::InvalidThreshold(format!(
                "unknown threshold: {}. Valid: majority, supermajority, unanimous, N%",
                other
            ))),
        }
    }
}

impl Serialize for ApprovalThreshold {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.config_name())
    }
}

impl<'de> Deserialize<'de> for ApprovalThreshold {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_thresholds() {
        assert_eq!(ApprovalThreshold::Majority.percent(), 50);
        assert_eq!(ApprovalThreshold::Supermajority.percent(), 67);
        assert_eq!(ApprovalThreshold::Unanimous.percent(), 100);
        assert_eq!(ApprovalThreshold::Unanimous.rejection_boundary(), 0);
        assert_eq!(ApprovalThreshold::Majority.rejection_boundary(), 50);
    }

    #[test]
    fn test_parse_threshold() {
        assert_eq!(
            "Majority".parse::<ApprovalThreshold>().unwrap(),
            ApprovalThreshold::Majority
        );
        assert_eq!(
            "75%".parse::<ApprovalThreshold>().unwrap(),
            ApprovalThreshold::Percentage(75)
        );
        assert_eq!(
            "percentage:80".parse::<ApprovalThreshold>().unwrap(),
            ApprovalThreshold::Percentage(80)
        );
        assert_eq!(
            "60".parse::<ApprovalThreshold>().unwrap(),
            ApprovalThreshold::Percentage(60)
        );
        assert!("150%".parse::<ApprovalThreshold>().is_err());
        assert!("most".parse::<ApprovalThreshold>().is_err());
    }

    #[test]
    fn test_serde_roundtrip_as_string() {
        let json = serde_json::to_string(&ApprovalThreshold::Percentage(75)).unwrap();
        assert_eq!(json, "\"75%\"");
        let parsed: ApprovalThreshold = serde_json::from_str("\"unanimous\"").unwrap();
        assert_eq!(parsed, ApprovalThreshold::Unanimous);
    }

    #[test]
    fn test_default() {
        assert_eq!(ApprovalThreshold::default(), ApprovalThreshold::Majority);
    }
}
