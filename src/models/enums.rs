//! Enumeration types for constrained KYC values.

use serde::{Deserialize, Serialize};

use crate::error::KycError;

/// Legal form of the business being onboarded.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusinessType {
    /// Incorporated business with registry numbers.
    #[default]
    Registered,
    /// Early-stage business without full registration.
    Startup,
}

impl BusinessType {
    /// Returns the lowercase wire name.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::Startup => "startup",
        }
    }

    /// Normalizes free-form input: trims, lower-cases and treats an empty
    /// value as [`BusinessType::Registered`].
    ///
    /// # Errors
    ///
    /// Returns [`KycError::Validation`] for anything other than
    /// `registered` or `startup`.
    #[inline]
    pub fn normalize(raw: &str) -> Result<Self, KycError> {
        match raw.trim().to_lowercase().as_str() {
            "" | "registered" => Ok(Self::Registered),
            "startup" => Ok(Self::Startup),
            _ => Err(KycError::Validation(
                "business_type must be 'registered' or 'startup'".to_owned(),
            )),
        }
    }
}

impl core::fmt::Display for BusinessType {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Review state of a KYC submission.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KycStatus {
    /// Awaiting review. Every submission starts here.
    #[default]
    Pending,
    /// Accepted by a reviewer.
    Approved,
    /// Declined by a reviewer.
    Rejected,
}

impl KycStatus {
    /// All statuses, in display order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Approved, Self::Rejected];

    /// Returns the lowercase wire name.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl core::fmt::Display for KycStatus {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for KycStatus {
    type Err = KycError;

    /// Parses a status case-insensitively, ignoring surrounding whitespace.
    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                KycError::Validation(
                    "invalid status: must be 'approved', 'rejected', or 'pending'".to_owned(),
                )
            })
    }
}

/// How a malformed `incorporation_date` is handled at intake.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncorporationDatePolicy {
    /// Drop the unparseable date (stored as absent) and log a warning.
    #[default]
    Lenient,
    /// Reject the whole submission with a validation error.
    Strict,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_type_empty_defaults_to_registered() {
        assert_eq!(BusinessType::normalize("").unwrap(), BusinessType::Registered);
        assert_eq!(BusinessType::normalize("   ").unwrap(), BusinessType::Registered);
    }

    #[test]
    fn business_type_is_case_folded_and_trimmed() {
        assert_eq!(BusinessType::normalize(" StartUp ").unwrap(), BusinessType::Startup);
        assert_eq!(
            BusinessType::normalize("REGISTERED").unwrap(),
            BusinessType::Registered
        );
    }

    #[test]
    fn business_type_rejects_unknown_values() {
        let err = BusinessType::normalize("Invalid").unwrap_err();
        assert!(matches!(err, KycError::Validation(_)));
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("REJECTED".parse::<KycStatus>().unwrap(), KycStatus::Rejected);
        assert_eq!(" Approved".parse::<KycStatus>().unwrap(), KycStatus::Approved);
        assert_eq!("pending".parse::<KycStatus>().unwrap(), KycStatus::Pending);
    }

    #[test]
    fn status_rejects_unknown_values() {
        for raw in ["", "not_started", "approve", "cancelled"] {
            let err = raw.parse::<KycStatus>().unwrap_err();
            assert!(matches!(err, KycError::Validation(_)), "accepted {raw:?}");
        }
    }

    #[test]
    fn status_serde_uses_lowercase_names() {
        for status in KycStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            let deserialized: KycStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(deserialized, status);
        }
    }

    #[test]
    fn incorporation_policy_defaults_to_lenient() {
        assert_eq!(
            IncorporationDatePolicy::default(),
            IncorporationDatePolicy::Lenient
        );
    }
}
