//! Shared domain enumerations aligned with persisted column values.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Moderation state of an article.
///
/// Persisted as a `SMALLINT` using the codes returned by [`ArticleStatus::code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleStatus {
    Unapproved,
    Approved,
    Rejected,
}

impl ArticleStatus {
    pub const ALL: [ArticleStatus; 3] = [
        ArticleStatus::Unapproved,
        ArticleStatus::Approved,
        ArticleStatus::Rejected,
    ];

    pub fn code(self) -> i16 {
        match self {
            ArticleStatus::Unapproved => 0,
            ArticleStatus::Approved => 1,
            ArticleStatus::Rejected => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ArticleStatus::Unapproved => "unapproved",
            ArticleStatus::Approved => "approved",
            ArticleStatus::Rejected => "rejected",
        }
    }

    /// Human readable label for admin listings.
    pub fn label(self) -> &'static str {
        match self {
            ArticleStatus::Unapproved => "Unapproved",
            ArticleStatus::Approved => "Approved",
            ArticleStatus::Rejected => "Rejected",
        }
    }

    /// Badge colour used next to the label in admin listings.
    pub fn dot(self) -> &'static str {
        match self {
            ArticleStatus::Unapproved => "info",
            ArticleStatus::Approved => "success",
            ArticleStatus::Rejected => "warning",
        }
    }
}

impl TryFrom<i16> for ArticleStatus {
    type Error = DomainError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ArticleStatus::Unapproved),
            1 => Ok(ArticleStatus::Approved),
            2 => Ok(ArticleStatus::Rejected),
            other => Err(DomainError::UnknownStatus(other)),
        }
    }
}

impl FromStr for ArticleStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "unapproved" | "pending" => Ok(ArticleStatus::Unapproved),
            "approved" | "accepted" => Ok(ArticleStatus::Approved),
            "rejected" => Ok(ArticleStatus::Rejected),
            other => Err(DomainError::validation(format!(
                "`{other}` is not an article status"
            ))),
        }
    }
}

impl fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_try_from() {
        for status in ArticleStatus::ALL {
            assert_eq!(ArticleStatus::try_from(status.code()).unwrap(), status);
        }
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert!(matches!(
            ArticleStatus::try_from(4),
            Err(DomainError::UnknownStatus(4))
        ));
    }

    #[test]
    fn parses_legacy_aliases() {
        assert_eq!(
            "pending".parse::<ArticleStatus>().unwrap(),
            ArticleStatus::Unapproved
        );
        assert_eq!(
            " Accepted ".parse::<ArticleStatus>().unwrap(),
            ArticleStatus::Approved
        );
        assert!("archived".parse::<ArticleStatus>().is_err());
    }

    #[test]
    fn labels_and_dots_cover_every_status() {
        assert_eq!(ArticleStatus::Unapproved.dot(), "info");
        assert_eq!(ArticleStatus::Approved.dot(), "success");
        assert_eq!(ArticleStatus::Rejected.dot(), "warning");
        assert_eq!(ArticleStatus::Rejected.label(), "Rejected");
    }
}
