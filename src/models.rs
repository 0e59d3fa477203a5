//! Data models for the catalog dashboard.
//!
//! This module contains the records passed between the catalog
//! aggregator, the dashboard state and the report generators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Placeholder used whenever real data could not be obtained.
pub const NOT_AVAILABLE: &str = "N/A";

/// Owner name used when a work lists no authors.
pub const UNKNOWN_OWNER: &str = "Unknown";

/// A raw work from the subject listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogItem {
    /// Work title.
    pub title: String,
    /// Name of the first listed author, or [`UNKNOWN_OWNER`].
    pub primary_owner_name: String,
    /// Year of first publication, if known.
    pub first_publish_year: Option<i32>,
    /// Subject tags in listing order.
    pub subject_tags: Vec<String>,
}

/// Result of the per-title detail lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailAugmentation {
    /// Average rating of the first matching document.
    pub ratings_average: Option<f64>,
}

/// Result of the per-author lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnerAugmentation {
    pub birth_date: Option<String>,
    pub notable_work: Option<String>,
}

/// One row of the dashboard: a work flattened with both augmentations.
///
/// Every column is always populated, with [`NOT_AVAILABLE`] standing in for
/// anything the lookups could not provide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedRecord {
    pub title: String,
    pub author_name: String,
    pub first_publish_year: String,
    pub subject: String,
    pub ratings_average: String,
    pub author_birth_date: String,
    pub author_top_work: String,
    /// Set when at least one secondary lookup for this work failed.
    #[serde(skip)]
    pub degraded: bool,
}

impl MergedRecord {
    /// Flatten a work and its augmentations into a single row.
    pub fn merge(
        item: CatalogItem,
        detail: DetailAugmentation,
        owner: OwnerAugmentation,
        degraded: bool,
    ) -> Self {
        let subject = if item.subject_tags.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            item.subject_tags.join(", ")
        };

        Self {
            title: item.title,
            author_name: item.primary_owner_name,
            first_publish_year: or_sentinel(item.first_publish_year),
            subject,
            ratings_average: or_sentinel(detail.ratings_average),
            author_birth_date: or_sentinel(owner.birth_date),
            author_top_work: or_sentinel(owner.notable_work),
            degraded,
        }
    }

    /// Value of a single column.
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::AuthorName => &self.author_name,
            Field::FirstPublishYear => &self.first_publish_year,
            Field::Subject => &self.subject,
            Field::RatingsAverage => &self.ratings_average,
            Field::AuthorBirthDate => &self.author_birth_date,
            Field::AuthorTopWork => &self.author_top_work,
        }
    }

    /// Mutable access to a single column.
    pub fn get_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Title => &mut self.title,
            Field::AuthorName => &mut self.author_name,
            Field::FirstPublishYear => &mut self.first_publish_year,
            Field::Subject => &mut self.subject,
            Field::RatingsAverage => &mut self.ratings_average,
            Field::AuthorBirthDate => &mut self.author_birth_date,
            Field::AuthorTopWork => &mut self.author_top_work,
        }
    }

    /// Returns true if any column contains `needle` (already lowercased).
    pub fn matches(&self, needle: &str) -> bool {
        Field::ALL
            .iter()
            .any(|field| self.get(*field).to_lowercase().contains(needle))
    }
}

fn or_sentinel<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// A dashboard column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    AuthorName,
    FirstPublishYear,
    Subject,
    RatingsAverage,
    AuthorBirthDate,
    AuthorTopWork,
}

impl Field {
    /// All columns in display order.
    pub const ALL: [Field; 7] = [
        Field::Title,
        Field::AuthorName,
        Field::FirstPublishYear,
        Field::Subject,
        Field::RatingsAverage,
        Field::AuthorBirthDate,
        Field::AuthorTopWork,
    ];

    /// Column header shown to users.
    pub fn label(&self) -> &'static str {
        match self {
            Field::Title => "Title",
            Field::AuthorName => "Author Name",
            Field::FirstPublishYear => "First Publish Year",
            Field::Subject => "Subject",
            Field::RatingsAverage => "Ratings Average",
            Field::AuthorBirthDate => "Author Birth Date",
            Field::AuthorTopWork => "Author Top Work",
        }
    }

    /// Record key, as used in JSON output.
    pub fn key(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::AuthorName => "author_name",
            Field::FirstPublishYear => "first_publish_year",
            Field::Subject => "subject",
            Field::RatingsAverage => "ratings_average",
            Field::AuthorBirthDate => "author_birth_date",
            Field::AuthorTopWork => "author_top_work",
        }
    }

    /// Whether values in this column compare numerically.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Field::FirstPublishYear | Field::RatingsAverage)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Field {
    type Err = String;

    /// Accepts either the record key or the header label, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace(['-', ' '], "_");
        Field::ALL
            .iter()
            .copied()
            .find(|field| {
                field.key() == wanted || field.label().to_lowercase().replace(' ', "_") == wanted
            })
            .ok_or_else(|| format!("Unknown column: {}", s))
    }
}

/// Metadata attached to exported reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    /// Subject the catalog was built from.
    pub subject: String,
    /// When the export was produced.
    pub generated_at: DateTime<Utc>,
    /// Number of records in the export.
    pub record_count: usize,
    /// Number of records with at least one failed lookup.
    pub degraded_count: usize,
    /// Active search filter, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

/// A complete export: metadata plus the exported rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Export {
    pub metadata: ExportMetadata,
    pub records: Vec<MergedRecord>,
}

impl Export {
    /// Build an export from the rows currently in view.
    pub fn new(subject: &str, records: Vec<MergedRecord>, filter: Option<String>) -> Self {
        let metadata = ExportMetadata {
            subject: subject.to_string(),
            generated_at: Utc::now(),
            record_count: records.len(),
            degraded_count: records.iter().filter(|r| r.degraded).count(),
            filter,
        };

        Self { metadata, records }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> CatalogItem {
        CatalogItem {
            title: "Dune".to_string(),
            primary_owner_name: "Frank Herbert".to_string(),
            first_publish_year: Some(1965),
            subject_tags: vec!["Science fiction".to_string(), "Deserts".to_string()],
        }
    }

    #[test]
    fn test_merge_populates_all_fields() {
        let record = MergedRecord::merge(
            item(),
            DetailAugmentation {
                ratings_average: Some(4.25),
            },
            OwnerAugmentation {
                birth_date: Some("8 October 1920".to_string()),
                notable_work: Some("Dune".to_string()),
            },
            false,
        );

        assert_eq!(record.title, "Dune");
        assert_eq!(record.author_name, "Frank Herbert");
        assert_eq!(record.first_publish_year, "1965");
        assert_eq!(record.subject, "Science fiction, Deserts");
        assert_eq!(record.ratings_average, "4.25");
        assert_eq!(record.author_birth_date, "8 October 1920");
        assert_eq!(record.author_top_work, "Dune");
        assert!(!record.degraded);
    }

    #[test]
    fn test_merge_uses_sentinels() {
        let bare = CatalogItem {
            first_publish_year: None,
            subject_tags: Vec::new(),
            ..item()
        };
        let record = MergedRecord::merge(
            bare,
            DetailAugmentation::default(),
            OwnerAugmentation::default(),
            true,
        );

        assert_eq!(record.first_publish_year, NOT_AVAILABLE);
        assert_eq!(record.subject, NOT_AVAILABLE);
        assert_eq!(record.ratings_average, NOT_AVAILABLE);
        assert_eq!(record.author_birth_date, NOT_AVAILABLE);
        assert_eq!(record.author_top_work, NOT_AVAILABLE);
        assert!(record.degraded);
        for field in Field::ALL {
            assert!(!record.get(field).is_empty(), "{} is empty", field);
        }
    }

    #[test]
    fn test_blank_owner_values_become_sentinel() {
        let record = MergedRecord::merge(
            item(),
            DetailAugmentation::default(),
            OwnerAugmentation {
                birth_date: Some("  ".to_string()),
                notable_work: None,
            },
            false,
        );
        assert_eq!(record.author_birth_date, NOT_AVAILABLE);
    }

    #[test]
    fn test_field_from_str() {
        assert_eq!("title".parse::<Field>(), Ok(Field::Title));
        assert_eq!("Author Name".parse::<Field>(), Ok(Field::AuthorName));
        assert_eq!(
            "FIRST_PUBLISH_YEAR".parse::<Field>(),
            Ok(Field::FirstPublishYear)
        );
        assert_eq!("ratings-average".parse::<Field>(), Ok(Field::RatingsAverage));
        assert!("isbn".parse::<Field>().is_err());
    }

    #[test]
    fn test_matches_is_case_insensitive_across_fields() {
        let record = MergedRecord::merge(
            item(),
            DetailAugmentation::default(),
            OwnerAugmentation::default(),
            false,
        );
        assert!(record.matches("herbert"));
        assert!(record.matches("deserts"));
        assert!(record.matches("1965"));
        assert!(!record.matches("asimov"));
    }

    #[test]
    fn test_export_counts_degraded() {
        let ok = MergedRecord::merge(
            item(),
            DetailAugmentation::default(),
            OwnerAugmentation::default(),
            false,
        );
        let bad = MergedRecord {
            degraded: true,
            ..ok.clone()
        };
        let export = Export::new("science_fiction", vec![ok, bad], None);
        assert_eq!(export.metadata.record_count, 2);
        assert_eq!(export.metadata.degraded_count, 1);
    }
}
