//! Catalog aggregation.
//!
//! Fetches the subject listing, then enriches every work with a rating
//! lookup and an author lookup. All enrichment requests for the whole
//! listing are in flight at once; the merge waits for every one of them.
//!
//! Enrichment failures are isolated per work: a failed lookup turns into
//! placeholder values and a `degraded` flag, never into an error.

use crate::catalog::{
    is_valid_subject, AuthorDoc, CatalogError, CatalogSource, LookupError, WorkDoc,
};
use crate::models::{CatalogItem, DetailAugmentation, MergedRecord, OwnerAugmentation};
use futures::future::join_all;
use std::num::NonZeroUsize;
use tracing::{debug, error, info, warn};

/// Builds merged catalog rows for one subject.
pub struct CatalogAggregator<S> {
    source: S,
    subject: String,
}

impl<S: CatalogSource> CatalogAggregator<S> {
    /// Create an aggregator over `source` for the given subject key.
    pub fn new(source: S, subject: impl Into<String>) -> Self {
        Self {
            source,
            subject: subject.into(),
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Fetch the listing and return one merged row per work, in listing order.
    ///
    /// # Errors
    /// Returns [`CatalogError::InvalidSubject`] for a blank subject key or
    /// one containing `/`, and [`CatalogError::CatalogUnavailable`] if the
    /// listing itself cannot be fetched. No enrichment requests are made in
    /// either case.
    pub async fn fetch_merged_catalog(
        &self,
        limit: NonZeroUsize,
    ) -> Result<Vec<MergedRecord>, CatalogError> {
        if !is_valid_subject(&self.subject) {
            error!(subject = %self.subject, "Rejected subject key");
            return Err(CatalogError::InvalidSubject(self.subject.clone()));
        }

        info!(subject = %self.subject, limit = limit.get(), "Fetching catalog listing");

        let items = self
            .source
            .subject_works(&self.subject, limit.get())
            .await
            .map_err(|source| {
                error!(subject = %self.subject, error = %source, "Catalog listing failed");
                CatalogError::CatalogUnavailable {
                    subject: self.subject.clone(),
                    source,
                }
            })?;

        info!("Enriching {} works", items.len());

        let records = join_all(items.into_iter().map(|item| self.enrich(item))).await;

        let degraded = records.iter().filter(|r| r.degraded).count();
        if degraded > 0 {
            warn!(
                degraded,
                total = records.len(),
                "Some works are missing enrichment data"
            );
        }
        info!("Catalog ready with {} records", records.len());

        Ok(records)
    }

    /// Run both lookups for one work concurrently and merge the results.
    async fn enrich(&self, item: CatalogItem) -> MergedRecord {
        let (detail, owner) = futures::join!(
            self.lookup_detail(&item.title),
            self.lookup_owner(&item.primary_owner_name)
        );

        let degraded = detail.is_err() || owner.is_err();
        MergedRecord::merge(
            item,
            detail.unwrap_or_default(),
            owner.unwrap_or_default(),
            degraded,
        )
    }

    async fn lookup_detail(&self, title: &str) -> Result<DetailAugmentation, LookupError> {
        let result = self
            .source
            .search_works(title)
            .await
            .and_then(|docs| select_detail(title, &docs));

        match &result {
            Ok(detail) => {
                debug!(title = %title, rating = ?detail.ratings_average, "Detail lookup complete")
            }
            Err(e) => {
                warn!(title = %title, error = %e, "Detail lookup failed, using placeholders")
            }
        }
        result
    }

    async fn lookup_owner(&self, name: &str) -> Result<OwnerAugmentation, LookupError> {
        let result = self
            .source
            .search_authors(name)
            .await
            .and_then(|docs| select_owner(name, &docs));

        match &result {
            Ok(_) => debug!(author = %name, "Author lookup complete"),
            Err(e) => {
                warn!(author = %name, error = %e, "Author lookup failed, using placeholders")
            }
        }
        result
    }
}

/// Take the rating from the first candidate document.
pub fn select_detail(query: &str, docs: &[WorkDoc]) -> Result<DetailAugmentation, LookupError> {
    let first = docs
        .first()
        .ok_or_else(|| LookupError::NoResults(query.to_string()))?;

    Ok(DetailAugmentation {
        ratings_average: first.ratings_average,
    })
}

/// Pick author details from the candidates.
///
/// Birth date and top work are chosen independently: each comes from the
/// first candidate, in response order, that has a non-empty value for it.
pub fn select_owner(query: &str, docs: &[AuthorDoc]) -> Result<OwnerAugmentation, LookupError> {
    if docs.is_empty() {
        return Err(LookupError::NoResults(query.to_string()));
    }

    Ok(OwnerAugmentation {
        birth_date: first_present(docs.iter().map(|d| d.birth_date.as_deref())),
        notable_work: first_present(docs.iter().map(|d| d.top_work.as_deref())),
    })
}

fn first_present<'a>(mut values: impl Iterator<Item = Option<&'a str>>) -> Option<String> {
    values
        .find_map(|v| v.filter(|s| !s.trim().is_empty()))
        .map(str::to_string)
}
