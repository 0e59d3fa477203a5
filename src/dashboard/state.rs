//! Working copy and view state for the catalog table.

use crate::catalog::{CatalogAggregator, CatalogSource};
use crate::models::{Field, MergedRecord};
use std::cmp::Ordering;
use std::num::NonZeroUsize;
use thiserror::Error;
use tracing::{debug, error, info};

/// Default rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Lifecycle of the catalog load.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// Waiting on the aggregator.
    Loading,
    /// Records are available.
    Ready,
    /// The catalog listing could not be fetched.
    Failed(String),
}

/// Sort direction for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Errors from local table operations.
///
/// Indexes are stored zero-based and displayed one-based.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DashboardError {
    #[error("Row {} is out of range ({len} rows)", .row + 1)]
    RowOutOfRange { row: usize, len: usize },

    #[error("Page {} is out of range ({count} pages)", .page + 1)]
    PageOutOfRange { page: usize, count: usize },

    #[error("Page size must be at least 1")]
    InvalidPageSize,
}

/// The catalog table: a mutable working copy plus the current view.
#[derive(Debug)]
pub struct Dashboard {
    records: Vec<MergedRecord>,
    state: LoadState,
    /// Lowercased active search query.
    filter: Option<String>,
    sort: Option<(Field, SortDirection)>,
    page_size: usize,
    /// Indexes into `records`, filtered and sorted.
    view: Vec<usize>,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Dashboard {
    /// Create an empty dashboard with the default page size.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            state: LoadState::Idle,
            filter: None,
            sort: None,
            page_size: DEFAULT_PAGE_SIZE,
            view: Vec::new(),
        }
    }

    /// Create a dashboard over records that are already loaded.
    #[allow(dead_code)] // Used by tests and for embedding without a live source
    pub fn with_records(records: Vec<MergedRecord>) -> Self {
        let mut dashboard = Self::new();
        dashboard.records = records;
        dashboard.state = LoadState::Ready;
        dashboard.refresh_view();
        dashboard
    }

    /// Load the catalog once through `aggregator`.
    ///
    /// A listing failure leaves the table empty and moves to
    /// [`LoadState::Failed`]. There is no retry.
    pub async fn load<S: CatalogSource>(
        &mut self,
        aggregator: &CatalogAggregator<S>,
        limit: NonZeroUsize,
    ) {
        self.state = LoadState::Loading;

        match aggregator.fetch_merged_catalog(limit).await {
            Ok(records) => {
                info!("Dashboard loaded {} records", records.len());
                self.records = records;
                self.state = LoadState::Ready;
            }
            Err(e) => {
                error!("Error fetching catalog: {}", e);
                self.records.clear();
                self.state = LoadState::Failed(e.to_string());
            }
        }

        self.refresh_view();
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    #[allow(dead_code)] // Part of the state API; the CLI awaits the load directly
    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    /// The full working copy, in load order.
    pub fn records(&self) -> &[MergedRecord] {
        &self.records
    }

    /// Replace one cell of the working copy.
    ///
    /// `row` indexes the working copy, not the current view.
    pub fn edit(
        &mut self,
        row: usize,
        field: Field,
        value: impl Into<String>,
    ) -> Result<(), DashboardError> {
        let len = self.records.len();
        let record = self
            .records
            .get_mut(row)
            .ok_or(DashboardError::RowOutOfRange { row, len })?;

        *record.get_mut(field) = value.into();
        debug!(row, column = field.key(), "Cell edited");

        self.refresh_view();
        Ok(())
    }

    /// Filter the view to records containing `query` in any column,
    /// ignoring case. A blank query clears the filter.
    pub fn search(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            self.clear_filter();
            return;
        }

        self.filter = Some(query.to_lowercase());
        self.refresh_view();
        debug!(query, matches = self.view.len(), "Search applied");
    }

    /// Show every record of the working copy again.
    pub fn clear_filter(&mut self) {
        self.filter = None;
        self.refresh_view();
    }

    /// The active search query, if any.
    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// Order the view by a column. Sorting never reorders the working copy.
    pub fn sort_by(&mut self, field: Field, direction: SortDirection) {
        self.sort = Some((field, direction));
        self.refresh_view();
    }

    #[allow(dead_code)] // Counterpart to sort_by for interactive front ends
    pub fn clear_sort(&mut self) {
        self.sort = None;
        self.refresh_view();
    }

    /// Records in the current view: edited, filtered and sorted.
    pub fn view(&self) -> Vec<&MergedRecord> {
        self.view.iter().map(|&i| &self.records[i]).collect()
    }

    pub fn view_len(&self) -> usize {
        self.view.len()
    }

    pub fn set_page_size(&mut self, size: usize) -> Result<(), DashboardError> {
        if size == 0 {
            return Err(DashboardError::InvalidPageSize);
        }
        self.page_size = size;
        Ok(())
    }

    /// Number of pages in the current view. Never less than one.
    pub fn page_count(&self) -> usize {
        self.view.len().div_ceil(self.page_size).max(1)
    }

    pub fn can_next(&self, page: usize) -> bool {
        page + 1 < self.page_count()
    }

    pub fn can_previous(&self, page: usize) -> bool {
        page > 0
    }

    /// Records on the zero-based `page` of the current view.
    pub fn page(&self, page: usize) -> Result<Vec<&MergedRecord>, DashboardError> {
        let count = self.page_count();
        if page >= count {
            return Err(DashboardError::PageOutOfRange { page, count });
        }

        Ok(self
            .view
            .iter()
            .skip(page * self.page_size)
            .take(self.page_size)
            .map(|&i| &self.records[i])
            .collect())
    }

    fn refresh_view(&mut self) {
        let mut view: Vec<usize> = match &self.filter {
            Some(needle) => self
                .records
                .iter()
                .enumerate()
                .filter(|(_, r)| r.matches(needle))
                .map(|(i, _)| i)
                .collect(),
            None => (0..self.records.len()).collect(),
        };

        if let Some((field, direction)) = self.sort {
            let records = &self.records;
            view.sort_by(|&a, &b| {
                let ordering = compare_cells(records[a].get(field), records[b].get(field), field);
                match direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }

        self.view = view;
    }
}

/// Compare two cells of `field`. Numeric columns compare by value; cells
/// that don't parse (including the placeholder) sort after numbers.
fn compare_cells(a: &str, b: &str, field: Field) -> Ordering {
    if field.is_numeric() {
        match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
            (Ok(x), Ok(y)) => return x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            (Ok(_), Err(_)) => return Ordering::Less,
            (Err(_), Ok(_)) => return Ordering::Greater,
            (Err(_), Err(_)) => {}
        }
    }

    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
