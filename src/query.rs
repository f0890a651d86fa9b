// Search, filter, sort and paginate a collection

use crate::filter::Filter;
use crate::record::Record;
use std::cmp::Ordering;

/// Rows per table page
pub const PAGE_SIZE: usize = 10;

/// Page buttons shown at once in the pagination bar
const PAGE_WINDOW: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flip(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }

    /// Clicking a column header: the same field flips direction, another field sorts ascending
    pub fn toggle(&mut self, field: &str) {
        if self.field == field {
            self.direction = self.direction.flip();
        } else {
            *self = Sort::ascending(field);
        }
    }
}

/// Query parameters for one table view
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub search: String,
    pub filters: Vec<Filter>,
    pub sort: Sort,
    /// 1-based
    pub page: usize,
    pub page_size: usize,
}

impl Query {
    /// Unfiltered first page sorted on the collection's default field
    pub fn for_record<T: Record>() -> Self {
        Self::sorted_by(T::default_sort())
    }

    pub fn sorted_by(field: &str) -> Self {
        Self {
            search: String::new(),
            filters: Vec::new(),
            sort: Sort::ascending(field),
            page: 1,
            page_size: PAGE_SIZE,
        }
    }

    /// Replace the filter on `filter.field`, or add it
    pub fn set_filter(&mut self, filter: Filter) {
        match self.filters.iter_mut().find(|f| f.field == filter.field) {
            Some(existing) => *existing = filter,
            None => self.filters.push(filter),
        }
    }
}

/// One rendered page plus what the pagination bar needs
#[derive(Debug)]
pub struct PageView<'a, T> {
    pub items: Vec<&'a T>,
    /// Records passing search and filters, across all pages
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

impl<T: Record> PageView<'_, T> {
    pub fn total_pages(&self) -> usize {
        total_pages(self.total, self.page_size)
    }

    pub fn ids(&self) -> Vec<u64> {
        self.items.iter().map(|r| r.id()).collect()
    }

    /// 1-based (first, last) rows shown, `None` for an empty page
    pub fn range(&self) -> Option<(usize, usize)> {
        if self.items.is_empty() {
            return None;
        }
        let first = (self.page - 1) * self.page_size + 1;
        Some((first, first + self.items.len() - 1))
    }

    pub fn summary(&self) -> String {
        match self.range() {
            Some((first, last)) => format!("Showing {} to {} of {} results", first, last, self.total),
            None => format!("Showing 0 of {} results", self.total),
        }
    }
}

pub fn total_pages(total: usize, page_size: usize) -> usize {
    if page_size == 0 { 0 } else { total.div_ceil(page_size) }
}

/// Clamp a requested page into `[1, max(total_pages, 1)]`
pub fn clamp_page(page: usize, total: usize, page_size: usize) -> usize {
    page.clamp(1, total_pages(total, page_size).max(1))
}

/// Page numbers for the pagination bar, starting two before the current page
pub fn page_window(current: usize, total_pages: usize) -> Vec<usize> {
    let start = current.saturating_sub(2).max(1);
    (start..start + PAGE_WINDOW.min(total_pages))
        .take_while(|page| *page <= total_pages)
        .collect()
}

/// Case-insensitive substring match over the searchable fields
pub fn matches_search<T: Record>(record: &T, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let needle = needle.to_lowercase();
    T::searchable_fields().iter().any(|name| {
        record
            .field(name)
            .is_some_and(|value| value.to_string().to_lowercase().contains(&needle))
    })
}

fn compare_field<T: Record>(a: &T, b: &T, sort: &Sort) -> Ordering {
    let ordering = match (a.field(&sort.field), b.field(&sort.field)) {
        (Some(x), Some(y)) => x.compare(&y),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    match sort.direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

/// Filtered and sorted records, before pagination
pub fn filter_sorted<'a, T: Record>(records: &'a [T], query: &Query) -> Vec<&'a T> {
    let mut rows: Vec<&T> = records
        .iter()
        .filter(|r| matches_search(*r, &query.search))
        .filter(|r| query.filters.iter().all(|f| f.matches(*r)))
        .collect();

    // Stable: equal keys keep collection order
    rows.sort_by(|a, b| compare_field(*a, *b, &query.sort));
    rows
}

/// Compute the page for `query`; out-of-range pages come back empty
pub fn run<'a, T: Record>(records: &'a [T], query: &Query) -> PageView<'a, T> {
    let rows = filter_sorted(records, query);
    let total = rows.len();

    let items = match query.page.checked_sub(1) {
        Some(index) => rows
            .into_iter()
            .skip(index.saturating_mul(query.page_size))
            .take(query.page_size)
            .collect(),
        None => Vec::new(),
    };

    PageView {
        items,
        total,
        page: query.page,
        page_size: query.page_size,
    }
}
