use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A predicate over records of one kind, typically built from query values
/// where every unset field matches everything.
pub trait RecordFilter<T> {
    fn matches(&self, record: &T) -> bool;

    fn apply<'a>(&self, records: &'a [T]) -> Vec<&'a T> {
        records.iter().filter(|record| self.matches(record)).collect()
    }
}

/// Case-insensitive substring match; a blank term matches everything.
pub fn contains_ci(haystack: &str, term: &str) -> bool {
    let term = term.trim();
    if term.is_empty() {
        return true;
    }
    haystack.to_lowercase().contains(&term.to_lowercase())
}

/// `true` when no term is set, or when any of the candidates contains it.
pub fn search_matches(term: Option<&str>, candidates: &[&str]) -> bool {
    match term.map(str::trim) {
        None | Some("") => true,
        Some(term) => candidates.iter().any(|candidate| contains_ci(candidate, term)),
    }
}

pub fn option_matches<T: PartialEq>(wanted: Option<&T>, actual: &T) -> bool {
    wanted.is_none_or(|wanted| wanted == actual)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub visible_pages: Vec<usize>,
}

pub const MAX_VISIBLE_PAGES: usize = 5;

pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let page = page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page);
    let start = (page - 1).saturating_mul(per_page);

    let items = items
        .iter()
        .skip(start)
        .take(per_page)
        .cloned()
        .collect();

    Page {
        items,
        page,
        per_page,
        total_items,
        total_pages,
        visible_pages: page_window(page, total_pages, MAX_VISIBLE_PAGES),
    }
}

/// Page numbers to show around `current`, shifted so the window never leaves
/// `1..=total_pages`.
pub fn page_window(current: usize, total_pages: usize, max_visible: usize) -> Vec<usize> {
    if total_pages == 0 || max_visible == 0 {
        return Vec::new();
    }

    let current = current.clamp(1, total_pages);
    let mut start = current.saturating_sub(max_visible / 2).max(1);
    let end = start.saturating_add(max_visible - 1).min(total_pages);
    if end + 1 - start < max_visible {
        start = (end + 1).saturating_sub(max_visible).max(1);
    }

    (start..=end).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    struct Even;

    impl RecordFilter<u32> for Even {
        fn matches(&self, record: &u32) -> bool {
            record % 2 == 0
        }
    }

    #[test]
    fn blank_search_matches_everything() {
        assert!(contains_ci("Laptop HP", ""));
        assert!(contains_ci("Laptop HP", "   "));
        assert!(search_matches(None, &["anything"]));
        assert!(search_matches(Some(" "), &["anything"]));
    }

    #[test]
    fn search_is_case_insensitive() {
        assert!(contains_ci("Cuentas por Cobrar", "COBRAR"));
        assert!(search_matches(Some("prod001"), &["Laptop", "PROD001"]));
        assert!(!search_matches(Some("xyz"), &["Laptop", "PROD001"]));
    }

    #[test]
    fn date_range_is_inclusive() {
        let day = |d| NaiveDate::from_ymd_opt(2024, 10, d).unwrap();
        let range = DateRange::new(Some(day(2)), Some(day(4)));
        assert!(!range.contains(day(1)));
        assert!(range.contains(day(2)));
        assert!(range.contains(day(4)));
        assert!(!range.contains(day(5)));
        assert!(DateRange::default().contains(day(1)));
    }

    #[test]
    fn paginates_and_reports_totals() {
        let items: Vec<u32> = (1..=23).collect();
        let page = paginate(&items, 3, 10);
        assert_eq!(page.items, vec![21, 22, 23]);
        assert_eq!(page.total_items, 23);
        assert_eq!(page.total_pages, 3);

        let beyond = paginate(&items, 9, 10);
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.page, 9);
        assert_eq!(beyond.total_items, 23);
        assert_eq!(beyond.total_pages, 3);
        assert_eq!(beyond.visible_pages, vec![1, 2, 3]);

        let far = paginate(&items, usize::MAX, 10);
        assert!(far.items.is_empty());
        assert_eq!(far.total_pages, 3);
    }

    #[test]
    fn page_window_stays_in_bounds() {
        assert_eq!(page_window(1, 10, 5), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_window(6, 10, 5), vec![4, 5, 6, 7, 8]);
        assert_eq!(page_window(10, 10, 5), vec![6, 7, 8, 9, 10]);
        assert_eq!(page_window(2, 3, 5), vec![1, 2, 3]);
        assert!(page_window(1, 0, 5).is_empty());
        assert_eq!(page_window(40, 10, 5), vec![6, 7, 8, 9, 10]);
        assert_eq!(page_window(usize::MAX, 2, usize::MAX), vec![1, 2]);
    }

    proptest! {
        #[test]
        fn any_page_number_is_answered(
            len in 0usize..60,
            page in any::<usize>(),
            per_page in 1usize..15,
        ) {
            let items: Vec<usize> = (0..len).collect();
            let result = paginate(&items, page, per_page);
            prop_assert_eq!(result.total_items, len);
            prop_assert!(result.items.len() <= per_page);
            prop_assert!(
                result
                    .visible_pages
                    .iter()
                    .all(|number| (1..=result.total_pages).contains(number))
            );
        }

        #[test]
        fn filter_is_subset_and_idempotent(records in prop::collection::vec(any::<u32>(), 0..50)) {
            let once: Vec<u32> = Even.apply(&records).into_iter().copied().collect();
            let twice: Vec<u32> = Even.apply(&once).into_iter().copied().collect();
            prop_assert!(once.iter().all(|value| records.contains(value)));
            prop_assert_eq!(once, twice);
        }
    }
}
