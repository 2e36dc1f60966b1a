//! Keyset pagination
//!
//! Items are ordered by `(created_at, id)` ascending. A cursor is the id of the
//! last item of the previous page, and the next page starts strictly after it.
//! Both storage backends produce their pages through [`Page::from_overfetch`]:
//! they fetch one row more than requested and the extra row only decides
//! `has_next_page`.

use crate::error::{AppError, Result};
use crate::models::{Comment, Post};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// Items ordered by `(created_at, id)`
pub trait Keyset {
    fn created_at(&self) -> DateTime<Utc>;
    fn id(&self) -> &str;
}

impl Keyset for Comment {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn id(&self) -> &str {
        &self.id
    }
}

impl Keyset for Post {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn id(&self) -> &str {
        &self.id
    }
}

/// Validated page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    first: usize,
    after: Option<String>,
}

impl PageRequest {
    /// `first` is required and must lie in `0..=max_page_size`. An empty cursor
    /// is the same as no cursor.
    pub fn new(first: Option<i64>, after: Option<String>, max_page_size: usize) -> Result<Self> {
        let first = first.ok_or(AppError::MissingPageSize)?;
        if first < 0 {
            return Err(AppError::InvalidPageSize(first));
        }
        if first as u64 > max_page_size as u64 {
            return Err(AppError::PageSizeTooLarge {
                requested: first,
                max: max_page_size,
            });
        }

        Ok(Self {
            first: first as usize,
            after: after.filter(|cursor| !cursor.is_empty()),
        })
    }

    pub fn first(&self) -> usize {
        self.first
    }

    pub fn after(&self) -> Option<&str> {
        self.after.as_deref()
    }

    /// Rows to fetch from a backend: the page plus one lookahead row
    pub fn fetch_limit(&self) -> i64 {
        self.first as i64 + 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_next_page: bool,
    /// Id of the last returned item, `None` for an empty page
    pub end_cursor: Option<String>,
}

impl<T: Keyset> Page<T> {
    /// Build a page from up to `fetch_limit()` rows already in keyset order
    pub fn from_overfetch(mut rows: Vec<T>, request: &PageRequest) -> Self {
        let has_next_page = rows.len() > request.first;
        rows.truncate(request.first);
        let end_cursor = rows.last().map(|item| item.id().to_string());

        Self {
            items: rows,
            has_next_page,
            end_cursor,
        }
    }
}

pub fn keyset_cmp<T: Keyset>(a: &T, b: &T) -> Ordering {
    a.created_at()
        .cmp(&b.created_at())
        .then_with(|| a.id().cmp(b.id()))
}

/// Order `candidates` and cut the page described by `request`
pub fn paginate<T: Keyset>(mut candidates: Vec<T>, request: &PageRequest) -> Result<Page<T>> {
    candidates.sort_by(keyset_cmp);

    let start = match request.after() {
        Some(cursor) => {
            let position = candidates
                .iter()
                .position(|item| item.id() == cursor)
                .ok_or_else(|| AppError::InvalidCursor(cursor.to_string()))?;
            position + 1
        }
        None => 0,
    };

    let window: Vec<T> = candidates
        .into_iter()
        .skip(start)
        .take(request.fetch_limit() as usize)
        .collect();

    Ok(Page::from_overfetch(window, request))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn comment(id: &str, second: u32) -> Comment {
        Comment {
            id: id.to_string(),
            post_id: "post".to_string(),
            parent_id: None,
            content: format!("comment {}", id),
            created_at: Utc.with_ymd_and_hms(2025, 9, 30, 20, 0, second).unwrap(),
        }
    }

    fn request(first: i64, after: Option<&str>) -> PageRequest {
        PageRequest::new(Some(first), after.map(str::to_string), 100).unwrap()
    }

    fn ids(page: &Page<Comment>) -> Vec<&str> {
        page.items.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_page_request_validation() {
        assert!(matches!(
            PageRequest::new(None, None, 100),
            Err(AppError::MissingPageSize)
        ));
        assert!(matches!(
            PageRequest::new(Some(-1), None, 100),
            Err(AppError::InvalidPageSize(-1))
        ));
        assert!(matches!(
            PageRequest::new(Some(101), None, 100),
            Err(AppError::PageSizeTooLarge { requested: 101, max: 100 })
        ));

        let req = PageRequest::new(Some(0), Some(String::new()), 100).unwrap();
        assert_eq!(req.first(), 0);
        assert_eq!(req.after(), None);
        assert_eq!(req.fetch_limit(), 1);
    }

    #[test]
    fn test_orders_by_timestamp_then_id() {
        let candidates = vec![comment("c", 2), comment("b", 1), comment("a", 2), comment("d", 0)];
        let page = paginate(candidates, &request(10, None)).unwrap();

        assert_eq!(ids(&page), vec!["d", "b", "a", "c"]);
        assert!(!page.has_next_page);
        assert_eq!(page.end_cursor.as_deref(), Some("c"));
    }

    #[test]
    fn test_cursor_walk_visits_every_item_once() {
        let candidates: Vec<Comment> = (0..7).map(|i| comment(&format!("c{}", i), i)).collect();

        let mut seen = Vec::new();
        let mut after: Option<String> = None;
        loop {
            let page = paginate(candidates.clone(), &request(3, after.as_deref())).unwrap();
            assert!(page.items.len() <= 3);
            seen.extend(page.items.iter().map(|c| c.id.clone()));

            let next = paginate(
                candidates.clone(),
                &request(3, page.end_cursor.as_deref()),
            )
            .unwrap();
            assert_eq!(page.has_next_page, !next.items.is_empty());

            if !page.has_next_page {
                break;
            }
            after = page.end_cursor;
        }

        let expected: Vec<String> = (0..7).map(|i| format!("c{}", i)).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_exact_fit_has_no_next_page() {
        let candidates = vec![comment("a", 0), comment("b", 1)];
        let page = paginate(candidates, &request(2, None)).unwrap();
        assert_eq!(page.items.len(), 2);
        assert!(!page.has_next_page);
    }

    #[test]
    fn test_zero_page_size_reports_remaining_items() {
        let candidates = vec![comment("a", 0), comment("b", 1)];

        let page = paginate(candidates.clone(), &request(0, None)).unwrap();
        assert!(page.items.is_empty());
        assert!(page.has_next_page);
        assert_eq!(page.end_cursor, None);

        let page = paginate(candidates, &request(0, Some("b"))).unwrap();
        assert!(!page.has_next_page);
    }

    #[test]
    fn test_unknown_cursor_is_rejected() {
        let candidates = vec![comment("a", 0)];
        let err = paginate(candidates, &request(5, Some("missing"))).unwrap_err();
        assert!(matches!(err, AppError::InvalidCursor(ref c) if c == "missing"));
    }

    #[test]
    fn test_empty_candidates() {
        let page = paginate(Vec::<Comment>::new(), &request(5, None)).unwrap();
        assert!(page.items.is_empty());
        assert!(!page.has_next_page);
        assert_eq!(page.end_cursor, None);
    }
}
