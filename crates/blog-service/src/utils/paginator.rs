use std::num::IntErrorKind;

use serde::Serialize;
use utoipa::ToSchema;

/// Slices an ordered result set into fixed-size pages.
#[derive(Clone, Copy, Debug)]
pub struct Paginator {
    per_page: i64,
}

/// One page of results together with its position in the whole set.
#[derive(Serialize, ToSchema, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub object_list: Vec<T>,
    pub number: i64,
    pub num_pages: i64,
    pub count: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl Paginator {
    pub fn new(per_page: i64) -> Self {
        Self {
            per_page: per_page.max(1),
        }
    }

    /// An empty result set still has one (empty) page.
    pub fn num_pages(&self, count: i64) -> i64 {
        let pages = (count + self.per_page - 1) / self.per_page;
        pages.max(1)
    }

    /// Resolves the raw `page` query value. Anything that is not an integer
    /// gives the first page; an out of range integer gives the last.
    pub fn page_number(&self, raw: Option<&str>, count: i64) -> i64 {
        let num_pages = self.num_pages(count);
        let Some(raw) = raw else {
            return 1;
        };

        match raw.trim().parse::<i64>() {
            Ok(number) if (1..=num_pages).contains(&number) => number,
            Ok(_) => num_pages,
            // Still an integer, just too large to represent.
            Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
                num_pages
            }
            Err(_) => 1,
        }
    }

    /// LIMIT / OFFSET pair for a resolved page number.
    pub fn bounds(&self, number: i64) -> (i64, i64) {
        (self.per_page, (number - 1) * self.per_page)
    }

    pub fn page<T>(&self, object_list: Vec<T>, number: i64, count: i64) -> Page<T> {
        let num_pages = self.num_pages(count);

        Page {
            object_list,
            number,
            num_pages,
            count,
            has_next: number < num_pages,
            has_previous: number > 1,
        }
    }
}

impl<T> Page<T> {
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            object_list: self.object_list.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
            has_next: self.has_next,
            has_previous: self.has_previous,
        }
    }
}
