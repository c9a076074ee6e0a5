// Reverse-chronological paging over the record sequence.

use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: usize = 6;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: usize,
    pub total_pages: usize,
}

/// Normalizes a raw `page` query value.
///
/// Leading decimal digits, optionally after a `+`, are honored ("2abc" is
/// page 2). Anything that does not yield a positive number, including a
/// missing value, means page 1.
pub fn parse_page(raw: Option<&str>) -> usize {
    let Some(raw) = raw else {
        return 1;
    };
    let raw = raw.trim_start();
    let raw = raw.strip_prefix('+').unwrap_or(raw);
    let digits_end = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());

    match raw[..digits_end].parse::<usize>() {
        Ok(page) if page > 0 => page,
        _ => 1,
    }
}

/// Selects page `page` (1-indexed) of `records`, newest first.
///
/// `records` is oldest-first. Pages past the end are empty; the requested
/// page number is echoed back unclamped.
pub fn paginate<T: Clone>(records: &[T], page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let page = page.max(1);
    let total_pages = records.len().div_ceil(page_size);

    let items = (page - 1)
        .checked_mul(page_size)
        .map(|start| {
            records
                .iter()
                .rev()
                .skip(start)
                .take(page_size)
                .cloned()
                .collect()
        })
        .unwrap_or_default();

    Page {
        items,
        current_page: page,
        total_pages,
    }
}
