//! Grid pagination: page `p` (1-based) shows `[(p-1)*size, p*size)`.

/// Listings per page in the property grid
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// The slice of `items` shown on `page`; page 0 is treated as page 1
pub fn page_slice<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let page_size = page_size.max(1);
    let start = page.max(1).saturating_sub(1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// Number of pages needed for `total` items (at least one)
pub fn page_count(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1)).max(1)
}
