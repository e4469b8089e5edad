use serde::Serialize;

pub const PAGE_SIZE: usize = 25;

/// Pages on either side of the current page shown in the pager.
const WINDOW: usize = 2;

/// One page of a result set.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
    pub page_size: usize,
}

impl<T> Page<T> {
    /// Slice `items` to the requested 1-based page, clamped into range.
    pub fn paginate(items: Vec<T>, requested: usize) -> Self {
        let total = items.len();
        let total_pages = total.div_ceil(PAGE_SIZE).max(1);
        let page = requested.clamp(1, total_pages);
        let items = items
            .into_iter()
            .skip((page - 1) * PAGE_SIZE)
            .take(PAGE_SIZE)
            .collect();

        Self {
            items,
            total,
            page,
            total_pages,
            page_size: PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PagerItem {
    Page { number: usize, current: bool },
    Ellipsis,
}

/// Pager buttons: first page, a window around `current`, last page, with
/// ellipses over the gaps.
pub fn pager_window(current: usize, total_pages: usize) -> Vec<PagerItem> {
    let page = |number| PagerItem::Page {
        number,
        current: number == current,
    };

    let mut items = vec![page(1)];
    let start = current.saturating_sub(WINDOW).max(2);
    let end = (current + WINDOW).min(total_pages.saturating_sub(1));

    if start > 2 {
        items.push(PagerItem::Ellipsis);
    }
    items.extend((start..=end).map(page));
    if end < total_pages.saturating_sub(1) {
        items.push(PagerItem::Ellipsis);
    }
    if total_pages >= 2 {
        items.push(page(total_pages));
    }
    items
}

/// `"1,234 games • Page 2 of 50"`
pub fn results_summary(total: usize, noun: &str, page: usize, total_pages: usize) -> String {
    let plural = if total == 1 { "" } else { "s" };
    format!(
        "{} {noun}{plural} • Page {page} of {total_pages}",
        group_thousands(total)
    )
}

fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
