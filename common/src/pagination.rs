//! Abstractions for offset pagination.

use std::num::NonZeroUsize;

/// Default number of items on a [`Page`].
pub const DEFAULT_PAGE_SIZE: NonZeroUsize = match NonZeroUsize::new(50) {
    Some(size) => size,
    None => unreachable!(),
};

/// Pagination arguments.
///
/// Both the page number and the page size are always at least `1`: out of
/// range values are clamped rather than rejected.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Arguments {
    /// Number of the requested page, starting from `1`.
    pub page: NonZeroUsize,

    /// Maximum number of items on the requested page.
    pub page_size: NonZeroUsize,
}

impl Default for Arguments {
    fn default() -> Self {
        Self {
            page: NonZeroUsize::MIN,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Arguments {
    /// Creates new [`Arguments`] clamping `page` and `page_size` to `1`.
    #[must_use]
    pub fn new(page: usize, page_size: usize) -> Self {
        Self {
            page: NonZeroUsize::new(page).unwrap_or(NonZeroUsize::MIN),
            page_size: NonZeroUsize::new(page_size)
                .unwrap_or(NonZeroUsize::MIN),
        }
    }

    /// Returns the number of items preceding the requested page.
    #[must_use]
    pub fn offset(&self) -> usize {
        (self.page.get() - 1).saturating_mul(self.page_size.get())
    }

    /// Returns the exclusive upper bound of the requested page.
    #[must_use]
    pub fn end(&self) -> usize {
        self.offset().saturating_add(self.page_size.get())
    }
}

/// A page of items.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Page<T> {
    /// Items on this [`Page`].
    pub items: Vec<T>,

    /// Total number of items across all pages.
    pub total: usize,

    /// [`Arguments`] this [`Page`] was selected with.
    pub arguments: Arguments,

    /// Indicator whether there is a page after this one.
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Selects a [`Page`] out of all the provided `items`.
    #[must_use]
    pub fn select(
        arguments: Arguments,
        items: impl IntoIterator<Item = T>,
    ) -> Self {
        let (offset, end) = (arguments.offset(), arguments.end());

        let mut total = 0;
        let mut page = Vec::new();
        for item in items {
            if (offset..end).contains(&total) {
                page.push(item);
            }
            total += 1;
        }

        Self {
            items: page,
            total,
            arguments,
            has_more: end < total,
        }
    }

    /// Maps the items of this [`Page`] with the provided function.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        let Self {
            items,
            total,
            arguments,
            has_more,
        } = self;

        Page {
            items: items.into_iter().map(f).collect(),
            total,
            arguments,
            has_more,
        }
    }
}
