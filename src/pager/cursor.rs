//! Page number, page size and catalog total for the current view.

use std::fmt;

use thiserror::Error;

/// Page sizes offered by the pager.
pub const ALLOWED_PAGE_SIZES: [u32; 3] = [12, 25, 50];

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CursorError {
    #[error("unsupported page size {value}, expected 12, 25 or 50")]
    UnsupportedPageSize { value: u32 },
}

/// A page size from [`ALLOWED_PAGE_SIZES`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PageSize(u32);

impl PageSize {
    pub const DEFAULT: PageSize = PageSize(12);

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for PageSize {
    type Error = CursorError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if ALLOWED_PAGE_SIZES.contains(&value) {
            Ok(Self(value))
        } else {
            Err(CursorError::UnsupportedPageSize { value })
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cursor {
    page: u32,
    size: PageSize,
    total: u64,
}

impl Cursor {
    pub fn new(page: u32, size: PageSize) -> Self {
        Self {
            page: page.max(1),
            size,
            total: 0,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> PageSize {
        self.size
    }

    /// Total record count reported by the latest accepted response.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Zero-based index of the first record on the current page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.size.get())
    }

    pub fn total_pages(&self) -> u32 {
        let pages = self.total.div_ceil(u64::from(self.size.get())).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn clamp_page(&self, page: u32) -> u32 {
        page.clamp(1, self.total_pages())
    }

    /// Page that keeps the first visible record on screen after a resize.
    pub fn page_for_size(&self, size: PageSize) -> u32 {
        let page = self.offset() / u64::from(size.get()) + 1;
        u32::try_from(page).unwrap_or(u32::MAX)
    }

    /// One-based `(first, last)` record numbers for a window of `rows` rows.
    pub fn showing(&self, rows: usize) -> (u64, u64) {
        if rows == 0 {
            return (0, 0);
        }
        let first = self.offset() + 1;
        (first, first + rows as u64 - 1)
    }

    pub(crate) fn point_to(&mut self, page: u32, size: PageSize) {
        self.page = page.max(1);
        self.size = size;
    }

    pub(crate) fn set_total(&mut self, total: u64) {
        self.total = total;
    }
}
