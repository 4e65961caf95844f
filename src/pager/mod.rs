//! Selection-aware pager state.
//!
//! Network work is split into tickets: an operation issues a ticket naming
//! the request, the caller performs the fetch, and the result is handed back
//! with the ticket. Every load ticket carries a sequence number so a response
//! that arrives after a newer load was issued is dropped instead of
//! overwriting the newer page.

pub mod cursor;
pub mod selection;

use tracing::{debug, error, info, warn};

use crate::catalog::{Artwork, ArtworkId, CatalogPage, FetchError, PageRequest};

pub use cursor::{Cursor, CursorError, PageSize, ALLOWED_PAGE_SIZES};
pub use selection::SelectionSet;

pub const LOAD_ERROR: &str = "Failed to fetch data";
pub const BULK_ERROR: &str = "Failed to select items";

/// An issued page load.
#[must_use = "a load ticket must be completed with its fetch result"]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    seq: u64,
    request: PageRequest,
    restore: bool,
}

impl LoadTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn request(&self) -> PageRequest {
        self.request
    }

    /// True for the load that puts the view back after a bulk selection.
    pub fn is_restore(&self) -> bool {
        self.restore
    }
}

/// An issued bulk selection. Completing it yields the restoring load.
#[must_use = "a bulk ticket must be completed so the view can be restored"]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BulkTicket {
    request: PageRequest,
    origin_page: u32,
    origin_size: PageSize,
}

impl BulkTicket {
    pub fn request(&self) -> PageRequest {
        self.request
    }

    pub fn count(&self) -> u32 {
        self.request.limit
    }
}

/// What a completed load did to the pager.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    Failed,
    Discarded,
}

#[derive(Clone, Copy, Debug, Default)]
struct BulkState {
    failed: bool,
}

#[derive(Debug)]
pub struct Pager {
    window: Vec<Artwork>,
    selection: SelectionSet,
    cursor: Cursor,
    last_seq: u64,
    last_is_restore: bool,
    load_pending: bool,
    bulk: Option<BulkState>,
    error: Option<String>,
}

impl Pager {
    pub fn new(page: u32, size: PageSize) -> Self {
        Self {
            window: Vec::new(),
            selection: SelectionSet::new(),
            cursor: Cursor::new(page, size),
            last_seq: 0,
            last_is_restore: false,
            load_pending: false,
            bulk: None,
            error: None,
        }
    }

    pub fn window(&self) -> &[Artwork] {
        &self.window
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.load_pending || self.bulk.is_some()
    }

    pub fn is_bulk_in_progress(&self) -> bool {
        self.bulk.is_some()
    }

    pub fn is_selected(&self, id: ArtworkId) -> bool {
        self.selection.contains(id)
    }

    /// Every row of a nonempty window is selected.
    pub fn is_all_selected(&self) -> bool {
        !self.window.is_empty() && self.selection.contains_all(&self.window)
    }

    pub fn begin_load(&mut self, page: u32, size: PageSize) -> LoadTicket {
        self.issue_load(page, size, false)
    }

    pub fn reload(&mut self) -> LoadTicket {
        self.begin_load(self.cursor.page(), self.cursor.size())
    }

    pub fn next_page(&mut self) -> LoadTicket {
        let page = self.cursor.clamp_page(self.cursor.page().saturating_add(1));
        self.begin_load(page, self.cursor.size())
    }

    pub fn prev_page(&mut self) -> LoadTicket {
        let page = self.cursor.clamp_page(self.cursor.page().saturating_sub(1));
        self.begin_load(page, self.cursor.size())
    }

    pub fn first_page(&mut self) -> LoadTicket {
        self.begin_load(1, self.cursor.size())
    }

    pub fn last_page(&mut self) -> LoadTicket {
        let page = self.cursor.total_pages();
        self.begin_load(page, self.cursor.size())
    }

    pub fn goto_page(&mut self, page: u32) -> LoadTicket {
        let page = self.cursor.clamp_page(page);
        self.begin_load(page, self.cursor.size())
    }

    pub fn resize(&mut self, size: PageSize) -> LoadTicket {
        let page = self.cursor.page_for_size(size);
        self.begin_load(page, size)
    }

    fn issue_load(&mut self, page: u32, size: PageSize, restore: bool) -> LoadTicket {
        self.last_seq += 1;
        self.last_is_restore = restore;
        self.load_pending = true;
        self.cursor.point_to(page, size);
        let ticket = LoadTicket {
            seq: self.last_seq,
            request: PageRequest::new(page, size.get()),
            restore,
        };
        debug!(
            seq = ticket.seq,
            page = ticket.request.page,
            size = ticket.request.limit,
            restore,
            "issued page load"
        );
        ticket
    }

    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<CatalogPage, FetchError>,
    ) -> LoadOutcome {
        let bulk_failed = if ticket.restore {
            self.bulk.take().map(|b| b.failed).unwrap_or(false)
        } else {
            false
        };

        if ticket.seq != self.last_seq {
            debug!(
                seq = ticket.seq,
                latest = self.last_seq,
                "discarding superseded page load"
            );
            return LoadOutcome::Discarded;
        }

        self.load_pending = false;
        match result {
            Ok(page) => {
                info!(
                    page = ticket.request.page,
                    rows = page.records.len(),
                    total = page.total,
                    "loaded catalog page"
                );
                self.window = page.records;
                self.cursor.set_total(page.total);
                if !bulk_failed {
                    self.error = None;
                }
                LoadOutcome::Applied
            }
            Err(e) => {
                error!(page = ticket.request.page, error = %e, "error fetching data");
                self.error = Some(format!("{LOAD_ERROR}: {e}"));
                LoadOutcome::Failed
            }
        }
    }

    /// Add or remove a single row. Both directions are idempotent.
    pub fn toggle_row(&mut self, record: &Artwork, selected: bool) {
        if selected {
            self.selection.insert(record.clone());
        } else {
            self.selection.remove(record.id);
        }
    }

    /// Flip membership of a row on the current page. Returns the new state, or
    /// `None` when the id is not on the page.
    pub fn toggle_window_row(&mut self, id: ArtworkId) -> Option<bool> {
        let record = self.window.iter().find(|r| r.id == id)?.clone();
        let selected = !self.selection.contains(id);
        self.toggle_row(&record, selected);
        Some(selected)
    }

    /// Deselect by id, wherever the row lives.
    pub fn deselect(&mut self, id: ArtworkId) -> bool {
        self.selection.remove(id).is_some()
    }

    /// Select every row of the current page, or deselect them all when they
    /// already are. Selections on other pages are untouched.
    pub fn toggle_select_all(&mut self) -> bool {
        if self.is_all_selected() {
            for record in &self.window {
                self.selection.remove(record.id);
            }
            false
        } else {
            for record in &self.window {
                self.selection.insert(record.clone());
            }
            !self.window.is_empty()
        }
    }

    /// Start selecting the first `count` catalog records. Returns `None` for a
    /// zero count or while another bulk selection is running. Once a total is
    /// known the count is capped at it.
    pub fn begin_bulk(&mut self, count: u32) -> Option<BulkTicket> {
        if count == 0 {
            return None;
        }
        if self.bulk.is_some() {
            warn!(count, "bulk selection already in progress");
            return None;
        }
        let total = self.cursor.total();
        let count = match u32::try_from(total) {
            Ok(total) if total > 0 => count.min(total),
            _ => count,
        };
        self.bulk = Some(BulkState::default());
        debug!(count, "issued bulk selection");
        Some(BulkTicket {
            request: PageRequest::new(1, count),
            origin_page: self.cursor.page(),
            origin_size: self.cursor.size(),
        })
    }

    /// Merge the bulk result into the selection and return the load that
    /// restores the page that was showing when the bulk selection started.
    /// The restoring load is issued whatever the bulk result was.
    pub fn complete_bulk(
        &mut self,
        ticket: BulkTicket,
        result: Result<CatalogPage, FetchError>,
    ) -> LoadTicket {
        match result {
            Ok(page) => {
                let fetched = page.records.len();
                let added = page
                    .records
                    .into_iter()
                    .filter(|record| self.selection.insert(record.clone()))
                    .count();
                info!(requested = ticket.count(), fetched, added, "bulk selection merged");
            }
            Err(e) => {
                error!(count = ticket.count(), error = %e, "error fetching data for selection");
                self.error = Some(format!("{BULK_ERROR}: {e}"));
                self.bulk.get_or_insert_with(BulkState::default).failed = true;
            }
        }
        if self.bulk.is_none() {
            self.bulk = Some(BulkState::default());
        }
        self.issue_load(ticket.origin_page, ticket.origin_size, true)
    }

    /// End a bulk selection whose driver went away before the restoring load
    /// completed. A restoring load still in flight is invalidated so its late
    /// result is discarded.
    pub fn abandon_bulk(&mut self) {
        if self.bulk.take().is_none() {
            return;
        }
        if self.load_pending && self.last_is_restore {
            self.last_seq += 1;
            self.last_is_restore = false;
            self.load_pending = false;
        }
        warn!("bulk selection abandoned");
    }
}
