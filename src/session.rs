use crate::catalog::{Artwork, CatalogFetcher};
use crate::pager::{LoadOutcome, LoadTicket, PageSize, Pager};

/// Abandons the bulk selection unless the restoring load was completed.
struct BulkGuard<'a> {
    pager: &'a mut Pager,
    finished: bool,
}

impl Drop for BulkGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.pager.abandon_bulk();
        }
    }
}

/// Drives a [`Pager`] against a fetcher, one operation at a time.
pub struct Session<F> {
    pager: Pager,
    fetcher: F,
}

impl<F: CatalogFetcher> Session<F> {
    pub fn new(fetcher: F, page: u32, size: PageSize) -> Self {
        Self {
            pager: Pager::new(page, size),
            fetcher,
        }
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub async fn load_page(&mut self, page: u32, size: PageSize) -> LoadOutcome {
        let ticket = self.pager.begin_load(page, size);
        self.run(ticket).await
    }

    pub async fn reload(&mut self) -> LoadOutcome {
        let ticket = self.pager.reload();
        self.run(ticket).await
    }

    pub async fn next_page(&mut self) -> LoadOutcome {
        let ticket = self.pager.next_page();
        self.run(ticket).await
    }

    pub async fn prev_page(&mut self) -> LoadOutcome {
        let ticket = self.pager.prev_page();
        self.run(ticket).await
    }

    pub async fn goto_page(&mut self, page: u32) -> LoadOutcome {
        let ticket = self.pager.goto_page(page);
        self.run(ticket).await
    }

    pub async fn resize(&mut self, size: PageSize) -> LoadOutcome {
        let ticket = self.pager.resize(size);
        self.run(ticket).await
    }

    pub fn toggle_row(&mut self, record: &Artwork, selected: bool) {
        self.pager.toggle_row(record, selected);
    }

    pub fn toggle_select_all(&mut self) -> bool {
        self.pager.toggle_select_all()
    }

    /// Select the first `count` catalog records, then reload the page that
    /// was showing. The reload runs even when the bulk fetch fails. Returns
    /// `None` when nothing was started. Dropping the future part way through
    /// ends the bulk selection and releases the busy state.
    pub async fn bulk_select(&mut self, count: u32) -> Option<LoadOutcome> {
        let ticket = self.pager.begin_bulk(count)?;
        let mut guard = BulkGuard {
            pager: &mut self.pager,
            finished: false,
        };
        let result = self.fetcher.fetch_page(ticket.request()).await;
        let restore = guard.pager.complete_bulk(ticket, result);
        let result = self.fetcher.fetch_page(restore.request()).await;
        let outcome = guard.pager.complete_load(restore, result);
        guard.finished = true;
        Some(outcome)
    }

    /// Fetch and complete an already issued load.
    pub async fn run(&mut self, ticket: LoadTicket) -> LoadOutcome {
        let result = self.fetcher.fetch_page(ticket.request()).await;
        self.pager.complete_load(ticket, result)
    }
}
