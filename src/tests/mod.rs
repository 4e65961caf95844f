use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::FuturesUnordered;
use futures::StreamExt;

use crate::catalog::{Artwork, ArtworkId, CatalogFetcher, CatalogPage, FetchError, PageRequest};
use crate::pager::{LoadOutcome, PageSize, Pager, BULK_ERROR, LOAD_ERROR};
use crate::session::Session;

/// In-memory catalog whose ids run from 1 to `total`.
struct FakeCatalog {
    total: u64,
    failing: Mutex<HashSet<(u32, u32)>>,
    slow_pages: HashSet<u32>,
    requests: Mutex<Vec<(u32, u32)>>,
}

impl FakeCatalog {
    fn new(total: u64) -> Self {
        Self {
            total,
            failing: Mutex::new(HashSet::new()),
            slow_pages: HashSet::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn fail(&self, page: u32, limit: u32) {
        self.failing.lock().unwrap().insert((page, limit));
    }

    fn heal(&self, page: u32, limit: u32) {
        self.failing.lock().unwrap().remove(&(page, limit));
    }

    fn requests(&self) -> Vec<(u32, u32)> {
        self.requests.lock().unwrap().clone()
    }
}

fn artwork(id: ArtworkId) -> Artwork {
    Artwork {
        id,
        title: format!("Artwork {id}"),
        place_of_origin: "Italy".to_string(),
        artist_display: "Workshop".to_string(),
        inscriptions: "None".to_string(),
        date_start: 1500,
        date_end: 1510,
    }
}

#[async_trait]
impl CatalogFetcher for FakeCatalog {
    async fn fetch_page(&self, request: PageRequest) -> Result<CatalogPage, FetchError> {
        self.requests
            .lock()
            .unwrap()
            .push((request.page, request.limit));
        if self.slow_pages.contains(&request.page) {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        if self
            .failing
            .lock()
            .unwrap()
            .contains(&(request.page, request.limit))
        {
            return Err(FetchError::Status { status: 503 });
        }
        let start = u64::from(request.page - 1) * u64::from(request.limit) + 1;
        let end = (start + u64::from(request.limit) - 1).min(self.total);
        Ok(CatalogPage {
            records: (start..=end).map(artwork).collect(),
            total: self.total,
        })
    }
}

fn size(value: u32) -> PageSize {
    PageSize::try_from(value).unwrap()
}

fn window_ids(pager: &Pager) -> Vec<ArtworkId> {
    pager.window().iter().map(|r| r.id).collect()
}

fn selected_ids(pager: &Pager) -> Vec<ArtworkId> {
    pager.selection().iter().map(|r| r.id).collect()
}

#[tokio::test]
async fn selection_survives_paging_away_and_back() {
    let mut session = Session::new(FakeCatalog::new(100), 1, size(12));
    session.load_page(1, size(12)).await;
    let first = session.pager().window()[0].clone();
    session.toggle_row(&first, true);

    assert_eq!(session.load_page(2, size(12)).await, LoadOutcome::Applied);
    assert!(!window_ids(session.pager()).contains(&first.id));
    assert!(session.pager().is_selected(first.id));

    session.load_page(1, size(12)).await;
    assert_eq!(session.pager().window()[0].id, first.id);
    assert!(session.pager().is_selected(first.id));
    assert_eq!(session.pager().selection().len(), 1);
}

#[tokio::test]
async fn toggling_a_row_an_even_number_of_times_is_a_noop() {
    let mut session = Session::new(FakeCatalog::new(100), 1, size(12));
    session.load_page(1, size(12)).await;
    let rows = session.pager().window().to_vec();
    session.toggle_row(&rows[4], true);
    let before = selected_ids(session.pager());

    for _ in 0..2 {
        session.toggle_row(&rows[0], true);
        session.toggle_row(&rows[0], false);
    }
    assert_eq!(selected_ids(session.pager()), before);

    for _ in 0..2 {
        session.toggle_row(&rows[4], false);
        session.toggle_row(&rows[4], true);
    }
    assert_eq!(selected_ids(session.pager()), before);

    session.toggle_row(&rows[1], true);
    session.toggle_row(&rows[1], true);
    assert_eq!(session.pager().selection().len(), 2);
}

#[tokio::test]
async fn select_all_only_touches_the_current_page() {
    let mut session = Session::new(FakeCatalog::new(100), 1, size(12));
    session.load_page(2, size(12)).await;
    let page_two = session.pager().window().to_vec();
    for record in &page_two[..3] {
        session.toggle_row(record, true);
    }

    session.load_page(1, size(12)).await;
    assert!(!session.pager().is_all_selected());
    assert!(session.toggle_select_all());
    assert!(session.pager().is_all_selected());
    assert_eq!(session.pager().selection().len(), 15);

    assert!(!session.toggle_select_all());
    assert!(!session.pager().is_all_selected());
    assert_eq!(
        selected_ids(session.pager()),
        page_two[..3].iter().map(|r| r.id).collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn partially_selected_page_selects_the_rest() {
    let mut session = Session::new(FakeCatalog::new(30), 1, size(12));
    session.load_page(3, size(12)).await;
    assert_eq!(window_ids(session.pager()), (25..=30).collect::<Vec<_>>());
    let row = session.pager().window()[2].clone();
    session.toggle_row(&row, true);

    assert!(session.toggle_select_all());
    assert_eq!(session.pager().selection().len(), 6);
    assert_eq!(selected_ids(session.pager())[0], row.id);
}

#[tokio::test]
async fn bulk_select_merges_without_duplicates() {
    let mut session = Session::new(FakeCatalog::new(100), 1, size(12));
    session.load_page(2, size(12)).await;

    let mut local = artwork(3);
    local.title = "Kept from an earlier page".to_string();
    session.toggle_row(&local, true);
    let extra = session.pager().window()[0].clone();
    session.toggle_row(&extra, true);

    assert_eq!(session.bulk_select(5).await, Some(LoadOutcome::Applied));

    let pager = session.pager();
    assert_eq!(pager.selection().len(), 6);
    assert_eq!(selected_ids(pager), vec![3, 13, 1, 2, 4, 5]);
    assert_eq!(
        pager.selection().get(3).map(|r| r.title.as_str()),
        Some("Kept from an earlier page")
    );
}

#[tokio::test]
async fn bulk_select_puts_the_previous_page_back() {
    let mut session = Session::new(FakeCatalog::new(100), 1, size(25));
    session.load_page(2, size(25)).await;
    let before = session.pager().window().to_vec();

    session.bulk_select(5).await;

    let pager = session.pager();
    assert_eq!(pager.window(), before.as_slice());
    assert_eq!(pager.cursor().page(), 2);
    assert_eq!(pager.cursor().size(), size(25));
    assert!(!pager.is_busy());
    assert_eq!(pager.error(), None);
    assert_eq!(
        session.fetcher().requests(),
        vec![(2, 25), (1, 5), (2, 25)]
    );
}

#[tokio::test]
async fn failed_bulk_select_keeps_selection_and_still_restores() {
    let catalog = FakeCatalog::new(100);
    catalog.fail(1, 5);
    let mut session = Session::new(catalog, 1, size(12));
    session.load_page(2, size(12)).await;
    let row = session.pager().window()[1].clone();
    session.toggle_row(&row, true);
    let before = selected_ids(session.pager());
    let window_before = session.pager().window().to_vec();

    assert_eq!(session.bulk_select(5).await, Some(LoadOutcome::Applied));

    let pager = session.pager();
    assert_eq!(selected_ids(pager), before);
    assert!(pager.error().unwrap().starts_with(BULK_ERROR));
    assert!(!pager.is_busy());
    assert_eq!(pager.window(), window_before.as_slice());
    assert_eq!(session.fetcher().requests().last(), Some(&(2, 12)));
}

#[tokio::test]
async fn non_positive_bulk_count_does_nothing() {
    let mut session = Session::new(FakeCatalog::new(100), 1, size(12));
    session.load_page(1, size(12)).await;
    assert_eq!(session.bulk_select(0).await, None);
    assert_eq!(session.fetcher().requests().len(), 1);
    assert!(session.pager().selection().is_empty());
    assert!(!session.pager().is_busy());
}

#[tokio::test]
async fn failed_load_keeps_the_previous_window() {
    let catalog = FakeCatalog::new(100);
    catalog.fail(3, 12);
    let mut session = Session::new(catalog, 1, size(12));
    session.load_page(2, size(12)).await;
    let page_two = session.pager().window().to_vec();

    assert_eq!(session.load_page(3, size(12)).await, LoadOutcome::Failed);

    let pager = session.pager();
    assert_eq!(pager.window(), page_two.as_slice());
    assert!(pager.error().unwrap().starts_with(LOAD_ERROR));
    assert!(!pager.is_busy());
}

#[tokio::test]
async fn next_successful_load_clears_the_error() {
    let catalog = FakeCatalog::new(100);
    catalog.fail(3, 12);
    let mut session = Session::new(catalog, 1, size(12));
    session.load_page(3, size(12)).await;
    assert!(session.pager().error().is_some());

    session.fetcher().heal(3, 12);
    assert_eq!(session.reload().await, LoadOutcome::Applied);
    assert_eq!(session.pager().error(), None);
    assert_eq!(session.pager().window()[0].id, 25);
}

#[tokio::test]
async fn slower_stale_response_does_not_overwrite_newer_page() {
    let mut catalog = FakeCatalog::new(100);
    catalog.slow_pages.insert(1);
    let mut pager = Pager::new(1, size(12));

    let mut in_flight = FuturesUnordered::new();
    for page in [1, 2] {
        let ticket = pager.begin_load(page, size(12));
        let catalog = &catalog;
        in_flight.push(async move { (ticket, catalog.fetch_page(ticket.request()).await) });
    }
    assert!(pager.is_busy());

    let mut outcomes = Vec::new();
    while let Some((ticket, result)) = in_flight.next().await {
        outcomes.push((ticket.request().page, pager.complete_load(ticket, result)));
    }

    assert_eq!(
        outcomes,
        vec![(2, LoadOutcome::Applied), (1, LoadOutcome::Discarded)]
    );
    assert_eq!(window_ids(&pager), (13..=24).collect::<Vec<_>>());
    assert_eq!(pager.cursor().page(), 2);
    assert!(!pager.is_busy());
}

#[tokio::test]
async fn page_size_change_mid_flight_wins() {
    let catalog = FakeCatalog::new(100);
    let mut pager = Pager::new(1, size(12));
    let small = pager.begin_load(1, size(12));
    let large = pager.resize(size(50));

    let large_result = catalog.fetch_page(large.request()).await;
    let small_result = catalog.fetch_page(small.request()).await;
    pager.complete_load(large, large_result);
    assert_eq!(pager.complete_load(small, small_result), LoadOutcome::Discarded);
    assert_eq!(pager.window().len(), 50);
    assert_eq!(pager.cursor().size(), size(50));
}

#[tokio::test]
async fn busy_holds_until_the_restoring_load_finishes() {
    let catalog = FakeCatalog::new(100);
    let mut pager = Pager::new(1, size(12));
    let t = pager.begin_load(1, size(12));
    let r = catalog.fetch_page(t.request()).await;
    pager.complete_load(t, r);
    assert!(!pager.is_busy());

    let bulk = pager.begin_bulk(20).unwrap();
    assert!(pager.is_busy());
    let r = catalog.fetch_page(bulk.request()).await;
    let restore = pager.complete_bulk(bulk, r);
    assert!(pager.is_busy());
    assert_eq!(pager.selection().len(), 20);
    assert_eq!(restore.request(), PageRequest::new(1, 12));

    catalog.fail(1, 12);
    let r = catalog.fetch_page(restore.request()).await;
    assert_eq!(pager.complete_load(restore, r), LoadOutcome::Failed);
    assert!(!pager.is_busy());
    assert!(pager.error().unwrap().starts_with(LOAD_ERROR));
    assert_eq!(window_ids(&pager), (1..=12).collect::<Vec<_>>());
}

#[tokio::test]
async fn bulk_select_cancelled_during_its_fetch_releases_busy() {
    let mut catalog = FakeCatalog::new(100);
    catalog.slow_pages.insert(1);
    let mut session = Session::new(catalog, 2, size(12));
    session.load_page(2, size(12)).await;

    let cancelled = tokio::time::timeout(Duration::from_millis(5), session.bulk_select(5)).await;
    assert!(cancelled.is_err());

    assert!(!session.pager().is_busy());
    assert!(!session.pager().is_bulk_in_progress());
    assert!(session.pager().selection().is_empty());
    assert_eq!(window_ids(session.pager()), (13..=24).collect::<Vec<_>>());

    assert_eq!(session.load_page(3, size(12)).await, LoadOutcome::Applied);
    assert!(!session.pager().is_busy());
    assert_eq!(session.bulk_select(5).await, Some(LoadOutcome::Applied));
    assert_eq!(session.pager().selection().len(), 5);
    assert!(!session.pager().is_busy());
}

#[tokio::test]
async fn bulk_select_cancelled_during_the_restore_keeps_the_merge() {
    let mut catalog = FakeCatalog::new(100);
    catalog.slow_pages.insert(3);
    let mut session = Session::new(catalog, 3, size(12));
    session.load_page(3, size(12)).await;

    let cancelled = tokio::time::timeout(Duration::from_millis(20), session.bulk_select(5)).await;
    assert!(cancelled.is_err());

    let pager = session.pager();
    assert!(!pager.is_busy());
    assert!(!pager.is_bulk_in_progress());
    assert_eq!(selected_ids(pager), vec![1, 2, 3, 4, 5]);
    assert_eq!(window_ids(pager), (25..=36).collect::<Vec<_>>());
    assert_eq!(session.fetcher().requests(), vec![(3, 12), (1, 5), (3, 12)]);

    assert_eq!(session.next_page().await, LoadOutcome::Applied);
    assert!(!session.pager().is_busy());
}
