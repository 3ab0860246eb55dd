use chrono::NaiveDate;
use eventboard_core::bucket::{Bucket, NO_UPCOMING_MESSAGE};
use eventboard_core::memory::{MemoryAddressBar, MemoryPage, MemoryStorage};
use eventboard_core::{Axis, BoardConfig, FilterState, Item, ItemId, PageSession};

const PAGE: &str = "https://ride.example/events/";

fn listing() -> Vec<Item> {
    vec![
        Item::new(ItemId(0))
            .with_date("January 5, 2026")
            .with_start("Beaverton")
            .with_end("Beaverton"),
        Item::new(ItemId(1))
            .with_date("2026-02-01")
            .with_start("Tigard")
            .with_end("Beaverton"),
        Item::new(ItemId(2))
            .with_date("not-a-date")
            .with_start("Beaverton")
            .with_end("Tigard"),
        Item::new(ItemId(3))
            .with_date("May 1, 2026")
            .with_start("Beaverton")
            .with_end("Hillsboro"),
        Item::new(ItemId(4))
            .with_date("2026-01-20")
            .with_start("Beaverton")
            .with_end("Tigard"),
    ]
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 10).expect("valid today")
}

#[test]
fn page_load_sorts_and_filters() {
    let items = listing();
    let mut page = MemoryPage::with_all_containers();
    let mut session: PageSession<MemoryStorage, MemoryAddressBar> =
        PageSession::new(BoardConfig::default());

    session.arrange(&items, today(), &mut page);
    assert_eq!(page.container(Bucket::Past), vec![ItemId(0)]);
    assert_eq!(page.container(Bucket::Upcoming), vec![ItemId(4), ItemId(1)]);
    assert_eq!(page.container(Bucket::Future), vec![ItemId(3)]);
    assert_eq!(page.count(Bucket::Future), Some("(1)"));
    assert!(page.notice().is_none());
    let buckets = session.buckets().expect("bucketed");
    assert_eq!(buckets.undated, vec![ItemId(2)]);

    session.mount_filter(
        items,
        MemoryStorage::default(),
        MemoryAddressBar::new(PAGE),
        &mut page,
    );
    assert_eq!(page.options(Axis::Start), ["Beaverton", "Tigard"]);
    assert_eq!(page.options(Axis::End), ["Beaverton", "Hillsboro", "Tigard"]);

    session.on_select(Axis::End, "Tigard", &mut page);
    assert!(page.is_filtered_out(ItemId(0)));
    assert!(page.is_filtered_out(ItemId(1)));
    assert!(!page.is_filtered_out(ItemId(2)));
    assert!(!page.is_filtered_out(ItemId(4)));

    let filter = session.filter().expect("filter mounted");
    assert_eq!(filter.state(), &FilterState::new("", "Tigard"));
    assert_eq!(filter.store().address().current(), format!("{PAGE}?end=Tigard"));
    assert_eq!(
        filter
            .store()
            .storage()
            .value(&BoardConfig::default().storage_key),
        Some(r#"{"start":"","end":"Tigard"}"#)
    );
}

#[test]
fn reload_restores_filter_from_storage() {
    let mut storage = MemoryStorage::default();
    storage.insert(
        &BoardConfig::default().storage_key,
        r#"{"start":"Tigard","end":""}"#,
    );

    let mut page = MemoryPage::default();
    let mut session = PageSession::new(BoardConfig::default());
    session.mount_filter(listing(), storage, MemoryAddressBar::new(PAGE), &mut page);

    assert_eq!(page.selected(Axis::Start), "Tigard");
    assert!(page.is_filtered_out(ItemId(0)));
    assert!(!page.is_filtered_out(ItemId(1)));
    assert_eq!(page.clear_visible(), Some(true));

    session.on_clear(&mut page);
    assert!(!page.is_filtered_out(ItemId(0)));
    assert_eq!(page.clear_visible(), Some(false));
    let filter = session.filter().expect("filter mounted");
    assert_eq!(filter.store().address().replacements(), 0);
    assert_eq!(
        filter
            .store()
            .storage()
            .value(&BoardConfig::default().storage_key),
        Some(r#"{"start":"","end":""}"#)
    );
}

#[test]
fn missing_sections_short_circuit_independently() {
    let mut page = MemoryPage::with_containers(&[]);
    let mut session: PageSession<MemoryStorage, MemoryAddressBar> =
        PageSession::new(BoardConfig::default());
    session.arrange(&listing(), today(), &mut page);
    assert!(session.buckets().is_none());
    assert!(page.notice().is_none());

    session.on_select(Axis::Start, "Tigard", &mut page);
    assert!(session.filter().is_none());
    assert!(!page.is_filtered_out(ItemId(0)));
}

#[test]
fn nothing_upcoming_shows_notice() {
    let items = vec![Item::new(ItemId(0)).with_date("2025-11-02")];
    let mut page = MemoryPage::with_all_containers();
    let mut session: PageSession<MemoryStorage, MemoryAddressBar> =
        PageSession::new(BoardConfig::default());
    session.arrange(&items, today(), &mut page);
    assert_eq!(page.notice(), Some(NO_UPCOMING_MESSAGE));
    assert!(page.is_active(Bucket::Past));
}
