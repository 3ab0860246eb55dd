use chrono::{
  Days,
  NaiveDate,
  NaiveDateTime
};
use serde::{
  Deserialize,
  Serialize
};
use tracing::{
  debug,
  trace,
  warn
};

use crate::date::parse_event_date;
use crate::item::{
  Item,
  ItemId
};
use crate::ports::BucketView;

pub const NO_UPCOMING_MESSAGE: &str =
  "No upcoming events scheduled. Check \
   back soon!";

#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
)]
pub enum Bucket {
  Past,
  Upcoming,
  Future
}

impl Bucket {
  pub const ALL: [Bucket; 3] = [
    Bucket::Past,
    Bucket::Upcoming,
    Bucket::Future
  ];

  /// Value of the `data-section`
  /// attribute on the bucket's section.
  pub fn section(self) -> &'static str {
    match self {
      | Bucket::Past => "past-events",
      | Bucket::Upcoming => "events",
      | Bucket::Future => "future-events"
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      | Bucket::Past => "Past",
      | Bucket::Upcoming => "Upcoming",
      | Bucket::Future => "Future"
    }
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct DatedItem {
  pub id: ItemId,
  pub at: NaiveDateTime
}

#[derive(
  Debug, Clone, Default, PartialEq, Eq,
)]
pub struct Buckets {
  pub past:     Vec<DatedItem>,
  pub upcoming: Vec<DatedItem>,
  pub future:   Vec<DatedItem>,
  /// Items without a usable date. They
  /// keep their place on the page.
  pub undated:  Vec<ItemId>
}

impl Buckets {
  pub fn get(
    &self,
    bucket: Bucket
  ) -> &[DatedItem] {
    match bucket {
      | Bucket::Past => &self.past,
      | Bucket::Upcoming => {
        &self.upcoming
      }
      | Bucket::Future => &self.future
    }
  }

  pub fn dated_len(&self) -> usize {
    self.past.len()
      + self.upcoming.len()
      + self.future.len()
  }

  pub fn bucket_of(
    &self,
    id: ItemId
  ) -> Option<Bucket> {
    Bucket::ALL.into_iter().find(
      |bucket| {
        self
          .get(*bucket)
          .iter()
          .any(|item| item.id == id)
      }
    )
  }
}

pub fn horizon_for(
  today: NaiveDate,
  horizon_days: u32
) -> NaiveDate {
  today
    .checked_add_days(Days::new(
      u64::from(horizon_days)
    ))
    .unwrap_or(NaiveDate::MAX)
}

/// Day-level classification. Both
/// `today` and `horizon` belong to
/// [`Bucket::Upcoming`].
pub fn classify(
  day: NaiveDate,
  today: NaiveDate,
  horizon: NaiveDate
) -> Bucket {
  if day < today {
    Bucket::Past
  } else if day > horizon {
    Bucket::Future
  } else {
    Bucket::Upcoming
  }
}

#[tracing::instrument(skip(items), fields(items = items.len()))]
pub fn bucketize(
  items: &[Item],
  today: NaiveDate,
  horizon_days: u32
) -> Buckets {
  let horizon =
    horizon_for(today, horizon_days);
  let mut buckets = Buckets::default();

  for item in items {
    let Some(raw) = item.date.as_deref()
    else {
      trace!(item = ?item.id, "item has no date");
      buckets.undated.push(item.id);
      continue;
    };

    let at = match parse_event_date(raw)
    {
      | Ok(at) => at,
      | Err(err) => {
        warn!(
          item = ?item.id,
          date = raw,
          error = %err,
          "skipping item with unparseable date"
        );
        buckets.undated.push(item.id);
        continue;
      }
    };

    let dated = DatedItem {
      id: item.id,
      at
    };
    match classify(
      at.date(),
      today,
      horizon
    ) {
      | Bucket::Past => {
        buckets.past.push(dated)
      }
      | Bucket::Upcoming => {
        buckets.upcoming.push(dated)
      }
      | Bucket::Future => {
        buckets.future.push(dated)
      }
    }
  }

  // sort_by is stable, so equal instants
  // keep document order
  buckets
    .past
    .sort_by(|a, b| b.at.cmp(&a.at));
  buckets
    .upcoming
    .sort_by(|a, b| a.at.cmp(&b.at));
  buckets
    .future
    .sort_by(|a, b| a.at.cmp(&b.at));

  debug!(
    %today,
    %horizon,
    past = buckets.past.len(),
    upcoming = buckets.upcoming.len(),
    future = buckets.future.len(),
    undated = buckets.undated.len(),
    "bucketized events"
  );

  buckets
}

pub fn count_label(count: usize) -> String {
  format!("({count})")
}

/// Pushes the bucket layout to the page.
///
/// Buckets whose container is missing are
/// skipped. An empty upcoming bucket
/// produces the notice instead of a list.
#[tracing::instrument(skip_all)]
pub fn present<V>(
  buckets: &Buckets,
  view: &mut V
) -> anyhow::Result<()>
where
  V: BucketView + ?Sized
{
  for bucket in Bucket::ALL {
    let items = buckets.get(bucket);

    if bucket == Bucket::Upcoming
      && items.is_empty()
    {
      debug!("no upcoming events; showing notice");
      view.show_no_upcoming_notice(
        NO_UPCOMING_MESSAGE
      )?;
      continue;
    }

    if items.is_empty() {
      continue;
    }

    if !view.has_container(bucket) {
      debug!(
        bucket = bucket.label(),
        "bucket container missing; skipping"
      );
      continue;
    }

    for item in items {
      view.append_item(bucket, item.id)?;
    }
    view.activate(bucket)?;
    view.set_count(
      bucket,
      &count_label(items.len())
    )?;
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;
  use crate::memory::MemoryPage;

  fn ymd(
    y: i32,
    m: u32,
    d: u32
  ) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d)
      .expect("valid date")
  }

  fn dated(
    id: usize,
    date: &str
  ) -> Item {
    Item::new(ItemId(id)).with_date(date)
  }

  fn ids(items: &[DatedItem]) -> Vec<usize> {
    items
      .iter()
      .map(|item| item.id.0)
      .collect()
  }

  #[test]
  fn classifies_relative_to_today_and_horizon()
  {
    let items = vec![
      dated(0, "2026-01-05"),
      dated(1, "2026-02-01"),
      dated(2, "2026-05-01")
    ];
    let buckets = bucketize(
      &items,
      ymd(2026, 1, 10),
      90
    );
    assert_eq!(ids(&buckets.past), vec![0]);
    assert_eq!(
      ids(&buckets.upcoming),
      vec![1]
    );
    assert_eq!(
      ids(&buckets.future),
      vec![2]
    );
  }

  #[test]
  fn boundaries_are_upcoming() {
    let today = ymd(2026, 1, 10);
    let horizon = horizon_for(today, 90);
    assert_eq!(horizon, ymd(2026, 4, 10));

    let items = vec![
      dated(0, "2026-01-10"),
      dated(1, "2026-01-10T23:59"),
      dated(2, "2026-04-10"),
      dated(3, "2026-04-11"),
      dated(4, "2026-01-09T23:59")
    ];
    let buckets =
      bucketize(&items, today, 90);
    assert_eq!(
      ids(&buckets.upcoming),
      vec![0, 1, 2]
    );
    assert_eq!(
      ids(&buckets.future),
      vec![3]
    );
    assert_eq!(ids(&buckets.past), vec![4]);
  }

  #[test]
  fn orders_each_bucket_and_keeps_ties_stable()
  {
    let items = vec![
      dated(0, "2025-12-01"),
      dated(1, "2026-01-02"),
      dated(2, "2025-12-01"),
      dated(3, "2026-03-01"),
      dated(4, "2026-01-20"),
      dated(5, "2026-03-01"),
      dated(6, "2027-02-01"),
      dated(7, "2026-09-01")
    ];
    let buckets = bucketize(
      &items,
      ymd(2026, 1, 10),
      90
    );
    assert_eq!(
      ids(&buckets.past),
      vec![1, 0, 2]
    );
    assert_eq!(
      ids(&buckets.upcoming),
      vec![4, 3, 5]
    );
    assert_eq!(
      ids(&buckets.future),
      vec![7, 6]
    );
  }

  #[test]
  fn partitions_without_duplicates() {
    let items: Vec<Item> = (0..40)
      .map(|offset| {
        let date = ymd(2025, 10, 1)
          + chrono::Days::new(offset * 9);
        dated(
          offset as usize,
          &date
            .format("%Y-%m-%d")
            .to_string()
        )
      })
      .collect();
    let buckets = bucketize(
      &items,
      ymd(2026, 1, 10),
      90
    );

    let mut seen: Vec<usize> = Bucket::ALL
      .into_iter()
      .flat_map(|bucket| {
        ids(buckets.get(bucket))
      })
      .collect();
    assert_eq!(seen.len(), items.len());
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), items.len());
  }

  #[test]
  fn unparseable_dates_are_excluded() {
    let items = vec![
      dated(0, "not-a-date"),
      dated(1, "2026-02-01"),
      Item::new(ItemId(2))
    ];
    let buckets = bucketize(
      &items,
      ymd(2026, 1, 10),
      90
    );
    assert_eq!(
      ids(&buckets.upcoming),
      vec![1]
    );
    assert_eq!(buckets.dated_len(), 1);
    assert_eq!(
      buckets.undated,
      vec![ItemId(0), ItemId(2)]
    );
    assert_eq!(
      buckets.bucket_of(ItemId(0)),
      None
    );
  }

  #[test]
  fn present_moves_items_and_counts() {
    let items = vec![
      dated(0, "2026-01-01"),
      dated(1, "2026-01-05"),
      dated(2, "2026-02-01")
    ];
    let buckets = bucketize(
      &items,
      ymd(2026, 1, 10),
      90
    );
    let mut page = MemoryPage::with_all_containers();
    present(&buckets, &mut page)
      .expect("present");

    assert_eq!(
      page.container(Bucket::Past),
      vec![ItemId(1), ItemId(0)]
    );
    assert!(page.is_active(Bucket::Past));
    assert_eq!(
      page.count(Bucket::Past),
      Some("(2)")
    );
    assert!(!page.is_active(Bucket::Future));
    assert_eq!(
      page.count(Bucket::Future),
      None
    );
    assert!(page.notice().is_none());
  }

  #[test]
  fn empty_upcoming_shows_notice() {
    let items =
      vec![dated(0, "2026-01-01")];
    let buckets = bucketize(
      &items,
      ymd(2026, 1, 10),
      90
    );
    let mut page = MemoryPage::with_all_containers();
    present(&buckets, &mut page)
      .expect("present");
    assert_eq!(
      page.notice(),
      Some(NO_UPCOMING_MESSAGE)
    );
    assert!(
      page
        .container(Bucket::Upcoming)
        .is_empty()
    );
  }

  #[test]
  fn missing_container_is_skipped() {
    let items = vec![
      dated(0, "2026-01-01"),
      dated(1, "2026-02-01")
    ];
    let buckets = bucketize(
      &items,
      ymd(2026, 1, 10),
      90
    );
    let mut page = MemoryPage::with_containers(&[
      Bucket::Upcoming
    ]);
    present(&buckets, &mut page)
      .expect("present");
    assert!(
      page.container(Bucket::Past).is_empty()
    );
    assert_eq!(
      page.container(Bucket::Upcoming),
      vec![ItemId(1)]
    );
  }
}
