use eventboard_core::{
  Bucket,
  FilterState,
  LocationVocabulary,
  bucketize,
  is_visible,
  today_local
};
use tracing::debug;

use crate::cli::ListArgs;
use crate::config::Config;
use crate::events_file::{
  EventEntry,
  load_events,
  to_items
};
use crate::render::Renderer;

#[derive(Debug, Default)]
pub struct Listing<'a> {
  pub past:     Vec<&'a EventEntry>,
  pub upcoming: Vec<&'a EventEntry>,
  pub future:   Vec<&'a EventEntry>,
  pub undated:  Vec<&'a EventEntry>
}

impl<'a> Listing<'a> {
  pub fn get(
    &self,
    bucket: Bucket
  ) -> &[&'a EventEntry] {
    match bucket {
      | Bucket::Past => &self.past,
      | Bucket::Upcoming => &self.upcoming,
      | Bucket::Future => &self.future
    }
  }
}

/// Buckets the entries the way the page
/// does and drops those the location
/// filter hides.
pub fn select_entries<'a>(
  entries: &'a [EventEntry],
  today: chrono::NaiveDate,
  horizon_days: u32,
  state: &FilterState
) -> Listing<'a> {
  let items = to_items(entries);
  let buckets =
    bucketize(&items, today, horizon_days);

  let pick = |bucket: Bucket| {
    buckets
      .get(bucket)
      .iter()
      .filter(|dated| {
        is_visible(&items[dated.id.0], state)
      })
      .map(|dated| &entries[dated.id.0])
      .collect::<Vec<_>>()
  };

  Listing {
    past:     pick(Bucket::Past),
    upcoming: pick(Bucket::Upcoming),
    future:   pick(Bucket::Future),
    undated:  buckets
      .undated
      .iter()
      .map(|id| &entries[id.0])
      .collect()
  }
}

#[tracing::instrument(skip_all)]
pub fn run(
  cfg: &Config,
  renderer: &mut Renderer,
  args: ListArgs
) -> anyhow::Result<()> {
  let entries = load_events(&cfg.events_file)?;
  let today =
    args.today.unwrap_or_else(today_local);
  let state = FilterState::new(
    args.start.unwrap_or_default(),
    args.end.unwrap_or_default()
  );
  let board = cfg.board();
  debug!(%today, ?state, horizon = board.horizon_days, "listing events");

  let listing = select_entries(
    &entries,
    today,
    board.horizon_days,
    &state
  );
  for bucket in Bucket::ALL {
    renderer
      .print_bucket(bucket, listing.get(bucket))?;
  }
  renderer.print_undated(&listing.undated)?;

  if args.locations {
    let vocabulary = LocationVocabulary::build(
      &to_items(&entries)
    );
    renderer.print_locations(&vocabulary)?;
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;

  fn entry(
    title: &str,
    date: &str,
    start: &str,
    end: &str
  ) -> EventEntry {
    EventEntry {
      title: title.to_string(),
      date: date.to_string(),
      start: Some(start.to_string()),
      end: Some(end.to_string()),
      ..EventEntry::default()
    }
  }

  fn titles(
    list: &[&EventEntry]
  ) -> Vec<String> {
    list
      .iter()
      .map(|entry| entry.title.clone())
      .collect()
  }

  #[test]
  fn lists_by_bucket_and_location() {
    let entries = vec![
      entry("a", "2026-01-05", "X", "Y"),
      entry("b", "2026-01-01", "X", "Z"),
      entry("c", "January 12, 2026", "X", "Z"),
      entry("d", "2026-06-01", "W", "Z"),
      entry("e", "someday", "X", "Z"),
    ];
    let today =
      NaiveDate::from_ymd_opt(2026, 1, 10)
        .expect("valid date");

    let all = select_entries(
      &entries,
      today,
      90,
      &FilterState::default()
    );
    assert_eq!(titles(&all.past), ["a", "b"]);
    assert_eq!(titles(&all.upcoming), ["c"]);
    assert_eq!(titles(&all.future), ["d"]);
    assert_eq!(titles(&all.undated), ["e"]);

    let to_z = select_entries(
      &entries,
      today,
      90,
      &FilterState::new("X", "Z")
    );
    assert_eq!(titles(&to_z.past), ["b"]);
    assert_eq!(titles(&to_z.upcoming), ["c"]);
    assert!(to_z.future.is_empty());
  }
}
