use std::collections::BTreeSet;

use tracing::{
  debug,
  info
};

use crate::filter_state::{
  FilterState,
  FilterStore
};
use crate::item::{
  Axis,
  Item,
  ItemId
};
use crate::ports::{
  AddressBar,
  FilterView,
  KeyValueStore
};

#[derive(
  Debug, Clone, Default, PartialEq, Eq,
)]
pub struct LocationVocabulary {
  pub starts: Vec<String>,
  pub ends:   Vec<String>
}

impl LocationVocabulary {
  pub fn build(items: &[Item]) -> Self {
    let mut starts = BTreeSet::new();
    let mut ends = BTreeSet::new();
    for item in items {
      if let Some(start) =
        item.start_location.as_ref()
      {
        starts.insert(start.clone());
      }
      if let Some(end) =
        item.end_location.as_ref()
      {
        ends.insert(end.clone());
      }
    }

    Self {
      starts: starts.into_iter().collect(),
      ends:   ends.into_iter().collect()
    }
  }

  pub fn for_axis(
    &self,
    axis: Axis
  ) -> &[String] {
    match axis {
      | Axis::Start => &self.starts,
      | Axis::End => &self.ends
    }
  }
}

pub fn is_visible(
  item: &Item,
  state: &FilterState
) -> bool {
  Axis::ALL.into_iter().all(|axis| {
    let wanted = state.get(axis);
    wanted.is_empty()
      || item.location(axis) == wanted
  })
}

pub fn location_label(
  item: &Item
) -> Option<String> {
  match (
    item.start_location.as_deref(),
    item.end_location.as_deref()
  ) {
    | (Some(start), Some(end)) => {
      Some(format!("{start} → {end}"))
    }
    | (Some(only), None)
    | (None, Some(only)) => {
      Some(only.to_string())
    }
    | (None, None) => None
  }
}

/// Owns every listed item, the location
/// vocabulary and the live filter for one
/// page session.
#[derive(Debug)]
pub struct LocationFilter<S, A> {
  items:      Vec<Item>,
  vocabulary: LocationVocabulary,
  state:      FilterState,
  store:      FilterStore<S, A>
}

impl<S, A> LocationFilter<S, A>
where
  S: KeyValueStore,
  A: AddressBar
{
  /// Items without a location still take
  /// part: they compare as `""` and hide
  /// under any active constraint.
  #[tracing::instrument(skip_all)]
  pub fn new(
    items: Vec<Item>,
    store: FilterStore<S, A>
  ) -> Self {
    let vocabulary =
      LocationVocabulary::build(&items);
    let state = store.load();

    info!(
      items = items.len(),
      starts = vocabulary.starts.len(),
      ends = vocabulary.ends.len(),
      ?state,
      "location filter ready"
    );

    Self {
      items,
      vocabulary,
      state,
      store
    }
  }

  pub fn items(&self) -> &[Item] {
    &self.items
  }

  pub fn vocabulary(
    &self
  ) -> &LocationVocabulary {
    &self.vocabulary
  }

  pub fn state(&self) -> &FilterState {
    &self.state
  }

  pub fn store(&self) -> &FilterStore<S, A> {
    &self.store
  }

  pub fn clear_visible(&self) -> bool {
    self.state.is_active()
  }

  pub fn visibility(
    &self
  ) -> Vec<(ItemId, bool)> {
    self
      .items
      .iter()
      .map(|item| {
        (item.id, is_visible(item, &self.state))
      })
      .collect()
  }

  /// Fills the selectors, labels every
  /// item and applies the loaded filter.
  #[tracing::instrument(skip_all)]
  pub fn mount<V>(
    &self,
    view: &mut V
  ) -> anyhow::Result<()>
  where
    V: FilterView + ?Sized
  {
    for axis in Axis::ALL {
      view.set_options(
        axis,
        self.vocabulary.for_axis(axis)
      )?;
    }

    for item in &self.items {
      if let Some(label) =
        location_label(item)
      {
        view.append_location_label(
          item.id, &label
        )?;
      }
    }

    self.sync_selectors(view)?;
    self.apply(view)
  }

  pub fn apply<V>(
    &self,
    view: &mut V
  ) -> anyhow::Result<()>
  where
    V: FilterView + ?Sized
  {
    let mut shown = 0_usize;
    for (id, visible) in self.visibility() {
      view.set_filtered_out(id, !visible)?;
      if visible {
        shown += 1;
      }
    }
    view.set_clear_visible(
      self.clear_visible()
    )?;

    debug!(
      shown,
      total = self.items.len(),
      state = ?self.state,
      "applied location filter"
    );
    Ok(())
  }

  /// Handles a change on one selector.
  /// Only that field changes.
  #[tracing::instrument(skip(self, view))]
  pub fn select<V>(
    &mut self,
    axis: Axis,
    value: &str,
    view: &mut V
  ) -> anyhow::Result<()>
  where
    V: FilterView + ?Sized
  {
    self.state.set(axis, value);
    self.commit(view)
  }

  pub fn set_start<V>(
    &mut self,
    value: &str,
    view: &mut V
  ) -> anyhow::Result<()>
  where
    V: FilterView + ?Sized
  {
    self.select(Axis::Start, value, view)
  }

  pub fn set_end<V>(
    &mut self,
    value: &str,
    view: &mut V
  ) -> anyhow::Result<()>
  where
    V: FilterView + ?Sized
  {
    self.select(Axis::End, value, view)
  }

  #[tracing::instrument(skip_all)]
  pub fn clear<V>(
    &mut self,
    view: &mut V
  ) -> anyhow::Result<()>
  where
    V: FilterView + ?Sized
  {
    self.state = FilterState::default();
    self.sync_selectors(view)?;
    self.commit(view)
  }

  fn sync_selectors<V>(
    &self,
    view: &mut V
  ) -> anyhow::Result<()>
  where
    V: FilterView + ?Sized
  {
    for axis in Axis::ALL {
      view.set_selected(
        axis,
        self.state.get(axis)
      )?;
    }
    Ok(())
  }

  // state is persisted even when the view
  // fails so a reload shows the choice
  fn commit<V>(
    &mut self,
    view: &mut V
  ) -> anyhow::Result<()>
  where
    V: FilterView + ?Sized
  {
    let applied = self.apply(view);
    self.store.save(&self.state);
    applied
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::BoardConfig;
  use crate::memory::{
    MemoryAddressBar,
    MemoryPage,
    MemoryStorage
  };

  const PAGE: &str =
    "https://ride.example/events/";

  fn sample_items() -> Vec<Item> {
    vec![
      Item::new(ItemId(0))
        .with_date("2026-01-05")
        .with_start("X")
        .with_end("Y"),
      Item::new(ItemId(1))
        .with_date("2026-01-01")
        .with_start("X")
        .with_end("Z")
    ]
  }

  fn filter(
    href: &str
  ) -> LocationFilter<
    MemoryStorage,
    MemoryAddressBar
  > {
    LocationFilter::new(
      sample_items(),
      FilterStore::new(
        MemoryStorage::default(),
        MemoryAddressBar::new(href),
        BoardConfig::default()
      )
    )
  }

  #[test]
  fn vocabulary_is_sorted_and_unique() {
    let items = vec![
      Item::new(ItemId(0))
        .with_start("Tigard")
        .with_end("Beaverton"),
      Item::new(ItemId(1))
        .with_start("Beaverton"),
      Item::new(ItemId(2))
        .with_start("Tigard")
        .with_end("Aloha"),
      Item::new(ItemId(3)).with_date("2026-01-01")
    ];
    let vocabulary =
      LocationVocabulary::build(&items);
    assert_eq!(
      vocabulary.starts,
      vec!["Beaverton", "Tigard"]
    );
    assert_eq!(
      vocabulary.ends,
      vec!["Aloha", "Beaverton"]
    );
  }

  #[test]
  fn visibility_follows_both_axes() {
    let items = sample_items();
    let start_only =
      FilterState::new("X", "");
    assert!(items
      .iter()
      .all(|item| is_visible(item, &start_only)));

    let both = FilterState::new("X", "Z");
    let shown: Vec<_> = items
      .iter()
      .filter(|item| is_visible(item, &both))
      .map(|item| item.id)
      .collect();
    assert_eq!(shown, vec![ItemId(1)]);
  }

  #[test]
  fn missing_attribute_never_matches_a_constraint()
  {
    let item =
      Item::new(ItemId(0)).with_start("X");
    assert!(is_visible(
      &item,
      &FilterState::new("X", "")
    ));
    assert!(!is_visible(
      &item,
      &FilterState::new("X", "Y")
    ));
  }

  #[test]
  fn labels_cover_one_or_both_locations() {
    let both = Item::new(ItemId(0))
      .with_start("Beaverton")
      .with_end("Tigard");
    let end_only =
      Item::new(ItemId(1)).with_end("Tigard");
    assert_eq!(
      location_label(&both).as_deref(),
      Some("Beaverton → Tigard")
    );
    assert_eq!(
      location_label(&end_only).as_deref(),
      Some("Tigard")
    );
    assert_eq!(
      location_label(&Item::new(ItemId(2))),
      None
    );
  }

  #[test]
  fn selecting_and_clearing_updates_page_and_url()
  {
    let mut filter = filter(PAGE);
    let mut page = MemoryPage::default();
    filter.mount(&mut page).expect("mount");
    assert_eq!(page.options(Axis::Start), ["X"]);
    assert_eq!(
      page.options(Axis::End),
      ["Y", "Z"]
    );
    assert_eq!(page.clear_visible(), Some(false));

    filter
      .set_start("X", &mut page)
      .expect("select start");
    assert!(!page.is_filtered_out(ItemId(0)));
    assert!(!page.is_filtered_out(ItemId(1)));
    assert_eq!(page.clear_visible(), Some(true));

    filter
      .set_end("Z", &mut page)
      .expect("select end");
    assert!(page.is_filtered_out(ItemId(0)));
    assert!(!page.is_filtered_out(ItemId(1)));
    assert_eq!(
      filter.store().address().current(),
      format!("{PAGE}?start=X&end=Z")
    );

    filter.clear(&mut page).expect("clear");
    assert!(!page.is_filtered_out(ItemId(0)));
    assert!(!page.is_filtered_out(ItemId(1)));
    assert_eq!(page.selected(Axis::Start), "");
    assert_eq!(page.selected(Axis::End), "");
    assert_eq!(page.clear_visible(), Some(false));
    assert_eq!(
      filter.store().address().current(),
      PAGE
    );
    assert_eq!(
      filter.state(),
      &FilterState::default()
    );
  }

  #[test]
  fn mount_applies_state_from_shared_link() {
    let filter =
      filter(&format!("{PAGE}?end=Y"));
    let mut page = MemoryPage::default();
    filter.mount(&mut page).expect("mount");
    assert_eq!(page.selected(Axis::End), "Y");
    assert_eq!(page.selected(Axis::Start), "");
    assert!(!page.is_filtered_out(ItemId(0)));
    assert!(page.is_filtered_out(ItemId(1)));
    assert_eq!(
      page.labels(ItemId(0)),
      ["X → Y"]
    );
  }

  #[test]
  fn unlocated_items_hide_under_a_constraint() {
    let mut items = sample_items();
    items.push(
      Item::new(ItemId(2)).with_date("2026-02-01")
    );
    let mut filter = LocationFilter::new(
      items,
      FilterStore::new(
        MemoryStorage::default(),
        MemoryAddressBar::new(&format!(
          "{PAGE}?start=X"
        )),
        BoardConfig::default()
      )
    );
    let mut page = MemoryPage::default();
    filter.mount(&mut page).expect("mount");
    assert_eq!(filter.items().len(), 3);
    assert_eq!(page.options(Axis::Start), ["X"]);
    assert!(page.labels(ItemId(2)).is_empty());
    assert!(page.is_filtered_out(ItemId(2)));
    assert!(!page.is_filtered_out(ItemId(0)));

    filter.clear(&mut page).expect("clear");
    assert!(!page.is_filtered_out(ItemId(2)));
  }
}
