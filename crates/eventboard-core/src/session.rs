use chrono::NaiveDate;
use tracing::{
  error,
  info
};

use crate::bucket::{
  Buckets,
  bucketize,
  present
};
use crate::config::BoardConfig;
use crate::filter_state::FilterStore;
use crate::item::{
  Axis,
  Item
};
use crate::location::LocationFilter;
use crate::ports::{
  AddressBar,
  BucketView,
  FilterView,
  KeyValueStore
};

/// Everything one page load owns. Built
/// once by the init routine and handed to
/// each event handler.
#[derive(Debug)]
pub struct PageSession<S, A> {
  config:  BoardConfig,
  buckets: Option<Buckets>,
  filter:  Option<LocationFilter<S, A>>
}

impl<S, A> PageSession<S, A>
where
  S: KeyValueStore,
  A: AddressBar
{
  pub fn new(config: BoardConfig) -> Self {
    Self {
      config,
      buckets: None,
      filter: None
    }
  }

  pub fn config(&self) -> &BoardConfig {
    &self.config
  }

  pub fn buckets(&self) -> Option<&Buckets> {
    self.buckets.as_ref()
  }

  pub fn filter(
    &self
  ) -> Option<&LocationFilter<S, A>> {
    self.filter.as_ref()
  }

  /// Sorts the listed items into their
  /// sections. Without an upcoming
  /// container there is nothing to sort.
  #[tracing::instrument(skip_all)]
  pub fn arrange<V>(
    &mut self,
    items: &[Item],
    today: NaiveDate,
    view: &mut V
  ) where
    V: BucketView + ?Sized
  {
    if !view.has_container(
      crate::bucket::Bucket::Upcoming
    ) {
      info!("no events section; skipping bucketing");
      return;
    }

    let buckets = bucketize(
      items,
      today,
      self.config.horizon_days
    );
    if let Err(err) =
      present(&buckets, view)
    {
      error!(
        error = %err,
        "failed presenting event buckets"
      );
    }
    self.buckets = Some(buckets);
  }

  #[tracing::instrument(skip_all)]
  pub fn mount_filter<V>(
    &mut self,
    items: Vec<Item>,
    storage: S,
    address: A,
    view: &mut V
  ) where
    V: FilterView + ?Sized
  {
    let store = FilterStore::new(
      storage,
      address,
      self.config.clone()
    );
    let filter =
      LocationFilter::new(items, store);
    if let Err(err) = filter.mount(view) {
      error!(
        error = %err,
        "failed mounting location filter"
      );
    }
    self.filter = Some(filter);
  }

  /// Selector change handler. A session
  /// without a mounted filter ignores it.
  pub fn on_select<V>(
    &mut self,
    axis: Axis,
    value: &str,
    view: &mut V
  ) where
    V: FilterView + ?Sized
  {
    let Some(filter) = self.filter.as_mut()
    else {
      return;
    };
    if let Err(err) =
      filter.select(axis, value, view)
    {
      error!(
        error = %err,
        "failed applying location filter"
      );
    }
  }

  pub fn on_clear<V>(
    &mut self,
    view: &mut V
  ) where
    V: FilterView + ?Sized
  {
    let Some(filter) = self.filter.as_mut()
    else {
      return;
    };
    if let Err(err) = filter.clear(view) {
      error!(
        error = %err,
        "failed clearing location filter"
      );
    }
  }
}
