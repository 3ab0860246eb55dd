//! Seams between the board logic and
//! whatever renders the page. The browser
//! build implements these over the DOM;
//! [`crate::memory`] implements them in
//! memory for tests.

use crate::bucket::Bucket;
use crate::item::{
  Axis,
  ItemId
};

pub trait BucketView {
  fn has_container(
    &self,
    bucket: Bucket
  ) -> bool;

  /// Appends the item at the end of the
  /// bucket's container, moving it if it
  /// already lives elsewhere.
  fn append_item(
    &mut self,
    bucket: Bucket,
    item: ItemId
  ) -> anyhow::Result<()>;

  fn activate(
    &mut self,
    bucket: Bucket
  ) -> anyhow::Result<()>;

  fn set_count(
    &mut self,
    bucket: Bucket,
    text: &str
  ) -> anyhow::Result<()>;

  fn show_no_upcoming_notice(
    &mut self,
    message: &str
  ) -> anyhow::Result<()>;
}

pub trait FilterView {
  fn set_options(
    &mut self,
    axis: Axis,
    values: &[String]
  ) -> anyhow::Result<()>;

  fn set_selected(
    &mut self,
    axis: Axis,
    value: &str
  ) -> anyhow::Result<()>;

  fn set_filtered_out(
    &mut self,
    item: ItemId,
    filtered_out: bool
  ) -> anyhow::Result<()>;

  fn set_clear_visible(
    &mut self,
    visible: bool
  ) -> anyhow::Result<()>;

  fn append_location_label(
    &mut self,
    item: ItemId,
    label: &str
  ) -> anyhow::Result<()>;
}

pub trait ToggleView {
  fn set_expanded(
    &mut self,
    expanded: bool
  ) -> anyhow::Result<()>;

  fn set_glyph(
    &mut self,
    glyph: &str
  ) -> anyhow::Result<()>;
}

/// Durable string storage (the browser's
/// `localStorage`).
pub trait KeyValueStore {
  fn get(
    &self,
    key: &str
  ) -> anyhow::Result<Option<String>>;

  fn set(
    &mut self,
    key: &str,
    value: &str
  ) -> anyhow::Result<()>;
}

/// The page address. `replace` must not
/// add a history entry.
pub trait AddressBar {
  fn href(&self) -> anyhow::Result<String>;

  fn replace(
    &mut self,
    href: &str
  ) -> anyhow::Result<()>;
}
