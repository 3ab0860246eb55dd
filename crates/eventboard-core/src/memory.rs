//! In-memory implementations of the page
//! ports. They record every call so tests
//! can assert on what the page would
//! show.

use std::collections::{
  BTreeMap,
  BTreeSet
};

use anyhow::anyhow;

use crate::bucket::Bucket;
use crate::item::{
  Axis,
  ItemId
};
use crate::ports::{
  AddressBar,
  BucketView,
  FilterView,
  KeyValueStore,
  ToggleView
};

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
  values:  BTreeMap<String, String>,
  failing: bool,
  writes:  usize
}

impl MemoryStorage {
  pub fn insert(
    &mut self,
    key: &str,
    value: &str
  ) {
    self
      .values
      .insert(key.to_string(), value.to_string());
  }

  pub fn value(
    &self,
    key: &str
  ) -> Option<&str> {
    self.values.get(key).map(String::as_str)
  }

  /// Makes every read and write fail, as
  /// when storage is disabled.
  pub fn fail_all(&mut self, failing: bool) {
    self.failing = failing;
  }

  pub fn writes(&self) -> usize {
    self.writes
  }
}

impl KeyValueStore for MemoryStorage {
  fn get(
    &self,
    key: &str
  ) -> anyhow::Result<Option<String>> {
    if self.failing {
      return Err(anyhow!(
        "storage disabled"
      ));
    }
    Ok(self.values.get(key).cloned())
  }

  fn set(
    &mut self,
    key: &str,
    value: &str
  ) -> anyhow::Result<()> {
    if self.failing {
      return Err(anyhow!(
        "storage disabled"
      ));
    }
    self.writes += 1;
    self.insert(key, value);
    Ok(())
  }
}

#[derive(Debug, Clone)]
pub struct MemoryAddressBar {
  href:         String,
  replacements: usize
}

impl MemoryAddressBar {
  pub fn new(href: &str) -> Self {
    Self {
      href:         href.to_string(),
      replacements: 0
    }
  }

  pub fn current(&self) -> String {
    self.href.clone()
  }

  /// Simulates a fresh navigation, which
  /// is not a replacement.
  pub fn navigate(&mut self, href: &str) {
    self.href = href.to_string();
  }

  pub fn replacements(&self) -> usize {
    self.replacements
  }
}

impl AddressBar for MemoryAddressBar {
  fn href(&self) -> anyhow::Result<String> {
    Ok(self.href.clone())
  }

  fn replace(
    &mut self,
    href: &str
  ) -> anyhow::Result<()> {
    self.replacements += 1;
    self.href = href.to_string();
    Ok(())
  }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryPage {
  containers:    BTreeMap<Bucket, Vec<ItemId>>,
  active:        BTreeSet<Bucket>,
  counts:        BTreeMap<Bucket, String>,
  notice:        Option<String>,
  options:       BTreeMap<Axis, Vec<String>>,
  selected:      BTreeMap<Axis, String>,
  filtered_out:  BTreeSet<ItemId>,
  clear_visible: Option<bool>,
  labels:        BTreeMap<ItemId, Vec<String>>
}

impl MemoryPage {
  pub fn with_containers(
    buckets: &[Bucket]
  ) -> Self {
    Self {
      containers: buckets
        .iter()
        .map(|bucket| (*bucket, Vec::new()))
        .collect(),
      ..Self::default()
    }
  }

  pub fn with_all_containers() -> Self {
    Self::with_containers(&Bucket::ALL)
  }

  pub fn container(
    &self,
    bucket: Bucket
  ) -> Vec<ItemId> {
    self
      .containers
      .get(&bucket)
      .cloned()
      .unwrap_or_default()
  }

  pub fn is_active(
    &self,
    bucket: Bucket
  ) -> bool {
    self.active.contains(&bucket)
  }

  pub fn count(
    &self,
    bucket: Bucket
  ) -> Option<&str> {
    self.counts.get(&bucket).map(String::as_str)
  }

  pub fn notice(&self) -> Option<&str> {
    self.notice.as_deref()
  }

  pub fn options(
    &self,
    axis: Axis
  ) -> &[String] {
    self
      .options
      .get(&axis)
      .map(Vec::as_slice)
      .unwrap_or_default()
  }

  pub fn selected(
    &self,
    axis: Axis
  ) -> &str {
    self
      .selected
      .get(&axis)
      .map(String::as_str)
      .unwrap_or_default()
  }

  pub fn is_filtered_out(
    &self,
    item: ItemId
  ) -> bool {
    self.filtered_out.contains(&item)
  }

  pub fn clear_visible(
    &self
  ) -> Option<bool> {
    self.clear_visible
  }

  pub fn labels(
    &self,
    item: ItemId
  ) -> &[String] {
    self
      .labels
      .get(&item)
      .map(Vec::as_slice)
      .unwrap_or_default()
  }
}

impl BucketView for MemoryPage {
  fn has_container(
    &self,
    bucket: Bucket
  ) -> bool {
    self.containers.contains_key(&bucket)
  }

  fn append_item(
    &mut self,
    bucket: Bucket,
    item: ItemId
  ) -> anyhow::Result<()> {
    for items in self.containers.values_mut()
    {
      items.retain(|existing| *existing != item);
    }
    self
      .containers
      .get_mut(&bucket)
      .ok_or_else(|| {
        anyhow!(
          "no container for {}",
          bucket.label()
        )
      })?
      .push(item);
    Ok(())
  }

  fn activate(
    &mut self,
    bucket: Bucket
  ) -> anyhow::Result<()> {
    self.active.insert(bucket);
    Ok(())
  }

  fn set_count(
    &mut self,
    bucket: Bucket,
    text: &str
  ) -> anyhow::Result<()> {
    self
      .counts
      .insert(bucket, text.to_string());
    Ok(())
  }

  fn show_no_upcoming_notice(
    &mut self,
    message: &str
  ) -> anyhow::Result<()> {
    self.notice = Some(message.to_string());
    Ok(())
  }
}

impl FilterView for MemoryPage {
  fn set_options(
    &mut self,
    axis: Axis,
    values: &[String]
  ) -> anyhow::Result<()> {
    self.options.insert(axis, values.to_vec());
    Ok(())
  }

  fn set_selected(
    &mut self,
    axis: Axis,
    value: &str
  ) -> anyhow::Result<()> {
    self
      .selected
      .insert(axis, value.to_string());
    Ok(())
  }

  fn set_filtered_out(
    &mut self,
    item: ItemId,
    filtered_out: bool
  ) -> anyhow::Result<()> {
    if filtered_out {
      self.filtered_out.insert(item);
    } else {
      self.filtered_out.remove(&item);
    }
    Ok(())
  }

  fn set_clear_visible(
    &mut self,
    visible: bool
  ) -> anyhow::Result<()> {
    self.clear_visible = Some(visible);
    Ok(())
  }

  fn append_location_label(
    &mut self,
    item: ItemId,
    label: &str
  ) -> anyhow::Result<()> {
    self
      .labels
      .entry(item)
      .or_default()
      .push(label.to_string());
    Ok(())
  }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryToggle {
  pub expanded: bool,
  pub glyph:    String
}

impl ToggleView for MemoryToggle {
  fn set_expanded(
    &mut self,
    expanded: bool
  ) -> anyhow::Result<()> {
    self.expanded = expanded;
    Ok(())
  }

  fn set_glyph(
    &mut self,
    glyph: &str
  ) -> anyhow::Result<()> {
    self.glyph = glyph.to_string();
    Ok(())
  }
}
