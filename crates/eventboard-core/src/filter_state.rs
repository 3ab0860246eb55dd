use anyhow::Context;
use serde::{
  Deserialize,
  Serialize
};
use tracing::{
  debug,
  error,
  trace,
  warn
};
use url::Url;

use crate::config::BoardConfig;
use crate::item::Axis;
use crate::ports::{
  AddressBar,
  KeyValueStore
};

/// Location constraints. An empty field
/// does not constrain its axis.
#[derive(
  Debug,
  Clone,
  Default,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Hash,
)]
pub struct FilterState {
  #[serde(default)]
  pub start: String,
  #[serde(default)]
  pub end:   String
}

impl FilterState {
  pub fn new(
    start: impl Into<String>,
    end: impl Into<String>
  ) -> Self {
    Self {
      start: start.into(),
      end:   end.into()
    }
  }

  pub fn get(&self, axis: Axis) -> &str {
    match axis {
      | Axis::Start => &self.start,
      | Axis::End => &self.end
    }
  }

  pub fn set(
    &mut self,
    axis: Axis,
    value: impl Into<String>
  ) {
    let value = value.into();
    match axis {
      | Axis::Start => self.start = value,
      | Axis::End => self.end = value
    }
  }

  pub fn is_active(&self) -> bool {
    !self.start.is_empty()
      || !self.end.is_empty()
  }
}

/// URL state wins outright, then stored
/// state, then the empty default. There
/// is no per-field merge between sources.
pub fn resolve_filter_state(
  from_url: Option<FilterState>,
  from_storage: Option<FilterState>
) -> FilterState {
  from_url
    .or(from_storage)
    .unwrap_or_default()
}

/// Returns `Some` when the query carries
/// either filter key; a missing key reads
/// as the empty string.
pub fn filter_from_query(
  href: &str,
  config: &BoardConfig
) -> anyhow::Result<Option<FilterState>> {
  let url = Url::parse(href)
    .with_context(|| {
      format!("invalid page url: {href}")
    })?;

  let mut state = FilterState::default();
  let mut seen = false;
  for axis in Axis::ALL {
    let key = config.query_key(axis);
    if let Some((_, value)) = url
      .query_pairs()
      .find(|(name, _)| name == key)
    {
      state.set(axis, value.into_owned());
      seen = true;
    }
  }

  Ok(seen.then_some(state))
}

/// Computes the address that mirrors
/// `state`, or `None` when the query
/// already matches. Unrelated parameters
/// keep their order.
pub fn mirror_into_url(
  href: &str,
  state: &FilterState,
  config: &BoardConfig
) -> anyhow::Result<Option<String>> {
  let mut url = Url::parse(href)
    .with_context(|| {
      format!("invalid page url: {href}")
    })?;

  let current: Vec<(String, String)> =
    url.query_pairs().into_owned().collect();
  let mut next =
    Vec::with_capacity(current.len() + 2);
  let mut placed = [false, false];

  for (name, value) in &current {
    let axis_index =
      Axis::ALL.iter().position(|axis| {
        config.query_key(*axis) == name
      });
    let Some(index) = axis_index else {
      next.push((
        name.clone(),
        value.clone()
      ));
      continue;
    };

    if placed[index] {
      continue;
    }
    placed[index] = true;

    let wanted =
      state.get(Axis::ALL[index]);
    if !wanted.is_empty() {
      next.push((
        name.clone(),
        wanted.to_string()
      ));
    }
  }

  for (index, axis) in
    Axis::ALL.into_iter().enumerate()
  {
    let wanted = state.get(axis);
    if !placed[index] && !wanted.is_empty()
    {
      next.push((
        config.query_key(axis).to_string(),
        wanted.to_string()
      ));
    }
  }

  if next == current {
    return Ok(None);
  }

  if next.is_empty() {
    url.set_query(None);
  } else {
    url
      .query_pairs_mut()
      .clear()
      .extend_pairs(next.iter());
  }

  Ok(Some(url.to_string()))
}

/// Reads and writes the filter through
/// the URL and durable storage. Backing
/// store failures are logged and never
/// returned.
#[derive(Debug)]
pub struct FilterStore<S, A> {
  storage: S,
  address: A,
  config:  BoardConfig
}

impl<S, A> FilterStore<S, A>
where
  S: KeyValueStore,
  A: AddressBar
{
  pub fn new(
    storage: S,
    address: A,
    config: BoardConfig
  ) -> Self {
    Self {
      storage,
      address,
      config
    }
  }

  pub fn storage(&self) -> &S {
    &self.storage
  }

  pub fn address(&self) -> &A {
    &self.address
  }

  pub fn address_mut(&mut self) -> &mut A {
    &mut self.address
  }

  pub fn storage_mut(&mut self) -> &mut S {
    &mut self.storage
  }

  #[tracing::instrument(skip(self))]
  pub fn load(&self) -> FilterState {
    let from_url = self.read_url();
    if from_url.is_some() {
      debug!(
        ?from_url,
        "filter taken from url; storage not consulted"
      );
      return resolve_filter_state(
        from_url, None
      );
    }

    let from_storage = self.read_storage();
    debug!(?from_storage, "filter taken from storage");
    resolve_filter_state(
      None,
      from_storage
    )
  }

  #[tracing::instrument(skip(self))]
  pub fn save(
    &mut self,
    state: &FilterState
  ) {
    self.write_storage(state);
    self.write_url(state);
  }

  fn read_url(
    &self
  ) -> Option<FilterState> {
    let result = self
      .address
      .href()
      .and_then(|href| {
        filter_from_query(
          &href,
          &self.config
        )
      });
    match result {
      | Ok(state) => state,
      | Err(err) => {
        warn!(
          error = %err,
          "failed reading filter from url"
        );
        None
      }
    }
  }

  fn read_storage(
    &self
  ) -> Option<FilterState> {
    let key = &self.config.storage_key;
    let raw = match self.storage.get(key)
    {
      | Ok(Some(raw)) => raw,
      | Ok(None) => {
        trace!(key, "no stored filter");
        return None;
      }
      | Err(err) => {
        error!(
          key,
          error = %err,
          "failed reading filter from storage"
        );
        return None;
      }
    };

    match serde_json::from_str::<
      FilterState
    >(&raw)
    {
      | Ok(state) => Some(state),
      | Err(err) => {
        error!(
          key,
          error = %err,
          "failed parsing stored filter"
        );
        None
      }
    }
  }

  fn write_storage(
    &mut self,
    state: &FilterState
  ) {
    let key =
      self.config.storage_key.as_str();
    let json =
      match serde_json::to_string(state) {
        | Ok(json) => json,
        | Err(err) => {
          error!(
            error = %err,
            "failed encoding filter"
          );
          return;
        }
      };

    if let Err(err) =
      self.storage.set(key, &json)
    {
      error!(
        key,
        error = %err,
        "failed writing filter to storage"
      );
    }
  }

  fn write_url(
    &mut self,
    state: &FilterState
  ) {
    let next =
      self.address.href().and_then(
        |href| {
          mirror_into_url(
            &href,
            state,
            &self.config
          )
        }
      );

    match next {
      | Ok(Some(href)) => {
        debug!(%href, "mirroring filter into url");
        if let Err(err) =
          self.address.replace(&href)
        {
          error!(
            error = %err,
            "failed replacing page url"
          );
        }
      }
      | Ok(None) => {
        trace!("url already mirrors filter");
      }
      | Err(err) => {
        error!(
          error = %err,
          "failed computing page url"
        );
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::memory::{
    MemoryAddressBar,
    MemoryStorage
  };

  const PAGE: &str =
    "https://ride.example/events/";

  fn store(
    href: &str,
    stored: Option<&str>
  ) -> FilterStore<
    MemoryStorage,
    MemoryAddressBar
  > {
    let config = BoardConfig::default();
    let mut storage =
      MemoryStorage::default();
    if let Some(raw) = stored {
      storage.insert(
        &config.storage_key,
        raw
      );
    }
    FilterStore::new(
      storage,
      MemoryAddressBar::new(href),
      config
    )
  }

  #[test]
  fn resolver_prefers_url_then_storage() {
    let url = FilterState::new("A", "");
    let stored = FilterState::new("B", "C");
    assert_eq!(
      resolve_filter_state(
        Some(url.clone()),
        Some(stored.clone())
      ),
      url
    );
    assert_eq!(
      resolve_filter_state(
        None,
        Some(stored.clone())
      ),
      stored
    );
    assert_eq!(
      resolve_filter_state(None, None),
      FilterState::default()
    );
  }

  #[test]
  fn single_url_key_blanks_the_other_field()
  {
    let store = store(
      &format!("{PAGE}?end=Tigard"),
      Some(r#"{"start":"Beaverton","end":"Hillsboro"}"#)
    );
    assert_eq!(
      store.load(),
      FilterState::new("", "Tigard")
    );
  }

  #[test]
  fn falls_back_to_storage_without_url_keys()
  {
    let store = store(
      &format!("{PAGE}?utm=mail"),
      Some(r#"{"start":"Beaverton","end":""}"#)
    );
    assert_eq!(
      store.load(),
      FilterState::new("Beaverton", "")
    );
  }

  #[test]
  fn corrupt_or_missing_storage_defaults() {
    for stored in [
      None,
      Some("{not json"),
      Some("42"),
      Some(r#"{"start":7}"#)
    ] {
      let store = store(PAGE, stored);
      assert_eq!(
        store.load(),
        FilterState::default(),
        "{stored:?}"
      );
    }
  }

  #[test]
  fn failing_storage_is_tolerated() {
    let mut store = store(PAGE, None);
    store.storage_mut().fail_all(true);
    assert_eq!(
      store.load(),
      FilterState::default()
    );

    store.save(&FilterState::new(
      "Tigard", ""
    ));
    assert_eq!(
      store.address().current(),
      format!("{PAGE}?start=Tigard")
    );
  }

  #[test]
  fn save_sets_and_removes_query_keys() {
    let mut store = store(
      &format!("{PAGE}?utm=mail&end=Old#list"),
      None
    );
    store.save(&FilterState::new(
      "Beaverton", ""
    ));
    assert_eq!(
      store.address().current(),
      format!(
        "{PAGE}?utm=mail&start=Beaverton#list"
      )
    );
    assert_eq!(
      store.storage().value(
        &BoardConfig::default().storage_key
      ),
      Some(
        r#"{"start":"Beaverton","end":""}"#
      )
    );

    store.save(&FilterState::default());
    assert_eq!(
      store.address().current(),
      format!("{PAGE}?utm=mail#list")
    );
  }

  #[test]
  fn clearing_the_last_key_drops_the_query()
  {
    let mut store = store(
      &format!("{PAGE}?start=A&end=B"),
      None
    );
    store.save(&FilterState::default());
    assert_eq!(
      store.address().current(),
      PAGE
    );
  }

  #[test]
  fn saving_loaded_state_does_not_touch_url()
  {
    let mut store = store(
      &format!(
        "{PAGE}?end=Tigard&start=Beaverton"
      ),
      None
    );
    let loaded = store.load();
    store.save(&loaded);
    assert_eq!(
      store.address().replacements(),
      0
    );
    assert_eq!(store.load(), loaded);
  }

  #[test]
  fn saving_state_loaded_from_storage_mirrors_it_once()
  {
    let stored = r#"{"start":"A","end":""}"#;
    let mut store = store(PAGE, Some(stored));
    let loaded = store.load();
    assert_eq!(loaded, FilterState::new("A", ""));

    store.save(&loaded);
    assert_eq!(
      store.storage().value(
        &BoardConfig::default().storage_key
      ),
      Some(stored)
    );
    assert_eq!(
      store.address().current(),
      format!("{PAGE}?start=A")
    );
    assert_eq!(
      store.address().replacements(),
      1
    );

    store.save(&store.load());
    assert_eq!(
      store.address().replacements(),
      1
    );
    assert_eq!(store.load(), loaded);
  }

  #[test]
  fn storage_and_url_paths_agree() {
    let mut store = store(PAGE, None);
    let _ = store.load();
    store.save(&FilterState::new("A", ""));

    // reload with the shared link
    assert_eq!(
      store.load(),
      FilterState::new("A", "")
    );

    // reload after the query was stripped
    store
      .address_mut()
      .navigate(PAGE);
    assert_eq!(
      store.load(),
      FilterState::new("A", "")
    );
  }

  #[test]
  fn query_values_are_decoded_and_encoded() {
    let mut store = store(PAGE, None);
    store.save(&FilterState::new(
      "Beaverton Central",
      "Tigard & Tualatin"
    ));
    let href =
      store.address().current();
    assert!(href.contains("start=Beaverton+Central"));
    assert!(href.contains("end=Tigard+%26+Tualatin"));
    assert_eq!(
      store.load(),
      FilterState::new(
        "Beaverton Central",
        "Tigard & Tualatin"
      )
    );
  }
}
