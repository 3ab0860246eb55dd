use serde::{
  Deserialize,
  Serialize
};

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
pub struct ItemId(pub usize);

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
pub enum Axis {
  Start,
  End
}

impl Axis {
  pub const ALL: [Axis; 2] =
    [Axis::Start, Axis::End];
}

/// One presentable event as read from
/// the page. Empty attribute values are
/// stored as `None`.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct Item {
  pub id:             ItemId,
  #[serde(default)]
  pub date:           Option<String>,
  #[serde(default)]
  pub start_location: Option<String>,
  #[serde(default)]
  pub end_location:   Option<String>
}

impl Item {
  pub fn new(id: ItemId) -> Self {
    Self {
      id,
      date: None,
      start_location: None,
      end_location: None
    }
  }

  pub fn from_attributes(
    id: ItemId,
    date: Option<String>,
    start: Option<String>,
    end: Option<String>
  ) -> Self {
    Self {
      id,
      date: non_empty(date),
      start_location: non_empty(start),
      end_location: non_empty(end)
    }
  }

  #[must_use]
  pub fn with_date(
    mut self,
    date: impl Into<String>
  ) -> Self {
    self.date =
      non_empty(Some(date.into()));
    self
  }

  #[must_use]
  pub fn with_start(
    mut self,
    start: impl Into<String>
  ) -> Self {
    self.start_location =
      non_empty(Some(start.into()));
    self
  }

  #[must_use]
  pub fn with_end(
    mut self,
    end: impl Into<String>
  ) -> Self {
    self.end_location =
      non_empty(Some(end.into()));
    self
  }

  pub fn location(
    &self,
    axis: Axis
  ) -> &str {
    let value = match axis {
      | Axis::Start => {
        self.start_location.as_deref()
      }
      | Axis::End => {
        self.end_location.as_deref()
      }
    };
    value.unwrap_or_default()
  }
}

fn non_empty(
  value: Option<String>
) -> Option<String> {
  value.filter(|raw| !raw.is_empty())
}
