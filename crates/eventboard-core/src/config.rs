use serde::{
  Deserialize,
  Serialize
};
use tracing::{
  debug,
  warn
};

use crate::item::Axis;

pub const DEFAULT_HORIZON_DAYS: u32 = 90;
pub const DEFAULT_STORAGE_KEY: &str =
  "eventboard:location-filter";
pub const DEFAULT_START_PARAM: &str =
  "start";
pub const DEFAULT_END_PARAM: &str =
  "end";

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
#[serde(default)]
pub struct BoardConfig {
  pub horizon_days: u32,
  pub storage_key:  String,
  pub start_param:  String,
  pub end_param:    String
}

impl Default for BoardConfig {
  fn default() -> Self {
    Self {
      horizon_days: DEFAULT_HORIZON_DAYS,
      storage_key:  DEFAULT_STORAGE_KEY
        .to_string(),
      start_param:  DEFAULT_START_PARAM
        .to_string(),
      end_param:    DEFAULT_END_PARAM
        .to_string()
    }
  }
}

impl BoardConfig {
  pub fn query_key(
    &self,
    axis: Axis
  ) -> &str {
    match axis {
      | Axis::Start => &self.start_param,
      | Axis::End => &self.end_param
    }
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (key, value) in overrides {
      let value = value.trim();
      if value.is_empty() {
        continue;
      }

      match key.as_str() {
        | "horizon_days" => {
          match value.parse::<u32>() {
            | Ok(days) => {
              debug!(days, "applying horizon override");
              self.horizon_days = days;
            }
            | Err(err) => {
              warn!(
                value,
                error = %err,
                "ignoring invalid horizon_days override"
              );
            }
          }
        }
        | "storage_key" => {
          self.storage_key =
            value.to_string();
        }
        | "start_param" => {
          self.start_param =
            value.to_string();
        }
        | "end_param" => {
          self.end_param =
            value.to_string();
        }
        | other => {
          warn!(
            key = other,
            "ignoring unknown board setting"
          );
        }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn overrides_replace_known_keys() {
    let mut cfg =
      BoardConfig::default();
    cfg.apply_overrides([
      (
        "horizon_days".to_string(),
        "30".to_string()
      ),
      (
        "storage_key".to_string(),
        "rides".to_string()
      )
    ]);
    assert_eq!(cfg.horizon_days, 30);
    assert_eq!(cfg.storage_key, "rides");
    assert_eq!(cfg.start_param, "start");
  }

  #[test]
  fn invalid_horizon_keeps_default() {
    let mut cfg =
      BoardConfig::default();
    cfg.apply_overrides([(
      "horizon_days".to_string(),
      "soon".to_string()
    )]);
    assert_eq!(
      cfg.horizon_days,
      DEFAULT_HORIZON_DAYS
    );
  }
}
