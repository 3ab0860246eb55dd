pub mod bucket;
pub mod config;
pub mod date;
pub mod filter_state;
pub mod item;
pub mod location;
pub mod memory;
pub mod ports;
pub mod session;
pub mod toggle;

pub use bucket::{
  Bucket,
  Buckets,
  DatedItem,
  bucketize,
  present
};
pub use config::BoardConfig;
pub use date::{
  parse_event_date,
  today_local
};
pub use filter_state::{
  FilterState,
  FilterStore,
  resolve_filter_state
};
pub use item::{
  Axis,
  Item,
  ItemId
};
pub use location::{
  LocationFilter,
  LocationVocabulary,
  is_visible,
  location_label
};
pub use session::PageSession;
pub use toggle::Collapsible;
