use std::cell::RefCell;
use std::rc::Rc;

use eventboard_core::{
  Axis,
  BoardConfig,
  Bucket,
  Collapsible,
  PageSession,
  today_local
};
use gloo::console::log;
use gloo::events::EventListener;
use web_sys::{
  Document,
  Element
};

use crate::dom::{
  BrowserAddress,
  DomBuckets,
  DomFilter,
  DomToggle,
  LocalStorage,
  query_all,
  read_items,
  section
};

type Session =
  PageSession<LocalStorage, BrowserAddress>;

const DATED_CARDS: &str =
  ".event-card[data-date]";
const EVENT_CARDS: &str = ".event-card";
const TOGGLES: &str = ".collapsible-toggle";

#[tracing::instrument(skip_all)]
pub fn init(document: &Document) {
  let config = read_config(document);
  ui_debug(
    "init",
    &format!(
      "horizon={} storage_key={}",
      config.horizon_days,
      config.storage_key
    )
  );

  let session =
    Rc::new(RefCell::new(Session::new(config)));

  arrange(document, &session);
  mount_filter(document, &session);
  wire_toggles(document);
}

fn read_config(
  document: &Document
) -> BoardConfig {
  let mut config = BoardConfig::default();
  let Some(events) = section(
    document,
    Bucket::Upcoming.section()
  ) else {
    return config;
  };

  let overrides = [
    ("horizon_days", "data-horizon-days"),
    ("storage_key", "data-storage-key")
  ]
  .into_iter()
  .filter_map(|(key, attribute)| {
    events
      .get_attribute(attribute)
      .map(|value| (key.to_string(), value))
  });
  config.apply_overrides(overrides);
  config
}

fn arrange(
  document: &Document,
  session: &Rc<RefCell<Session>>
) {
  let Some(events) = section(
    document,
    Bucket::Upcoming.section()
  ) else {
    ui_debug("buckets", "no events section");
    return;
  };

  let cards = query_all(&events, DATED_CARDS);
  let items = read_items(&cards);
  let mut view =
    DomBuckets::new(document.clone(), cards);

  session.borrow_mut().arrange(
    &items,
    today_local(),
    &mut view
  );
}

fn mount_filter(
  document: &Document,
  session: &Rc<RefCell<Session>>
) {
  let cards = query_all(document, EVENT_CARDS);
  let items = read_items(&cards);
  let Some(mut view) =
    DomFilter::find(document.clone(), cards)
  else {
    ui_debug("filter", "selectors missing");
    return;
  };

  session.borrow_mut().mount_filter(
    items,
    LocalStorage,
    BrowserAddress,
    &mut view
  );

  let view = Rc::new(RefCell::new(view));

  for axis in Axis::ALL {
    let select =
      view.borrow().select(axis).clone();
    let session = Rc::clone(session);
    let view = Rc::clone(&view);
    let target = select.clone();
    EventListener::new(
      &target,
      "change",
      move |_| {
        let value = select.value();
        ui_debug(
          "filter-change",
          &format!("{axis:?}={value}")
        );
        session.borrow_mut().on_select(
          axis,
          &value,
          &mut *view.borrow_mut()
        );
      }
    )
    .forget();
  }

  let clear = view.borrow().clear_button().cloned();
  if let Some(button) = clear {
    let session = Rc::clone(session);
    let view = Rc::clone(&view);
    EventListener::new(
      &button,
      "click",
      move |_| {
        ui_debug("filter-clear", "");
        session
          .borrow_mut()
          .on_clear(&mut *view.borrow_mut());
      }
    )
    .forget();
  }
}

fn wire_toggles(document: &Document) {
  for control in query_all(document, TOGGLES) {
    let Some(container) =
      controlled_container(document, &control)
    else {
      continue;
    };

    let mut state =
      Collapsible::from_attribute(
        control
          .get_attribute("aria-expanded")
          .as_deref()
      );
    let mut view =
      DomToggle::new(control.clone(), container);

    EventListener::new(
      &control,
      "click",
      move |_| {
        if let Err(err) =
          state.click(&mut view)
        {
          tracing::error!(
            error = %err,
            "failed toggling section"
          );
        }
      }
    )
    .forget();
  }
}

fn controlled_container(
  document: &Document,
  control: &Element
) -> Option<Element> {
  let id = control.get_attribute("aria-controls")?;
  document.get_element_by_id(&id)
}

fn ui_debug(
  event: &str,
  detail: &str
) {
  tracing::debug!(
    event, detail, "ui-debug"
  );
  log!(format!(
    "[ui-debug] {event}: {detail}"
  ));
}
