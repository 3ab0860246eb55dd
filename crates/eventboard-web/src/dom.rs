use anyhow::{
  Context,
  anyhow
};
use eventboard_core::bucket::Bucket;
use eventboard_core::ports::{
  AddressBar,
  BucketView,
  FilterView,
  KeyValueStore,
  ToggleView
};
use eventboard_core::{
  Axis,
  Item,
  ItemId
};
use wasm_bindgen::{
  JsCast,
  JsValue
};
use web_sys::{
  Document,
  Element,
  HtmlElement,
  HtmlSelectElement,
  Storage
};

const HAS_EVENTS_CLASS: &str =
  "has-events";
const FILTERED_OUT_CLASS: &str =
  "filtered-out";
const EXPANDED_CLASS: &str = "expanded";
const CONTAINER_SELECTOR: &str =
  ".collapsible-container";
const COUNT_SELECTOR: &str =
  ".section-count";
const NOTICE_CLASS: &str =
  "no-events-message";
const LABEL_CLASS: &str =
  "event-location";

fn js_error(err: JsValue) -> anyhow::Error {
  anyhow!("{err:?}")
}

pub fn section(
  document: &Document,
  name: &str
) -> Option<Element> {
  document
    .query_selector(&format!(
      "[data-section=\"{name}\"]"
    ))
    .ok()
    .flatten()
}

pub fn query_all(
  root: &impl AsRef<web_sys::Node>,
  selector: &str
) -> Vec<Element> {
  let list = if let Some(element) =
    root.as_ref().dyn_ref::<Element>()
  {
    element.query_selector_all(selector)
  } else if let Some(document) =
    root.as_ref().dyn_ref::<Document>()
  {
    document.query_selector_all(selector)
  } else {
    return Vec::new();
  };

  let Ok(list) = list else {
    return Vec::new();
  };

  (0..list.length())
    .filter_map(|index| list.get(index))
    .filter_map(|node| {
      node.dyn_into::<Element>().ok()
    })
    .collect()
}

/// Reads the event attributes of each
/// element; the id is the element's
/// position in `elements`.
pub fn read_items(
  elements: &[Element]
) -> Vec<Item> {
  elements
    .iter()
    .enumerate()
    .map(|(index, element)| {
      Item::from_attributes(
        ItemId(index),
        element.get_attribute("data-date"),
        element.get_attribute("data-start"),
        element.get_attribute("data-end")
      )
    })
    .collect()
}

fn element_at<'a>(
  elements: &'a [Element],
  item: ItemId
) -> anyhow::Result<&'a Element> {
  elements.get(item.0).ok_or_else(|| {
    anyhow!("unknown item {}", item.0)
  })
}

pub struct DomBuckets {
  document:   Document,
  cards:      Vec<Element>,
  sections:   Vec<(Bucket, Element)>,
  containers: Vec<(Bucket, Element)>
}

impl DomBuckets {
  /// Resolves every container before any
  /// card moves; upcoming cards are
  /// reordered inside the list that holds
  /// them on the page.
  pub fn new(
    document: Document,
    cards: Vec<Element>
  ) -> Self {
    let sections: Vec<(Bucket, Element)> =
      Bucket::ALL
        .into_iter()
        .filter_map(|bucket| {
          section(&document, bucket.section())
            .map(|element| (bucket, element))
        })
        .collect();

    let containers = sections
      .iter()
      .filter_map(|(bucket, section)| {
        if let Ok(Some(container)) = section
          .query_selector(CONTAINER_SELECTOR)
        {
          return Some((*bucket, container));
        }
        if *bucket != Bucket::Upcoming {
          return None;
        }
        let list = cards
          .first()
          .and_then(|card| card.parent_element())
          .unwrap_or_else(|| section.clone());
        Some((*bucket, list))
      })
      .collect();

    Self {
      document,
      cards,
      sections,
      containers
    }
  }

  fn find(
    entries: &[(Bucket, Element)],
    bucket: Bucket
  ) -> Option<&Element> {
    entries
      .iter()
      .find(|(candidate, _)| {
        *candidate == bucket
      })
      .map(|(_, element)| element)
  }

  fn section_for(
    &self,
    bucket: Bucket
  ) -> Option<&Element> {
    Self::find(&self.sections, bucket)
  }

  fn container_for(
    &self,
    bucket: Bucket
  ) -> Option<&Element> {
    Self::find(&self.containers, bucket)
  }
}

impl BucketView for DomBuckets {
  fn has_container(
    &self,
    bucket: Bucket
  ) -> bool {
    self.container_for(bucket).is_some()
  }

  fn append_item(
    &mut self,
    bucket: Bucket,
    item: ItemId
  ) -> anyhow::Result<()> {
    let container = self
      .container_for(bucket)
      .with_context(|| {
        format!(
          "missing container for {}",
          bucket.label()
        )
      })?;
    let card = element_at(&self.cards, item)?;
    container
      .append_child(card)
      .map_err(js_error)?;
    Ok(())
  }

  fn activate(
    &mut self,
    bucket: Bucket
  ) -> anyhow::Result<()> {
    if let Some(section) =
      self.section_for(bucket)
    {
      section
        .class_list()
        .add_1(HAS_EVENTS_CLASS)
        .map_err(js_error)?;
    }
    Ok(())
  }

  fn set_count(
    &mut self,
    bucket: Bucket,
    text: &str
  ) -> anyhow::Result<()> {
    if let Some(section) =
      self.section_for(bucket)
      && let Ok(Some(slot)) =
        section.query_selector(COUNT_SELECTOR)
    {
      slot.set_text_content(Some(text));
    }
    Ok(())
  }

  fn show_no_upcoming_notice(
    &mut self,
    message: &str
  ) -> anyhow::Result<()> {
    let section = self
      .section_for(Bucket::Upcoming)
      .context("missing events section")?;
    let notice = self
      .document
      .create_element("p")
      .map_err(js_error)?;
    notice.set_class_name(NOTICE_CLASS);
    notice.set_text_content(Some(message));
    section
      .append_child(&notice)
      .map_err(js_error)?;
    Ok(())
  }
}

pub struct DomFilter {
  document: Document,
  cards:    Vec<Element>,
  start:    HtmlSelectElement,
  end:      HtmlSelectElement,
  clear:    Option<HtmlElement>
}

impl DomFilter {
  /// `None` when either selector is
  /// missing from the page.
  pub fn find(
    document: Document,
    cards: Vec<Element>
  ) -> Option<Self> {
    let select = |id: &str| {
      document
        .get_element_by_id(id)?
        .dyn_into::<HtmlSelectElement>()
        .ok()
    };
    let start = select("filter-start")?;
    let end = select("filter-end")?;
    let clear = document
      .get_element_by_id("filter-clear")
      .and_then(|element| {
        element.dyn_into::<HtmlElement>().ok()
      });

    Some(Self {
      document,
      cards,
      start,
      end,
      clear
    })
  }

  pub fn select(
    &self,
    axis: Axis
  ) -> &HtmlSelectElement {
    match axis {
      | Axis::Start => &self.start,
      | Axis::End => &self.end
    }
  }

  pub fn clear_button(
    &self
  ) -> Option<&HtmlElement> {
    self.clear.as_ref()
  }
}

impl FilterView for DomFilter {
  fn set_options(
    &mut self,
    axis: Axis,
    values: &[String]
  ) -> anyhow::Result<()> {
    let select = self.select(axis);
    for value in values {
      let option = self
        .document
        .create_element("option")
        .map_err(js_error)?;
      option
        .set_attribute("value", value)
        .map_err(js_error)?;
      option.set_text_content(Some(value));
      select
        .append_child(&option)
        .map_err(js_error)?;
    }
    Ok(())
  }

  fn set_selected(
    &mut self,
    axis: Axis,
    value: &str
  ) -> anyhow::Result<()> {
    self.select(axis).set_value(value);
    Ok(())
  }

  fn set_filtered_out(
    &mut self,
    item: ItemId,
    filtered_out: bool
  ) -> anyhow::Result<()> {
    element_at(&self.cards, item)?
      .class_list()
      .toggle_with_force(
        FILTERED_OUT_CLASS,
        filtered_out
      )
      .map_err(js_error)?;
    Ok(())
  }

  fn set_clear_visible(
    &mut self,
    visible: bool
  ) -> anyhow::Result<()> {
    if let Some(button) = self.clear.as_ref()
    {
      button
        .style()
        .set_property(
          "display",
          if visible { "block" } else { "none" }
        )
        .map_err(js_error)?;
    }
    Ok(())
  }

  fn append_location_label(
    &mut self,
    item: ItemId,
    label: &str
  ) -> anyhow::Result<()> {
    let card = element_at(&self.cards, item)?;
    let span = self
      .document
      .create_element("span")
      .map_err(js_error)?;
    span.set_class_name(LABEL_CLASS);
    span.set_text_content(Some(label));
    card.append_child(&span).map_err(js_error)?;
    Ok(())
  }
}

pub struct DomToggle {
  control:   Element,
  container: Element
}

impl DomToggle {
  pub fn new(
    control: Element,
    container: Element
  ) -> Self {
    Self {
      control,
      container
    }
  }
}

impl ToggleView for DomToggle {
  fn set_expanded(
    &mut self,
    expanded: bool
  ) -> anyhow::Result<()> {
    self
      .control
      .set_attribute(
        "aria-expanded",
        if expanded { "true" } else { "false" }
      )
      .map_err(js_error)?;
    self
      .container
      .class_list()
      .toggle_with_force(
        EXPANDED_CLASS,
        expanded
      )
      .map_err(js_error)?;
    Ok(())
  }

  fn set_glyph(
    &mut self,
    glyph: &str
  ) -> anyhow::Result<()> {
    if let Ok(Some(icon)) = self
      .control
      .query_selector(".toggle-icon")
    {
      icon.set_text_content(Some(glyph));
    }
    Ok(())
  }
}

pub struct LocalStorage;

impl LocalStorage {
  fn handle() -> anyhow::Result<Storage> {
    web_sys::window()
      .context("no window")?
      .local_storage()
      .map_err(js_error)?
      .context("local storage unavailable")
  }
}

impl KeyValueStore for LocalStorage {
  fn get(
    &self,
    key: &str
  ) -> anyhow::Result<Option<String>> {
    Self::handle()?
      .get_item(key)
      .map_err(js_error)
  }

  fn set(
    &mut self,
    key: &str,
    value: &str
  ) -> anyhow::Result<()> {
    Self::handle()?
      .set_item(key, value)
      .map_err(js_error)
  }
}

pub struct BrowserAddress;

impl AddressBar for BrowserAddress {
  fn href(&self) -> anyhow::Result<String> {
    web_sys::window()
      .context("no window")?
      .location()
      .href()
      .map_err(js_error)
  }

  fn replace(
    &mut self,
    href: &str
  ) -> anyhow::Result<()> {
    web_sys::window()
      .context("no window")?
      .history()
      .map_err(js_error)?
      .replace_state_with_url(
        &JsValue::NULL,
        "",
        Some(href)
      )
      .map_err(js_error)
  }
}
