mod app;
mod dom;

use gloo::events::EventListener;

fn main() {
  console_error_panic_hook::set_once();
  wasm_tracing::set_as_global_default();

  tracing::info!(
    "starting eventboard page script"
  );

  let Some(document) = web_sys::window()
    .and_then(|window| window.document())
  else {
    tracing::error!("no document to attach to");
    return;
  };

  if is_parsed(&document.ready_state()) {
    app::init(&document);
    return;
  }

  let ready = document.clone();
  EventListener::once(
    &document,
    "DOMContentLoaded",
    move |_| app::init(&ready)
  )
  .forget();
}

// `readyState` is "loading" until the
// parser finishes
fn is_parsed(ready_state: &str) -> bool {
  ready_state != "loading"
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn waits_only_while_loading() {
    assert!(!is_parsed("loading"));
    assert!(is_parsed("interactive"));
    assert!(is_parsed("complete"));
  }
}
