use tracing::trace;

use crate::ports::ToggleView;

pub const EXPANDED_GLYPH: &str = "-";
pub const COLLAPSED_GLYPH: &str = "+";

pub fn glyph_for(
  expanded: bool
) -> &'static str {
  if expanded {
    EXPANDED_GLYPH
  } else {
    COLLAPSED_GLYPH
  }
}

/// A show/hide control bound to one
/// container (`aria-controls`).
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct Collapsible {
  expanded: bool
}

impl Collapsible {
  /// `aria_expanded` is the control's
  /// attribute value; anything but
  /// `"true"` reads as collapsed.
  pub fn from_attribute(
    aria_expanded: Option<&str>
  ) -> Self {
    Self {
      expanded: aria_expanded == Some("true")
    }
  }

  pub fn is_expanded(&self) -> bool {
    self.expanded
  }

  pub fn click<V>(
    &mut self,
    view: &mut V
  ) -> anyhow::Result<()>
  where
    V: ToggleView + ?Sized
  {
    self.expanded = !self.expanded;
    trace!(expanded = self.expanded, "toggled section");
    view.set_expanded(self.expanded)?;
    view.set_glyph(glyph_for(self.expanded))
  }
}
