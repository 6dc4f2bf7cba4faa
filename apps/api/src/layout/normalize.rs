use serde_json::Value;
use tracing::warn;

use crate::layout::document::{LayoutDocument, RawLayout};

/// Converts a stored layout into a canonical document, or `None` when there is nothing
/// renderable. Never fails: corrupt or legacy values degrade to `None`.
pub fn normalize_layout(raw: RawLayout) -> Option<LayoutDocument> {
    match raw {
        RawLayout::EncodedString(text) => match serde_json::from_str::<Value>(&text) {
            Ok(parsed) => LayoutDocument::from_value(parsed),
            Err(e) => {
                warn!("Discarding unparsable layout ({} bytes): {e}", text.len());
                None
            }
        },
        RawLayout::StructuredValue(value) => LayoutDocument::from_value(value),
        RawLayout::Absent => None,
    }
}
