//! View updaters and the page surface they draw into.

pub mod animate;
pub mod chart;
pub mod document;
pub mod map;
pub mod notify;
pub mod table;

use chrono::{DateTime, Utc};

use document::Document;

/// Plain-text rendering of every visible element, in layout order. Used by
/// the terminal binary after each dispatch.
pub fn render_document(doc: &Document, now: DateTime<Utc>) -> Vec<String> {
    let mut lines = Vec::new();
    for id in doc.ids() {
        let Some(el) = doc.get(id) else { continue };
        if !el.visible {
            continue;
        }
        let mut head = format!("{}: {}", id, el.text_at(now));
        if el.disabled {
            head.push_str(" (disabled)");
        }
        if let Some(class) = &el.class {
            head.push_str(&format!(" <{}>", class));
        }
        lines.push(head);
        lines.extend(el.items.iter().map(|item| format!("    {}", item)));
    }
    lines
}
