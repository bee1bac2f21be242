/// The page surface.
///
/// A `Document` is the set of named elements a page layout provides: text
/// fields, counters, buttons, panels and list containers. View updaters
/// write into it by id. Every mutation silently does nothing when the id is
/// not part of the layout, so a page with a partial layout keeps working.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use crate::view::animate::Tween;

/// One element of the page.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub text: String,
    pub visible: bool,
    pub disabled: bool,
    /// Style hint, e.g. a grade key or `connected` / `disconnected`.
    pub class: Option<String>,
    /// Child lines for list containers, option lists and table bodies.
    pub items: Vec<String>,
    tween: Option<AnimatedNumber>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct AnimatedNumber {
    tween: Tween,
    decimals: usize,
}

impl Default for Element {
    fn default() -> Self {
        Self {
            text: String::new(),
            visible: true,
            disabled: false,
            class: None,
            items: Vec::new(),
            tween: None,
        }
    }
}

impl Element {
    /// Text as displayed at `now`, mid-animation values included.
    pub fn text_at(&self, now: DateTime<Utc>) -> String {
        match &self.tween {
            Some(anim) => format!("{:.*}", anim.decimals, anim.tween.value_at(now)),
            None => self.text.clone(),
        }
    }

    /// The number currently on screen, if the element shows one.
    fn displayed_number(&self, now: DateTime<Utc>) -> Option<f64> {
        match &self.tween {
            Some(anim) => Some(anim.tween.value_at(now)),
            None => self.text.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    elements: BTreeMap<String, Element>,
    order: Vec<String>,
}

impl Document {
    /// A document holding exactly the given element ids, in render order.
    pub fn with_layout(ids: &[&str]) -> Self {
        let mut doc = Document::default();
        for id in ids {
            if doc.elements.insert(id.to_string(), Element::default()).is_none() {
                doc.order.push(id.to_string());
            }
        }
        doc
    }

    pub fn has(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    /// Element ids in layout order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Displayed text of `id` at `now`; `None` when the element is absent.
    pub fn text_at(&self, id: &str, now: DateTime<Utc>) -> Option<String> {
        self.elements.get(id).map(|e| e.text_at(now))
    }

    pub fn set_text(&mut self, id: &str, text: impl Into<String>) {
        if let Some(el) = self.elements.get_mut(id) {
            el.text = text.into();
            el.tween = None;
        }
    }

    /// Animates a numeric element from whatever it shows at `now` (zero if
    /// it shows no number) to `to`.
    pub fn animate_number(&mut self, id: &str, to: f64, decimals: usize, now: DateTime<Utc>, duration: Duration) {
        if let Some(el) = self.elements.get_mut(id) {
            let from = el.displayed_number(now).unwrap_or(0.0);
            el.text = format!("{:.*}", decimals, to);
            el.tween = Some(AnimatedNumber {
                tween: Tween::new(from, to, now, duration),
                decimals,
            });
        }
    }

    pub fn set_visible(&mut self, id: &str, visible: bool) {
        if let Some(el) = self.elements.get_mut(id) {
            el.visible = visible;
        }
    }

    pub fn set_disabled(&mut self, id: &str, disabled: bool) {
        if let Some(el) = self.elements.get_mut(id) {
            el.disabled = disabled;
        }
    }

    pub fn set_class(&mut self, id: &str, class: Option<&str>) {
        if let Some(el) = self.elements.get_mut(id) {
            el.class = class.map(str::to_string);
        }
    }

    /// Replaces every child line of a container.
    pub fn set_items(&mut self, id: &str, items: Vec<String>) {
        if let Some(el) = self.elements.get_mut(id) {
            el.items = items;
        }
    }

    /// Drops finished animations so their final text is served directly.
    pub fn settle(&mut self, now: DateTime<Utc>) {
        for el in self.elements.values_mut() {
            if el.tween.is_some_and(|anim| anim.tween.is_finished(now)) {
                el.tween = None;
            }
        }
    }
}
