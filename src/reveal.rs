//! Scroll reveals. Every group of animated elements on every page goes
//! through `register`, configured by a `RevealGroup`.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use log::debug;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::js_sys::Array;
use web_sys::{Document, Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

use crate::config::{RevealEffect, RevealGroup};
use crate::dom;
use crate::error::SiteError;

/// Entries of one observer batch that should reveal, with their delay. The
/// delay follows the entry's position in the whole batch, so entries that
/// are not intersecting still push later ones back.
pub fn plan_batch(intersecting: &[bool], stagger_ms: u32) -> Vec<(usize, u32)> {
    intersecting
        .iter()
        .enumerate()
        .filter(|(_, hit)| **hit)
        .map(|(index, _)| (index, stagger_ms.saturating_mul(index as u32)))
        .collect()
}

/// Which elements of a group have been revealed. An element is revealed at
/// most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealLedger {
    revealed: Vec<bool>,
}

impl RevealLedger {
    pub fn new(len: usize) -> Self {
        Self { revealed: vec![false; len] }
    }

    /// Returns true only the first time an element is marked.
    pub fn mark(&mut self, index: usize) -> bool {
        match self.revealed.get_mut(index) {
            Some(seen) if !*seen => {
                *seen = true;
                true
            }
            _ => false,
        }
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed.iter().filter(|r| **r).count()
    }
}

pub fn prepare(effect: &RevealEffect, element: &Element) {
    if let RevealEffect::Fade { offset_px, transition } = effect {
        dom::set_style(element, "opacity", "0");
        dom::set_style(element, "transform", &format!("translateY({}px)", offset_px));
        dom::set_style(element, "transition", transition);
    }
}

pub fn apply(effect: &RevealEffect, element: &Element) {
    match effect {
        RevealEffect::Class { name } => dom::set_class(element, name, true),
        RevealEffect::Fade { .. } => {
            dom::set_style(element, "opacity", "1");
            dom::set_style(element, "transform", "translateY(0)");
        }
    }
}

struct GroupState {
    elements: Vec<Element>,
    ledger: RefCell<RevealLedger>,
    effect: RevealEffect,
    stagger_ms: u32,
}

impl GroupState {
    fn on_entries(&self, entries: Array, observer: &IntersectionObserver) {
        let entries: Vec<IntersectionObserverEntry> = entries
            .iter()
            .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
            .collect();
        let hits: Vec<bool> = entries.iter().map(|e| e.is_intersecting()).collect();

        for (i, delay) in plan_batch(&hits, self.stagger_ms) {
            let target = entries[i].target();
            observer.unobserve(&target);

            let Some(index) = self.elements.iter().position(|el| *el == target) else {
                continue;
            };
            if !self.ledger.borrow_mut().mark(index) {
                continue;
            }

            if delay == 0 {
                apply(&self.effect, &target);
            } else {
                let effect = self.effect.clone();
                Timeout::new(delay, move || apply(&effect, &target)).forget();
            }
        }
    }
}

/// A live observer for one group. Dropping it disconnects the observer.
pub struct RevealRegistration {
    name: String,
    observer: IntersectionObserver,
    state: Rc<GroupState>,
    _callback: Closure<dyn FnMut(Array, IntersectionObserver)>,
}

impl RevealRegistration {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn revealed_count(&self) -> usize {
        self.state.ledger.borrow().revealed_count()
    }
}

impl Drop for RevealRegistration {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

/// Observes the group's elements. Returns `None` when the page lacks the
/// group's required anchor or has none of its elements.
pub fn register(document: &Document, group: &RevealGroup) -> Result<Option<RevealRegistration>, SiteError> {
    if !group.is_enabled(|selector| dom::query(document, selector).is_some()) {
        return Ok(None);
    }

    let mut elements: Vec<Element> = group
        .first_only
        .iter()
        .filter_map(|selector| dom::query(document, selector))
        .collect();
    if !group.selectors.is_empty() {
        for element in dom::query_all(document, &group.selector()) {
            if !elements.contains(&element) {
                elements.push(element);
            }
        }
    }
    if elements.is_empty() {
        return Ok(None);
    }

    for element in &elements {
        prepare(&group.effect, element);
    }

    let state = Rc::new(GroupState {
        ledger: RefCell::new(RevealLedger::new(elements.len())),
        elements,
        effect: group.effect.clone(),
        stagger_ms: group.stagger_ms,
    });

    let callback = {
        let state = Rc::clone(&state);
        Closure::wrap(Box::new(move |entries: Array, observer: IntersectionObserver| {
            state.on_entries(entries, &observer);
        }) as Box<dyn FnMut(Array, IntersectionObserver)>)
    };

    let options = IntersectionObserverInit::new();
    options.set_threshold(&JsValue::from_f64(group.threshold));
    options.set_root_margin(&group.root_margin);
    let observer = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)?;

    for element in &state.elements {
        observer.observe(element);
    }
    debug!("Reveal group '{}' observing {} elements", group.name, state.elements.len());

    Ok(Some(RevealRegistration {
        name: group.name.clone(),
        observer,
        state,
        _callback: callback,
    }))
}
