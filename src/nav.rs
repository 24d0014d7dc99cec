use std::cell::Cell;
use std::rc::Rc;

use gloo_events::EventListener;
use log::debug;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement, Node, Window};

use crate::config::NavConfig;
use crate::dom;

const ACTIVE: &str = "active";
const SCROLLED: &str = "scrolled";

/// Header and mobile-menu flags. The two toggles are independent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavState {
    pub scrolled: bool,
    pub menu_open: bool,
}

impl NavState {
    pub fn on_scroll(&mut self, scroll_y: f64, threshold: f64) {
        self.scrolled = scroll_y > threshold;
    }

    pub fn toggle_menu(&mut self) {
        self.menu_open = !self.menu_open;
    }

    pub fn close_menu(&mut self) {
        self.menu_open = false;
    }

    /// Any click that lands outside both the hamburger and the menu closes it.
    pub fn on_document_click(&mut self, inside_nav: bool) {
        if !inside_nav {
            self.close_menu();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionBounds {
    pub top: f64,
    pub height: f64,
}

/// Index of the section the viewport is currently in. Sections are tested in
/// order and a later match overrides an earlier one.
pub fn active_section(scroll_y: f64, sections: &[SectionBounds], offset: f64) -> Option<usize> {
    sections
        .iter()
        .enumerate()
        .filter(|(_, s)| {
            let top = s.top - offset;
            scroll_y > top && scroll_y <= top + s.height
        })
        .map(|(i, _)| i)
        .last()
}

pub struct NavController {
    window: Window,
    header: Option<Element>,
    hamburger: Option<Element>,
    menu: Option<Element>,
    links: Vec<Element>,
    sections: Vec<Element>,
    state: Cell<NavState>,
    config: NavConfig,
}

impl NavController {
    pub fn new(window: &Window, document: &Document, config: NavConfig) -> Rc<Self> {
        Rc::new(Self {
            window: window.clone(),
            header: document.get_element_by_id("header"),
            hamburger: document.get_element_by_id("hamburger"),
            menu: document.get_element_by_id("navMenu"),
            links: dom::query_all(document, ".nav-link"),
            sections: dom::query_all(document, "section[id]"),
            state: Cell::new(NavState::default()),
            config,
        })
    }

    pub fn state(&self) -> NavState {
        self.state.get()
    }

    pub fn install(self: &Rc<Self>, document: &Document) -> Vec<EventListener> {
        let mut listeners = Vec::new();

        // The hamburger and menu only make sense as a pair.
        if let (Some(hamburger), Some(_)) = (&self.hamburger, &self.menu) {
            let nav = Rc::clone(self);
            listeners.push(EventListener::new(hamburger, "click", move |_| {
                nav.update(NavState::toggle_menu);
            }));

            for link in &self.links {
                let nav = Rc::clone(self);
                listeners.push(EventListener::new(link, "click", move |_| {
                    nav.update(NavState::close_menu);
                }));
            }

            let nav = Rc::clone(self);
            listeners.push(EventListener::new(document, "click", move |event: &Event| {
                let inside = nav.contains_target(event);
                nav.update(|state| state.on_document_click(inside));
            }));
        }

        listeners
    }

    pub fn on_scroll(&self) {
        let scroll_y = dom::scroll_y(&self.window);
        self.update(|state| state.on_scroll(scroll_y, self.config.scrolled_threshold));
        self.highlight_section(scroll_y);
    }

    fn update(&self, change: impl FnOnce(&mut NavState)) {
        let mut state = self.state.get();
        change(&mut state);
        self.state.set(state);
        self.render(state);
    }

    fn render(&self, state: NavState) {
        if let Some(header) = &self.header {
            dom::set_class(header, SCROLLED, state.scrolled);
        }
        for el in [&self.hamburger, &self.menu].into_iter().flatten() {
            dom::set_class(el, ACTIVE, state.menu_open);
        }
    }

    fn contains_target(&self, event: &Event) -> bool {
        let target = event.target().and_then(|t| t.dyn_into::<Node>().ok());
        [&self.hamburger, &self.menu]
            .into_iter()
            .flatten()
            .any(|el| el.contains(target.as_ref()))
    }

    fn highlight_section(&self, scroll_y: f64) {
        let bounds: Vec<SectionBounds> = self
            .sections
            .iter()
            .map(|section| match section.dyn_ref::<HtmlElement>() {
                Some(html) => SectionBounds {
                    top: html.offset_top() as f64,
                    height: html.offset_height() as f64,
                },
                None => SectionBounds { top: 0.0, height: 0.0 },
            })
            .collect();

        let Some(index) = active_section(scroll_y, &bounds, self.config.section_offset) else {
            return;
        };

        let href = format!("#{}", self.sections[index].id());
        for link in &self.links {
            dom::set_class(link, ACTIVE, false);
        }
        if let Some(link) = self
            .links
            .iter()
            .find(|link| link.get_attribute("href").as_deref() == Some(href.as_str()))
        {
            debug!("Active section {}", href);
            dom::set_class(link, ACTIVE, true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(spec: &[(f64, f64)]) -> Vec<SectionBounds> {
        spec.iter()
            .map(|&(top, height)| SectionBounds { top, height })
            .collect()
    }

    #[test]
    fn scrolled_only_above_threshold() {
        let mut state = NavState::default();
        for (offset, expected) in [(0.0, false), (50.0, false), (50.5, true), (900.0, true), (10.0, false)] {
            state.on_scroll(offset, 50.0);
            assert_eq!(state.scrolled, expected, "offset {}", offset);
        }
    }

    #[test]
    fn hamburger_toggles_and_links_close() {
        let mut state = NavState::default();
        state.toggle_menu();
        assert!(state.menu_open);
        state.toggle_menu();
        assert!(!state.menu_open);

        state.toggle_menu();
        state.close_menu();
        assert!(!state.menu_open);
        state.close_menu();
        assert!(!state.menu_open);
    }

    #[test]
    fn outside_click_closes_inside_click_keeps() {
        let mut state = NavState { scrolled: true, menu_open: true };
        state.on_document_click(true);
        assert!(state.menu_open);
        state.on_document_click(false);
        assert!(!state.menu_open);
        assert!(state.scrolled);
    }

    #[test]
    fn active_section_uses_early_offset() {
        let sections = bounds(&[(0.0, 600.0), (600.0, 800.0), (1400.0, 500.0)]);
        assert_eq!(active_section(0.0, &sections, 100.0), Some(0));
        assert_eq!(active_section(499.0, &sections, 100.0), Some(0));
        assert_eq!(active_section(501.0, &sections, 100.0), Some(1));
        assert_eq!(active_section(1350.0, &sections, 100.0), Some(2));
    }

    #[test]
    fn overlapping_sections_pick_the_later_one() {
        let sections = bounds(&[(0.0, 2000.0), (500.0, 300.0)]);
        assert_eq!(active_section(600.0, &sections, 100.0), Some(1));
        assert_eq!(active_section(1000.0, &sections, 100.0), Some(0));
    }

    #[test]
    fn no_section_matches_past_the_end() {
        let sections = bounds(&[(200.0, 100.0)]);
        assert_eq!(active_section(5000.0, &sections, 100.0), None);
        assert_eq!(active_section(0.0, &[], 100.0), None);
    }
}
