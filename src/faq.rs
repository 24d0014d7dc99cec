use std::cell::Cell;
use std::rc::Rc;

use gloo_events::EventListener;
use web_sys::{Document, Element};

use crate::dom;

const ACTIVE: &str = "active";

/// At most one FAQ item is open at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Accordion {
    open: Option<usize>,
}

impl Accordion {
    pub fn open(&self) -> Option<usize> {
        self.open
    }

    /// Clicking the open item closes it, clicking any other item moves the
    /// open slot there.
    pub fn click(&mut self, index: usize) {
        self.open = if self.open == Some(index) { None } else { Some(index) };
    }

    pub fn is_open(&self, index: usize) -> bool {
        self.open == Some(index)
    }
}

pub struct FaqController {
    items: Vec<Element>,
    state: Cell<Accordion>,
}

impl FaqController {
    pub fn new(document: &Document) -> Rc<Self> {
        let items = dom::query_all(document, ".faq-item");
        // Respect an item the markup ships already expanded.
        let open = items.iter().position(|item| dom::has_class(item, ACTIVE));
        let controller = Rc::new(Self {
            items,
            state: Cell::new(Accordion { open }),
        });
        controller.render();
        controller
    }

    pub fn install(self: &Rc<Self>) -> Vec<EventListener> {
        self.items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| {
                let question = item.query_selector(".faq-question").ok().flatten()?;
                let faq = Rc::clone(self);
                Some(EventListener::new(&question, "click", move |_| {
                    let mut state = faq.state.get();
                    state.click(index);
                    faq.state.set(state);
                    faq.render();
                }))
            })
            .collect()
    }

    fn render(&self) {
        let state = self.state.get();
        for (index, item) in self.items.iter().enumerate() {
            dom::set_class(item, ACTIVE, state.is_open(index));
        }
    }
}
