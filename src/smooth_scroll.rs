use gloo_events::{EventListener, EventListenerOptions};
use web_sys::{Document, Element, Event, ScrollBehavior, ScrollToOptions, Window};

use crate::config::ScrollConfig;
use crate::dom;

/// Selector for the in-page target of an anchor, or `None` for a bare `#`.
pub fn anchor_target(href: &str) -> Option<&str> {
    match href {
        "#" => None,
        target if target.starts_with('#') => Some(target),
        _ => None,
    }
}

/// Document offset to scroll to so the target clears the fixed header.
pub fn scroll_offset(element_top: f64, page_y_offset: f64, header_offset: f64) -> f64 {
    element_top + page_y_offset - header_offset
}

pub fn install(window: &Window, document: &Document, config: &ScrollConfig) -> Vec<EventListener> {
    dom::query_all(document, r##"a[href^="#"]"##)
        .into_iter()
        .map(|anchor| {
            let window = window.clone();
            let document = document.clone();
            let header_offset = config.header_offset;
            let href = anchor.get_attribute("href").unwrap_or_default();
            EventListener::new_with_options(
                &anchor,
                "click",
                EventListenerOptions::enable_prevent_default(),
                move |event: &Event| {
                    event.prevent_default();
                    let Some(selector) = anchor_target(&href) else {
                        return;
                    };
                    if let Some(target) = dom::query(&document, selector) {
                        scroll_to(&window, &target, header_offset);
                    }
                },
            )
        })
        .collect()
}

fn scroll_to(window: &Window, target: &Element, header_offset: f64) {
    let top = target.get_bounding_client_rect().top();
    let page_y = window.page_y_offset().unwrap_or(0.0);

    let options = ScrollToOptions::new();
    options.set_top(scroll_offset(top, page_y, header_offset));
    options.set_behavior(ScrollBehavior::Smooth);
    window.scroll_to_with_scroll_to_options(&options);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_hash_is_ignored() {
        assert_eq!(anchor_target("#"), None);
        assert_eq!(anchor_target(""), None);
    }

    #[test]
    fn fragment_becomes_selector() {
        assert_eq!(anchor_target("#services"), Some("#services"));
        assert_eq!(anchor_target("#contact-us"), Some("#contact-us"));
    }

    #[test]
    fn offset_clears_header() {
        assert_eq!(scroll_offset(500.0, 0.0, 80.0), 420.0);
        assert_eq!(scroll_offset(-200.0, 1000.0, 80.0), 720.0);
    }
}
