use std::rc::Rc;

use gloo_events::EventListener;
use log::{info, warn};
use web_sys::{Document, Window};

use crate::config::SiteConfig;
use crate::contact_form::ContactFormController;
use crate::counter::CounterAnimator;
use crate::error::SiteError;
use crate::faq::FaqController;
use crate::hero::HeroFade;
use crate::nav::NavController;
use crate::reveal::{self, RevealRegistration};
use crate::smooth_scroll;

/// Everything attached to one page. Dropping it detaches every listener and
/// observer it owns.
pub struct Site {
    nav: Rc<NavController>,
    counters: Rc<CounterAnimator>,
    contact_form: Option<Rc<ContactFormController>>,
    reveals: Vec<RevealRegistration>,
    listeners: Vec<EventListener>,
}

impl Site {
    pub fn mount() -> Result<Self, SiteError> {
        let window = web_sys::window().ok_or(SiteError::NoWindow)?;
        let document = window.document().ok_or(SiteError::NoDocument)?;
        let config = SiteConfig::from_document(&document);
        Self::mount_with(&window, &document, config)
    }

    pub fn mount_with(window: &Window, document: &Document, config: SiteConfig) -> Result<Self, SiteError> {
        let mut listeners = Vec::new();

        let nav = NavController::new(window, document, config.nav.clone());
        listeners.extend(nav.install(document));
        listeners.extend(smooth_scroll::install(window, document, &config.scroll));

        let faq = FaqController::new(document);
        listeners.extend(faq.install());

        let hero = HeroFade::new(window, document, config.hero.clone());
        let counters = CounterAnimator::new(window, document, config.counters.clone());

        {
            let nav = Rc::clone(&nav);
            let counters = Rc::clone(&counters);
            listeners.push(EventListener::new(window, "scroll", move |_| {
                nav.on_scroll();
                hero.on_scroll();
                counters.check();
            }));
        }
        {
            let counters = Rc::clone(&counters);
            listeners.push(EventListener::new(window, "load", move |_| counters.check()));
        }

        let contact_form = ContactFormController::new(document, config.form.clone());
        if let Some(form) = &contact_form {
            listeners.push(form.install());
        }

        let mut reveals = Vec::new();
        for group in &config.reveal_groups {
            match reveal::register(document, group) {
                Ok(Some(registration)) => reveals.push(registration),
                Ok(None) => {}
                Err(e) => warn!("Reveal group '{}' not registered: {}", group.name, e),
            }
        }

        // Pages can open mid-scroll after a reload or a fragment link.
        nav.on_scroll();
        counters.check();

        info!(
            "Site mounted: {} listeners, {} reveal groups ({})",
            listeners.len(),
            reveals.len(),
            reveals.iter().map(RevealRegistration::name).collect::<Vec<_>>().join(", ")
        );

        Ok(Self {
            nav,
            counters,
            contact_form,
            reveals,
            listeners,
        })
    }

    pub fn nav(&self) -> &NavController {
        &self.nav
    }

    pub fn counters(&self) -> &CounterAnimator {
        &self.counters
    }

    pub fn has_contact_form(&self) -> bool {
        self.contact_form.is_some()
    }

    pub fn reveals(&self) -> &[RevealRegistration] {
        &self.reveals
    }

    /// Keeps everything attached for the rest of the page's life.
    pub fn forget(self) {
        for listener in self.listeners {
            listener.forget();
        }
        std::mem::forget(self.reveals);
    }
}
