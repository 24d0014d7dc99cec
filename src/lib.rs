//! Interactive behavior for the marketing site: navigation, smooth in-page
//! scrolling, scroll reveals, KPI counters, the FAQ accordion, the hero
//! fade-out and contact form feedback. Everything attaches to markup the
//! page already ships.

pub mod config;
pub mod contact_form;
pub mod counter;
pub mod dom;
pub mod error;
pub mod faq;
pub mod hero;
pub mod nav;
pub mod reveal;
pub mod site;
pub mod smooth_scroll;

pub use config::SiteConfig;
pub use error::SiteError;
pub use site::Site;
