use log::{warn, Level};
use serde::Deserialize;
use web_sys::Document;

/// Element id of the optional JSON block that overrides `SiteConfig` defaults.
pub const CONFIG_SCRIPT_ID: &str = "site-config";

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::Debug // Verbose output while developing locally
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::Info
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub nav: NavConfig,
    pub scroll: ScrollConfig,
    pub counters: CounterConfig,
    pub hero: HeroConfig,
    pub form: FormConfig,
    pub reveal_groups: Vec<RevealGroup>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Header gets the `scrolled` class strictly above this offset.
    pub scrolled_threshold: f64,
    /// Sections count as current this many pixels before their top.
    pub section_offset: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Height of the fixed header subtracted from anchor targets.
    pub header_offset: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    pub section_selector: String,
    pub number_selector: String,
    pub duration_ms: f64,
    /// Fraction of the viewport height the section top must pass.
    pub trigger_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HeroConfig {
    /// Fraction of the viewport height at which the hero is fully faded.
    pub fade_end_ratio: f64,
    pub video_max_opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    pub reset_delay_ms: u32,
    pub missing_fields_message: String,
    pub invalid_email_message: String,
    pub success_message: String,
}

/// One group of elements revealed by a shared intersection observer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RevealGroup {
    pub name: String,
    /// Every match of these selectors is observed.
    #[serde(default)]
    pub selectors: Vec<String>,
    /// Only the first match of each of these is observed.
    #[serde(default)]
    pub first_only: Vec<String>,
    /// The group registers only on pages where one of these matches.
    /// Empty means always.
    #[serde(default)]
    pub requires: Vec<String>,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default = "default_root_margin")]
    pub root_margin: String,
    pub effect: RevealEffect,
    #[serde(default)]
    pub stagger_ms: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RevealEffect {
    /// Adds a class and leaves the transition to the stylesheet.
    Class { name: String },
    /// Drives opacity and a vertical slide through inline styles.
    Fade {
        #[serde(default = "default_fade_offset")]
        offset_px: f64,
        #[serde(default = "default_fade_transition")]
        transition: String,
    },
}

fn default_threshold() -> f64 {
    0.2
}

fn default_root_margin() -> String {
    "0px 0px -50px 0px".to_string()
}

fn default_fade_offset() -> f64 {
    30.0
}

fn default_fade_transition() -> String {
    "all 0.6s ease-out".to_string()
}

fn owned(selectors: &[&str]) -> Vec<String> {
    selectors.iter().map(|s| s.to_string()).collect()
}

impl RevealGroup {
    fn new(name: &str, selectors: &[&str], threshold: f64, effect: RevealEffect, stagger_ms: u32) -> Self {
        Self {
            name: name.to_string(),
            selectors: owned(selectors),
            first_only: Vec::new(),
            requires: Vec::new(),
            threshold,
            root_margin: default_root_margin(),
            effect,
            stagger_ms,
        }
    }

    fn with_root_margin(mut self, margin: &str) -> Self {
        self.root_margin = margin.to_string();
        self
    }

    fn with_first_only(mut self, selectors: &[&str]) -> Self {
        self.first_only = owned(selectors);
        self
    }

    fn with_requires(mut self, selectors: &[&str]) -> Self {
        self.requires = owned(selectors);
        self
    }

    /// Whether the current page has what this group needs, given a lookup
    /// that reports if a selector matches anything.
    pub fn is_enabled(&self, present: impl Fn(&str) -> bool) -> bool {
        self.requires.is_empty() || self.requires.iter().any(|selector| present(selector))
    }

    /// Combined selector list, in the form `querySelectorAll` accepts.
    pub fn selector(&self) -> String {
        self.selectors.join(", ")
    }
}

impl RevealEffect {
    fn class(name: &str) -> Self {
        RevealEffect::Class { name: name.to_string() }
    }

    fn fade() -> Self {
        RevealEffect::Fade {
            offset_px: default_fade_offset(),
            transition: default_fade_transition(),
        }
    }
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            scrolled_threshold: 50.0,
            section_offset: 100.0,
        }
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self { header_offset: 80.0 }
    }
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            section_selector: ".kpis".to_string(),
            number_selector: ".kpi-number".to_string(),
            duration_ms: 1200.0,
            trigger_ratio: 0.8,
        }
    }
}

impl Default for HeroConfig {
    fn default() -> Self {
        Self {
            fade_end_ratio: 0.8,
            video_max_opacity: 0.35,
        }
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            reset_delay_ms: 5000,
            missing_fields_message: "Lütfen tüm zorunlu alanları doldurun.".to_string(),
            invalid_email_message: "Lütfen geçerli bir e-posta adresi girin.".to_string(),
            success_message: "Mesajınız başarıyla gönderildi! En kısa sürede sizinle iletişime geçeceğiz."
                .to_string(),
        }
    }
}

pub fn default_reveal_groups() -> Vec<RevealGroup> {
    vec![
        RevealGroup::new("footer", &[".footer-column"], 0.1, RevealEffect::fade(), 0),
        RevealGroup::new("testimonials", &[".testimonial-card"], 0.2, RevealEffect::class("fade-in"), 150),
        RevealGroup::new("services", &[".service-card"], 0.1, RevealEffect::fade(), 100),
        RevealGroup::new(
            "about",
            &[".mv-card", ".value-card", ".approach-step", ".team-card"],
            0.2,
            RevealEffect::class("fade-in"),
            0,
        )
        .with_first_only(&[".who-text", ".who-image"])
        .with_requires(&[".who-text"]),
        RevealGroup::new(
            "offerings",
            &[".overview-card", ".service-content", ".process-step", ".why-card"],
            0.2,
            RevealEffect::class("fade-in"),
            0,
        )
        .with_requires(&[".overview-card"]),
        RevealGroup::new(
            "influencer",
            &[".process-item", ".format-card", ".tier-card", ".metric-card", ".case-card"],
            0.2,
            RevealEffect::class("fade-in"),
            0,
        )
        .with_first_only(&[".why-text-block", ".why-image"])
        .with_requires(&[".why-text-block", ".process-item"]),
        RevealGroup::new("sections", &[".trusted", ".kpis", ".cases"], 0.2, RevealEffect::class("in-view"), 0)
            .with_root_margin("0px"),
    ]
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            nav: NavConfig::default(),
            scroll: ScrollConfig::default(),
            counters: CounterConfig::default(),
            hero: HeroConfig::default(),
            form: FormConfig::default(),
            reveal_groups: default_reveal_groups(),
        }
    }
}

impl SiteConfig {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Reads the override block from the page, falling back to defaults
    /// when it is absent or malformed.
    pub fn from_document(document: &Document) -> Self {
        let raw = document
            .get_element_by_id(CONFIG_SCRIPT_ID)
            .and_then(|script| script.text_content());

        match raw {
            Some(raw) if !raw.trim().is_empty() => Self::from_json(&raw).unwrap_or_else(|e| {
                warn!("Ignoring malformed #{} block: {}", CONFIG_SCRIPT_ID, e);
                Self::default()
            }),
            _ => Self::default(),
        }
    }
}
