use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo_render::{request_animation_frame, AnimationFrame};
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use web_sys::{Document, Element, Window};

use crate::config::CounterConfig;
use crate::dom;

static LEADING_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").expect("leading number pattern")
});

/// Reads a `data-target` value the way the markup authors write it: a
/// leading number, optionally followed by a suffix such as `%` or `+`.
/// Anything else is NaN.
pub fn parse_target(raw: Option<&str>) -> f64 {
    raw.map(str::trim_start)
        .and_then(|raw| LEADING_NUMBER.find(raw))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

/// The section has scrolled into the lower band of the viewport.
pub fn should_start(section_top: f64, inner_height: f64, trigger_ratio: f64) -> bool {
    section_top < inner_height * trigger_ratio
}

/// Opens on the first trigger inside the band and stays open, so a section
/// scrolling out and back in never restarts the counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StartLatch {
    started: bool,
}

impl StartLatch {
    pub fn started(&self) -> bool {
        self.started
    }

    /// True exactly once: the first call made with `in_band` set.
    pub fn trigger(&mut self, in_band: bool) -> bool {
        if self.started || !in_band {
            return false;
        }
        self.started = true;
        true
    }
}

/// Formats with one decimal the way a browser's `toFixed(1)` does: exact
/// ties round away from zero instead of to even.
pub fn to_fixed_1(value: f64) -> String {
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let magnitude = value.abs();
    // A double sits exactly halfway between two tenths only when it is an
    // odd multiple of 0.25.
    let quarters = magnitude * 4.0;
    if quarters.fract() == 0.0 && quarters % 2.0 == 1.0 {
        let tenths = (magnitude * 10.0 + 0.5).floor();
        let sign = if value < 0.0 { "-" } else { "" };
        return format!("{}{:.1}", sign, tenths / 10.0);
    }
    format!("{:.1}", value)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterAnimation {
    target: f64,
    duration_ms: f64,
    fractional: bool,
}

impl CounterAnimation {
    pub fn new(target: f64, duration_ms: f64) -> Self {
        Self {
            target,
            duration_ms,
            // NaN and infinities are not integers either, so they render
            // through the decimal path.
            fractional: target.fract() != 0.0 || target.is_nan(),
        }
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn progress(&self, elapsed_ms: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        (elapsed_ms / self.duration_ms).clamp(0.0, 1.0)
    }

    /// The frame chain ends on the frame that reaches full progress.
    pub fn needs_next_frame(&self, progress: f64) -> bool {
        progress < 1.0
    }

    pub fn display(&self, progress: f64) -> String {
        let value = self.target * progress;
        // `+ 0.0` turns a negative zero into a positive one.
        if self.fractional {
            to_fixed_1(value + 0.0)
        } else {
            format!("{}", value.floor() + 0.0)
        }
    }
}

struct CounterRun {
    element: Element,
    animation: CounterAnimation,
    start: f64,
    frame: RefCell<Option<AnimationFrame>>,
}

impl CounterRun {
    fn schedule(self: &Rc<Self>) {
        let run = Rc::clone(self);
        let handle = request_animation_frame(move |now| run.tick(now));
        *self.frame.borrow_mut() = Some(handle);
    }

    fn tick(self: &Rc<Self>, now: f64) {
        self.frame.borrow_mut().take();
        let progress = self.animation.progress(now - self.start);
        self.element
            .set_text_content(Some(&self.animation.display(progress)));
        if self.animation.needs_next_frame(progress) {
            self.schedule();
        }
    }
}

/// Counts every KPI number up from zero, once per page.
pub struct CounterAnimator {
    window: Window,
    document: Document,
    section: Option<Element>,
    latch: Cell<StartLatch>,
    runs: RefCell<Vec<Rc<CounterRun>>>,
    config: CounterConfig,
}

impl CounterAnimator {
    pub fn new(window: &Window, document: &Document, config: CounterConfig) -> Rc<Self> {
        Rc::new(Self {
            window: window.clone(),
            document: document.clone(),
            section: dom::query(document, &config.section_selector),
            latch: Cell::new(StartLatch::default()),
            runs: RefCell::new(Vec::new()),
            config,
        })
    }

    pub fn started(&self) -> bool {
        self.latch.get().started()
    }

    /// Called on scroll, on load and once at mount.
    pub fn check(&self) {
        let mut latch = self.latch.get();
        if latch.started() {
            return;
        }
        let Some(section) = &self.section else {
            return;
        };

        let top = section.get_bounding_client_rect().top();
        let in_band = should_start(top, dom::inner_height(&self.window), self.config.trigger_ratio);
        if !latch.trigger(in_band) {
            return;
        }
        self.latch.set(latch);

        let start = self.window.performance().map(|p| p.now()).unwrap_or(0.0);
        let mut runs = self.runs.borrow_mut();
        for element in dom::query_all(&self.document, &self.config.number_selector) {
            let target = parse_target(element.get_attribute("data-target").as_deref());
            debug!("Counter target {}", target);
            let run = Rc::new(CounterRun {
                element,
                animation: CounterAnimation::new(target, self.config.duration_ms),
                start,
                frame: RefCell::new(None),
            });
            run.schedule();
            runs.push(run);
        }
        info!("Started {} KPI counters", runs.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_target_floors_until_done() {
        let counter = CounterAnimation::new(250.0, 1200.0);
        assert_eq!(counter.display(counter.progress(0.0)), "0");
        assert_eq!(counter.display(counter.progress(600.0)), "125");
        assert_eq!(counter.display(counter.progress(1199.0)), "249");
        assert_eq!(counter.display(counter.progress(1200.0)), "250");
        assert_eq!(counter.display(counter.progress(5000.0)), "250");
    }

    #[test]
    fn fractional_target_keeps_one_decimal() {
        let counter = CounterAnimation::new(4.8, 1200.0);
        assert_eq!(counter.display(counter.progress(0.0)), "0.0");
        assert_eq!(counter.display(counter.progress(600.0)), "2.4");
        assert_eq!(counter.display(counter.progress(1200.0)), "4.8");
    }

    #[test]
    fn progress_is_clamped() {
        let counter = CounterAnimation::new(10.0, 1200.0);
        assert_eq!(counter.progress(-16.0), 0.0);
        assert_eq!(counter.progress(2400.0), 1.0);
        assert_eq!(CounterAnimation::new(10.0, 0.0).progress(0.0), 1.0);
    }

    #[test]
    fn display_never_decreases() {
        let counter = CounterAnimation::new(97.0, 1200.0);
        let mut last = f64::MIN;
        for frame in 0..=90 {
            let shown: f64 = counter
                .display(counter.progress(frame as f64 * 16.7))
                .parse()
                .unwrap();
            assert!(shown >= last, "frame {} went from {} to {}", frame, last, shown);
            last = shown;
        }
        assert_eq!(last, 97.0);
    }

    #[test]
    fn negative_zero_is_not_shown() {
        let counter = CounterAnimation::new(-5.0, 1200.0);
        assert_eq!(counter.display(0.0), "0");
        assert_eq!(CounterAnimation::new(-2.5, 1200.0).display(0.0), "0.0");
    }

    #[test]
    fn missing_or_garbage_target_shows_nan() {
        let missing = CounterAnimation::new(parse_target(None), 1200.0);
        assert!(missing.target().is_nan());
        assert_eq!(missing.display(0.5), "NaN");
        assert!(parse_target(Some("lots")).is_nan());
        assert!(parse_target(Some("")).is_nan());
    }

    #[test]
    fn target_parsing_accepts_suffixes() {
        assert_eq!(parse_target(Some("150")), 150.0);
        assert_eq!(parse_target(Some(" 98.5%")), 98.5);
        assert_eq!(parse_target(Some("12+")), 12.0);
        assert_eq!(parse_target(Some(".5")), 0.5);
        assert_eq!(parse_target(Some("1e3")), 1000.0);
    }

    #[test]
    fn exact_ties_round_up_like_to_fixed() {
        for (target, shown) in [(2.25, "2.3"), (0.25, "0.3"), (0.75, "0.8"), (0.35, "0.3"), (1.05, "1.1")] {
            let counter = CounterAnimation::new(target, 1200.0);
            assert_eq!(counter.display(counter.progress(1200.0)), shown, "target {}", target);
        }
        assert_eq!(to_fixed_1(-2.25), "-2.3");
    }

    #[test]
    fn infinite_target_reads_like_the_browser() {
        let counter = CounterAnimation::new(f64::INFINITY, 1200.0);
        assert_eq!(counter.display(1.0), "Infinity");
        assert_eq!(counter.display(0.0), "NaN");
        assert_eq!(CounterAnimation::new(f64::NEG_INFINITY, 1200.0).display(0.5), "-Infinity");
    }

    #[test]
    fn latch_starts_once() {
        let mut latch = StartLatch::default();
        assert!(!latch.trigger(false));
        assert!(!latch.started());
        assert!(latch.trigger(true));
        assert!(latch.started());
        // Leaving the band and coming back does not restart.
        assert!(!latch.trigger(false));
        assert!(!latch.trigger(true));
        assert!(latch.started());
    }

    #[test]
    fn frame_chain_stops_at_full_progress() {
        let counter = CounterAnimation::new(40.0, 1200.0);
        let frames: Vec<f64> = (0..).map(|f| f as f64 * 16.7).take_while(|t| *t < 3000.0).collect();
        let scheduled = frames
            .iter()
            .take_while(|t| counter.needs_next_frame(counter.progress(**t)))
            .count();
        // Every frame before 1200 ms asks for another, the first one at or past it does not.
        assert_eq!(scheduled, frames.iter().filter(|t| **t < 1200.0).count());
        assert!(!counter.needs_next_frame(counter.progress(1200.0)));
        assert!(!counter.needs_next_frame(counter.progress(5000.0)));
    }

    #[test]
    fn starts_inside_lower_band() {
        assert!(should_start(500.0, 800.0, 0.8));
        assert!(!should_start(640.0, 800.0, 0.8));
        assert!(should_start(-300.0, 800.0, 0.8));
    }
}
