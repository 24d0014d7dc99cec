use web_sys::{Document, Element, Window};

use crate::config::HeroConfig;
use crate::dom;

/// Hero opacity for a scroll offset: 1 at the top, 0 once the page has
/// scrolled `fade_end_ratio` of the viewport height.
pub fn hero_opacity(scroll_y: f64, inner_height: f64, fade_end_ratio: f64) -> f64 {
    let fade_end = inner_height * fade_end_ratio;
    if fade_end <= 0.0 {
        return 1.0;
    }
    (1.0 - scroll_y / fade_end).clamp(0.0, 1.0)
}

pub fn video_opacity(hero_opacity: f64, max: f64) -> f64 {
    (hero_opacity * max).min(max)
}

pub struct HeroFade {
    window: Window,
    hero: Option<Element>,
    content: Option<Element>,
    video: Option<Element>,
    config: HeroConfig,
}

impl HeroFade {
    pub fn new(window: &Window, document: &Document, config: HeroConfig) -> Self {
        Self {
            window: window.clone(),
            hero: dom::query(document, ".hero"),
            content: dom::query(document, ".hero-content"),
            video: document.get_element_by_id("heroVideo"),
            config,
        }
    }

    pub fn on_scroll(&self) {
        let Some(hero) = &self.hero else {
            return;
        };

        let opacity = hero_opacity(
            dom::scroll_y(&self.window),
            dom::inner_height(&self.window),
            self.config.fade_end_ratio,
        );
        dom::set_style(hero, "opacity", &opacity.to_string());
        if let Some(content) = &self.content {
            dom::set_style(content, "opacity", &opacity.to_string());
        }
        if let Some(video) = &self.video {
            let video_opacity = video_opacity(opacity, self.config.video_max_opacity);
            dom::set_style(video, "opacity", &video_opacity.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fades_across_eighty_percent_of_viewport() {
        assert_eq!(hero_opacity(0.0, 1000.0, 0.8), 1.0);
        assert_eq!(hero_opacity(400.0, 1000.0, 0.8), 0.5);
        assert_eq!(hero_opacity(800.0, 1000.0, 0.8), 0.0);
        assert_eq!(hero_opacity(3000.0, 1000.0, 0.8), 0.0);
    }

    #[test]
    fn zero_height_viewport_keeps_hero_visible() {
        assert_eq!(hero_opacity(120.0, 0.0, 0.8), 1.0);
    }

    #[test]
    fn video_is_capped() {
        assert_eq!(video_opacity(1.0, 0.35), 0.35);
        assert_eq!(video_opacity(0.5, 0.35), 0.175);
        assert_eq!(video_opacity(0.0, 0.35), 0.0);
    }
}
