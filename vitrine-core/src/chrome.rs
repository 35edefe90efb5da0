/// Page chrome: navigation highlighting, navbar state, mobile menu and
/// scroll-reveal styling. Pure decisions only; the web crate applies them.
use std::collections::HashSet;

const SPRING: &str = "cubic-bezier(0.68, -0.55, 0.265, 1.55)";

/// Vertical extent of a page section, in document pixels
#[derive(Debug, Clone, PartialEq)]
pub struct SectionSpan {
    pub id: String,
    pub top: f64,
    pub height: f64,
}

impl SectionSpan {
    pub fn new(id: impl Into<String>, top: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            top,
            height,
        }
    }

    pub fn contains(&self, y: f64) -> bool {
        y >= self.top && y < self.top + self.height
    }
}

/// The section whose nav link should be active. When spans overlap the
/// last one in document order wins.
pub fn active_section(sections: &[SectionSpan], scroll_y: f64, offset: f64) -> Option<&str> {
    let probe = scroll_y + offset;
    sections
        .iter()
        .rev()
        .find(|section| section.contains(probe))
        .map(|section| section.id.as_str())
}

pub fn navbar_scrolled(scroll_y: f64, threshold: f64) -> bool {
    scroll_y > threshold
}

/// Whether a nav link's `href` points at the section `id`
pub fn link_targets(href: &str, id: &str) -> bool {
    href.strip_prefix('#') == Some(id)
}

/// Mobile navigation drawer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuState {
    open: bool,
}

impl MenuState {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    pub fn close(&mut self) {
        self.open = false;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RevealKind {
    Section,
    /// Cards reveal one after another; `index` is the position among all cards
    Card(usize),
    Header,
    Text,
}

impl RevealKind {
    pub const SECTION_SELECTOR: &'static str = ".section";
    pub const CARD_SELECTOR: &'static str = ".stat-card, .activity-card, .event-item, .benefit-item";
    pub const HEADER_SELECTOR: &'static str = ".section-header";
    pub const TEXT_SELECTOR: &'static str = ".about-text, .lead-text, .event-featured, .join-cta";

    pub fn selector(&self) -> &'static str {
        match self {
            RevealKind::Section => Self::SECTION_SELECTOR,
            RevealKind::Card(_) => Self::CARD_SELECTOR,
            RevealKind::Header => Self::HEADER_SELECTOR,
            RevealKind::Text => Self::TEXT_SELECTOR,
        }
    }

    /// Inline style applied before the element is observed
    pub fn hidden_style(&self, card_stagger_seconds: f32) -> Vec<(&'static str, String)> {
        let mut style = vec![("opacity", "0".to_string())];
        match self {
            RevealKind::Section => {
                style.push(("transform", "translateY(50px)".to_string()));
                style.push(("transition", format!("all 0.8s {SPRING}")));
            }
            RevealKind::Card(index) => {
                let delay = *index as f32 * card_stagger_seconds;
                style.push(("transform", "scale(0.8) rotate(-5deg)".to_string()));
                style.push(("transition", format!("all 0.6s {SPRING} {delay}s")));
            }
            RevealKind::Header => {
                style.push(("transform", "translateY(30px)".to_string()));
                style.push(("filter", "blur(5px)".to_string()));
                style.push(("transition", "all 0.8s ease-out".to_string()));
            }
            RevealKind::Text => {
                style.push(("transform", "translateX(-30px)".to_string()));
                style.push(("transition", format!("all 0.8s {SPRING}")));
            }
        }
        style
    }

    /// Shared final style for every kind
    pub fn revealed_style() -> [(&'static str, &'static str); 3] {
        [
            ("opacity", "1"),
            ("transform", "translateY(0) scale(1) rotate(0)"),
            ("filter", "blur(0)"),
        ]
    }
}

/// Remembers which registered elements have been revealed. Each element is
/// revealed at most once; scrolling back up does not hide it again.
#[derive(Debug, Default)]
pub struct RevealTracker {
    kinds: Vec<RevealKind>,
    revealed: HashSet<usize>,
}

impl RevealTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an element; the returned key identifies it from then on
    pub fn register(&mut self, kind: RevealKind) -> usize {
        self.kinds.push(kind);
        self.kinds.len() - 1
    }

    pub fn kind(&self, key: usize) -> Option<RevealKind> {
        self.kinds.get(key).copied()
    }

    /// Called when an element intersects the viewport. True only the first
    /// time for a registered key.
    pub fn reveal(&mut self, key: usize) -> bool {
        key < self.kinds.len() && self.revealed.insert(key)
    }

    pub fn is_revealed(&self, key: usize) -> bool {
        self.revealed.contains(&key)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.kinds.len() - self.revealed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections() -> Vec<SectionSpan> {
        vec![
            SectionSpan::new("home", 0.0, 800.0),
            SectionSpan::new("about", 800.0, 600.0),
            SectionSpan::new("events", 1400.0, 900.0),
        ]
    }

    #[test]
    fn test_active_section_uses_offset() {
        let sections = sections();
        assert_eq!(active_section(&sections, 0.0, 100.0), Some("home"));
        assert_eq!(active_section(&sections, 699.0, 100.0), Some("home"));
        assert_eq!(active_section(&sections, 700.0, 100.0), Some("about"));
        assert_eq!(active_section(&sections, 2300.0, 100.0), None);
    }

    #[test]
    fn test_overlapping_sections_last_wins() {
        let sections = vec![SectionSpan::new("outer", 0.0, 1000.0), SectionSpan::new("inner", 200.0, 100.0)];
        assert_eq!(active_section(&sections, 150.0, 100.0), Some("inner"));
    }

    #[test]
    fn test_navbar_threshold_is_exclusive() {
        assert!(!navbar_scrolled(50.0, 50.0));
        assert!(navbar_scrolled(50.5, 50.0));
    }

    #[test]
    fn test_link_targets() {
        assert!(link_targets("#about", "about"));
        assert!(!link_targets("about", "about"));
        assert!(!link_targets("#about-us", "about"));
    }

    #[test]
    fn test_menu_toggle_and_close() {
        let mut menu = MenuState::default();
        assert!(menu.toggle());
        assert!(!menu.toggle());
        menu.toggle();
        menu.close();
        assert!(!menu.is_open());
    }

    #[test]
    fn test_card_stagger() {
        let style = RevealKind::Card(3).hidden_style(0.1);
        let transition = style.iter().find(|(k, _)| *k == "transition").map(|(_, v)| v.clone());
        assert!(transition.unwrap().ends_with(" 0.3s"));
    }

    #[test]
    fn test_header_starts_blurred() {
        let style = RevealKind::Header.hidden_style(0.1);
        assert!(style.contains(&("filter", "blur(5px)".to_string())));
        assert!(style.contains(&("opacity", "0".to_string())));
    }

    #[test]
    fn test_reveal_is_one_shot() {
        let mut tracker = RevealTracker::new();
        let a = tracker.register(RevealKind::Section);
        let b = tracker.register(RevealKind::Text);
        assert!(tracker.reveal(a));
        assert!(!tracker.reveal(a));
        assert!(!tracker.reveal(99));
        assert_eq!(tracker.pending(), 1);
        assert!(tracker.reveal(b));
        assert_eq!(tracker.pending(), 0);
    }
}
