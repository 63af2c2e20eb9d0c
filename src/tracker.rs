//! Scroll-spy: which page section the navigation bar should highlight.
//!
//! The tracker never touches a rendering surface itself. A host supplies a
//! [`VisibilityObserver`] and forwards its intersection batches to
//! [`ActiveSectionTracker::handle_entries`].

use crate::section::SectionId;

/// Axis-aligned rectangle in viewport coordinates (pixels, y grows downward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    fn intersect(&self, other: &Rect) -> Option<Rect> {
        let top = self.top.max(other.top);
        let left = self.left.max(other.left);
        let bottom = self.bottom().min(other.bottom());
        let right = self.right().min(other.right());
        if bottom <= top || right <= left {
            return None;
        }
        Some(Rect::new(top, left, right - left, bottom - top))
    }
}

/// Root margin and threshold, matching `IntersectionObserver` semantics.
///
/// Margins are fractions of the viewport; negative values shrink the root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverOptions {
    pub margin_top: f64,
    pub margin_right: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub threshold: f64,
}

impl Default for ObserverOptions {
    /// Ignore the top 40% and bottom 50% of the viewport; require 10% of the
    /// element inside the remaining band.
    fn default() -> Self {
        Self {
            margin_top: -0.40,
            margin_right: 0.0,
            margin_bottom: -0.50,
            margin_left: 0.0,
            threshold: 0.1,
        }
    }
}

impl ObserverOptions {
    /// CSS `rootMargin` string for the browser side.
    pub fn root_margin(&self) -> String {
        fn side(v: f64) -> String {
            if v == 0.0 {
                "0px".to_string()
            } else {
                format!("{}%", (v * 100.0).round() as i64)
            }
        }
        format!(
            "{} {} {} {}",
            side(self.margin_top),
            side(self.margin_right),
            side(self.margin_bottom),
            side(self.margin_left)
        )
    }

    /// The viewport band that counts for intersection.
    pub fn effective_root(&self, viewport: &Rect) -> Rect {
        let top = viewport.top - self.margin_top * viewport.height;
        let bottom = viewport.bottom() + self.margin_bottom * viewport.height;
        let left = viewport.left - self.margin_left * viewport.width;
        let right = viewport.right() + self.margin_right * viewport.width;
        Rect::new(top, left, (right - left).max(0.0), (bottom - top).max(0.0))
    }
}

/// Fraction of `target` visible inside the effective root.
pub fn intersection_ratio(target: &Rect, viewport: &Rect, options: &ObserverOptions) -> f64 {
    let root = options.effective_root(viewport);
    let area = target.area();
    if area == 0.0 {
        return 0.0;
    }
    target
        .intersect(&root)
        .map(|r| r.area() / area)
        .unwrap_or(0.0)
}

/// Whether `target` counts as intersecting under `options`.
pub fn is_intersecting(target: &Rect, viewport: &Rect, options: &ObserverOptions) -> bool {
    let ratio = intersection_ratio(target, viewport, options);
    ratio > 0.0 && ratio >= options.threshold
}

/// One visibility notification for one section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub section: SectionId,
    pub is_intersecting: bool,
}

impl IntersectionEntry {
    pub fn new(section: SectionId, is_intersecting: bool) -> Self {
        Self {
            section,
            is_intersecting,
        }
    }

    /// Build an entry from geometry, the way a host without a native observer would.
    pub fn from_geometry(
        section: SectionId,
        target: &Rect,
        viewport: &Rect,
        options: &ObserverOptions,
    ) -> Self {
        Self::new(section, is_intersecting(target, viewport, options))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ObserveError {
    #[error("visibility observation is not supported by this host")]
    Unsupported,
    #[error("section element #{0} not found")]
    MissingElement(SectionId),
}

/// Host capability that watches section elements against the viewport.
pub trait VisibilityObserver {
    fn observe(&mut self, sections: &[SectionId], options: ObserverOptions)
    -> Result<(), ObserveError>;

    /// Stop watching every element.
    fn disconnect(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Observing,
    /// Observation never started; events are ignored.
    Unsupported,
    Disconnected,
}

pub struct ActiveSectionTracker<O: VisibilityObserver> {
    sections: Vec<SectionId>,
    active: SectionId,
    observer: O,
    phase: Phase,
}

impl<O: VisibilityObserver> ActiveSectionTracker<O> {
    pub fn new(sections: &[SectionId], observer: O) -> Self {
        Self::with_options(sections, observer, ObserverOptions::default())
    }

    pub fn with_options(sections: &[SectionId], mut observer: O, options: ObserverOptions) -> Self {
        let active = sections.first().copied().unwrap_or(SectionId::Home);
        let phase = match observer.observe(sections, options) {
            Ok(()) => Phase::Observing,
            Err(err) => {
                tracing::warn!(error = %err, "section tracking disabled");
                Phase::Unsupported
            }
        };
        Self {
            sections: sections.to_vec(),
            active,
            observer,
            phase,
        }
    }

    pub fn active(&self) -> SectionId {
        self.active
    }

    pub fn is_observing(&self) -> bool {
        self.phase == Phase::Observing
    }

    /// Apply one batch of visibility changes.
    ///
    /// When several watched sections intersect in the same batch, the one
    /// listed first (topmost on the page) wins regardless of batch order.
    pub fn handle_entries(&mut self, entries: &[IntersectionEntry]) {
        if self.phase != Phase::Observing {
            return;
        }
        let winner = entries
            .iter()
            .filter(|e| e.is_intersecting)
            .filter_map(|e| {
                self.sections
                    .iter()
                    .position(|s| *s == e.section)
                    .map(|idx| (idx, e.section))
            })
            .min_by_key(|(idx, _)| *idx);
        if let Some((_, section)) = winner {
            if section != self.active {
                tracing::debug!(from = %self.active, to = %section, "active section changed");
            }
            self.active = section;
        }
    }

    /// Stop observing. Safe to call more than once.
    pub fn disconnect(&mut self) {
        match self.phase {
            Phase::Observing => {
                self.observer.disconnect();
                self.phase = Phase::Disconnected;
            }
            Phase::Unsupported => self.phase = Phase::Disconnected,
            Phase::Disconnected => {}
        }
    }
}

impl<O: VisibilityObserver> Drop for ActiveSectionTracker<O> {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Observer for hosts that render once and never scroll, such as the static renderer.
#[derive(Debug, Default)]
pub struct StaticObserver {
    pub observed: Vec<SectionId>,
}

impl VisibilityObserver for StaticObserver {
    fn observe(
        &mut self,
        sections: &[SectionId],
        _options: ObserverOptions,
    ) -> Result<(), ObserveError> {
        self.observed = sections.to_vec();
        Ok(())
    }

    fn disconnect(&mut self) {
        self.observed.clear();
    }
}
