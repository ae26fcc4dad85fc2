use crate::core::document::{Document, Element};
use crate::core::includer::top_level;
use std::time::{Duration, Instant};

pub const DEFAULT_IDLE_THRESHOLD: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshDecision {
    Refresh,
    Skip,
}

/// Tracks the last user activity for one page session.
///
/// The caller owns the tracker and passes in the clock, so nothing is read from ambient state.
#[derive(Debug, Clone)]
pub struct ActivityTracker {
    last_activity: Option<Instant>,
    idle_threshold: Duration,
}

impl Default for ActivityTracker {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_THRESHOLD)
    }
}

impl ActivityTracker {
    pub fn new(idle_threshold: Duration) -> Self {
        Self {
            last_activity: None,
            idle_threshold,
        }
    }

    /// Click, key press or scroll.
    pub fn record_activity(&mut self, now: Instant) {
        self.last_activity = Some(now);
    }

    pub fn last_activity(&self) -> Option<Instant> {
        self.last_activity
    }

    /// Called when the page becomes visible again; always counts as activity.
    pub fn on_visible(&mut self, now: Instant) -> RefreshDecision {
        let decision = match self.last_activity {
            Some(last) if now.saturating_duration_since(last) > self.idle_threshold => {
                RefreshDecision::Refresh
            }
            _ => RefreshDecision::Skip,
        };
        self.last_activity = Some(now);
        decision
    }
}

/// `[data-auto-refresh]` elements paired with their `data-refresh-url`.
pub fn refresh_targets(document: &Document) -> Vec<(Element, String)> {
    let areas = match document.select("[data-auto-refresh][data-refresh-url]") {
        Ok(areas) => areas,
        Err(e) => {
            tracing::warn!("Refresh area lookup failed: {}", e);
            return Vec::new();
        }
    };

    let areas: Vec<Element> = areas
        .into_iter()
        .filter(|el| el.attr("data-refresh-url").is_some_and(|u| !u.trim().is_empty()))
        .collect();

    top_level(document, areas)
        .into_iter()
        .map(|el| {
            let url = el.attr("data-refresh-url").unwrap_or_default().trim().to_string();
            (el, url)
        })
        .collect()
}
