//! View-side state and shared widgets for the pinned workspace. The panel
//! list itself lives in [`crate::pins::panel::PanelStore`]; this module owns
//! everything that is presentation-only: which card is maximized, which
//! responses are expanded, cached snapshots, and in-flight gestures.

pub mod canvas;
pub mod columns;
pub mod detail;

use crate::pins::generator::Snapshot;
use crate::pins::{PinnedItem, Position, Size};
use crate::theme::Theme;
use eframe::egui::{self, RichText};
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

pub const CANVAS_MIN_WIDTH: f32 = 1400.0;
pub const CANVAS_MIN_HEIGHT: f32 = 1000.0;

/// Responses longer than this get an expand/collapse toggle.
pub const RESPONSE_COLLAPSE_THRESHOLD: usize = 150;
const COLLAPSED_PREVIEW_CHARS: usize = 120;

/// How long the transient "refreshing" affordance stays up before the new
/// snapshot replaces the grid.
pub const REFRESH_FEEDBACK: Duration = Duration::from_millis(600);
/// Automatic snapshot cadence while an item is maximized.
pub const DETAIL_REFRESH_INTERVAL: Duration = Duration::from_secs(5);

/// A drag or resize in flight on one card. Deltas accumulate per frame and
/// commit to the panel store only when the pointer is released.
#[derive(Debug, Clone)]
pub struct Gesture {
    pub id: String,
    pub delta: egui::Vec2,
}

impl Gesture {
    pub fn begin(id: &str) -> Self {
        Self {
            id: id.to_string(),
            delta: egui::Vec2::ZERO,
        }
    }
}

/// What a rendered card asks the app shell to do. Collected during a paint
/// pass and applied afterwards, so rendering never mutates the panel
/// mid-iteration.
#[derive(Debug, Clone)]
pub enum CardAction {
    Refresh(String),
    ToggleExpanded(String),
    Maximize(String),
    Restore,
    Unpin(String),
    SetPosition { id: String, position: Position },
    SetSize { id: String, size: Size },
}

#[derive(Default)]
pub struct WorkspaceState {
    /// At most one item is maximized; a nullable id, never per-item flags.
    maximized: Option<String>,
    expanded: HashSet<String>,
    snapshots: HashMap<String, Snapshot>,
    refreshing: HashMap<String, Instant>,
    detail_refreshed: Option<Instant>,
    pub drag: Option<Gesture>,
    pub resize: Option<Gesture>,
    pub hide_nav: bool,
    pub hide_content: bool,
}

impl WorkspaceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn maximize(&mut self, id: &str) {
        self.maximized = Some(id.to_string());
        self.detail_refreshed = None;
    }

    pub fn restore(&mut self) {
        self.maximized = None;
        self.detail_refreshed = None;
    }

    pub fn maximized(&self) -> Option<&str> {
        self.maximized.as_deref()
    }

    pub fn is_maximized(&self, id: &str) -> bool {
        self.maximized.as_deref() == Some(id)
    }

    /// Drop all view residue of an item that left the list.
    pub fn forget(&mut self, id: &str) {
        if self.is_maximized(id) {
            self.restore();
        }
        self.expanded.remove(id);
        self.snapshots.remove(id);
        self.refreshing.remove(id);
        if self.drag.as_ref().is_some_and(|g| g.id == id) {
            self.drag = None;
        }
        if self.resize.as_ref().is_some_and(|g| g.id == id) {
            self.resize = None;
        }
    }

    pub fn clear(&mut self) {
        *self = Self {
            hide_nav: self.hide_nav,
            hide_content: self.hide_content,
            ..Self::default()
        };
    }

    pub fn toggle_expanded(&mut self, id: &str) {
        if !self.expanded.remove(id) {
            self.expanded.insert(id.to_string());
        }
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    pub fn begin_refresh(&mut self, id: &str, now: Instant) {
        self.refreshing.insert(id.to_string(), now);
    }

    pub fn is_refreshing(&self, id: &str, now: Instant) -> bool {
        self.refreshing
            .get(id)
            .is_some_and(|started| now.duration_since(*started) < REFRESH_FEEDBACK)
    }

    pub fn any_refresh_pending(&self) -> bool {
        !self.refreshing.is_empty()
    }

    /// Complete every refresh whose feedback delay has elapsed by taking a
    /// fresh snapshot. Ids no longer in the list were already forgotten.
    pub fn finish_due_refreshes(&mut self, items: &[PinnedItem], now: Instant) {
        let due: Vec<String> = self
            .refreshing
            .iter()
            .filter(|(_, started)| now.duration_since(**started) >= REFRESH_FEEDBACK)
            .map(|(id, _)| id.clone())
            .collect();

        for id in due {
            self.refreshing.remove(&id);
            if let Some(item) = items.iter().find(|item| item.id == id) {
                self.refresh_snapshot_now(item);
            }
        }
    }

    /// Fill the cache on first sight of an item; later refreshes replace it.
    pub fn ensure_snapshot(&mut self, item: &PinnedItem) {
        if self.snapshots.contains_key(&item.id) {
            return;
        }
        self.refresh_snapshot_now(item);
    }

    pub fn refresh_snapshot_now(&mut self, item: &PinnedItem) {
        if let Some(generator) = &item.generator {
            self.snapshots.insert(item.id.clone(), generator.snapshot());
        }
    }

    pub fn snapshot_of(&self, id: &str) -> Option<&Snapshot> {
        self.snapshots.get(id)
    }

    /// Advance the maximized view's automatic refresh timer. Returns true
    /// when a new snapshot is due.
    pub fn detail_tick(&mut self, now: Instant) -> bool {
        if self.maximized.is_none() {
            return false;
        }
        match self.detail_refreshed {
            None => {
                self.detail_refreshed = Some(now);
                false
            }
            Some(last) if now.duration_since(last) >= DETAIL_REFRESH_INTERVAL => {
                self.detail_refreshed = Some(now);
                true
            }
            Some(_) => false,
        }
    }

    pub fn toggle_nav_hidden(&mut self) {
        self.hide_nav = !self.hide_nav;
        if self.hide_nav {
            self.hide_content = false;
        }
    }

    pub fn toggle_content_hidden(&mut self) {
        self.hide_content = !self.hide_content;
        if self.hide_content {
            self.hide_nav = false;
        }
    }
}

pub(crate) fn category_badge(ui: &mut egui::Ui, theme: &Theme, category: &str) {
    egui::Frame::new()
        .fill(theme.accent_muted)
        .corner_radius(egui::CornerRadius::same(theme.radius_8))
        .inner_margin(egui::Margin::symmetric(6, 2))
        .show(ui, |ui| {
            ui.label(
                RichText::new(category)
                    .color(theme.text_on_accent)
                    .size(11.0),
            );
        });
}

/// The live metrics block of a card: a spinner while a refresh is pending,
/// the snapshot grid otherwise. Omitted entirely when the item has no
/// generator.
pub(crate) fn metrics_grid(
    ui: &mut egui::Ui,
    theme: &Theme,
    id: &str,
    snapshot: Option<&Snapshot>,
    refreshing: bool,
) {
    if refreshing {
        ui.horizontal(|ui| {
            ui.add(egui::Spinner::new().size(12.0));
            ui.label(RichText::new("刷新中…").color(theme.text_muted).size(12.0));
        });
        return;
    }

    let Some(snapshot) = snapshot else {
        return;
    };

    egui::Grid::new((id, "metrics"))
        .num_columns(2)
        .spacing([16.0, 4.0])
        .show(ui, |ui| {
            for metric in snapshot {
                ui.label(
                    RichText::new(&metric.label)
                        .color(theme.text_muted)
                        .size(12.0),
                );
                ui.label(
                    RichText::new(&metric.value)
                        .color(theme.text_primary)
                        .size(12.0)
                        .strong(),
                );
                ui.end_row();
            }
        });
}

/// Response text with an expand/collapse toggle once it crosses the length
/// threshold. Returns the toggle action when clicked.
pub(crate) fn response_section(
    ui: &mut egui::Ui,
    theme: &Theme,
    item: &PinnedItem,
    expanded: bool,
) -> Option<CardAction> {
    let long = item.response.chars().count() > RESPONSE_COLLAPSE_THRESHOLD;
    if long && !expanded {
        ui.label(
            RichText::new(collapsed_preview(&item.response))
                .color(theme.text_primary)
                .size(13.0),
        );
    } else {
        ui.label(
            RichText::new(item.response.as_str())
                .color(theme.text_primary)
                .size(13.0),
        );
    }

    if long {
        let label = if expanded { "收起" } else { "展开全文" };
        if ui.link(RichText::new(label).size(12.0)).clicked() {
            return Some(CardAction::ToggleExpanded(item.id.clone()));
        }
    }
    None
}

fn collapsed_preview(text: &str) -> String {
    let mut preview: String = text.chars().take(COLLAPSED_PREVIEW_CHARS).collect();
    preview.push('…');
    preview
}

pub(crate) fn pinned_at_label(item: &PinnedItem) -> String {
    format!("固定于 {}", item.timestamp.format("%m-%d %H:%M"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loan_item() -> PinnedItem {
        PinnedItem::new(
            0,
            "本月不良贷款率是多少？".to_string(),
            "当前不良贷款率为1.35%。".to_string(),
            "贷款业务".to_string(),
        )
    }

    #[test]
    fn at_most_one_item_is_maximized() {
        let mut state = WorkspaceState::new();
        state.maximize("a");
        assert!(state.is_maximized("a"));

        // Maximizing B implicitly returns A to the canvas.
        state.maximize("b");
        assert!(state.is_maximized("b"));
        assert!(!state.is_maximized("a"));

        state.restore();
        assert_eq!(state.maximized(), None);
    }

    #[test]
    fn forgetting_an_item_clears_all_view_residue() {
        let mut state = WorkspaceState::new();
        let item = loan_item();
        state.ensure_snapshot(&item);
        state.toggle_expanded(&item.id);
        state.maximize(&item.id);
        state.begin_refresh(&item.id, Instant::now());
        state.drag = Some(Gesture::begin(&item.id));

        state.forget(&item.id);
        assert_eq!(state.maximized(), None);
        assert!(!state.is_expanded(&item.id));
        assert!(state.snapshot_of(&item.id).is_none());
        assert!(!state.any_refresh_pending());
        assert!(state.drag.is_none());
    }

    #[test]
    fn refresh_feedback_then_snapshot_replacement() {
        let mut state = WorkspaceState::new();
        let item = loan_item();
        state.ensure_snapshot(&item);

        let t0 = Instant::now();
        state.begin_refresh(&item.id, t0);
        assert!(state.is_refreshing(&item.id, t0));
        assert!(state.is_refreshing(&item.id, t0 + Duration::from_millis(300)));

        let later = t0 + REFRESH_FEEDBACK + Duration::from_millis(100);
        state.finish_due_refreshes(std::slice::from_ref(&item), later);
        assert!(!state.is_refreshing(&item.id, later));
        let snapshot = state
            .snapshot_of(&item.id)
            .expect("refresh should leave a snapshot");
        assert_eq!(snapshot[0].label, "更新时间");
    }

    #[test]
    fn detail_timer_fires_on_the_configured_interval() {
        let mut state = WorkspaceState::new();
        let t0 = Instant::now();

        // No maximized item: never due.
        assert!(!state.detail_tick(t0));

        state.maximize("a");
        assert!(!state.detail_tick(t0)); // baseline
        assert!(!state.detail_tick(t0 + Duration::from_secs(2)));
        assert!(state.detail_tick(t0 + Duration::from_secs(8)));
        // Interval restarts after firing.
        assert!(!state.detail_tick(t0 + Duration::from_secs(9)));
    }

    #[test]
    fn column_maximize_toggles_are_mutually_exclusive() {
        let mut state = WorkspaceState::new();
        state.toggle_nav_hidden();
        assert!(state.hide_nav);

        state.toggle_content_hidden();
        assert!(state.hide_content);
        assert!(!state.hide_nav);

        state.toggle_nav_hidden();
        assert!(state.hide_nav);
        assert!(!state.hide_content);
    }

    #[test]
    fn expand_toggle_only_matters_past_the_threshold() {
        let mut state = WorkspaceState::new();
        let item = loan_item();
        assert!(item.response.chars().count() <= RESPONSE_COLLAPSE_THRESHOLD);

        state.toggle_expanded(&item.id);
        assert!(state.is_expanded(&item.id));
        state.toggle_expanded(&item.id);
        assert!(!state.is_expanded(&item.id));
    }

    #[test]
    fn missing_generator_yields_no_snapshot() {
        let mut state = WorkspaceState::new();
        let mut item = loan_item();
        item.generator = None;

        state.ensure_snapshot(&item);
        assert!(state.snapshot_of(&item.id).is_none());
    }
}
