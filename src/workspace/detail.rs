//! Maximized detail mode: one pinned item at full fidelity in a side panel,
//! refreshed automatically while open. The auto-refresh timer itself is
//! advanced by the app shell via [`WorkspaceState::detail_tick`].

use super::{category_badge, metrics_grid, pinned_at_label, CardAction, WorkspaceState};
use crate::pins::PinnedItem;
use crate::theme::Theme;
use eframe::egui::{self, RichText, ScrollArea};
use std::time::Instant;

pub fn render(
    ui: &mut egui::Ui,
    theme: &Theme,
    item: &PinnedItem,
    state: &WorkspaceState,
) -> Vec<CardAction> {
    let mut actions = Vec::new();
    let now = Instant::now();

    ui.horizontal(|ui| {
        ui.heading("固定详情");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("关闭").clicked() {
                actions.push(CardAction::Restore);
            }
            if ui.button("取消固定").clicked() {
                actions.push(CardAction::Unpin(item.id.clone()));
            }
        });
    });
    ui.separator();

    ui.horizontal(|ui| {
        category_badge(ui, theme, &item.category);
        ui.label(
            RichText::new(pinned_at_label(item))
                .color(theme.text_muted)
                .size(11.0),
        );
    });
    ui.add_space(theme.spacing_4);
    ui.label(
        RichText::new(item.query.as_str())
            .color(theme.text_primary)
            .strong()
            .size(15.0),
    );

    ui.add_space(theme.spacing_12);
    ui.horizontal(|ui| {
        ui.strong("实时指标");
        let refreshing = state.is_refreshing(&item.id, now);
        if ui
            .add_enabled(!refreshing, egui::Button::new("刷新").small())
            .clicked()
        {
            actions.push(CardAction::Refresh(item.id.clone()));
        }
        ui.label(
            RichText::new(format!(
                "每 {} 秒自动刷新",
                super::DETAIL_REFRESH_INTERVAL.as_secs()
            ))
            .color(theme.text_muted)
            .size(11.0),
        );
    });
    ui.add_space(theme.spacing_4);
    metrics_grid(
        ui,
        theme,
        &item.id,
        state.snapshot_of(&item.id),
        state.is_refreshing(&item.id, now),
    );

    ui.add_space(theme.spacing_12);
    ui.separator();
    ScrollArea::vertical()
        .id_salt("detail_response")
        .auto_shrink([false, true])
        .show(ui, |ui| {
            ui.label(
                RichText::new(item.response.as_str())
                    .color(theme.text_primary)
                    .size(13.0),
            );
        });

    actions
}
