//! Compact list mode: the condensed pinned column shown between navigation
//! and the chat content. No drag or resize here: cards stack vertically and
//! keep the refresh/unpin/expand affordances.

use super::{
    category_badge, metrics_grid, pinned_at_label, response_section, CardAction, WorkspaceState,
};
use crate::pins::panel::PanelStore;
use crate::pins::PinnedItem;
use crate::theme::Theme;
use eframe::egui::{self, RichText, ScrollArea};
use std::time::Instant;

pub fn render(
    ui: &mut egui::Ui,
    theme: &Theme,
    panel: &PanelStore,
    state: &mut WorkspaceState,
) -> Vec<CardAction> {
    let mut actions = Vec::new();
    let now = Instant::now();

    ui.horizontal(|ui| {
        ui.strong(format!("固定面板（{}）", panel.len()));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let content_label = if state.hide_content { "恢复内容" } else { "隐藏内容" };
            if ui
                .small_button(content_label)
                .on_hover_text("给固定面板让出横向空间")
                .clicked()
            {
                state.toggle_content_hidden();
            }
            let nav_label = if state.hide_nav { "恢复导航" } else { "隐藏导航" };
            if ui.small_button(nav_label).clicked() {
                state.toggle_nav_hidden();
            }
        });
    });
    ui.separator();

    ScrollArea::vertical()
        .id_salt("pin_column")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            if panel.is_empty() {
                ui.label(
                    RichText::new("暂无固定内容")
                        .color(theme.text_muted)
                        .size(13.0),
                );
                return;
            }

            for item in panel.items() {
                state.ensure_snapshot(item);
                compact_card(ui, theme, item, state, now, &mut actions);
                ui.add_space(theme.spacing_8);
            }
        });

    actions
}

fn compact_card(
    ui: &mut egui::Ui,
    theme: &Theme,
    item: &PinnedItem,
    state: &WorkspaceState,
    now: Instant,
    actions: &mut Vec<CardAction>,
) {
    theme.card_frame().show(ui, |ui| {
        ui.horizontal(|ui| {
            category_badge(ui, theme, &item.category);
            ui.add(
                egui::Label::new(
                    RichText::new(item.query.as_str())
                        .color(theme.text_primary)
                        .strong(),
                )
                .truncate(),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.small_button("✕").on_hover_text("取消固定").clicked() {
                    actions.push(CardAction::Unpin(item.id.clone()));
                }
                let refreshing = state.is_refreshing(&item.id, now);
                if ui
                    .add_enabled(!refreshing, egui::Button::new("刷新").small())
                    .clicked()
                {
                    actions.push(CardAction::Refresh(item.id.clone()));
                }
            });
        });

        ui.add_space(theme.spacing_4);
        metrics_grid(
            ui,
            theme,
            &item.id,
            state.snapshot_of(&item.id),
            state.is_refreshing(&item.id, now),
        );
        ui.add_space(theme.spacing_4);
        if let Some(action) = response_section(ui, theme, item, state.is_expanded(&item.id)) {
            actions.push(action);
        }
        ui.label(
            RichText::new(pinned_at_label(item))
                .color(theme.text_muted)
                .size(11.0),
        );
    });
}
