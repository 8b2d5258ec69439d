//! Canvas mode: absolutely positioned, draggable and resizable cards over an
//! oversized scrollable surface. Gestures render from a local delta and
//! commit to the panel store on release.

use super::{
    category_badge, metrics_grid, pinned_at_label, response_section, CardAction, Gesture,
    WorkspaceState, CANVAS_MIN_HEIGHT, CANVAS_MIN_WIDTH,
};
use crate::pins::panel::PanelStore;
use crate::pins::{layout, PinnedItem};
use crate::theme::Theme;
use eframe::egui::{
    self, Align2, CursorIcon, FontId, Rect, RichText, ScrollArea, Sense, UiBuilder,
};
use std::time::Instant;

pub fn render(
    ui: &mut egui::Ui,
    theme: &Theme,
    panel: &PanelStore,
    state: &mut WorkspaceState,
) -> Vec<CardAction> {
    let mut actions = Vec::new();
    let now = Instant::now();

    ScrollArea::both()
        .id_salt("pin_canvas")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let (canvas_rect, _) =
                ui.allocate_exact_size(canvas_extent(panel.items()), Sense::hover());
            ui.painter().rect_filled(canvas_rect, 0.0, theme.surface_0);

            if panel.is_empty() {
                ui.painter().text(
                    canvas_rect.center(),
                    Align2::CENTER_CENTER,
                    "暂无固定内容，在对话中点击「固定」把分析结果放到工作台",
                    FontId::proportional(14.0),
                    theme.text_muted,
                );
                return;
            }

            for item in panel.items() {
                // Hidden while shown in the detail panel.
                if state.is_maximized(&item.id) {
                    continue;
                }
                state.ensure_snapshot(item);
                render_card(ui, theme, item, state, canvas_rect.min, now, &mut actions);
            }
        });

    actions
}

/// The logical canvas grows with its content but never below the minimum.
fn canvas_extent(items: &[PinnedItem]) -> egui::Vec2 {
    let mut extent = egui::vec2(CANVAS_MIN_WIDTH, CANVAS_MIN_HEIGHT);
    for item in items {
        extent.x = extent.x.max(item.position.x as f32 + item.size.width + 60.0);
        extent.y = extent.y.max(item.position.y as f32 + item.size.height + 60.0);
    }
    extent
}

/// Current geometry of a card, folding in any in-flight gesture so the live
/// feedback already shows the clamped result.
fn card_geometry(item: &PinnedItem, state: &WorkspaceState) -> (egui::Vec2, egui::Vec2) {
    let mut position = item.position;
    if let Some(drag) = state.drag.as_ref().filter(|g| g.id == item.id) {
        position = layout::apply_drag(item, drag.delta.x, drag.delta.y);
    }

    let mut size = item.size;
    if let Some(resize) = state.resize.as_ref().filter(|g| g.id == item.id) {
        size = layout::apply_resize(item, resize.delta.x, resize.delta.y).clamp_to_bounds();
    }

    (
        egui::vec2(position.x as f32, position.y as f32),
        egui::vec2(size.width, size.height),
    )
}

fn render_card(
    ui: &mut egui::Ui,
    theme: &Theme,
    item: &PinnedItem,
    state: &mut WorkspaceState,
    origin: egui::Pos2,
    now: Instant,
    actions: &mut Vec<CardAction>,
) {
    let (offset, size) = card_geometry(item, state);
    let card_rect = Rect::from_min_size(origin + offset, size);

    ui.scope_builder(UiBuilder::new().id_salt(&item.id).max_rect(card_rect), |ui| {
        ui.set_clip_rect(card_rect.intersect(ui.clip_rect()));
        theme.card_frame().show(ui, |ui| {
            ui.set_min_size(card_rect.size() - egui::vec2(24.0, 24.0));
            card_header(ui, theme, item, state, now, actions);
            ui.add_space(theme.spacing_4);

            let body_height = (card_rect.height() - 96.0).max(60.0);
            ScrollArea::vertical()
                .id_salt((&item.id, "card_body"))
                .max_height(body_height)
                .auto_shrink([false, true])
                .show(ui, |ui| {
                    metrics_grid(
                        ui,
                        theme,
                        &item.id,
                        state.snapshot_of(&item.id),
                        state.is_refreshing(&item.id, now),
                    );
                    ui.add_space(theme.spacing_8);
                    if let Some(action) =
                        response_section(ui, theme, item, state.is_expanded(&item.id))
                    {
                        actions.push(action);
                    }
                });

            ui.add_space(theme.spacing_4);
            ui.label(
                RichText::new(pinned_at_label(item))
                    .color(theme.text_muted)
                    .size(11.0),
            );
        });
    });

    resize_handle(ui, theme, item, state, card_rect, actions);
}

fn card_header(
    ui: &mut egui::Ui,
    theme: &Theme,
    item: &PinnedItem,
    state: &mut WorkspaceState,
    now: Instant,
    actions: &mut Vec<CardAction>,
) {
    ui.horizontal(|ui| {
        category_badge(ui, theme, &item.category);

        // The title doubles as the drag grip.
        let grip = ui
            .add(
                egui::Label::new(
                    RichText::new(item.query.as_str())
                        .color(theme.text_primary)
                        .strong(),
                )
                .truncate()
                .sense(Sense::drag()),
            )
            .on_hover_cursor(CursorIcon::Grab);

        if grip.drag_started() {
            state.drag = Some(Gesture::begin(&item.id));
        }
        if grip.dragged() {
            if let Some(gesture) = state.drag.as_mut().filter(|g| g.id == item.id) {
                gesture.delta += grip.drag_delta();
            }
        }
        if grip.drag_stopped() {
            if let Some(gesture) = state.drag.take() {
                if gesture.id == item.id {
                    actions.push(CardAction::SetPosition {
                        id: item.id.clone(),
                        position: layout::apply_drag(item, gesture.delta.x, gesture.delta.y),
                    });
                }
            }
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui
                .small_button("✕")
                .on_hover_text("取消固定")
                .clicked()
            {
                actions.push(CardAction::Unpin(item.id.clone()));
            }
            if ui
                .small_button("放大")
                .on_hover_text("在侧边面板中查看")
                .clicked()
            {
                actions.push(CardAction::Maximize(item.id.clone()));
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
}

/// Only the bottom-right corner resizes, so a card's top-left never moves
/// during a resize.
fn resize_handle(
    ui: &mut egui::Ui,
    theme: &Theme,
    item: &PinnedItem,
    state: &mut WorkspaceState,
    card_rect: Rect,
    actions: &mut Vec<CardAction>,
) {
    let handle_rect = Rect::from_min_size(
        card_rect.max - egui::vec2(18.0, 18.0),
        egui::vec2(16.0, 16.0),
    );
    let handle = ui
        .interact(
            handle_rect,
            egui::Id::new(&item.id).with("resize"),
            Sense::drag(),
        )
        .on_hover_cursor(CursorIcon::ResizeSouthEast);
    ui.painter().text(
        handle_rect.center(),
        Align2::CENTER_CENTER,
        "◢",
        FontId::proportional(11.0),
        theme.text_muted,
    );

    if handle.drag_started() {
        state.resize = Some(Gesture::begin(&item.id));
    }
    if handle.dragged() {
        if let Some(gesture) = state.resize.as_mut().filter(|g| g.id == item.id) {
            gesture.delta += handle.drag_delta();
        }
    }
    if handle.drag_stopped() {
        if let Some(gesture) = state.resize.take() {
            if gesture.id == item.id {
                let size =
                    layout::apply_resize(item, gesture.delta.x, gesture.delta.y).clamp_to_bounds();
                actions.push(CardAction::SetSize {
                    id: item.id.clone(),
                    size,
                });
            }
        }
    }
}
