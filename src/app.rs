use crate::assistant::Assistant;
use crate::backend::{BackendMonitor, BackendState};
use crate::event::AppEvent;
use crate::pins::panel::PanelStore;
use crate::theme::Theme;
use crate::workspace::{canvas, columns, detail, CardAction, WorkspaceState};
use chrono::{DateTime, Local};
use eframe::egui::{self, Align2, Color32, RichText, ScrollArea};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ViewMode {
    Chat,
    Workspace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    User,
    Assistant,
}

struct ChatMessage {
    role: Role,
    content: String,
    /// For assistant messages: the question being answered, which is what a
    /// pin carries over to the workspace. The greeting has none.
    query: Option<String>,
    category: Option<String>,
    sent_at: DateTime<Local>,
}

pub struct FinboardApp {
    rx: Receiver<AppEvent>,
    assistant: Assistant,
    _backend: BackendMonitor,
    backend_state: BackendState,
    theme: Theme,
    panel: PanelStore,
    workspace: WorkspaceState,
    view: ViewMode,
    transcript: Vec<ChatMessage>,
    input_buffer: String,
    awaiting_reply: bool,
    confirm_clear: bool,
    scroll_to_bottom: bool,
}

impl FinboardApp {
    pub fn new(
        rx: Receiver<AppEvent>,
        assistant: Assistant,
        backend: BackendMonitor,
        panel: PanelStore,
    ) -> Self {
        let greeting = ChatMessage {
            role: Role::Assistant,
            content: "您好，我是银行业务分析助手。可以询问经营、存款、贷款、中间业务\
                      或客户相关的指标，回答可以固定到工作台持续观察。"
                .to_string(),
            query: None,
            category: None,
            sent_at: Local::now(),
        };

        Self {
            rx,
            assistant,
            _backend: backend,
            backend_state: BackendState::Probing,
            theme: Theme::default(),
            panel,
            workspace: WorkspaceState::new(),
            view: ViewMode::Chat,
            transcript: vec![greeting],
            input_buffer: String::new(),
            awaiting_reply: false,
            confirm_clear: false,
            scroll_to_bottom: false,
        }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    fn backend_label(&self) -> (&'static str, Color32) {
        match self.backend_state {
            BackendState::Online => ("服务正常", self.theme.success),
            BackendState::Probing => ("连接中…", self.theme.warning),
            BackendState::Offline => ("服务离线", self.theme.danger),
        }
    }

    fn drain_events(&mut self, ctx: &egui::Context) {
        loop {
            match self.rx.try_recv() {
                Ok(event) => self.apply_event(event, ctx),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    log::warn!("event channel disconnected");
                    break;
                }
            }
        }
    }

    fn apply_event(&mut self, event: AppEvent, ctx: &egui::Context) {
        match event {
            AppEvent::AssistantReply {
                query,
                category,
                response,
            } => {
                self.transcript.push(ChatMessage {
                    role: Role::Assistant,
                    content: response,
                    query: Some(query),
                    category: Some(category),
                    sent_at: Local::now(),
                });
                self.awaiting_reply = false;
                self.scroll_to_bottom = true;
                ctx.request_repaint();
            }
            AppEvent::BackendStatus(state) => {
                log::info!("backend state changed: {state:?}");
                self.backend_state = state;
            }
        }
    }

    fn submit_prompt(&mut self) {
        let prompt = self.input_buffer.trim().to_string();
        if prompt.is_empty() {
            return;
        }

        self.transcript.push(ChatMessage {
            role: Role::User,
            content: prompt.clone(),
            query: None,
            category: None,
            sent_at: Local::now(),
        });
        self.assistant.ask(prompt);
        self.input_buffer.clear();
        self.awaiting_reply = true;
        self.scroll_to_bottom = true;
    }

    fn apply_card_actions(&mut self, actions: Vec<CardAction>) {
        for action in actions {
            match action {
                CardAction::Refresh(id) => self.workspace.begin_refresh(&id, Instant::now()),
                CardAction::ToggleExpanded(id) => self.workspace.toggle_expanded(&id),
                CardAction::Maximize(id) => self.workspace.maximize(&id),
                CardAction::Restore => self.workspace.restore(),
                CardAction::Unpin(id) => {
                    self.panel.unpin(&id);
                    self.workspace.forget(&id);
                }
                CardAction::SetPosition { id, position } => {
                    self.panel.update_position(&id, position);
                }
                CardAction::SetSize { id, size } => self.panel.update_size(&id, size),
            }
        }
    }

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        let (status_label, status_color) = self.backend_label();
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong("Finboard");
                ui.separator();
                ui.label(RichText::new(status_label).color(status_color));
                ui.separator();
                ui.selectable_value(&mut self.view, ViewMode::Chat, "对话");
                ui.selectable_value(&mut self.view, ViewMode::Workspace, "工作台");

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if self.view == ViewMode::Workspace {
                        if ui
                            .add_enabled(!self.panel.is_empty(), egui::Button::new("清空全部"))
                            .clicked()
                        {
                            self.confirm_clear = true;
                        }
                        if ui
                            .add_enabled(!self.panel.is_empty(), egui::Button::new("自动排列"))
                            .clicked()
                        {
                            self.panel.auto_arrange();
                        }
                    }
                    ui.label(
                        RichText::new(format!("已固定 {}", self.panel.len()))
                            .color(self.theme.text_muted),
                    );
                });
            });
        });
    }

    /// Clearing everything is irreversible, so it always goes through this
    /// dialog; a single click can never trigger it.
    fn render_clear_confirmation(&mut self, ctx: &egui::Context) {
        if !self.confirm_clear {
            return;
        }

        egui::Window::new("清空固定面板")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(format!(
                    "确定要移除全部 {} 个固定项吗？该操作无法撤销。",
                    self.panel.len()
                ));
                ui.add_space(self.theme.spacing_8);
                ui.horizontal(|ui| {
                    if ui
                        .button(RichText::new("确认清空").color(self.theme.danger))
                        .clicked()
                    {
                        self.panel.clear_all();
                        self.workspace.clear();
                        self.confirm_clear = false;
                    }
                    if ui.button("取消").clicked() {
                        self.confirm_clear = false;
                    }
                });
            });
    }

    fn render_detail_panel(&mut self, ctx: &egui::Context) {
        let Some(id) = self.workspace.maximized().map(String::from) else {
            return;
        };
        let Some(item) = self.panel.get(&id) else {
            // The item left the list underneath the view, e.g. through a
            // stale timer callback. Quietly fall back to the canvas.
            self.workspace.restore();
            return;
        };

        let actions = egui::SidePanel::right("pin_detail")
            .resizable(true)
            .default_width(420.0)
            .show(ctx, |ui| detail::render(ui, &self.theme, item, &self.workspace))
            .inner;
        self.apply_card_actions(actions);
    }

    fn render_nav_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("nav_panel")
            .resizable(false)
            .default_width(170.0)
            .show(ctx, |ui| {
                ui.heading("功能导航");
                ui.separator();
                if ui
                    .selectable_label(self.view == ViewMode::Chat, "智能问答")
                    .clicked()
                {
                    self.view = ViewMode::Chat;
                }
                if ui
                    .selectable_label(self.view == ViewMode::Workspace, "固定工作台")
                    .clicked()
                {
                    self.view = ViewMode::Workspace;
                }
                ui.separator();
                ui.add_enabled(false, egui::Button::new("知识库"));
                ui.add_enabled(false, egui::Button::new("数据管理"));
            });
    }

    fn render_chat_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("智能问答");
            ui.separator();

            let transcript_height = (ui.available_height() - 90.0).max(120.0);
            let mut pin_request: Option<usize> = None;

            ScrollArea::vertical()
                .id_salt("chat_transcript")
                .max_height(transcript_height)
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for (index, message) in self.transcript.iter().enumerate() {
                        render_message(ui, &self.theme, message, index, &mut pin_request);
                        ui.add_space(self.theme.spacing_8);
                    }

                    if self.awaiting_reply {
                        ui.horizontal(|ui| {
                            ui.add(egui::Spinner::new().size(14.0));
                            ui.label(RichText::new("分析中…").color(self.theme.text_muted));
                        });
                    }

                    if self.scroll_to_bottom {
                        ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                    }
                });
            self.scroll_to_bottom = false;

            if let Some(index) = pin_request {
                self.pin_message(index);
            }

            ui.separator();
            self.render_composer(ui);
        });
    }

    fn render_composer(&mut self, ui: &mut egui::Ui) {
        let input_enabled = !self.awaiting_reply;
        let hint = if self.awaiting_reply {
            "正在等待回答…"
        } else {
            "输入您的问题…"
        };

        let mut send_now = false;
        self.theme.composer_frame().show(ui, |ui| {
            ui.horizontal(|ui| {
                let response = ui.add_enabled(
                    input_enabled,
                    egui::TextEdit::singleline(&mut self.input_buffer)
                        .desired_width(f32::INFINITY)
                        .hint_text(hint),
                );
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    send_now = true;
                }

                let clicked = ui
                    .add_enabled(
                        input_enabled && !self.input_buffer.trim().is_empty(),
                        egui::Button::new("发送"),
                    )
                    .clicked();
                send_now |= clicked;
            });
        });

        if send_now && input_enabled {
            self.submit_prompt();
        }
    }

    fn pin_message(&mut self, index: usize) {
        let Some(message) = self.transcript.get(index) else {
            return;
        };
        let Some(query) = message.query.clone() else {
            return;
        };
        let category = message.category.clone().unwrap_or_default();
        self.panel.pin(query, message.content.clone(), category);
    }

    fn render_pinned_column(&mut self, ctx: &egui::Context) {
        let actions = if self.workspace.hide_content {
            egui::CentralPanel::default()
                .show(ctx, |ui| {
                    columns::render(ui, &self.theme, &self.panel, &mut self.workspace)
                })
                .inner
        } else {
            egui::SidePanel::left("pin_column")
                .resizable(true)
                .default_width(360.0)
                .show(ctx, |ui| {
                    columns::render(ui, &self.theme, &self.panel, &mut self.workspace)
                })
                .inner
        };
        self.apply_card_actions(actions);
    }

    fn render_canvas_panel(&mut self, ctx: &egui::Context) {
        let actions = egui::CentralPanel::default()
            .show(ctx, |ui| {
                canvas::render(ui, &self.theme, &self.panel, &mut self.workspace)
            })
            .inner;
        self.apply_card_actions(actions);
    }
}

fn render_message(
    ui: &mut egui::Ui,
    theme: &Theme,
    message: &ChatMessage,
    index: usize,
    pin_request: &mut Option<usize>,
) {
    match message.role {
        Role::User => {
            ui.horizontal(|ui| {
                ui.label(RichText::new("我").color(theme.accent_primary).strong());
                ui.label(RichText::new(message.content.as_str()).color(theme.text_primary));
            });
        }
        Role::Assistant => {
            theme.card_frame().show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new("助手").color(theme.success).strong());
                    if let Some(category) = &message.category {
                        crate::workspace::category_badge(ui, theme, category);
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            RichText::new(message.sent_at.format("%H:%M").to_string())
                                .color(theme.text_muted)
                                .size(11.0),
                        );
                        if message.query.is_some()
                            && ui
                                .small_button("固定")
                                .on_hover_text("固定到工作台")
                                .clicked()
                        {
                            *pin_request = Some(index);
                        }
                    });
                });
                ui.label(RichText::new(message.content.as_str()).color(theme.text_primary));
            });
        }
    }
}

impl eframe::App for FinboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events(ctx);

        let now = Instant::now();
        self.workspace.finish_due_refreshes(self.panel.items(), now);
        if self.workspace.detail_tick(now) {
            if let Some(id) = self.workspace.maximized().map(String::from) {
                if let Some(item) = self.panel.get(&id) {
                    self.workspace.refresh_snapshot_now(item);
                }
            }
        }

        self.render_top_bar(ctx);
        self.render_clear_confirmation(ctx);
        self.render_detail_panel(ctx);

        match self.view {
            ViewMode::Chat => {
                if !self.workspace.hide_nav {
                    self.render_nav_panel(ctx);
                }
                self.render_pinned_column(ctx);
                if !self.workspace.hide_content {
                    self.render_chat_panel(ctx);
                }
            }
            ViewMode::Workspace => self.render_canvas_panel(ctx),
        }

        // Background events only surface on a frame, so keep a slow idle
        // cadence and tighten it while timers are running.
        if self.awaiting_reply || self.workspace.any_refresh_pending() {
            ctx.request_repaint_after(Duration::from_millis(100));
        } else if self.workspace.maximized().is_some() {
            ctx.request_repaint_after(Duration::from_millis(500));
        } else {
            ctx.request_repaint_after(Duration::from_secs(2));
        }
    }
}
