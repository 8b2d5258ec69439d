mod app;
mod assistant;
mod backend;
mod event;
mod pins;
mod theme;
mod workspace;

use app::FinboardApp;
use assistant::Assistant;
use backend::BackendMonitor;
use eframe::egui;
use pins::panel::PanelStore;
use pins::store::PinStore;
use std::sync::mpsc;

const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let api_base =
        std::env::var("FINBOARD_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
    log::info!("analytics backend at {api_base}");

    let (tx, rx) = mpsc::channel();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("finboard-runtime")
        .build()?;

    let backend = BackendMonitor::start(runtime.handle(), api_base, tx.clone());
    let assistant = Assistant::new(runtime.handle().clone(), tx);
    let panel = PanelStore::open(PinStore::new(PinStore::default_path()));

    let app = FinboardApp::new(rx, assistant, backend, panel);
    let _runtime = runtime;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1440.0, 900.0])
            .with_min_inner_size([1024.0, 640.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Finboard",
        native_options,
        Box::new(move |creation_context| {
            theme::install_cjk_fonts(&creation_context.egui_ctx);
            app.theme().apply_visuals(&creation_context.egui_ctx);
            Ok(Box::new(app))
        }),
    )?;

    Ok(())
}
