pub mod app;
pub mod config;
pub mod console;
pub mod error;
pub mod geodesy;
pub mod geometry;
pub mod location;
pub mod logging;
pub mod marker;
pub mod notification;
pub mod presentation;
pub mod repository;
pub mod state;
pub mod storage;
pub mod worker;
pub mod workflow;
pub use error::{AppError, AppResult};

use app::{open_marker_store, App, StoreLocation};
use console::{ConsoleLocationProvider, ConsoleSurface};
use notification::SystemNotifier;

/// Entrypoint used by the CLI: runs an interactive console session on
/// stdin/stdout against the chosen marker store.
pub fn run(store_location: StoreLocation) -> AppResult<()> {
    logging::init();
    tracing::info!("starting mapmarks");

    let config = config::load_app_config();
    let store = open_marker_store(&store_location, &config)?;
    let mut app = App::new(
        config,
        store,
        ConsoleSurface::default(),
        ConsoleLocationProvider::default(),
        Box::new(SystemNotifier),
    );
    app.on_map_ready()?;
    tracing::info!("startup complete with state={:?}", app.state());

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    console::run_console(&mut app, stdin.lock(), &mut stdout)?;
    Ok(())
}
