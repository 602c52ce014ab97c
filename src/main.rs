//! CBMPE Assistant - terminal front-end for the fire department's digital
//! services portal
//!
//! The core is a scripted chat that walks a user through a certificate
//! request, visit scheduling, protocol lookup or a contact request, with
//! field-level validation along the way.

mod app;
mod auth;
mod config;
mod handler;
mod navigation;
mod protocol;
mod runtime;
mod state_machine;
mod transcript;
mod tui;
mod ui;
mod validation;

use app::App;
use config::AppConfig;
use navigation::{FileScreenStore, Navigator};
use protocol::{ProtocolSource, RandomProtocolSource, SeededProtocolSource};
use runtime::ChatHandle;
use state_machine::ChatContext;
use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tui::EventHandler;

const TICK_RATE: Duration = Duration::from_millis(300);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    std::fs::create_dir_all(&config.state_dir)?;

    // The terminal belongs to the UI, so logs go to a file
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(config.log_path())?;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cbmpe_assistant=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(Mutex::new(log_file)),
        )
        .init();

    tracing::info!(
        state_dir = %config.state_dir.display(),
        typing_delay = ?config.typing_delay,
        processing_delay = ?config.processing_delay,
        "Starting CBMPE assistant"
    );

    let protocols: Arc<dyn ProtocolSource> = match config.protocol_seed {
        Some(seed) => {
            tracing::info!(seed, "Using seeded protocol numbers");
            Arc::new(SeededProtocolSource::new(seed))
        }
        None => Arc::new(RandomProtocolSource),
    };
    let context = ChatContext::new(uuid::Uuid::new_v4().to_string(), protocols);
    let chat = ChatHandle::spawn(context, config.typing_delay);

    let navigator = Navigator::restore(Arc::new(FileScreenStore::in_dir(&config.state_dir)));

    let mut events = EventHandler::new(TICK_RATE);
    let mut app = App::new(navigator, chat, events.sender(), config.processing_delay);
    events.forward_chat(app.chat_updates());
    app.resync_chat().await;

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app, &mut events).await;
    tui::restore()?;

    tracing::info!("Shutting down");
    result
}

async fn run(
    terminal: &mut tui::Tui,
    app: &mut App,
    events: &mut EventHandler,
) -> Result<(), Box<dyn std::error::Error>> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        let Some(event) = events.next().await else {
            break;
        };
        handler::handle_event(app, event).await;
    }
    Ok(())
}
