//! Main chat event loop
//!
//! Terminal events are read on a separate task and forwarded over a channel;
//! each generation runs on its own task feeding the stream channel. The loop
//! owns the [`App`] behind a mutex and redraws at a capped frame rate.

mod keybindings;
pub mod setup;

pub use setup::ChatOptions;

use self::keybindings::{handle_key, handle_mouse, handle_paste, KeyContext, LoopAction};
use crate::api::models::fetch_models;
use crate::api::ModelsResponse;
use crate::core::app::App;
use crate::core::chat_stream::{ChatStreamService, StreamMessage};
use crate::core::error::TransportError;
use crate::ui::renderer::ui;
use ratatui::crossterm::{
    event::{
        self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste,
        EnableMouseCapture, Event, KeyEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, prelude::Size, Terminal};
use std::{
    error::Error,
    io,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{mpsc, Mutex};
use tracing::debug;

type ChatTerminal = Terminal<CrosstermBackend<io::Stdout>>;

const MAX_FPS: u64 = 60;
const IDLE_SLEEP: Duration = Duration::from_millis(8);

#[derive(Debug)]
pub enum UiEvent {
    Crossterm(Event),
    ModelsLoaded {
        host: String,
        requested: Option<String>,
        result: Result<ModelsResponse, TransportError>,
    },
}

fn spawn_model_refresh(app: &App, event_tx: mpsc::UnboundedSender<UiEvent>) {
    let client = app.client.clone();
    let host = app.host.clone();
    let requested = Some(app.model().to_string()).filter(|model| !model.is_empty());
    tokio::spawn(async move {
        let result = fetch_models(&client, &host).await;
        let _ = event_tx.send(UiEvent::ModelsLoaded {
            host,
            requested,
            result,
        });
    });
}

async fn is_exit_requested(app: &Arc<Mutex<App>>) -> bool {
    let app_guard = app.lock().await;
    app_guard.ui.exit_requested
}

async fn try_draw_frame(
    app: &Arc<Mutex<App>>,
    terminal: &mut ChatTerminal,
    request_redraw: &mut bool,
    last_draw: &mut Instant,
    frame_duration: Duration,
) -> io::Result<()> {
    if !*request_redraw {
        return Ok(());
    }

    let now = Instant::now();
    if now.duration_since(*last_draw) < frame_duration {
        return Ok(());
    }

    let mut app_guard = app.lock().await;
    terminal.draw(|f| ui(f, &mut app_guard))?;
    *last_draw = now;
    *request_redraw = false;
    Ok(())
}

struct EventProcessingOutcome {
    events_processed: bool,
    request_redraw: bool,
    exit_requested: bool,
}

async fn process_ui_events(
    app: &Arc<Mutex<App>>,
    event_rx: &mut mpsc::UnboundedReceiver<UiEvent>,
    event_tx: &mpsc::UnboundedSender<UiEvent>,
    stream_service: &ChatStreamService,
    term_size: Size,
) -> EventProcessingOutcome {
    let mut outcome = EventProcessingOutcome {
        events_processed: false,
        request_redraw: false,
        exit_requested: false,
    };
    let ctx = KeyContext {
        term_width: term_size.width,
        term_height: term_size.height,
    };

    while let Ok(ev) = event_rx.try_recv() {
        outcome.events_processed = true;
        let mut app_guard = app.lock().await;
        match ev {
            UiEvent::Crossterm(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                outcome.request_redraw = true;
                match handle_key(&mut app_guard, key, ctx) {
                    LoopAction::None => {}
                    LoopAction::Spawn(params) => stream_service.spawn_stream(params),
                    LoopAction::RefreshModels => {
                        spawn_model_refresh(&app_guard, event_tx.clone());
                    }
                    LoopAction::Exit => {
                        outcome.exit_requested = true;
                        break;
                    }
                }
            }
            UiEvent::Crossterm(Event::Mouse(mouse)) => {
                if handle_mouse(&mut app_guard, mouse, ctx) {
                    outcome.request_redraw = true;
                }
            }
            UiEvent::Crossterm(Event::Paste(text)) => {
                handle_paste(&mut app_guard, &text);
                outcome.request_redraw = true;
            }
            UiEvent::Crossterm(Event::Resize(..)) => {
                outcome.request_redraw = true;
            }
            UiEvent::Crossterm(_) => {}
            UiEvent::ModelsLoaded {
                host,
                requested,
                result,
            } => {
                // A listing for a host the user already switched away from
                if host == app_guard.host {
                    app_guard.apply_model_listing(result, requested.as_deref());
                    app_guard.ui.clear_status();
                } else {
                    debug!(host = %host, "Dropping model listing for previous host");
                }
                outcome.request_redraw = true;
            }
        }
    }

    outcome
}

async fn process_stream_updates(
    app: &Arc<Mutex<App>>,
    rx: &mut mpsc::UnboundedReceiver<(StreamMessage, u64)>,
) -> bool {
    let mut received_any = false;
    while let Ok((message, stream_id)) = rx.try_recv() {
        received_any = true;
        let mut app_guard = app.lock().await;
        app_guard.handle_stream_message(message, stream_id);
    }
    received_any
}

pub async fn run_chat(options: ChatOptions) -> Result<(), Box<dyn Error>> {
    let app = setup::bootstrap_app(options).await?;
    let app = Arc::new(Mutex::new(app));

    // Setup terminal only after successful app creation
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableBracketedPaste,
        EnableMouseCapture
    )?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = chat_loop(&app, &mut terminal).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn chat_loop(app: &Arc<Mutex<App>>, terminal: &mut ChatTerminal) -> Result<(), Box<dyn Error>> {
    let (stream_service, mut rx) = ChatStreamService::new();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<UiEvent>();

    let event_reader_handle = {
        let event_tx = event_tx.clone();
        tokio::spawn(async move {
            loop {
                // Use a short timeout to prevent blocking
                if let Ok(true) = event::poll(Duration::from_millis(10)) {
                    match event::read() {
                        Ok(ev) => {
                            if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                                break;
                            }
                        }
                        Err(_) => continue,
                    }
                } else {
                    tokio::task::yield_now().await;
                }
            }
        })
    };

    let frame_duration = Duration::from_millis(1000 / MAX_FPS);
    let mut last_draw = Instant::now() - frame_duration;
    let mut request_redraw = true;

    let result = loop {
        if is_exit_requested(app).await {
            break Ok(());
        }

        if let Err(err) = try_draw_frame(
            app,
            terminal,
            &mut request_redraw,
            &mut last_draw,
            frame_duration,
        )
        .await
        {
            break Err(err.into());
        }

        let term_size = terminal.size().unwrap_or_default();
        let event_outcome =
            process_ui_events(app, &mut event_rx, &event_tx, &stream_service, term_size).await;
        if event_outcome.exit_requested {
            break Ok(());
        }
        if event_outcome.request_redraw {
            request_redraw = true;
        }

        let received_any = process_stream_updates(app, &mut rx).await;
        if received_any {
            request_redraw = true;
        }

        let (streaming, status_expired) = {
            let app_guard = app.lock().await;
            (app_guard.ui.is_streaming, app_guard.ui.status_expired())
        };
        if status_expired {
            app.lock().await.ui.clear_status();
            request_redraw = true;
        }
        // Keep the activity indicator animating
        if streaming {
            request_redraw = true;
        }

        let idle = !event_outcome.events_processed && !received_any;
        if idle {
            tokio::time::sleep(IDLE_SLEEP).await;
        }
    };

    event_reader_handle.abort();
    result
}
