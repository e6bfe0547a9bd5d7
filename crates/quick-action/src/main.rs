//! Quick Action: hotkey launcher for registered shell commands, typed or spoken.

mod app;
mod cli;
mod config;
mod coordinator;
mod error;
mod hotkey_handler;
mod input_view;
mod management;
mod notifier;
mod session_event;
mod session_state;
mod surface;
mod tray_icon_state;
mod tray_manager;
mod ui_command;
mod voice_control;

pub(crate) use {
    app::App,
    coordinator::SessionCoordinator,
    error::{AppError, Result as AppResult},
    hotkey_handler::HotkeyHandler,
    notifier::{DesktopNotifier, Notifier},
    session_event::SessionEvent,
    session_state::SessionState,
    tray_icon_state::TrayIconState,
    tray_manager::TrayManager,
    ui_command::UiCommand,
};

use crate::{
    cli::{Cli, Command},
    config::Config,
    input_view::InputCanvas,
    surface::{SURFACE_HEIGHT, SURFACE_WIDTH, WindowSurface, key_event, manage_command, surface_origin},
};

use quick_action_core::{
    audio::{MicrophoneSource, SttEngine},
    dispatch::{DispatchEngine, ShellLauncher},
    registry::Registry,
    voice::{SourceFactory, UtteranceSource, VoiceCapture},
};

use std::{rc::Rc, sync::Arc};

use clap::Parser;
use global_hotkey::GlobalHotKeyManager;
use tao::{
    dpi::PhysicalSize,
    event::{ElementState, Event, StartCause, WindowEvent},
    event_loop::{ControlFlow, EventLoopBuilder},
    window::{Window, WindowBuilder},
};
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "quick_action=debug,quick_action_core=info";
const EVENT_QUEUE_CAPACITY: usize = 64;
const IDLE_TITLE: &str = "Quick Action";

/// Application entry point.
fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Run);

    // Terminal management keeps stderr clean; the log file still records it.
    let _log_guard = init_logging(command == Command::Run);

    match command {
        Command::Run => run_launcher(),
        command => {
            if let Err(e) = run_management(command) {
                error!(error = ?e, "Management command failed");
                eprintln!("{}", e);
                std::process::exit(1);
            }
        }
    }
}

/// Install the stderr and rolling-file subscribers. The returned guard
/// flushes the file writer when dropped.
fn init_logging(to_stderr: bool) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let file = Config::log_dir().ok().and_then(|dir| {
        RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("quick-action.log")
            .build(dir)
            .ok()
    });

    let (file_layer, guard) = match file {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    let stderr_layer = to_stderr.then(|| fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}

fn run_management(command: Command) -> AppResult<()> {
    let config = Config::load()?;
    let registry = Registry::open(&config.registry.database_path)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match command {
        Command::List => management::list(&registry, &mut out),
        Command::Add(args) => management::add(
            &registry,
            &args.prefix,
            args.value(),
            &args.command,
            args.run_mode(),
            &mut out,
        ),
        Command::Delete(args) => management::delete(
            &registry,
            &args.prefix,
            args.value(),
            &args.command,
            args.run_mode(),
            &mut out,
        ),
        Command::Manage => {
            let stdin = std::io::stdin();
            management::interactive(&registry, &mut stdin.lock(), &mut out)
        }
        // Started by main before this point.
        Command::Run => Ok(()),
    }
}

/// Voice pipeline, or `None` when disabled or the model is unavailable.
fn build_voice(config: &Config) -> Option<VoiceCapture> {
    if !config.voice.enabled {
        info!("Voice input disabled in config");
        return None;
    }

    if let Err(e) = config.validate_model_path() {
        warn!(error = ?e, "Voice input disabled");
        return None;
    }

    let engine = match SttEngine::new(&config.whisper.model_path, config.whisper.use_gpu) {
        Ok(engine) => engine,
        Err(e) => {
            warn!(error = ?e, "Failed to load Whisper model, voice input disabled");
            return None;
        }
    };

    let segmentation = config.voice.segmenter_config();
    let open_source: SourceFactory = Arc::new(move || {
        let source = MicrophoneSource::open(&segmentation)?;
        Ok(Box::new(source) as Box<dyn UtteranceSource>)
    });

    Some(VoiceCapture::new(
        config.voice.capture_config(),
        config.voice.number_words(),
        open_source,
        Box::new(engine),
    ))
}

/// Centre the window on its monitor at 60% height.
fn place(window: &Window) {
    let Some(monitor) = window.current_monitor().or_else(|| window.primary_monitor()) else {
        return;
    };

    let origin = surface_origin(monitor.position(), monitor.size(), window.outer_size());
    window.set_outer_position(origin);
}

fn run_launcher() -> ! {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    let registry = match Registry::open(&config.registry.database_path) {
        Ok(r) => Arc::new(r),
        Err(e) => {
            error!("Command store unavailable: {:?}", e);
            std::process::exit(1);
        }
    };

    let event_loop = EventLoopBuilder::<UiCommand>::with_user_event().build();
    let ui_proxy = event_loop.create_proxy();

    let window = match WindowBuilder::new()
        .with_title(IDLE_TITLE)
        .with_decorations(false)
        .with_always_on_top(true)
        .with_resizable(false)
        .with_visible(false)
        .with_inner_size(PhysicalSize::new(SURFACE_WIDTH, SURFACE_HEIGHT))
        .build(&event_loop)
    {
        Ok(w) => Rc::new(w),
        Err(e) => {
            error!("Failed to create input window: {:?}", e);
            std::process::exit(1);
        }
    };

    let mut canvas = match InputCanvas::new(Rc::clone(&window)) {
        Ok(canvas) => canvas,
        Err(e) => {
            error!("Failed to create input canvas: {:?}", e);
            std::process::exit(1);
        }
    };

    // TrayManager lives on the main thread - TrayIcon is !Send on all platforms.
    let mut tray_manager = match TrayManager::new() {
        Ok(tm) => tm,
        Err(e) => {
            error!("Failed to create TrayManager: {:?}", e);
            std::process::exit(1);
        }
    };

    // Dropping the manager unregisters the hotkey.
    let mut hotkey_manager: Option<GlobalHotKeyManager> = None;
    let mut events_tx: Option<mpsc::Sender<SessionEvent>> = None;
    let mut startup = Some((config, registry));

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::UserEvent(cmd) => match cmd {
                UiCommand::Show => {
                    place(&window);
                    window.set_visible(true);
                    window.request_redraw();
                }
                UiCommand::Hide => window.set_visible(false),
                UiCommand::Focus => window.set_focus(),
                UiCommand::Render(buffer) => {
                    // The title still names the window in task switchers.
                    window.set_title(if buffer.is_empty() { IDLE_TITLE } else { buffer.as_str() });
                    canvas.set_text(buffer);
                }
                UiCommand::SetState(state) => {
                    if let Err(e) = tray_manager.update_state(state) {
                        error!(error = ?e, "Failed to update tray icon");
                    }
                    canvas.set_listening(state == TrayIconState::Listening);
                }
                UiCommand::Shutdown => {
                    *control_flow = ControlFlow::ExitWithCode(0);
                }
            },
            Event::RedrawRequested(window_id) if window_id == window.id() => {
                if let Err(e) = canvas.redraw() {
                    error!(error = ?e, "Failed to draw input window");
                }
            }
            Event::WindowEvent {
                window_id, event, ..
            } if window_id == window.id() => {
                let session_event = match event {
                    WindowEvent::KeyboardInput { event: key, .. }
                        if key.state == ElementState::Pressed =>
                    {
                        key_event(&key.logical_key, key.text)
                    }
                    WindowEvent::Focused(false) => Some(SessionEvent::FocusLost),
                    WindowEvent::CloseRequested => Some(SessionEvent::Escape),
                    _ => None,
                };

                if let (Some(session_event), Some(tx)) = (session_event, &events_tx) {
                    if tx.try_send(session_event).is_err() {
                        warn!("Event queue unavailable, input dropped");
                    }
                }
            }
            Event::NewEvents(StartCause::Init) => {
                let Some((config, registry)) = startup.take() else {
                    return;
                };

                // Register hotkey on the main thread: tao's event loop pumps
                // the Windows messages needed for WM_HOTKEY delivery.
                let (manager, hotkey_id) =
                    match HotkeyHandler::register_hotkey(&config.hotkey.combination) {
                        Ok(pair) => pair,
                        Err(e) => {
                            error!("Failed to register hotkey: {:?}", e);
                            std::process::exit(1);
                        }
                    };
                hotkey_manager = Some(manager);

                let manage = match manage_command() {
                    Ok(cmd) => cmd,
                    Err(e) => {
                        error!("Failed to prepare management command: {:?}", e);
                        std::process::exit(1);
                    }
                };

                #[cfg(target_os = "macos")]
                unsafe {
                    use core_foundation::runloop::{CFRunLoopGetMain, CFRunLoopWakeUp};
                    CFRunLoopWakeUp(CFRunLoopGetMain());
                }

                let (tx, events_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
                let (shutdown_tx, shutdown_rx) = watch::channel(false);
                events_tx = Some(tx.clone());

                let launcher = Arc::new(ShellLauncher::new(config.launcher.terminal.clone()));
                let surface = WindowSurface::new(ui_proxy.clone(), launcher.clone(), manage);
                let coordinator = SessionCoordinator::new(
                    surface,
                    build_voice(&config),
                    DispatchEngine::new(registry, launcher),
                    Arc::new(DesktopNotifier),
                    tx.clone(),
                );

                let ui_proxy = ui_proxy.clone();
                let manage_menu_id = tray_manager.manage_item_id().clone();
                let exit_menu_id = tray_manager.exit_item_id().clone();

                // Tokio runtime on its own thread. The window, tray and
                // hotkey manager stay on the main thread.
                std::thread::spawn(move || {
                    let rt = match tokio::runtime::Runtime::new() {
                        Ok(rt) => rt,
                        Err(e) => {
                            error!("Failed to create tokio runtime: {:?}", e);
                            std::process::exit(1);
                        }
                    };

                    rt.block_on(async {
                        let hotkey_handler = HotkeyHandler::new(hotkey_id, tx);

                        let app = App {
                            coordinator,
                            events_rx,
                            ui_proxy,
                            shutdown_tx,
                            manage_menu_id,
                            exit_menu_id,
                        };

                        tokio::join!(
                            async {
                                if let Err(e) = hotkey_handler.run(shutdown_rx).await {
                                    error!(error = ?e, "Hotkey handler error");
                                }
                            },
                            async {
                                if let Err(e) = app.run().await {
                                    error!(error = ?e, "App error");
                                }
                            }
                        );
                    });
                });
            }
            _ => {}
        }

        // Keep hotkey_manager alive in the closure for the app's lifetime.
        let _ = &hotkey_manager;
    });
}
