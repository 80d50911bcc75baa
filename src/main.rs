use bandui::{App, AppConfig, AppEvent, Args, ConfigManager, OpenOptions, Theme, APP_NAME};
use clap::Parser;
use color_eyre::Result;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind};
use crossterm::execute;
use ratatui::DefaultTerminal;
use std::sync::mpsc::channel;
use std::time::Duration;

fn open_options_from_args(args: &Args) -> OpenOptions {
    let mut opts = OpenOptions::new();
    if let Some(delimiter) = args.delimiter {
        opts = opts.with_delimiter(delimiter);
    }
    if args.no_header {
        opts = opts.with_has_header(false);
    }
    if let Some(n) = args.infer_schema_length {
        opts = opts.with_infer_schema_length(n);
    }
    opts
}

fn config_manager(args: &Args) -> Result<ConfigManager> {
    match &args.config_dir {
        Some(dir) => Ok(ConfigManager::with_dir(dir.clone())),
        None => ConfigManager::new(APP_NAME),
    }
}

/// Route tracing to the log file when one is given; otherwise tracing stays
/// uninitialized and the terminal is never written to.
fn init_tracing(args: &Args, debug_enabled: bool) -> Result<()> {
    let Some(path) = &args.log_file else {
        return Ok(());
    };
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    let level = if args.debug || debug_enabled {
        "debug"
    } else {
        "info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("bandui={}", level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Arc::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn render(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    terminal.draw(|frame| frame.render_widget(app, frame.area()))?;
    Ok(())
}

fn run(mut terminal: DefaultTerminal, args: &Args, config: AppConfig, theme: Theme) -> Result<()> {
    let (tx, rx) = channel::<AppEvent>();
    let mut app = App::new_with_config(tx.clone(), theme, config.clone());
    render(&mut terminal, &mut app)?;
    if let Some(path) = &args.path {
        tx.send(AppEvent::Open(path.clone(), open_options_from_args(args)))?;
    }

    let poll_interval = Duration::from_millis(config.performance.event_poll_interval_ms);
    loop {
        if crossterm::event::poll(poll_interval)? {
            match crossterm::event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    tx.send(AppEvent::Key(key))?
                }
                Event::Mouse(mouse) => tx.send(AppEvent::Mouse(mouse))?,
                Event::Resize(cols, rows) => tx.send(AppEvent::Resize(cols, rows))?,
                _ => {}
            }
        }

        let updated = match rx.recv_timeout(Duration::from_millis(0)) {
            Ok(event) => {
                match event {
                    AppEvent::Exit => break,
                    AppEvent::Crash(msg) => {
                        return Err(color_eyre::eyre::eyre!(msg));
                    }
                    event => {
                        if let Some(event) = app.event(&event) {
                            tx.send(event)?;
                        }
                    }
                }
                true
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => false,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        };

        if updated {
            render(&mut terminal, &mut app)?;
        }
    }
    Ok(())
}

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.generate_config {
        let manager = config_manager(args)?;
        manager.ensure_config_dir()?;
        let path = manager.config_path("config.toml");
        if path.exists() && !args.force {
            eprintln!(
                "Config file already exists at {} (use --force to overwrite)",
                path.display()
            );
            std::process::exit(1);
        }
        std::fs::write(&path, manager.generate_default_config())?;
        println!("Wrote {}", path.display());
        return Ok(Some(()));
    }
    Ok(None)
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    if handle_early_exit_flags(&args)?.is_some() {
        return Ok(());
    }

    let config = config_manager(&args)?.load_config()?;
    init_tracing(&args, config.debug.enabled)?;
    let theme = Theme::from_config(&config.theme)?;

    let terminal = ratatui::init();
    execute!(std::io::stdout(), EnableMouseCapture)?;
    let result = run(terminal, &args, config, theme);
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();
    result
}
