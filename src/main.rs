use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use warbletui::app::App;
use warbletui::config;

#[derive(Parser)]
#[command(
    name = "warbletui",
    version,
    about = "Terminal client for a Warble microblog server"
)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Server base URL, overriding the config file
    #[arg(long, value_name = "URL")]
    server: Option<String>,
    /// User id for the following panel, overriding the config file
    #[arg(long, value_name = "ID")]
    user: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut app_config = config::load(cli.config.as_deref());
    if let Some(server) = cli.server {
        app_config.server_url = server;
    }
    if let Some(user_id) = cli.user {
        app_config.user_id = Some(user_id);
    }

    // Mouse capture is enabled once here; every later click is routed by
    // the app loop.
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&app_config);
    let result = app.run(&mut terminal).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}
