// main.rs

use webtodos::app::App;
use webtodos::{client, server, tui};
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // `webtodos serve` runs the API server; anything else opens the TUI.
    if std::env::args().nth(1).as_deref() == Some("serve") {
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(server::run());
        return Ok(());
    }

    let cfg = client::load_config();
    let api = match client::TodoApiClient::from_config(&cfg) {
        Ok(api) => api,
        Err(e) => return Err(e.into()),
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new();

    // Run the TUI event loop (this blocks until exit)
    let res = tui::run_app(&mut terminal, &mut app, &api);

    // Restore terminal state
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Handle errors from the event loop if any
    if let Err(err) = res {
        eprintln!("Application error: {}", err);
    }

    Ok(())
}
