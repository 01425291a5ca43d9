mod app;
mod ui;

use anyhow::Result;
use app::App;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::DefaultTerminal;
use std::path::Path;
use std::time::Duration;

fn main() -> Result<()> {
    let mut terminal = ratatui::init();
    terminal.clear()?;

    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal);

    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

/// Mouse events: drag rotates, wheel zooms, movement drives hover picking.
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    // The map area starts one cell in from the border; each character cell is
    // one pixel wide and two pixels tall.
    let px = mouse.column.saturating_sub(1) as f64;
    let py = mouse.row.saturating_sub(1) as f64 * 2.0;

    match mouse.kind {
        MouseEventKind::ScrollUp => app.zoom_in(),
        MouseEventKind::ScrollDown => app.zoom_out(),
        MouseEventKind::Down(MouseButton::Left) => {
            app.last_mouse = Some((px, py));
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            app.handle_drag(px, py);
        }
        MouseEventKind::Up(MouseButton::Left) => {
            app.end_drag();
            app.update_hover(px, py);
        }
        MouseEventKind::Moved => {
            app.update_hover(px, py);
        }
        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal) -> Result<()> {
    let size = terminal.size()?;
    // Half blocks give two pixels per character row; reserve the border and
    // the status bar.
    let width = size.width.saturating_sub(2) as usize;
    let height = size.height.saturating_sub(3) as usize * 2;
    let mut app = App::new(width, height);
    app.load_layers(Path::new("data"))?;

    loop {
        app.tick();
        terminal.draw(|frame| ui::render(frame, &app))?;

        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Press {
                        match key.code {
                            KeyCode::Char('q') | KeyCode::Esc => app.quit(),

                            KeyCode::Left | KeyCode::Char('h') => app.rotate_by(10.0, 0.0),
                            KeyCode::Right | KeyCode::Char('l') => app.rotate_by(-10.0, 0.0),
                            KeyCode::Up | KeyCode::Char('k') => app.rotate_by(0.0, -6.0),
                            KeyCode::Down | KeyCode::Char('j') => app.rotate_by(0.0, 6.0),

                            KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
                            KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

                            KeyCode::Char('g') | KeyCode::Char('G') => app.toggle_projection(),

                            _ => {}
                        }
                    }
                }
                Event::Mouse(mouse) => handle_mouse(&mut app, mouse),
                Event::Resize(w, h) => {
                    let width = w.saturating_sub(2) as usize;
                    let height = h.saturating_sub(3) as usize * 2;
                    app.resize(width, height);
                }
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
