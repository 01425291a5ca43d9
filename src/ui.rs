use crate::app::App;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Paragraph, Widget},
    Frame,
};

/// Render the UI: bordered map area above a one-line status bar.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Map
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_map(frame, app, chunks[0]);
    render_status_bar(frame, app, chunks[1]);
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Grid Map ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(CanvasWidget { app }, inner);
}

/// Blit the RGBA canvas into the terminal with half blocks: each character
/// cell shows two stacked pixels, the upper in the foreground color and the
/// lower in the background.
struct CanvasWidget<'a> {
    app: &'a App,
}

impl Widget for CanvasWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let canvas = &self.app.canvas;
        for cy in 0..area.height {
            for cx in 0..area.width {
                let px = cx as usize;
                let top = canvas.get_pixel(px, cy as usize * 2);
                let bottom = canvas.get_pixel(px, cy as usize * 2 + 1);
                let (Some(top), Some(bottom)) = (top, bottom) else {
                    continue;
                };
                if top[3] == 0 && bottom[3] == 0 {
                    continue;
                }
                let cell = &mut buf[(area.x + cx, area.y + cy)];
                cell.set_char('▀');
                cell.set_fg(to_color(top));
                cell.set_bg(to_color(bottom));
            }
        }
    }
}

fn to_color(px: [u8; 4]) -> Color {
    if px[3] == 0 {
        Color::Reset
    } else {
        Color::Rgb(px[0], px[1], px[2])
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status = Paragraph::new(format!(
        " {} | q quit, g projection, +/- zoom, drag/arrows rotate",
        app.status_line()
    ))
    .style(Style::default().fg(Color::Gray).bg(Color::Black));
    frame.render_widget(status, area);
}
