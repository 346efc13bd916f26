use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};
use tui_input::Input;

use super::theme;

pub fn draw(frame: &mut Frame, input: &Input, active: bool, area: Rect) {
    let (border_color, text_style) = if active {
        (theme::BLUE, Style::default().fg(theme::TEXT))
    } else {
        (theme::SURFACE2, Style::default().fg(theme::OVERLAY0))
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Filter ");
    let inner = block.inner(area);

    // Keep the cursor in view when the query is wider than the box.
    let width = inner.width.saturating_sub(2) as usize;
    let scroll = input.visual_scroll(width);
    let paragraph = Paragraph::new(format!("/ {}", input.value()))
        .style(text_style)
        .scroll((0, scroll as u16))
        .block(block);
    frame.render_widget(paragraph, area);

    if active {
        let cursor = input.visual_cursor().max(scroll) - scroll + 2;
        frame.set_cursor_position((inner.x + cursor as u16, inner.y));
    }
}
