use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::app::{App, NotificationKind};

use super::theme;

const MAX_WIDTH: u16 = 48;

/// Toast in the top-right corner, just under the view tabs.
pub fn draw(frame: &mut Frame, app: &App) {
    let Some(notification) = app.notifier.recent() else {
        return;
    };

    let (title, color) = match notification.kind {
        NotificationKind::Info => (" ℹ ", theme::TEAL),
        NotificationKind::Error => (" ✗ error ", theme::RED),
    };

    let area = toast_area(frame.area(), notification.message.chars().count());

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));

    let paragraph = Paragraph::new(notification.message.as_str())
        .wrap(Wrap { trim: true })
        .block(block)
        .style(Style::default().fg(theme::TEXT).bg(theme::SURFACE0));

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn toast_area(screen: Rect, message_len: usize) -> Rect {
    let text_width = message_len.min(u16::MAX as usize) as u16;
    let width = text_width.saturating_add(4).min(MAX_WIDTH).min(screen.width);
    let lines = text_width.div_ceil(width.saturating_sub(4).max(1)).max(1);
    Rect {
        x: screen.width.saturating_sub(width.saturating_add(1)),
        y: 1,
        width,
        height: lines.saturating_add(2).min(screen.height.saturating_sub(2)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_message_fits_its_text() {
        let area = toast_area(Rect::new(0, 0, 80, 24), 10);
        assert_eq!((area.width, area.height), (14, 3));
        assert_eq!(area.x, 65);
    }

    #[test]
    fn test_huge_message_stays_on_screen() {
        let screen = Rect::new(0, 0, 80, 24);
        for len in [200, 70_000, usize::MAX] {
            let area = toast_area(screen, len);
            assert_eq!(area.width, MAX_WIDTH);
            assert!(area.x + area.width <= screen.width);
            assert!(area.y + area.height <= screen.height);
        }
    }

    #[test]
    fn test_tiny_screen() {
        let area = toast_area(Rect::new(0, 0, 6, 3), 30);
        assert_eq!(area.width, 6);
        assert_eq!(area.x, 0);
        assert_eq!(area.height, 1);
    }
}
