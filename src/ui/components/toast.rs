use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget, Wrap};

use crate::ui::theme::Theme;

/// Popup drawn over the current screen. Either a dismissable message or a
/// yes/no confirmation.
pub struct Toast<'a> {
    pub message: &'a str,
    pub confirm: bool,
    pub theme: &'a Theme,
}

impl<'a> Toast<'a> {
    pub fn message(message: &'a str, theme: &'a Theme) -> Self {
        Self {
            message,
            confirm: false,
            theme,
        }
    }

    pub fn confirm(message: &'a str, theme: &'a Theme) -> Self {
        Self {
            message,
            confirm: true,
            theme,
        }
    }
}

impl Widget for Toast<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        Clear.render(area, buf);

        let (title, border) = if self.confirm {
            (" Confirm ", colors.warning())
        } else {
            (" Notice ", colors.accent())
        };
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(colors.bg()));

        let hint = if self.confirm {
            "[y] Yes  [n/Esc] No"
        } else {
            "[Enter/Esc] Dismiss"
        };
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                self.message,
                Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(hint, Style::default().fg(colors.muted()))),
        ];
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}
