use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Padding, Paragraph, Widget, Wrap};

use crate::bank::Question;
use crate::session::result::AnswerFeedback;
use crate::ui::theme::Theme;

/// Commentary shown after the reveal delay.
pub struct ExplanationPanel<'a> {
    pub question: &'a Question,
    pub feedback: &'a AnswerFeedback,
    /// True when advancing ends the run.
    pub last: bool,
    pub theme: &'a Theme,
}

impl Widget for ExplanationPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let (mark, verdict, verdict_color) = if self.feedback.correct {
            ("\u{25cb}", "Correct", colors.success())
        } else {
            ("\u{00d7}", "Incorrect", colors.error())
        };

        let block = Block::bordered()
            .title(" Explanation ")
            .border_style(Style::default().fg(verdict_color))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(2),
                Constraint::Min(2),
                Constraint::Length(2),
            ])
            .split(inner);

        Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("{mark}  {verdict}"),
                Style::default()
                    .fg(verdict_color)
                    .add_modifier(Modifier::BOLD),
            )),
        ])
        .alignment(Alignment::Center)
        .render(layout[0], buf);

        let answer = self
            .question
            .choices
            .get(self.feedback.correct_index)
            .map(String::as_str)
            .unwrap_or("?");
        Paragraph::new(Line::from(vec![
            Span::styled("  Answer: ", Style::default().fg(colors.muted())),
            Span::styled(
                answer,
                Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
            ),
        ]))
        .render(layout[1], buf);

        let body = if self.feedback.explanation.is_empty() {
            Span::styled("(no commentary for this question)", Style::default().fg(colors.muted()))
        } else {
            Span::styled(self.feedback.explanation.as_str(), Style::default().fg(colors.fg()))
        };
        Paragraph::new(Line::from(body))
            .wrap(Wrap { trim: true })
            .block(Block::default().padding(Padding::horizontal(2)))
            .render(layout[2], buf);

        let hint = if self.last {
            "  [Enter] See result  [Esc] Home"
        } else {
            "  [Enter] Next question  [Esc] Home"
        };
        Paragraph::new(Line::from(Span::styled(hint, Style::default().fg(colors.accent()))))
            .render(layout[3], buf);
    }
}
