use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Padding, Paragraph, Widget, Wrap};

use crate::bank::Question;
use crate::session::result::AnswerFeedback;
use crate::ui::components::progress_bar::ProgressBar;
use crate::ui::theme::Theme;

pub struct QuestionView<'a> {
    pub title: &'a str,
    pub question: &'a Question,
    pub position: usize,
    pub total: usize,
    pub gauntlet: bool,
    /// Present while the answer is being revealed.
    pub feedback: Option<&'a AnswerFeedback>,
    pub theme: &'a Theme,
}

impl Widget for QuestionView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let title_color = if self.gauntlet {
            colors.gauntlet()
        } else {
            colors.accent()
        };

        let block = Block::bordered()
            .title(format!(" {} ", self.title))
            .title_style(Style::default().fg(title_color).add_modifier(Modifier::BOLD))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let choice_rows = self.question.choices.len() as u16;
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(choice_rows * 2),
                Constraint::Length(2),
            ])
            .split(inner);

        let label = format!("Question {}", self.position + 1);
        let fill = if self.gauntlet {
            colors.gauntlet()
        } else {
            colors.bar_filled()
        };
        ProgressBar::new(&label, self.position, self.total, self.theme)
            .fill(fill)
            .render(layout[0], buf);

        Paragraph::new(Line::from(Span::styled(
            self.question.text.as_str(),
            Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
        )))
        .wrap(Wrap { trim: true })
        .block(Block::default().padding(Padding::horizontal(2)))
        .render(layout[1], buf);

        let mut lines: Vec<Line> = Vec::new();
        for (i, choice) in self.question.choices.iter().enumerate() {
            let (marker, style) = match self.feedback {
                Some(fb) if i == fb.correct_index => (
                    "\u{25cb}",
                    Style::default()
                        .fg(colors.success())
                        .add_modifier(Modifier::BOLD),
                ),
                Some(fb) if i == fb.selected => (
                    "\u{00d7}",
                    Style::default()
                        .fg(colors.error())
                        .add_modifier(Modifier::CROSSED_OUT),
                ),
                Some(_) => (" ", Style::default().fg(colors.muted())),
                None => (" ", Style::default().fg(colors.fg())),
            };
            lines.push(Line::from(vec![
                Span::styled(format!("  {marker} [{}] ", i + 1), style),
                Span::styled(choice.as_str(), style),
            ]));
            lines.push(Line::from(""));
        }
        Paragraph::new(lines).render(layout[2], buf);

        let status = match self.feedback {
            Some(fb) if fb.correct => Line::from(Span::styled(
                "  \u{25cb} Correct!",
                Style::default()
                    .fg(colors.success())
                    .add_modifier(Modifier::BOLD),
            )),
            Some(_) => Line::from(Span::styled(
                "  \u{00d7} Incorrect...",
                Style::default()
                    .fg(colors.error())
                    .add_modifier(Modifier::BOLD),
            )),
            None => Line::from(""),
        };
        Paragraph::new(status).render(layout[3], buf);
    }
}
