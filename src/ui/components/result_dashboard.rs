use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::session::result::{PASS_PERCENT, SessionSummary};
use crate::ui::theme::Theme;

pub struct ResultDashboard<'a> {
    pub summary: &'a SessionSummary,
    /// Display name of the finished genre, or the gauntlet.
    pub title: &'a str,
    pub theme: &'a Theme,
}

impl<'a> ResultDashboard<'a> {
    pub fn new(summary: &'a SessionSummary, title: &'a str, theme: &'a Theme) -> Self {
        Self {
            summary,
            title,
            theme,
        }
    }

    fn normal_lines(&self) -> Vec<Line<'a>> {
        let colors = &self.theme.colors;
        let SessionSummary::Normal {
            score,
            total,
            percentage,
            grade,
            newly_cleared,
            ..
        } = self.summary
        else {
            return Vec::new();
        };

        let pct_color = if *percentage >= 90 {
            colors.success()
        } else if *percentage >= PASS_PERCENT {
            colors.accent()
        } else if *percentage >= 50 {
            colors.warning()
        } else {
            colors.error()
        };

        let mut lines = vec![
            Line::from(vec![
                Span::styled("  Score:    ", Style::default().fg(colors.fg())),
                Span::styled(
                    format!("{score} / {total}"),
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("  Accuracy: ", Style::default().fg(colors.fg())),
                Span::styled(
                    format!("{percentage}%"),
                    Style::default().fg(pct_color).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  ({PASS_PERCENT}% to clear)"),
                    Style::default().fg(colors.muted()),
                ),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                format!("  {}", grade.message()),
                Style::default().fg(colors.fg()),
            )),
        ];
        if *newly_cleared {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "  \u{2605} Genre cleared!",
                Style::default()
                    .fg(colors.cleared())
                    .add_modifier(Modifier::BOLD),
            )));
        }
        lines
    }

    fn gauntlet_lines(&self) -> Vec<Line<'a>> {
        let colors = &self.theme.colors;
        let SessionSummary::Gauntlet { survived, total } = self.summary else {
            return Vec::new();
        };

        let headline = if survived == total {
            Span::styled(
                "  You survived the whole gauntlet!",
                Style::default()
                    .fg(colors.success())
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(
                "  You fell in the gauntlet...",
                Style::default()
                    .fg(colors.gauntlet())
                    .add_modifier(Modifier::BOLD),
            )
        };
        vec![
            Line::from(headline),
            Line::from(""),
            Line::from(vec![
                Span::styled("  Survived: ", Style::default().fg(colors.fg())),
                Span::styled(
                    format!("{survived}"),
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(" of {total}"),
                    Style::default().fg(colors.muted()),
                ),
            ]),
        ]
    }
}

impl Widget for ResultDashboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let gauntlet = matches!(self.summary, SessionSummary::Gauntlet { .. });

        let block = Block::bordered()
            .title(format!(" {} ", self.title))
            .border_style(Style::default().fg(if gauntlet {
                colors.gauntlet()
            } else {
                colors.accent()
            }))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(2),
            ])
            .split(inner);

        Paragraph::new(Line::from(Span::styled(
            "Results",
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .render(layout[0], buf);

        let lines = if gauntlet {
            self.gauntlet_lines()
        } else {
            self.normal_lines()
        };
        Paragraph::new(lines).render(layout[1], buf);

        Paragraph::new(Line::from(vec![
            Span::styled("  [r] Retry  ", Style::default().fg(colors.accent())),
            Span::styled("[h/Esc] Home", Style::default().fg(colors.accent())),
        ]))
        .render(layout[2], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_text(summary: &SessionSummary) -> String {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 50, 14);
        let mut buf = Buffer::empty(area);
        ResultDashboard::new(summary, "Meiji", &theme).render(area, &mut buf);
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn normal_result_shows_badge_only_when_newly_cleared() {
        let text = render_text(&SessionSummary::normal("meiji", 7, 10, true));
        assert!(text.contains("7 / 10"));
        assert!(text.contains("70%"));
        assert!(text.contains("Genre cleared!"));

        let text = render_text(&SessionSummary::normal("meiji", 7, 10, false));
        assert!(!text.contains("Genre cleared!"));
    }

    #[test]
    fn gauntlet_result_reports_survived_count() {
        let text = render_text(&SessionSummary::Gauntlet {
            survived: 3,
            total: 8,
        });
        assert!(text.contains("fell in the gauntlet"));
        assert!(text.contains("Survived: 3"));
    }
}
