use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::bank::QuestionBank;
use crate::store::ledger::Ledger;
use crate::ui::theme::Theme;

/// Title screen: one entry per genre plus the gauntlet.
pub struct GenreMenu<'a> {
    pub bank: &'a QuestionBank,
    pub ledger: &'a Ledger,
    pub selected: usize,
    pub theme: &'a Theme,
}

impl<'a> GenreMenu<'a> {
    pub fn new(bank: &'a QuestionBank, ledger: &'a Ledger, selected: usize, theme: &'a Theme) -> Self {
        Self {
            bank,
            ledger,
            selected,
            theme,
        }
    }
}

impl Widget for GenreMenu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let all_cleared = self.ledger.all_cleared(self.bank);
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(if all_cleared { 2 } else { 0 }),
                Constraint::Min(0),
            ])
            .split(inner);

        let title_lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "histquiz",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Modern History Trivia",
                Style::default().fg(colors.fg()),
            )),
        ];
        Paragraph::new(title_lines)
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        if all_cleared {
            Paragraph::new(Line::from(Span::styled(
                "Every route cleared! The gauntlet awaits.",
                Style::default()
                    .fg(colors.cleared())
                    .add_modifier(Modifier::BOLD),
            )))
            .alignment(Alignment::Center)
            .render(layout[1], buf);
        }

        let entries = self.bank.genres.len() + 1;
        let menu_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints((0..entries).map(|_| Constraint::Length(3)).collect::<Vec<_>>())
            .split(layout[2]);

        for (i, genre) in self.bank.genres.iter().enumerate() {
            let is_selected = i == self.selected;
            let cleared = self.ledger.is_cleared(&genre.id);
            let indicator = if is_selected { ">" } else { " " };
            let badge = if cleared { " \u{2605} cleared" } else { "" };

            let label = format!(" {indicator} [{}] {}", i + 1, genre.name);
            let detail = format!(
                "     {} ({} questions)",
                genre.description,
                genre.questions.len()
            );

            let label_style = Style::default()
                .fg(if is_selected { colors.accent() } else { colors.fg() })
                .add_modifier(if is_selected { Modifier::BOLD } else { Modifier::empty() });

            let lines = vec![
                Line::from(vec![
                    Span::styled(label, label_style),
                    Span::styled(badge, Style::default().fg(colors.cleared())),
                ]),
                Line::from(Span::styled(detail, Style::default().fg(colors.muted()))),
            ];
            if i < menu_layout.len() {
                Paragraph::new(lines).render(menu_layout[i], buf);
            }
        }

        let gauntlet_idx = self.bank.genres.len();
        let is_selected = self.selected == gauntlet_idx;
        let indicator = if is_selected { ">" } else { " " };
        let lines = vec![
            Line::from(Span::styled(
                format!(" {indicator} [g] The Gauntlet"),
                Style::default()
                    .fg(colors.gauntlet())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "     Every question you ever missed. How many can you survive? (count unknown)",
                Style::default().fg(colors.muted()),
            )),
        ];
        if gauntlet_idx < menu_layout.len() {
            Paragraph::new(lines).render(menu_layout[gauntlet_idx], buf);
        }
    }
}
