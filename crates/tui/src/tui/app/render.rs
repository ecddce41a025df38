use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs, Wrap};
use ratatui::Frame;

use crate::tui::constants::APP_VERSION;
use crate::tui::filters::{tab_index, STATUS_TABS};
use crate::tui::helpers::{build_help_lines, centered_rect, format_datetime, short_id};

use super::{App, ConfirmChoice, FormField, InputMode};

impl App {
    pub(crate) fn draw(&mut self, f: &mut Frame<'_>) {
        let size = f.size();
        f.render_widget(Clear, size);
        f.render_widget(
            Block::default().style(Style::default().bg(self.palette.bg_base)),
            size,
        );
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(5),
                Constraint::Length(1),
            ])
            .split(size);

        self.draw_header(f, chunks[0]);
        self.draw_tabs(f, chunks[1]);
        self.draw_search(f, chunks[2]);
        self.draw_tasks(f, chunks[3]);
        self.draw_footer(f, chunks[4]);

        match self.input_mode {
            InputMode::Add | InputMode::Edit => self.draw_form_overlay(f, size),
            InputMode::Help => self.draw_help_overlay(f, size),
            InputMode::ConfirmDelete => self.draw_confirm_overlay(f, size),
            InputMode::Normal | InputMode::Search => {}
        }
    }

    fn draw_header(&self, f: &mut Frame<'_>, area: Rect) {
        let palette = &self.palette;
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(area);

        let mut left = vec![
            Span::styled(
                format!(" todomaster v{} ", APP_VERSION),
                Style::default()
                    .fg(palette.success)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(self.base_url.clone(), Style::default().fg(palette.fg_muted)),
        ];
        if self.snapshot.loading {
            left.push(Span::raw("  "));
            left.push(Span::styled(
                "⟳ loading",
                Style::default().fg(palette.fg_accent),
            ));
        } else if self.busy {
            left.push(Span::raw("  "));
            left.push(Span::styled(
                "saving…",
                Style::default().fg(palette.fg_muted),
            ));
        }
        f.render_widget(
            Paragraph::new(Line::from(left)).style(Style::default().bg(palette.bg_base)),
            cols[0],
        );

        let badge = if self.snapshot.online {
            Span::styled(
                "● Online ",
                Style::default()
                    .fg(palette.success)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(
                "● Offline ",
                Style::default()
                    .fg(palette.error)
                    .add_modifier(Modifier::BOLD),
            )
        };
        f.render_widget(
            Paragraph::new(Line::from(badge))
                .alignment(Alignment::Right)
                .style(Style::default().bg(palette.bg_base)),
            cols[1],
        );
    }

    fn draw_tabs(&self, f: &mut Frame<'_>, area: Rect) {
        let palette = &self.palette;
        let counts = self.snapshot.counts;
        let titles: Vec<Line> = STATUS_TABS
            .iter()
            .map(|tab| Line::from(tab.title(&counts)))
            .collect();
        let tabs = Tabs::new(titles)
            .select(tab_index(self.snapshot.filter.status))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(palette.accent_title("Tasks"))
                    .border_style(Style::default().fg(palette.fg_muted))
                    .style(Style::default().bg(palette.bg_panel).fg(palette.fg_text)),
            )
            .highlight_style(
                Style::default()
                    .fg(palette.success)
                    .bg(palette.bg_accent)
                    .add_modifier(Modifier::BOLD),
            );
        f.render_widget(tabs, area);
    }

    fn draw_search(&self, f: &mut Frame<'_>, area: Rect) {
        let palette = &self.palette;
        let searching = self.input_mode == InputMode::Search;
        let line = if self.search.as_str().is_empty() && !searching {
            Line::from(Span::styled(
                " Press / to search",
                Style::default().fg(palette.fg_muted),
            ))
        } else {
            Line::from(vec![
                Span::styled(" 🔍 ", Style::default().fg(palette.fg_accent)),
                Span::styled(
                    self.search.as_str().to_string(),
                    Style::default()
                        .fg(palette.fg_text)
                        .add_modifier(Modifier::BOLD),
                ),
            ])
        };
        f.render_widget(
            Paragraph::new(line).style(Style::default().bg(palette.bg_base)),
            area,
        );
        if searching {
            let x = area.x + 4 + self.search.cursor_column() as u16;
            f.set_cursor(x.min(area.right().saturating_sub(1)), area.y);
        }
    }

    fn draw_tasks(&mut self, f: &mut Frame<'_>, area: Rect) {
        let palette = self.palette;
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.fg_muted))
            .style(Style::default().bg(palette.bg_panel).fg(palette.fg_text));

        if let Some(empty) = self.snapshot.empty_state() {
            let inner = block.inner(area);
            f.render_widget(block, area);
            if inner.width == 0 || inner.height == 0 {
                return;
            }
            let lines = vec![
                Line::from(Span::styled(
                    empty.headline(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    empty.hint(),
                    Style::default().fg(palette.fg_muted),
                )),
            ];
            let height = (lines.len() as u16).min(inner.height);
            let content = centered_rect(inner.width.min(80), height, inner);
            f.render_widget(
                Paragraph::new(lines)
                    .wrap(Wrap { trim: true })
                    .alignment(Alignment::Center),
                content,
            );
            return;
        }

        let header = Row::new(vec![
            Cell::from(""),
            Cell::from("Title"),
            Cell::from("Description"),
            Cell::from("Created"),
            Cell::from("ID"),
        ])
        .style(Style::default().add_modifier(Modifier::BOLD));

        let rows: Vec<Row> = self
            .snapshot
            .tasks
            .iter()
            .map(|task| {
                let (mark, style) = if task.completed {
                    (
                        "✓",
                        Style::default()
                            .fg(palette.fg_muted)
                            .add_modifier(Modifier::CROSSED_OUT),
                    )
                } else {
                    ("○", Style::default())
                };
                Row::new(vec![
                    Cell::from(mark),
                    Cell::from(task.title.clone()),
                    Cell::from(task.description.clone()),
                    Cell::from(format_datetime(&task.created_at)),
                    Cell::from(short_id(&task.id)),
                ])
                .style(style)
            })
            .collect();

        let widths = [
            Constraint::Length(2),
            Constraint::Percentage(35),
            Constraint::Percentage(40),
            Constraint::Length(16),
            Constraint::Length(8),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .highlight_style(
                Style::default()
                    .fg(palette.warning)
                    .bg(palette.bg_accent)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        f.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn draw_footer(&self, f: &mut Frame<'_>, area: Rect) {
        let palette = &self.palette;
        let line = match &self.status {
            Some(status) => Line::from(Span::styled(
                format!(" {}", status.text),
                status.style(palette),
            )),
            None => Line::from(Span::styled(
                " a add • e edit • space toggle • x delete • / search • r reload • t theme • h help • q quit",
                Style::default().fg(palette.fg_muted),
            )),
        };
        f.render_widget(
            Paragraph::new(line).style(Style::default().bg(palette.bg_base)),
            area,
        );
    }

    fn draw_form_overlay(&self, f: &mut Frame<'_>, area: Rect) {
        let palette = &self.palette;
        let popup = centered_rect(area.width.saturating_sub(10).min(72), 10, area);
        f.render_widget(Clear, popup);

        let title = if self.input_mode == InputMode::Edit {
            "Edit task"
        } else {
            "New task"
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(palette.accent_title(title))
            .border_style(Style::default().fg(palette.fg_accent))
            .style(Style::default().bg(palette.bg_panel).fg(palette.fg_text));
        let inner = block.inner(popup);
        f.render_widget(block, popup);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(inner);

        let fields = [
            (FormField::Title, "Title", &self.form.title, rows[0]),
            (
                FormField::Description,
                "Description",
                &self.form.description,
                rows[1],
            ),
        ];
        for (field, label, buffer, rect) in fields {
            let focused = self.form.focus == field;
            let border = if focused {
                palette.fg_accent
            } else {
                palette.fg_muted
            };
            let label = format!(
                "{} ({}/{})",
                label,
                buffer.char_count(),
                buffer.max_chars()
            );
            let input = Paragraph::new(buffer.as_str().to_string()).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(label)
                    .border_style(Style::default().fg(border)),
            );
            f.render_widget(input, rect);
            if focused && rect.width > 2 {
                let max_x = rect.right().saturating_sub(2);
                let x = (rect.x + 1 + buffer.cursor_column() as u16).min(max_x);
                f.set_cursor(x, rect.y + 1);
            }
        }

        if self.form.submitting {
            f.render_widget(
                Paragraph::new(Span::styled("Saving…", Style::default().fg(palette.fg_muted))),
                rows[2],
            );
        }
    }

    fn draw_help_overlay(&self, f: &mut Frame<'_>, area: Rect) {
        let palette = &self.palette;
        let entries = build_help_lines();
        let height = (entries.len() as u16).saturating_add(2);
        let popup = centered_rect(60, height, area);
        f.render_widget(Clear, popup);

        let lines: Vec<Line> = entries
            .into_iter()
            .map(|(keys, action)| {
                Line::from(vec![
                    Span::styled(
                        format!("{keys:<26}"),
                        Style::default()
                            .fg(palette.fg_accent)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(action),
                ])
            })
            .collect();
        let help = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(palette.accent_title("Keys"))
                .style(Style::default().bg(palette.bg_panel).fg(palette.fg_text)),
        );
        f.render_widget(help, popup);
    }

    fn draw_confirm_overlay(&self, f: &mut Frame<'_>, area: Rect) {
        let palette = &self.palette;
        let popup = centered_rect(50, 6, area);
        f.render_widget(Clear, popup);

        let title = self
            .pending_delete
            .as_ref()
            .map(|task| task.title.as_str())
            .unwrap_or_default();
        let choice_style = |choice: ConfirmChoice| {
            if self.confirm_choice == choice {
                Style::default()
                    .fg(palette.bg_base)
                    .bg(palette.warning)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(palette.fg_muted)
            }
        };
        let lines = vec![
            Line::from(format!("Delete \"{title}\"?")),
            Line::from(""),
            Line::from(vec![
                Span::styled(" Yes ", choice_style(ConfirmChoice::Yes)),
                Span::raw("   "),
                Span::styled(" No ", choice_style(ConfirmChoice::No)),
            ]),
        ];
        let dialog = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(palette.accent_title("Confirm"))
                    .border_style(Style::default().fg(palette.error))
                    .style(Style::default().bg(palette.bg_panel).fg(palette.fg_text)),
            );
        f.render_widget(dialog, popup);
    }
}
