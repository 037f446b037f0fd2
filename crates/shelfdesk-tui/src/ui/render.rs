use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use shelfdesk_core::utils::{format_minutes, mask, truncate_string};

use crate::app::{App, AppState, FieldId, FormItem, Tab};

use super::styles;

/// Width of the form pane, including borders
const FORM_PANE_WIDTH: u16 = 52;

/// Visible characters of a field value
const FIELD_WIDTH: usize = 24;

const ALERT_WIDTH: u16 = 64;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame);
    }

    if let Some(alert) = app.alerts.front() {
        render_alert_overlay(frame, alert, app.alerts.len());
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  shelfdesk";
    let right = format!("{}  [F1] Help", app.client.base_url());
    let title_len = title.len();

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize).saturating_sub(title_len + right.chars().count() + 4),
        )),
        Span::styled(right, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for (i, tab) in Tab::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        let label = format!("[{}] {}", i + 1, tab.title());
        if *tab == app.current_tab {
            spans.push(Span::styled(label, styles::tab_style(true)));
        } else {
            spans.push(Span::styled(label, styles::muted_style()));
        }
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(FORM_PANE_WIDTH), Constraint::Min(20)])
        .split(area);

    render_form(frame, app, chunks[0]);
    render_result_panel(frame, app, chunks[1]);
}

/// Tail of a field value that fits the field box, masked when secret
fn field_display(field: FieldId, value: &str) -> String {
    if field.is_secret() {
        return mask(value, FIELD_WIDTH);
    }
    let count = value.chars().count();
    if count <= FIELD_WIDTH {
        value.to_string()
    } else {
        value.chars().skip(count - FIELD_WIDTH).collect()
    }
}

fn render_form(frame: &mut Frame, app: &App, area: Rect) {
    let tab = app.current_tab;
    let label_width = tab
        .fields()
        .iter()
        .map(|f| f.label().len())
        .max()
        .unwrap_or(0);

    let mut lines = vec![Line::from("")];

    for index in 0..tab.item_count() {
        let focused = index == app.focus;
        let item_style = if focused {
            styles::selected_style()
        } else {
            styles::list_item_style()
        };

        match tab.item(index) {
            Some(FormItem::Field(field)) => {
                let value = app.field(field);
                let cursor = if focused { "▌" } else { "" };
                let mut spans = vec![
                    Span::styled(
                        format!(" {:>width$}: [", field.label(), width = label_width),
                        styles::muted_style(),
                    ),
                ];
                if value.is_empty() && !focused {
                    let hint = field.hint().unwrap_or("");
                    spans.push(Span::styled(
                        format!("{:<width$}", truncate_string(hint, FIELD_WIDTH), width = FIELD_WIDTH),
                        styles::muted_style(),
                    ));
                } else {
                    spans.push(Span::styled(
                        format!("{}{}", field_display(field, value), cursor),
                        item_style,
                    ));
                }
                spans.push(Span::styled("]", styles::muted_style()));
                lines.push(Line::from(spans));
            }
            Some(FormItem::Button(action)) => {
                if index == tab.fields().len() && !tab.fields().is_empty() {
                    lines.push(Line::from(""));
                }
                let label = if focused {
                    format!(" ▶ {} ◀ ", action.label())
                } else {
                    format!("   {}   ", action.label())
                };
                lines.push(Line::from(vec![
                    Span::raw("   ["),
                    Span::styled(label, item_style),
                    Span::raw("]"),
                ]));
            }
            None => {}
        }
    }

    let block = Block::default()
        .title(format!(" {} ", tab.title()))
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}

fn render_result_panel(frame: &mut Frame, app: &App, area: Rect) {
    let sink = app.current_tab.sink();
    let text = app.panel(sink);

    let block = Block::default()
        .title(format!(" {} ", sink.title()))
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let paragraph = if text.is_empty() {
        Paragraph::new(Line::from(Span::styled(
            " Nothing yet",
            styles::muted_style(),
        )))
    } else {
        Paragraph::new(text)
            .style(styles::list_item_style())
            .wrap(Wrap { trim: false })
            .scroll((app.result_scroll, 0))
    };

    frame.render_widget(paragraph.block(block), area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (session_text, session_style) = match &app.session {
        Some(data) if data.is_expired() => (
            " Token probably expired, log in again ".to_string(),
            styles::error_style(),
        ),
        Some(data) => {
            let who = data
                .user
                .as_ref()
                .map(|u| u.display_name())
                .unwrap_or_else(|| "logged in".to_string());
            (
                format!(
                    " {} | token expires in {} ",
                    who,
                    format_minutes(data.minutes_until_expiry())
                ),
                styles::success_style(),
            )
        }
        None => (" Not logged in ".to_string(), styles::muted_style()),
    };

    let mut right_text = String::new();
    if let Some(ref msg) = app.status_message {
        right_text.push_str(&format!(" {} |", msg));
    }
    if app.in_flight > 0 {
        right_text.push_str(&format!(" {} running |", app.in_flight));
    }
    right_text.push_str(" [Esc] quit ");

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(session_text.chars().count())
        .saturating_sub(right_text.chars().count());

    let status_line = Line::from(vec![
        Span::styled(session_text, session_style),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 20, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled("  shelfdesk", styles::title_style())),
        Line::from(Span::styled(
            format!("  version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_line("←/→", "Prev/next tab"),
        help_line("1-6", "Switch tabs (on a button)"),
        help_line("Tab/↑/↓", "Move between fields and buttons"),
        help_line("PgUp/PgDn", "Scroll the result panel"),
        Line::from(""),
        Line::from(Span::styled(" Editing", styles::highlight_style())),
        help_line("Enter", "Next field / press button"),
        help_line("Ctrl+U", "Clear the focused field"),
        help_line("Esc", "Quit"),
        help_line("q", "Quit (on a button)"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("F1", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(help_text).block(block);

    frame.render_widget(paragraph, area);
}

/// Hard-wrap `text` to `width` columns, one entry per screen row
fn wrap_rows(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();
    for line in text.lines() {
        let chars: Vec<char> = line.chars().collect();
        if chars.is_empty() {
            rows.push(String::new());
        }
        for chunk in chars.chunks(width) {
            rows.push(chunk.iter().collect());
        }
    }
    if rows.is_empty() {
        rows.push(String::new());
    }
    rows
}

/// Rows that fit in `max_rows`; an overflowing alert ends with a note
/// counting the rows left out.
fn fit_alert_rows(mut rows: Vec<String>, max_rows: usize) -> Vec<String> {
    if rows.len() <= max_rows {
        return rows;
    }
    let kept = max_rows.saturating_sub(1);
    let hidden = rows.len() - kept;
    rows.truncate(kept);
    if max_rows > 0 {
        rows.push(format!("... ({} more lines)", hidden));
    }
    rows
}

fn render_alert_overlay(frame: &mut Frame, alert: &str, pending: usize) {
    // Borders plus the blank line and footer under the text
    const CHROME_ROWS: usize = 4;

    let frame_area = frame.area();
    let width = ALERT_WIDTH.min(frame_area.width);
    let inner_width = (width as usize).saturating_sub(3);
    let max_height = frame_area.height.saturating_sub(2) as usize;

    let rows = wrap_rows(alert, inner_width);
    let height = rows.len().saturating_add(CHROME_ROWS).min(max_height);
    let rows = fit_alert_rows(rows, height.saturating_sub(CHROME_ROWS));
    let area = centered_rect_fixed(width, height as u16, frame_area);

    frame.render_widget(Clear, area);

    let mut lines: Vec<Line> = rows
        .into_iter()
        .map(|row| Line::from(Span::styled(format!(" {}", row), styles::list_item_style())))
        .collect();
    lines.push(Line::from(""));
    let mut footer = vec![
        Span::styled(" Press ", styles::muted_style()),
        Span::styled("Enter", styles::help_key_style()),
        Span::styled(" to dismiss", styles::muted_style()),
    ];
    if pending > 1 {
        footer.push(Span::styled(
            format!(" ({} more)", pending - 1),
            styles::muted_style(),
        ));
    }
    lines.push(Line::from(footer));

    let block = Block::default()
        .title(" Alert ")
        .borders(Borders::ALL)
        .border_style(styles::alert_border_style())
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 7, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
    use shelfdesk_core::{Config, SessionClient};

    #[test]
    fn test_field_display_keeps_tail() {
        assert_eq!(field_display(FieldId::Title, "Dom Casmurro"), "Dom Casmurro");
        let long = "abcdefghijklmnopqrstuvwxyz0123";
        assert_eq!(field_display(FieldId::Title, long), &long[6..]);
    }

    #[test]
    fn test_field_display_masks_password() {
        assert_eq!(field_display(FieldId::Password, "hunter2"), "*******");
    }

    #[test]
    fn test_wrap_rows_splits_long_lines() {
        assert_eq!(wrap_rows("abcdef\n\nxy", 4), vec!["abcd", "ef", "", "xy"]);
        assert_eq!(wrap_rows("", 10), vec![""]);
    }

    #[test]
    fn test_fit_alert_rows_notes_hidden_rows() {
        let rows: Vec<String> = (0..10).map(|i| i.to_string()).collect();
        assert_eq!(fit_alert_rows(rows.clone(), 10).len(), 10);

        let fitted = fit_alert_rows(rows, 4);
        assert_eq!(fitted, vec!["0", "1", "2", "... (7 more lines)"]);
    }

    fn draw(app: &App, width: u16, height: u16) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        terminal.backend().buffer().clone()
    }

    fn buffer_text(buffer: &Buffer) -> String {
        let area = buffer.area;
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn test_app() -> App {
        let client = SessionClient::new("http://127.0.0.1:9/api").unwrap();
        App::with_client(Config::default(), client)
    }

    #[test]
    fn test_huge_alert_is_clipped_with_note() {
        let mut app = test_app();
        app.alerts.push_back("x\n".repeat(65533));

        let text = buffer_text(&draw(&app, 80, 24));
        assert!(text.contains("more lines)"));
        assert!(text.contains("to dismiss"));
    }

    #[test]
    fn test_alert_on_tiny_terminal() {
        let mut app = test_app();
        app.alerts.push_back("Empréstimo não encontrado.".repeat(40));
        draw(&app, 10, 3);
    }

    #[test]
    fn test_short_alert_shown_whole() {
        let mut app = test_app();
        app.alerts.push_back("Please log in first!".to_string());

        let text = buffer_text(&draw(&app, 80, 24));
        assert!(text.contains("Please log in first!"));
        assert!(!text.contains("more lines"));
    }

    #[test]
    fn test_status_bar_quit_hint_names_esc() {
        let app = test_app();
        let text = buffer_text(&draw(&app, 120, 30));
        assert!(text.contains("[Esc] quit"));
        assert!(text.contains("Not logged in"));
    }

    #[test]
    fn test_centered_rect_clamped() {
        let outer = Rect::new(0, 0, 40, 10);
        let rect = centered_rect_fixed(64, 20, outer);
        assert_eq!(rect.width, 40);
        assert_eq!(rect.height, 10);
        let rect = centered_rect_fixed(20, 4, outer);
        assert_eq!((rect.x, rect.y), (10, 3));
    }
}
