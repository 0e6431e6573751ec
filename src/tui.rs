// tui.rs

use crate::app::{App, InputMode, Op, OpResult};
use crate::client::TodoApiClient;
use crate::deadline::{format_deadline, is_overdue};
use chrono::Local;
use crossterm::event::{self, Event as CEvent, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    Terminal,
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};
use std::io;
use std::thread;
use std::time::Duration;
use textwrap::wrap;

pub fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    client: &TodoApiClient,
) -> io::Result<()>
where
    std::io::Error: From<<B as Backend>::Error>,
{
    app.request_refresh();

    loop {
        // apply finished operations, then hand queued ones to workers
        app.drain_inbound();
        dispatch_pending_ops(app, client);
        terminal.draw(|f| ui(f, app))?;

        if crossterm::event::poll(Duration::from_millis(100))? {
            if let CEvent::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                match app.input_mode {
                    InputMode::Normal => match key.code {
                        KeyCode::Char('q') => return Ok(()),
                        KeyCode::Char('a') => {
                            app.begin_add();
                        }
                        KeyCode::Char('e') => {
                            app.begin_edit_selected();
                        }
                        KeyCode::Char('d') => {
                            app.request_toggle_selected();
                        }
                        // Delete selected todo (Shift+R only)
                        KeyCode::Char('r') | KeyCode::Char('R')
                            if key.modifiers.contains(KeyModifiers::SHIFT) =>
                        {
                            app.request_delete_selected();
                        }
                        KeyCode::Char('S') => {
                            app.request_refresh();
                        }
                        KeyCode::Down => {
                            if app.selected < app.todos.len().saturating_sub(1) {
                                app.selected += 1;
                            }
                        }
                        KeyCode::Up => {
                            if app.selected > 0 {
                                app.selected -= 1;
                            }
                        }
                        _ => {}
                    },
                    InputMode::AddingText => match key.code {
                        KeyCode::Enter => {
                            app.input_mode = InputMode::AddingDeadline;
                        }
                        KeyCode::Esc => {
                            app.input_mode = InputMode::Normal;
                        }
                        KeyCode::Char(c) => {
                            app.input_text.push(c);
                        }
                        KeyCode::Backspace => {
                            app.input_text.pop();
                        }
                        _ => {}
                    },
                    InputMode::AddingDeadline => match key.code {
                        KeyCode::Enter => match app.submit_add() {
                            Ok(_) => app.input_mode = InputMode::Normal,
                            Err(e) => app.error_message = Some(e),
                        },
                        KeyCode::Esc => {
                            app.input_mode = InputMode::Normal;
                        }
                        KeyCode::Char(c) => {
                            app.input_deadline.push(c);
                        }
                        KeyCode::Backspace => {
                            app.input_deadline.pop();
                        }
                        _ => {}
                    },
                    InputMode::EditingText => match key.code {
                        KeyCode::Enter => {
                            app.input_mode = InputMode::EditingDeadline;
                        }
                        KeyCode::Esc => {
                            app.cancel_edit();
                        }
                        KeyCode::Char(c) => {
                            if let Some(item) = app.editing_item() {
                                item.draft_text.push(c);
                            }
                        }
                        KeyCode::Backspace => {
                            if let Some(item) = app.editing_item() {
                                item.draft_text.pop();
                            }
                        }
                        _ => {}
                    },
                    InputMode::EditingDeadline => match key.code {
                        KeyCode::Enter => {
                            if let Err(e) = app.save_edit() {
                                app.error_message = Some(e);
                            }
                        }
                        KeyCode::Esc => {
                            app.cancel_edit();
                        }
                        KeyCode::Char(c) => {
                            if let Some(item) = app.editing_item() {
                                item.draft_deadline.push(c);
                            }
                        }
                        KeyCode::Backspace => {
                            if let Some(item) = app.editing_item() {
                                item.draft_deadline.pop();
                            }
                        }
                        _ => {}
                    },
                }
            }
        }
    }
}

/// Run each queued operation on its own worker thread. Results come back
/// through the app's channel and are applied by `drain_inbound`.
fn dispatch_pending_ops(app: &mut App, client: &TodoApiClient) {
    for op in app.take_pending_ops() {
        let client = client.clone();
        let tx = app.results_sender();
        thread::spawn(move || {
            let result = match op {
                Op::Refresh => OpResult::Loaded(client.fetch_todos()),
                Op::Create { text, deadline } => {
                    OpResult::Created(client.create_todo(&text, deadline.as_deref()))
                }
                Op::Toggle { id, done } => OpResult::Toggled {
                    id,
                    result: client.toggle_done(id, done),
                },
                Op::Delete { id } => OpResult::Deleted {
                    id,
                    result: client.delete_todo(id),
                },
                Op::SaveEdits { id, text, deadline } => OpResult::Saved {
                    id,
                    result: client.save_edits(id, &text, &deadline),
                },
            };
            let _ = tx.send(result);
        });
    }
}

fn ui(f: &mut ratatui::Frame<'_>, app: &App) {
    let size = f.area();

    let mut constraints = vec![
        Constraint::Length(3), // title
        Constraint::Length(3), // help
        Constraint::Min(1),    // todo list
    ];
    let needs_input = matches!(
        app.input_mode,
        InputMode::AddingText
            | InputMode::AddingDeadline
            | InputMode::EditingText
            | InputMode::EditingDeadline
    );
    if needs_input {
        constraints.push(Constraint::Length(3)); // one input line only
    }
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(constraints)
        .split(size);

    let mut title_text = "Todos".to_string();
    if app.pending_ops_len() > 0 {
        title_text = format!("{} ⇅{}", title_text, app.pending_ops_len());
    }
    let title = Paragraph::new(Line::from(Span::styled(
        title_text,
        Style::default().add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let b = Style::default().add_modifier(Modifier::BOLD);
    let help = Paragraph::new(vec![
        Line::from(vec![
            Span::raw("Press "),
            Span::styled("a", b),
            Span::raw(" add, "),
            Span::styled("e", b),
            Span::raw(" edit, "),
            Span::styled("d", b),
            Span::raw(" done, "),
            Span::raw("Shift+"),
            Span::styled("R", b),
            Span::raw(" delete, "),
            Span::styled("S", b),
            Span::raw(" refresh, "),
            Span::styled("q", b),
            Span::raw(" quit"),
        ]),
        Line::from(vec![
            Span::styled("Enter", b),
            Span::raw(" next field / save, "),
            Span::styled("Esc", b),
            Span::raw(" cancel"),
        ]),
    ])
    .alignment(Alignment::Center);
    f.render_widget(help, chunks[1]);

    let list_area = chunks[2];
    let inner_width = list_area.width.saturating_sub(2) as usize; // minus left/right borders
    let now = Local::now();

    let todos: Vec<ListItem> = app
        .todos
        .iter()
        .map(|t| {
            let busy = app.item_ref(t.id).map(|s| s.is_busy()).unwrap_or(false);
            let overdue = t
                .deadline
                .as_deref()
                .map(|d| is_overdue(d, now))
                .unwrap_or(false);

            let status = if t.done { "[x]" } else { "[ ]" };

            let desc_color = if busy {
                Color::DarkGray
            } else if t.done {
                Color::Green
            } else if overdue {
                Color::Red
            } else {
                Color::Yellow
            };

            // Build a single visible string, then soft-wrap to list width
            let mut text = format!("{} {}", status, t.text);
            if let Some(due) = t.deadline.as_deref() {
                text.push_str(&format!(" (Due: {})", format_deadline(due, now)));
            }
            if busy {
                text.push('…');
            }

            let mut style = Style::default().fg(desc_color);
            if t.done {
                style = style.add_modifier(Modifier::CROSSED_OUT);
            }

            let wrapped = wrap(&text, inner_width.max(1));
            let lines: Vec<Line> = wrapped
                .iter()
                .map(|w| Line::from(Span::styled(w.to_string(), style)))
                .collect();
            ListItem::new(lines)
        })
        .collect();

    let mut list_state = ratatui::widgets::ListState::default();
    if !todos.is_empty() {
        list_state.select(Some(app.selected.min(todos.len() - 1)));
    }

    let todos_list = List::new(todos)
        .block(Block::default().borders(Borders::ALL).title("Todos"))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");

    f.render_stateful_widget(todos_list, chunks[2], &mut list_state);

    // Optional single-line input at bottom (only when adding or editing)
    if needs_input {
        let last = chunks.len() - 1;
        let caret = "|";
        let style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
        let (value, input_title) = match app.input_mode {
            InputMode::AddingText => (app.input_text.as_str(), "Description"),
            InputMode::AddingDeadline => (app.input_deadline.as_str(), "Due (optional)"),
            InputMode::EditingText => (
                app.editing_id
                    .and_then(|id| app.item_ref(id))
                    .map(|i| i.draft_text.as_str())
                    .unwrap_or(""),
                "Edit Description",
            ),
            InputMode::EditingDeadline => (
                app.editing_id
                    .and_then(|id| app.item_ref(id))
                    .map(|i| i.draft_deadline.as_str())
                    .unwrap_or(""),
                "Edit Due (empty clears)",
            ),
            InputMode::Normal => ("", ""),
        };
        let text = if value.is_empty() {
            caret.to_string()
        } else {
            format!("{}{}", value, caret)
        };
        let widget = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title(input_title))
            .style(style)
            .wrap(Wrap { trim: true });
        f.render_widget(widget, chunks[last]);
    }

    // Non-blocking warning when saving would drop an existing deadline
    let clearing = app
        .editing_id
        .and_then(|id| app.item_ref(id))
        .map(|i| i.clears_deadline())
        .unwrap_or(false);
    if clearing {
        let warning = Paragraph::new("Saving will remove the deadline")
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center);
        let area = ratatui::layout::Rect {
            x: size.x,
            y: size.height.saturating_sub(3),
            width: size.width,
            height: 1,
        };
        f.render_widget(warning, area);
    }

    // Show error message if any
    if let Some(ref msg) = app.error_message {
        let error = Paragraph::new(msg.as_str())
            .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center);
        let area = ratatui::layout::Rect {
            x: size.x,
            y: size.height.saturating_sub(2),
            width: size.width,
            height: 1,
        };
        f.render_widget(error, area);
    }
}
