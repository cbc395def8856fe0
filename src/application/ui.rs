use std::io;

use anyhow::Result;
use crossterm::cursor;
use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableMouseCapture;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use ratatui::backend::CrosstermBackend;
use ratatui::prelude::*;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::List;
use ratatui::widgets::ListItem;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Wrap;
use ratatui::Terminal;
use tokio::sync::mpsc;

use crate::domain::models::crew_text;
use crate::domain::models::help_text;
use crate::domain::models::Action;
use crate::domain::models::AgentStatus;
use crate::domain::models::Author;
use crate::domain::models::Event;
use crate::domain::models::GenerationUpdate;
use crate::domain::models::Loading;
use crate::domain::models::Message;
use crate::domain::models::MessageType;
use crate::domain::models::SlashCommand;
use crate::domain::models::TextArea;
use crate::domain::services::events::EventsService;
use crate::domain::services::SessionState;
use crate::domain::services::Transcript;
use crate::infrastructure::stores::FileStore;

const SPINNER: [&str; 4] = ["◐", "◓", "◑", "◒"];

#[derive(Default)]
struct View {
    transcript: Transcript,
    loading: Loading,
    show_code: bool,
    code_scroll: u16,
    tick: usize,
}

fn render_agents<B: Backend>(
    frame: &mut Frame<B>,
    rect: Rect,
    session: &SessionState,
    tick: usize,
) {
    let items = session
        .tracker()
        .into_iter()
        .map(|progress| {
            let (icon, color) = match progress.status {
                AgentStatus::Pending => ("○", Color::DarkGray),
                AgentStatus::Working => (SPINNER[tick % SPINNER.len()], Color::Yellow),
                AgentStatus::Complete => ("●", Color::Green),
                AgentStatus::Error => ("✖", Color::Red),
            };

            return ListItem::new(vec![
                Line::from(vec![
                    Span::styled(format!("{icon} "), Style::default().fg(color)),
                    Span::styled(
                        progress.agent_name.to_string(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(Span::styled(
                    format!("  {}", progress.message),
                    Style::default().fg(Color::DarkGray),
                )),
            ]);
        })
        .collect::<Vec<ListItem>>();

    frame.render_widget(
        List::new(items).block(Block::default().borders(Borders::ALL).title("Crew")),
        rect,
    );
}

fn render_history<B: Backend>(frame: &mut Frame<B>, rect: Rect, session: &SessionState) {
    let mut items = session
        .history
        .projects()
        .iter()
        .enumerate()
        .map(|(idx, project)| {
            let prompt = project.prompt.replace('\n', " ");
            return ListItem::new(format!("({}) {prompt}", idx + 1));
        })
        .collect::<Vec<ListItem>>();

    if items.is_empty() {
        items.push(ListItem::new(Span::styled(
            "No apps yet",
            Style::default().fg(Color::DarkGray),
        )));
    }

    frame.render_widget(
        List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title("History (/history N)"),
        ),
        rect,
    );
}

fn render_code<B: Backend>(frame: &mut Frame<B>, rect: Rect, session: &SessionState, scroll: u16) {
    let code = if session.artifact.is_empty() {
        "Nothing generated yet."
    } else {
        session.artifact.as_str()
    };

    frame.render_widget(
        Paragraph::new(code)
            .block(Block::default().borders(Borders::ALL).title("Code"))
            .scroll((scroll, 0)),
        rect,
    );
}

fn render<B: Backend>(
    frame: &mut Frame<B>,
    session: &SessionState,
    view: &mut View,
    textarea: &tui_textarea::TextArea,
) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Length(36), Constraint::Min(1)])
        .split(frame.size());

    let sidebar = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(10), Constraint::Min(1)])
        .split(columns[0]);
    render_agents(frame, sidebar[0], session, view.tick);
    render_history(frame, sidebar[1], session);

    let mut main_constraints = vec![Constraint::Min(1), Constraint::Max(4)];
    if session.config_error.is_some() {
        main_constraints.insert(0, Constraint::Length(4));
    }
    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints(main_constraints)
        .split(columns[1]);

    let mut idx = 0;
    if let Some(config_error) = &session.config_error {
        frame.render_widget(
            Paragraph::new(config_error.as_str())
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title("Configuration error"),
                ),
            main[idx],
        );
        idx += 1;
    }

    let mut chat_rect = main[idx];
    if view.show_code {
        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(main[idx]);
        chat_rect = panes[0];
        render_code(frame, panes[1], session, view.code_scroll);
    }

    view.transcript.sync(&session.messages, chat_rect);
    view.transcript.render(frame, chat_rect);

    if session.is_generating() {
        view.loading.render(frame, main[idx + 1]);
    } else {
        frame.render_widget(textarea.widget(), main[idx + 1]);
    }
}

async fn write_preview(store: &FileStore, session: &mut SessionState) {
    if session.artifact.is_empty() {
        session
            .add_message(Message::new(
                Author::Assistant,
                "Nothing has been generated yet.",
            ))
            .await;
        return;
    }

    match store.write_preview(&session.artifact).await {
        Ok(path) => {
            session
                .add_message(Message::new(
                    Author::Assistant,
                    &format!(
                        "Preview written to {}. Open it in your browser.",
                        path.to_string_lossy()
                    ),
                ))
                .await;
        }
        Err(err) => {
            tracing::error!(error = ?err, "Failed to write preview");
            session
                .add_message(Message::new_with_type(
                    Author::Assistant,
                    MessageType::Error,
                    &format!("Failed to write the preview file: {err}"),
                ))
                .await;
        }
    }
}

/// Returns true when the loop should exit.
async fn handle_slash_command(
    command: &SlashCommand,
    session: &mut SessionState,
    view: &mut View,
    textarea: &mut tui_textarea::TextArea<'_>,
    preview_store: &FileStore,
    tx: &mpsc::UnboundedSender<Action>,
) -> Result<bool> {
    if command.is_quit() {
        return Ok(true);
    }

    if command.is_new_chat() {
        if let Err(err) = session.reset_conversation().await {
            session
                .add_message(Message::new_with_type(
                    Author::Assistant,
                    MessageType::Error,
                    &err.to_string(),
                ))
                .await;
        }
        view.code_scroll = 0;
    } else if command.is_copy() {
        tx.send(Action::CopyArtifact(session.artifact.to_string()))?;
    } else if command.is_toggle_code() {
        view.show_code = !view.show_code;
        view.code_scroll = 0;
    } else if command.is_preview() {
        write_preview(preview_store, session).await;
    } else if command.is_history() {
        let project = command
            .index_arg()
            .and_then(|idx| return session.history.get(idx - 1))
            .map(|project| return project.prompt.to_string());

        match project {
            Some(prompt) => *textarea = TextArea::with_text(&prompt),
            None => {
                session
                    .add_message(Message::new_with_type(
                        Author::Assistant,
                        MessageType::Error,
                        "Pick an app from the history sidebar, for example `/history 1`.",
                    ))
                    .await;
            }
        }
    } else if command.is_help() {
        session
            .add_message(Message::new(
                Author::Assistant,
                &format!("{}\n\nYour crew:\n{}", help_text(), crew_text()),
            ))
            .await;
    }

    return Ok(false);
}

async fn start_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    session: &mut SessionState,
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let mut events = EventsService::new(rx);
    let mut view = View::default();
    let mut textarea = TextArea::default();
    let preview_store = FileStore::from_config();

    #[cfg(feature = "dev")]
    {
        textarea = TextArea::with_text(
            "Build a todo app with categories, due dates and a dark mode toggle.",
        );
    }

    loop {
        terminal.draw(|frame| {
            render(frame, session, &mut view, &textarea);
        })?;

        match events.next().await? {
            Event::Generation { request_id, update } => {
                let finished = update == GenerationUpdate::Finished;
                if session.apply(&request_id, update).await && finished {
                    if let Err(err) = preview_store.write_preview(&session.artifact).await {
                        tracing::error!(error = ?err, "Failed to write preview");
                    }
                }
            }
            Event::KeyboardCharInput(input) => {
                if !session.is_generating() {
                    textarea.input(input);
                }
            }
            Event::KeyboardPaste(text) => {
                if !session.is_generating() {
                    for char in text.replace("\r\n", "\n").chars() {
                        if char == '\n' {
                            textarea.insert_newline();
                        } else {
                            textarea.insert_char(char);
                        }
                    }
                }
            }
            Event::KeyboardCTRLC() => {
                break;
            }
            Event::KeyboardEnter() => {
                if session.is_generating() {
                    continue;
                }

                let input_str = textarea.lines().join("\n");
                if input_str.trim().is_empty() {
                    continue;
                }
                textarea = TextArea::default();

                if let Some(command) = SlashCommand::parse(&input_str) {
                    let should_break = handle_slash_command(
                        &command,
                        session,
                        &mut view,
                        &mut textarea,
                        &preview_store,
                        &tx,
                    )
                    .await?;
                    if should_break {
                        break;
                    }
                    continue;
                }

                match session.submit(&input_str).await {
                    Ok(request) => {
                        tx.send(Action::GenerationRequest(request))?;
                    }
                    Err(err) => {
                        session
                            .add_message(Message::new_with_type(
                                Author::Assistant,
                                MessageType::Error,
                                &err.to_string(),
                            ))
                            .await;
                    }
                }
            }
            Event::Notice(text) => {
                session
                    .add_message(Message::new(Author::Assistant, &text))
                    .await;
            }
            Event::UIScrollDown() => {
                if view.show_code {
                    view.code_scroll = view.code_scroll.saturating_add(1);
                } else {
                    view.transcript.down();
                }
            }
            Event::UIScrollUp() => {
                if view.show_code {
                    view.code_scroll = view.code_scroll.saturating_sub(1);
                } else {
                    view.transcript.up();
                }
            }
            Event::UIScrollPageDown() => {
                if view.show_code {
                    view.code_scroll = view.code_scroll.saturating_add(10);
                } else {
                    view.transcript.down_page();
                }
            }
            Event::UIScrollPageUp() => {
                if view.show_code {
                    view.code_scroll = view.code_scroll.saturating_sub(10);
                } else {
                    view.transcript.up_page();
                }
            }
            Event::UITick() => {
                view.tick = view.tick.wrapping_add(1);
                view.loading.tick();
            }
            Event::UIResize() => (),
        }
    }

    return Ok(());
}

pub fn destruct_terminal_for_panic() {
    let _ = disable_raw_mode();
    let _ = crossterm::execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
    let _ = crossterm::execute!(io::stdout(), cursor::Show);
}

pub async fn start(
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Event>,
    mut session: SessionState,
) -> Result<()> {
    let stdout = io::stdout();
    let mut stdout = stdout.lock();

    enable_raw_mode()?;
    crossterm::execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;

    start_loop(&mut terminal, &mut session, tx, rx).await?;

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    return Ok(());
}
