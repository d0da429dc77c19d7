use std::{
    collections::VecDeque,
    sync::mpsc::{Receiver, TryRecvError},
    time::Duration,
};

use anyhow::Result;
use crossterm::{
    event::{self, Event as CEvent, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use redglove_types::{
    events::{EventPayload, SystemEvent},
    tracking::ButtonState,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Terminal,
};

const MAX_LOG_ENTRIES: usize = 120;

/// Live status view. Returns when the event channel closes or the user quits.
pub fn run(receiver: Receiver<SystemEvent>, summary: String) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    let res = run_loop(&mut terminal, receiver, summary.as_str());

    terminal.show_cursor()?;
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    res
}

fn run_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    receiver: Receiver<SystemEvent>,
    summary: &str,
) -> Result<()> {
    let mut logs: VecDeque<String> = VecDeque::with_capacity(MAX_LOG_ENTRIES);
    let mut last_status = String::from("waiting for frames");
    let mut button = ButtonState::Up;

    loop {
        let mut receiver_closed = false;
        loop {
            match receiver.try_recv() {
                Ok(event) => {
                    if let EventPayload::Gesture(gesture) = &event.payload {
                        button = gesture.state;
                    }
                    last_status = summarize_status(&event);
                    if logs.len() == MAX_LOG_ENTRIES {
                        logs.pop_front();
                    }
                    logs.push_back(format_event(&event));
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    receiver_closed = true;
                    break;
                }
            }
        }

        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(3), Constraint::Min(0)].as_ref())
                .split(f.size());

            let button_style = match button {
                ButtonState::Up => Style::default().fg(Color::Green),
                ButtonState::Down => Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD),
            };
            let header = Paragraph::new(Line::from(vec![
                Span::styled(
                    "redglove",
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::styled(format!("button {:?}", button), button_style),
                Span::raw("  "),
                Span::raw(last_status.clone()),
                Span::raw("  "),
                Span::styled("config:", Style::default().fg(Color::Magenta)),
                Span::raw(" "),
                Span::raw(summary),
                Span::raw("  "),
                Span::styled("q", Style::default().fg(Color::Yellow)),
                Span::raw(" to quit"),
            ]))
            .block(Block::default().borders(Borders::ALL).title("Status"));
            f.render_widget(header, chunks[0]);

            let items: Vec<ListItem> = logs
                .iter()
                .rev()
                .map(|entry| ListItem::new(entry.clone()))
                .collect();

            let list = List::new(items)
                .block(Block::default().borders(Borders::ALL).title("Recent events"))
                .highlight_style(Style::default().fg(Color::Yellow));

            f.render_widget(list, chunks[1]);
        })?;

        if receiver_closed {
            break;
        }

        if event::poll(Duration::from_millis(100))? {
            if let CEvent::Key(key) = event::read()? {
                if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn summarize_status(event: &SystemEvent) -> String {
    match &event.payload {
        EventPayload::Lifecycle(lifecycle) => format!("lifecycle: {:?}", lifecycle.phase),
        EventPayload::Tracking(tracking) => match tracking.centroid {
            Some(c) => format!("tracking at ({}, {})", c.x, c.y),
            None => "target lost, scanning full frame".to_string(),
        },
        EventPayload::Gesture(gesture) => format!("button {:?}", gesture.state),
        EventPayload::Telemetry(_) => "run statistics updated".to_string(),
        EventPayload::Ops(ops) => ops.message.clone(),
        EventPayload::Unknown(_) => "unknown event".to_string(),
    }
}

fn format_event(event: &SystemEvent) -> String {
    let timestamp = event.timestamp.format("%H:%M:%S");
    match &event.payload {
        EventPayload::Lifecycle(lifecycle) => format!(
            "[{}] Lifecycle::{:?} {}",
            timestamp,
            lifecycle.phase,
            lifecycle.details.clone().unwrap_or_default()
        ),
        EventPayload::Tracking(tracking) => match (tracking.centroid, tracking.screen) {
            (Some(c), Some(s)) => format!(
                "[{}] frame {} acquired at ({}, {}) -> screen ({}, {})",
                timestamp, tracking.frame_index, c.x, c.y, s.x, s.y
            ),
            _ => format!("[{}] frame {} target lost", timestamp, tracking.frame_index),
        },
        EventPayload::Gesture(gesture) => format!(
            "[{}] frame {} button {}",
            timestamp,
            gesture.frame_index,
            if gesture.state.is_pressed() { "pressed" } else { "released" }
        ),
        EventPayload::Telemetry(telemetry) => match (telemetry.stats, &telemetry.frame) {
            (Some(stats), Some(last)) => format!(
                "[{}] Stats frames={} found={} presses={} releases={} last frame {}us",
                timestamp,
                stats.frames,
                stats.found_frames,
                stats.presses,
                stats.releases,
                last.processing_us
            ),
            (Some(stats), None) => format!(
                "[{}] Stats frames={} found={} presses={} releases={}",
                timestamp, stats.frames, stats.found_frames, stats.presses, stats.releases
            ),
            (None, _) => format!("[{}] Telemetry update", timestamp),
        },
        EventPayload::Ops(ops) => format!(
            "[{}] Ops {} [{}]",
            timestamp,
            ops.message,
            ops.tags.join(", ")
        ),
        EventPayload::Unknown(value) => format!("[{}] Unknown payload {}", timestamp, value),
    }
}
