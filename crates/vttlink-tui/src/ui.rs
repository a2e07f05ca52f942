//! Rendering.
//!
//! Layout, top to bottom: a one-line status bar, the session body, and the
//! input box. The body depends on the connection mode:
//!
//! ```text
//! Hybrid   [ chat feed          | embedded view  ]
//! WebView  [ embedded view                       ]
//! Native   [ chat feed          | actor sheet    ]
//! ```

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, List, ListItem, Padding, Paragraph, Wrap},
};
use vttlink_core::{Actor, ChatMessage, ChatOrigin, ConnectionMode, ConnectionStatus, SessionState};

use crate::input::InputState;

const HELP: [&str; 6] = [
    "/connect [url] [world] [hybrid|webview|native]",
    "/disconnect",
    "/select <actor-id>",
    "/set <resource> <value>",
    "/quit",
    "Anything else is sent as chat.",
];

/// Everything a frame is drawn from.
#[derive(Debug, Clone, Copy)]
pub struct View<'a> {
    /// Session snapshot.
    pub state: &'a SessionState,
    /// Line being edited.
    pub input: &'a InputState,
    /// Transient frontend message (bad command, refused action).
    pub notice: Option<&'a str>,
}

/// Draw a full frame.
pub fn draw(frame: &mut Frame<'_>, view: &View<'_>) {
    let [status, body, input] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(3),
    ])
    .areas(frame.area());

    frame.render_widget(Paragraph::new(status_line(view)), status);
    draw_body(frame, body, view.state);
    draw_input(frame, input, view.input);
}

fn status_line(view: &View<'_>) -> Line<'static> {
    let state = view.state;
    let mut spans = match state.status() {
        ConnectionStatus::Disconnected => vec![Span::from("Disconnected").dark_gray()],
        ConnectionStatus::Connecting => vec![
            Span::from("Connecting").yellow(),
            Span::from(format!(" to {}", state.server_url().unwrap_or_default())),
        ],
        ConnectionStatus::Connected => vec![
            Span::from("Connected").green(),
            Span::from(format!(
                " {} as {} ({})",
                state.world().filter(|w| !w.is_empty()).unwrap_or("(no world)"),
                state.username().unwrap_or("guest"),
                state.mode(),
            )),
        ],
    };

    if let Some(error) = state.error_message() {
        spans.push(Span::from("  "));
        spans.push(Span::from(error.to_string()).red());
    }
    if let Some(notice) = view.notice {
        spans.push(Span::from("  "));
        spans.push(Span::from(notice.to_string()).italic());
    }
    Line::from(spans)
}

fn draw_body(frame: &mut Frame<'_>, area: Rect, state: &SessionState) {
    if !state.connected() {
        let lines: Vec<Line<'_>> = HELP.iter().map(|h| Line::from(*h)).collect();
        let help = Paragraph::new(lines)
            .block(Block::bordered().title(" Commands ").padding(Padding::horizontal(1)));
        frame.render_widget(help, area);
        return;
    }

    match state.mode() {
        ConnectionMode::WebView => draw_surface(frame, area, state),
        ConnectionMode::Hybrid => {
            let [chat, surface] =
                Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)])
                    .areas(area);
            draw_chat(frame, chat, state.chat_messages());
            draw_surface(frame, surface, state);
        },
        ConnectionMode::Native => {
            let [chat, sheet] =
                Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)])
                    .areas(area);
            draw_chat(frame, chat, state.chat_messages());
            draw_sheet(frame, sheet, state);
        },
    }
}

fn draw_chat(frame: &mut Frame<'_>, area: Rect, messages: &[ChatMessage]) {
    let visible = usize::from(area.height.saturating_sub(2));
    let skip = messages.len().saturating_sub(visible);
    let items: Vec<ListItem<'_>> = messages[skip..].iter().map(chat_item).collect();
    frame.render_widget(List::new(items).block(Block::bordered().title(" Chat ")), area);
}

fn chat_item(message: &ChatMessage) -> ListItem<'_> {
    let author_style = match message.origin() {
        ChatOrigin::Local => Style::default().fg(Color::Cyan),
        ChatOrigin::Bridge => Style::default().fg(Color::Magenta),
        ChatOrigin::Backlog => Style::default().fg(Color::DarkGray),
    };
    ListItem::new(Line::from(vec![
        Span::from(format!("{} ", message.display_time())).dark_gray(),
        Span::styled(message.author_name(), author_style.add_modifier(Modifier::BOLD)),
        Span::from(": "),
        Span::from(message.content()),
    ]))
}

fn draw_surface(frame: &mut Frame<'_>, area: Rect, state: &SessionState) {
    let text = match state.world_url() {
        Some(url) => vec![
            Line::from(url.to_string()).underlined(),
            Line::from(""),
            Line::from("Detached surface: bridge scripts are written to the log.").dark_gray(),
        ],
        None => vec![Line::from("No world URL for this server.").dark_gray()],
    };
    let paragraph = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .block(Block::bordered().title(" Embedded view ").padding(Padding::horizontal(1)));
    frame.render_widget(paragraph, area);
}

fn draw_sheet(frame: &mut Frame<'_>, area: Rect, state: &SessionState) {
    let selected = state.selected_actor();
    let mut lines: Vec<Line<'_>> = state
        .actors()
        .iter()
        .map(|actor| {
            let is_selected = selected.is_some_and(|s| s.id == actor.id);
            let marker = if is_selected { "> " } else { "  " };
            let line = Line::from(format!("{marker}{} [{}]", actor.name, actor.id));
            if is_selected { line.bold() } else { line }
        })
        .collect();

    match selected {
        Some(actor) => {
            lines.push(Line::from(""));
            lines.extend(actor_details(actor));
        },
        None if state.actors().is_empty() => lines.push(Line::from("No actors.").dark_gray()),
        None => {},
    }

    let sheet = Paragraph::new(lines)
        .block(Block::bordered().title(" Actors ").padding(Padding::horizontal(1)));
    frame.render_widget(sheet, area);
}

fn actor_details(actor: &Actor) -> Vec<Line<'_>> {
    let mut lines = vec![Line::from(format!("{} ({})", actor.name, actor.kind)).bold()];
    lines.extend(actor.attributes.iter().map(|attribute| match attribute.max {
        Some(max) => Line::from(format!("{} {}/{max}", attribute.label, attribute.value)),
        None => Line::from(format!("{} {}", attribute.label, attribute.value)),
    }));
    lines.extend(actor.resources.iter().map(|resource| {
        Line::from(vec![
            Span::from(format!("{} ", resource.label())),
            Span::from(format!("{}/{}", resource.current(), resource.max())).green(),
        ])
    }));
    lines
}

fn draw_input(frame: &mut Frame<'_>, area: Rect, input: &InputState) {
    let block = Block::bordered().title(" > ");
    let inner = block.inner(area);
    frame.render_widget(Paragraph::new(input.text()).block(block), area);

    let offset = u16::try_from(input.cursor()).unwrap_or(u16::MAX);
    let x = inner.x.saturating_add(offset).min(inner.right().saturating_sub(1));
    frame.set_cursor_position((x, inner.y));
}
