use crate::preview::{BLACK, contrast_color, rgb, to_preview};
use crate::session::credential_looks_valid;

use super::*;

const COLUMN_WIDTHS: [usize; 4] = [18, 14, 18, 9];

pub(super) fn draw(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(2),
            Constraint::Length(1),
        ])
        .split(area);

    draw_header(frame, app, chunks[0]);
    match app.screen() {
        Screen::Login => draw_login(frame, app, chunks[1]),
        Screen::Editor => draw_editor(frame, app, chunks[1]),
    }
    draw_status(frame, app, chunks[2]);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            hints(app),
            Style::default().fg(Color::DarkGray),
        ))),
        chunks[3],
    );

    if let Some(prompt) = app.prompt {
        draw_prompt(frame, &editor::question(app, prompt));
    }
}

fn draw_header(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(
            "Stageboard",
            Style::default().fg(Color::Black).bg(Color::White),
        ),
        Span::raw("  "),
    ];

    match app.controller.coords() {
        Some(c) => spans.push(Span::raw(format!("{} {}@{}", c.slug(), c.path, c.branch))),
        None => spans.push(Span::styled(
            "(not connected)",
            Style::default().fg(Color::Gray),
        )),
    }
    if let Some(rev) = app.controller.revision() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("sha {}", short_sha(rev.as_str())),
            Style::default().fg(Color::Gray),
        ));
    }

    let busy = match app.controller.state() {
        SyncState::Loading => Some("loading..."),
        SyncState::Saving => Some("saving..."),
        _ => None,
    };
    if let Some(busy) = busy {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(busy, Style::default().fg(Color::Cyan)));
    }

    if let Some((clock, remaining)) = app.session_clock() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("session {}", clock),
            Style::default().fg(timer_color(remaining)),
        ));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::BOTTOM)),
        area,
    );
}

/// Red under five minutes, orange under ten.
fn timer_color(remaining: Duration) -> Color {
    let secs = remaining.as_secs();
    if secs < 5 * 60 {
        Color::Red
    } else if secs < 10 * 60 {
        Color::Rgb(255, 165, 0)
    } else {
        Color::Green
    }
}

fn draw_login(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let w = area.width.saturating_sub(4).clamp(20, 72);
    let h = (LoginField::ALL.len() as u16 * 2 + 4).min(area.height);
    let box_area = Rect {
        x: area.x + area.width.saturating_sub(w) / 2,
        y: area.y + area.height.saturating_sub(h) / 2,
        width: w,
        height: h,
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Connect to repository");
    let inner = block.inner(box_area);
    frame.render_widget(block, box_area);

    let busy = app.controller.is_busy();
    let mut lines = Vec::new();
    for (idx, field) in LoginField::ALL.iter().enumerate() {
        let input = app.login.get(*field);
        let focused = idx == app.login.focus && !busy;
        let label_style = if focused {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        let mut spans = vec![Span::styled(format!("{:<14}", field.label()), label_style)];
        if focused {
            spans.extend(input_spans(input, field.masked()));
        } else {
            spans.push(Span::raw(input.display(field.masked())));
        }
        lines.push(Line::from(spans));
        lines.push(Line::from(""));
    }

    let token = app.login.get(LoginField::Token).buf.trim();
    if !token.is_empty() && !credential_looks_valid(token) {
        lines.push(Line::from(Span::styled(
            "Token does not start with ghp_ or github_pat_",
            Style::default().fg(Color::Yellow),
        )));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_editor(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    draw_rows(frame, app, cols[0]);
    draw_preview(frame, app, cols[1]);
}

fn draw_rows(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let header_style = Style::default()
        .fg(Color::Gray)
        .add_modifier(Modifier::UNDERLINED);
    let mut header = Vec::new();
    for (field, width) in StageField::ALL.iter().zip(COLUMN_WIDTHS) {
        header.push(Span::styled(fit(field.name(), width), header_style));
        header.push(Span::raw(" "));
    }
    let mut lines = vec![Line::from(header)];

    if app.rows.is_empty() {
        lines.push(Line::from(Span::styled(
            "No stages. Press a to add one.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    for (idx, row) in app.rows.as_slice().iter().enumerate() {
        let is_selected = idx == app.selected;
        let incomplete = row.to_stage().is_none();
        let mut spans = Vec::new();
        for (f_idx, (field, width)) in StageField::ALL.iter().zip(COLUMN_WIDTHS).enumerate() {
            let is_cell = is_selected && f_idx == app.field;
            if is_cell && let Some(input) = &app.editing {
                spans.extend(input_spans(input, false));
                let used = input.buf.chars().count() + 1;
                spans.push(Span::raw(" ".repeat(width.saturating_sub(used) + 1)));
                continue;
            }

            let text = fit(row.field(*field), width);
            let mut style = Style::default();
            if incomplete {
                style = style.fg(Color::DarkGray);
            }
            if is_selected {
                style = style.add_modifier(Modifier::BOLD);
            }
            if is_cell {
                style = style.add_modifier(Modifier::REVERSED);
            }
            spans.push(Span::styled(text, style));
            spans.push(Span::raw(" "));
        }
        spans.push(swatch(&row.background));
        lines.push(Line::from(spans));
    }

    let title = format!("Stages ({})", app.rows.len());
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::RIGHT).title(title)),
        area,
    );
}

fn draw_preview(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let preview = to_preview(&app.rows.collect());

    let mut lines = vec![Line::from(Span::styled(
        "Dropdown",
        Style::default().fg(Color::Gray),
    ))];
    for opt in &preview.dropdown {
        if opt.disabled {
            lines.push(Line::from(Span::styled(
                format!(" {} ", opt.text),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )));
            continue;
        }
        let bg = opt.background.as_deref().unwrap_or_default();
        lines.push(Line::from(Span::styled(
            format!(" {} ", opt.text),
            colored(bg),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Badges",
        Style::default().fg(Color::Gray),
    )));
    let mut badges = Vec::new();
    for badge in &preview.badges {
        badges.push(Span::styled(format!(" {} ", badge.text), colored(&badge.background)));
        badges.push(Span::raw(" "));
    }
    lines.push(Line::from(badges));

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().title(" Preview")),
        area,
    );
}

fn draw_status(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let line = match &app.status {
        Some(status) => {
            let color = match status.kind {
                StatusKind::Info => Color::White,
                StatusKind::Success => Color::Green,
                StatusKind::Error => Color::Red,
            };
            Line::from(Span::styled(status.text.as_str(), Style::default().fg(color)))
        }
        None => Line::from(""),
    };
    frame.render_widget(
        Paragraph::new(line)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::TOP)),
        area,
    );
}

fn draw_prompt(frame: &mut ratatui::Frame, question: &str) {
    let area = frame.area();
    let w = area.width.saturating_sub(6).clamp(20, 64);
    let h = 5.min(area.height);
    let box_area = Rect {
        x: area.x + area.width.saturating_sub(w) / 2,
        y: area.y + area.height.saturating_sub(h) / 2,
        width: w,
        height: h,
    };

    frame.render_widget(Clear, box_area);
    let block = Block::default().borders(Borders::ALL).title("Confirm");
    let inner = block.inner(box_area);
    frame.render_widget(block, box_area);
    frame.render_widget(
        Paragraph::new(vec![
            Line::from(question),
            Line::from(Span::styled(
                "y / Enter: yes    any other key: no",
                Style::default().fg(Color::Gray),
            )),
        ])
        .wrap(Wrap { trim: false }),
        inner,
    );
}

fn hints(app: &App) -> String {
    if app.prompt.is_some() {
        return "y confirm  n cancel".to_string();
    }
    match app.screen() {
        Screen::Login => "Tab next field  Enter connect  Ctrl+U clear field  Esc quit".to_string(),
        Screen::Editor if app.editing.is_some() => {
            "Enter apply  Tab next field  Esc cancel".to_string()
        }
        Screen::Editor => {
            "↑↓ row  ←→ field  Enter edit  a add  d delete  K/J move  c colour  s save  r reload  L logout  q quit"
                .to_string()
        }
    }
}

/// Input text with a block cursor.
fn input_spans(input: &Input, masked: bool) -> Vec<Span<'static>> {
    let text: Vec<char> = input.display(masked).chars().collect();
    let cursor = input.cursor.min(text.len());
    let before: String = text[..cursor].iter().collect();
    let at: String = text.get(cursor).map_or(" ".to_string(), |c| c.to_string());
    let after: String = text.get(cursor + 1..).map_or(String::new(), |s| s.iter().collect());
    vec![
        Span::raw(before),
        Span::styled(at, Style::default().add_modifier(Modifier::REVERSED)),
        Span::raw(after),
    ]
}

fn fit(s: &str, width: usize) -> String {
    let mut out: String = s.chars().take(width).collect();
    if s.chars().count() > width && width > 0 {
        out.pop();
        out.push('…');
    }
    format!("{:<width$}", out, width = width)
}

/// Style for a coloured chip: the background plus its readable text colour.
fn colored(background: &str) -> Style {
    let fg = if contrast_color(background) == BLACK {
        Color::Black
    } else {
        Color::White
    };
    Style::default().bg(term_color(background)).fg(fg)
}

fn swatch(background: &str) -> Span<'static> {
    Span::styled("    ", Style::default().bg(term_color(background)))
}

fn term_color(background: &str) -> Color {
    rgb(background).map_or(Color::Reset, |(r, g, b)| Color::Rgb(r, g, b))
}
