//! TUI rendering — orchestrates all panes.

pub mod detail;
pub mod queue;

use chrono::Local;
use enroll_core::{applicant::AdmissionStatus, password::generate_password};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, Paragraph},
};

use crate::app::{App, PendingAction, Screen};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let area = f.area();

  // Vertical stack: header, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);
  draw_body(f, rows[1], app);
  draw_status(f, rows[2], app);

  if app.pending_action.is_some() {
    draw_confirm_modal(f, area, app);
  }
}

// ─── Header ───────────────────────────────────────────────────────────────────

/// Human label for a partition (the wire tokens are lowercase).
pub fn partition_label(status: AdmissionStatus) -> &'static str {
  match status {
    AdmissionStatus::Pending => "Pending",
    AdmissionStatus::Approved => "Approved",
    AdmissionStatus::Rejected => "Rejected",
  }
}

fn tab_span(app: &App, status: AdmissionStatus, count: u64) -> Span<'static> {
  let label = format!(" {} ({count}) ", partition_label(status));
  if app.tab == status {
    Span::styled(
      label,
      Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    )
  } else {
    Span::styled(label, Style::default().fg(Color::White))
  }
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let date = Local::now().format("%Y-%m-%d").to_string();

  let tabs = vec![
    Span::styled(
      " enroll ",
      Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    tab_span(app, AdmissionStatus::Pending, app.counts.pending),
    tab_span(app, AdmissionStatus::Approved, app.counts.approved),
    tab_span(app, AdmissionStatus::Rejected, app.counts.rejected),
  ];
  let right = Span::styled(format!("{date} "), Style::default().fg(Color::Gray));

  // Simple left-right header: pad the middle.
  let left_width: u16 = tabs.iter().map(|s| s.content.len() as u16).sum();
  let right_width = right.content.len() as u16;
  let pad = area
    .width
    .saturating_sub(left_width)
    .saturating_sub(right_width);

  let mut spans = tabs;
  spans.push(Span::raw(" ".repeat(pad as usize)));
  spans.push(right);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(Line::from(spans)), inner);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body(f: &mut Frame, area: Rect, app: &App) {
  // Split into left queue pane (35%) and right detail pane (65%).
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
    .split(area);

  queue::draw(f, cols[0], app);

  // Detail pane shows the selection, or a preview of the cursor row.
  if app.selected_record().or_else(|| app.cursor_record()).is_some() {
    detail::draw(f, cols[1], app);
  } else {
    draw_empty_detail(f, cols[1]);
  }
}

fn draw_empty_detail(f: &mut Frame, area: Rect) {
  let block = Block::default()
    .title(" Applicant ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(
    Paragraph::new(Line::from(vec![Span::styled(
      "No applications in this partition.",
      Style::default().fg(Color::DarkGray),
    )])),
    inner,
  );
}

// ─── Confirm modal ────────────────────────────────────────────────────────────

fn draw_confirm_modal(f: &mut Frame, area: Rect, app: &App) {
  let Some(action) = app.pending_action else {
    return;
  };
  let Some(record) = app.selected_record().or_else(|| app.cursor_record()) else {
    return;
  };

  let (title, lines) = match action {
    PendingAction::Approve => {
      // Preview of the credential the portal will hand out.
      let password = generate_password(
        Some(record.application.first_name.as_str()),
        Some(record.application.dob.as_str()),
      );
      (
        " Approve ",
        vec![
          Line::from(format!("Approve {}?", record.display_name())),
          Line::from(vec![
            Span::raw("Initial password will be "),
            Span::styled(
              password,
              Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            ),
          ]),
        ],
      )
    }
    PendingAction::Reject => (
      " Reject ",
      vec![Line::from(format!("Reject {}?", record.display_name()))],
    ),
  };

  let mut body = lines;
  body.push(Line::from(""));
  body.push(Line::from(vec![Span::styled(
    "[y] confirm   [n] cancel",
    Style::default().fg(Color::DarkGray),
  )]));

  let modal = centered_rect(50, (body.len() + 2) as u16, area);
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan));

  f.render_widget(Clear, modal);
  let inner = block.inner(modal);
  f.render_widget(block, modal);
  f.render_widget(Paragraph::new(body), inner);
}

/// A `width`-column, `height`-row rect centered in `area`.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
  let width = width.min(area.width);
  let height = height.min(area.height);
  Rect {
    x: area.x + (area.width - width) / 2,
    y: area.y + (area.height - height) / 2,
    width,
    height,
  }
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = if app.pending_action.is_some() {
    ("CONFIRM", "y confirm  n cancel")
  } else if app.filter_active {
    ("SEARCH", "Type to filter  Esc cancel  Enter apply")
  } else {
    match app.screen {
      Screen::Queue => (
        "QUEUE",
        "↑↓/jk navigate  Tab/123 partition  Enter detail  a approve  r reject  / search  R refresh  q quit",
      ),
      Screen::Detail => (
        "DETAIL",
        "↑↓/jk scroll  a approve  r reject  Esc back  q quit",
      ),
    }
  };

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(
    format!("  {status}"),
    Style::default().fg(Color::Gray),
  );

  let line = Line::from(vec![mode_span, hint_span]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}
