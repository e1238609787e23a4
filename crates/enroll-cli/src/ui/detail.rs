//! Applicant detail pane — right panel.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::app::App;

// ─── Public entry ─────────────────────────────────────────────────────────────

/// Render the detail pane into `area`. Shows the detail selection, or a
/// preview of the queue cursor row.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let Some(record) = app.selected_record().or_else(|| app.cursor_record()) else {
    return;
  };

  let block = Block::default()
    .title(format!(" {} ", record.display_name()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let inner = block.inner(area);
  f.render_widget(block, area);

  let mut lines: Vec<Line> = Vec::new();

  section(&mut lines, "Personal");
  field(&mut lines, "status", crate::ui::partition_label(record.status));
  field(&mut lines, "dob", &record.application.dob);
  field(&mut lines, "gender", &record.application.gender);
  field(&mut lines, "blood group", &record.application.blood_group);
  field(&mut lines, "email", &record.application.email);
  field(&mut lines, "phone", &record.application.phone);
  opt_field(&mut lines, "alt contact", record.application.alt_contact.as_deref());

  section(&mut lines, "Family");
  field(&mut lines, "father", &record.application.father_name);
  field(&mut lines, "father ph.", &record.application.father_phone);
  field(&mut lines, "mother", &record.application.mother_name);
  field(&mut lines, "mother ph.", &record.application.mother_phone);

  section(&mut lines, "Academic");
  field(&mut lines, "class", record.application.class_level.as_str());
  let subjects = record
    .application
    .subjects
    .iter()
    .map(|s| s.as_str())
    .collect::<Vec<_>>()
    .join(", ");
  field(&mut lines, "subjects", &subjects);

  section(&mut lines, "Address");
  field(&mut lines, "temporary", &record.application.temp_address);
  opt_field(&mut lines, "permanent", record.application.perm_address.as_deref());

  section(&mut lines, "Additional");
  field(&mut lines, "heard from", &record.application.heard_from);
  opt_field(&mut lines, "notes", record.application.additional_notes.as_deref());
  field(&mut lines, "photo", &record.application.photo_url);
  field(
    &mut lines,
    "applied",
    &record.created_at.format("%Y-%m-%d %H:%M").to_string(),
  );

  if record.action_date.is_some() || record.account_id.is_some() {
    section(&mut lines, "Decision");
    if let Some(action_date) = record.action_date {
      field(
        &mut lines,
        "decided",
        &action_date.format("%Y-%m-%d %H:%M").to_string(),
      );
    }
    if let Some(account_id) = record.account_id {
      field(&mut lines, "account", &account_id.to_string());
    }
    if let Some(password) = &record.generated_password {
      field(&mut lines, "password", password);
    }
  }

  let scroll_offset = app.detail_scroll as u16;
  let para = Paragraph::new(lines).scroll((scroll_offset, 0));
  f.render_widget(para, inner);
}

// ─── Line helpers ─────────────────────────────────────────────────────────────

fn section(lines: &mut Vec<Line<'static>>, title: &'static str) {
  if !lines.is_empty() {
    lines.push(Line::from(""));
  }
  lines.push(Line::from(Span::styled(
    title,
    Style::default()
      .fg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  )));
}

fn field(lines: &mut Vec<Line<'static>>, label: &'static str, value: &str) {
  lines.push(Line::from(vec![
    Span::styled(format!("  {label:<12}"), Style::default().fg(Color::Gray)),
    Span::raw(value.to_string()),
  ]));
}

fn opt_field(lines: &mut Vec<Line<'static>>, label: &'static str, value: Option<&str>) {
  if let Some(value) = value {
    field(lines, label, value);
  }
}
