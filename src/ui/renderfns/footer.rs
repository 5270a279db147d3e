use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Status line shown right-aligned in the footer
pub struct FooterStatus {
  pub text: String,
  pub is_error: bool,
}

/// Draw the footer bar with view breadcrumb and the current view's status
pub fn draw_footer(
  frame: &mut Frame,
  area: Rect,
  breadcrumb: &[String],
  status: Option<&FooterStatus>,
) {
  let mut spans = vec![Span::raw(" ")];

  for (i, part) in breadcrumb.iter().enumerate() {
    if i > 0 {
      spans.push(Span::styled(" > ", Style::default().fg(Color::DarkGray)));
    }

    let style = if i == breadcrumb.len() - 1 {
      Style::default().fg(Color::Cyan).bold()
    } else {
      Style::default().fg(Color::White)
    };

    spans.push(Span::styled(part.clone(), style));
  }

  let background = Style::default().bg(Color::Black);
  let status_text = status.map(|s| format!("{} ", s.text)).unwrap_or_default();
  let chunks = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([
      Constraint::Min(1),
      Constraint::Length(status_text.chars().count() as u16),
    ])
    .split(area);

  frame.render_widget(Paragraph::new(Line::from(spans)).style(background), chunks[0]);

  if let Some(status) = status {
    let color = if status.is_error { Color::Red } else { Color::Yellow };
    let paragraph = Paragraph::new(status_text)
      .alignment(Alignment::Right)
      .style(background.fg(color));
    frame.render_widget(paragraph, chunks[1]);
  }
}
