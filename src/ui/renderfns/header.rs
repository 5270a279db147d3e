use chrono::{DateTime, Utc};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use super::utils::format_age;
use crate::store::SyncStamp;
use crate::ui::view::Shortcut;

/// Context shown on the left of the header
pub struct HeaderInfo<'a> {
  pub name: &'a str,
  pub account: &'a str,
  pub source: &'a str,
  pub last_sync: Option<&'a SyncStamp>,
}

/// Draw the header bar with logo, context, and shortcuts
pub fn draw_header(frame: &mut Frame, area: Rect, info: &HeaderInfo<'_>, shortcuts: &[Shortcut]) {
  let mut spans = vec![
    Span::styled(" cardfolio ", Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(format!(" {} ", info.name), Style::default().fg(Color::White)),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(
      format!(" {} ({}) ", info.account, info.source),
      Style::default().fg(Color::Yellow).bold(),
    ),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(
      format!(" {} ", sync_label(info.last_sync, Utc::now())),
      Style::default().fg(Color::DarkGray),
    ),
    Span::raw(" "),
  ];

  // Shortcuts - keys highlighted, descriptions dimmed
  for shortcut in shortcuts {
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
      format!("<{}>", shortcut.key),
      Style::default().fg(Color::Cyan),
    ));
    spans.push(Span::styled(
      format!(" {}", shortcut.label),
      Style::default().fg(Color::DarkGray),
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));

  frame.render_widget(paragraph, area);
}

fn sync_label(last_sync: Option<&SyncStamp>, now: DateTime<Utc>) -> String {
  match last_sync {
    Some(stamp) => format!(
      "synced {} ({} projects)",
      format_age(stamp.synced_at, now),
      stamp.count
    ),
    None => "never synced".to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Duration;

  #[test]
  fn test_sync_label() {
    let now = Utc::now();
    assert_eq!(sync_label(None, now), "never synced");

    let stamp = SyncStamp {
      account: "octocat".to_string(),
      synced_at: now - Duration::minutes(5),
      count: 12,
    };
    assert_eq!(sync_label(Some(&stamp), now), "synced 5m ago (12 projects)");
  }
}
