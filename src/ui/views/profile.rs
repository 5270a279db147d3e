use crate::config::Profile;
use crate::sync::SyncCoordinator;
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::views::ProjectListView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use std::sync::Arc;

/// Root view: the business card
pub struct ProfileView {
  profile: Profile,
  sync: Arc<SyncCoordinator>,
}

impl ProfileView {
  pub fn new(profile: Profile, sync: Arc<SyncCoordinator>) -> Self {
    Self { profile, sync }
  }

  fn card_lines(&self) -> Vec<Line<'_>> {
    let mut lines = vec![
      Line::raw(""),
      Line::styled(
        self.profile.name.as_str(),
        Style::default().fg(Color::White).bold(),
      )
      .centered(),
    ];

    if let Some(title) = &self.profile.title {
      lines.push(Line::styled(title.as_str(), Style::default().fg(Color::Yellow)).centered());
    }

    lines.push(Line::raw(""));

    for contact in &self.profile.contacts {
      lines.push(
        Line::from(vec![
          Span::styled(
            format!("{:>9}: ", contact.kind.label()),
            Style::default().fg(Color::DarkGray),
          ),
          Span::raw(contact.value.as_str()),
        ])
        .centered(),
      );
    }

    lines.push(Line::raw(""));
    lines.push(
      Line::styled(
        "Press Enter to see my projects",
        Style::default().fg(Color::Cyan),
      )
      .centered(),
    );
    lines
  }
}

impl View for ProfileView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Enter | KeyCode::Char('p') => {
        ViewAction::Push(Box::new(ProjectListView::new(Arc::clone(&self.sync))))
      }
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let paragraph = Paragraph::new(self.card_lines())
      .block(block)
      .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Profile".to_string()
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![Shortcut::new("enter", "projects"), Shortcut::new("q", "quit")]
  }
}
