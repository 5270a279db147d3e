use crate::project::Project;
use crate::store::{LiveQuery, ProjectStore};
use crate::ui::view::{Shortcut, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

/// View for a single project, following live store updates
pub struct ProjectDetailView {
  id: i64,
  name: String,
  live: LiveQuery<Option<Project>>,
  project: Option<Project>,
}

impl ProjectDetailView {
  pub fn new(project: &Project, store: &ProjectStore) -> Self {
    let mut live = store.watch_by_id(project.id);
    let current = live.current();

    Self {
      id: project.id,
      name: project.name.clone(),
      live,
      project: current,
    }
  }

  fn render_detail(&self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(format!(" {} ", self.name))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let project = match &self.project {
      Some(project) => project,
      None => {
        let paragraph = Paragraph::new(format!("Project {} not found.", self.id))
          .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(paragraph, inner);
        return;
      }
    };

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(2), // Name and id
        Constraint::Length(1), // Separator
        Constraint::Min(1),    // Description
      ])
      .split(inner);

    let header = vec![
      Line::from(vec![
        Span::styled("Name: ", Style::default().fg(Color::DarkGray)),
        Span::styled(&project.name, Style::default().fg(Color::Cyan).bold()),
      ]),
      Line::from(vec![
        Span::styled("Id: ", Style::default().fg(Color::DarkGray)),
        Span::raw(project.id.to_string()),
      ]),
    ];
    frame.render_widget(Paragraph::new(header), chunks[0]);

    let sep = Paragraph::new("─".repeat(chunks[1].width as usize))
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(sep, chunks[1]);

    let (desc, style) = match project.description.as_deref() {
      Some(desc) if !desc.trim().is_empty() => (desc, Style::default()),
      _ => ("No description", Style::default().fg(Color::DarkGray)),
    };
    let desc_para = Paragraph::new(desc).wrap(Wrap { trim: true }).style(style);
    frame.render_widget(desc_para, chunks[2]);
  }
}

impl View for ProjectDetailView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_detail(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    self.name.clone()
  }

  fn tick(&mut self) {
    if self.live.has_changed() {
      self.project = self.live.current();
      if let Some(project) = &self.project {
        self.name = project.name.clone();
      }
    }
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![Shortcut::new("q", "back")]
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_detail_follows_store_updates() {
    let store = ProjectStore::open_in_memory().unwrap();
    let stored = Project::new(7, "X", Some("Y"));
    store.upsert_all(vec![stored.clone()]).await.unwrap();

    let mut view = ProjectDetailView::new(&stored, &store);
    assert_eq!(view.project, Some(stored));

    store
      .upsert_all(vec![Project::new(7, "X2", None)])
      .await
      .unwrap();
    view.tick();

    assert_eq!(view.project, Some(Project::new(7, "X2", None)));
    assert_eq!(view.breadcrumb_label(), "X2");
  }
}
