use crate::project::Project;
use crate::state::{ProjectListModel, UiState};
use crate::sync::SyncCoordinator;
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::footer::FooterStatus;
use crate::ui::renderfns::truncate;
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::views::ProjectDetailView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use std::sync::Arc;

/// View listing cached projects while a sync runs in the background
pub struct ProjectListView {
  sync: Arc<SyncCoordinator>,
  model: ProjectListModel,
  list_state: ListState,
}

impl ProjectListView {
  pub fn new(sync: Arc<SyncCoordinator>) -> Self {
    let model = ProjectListModel::new(Arc::clone(&sync));
    Self {
      sync,
      model,
      list_state: ListState::default(),
    }
  }

  fn projects(&self) -> &[Project] {
    self.model.cached()
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let len = self.projects().len();
    ensure_valid_selection(&mut self.list_state, len);

    let title = match self.model.state() {
      UiState::Loading => " Projects (loading...) ".to_string(),
      UiState::Error(_) => format!(" Projects ({}, offline) ", len),
      UiState::Success(_) => format!(" Projects ({}) ", len),
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if len == 0 {
      let content = match self.model.state() {
        UiState::Loading => "Loading projects...".to_string(),
        UiState::Error(e) => format!("Failed to load projects: {}\n\nPress 'r' to retry.", e),
        UiState::Success(_) => "No projects yet.".to_string(),
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let items: Vec<ListItem> = self
      .projects()
      .iter()
      .map(|project| {
        let line = Line::from(vec![
          Span::styled(
            format!("{:<28}", truncate(&project.name, 28)),
            Style::default().fg(Color::Cyan),
          ),
          Span::raw(" "),
          Span::styled(
            truncate(project.description.as_deref().unwrap_or(""), 70),
            Style::default().fg(Color::Gray),
          ),
        ]);
        ListItem::new(line)
      })
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.list_state);
  }
}

impl View for ProjectListView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        self.list_state.select_next();
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.list_state.select_previous();
      }
      KeyCode::Char('r') => {
        self.model.refresh();
      }
      KeyCode::Enter => {
        if let Some(project) = self
          .list_state
          .selected()
          .and_then(|idx| self.projects().get(idx))
        {
          return ViewAction::Push(Box::new(ProjectDetailView::new(
            project,
            self.sync.store(),
          )));
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_list(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Projects".to_string()
  }

  fn tick(&mut self) {
    self.model.poll();
  }

  fn status(&self) -> Option<FooterStatus> {
    if self.model.is_syncing() {
      return Some(FooterStatus {
        text: format!("syncing {}...", self.model.account()),
        is_error: false,
      });
    }

    if let Some(e) = self.model.state().error() {
      return Some(FooterStatus {
        text: format!("sync failed: {}", e),
        is_error: true,
      });
    }

    self.model.last_report().map(|report| FooterStatus {
      text: format!("{} projects from {}", report.stamp.count, report.source),
      is_error: false,
    })
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new("enter", "details"),
      Shortcut::new("r", "sync"),
      Shortcut::new("q", "back"),
    ]
  }
}
