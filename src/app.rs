use crate::config::Profile;
use crate::event::{Event, EventHandler};
use crate::store::SyncStamp;
use crate::sync::{SyncCoordinator, SyncPhase};
use crate::ui::renderfns::{draw_footer, draw_header, HeaderInfo};
use crate::ui::view::{View, ViewAction};
use crate::ui::views::ProfileView;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const TICK_RATE: Duration = Duration::from_millis(250);

/// Main application state
pub struct App {
  /// Navigation stack - root is always at index 0
  view_stack: Vec<Box<dyn View>>,

  /// Shown in the header
  profile_name: String,

  sync: Arc<SyncCoordinator>,

  /// Last successful sync for the configured account
  last_sync: Option<SyncStamp>,

  should_quit: bool,
}

impl App {
  pub fn new(profile: Profile, sync: Arc<SyncCoordinator>) -> Self {
    let profile_name = profile.name.clone();
    let root = ProfileView::new(profile, Arc::clone(&sync));

    let mut app = Self {
      view_stack: vec![Box::new(root)],
      profile_name,
      sync,
      last_sync: None,
      should_quit: false,
    };
    app.reload_last_sync();
    app
  }

  pub async fn run(&mut self) -> Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;

    let result = self.event_loop().await;

    // Restore the terminal even when the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop(&mut self) -> Result<()> {
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    let mut events = EventHandler::new(TICK_RATE, self.sync.subscribe_phase());

    while !self.should_quit {
      terminal.draw(|frame| self.draw(frame))?;

      match events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }

    Ok(())
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => {
        if let Some(view) = self.view_stack.last_mut() {
          view.tick();
        }
      }
      Event::Sync(phase) => {
        debug!(?phase, "Sync phase changed");
        if phase == SyncPhase::Done {
          self.reload_last_sync();
        }
      }
      Event::Resize => {}
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    let action = match self.view_stack.last_mut() {
      Some(view) => view.handle_key(key),
      None => return,
    };

    match action {
      ViewAction::None => {}
      ViewAction::Push(view) => self.view_stack.push(view),
      ViewAction::Pop => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        } else {
          self.should_quit = true;
        }
      }
    }
  }

  fn reload_last_sync(&mut self) {
    match self.sync.store().last_sync(self.sync.account()) {
      Ok(stamp) => self.last_sync = stamp,
      Err(e) => warn!(error = %e, "Could not read last sync"),
    }
  }

  fn draw(&mut self, frame: &mut Frame) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(1), // Header
        Constraint::Min(1),    // Content
        Constraint::Length(1), // Footer
      ])
      .split(frame.area());

    let breadcrumb: Vec<String> = self
      .view_stack
      .iter()
      .map(|view| view.breadcrumb_label())
      .collect();

    let Some(view) = self.view_stack.last_mut() else {
      return;
    };

    let info = HeaderInfo {
      name: &self.profile_name,
      account: self.sync.account(),
      source: self.sync.source_label(),
      last_sync: self.last_sync.as_ref(),
    };
    draw_header(frame, chunks[0], &info, &view.shortcuts());

    view.render(frame, chunks[1]);

    let status = view.status();
    draw_footer(frame, chunks[2], &breadcrumb, status.as_ref());
  }
}
