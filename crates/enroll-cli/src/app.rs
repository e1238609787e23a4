//! Application state machine and event dispatcher.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use enroll_core::{
  applicant::{AdmissionStatus, ApplicantRecord},
  store::PartitionCounts,
};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use uuid::Uuid;

use crate::client::ApiClient;

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
  /// Focus on the applicant queue; right pane previews the cursor row.
  Queue,
  /// Focus on the applicant detail pane.
  Detail,
}

/// A decision awaiting a y/n confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
  Approve,
  Reject,
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  /// Current screen / keyboard focus.
  pub screen: Screen,

  /// Which admission partition the queue shows.
  pub tab: AdmissionStatus,

  /// Records of the active partition, newest first.
  pub records: Vec<ApplicantRecord>,

  /// Live partition tallies shown in the header.
  pub counts: PartitionCounts,

  /// Current fuzzy-filter string (only active when `filter_active`).
  pub filter: String,

  /// Whether the user is typing a filter query.
  pub filter_active: bool,

  /// Cursor position within the *filtered* record list.
  pub list_cursor: usize,

  /// Scroll offset within the detail pane.
  pub detail_scroll: usize,

  /// Applicant id currently shown in the detail pane.
  pub selected_id: Option<Uuid>,

  /// Decision waiting for confirmation, shown as a modal.
  pub pending_action: Option<PendingAction>,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  /// Shared HTTP client, already logged in as staff.
  pub client: Arc<ApiClient>,
}

impl App {
  /// Create an [`App`] on the pending queue with no records loaded.
  pub fn new(client: ApiClient) -> Self {
    Self {
      screen: Screen::Queue,
      tab: AdmissionStatus::Pending,
      records: Vec::new(),
      counts: PartitionCounts::default(),
      filter: String::new(),
      filter_active: false,
      list_cursor: 0,
      detail_scroll: 0,
      selected_id: None,
      pending_action: None,
      status_msg: String::new(),
      client: Arc::new(client),
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Fetch the active partition and the counts from the API.
  pub async fn load(&mut self) -> anyhow::Result<()> {
    self.status_msg = "Loading…".into();
    match self.client.list_admissions(self.tab).await {
      Ok(records) => {
        self.records = records;
        if self.list_cursor >= self.records.len() {
          self.list_cursor = self.records.len().saturating_sub(1);
        }
        self.status_msg = String::new();
      }
      Err(e) => {
        self.status_msg = format!("Error: {e}");
        return Err(e);
      }
    }
    if let Ok(counts) = self.client.counts(false).await {
      self.counts = counts;
    }
    Ok(())
  }

  /// Fold in a counts snapshot pushed by the background long-poll. A
  /// change means another operator moved a record, so the active
  /// partition is refetched too — unless a confirmation modal is armed,
  /// in which case only the badges update and the queue stays put under
  /// the cursor.
  pub async fn apply_counts(&mut self, counts: PartitionCounts) {
    if counts == self.counts {
      return;
    }
    self.counts = counts;
    if self.pending_action.is_some() {
      return;
    }
    if let Ok(records) = self.client.list_admissions(self.tab).await {
      self.records = records;
      if self.list_cursor >= self.records.len() {
        self.list_cursor = self.records.len().saturating_sub(1);
      }
    }
  }

  /// Switch to `tab` and reload, resetting cursor and filter.
  async fn switch_tab(&mut self, tab: AdmissionStatus) -> anyhow::Result<()> {
    if self.tab == tab {
      return Ok(());
    }
    self.tab = tab;
    self.list_cursor = 0;
    self.filter.clear();
    self.filter_active = false;
    self.selected_id = None;
    self.screen = Screen::Queue;
    self.load().await
  }

  // ── Filtered list ─────────────────────────────────────────────────────────

  /// Records of the active partition that match the current filter query.
  pub fn filtered_records(&self) -> Vec<&ApplicantRecord> {
    if self.filter.is_empty() {
      return self.records.iter().collect();
    }
    let matcher = SkimMatcherV2::default();
    self
      .records
      .iter()
      .filter(|r| {
        matcher.fuzzy_match(&r.display_name(), &self.filter).is_some()
          || matcher
            .fuzzy_match(&r.application.email, &self.filter)
            .is_some()
      })
      .collect()
  }

  /// The record under the list cursor in the filtered view, if any.
  pub fn cursor_record(&self) -> Option<&ApplicantRecord> {
    let list = self.filtered_records();
    list.get(self.list_cursor).copied()
  }

  /// The record shown in the detail pane, if any.
  pub fn selected_record(&self) -> Option<&ApplicantRecord> {
    let id = self.selected_id?;
    self.records.iter().find(|r| r.applicant_id == id)
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    // A pending decision swallows all keys until confirmed or cancelled.
    if self.pending_action.is_some() {
      return self.handle_confirm_key(key).await;
    }

    // Filter input mode: all printable keys go into the filter string.
    if self.filter_active {
      return self.handle_filter_key(key);
    }

    match self.screen {
      Screen::Queue => self.handle_queue_key(key).await,
      Screen::Detail => self.handle_detail_key(key).await,
    }
  }

  async fn handle_confirm_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Char('y') | KeyCode::Enter => {
        let action = match self.pending_action.take() {
          Some(action) => action,
          None => return Ok(true),
        };
        self.run_decision(action).await;
      }
      KeyCode::Char('n') | KeyCode::Esc => {
        self.pending_action = None;
        self.status_msg = String::new();
      }
      _ => {}
    }
    Ok(true)
  }

  fn handle_filter_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
        self.list_cursor = 0;
      }
      KeyCode::Enter => {
        self.filter_active = false;
        self.list_cursor = 0;
      }
      KeyCode::Backspace => {
        self.filter.pop();
        self.list_cursor = 0;
      }
      KeyCode::Char(c) => {
        self.filter.push(c);
        self.list_cursor = 0;
      }
      _ => {}
    }
    Ok(true)
  }

  async fn handle_queue_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      // Quit
      KeyCode::Char('q') => return Ok(false),

      // Partition tabs
      KeyCode::Char('1') => self.switch_tab(AdmissionStatus::Pending).await?,
      KeyCode::Char('2') => self.switch_tab(AdmissionStatus::Approved).await?,
      KeyCode::Char('3') => self.switch_tab(AdmissionStatus::Rejected).await?,
      KeyCode::Tab => {
        let next = match self.tab {
          AdmissionStatus::Pending => AdmissionStatus::Approved,
          AdmissionStatus::Approved => AdmissionStatus::Rejected,
          AdmissionStatus::Rejected => AdmissionStatus::Pending,
        };
        self.switch_tab(next).await?;
      }

      // Navigation
      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.filtered_records().len();
        if len > 0 && self.list_cursor + 1 < len {
          self.list_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        if self.list_cursor > 0 {
          self.list_cursor -= 1;
        }
      }

      // Open detail
      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
        if let Some(id) = self.cursor_record().map(|r| r.applicant_id) {
          self.selected_id = Some(id);
          self.detail_scroll = 0;
          self.screen = Screen::Detail;
        }
      }

      // Decisions (pending queue only)
      KeyCode::Char('a') => self.arm_decision(PendingAction::Approve),
      KeyCode::Char('r') => self.arm_decision(PendingAction::Reject),

      // Refresh
      KeyCode::Char('R') => {
        self.load().await.ok();
      }

      // Filter
      KeyCode::Char('/') => {
        self.filter_active = true;
        self.filter.clear();
        self.list_cursor = 0;
      }

      _ => {}
    }
    Ok(true)
  }

  async fn handle_detail_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      // Quit
      KeyCode::Char('q') => return Ok(false),

      // Back to queue
      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => {
        self.screen = Screen::Queue;
        self.selected_id = None;
      }

      // Scroll detail
      KeyCode::Down | KeyCode::Char('j') => {
        self.detail_scroll += 1;
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.detail_scroll = self.detail_scroll.saturating_sub(1);
      }

      // Decisions work from the detail pane too.
      KeyCode::Char('a') => self.arm_decision(PendingAction::Approve),
      KeyCode::Char('r') => self.arm_decision(PendingAction::Reject),

      _ => {}
    }
    Ok(true)
  }

  // ── Decisions ─────────────────────────────────────────────────────────────

  /// The applicant a decision would land on: detail selection first, else the
  /// queue cursor.
  fn decision_target(&self) -> Option<&ApplicantRecord> {
    self.selected_record().or_else(|| self.cursor_record())
  }

  /// Arm the y/n confirmation for `action`. Decisions only apply to pending
  /// applicants; other tabs get a status hint instead of a modal.
  fn arm_decision(&mut self, action: PendingAction) {
    let Some(record) = self.decision_target() else {
      return;
    };
    if !record.status.is_pending() {
      self.status_msg = format!("{} has already been decided.", record.display_name());
      return;
    }
    self.pending_action = Some(action);
  }

  /// Execute a confirmed decision against the portal and reload.
  async fn run_decision(&mut self, action: PendingAction) {
    let Some((id, name)) = self
      .decision_target()
      .map(|r| (r.applicant_id, r.display_name()))
    else {
      return;
    };

    let result = match action {
      PendingAction::Approve => match self.client.approve(id).await {
        Ok(outcome) => Ok(format!(
          "Approved {name}. Password: {}",
          outcome.generated_password
        )),
        Err(e) => Err(e),
      },
      PendingAction::Reject => match self.client.reject(id).await {
        Ok(_) => Ok(format!("Rejected {name}.")),
        Err(e) => Err(e),
      },
    };

    match result {
      Ok(msg) => {
        self.status_msg = msg;
        self.screen = Screen::Queue;
        self.selected_id = None;
        self.load().await.ok();
      }
      Err(e) => {
        self.status_msg = format!("Error: {e}");
        // The row may have been decided elsewhere; resync either way.
        self.load().await.ok();
      }
    }
  }
}
