use crate::app::types::{App, InputMode, Outcome, Phase};
use crate::host_list::HostList;
use crate::models::HostRecord;
use crate::ssh_service::resolve_program;
use std::time::Instant;

// Rows taken by the search box, list borders, status bar and footer.
const CHROME_ROWS: u16 = 7;
// Each entry renders as a title line and a description line.
const ROWS_PER_ENTRY: u16 = 2;

impl App {
    pub fn new(hosts: Vec<HostRecord>, program: impl Into<String>) -> Self {
        tracing::info!("Starting host picker with {} hosts", hosts.len());
        Self {
            should_quit: false,
            list: HostList::new(hosts),
            phase: Phase::Listing,
            input_mode: InputMode::Normal,
            selected_host: None,
            status_message: None,
            width: 0,
            height: 0,
            program: program.into(),
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    pub fn clear_status_message(&mut self) {
        self.status_message = None;
    }

    pub fn on_resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        let rows = height.saturating_sub(CHROME_ROWS) / ROWS_PER_ENTRY;
        self.list.resize(usize::from(rows));
    }

    pub fn is_connecting(&self) -> bool {
        self.phase == Phase::Connecting
    }

    /// Hands the highlighted host to the launcher. Ignored while a
    /// connection is already in progress.
    pub fn activate(&mut self) {
        if self.phase != Phase::Listing {
            return;
        }
        let Some(host) = self.list.activate() else {
            tracing::warn!("Enter pressed but no host selected.");
            self.set_status("No host selected");
            return;
        };

        if resolve_program(&self.program).is_none() {
            self.fail(format!("{} not found in PATH", self.program));
            return;
        }

        tracing::info!("Selected host: {}", host.name);
        self.selected_host = Some(host);
        self.phase = Phase::Connecting;
        self.should_quit = true;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!("{}", message);
        self.phase = Phase::Failed(message);
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn enter_search_mode(&mut self) {
        self.input_mode = InputMode::Search;
    }

    // Clear search and return to normal mode
    pub fn clear_search(&mut self) {
        self.list.clear_filter();
        self.input_mode = InputMode::Normal;
    }

    pub fn outcome(self) -> Outcome {
        match self.phase {
            Phase::Failed(message) => Outcome::Failed(message),
            Phase::Connecting => match self.selected_host {
                Some(host) => Outcome::Connect(host),
                None => Outcome::Quit,
            },
            Phase::Listing => Outcome::Quit,
        }
    }
}
