use crate::config::Config;
use crate::descriptor::RepoDescriptor;
use crate::event::AppEvent;
use crate::github::checker::RepoChecker;
use crate::registry::client::RegistryClient;
use crate::registry::service::RegistrationOutcome;
use crate::ui::{
    help_panel::HelpPanel,
    input::{self, Action},
    search_bar::SearchBar,
    status_bar::StatusBar,
    theme,
    toast::{Notification, NotifyLevel, Toast},
};
use crate::validation::{project, ValidationController, ValidationState};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

pub struct App {
    pub config: Config,
    pub controller: ValidationController,
    pub registry: Option<RegistryClient>,
    tx: mpsc::UnboundedSender<AppEvent>,

    pub input: String,
    pub spinner_frame: usize,
    pub notification: Option<Notification>,
    pub show_help: bool,
    pub submitting: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        config: Config,
        checker: Arc<dyn RepoChecker>,
        tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        let controller = ValidationController::new(checker, config.debounce(), tx.clone());
        let registry = config.registry_url.as_deref().map(RegistryClient::new);

        Self {
            config,
            controller,
            registry,
            tx,
            input: String::new(),
            spinner_frame: 0,
            notification: None,
            show_help: false,
            submitting: false,
            should_quit: false,
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => {
                let action = input::map_key(key, self.show_help);
                self.handle_action(action);
            }
            AppEvent::Resize => {}
            AppEvent::Tick => {
                self.spinner_frame = self.spinner_frame.wrapping_add(1);
                if self
                    .notification
                    .as_ref()
                    .is_some_and(|n| n.is_expired(Instant::now()))
                {
                    self.notification = None;
                }
            }
            AppEvent::Validation(ev) => self.controller.handle_event(ev),
            AppEvent::Registered { repo, outcome } => self.on_registered(&repo, outcome),
        }
    }

    fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::InputChar(c) => {
                self.input.push(c);
                self.controller.on_input(&self.input);
            }
            Action::InputBackspace => {
                if self.input.pop().is_some() {
                    self.controller.on_input(&self.input);
                }
            }
            Action::InputClear => {
                if !self.input.is_empty() {
                    self.input.clear();
                    self.controller.on_input(&self.input);
                }
            }
            Action::Submit => self.submit(),
            Action::Help => self.show_help = true,
            Action::ClosePopup => self.show_help = false,
            Action::None => {}
        }
    }

    fn notify(&mut self, level: NotifyLevel, message: impl Into<String>) {
        self.notification = Some(Notification::new(level, message));
    }

    fn submit(&mut self) {
        if self.submitting {
            return;
        }
        let repo = match (self.controller.state(), self.controller.current_repo()) {
            (ValidationState::Valid, Some(repo)) => repo.clone(),
            _ => {
                self.notify(NotifyLevel::Warn, "Only a validated repo can be registered");
                return;
            }
        };
        let Some(client) = self.registry.clone() else {
            self.notify(NotifyLevel::Warn, "No registry configured (set registry_url)");
            return;
        };

        self.submitting = true;
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = client.register(&repo).await;
            let _ = tx.send(AppEvent::Registered { repo, outcome });
        });
    }

    fn on_registered(&mut self, repo: &RepoDescriptor, outcome: RegistrationOutcome) {
        self.submitting = false;
        let (level, message) = match outcome {
            RegistrationOutcome::Created(_) => (NotifyLevel::Info, format!("Added {repo}")),
            RegistrationOutcome::Conflict => {
                (NotifyLevel::Info, format!("{repo} is already registered"))
            }
            RegistrationOutcome::NotFound => {
                (NotifyLevel::Error, format!("{repo} does not exist on GitHub"))
            }
            RegistrationOutcome::Invalid(m) => (NotifyLevel::Error, m),
            RegistrationOutcome::InternalError(m) => {
                (NotifyLevel::Error, format!("Registration failed: {m}"))
            }
        };
        self.notify(level, message);
    }

    fn hint_line(&self) -> Line<'_> {
        let dim = Style::default().fg(theme::DIM_TEXT);
        match self.controller.state() {
            ValidationState::Idle if self.input.is_empty() => {
                Line::from(Span::styled("Type a GitHub repository as owner/repo", dim))
            }
            ValidationState::Idle => Line::from(Span::styled("\u{2026}", dim)),
            ValidationState::Pending => Line::from(Span::styled(
                format!(
                    "Checking {}\u{2026}",
                    self.controller
                        .current_repo()
                        .map(ToString::to_string)
                        .unwrap_or_default()
                ),
                dim,
            )),
            ValidationState::Valid if self.submitting => {
                Line::from(Span::styled("Registering\u{2026}", dim))
            }
            ValidationState::Valid => Line::from(Span::styled(
                "Valid hook repository. Press Enter to register.",
                Style::default().fg(theme::SUCCESS_FG),
            )),
            ValidationState::Invalid(message) => Line::from(Span::styled(
                message.as_str(),
                Style::default().fg(theme::ERROR_FG),
            )),
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        let size = frame.area();

        let [body, status_area] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(size);

        let column = centered_column(body, 70);
        let [_, search_area, hint_area, _] = Layout::vertical([
            Constraint::Percentage(30),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .areas(column);

        frame.render_widget(
            SearchBar {
                text: &self.input,
                glyph: project(self.controller.state()),
                spinner_frame: self.spinner_frame,
            },
            search_area,
        );
        frame.render_widget(Paragraph::new(self.hint_line()), hint_area);

        frame.render_widget(
            StatusBar {
                registry: self.registry.as_ref().map(RegistryClient::endpoint),
                authenticated: self.config.github_token().is_some(),
            },
            status_area,
        );

        if let Some(ref notification) = self.notification {
            frame.render_widget(Toast { notification }, body);
        }

        if self.show_help {
            frame.render_widget(HelpPanel, size);
        }
    }
}

fn centered_column(area: Rect, percent: u16) -> Rect {
    let [_, column, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent) / 2),
        Constraint::Percentage(percent),
        Constraint::Min(0),
    ])
    .areas(area);
    column
}
