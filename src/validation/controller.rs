use crate::descriptor::{self, RepoDescriptor};
use crate::event::AppEvent;
use crate::github::checker::{CheckFailure, RepoChecker};
use crate::validation::state::ValidationState;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Continuations of the validation pipeline, delivered back through the
/// event loop. Each carries the generation it was scheduled under.
#[derive(Debug)]
pub enum ValidationEvent {
    CheckDue {
        generation: u64,
        repo: RepoDescriptor,
    },
    Resolved {
        generation: u64,
        repo: RepoDescriptor,
        outcome: Result<(), CheckFailure>,
    },
}

/// Turns raw search-box text into a [`ValidationState`] that always reflects
/// the latest input.
///
/// Every edit bumps the generation. Timers and checks capture the generation
/// they were started under and are ignored on arrival if it has moved on, both
/// before the check is dispatched and after it resolves. In-flight lookups are
/// never interrupted; their results are simply dropped.
pub struct ValidationController {
    checker: Arc<dyn RepoChecker>,
    tx: mpsc::UnboundedSender<AppEvent>,
    quiet: Duration,
    generation: u64,
    state: ValidationState,
    current: Option<RepoDescriptor>,
    debounce: Option<JoinHandle<()>>,
}

impl ValidationController {
    pub fn new(
        checker: Arc<dyn RepoChecker>,
        quiet: Duration,
        tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            checker,
            tx,
            quiet,
            generation: 0,
            state: ValidationState::Idle,
            current: None,
            debounce: None,
        }
    }

    pub fn state(&self) -> &ValidationState {
        &self.state
    }

    #[cfg(test)]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The descriptor parsed from the latest input, if it parsed.
    pub fn current_repo(&self) -> Option<&RepoDescriptor> {
        self.current.as_ref()
    }

    pub fn on_input(&mut self, text: &str) {
        self.generation += 1;
        let generation = self.generation;

        if let Some(timer) = self.debounce.take() {
            timer.abort();
        }
        self.current = None;

        if text.is_empty() {
            self.state = ValidationState::Idle;
            return;
        }

        let repo = match descriptor::parse(text) {
            Ok(repo) => repo,
            Err(e) => {
                self.state = ValidationState::Invalid(e.to_string());
                return;
            }
        };

        self.state = ValidationState::Idle;
        self.current = Some(repo.clone());

        let tx = self.tx.clone();
        let quiet = self.quiet;
        self.debounce = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            let _ = tx.send(AppEvent::Validation(ValidationEvent::CheckDue {
                generation,
                repo,
            }));
        }));
    }

    pub fn handle_event(&mut self, event: ValidationEvent) {
        match event {
            ValidationEvent::CheckDue { generation, repo } => self.dispatch(generation, repo),
            ValidationEvent::Resolved {
                generation,
                repo,
                outcome,
            } => self.resolve(generation, repo, outcome),
        }
    }

    fn dispatch(&mut self, generation: u64, repo: RepoDescriptor) {
        if generation != self.generation {
            return;
        }
        self.debounce = None;
        self.state = ValidationState::Pending;
        tracing::debug!(%repo, generation, "checking repo");

        let checker = Arc::clone(&self.checker);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = checker.check(&repo).await;
            let _ = tx.send(AppEvent::Validation(ValidationEvent::Resolved {
                generation,
                repo,
                outcome,
            }));
        });
    }

    fn resolve(&mut self, generation: u64, repo: RepoDescriptor, outcome: Result<(), CheckFailure>) {
        if generation != self.generation {
            tracing::debug!(%repo, generation, current = self.generation, "dropping stale check result");
            return;
        }
        self.state = match outcome {
            Ok(()) => ValidationState::Valid,
            Err(failure) => ValidationState::Invalid(failure.to_string()),
        };
    }
}

impl Drop for ValidationController {
    fn drop(&mut self) {
        if let Some(timer) = self.debounce.take() {
            timer.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ParseFailure;
    use crate::test_utils::ScriptedChecker;
    use tokio::time::{self, Instant};

    const QUIET: Duration = Duration::from_millis(300);

    fn setup(
        checker: ScriptedChecker,
    ) -> (
        ValidationController,
        Arc<ScriptedChecker>,
        mpsc::UnboundedReceiver<AppEvent>,
    ) {
        let checker = Arc::new(checker);
        let (tx, rx) = mpsc::unbounded_channel();
        let ctrl = ValidationController::new(checker.clone(), QUIET, tx);
        (ctrl, checker, rx)
    }

    /// Feed loop events to the controller until `ms` of virtual time pass.
    async fn run_for(
        ctrl: &mut ValidationController,
        rx: &mut mpsc::UnboundedReceiver<AppEvent>,
        ms: u64,
    ) {
        let deadline = Instant::now() + Duration::from_millis(ms);
        loop {
            match time::timeout_at(deadline, rx.recv()).await {
                Ok(Some(AppEvent::Validation(ev))) => ctrl.handle_event(ev),
                Ok(Some(_)) => {}
                Ok(None) | Err(_) => break,
            }
        }
    }

    fn invalid(failure: CheckFailure) -> ValidationState {
        ValidationState::Invalid(failure.to_string())
    }

    #[tokio::test(start_paused = true)]
    async fn test_valid_repo_goes_idle_pending_valid() {
        let (mut ctrl, checker, mut rx) =
            setup(ScriptedChecker::new().respond("foo/bar", 100, Ok(())));

        ctrl.on_input("foo/bar");
        assert_eq!(ctrl.state(), &ValidationState::Idle);

        run_for(&mut ctrl, &mut rx, 290).await;
        assert_eq!(ctrl.state(), &ValidationState::Idle);
        assert!(checker.calls().is_empty());

        run_for(&mut ctrl, &mut rx, 50).await;
        assert_eq!(ctrl.state(), &ValidationState::Pending);

        run_for(&mut ctrl, &mut rx, 200).await;
        assert_eq!(ctrl.state(), &ValidationState::Valid);
        assert_eq!(checker.calls(), vec!["foo/bar"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_parse_failure_is_immediate_and_offline() {
        let (mut ctrl, checker, mut rx) = setup(ScriptedChecker::new());

        ctrl.on_input("foo/bar/baz");
        assert_eq!(
            ctrl.state(),
            &ValidationState::Invalid(ParseFailure.to_string())
        );
        assert!(ctrl.current_repo().is_none());

        run_for(&mut ctrl, &mut rx, 2_000).await;
        assert!(checker.calls().is_empty());
        assert_eq!(
            ctrl.state(),
            &ValidationState::Invalid(ParseFailure.to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_keystrokes_collapse_into_one_check() {
        let (mut ctrl, checker, mut rx) =
            setup(ScriptedChecker::new().respond("foo/bar", 50, Ok(())));

        for text in ["f", "fo", "foo", "foo/", "foo/b", "foo/ba", "foo/bar"] {
            ctrl.on_input(text);
            run_for(&mut ctrl, &mut rx, 60).await;
        }
        run_for(&mut ctrl, &mut rx, 1_000).await;

        assert_eq!(checker.calls(), vec!["foo/bar"]);
        assert_eq!(ctrl.state(), &ValidationState::Valid);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeating_same_text_checks_once() {
        let (mut ctrl, checker, mut rx) =
            setup(ScriptedChecker::new().respond("foo/bar", 50, Ok(())));

        for _ in 0..5 {
            ctrl.on_input("foo/bar");
            run_for(&mut ctrl, &mut rx, 100).await;
        }
        run_for(&mut ctrl, &mut rx, 1_000).await;

        assert_eq!(checker.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_within_quiet_interval_never_checks() {
        let (mut ctrl, checker, mut rx) = setup(
            ScriptedChecker::new()
                .respond("foo/bar", 50, Ok(()))
                .respond("foo/baz", 50, Err(CheckFailure::NotFound)),
        );

        ctrl.on_input("foo/bar");
        run_for(&mut ctrl, &mut rx, 100).await;
        ctrl.on_input("foo/baz");
        run_for(&mut ctrl, &mut rx, 2_000).await;

        assert_eq!(checker.calls(), vec!["foo/baz"]);
        assert_eq!(ctrl.state(), &invalid(CheckFailure::NotFound));
    }

    #[tokio::test(start_paused = true)]
    async fn test_queued_check_for_old_input_is_skipped() {
        let (mut ctrl, checker, mut rx) = setup(
            ScriptedChecker::new()
                .respond("foo/bar", 50, Ok(()))
                .respond("foo/baz", 50, Err(CheckFailure::InvalidManifest)),
        );

        ctrl.on_input("foo/bar");
        // Let the timer fire without draining: its CheckDue sits in the queue.
        time::sleep(QUIET + Duration::from_millis(10)).await;
        ctrl.on_input("foo/baz");

        run_for(&mut ctrl, &mut rx, 10).await;
        assert_eq!(ctrl.state(), &ValidationState::Idle);
        assert!(checker.calls().is_empty());

        run_for(&mut ctrl, &mut rx, 2_000).await;
        assert_eq!(checker.calls(), vec!["foo/baz"]);
        assert_eq!(ctrl.state(), &invalid(CheckFailure::InvalidManifest));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_early_check_cannot_overwrite_later_result() {
        let (mut ctrl, checker, mut rx) = setup(
            ScriptedChecker::new()
                .respond("foo/bar", 5_000, Ok(()))
                .respond("foo/baz", 100, Err(CheckFailure::InvalidManifest)),
        );

        ctrl.on_input("foo/bar");
        run_for(&mut ctrl, &mut rx, 310).await;
        assert_eq!(ctrl.state(), &ValidationState::Pending);

        ctrl.on_input("foo/baz");
        run_for(&mut ctrl, &mut rx, 500).await;
        assert_eq!(ctrl.state(), &invalid(CheckFailure::InvalidManifest));

        run_for(&mut ctrl, &mut rx, 10_000).await;
        assert_eq!(checker.calls(), vec!["foo/bar", "foo/baz"]);
        assert_eq!(ctrl.state(), &invalid(CheckFailure::InvalidManifest));
    }

    #[tokio::test(start_paused = true)]
    async fn test_parse_failure_while_check_in_flight_sticks() {
        let (mut ctrl, _checker, mut rx) =
            setup(ScriptedChecker::new().respond("foo/bar", 1_000, Ok(())));

        ctrl.on_input("foo/bar");
        run_for(&mut ctrl, &mut rx, 400).await;
        assert_eq!(ctrl.state(), &ValidationState::Pending);

        ctrl.on_input("foo/bar/");
        run_for(&mut ctrl, &mut rx, 5_000).await;
        assert_eq!(
            ctrl.state(),
            &ValidationState::Invalid(ParseFailure.to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_clearing_input_returns_to_idle() {
        let (mut ctrl, checker, mut rx) =
            setup(ScriptedChecker::new().respond("foo/bar", 1_000, Ok(())));

        ctrl.on_input("foo/bar");
        run_for(&mut ctrl, &mut rx, 400).await;
        ctrl.on_input("");
        assert_eq!(ctrl.state(), &ValidationState::Idle);

        run_for(&mut ctrl, &mut rx, 5_000).await;
        assert_eq!(ctrl.state(), &ValidationState::Idle);
        assert_eq!(checker.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failure_only_fails_that_check() {
        let (mut ctrl, _checker, mut rx) = setup(
            ScriptedChecker::new()
                .respond("foo/bar", 50, Err(CheckFailure::Transport))
                .respond("foo/baz", 50, Ok(())),
        );

        ctrl.on_input("foo/bar");
        run_for(&mut ctrl, &mut rx, 1_000).await;
        assert_eq!(ctrl.state(), &invalid(CheckFailure::Transport));

        ctrl.on_input("foo/baz");
        run_for(&mut ctrl, &mut rx, 1_000).await;
        assert_eq!(ctrl.state(), &ValidationState::Valid);
    }

    #[tokio::test(start_paused = true)]
    async fn test_generation_bumps_on_every_edit() {
        let (mut ctrl, _checker, _rx) = setup(ScriptedChecker::new());

        ctrl.on_input("foo");
        ctrl.on_input("foo/bar");
        ctrl.on_input("");
        assert_eq!(ctrl.generation(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_script_same_outcome() {
        async fn run_script() -> ValidationState {
            let (mut ctrl, _checker, mut rx) = setup(
                ScriptedChecker::new()
                    .respond("a/one", 700, Ok(()))
                    .respond("a/two", 200, Err(CheckFailure::NotFound)),
            );
            ctrl.on_input("a/one");
            run_for(&mut ctrl, &mut rx, 350).await;
            ctrl.on_input("a/two");
            run_for(&mut ctrl, &mut rx, 5_000).await;
            ctrl.state().clone()
        }

        let first = run_script().await;
        let second = run_script().await;
        assert_eq!(first, second);
        assert_eq!(first, invalid(CheckFailure::NotFound));
    }
}
