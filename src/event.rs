use crate::descriptor::RepoDescriptor;
use crate::registry::service::RegistrationOutcome;
use crate::validation::ValidationEvent;
use crossterm::event::KeyEvent;

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
    Validation(ValidationEvent),
    Registered {
        repo: RepoDescriptor,
        outcome: RegistrationOutcome,
    },
}
