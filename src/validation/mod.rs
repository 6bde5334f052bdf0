pub mod controller;
pub mod state;

pub use controller::{ValidationController, ValidationEvent};
pub use state::{project, StatusGlyph, ValidationState};
