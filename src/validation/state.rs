#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ValidationState {
    #[default]
    Idle,
    Pending,
    Valid,
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusGlyph<'a> {
    Neutral,
    Spinner,
    Success,
    Error(&'a str),
}

pub fn project(state: &ValidationState) -> StatusGlyph<'_> {
    match state {
        ValidationState::Idle => StatusGlyph::Neutral,
        ValidationState::Pending => StatusGlyph::Spinner,
        ValidationState::Valid => StatusGlyph::Success,
        ValidationState::Invalid(message) => StatusGlyph::Error(message),
    }
}
