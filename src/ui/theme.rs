use ratatui::style::Color;

pub const STATUS_BG: Color = Color::Rgb(30, 30, 40);
pub const ACCENT: Color = Color::Rgb(140, 115, 200);
pub const SEPARATOR: Color = Color::Rgb(55, 55, 75);
pub const DIM_TEXT: Color = Color::Rgb(100, 100, 120);
pub const ACTIVE_BORDER: Color = Color::Rgb(120, 120, 180);
pub const INPUT_FG: Color = Color::Rgb(220, 220, 230);
pub const CURSOR: Color = Color::Cyan;

pub const SPINNER_FG: Color = Color::Yellow;
pub const SUCCESS_FG: Color = Color::Green;
pub const ERROR_FG: Color = Color::LightRed;
pub const WARN_FG: Color = Color::Yellow;
