use colored::Color;

pub const PRIMARY: Color = Color::Magenta;
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;
pub const SUCCESS: Color = Color::Green;
pub const FAIL: Color = Color::Yellow;
pub const ERROR: Color = Color::Red;
