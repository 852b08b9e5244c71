mod rail;
mod status_bar;

pub use rail::RailWidget;
pub use status_bar::StatusBarWidget;
