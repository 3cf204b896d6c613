mod config_cmd;
mod history;
mod log;
mod progress;

pub use config_cmd::ConfigCommand;
pub use history::{DeleteCommand, HistoryCommand};
pub use log::LogCommand;
pub use progress::{TodayCommand, WeekCommand};
