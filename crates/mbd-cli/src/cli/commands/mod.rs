//! CLI command handlers, one file per command.

mod check;
mod list;
mod run;
mod settings;

pub use check::run_check;
pub use list::run_list;
pub use run::{run_batches, RunOptions};
pub use settings::run_settings;
