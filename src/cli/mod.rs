mod app;
mod args;
mod commands;
mod terminal;
pub(crate) mod theme;
mod timeline;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use app::{UiRegions, run_tui, ui_regions};
pub use args::CliArgs;
