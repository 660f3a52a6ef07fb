#[macro_use]
extern crate tracing;

mod app;
mod logging;

pub use app::run;
pub use logging::init_logging;

pub fn init_errors() -> color_eyre::Result<()> {
    color_eyre::install()
}
