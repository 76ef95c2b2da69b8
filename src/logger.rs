//! Logging to stderr through `tracing`.

use time::format_description;
use tracing::{subscriber::set_global_default, Level};
use tracing_subscriber::FmtSubscriber;

/// Will panic on error
pub fn init_logger() {
    let offset = time::UtcOffset::current_local_offset().unwrap_or(time::UtcOffset::UTC);
    let timer = tracing_subscriber::fmt::time::OffsetTime::new(
        offset,
        format_description::parse("[year]-[month]-[day] [hour]:[minute]:[second]").unwrap(),
    );

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_ansi(false)
        .with_timer(timer)
        .with_writer(std::io::stderr)
        .finish();

    set_global_default(subscriber).expect("Could not set global default tracing subscriber. Consider disabling logs if you are already setting a subscriber.");
}
