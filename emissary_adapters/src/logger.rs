use std::io::Write;

use log::Level;
use chrono::Local;

// Next level (less verbose)
fn next_level(level: Level) -> Level {
    Level::iter()
        .filter(|item| *item < level)
        .last()
        .unwrap_or(Level::Error)
}

/// Installs global logger.
/// Access log of the HTTP server is one level less verbose than
/// the rest of the application. `RUST_LOG` overrides both.
pub fn configure_logger(base_level: Level) -> () {
    let access_log_level = next_level(base_level);
    env_logger::Builder::new()
        .format(|buf, record| {
            writeln!(buf,
                "{} {} [{}] {}",
                Local::now().format("%Y-%m-%dT%H:%M:%S"),
                record.target(),
                record.level(),
                record.args(),
            )
        })
        .filter_level(base_level.to_level_filter())
        .filter_module("actix_web::middleware::logger", access_log_level.to_level_filter())
        .parse_default_env()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_level() {
        assert_eq!(next_level(Level::Debug), Level::Info);
        assert_eq!(next_level(Level::Info), Level::Warn);
        assert_eq!(next_level(Level::Error), Level::Error);
    }
}
