//! Общий модуль для CLI
//!
//! Инициализация логирования, цветной вывод сообщений и форматирование
//! размеров и длительностей.

use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use tracing_subscriber::EnvFilter;

pub mod output;

pub use output::OutputWriter;

/// Инициализирует систему логирования. `RUST_LOG` учитывается, `verbose` поднимает уровень до DEBUG.
pub fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();

    Ok(())
}

/// Выводит заголовок CLI утилиты
pub fn print_header(name: &str, version: &str, description: &str) {
    eprintln!("{} {}", name.bold().blue(), version.dimmed());
    eprintln!("{}\n", description.dimmed());
}

pub fn print_success(message: &str) {
    eprintln!("{} {}", "✅".green(), message.green());
}

pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠️".yellow(), message.yellow());
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "❌".red(), message.red());
}

/// Проверяет существование файла
pub fn validate_path(path: &Path, description: &str) -> Result<()> {
    if !path.exists() {
        return Err(anyhow::anyhow!(
            "{} does not exist: {}",
            description,
            path.display()
        ));
    }
    Ok(())
}

/// Форматирует размер файла в человекочитаемый вид
pub fn format_file_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = size as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", size as u64, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

/// Форматирует продолжительность в человекочитаемый вид
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs == 0 {
        format!("{}ms", millis)
    } else if secs < 60 {
        format!("{}.{:03}s", secs, millis)
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
