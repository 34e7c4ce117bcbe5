//! Вывод результатов в stdout или файл

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Writer для вывода результатов
pub struct OutputWriter {
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Создает writer для stdout
    pub fn stdout() -> Self {
        Self {
            writer: Box::new(io::stdout()),
        }
    }

    /// Создает writer для файла
    pub fn file(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Self {
            writer: Box::new(BufWriter::new(file)),
        })
    }

    /// stdout when `path` is `None`
    pub fn create(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::file(path),
            None => Ok(Self::stdout()),
        }
    }

    pub fn write_str(&mut self, content: &str) -> Result<()> {
        self.writer.write_all(content.as_bytes())?;
        if !content.ends_with('\n') {
            self.writer.write_all(b"\n")?;
        }
        Ok(())
    }

    /// Завершает запись и сбрасывает буфер
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
