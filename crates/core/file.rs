use std::{
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use eyre::{eyre, Context};
use log::{info, trace, warn};
use serde_json::{json, Value};

/// Open the destination of the rows, the file at `path` or stdout.
///
/// A file is truncated and any missing parent directories are created.
pub fn open_output(path: Option<&Path>) -> eyre::Result<Box<dyn Write>> {
    let Some(path) = path else {
        trace!("writing rows to stdout");
        return Ok(Box::new(io::stdout().lock()));
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).wrap_err_with(|| {
            format!("Failed to create the '{}' directory.", parent.display())
        })?;
    }

    info!("writing rows to `{}`", path.display());
    File::create(path)
        .map(|f| Box::new(f) as Box<dyn Write>)
        .wrap_err_with(|| eyre!("Failed to open the '{}' file for writing.", path.display()))
}

/// An append only file of raw responses, one JSON object per line.
///
/// A log that cannot be opened or written to is reported once and then ignored, it never stops
/// the batch.
pub struct RawLog {
    file: Option<File>,
    path: PathBuf,
}

impl RawLog {
    pub fn open(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::disabled();
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| warn!("continuing without the '{}' log: {e}", path.display()))
            .ok();

        Self {
            file,
            path: path.to_owned(),
        }
    }

    fn disabled() -> Self {
        Self {
            file: None,
            path: PathBuf::new(),
        }
    }

    pub fn append(&mut self, doi: &str, response: &Value) {
        let Some(file) = &mut self.file else {
            return;
        };

        let line = json!({ "doi": doi, "response": response });
        if let Err(e) = writeln!(file, "{line}").and_then(|()| file.flush()) {
            warn!(
                "continuing without the '{}' log: {e}",
                self.path.display()
            );
            self.file = None;
        }
    }
}
