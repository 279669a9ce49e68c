// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! JSON-Lines decode log with daily file rotation.

use std::fs::{create_dir_all, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::Utc;
use serde_json::json;
use tracing::warn;

use mrx_core::MorseTranscript;

use crate::config::DecodeLogsConfig;

/// Appends flushed Morse transcripts to a dated JSON-Lines file.
///
/// The file name template may contain `%YYYY%`/`%MM%`/`%DD%`; the writer
/// reopens the file whenever the resolved name changes, so logs roll
/// over at UTC midnight without any scheduler.
pub struct MorseLogger {
    base_dir: PathBuf,
    file_template: String,
    state: Mutex<LoggerState>,
}

struct LoggerState {
    current_file_name: String,
    writer: BufWriter<File>,
}

impl MorseLogger {
    /// Returns `Ok(None)` when decode logging is disabled.
    pub fn from_config(cfg: &DecodeLogsConfig) -> Result<Option<Self>, String> {
        if !cfg.enabled {
            return Ok(None);
        }

        let base_dir = PathBuf::from(cfg.dir.trim());
        create_dir_all(&base_dir)
            .map_err(|e| format!("create decode log dir '{}': {}", base_dir.display(), e))?;

        let file_name = resolve_file_name(&cfg.morse_file);
        let path = base_dir.join(&file_name);
        let writer = open_writer(&path)?;

        Ok(Some(Self {
            base_dir,
            file_template: cfg.morse_file.clone(),
            state: Mutex::new(LoggerState {
                current_file_name: file_name,
                writer,
            }),
        }))
    }

    pub fn log_morse(&self, transcript: &MorseTranscript) {
        let ts_ms = match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_millis() as u64,
            Err(_) => 0,
        };
        let line = json!({
            "ts_ms": ts_ms,
            "decoder": "morse",
            "payload": transcript,
        });

        let Ok(mut state) = self.state.lock() else {
            warn!("decode log mutex poisoned");
            return;
        };

        let next_file_name = resolve_file_name(&self.file_template);
        if next_file_name != state.current_file_name {
            let next_path = self.base_dir.join(&next_file_name);
            match open_writer(&next_path) {
                Ok(next_writer) => {
                    state.current_file_name = next_file_name;
                    state.writer = next_writer;
                }
                Err(e) => {
                    warn!("decode log reopen failed: {}", e);
                    return;
                }
            }
        }

        if serde_json::to_writer(&mut state.writer, &line).is_err() {
            warn!("decode log serialization failed");
            return;
        }
        if state.writer.write_all(b"\n").is_err() {
            warn!("decode log write failed");
            return;
        }
        let _ = state.writer.flush();
    }
}

fn resolve_file_name(template: &str) -> String {
    let now = Utc::now();
    template
        .replace("%YYYY%", &now.format("%Y").to_string())
        .replace("%MM%", &now.format("%m").to_string())
        .replace("%DD%", &now.format("%d").to_string())
}

fn open_writer(path: &Path) -> Result<BufWriter<File>, String> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)
            .map_err(|e| format!("create decode log dir '{}': {}", parent.display(), e))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| format!("open decode log '{}': {}", path.display(), e))?;
    Ok(BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::{resolve_file_name, MorseLogger};
    use crate::config::DecodeLogsConfig;
    use mrx_core::MorseTranscript;

    #[test]
    fn test_disabled_config_yields_no_logger() {
        let cfg = DecodeLogsConfig::default();
        assert!(MorseLogger::from_config(&cfg).unwrap().is_none());
    }

    #[test]
    fn test_resolve_file_name_expands_date_fields() {
        let name = resolve_file_name("morse-%YYYY%-%MM%-%DD%.jsonl");
        assert!(!name.contains('%'), "unexpanded template: {}", name);
        assert!(name.starts_with("morse-2"));
        assert!(name.ends_with(".jsonl"));
    }

    #[test]
    fn test_log_lines_are_json_with_payload() {
        let dir = std::env::temp_dir().join(format!("mrx-decode-logs-{}", std::process::id()));
        let cfg = DecodeLogsConfig {
            enabled: true,
            dir: dir.to_string_lossy().into_owned(),
            morse_file: "morse-test.jsonl".to_string(),
        };
        let logger = MorseLogger::from_config(&cfg).unwrap().unwrap();
        logger.log_morse(&MorseTranscript {
            raw: "... --- ... ".to_string(),
            text: "SOS".to_string(),
        });

        let content = std::fs::read_to_string(dir.join("morse-test.jsonl")).unwrap();
        let line: serde_json::Value = serde_json::from_str(content.lines().last().unwrap()).unwrap();
        assert_eq!(line["decoder"], "morse");
        assert_eq!(line["payload"]["text"], "SOS");
        assert!(line["ts_ms"].as_u64().unwrap() > 0);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
