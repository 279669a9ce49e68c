// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Configuration file support for mrx-server.
//!
//! Config is loaded from the `[mrx-server]` section of `mrx-rs.toml`.
//! Default search order:
//! 1. Path specified via `--config` CLI argument
//! 2. `./mrx-rs.toml`
//! 3. `~/.config/mrx-rs/mrx-rs.toml`
//! 4. `/etc/mrx-rs/mrx-rs.toml`

use std::path::{Path, PathBuf};

use mrx_app::{ConfigError, ConfigFile};
use mrx_morse::MorseDecoderConfig;
use serde::{Deserialize, Serialize};

/// Top-level server configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// General settings
    pub general: GeneralConfig,
    /// Audio capture configuration
    pub audio: AudioConfig,
    /// Demodulation pipeline configuration
    pub dsp: DspConfig,
    /// Morse decoder tuning
    pub morse: MorseConfig,
    /// Decoder file logging configuration
    pub decode_logs: DecodeLogsConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: Option<String>,
}

/// Audio capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Audio input device name (None = system default)
    pub device: Option<String>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of interleaved channels in the capture stream
    pub channels: u8,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: 44_100,
            channels: 2,
        }
    }
}

/// Demodulation pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DspConfig {
    /// Keyed carrier frequency to select (Hz)
    pub tone_hz: f32,
    /// Envelope smoothing lowpass cutoff (Hz)
    pub envelope_cutoff_hz: f32,
    /// Per-sample decay applied to the slicer's tracked range
    pub decay_step: u32,
    /// Floor for the slicer's tracked range; below this no decay occurs
    pub min_range: u32,
    /// When set, dump the normalized envelope as raw PCM to this file
    pub monitor_path: Option<String>,
}

impl Default for DspConfig {
    fn default() -> Self {
        Self {
            tone_hz: 750.0,
            envelope_cutoff_hz: 22.05,
            decay_step: 1 << 22,
            min_range: 1 << 28,
            monitor_path: None,
        }
    }
}

/// Morse decoder tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MorseConfig {
    /// Shortest pulse admitted to the histogram (samples)
    pub pulse_min: i32,
    /// Longest pulse admitted to the histogram (samples)
    pub pulse_max: i32,
    /// Histogram bin count
    pub num_bins: usize,
    /// Jitter exclusion radius around the primary histogram peak (bins)
    pub signal_spread: usize,
    /// Histogram decay factor applied per pulse (0 < x < 1)
    pub decay_exponent: f32,
    /// Capacity of the raw dit/dah trace accumulator
    pub raw_capacity: usize,
    /// Capacity of the decoded text accumulator
    pub text_capacity: usize,
}

impl Default for MorseConfig {
    fn default() -> Self {
        let cfg = MorseDecoderConfig::default();
        Self {
            pulse_min: cfg.pulse_min,
            pulse_max: cfg.pulse_max,
            num_bins: cfg.num_bins,
            signal_spread: cfg.signal_spread,
            decay_exponent: cfg.decay_exponent,
            raw_capacity: cfg.raw_capacity,
            text_capacity: cfg.text_capacity,
        }
    }
}

impl From<&MorseConfig> for MorseDecoderConfig {
    fn from(cfg: &MorseConfig) -> Self {
        Self {
            pulse_min: cfg.pulse_min,
            pulse_max: cfg.pulse_max,
            num_bins: cfg.num_bins,
            signal_spread: cfg.signal_spread,
            decay_exponent: cfg.decay_exponent,
            raw_capacity: cfg.raw_capacity,
            text_capacity: cfg.text_capacity,
        }
    }
}

/// Decoder file logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeLogsConfig {
    /// Whether decode logging is enabled
    pub enabled: bool,
    /// Directory for decode log files
    pub dir: String,
    /// Morse transcript file name; `%YYYY%`/`%MM%`/`%DD%` expand to the
    /// current UTC date, rolling the file daily
    pub morse_file: String,
}

impl Default for DecodeLogsConfig {
    fn default() -> Self {
        let dir = dirs::data_local_dir()
            .map(|d| d.join("mrx-rs").join("decoders"))
            .unwrap_or_else(|| PathBuf::from("decoders"));
        Self {
            enabled: false,
            dir: dir.to_string_lossy().into_owned(),
            morse_file: "morse-%YYYY%-%MM%-%DD%.jsonl".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(level) = self.general.log_level.as_deref() {
            match level {
                "trace" | "debug" | "info" | "warn" | "error" => {}
                _ => {
                    return Err(format!(
                        "[general].log_level '{}' is invalid (expected one of: trace, debug, info, warn, error)",
                        level
                    ))
                }
            }
        }

        if self.audio.sample_rate < 8_000 || self.audio.sample_rate > 192_000 {
            return Err("[audio].sample_rate must be in range 8000..=192000".to_string());
        }
        if !(1..=2).contains(&self.audio.channels) {
            return Err("[audio].channels must be 1 or 2".to_string());
        }

        let nyquist = self.audio.sample_rate as f32 / 2.0;
        if self.dsp.tone_hz <= 0.0 || self.dsp.tone_hz >= nyquist {
            return Err(format!(
                "[dsp].tone_hz must be in range 0..{} for sample_rate {}",
                nyquist, self.audio.sample_rate
            ));
        }
        if self.dsp.envelope_cutoff_hz <= 0.0 || self.dsp.envelope_cutoff_hz >= self.dsp.tone_hz {
            return Err("[dsp].envelope_cutoff_hz must be below [dsp].tone_hz".to_string());
        }
        if self.dsp.decay_step == 0 {
            return Err("[dsp].decay_step must be > 0".to_string());
        }
        if self.dsp.min_range == 0 {
            return Err("[dsp].min_range must be > 0".to_string());
        }

        if self.morse.pulse_min <= 0 || self.morse.pulse_min >= self.morse.pulse_max {
            return Err("[morse].pulse_min must be > 0 and < pulse_max".to_string());
        }
        if self.morse.num_bins == 0 {
            return Err("[morse].num_bins must be > 0".to_string());
        }
        if !(self.morse.decay_exponent > 0.0 && self.morse.decay_exponent < 1.0) {
            return Err("[morse].decay_exponent must be in range (0, 1)".to_string());
        }
        if self.morse.raw_capacity == 0 || self.morse.text_capacity == 0 {
            return Err("[morse] accumulator capacities must be > 0".to_string());
        }

        if self.decode_logs.enabled {
            if self.decode_logs.dir.trim().is_empty() {
                return Err("[decode_logs].dir must not be empty when enabled".to_string());
            }
            if self.decode_logs.morse_file.trim().is_empty() {
                return Err("[decode_logs].morse_file must not be empty when enabled".to_string());
            }
        }

        Ok(())
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        <Self as ConfigFile>::load_from_file(path)
    }

    /// Load configuration from the default search paths.
    /// Returns default config if no config file is found.
    pub fn load_from_default_paths() -> Result<(Self, Option<PathBuf>), ConfigError> {
        <Self as ConfigFile>::load_from_default_paths()
    }

    /// Generate an example configuration wrapped under the `[mrx-server]`
    /// section header, suitable for use in a combined `mrx-rs.toml` file.
    pub fn example_combined_toml() -> String {
        #[derive(Serialize)]
        struct Wrapper {
            #[serde(rename = "mrx-server")]
            inner: ServerConfig,
        }
        let example = ServerConfig {
            general: GeneralConfig {
                log_level: Some("info".to_string()),
            },
            ..ServerConfig::default()
        };
        toml::to_string_pretty(&Wrapper { inner: example }).unwrap_or_default()
    }
}

impl ConfigFile for ServerConfig {
    fn section_key() -> &'static str {
        "mrx-server"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.audio.sample_rate, 44_100);
        assert_eq!(config.audio.channels, 2);
        assert_eq!(config.dsp.tone_hz, 750.0);
        assert_eq!(config.dsp.decay_step, 1 << 22);
        assert_eq!(config.dsp.min_range, 1 << 28);
        assert_eq!(config.morse.pulse_min, 1000);
        assert_eq!(config.morse.pulse_max, 12000);
        assert_eq!(config.morse.num_bins, 256);
        assert!(!config.decode_logs.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_minimal_toml() {
        let toml_str = r#"
[audio]
device = "hw:1,0"
sample_rate = 48000

[dsp]
tone_hz = 600.0
"#;
        let config: ServerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.audio.device, Some("hw:1,0".to_string()));
        assert_eq!(config.audio.sample_rate, 48_000);
        assert_eq!(config.dsp.tone_hz, 600.0);
        // Unspecified sections keep their defaults.
        assert_eq!(config.morse.num_bins, 256);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_example_combined_toml_parses() {
        let example = ServerConfig::example_combined_toml();
        let table: toml::Table = toml::from_str(&example).unwrap();
        let section = toml::to_string(table.get("mrx-server").unwrap()).unwrap();
        let config: ServerConfig = toml::from_str(&section).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_tone_above_nyquist() {
        let mut config = ServerConfig::default();
        config.dsp.tone_hz = 30_000.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_morse_window() {
        let mut config = ServerConfig::default();
        config.morse.pulse_min = 12_000;
        config.morse.pulse_max = 1_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_log_dir_when_enabled() {
        let mut config = ServerConfig::default();
        config.decode_logs.enabled = true;
        config.decode_logs.dir = " ".to_string();
        assert!(config.validate().is_err());
    }
}
