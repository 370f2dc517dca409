//! Driver configuration structures and loaders.
use std::env;
use std::str::FromStr;

/// How the driver asks the engine for batches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunMode {
    /// Request one batch, wait for its snapshot, repeat.
    #[default]
    Once,
    /// Play continuously and report whatever snapshots arrive.
    Continuous,
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "once" => Ok(RunMode::Once),
            "continuous" | "fast" => Ok(RunMode::Continuous),
            other => Err(format!("unknown run mode '{other}'")),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{other}'")),
        }
    }
}

/// Configuration for the headless driver.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub mode: RunMode,
    /// Snapshots to report before exiting.
    pub batches: u64,
    pub output: OutputFormat,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            mode: RunMode::default(),
            batches: 10,
            output: OutputFormat::default(),
        }
    }
}

impl ClientConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `CRAPS_MODE` - `once` or `continuous` (default: once)
    /// - `CRAPS_BATCHES` - Snapshots to report before exiting (default: 10)
    /// - `CRAPS_OUTPUT` - `text` or `json` (default: text)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(mode) = read_env::<RunMode>("CRAPS_MODE") {
            config.mode = mode;
        }

        if let Some(batches) = read_env::<u64>("CRAPS_BATCHES") {
            config.batches = batches.max(1);
        }

        if let Some(output) = read_env::<OutputFormat>("CRAPS_OUTPUT") {
            config.output = output;
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: FromStr,
{
    env::var(key).ok()?.parse().ok()
}
