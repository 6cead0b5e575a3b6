//! Battery readings from the Linux power-supply class.

use std::fs;
use std::path::{Path, PathBuf};

use shelflife_scheduler::{PowerSource, PowerState};

/// Reads the first battery under `/sys/class/power_supply`.
#[derive(Debug, Clone)]
pub struct SysfsPowerSource {
    root: PathBuf,
}

impl SysfsPowerSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for SysfsPowerSource {
    fn default() -> Self {
        Self::new("/sys/class/power_supply")
    }
}

impl PowerSource for SysfsPowerSource {
    fn power_state(&self) -> Option<PowerState> {
        let entries = fs::read_dir(&self.root).ok()?;

        entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .find(|path| read_trimmed(&path.join("type")).as_deref() == Some("Battery"))
            .and_then(|battery| {
                let battery_percent = read_trimmed(&battery.join("capacity"))?
                    .parse::<u8>()
                    .ok()?;
                let status = read_trimmed(&battery.join("status")).unwrap_or_default();

                Some(PowerState {
                    battery_percent: battery_percent.min(100),
                    charging: matches!(status.as_str(), "Charging" | "Full"),
                })
            })
    }
}

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok().map(|s| s.trim().to_string())
}
