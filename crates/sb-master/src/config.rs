use std::path::PathBuf;

use sb_engine::CycleWait;
use sb_ports::{BackendKind, DEFAULT_DRIVER};

/// How a playback session reaches the hardware.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerConfig {
    pub backend: BackendKind,
    /// InpOut-compatible library, used by the driver backend only
    pub driver_path: PathBuf,
    pub wait: CycleWait,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            driver_path: PathBuf::from(DEFAULT_DRIVER),
            wait: CycleWait::default(),
        }
    }
}
