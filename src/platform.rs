//! Host detection used when picking a speech backend

use std::fs;

/// Detect if running in WSL (Windows Subsystem for Linux)
pub fn is_wsl() -> bool {
    if let Ok(contents) = fs::read_to_string("/proc/version") {
        let lower = contents.to_lowercase();
        if lower.contains("microsoft") || lower.contains("wsl") {
            return true;
        }
    }

    std::env::var("WSL_DISTRO_NAME").is_ok()
}

/// What to install when the native speech backend fails to start
pub fn speech_install_hint() -> Option<&'static str> {
    match std::env::consts::OS {
        "linux" if is_wsl() => Some(
            "WSL detected: install speech-dispatcher inside the distro and make sure WSLg audio is running",
        ),
        "linux" => Some("To install: sudo apt install speech-dispatcher"),
        "freebsd" | "openbsd" | "netbsd" => Some("Install speech-dispatcher from ports or packages"),
        _ => None,
    }
}
