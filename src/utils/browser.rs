//! Open the consent URL in the default browser.
//!
//! Cross-platform: Windows, macOS, Linux and WSL. On WSL the Windows browser
//! is used since there is usually no Linux desktop to open.

use std::process::{Command, Stdio};

/// Check whether we run inside WSL by looking for "microsoft"/"wsl" in
/// `/proc/version`.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn is_wsl() -> bool {
    std::fs::read_to_string("/proc/version")
        .map(|version| {
            let version = version.to_lowercase();
            version.contains("microsoft") || version.contains("wsl")
        })
        .unwrap_or(false)
}

/// Open `url` in the default browser.
///
/// Returns `true` if a launcher was spawned. A `false` return is not an
/// error: the URL is printed as well, so the user can open it by hand
/// (headless hosts, SSH sessions).
pub fn open_browser(url: &str) -> bool {
    #[cfg(target_os = "windows")]
    {
        Command::new("cmd")
            .args(["/c", "start", "", url])
            .stderr(Stdio::null())
            .spawn()
            .is_ok()
    }

    #[cfg(target_os = "macos")]
    {
        Command::new("open").arg(url).stderr(Stdio::null()).spawn().is_ok()
    }

    #[cfg(target_os = "linux")]
    {
        if is_wsl() {
            // wslview ships with wslu; cmd.exe is the fallback
            if Command::new("wslview").arg(url).spawn().is_ok() {
                return true;
            }
            return Command::new("cmd.exe")
                .current_dir("/mnt/c/")
                .args(["/c", "start", "", url])
                .stderr(Stdio::null())
                .spawn()
                .is_ok();
        }

        Command::new("xdg-open")
            .arg(url)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .is_ok()
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_wsl_detection() {
        // Result depends on the host; only check it does not panic
        let _ = is_wsl();
    }

    // open_browser is not exercised here since it would launch a real browser
}
