use std::{io, path::Path, process::Command};

/// explorer / open / xdg-open depending on the platform
pub fn default_file_manager() -> &'static str {
    if cfg!(target_os = "windows") {
        "explorer"
    } else if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    }
}

/// Opens `path` with `file_manager` without waiting for it
pub fn reveal(file_manager: &str, path: &Path) -> io::Result<()> {
    let mut child = Command::new(file_manager).arg(path).spawn()?;
    // Reap in the background; explorer exits nonzero even on success so the status is ignored.
    std::thread::spawn(move || {
        let _ = child.wait();
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_manager_is_an_error() {
        let err = reveal("no-such-file-manager-5c2e", Path::new(".")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[cfg(unix)]
    #[test]
    fn spawns_file_manager_with_path() {
        reveal("true", Path::new(".")).unwrap();
    }
}
