// Open the written report with the desktop's default handler

use std::path::{Path, PathBuf};
use std::process::Command;

use super::ReportError;

/// Program and leading arguments that open a file with its default handler
fn opener_command() -> Option<(PathBuf, Vec<&'static str>)> {
    if cfg!(target_os = "windows") {
        which::which("cmd")
            .ok()
            .map(|cmd| (cmd, vec!["/C", "start", ""]))
    } else if cfg!(target_os = "macos") {
        which::which("open").ok().map(|cmd| (cmd, Vec::new()))
    } else {
        which::which("xdg-open").ok().map(|cmd| (cmd, Vec::new()))
    }
}

/// Path of the desktop opener, when one is installed
pub fn find_opener() -> Option<PathBuf> {
    opener_command().map(|(program, _)| program)
}

/// Launch the default viewer for `path` without waiting for it
pub fn open_in_viewer(path: &Path) -> Result<(), ReportError> {
    let (program, args) = opener_command().ok_or_else(|| {
        ReportError::Open("no desktop opener (xdg-open, open or start) found".to_string())
    })?;

    log::info!("[Report] Opening {:?} with {:?}", path, program);
    Command::new(&program)
        .args(args)
        .arg(path)
        .spawn()
        .map(|_| ())
        .map_err(|e| ReportError::Open(format!("{}: {}", program.display(), e)))
}
