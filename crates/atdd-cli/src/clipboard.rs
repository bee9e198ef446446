use atdd_core::{AtddError, Result};
use std::io::Write;
use std::process::{Command, Stdio};

/// Clipboard writers in preference order: program and its arguments.
const CLIPBOARD_TOOLS: &[(&str, &[&str])] = &[
    ("pbcopy", &[]),
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
    ("clip", &[]),
];

fn detect_tool() -> Option<(&'static str, &'static [&'static str])> {
    CLIPBOARD_TOOLS
        .iter()
        .find(|(program, _)| which::which(program).is_ok())
        .copied()
}

/// Pipe `text` into the first clipboard tool found on PATH.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let (program, args) = detect_tool().ok_or(AtddError::NoClipboardTool)?;
    tracing::debug!("copying {} bytes via {program}", text.len());

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| AtddError::Clipboard(format!("{program}: {e}")))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(text.as_bytes())
            .map_err(|e| AtddError::Clipboard(format!("{program}: {e}")))?;
    }

    let output = child
        .wait_with_output()
        .map_err(|e| AtddError::Clipboard(format!("{program}: {e}")))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AtddError::Clipboard(format!(
            "{program} exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }
    Ok(())
}
