use std::io::Write;
use std::process::{Command, Stdio};

type ClipboardCommand = (&'static str, &'static [&'static str]);

#[cfg(target_os = "macos")]
const CLIPBOARD_COMMANDS: &[ClipboardCommand] = &[("pbcopy", &[])];

#[cfg(target_os = "windows")]
const CLIPBOARD_COMMANDS: &[ClipboardCommand] = &[("cmd", &["/C", "clip"])];

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const CLIPBOARD_COMMANDS: &[ClipboardCommand] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

/// Copy text to the system clipboard through the first helper that works.
pub fn copy_to_clipboard(text: &str) -> Result<(), String> {
    copy_with(CLIPBOARD_COMMANDS, text)
}

fn copy_with(commands: &[ClipboardCommand], text: &str) -> Result<(), String> {
    let mut last_error = None;
    for (cmd, args) in commands {
        match run_with_stdin(cmd, args, text) {
            Ok(()) => return Ok(()),
            Err(err) => last_error = Some(err),
        }
    }
    Err(last_error.unwrap_or_else(|| "No clipboard command configured".to_string()))
}

fn run_with_stdin(cmd: &str, args: &[&str], input: &str) -> Result<(), String> {
    let mut child = Command::new(cmd)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|_| format!("Clipboard command `{cmd}` not available"))?;

    if let Some(mut stdin) = child.stdin.take() {
        let _ = stdin.write_all(input.as_bytes());
    }
    match child.wait() {
        Ok(status) if status.success() => Ok(()),
        _ => Err(format!("Clipboard command `{cmd}` failed")),
    }
}
