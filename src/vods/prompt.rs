use std::io::{self, BufRead, Write};

/// Line-oriented terminal seam.
///
/// `read_line` returns `Ok(None)` when the input side is gone (EOF or an
/// interrupted read); callers treat that the same as an empty line.
pub trait Console: Send {
    fn write_line(&mut self, line: &str) -> io::Result<()>;
    fn read_line(&mut self) -> io::Result<Option<String>>;
}

/// Real stdin/stdout console.
#[derive(Debug, Default)]
pub struct StdioConsole;

impl Console for StdioConsole {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{}", line)?;
        out.flush()
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut buf = String::new();
        let read = io::stdin().lock().read_line(&mut buf)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(buf))
    }
}

/// Asks for a 1-based listing index until it gets one.
///
/// Returns `None` (the cancel sentinel) on an empty line, EOF, or a read
/// error, all without looping. Non-numeric input prints a hint and asks
/// again. Numeric input is clamped into `[low, high]`; an out-of-range
/// number is never an error.
pub fn prompt_for_index(console: &mut dyn Console, low: usize, high: usize) -> Option<usize> {
    loop {
        let _ = console.write_line(&format!(
            "Select a broadcast [{}-{}], empty line cancels:",
            low, high
        ));
        let line = match console.read_line() {
            Ok(Some(line)) => line,
            Ok(None) | Err(_) => return None,
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.parse::<i64>() {
            Ok(n) => return Some(n.clamp(low as i64, high as i64) as usize),
            Err(_) => {
                let _ = console.write_line(&format!("'{}' is not a number", trimmed));
            }
        }
    }
}
