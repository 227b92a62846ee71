//! Menu input from the terminal.

use pxe::{MenuInput, ReadLine};
use std::{
    io::{BufRead, stdin},
    sync::mpsc::{Receiver, RecvTimeoutError, channel},
    thread,
    time::Duration,
};

/// Reads menu choices from stdin.
///
/// Lines are read on a helper thread so that a prompt can time out. Once
/// input has ended a prompt with a timeout times out at once, and one
/// without is interrupted.
pub struct TerminalInput {
    lines: Receiver<String>,
}

impl TerminalInput {
    pub fn new() -> TerminalInput {
        let (tx, rx) = channel();
        thread::spawn(move || {
            for line in stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        TerminalInput { lines: rx }
    }
}

impl MenuInput for TerminalInput {
    fn display(&mut self, title: Option<&str>, entries: &[String]) {
        if let Some(title) = title {
            console_println!("{}", title);
        }
        for entry in entries {
            console_println!("{}", entry);
        }
    }

    fn read_line(&mut self, prompt: &str, timeout: u32) -> ReadLine {
        console_print!("{}", prompt);
        let line = if timeout == 0 {
            self.lines.recv().map_err(|_| RecvTimeoutError::Disconnected)
        } else {
            self.lines.recv_timeout(Duration::from_secs(timeout as u64))
        };
        match line {
            Ok(line) => ReadLine::Line(line),
            Err(RecvTimeoutError::Timeout) => {
                console_println!("");
                ReadLine::TimedOut
            }
            Err(RecvTimeoutError::Disconnected) => {
                console_println!("");
                if timeout == 0 {
                    ReadLine::Interrupted
                } else {
                    ReadLine::TimedOut
                }
            }
        }
    }
}
