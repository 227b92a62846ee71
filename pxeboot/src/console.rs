//! Console output of the simulated boot monitor.
//!
//! Whatever the monitor itself prints (menus, prompts, boot commands) goes to
//! stdout; log records go to stderr.

use std::{
    fmt::Arguments,
    io::{Write, stderr, stdout},
};

pub fn console_print(args: Arguments) {
    let mut out = stdout().lock();
    // A closed stdout leaves nothing to report the failure on.
    let _ = out.write_fmt(args);
    let _ = out.flush();
}

pub fn log_print(args: Arguments) {
    let _ = stderr().lock().write_fmt(args);
}

#[macro_export]
/// print to the monitor console
macro_rules! console_print {
    ($fmt: literal $(, $($arg: tt)+)?) => {
        $crate::console::console_print(format_args!($fmt $(, $($arg)+)?));
    }
}

#[macro_export]
macro_rules! console_println {
    ($fmt: literal $(, $($arg: tt)+)?) => {
        $crate::console::console_print(format_args!(concat!($fmt, "\n") $(, $($arg)+)?));
    }
}

#[macro_export]
macro_rules! log_println {
    ($fmt: literal $(, $($arg: tt)+)?) => {
        $crate::console::log_print(format_args!(concat!($fmt, "\n") $(, $($arg)+)?));
    }
}
