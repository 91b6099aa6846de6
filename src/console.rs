use std::io::{self, BufRead, Write};

/// Narrow console seam so the lifecycle commands stay testable with fakes.
pub trait Console {
    fn out(&mut self, line: &str);

    /// Blocking line read. Returns `default` when the user just hits enter
    /// or when stdin is unavailable.
    fn prompt(&mut self, message: &str, default: &str) -> String;
}

/// Console backed by stdin/stdout.
#[derive(Debug, Default)]
pub struct StdConsole;

impl Console for StdConsole {
    fn out(&mut self, line: &str) {
        println!("{line}");
    }

    fn prompt(&mut self, message: &str, default: &str) -> String {
        print!("{message} ");
        let _ = io::stdout().flush();

        let mut buf = String::new();
        if io::stdin().lock().read_line(&mut buf).is_err() {
            return default.to_string();
        }

        let reply = buf.trim();
        if reply.is_empty() {
            default.to_string()
        } else {
            reply.to_string()
        }
    }
}
