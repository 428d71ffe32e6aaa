//! Stdin/stdout operator console.

use std::io::{self, BufRead, Write};

use yti_core::Console;

/// Console backed by the process's stdin and stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdConsole;

impl Console for StdConsole {
    fn prompt(&mut self, message: &str) -> io::Result<String> {
        {
            let mut stdout = io::stdout().lock();
            write!(stdout, "{message}: ")?;
            stdout.flush()?;
        }

        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stdin closed while waiting for operator input",
            ));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn confirm(&mut self, message: &str) -> io::Result<bool> {
        loop {
            let answer = self.prompt(&format!("{message} [y/n]"))?;
            match answer.trim().to_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.message("Please answer y or n."),
            }
        }
    }

    fn message(&mut self, text: &str) {
        println!("{text}");
    }
}
