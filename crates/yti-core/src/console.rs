//! Operator I/O consumed by the engine and the interactive resolver.

use std::io;

/// Blocking operator console.
///
/// `prompt` and `confirm` block until the operator answers; `message` is
/// non-blocking status output. Implementations include the CLI's
/// stdin/stdout console and scripted consoles in tests.
pub trait Console {
    /// Asks the operator for a line of input.
    fn prompt(&mut self, message: &str) -> io::Result<String>;

    /// Asks the operator a yes/no question.
    fn confirm(&mut self, message: &str) -> io::Result<bool>;

    /// Emits a status line.
    fn message(&mut self, text: &str);
}
