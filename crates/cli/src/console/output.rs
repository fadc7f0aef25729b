//! Console output
//!
//! Messages carry a verbosity and a format. A message is written only when
//! its verbosity is at or below the output's verbosity.

use std::io::{BufRead, BufReader, IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use dbforge_core::{OutputFormat, Verbosity};
use tracing::warn;

use super::formatter;
use super::input::Input;

// ============================================================================
// OutputBuffer
// ============================================================================

/// In-memory sink, cheap to clone and read back
#[derive(Debug, Clone, Default)]
pub struct OutputBuffer(Arc<Mutex<Vec<u8>>>);

impl OutputBuffer {
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for OutputBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

// ============================================================================
// Output
// ============================================================================

type Sink = Mutex<Box<dyn Write + Send>>;

pub struct Output {
    out: Sink,
    err: Sink,
    answers: Mutex<Box<dyn BufRead + Send>>,
    verbosity: Mutex<Verbosity>,
    decorated: AtomicBool,
}

impl Output {
    fn with_sinks(out: Box<dyn Write + Send>, err: Box<dyn Write + Send>, decorated: bool) -> Self {
        Self {
            out: Mutex::new(out),
            err: Mutex::new(err),
            answers: Mutex::new(Box::new(BufReader::new(std::io::stdin()))),
            verbosity: Mutex::new(Verbosity::Normal),
            decorated: AtomicBool::new(decorated),
        }
    }

    /// Messages to stdout, errors to stderr, answers from stdin.
    /// Decorated when stdout is a terminal.
    pub fn stdout() -> Self {
        let decorated = std::io::stdout().is_terminal();
        Self::with_sinks(Box::new(std::io::stdout()), Box::new(std::io::stderr()), decorated)
    }

    /// Undecorated output writing messages and errors to one buffer
    pub fn buffered() -> (Self, OutputBuffer) {
        let buffer = OutputBuffer::default();
        let output = Self::with_sinks(Box::new(buffer.clone()), Box::new(buffer.clone()), false);
        (output, buffer)
    }

    /// Read prompt answers from `answers` instead of stdin
    pub fn with_answers(self, answers: impl BufRead + Send + 'static) -> Self {
        *self.answers.lock().unwrap_or_else(PoisonError::into_inner) = Box::new(answers);
        self
    }

    // ====================================================================
    // Settings
    // ====================================================================

    pub fn verbosity(&self) -> Verbosity {
        *self.verbosity.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_verbosity(&self, verbosity: Verbosity) {
        *self.verbosity.lock().unwrap_or_else(PoisonError::into_inner) = verbosity;
    }

    pub fn is_decorated(&self) -> bool {
        self.decorated.load(Ordering::Relaxed)
    }

    pub fn set_decorated(&self, decorated: bool) {
        self.decorated.store(decorated, Ordering::Relaxed);
    }

    // ====================================================================
    // Writing
    // ====================================================================

    pub fn write(&self, messages: &[&str], newline: bool, format: OutputFormat, verbosity: Verbosity) {
        if verbosity > self.verbosity() {
            return;
        }

        let mut text = String::new();
        for message in messages {
            match format {
                OutputFormat::Normal => text.push_str(&formatter::format(message, self.is_decorated())),
                OutputFormat::Plain => text.push_str(&formatter::strip(message)),
                OutputFormat::Raw => text.push_str(message),
            }
            if newline {
                text.push('\n');
            }
        }
        write_to(&self.out, &text);
    }

    /// One normal-verbosity line
    pub fn writeln(&self, message: &str) {
        self.write(&[message], true, OutputFormat::Normal, Verbosity::Normal);
    }

    /// Error line on the error sink, written at every verbosity
    pub fn error(&self, message: &str) {
        let line = formatter::format(&format!("<error>{}</error>", message), self.is_decorated());
        write_to(&self.err, &format!("{}\n", line));
    }

    /// Ask a yes/no question. Non-interactive input gets `default`; an
    /// empty answer gets `default`; answers starting with `y` are yes.
    pub fn confirm(&self, input: &Input, question: &str, default: bool) -> bool {
        if !input.is_interactive() {
            return default;
        }

        self.write(&[&format!("<question>{}</question> ", question)], false, OutputFormat::Normal, Verbosity::Quiet);

        let mut answer = String::new();
        let read = self
            .answers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .read_line(&mut answer);
        match read {
            Ok(0) | Err(_) => default,
            Ok(_) => {
                let answer = answer.trim();
                if answer.is_empty() {
                    default
                } else {
                    answer.starts_with(['y', 'Y'])
                }
            }
        }
    }
}

impl std::fmt::Debug for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Output")
            .field("verbosity", &self.verbosity())
            .field("decorated", &self.is_decorated())
            .finish()
    }
}

fn write_to(sink: &Sink, text: &str) {
    let mut sink = sink.lock().unwrap_or_else(PoisonError::into_inner);
    if let Err(e) = sink.write_all(text.as_bytes()).and_then(|_| sink.flush()) {
        warn!(error = %e, "Failed to write console output");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    #[test]
    fn test_verbosity_filter() {
        let (output, buffer) = Output::buffered();
        output.write(&["normal"], true, OutputFormat::Normal, Verbosity::Normal);
        output.write(&["verbose"], true, OutputFormat::Normal, Verbosity::Verbose);
        output.set_verbosity(Verbosity::Verbose);
        output.write(&["verbose again"], true, OutputFormat::Normal, Verbosity::Verbose);

        assert_eq!(buffer.lines(), vec!["normal", "verbose again"]);
    }

    #[test]
    fn test_quiet_suppresses_normal_messages() {
        let (output, buffer) = Output::buffered();
        output.set_verbosity(Verbosity::Quiet);
        output.writeln("hidden");
        output.write(&["shown"], true, OutputFormat::Normal, Verbosity::Quiet);
        output.error("broken");
        assert_eq!(buffer.lines(), vec!["shown", "broken"]);
    }

    #[test]
    fn test_formats() {
        let (output, buffer) = Output::buffered();
        output.write(&["<info>a</info>"], true, OutputFormat::Normal, Verbosity::Normal);
        output.write(&["<info>b</info>"], true, OutputFormat::Plain, Verbosity::Normal);
        output.write(&["<info>c</info>"], true, OutputFormat::Raw, Verbosity::Normal);
        output.write(&["d", "e"], false, OutputFormat::Normal, Verbosity::Normal);
        assert_eq!(buffer.contents(), "a\nb\n<info>c</info>\nde");
    }

    #[test]
    fn test_confirm() {
        let input = Input::new(["make:migration"]);

        let (output, _) = Output::buffered();
        let output = output.with_answers(Cursor::new("n\n"));
        assert!(!output.confirm(&input, "Create migrations directory? [y]/n", true));

        let (output, buffer) = Output::buffered();
        let output = output.with_answers(Cursor::new("\n"));
        assert!(output.confirm(&input, "Create migrations directory? [y]/n", true));
        assert_eq!(buffer.contents(), "Create migrations directory? [y]/n ");

        let (output, _) = Output::buffered();
        let output = output.with_answers(Cursor::new("Yes\n"));
        assert!(output.confirm(&input, "?", false));
    }

    #[test]
    fn test_confirm_without_interaction_takes_default() {
        let input = Input::new(["make:migration"]);
        input.set_interactive(false);
        let (output, buffer) = Output::buffered();
        let output = output.with_answers(Cursor::new("n\n"));

        assert!(output.confirm(&input, "Create seeds directory? [y]/n", true));
        assert!(buffer.contents().is_empty());
    }
}
