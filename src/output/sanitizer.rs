//! Terminal escape stripping for command output.
//!
//! Commands such as `ls --color=always` or `git log` emit escape codes that
//! render as noise in a chat message. Everything except printable text,
//! newlines and tabs is dropped. Carriage returns are dropped too, since
//! chat clients treat `\r\n` and `\n` alike and bare `\r` progress bars
//! would otherwise pile up.

use vte::{Params, Parser, Perform};

/// Output sanitizer using the VTE parser.
pub struct OutputSanitizer;

impl OutputSanitizer {
    /// Decode raw process output into clean text.
    pub fn strip_ansi(input: &[u8]) -> String {
        let mut extractor = PlainTextExtractor::default();
        let mut parser = Parser::new();

        parser.advance(&mut extractor, input);

        extractor.output
    }

    /// Strip escape codes from text that is already decoded.
    pub fn strip_ansi_str(input: &str) -> String {
        Self::strip_ansi(input.as_bytes())
    }
}

#[derive(Default)]
struct PlainTextExtractor {
    output: String,
}

impl Perform for PlainTextExtractor {
    fn print(&mut self, c: char) {
        self.output.push(c);
    }

    fn execute(&mut self, byte: u8) {
        match byte {
            b'\n' => self.output.push('\n'),
            b'\t' => self.output.push('\t'),
            _ => {}
        }
    }

    fn hook(&mut self, _params: &Params, _intermediates: &[u8], _ignore: bool, _action: char) {}

    fn put(&mut self, _byte: u8) {}

    fn unhook(&mut self) {}

    fn osc_dispatch(&mut self, _params: &[&[u8]], _bell_terminated: bool) {}

    fn csi_dispatch(
        &mut self,
        _params: &Params,
        _intermediates: &[u8],
        _ignore: bool,
        _action: char,
    ) {
    }

    fn esc_dispatch(&mut self, _intermediates: &[u8], _ignore: bool, _byte: u8) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        assert_eq!(OutputSanitizer::strip_ansi(b"hello world"), "hello world");
    }

    #[test]
    fn test_strip_ls_colors() {
        let input = b"\x1b[0m\x1b[01;34mlogs\x1b[0m  \x1b[01;32mrun.sh\x1b[0m\n";
        assert_eq!(OutputSanitizer::strip_ansi(input), "logs  run.sh\n");
    }

    #[test]
    fn test_crlf_becomes_lf() {
        assert_eq!(OutputSanitizer::strip_ansi(b"a\r\nb\r\n"), "a\nb\n");
    }

    #[test]
    fn test_osc_title_dropped() {
        let input = b"\x1b]0;Window Title\x07actual content";
        assert_eq!(OutputSanitizer::strip_ansi(input), "actual content");
    }

    #[test]
    fn test_preserve_tabs_and_unicode() {
        let input = "col1\tcol2\tdéjà vu";
        assert_eq!(OutputSanitizer::strip_ansi_str(input), input);
    }

    #[test]
    fn test_only_escape_codes() {
        assert_eq!(OutputSanitizer::strip_ansi(b"\x1b[31m\x1b[0m\x1b[2J"), "");
    }
}
