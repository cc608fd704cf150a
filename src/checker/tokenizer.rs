use std::iter::Peekable;
use std::str::CharIndices;

/// Character that introduces a command name.
pub const COMMAND_ESCAPE: char = '\\';

/// A word-shaped run of letters and interior apostrophes.
///
/// `start` and `end` are 0-based `char` columns, `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
}

/// Scan `line` for words, skipping command names such as `\section`.
pub fn tokenize(line: &str) -> Tokens<'_> {
    Tokens {
        line,
        chars: line.char_indices().peekable(),
        column: 0,
        prev: None,
    }
}

#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    line: &'a str,
    chars: Peekable<CharIndices<'a>>,
    column: usize,
    prev: Option<char>,
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphabetic() || ch == '\''
}

/// True if the word starting at byte `offset` is the name of a command.
fn is_command_name(line: &str, offset: usize) -> bool {
    for ch in line[..offset].chars().rev() {
        if ch == COMMAND_ESCAPE {
            return true;
        }
        if !(ch.is_alphabetic() || ch == '@') {
            return false;
        }
    }
    false
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        while let Some((offset, ch)) = self.chars.next() {
            let start = self.column;
            self.column += 1;
            let prev = self.prev.replace(ch);

            if !ch.is_alphabetic() || prev.is_some_and(is_word_char) {
                continue;
            }

            // Trailing apostrophes belong to the run but not to the token.
            let mut end_byte = offset + ch.len_utf8();
            let mut end = self.column;
            while let Some(&(next_offset, next)) = self.chars.peek() {
                if !is_word_char(next) {
                    break;
                }
                self.chars.next();
                self.column += 1;
                self.prev = Some(next);
                if next.is_alphabetic() {
                    end_byte = next_offset + next.len_utf8();
                    end = self.column;
                }
            }

            if is_command_name(self.line, offset) {
                continue;
            }

            return Some(Token {
                text: &self.line[offset..end_byte],
                start,
                end,
            });
        }
        None
    }
}
