// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command line to argument vector
//!
//! This is a literal argv builder, not a shell: there is no globbing,
//! piping, redirection or escape handling. Only quoted runs are grouped.

/// Split a command line on whitespace, keeping quoted runs together
///
/// A chunk starting with `'` or `"` opens a quoted run unless it also ends
/// with the same quote. The run stays open across whitespace until a chunk
/// ends with the matching quote. The surrounding quotes are stripped and the
/// whitespace inside the run is kept verbatim.
///
/// ```
/// use gtask_core::command::split;
///
/// assert_eq!(split("bash -c 'echo test'"), vec!["bash", "-c", "echo test"]);
/// ```
pub fn split(command: &str) -> Vec<String> {
    let mut args = Vec::new();
    // (quote, byte offset where the quoted content starts)
    let mut open: Option<(char, usize)> = None;

    for chunk in command.split_whitespace() {
        let start = offset_of(command, chunk);

        match open {
            Some((quote, content_start)) => {
                if chunk.ends_with(quote) {
                    let end = start + chunk.len() - quote.len_utf8();
                    args.push(command[content_start..end].to_string());
                    open = None;
                }
            }
            None => match chunk.chars().next() {
                Some(quote @ ('\'' | '"')) => {
                    let closed = chunk.len() > quote.len_utf8() && chunk.ends_with(quote);
                    if closed {
                        args.push(chunk[1..chunk.len() - 1].to_string());
                    } else {
                        open = Some((quote, start + quote.len_utf8()));
                    }
                }
                _ => args.push(chunk.to_string()),
            },
        }
    }

    // Unterminated quote: keep what was collected
    if let Some((_, content_start)) = open {
        args.push(command[content_start..].trim_end().to_string());
    }

    args
}

/// Byte offset of `chunk` inside `haystack`; `chunk` must be a subslice
fn offset_of(haystack: &str, chunk: &str) -> usize {
    chunk.as_ptr() as usize - haystack.as_ptr() as usize
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
