//! Transaction-file parsing and interactive prompts.

use std::fs;
use std::io::{BufRead, Write};
use std::path::Path;

use log::debug;

use crate::blockchain::{DIFF_MAX, DIFF_MIN};
use crate::error::InputError;

/// Read a transaction file from disk.
pub fn read_transaction_file(path: &str) -> Result<Vec<u32>, InputError> {
    if path.trim().is_empty() {
        return Err(InputError::EmptyFilename);
    }
    let contents = fs::read_to_string(Path::new(path)).map_err(|source| InputError::Open {
        path: path.to_string(),
        source,
    })?;
    let ids = parse_transactions(&contents)?;
    debug!("Loaded {} transaction id(s) from {}", ids.len(), path);
    Ok(ids)
}

/// Parse `<count> <id> <id> ...` where exactly `count` ids must follow.
pub fn parse_transactions(contents: &str) -> Result<Vec<u32>, InputError> {
    let mut tokens = contents.split_whitespace();

    let count: usize = tokens
        .next()
        .and_then(|t| t.parse().ok())
        .filter(|&n| n > 0)
        .ok_or(InputError::InvalidCount)?;

    let mut ids = Vec::with_capacity(count.min(1 << 16));
    for position in 1..=count {
        let id = tokens
            .next()
            .and_then(|t| t.parse::<u32>().ok())
            .ok_or(InputError::InvalidId { position })?;
        ids.push(id);
    }

    if tokens.next().is_some() {
        return Err(InputError::TooManyIds { expected: count });
    }
    Ok(ids)
}

/// Ask until `parse` accepts the answer.
///
/// Returns `Ok(None)` when the input ends before a valid answer arrives.
pub fn prompt_until<R, W, T>(
    input: &mut R,
    output: &mut W,
    question: &str,
    retry: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, InputError>
where
    R: BufRead,
    W: Write,
{
    write!(output, "{question}")?;
    output.flush()?;
    let mut line = String::new();
    loop {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        if let Some(value) = parse(line.trim()) {
            return Ok(Some(value));
        }
        write!(output, "{retry}")?;
        output.flush()?;
    }
}

pub fn prompt_difficulty<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<Option<u32>, InputError> {
    prompt_until(
        input,
        output,
        "Enter difficulty level (1-10): ",
        "Invalid input. Please enter a difficulty level between 1 and 10: ",
        |s| s.parse().ok().filter(|d| (DIFF_MIN..=DIFF_MAX).contains(d)),
    )
}

pub fn prompt_filename<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<String, InputError> {
    write!(output, "Enter the filename of the input file: ")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    let name = line.trim();
    if name.is_empty() {
        return Err(InputError::EmptyFilename);
    }
    Ok(name.to_string())
}

pub fn prompt_miners<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<Option<usize>, InputError> {
    prompt_until(
        input,
        output,
        "Enter the number of miners: ",
        "Invalid input. Please enter a positive number of miners: ",
        |s| s.parse().ok().filter(|&n| n > 0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_count_and_ids() {
        assert_eq!(parse_transactions("3\n10 20\n30\n").unwrap(), vec![10, 20, 30]);
    }

    #[test]
    fn rejects_bad_count() {
        assert!(matches!(parse_transactions(""), Err(InputError::InvalidCount)));
        assert!(matches!(parse_transactions("0 1"), Err(InputError::InvalidCount)));
        assert!(matches!(parse_transactions("-2 1 2"), Err(InputError::InvalidCount)));
        assert!(matches!(parse_transactions("x 1"), Err(InputError::InvalidCount)));
    }

    #[test]
    fn rejects_missing_or_malformed_ids() {
        assert!(matches!(
            parse_transactions("3 1 2"),
            Err(InputError::InvalidId { position: 3 })
        ));
        assert!(matches!(
            parse_transactions("2 1 abc"),
            Err(InputError::InvalidId { position: 2 })
        ));
        assert!(matches!(
            parse_transactions("1 4294967296"),
            Err(InputError::InvalidId { position: 1 })
        ));
    }

    #[test]
    fn rejects_extra_ids() {
        assert!(matches!(
            parse_transactions("2 1 2 3"),
            Err(InputError::TooManyIds { expected: 2 })
        ));
    }

    #[test]
    fn empty_filename_is_rejected() {
        assert!(matches!(
            read_transaction_file("  "),
            Err(InputError::EmptyFilename)
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = read_transaction_file("/definitely/not/here.txt").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.txt"));
    }

    #[test]
    fn difficulty_prompt_retries_until_valid() {
        let mut input = Cursor::new("abc\n11\n4\n");
        let mut output = Vec::new();
        let difficulty = prompt_difficulty(&mut input, &mut output).unwrap();
        assert_eq!(difficulty, Some(4));

        let text = String::from_utf8(output).unwrap();
        assert_eq!(text.matches("Invalid input").count(), 2);
    }

    #[test]
    fn miners_prompt_gives_up_at_eof() {
        let mut input = Cursor::new("0\n-1\n");
        let mut output = Vec::new();
        assert_eq!(prompt_miners(&mut input, &mut output).unwrap(), None);
    }

    #[test]
    fn filename_prompt() {
        let mut output = Vec::new();
        let name = prompt_filename(&mut Cursor::new("  txs.txt \n"), &mut output).unwrap();
        assert_eq!(name, "txs.txt");
        assert!(matches!(
            prompt_filename(&mut Cursor::new("\n"), &mut output),
            Err(InputError::EmptyFilename)
        ));
    }
}
