use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::HarnessError;

/// Environment variable overriding the config file path.
pub const CONF_PATH_ENV: &str = "RDKAFKA_TEST_CONF";

/// Config file name used when `RDKAFKA_TEST_CONF` is unset.
pub const DEFAULT_CONF_PATH: &str = "test.conf";

/// One `name=value` line from the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfEntry {
    /// Key, everything before the first `=`. Never empty.
    pub name: String,
    /// Value, everything after the first `=`, verbatim.
    pub value: String,
    /// 1-based physical line number, counting skipped lines, so that
    /// diagnostics point at the true line.
    pub line: usize,
}

/// Resolves the config file path: `RDKAFKA_TEST_CONF` if set, else
/// `test.conf` in the working directory.
pub fn conf_path() -> PathBuf {
    std::env::var(CONF_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONF_PATH))
}

/// Reads the config file into ordered entries.
///
/// A missing file is fatal: the harness does not treat "no config" as a
/// valid state, and a missing file is reported distinctly from other read
/// failures.
pub fn parse_conf_file(path: &Path) -> Result<Vec<ConfEntry>, HarnessError> {
    let file = File::open(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => HarnessError::ConfFileMissing {
            path: path.to_path_buf(),
        },
        _ => HarnessError::ConfFileIo {
            path: path.to_path_buf(),
            source,
        },
    })?;
    parse_reader(path, BufReader::new(file))
}

fn parse_reader(path: &Path, reader: impl BufRead) -> Result<Vec<ConfEntry>, HarnessError> {
    let mut entries = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| HarnessError::ConfFileIo {
            path: path.to_path_buf(),
            source,
        })?;
        let lineno = idx + 1;

        if line.is_empty() || line.trim_start().starts_with('#') {
            continue;
        }

        // Split at the first `=` only; the value is the verbatim
        // remainder, with no trimming or quoting.
        let entry = line
            .split_once('=')
            .filter(|(name, _)| !name.is_empty())
            .ok_or_else(|| HarnessError::ConfLineFormat {
                file: path.to_path_buf(),
                line: lineno,
            })?;

        entries.push(ConfEntry {
            name: entry.0.to_string(),
            value: entry.1.to_string(),
            line: lineno,
        });
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn parse(contents: &str) -> Result<Vec<ConfEntry>, HarnessError> {
        parse_reader(Path::new("test.conf"), Cursor::new(contents))
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let entries = parse("# leading comment\n\n  # indented comment\na=1\n").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "a");
        assert_eq!(entries[0].value, "1");
        assert_eq!(entries[0].line, 4);
    }

    #[test]
    fn preserves_file_order_and_line_numbers() {
        let entries = parse("first=1\n# gap\nsecond=2\n").unwrap();
        let summary: Vec<(&str, usize)> = entries
            .iter()
            .map(|e| (e.name.as_str(), e.line))
            .collect();
        assert_eq!(summary, vec![("first", 1), ("second", 3)]);
    }

    #[test]
    fn splits_on_first_equals_only() {
        let entries = parse("sasl.jaas.config=user=alice;pass=secret\n").unwrap();
        assert_eq!(entries[0].name, "sasl.jaas.config");
        assert_eq!(entries[0].value, "user=alice;pass=secret");
    }

    #[test]
    fn value_may_be_empty_and_is_not_trimmed() {
        let entries = parse("empty=\npadded=  spaced out \n").unwrap();
        assert_eq!(entries[0].value, "");
        assert_eq!(entries[1].value, "  spaced out ");
    }

    #[test]
    fn line_without_equals_is_a_format_error() {
        let err = parse("good=1\nfoobar\n").unwrap_err();
        match err {
            HarnessError::ConfLineFormat { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn whitespace_only_line_is_a_format_error() {
        // Not empty, not a comment, contains no `=`.
        let err = parse("   \n").unwrap_err();
        assert!(matches!(err, HarnessError::ConfLineFormat { line: 1, .. }));
    }

    #[test]
    fn empty_name_is_a_format_error() {
        let err = parse("=value\n").unwrap_err();
        assert!(matches!(err, HarnessError::ConfLineFormat { line: 1, .. }));
    }

    #[test]
    fn missing_file_is_distinct_from_other_io_errors() {
        let err = parse_conf_file(Path::new("/nonexistent/nope.conf")).unwrap_err();
        assert!(matches!(err, HarnessError::ConfFileMissing { .. }));
    }
}
