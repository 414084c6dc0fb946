//! Plain-text dataset files.
//!
//! ```text
//! 4,3,150
//! 5.1,3.5,1.4,0.2,1,0,0
//! ...
//! ```
//!
//! The header is `inputs,outputs,samples`; every following non-blank line
//! holds the inputs then the one-hot outputs, separated by commas or
//! whitespace.

use std::path::Path;

use crate::{Dataset, LoadError};

/// Read a dataset file from disk.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Dataset, LoadError> {
    let path = path.as_ref();
    let content =
        std::fs::read_to_string(path).map_err(|e| LoadError::Io(path.to_path_buf(), e))?;
    let data = parse_dataset(path, &content)?;
    tracing::info!(
        "Loaded {} samples ({} inputs, {} outputs) from {}",
        data.len(),
        data.num_inputs(),
        data.num_outputs(),
        path.display()
    );
    Ok(data)
}

fn fields(line: &str) -> impl Iterator<Item = &str> {
    line.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|f| !f.is_empty())
}

/// Parse dataset text; `path` is only used in error messages.
pub fn parse_dataset(path: &Path, content: &str) -> Result<Dataset, LoadError> {
    let parse_err = |line: usize, msg: String| LoadError::Parse {
        path: path.to_path_buf(),
        line,
        msg,
    };

    let mut lines = content
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty());

    let (header_line, header) = lines
        .next()
        .ok_or_else(|| LoadError::MissingHeader(path.to_path_buf()))?;
    let header: Vec<usize> = fields(header)
        .map(str::parse)
        .collect::<Result<_, _>>()
        .map_err(|e| parse_err(header_line, format!("bad header: {e}")))?;
    let &[num_inputs, num_outputs, num_samples] = header.as_slice() else {
        return Err(parse_err(
            header_line,
            format!("header needs 3 fields, found {}", header.len()),
        ));
    };

    let too_large = || parse_err(header_line, "header dimensions are too large".into());
    let width = num_inputs.checked_add(num_outputs).ok_or_else(too_large)?;
    // The header is untrusted; never reserve more rows than the file has.
    let rows = num_samples.min(content.lines().count());
    let mut inputs = Vec::with_capacity(rows.checked_mul(num_inputs).ok_or_else(too_large)?);
    let mut outputs = Vec::with_capacity(rows.checked_mul(num_outputs).ok_or_else(too_large)?);
    let mut found = 0;

    for (line_no, line) in lines {
        let row: Vec<f64> = fields(line)
            .map(str::parse)
            .collect::<Result<_, _>>()
            .map_err(|e| parse_err(line_no, format!("bad value: {e}")))?;
        if row.len() != width {
            return Err(parse_err(
                line_no,
                format!("expected {width} values, found {}", row.len()),
            ));
        }
        inputs.extend_from_slice(&row[..num_inputs]);
        outputs.extend_from_slice(&row[num_inputs..]);
        found += 1;
    }

    if found != num_samples {
        return Err(LoadError::SampleCount {
            path: path.to_path_buf(),
            expected: num_samples,
            found,
        });
    }

    Ok(Dataset::from_flat(inputs, outputs, num_inputs, num_outputs)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<Dataset, LoadError> {
        parse_dataset(Path::new("test.txt"), content)
    }

    #[test]
    fn parses_header_and_rows() {
        let data = parse("2,2,3\n0.5,1.5,1,0\n\n2.5 3.5 0 1\n4.5,5.5,1,0\n").unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(data.num_inputs(), 2);
        assert_eq!(data.num_outputs(), 2);
        assert_eq!(data.input(1), &[2.5, 3.5]);
        assert_eq!(data.output(1), &[0.0, 1.0]);
        assert_eq!(data.class_of(2), Some(0));
    }

    #[test]
    fn rejects_short_rows_with_line_number() {
        let err = parse("2,2,2\n0.5,1.5,1,0\n0.5,1\n").unwrap_err();
        assert!(matches!(err, LoadError::Parse { line: 3, .. }), "{err}");
    }

    #[test]
    fn rejects_bad_values() {
        let err = parse("1,1,1\nabc,1\n").unwrap_err();
        assert!(matches!(err, LoadError::Parse { line: 2, .. }));
    }

    #[test]
    fn huge_header_count_is_an_error_not_an_allocation() {
        let err = parse("4,3,99999999999999999\n1,2,3,4,1,0,0\n").unwrap_err();
        assert!(matches!(
            err,
            LoadError::SampleCount {
                expected: 99_999_999_999_999_999,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn rejects_overflowing_dimensions() {
        let err = parse(&format!("{},1,1\n", usize::MAX)).unwrap_err();
        assert!(matches!(err, LoadError::Parse { line: 1, .. }), "{err}");
    }

    #[test]
    fn rejects_sample_count_mismatch() {
        let err = parse("1,1,3\n0,1\n1,1\n").unwrap_err();
        assert!(matches!(
            err,
            LoadError::SampleCount {
                expected: 3,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn rejects_missing_or_bad_header() {
        assert!(matches!(parse("\n\n"), Err(LoadError::MissingHeader(_))));
        assert!(matches!(parse("1,1\n0,1\n"), Err(LoadError::Parse { line: 1, .. })));
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.txt");
        std::fs::write(&path, "1,2,2\n0.0,1,0\n1.0,0,1\n").unwrap();
        let data = load_dataset(&path).unwrap();
        assert_eq!(data.len(), 2);

        let missing = load_dataset(dir.path().join("nope.txt"));
        assert!(matches!(missing, Err(LoadError::Io(..))));
    }
}
