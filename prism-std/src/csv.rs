//! Delimited text reader for file-backed relational inputs

use csv::{ReaderBuilder, StringRecord};
use prism_core::{AlgorithmError, CsvOptions, FileInput, RelationalInput};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use tracing::debug;

/// A fully loaded relation. `None` marks a missing value.
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Relation {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Values of one column in row order
    pub fn column(&self, index: usize) -> impl Iterator<Item = Option<&str>> + '_ {
        self.rows.iter().map(move |row| row[index].as_deref())
    }

    /// Group row indices by their values on `columns`
    pub fn partition(&self, columns: &[usize]) -> HashMap<Vec<Option<&str>>, Vec<usize>> {
        let mut groups: HashMap<Vec<Option<&str>>, Vec<usize>> = HashMap::new();
        for (i, row) in self.rows.iter().enumerate() {
            let key = columns.iter().map(|&c| row[c].as_deref()).collect();
            groups.entry(key).or_default().push(i);
        }
        groups
    }
}

/// Load a relational input. Only file-backed inputs can be read.
pub fn read_relation(input: &RelationalInput) -> Result<Relation, AlgorithmError> {
    match input {
        RelationalInput::File(file) => read_file(file),
        RelationalInput::Table(table) => Err(AlgorithmError::UnsupportedInput {
            input: table.table_name.clone(),
            reason: format!(
                "no driver for {:?} connection '{}'",
                table.connection.system, table.connection.identifier
            ),
        }),
    }
}

pub fn read_file(input: &FileInput) -> Result<Relation, AlgorithmError> {
    let content = fs::read_to_string(&input.path).map_err(|source| AlgorithmError::InputRead {
        path: input.path.clone(),
        source,
    })?;
    let relation = parse(&input.file_name, &content, &input.options)?;
    debug!(
        input = %input.file_name,
        columns = relation.columns.len(),
        rows = relation.rows.len(),
        "relation loaded"
    );
    Ok(relation)
}

/// Parse delimited text into a relation.
///
/// The first `skip_lines` lines are dropped before the text reaches the CSV
/// reader. Blank lines are skipped, except inside a single-column relation
/// where a blank line between rows is an empty field.
pub fn parse(name: &str, content: &str, options: &CsvOptions) -> Result<Relation, AlgorithmError> {
    let malformed = |reason: String| AlgorithmError::MalformedInput {
        input: name.to_string(),
        reason,
    };

    let body = skip_lines(content, options.skip_lines);
    // Every record ends with a terminator, so line accounting is uniform
    let body: Cow<'_, str> = if body.is_empty() || body.ends_with('\n') {
        Cow::Borrowed(body)
    } else {
        Cow::Owned(format!("{}\n", body))
    };

    let mut reader = ReaderBuilder::new()
        .delimiter(single_byte("separator", options.separator).map_err(malformed)?)
        .quote(single_byte("quote character", options.quote_char).map_err(malformed)?)
        .has_headers(options.header)
        .flexible(true)
        .from_reader(body.as_bytes());

    let columns: Vec<String> = if options.header {
        let header = reader.headers().map_err(|e| malformed(e.to_string()))?;
        if header.is_empty() {
            return Err(malformed("missing header line".to_string()));
        }
        header.iter().map(str::to_string).collect()
    } else {
        Vec::new()
    };

    let mut rows = Vec::new();
    let mut width = options.header.then_some(columns.len());
    let mut record = StringRecord::new();
    loop {
        let before = reader.position().line();
        if !reader.read_record(&mut record).map_err(|e| malformed(e.to_string()))? {
            break;
        }
        // Quoted fields may span lines; each embedded newline is one more line
        let spanned = 1 + record.iter().map(|f| f.matches('\n').count() as u64).sum::<u64>();
        let start = reader.position().line().saturating_sub(spanned);

        let expected = *width.get_or_insert(record.len());
        if expected == 1 {
            for _ in before..start {
                rows.push(vec![field_value("", options)]);
            }
        }
        if record.len() != expected {
            return Err(malformed(format!(
                "line {} has {} fields, expected {}",
                start + options.skip_lines as u64,
                record.len(),
                expected
            )));
        }
        rows.push(record.iter().map(|field| field_value(field, options)).collect());
    }

    let columns = if options.header {
        columns
    } else {
        (1..=width.unwrap_or(0)).map(|i| format!("column{}", i)).collect()
    };

    Ok(Relation {
        name: name.to_string(),
        columns,
        rows,
    })
}

fn field_value(field: &str, options: &CsvOptions) -> Option<String> {
    (field != options.null_value).then(|| field.to_string())
}

fn single_byte(what: &str, c: char) -> Result<u8, String> {
    u8::try_from(c)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| format!("{} '{}' must be a single ASCII character", what, c))
}

fn skip_lines(content: &str, count: usize) -> &str {
    let mut rest = content;
    for _ in 0..count {
        match rest.find('\n') {
            Some(i) => rest = &rest[i + 1..],
            None => return "",
        }
    }
    rest
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn options() -> CsvOptions {
        CsvOptions::default()
    }

    #[test]
    fn test_parse_with_header() {
        let relation = parse("people.csv", "id,name\n1,Ann\n2,Bob\n", &options()).unwrap();
        assert_eq!(relation.columns(), &["id".to_string(), "name".to_string()]);
        assert_eq!(relation.rows().len(), 2);
        assert_eq!(relation.rows()[1][1].as_deref(), Some("Bob"));
    }

    #[test]
    fn test_parse_without_header() {
        let options = CsvOptions {
            header: false,
            ..options()
        };
        let relation = parse("r", "1,a\n2,b", &options).unwrap();
        assert_eq!(relation.columns(), &["column1".to_string(), "column2".to_string()]);
        assert_eq!(relation.rows().len(), 2);
    }

    #[test]
    fn test_quotes_and_separators() {
        let options = CsvOptions {
            separator: ';',
            quote_char: '\'',
            ..options()
        };
        let relation = parse("r", "a;b\n'x;y';'it''s'\n'multi\nline';z\n", &options).unwrap();
        assert_eq!(relation.rows()[0][0].as_deref(), Some("x;y"));
        assert_eq!(relation.rows()[0][1].as_deref(), Some("it's"));
        assert_eq!(relation.rows()[1][0].as_deref(), Some("multi\nline"));
    }

    #[test]
    fn test_skip_lines_and_nulls() {
        let options = CsvOptions {
            skip_lines: 2,
            null_value: "NULL".to_string(),
            ..options()
        };
        let relation = parse("r", "# export\n# v2\na,b\n1,NULL\r\n2,x\r\n", &options).unwrap();
        assert_eq!(relation.rows()[0][1], None);
        assert_eq!(relation.rows()[1][1].as_deref(), Some("x"));
    }

    #[test]
    fn test_empty_field_is_null_by_default() {
        let relation = parse("r", "a,b\n1,\n", &options()).unwrap();
        assert_eq!(relation.rows()[0][1], None);
    }

    #[test]
    fn test_ragged_row_rejected() {
        let err = parse("r", "a,b\n1,2\n3\n", &options()).unwrap_err();
        assert!(err.to_string().contains("line 3 has 1 fields, expected 2"));
    }

    #[test]
    fn test_quote_inside_unquoted_field_is_literal() {
        let relation = parse("r", "a,b\n5\" screen,x\n", &options()).unwrap();
        assert_eq!(relation.rows()[0][0].as_deref(), Some("5\" screen"));
        assert_eq!(relation.rows()[0][1].as_deref(), Some("x"));
    }

    #[test]
    fn test_blank_line_in_single_column_is_null() {
        let relation = parse("r", "a\n1\n\n2\n", &options()).unwrap();
        assert_eq!(
            relation.rows(),
            &[vec![Some("1".to_string())], vec![None], vec![Some("2".to_string())]]
        );
    }

    #[test]
    fn test_blank_line_skipped_in_wider_relation() {
        let relation = parse("r", "a,b\n1,2\n\n3,4\n", &options()).unwrap();
        assert_eq!(relation.rows().len(), 2);
    }

    #[test]
    fn test_ragged_row_after_multiline_field() {
        let err = parse("r", "a,b\n\"x\ny\",1\n2\n", &options()).unwrap_err();
        assert!(err.to_string().contains("line 4 has 1 fields, expected 2"));
    }

    #[test]
    fn test_non_ascii_separator_rejected() {
        let options = CsvOptions {
            separator: '§',
            ..options()
        };
        assert!(matches!(
            parse("r", "a§b\n", &options),
            Err(AlgorithmError::MalformedInput { .. })
        ));
    }

    #[test]
    fn test_read_file_and_partition() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "zip,city\n10115,Berlin\n10115,Berlin\n80331,Munich\n").unwrap();
        let input = FileInput {
            file_name: "cities.csv".to_string(),
            path: file.path().to_path_buf(),
            options: CsvOptions::default(),
        };
        let relation = read_relation(&RelationalInput::File(input)).unwrap();
        assert_eq!(relation.name(), "cities.csv");
        let zip = relation.column_index("zip").unwrap();
        assert_eq!(relation.partition(&[zip]).len(), 2);
        assert_eq!(relation.column(zip).filter(|v| *v == Some("10115")).count(), 2);
    }

    #[test]
    fn test_missing_file() {
        let input = FileInput {
            file_name: "gone.csv".to_string(),
            path: "/nonexistent/gone.csv".into(),
            options: CsvOptions::default(),
        };
        assert!(matches!(read_file(&input), Err(AlgorithmError::InputRead { .. })));
    }
}
