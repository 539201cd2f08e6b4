use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::ScoreError;

/// A rectangular dataset of untyped cells, as handed over by the data source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    /// Lowercased, trimmed header -> column index
    index: HashMap<String, usize>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let mut index = HashMap::with_capacity(headers.len());
        for (i, h) in headers.iter().enumerate() {
            // First occurrence wins for duplicated headers
            index.entry(normalize_header(h)).or_insert(i);
        }
        Self {
            headers,
            rows,
            index,
        }
    }

    /// Read a CSV with a header row. Ragged rows are padded with empty cells.
    pub fn from_reader<R: Read>(rdr: R) -> Result<Self, ScoreError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(rdr);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }
        debug!("read {} rows x {} columns", rows.len(), headers.len());
        Ok(Self::new(headers, rows))
    }

    pub fn from_path(path: &Path) -> Result<Self, ScoreError> {
        let file = std::fs::File::open(path).map_err(|e| ScoreError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_reader(file)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column index for a header name, matched case-insensitively.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.index.get(&normalize_header(name)).copied()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[String]> + '_ {
        self.rows.iter().map(Vec::as_slice)
    }
}

fn normalize_header(h: &str) -> String {
    h.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_headers_and_rows() {
        let csv = "Player_Name,Team\nAlice,Reds\nBob,Blues\n";
        let table = RawTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.headers(), &["Player_Name".to_string(), "Team".to_string()]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.column("player_name"), Some(0));
        assert_eq!(table.column(" TEAM "), Some(1));
        assert_eq!(table.column("age"), None);
    }

    #[test]
    fn test_ragged_rows_are_padded() {
        let csv = "a,b,c\n1,2\n";
        let table = RawTable::from_reader(csv.as_bytes()).unwrap();
        let row = table.rows().next().unwrap();
        assert_eq!(row, &["1".to_string(), "2".to_string(), String::new()]);
    }

    #[test]
    fn test_cells_are_trimmed() {
        let csv = "a,b\n  x , 3.5 \n";
        let table = RawTable::from_reader(csv.as_bytes()).unwrap();
        let row = table.rows().next().unwrap();
        assert_eq!(row[0], "x");
        assert_eq!(row[1], "3.5");
    }

    #[test]
    fn test_header_only_is_empty() {
        let table = RawTable::from_reader("a,b\n".as_bytes()).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_duplicate_header_first_wins() {
        let table = RawTable::new(
            vec!["xg".to_string(), "XG".to_string()],
            vec![vec!["1".to_string(), "2".to_string()]],
        );
        assert_eq!(table.column("xg"), Some(0));
    }
}
