//! CSV dataset loading and feature/target separation
//!
//! Reads a headed, comma-delimited table and converts every non-target
//! column to fixed-point integers (SCALE = 1_000_000).

use crop_core::fixed::parse_fixed;
use std::collections::HashSet;
use std::path::Path;

use crate::errors::TrainerError;

/// Header and string cells of a loaded CSV file, in file order
#[derive(Clone, Debug, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// 1-based source line of each row, for error messages
    pub lines: Vec<u64>,
}

/// Fixed-point feature rows with their column names
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeatureMatrix {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<i64>>,
}

impl RawTable {
    /// Load a table from a CSV file with a header row.
    ///
    /// Header names are trimmed, cells are kept verbatim; every row must have
    /// as many cells as the header.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self, TrainerError> {
        let path = path.as_ref();
        let dataset_err = |reason: String| TrainerError::Dataset {
            path: path.display().to_string(),
            reason,
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_path(path)
            .map_err(|err| dataset_err(err.to_string()))?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(|err| dataset_err(err.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();

        if headers.is_empty() || headers.iter().all(String::is_empty) {
            return Err(dataset_err("missing header row".to_string()));
        }

        let mut seen = HashSet::new();
        if let Some(dup) = headers.iter().find(|name| !seen.insert(name.as_str())) {
            return Err(dataset_err(format!("duplicate column '{}'", dup)));
        }

        let mut rows = Vec::new();
        let mut lines = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|err| dataset_err(err.to_string()))?;
            let line = record.position().map(|pos| pos.line()).unwrap_or(0);
            rows.push(record.iter().map(str::to_string).collect());
            lines.push(line);
        }

        if rows.is_empty() {
            return Err(dataset_err("dataset has no rows".to_string()));
        }

        Ok(Self {
            headers,
            rows,
            lines,
        })
    }

    /// Get number of samples
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if table is empty
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Separate the named target column from the feature columns.
    ///
    /// Remaining columns keep header order and must all hold finite decimal
    /// numbers.
    pub fn split_target(&self, target: &str) -> Result<(FeatureMatrix, Vec<String>), TrainerError> {
        let target_idx = self
            .headers
            .iter()
            .position(|name| name == target)
            .ok_or_else(|| TrainerError::MissingColumn(target.to_string()))?;

        let feature_idx: Vec<usize> = (0..self.headers.len())
            .filter(|&i| i != target_idx)
            .collect();
        if feature_idx.is_empty() {
            return Err(TrainerError::Dataset {
                path: String::from("<table>"),
                reason: format!("no feature columns besides '{}'", target),
            });
        }

        let columns = feature_idx.iter().map(|&i| self.headers[i].clone()).collect();
        let mut rows = Vec::with_capacity(self.rows.len());
        let mut targets = Vec::with_capacity(self.rows.len());

        for (row, &line) in self.rows.iter().zip(&self.lines) {
            let mut values = Vec::with_capacity(feature_idx.len());
            for &i in &feature_idx {
                let value = parse_fixed(&row[i]).map_err(|err| TrainerError::InvalidValue {
                    line,
                    column: self.headers[i].clone(),
                    reason: err.to_string(),
                })?;
                values.push(value);
            }
            rows.push(values);
            targets.push(row[target_idx].clone());
        }

        Ok((FeatureMatrix { columns, rows }, targets))
    }
}

impl FeatureMatrix {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn feature_count(&self) -> usize {
        self.columns.len()
    }

    /// Per-column (min, max) in fixed-point, for logging
    pub fn feature_stats(&self) -> Vec<(i64, i64)> {
        let mut stats = vec![(i64::MAX, i64::MIN); self.feature_count()];

        for row in &self.rows {
            for (i, &val) in row.iter().enumerate() {
                stats[i].0 = stats[i].0.min(val);
                stats[i].1 = stats[i].1.max(val);
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(contents: &str) -> Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        write!(file, "{}", contents)?;
        file.flush()?;
        Ok(file)
    }

    fn create_test_csv() -> Result<NamedTempFile> {
        write_csv(
            "N,P,K,temperature,humidity,ph,rainfall,label\n\
             90,42,43,20.879744,82.002744,6.502985,202.935536,rice\n\
             85,58,41,21.770462,80.319644,7.038096,226.655537,rice\n\
             40,72,77,17.024985,16.988612,7.485996,88.551231,chickpea\n",
        )
    }

    #[test]
    fn test_load_csv() -> Result<()> {
        let file = create_test_csv()?;
        let table = RawTable::from_csv(file.path())?;

        assert_eq!(table.len(), 3);
        assert_eq!(table.headers.len(), 8);
        assert_eq!(table.rows[2][7], "chickpea");
        assert_eq!(table.lines, vec![2, 3, 4]);

        Ok(())
    }

    #[test]
    fn test_split_target() -> Result<()> {
        let file = create_test_csv()?;
        let table = RawTable::from_csv(file.path())?;
        let (features, targets) = table.split_target("label")?;

        assert_eq!(
            features.columns,
            vec!["N", "P", "K", "temperature", "humidity", "ph", "rainfall"]
        );
        assert_eq!(features.len(), 3);
        assert_eq!(features.rows[0][0], 90_000_000);
        assert_eq!(features.rows[0][3], 20_879_744);
        assert_eq!(targets, vec!["rice", "rice", "chickpea"]);

        Ok(())
    }

    #[test]
    fn test_label_cells_keep_whitespace() -> Result<()> {
        let file = write_csv("N , rainfall, label\n 90 ,202.9,rice\n85, 226.6 , rice\n")?;
        let table = RawTable::from_csv(file.path())?;
        assert_eq!(table.headers, vec!["N", "rainfall", "label"]);

        let (features, targets) = table.split_target("label")?;
        assert_eq!(features.rows[0], vec![90_000_000, 202_900_000]);
        assert_eq!(features.rows[1], vec![85_000_000, 226_600_000]);
        assert_eq!(targets, vec!["rice", " rice"]);

        Ok(())
    }

    #[test]
    fn test_target_not_last_column() -> Result<()> {
        let file = write_csv("label,a,b\nx,1,2\ny,3,4\n")?;
        let table = RawTable::from_csv(file.path())?;
        let (features, targets) = table.split_target("label")?;

        assert_eq!(features.columns, vec!["a", "b"]);
        assert_eq!(features.rows, vec![vec![1_000_000, 2_000_000], vec![3_000_000, 4_000_000]]);
        assert_eq!(targets, vec!["x", "y"]);

        Ok(())
    }

    #[test]
    fn test_missing_target_column() -> Result<()> {
        let file = create_test_csv()?;
        let table = RawTable::from_csv(file.path())?;

        assert!(matches!(
            table.split_target("crop"),
            Err(TrainerError::MissingColumn(name)) if name == "crop"
        ));

        Ok(())
    }

    #[test]
    fn test_invalid_feature_value() -> Result<()> {
        let file = write_csv("a,label\n1,x\noops,y\n")?;
        let table = RawTable::from_csv(file.path())?;

        match table.split_target("label") {
            Err(TrainerError::InvalidValue { line, column, .. }) => {
                assert_eq!(line, 3);
                assert_eq!(column, "a");
            }
            other => panic!("unexpected result: {:?}", other),
        }

        Ok(())
    }

    #[test]
    fn test_malformed_inputs() -> Result<()> {
        assert!(RawTable::from_csv("/definitely/not/here.csv").is_err());

        let ragged = write_csv("a,b,label\n1,2,x\n1,y\n")?;
        assert!(matches!(
            RawTable::from_csv(ragged.path()),
            Err(TrainerError::Dataset { .. })
        ));

        let header_only = write_csv("a,label\n")?;
        assert!(RawTable::from_csv(header_only.path()).is_err());

        let duplicate = write_csv("a,a,label\n1,2,x\n")?;
        assert!(RawTable::from_csv(duplicate.path()).is_err());

        let only_target = write_csv("label\nx\n")?;
        let table = RawTable::from_csv(only_target.path())?;
        assert!(table.split_target("label").is_err());

        Ok(())
    }

    #[test]
    fn test_feature_stats() -> Result<()> {
        let file = create_test_csv()?;
        let (features, _) = RawTable::from_csv(file.path())?.split_target("label")?;

        let stats = features.feature_stats();
        assert_eq!(stats.len(), 7);
        assert_eq!(stats[0], (40_000_000, 90_000_000));
        assert_eq!(stats[1], (42_000_000, 72_000_000));

        Ok(())
    }
}
