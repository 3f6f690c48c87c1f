use crate::structs::{CsvData, FeatureMatrix, NetError, Result};

impl FeatureMatrix {
    /// Extract numeric variables from CSV data
    ///
    /// Cells that are empty, unparseable or non-finite become `NaN` and are
    /// treated as missing; the other cells of the row are kept. Rows with no
    /// usable value at all are dropped.
    ///
    /// # Errors
    /// Returns error if no numeric columns or no rows with numeric data are found
    pub fn from_csv(csv: &CsvData) -> Result<Self> {
        let numeric_cols = csv.numeric_column_indices();

        if numeric_cols.is_empty() {
            return Err(NetError::Data("No numeric columns found".into()));
        }

        let names: Vec<String> = numeric_cols
            .iter()
            .filter_map(|&i| csv.headers.get(i).cloned())
            .collect();

        let mut data = Vec::new();
        let mut row_indices = Vec::new();

        for (row_idx, row) in csv.rows.iter().enumerate() {
            let values: Vec<f64> = numeric_cols
                .iter()
                .map(|&col_idx| {
                    row.get(col_idx)
                        .and_then(|cell| cell.trim().parse::<f64>().ok())
                        .filter(|v| v.is_finite())
                        .unwrap_or(f64::NAN)
                })
                .collect();

            if values.iter().any(|v| v.is_finite()) {
                data.push(values);
                row_indices.push(row_idx);
            }
        }

        if data.is_empty() {
            return Err(NetError::Data("No rows with numeric data".into()));
        }

        let mut features = Self::from_rows(names, data)?;
        features.row_indices = row_indices;
        Ok(features)
    }

    /// Build an observation table directly from in-memory rows
    ///
    /// # Errors
    /// Returns error if a row's width differs from the number of names
    pub fn from_rows(names: Vec<String>, data: Vec<Vec<f64>>) -> Result<Self> {
        if let Some((i, row)) = data.iter().enumerate().find(|(_, r)| r.len() != names.len()) {
            return Err(NetError::Data(format!(
                "Row {i} has {} values, expected {}",
                row.len(),
                names.len()
            )));
        }
        let row_indices = (0..data.len()).collect();
        Ok(Self {
            names,
            data,
            row_indices,
        })
    }

    /// Copy of the table made of the given rows, repeats allowed
    #[must_use]
    pub fn resample(&self, rows: &[usize]) -> Self {
        Self {
            names: self.names.clone(),
            data: rows.iter().map(|&r| self.data[r].clone()).collect(),
            row_indices: rows.iter().map(|&r| self.row_indices[r]).collect(),
        }
    }
}
