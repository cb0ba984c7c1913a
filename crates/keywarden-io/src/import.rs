// ABOUTME: Spreadsheet import helpers: Excel column letters and key extraction from a grid.
// ABOUTME: File parsing is the front end's concern; this consumes an already-parsed grid.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("invalid column letter: {0}")]
    InvalidColumn(String),

    #[error("start row must be at least 1")]
    InvalidStartRow,
}

/// Zero-based index of an Excel-style column letter: `A` is 0, `Z` is
/// 25, `AA` is 26.
pub fn column_index(letters: &str) -> Result<usize, ImportError> {
    let letters = letters.trim();
    if letters.is_empty() {
        return Err(ImportError::InvalidColumn(letters.to_string()));
    }

    let mut index: usize = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(ImportError::InvalidColumn(letters.to_string()));
        }
        let digit = c.to_ascii_uppercase() as usize - 'A' as usize + 1;
        index = index
            .checked_mul(26)
            .and_then(|i| i.checked_add(digit))
            .ok_or_else(|| ImportError::InvalidColumn(letters.to_string()))?;
    }
    Ok(index - 1)
}

/// Pull key strings from one column of a parsed sheet, starting at the
/// 1-based `start_row`. Cells are trimmed; blanks and short rows are
/// skipped. Duplicate filtering happens later, at insert time.
pub fn extract_keys(
    grid: &[Vec<String>],
    column: &str,
    start_row: usize,
) -> Result<Vec<String>, ImportError> {
    if start_row == 0 {
        return Err(ImportError::InvalidStartRow);
    }
    let column = column_index(column)?;

    Ok(grid
        .iter()
        .skip(start_row - 1)
        .filter_map(|row| row.get(column))
        .map(|cell| cell.trim().to_string())
        .filter(|cell| !cell.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_letters_map_like_excel() {
        assert_eq!(column_index("A").unwrap(), 0);
        assert_eq!(column_index("b").unwrap(), 1);
        assert_eq!(column_index("Z").unwrap(), 25);
        assert_eq!(column_index("AA").unwrap(), 26);
        assert_eq!(column_index("AZ").unwrap(), 51);
        assert!(matches!(column_index(""), Err(ImportError::InvalidColumn(_))));
        assert!(matches!(column_index("A1"), Err(ImportError::InvalidColumn(_))));
    }

    #[test]
    fn absurdly_long_column_letters_are_rejected() {
        let letters = "Z".repeat(64);
        assert!(matches!(
            column_index(&letters),
            Err(ImportError::InvalidColumn(_))
        ));
    }

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn extracts_trimmed_cells_from_the_start_row() {
        let grid = grid(&[
            &["Header", "ignored"],
            &["  K-1  ", "x"],
            &["", "x"],
            &["K-2"],
            &[],
        ]);

        let keys = extract_keys(&grid, "A", 2).unwrap();
        assert_eq!(keys, vec!["K-1", "K-2"]);
    }

    #[test]
    fn start_row_one_includes_everything() {
        let grid = grid(&[&["K-1"], &["K-2"]]);
        assert_eq!(extract_keys(&grid, "a", 1).unwrap(), vec!["K-1", "K-2"]);
        assert!(matches!(
            extract_keys(&grid, "A", 0),
            Err(ImportError::InvalidStartRow)
        ));
    }
}
