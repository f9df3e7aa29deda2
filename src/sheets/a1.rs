//! A1-notation helpers: column letters and `Tab!A1:Z200` ranges

use std::fmt;
use std::str::FromStr;

use crate::error::{FunnelError, FunnelResult};

/// Convert column index to column letters (0→A, 25→Z, 26→AA, ...)
pub fn column_to_letters(index: usize) -> String {
    let mut result = String::new();
    let mut num = index;

    loop {
        let remainder = num % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if num < 26 {
            break;
        }
        num = num / 26 - 1;
    }

    result
}

/// Convert column letters to a zero-based index (A→0, Z→25, AA→26, ...)
pub fn letters_to_column(letters: &str) -> FunnelResult<usize> {
    if letters.is_empty() {
        return Err(FunnelError::InvalidRange("empty column".to_string()));
    }
    letters.chars().try_fold(0usize, |acc, c| {
        if !c.is_ascii_alphabetic() {
            return Err(FunnelError::InvalidRange(format!(
                "invalid column letters: {}",
                letters
            )));
        }
        let digit = (c.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        acc.checked_mul(26)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(|| FunnelError::InvalidRange(format!("column too large: {}", letters)))
    })
    .map(|n| n - 1)
}

/// Single cell coordinate. `column` is zero-based, `row` is one-based as in A1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    pub column: usize,
    pub row: usize,
}

impl CellRef {
    /// The cell `offset` columns to the right (`Y7` + 6 is `AE7`).
    pub fn offset_columns(self, offset: usize) -> FunnelResult<CellRef> {
        let column = self.column.checked_add(offset).ok_or_else(|| {
            FunnelError::InvalidRange(format!("column offset {} from {} overflows", offset, self))
        })?;
        Ok(CellRef { column, ..self })
    }
}

impl FromStr for CellRef {
    type Err = FunnelError;

    fn from_str(s: &str) -> FunnelResult<Self> {
        let split = s
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| FunnelError::InvalidRange(format!("missing row in {}", s)))?;
        let (letters, digits) = s.split_at(split);
        let column = letters_to_column(letters)?;
        let row: usize = digits
            .parse()
            .map_err(|_| FunnelError::InvalidRange(format!("invalid row in {}", s)))?;
        if row == 0 {
            return Err(FunnelError::InvalidRange(format!("rows start at 1: {}", s)));
        }
        Ok(CellRef { column, row })
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_to_letters(self.column), self.row)
    }
}

/// A rectangular range on a named tab, e.g. `'Dashboard Forecast'!D7:J20`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRange {
    pub tab: String,
    pub start: CellRef,
    pub end: CellRef,
}

impl SheetRange {
    pub fn new(tab: impl Into<String>, start: CellRef, end: CellRef) -> Self {
        Self {
            tab: tab.into(),
            start,
            end,
        }
    }

    pub fn height(&self) -> usize {
        self.end.row.saturating_sub(self.start.row) + 1
    }
}

impl FromStr for SheetRange {
    type Err = FunnelError;

    fn from_str(s: &str) -> FunnelResult<Self> {
        let bang = s
            .rfind('!')
            .ok_or_else(|| FunnelError::InvalidRange(format!("missing tab name in {}", s)))?;
        let (raw_tab, cells) = (&s[..bang], &s[bang + 1..]);

        let tab = match raw_tab
            .strip_prefix('\'')
            .and_then(|t| t.strip_suffix('\''))
        {
            Some(quoted) => quoted.replace("''", "'"),
            None => raw_tab.to_string(),
        };
        if tab.is_empty() {
            return Err(FunnelError::InvalidRange(format!("empty tab name in {}", s)));
        }

        let (start, end) = match cells.split_once(':') {
            Some((a, b)) => (a.parse::<CellRef>()?, b.parse::<CellRef>()?),
            None => {
                let only = cells.parse::<CellRef>()?;
                (only, only)
            }
        };
        if end.column < start.column || end.row < start.row {
            return Err(FunnelError::InvalidRange(format!("inverted range {}", s)));
        }

        Ok(SheetRange { tab, start, end })
    }
}

impl fmt::Display for SheetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plain = self
            .tab
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if plain {
            write!(f, "{}!{}:{}", self.tab, self.start, self.end)
        } else {
            write!(
                f,
                "'{}'!{}:{}",
                self.tab.replace('\'', "''"),
                self.start,
                self.end
            )
        }
    }
}
