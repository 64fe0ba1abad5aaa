//! Worksheet and workbook containers

use crate::cell::{Cell, CellContent};

/// One worksheet's fully classified cells, in document order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Worksheet {
    /// Sheet name from the workbook part
    pub name: String,
    /// Cells in row-major document order
    pub cells: Vec<Cell>,
}

impl Worksheet {
    /// Create an empty worksheet
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            cells: Vec::new(),
        }
    }

    /// Number of cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Iterate over cells carrying a formula (plain, array or shared)
    pub fn formula_cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells
            .iter()
            .filter(|c| c.content.formula_text().is_some())
    }

    /// True if any cell still awaits the resolution post-pass
    pub fn has_pending_cells(&self) -> bool {
        self.cells.iter().any(|c| c.content.is_pending())
    }

    /// Count cells of a given kind name (see [`CellContent::kind_name`])
    pub fn count_kind(&self, kind: &str) -> usize {
        self.cells
            .iter()
            .filter(|c| c.content.kind_name() == kind)
            .count()
    }
}

/// An ordered collection of worksheets
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    /// Worksheets in workbook order
    pub sheets: Vec<Worksheet>,
}

impl Workbook {
    /// Create an empty workbook
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of worksheets
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Get a worksheet by index
    pub fn worksheet(&self, index: usize) -> Option<&Worksheet> {
        self.sheets.get(index)
    }

    /// Find a worksheet by name
    pub fn worksheet_by_name(&self, name: &str) -> Option<&Worksheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::CellAddress;

    #[test]
    fn test_worksheet_counters() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.cells.push(Cell::new(
            CellAddress::new(0, 0),
            CellContent::Number(1.0),
        ));
        sheet.cells.push(Cell::new(
            CellAddress::new(0, 1),
            CellContent::Formula {
                text: "A1*2".into(),
                result: None,
            },
        ));
        sheet
            .cells
            .push(Cell::new(CellAddress::new(0, 2), CellContent::PendingString(0)));

        assert_eq!(sheet.cell_count(), 3);
        assert_eq!(sheet.formula_cells().count(), 1);
        assert!(sheet.has_pending_cells());
        assert_eq!(sheet.count_kind("value"), 1);
        assert_eq!(sheet.count_kind("string"), 1);
    }

    #[test]
    fn test_workbook_lookup() {
        let mut workbook = Workbook::new();
        workbook.sheets.push(Worksheet::new("Data"));
        workbook.sheets.push(Worksheet::new("Summary"));

        assert_eq!(workbook.sheet_count(), 2);
        assert_eq!(workbook.worksheet(1).unwrap().name, "Summary");
        assert!(workbook.worksheet_by_name("Data").is_some());
        assert!(workbook.worksheet_by_name("Missing").is_none());
    }
}
