use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::model::{CompoundRecord, Sections};

const MAX_SHEET_NAME: usize = 31;
const INVALID_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];
const MAX_COLUMN_WIDTH: usize = 100;
const NOT_AVAILABLE: &str = "N/A";
/// Row (0-based) where the labeled blocks start, below the four header rows and a gap.
const FIRST_BLOCK_ROW: u32 = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
}

impl CellValue {
    fn display_len(&self) -> usize {
        match self {
            CellValue::Text(s) => s.chars().count(),
            CellValue::Number(n) => n.to_string().len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub row: u32,
    pub col: u16,
    pub value: CellValue,
    pub bold: bool,
}

/// One sheet per compound, titled by CAS number.
pub fn save(records: &[CompoundRecord], path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let mut used = HashSet::new();

    for record in records {
        let name = sheet_name(&record.cas, &mut used);
        let sheet = workbook.add_worksheet();
        sheet
            .set_name(&name)
            .with_context(|| format!("Invalid sheet name {:?}", name))?;
        render(sheet, &layout_record(record), &bold)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn render(sheet: &mut Worksheet, cells: &[Cell], bold: &Format) -> Result<()> {
    for cell in cells {
        match (&cell.value, cell.bold) {
            (CellValue::Text(s), true) => {
                sheet.write_string_with_format(cell.row, cell.col, s, bold)?;
            }
            (CellValue::Text(s), false) => {
                sheet.write_string(cell.row, cell.col, s)?;
            }
            (CellValue::Number(n), _) => {
                sheet.write_number(cell.row, cell.col, *n)?;
            }
        }
    }
    for (col, width) in column_widths(cells) {
        sheet.set_column_width(col, width as f64)?;
    }
    Ok(())
}

/// Longest cell per column plus 2, capped at 100.
pub fn column_widths(cells: &[Cell]) -> BTreeMap<u16, usize> {
    let mut widths = BTreeMap::new();
    for cell in cells {
        let w = widths.entry(cell.col).or_insert(0);
        *w = (*w).max(cell.value.display_len());
    }
    for w in widths.values_mut() {
        *w = (*w + 2).min(MAX_COLUMN_WIDTH);
    }
    widths
}

/// Fixed header rows, then Names, Synonyms, Literature References and Toxicological Data blocks.
pub fn layout_record(record: &CompoundRecord) -> Vec<Cell> {
    let mut sheet = Layout::default();
    let details = record.details.as_ref();

    sheet.pair("CAS Number", CellValue::Text(record.cas.clone()));
    sheet.pair(
        "PubChem CID",
        record
            .cid
            .map(|cid| CellValue::Number(cid as f64))
            .unwrap_or_else(|| CellValue::Text(NOT_AVAILABLE.into())),
    );
    sheet.pair(
        "IUPAC Name",
        CellValue::Text(details.map_or(NOT_AVAILABLE, |d| d.iupac.as_str()).to_string()),
    );
    sheet.pair(
        "SMILES",
        CellValue::Text(details.map_or(NOT_AVAILABLE, |d| d.smiles.as_str()).to_string()),
    );

    sheet.row = FIRST_BLOCK_ROW;
    sheet.list("Names", details.map(|d| d.names.as_slice()).unwrap_or_default());
    sheet.list(
        "Synonyms",
        details.map(|d| d.synonyms.as_slice()).unwrap_or_default(),
    );

    sheet.label(0, "Literature References");
    sheet.row += 1;
    if let Some(d) = details {
        sheet.groups(&d.literature_references);
    }

    sheet.label(0, "Toxicological Data");
    sheet.row += 1;
    match (&record.error, &record.tox_data) {
        (Some(error), _) => sheet.text(0, format!("Error: {}", error)),
        (None, Some(tox)) => sheet.groups(tox),
        (None, None) => sheet.text(0, "No toxicological data found"),
    }

    sheet.cells
}

#[derive(Default)]
struct Layout {
    cells: Vec<Cell>,
    row: u32,
}

impl Layout {
    fn put(&mut self, col: u16, value: CellValue, bold: bool) {
        self.cells.push(Cell {
            row: self.row,
            col,
            value,
            bold,
        });
    }

    fn text(&mut self, col: u16, text: impl Into<String>) {
        self.put(col, CellValue::Text(text.into()), false);
    }

    fn label(&mut self, col: u16, text: &str) {
        self.put(col, CellValue::Text(text.to_string()), true);
    }

    fn pair(&mut self, key: &str, value: CellValue) {
        self.text(0, key);
        self.put(1, value, false);
        self.row += 1;
    }

    fn list(&mut self, title: &str, items: &[String]) {
        self.label(0, title);
        self.row += 1;
        for item in items {
            self.text(1, item.as_str());
            self.row += 1;
        }
        self.row += 1;
    }

    fn groups(&mut self, groups: &Sections) {
        for (title, items) in groups {
            self.list(title, items);
        }
    }
}

/// Excel-safe, workbook-unique sheet title: no `[]:*?/\`, at most 31 chars, case-insensitive unique.
pub fn sheet_name(raw: &str, used: &mut HashSet<String>) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| if INVALID_SHEET_CHARS.contains(&c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim().trim_matches('\'');
    let base: String = if cleaned.is_empty() { "Sheet" } else { cleaned }
        .chars()
        .take(MAX_SHEET_NAME)
        .collect();

    let mut name = base.clone();
    let mut n = 2;
    while !used.insert(name.to_lowercase()) {
        let suffix = format!(" ({})", n);
        let keep = MAX_SHEET_NAME - suffix.chars().count();
        name = format!("{}{}", base.chars().take(keep).collect::<String>(), suffix);
        n += 1;
    }
    name
}
