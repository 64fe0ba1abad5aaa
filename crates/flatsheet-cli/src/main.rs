//! Flatsheet CLI - dump spreadsheet content as stable, diff-friendly text

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use flatsheet_core::{Cell, CellContent, FormulaValue, Worksheet};
use flatsheet_xlsx::XlsxReader;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "flat")]
#[command(
    author,
    version,
    about = "Dump spreadsheet cell values and formulas as diff-friendly text"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dump a workbook's cells, one line per cell, to stdout or a file
    Dump {
        /// Input workbook (xlsx)
        input: PathBuf,

        /// Output text file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Dump only this sheet (0-based index, default: all sheets)
        #[arg(short, long)]
        sheet: Option<usize>,
    },

    /// List all sheets in a workbook
    Sheets {
        /// Input workbook
        input: PathBuf,
    },

    /// Show per-sheet cell statistics
    Info {
        /// Input workbook
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Dump {
            input,
            output,
            sheet,
        } => dump(&input, output.as_deref(), sheet),
        Commands::Sheets { input } => list_sheets(&input),
        Commands::Info { input } => show_info(&input),
    }
}

fn dump(input: &PathBuf, output: Option<&std::path::Path>, sheet_idx: Option<usize>) -> Result<()> {
    let workbook = XlsxReader::read_file(input)
        .with_context(|| format!("Failed to read '{}'", input.display()))?;

    let mut text = String::new();

    match sheet_idx {
        Some(idx) => {
            let sheet = workbook
                .worksheet(idx)
                .with_context(|| format!("Sheet index {} not found", idx))?;
            render_sheet(&mut text, sheet);
        }
        None => {
            for sheet in &workbook.sheets {
                render_sheet(&mut text, sheet);
            }
        }
    }

    if let Some(output_path) = output {
        std::fs::write(output_path, &text)
            .with_context(|| format!("Failed to write '{}'", output_path.display()))?;
    } else {
        io::stdout()
            .write_all(text.as_bytes())
            .context("Failed to write to stdout")?;
    }

    Ok(())
}

fn render_sheet(out: &mut String, sheet: &Worksheet) {
    out.push_str("## ");
    out.push_str(&sheet.name);
    out.push('\n');

    for cell in &sheet.cells {
        if let Some(line) = render_cell(cell) {
            out.push_str(&line);
            out.push('\n');
        }
    }
}

/// Render one cell as a dump line, or None for cells with nothing to show.
///
/// The leading two-letter tag keeps lines of different kinds from ever
/// diffing against each other.
fn render_cell(cell: &Cell) -> Option<String> {
    let address = cell.address.to_a1_string();
    let line = match &cell.content {
        CellContent::Empty => return None,
        CellContent::Number(n) => format!("va {:>6} {:.2}", address, n),
        CellContent::Text(s) => format!("st {:>6} {}", address, s),
        CellContent::Formula { text, result } => {
            format!("fo {:>6} = {}{}", address, text, render_result(result))
        }
        CellContent::ArrayFormula { text, result } => {
            format!("ar {:>6} = {}{}", address, text, render_result(result))
        }
        CellContent::Shared { text, result, .. } => {
            format!("sh {:>6} = {}{}", address, text, render_result(result))
        }
        // Unresolved cells never leave the reader; render the raw index so
        // a bug here is visible in the output instead of hidden
        CellContent::PendingString(index) => format!("st {:>6} si {}", address, index),
        CellContent::SharedPending { group_id, .. } => {
            format!("sh {:>6} = si {}", address, group_id)
        }
    };
    Some(line)
}

fn render_result(result: &Option<FormulaValue>) -> String {
    match result {
        Some(FormulaValue::Number(n)) => format!(" -> {:.2}", n),
        Some(FormulaValue::Text(s)) => format!(" -> {}", s),
        None => String::new(),
    }
}

fn list_sheets(input: &PathBuf) -> Result<()> {
    let workbook = XlsxReader::read_file(input)
        .with_context(|| format!("Failed to read '{}'", input.display()))?;

    for (i, sheet) in workbook.sheets.iter().enumerate() {
        println!("{}\t{}", i, sheet.name);
    }

    Ok(())
}

fn show_info(input: &PathBuf) -> Result<()> {
    let workbook = XlsxReader::read_file(input)
        .with_context(|| format!("Failed to read '{}'", input.display()))?;

    println!("File: {}", input.display());
    println!("Sheets: {}", workbook.sheet_count());

    for (i, sheet) in workbook.sheets.iter().enumerate() {
        println!();
        println!("  Sheet {}: \"{}\"", i, sheet.name);
        println!("    Cells: {}", sheet.cell_count());
        println!("    Strings: {}", sheet.count_kind("string"));
        println!("    Values: {}", sheet.count_kind("value"));
        println!(
            "    Formulas: {} ({} shared, {} array)",
            sheet.formula_cells().count(),
            sheet.count_kind("shared"),
            sheet.count_kind("array")
        );
    }

    Ok(())
}
