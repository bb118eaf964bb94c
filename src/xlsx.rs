use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::Workbook;

use crate::calendar::month_name;
use crate::stats::{monthly_stats, overall_stats};
use crate::store::{ImportedStudent, Student};

// Column headers and the totals sentinel are the on-disk contract; files
// written by earlier versions of the app use these exact strings.
pub const ROSTER_HEADERS: [&str; 4] = ["ID", "Nom", "Nombre d'observations", "Présences enregistrées"];
pub const REPORT_HEADERS: [&str; 7] = [
    "Nom",
    "Jours enregistrés",
    "Présences",
    "Absences",
    "Taux de présence (%)",
    "Taux d'absence (%)",
    "Observations",
];
pub const OVERALL_ROW_NAME: &str = "--- STATISTIQUES GLOBALES ---";
pub const ROSTER_SHEET_NAME: &str = "Élèves";
pub const TEMPLATE_FILE_NAME: &str = "modele_eleves.xlsx";

const TEMPLATE_ROWS: [(i64, &str); 3] = [
    (1, "Ahmed Benali"),
    (2, "Fatima Zahra"),
    (3, "Mohammed Alami"),
];

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub file_name: String,
    pub rows: usize,
}

pub fn roster_file_name(date: &str) -> String {
    format!("eleves_{}.xlsx", date)
}

pub fn report_file_name(year: i32, month: u32) -> String {
    format!("bilan_{}_{}.xlsx", month_name(month), year)
}

/// One row per student: id, name and how much history they carry.
pub fn export_roster(students: &[Student], out_dir: &Path, date: &str) -> anyhow::Result<ExportSummary> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(ROSTER_SHEET_NAME)?;

    for (col, header) in ROSTER_HEADERS.iter().enumerate() {
        sheet.write(0, col as u16, *header)?;
    }
    for (i, student) in students.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write(row, 0, student.id)?;
        sheet.write(row, 1, student.name.as_str())?;
        sheet.write(row, 2, student.observations.len() as u32)?;
        sheet.write(row, 3, student.attendance.len() as u32)?;
    }

    let file_name = roster_file_name(date);
    let path = out_dir.join(&file_name);
    workbook
        .save(&path)
        .with_context(|| format!("write {}", path.display()))?;
    Ok(ExportSummary {
        path,
        file_name,
        rows: students.len(),
    })
}

/// One row per student with their monthly counts and rates, plus a trailing
/// totals row built from the summed counts.
pub fn export_report(
    students: &[Student],
    year: i32,
    month: u32,
    out_dir: &Path,
) -> anyhow::Result<ExportSummary> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(format!("Bilan {}", month_name(month)))?;

    for (col, header) in REPORT_HEADERS.iter().enumerate() {
        sheet.write(0, col as u16, *header)?;
    }
    for (i, student) in students.iter().enumerate() {
        let stats = monthly_stats(student, year, month);
        let row = (i + 1) as u32;
        sheet.write(row, 0, student.name.as_str())?;
        sheet.write(row, 1, stats.total_days)?;
        sheet.write(row, 2, stats.presences)?;
        sheet.write(row, 3, stats.absences)?;
        sheet.write(row, 4, stats.presence_rate)?;
        sheet.write(row, 5, stats.absence_rate)?;
        sheet.write(row, 6, student.observations.len() as u32)?;
    }

    let overall = overall_stats(students, year, month);
    let row = (students.len() + 1) as u32;
    sheet.write(row, 0, OVERALL_ROW_NAME)?;
    sheet.write(row, 1, overall.total_days)?;
    sheet.write(row, 2, overall.total_presences)?;
    sheet.write(row, 3, overall.total_absences)?;
    sheet.write(row, 4, overall.avg_presence_rate)?;
    sheet.write(row, 5, overall.avg_absence_rate)?;
    sheet.write(row, 6, 0u32)?;

    let file_name = report_file_name(year, month);
    let path = out_dir.join(&file_name);
    workbook
        .save(&path)
        .with_context(|| format!("write {}", path.display()))?;
    Ok(ExportSummary {
        path,
        file_name,
        rows: students.len() + 1,
    })
}

/// Static three-row example documenting the import schema.
pub fn write_template(out_dir: &Path) -> anyhow::Result<ExportSummary> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(ROSTER_SHEET_NAME)?;

    sheet.write(0, 0, "ID")?;
    sheet.write(0, 1, "Nom")?;
    for (i, (id, name)) in TEMPLATE_ROWS.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write(row, 0, *id)?;
        sheet.write(row, 1, *name)?;
    }

    let path = out_dir.join(TEMPLATE_FILE_NAME);
    workbook
        .save(&path)
        .with_context(|| format!("write {}", path.display()))?;
    Ok(ExportSummary {
        path,
        file_name: TEMPLATE_FILE_NAME.to_string(),
        rows: TEMPLATE_ROWS.len(),
    })
}

fn cell_as_id(cell: &Data) -> Option<i64> {
    match cell {
        Data::Int(n) => Some(*n),
        Data::Float(n) => Some(*n as i64),
        Data::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn cell_as_name(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Data::Int(n) => Some(n.to_string()),
        Data::Float(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Reads the first worksheet. Only the "ID" and "Nom" columns are
/// consumed; everything else in the file is ignored. Blank rows are
/// skipped. Missing fields stay `None` and get defaults at roster-replace
/// time.
pub fn read_roster(path: &Path) -> anyhow::Result<Vec<ImportedStudent>> {
    let mut workbook =
        open_workbook_auto(path).with_context(|| format!("open {}", path.display()))?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| anyhow!("workbook has no sheets"))?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("read sheet {}", sheet_name))?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };
    let mut id_col: Option<usize> = None;
    let mut name_col: Option<usize> = None;
    for (i, cell) in header.iter().enumerate() {
        if let Data::String(s) = cell {
            match s.trim() {
                "ID" => id_col = Some(i),
                "Nom" => name_col = Some(i),
                _ => {}
            }
        }
    }

    let mut out = Vec::new();
    for row in rows {
        let id = id_col.and_then(|c| row.get(c)).and_then(cell_as_id);
        let name = name_col.and_then(|c| row.get(c)).and_then(cell_as_name);
        if id.is_none() && name.is_none() {
            continue;
        }
        out.push(ImportedStudent { id, name });
    }
    Ok(out)
}
