use chrono::NaiveDate;
use std::fmt::Write as _;
use std::path::Path;

use crate::report::{CellMark, SubjectReport};

/// Metadata block written at the top of every exported workbook.
#[derive(Debug, Clone)]
pub struct ReportMeta {
    pub faculty_name: String,
    pub department: String,
    pub subject_name: String,
    pub subject_code: String,
    pub range_label: String,
    pub report_type: String,
    /// `YYYY-MM-DD HH:MM:SS`, resolved by the caller.
    pub generated_at: String,
}

/// Comma-bearing values get the delimiter substituted, never quoted. Lossy
/// when the data already contains `;`; preserved deliberately.
fn escape_field(value: &str) -> String {
    value.replace(',', ";")
}

/// Column headers in the detail section are re-formatted to a canonical date
/// string and prefixed with `'` so spreadsheet tools keep them as text;
/// non-date headers get the same prefix.
fn defuse_header(header: &str) -> String {
    match NaiveDate::parse_from_str(header, "%Y-%m-%d") {
        Ok(date) => format!("'{}", date.format("%Y-%m-%d")),
        Err(_) => format!("'{}", header),
    }
}

fn cell_text(mark: CellMark) -> &'static str {
    match mark {
        CellMark::Present => "Present",
        CellMark::Absent => "Absent",
        CellMark::NoRecord => "-",
    }
}

/// Renders the workbook: metadata header, summary table, and (when class
/// dates exist) the per-date detail matrix, sections separated by a blank
/// line.
pub fn render_report_csv(meta: &ReportMeta, report: &SubjectReport) -> String {
    let mut out = String::new();

    out.push_str("Attendance Report\n");
    let _ = writeln!(out, "Faculty Name:,{}", escape_field(&meta.faculty_name));
    let _ = writeln!(out, "Department:,{}", escape_field(&meta.department));
    let _ = writeln!(
        out,
        "Subject:,{} ({})",
        escape_field(&meta.subject_name),
        escape_field(&meta.subject_code)
    );
    // The ' prefix keeps range and timestamp as text in spreadsheet tools.
    let _ = writeln!(out, "Date Range:,'{}", escape_field(&meta.range_label));
    let _ = writeln!(out, "Report Type:,{}", escape_field(&meta.report_type));
    let _ = writeln!(out, "Generated On:,'{}", meta.generated_at);
    out.push('\n');

    out.push_str("Roll No,Name,Total Classes,Present,Absent,Percentage,Status\n");
    for row in &report.rows {
        let _ = writeln!(
            out,
            "{},{},{},{},{},{:.2}%,{}",
            escape_field(&row.roll_no),
            escape_field(&row.name),
            row.total,
            row.present,
            row.absent,
            row.percentage,
            row.status
        );
    }

    if !report.class_dates.is_empty() {
        out.push('\n');
        out.push_str("Detailed Attendance by Date\n");
        out.push_str("Roll No,Name");
        for date in &report.class_dates {
            out.push(',');
            out.push_str(&defuse_header(&date.format("%Y-%m-%d").to_string()));
        }
        out.push('\n');
        for row in &report.matrix {
            let _ = write!(out, "{},{}", escape_field(&row.roll_no), escape_field(&row.name));
            for i in 0..report.class_dates.len() {
                // Short rows fall back to the no-record marker.
                let mark = row.cells.get(i).copied().unwrap_or(CellMark::NoRecord);
                out.push(',');
                out.push_str(&escape_field(cell_text(mark)));
            }
            out.push('\n');
        }
    }

    out
}

pub fn write_report_csv(
    path: &Path,
    meta: &ReportMeta,
    report: &SubjectReport,
) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, render_report_csv(meta, report))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{MatrixRow, StudentSummary, STATUS_GOOD, STATUS_LOW};

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("date")
    }

    fn meta() -> ReportMeta {
        ReportMeta {
            faculty_name: "Rao, Priya".to_string(),
            department: "CS".to_string(),
            subject_name: "Algorithms".to_string(),
            subject_code: "CS301".to_string(),
            range_label: "2024-03-01 to 2024-03-31".to_string(),
            report_type: "Monthly".to_string(),
            generated_at: "2024-03-31 10:00:00".to_string(),
        }
    }

    fn sample_report() -> SubjectReport {
        SubjectReport {
            start: d("2024-03-01"),
            end: d("2024-03-31"),
            class_dates: vec![d("2024-03-01"), d("2024-03-02")],
            rows: vec![
                StudentSummary {
                    student_id: 1,
                    roll_no: "R1".to_string(),
                    name: "Shah, Asha".to_string(),
                    total: 2,
                    present: 2,
                    absent: 0,
                    percentage: 100.0,
                    status: STATUS_GOOD,
                },
                StudentSummary {
                    student_id: 2,
                    roll_no: "R2".to_string(),
                    name: "Bilal".to_string(),
                    total: 2,
                    present: 1,
                    absent: 1,
                    percentage: 50.0,
                    status: STATUS_LOW,
                },
            ],
            matrix: vec![
                MatrixRow {
                    roll_no: "R1".to_string(),
                    name: "Shah, Asha".to_string(),
                    cells: vec![CellMark::Present, CellMark::Present],
                },
                MatrixRow {
                    roll_no: "R2".to_string(),
                    name: "Bilal".to_string(),
                    cells: vec![CellMark::Present, CellMark::Absent],
                },
            ],
        }
    }

    #[test]
    fn embedded_delimiters_never_shift_columns() {
        let out = render_report_csv(&meta(), &sample_report());
        let summary_header_commas = "Roll No,Name,Total Classes,Present,Absent,Percentage,Status"
            .matches(',')
            .count();
        let row = out
            .lines()
            .find(|l| l.starts_with("R1,"))
            .expect("summary row");
        assert_eq!(row.matches(',').count(), summary_header_commas);
        assert!(row.contains("Shah; Asha"));
        // The faculty name with a comma is substituted in the header block.
        assert!(out.contains("Faculty Name:,Rao; Priya"));
    }

    #[test]
    fn percentage_is_two_decimals() {
        let mut report = sample_report();
        report.rows[1].percentage = 200.0 / 3.0;
        let out = render_report_csv(&meta(), &report);
        assert!(out.contains(",66.67%,"));
        assert!(out.contains(",100.00%,"));
    }

    #[test]
    fn date_headers_are_prefixed_against_autoconversion() {
        let out = render_report_csv(&meta(), &sample_report());
        let detail_header = out
            .lines()
            .find(|l| l.starts_with("Roll No,Name,'"))
            .expect("detail header");
        assert!(detail_header.contains("'2024-03-01"));
        assert!(detail_header.contains("'2024-03-02"));
        assert!(out.contains("Date Range:,'2024-03-01 to 2024-03-31"));
        assert!(out.contains("Generated On:,'2024-03-31 10:00:00"));
    }

    #[test]
    fn non_date_header_still_gets_prefix() {
        assert_eq!(defuse_header("2024-03-05"), "'2024-03-05");
        assert_eq!(defuse_header("Week 1"), "'Week 1");
    }

    #[test]
    fn missing_cells_use_the_no_record_marker() {
        let mut report = sample_report();
        report.matrix[1].cells.truncate(1);
        let out = render_report_csv(&meta(), &report);
        let row = out
            .lines()
            .filter(|l| l.starts_with("R2,"))
            .nth(1)
            .expect("detail row");
        assert!(row.ends_with(",-"));
    }

    #[test]
    fn detail_section_is_omitted_without_class_dates() {
        let mut report = sample_report();
        report.class_dates.clear();
        for row in &mut report.matrix {
            row.cells.clear();
        }
        let out = render_report_csv(&meta(), &report);
        assert!(!out.contains("Detailed Attendance by Date"));
    }

    #[test]
    fn sections_are_separated_by_blank_lines() {
        let out = render_report_csv(&meta(), &sample_report());
        assert!(out.contains("Generated On:,'2024-03-31 10:00:00\n\nRoll No,"));
        assert!(out.contains("\n\nDetailed Attendance by Date\n"));
    }
}
