//! CSV rendering of payroll snapshots.
//!
//! Output starts with a UTF-8 BOM so spreadsheet software picks the right
//! encoding for Korean names.

use std::fmt::Write;

use db::models::SalarySnapshotRow;

const HEADER: [&str; 12] = [
    "profile_id",
    "full_name",
    "year",
    "month",
    "total_hours",
    "man_days",
    "daily_wage",
    "tax_rate",
    "gross_pay",
    "tax_amount",
    "net_pay",
    "created_at",
];

/// One snapshot plus the display name it is exported under.
pub struct PayrollLine<'a> {
    pub snapshot: &'a SalarySnapshotRow,
    pub full_name: &'a str,
}

pub fn payroll_csv(lines: &[PayrollLine<'_>]) -> String {
    let mut out = String::from('\u{feff}');
    push_record(&mut out, HEADER.iter().map(|h| h.to_string()));
    for line in lines {
        let s = line.snapshot;
        push_record(
            &mut out,
            [
                s.profile_id.to_string(),
                line.full_name.to_string(),
                s.year.to_string(),
                s.month.to_string(),
                s.total_hours.to_string(),
                s.man_days.to_string(),
                s.daily_wage.to_string(),
                s.tax_rate.to_string(),
                s.gross_pay.to_string(),
                s.tax_amount.to_string(),
                s.net_pay.to_string(),
                s.created_at.to_rfc3339(),
            ],
        );
    }
    out
}

fn push_record(out: &mut String, fields: impl IntoIterator<Item = String>) {
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_field(out, &field);
    }
    out.push_str("\r\n");
}

/// RFC 4180 quoting: wrap when the field holds a delimiter, quote or newline.
fn push_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\n', '\r']) {
        let _ = write!(out, "\"{}\"", field.replace('"', "\"\""));
    } else {
        out.push_str(field);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn snapshot() -> SalarySnapshotRow {
        SalarySnapshotRow {
            id: Uuid::new_v4(),
            organization_id: None,
            profile_id: Uuid::nil(),
            year: 2025,
            month: 3,
            total_hours: 12.0,
            man_days: 1.5,
            daily_wage: 150_000,
            tax_rate: 3.3,
            gross_pay: 225_000,
            tax_amount: 7_425,
            net_pay: 217_575,
            created_by: Uuid::nil(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn header_then_one_row_per_snapshot() {
        let s = snapshot();
        let csv = payroll_csv(&[PayrollLine { snapshot: &s, full_name: "김철수" }]);
        let lines: Vec<_> = csv.trim_start_matches('\u{feff}').split("\r\n").collect();
        assert!(lines[0].starts_with("profile_id,full_name,year,month"));
        assert!(lines[1].starts_with(&format!("{},김철수,2025,3,12,1.5,150000,3.3,225000,7425,217575,", Uuid::nil())));
        assert_eq!(lines[2], "");
    }

    #[test]
    fn fields_with_commas_and_quotes_are_quoted() {
        let s = snapshot();
        let csv = payroll_csv(&[PayrollLine { snapshot: &s, full_name: "Kim, \"CS\"" }]);
        assert!(csv.contains(",\"Kim, \"\"CS\"\"\","));
    }

    #[test]
    fn starts_with_bom() {
        assert!(payroll_csv(&[]).starts_with('\u{feff}'));
    }
}
