use std::path::Path;

use super::builder::Report;
use crate::error::{DunningError, Result};

/// Write a finalized report as a CSV spreadsheet. Formatting only: every
/// number comes straight from the `Report`, so the file can never disagree
/// with the dashboard that consumed the same criteria.
pub fn write_report_csv(report: &Report, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| DunningError::ReportWrite(format!("{}: {e}", path.display())))?;

    let write = |w: &mut csv::Writer<std::fs::File>, record: &[&str]| {
        w.write_record(record)
            .map_err(|e| DunningError::ReportWrite(e.to_string()))
    };

    write(
        &mut writer,
        &[
            "company",
            "company_name",
            "client",
            "client_name",
            "tax_id",
            "invoices",
            "amount",
            "status",
        ],
    )?;

    for section in &report.sections {
        for line in &section.clients {
            write(
                &mut writer,
                &[
                    &section.company,
                    section.company_name.as_deref().unwrap_or(""),
                    &line.client,
                    line.name.as_deref().unwrap_or(""),
                    line.tax_id.as_deref().unwrap_or(""),
                    &line.invoices.to_string(),
                    &format!("{:.2}", line.amount),
                    &line.worst_status.to_string(),
                ],
            )?;
        }
        write(
            &mut writer,
            &[
                &section.company,
                section.company_name.as_deref().unwrap_or(""),
                "",
                "COMPANY TOTAL",
                "",
                "",
                &format!("{:.2}", section.total),
                "",
            ],
        )?;
    }

    write(
        &mut writer,
        &[
            "",
            "",
            "",
            "GRAND TOTAL",
            "",
            &report.grand_total.unique_clients.to_string(),
            &format!("{:.2}", report.grand_total.total_amount),
            "",
        ],
    )?;

    writer
        .flush()
        .map_err(|e| DunningError::ReportWrite(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::test_fixtures::{invoice, test_config};
    use crate::report::builder::{build, BalanceFilter};
    use std::collections::HashMap;

    #[test]
    fn csv_totals_match_the_report() {
        let config = test_config();
        let invoices = vec![
            invoice("00542", "S005", 100.0, None),
            invoice("00542", "S001", 50.0, None),
        ];
        let report = build(
            &invoices,
            &HashMap::new(),
            &config,
            BalanceFilter::All,
            "2026-07-01T12:00:00".parse().unwrap(),
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        write_report_csv(&report, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let grand_line = content
            .lines()
            .find(|l| l.contains("GRAND TOTAL"))
            .unwrap();
        assert!(grand_line.contains("150.00"));
        assert!(grand_line.contains(",1,")); // one unique client
        assert_eq!(content.lines().filter(|l| l.contains("COMPANY TOTAL")).count(), 2);
    }
}
