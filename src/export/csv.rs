use std::io::Write;
use std::path::Path;

use super::ScoreSheet;
use crate::error::Result;
use crate::model::Match;

/// Write a match's score sheet to a CSV file
pub fn write_score_sheet_csv(m: &Match, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_score_sheet_csv_to(m, file)
}

pub fn write_score_sheet_csv_to<W: Write>(m: &Match, out: W) -> Result<()> {
    let sheet = ScoreSheet::from_match(m);
    let mut writer = csv::Writer::from_writer(out);

    writer.write_record(sheet.headers())?;

    for (index, row) in sheet.rows.iter().enumerate() {
        let mut record = vec![
            (index + 1).to_string(),
            row.label.clone(),
            row.kingdom.map(|k| k.to_string()).unwrap_or_default(),
            row.hand_mode.to_string(),
            if row.partial { "yes".to_string() } else { String::new() },
        ];
        record.extend(row.deltas.iter().map(|d| format!("{:+}", d)));
        writer.write_record(&record)?;
    }

    let mut totals = vec![String::new(), "Total".to_string(), String::new(), String::new(), String::new()];
    totals.extend(sheet.totals.iter().map(|t| t.to_string()));
    writer.write_record(&totals)?;

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::sample_match;

    #[test]
    fn test_csv_output() {
        let mut buf = Vec::new();
        write_score_sheet_csv_to(&sample_match(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "#,Round,Kingdom,Mode,Partial,Sami,Lina,Omar,Rana");
        assert_eq!(lines[1], "1,Kingdom 1 - MINUS,1,MINUS,yes,+0,-50,+0,+0");
        assert_eq!(lines[3], ",Total,,,,0,-20,0,0");
    }

    #[test]
    fn test_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.csv");
        write_score_sheet_csv(&sample_match(), &path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("Total"));
    }
}
