use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use std::path::Path;

use super::ScoreSheet;
use crate::error::Result;
use crate::model::Match;

/// Write a match's score sheet to an Excel file
pub fn write_score_sheet_xlsx(m: &Match, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();

    let worksheet = workbook.add_worksheet();
    write_score_sheet(worksheet, &ScoreSheet::from_match(m))?;

    workbook.save(path)?;
    Ok(())
}

fn write_score_sheet(sheet: &mut Worksheet, data: &ScoreSheet) -> Result<()> {
    sheet.set_column_width(0, 5)?;  // #
    sheet.set_column_width(1, 20)?; // Round
    sheet.set_column_width(2, 9)?;  // Kingdom
    sheet.set_column_width(3, 8)?;  // Mode
    sheet.set_column_width(4, 8)?;  // Partial
    for col in 0..data.players.len() {
        sheet.set_column_width(5 + col as u16, 14)?;
    }

    let header_format = Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_border_bottom(FormatBorder::Thin);

    for (col, header) in data.headers().iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, header, &header_format)?;
    }

    let center_format = Format::new().set_align(FormatAlign::Center);
    let delta_format = Format::new()
        .set_align(FormatAlign::Center)
        .set_num_format("+0;-0;0");

    for (row_idx, row) in data.rows.iter().enumerate() {
        let r = (row_idx + 1) as u32;

        sheet.write_number_with_format(r, 0, (row_idx + 1) as f64, &center_format)?;
        sheet.write_string(r, 1, &row.label)?;
        if let Some(k) = row.kingdom {
            sheet.write_number_with_format(r, 2, k as f64, &center_format)?;
        }
        sheet.write_string_with_format(r, 3, row.hand_mode.as_str(), &center_format)?;
        if row.partial {
            sheet.write_string_with_format(r, 4, "Partial", &center_format)?;
        }

        for (col, delta) in row.deltas.iter().enumerate() {
            sheet.write_number_with_format(r, 5 + col as u16, *delta as f64, &delta_format)?;
        }
    }

    // Totals
    let total_row = (data.rows.len() + 1) as u32;
    let total_format = Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_border_top(FormatBorder::Thin);

    sheet.write_string_with_format(total_row, 1, "Total", &total_format)?;
    for (col, total) in data.totals.iter().enumerate() {
        sheet.write_number_with_format(total_row, 5 + col as u16, *total as f64, &total_format)?;
    }

    sheet.set_name("Score Sheet")?;

    Ok(())
}
