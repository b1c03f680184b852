//! Column writers for text and CSV output

use comfy_table::presets::NOTHING;
use comfy_table::{Cell, Table};
use std::io::{self, Write};

/// Spaces between columns
const GUTTER: u16 = 2;

/// Write an aligned table: header row, then one line per row.
/// Column width is the widest cell in that column; trailing blanks are trimmed.
pub fn write_table(out: &mut dyn Write, headers: &[String], rows: &[Vec<String>]) -> io::Result<()> {
    let mut table = Table::new();
    table
        .load_preset(NOTHING)
        .set_header(headers.iter().map(|h| Cell::new(single_line(h))));
    for row in rows {
        table.add_row(row.iter().map(|cell| Cell::new(single_line(cell))));
    }
    for column in table.column_iter_mut() {
        column.set_padding((0, GUTTER));
    }

    for line in table.lines() {
        writeln!(out, "{}", line.trim_end())?;
    }
    Ok(())
}

/// Write header and rows as RFC 4180 CSV.
/// Every row must have the header's arity.
pub fn write_csv(out: &mut dyn Write, headers: &[String], rows: &[Vec<String>]) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Tabs and newlines would break column alignment
fn single_line(cell: &str) -> String {
    cell.replace(['\n', '\r', '\t'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn table(headers: &[&str], rows: &[&[&str]]) -> String {
        let rows: Vec<Vec<String>> = rows.iter().map(|r| strings(r)).collect();
        let mut out = Vec::new();
        write_table(&mut out, &strings(headers), &rows).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_columns_align_with_gutter() {
        let text = table(&["ID", "NAME"], &[&["1", "Alice"], &["1234", "Bob"]]);
        assert_eq!(text, "ID    NAME\n1     Alice\n1234  Bob\n");
    }

    #[test]
    fn test_header_only() {
        assert_eq!(table(&["ID", "TITLE"], &[]), "ID  TITLE\n");
    }

    #[test]
    fn test_trailing_empty_cells_trimmed() {
        let text = table(&["A", "B"], &[&["x", ""]]);
        assert_eq!(text, "A  B\nx\n");
    }

    #[test]
    fn test_multiline_cells_are_flattened() {
        let text = table(&["NOTE"], &[&["line one\nline two"]]);
        assert_eq!(text, "NOTE\nline one line two\n");
    }

    #[test]
    fn test_wide_characters_use_display_width() {
        let text = table(&["N", "X"], &[&["日本", "1"]]);
        assert_eq!(text, "N     X\n日本  1\n");
    }

    #[test]
    fn test_csv_quotes_special_characters() {
        let mut out = Vec::new();
        write_csv(
            &mut out,
            &strings(&["id", "note"]),
            &[strings(&["1", "a,b \"quoted\"\nnext"])],
        )
        .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "id,note\n1,\"a,b \"\"quoted\"\"\nnext\"\n"
        );
    }

    #[test]
    fn test_csv_rejects_ragged_rows() {
        let mut out = Vec::new();
        let result = write_csv(&mut out, &strings(&["a", "b"]), &[strings(&["only-one"])]);
        assert!(result.is_err());
    }
}
