//! Minimal single-sheet SpreadsheetML (.xlsx) writer.
//!
//! Only what a one-table export needs: inline strings, numeric cells and one
//! worksheet, packed with the same `zip` writer the rest of the crate uses.

use serde_json::Value;
use std::fmt::Write as _;
use std::io::{Cursor, Write};
use zip::result::ZipResult;
use zip::write::{SimpleFileOptions, ZipWriter};

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl From<&Value> for Cell {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Empty,
            Value::Number(n) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Empty),
            Value::String(s) => Cell::Text(s.clone()),
            other => Cell::Text(other.to_string()),
        }
    }
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

/// Builds the workbook in memory. The header becomes row 1.
pub fn write_workbook(sheet_name: &str, header: &[&str], rows: &[Vec<Cell>]) -> ZipResult<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    add_part(&mut zip, "[Content_Types].xml", CONTENT_TYPES)?;
    add_part(&mut zip, "_rels/.rels", ROOT_RELS)?;
    add_part(&mut zip, "xl/workbook.xml", &workbook_xml(sheet_name))?;
    add_part(&mut zip, "xl/_rels/workbook.xml.rels", WORKBOOK_RELS)?;
    add_part(&mut zip, "xl/worksheets/sheet1.xml", &sheet_xml(header, rows))?;

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

fn add_part(zip: &mut ZipWriter<Cursor<Vec<u8>>>, name: &str, content: &str) -> ZipResult<()> {
    zip.start_file(name, SimpleFileOptions::default())?;
    zip.write_all(content.as_bytes())?;
    Ok(())
}

fn workbook_xml(sheet_name: &str) -> String {
    // Excel 工作表名稱上限 31 字元
    let name: String = sheet_name.chars().take(31).collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        escape_xml(&name)
    )
}

fn sheet_xml(header: &[&str], rows: &[Vec<Cell>]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );

    let header_cells: Vec<Cell> = header.iter().map(|h| Cell::Text(h.to_string())).collect();
    write_row(&mut xml, 1, &header_cells);
    for (index, row) in rows.iter().enumerate() {
        write_row(&mut xml, index + 2, row);
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

fn write_row(xml: &mut String, row_number: usize, cells: &[Cell]) {
    let _ = write!(xml, r#"<row r="{}">"#, row_number);
    for (column, cell) in cells.iter().enumerate() {
        let reference = format!("{}{}", column_name(column), row_number);
        match cell {
            Cell::Text(text) => {
                let space = if text.trim() != text { r#" xml:space="preserve""# } else { "" };
                let _ = write!(
                    xml,
                    r#"<c r="{}" t="inlineStr"><is><t{}>{}</t></is></c>"#,
                    reference,
                    space,
                    escape_xml(text)
                );
            }
            Cell::Number(value) if value.is_finite() => {
                let _ = write!(xml, r#"<c r="{}"><v>{}</v></c>"#, reference, value);
            }
            Cell::Number(_) | Cell::Empty => {}
        }
    }
    xml.push_str("</row>");
}

/// Zero-based column index to its letter name: 0 → A, 25 → Z, 26 → AA.
pub fn column_name(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(char::from(b'A' + (index % 26) as u8));
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.iter().rev().collect()
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\t' | '\n' | '\r' => escaped.push(c),
            // XML 1.0 has no encoding for these
            c if c.is_control() || c == '\u{FFFE}' || c == '\u{FFFF}' => {}
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn sheet_of(bytes: Vec<u8>) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut sheet = String::new();
        archive
            .by_name("xl/worksheets/sheet1.xml")
            .unwrap()
            .read_to_string(&mut sheet)
            .unwrap();
        sheet
    }

    #[test]
    fn test_column_names() {
        assert_eq!(column_name(0), "A");
        assert_eq!(column_name(14), "O");
        assert_eq!(column_name(25), "Z");
        assert_eq!(column_name(26), "AA");
        assert_eq!(column_name(27), "AB");
        assert_eq!(column_name(701), "ZZ");
        assert_eq!(column_name(702), "AAA");
    }

    #[test]
    fn test_workbook_contains_required_parts() {
        let bytes = write_workbook("Distritos", &["A"], &[]).unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        for part in [
            "[Content_Types].xml",
            "_rels/.rels",
            "xl/workbook.xml",
            "xl/_rels/workbook.xml.rels",
            "xl/worksheets/sheet1.xml",
        ] {
            assert!(names.contains(&part), "missing {}", part);
        }
    }

    #[test]
    fn test_cells_are_typed_and_escaped() {
        let rows = vec![vec![
            Cell::Text("CAÑAR & <LOJA>".to_string()),
            Cell::Number(-2.19),
            Cell::Empty,
            Cell::Text(" padded ".to_string()),
        ]];
        let sheet = sheet_of(write_workbook("Distritos", &["NAME", "LAT", "ZONA", "X"], &rows).unwrap());

        assert!(sheet.contains(r#"<c r="A1" t="inlineStr"><is><t>NAME</t></is></c>"#));
        assert!(sheet.contains("<t>CAÑAR &amp; &lt;LOJA&gt;</t>"));
        assert!(sheet.contains(r#"<c r="B2"><v>-2.19</v></c>"#));
        assert!(!sheet.contains(r#"r="C2""#));
        assert!(sheet.contains(r#"<t xml:space="preserve"> padded </t>"#));
    }

    #[test]
    fn test_characters_outside_xml_are_dropped() {
        let rows = vec![vec![Cell::Text("AV.\u{1} 9 DE\u{FFFF} OCTUBRE\tN\u{7f}".to_string())]];
        let sheet = sheet_of(write_workbook("Distritos", &["DIRECCION"], &rows).unwrap());

        assert!(sheet.contains("<t>AV. 9 DE OCTUBRE\tN</t>"));
        assert!(!sheet.contains('\u{1}'));
        assert!(!sheet.contains('\u{FFFF}'));
    }

    #[test]
    fn test_cell_from_json_value() {
        assert_eq!(Cell::from(&Value::from(8)), Cell::Number(8.0));
        assert_eq!(Cell::from(&Value::Null), Cell::Empty);
        assert_eq!(Cell::from(&Value::from("SI")), Cell::Text("SI".to_string()));
    }
}
