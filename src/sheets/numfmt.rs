//! Number formats of a workbook tab
//!
//! calamine returns the stored value of a cell, the Sheets API returns what
//! the cell displays. To read a local export the way the live sheet reads,
//! the style table and the tab's cell styles are pulled from the package
//! and numeric cells are rendered with their format: `0.45` under `0%`
//! reads `45%`, `1234` under `#,##0` reads `1,234`.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::result::ZipError;
use zip::ZipArchive;

use super::a1::CellRef;
use crate::error::{FunnelError, FunnelResult};

/// Displayed shape of a numeric cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberStyle {
    pub min_decimals: usize,
    pub max_decimals: usize,
    pub grouped: bool,
    pub percent: bool,
}

impl NumberStyle {
    /// Read the positive section of an Excel format code.
    ///
    /// Returns `None` for `General`, text, dates, fractions and scientific
    /// formats; those cells keep their stored value.
    pub fn parse(code: &str) -> Option<Self> {
        let section = code.split(';').next().unwrap_or_default();

        // drop quoted literals, [color]/[locale] tags and escaped characters
        let mut plain = String::with_capacity(section.len());
        let mut chars = section.chars();
        while let Some(c) = chars.next() {
            match c {
                '"' => chars.by_ref().take_while(|&q| q != '"').for_each(drop),
                '[' => chars.by_ref().take_while(|&q| q != ']').for_each(drop),
                '\\' | '_' | '*' => {
                    chars.next();
                }
                _ => plain.push(c),
            }
        }

        if !plain.contains(['0', '#']) {
            return None;
        }
        if plain.contains(['y', 'm', 'd', 'h', 's', 'E', 'e', '/', '?', '@']) {
            return None;
        }

        let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), ""));
        let placeholders: Vec<char> = frac_part
            .chars()
            .take_while(|c| matches!(c, '0' | '#'))
            .collect();

        Some(Self {
            min_decimals: placeholders.iter().filter(|&&c| c == '0').count(),
            max_decimals: placeholders.len(),
            grouped: int_part.contains(','),
            percent: plain.contains('%'),
        })
    }

    /// Render `value` as the sheet displays it.
    pub fn render(&self, value: f64) -> String {
        let scaled = if self.percent { value * 100.0 } else { value };
        let mut text = format!("{:.*}", self.max_decimals, scaled);

        if let Some(dot) = text.find('.') {
            let keep = dot + 1 + self.min_decimals;
            while text.len() > keep && text.ends_with('0') {
                text.pop();
            }
            if text.ends_with('.') {
                text.pop();
            }
        }

        if self.grouped {
            text = group_thousands(&text);
        }
        if self.percent {
            text.push('%');
        }
        text
    }
}

/// Insert `,` every three digits of the integer part.
fn group_thousands(text: &str) -> String {
    let (sign, rest) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text),
    };
    let (digits, frac) = match rest.find('.') {
        Some(dot) => rest.split_at(dot),
        None => (rest, ""),
    };

    let mut out = String::with_capacity(text.len() + digits.len() / 3);
    out.push_str(sign);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out.push_str(frac);
    out
}

/// Built-in number formats that carry digits (ECMA-376 18.8.30)
fn builtin_format(id: u32) -> Option<&'static str> {
    match id {
        1 => Some("0"),
        2 => Some("0.00"),
        3 => Some("#,##0"),
        4 => Some("#,##0.00"),
        9 => Some("0%"),
        10 => Some("0.00%"),
        37 | 38 => Some("#,##0"),
        39 | 40 => Some("#,##0.00"),
        _ => None,
    }
}

/// Styled numeric cells of one tab, keyed by zero-based `(row, column)`
#[derive(Debug, Default)]
pub struct CellFormats {
    cells: HashMap<(u32, u32), NumberStyle>,
}

impl CellFormats {
    pub fn load(path: &Path, tab: &str) -> FunnelResult<Self> {
        let file = File::open(path).map_err(|e| package_error(path.display(), e))?;
        let mut archive =
            ZipArchive::new(BufReader::new(file)).map_err(|e| package_error(path.display(), e))?;

        let styles = read_cell_xfs(&mut archive)?;
        if styles.iter().all(Option::is_none) {
            return Ok(Self::default());
        }

        let part = sheet_part(&mut archive, tab)?;
        let mut cells = HashMap::new();
        scan_part(&mut archive, &part, |event| {
            if let Event::Start(e) | Event::Empty(e) = event {
                if e.name().as_ref() == b"c" {
                    let style = attr(e, b"s")
                        .and_then(|s| s.parse::<usize>().ok())
                        .and_then(|idx| styles.get(idx).copied().flatten());
                    let cell = attr(e, b"r").and_then(|r| r.parse::<CellRef>().ok());
                    if let (Some(style), Some(cell)) = (style, cell) {
                        cells.insert(((cell.row - 1) as u32, cell.column as u32), style);
                    }
                }
            }
            Ok(())
        })?;

        Ok(Self { cells })
    }

    pub fn get(&self, row: u32, column: u32) -> Option<&NumberStyle> {
        self.cells.get(&(row, column))
    }
}

/// Number style of every `cellXfs` entry, by style index
fn read_cell_xfs<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> FunnelResult<Vec<Option<NumberStyle>>> {
    let mut custom: HashMap<u32, String> = HashMap::new();
    let mut xf_formats: Vec<u32> = Vec::new();
    let mut in_cell_xfs = false;

    let found = scan_part(archive, "xl/styles.xml", |event| {
        match event {
            Event::Start(e) | Event::Empty(e) => match e.name().as_ref() {
                b"numFmt" => {
                    let id = attr(e, b"numFmtId").and_then(|v| v.parse().ok());
                    if let (Some(id), Some(code)) = (id, attr(e, b"formatCode")) {
                        custom.insert(id, code);
                    }
                }
                b"cellXfs" => in_cell_xfs = matches!(event, Event::Start(_)),
                b"xf" if in_cell_xfs => xf_formats.push(
                    attr(e, b"numFmtId")
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(0),
                ),
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"cellXfs" => in_cell_xfs = false,
            _ => {}
        }
        Ok(())
    })?;
    if !found {
        return Ok(Vec::new());
    }

    Ok(xf_formats
        .iter()
        .map(|id| {
            custom
                .get(id)
                .map(String::as_str)
                .or_else(|| builtin_format(*id))
                .and_then(NumberStyle::parse)
        })
        .collect())
}

/// Package path of the worksheet named `tab`
fn sheet_part<R: Read + Seek>(archive: &mut ZipArchive<R>, tab: &str) -> FunnelResult<String> {
    let mut rel_id = None;
    scan_part(archive, "xl/workbook.xml", |event| {
        if let Event::Start(e) | Event::Empty(e) = event {
            if e.name().as_ref() == b"sheet" && attr(e, b"name").as_deref() == Some(tab) {
                rel_id = attr(e, b"r:id");
            }
        }
        Ok(())
    })?;
    let rel_id = rel_id.ok_or_else(|| package_error(tab, "worksheet not listed in workbook"))?;

    let mut target = None;
    scan_part(archive, "xl/_rels/workbook.xml.rels", |event| {
        if let Event::Start(e) | Event::Empty(e) = event {
            if e.name().as_ref() == b"Relationship"
                && attr(e, b"Id").as_deref() == Some(rel_id.as_str())
            {
                target = attr(e, b"Target");
            }
        }
        Ok(())
    })?;
    let target = target.ok_or_else(|| package_error(tab, "worksheet relationship missing"))?;

    Ok(match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    })
}

/// Stream the events of one package part. `Ok(false)` when the part is absent.
fn scan_part<R, F>(archive: &mut ZipArchive<R>, name: &str, mut on_event: F) -> FunnelResult<bool>
where
    R: Read + Seek,
    F: FnMut(&Event<'_>) -> FunnelResult<()>,
{
    let part = match archive.by_name(name) {
        Ok(part) => part,
        Err(ZipError::FileNotFound) => return Ok(false),
        Err(e) => return Err(package_error(name, e)),
    };

    let mut reader = Reader::from_reader(BufReader::new(part));
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| package_error(name, e))?
        {
            Event::Eof => break,
            event => on_event(&event)?,
        }
        buf.clear();
    }
    Ok(true)
}

fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| {
            let raw = std::str::from_utf8(&a.value).ok()?;
            quick_xml::escape::unescape(raw).ok().map(|v| v.into_owned())
        })
}

fn package_error(what: impl fmt::Display, e: impl fmt::Display) -> FunnelError {
    FunnelError::Fetch(format!("Failed to read number formats of {}: {}", what, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(code: &str) -> NumberStyle {
        NumberStyle::parse(code).unwrap()
    }

    #[test]
    fn test_parse_general_text_and_dates_keep_raw_value() {
        assert_eq!(NumberStyle::parse("General"), None);
        assert_eq!(NumberStyle::parse("@"), None);
        assert_eq!(NumberStyle::parse("dd/mm/yyyy"), None);
        assert_eq!(NumberStyle::parse("0.00E+00"), None);
        assert_eq!(NumberStyle::parse("# ?/?"), None);
    }

    #[test]
    fn test_parse_percent_and_grouping() {
        assert_eq!(
            style("0.0%"),
            NumberStyle {
                min_decimals: 1,
                max_decimals: 1,
                grouped: false,
                percent: true,
            }
        );
        assert!(style("#,##0").grouped);
        assert!(style("[Red]#,##0.00;(#,##0.00)").grouped);
        assert_eq!(style("\"$\"#,##0.0#").max_decimals, 2);
    }

    #[test]
    fn test_render_percent() {
        assert_eq!(style("0%").render(0.45), "45%");
        assert_eq!(style("0.0%").render(0.125), "12.5%");
        assert_eq!(style("0.00%").render(1.0), "100.00%");
    }

    #[test]
    fn test_render_grouped_and_fixed() {
        assert_eq!(style("#,##0").render(1234.0), "1,234");
        assert_eq!(style("#,##0.00").render(-1234567.891), "-1,234,567.89");
        assert_eq!(style("#,##0").render(999.0), "999");
        assert_eq!(style("0.00").render(3.14159), "3.14");
        assert_eq!(style("0").render(7.6), "8");
    }

    #[test]
    fn test_render_optional_decimals() {
        assert_eq!(style("0.0#").render(2.5), "2.5");
        assert_eq!(style("0.0#").render(2.4567), "2.46");
        assert_eq!(style("#,##0.##").render(1500.0), "1,500");
    }

    #[test]
    fn test_builtin_formats() {
        assert_eq!(builtin_format(9), Some("0%"));
        assert_eq!(builtin_format(3), Some("#,##0"));
        assert_eq!(builtin_format(0), None);
        assert_eq!(builtin_format(14), None);
    }

    #[test]
    fn test_missing_file_is_fetch_error() {
        let err = CellFormats::load(Path::new("does-not-exist.xlsx"), "Hoja1").unwrap_err();
        assert!(matches!(err, FunnelError::Fetch(_)));
    }
}
