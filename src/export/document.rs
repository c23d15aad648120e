//! Paginated PDF rendering of a ledger.
//!
//! The output is a minimal PDF 1.4 file: A4 pages, the standard Helvetica
//! font with WinAnsi encoding, one text row per 10 mm. No timestamps or ids
//! are embedded, so rendering the same ledger twice yields identical bytes.

use std::io::Write;

use super::ExportFormat;
use crate::{errors::Result, ledger::Ledger};

pub const TITLE_PREFIX: &str = "Financial summary - ";

const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;
const MARGIN: f32 = 28.35;
const FONT_SIZE: f32 = 12.0;
const ROW_HEIGHT: f32 = 28.35;
// floor((PAGE_HEIGHT - 2 * MARGIN) / ROW_HEIGHT)
const ROWS_PER_PAGE: usize = 27;
const TEXT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

const FIRST_PAGE_OBJECT: usize = 4;

/// Helvetica advance widths for 0x20..=0x7E, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 0x20
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0x30
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 0x40
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 0x50
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 0x60
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 0x70
];
const FALLBACK_WIDTH: u16 = 556;

/// Title line, then one line per record; long lines wrap and flow onto new pages.
pub struct PdfDocument;

impl ExportFormat for PdfDocument {
    fn write<W: Write>(mut w: W, ledger: &Ledger) -> Result<()> {
        let title = format!("{TITLE_PREFIX}{}", ledger.name());
        let lines = ledger
            .document_lines()
            .iter()
            .flat_map(|line| wrap_line(line, TEXT_WIDTH))
            .collect::<Vec<_>>();
        let pages = paginate(title, lines);
        w.write_all(&render(&pages))?;
        w.flush()?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Row {
    text: String,
    centered: bool,
}

impl Row {
    fn left(text: String) -> Self {
        Self {
            text,
            centered: false,
        }
    }
}

fn paginate(title: String, lines: Vec<String>) -> Vec<Vec<Row>> {
    let mut pages = Vec::new();
    let mut current = vec![
        Row {
            text: title,
            centered: true,
        },
        Row::left(String::new()),
    ];
    for line in lines {
        if current.len() == ROWS_PER_PAGE {
            pages.push(std::mem::take(&mut current));
        }
        current.push(Row::left(line));
    }
    pages.push(current);
    pages
}

fn render(pages: &[Vec<Row>]) -> Vec<u8> {
    let mut pdf = PdfWriter::new();
    let kids = (0..pages.len())
        .map(|idx| format!("{} 0 R", FIRST_PAGE_OBJECT + 2 * idx))
        .collect::<Vec<_>>()
        .join(" ");

    pdf.object(b"<< /Type /Catalog /Pages 2 0 R >>");
    pdf.object(
        format!(
            "<< /Type /Pages /Kids [{kids}] /Count {} >>",
            pages.len()
        )
        .as_bytes(),
    );
    pdf.object(b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>");

    for (idx, rows) in pages.iter().enumerate() {
        let contents_id = FIRST_PAGE_OBJECT + 2 * idx + 1;
        pdf.object(
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH:.2} {PAGE_HEIGHT:.2}] \
                 /Resources << /Font << /F1 3 0 R >> >> /Contents {contents_id} 0 R >>"
            )
            .as_bytes(),
        );
        pdf.stream(&page_content(rows));
    }
    pdf.finish()
}

fn page_content(rows: &[Row]) -> Vec<u8> {
    let mut content = Vec::new();
    for (idx, row) in rows.iter().enumerate() {
        if row.text.is_empty() {
            continue;
        }
        let encoded = encode_win_ansi(&row.text);
        let x = if row.centered {
            ((PAGE_WIDTH - text_width(&encoded)) / 2.0).max(MARGIN)
        } else {
            MARGIN
        };
        // Baseline sits in the vertical middle of the row.
        let y = PAGE_HEIGHT - MARGIN - (idx as f32 + 0.5) * ROW_HEIGHT - FONT_SIZE * 0.35;
        content.extend_from_slice(format!("BT\n/F1 {FONT_SIZE:.0} Tf\n{x:.2} {y:.2} Td\n").as_bytes());
        content.extend_from_slice(&pdf_string(&encoded));
        content.extend_from_slice(b" Tj\nET\n");
    }
    content
}

/// Greedy word wrap; words wider than the line are split by character.
fn wrap_line(line: &str, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in line.split(' ') {
        for piece in split_word(word, max_width) {
            let candidate = if current.is_empty() {
                piece.clone()
            } else {
                format!("{current} {piece}")
            };
            if current.is_empty() || width_of(&candidate) <= max_width {
                current = candidate;
            } else {
                lines.push(std::mem::replace(&mut current, piece));
            }
        }
    }
    lines.push(current);
    lines
}

fn split_word(word: &str, max_width: f32) -> Vec<String> {
    if width_of(word) <= max_width {
        return vec![word.to_string()];
    }
    let mut pieces = Vec::new();
    let mut current = String::new();
    for ch in word.chars() {
        current.push(ch);
        if width_of(&current) > max_width && current.chars().count() > 1 {
            current.pop();
            pieces.push(std::mem::take(&mut current));
            current.push(ch);
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

fn width_of(text: &str) -> f32 {
    text_width(&encode_win_ansi(text))
}

fn text_width(encoded: &[u8]) -> f32 {
    let units: u32 = encoded
        .iter()
        .map(|&byte| match byte {
            0x20..=0x7e => u32::from(HELVETICA_WIDTHS[usize::from(byte - 0x20)]),
            _ => u32::from(FALLBACK_WIDTH),
        })
        .sum();
    units as f32 * FONT_SIZE / 1000.0
}

/// Maps text onto WinAnsiEncoding; characters outside it become `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch {
            ' '..='~' => ch as u8,
            '\t' | '\n' | '\r' => b' ',
            '\u{a0}'..='\u{ff}' => ch as u8,
            '€' => 0x80,
            '‚' => 0x82,
            'ƒ' => 0x83,
            '„' => 0x84,
            '…' => 0x85,
            '†' => 0x86,
            '‡' => 0x87,
            'ˆ' => 0x88,
            '‰' => 0x89,
            'Š' => 0x8a,
            '‹' => 0x8b,
            'Œ' => 0x8c,
            'Ž' => 0x8e,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '˜' => 0x98,
            '™' => 0x99,
            'š' => 0x9a,
            '›' => 0x9b,
            'œ' => 0x9c,
            'ž' => 0x9e,
            'Ÿ' => 0x9f,
            _ => b'?',
        })
        .collect()
}

/// PDF literal string with delimiters escaped and high bytes as octal.
fn pdf_string(encoded: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(encoded.len() + 2);
    out.push(b'(');
    for &byte in encoded {
        match byte {
            b'(' | b')' | b'\\' => {
                out.push(b'\\');
                out.push(byte);
            }
            0x20..=0x7e => out.push(byte),
            _ => out.extend_from_slice(format!("\\{byte:03o}").as_bytes()),
        }
    }
    out.push(b')');
    out
}

/// Sequential object writer that records offsets for the xref table.
struct PdfWriter {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfWriter {
    fn new() -> Self {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n");
        Self {
            buf,
            offsets: Vec::new(),
        }
    }

    fn object(&mut self, body: &[u8]) {
        self.begin();
        self.buf.extend_from_slice(body);
        self.buf.extend_from_slice(b"\nendobj\n");
    }

    fn stream(&mut self, content: &[u8]) {
        self.begin();
        self.buf
            .extend_from_slice(format!("<< /Length {} >>\nstream\n", content.len()).as_bytes());
        self.buf.extend_from_slice(content);
        self.buf.extend_from_slice(b"\nendstream\nendobj\n");
    }

    fn begin(&mut self) {
        self.offsets.push(self.buf.len());
        let id = self.offsets.len();
        self.buf.extend_from_slice(format!("{id} 0 obj\n").as_bytes());
    }

    fn finish(mut self) -> Vec<u8> {
        let xref_offset = self.buf.len();
        let size = self.offsets.len() + 1;
        self.buf
            .extend_from_slice(format!("xref\n0 {size}\n0000000000 65535 f \n").as_bytes());
        for offset in &self.offsets {
            self.buf
                .extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
        }
        self.buf.extend_from_slice(
            format!("trailer\n<< /Size {size} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n")
                .as_bytes(),
        );
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ledger::RecordDraft, storage::MemoryStorage};
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn ledger_with(count: usize) -> Ledger {
        let mut ledger = Ledger::new("alice", Arc::new(MemoryStorage::new())).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        ledger
            .append_batch(
                (0..count).map(|idx| RecordDraft::new(format!("Item {idx}"), -1.0).date(date)),
            )
            .unwrap();
        ledger
    }

    fn render_text(ledger: &Ledger) -> String {
        let mut out = Vec::new();
        PdfDocument::write(&mut out, ledger).unwrap();
        String::from_utf8_lossy(&out).into_owned()
    }

    #[test]
    fn contains_title_and_record_lines() {
        let pdf = render_text(&ledger_with(2));
        assert!(pdf.starts_with("%PDF-1.4"));
        assert!(pdf.ends_with("%%EOF\n"));
        assert!(pdf.contains("(Financial summary - alice) Tj"));
        assert!(pdf.contains("(2024-07-01 - Item 1 - -1.0 \\(General\\): ) Tj"));
        assert!(pdf.contains("/Count 1"));
    }

    #[test]
    fn long_ledgers_span_pages() {
        // 25 record rows fit under the title on the first page.
        assert!(render_text(&ledger_with(25)).contains("/Count 1"));
        assert!(render_text(&ledger_with(26)).contains("/Count 2"));
        assert!(render_text(&ledger_with(80)).contains("/Count 4"));
    }

    #[test]
    fn xref_points_at_objects() {
        let mut out = Vec::new();
        PdfDocument::write(&mut out, &ledger_with(3)).unwrap();
        let start = out.windows(5).position(|w| w == b"xref\n").unwrap();
        let table = String::from_utf8_lossy(&out[start..]).into_owned();
        let first_object = table.lines().nth(3).unwrap();
        let offset: usize = first_object[..10].parse().unwrap();
        assert!(out[offset..].starts_with(b"1 0 obj"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let ledger = ledger_with(30);
        let mut first = Vec::new();
        let mut second = Vec::new();
        PdfDocument::write(&mut first, &ledger).unwrap();
        PdfDocument::write(&mut second, &ledger).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn wraps_long_lines_within_text_width() {
        let line = "word ".repeat(60);
        let wrapped = wrap_line(line.trim_end(), TEXT_WIDTH);
        assert!(wrapped.len() > 1);
        assert!(wrapped.iter().all(|l| width_of(l) <= TEXT_WIDTH));

        let unbroken = "x".repeat(400);
        let pieces = wrap_line(&unbroken, TEXT_WIDTH);
        assert!(pieces.len() > 1);
        assert_eq!(pieces.concat(), unbroken);
    }

    #[test]
    fn encodes_latin_text_as_octal() {
        let encoded = encode_win_ansi("Café ☕");
        assert_eq!(encoded, [b'C', b'a', b'f', 0xe9, b' ', b'?']);
        assert_eq!(pdf_string(&encoded), b"(Caf\\351 ?)".to_vec());
    }
}
