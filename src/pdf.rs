use std::io::BufWriter;

use printpdf::*;

use crate::error::{FichaError, Result};
use crate::fmt::seq_clipped;
use crate::reports::{DateRange, PeriodRollup, SheetReport};

// A4 dimensions (mm); the period report prints landscape.
const A4_W: f32 = 210.0;
const A4_H: f32 = 297.0;
const MARGIN: f32 = 19.05;
const ROW_H: f32 = 5.0;
const FONT_SIZE: f32 = 10.0;
const TITLE_SIZE: f32 = 16.0;
const SUBTITLE_SIZE: f32 = 10.0;

fn approx_text_width(text: &str, size: f32) -> f32 {
    text.len() as f32 * size * 0.18
}

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

struct Col {
    width: f32,
    align: Align,
}

struct PdfWriter {
    doc: PdfDocumentReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    current_page: PdfPageIndex,
    current_layer: PdfLayerIndex,
    page_w: f32,
    page_h: f32,
    y: f32,
}

impl PdfWriter {
    fn new(title: &str, page_w: f32, page_h: f32) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(page_w), Mm(page_h), "Layer 1");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| FichaError::Pdf(format!("{e:?}")))?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| FichaError::Pdf(format!("{e:?}")))?;
        Ok(Self {
            doc,
            font,
            font_bold,
            current_page: page,
            current_layer: layer,
            page_w,
            page_h,
            y: MARGIN,
        })
    }

    fn pdf_y(&self) -> f32 {
        self.page_h - self.y
    }

    fn right_edge(&self) -> f32 {
        self.page_w - MARGIN
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(self.page_w), Mm(self.page_h), "Layer");
        self.current_page = page;
        self.current_layer = layer;
        self.y = MARGIN;
    }

    fn ensure_space(&mut self, needed: f32) {
        if self.y + needed > self.page_h - MARGIN {
            self.new_page();
        }
    }

    fn text(&self, s: &str, x: f32, size: f32, bold: bool) {
        let font = if bold {
            self.font_bold.clone()
        } else {
            self.font.clone()
        };
        let layer = self
            .doc
            .get_page(self.current_page)
            .get_layer(self.current_layer);
        layer.use_text(s, size, Mm(x), Mm(self.pdf_y()), &font);
    }

    fn right_text(&self, s: &str, right_x: f32, size: f32, bold: bool) {
        let tw = approx_text_width(s, size);
        self.text(s, right_x - tw, size, bold);
    }

    fn hline(&self, x1: f32, x2: f32) {
        let layer = self
            .doc
            .get_page(self.current_page)
            .get_layer(self.current_layer);
        layer.set_outline_thickness(0.5);
        let line = Line {
            points: vec![
                (Point::new(Mm(x1), Mm(self.pdf_y())), false),
                (Point::new(Mm(x2), Mm(self.pdf_y())), false),
            ],
            is_closed: false,
        };
        layer.add_line(line);
    }

    fn header(&mut self, title: &str, subtitle_lines: &[String]) {
        self.text(title, MARGIN, TITLE_SIZE, true);
        self.y += 7.0;
        for line in subtitle_lines {
            self.text(line, MARGIN, SUBTITLE_SIZE, false);
            self.y += 5.0;
        }
        let ts = chrono::Local::now()
            .format("Generated %d/%m/%Y %H:%M")
            .to_string();
        self.text(&ts, MARGIN, 8.0, false);
        self.y += 5.0;
        self.hline(MARGIN, self.right_edge());
        self.y += 5.0;
    }

    fn table_header(&mut self, x: f32, cols: &[Col], headers: &[&str]) {
        self.ensure_space(ROW_H * 2.0);
        let mut cx = x;
        for (i, col) in cols.iter().enumerate() {
            if i < headers.len() {
                match col.align {
                    Align::Left => self.text(headers[i], cx, FONT_SIZE, true),
                    Align::Right => self.right_text(headers[i], cx + col.width, FONT_SIZE, true),
                }
            }
            cx += col.width;
        }
        self.y += ROW_H;
        self.hline(x, cx);
        self.y += 2.0;
    }

    fn table_row(&mut self, x: f32, cols: &[Col], values: &[&str], bold: bool) {
        self.ensure_space(ROW_H);
        let mut cx = x;
        for (i, col) in cols.iter().enumerate() {
            if i < values.len() {
                match col.align {
                    Align::Left => self.text(values[i], cx, FONT_SIZE, bold),
                    Align::Right => self.right_text(values[i], cx + col.width, FONT_SIZE, bold),
                }
            }
            cx += col.width;
        }
        self.y += ROW_H;
    }

    fn blank_row(&mut self) {
        self.y += ROW_H;
    }

    fn separator(&mut self) {
        self.hline(MARGIN, self.right_edge());
        self.y += 2.0;
    }

    fn to_bytes(self) -> Result<Vec<u8>> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| FichaError::Pdf(format!("{e:?}")))?;
        Ok(buf.into_inner().map_err(|e| FichaError::Pdf(e.to_string()))?)
    }
}

fn display_date(ymd: &str) -> String {
    match chrono::NaiveDate::parse_from_str(ymd, "%Y-%m-%d") {
        Ok(d) => d.format("%d/%m/%Y").to_string(),
        Err(_) => ymd.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Render functions
// ---------------------------------------------------------------------------

pub fn render_sheet_report(report: &SheetReport) -> Result<Vec<u8>> {
    let title = format!("Production Sheet — {}", report.sheet_name);
    let mut pdf = PdfWriter::new(&title, A4_W, A4_H)?;
    pdf.header(
        &title,
        &[
            format!("Date: {}", display_date(&report.work_date)),
            format!("Operator: {}", report.operator),
        ],
    );

    let cols = &[
        Col { width: 65.0, align: Align::Left },
        Col { width: 75.0, align: Align::Left },
        Col { width: 31.9, align: Align::Right },
    ];
    pdf.table_header(MARGIN, cols, &["Part", "Quantities", "Total"]);

    for row in &report.rows {
        let quantities = seq_clipped(&row.quantities);
        let total = row.total.to_string();
        pdf.table_row(MARGIN, cols, &[&row.part_name, &quantities, &total], false);
    }

    pdf.blank_row();
    pdf.separator();
    let grand = report.grand_total.to_string();
    pdf.table_row(MARGIN, cols, &["TOTAL", "", &grand], true);

    pdf.to_bytes()
}

/// One line per applied filter, printed under the period header.
pub fn render_period_report(
    rollup: &PeriodRollup,
    range: &DateRange,
    filter_lines: &[String],
) -> Result<Vec<u8>> {
    // Landscape: the nested operator/sheet/part layout needs the width.
    let mut pdf = PdfWriter::new("Period Production Report", A4_H, A4_W)?;

    let mut subtitle = vec![format!("Period: {}", range.label())];
    subtitle.extend_from_slice(filter_lines);
    pdf.header("Period Production Report", &subtitle);

    let indent = MARGIN + 7.0;
    let table_x = MARGIN + 14.0;
    let table_w = pdf.right_edge() - table_x;

    for (operator, data) in &rollup.operators {
        pdf.ensure_space(ROW_H * 6.0);
        pdf.text(operator, MARGIN, 14.0, true);
        pdf.y += 8.0;

        for (sheet_name, parts) in &data.sheets {
            pdf.ensure_space(ROW_H * 4.0);
            pdf.text(&format!("Sheet: {sheet_name}"), indent, 11.0, true);
            pdf.y += 6.0;

            let cols = &[
                Col { width: table_w - 40.0, align: Align::Left },
                Col { width: 40.0, align: Align::Right },
            ];
            pdf.table_header(table_x, cols, &["Part", "Pairs"]);
            for (part_name, quantity) in parts {
                let qty = quantity.to_string();
                pdf.table_row(table_x, cols, &[part_name, &qty], false);
            }
            pdf.y += 3.0;
        }

        if !data.part_totals.is_empty() {
            pdf.ensure_space(ROW_H * 4.0);
            pdf.hline(indent, pdf.right_edge());
            pdf.y += 5.0;
            pdf.text("Operator totals", indent, 11.0, true);
            pdf.y += 6.0;

            let cols = &[
                Col { width: table_w - 40.0, align: Align::Left },
                Col { width: 40.0, align: Align::Right },
            ];
            pdf.table_header(table_x, cols, &["Part", "Total"]);
            for (part_name, total) in &data.part_totals {
                let total = total.to_string();
                pdf.table_row(table_x, cols, &[part_name, &total], false);
            }
        }
        pdf.y += ROW_H * 2.0;
    }

    pdf.ensure_space(ROW_H * 4.0);
    pdf.separator();
    pdf.y += 6.0;
    pdf.text("GRAND TOTAL:", MARGIN, TITLE_SIZE, true);
    let grand = rollup.grand_total.to_string();
    let edge = pdf.right_edge();
    pdf.right_text(&grand, edge, TITLE_SIZE, true);
    pdf.y += 6.0;
    pdf.text("pairs produced in the period", MARGIN, FONT_SIZE, false);

    pdf.to_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};
    use crate::ledger::append_quantity;
    use crate::reports::{get_period_rollup, get_sheet_report, RollupFilters};
    use crate::roster::{self, Catalog};
    use crate::sheets::create_sheet;
    use rusqlite::Connection;

    fn seeded_db() -> (tempfile::TempDir, Connection, i64) {
        let dir = tempfile::tempdir().unwrap();
        let mut conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        conn.execute(
            "INSERT INTO users (username, full_name) VALUES ('ana', 'Ana Souza')",
            [],
        )
        .unwrap();
        let ana = conn.last_insert_rowid();
        let tongue = roster::create(&conn, Catalog::Parts, "Tongue").unwrap();
        let sole = roster::create(&conn, Catalog::Parts, "Sole").unwrap();
        let sheet = create_sheet(&conn, ana, "2026-03-02", "Batch-1").unwrap();
        append_quantity(&mut conn, sheet, tongue, 12).unwrap();
        append_quantity(&mut conn, sheet, tongue, 8).unwrap();
        append_quantity(&mut conn, sheet, sole, 5).unwrap();
        (dir, conn, sheet)
    }

    #[test]
    fn test_render_sheet_report_produces_pdf() {
        let (_dir, conn, sheet) = seeded_db();
        let report = get_sheet_report(&conn, sheet).unwrap();
        let bytes = render_sheet_report(&report).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_period_report_produces_pdf() {
        let (_dir, conn, _) = seeded_db();
        let range = DateRange::parse(Some("2026-03-01"), Some("2026-03-05"))
            .unwrap()
            .unwrap();
        let rollup = get_period_rollup(&conn, Some(&range), &RollupFilters::default()).unwrap();
        let bytes = render_period_report(
            &rollup,
            &range,
            &["Filter: Operator Ana Souza".to_string()],
        )
        .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_empty_period_report() {
        let range = DateRange::parse(Some("2026-03-01"), Some("2026-03-05"))
            .unwrap()
            .unwrap();
        let bytes = render_period_report(&PeriodRollup::default(), &range, &[]).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_display_date() {
        assert_eq!(display_date("2026-03-02"), "02/03/2026");
        assert_eq!(display_date("not-a-date"), "not-a-date");
    }
}
