use super::domain::{Kpi, Trend};
use super::render::{display_period, display_title, footer_date};
use super::state::ReportData;
use chrono::NaiveDate;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Rgb,
};
use std::io::BufWriter;
use thiserror::Error;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const GUTTER: f32 = 6.0;
const KPI_ROW_HEIGHT: f32 = 22.0;
const LAYER_NAME: &str = "Boletín";

const PT_TO_MM: f32 = 0.3528;
/// Average Helvetica glyph width as a fraction of the font size.
const GLYPH_WIDTH: f32 = 0.5;

const INK: (f32, f32, f32) = (0.059, 0.090, 0.165);
const SLATE: (f32, f32, f32) = (0.278, 0.333, 0.412);
const MUTED: (f32, f32, f32) = (0.580, 0.639, 0.722);
const GREEN: (f32, f32, f32) = (0.020, 0.588, 0.412);
const ROSE: (f32, f32, f32) = (0.882, 0.114, 0.282);

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("pdf font unavailable: {0}")]
    Font(String),
    #[error("pdf could not be written: {0}")]
    Write(String),
}

/// An A4 portrait PDF rendering of a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
    pub pages: usize,
}

#[derive(Debug, Clone, Copy)]
enum Face {
    Regular,
    Bold,
    Oblique,
}

struct PageWriter {
    document: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    oblique: IndirectFontRef,
    /// Baseline cursor, in millimetres from the bottom edge.
    y: f32,
    pages: usize,
}

impl PageWriter {
    fn new(title: &str) -> Result<Self, PdfError> {
        let (document, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);
        let font = |builtin| {
            document
                .add_builtin_font(builtin)
                .map_err(|err| PdfError::Font(err.to_string()))
        };
        let regular = font(BuiltinFont::Helvetica)?;
        let bold = font(BuiltinFont::HelveticaBold)?;
        let oblique = font(BuiltinFont::HelveticaOblique)?;
        let layer = document.get_page(page).get_layer(layer);

        Ok(Self {
            document,
            layer,
            regular,
            bold,
            oblique,
            y: PAGE_HEIGHT - MARGIN,
            pages: 1,
        })
    }

    fn ensure_room(&mut self, height: f32) {
        if self.y - height >= MARGIN {
            return;
        }
        let (page, layer) = self
            .document
            .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);
        self.layer = self.document.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT - MARGIN;
        self.pages += 1;
    }

    fn text_at(
        &self,
        text: &str,
        size: f32,
        face: Face,
        color: (f32, f32, f32),
        x: f32,
        y: f32,
    ) {
        let font = match face {
            Face::Regular => &self.regular,
            Face::Bold => &self.bold,
            Face::Oblique => &self.oblique,
        };
        let (r, g, b) = color;
        self.layer.set_fill_color(Color::Rgb(Rgb::new(r, g, b, None)));
        self.layer.use_text(text, size, Mm(x), Mm(y), font);
    }

    fn line(&mut self, text: &str, size: f32, face: Face, color: (f32, f32, f32)) {
        let height = line_height(size);
        self.ensure_room(height);
        self.y -= height;
        self.text_at(text, size, face, color, MARGIN, self.y);
    }

    fn paragraph(&mut self, text: &str, size: f32, face: Face, color: (f32, f32, f32)) {
        for line in wrap_text(text, chars_per_line(CONTENT_WIDTH, size)) {
            self.line(&line, size, face, color);
        }
    }

    fn section_title(&mut self, title: &str) {
        self.gap(6.0);
        self.line(&title.to_uppercase(), 8.0, Face::Bold, MUTED);
        self.gap(2.0);
    }

    fn gap(&mut self, height: f32) {
        self.y -= height;
    }

    fn kpi_grid(&mut self, kpis: &[Kpi]) {
        let column_width = (CONTENT_WIDTH - GUTTER) / 2.0;
        for pair in kpis.chunks(2) {
            self.ensure_room(KPI_ROW_HEIGHT);
            let top = self.y;
            for (column, kpi) in pair.iter().enumerate() {
                let x = MARGIN + column as f32 * (column_width + GUTTER);
                let label =
                    truncate_to(&kpi.label.to_uppercase(), chars_per_line(column_width, 8.0));
                self.text_at(&label, 8.0, Face::Bold, MUTED, x, top - 5.0);
                self.text_at(&kpi.value, 18.0, Face::Bold, INK, x, top - 13.0);

                let value_width = kpi.value.chars().count() as f32 * 18.0 * PT_TO_MM * 0.6;
                let (change, color) = change_label(kpi);
                let change_x = x + value_width + 3.0;
                self.text_at(&change, 10.0, Face::Bold, color, change_x, top - 13.0);
            }
            self.y = top - KPI_ROW_HEIGHT;
        }
    }

    fn finish(self) -> Result<RenderedPdf, PdfError> {
        let mut writer = BufWriter::new(Vec::new());
        self.document
            .save(&mut writer)
            .map_err(|err| PdfError::Write(err.to_string()))?;
        let bytes = writer
            .into_inner()
            .map_err(|err| PdfError::Write(err.to_string()))?;
        Ok(RenderedPdf {
            bytes,
            pages: self.pages,
        })
    }
}

/// Lays the report out on A4 portrait pages with the built-in Helvetica
/// faces. Cover images stay in the HTML export.
pub fn render_pdf(report: &ReportData, generated_on: NaiveDate) -> Result<RenderedPdf, PdfError> {
    let title = display_title(report);
    let mut page = PageWriter::new(title)?;

    page.line("CONFIDENCIAL / USO INTERNO", 8.0, Face::Regular, MUTED);
    page.gap(2.0);
    page.paragraph(&title.to_uppercase(), 24.0, Face::Bold, INK);
    page.paragraph(display_period(report), 12.0, Face::Regular, SLATE);

    page.section_title("Resumen Ejecutivo");
    page.paragraph(&report.summary, 12.0, Face::Oblique, SLATE);

    page.section_title("Indicadores Clave (KPIs)");
    if report.kpis.is_empty() {
        page.line("Sin indicadores disponibles.", 10.0, Face::Oblique, MUTED);
    } else {
        page.kpi_grid(&report.kpis);
    }

    page.section_title("Análisis Narrativo");
    page.paragraph(&report.analysis, 10.0, Face::Regular, SLATE);

    page.section_title("Conclusión");
    page.paragraph(&report.conclusion, 10.0, Face::Regular, INK);

    page.gap(8.0);
    page.line(
        &format!("GENERADO AUTOMÁTICAMENTE • {}", footer_date(generated_on)),
        7.0,
        Face::Regular,
        MUTED,
    );
    page.line("DEPARTAMENTO DE ESTRATEGIA", 7.0, Face::Bold, INK);

    page.finish()
}

/// Base-14 fonts have no triangle glyphs, so the direction is carried by the
/// sign and the colour.
fn change_label(kpi: &Kpi) -> (String, (f32, f32, f32)) {
    let magnitude = kpi.change.abs();
    match kpi.trend {
        Trend::Up => (format!("+{magnitude}%"), GREEN),
        Trend::Down => (format!("-{magnitude}%"), ROSE),
        Trend::Neutral => (format!("{magnitude}%"), MUTED),
    }
}

fn line_height(size: f32) -> f32 {
    size * PT_TO_MM * 1.45
}

fn chars_per_line(width: f32, size: f32) -> usize {
    ((width / (size * PT_TO_MM * GLYPH_WIDTH)) as usize).max(1)
}

fn truncate_to(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut shortened: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    shortened.push('…');
    shortened
}

/// Greedy word wrap on character counts. Explicit newlines start a new line
/// and words longer than a line are split.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > max_chars {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                lines.push(word.drain(..max_chars).collect());
            }
            if word.is_empty() {
                continue;
            }

            let needed = word.len() + usize::from(!current.is_empty());
            if current.chars().count() + needed > max_chars {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.extend(word);
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    lines
}
