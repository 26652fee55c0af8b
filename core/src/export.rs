//! Local document export.
//!
//! A finished letter is captured as a [`LetterSurface`] (frozen lines plus the
//! theme and ink they were typed with) and laid out as a paginated A4 PDF
//! using the standard Courier or Helvetica fonts. The file is named after the
//! current UTC date and written through a temporary file in the target
//! directory, then renamed into place: either the complete file appears or
//! nothing does.

use crate::engine::Typewriter;
use crate::theme::{InkColor, Rgb, ThemeTokens, Typeface};
use chrono::{NaiveDate, Utc};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("could not find letter content")]
    SurfaceNotFound,

    #[error("failed to write document: {0}")]
    Io(#[from] io::Error),

    #[error("failed to move document into place: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// The rendered letter handed to the exporter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LetterSurface {
    pub lines: Vec<String>,
    pub theme: ThemeTokens,
    pub ink: InkColor,
    pub date: NaiveDate,
}

impl LetterSurface {
    /// Capture the sheet of a finished typewriter. `None` while editing.
    pub fn capture(
        typewriter: &Typewriter,
        theme: &ThemeTokens,
        ink: InkColor,
        date: NaiveDate,
    ) -> Option<Self> {
        typewriter.frozen_content().map(|lines| Self {
            lines,
            theme: theme.clone(),
            ink,
            date,
        })
    }

    /// Date line printed at the top of the first page, e.g. "February 14, 2026".
    pub fn date_heading(&self) -> String {
        self.date.format("%B %-d, %Y").to_string()
    }
}

/// Page geometry in PDF points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub font_size: f32,
    pub leading: f32,
}

impl PageLayout {
    /// A4 portrait, one-inch margins, 12pt type on 18pt leading.
    pub fn a4() -> Self {
        Self {
            width: 595.0,
            height: 842.0,
            margin: 72.0,
            font_size: 12.0,
            leading: 18.0,
        }
    }

    /// Text rows that fit between the margins.
    pub fn rows_per_page(&self) -> usize {
        let usable = (self.height - 2.0 * self.margin).max(self.leading);
        ((usable / self.leading).floor() as usize).max(1)
    }
}

impl Default for PageLayout {
    fn default() -> Self {
        Self::a4()
    }
}

/// Writes letter surfaces as PDF files into a directory.
#[derive(Debug, Clone)]
pub struct Exporter {
    out_dir: PathBuf,
    layout: PageLayout,
}

impl Exporter {
    pub fn new<P: Into<PathBuf>>(out_dir: P) -> Self {
        Self {
            out_dir: out_dir.into(),
            layout: PageLayout::a4(),
        }
    }

    pub fn with_layout(mut self, layout: PageLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// `letter-YYYY-MM-DD.pdf`
    pub fn file_name(date: NaiveDate) -> String {
        format!("letter-{}.pdf", date.format("%Y-%m-%d"))
    }

    /// Export using today's UTC date for the file name.
    pub fn export(&self, surface: Option<&LetterSurface>) -> Result<PathBuf, ExportError> {
        self.export_dated(surface, Utc::now().date_naive())
    }

    /// Export with an explicit file date.
    pub fn export_dated(
        &self,
        surface: Option<&LetterSurface>,
        date: NaiveDate,
    ) -> Result<PathBuf, ExportError> {
        let surface = surface.ok_or(ExportError::SurfaceNotFound)?;
        let bytes = render_pdf(surface, &self.layout);

        std::fs::create_dir_all(&self.out_dir)?;
        let target = self.out_dir.join(Self::file_name(date));

        let mut tmp = tempfile::NamedTempFile::new_in(&self.out_dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&target)?;

        info!(path = %target.display(), bytes = bytes.len(), "exported letter");
        Ok(target)
    }
}

/// Lay the surface out into page rows: date heading, body, sign-off.
fn page_rows(surface: &LetterSurface, rows_per_page: usize) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(surface.lines.len() + 5);
    rows.push(surface.date_heading());
    rows.push(String::new());
    rows.push(String::new());
    rows.extend(surface.lines.iter().cloned());
    rows.push(String::new());
    rows.push(surface.theme.sign_off.clone());

    rows.chunks(rows_per_page).map(<[String]>::to_vec).collect()
}

/// Render the surface as a complete PDF document.
pub fn render_pdf(surface: &LetterSurface, layout: &PageLayout) -> Vec<u8> {
    let pages = page_rows(surface, layout.rows_per_page());
    let font = match surface.theme.typeface {
        Typeface::Mono => "Courier",
        Typeface::Sans => "Helvetica",
    };
    let ink = surface.theme.ink.color(surface.ink);

    let mut pdf = PdfWriter::new();
    let page_ids: Vec<usize> = (0..pages.len()).map(|i| 4 + 2 * i).collect();
    let kids = page_ids
        .iter()
        .map(|id| format!("{} 0 R", id))
        .collect::<Vec<_>>()
        .join(" ");

    pdf.object("<< /Type /Catalog /Pages 2 0 R >>");
    pdf.object(&format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids,
        pages.len()
    ));
    pdf.object(&format!(
        "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
        font
    ));

    for (rows, page_id) in pages.iter().zip(&page_ids) {
        pdf.object(&format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {w} {h}] \
             /Resources << /Font << /F1 3 0 R >> >> /Contents {c} 0 R >>",
            w = layout.width,
            h = layout.height,
            c = page_id + 1
        ));
        pdf.stream(&page_content(rows, layout, surface.theme.paper, ink));
    }

    pdf.finish()
}

fn page_content(rows: &[String], layout: &PageLayout, paper: Rgb, ink: Rgb) -> String {
    let (pr, pg, pb) = paper.unit();
    let (ir, ig, ib) = ink.unit();
    let mut out = String::new();
    out.push_str(&format!("{:.3} {:.3} {:.3} rg\n", pr, pg, pb));
    out.push_str(&format!("0 0 {} {} re f\n", layout.width, layout.height));
    out.push_str(&format!("{:.3} {:.3} {:.3} rg\n", ir, ig, ib));
    out.push_str("BT\n");
    out.push_str(&format!("/F1 {} Tf\n{} TL\n", layout.font_size, layout.leading));
    out.push_str(&format!(
        "{} {} Td\n",
        layout.margin,
        layout.height - layout.margin - layout.font_size
    ));
    for row in rows {
        out.push_str(&format!("({}) Tj T*\n", escape_text(row)));
    }
    out.push_str("ET");
    out
}

/// Escape a line for a PDF string literal in WinAnsi encoding.
/// Characters WinAnsi cannot encode print as `?`.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            ' '..='~' => out.push(ch),
            _ => match win_ansi_code(ch) {
                Some(code) => out.push_str(&format!("\\{:03o}", code)),
                None => out.push('?'),
            },
        }
    }
    out
}

/// WinAnsi (CP1252) byte for a non-ASCII character.
fn win_ansi_code(ch: char) -> Option<u8> {
    let code = match ch {
        '\u{a0}'..='\u{ff}' => ch as u32 as u8,
        '\u{20ac}' => 0x80,
        '\u{201a}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201e}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02c6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8a,
        '\u{2039}' => 0x8b,
        '\u{0152}' => 0x8c,
        '\u{017d}' => 0x8e,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201c}' => 0x93,
        '\u{201d}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02dc}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9a,
        '\u{203a}' => 0x9b,
        '\u{0153}' => 0x9c,
        '\u{017e}' => 0x9e,
        '\u{0178}' => 0x9f,
        _ => return None,
    };
    Some(code)
}

/// Minimal PDF object writer tracking byte offsets for the xref table.
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

    fn object(&mut self, body: &str) {
        self.offsets.push(self.buf.len());
        let id = self.offsets.len();
        self.buf
            .extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", id, body).as_bytes());
    }

    fn stream(&mut self, content: &str) {
        self.object(&format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            content.len(),
            content
        ));
    }

    fn finish(mut self) -> Vec<u8> {
        let xref_at = self.buf.len();
        let mut tail = format!("xref\n0 {}\n0000000000 65535 f \n", self.offsets.len() + 1);
        for offset in &self.offsets {
            tail.push_str(&format!("{:010} 00000 n \n", offset));
        }
        tail.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            self.offsets.len() + 1,
            xref_at
        ));
        self.buf.extend_from_slice(tail.as_bytes());
        self.buf
    }
}
