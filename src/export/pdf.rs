//! PDF report of a debate
//!
//! US Letter pages with 72pt margins using the built-in Helvetica fonts.
//! Text is wrapped with `textwrap` and flowed onto new pages as needed.

use chrono::Local;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use crate::debate::Transcript;
use crate::error::{Error, Result};

use super::TranscriptExporter;

const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const MARGIN: i64 = 72;
const CONTENT_WIDTH: i64 = PAGE_WIDTH - 2 * MARGIN;

/// Average Helvetica glyph width as a fraction of the font size
const AVG_CHAR_EM: f64 = 0.55;

#[derive(Debug, Clone, Copy)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static [u8] {
        match self {
            Font::Regular => b"F1",
            Font::Bold => b"F2",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Style {
    font: Font,
    size: i64,
    leading: i64,
    space_before: i64,
    space_after: i64,
    centered: bool,
}

const TITLE: Style = Style {
    font: Font::Bold,
    size: 24,
    leading: 29,
    space_before: 0,
    space_after: 30,
    centered: true,
};

const HEADING: Style = Style {
    font: Font::Bold,
    size: 16,
    leading: 19,
    space_before: 12,
    space_after: 12,
    centered: false,
};

const SPEAKER: Style = Style {
    font: Font::Bold,
    size: 12,
    leading: 14,
    space_before: 6,
    space_after: 6,
    centered: false,
};

const BODY: Style = Style {
    font: Font::Regular,
    size: 10,
    leading: 12,
    space_before: 0,
    space_after: 6,
    centered: false,
};

const META: Style = Style {
    space_after: 0,
    ..BODY
};

/// Paginated PDF report
#[derive(Debug, Clone, Default)]
pub struct PdfExporter;

impl TranscriptExporter for PdfExporter {
    fn format(&self) -> &'static str {
        "pdf"
    }

    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn export(&self, transcript: &Transcript) -> Result<Vec<u8>> {
        let pages = layout(transcript);
        assemble(pages)
    }
}

// ─────────────────────────────────────────────────────────────────
// Layout
// ─────────────────────────────────────────────────────────────────

fn layout(transcript: &Transcript) -> Vec<Vec<Operation>> {
    let mut w = PageWriter::new();

    w.paragraph("Council of Elders", TITLE);
    w.paragraph("Tech Wisdom Debate", TITLE);
    w.space(22);

    let generated = transcript
        .generated_at
        .with_timezone(&Local)
        .format("%B %d, %Y at %I:%M %p");
    w.paragraph(&format!("Generated: {}", generated), META);
    w.paragraph(&format!("Model: {}", transcript.model), META);
    w.space(14);

    w.paragraph("Question:", HEADING);
    w.lines(&transcript.question, BODY);
    w.space(22);

    for round in &transcript.rounds {
        w.page_break();
        w.paragraph(&format!("Round {}", round.number()), HEADING);
        w.space(14);

        for opinion in round {
            w.paragraph(&opinion.speaker, SPEAKER);
            w.lines(&opinion.text, BODY);
            w.space(14);
        }
    }

    w.page_break();
    w.paragraph("Merlin's Synthesis", HEADING);
    w.space(14);
    w.lines(&transcript.synthesis, BODY);

    w.finish()
}

struct PageWriter {
    pages: Vec<Vec<Operation>>,
    ops: Vec<Operation>,
    y: i64,
}

impl PageWriter {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            ops: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn at_top(&self) -> bool {
        self.y == PAGE_HEIGHT - MARGIN
    }

    fn page_break(&mut self) {
        if !self.ops.is_empty() {
            self.pages.push(std::mem::take(&mut self.ops));
        }
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn space(&mut self, points: i64) {
        if !self.at_top() {
            self.y -= points;
        }
    }

    /// Each non-blank line of `text` becomes its own paragraph
    fn lines(&mut self, text: &str, style: Style) {
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            self.paragraph(line, style);
        }
    }

    fn paragraph(&mut self, text: &str, style: Style) {
        self.space(style.space_before);
        let text = transliterate(text);
        for line in textwrap::wrap(&text, wrap_width(style.size)) {
            if self.y - style.leading < MARGIN {
                self.page_break();
            }
            self.y -= style.leading;
            self.text_line(&line, style);
        }
        self.space(style.space_after);
    }

    fn text_line(&mut self, line: &str, style: Style) {
        let x = if style.centered {
            ((PAGE_WIDTH - estimated_width(line, style.size)) / 2).max(MARGIN)
        } else {
            MARGIN
        };

        self.ops.extend([
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![
                    Object::Name(style.font.resource().to_vec()),
                    Object::Integer(style.size),
                ],
            ),
            Operation::new("Td", vec![Object::Integer(x), Object::Integer(self.y)]),
            Operation::new("Tj", vec![Object::string_literal(encode(line))]),
            Operation::new("ET", vec![]),
        ]);
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        if !self.ops.is_empty() || self.pages.is_empty() {
            self.pages.push(self.ops);
        }
        self.pages
    }
}

fn wrap_width(size: i64) -> usize {
    (CONTENT_WIDTH as f64 / (size as f64 * AVG_CHAR_EM)) as usize
}

fn estimated_width(line: &str, size: i64) -> i64 {
    (line.chars().count() as f64 * size as f64 * AVG_CHAR_EM) as i64
}

// ─────────────────────────────────────────────────────────────────
// Text encoding
// ─────────────────────────────────────────────────────────────────

/// Map text onto what WinAnsi-encoded Helvetica can draw
fn transliterate(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\t' => out.push_str("    "),
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => out.push('"'),
            '\u{2013}' | '\u{2014}' | '\u{2012}' | '\u{2212}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{2022}' | '\u{25CF}' | '\u{25E6}' => out.push('*'),
            '\u{00A0}' | '\u{2002}' | '\u{2003}' | '\u{2009}' => out.push(' '),
            '\u{2192}' => out.push_str("->"),
            '\u{2190}' => out.push_str("<-"),
            c if c.is_control() => {}
            c if (c as u32) < 0x80 => out.push(c),
            c if (0xA1..=0xFF).contains(&(c as u32)) => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

/// One byte per char; input must already be transliterated
fn encode(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(c as u32).unwrap_or(b'?'))
        .collect()
}

// ─────────────────────────────────────────────────────────────────
// Document assembly
// ─────────────────────────────────────────────────────────────────

fn font(base: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    }
}

fn assemble(pages: Vec<Vec<Operation>>) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(font("Helvetica"));
    let bold_id = doc.add_object(font("Helvetica-Bold"));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let mut kids = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations }
            .encode()
            .map_err(|e| Error::export_failed("pdf", e))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(count),
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(PAGE_WIDTH),
                Object::Integer(PAGE_HEIGHT),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal("Council of Elders"),
        "Producer" => Object::string_literal("council"),
    });
    doc.trailer.set("Info", info_id);

    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| Error::export_failed("pdf", e))?;
    Ok(out)
}
