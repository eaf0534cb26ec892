//! PDF encoding of paginated lines
//!
//! Uses the standard Type 1 fonts (Helvetica family and Courier) with
//! WinAnsiEncoding, so nothing is embedded. Characters outside WinAnsi are
//! printed as `?`.

use chrono::{Datelike, Timelike, Utc};
use pdf_writer::{Content, Date, Name, Pdf, Rect, Ref, Str, TextStr};

use super::surface::{FontFace, LayoutLine, PageGeometry};

/// A line placed on a page; `top` is its upper edge in PDF coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub top: f32,
    pub line: LayoutLine,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Page {
    pub lines: Vec<PlacedLine>,
}

impl Page {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

fn font_resource(font: FontFace) -> Name<'static> {
    match font {
        FontFace::Regular => Name(b"F1"),
        FontFace::Bold => Name(b"F2"),
        FontFace::Italic => Name(b"F3"),
        FontFace::BoldItalic => Name(b"F4"),
        FontFace::Mono => Name(b"F5"),
    }
}

fn base_font(font: FontFace) -> Name<'static> {
    match font {
        FontFace::Regular => Name(b"Helvetica"),
        FontFace::Bold => Name(b"Helvetica-Bold"),
        FontFace::Italic => Name(b"Helvetica-Oblique"),
        FontFace::BoldItalic => Name(b"Helvetica-BoldOblique"),
        FontFace::Mono => Name(b"Courier"),
    }
}

/// Map text to WinAnsiEncoding bytes
pub fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\t' => b' ',
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '\u{20ac}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201c}' => 0x93,
            '\u{201d}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            _ => b'?',
        })
        .collect()
}

/// Encode pages into a PDF document
pub fn encode(pages: &[Page], geometry: &PageGeometry, title: &str) -> Vec<u8> {
    let catalog_id = Ref::new(1);
    let tree_id = Ref::new(2);
    let info_id = Ref::new(3);
    let font_ids: Vec<(FontFace, Ref)> = FontFace::ALL
        .iter()
        .enumerate()
        .map(|(idx, font)| (*font, Ref::new(4 + idx as i32)))
        .collect();

    let first_page = 4 + font_ids.len() as i32;
    let page_ids: Vec<(Ref, Ref)> = (0..pages.len() as i32)
        .map(|idx| {
            (
                Ref::new(first_page + idx * 2),
                Ref::new(first_page + idx * 2 + 1),
            )
        })
        .collect();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(tree_id);
    pdf.pages(tree_id)
        .kids(page_ids.iter().map(|(page, _)| *page))
        .count(pages.len() as i32);

    for (font, id) in &font_ids {
        pdf.type1_font(*id)
            .base_font(base_font(*font))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }

    for (page, (page_id, content_id)) in pages.iter().zip(&page_ids) {
        {
            let mut writer = pdf.page(*page_id);
            writer
                .media_box(Rect::new(0.0, 0.0, geometry.width, geometry.height))
                .parent(tree_id)
                .contents(*content_id);
            let mut resources = writer.resources();
            let mut fonts = resources.fonts();
            for (font, id) in &font_ids {
                fonts.pair(font_resource(*font), *id);
            }
        }

        let content = page_content(page, geometry);
        pdf.stream(*content_id, &content);
    }

    let now = Utc::now();
    pdf.document_info(info_id)
        .title(TextStr(title))
        .producer(TextStr(concat!("markdown-studio ", env!("CARGO_PKG_VERSION"))))
        .creation_date(
            Date::new(now.year() as u16)
                .month(now.month() as u8)
                .day(now.day() as u8)
                .hour(now.hour() as u8)
                .minute(now.minute() as u8)
                .second(now.second() as u8),
        );

    pdf.finish()
}

fn page_content(page: &Page, geometry: &PageGeometry) -> Vec<u8> {
    let mut content = Content::new();

    for placed in &page.lines {
        match &placed.line {
            LayoutLine::Text { runs, height } => {
                let size = runs.iter().map(|r| r.size).fold(0.0_f32, f32::max);
                // Baseline sits above the bottom by the descender share of the leading
                let baseline = placed.top - height + (height - size) / 2.0 + size * 0.2;
                for run in runs {
                    if run.text.is_empty() {
                        continue;
                    }
                    let encoded = win_ansi(&run.text);
                    content.begin_text();
                    content.set_font(font_resource(run.font), run.size);
                    content.next_line(geometry.margin + run.x, baseline);
                    content.show(Str(&encoded));
                    content.end_text();
                }
            }
            LayoutLine::Rule { x, height } => {
                let y = placed.top - height / 2.0;
                content.set_line_width(0.75);
                content.move_to(geometry.margin + x, y);
                content.line_to(geometry.width - geometry.margin, y);
                content.stroke();
            }
            LayoutLine::Gap(_) => {}
        }
    }

    content.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::print::surface::TextRun;

    fn text_page(text: &str) -> Page {
        Page {
            lines: vec![PlacedLine {
                top: 800.0,
                line: LayoutLine::Text {
                    runs: vec![TextRun {
                        text: text.to_string(),
                        font: FontFace::Regular,
                        size: 11.0,
                        x: 0.0,
                    }],
                    height: 15.4,
                },
            }],
        }
    }

    #[test]
    fn test_win_ansi_mapping() {
        assert_eq!(win_ansi("A\u{e9}\u{2022}\u{21a9}"), vec![b'A', 0xE9, 0x95, b'?']);
    }

    #[test]
    fn test_encode_produces_pdf() {
        let bytes = encode(&[text_page("Hello")], &PageGeometry::default(), "Doc");
        assert!(bytes.starts_with(b"%PDF-"));
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Helvetica"));
        assert!(text.contains("(Hello)"));
        assert!(text.contains("%%EOF"));
    }

    #[test]
    fn test_encode_multiple_pages() {
        let pages = vec![text_page("one"), text_page("two"), text_page("three")];
        let bytes = encode(&pages, &PageGeometry::default(), "Doc");
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Count 3"));
    }
}
