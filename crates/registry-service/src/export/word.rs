//! `.docx` rendering.

use std::collections::HashMap;
use std::io::Cursor;

use bytes::Bytes;
use docx_rs::{
    Docx, PageOrientationType, Paragraph, Pic, Run, Style, StyleType, Table, TableAlignmentType,
    TableCell, TableRow,
};
use serde_json::Value;
use tracing::warn;

use registry_core::error::AppError;
use registry_core::traits::Record;
use registry_entity::document::DISPLAY_FIELD;

use super::columns::{WORD_EXCLUDED_FIELDS, cell_text, union_columns};

/// US Letter, landscape, in twentieths of a point.
const PAGE_WIDTH_TWIPS: u32 = 15_840;
const PAGE_HEIGHT_TWIPS: u32 = 12_240;
const EMU_PER_INCH: f64 = 914_400.0;

const MEDIA_HEADING: &str = "Arquivos de Mídia Associados";
const MEDIA_KEYS: &[&str] = &["associated_file_name", "arquivo_nome"];

/// An upload referenced by the snapshot.
#[derive(Debug, Clone)]
pub enum MediaFile {
    /// Raw bytes of an embeddable image.
    Image(Bytes),
    /// Any other media type; only its name is listed.
    Other,
}

/// Existing uploads keyed by filename.
pub type MediaBundle = HashMap<String, MediaFile>;

/// Layout options for the Word export.
#[derive(Debug, Clone)]
pub struct WordOptions {
    /// Heading at the top of the document.
    pub title: String,
    /// Width of embedded pictures.
    pub image_width_inches: f64,
    /// Whether to append the media section.
    pub include_media: bool,
}

/// One element of the media section.
#[derive(Debug, Clone, PartialEq)]
enum MediaBlock {
    Caption(String),
    Picture {
        png: Vec<u8>,
        width_px: u32,
        height_px: u32,
    },
    Note(String),
    Spacer,
}

/// Upload name referenced by a record, if non-empty.
pub fn media_name(record: &Record) -> Option<&str> {
    MEDIA_KEYS
        .iter()
        .find_map(|key| record.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .filter(|name| !name.is_empty())
}

/// Decode any supported raster image and re-encode it as PNG.
fn normalize_image(data: &[u8]) -> Result<(Vec<u8>, u32, u32), image::ImageError> {
    let img = image::load_from_memory(data)?;
    let mut png = Cursor::new(Vec::new());
    img.write_to(&mut png, image::ImageFormat::Png)?;
    Ok((png.into_inner(), img.width(), img.height()))
}

fn media_blocks(records: &[Record], media: &MediaBundle) -> Vec<MediaBlock> {
    let mut blocks = Vec::new();
    for record in records {
        let Some(name) = media_name(record) else {
            continue;
        };
        let Some(file) = media.get(name) else {
            continue;
        };

        let display = record
            .get(DISPLAY_FIELD)
            .map(|v| cell_text(Some(v)))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "N/A".to_string());
        blocks.push(MediaBlock::Caption(format!("Documento: {display}")));

        match file {
            MediaFile::Image(data) => match normalize_image(data) {
                Ok((png, width_px, height_px)) if width_px > 0 && height_px > 0 => {
                    blocks.push(MediaBlock::Picture {
                        png,
                        width_px,
                        height_px,
                    });
                }
                Ok(_) => blocks.push(MediaBlock::Note(format!("Imagem: {name} (erro ao carregar)"))),
                Err(e) => {
                    warn!(name = %name, error = %e, "Could not decode image for export");
                    blocks.push(MediaBlock::Note(format!("Imagem: {name} (erro ao carregar)")));
                }
            },
            MediaFile::Other => blocks.push(MediaBlock::Note(format!("Mídia: {name}"))),
        }
        blocks.push(MediaBlock::Spacer);
    }
    blocks
}

/// Drop characters that XML 1.0 does not allow in a document, keeping tab
/// and line breaks.
fn xml_text(text: &str) -> String {
    text.chars()
        .filter(|&c| match c {
            '\t' | '\n' | '\r' => true,
            '\u{FFFE}' | '\u{FFFF}' => false,
            c => !c.is_control() || u32::from(c) >= 0x7F,
        })
        .collect()
}

fn text_paragraph(text: &str) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(xml_text(text)))
}

fn heading(text: &str, style: &str) -> Paragraph {
    text_paragraph(text).style(style)
}

fn table(records: &[Record], columns: &[String]) -> Table {
    let header = TableRow::new(
        columns
            .iter()
            .map(|c| TableCell::new().add_paragraph(text_paragraph(c)))
            .collect(),
    );

    let mut rows = vec![header];
    for record in records {
        rows.push(TableRow::new(
            columns
                .iter()
                .map(|c| TableCell::new().add_paragraph(text_paragraph(&cell_text(record.get(c)))))
                .collect(),
        ));
    }

    Table::new(rows).align(TableAlignmentType::Center)
}

/// Render records as a landscape document with one table and an
/// optional section listing the associated media.
///
/// Only uploads present in `media` are listed. Images that fail to decode
/// degrade to a text note instead of failing the export.
pub fn to_formatted_document(
    records: &[Record],
    media: &MediaBundle,
    options: &WordOptions,
) -> Result<Vec<u8>, AppError> {
    let mut docx = Docx::new()
        .page_size(PAGE_WIDTH_TWIPS, PAGE_HEIGHT_TWIPS)
        .page_orient(PageOrientationType::Landscape)
        .add_style(
            Style::new("Heading1", StyleType::Paragraph)
                .name("Heading 1")
                .size(32)
                .bold(),
        )
        .add_style(
            Style::new("Heading2", StyleType::Paragraph)
                .name("Heading 2")
                .size(26)
                .bold(),
        )
        .add_paragraph(heading(&options.title, "Heading1"));

    let columns: Vec<String> = union_columns(records)
        .into_iter()
        .filter(|c| !WORD_EXCLUDED_FIELDS.contains(&c.as_str()))
        .collect();
    if !records.is_empty() && !columns.is_empty() {
        docx = docx.add_table(table(records, &columns));
    }

    let blocks = if options.include_media {
        media_blocks(records, media)
    } else {
        Vec::new()
    };
    if !blocks.is_empty() {
        let width_emu = options.image_width_inches.max(0.1) * EMU_PER_INCH;
        docx = docx
            .add_paragraph(Paragraph::new())
            .add_paragraph(heading(MEDIA_HEADING, "Heading2"));

        for block in blocks {
            docx = match block {
                MediaBlock::Caption(text) | MediaBlock::Note(text) => {
                    docx.add_paragraph(text_paragraph(&text))
                }
                MediaBlock::Picture {
                    png,
                    width_px,
                    height_px,
                } => {
                    let height_emu = width_emu * f64::from(height_px) / f64::from(width_px);
                    let pic = Pic::new_with_dimensions(png, width_px, height_px)
                        .size(width_emu as u32, height_emu as u32);
                    docx.add_paragraph(Paragraph::new().add_run(Run::new().add_image(pic)))
                }
                MediaBlock::Spacer => docx.add_paragraph(Paragraph::new()),
            };
        }
    }

    let mut out = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut out)
        .map_err(|e| AppError::internal(format!("Word export failed: {e}")))?;
    Ok(out.into_inner())
}
