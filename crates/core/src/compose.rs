//! Stamping the last page of a finished PDF.
//!
//! The composer never touches document text. It appends one content stream
//! to the final page that draws, in order: the signature image, the signer
//! lines under it, the verification QR code and the footer band. The page's
//! original content is wrapped in `q`/`Q` so whatever graphics state it
//! leaves behind cannot move or scale the stamp.

use flate2::{Compression, write::ZlibEncoder};
use image::GenericImageView;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};
use std::io::Write;

use crate::error::SealError;
use crate::layout::*;
use crate::link::strip_scheme;
use crate::pdf::check_envelope;
use crate::types::DocumentType;

/// Guards the Parent walk against cyclic page trees.
const MAX_TREE_DEPTH: usize = 64;

/// Everything drawn onto the page besides the original content.
#[derive(Debug, Clone, Copy)]
pub struct Stamp<'a> {
    /// Encoded signature image (PNG or JPEG).
    pub signature_image: &'a [u8],
    pub signer_name: &'a str,
    pub signer_position: &'a str,
    pub signer_identity: &'a str,
    pub verification_code: &'a str,
    pub verification_url: &'a str,
    pub document_type: DocumentType,
    pub document_id: &'a str,
    /// PNG produced by [`crate::encode_qr`].
    pub qr_image: &'a [u8],
}

/// Resource names the stamp content refers to.
struct Names {
    signature: String,
    qr: String,
    helvetica: String,
    courier: String,
}

/// Apply `stamp` to the last page of `original` and return the new document bytes.
#[tracing::instrument(
    skip(original, stamp),
    fields(
        data_len = original.len(),
        document_type = %stamp.document_type,
        document_id = stamp.document_id
    )
)]
pub fn compose(original: &[u8], stamp: &Stamp<'_>) -> Result<Vec<u8>, SealError> {
    check_envelope(original)?;
    let mut doc = Document::load_mem(original).map_err(parse_err)?;
    if doc.is_encrypted() {
        return Err(SealError::DocumentParse(
            "encrypted documents cannot be stamped".into(),
        ));
    }

    let page_id = doc
        .get_pages()
        .into_values()
        .next_back()
        .ok_or_else(|| SealError::DocumentParse("document has no pages".into()))?;

    let [x0, y0, x1, y1] = media_box(&doc, page_id)?;
    let (width, height) = (x1 - x0, y1 - y0);
    let rotated = rotation(&doc, page_id)? % 180 != 0;
    if rotated || PageSize::detect(width, height).is_none() {
        let (width, height) = if rotated { (height, width) } else { (width, height) };
        return Err(SealError::UnsupportedPageSize { width, height });
    }
    tracing::debug!(?page_id, width, height, "Stamping last page");
    let footer = Footer::new(stamp);
    footer.check_fits(width)?;

    let signature_id = embed_image(&mut doc, stamp.signature_image, "signature")?;
    let qr_id = embed_image(&mut doc, stamp.qr_image, "QR")?;
    let helvetica_id = doc.add_object(font(Face::Helvetica));
    let courier_id = doc.add_object(font(Face::Courier));

    let installed = install_resources(
        &mut doc,
        page_id,
        &[
            ("XObject", "DsSig", signature_id),
            ("XObject", "DsQr", qr_id),
            ("Font", "DsHelv", helvetica_id),
            ("Font", "DsCour", courier_id),
        ],
    )?;
    let [signature, qr, helvetica, courier] = <[String; 4]>::try_from(installed)
        .map_err(|_| SealError::DocumentWrite("page resources were not installed".into()))?;
    let names = Names {
        signature,
        qr,
        helvetica,
        courier,
    };

    let operations = stamp_operations((x0, y0), width, &names, stamp, footer);
    append_content(&mut doc, page_id, operations)?;

    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| SealError::DocumentWrite(e.to_string()))?;
    tracing::info!(output_len = out.len(), "Stamped document");
    Ok(out)
}

/// The three footer strings, already WinAnsi encoded.
struct Footer {
    document_id: Vec<u8>,
    verification_code: Vec<u8>,
    link: Vec<u8>,
}

impl Footer {
    fn new(stamp: &Stamp<'_>) -> Self {
        Footer {
            document_id: win_ansi(&format!("Document ID: {}", stamp.document_id)),
            verification_code: win_ansi(&format!("Verification code: {}", stamp.verification_code)),
            link: win_ansi(strip_scheme(stamp.verification_url)),
        }
    }

    /// Footer text is never wrapped or clipped, so anything wider than its
    /// column is refused.
    fn check_fits(&self, page_width: f32) -> Result<(), SealError> {
        let half = page_width / 2.0;
        let columns = [
            ("document id", &self.document_id, half - MARGIN_X - FOOTER_COLUMN_GAP),
            ("verification code", &self.verification_code, half - MARGIN_X),
            ("verification url", &self.link, page_width - 2.0 * MARGIN_X),
        ];
        for (field, text, available) in columns {
            let needed = Face::Courier.text_width(text, FOOTER_FONT_SIZE);
            if needed > available {
                return Err(SealError::invalid(
                    field,
                    format!("too long for the footer ({needed:.1} units, {available:.1} available)"),
                ));
            }
        }
        Ok(())
    }
}

fn stamp_operations(
    origin: (f32, f32),
    width: f32,
    names: &Names,
    stamp: &Stamp<'_>,
    footer: Footer,
) -> Vec<Operation> {
    let (x0, y0) = origin;
    let center = x0 + width / 2.0;
    let mut ops = vec![Operation::new("g", vec![0.into()])];

    let signature_x = center - SIGNATURE_WIDTH / 2.0;
    let signature_y = y0 + SIGNATURE_BOTTOM;
    draw_image(&mut ops, &names.signature, signature_x, signature_y, SIGNATURE_WIDTH, SIGNATURE_HEIGHT);

    let signer_lines = [
        format!("Signed by: {}", stamp.signer_name),
        stamp.signer_position.to_string(),
        format!("RUT/ID: {}", stamp.signer_identity),
    ];
    for (i, line) in signer_lines.iter().enumerate() {
        let text = win_ansi(line);
        let baseline = signature_y - SIGNER_FIRST_BASELINE_GAP - SIGNER_LINE_GAP * i as f32;
        let x = center - Face::Helvetica.text_width(&text, SIGNER_FONT_SIZE) / 2.0;
        draw_text(&mut ops, &names.helvetica, SIGNER_FONT_SIZE, x, baseline, text);
    }

    draw_image(&mut ops, &names.qr, x0 + MARGIN_X, y0 + FOOTER_HEIGHT + QR_FOOTER_GAP, QR_SIZE, QR_SIZE);

    // Footer rule, then two lines of small monospaced text.
    ops.push(Operation::new("w", vec![0.5_f32.into()]));
    ops.push(Operation::new("m", vec![(x0 + MARGIN_X).into(), (y0 + FOOTER_HEIGHT).into()]));
    ops.push(Operation::new("l", vec![(x0 + width - MARGIN_X).into(), (y0 + FOOTER_HEIGHT).into()]));
    ops.push(Operation::new("S", vec![]));

    let first = y0 + FOOTER_FIRST_BASELINE;
    let left = x0 + MARGIN_X;
    draw_text(&mut ops, &names.courier, FOOTER_FONT_SIZE, left, first, footer.document_id);
    draw_text(&mut ops, &names.courier, FOOTER_FONT_SIZE, center, first, footer.verification_code);
    draw_text(
        &mut ops,
        &names.courier,
        FOOTER_FONT_SIZE,
        left,
        y0 + FOOTER_SECOND_BASELINE,
        footer.link,
    );
    ops
}

fn draw_image(ops: &mut Vec<Operation>, name: &str, x: f32, y: f32, w: f32, h: f32) {
    ops.push(Operation::new("q", vec![]));
    ops.push(Operation::new(
        "cm",
        vec![w.into(), 0.into(), 0.into(), h.into(), x.into(), y.into()],
    ));
    ops.push(Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]));
    ops.push(Operation::new("Q", vec![]));
}

fn draw_text(ops: &mut Vec<Operation>, font: &str, size: f32, x: f32, y: f32, text: Vec<u8>) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "Tf",
        vec![Object::Name(font.as_bytes().to_vec()), size.into()],
    ));
    ops.push(Operation::new("Td", vec![x.into(), y.into()]));
    ops.push(Operation::new("Tj", vec![Object::String(text, StringFormat::Literal)]));
    ops.push(Operation::new("ET", vec![]));
}

/// Decode an image and add it as an XObject, with a soft mask if it has alpha.
fn embed_image(doc: &mut Document, bytes: &[u8], label: &'static str) -> Result<ObjectId, SealError> {
    let embed_err = |reason: String| SealError::ImageEmbed {
        image: label,
        reason,
    };
    let decoded = image::load_from_memory(bytes).map_err(|e| embed_err(e.to_string()))?;
    let (width, height) = decoded.dimensions();
    if width == 0 || height == 0 {
        return Err(embed_err("image has no pixels".into()));
    }

    let image_dict = |color_space: &str| {
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(width),
            "Height" => i64::from(height),
            "ColorSpace" => Object::Name(color_space.as_bytes().to_vec()),
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        }
    };

    let mut dict = image_dict("DeviceRGB");
    if decoded.color().has_alpha() {
        let alpha: Vec<u8> = decoded.to_rgba8().pixels().map(|p| p.0[3]).collect();
        let alpha = deflate(&alpha).map_err(|e| embed_err(e.to_string()))?;
        let mask_id = doc.add_object(Stream::new(image_dict("DeviceGray"), alpha));
        dict.set("SMask", Object::Reference(mask_id));
    }
    let rgb = deflate(decoded.to_rgb8().as_raw()).map_err(|e| embed_err(e.to_string()))?;
    tracing::debug!(label, width, height, "Embedded image");
    Ok(doc.add_object(Stream::new(dict, rgb)))
}

fn deflate(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

fn font(face: Face) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => face.base_font(),
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Give the page its own copy of its effective resources plus the given entries.
///
/// Inherited or shared resource dictionaries are copied rather than edited, so
/// other pages keep seeing exactly what they saw before. Returns the names
/// assigned to each entry, in order.
fn install_resources(
    doc: &mut Document,
    page_id: ObjectId,
    entries: &[(&str, &str, ObjectId)],
) -> Result<Vec<String>, SealError> {
    let mut resources = match inherited(doc, page_id, b"Resources")? {
        Some(Object::Dictionary(dict)) => dict.clone(),
        Some(Object::Reference(id)) => resolve_dict(doc, *id)?,
        _ => Dictionary::new(),
    };

    let mut names = Vec::with_capacity(entries.len());
    for &(category, base, id) in entries {
        let mut group = match resources.get(category.as_bytes()) {
            Ok(Object::Dictionary(dict)) => dict.clone(),
            Ok(Object::Reference(group_id)) => resolve_dict(doc, *group_id)?,
            _ => Dictionary::new(),
        };
        let name = unique_name(&group, base);
        group.set(name.clone(), Object::Reference(id));
        resources.set(category, Object::Dictionary(group));
        names.push(name);
    }

    page_dict_mut(doc, page_id)?.set("Resources", Object::Dictionary(resources));
    Ok(names)
}

fn unique_name(group: &Dictionary, base: &str) -> String {
    let mut name = base.to_string();
    let mut n = 1;
    while group.has(name.as_bytes()) {
        name = format!("{base}{n}");
        n += 1;
    }
    name
}

/// Replace the page's content with `q`, the original streams, then `Q` and the stamp.
fn append_content(doc: &mut Document, page_id: ObjectId, operations: Vec<Operation>) -> Result<(), SealError> {
    let stamp = Content { operations }
        .encode()
        .map_err(|e| SealError::DocumentWrite(e.to_string()))?;

    let page = doc.get_object(page_id).and_then(Object::as_dict).map_err(parse_err)?;
    let existing = match page.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(Object::Array(items)) => items.clone(),
        Ok(direct @ Object::Stream(_)) => vec![direct.clone()],
        _ => Vec::new(),
    };

    let mut contents = Vec::with_capacity(existing.len() + 2);
    contents.push(Object::Reference(
        doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec())),
    ));
    for item in existing {
        match item {
            Object::Stream(stream) => contents.push(Object::Reference(doc.add_object(stream))),
            other => contents.push(other),
        }
    }
    let mut tail = b"\nQ\n".to_vec();
    tail.extend_from_slice(&stamp);
    contents.push(Object::Reference(doc.add_object(Stream::new(Dictionary::new(), tail))));

    page_dict_mut(doc, page_id)?.set("Contents", Object::Array(contents));
    Ok(())
}

/// Look up a page attribute, following `Parent` links for inheritable keys.
fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Result<Option<&'a Object>, SealError> {
    let mut node = page_id;
    for _ in 0..MAX_TREE_DEPTH {
        let dict = doc.get_object(node).and_then(Object::as_dict).map_err(parse_err)?;
        if let Ok(value) = dict.get(key) {
            return Ok(Some(value));
        }
        match dict.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent) => node = parent,
            Err(_) => return Ok(None),
        }
    }
    Err(SealError::DocumentParse("page tree is too deep or cyclic".into()))
}

fn media_box(doc: &Document, page_id: ObjectId) -> Result<[f32; 4], SealError> {
    let value = inherited(doc, page_id, b"MediaBox")?
        .ok_or_else(|| SealError::DocumentParse("last page has no MediaBox".into()))?;
    let value = match value {
        Object::Reference(id) => doc.get_object(*id).map_err(parse_err)?,
        other => other,
    };
    let items = value.as_array().map_err(parse_err)?;
    let [a, b, c, d] = items.as_slice() else {
        return Err(SealError::DocumentParse(format!(
            "MediaBox has {} entries, expected 4",
            items.len()
        )));
    };
    let (a, b, c, d) = (number(a)?, number(b)?, number(c)?, number(d)?);
    Ok([a.min(c), b.min(d), a.max(c), b.max(d)])
}

fn rotation(doc: &Document, page_id: ObjectId) -> Result<i64, SealError> {
    match inherited(doc, page_id, b"Rotate")? {
        Some(Object::Integer(degrees)) => Ok(degrees.rem_euclid(360)),
        _ => Ok(0),
    }
}

fn number(value: &Object) -> Result<f32, SealError> {
    match value {
        Object::Integer(i) => Ok(*i as f32),
        Object::Real(r) => Ok(*r as f32),
        other => Err(SealError::DocumentParse(format!(
            "expected a number in MediaBox, found {other:?}"
        ))),
    }
}

fn resolve_dict(doc: &Document, id: ObjectId) -> Result<Dictionary, SealError> {
    doc.get_object(id)
        .and_then(Object::as_dict)
        .cloned()
        .map_err(parse_err)
}

fn page_dict_mut(doc: &mut Document, page_id: ObjectId) -> Result<&mut Dictionary, SealError> {
    doc.get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(parse_err)
}

fn parse_err(e: lopdf::Error) -> SealError {
    SealError::DocumentParse(e.to_string())
}
