#![allow(dead_code)]

use anyhow::{Result, bail};
use docseal_core::{ImageSource, ObjectStore, SignatureProfile};
use image::{ImageFormat, Rgba, RgbaImage};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Mutex;

pub const SIGNATURE_URL: &str = "https://cdn.example.com/signatures/jane.png";

/// Minimal single-page Letter document.
pub fn one_page_pdf(title: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 14.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
            Operation::new("Tj", vec![Object::string_literal(title)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

pub fn signature_png() -> Vec<u8> {
    let img = RgbaImage::from_fn(90, 45, |x, y| {
        if (x + y) % 7 == 0 { Rgba([10, 10, 80, 255]) } else { Rgba([255, 255, 255, 0]) }
    });
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png).unwrap();
    out
}

/// Read the single QR symbol in a PNG back into its text.
pub fn decode_qr(png: &[u8]) -> String {
    let img = image::load_from_memory(png).unwrap().to_luma8();
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
        img.width() as usize,
        img.height() as usize,
        |x, y| img.get_pixel(x as u32, y as u32).0[0],
    );
    let grids = prepared.detect_grids();
    assert_eq!(grids.len(), 1, "expected exactly one QR symbol");
    let (_meta, content) = grids[0].decode().unwrap();
    content
}

pub fn jane_doe() -> SignatureProfile {
    SignatureProfile {
        company_id: "acme".into(),
        user_id: "user-7".into(),
        signature_image_url: SIGNATURE_URL.into(),
        full_name: "Jane Doe".into(),
        position: "HR Manager".into(),
        identity_number: "11.111.111-1".into(),
        is_active: true,
    }
}

/// Serves fixed bytes for known URLs and fails for everything else.
#[derive(Default)]
pub struct FakeImages {
    pub images: HashMap<String, Vec<u8>>,
}

impl FakeImages {
    pub fn with(url: &str, bytes: Vec<u8>) -> Self {
        let mut images = HashMap::new();
        images.insert(url.to_string(), bytes);
        FakeImages { images }
    }
}

impl ImageSource for FakeImages {
    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        match self.images.get(url) {
            Some(bytes) => Ok(bytes.clone()),
            None => bail!("connection refused: {url}"),
        }
    }
}

/// In-memory upsert store that also counts writes.
#[derive(Default)]
pub struct MemoryStore {
    pub objects: Mutex<HashMap<String, Vec<u8>>>,
    pub writes: Mutex<usize>,
    pub fail: bool,
}

impl MemoryStore {
    pub fn failing() -> Self {
        MemoryStore {
            fail: true,
            ..Default::default()
        }
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn write_count(&self) -> usize {
        *self.writes.lock().unwrap()
    }

    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(path).cloned()
    }
}

impl ObjectStore for MemoryStore {
    fn write_object(&self, path: &str, data: &[u8]) -> Result<String> {
        if self.fail {
            bail!("bucket is read-only");
        }
        *self.writes.lock().unwrap() += 1;
        self.objects
            .lock()
            .unwrap()
            .insert(path.to_string(), data.to_vec());
        Ok(format!("https://storage.example.com/public/{path}"))
    }
}
