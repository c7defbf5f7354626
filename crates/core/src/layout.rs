//! Fixed stamp geometry, page sizes and text metrics.
//!
//! All offsets are in PDF units (1/72 inch) relative to the lower-left corner
//! of the page's MediaBox. They were laid out for portrait Letter, A4 and
//! Legal pages; anything else is rejected rather than stamped in the wrong place.

/// Signature image box.
pub const SIGNATURE_WIDTH: f32 = 120.0;
pub const SIGNATURE_HEIGHT: f32 = 60.0;
/// Bottom edge of the signature image, about a third of the way up a Letter page.
pub const SIGNATURE_BOTTOM: f32 = 250.0;

pub const SIGNER_FONT_SIZE: f32 = 9.0;
/// Distance from the bottom of the image to the first signer line's baseline.
pub const SIGNER_FIRST_BASELINE_GAP: f32 = 14.0;
pub const SIGNER_LINE_GAP: f32 = 12.0;

pub const QR_SIZE: f32 = 70.0;
pub const MARGIN_X: f32 = 40.0;

/// Height of the band reserved for the footer lines.
pub const FOOTER_HEIGHT: f32 = 36.0;
pub const FOOTER_FONT_SIZE: f32 = 7.0;
pub const FOOTER_FIRST_BASELINE: f32 = 22.0;
pub const FOOTER_SECOND_BASELINE: f32 = 12.0;
/// Minimum space between the two columns of the first footer line.
pub const FOOTER_COLUMN_GAP: f32 = 8.0;
/// Gap between the footer rule and the bottom of the QR image.
pub const QR_FOOTER_GAP: f32 = 8.0;

const PAGE_SIZE_TOLERANCE: f32 = 2.0;

/// Page sizes the stamp layout is valid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSize {
    Letter,
    A4,
    Legal,
}

impl PageSize {
    pub const ALL: [PageSize; 3] = [PageSize::Letter, PageSize::A4, PageSize::Legal];

    /// Portrait width and height.
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            PageSize::Letter => (612.0, 792.0),
            PageSize::A4 => (595.28, 841.89),
            PageSize::Legal => (612.0, 1008.0),
        }
    }

    pub fn detect(width: f32, height: f32) -> Option<PageSize> {
        PageSize::ALL.into_iter().find(|size| {
            let (w, h) = size.dimensions();
            (w - width).abs() <= PAGE_SIZE_TOLERANCE && (h - height).abs() <= PAGE_SIZE_TOLERANCE
        })
    }
}

/// Standard 14 fonts used by the stamp; neither needs embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Helvetica,
    Courier,
}

impl Face {
    pub fn base_font(self) -> &'static str {
        match self {
            Face::Helvetica => "Helvetica",
            Face::Courier => "Courier",
        }
    }

    /// Width of WinAnsi-encoded `text` at `size`, in page units.
    pub fn text_width(self, text: &[u8], size: f32) -> f32 {
        let units: u32 = match self {
            Face::Courier => 600 * text.len() as u32,
            Face::Helvetica => text.iter().map(|&b| u32::from(helvetica_width(b))).sum(),
        };
        units as f32 * size / 1000.0
    }
}

/// Helvetica advance widths for codes 32..=126 (Adobe AFM, WinAnsiEncoding).
const HELVETICA_ASCII_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

fn helvetica_width(byte: u8) -> u16 {
    match byte {
        32..=126 => HELVETICA_ASCII_WIDTHS[usize::from(byte - 32)],
        // Accented Latin letters are close to their base glyphs.
        _ => 556,
    }
}

/// Encode `text` for a simple font using WinAnsiEncoding.
///
/// Characters WinAnsi cannot represent become `?`.
pub fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            '€' => 0x80,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_known_sizes_with_tolerance() {
        assert_eq!(PageSize::detect(612.0, 792.0), Some(PageSize::Letter));
        assert_eq!(PageSize::detect(595.0, 842.0), Some(PageSize::A4));
        assert_eq!(PageSize::detect(612.0, 1008.0), Some(PageSize::Legal));
        assert_eq!(PageSize::detect(792.0, 612.0), None);
        assert_eq!(PageSize::detect(300.0, 300.0), None);
    }

    #[test]
    fn helvetica_table_covers_printable_ascii() {
        assert_eq!(helvetica_width(b' '), 278);
        assert_eq!(helvetica_width(b'A'), 667);
        assert_eq!(helvetica_width(b'i'), 222);
        assert_eq!(helvetica_width(b'~'), 584);
    }

    #[test]
    fn courier_is_monospaced() {
        let w = Face::Courier.text_width(b"abcd", 10.0);
        assert!((w - 24.0).abs() < f32::EPSILON);
    }

    #[test]
    fn win_ansi_keeps_spanish_accents() {
        assert_eq!(win_ansi("José Peña"), b"Jos\xe9 Pe\xf1a".to_vec());
        assert_eq!(win_ansi("Ω"), b"?".to_vec());
    }
}
