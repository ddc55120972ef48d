//! lopdf-based document backend

use crate::constants::mm_to_pt;
use crate::layout::Placement;
use crate::normalize::NormalizedImage;
use crate::options::CaptionStyle;
use crate::types::*;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use super::DocumentBackend;
use super::image::add_image_xobject;

const CAPTION_FONT_NAME: &str = "F1";

/// Writes pages directly into a `lopdf::Document`
pub struct LopdfBackend {
    doc: Document,
    pages_tree_id: ObjectId,
    page_refs: Vec<Object>,
    current: Option<PageInProgress>,
    font_id: Option<ObjectId>,
}

/// Content of the page currently being drawn
struct PageInProgress {
    width_pt: f32,
    height_pt: f32,
    content: Vec<u8>,
    xobjects: Dictionary,
    image_count: usize,
    uses_font: bool,
}

impl LopdfBackend {
    pub fn new(title: &str) -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_tree_id = doc.new_object_id();

        let info_id = doc.add_object(Dictionary::from_iter(vec![
            ("Title", Object::string_literal(title)),
            ("Producer", Object::string_literal("snap2pdf")),
        ]));
        doc.trailer.set("Info", Object::Reference(info_id));

        Self {
            doc,
            pages_tree_id,
            page_refs: Vec::new(),
            current: None,
            font_id: None,
        }
    }

    /// Pages finished so far, not counting the one in progress
    pub fn finished_pages(&self) -> usize {
        self.page_refs.len()
    }

    fn no_page_error() -> ConvertError {
        ConvertError::Layout("Drawing requested before a page was created".to_string())
    }

    fn caption_font(&mut self) -> ObjectId {
        if let Some(id) = self.font_id {
            return id;
        }
        let mut font_dict = Dictionary::new();
        font_dict.set("Type", Object::Name(b"Font".to_vec()));
        font_dict.set("Subtype", Object::Name(b"Type1".to_vec()));
        font_dict.set("BaseFont", Object::Name(b"Helvetica".to_vec()));
        font_dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
        let id = self.doc.add_object(font_dict);
        self.font_id = Some(id);
        id
    }

    /// Move the page in progress into the page tree
    fn flush_page(&mut self) {
        let Some(page) = self.current.take() else {
            return;
        };

        let mut resources = Dictionary::new();
        if page.image_count > 0 {
            resources.set("XObject", Object::Dictionary(page.xobjects));
        }
        if page.uses_font {
            if let Some(font_id) = self.font_id {
                let mut fonts = Dictionary::new();
                fonts.set(CAPTION_FONT_NAME, Object::Reference(font_id));
                resources.set("Font", Object::Dictionary(fonts));
            }
        }

        let content_id = self
            .doc
            .add_object(Stream::new(Dictionary::new(), page.content));

        let mut page_dict = Dictionary::new();
        page_dict.set("Type", Object::Name(b"Page".to_vec()));
        page_dict.set("Parent", Object::Reference(self.pages_tree_id));
        page_dict.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(page.width_pt),
                Object::Real(page.height_pt),
            ]),
        );
        page_dict.set("Resources", Object::Dictionary(resources));
        page_dict.set("Contents", Object::Reference(content_id));

        let page_id = self.doc.add_object(page_dict);
        self.page_refs.push(Object::Reference(page_id));
    }
}

impl DocumentBackend for LopdfBackend {
    fn create_page(&mut self, size: EffectivePageSize) -> Result<()> {
        if size.width_mm <= 0.0 || size.height_mm <= 0.0 {
            return Err(ConvertError::Layout(format!(
                "Page size {}x{} mm has no area",
                size.width_mm, size.height_mm
            )));
        }

        self.flush_page();
        self.current = Some(PageInProgress {
            width_pt: mm_to_pt(size.width_mm),
            height_pt: mm_to_pt(size.height_mm),
            content: Vec::new(),
            xobjects: Dictionary::new(),
            image_count: 0,
            uses_font: false,
        });
        Ok(())
    }

    fn draw_image(&mut self, image: &NormalizedImage, rect: &Placement) -> Result<()> {
        if self.current.is_none() {
            return Err(Self::no_page_error());
        }

        let xobject_id = add_image_xobject(&mut self.doc, image)?;

        let page = self.current.as_mut().ok_or_else(Self::no_page_error)?;
        let name = format!("Im{}", page.image_count);
        page.image_count += 1;
        page.xobjects
            .set(name.as_bytes(), Object::Reference(xobject_id));

        // Image space is the unit square; scale it to the placement rectangle
        page.content.extend_from_slice(
            format!(
                "q {:.4} 0 0 {:.4} {:.4} {:.4} cm /{} Do Q\n",
                mm_to_pt(rect.width),
                mm_to_pt(rect.height),
                mm_to_pt(rect.x),
                mm_to_pt(rect.y),
                name
            )
            .as_bytes(),
        );
        Ok(())
    }

    fn draw_text(&mut self, text: &str, position: (f32, f32), style: &CaptionStyle) -> Result<()> {
        if self.current.is_none() {
            return Err(Self::no_page_error());
        }

        self.caption_font();
        let page = self.current.as_mut().ok_or_else(Self::no_page_error)?;
        page.uses_font = true;

        let [r, g, b] = style.color.map(|c| c.clamp(0.0, 1.0));
        page.content.extend_from_slice(
            format!(
                "q {:.3} {:.3} {:.3} rg BT /{} {} Tf {:.4} {:.4} Td (",
                r,
                g,
                b,
                CAPTION_FONT_NAME,
                style.font_size_pt,
                mm_to_pt(position.0),
                mm_to_pt(position.1)
            )
            .as_bytes(),
        );
        page.content.extend_from_slice(&encode_text(text));
        page.content.extend_from_slice(b") Tj ET Q\n");
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<u8>> {
        self.flush_page();
        if self.page_refs.is_empty() {
            return Err(ConvertError::NoPages);
        }

        let count = self.page_refs.len() as i64;
        let pages_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(self.page_refs)),
            ("Count", Object::Integer(count)),
        ]);
        self.doc
            .objects
            .insert(self.pages_tree_id, Object::Dictionary(pages_dict));

        let catalog_id = self.doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_tree_id)),
        ]));
        self.doc.trailer.set("Root", catalog_id);

        let mut writer = Vec::new();
        self.doc.save_to(&mut writer)?;
        Ok(writer)
    }
}

/// Encode text as a WinAnsi literal string body, escaping delimiters.
/// Characters outside Latin-1 become `?`.
fn encode_text(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '(' | ')' | '\\' => {
                out.push(b'\\');
                out.push(ch as u8);
            }
            ' '..='~' => out.push(ch as u8),
            '\u{A0}'..='\u{FF}' => out.push(ch as u32 as u8),
            _ => out.push(b'?'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::NormalizedEncoding;
    use ::image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;
    use std::sync::Arc;

    fn png(width: u32, height: u32) -> NormalizedImage {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        NormalizedImage {
            encoding: NormalizedEncoding::Png,
            bytes: Arc::from(bytes),
            pixel_width: width,
            pixel_height: height,
        }
    }

    fn rect() -> Placement {
        Placement {
            x: 10.0,
            y: 10.0,
            width: 100.0,
            height: 50.0,
            scale: 1.0,
        }
    }

    #[test]
    fn test_encode_text_escapes() {
        assert_eq!(encode_text("a(b)c\\"), b"a\\(b\\)c\\\\".to_vec());
        assert_eq!(encode_text("café"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(encode_text("日本"), b"??".to_vec());
    }

    #[test]
    fn test_draw_before_page_is_error() {
        let mut backend = LopdfBackend::new("test");
        assert!(backend.draw_image(&png(2, 2), &rect()).is_err());
        assert!(
            backend
                .draw_text("x", (1.0, 1.0), &CaptionStyle::default())
                .is_err()
        );
    }

    #[test]
    fn test_finish_without_pages() {
        let backend = LopdfBackend::new("empty");
        assert!(matches!(backend.finish(), Err(ConvertError::NoPages)));
    }

    #[test]
    fn test_pages_round_trip_through_lopdf() {
        let mut backend = LopdfBackend::new("two pages");
        backend
            .create_page(EffectivePageSize::new(210.0, 297.0))
            .unwrap();
        backend.draw_image(&png(4, 2), &rect()).unwrap();
        backend
            .draw_text("first.png", (10.0, 5.0), &CaptionStyle::default())
            .unwrap();
        backend
            .create_page(EffectivePageSize::new(297.0, 210.0))
            .unwrap();
        backend.draw_image(&png(2, 4), &rect()).unwrap();
        assert_eq!(backend.finished_pages(), 1);

        let bytes = backend.finish().unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 2);

        let second = doc.get_dictionary(pages[&2]).unwrap();
        let media_box = second.get(b"MediaBox").unwrap().as_array().unwrap();
        let width = media_box[2].as_float().unwrap();
        assert!((width - mm_to_pt(297.0)).abs() < 0.01);
    }
}
