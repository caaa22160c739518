use crate::page::LopdfPage;
use crate::xobject::encode_image;
use kolreport_render_core::utils::mm_to_pt;
use kolreport_render_core::{ImageHandle, RenderError};
use kolreport_types::{ImageFormat, PageGeometry, Rect, Size};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

const PDF_VERSION: &str = "1.5";
const PRODUCER: &str = concat!("kolreport ", env!("CARGO_PKG_VERSION"));

/// Builds a single PDF in memory. Every page shares one geometry and one
/// resource dictionary holding the two standard fonts and all registered
/// images, so an image registered once can be drawn on any page.
pub struct LopdfDocumentBuilder {
    doc: Document,
    geometry: PageGeometry,
    pages_id: ObjectId,
    resources_id: ObjectId,
    page_ids: Vec<ObjectId>,
    xobjects: Dictionary,
    title: Option<String>,
}

impl LopdfDocumentBuilder {
    pub fn new(geometry: PageGeometry) -> Self {
        let mut doc = Document::with_version(PDF_VERSION);
        let pages_id = doc.new_object_id();
        let resources_id = doc.new_object_id();
        Self {
            doc,
            geometry,
            pages_id,
            resources_id,
            page_ids: Vec::new(),
            xobjects: Dictionary::new(),
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Page size in millimetres.
    pub fn page_size(&self) -> Size {
        self.geometry.size_mm()
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Embeds an encoded image once and returns a handle usable on any page.
    pub fn register_image(&mut self, data: &[u8], format: ImageFormat) -> Result<ImageHandle, RenderError> {
        let name = format!("Im{}", self.xobjects.len() + 1);
        let encoded = encode_image(&name, data, format)?;

        let mut dict = encoded.dict;
        if let Some(mask) = encoded.soft_mask {
            let mask_id = self.doc.add_object(mask);
            dict.set("SMask", mask_id);
        }
        let image_id = self.doc.add_object(Stream::new(dict, encoded.data));
        self.xobjects.set(name.as_bytes().to_vec(), image_id);

        log::debug!("Embedded {format} image as {name} ({}x{})", encoded.width, encoded.height);
        Ok(ImageHandle::new(name, encoded.width, encoded.height))
    }

    pub fn begin_page(&self) -> LopdfPage {
        LopdfPage::new(self.page_size())
    }

    pub fn push_page(&mut self, page: LopdfPage) -> Result<(), RenderError> {
        let page_id = self.doc.new_object_id();
        let height_pt = mm_to_pt(self.page_size().height);
        let (content, links) = page.into_content();

        let content_id = self.doc.add_object(Stream::new(dictionary! {}, content.encode()?));

        let annotations: Vec<Object> = links
            .into_iter()
            .map(|(rect, url)| Object::Reference(self.add_link_annotation(rect, &url, height_pt)))
            .collect();

        let size = self.page_size();
        let mut page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), mm_to_pt(size.width).into(), height_pt.into()],
            "Contents" => content_id,
            "Resources" => self.resources_id,
        };
        if !annotations.is_empty() {
            page_dict.set("Annots", Object::Array(annotations));
        }
        self.doc.objects.insert(page_id, Object::Dictionary(page_dict));
        self.page_ids.push(page_id);
        Ok(())
    }

    fn add_link_annotation(&mut self, rect: Rect, url: &str, height_pt: f32) -> ObjectId {
        let pdf_rect = vec![
            mm_to_pt(rect.x).into(),
            (height_pt - mm_to_pt(rect.bottom())).into(),
            mm_to_pt(rect.right()).into(),
            (height_pt - mm_to_pt(rect.y)).into(),
        ];
        let action = dictionary! {
            "Type" => "Action",
            "S" => "URI",
            "URI" => Object::string_literal(url),
        };
        let annot = dictionary! {
            "Type" => "Annot",
            "Subtype" => "Link",
            "Rect" => pdf_rect,
            "Border" => vec![0.into(), 0.into(), 0.into()],
            "A" => action,
        };
        self.doc.add_object(annot)
    }

    /// Writes the catalog, page tree and shared resources and serializes the
    /// document.
    pub fn finish(mut self) -> Result<Vec<u8>, RenderError> {
        if self.page_ids.is_empty() {
            return Err(RenderError::Other("document has no pages".into()));
        }

        let fonts = dictionary! {
            "F1" => standard_font("Helvetica"),
            "F2" => standard_font("Helvetica-Bold"),
        };
        let resources = dictionary! {
            "Font" => fonts,
            "XObject" => self.xobjects,
        };
        self.doc.objects.insert(self.resources_id, Object::Dictionary(resources));

        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => self.page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<Object>>(),
            "Count" => self.page_ids.len() as i64,
        };
        self.doc.objects.insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let mut info = dictionary! {
            "Producer" => Object::string_literal(PRODUCER),
            "CreationDate" => Object::string_literal(chrono::Local::now().format("D:%Y%m%d%H%M%S").to_string()),
        };
        if let Some(title) = &self.title {
            info.set("Title", Object::string_literal(title.as_str()));
        }
        let info_id = self.doc.add_object(info);
        self.doc.trailer.set("Info", info_id);

        let mut out = Vec::new();
        self.doc
            .save_to(&mut out)
            .map_err(|e| RenderError::Pdf(e.to_string()))?;
        log::debug!("Serialized {} page document ({} bytes)", self.page_ids.len(), out.len());
        Ok(out)
    }
}

fn standard_font(base_font: &str) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageBuffer, Rgb};
    use kolreport_render_core::{FontSpec, PageCanvas};
    use kolreport_types::Color;
    use std::io::Cursor;

    fn logo_png() -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(20, 10, Rgb([0u8, 120, 255])));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn empty_document_is_rejected() {
        let builder = LopdfDocumentBuilder::new(PageGeometry::default());
        assert!(builder.finish().is_err());
    }

    #[test]
    fn pages_share_one_image_object() {
        let mut builder = LopdfDocumentBuilder::new(PageGeometry::default()).with_title("Report");
        let logo = builder.register_image(&logo_png(), ImageFormat::Png).unwrap();
        assert_eq!(logo.name(), "Im1");
        assert_eq!((logo.pixel_width(), logo.pixel_height()), (20, 10));

        for _ in 0..3 {
            let mut page = builder.begin_page();
            page.draw_image(&logo, Rect::new(10.0, 10.0, 20.0, 10.0));
            page.draw_text("Title", 10.0, 40.0, &FontSpec::bold(20.0), &Color::BLACK);
            builder.push_page(page).unwrap();
        }
        assert_eq!(builder.page_count(), 3);

        let bytes = builder.finish().unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
        let image_streams = doc
            .objects
            .values()
            .filter(|o| {
                o.as_stream()
                    .ok()
                    .and_then(|s| s.dict.get(b"Subtype").ok())
                    .and_then(|s| s.as_name().ok())
                    == Some(b"Image".as_slice())
            })
            .count();
        assert_eq!(image_streams, 1);
    }

    #[test]
    fn link_becomes_uri_annotation() {
        let mut builder = LopdfDocumentBuilder::new(PageGeometry::default());
        let mut page = builder.begin_page();
        page.link(Rect::new(10.0, 20.0, 30.0, 5.0), "https://example.com/post/1");
        builder.push_page(page).unwrap();

        let doc = Document::load_mem(&builder.finish().unwrap()).unwrap();
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
        let page = doc.get_dictionary(page_id).unwrap();
        let annots = page.get(b"Annots").unwrap().as_array().unwrap();
        assert_eq!(annots.len(), 1);
        let annot = doc.get_dictionary(annots[0].as_reference().unwrap()).unwrap();
        let action = annot.get(b"A").unwrap().as_dict().unwrap();
        assert_eq!(action.get(b"URI").unwrap().as_str().unwrap(), b"https://example.com/post/1");
    }
}
