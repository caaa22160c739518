use kolreport_types::Rect;

/// Largest rectangle with the image's aspect ratio that fits inside the page
/// minus `margin` on every side, centred on the page.
///
/// All lengths share one unit. `img_h` must be non-zero and the page must be
/// larger than twice the margin in both directions; callers guard this.
pub fn fit(img_w: f32, img_h: f32, page_w: f32, page_h: f32, margin: f32) -> Rect {
    let avail_w = page_w - 2.0 * margin;
    let avail_h = page_h - 2.0 * margin;
    let ratio = img_w / img_h;

    let mut w = avail_w;
    let mut h = w / ratio;
    if h > avail_h {
        h = avail_h;
        w = h * ratio;
    }

    Rect::new((page_w - w) / 2.0, (page_h - h) / 2.0, w, h)
}
