//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate the largest size that fits inside a `max` × `max` box while
/// keeping the source aspect ratio.
///
/// Images already inside the box are returned unchanged: thumbnails never
/// upscale. The shorter edge is rounded to the nearest pixel and never drops
/// below 1.
///
/// # Examples
/// ```
/// # use photo_report::imaging::fit_within;
/// // 3000x2000 landscape into a 360px box → 360x240
/// assert_eq!(fit_within((3000, 2000), 360), (360, 240));
///
/// // Already small enough: untouched
/// assert_eq!(fit_within((200, 100), 360), (200, 100));
/// ```
pub fn fit_within(source: (u32, u32), max: u32) -> (u32, u32) {
    let (src_w, src_h) = source;
    if src_w <= max && src_h <= max {
        return source;
    }

    if src_w >= src_h {
        // Landscape or square: width is the long edge
        let h = (max as f64 * src_h as f64 / src_w as f64).round() as u32;
        (max, h.max(1))
    } else {
        // Portrait: height is the long edge
        let w = (max as f64 * src_w as f64 / src_h as f64).round() as u32;
        (w.max(1), max)
    }
}
