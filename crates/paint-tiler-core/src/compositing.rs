use image::{ImageBuffer, Rgba, RgbaImage};

/// 16-bit-per-channel RGBA buffer used as the cropping source.
pub type Rgba16Image = ImageBuffer<Rgba<u16>, Vec<u16>>;

fn crop_with<F>(src: &Rgba16Image, sx: u32, sy: u32, w: u32, h: u32, convert: F) -> RgbaImage
where
    F: Fn([u16; 4]) -> [u8; 4],
{
    let mut out = RgbaImage::new(w, h);
    for yy in 0..h {
        for xx in 0..w {
            let px = src.get_pixel(sx + xx, sy + yy).0;
            out.put_pixel(xx, yy, Rgba(convert(px)));
        }
    }
    out
}

/// Copy the `w x h` region at (sx, sy) of `src` into a new 8-bit image.
///
/// Each channel keeps only its high byte (`c >> 8`), so an 8-bit source
/// widened to 16 bits comes back unchanged and deeper sources are truncated,
/// never rounded. The region must lie inside `src`.
pub fn crop_truncate(src: &Rgba16Image, sx: u32, sy: u32, w: u32, h: u32) -> RgbaImage {
    crop_with(src, sx, sy, w, h, |[r, g, b, a]| {
        [(r >> 8) as u8, (g >> 8) as u8, (b >> 8) as u8, (a >> 8) as u8]
    })
}

/// Like [`crop_truncate`], but color channels are first premultiplied by alpha
/// at 16-bit precision (`c * a / 0xffff`), then truncated to the high byte.
///
/// This is the channel layout the `.paint` renderer expects.
pub fn crop_premultiplied(src: &Rgba16Image, sx: u32, sy: u32, w: u32, h: u32) -> RgbaImage {
    crop_with(src, sx, sy, w, h, |[r, g, b, a]| {
        let a32 = a as u32;
        let pm = |c: u16| ((c as u32 * a32 / 0xffff) >> 8) as u8;
        [pm(r), pm(g), pm(b), (a >> 8) as u8]
    })
}

/// True if every pixel has alpha 255.
pub fn is_opaque(img: &RgbaImage) -> bool {
    img.pixels().all(|p| p[3] == u8::MAX)
}
