use crate::foundation::error::{CardError, CardResult};
use crate::foundation::math::mul_div255_u8;

/// Premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Opacity as an 8-bit coverage value.
fn coverage(opacity: f32) -> u16 {
    if opacity.is_nan() {
        return 0;
    }
    (opacity.clamp(0.0, 1.0) * 255.0).round() as u16
}

/// Source-over of premultiplied `src` onto `dst`, with `src` scaled by `opacity`.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let cov = coverage(opacity);
    let src = if cov == 255 {
        src
    } else {
        src.map(|v| mul_div255_u8(u16::from(v), cov))
    };
    match src[3] {
        0 => dst,
        255 => src,
        a => {
            let keep = 255 - u16::from(a);
            std::array::from_fn(|i| src[i].saturating_add(mul_div255_u8(u16::from(dst[i]), keep)))
        }
    }
}

/// [`over`] applied pixel-wise over two equal-length buffers.
pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> CardResult<()> {
    if dst.len() != src.len() || dst.len() % 4 != 0 {
        return Err(CardError::layer_render(format!(
            "cannot blend {} source bytes over {} destination bytes",
            src.len(),
            dst.len()
        )));
    }
    if coverage(opacity) == 0 {
        return Ok(());
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let blended = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&blended);
    }
    Ok(())
}

/// Multiply every channel of a premultiplied pixel by `coverage / 255`.
pub fn mask(px: PremulRgba8, coverage: u8) -> PremulRgba8 {
    match coverage {
        255 => px,
        0 => [0; 4],
        c => px.map(|v| mul_div255_u8(u16::from(v), u16::from(c))),
    }
}
