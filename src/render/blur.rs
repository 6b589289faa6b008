use crate::foundation::error::{CardError, CardResult};

/// Kernel radius and sigma for a CSS-style blur radius in pixels.
///
/// Sigma is half the blur radius; the kernel extends three sigmas.
pub fn kernel_for_blur(blur_px: f32) -> Option<(u32, f32)> {
    if !blur_px.is_finite() || blur_px <= 0.0 {
        return None;
    }
    let sigma = blur_px / 2.0;
    let radius = (sigma * 3.0).ceil().max(1.0) as u32;
    Some((radius, sigma))
}

/// Normalized Gaussian taps in 16.16 fixed point; they sum to exactly `1 << 16`.
struct Kernel {
    taps: Vec<u32>,
}

impl Kernel {
    const ONE: i64 = 1 << 16;

    fn gaussian(radius: u32, sigma: f32) -> CardResult<Self> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(CardError::layer_render(format!("invalid blur sigma {sigma}")));
        }
        let two_sigma_sq = 2.0 * f64::from(sigma).powi(2);
        let r = i64::from(radius);
        let raw = (-r..=r)
            .map(|d| (-((d * d) as f64) / two_sigma_sq).exp())
            .collect::<Vec<_>>();
        let total: f64 = raw.iter().sum();

        let mut taps = raw
            .iter()
            .map(|w| (w / total * Self::ONE as f64).round() as i64)
            .collect::<Vec<_>>();
        // rounding drift goes to the centre tap
        let drift = Self::ONE - taps.iter().sum::<i64>();
        taps[radius as usize] += drift;

        Ok(Self {
            taps: taps
                .into_iter()
                .map(|t| t.clamp(0, Self::ONE) as u32)
                .collect(),
        })
    }

    fn radius(&self) -> i64 {
        (self.taps.len() / 2) as i64
    }

    /// Convolve one line of `len` pixels; `at(i)` yields the byte offset of pixel `i`.
    fn apply_line(&self, src: &[u8], dst: &mut [u8], len: i64, at: impl Fn(i64) -> usize) {
        let r = self.radius();
        for i in 0..len {
            let mut acc = [0u64; 4];
            for (k, &w) in self.taps.iter().enumerate() {
                let o = at((i + k as i64 - r).clamp(0, len - 1));
                for (a, &v) in acc.iter_mut().zip(&src[o..o + 4]) {
                    *a += u64::from(w) * u64::from(v);
                }
            }
            let o = at(i);
            for (d, a) in dst[o..o + 4].iter_mut().zip(acc) {
                *d = ((a + (1 << 15)) >> 16).min(255) as u8;
            }
        }
    }
}

/// Separable Gaussian blur over a premultiplied RGBA8 buffer, edges clamped.
pub fn blur_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
    sigma: f32,
) -> CardResult<Vec<u8>> {
    let len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| CardError::layer_render("blur buffer size overflow"))?;
    if src.len() != len {
        return Err(CardError::layer_render(format!(
            "blur buffer is {} bytes, expected {len} for {width}x{height}",
            src.len()
        )));
    }
    if radius == 0 || len == 0 {
        return Ok(src.to_vec());
    }

    let kernel = Kernel::gaussian(radius, sigma)?;
    let (w, h) = (i64::from(width), i64::from(height));
    let offset = |x: i64, y: i64| ((y * w + x) * 4) as usize;

    let mut rows = vec![0u8; len];
    for y in 0..h {
        kernel.apply_line(src, &mut rows, w, |x| offset(x, y));
    }
    let mut out = vec![0u8; len];
    for x in 0..w {
        kernel.apply_line(&rows, &mut out, h, |y| offset(x, y));
    }
    Ok(out)
}
