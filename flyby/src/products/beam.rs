// Copyright © 2020 Brian Merchant.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::f64::consts::{LN_2, PI};

/// sigma = FWHM / (2 sqrt(2 ln 2))
pub fn fwhm_to_sigma(fwhm: f64) -> f64 {
    fwhm / (2.0 * (2.0 * LN_2).sqrt())
}

/// Solid angle of a circular Gaussian beam, in the units of `fwhm`
/// squared.
pub fn beam_area(fwhm: f64) -> f64 {
    PI * fwhm * fwhm / (4.0 * LN_2)
}

/// Normalized 1D Gaussian kernel, truncated at four sigma.
pub fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    if sigma <= 0.0 {
        return vec![1.0];
    }
    let half = (4.0 * sigma).ceil() as isize;
    let k = (-half..=half)
        .map(|i| (-(i * i) as f64 / (2.0 * sigma * sigma)).exp())
        .collect::<Vec<f64>>();
    let s: f64 = k.iter().sum();
    k.into_iter().map(|x| x / s).collect()
}

/// Convolve an `nx` by `ny` map with a circular Gaussian whose FWHM is
/// given in pixels. Outside the map counts as zero, as do NaNs.
pub fn convolve(values: &[f64], nx: usize, ny: usize, fwhm_px: f64) -> Vec<f64> {
    let kernel = gaussian_kernel(fwhm_to_sigma(fwhm_px));
    let half = (kernel.len() / 2) as isize;
    let clean = |v: f64| if v.is_finite() { v } else { 0.0 };

    let mut rows = vec![0.0; nx * ny];
    for y in 0..ny {
        for x in 0..nx {
            let mut acc = 0.0;
            for (k, w) in kernel.iter().enumerate() {
                let xi = x as isize + k as isize - half;
                if xi >= 0 && (xi as usize) < nx {
                    acc += w * clean(values[xi as usize + nx * y]);
                }
            }
            rows[x + nx * y] = acc;
        }
    }

    let mut r = vec![0.0; nx * ny];
    for y in 0..ny {
        for x in 0..nx {
            let mut acc = 0.0;
            for (k, w) in kernel.iter().enumerate() {
                let yi = y as isize + k as isize - half;
                if yi >= 0 && (yi as usize) < ny {
                    acc += w * rows[x + nx * yi as usize];
                }
            }
            r[x + nx * y] = acc;
        }
    }
    r
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_is_normalized_and_symmetric() {
        let k = gaussian_kernel(2.0);
        assert_eq!(k.len(), 17);
        assert!((k.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!((k[0] - k[16]).abs() < 1e-15);
        assert!(k[8] > k[7]);
    }

    #[test]
    fn convolution_conserves_flux_away_from_edges() {
        let (nx, ny) = (41, 41);
        let mut m = vec![0.0; nx * ny];
        m[20 + nx * 20] = 1.0;
        let c = convolve(&m, nx, ny, 4.0);
        let total: f64 = c.iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(c[20 + nx * 20] < 1.0);
        assert!((c[18 + nx * 20] - c[22 + nx * 20]).abs() < 1e-15);
    }

    #[test]
    fn beam_area_matches_gaussian_integral() {
        let s = fwhm_to_sigma(1.0);
        let expected = 2.0 * PI * s * s;
        assert!((beam_area(1.0) - expected).abs() < 1e-12);
    }
}
