//! Tramage par diffusion d'erreur (Floyd–Steinberg), canal par canal.
//!
//! Chaque canal R, G, B est quantifié sur 1 bit (0 ou 255) ; l'alpha passe
//! tel quel. Le balayage est row-major et ne traite ni la dernière ligne ni
//! la dernière colonne : ces pixels gardent leur valeur d'origine et ne
//! reçoivent aucune erreur.

use pg_core::frame::PixelBuffer;
use rayon::prelude::*;

/// Poids de diffusion, en seizièmes : droite, bas-gauche, bas, bas-droite.
const RIGHT: f64 = 7.0;
const DOWN_LEFT: f64 = 3.0;
const DOWN: f64 = 5.0;
const DOWN_RIGHT: f64 = 1.0;

/// Quantifie sur noir/blanc : `round(v / 255) * 255`, arrondi au pair.
#[inline(always)]
#[must_use]
pub fn quantize(value: f64) -> f64 {
    (value / 255.0).round_ties_even() * 255.0
}

/// Diffuse l'erreur de quantification sur un plan `width`×`height` en place.
///
/// Les valeurs restent en flottant pendant toute la passe ; rien n'est
/// borné ici.
///
/// # Panics
/// Panics if `plane.len() != width * height`.
pub fn dither_plane(plane: &mut [f64], width: usize, height: usize) {
    assert_eq!(plane.len(), width * height, "plane size mismatch");
    if width < 2 || height < 2 {
        return;
    }
    for y in 0..height - 1 {
        diffuse_row(plane, width, height, y);
    }
}

/// Quantifie la ligne `y` (sauf la dernière colonne) et pousse l'erreur
/// vers la droite et la ligne suivante.
fn diffuse_row(plane: &mut [f64], width: usize, height: usize, y: usize) {
    let last_x = width - 1;
    let has_row_below = y + 2 < height;

    for x in 0..last_x {
        let i = y * width + x;
        let old = plane[i];
        let new = quantize(old);
        plane[i] = new;
        let error = old - new;

        // Targets on the last row/column stay untouched.
        let has_right = x + 1 < last_x;
        if has_right {
            plane[i + 1] += error * RIGHT / 16.0;
        }
        if has_row_below {
            let below = i + width;
            if x > 0 {
                plane[below - 1] += error * DOWN_LEFT / 16.0;
            }
            plane[below] += error * DOWN / 16.0;
            if has_right {
                plane[below + 1] += error * DOWN_RIGHT / 16.0;
            }
        }
    }
}

/// Clip to `[0, 255]` and truncate.
#[inline(always)]
#[must_use]
pub fn to_byte(value: f64) -> u8 {
    value.clamp(0.0, 255.0) as u8
}

/// Plan flottant → plan d'octets tramé.
///
/// # Example
/// ```
/// use pg_process::dither::dither_channel;
/// let out = dither_channel(vec![100.0, 200.0, 50.0, 70.0], 2, 2);
/// // Only (0, 0) is interior on a 2×2 plane.
/// assert_eq!(out, vec![0, 200, 50, 70]);
/// ```
#[must_use]
pub fn dither_channel(mut plane: Vec<f64>, width: usize, height: usize) -> Vec<u8> {
    dither_plane(&mut plane, width, height);
    plane.into_iter().map(to_byte).collect()
}

/// Applique le tramage à R, G et B indépendamment. L'alpha n'est pas touché.
///
/// Un canal est traité strictement dans l'ordre de balayage ; seuls les
/// trois canaux tournent en parallèle.
///
/// # Example
/// ```
/// use pg_core::frame::PixelBuffer;
/// use pg_process::dither::dither;
/// let mut fb = PixelBuffer::filled(8, 8, [90, 180, 30, 128]);
/// dither(&mut fb);
/// assert_eq!(fb.pixel(0, 0), [0, 255, 0, 128]);
/// ```
pub fn dither(buffer: &mut PixelBuffer) {
    buffer.assert_consistent();
    let (width, height) = (buffer.width as usize, buffer.height as usize);
    if width < 2 || height < 2 {
        log::debug!("dither: buffer {width}×{height} sans pixel intérieur");
        return;
    }

    let mut planes: Vec<Vec<f64>> = (0..3)
        .map(|c| {
            buffer
                .data
                .chunks_exact(4)
                .map(|px| f64::from(px[c]))
                .collect()
        })
        .collect();

    planes
        .par_iter_mut()
        .for_each(|plane| dither_plane(plane, width, height));

    for (c, plane) in planes.iter().enumerate() {
        for (px, &v) in buffer.data.chunks_exact_mut(4).zip(plane) {
            px[c] = to_byte(v);
        }
    }
    log::debug!("dither: {width}×{height} tramé");
}
