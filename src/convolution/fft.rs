//! FFT-based convolution.
//!
//! The source plane is extended by the horizontal radius `rx` left and right
//! and the vertical radius `ry` above and below, with the same mirror
//! extension used by the direct path, giving a `(w + 2rx) × (h + 2ry)`
//! complex buffer. A cyclic 2-D convolution of that buffer with the kernel
//! never wraps into the cropped `w × h` window, so the result matches the
//! direct separable convolution up to rounding.
//!
//! Round-off of the transforms can push samples marginally outside the range
//! of the source. The kernels are non-negative with unit sum, so every exact
//! output lies within `[min, max]` of the source; outputs are clamped to it.
//!
//! Stages (each one a row-parallel dispatch):
//! 1. extend + forward FFT of every extended row,
//! 2. per column: gather, forward FFT, multiply by the kernel spectrum,
//!    inverse FFT (the buffer is stored transposed),
//! 3. per output row: gather, inverse FFT, scale and crop.
//!
//! The kernel spectrum is the outer product of the 1-D spectra of the two
//! separable factors, so no 2-D kernel transform is materialised.
use super::mirror_index;
use crate::error::Result;
use crate::image::f32::try_with_capacity;
use crate::image::{ImageF32, ImageView};
use crate::kernel::SeparableFilter;
use crate::parallel::{ParallelDriver, StatusMonitor, WorkStatus};
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner, Length};
use std::sync::Arc;

type C64 = Complex<f64>;

/// Convolve `src` with `horizontal` along rows and `vertical` along columns
/// through the frequency domain.
///
/// Returns `Ok(None)` when the monitor aborted the pass.
pub fn convolve_fft(
    src: &ImageF32,
    horizontal: &dyn SeparableFilter,
    vertical: &dyn SeparableFilter,
    driver: &ParallelDriver,
    monitor: &dyn StatusMonitor,
) -> Result<Option<ImageF32>> {
    let (w, h) = (src.w, src.h);
    let (rx, ry) = (horizontal.radius(), vertical.radius());
    let (ew, eh) = (w + 2 * rx, h + 2 * ry);
    let bounds = src.min_max().filter(|(lo, hi)| lo <= hi);

    let mut planner = FftPlanner::<f64>::new();
    let row_fwd = planner.plan_fft_forward(ew);
    let row_inv = planner.plan_fft_inverse(ew);
    let col_fwd = planner.plan_fft_forward(eh);
    let col_inv = planner.plan_fft_inverse(eh);

    let spectrum_x = kernel_spectrum(horizontal.taps(), &row_fwd);
    let spectrum_y = kernel_spectrum(vertical.taps(), &col_fwd);

    // Stage 1: extended rows, transformed along x.
    let mut rows = complex_buffer(ew * eh)?;
    let status = driver.run_rows_with(
        &mut rows,
        ew,
        monitor,
        || scratch_for(&row_fwd),
        |scratch, ey, out| {
            let row = src.row(mirror_index(ey as isize - ry as isize, h));
            for (ex, px) in out.iter_mut().enumerate() {
                *px = C64::new(row[mirror_index(ex as isize - rx as isize, w)] as f64, 0.0);
            }
            row_fwd.process_with_scratch(out, scratch);
        },
    );
    if status == WorkStatus::Aborted {
        return Ok(None);
    }

    // Stage 2: columns (stored as rows of the transposed buffer).
    let mut cols = complex_buffer(ew * eh)?;
    let rows_ref = &rows;
    let status = driver.run_rows_with(
        &mut cols,
        eh,
        monitor,
        || scratch_for_pair(&col_fwd, &col_inv),
        |scratch, u, col| {
            for (v, px) in col.iter_mut().enumerate() {
                *px = rows_ref[v * ew + u];
            }
            col_fwd.process_with_scratch(col, scratch);
            let hx = spectrum_x[u];
            for (px, &hy) in col.iter_mut().zip(&spectrum_y) {
                *px *= hx * hy;
            }
            col_inv.process_with_scratch(col, scratch);
        },
    );
    if status == WorkStatus::Aborted {
        return Ok(None);
    }
    drop(rows);

    // Stage 3: inverse along x for the rows that survive the crop.
    let norm = 1.0 / (ew as f64 * eh as f64);
    let cols_ref = &cols;
    let mut out = ImageF32::try_new(w, h)?;
    let status = driver.run_rows_with(
        &mut out.data,
        w,
        monitor,
        || (vec![C64::new(0.0, 0.0); ew], scratch_for(&row_inv)),
        |(line, scratch): &mut (Vec<C64>, Vec<C64>), y, dst| {
            let ey = y + ry;
            for (u, px) in line.iter_mut().enumerate() {
                *px = cols_ref[u * eh + ey];
            }
            row_inv.process_with_scratch(line, scratch);
            for (px, c) in dst.iter_mut().zip(&line[rx..rx + w]) {
                let v = (c.re * norm) as f32;
                *px = match bounds {
                    Some((lo, hi)) => v.clamp(lo, hi),
                    None => v,
                };
            }
        },
    );
    if status == WorkStatus::Aborted {
        return Ok(None);
    }
    Ok(Some(out))
}

/// Rows processed by [`convolve_fft`] for a `w × h` plane and radii
/// `rx`, `ry`, i.e. the progress steps it reports.
pub fn progress_steps(w: usize, h: usize, rx: usize, ry: usize) -> u64 {
    ((h + 2 * ry) + (w + 2 * rx) + h) as u64
}

/// Forward transform of the taps laid out cyclically around index 0.
fn kernel_spectrum(taps: &[f32], plan: &Arc<dyn Fft<f64>>) -> Vec<C64> {
    let len = plan.len();
    let r = taps.len() / 2;
    let mut buf = vec![C64::new(0.0, 0.0); len];
    for (k, &t) in taps.iter().enumerate() {
        let offset = k as isize - r as isize;
        let idx = offset.rem_euclid(len as isize) as usize;
        buf[idx] += C64::new(t as f64, 0.0);
    }
    plan.process(&mut buf);
    buf
}

fn complex_buffer(len: usize) -> Result<Vec<C64>> {
    let mut v = try_with_capacity(len)?;
    v.resize(len, C64::new(0.0, 0.0));
    Ok(v)
}

fn scratch_for(plan: &Arc<dyn Fft<f64>>) -> Vec<C64> {
    vec![C64::new(0.0, 0.0); plan.get_inplace_scratch_len()]
}

fn scratch_for_pair(a: &Arc<dyn Fft<f64>>, b: &Arc<dyn Fft<f64>>) -> Vec<C64> {
    let len = a.get_inplace_scratch_len().max(b.get_inplace_scratch_len());
    vec![C64::new(0.0, 0.0); len]
}
