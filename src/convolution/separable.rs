//! Direct separable convolution: a horizontal 1-D pass into a scratch plane
//! followed by a vertical 1-D pass into the output.
//!
//! Both passes are parallelised over output rows. The horizontal pass builds
//! a mirror-extended copy of the source row in per-worker scratch; the
//! vertical pass accumulates whole rows of the scratch plane into an `f64`
//! row accumulator, so each worker still writes only its own output rows.
//!
//! Complexity: O(W·H·n) per pass.
use super::mirror_index;
use crate::error::Result;
use crate::image::{ImageF32, ImageView};
use crate::kernel::SeparableFilter;
use crate::parallel::{ParallelDriver, StatusMonitor, WorkStatus};

/// Convolve `src` with `horizontal` along rows and then `vertical` along
/// columns.
///
/// Returns `Ok(None)` when the monitor aborted the pass.
pub fn convolve_separable(
    src: &ImageF32,
    horizontal: &dyn SeparableFilter,
    vertical: &dyn SeparableFilter,
    driver: &ParallelDriver,
    monitor: &dyn StatusMonitor,
) -> Result<Option<ImageF32>> {
    let (w, h) = (src.w, src.h);
    let (taps, r) = (horizontal.taps(), horizontal.radius());

    let mut tmp = ImageF32::try_new(w, h)?;
    let status = driver.run_rows_with(
        &mut tmp.data,
        w,
        monitor,
        || Vec::<f32>::with_capacity(w + 2 * r),
        |ext, y, out| {
            let row = src.row(y);
            ext.clear();
            ext.extend((0..w + 2 * r).map(|i| row[mirror_index(i as isize - r as isize, w)]));
            for (x, px) in out.iter_mut().enumerate() {
                let window = &ext[x..x + taps.len()];
                let acc: f64 = window
                    .iter()
                    .zip(taps)
                    .map(|(&v, &t)| v as f64 * t as f64)
                    .sum();
                *px = acc as f32;
            }
        },
    );
    if status == WorkStatus::Aborted {
        return Ok(None);
    }

    let mut out = ImageF32::try_new(w, h)?;
    let tmp = &tmp;
    let (taps_y, ry) = (vertical.taps(), vertical.radius());
    let status = driver.run_rows_with(
        &mut out.data,
        w,
        monitor,
        || vec![0.0f64; w],
        |acc, y, dst| {
            acc.iter_mut().for_each(|a| *a = 0.0);
            for (k, &t) in taps_y.iter().enumerate() {
                let sy = mirror_index(y as isize + k as isize - ry as isize, h);
                for (a, &v) in acc.iter_mut().zip(tmp.row(sy)) {
                    *a += t as f64 * v as f64;
                }
            }
            for (px, &a) in dst.iter_mut().zip(acc.iter()) {
                *px = a as f32;
            }
        },
    );
    if status == WorkStatus::Aborted {
        return Ok(None);
    }
    Ok(Some(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{FilterFamily, SeparableKernel};
    use crate::parallel::SilentMonitor;

    fn run(src: &ImageF32, n: usize) -> ImageF32 {
        let k = FilterFamily::Mean.separable(n);
        convolve_separable(src, &k, &k, &ParallelDriver::new(true, 4, 1), &SilentMonitor)
            .unwrap()
            .expect("silent monitor never aborts")
    }

    #[test]
    fn constant_image_is_preserved() {
        let src = ImageF32::from_vec(7, 5, vec![0.25; 35]).unwrap();
        let out = run(&src, 3);
        assert!(out.data.iter().all(|&v| (v - 0.25).abs() < 1e-7));
    }

    #[test]
    fn box_filter_averages_with_mirrored_border() {
        // single row [0, 3, 6, 9]; mirrored ext = [0, 0, 3, 6, 9, 9]
        let src = ImageF32::from_vec(4, 1, vec![0.0, 3.0, 6.0, 9.0]).unwrap();
        let out = run(&src, 3);
        let expected = [1.0, 3.0, 6.0, 8.0];
        for (o, e) in out.data.iter().zip(expected) {
            assert!((o - e).abs() < 1e-5, "got {:?}", out.data);
        }
    }

    #[test]
    fn serial_and_parallel_drivers_agree() {
        let src = ImageF32::from_vec(9, 13, (0..117).map(|i| ((i * 7) % 11) as f32).collect())
            .unwrap();
        let k = FilterFamily::gaussian().separable(5);
        let a = convolve_separable(&src, &k, &k, &ParallelDriver::serial(), &SilentMonitor)
            .unwrap()
            .unwrap();
        let b = convolve_separable(&src, &k, &k, &ParallelDriver::new(true, 4, 1), &SilentMonitor)
            .unwrap()
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn axes_use_their_own_taps() {
        // 3 columns, 2 rows; box along x, identity along y
        let src = ImageF32::from_vec(3, 2, vec![0.0, 3.0, 6.0, 6.0, 3.0, 0.0]).unwrap();
        let box3 = FilterFamily::Mean.separable(3);
        let identity = SeparableKernel::normalized(vec![0.0, 1.0, 0.0]);
        let out = convolve_separable(&src, &box3, &identity, &ParallelDriver::serial(), &SilentMonitor)
            .unwrap()
            .unwrap();
        let expected = [1.0, 3.0, 5.0, 5.0, 3.0, 1.0];
        for (o, e) in out.data.iter().zip(expected) {
            assert!((o - e).abs() < 1e-6, "got {:?}", out.data);
        }
    }
}
