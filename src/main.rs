use multiscale_transform::image::Image;
use multiscale_transform::{
    FilterFamily, LayerReport, MultiscaleLinearTransform, ScalingSequence, SilentMonitor,
};

fn main() {
    // Demo: decompose a synthetic ramp with a few bright spots and check the
    // inverse transform.
    let (w, h) = (256usize, 192usize);
    let img = Image::from_fn(w, h, |x, y| {
        let ramp = (x + y) as f32 / (w + h) as f32;
        let spot = if (x % 64 == 32) && (y % 48 == 24) { 0.5 } else { 0.0 };
        (ramp * 0.5 + spot).min(1.0)
    });

    let mut mlt = MultiscaleLinearTransform::new(5, ScalingSequence::Dyadic, FilterFamily::gaussian());
    let report = match mlt.transform(&img, &SilentMonitor) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };
    println!(
        "layers={} passes={} latency_ms={:.3}",
        mlt.number_of_layers() + 1,
        report.passes.len(),
        report.elapsed_ms
    );
    for layer in LayerReport::summarize(&mlt) {
        println!(
            "  #{} residual={} min={:+.4} max={:+.4} mean={:+.4}",
            layer.index, layer.residual, layer.min, layer.max, layer.mean
        );
    }

    match mlt.reconstruct() {
        Ok(rec) => {
            let err = rec
                .channel(0)
                .iter()
                .zip(img.channel(0))
                .map(|(a, b)| (a - b).abs())
                .fold(0.0f32, f32::max);
            println!("max reconstruction error={err:.2e}");
        }
        Err(err) => eprintln!("Error: {err}"),
    }
}
