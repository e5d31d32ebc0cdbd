use multiscale_transform::config::{load_config, RuntimeConfig};
use multiscale_transform::diagnostics::{LayerReport, TransformReport};
use multiscale_transform::image::io::{load_image, save_plane_preview, write_json_file};
use multiscale_transform::parallel::LogMonitor;
use multiscale_transform::MultiscaleLinearTransform;
use serde::Serialize;
use std::env;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LayerToolSummary {
    input: PathBuf,
    transform: TransformReport,
    layers: Vec<LayerReport>,
    layer_files: Vec<PathBuf>,
}

fn main() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .try_init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = load_config(Path::new(&config_path))?;

    let image = load_image(&config.input)?;
    let (w, h, channels) = image.geometry();
    let mut mlt = MultiscaleLinearTransform::with_options(config.transform);
    for &i in &config.disabled_layers {
        mlt.disable_layer(i).map_err(|e| e.to_string())?;
    }

    let monitor = LogMonitor::new(format!("MLT {}", config.input.display()));
    let report = mlt
        .transform_image(&image, &monitor)
        .map_err(|e| format!("Transform failed: {e}"))?;

    let layer_files = save_layers(&mlt, &config)?;
    if let Some(path) = &config.output.reconstruction {
        let planes = mlt.reconstruct_planes().map_err(|e| e.to_string())?;
        for (c, plane) in planes.iter().enumerate() {
            save_plane_preview(plane, &channel_path(path, c, planes.len()))?;
        }
    }

    let summary = LayerToolSummary {
        input: config.input.clone(),
        layers: LayerReport::summarize(&mlt),
        transform: report,
        layer_files,
    };
    if let Some(path) = &config.output.report_json {
        write_json_file(path, &summary)?;
    }

    println!(
        "Decomposed {}x{}x{} into {} detail layers + residual in {:.3} ms",
        w,
        h,
        channels,
        mlt.number_of_layers(),
        summary.transform.elapsed_ms
    );
    for layer in &summary.layers {
        if layer.computed {
            println!(
                "  layer {:>2}{}: min={:+.5} max={:+.5} mean={:+.5}",
                layer.index,
                if layer.residual { " (residual)" } else { "" },
                layer.min,
                layer.max,
                layer.mean
            );
        }
    }
    Ok(())
}

fn save_layers(mlt: &MultiscaleLinearTransform, config: &RuntimeConfig) -> Result<Vec<PathBuf>, String> {
    let mut files = Vec::new();
    for (i, layer) in mlt.layers().iter().enumerate() {
        if layer.is_empty() {
            continue;
        }
        let base = if i == mlt.number_of_layers() {
            config.output.layer_dir.join("residual.png")
        } else {
            config.output.layer_dir.join(format!("layer_{i:02}.png"))
        };
        for (c, plane) in layer.planes().iter().enumerate() {
            let path = channel_path(&base, c, layer.channels());
            save_plane_preview(plane, &path)?;
            files.push(path);
        }
    }
    Ok(files)
}

/// `name.png` for single-channel data, `name_c{c}.png` otherwise.
fn channel_path(path: &Path, c: usize, channels: usize) -> PathBuf {
    if channels <= 1 {
        return path.to_path_buf();
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "png".to_string());
    path.with_file_name(format!("{stem}_c{c}.{ext}"))
}

fn usage() -> String {
    "Usage: mlt_layers <config.json>".to_string()
}
