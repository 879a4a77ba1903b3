use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pg_core::config::PipelineConfig;
use pg_core::frame::PixelBuffer;
use pg_core::record::ColorRecord;
use pg_export::json::{JsonOptions, save_records};
use pg_export::png::save_png;
use pg_process::dither::dither;
use pg_process::extract::{ExtractOptions, extract, extract_blocks};
use pg_process::merge::merge_blocks;
use pg_source::image::load_image;
use pg_source::resize::Resizer;

/// Résultat d'un passage dans le pipeline.
#[derive(Debug)]
pub struct PipelineOutput {
    /// Buffer after resampling and optional dithering.
    pub frame: PixelBuffer,
    /// Records in scan order (pixel or block grid).
    pub records: Vec<ColorRecord>,
}

/// Fichiers produits pour une image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    /// PNG of the transformed buffer, if written.
    pub image: Option<PathBuf>,
    /// JSON records.
    pub colors: PathBuf,
}

/// scale → pixelate → dither? → merge? → extract.
///
/// Pure : aucun accès disque, aucun état global.
///
/// # Errors
/// Returns an error if the config is invalid or a stage rejects its input.
pub fn run_pipeline(frame: &PixelBuffer, config: &PipelineConfig) -> Result<PipelineOutput> {
    config.validate()?;
    frame.assert_consistent();

    let mut resizer = Resizer::new();
    let scaled = resizer.scale(frame, config.scale_factor)?;
    let mut pixelated = resizer.pixelate(&scaled, config.pixel_size, config.restore_size)?;

    if config.dither {
        dither(&mut pixelated);
    }

    let opts = ExtractOptions::from_config(config);
    let records = if config.merge_blocks {
        let blocks = merge_blocks(&pixelated, config.block_size)?;
        extract_blocks(&blocks, opts)
    } else {
        extract(&pixelated, opts)
    };

    log::debug!(
        "pipeline: {}×{} → {}×{}, {} enregistrement(s)",
        frame.width,
        frame.height,
        pixelated.width,
        pixelated.height,
        records.len()
    );
    Ok(PipelineOutput {
        frame: pixelated,
        records,
    })
}

/// `0.3` → `"0.3"`, `1.0` → `"1.0"`.
fn format_scale(scale: f64) -> String {
    if scale.fract() == 0.0 {
        format!("{scale:.1}")
    } else {
        format!("{scale}")
    }
}

/// Marqueur présent dans le nom de chaque fichier produit.
const OUTPUT_MARKER: &str = "_pixelated_";

/// Vrai pour un fichier que le pipeline a lui-même écrit.
#[must_use]
pub fn is_generated_output(path: &Path) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|stem| stem.contains(OUTPUT_MARKER))
}

/// `<out_dir>/<stem>_pixelated_<scale>.png` et `..._colors.json`.
#[must_use]
pub fn output_paths(
    input: &Path,
    out_dir: Option<&Path>,
    config: &PipelineConfig,
) -> OutputPaths {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    let dir = out_dir
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    let base = format!("{stem}{OUTPUT_MARKER}{}", format_scale(config.scale_factor));
    OutputPaths {
        image: config.write_png.then(|| dir.join(format!("{base}.png"))),
        colors: dir.join(format!("{base}_colors.json")),
    }
}

/// Décode `input`, fait tourner le pipeline et écrit PNG + JSON.
///
/// # Errors
/// Returns an error if decoding, any stage, or writing the outputs fails.
pub fn process_file(
    input: &Path,
    out_dir: Option<&Path>,
    config: &PipelineConfig,
) -> Result<OutputPaths> {
    let frame = load_image(input)?;
    let output = run_pipeline(&frame, config)
        .with_context(|| format!("Pipeline échoué pour {}", input.display()))?;

    let paths = output_paths(input, out_dir, config);
    if let Some(dir) = paths.colors.parent()
        && !dir.as_os_str().is_empty()
    {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Impossible de créer {}", dir.display()))?;
    }
    if let Some(ref image_path) = paths.image {
        save_png(image_path, &output.frame)?;
    }
    let json = JsonOptions {
        key: config.color_key,
        pretty: config.pretty,
    };
    save_records(&paths.colors, &output.records, json)?;
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pg_core::config::{ColorKey, Encoding, FilterMode};
    use pg_core::record::ColorValue;

    fn raw_alpha() -> PipelineConfig {
        PipelineConfig {
            scale_factor: 1.0,
            pixel_size: 2,
            restore_size: true,
            encoding: Encoding::Raw,
            filter_mode: FilterMode::Alpha,
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn red_square_end_to_end() {
        let frame = PixelBuffer::filled(4, 4, [255, 0, 0, 255]);
        let out = run_pipeline(&frame, &raw_alpha()).unwrap();
        assert_eq!(out.frame, frame);
        assert_eq!(out.records.len(), 16);
        let mut coords: Vec<_> = out.records.iter().map(|r| (r.x, r.y)).collect();
        coords.sort_unstable();
        let expected: Vec<(u32, u32)> = (0..4)
            .flat_map(|x| (0..4).map(move |y| (x, y)))
            .collect();
        assert_eq!(coords, expected);
        assert!(
            out.records
                .iter()
                .all(|r| r.color == ColorValue::Raw([255, 0, 0, 255]))
        );
    }

    #[test]
    fn grid_without_restore() {
        let frame = PixelBuffer::filled(8, 6, [40, 50, 60, 255]);
        let config = PipelineConfig {
            restore_size: false,
            ..raw_alpha()
        };
        let out = run_pipeline(&frame, &config).unwrap();
        assert_eq!((out.frame.width, out.frame.height), (4, 3));
        assert_eq!(out.records.len(), 12);
    }

    #[test]
    fn merge_emits_block_grid_coordinates() {
        let mut frame = PixelBuffer::filled(4, 4, [90, 90, 90, 255]);
        for y in 0..2 {
            for x in 2..4 {
                frame.set_pixel(x, y, [0, 90, 90, 255]);
            }
        }
        let config = PipelineConfig {
            merge_blocks: true,
            block_size: 2,
            ..raw_alpha()
        };
        let out = run_pipeline(&frame, &config).unwrap();
        let coords: Vec<_> = out.records.iter().map(|r| (r.x, r.y)).collect();
        assert_eq!(coords, vec![(0, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn dither_keeps_boundary() {
        let frame = PixelBuffer::filled(6, 6, [100, 150, 200, 255]);
        let config = PipelineConfig {
            dither: true,
            pixel_size: 1,
            ..raw_alpha()
        };
        let out = run_pipeline(&frame, &config).unwrap();
        for i in 0..6 {
            assert_eq!(out.frame.pixel(5, i), [100, 150, 200, 255]);
            assert_eq!(out.frame.pixel(i, 5), [100, 150, 200, 255]);
        }
        assert_eq!(out.frame.pixel(0, 0), [0, 255, 255, 255]);
    }

    #[test]
    fn invalid_config_rejected_before_work() {
        let frame = PixelBuffer::filled(4, 4, [1, 2, 3, 255]);
        let config = PipelineConfig {
            pixel_size: 0,
            ..raw_alpha()
        };
        assert!(run_pipeline(&frame, &config).is_err());
    }

    #[test]
    fn scale_to_nothing_rejected() {
        let frame = PixelBuffer::filled(3, 3, [1, 2, 3, 255]);
        let config = PipelineConfig {
            scale_factor: 0.2,
            ..raw_alpha()
        };
        assert!(run_pipeline(&frame, &config).is_err());
    }

    #[test]
    fn output_names_follow_scale() {
        let config = PipelineConfig::default();
        let paths = output_paths(Path::new("art/1.png"), None, &config);
        assert_eq!(paths.image, Some(PathBuf::from("art/1_pixelated_0.3.png")));
        assert_eq!(
            paths.colors,
            PathBuf::from("art/1_pixelated_0.3_colors.json")
        );

        let config = PipelineConfig {
            scale_factor: 1.0,
            write_png: false,
            ..PipelineConfig::default()
        };
        let paths = output_paths(Path::new("1.png"), Some(Path::new("out")), &config);
        assert_eq!(paths.image, None);
        assert_eq!(paths.colors, PathBuf::from("out/1_pixelated_1.0_colors.json"));
    }

    #[test]
    fn generated_names_are_recognised() {
        let config = PipelineConfig::default();
        let paths = output_paths(Path::new("art/1.png"), None, &config);
        assert!(is_generated_output(paths.image.as_deref().unwrap()));
        assert!(is_generated_output(&paths.colors));
        assert!(!is_generated_output(Path::new("art/1.png")));
        assert!(!is_generated_output(Path::new("art/pixelated.png")));
    }

    #[test]
    fn process_file_writes_both_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("sprite.png");
        image::RgbaImage::from_pixel(8, 8, image::Rgba([200, 10, 10, 255]))
            .save(&input)
            .unwrap();

        let config = PipelineConfig {
            scale_factor: 1.0,
            pixel_size: 4,
            color_key: ColorKey::C,
            ..PipelineConfig::default()
        };
        let out_dir = dir.path().join("out");
        let paths = process_file(&input, Some(&out_dir), &config).unwrap();

        let png = paths.image.unwrap();
        let decoded = image::open(&png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (2, 2));

        let text = std::fs::read_to_string(&paths.colors).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let records = value.as_array().unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0]["c"], serde_json::json!([0.78, 0.04, 0.04, 1.0]));
    }
}
