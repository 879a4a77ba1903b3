use std::path::{Path, PathBuf};

use anyhow::Result;
use pg_core::config::PipelineConfig;
use pg_source::folder_batch::scan_images;

use crate::pipeline::{OutputPaths, is_generated_output, process_file};

/// Bilan d'un traitement par lots.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Outputs of every image that went through.
    pub written: Vec<OutputPaths>,
    /// Number of images that failed.
    pub failed: usize,
}

/// Traite chaque image de `folder`, séquentiellement.
///
/// Les sorties d'un passage précédent (`*_pixelated_*`) sont ignorées. Avec
/// `out_dir`, l'arborescence relative à `folder` est reproduite pour que deux
/// images de même nom dans des sous-dossiers différents ne s'écrasent pas.
/// Une image en échec est journalisée et comptée ; les suivantes sont
/// quand même traitées.
///
/// # Errors
/// Retourne une erreur si le dossier ne peut être parcouru.
pub fn run_batch(
    folder: &Path,
    out_dir: Option<&Path>,
    config: &PipelineConfig,
) -> Result<BatchReport> {
    let (files, previous): (Vec<PathBuf>, Vec<PathBuf>) = scan_images(folder)?
        .into_iter()
        .partition(|f| !is_generated_output(f));
    if !previous.is_empty() {
        log::info!("{} sortie(s) existante(s) ignorée(s)", previous.len());
    }
    if files.is_empty() {
        log::warn!("Aucune image dans {}", folder.display());
    }

    let mut report = BatchReport::default();
    for (i, file) in files.iter().enumerate() {
        log::info!("[{}/{}] {}", i + 1, files.len(), file.display());
        let target = out_dir.map(|dir| mirrored_dir(dir, folder, file));
        match process_file(file, target.as_deref(), config) {
            Ok(paths) => report.written.push(paths),
            Err(e) => {
                log::error!("{}: {e:#}", file.display());
                report.failed += 1;
            }
        }
    }
    Ok(report)
}

/// `out_dir` + chemin du dossier de `file` relatif à `root`.
fn mirrored_dir(out_dir: &Path, root: &Path, file: &Path) -> PathBuf {
    match file.parent().and_then(|p| p.strip_prefix(root).ok()) {
        Some(rel) if !rel.as_os_str().is_empty() => out_dir.join(rel),
        _ => out_dir.to_path_buf(),
    }
}
