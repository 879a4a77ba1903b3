use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::image::is_image_path;

/// Liste triée des images d'un dossier, sous-dossiers compris.
///
/// # Errors
/// Retourne une erreur si le dossier n'existe pas ou ne peut être lu.
///
/// # Example
/// ```no_run
/// use pg_source::folder_batch::scan_images;
/// use std::path::Path;
/// let files = scan_images(Path::new("sprites/")).unwrap();
/// ```
pub fn scan_images(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        anyhow::bail!("Dossier introuvable : {}", folder.display());
    }
    let mut files = Vec::new();
    scan_dir(folder, &mut files)?;
    files.sort();
    log::info!("{} image(s) trouvée(s) dans {}", files.len(), folder.display());
    Ok(files)
}

/// Extrait récursivement les images reconnues.
fn scan_dir(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir).with_context(|| format!("Lecture de {}", dir.display()))? {
        let path = entry?.path();
        if path.is_dir() {
            scan_dir(&path, files)?;
        } else if is_image_path(&path) {
            files.push(path);
        }
    }
    Ok(())
}
