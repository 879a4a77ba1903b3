use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use pg_core::config::{ColorKey, Encoding, FilterMode, PipelineConfig};

/// pixgrid — pixelise une image et exporte sa grille en JSON.
#[allow(clippy::struct_excessive_bools)]
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Image source (PNG, JPEG, BMP, GIF).
    pub input: Option<PathBuf>,

    /// Traiter toutes les images d'un dossier (récursif).
    #[arg(long, conflicts_with = "input")]
    pub batch: Option<PathBuf>,

    /// Fichier de configuration TOML. Défaut : config/default.toml.
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Dossier de sortie. Défaut : dossier de l'image source.
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// Côté d'un bloc de pixelisation.
    #[arg(long)]
    pub pixel_size: Option<u32>,

    /// Facteur d'échelle appliqué avant la pixelisation.
    #[arg(long)]
    pub scale: Option<f64>,

    /// Côté d'un bloc pour --merge.
    #[arg(long)]
    pub block_size: Option<u32>,

    /// Floyd–Steinberg par canal.
    #[arg(long, default_value_t = false)]
    pub dither: bool,

    /// Fusionner les blocs uniformes.
    #[arg(long, default_value_t = false)]
    pub merge: bool,

    /// Ré-agrandir la grille pixelisée à la taille d'avant pixelisation.
    #[arg(long, default_value_t = false)]
    pub restore_size: bool,

    /// Encodage des couleurs.
    #[arg(long, value_enum)]
    pub encoding: Option<EncodingArg>,

    /// Règle d'exclusion des pixels.
    #[arg(long, value_enum)]
    pub filter: Option<FilterArg>,

    /// Utiliser la clé courte "c" au lieu de "color".
    #[arg(long, default_value_t = false)]
    pub short_key: bool,

    /// JSON indenté.
    #[arg(long, default_value_t = false)]
    pub pretty: bool,

    /// Ne pas écrire le PNG transformé.
    #[arg(long, default_value_t = false)]
    pub no_png: bool,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

/// `--encoding`
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum EncodingArg {
    Raw,
    Normalized,
}

/// `--filter`
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FilterArg {
    Alpha,
    Sentinel,
    Both,
}

impl From<EncodingArg> for Encoding {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::Raw => Self::Raw,
            EncodingArg::Normalized => Self::Normalized,
        }
    }
}

impl From<FilterArg> for FilterMode {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::Alpha => Self::Alpha,
            FilterArg::Sentinel => Self::Sentinel,
            FilterArg::Both => Self::Both,
        }
    }
}

impl Cli {
    /// Validate that exactly one source is provided.
    ///
    /// # Errors
    /// Returns an error if neither or both of INPUT and --batch are given.
    pub fn validate_source(&self) -> anyhow::Result<()> {
        match (&self.input, &self.batch) {
            (None, None) => {
                anyhow::bail!("Aucune source spécifiée. Donnez une image ou --batch <DOSSIER>.")
            }
            (Some(_), Some(_)) => {
                anyhow::bail!("Une seule source à la fois : une image OU --batch.")
            }
            _ => Ok(()),
        }
    }

    /// Les flags CLI écrasent les valeurs du fichier.
    pub fn apply_overrides(&self, config: &mut PipelineConfig) {
        if let Some(v) = self.pixel_size {
            config.pixel_size = v;
        }
        if let Some(v) = self.scale {
            config.scale_factor = v;
        }
        if let Some(v) = self.block_size {
            config.block_size = v;
        }
        if self.dither {
            config.dither = true;
        }
        if self.merge {
            config.merge_blocks = true;
        }
        if self.restore_size {
            config.restore_size = true;
        }
        if let Some(v) = self.encoding {
            config.encoding = v.into();
        }
        if let Some(v) = self.filter {
            config.filter_mode = v.into();
        }
        if self.short_key {
            config.color_key = ColorKey::C;
        }
        if self.pretty {
            config.pretty = true;
        }
        if self.no_png {
            config.write_png = false;
        }
    }
}
