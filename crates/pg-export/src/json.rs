use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use pg_core::config::ColorKey;
use pg_core::record::{ColorRecord, ColorValue};
use serde::Serialize;

/// Forme compacte `{"x", "y", "c"}`.
#[derive(Serialize)]
struct CompactRecord<'a> {
    x: u32,
    y: u32,
    c: &'a ColorValue,
}

/// Options de sérialisation.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonOptions {
    /// Name of the color field.
    pub key: ColorKey,
    /// Indent the output.
    pub pretty: bool,
}

/// Écrit les enregistrements comme un tableau JSON dans `writer`.
///
/// # Errors
/// Returns an error if serialization or the underlying write fails.
///
/// # Example
/// ```
/// use pg_core::config::ColorKey;
/// use pg_core::record::{ColorRecord, ColorValue};
/// use pg_export::json::{write_records, JsonOptions};
///
/// let records = [ColorRecord { x: 1, y: 2, color: ColorValue::Raw([255, 0, 0, 255]) }];
/// let mut out = Vec::new();
/// let opts = JsonOptions { key: ColorKey::C, pretty: false };
/// write_records(&mut out, &records, opts).unwrap();
/// assert_eq!(String::from_utf8(out).unwrap(), r#"[{"x":1,"y":2,"c":[255,0,0,255]}]"#);
/// ```
pub fn write_records<W: Write>(
    writer: W,
    records: &[ColorRecord],
    opts: JsonOptions,
) -> Result<()> {
    match opts.key {
        ColorKey::Color => serialize(writer, records, opts.pretty),
        ColorKey::C => {
            let compact: Vec<CompactRecord<'_>> = records
                .iter()
                .map(|r| CompactRecord {
                    x: r.x,
                    y: r.y,
                    c: &r.color,
                })
                .collect();
            serialize(writer, &compact, opts.pretty)
        }
    }
}

fn serialize<W: Write, T: Serialize + ?Sized>(writer: W, value: &T, pretty: bool) -> Result<()> {
    let result = if pretty {
        serde_json::to_writer_pretty(writer, value)
    } else {
        serde_json::to_writer(writer, value)
    };
    result.context("Sérialisation JSON impossible")
}

/// Sauvegarde les enregistrements dans un fichier JSON (UTF-8).
///
/// # Errors
/// Returns an error if the file cannot be created or written.
pub fn save_records(path: &Path, records: &[ColorRecord], opts: JsonOptions) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Impossible de créer {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_records(&mut writer, records, opts)?;
    writer
        .flush()
        .with_context(|| format!("Écriture de {} interrompue", path.display()))?;
    log::info!("{} enregistrement(s) → {}", records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<ColorRecord> {
        vec![
            ColorRecord {
                x: 0,
                y: 0,
                color: ColorValue::normalized([255, 128, 0, 255]),
            },
            ColorRecord {
                x: 1,
                y: 0,
                color: ColorValue::Raw([1, 2, 3, 4]),
            },
        ]
    }

    #[test]
    fn color_key_output() {
        let mut out = Vec::new();
        write_records(&mut out, &sample(), JsonOptions::default()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            r#"[{"x":0,"y":0,"color":[1.0,0.5,0.0,1.0]},{"x":1,"y":0,"color":[1,2,3,4]}]"#
        );
    }

    #[test]
    fn empty_list_is_empty_array() {
        let mut out = Vec::new();
        write_records(&mut out, &[], JsonOptions::default()).unwrap();
        assert_eq!(out, b"[]");
    }

    #[test]
    fn pretty_output_parses_back() {
        let mut out = Vec::new();
        let opts = JsonOptions {
            key: ColorKey::C,
            pretty: true,
        };
        write_records(&mut out, &sample(), opts).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[1]["c"], serde_json::json!([1, 2, 3, 4]));
        assert!(value[0].get("color").is_none());
    }

    #[test]
    fn saves_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("colors.json");
        save_records(&path, &sample(), JsonOptions::default()).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(2));
        assert_eq!(value[0]["x"], 0);
    }
}
