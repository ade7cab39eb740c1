use crate::{
    codec::{CodecOptions, PackedCodec, PlainTextCodec},
    info,
    storage::{archive, packed, Format},
    types::Database,
};

use anyhow::{bail, Context, Result};
use console::style;
use indicatif::HumanBytes;
use std::{fs, io, path::Path};
use tabled::{Alignment, Full, Head, Header, Modify, Style, Table, Tabled};
use xz2::read::XzEncoder;

const fn opts(skip_md5: bool, skip_pgp: bool, var_int: bool) -> CodecOptions {
    CodecOptions {
        skip_md5,
        skip_pgp,
        var_int,
    }
}

const EXPERIMENTS: &[(&str, Format, CodecOptions)] = &[
    ("plain", Format::Text, opts(false, false, false)),
    ("plain_nomd5", Format::Text, opts(true, false, false)),
    ("plain_nopgp", Format::Text, opts(false, true, false)),
    ("plain_nomd5pgp", Format::Text, opts(true, true, false)),
    ("packed", Format::Packed, opts(false, false, false)),
    ("packed_nomd5", Format::Packed, opts(true, false, false)),
    ("packed_nopgp", Format::Packed, opts(false, true, false)),
    ("packed_nomd5pgp", Format::Packed, opts(true, true, false)),
    ("packed_varint_nomd5pgp", Format::Packed, opts(true, true, true)),
];

const XZ_PRESET: u32 = 9;

#[derive(Tabled)]
struct BenchResultRow {
    #[header("Experiment")]
    name: String,
    #[header("Size")]
    size: String,
    #[header("vs. original")]
    ratio: String,
    #[header("xz -9")]
    xz_size: String,
    #[header("vs. original xz")]
    xz_ratio: String,
}

pub fn bench(path: &Path) -> Result<()> {
    let raw = fs::read(path).context(format!("Failed to read {}", path.display()))?;
    let original = archive::decompress(raw.as_slice())?;
    let db = archive::load_from(&PlainTextCodec::default(), original.as_slice())?;
    info!(
        "Using {} packages from {} as sample",
        db.len(),
        style(path.display()).bold()
    );

    let original_size = original.len() as u64;
    let original_xz_size = xz_size(&original)?;
    let original_payload = archive::desc_payload(original.as_slice())?;

    let mut rows = Vec::new();
    for (name, format, options) in EXPERIMENTS {
        info!("Running experiment {}...", style(name).bold());
        let data = encode(*format, *options, &db)?;
        if *name == "plain" {
            check_plain(&original_payload, &data)?;
        }
        let size = data.len() as u64;
        let compressed = xz_size(&data)?;
        rows.push(BenchResultRow {
            name: name.to_string(),
            size: HumanBytes(size).to_string(),
            ratio: compare(original_size, size),
            xz_size: HumanBytes(compressed).to_string(),
            xz_ratio: compare(original_xz_size, compressed),
        });
    }

    let table = Table::new(&rows)
        .with(Header(format!(
            "Size of {} ({}, {} with xz)",
            style(path.display()).bold(),
            HumanBytes(original_size),
            HumanBytes(original_xz_size)
        )))
        .with(Modify::new(Full).with(Alignment::left()))
        .with(Modify::new(Head).with(Alignment::center_horizontal()))
        .with(Modify::new(Full).with(|s: &str| format!(" {} ", s)))
        .with(Style::pseudo_clean());
    println!("{}", table);

    Ok(())
}

/// Serialize `db` the way the experiment stores it on disk
fn encode(format: Format, options: CodecOptions, db: &Database) -> Result<Vec<u8>> {
    match format {
        Format::Text => archive::store_into(&PlainTextCodec::new(options), Vec::new(), db),
        Format::Packed => {
            let mut buf = Vec::new();
            packed::store_into(&PackedCodec::new(options), &mut buf, db)?;
            Ok(buf)
        }
    }
}

/// The regenerated plain archive must carry the same descriptions as the sample
fn check_plain(original_payload: &[u8], archive: &[u8]) -> Result<()> {
    if archive::desc_payload(archive)? != original_payload {
        bail!("Generated plain database differs in content from the original sample");
    }
    Ok(())
}

#[inline]
fn xz_size(data: &[u8]) -> Result<u64> {
    let mut encoder = XzEncoder::new(data, XZ_PRESET);
    Ok(io::copy(&mut encoder, &mut io::sink())?)
}

fn compare(old: u64, new: u64) -> String {
    if old == new {
        "equal".to_string()
    } else if new == 0 || old > new {
        format!("{:.2}x smaller", old as f64 / new.max(1) as f64)
    } else {
        format!("{:.2}x larger", new as f64 / old.max(1) as f64)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::codec::plaintext::test::SAMPLE;

    #[test]
    fn ratios() {
        assert_eq!(compare(100, 100), "equal");
        assert_eq!(compare(300, 100), "3.00x smaller");
        assert_eq!(compare(100, 150), "1.50x larger");
    }

    #[test]
    fn xz_shrinks_repetitive_data() {
        let data = SAMPLE.repeat(50);
        assert!(xz_size(data.as_bytes()).unwrap() < data.len() as u64);
    }

    #[test]
    fn plain_must_reproduce_sample() {
        let text = PlainTextCodec::default();
        let db = Database::from_iter(vec![text.parse_str(SAMPLE).unwrap()]);
        let plain = encode(Format::Text, CodecOptions::default(), &db).unwrap();
        check_plain(SAMPLE.as_bytes(), &plain).unwrap();

        let noncanonical = SAMPLE.replace("\n\n%NAME%", "\n\n\n%NAME%");
        let err = check_plain(noncanonical.as_bytes(), &plain).unwrap_err();
        assert!(err.to_string().contains("differs"));
    }

    #[test]
    fn every_experiment_encodes() {
        let text = PlainTextCodec::default();
        let db = Database::from_iter(vec![text.parse_str(SAMPLE).unwrap(); 10]);
        let sizes: Vec<usize> = EXPERIMENTS
            .iter()
            .map(|(_, format, options)| encode(*format, *options, &db).unwrap().len())
            .collect();
        // packed beats plain, and dropping fields or using varints only helps
        assert!(sizes[4] < sizes[0]);
        assert!(sizes[7] < sizes[4]);
        assert!(sizes[8] < sizes[7]);
    }
}
