/// The pacman sync database: a tar archive with one `<name>-<version>/desc` per package
use super::Storage;
use crate::{
    codec::{CodecOptions, PlainTextCodec},
    debug,
    types::Database,
};

use anyhow::{Context, Result};
use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
};
use tar::{Archive, Builder, EntryType, Header};

const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];

pub struct ArchiveStorage {
    path: PathBuf,
    codec: PlainTextCodec,
}

impl ArchiveStorage {
    pub fn new(path: &Path, options: CodecOptions) -> Self {
        ArchiveStorage {
            path: path.to_owned(),
            codec: PlainTextCodec::new(options),
        }
    }

    /// Sync databases are usually shipped as `.db` (gzipped) or `.tar.gz`
    fn compressed(&self) -> bool {
        matches!(
            self.path.extension().and_then(|e| e.to_str()),
            Some("gz") | Some("db")
        )
    }
}

impl Storage for ArchiveStorage {
    fn load(&self) -> Result<Database> {
        let f = File::open(&self.path)
            .context(format!("Failed to open {}", self.path.display()))?;
        let db = load_from(&self.codec, f)
            .context(format!("Failed to read sync database {}", self.path.display()))?;
        debug!("Read {} packages from {}", db.len(), self.path.display());
        Ok(db)
    }

    fn store(&self, db: &Database) -> Result<()> {
        let f = File::create(&self.path)
            .context(format!("Failed to create {}", self.path.display()))?;
        let w = BufWriter::new(f);
        let res = if self.compressed() {
            let gz = store_into(&self.codec, GzEncoder::new(w, Compression::default()), db)?;
            gz.finish()?
        } else {
            store_into(&self.codec, w, db)?
        };
        res.into_inner()
            .map_err(|e| e.into_error())
            .context(format!("Failed to write sync database {}", self.path.display()))?;
        Ok(())
    }
}

/// Whether `path` is a package description, i.e. `<something>/desc`
fn is_desc(path: &Path) -> bool {
    path.file_name().map_or(false, |f| f == "desc")
        && path.parent().map_or(false, |p| !p.as_os_str().is_empty())
}

/// Raw `desc` contents in archive order, with their paths.
/// Gzipped archives are unpacked on the fly.
fn read_descs<R: Read>(r: R) -> Result<Vec<(PathBuf, String)>> {
    let mut r = BufReader::new(r);
    if r.fill_buf()?.starts_with(GZIP_MAGIC) {
        read_tar(GzDecoder::new(r))
    } else {
        read_tar(r)
    }
}

/// The plain tar bytes of an archive that may be gzipped
pub fn decompress<R: Read>(r: R) -> Result<Vec<u8>> {
    let mut r = BufReader::new(r);
    let mut res = Vec::new();
    if r.fill_buf()?.starts_with(GZIP_MAGIC) {
        GzDecoder::new(r).read_to_end(&mut res)?;
    } else {
        r.read_to_end(&mut res)?;
    }
    Ok(res)
}

fn read_tar<R: Read>(r: R) -> Result<Vec<(PathBuf, String)>> {
    let mut tar = Archive::new(r);
    let mut res = Vec::new();
    for file in tar.entries()? {
        let mut file = file?;
        let path = file.path()?.into_owned();
        if !is_desc(&path) {
            continue;
        }
        let mut content = String::new();
        file.read_to_string(&mut content)
            .context(format!("Failed to read {}", path.display()))?;
        res.push((path, content));
    }
    Ok(res)
}

pub fn load_from<R: Read>(codec: &PlainTextCodec, r: R) -> Result<Database> {
    let mut db = Database::new();
    for (path, content) in read_descs(r)? {
        let pkg = codec
            .parse_str(&content)
            .context(format!("Bad package description {}", path.display()))?;
        db.packages.push(pkg);
    }
    Ok(db)
}

/// Concatenated `desc` contents, the same bytes `tar -xOf` would print for a sync database
pub fn desc_payload<R: Read>(r: R) -> Result<Vec<u8>> {
    Ok(read_descs(r)?
        .into_iter()
        .flat_map(|(_, content)| content.into_bytes())
        .collect())
}

/// What [`desc_payload`] returns for the archive [`store_into`] writes
pub fn dump_payload(codec: &PlainTextCodec, db: &Database) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for pkg in db.iter() {
        out.extend_from_slice(codec.dump_string(pkg)?.as_bytes());
    }
    Ok(out)
}

/// Write `db` as an uncompressed tar archive to `w`,
/// giving the writer back once the archive is complete
pub fn store_into<W: Write>(codec: &PlainTextCodec, w: W, db: &Database) -> Result<W> {
    let mut builder = Builder::new(w);
    for pkg in db.iter() {
        let dir = pkg.dir_name();
        let content = codec
            .dump_string(pkg)
            .context(format!("Failed to generate description for {dir}"))?;

        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Directory);
        header.set_size(0);
        header.set_mode(0o755);
        header.set_mtime(0);
        builder.append_data(&mut header, format!("{dir}/"), std::io::empty())?;

        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Regular);
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(0);
        builder.append_data(&mut header, format!("{dir}/desc"), content.as_bytes())?;
    }
    Ok(builder.into_inner()?)
}
