//! The packed package format.
//!
//! Records are written back to back with no length or count prefix, and fields
//! carry no tags. A reader has to walk the fields in exactly the order below,
//! with the same [`CodecOptions`] the writer used. A mismatch is not detected:
//! everything after the first disagreeing field is read from the wrong offset.
//!
//! ```text
//! filename\0 name\0 base\0 version\0 description\0 [count][groups..]
//! download_size install_size [md5:16]? sha256:32 [pgpsig\0]? url\0
//! [count][license..] arch\0 builddate packager\0 [count][replaces..]
//! [count][conflicts..] [count][provides..] [count][depends..]
//! [count][optdepends..] [count][makedepends..] [count][checkdepends..]
//! ```
//!
//! Integers are native endian u64, or varints when `var_int` is set. Counts are
//! a single byte, or a varint when `var_int` is set, and never exceed 255.
use super::{varint, Codec, CodecOptions, Error, Result};
use crate::types::{Package, MD5_LEN, SHA256_LEN};

use byteorder::{NativeEndian, ReadBytesExt, WriteBytesExt};
use std::io::{BufRead, Write};

pub const MAX_LIST_LEN: usize = u8::MAX as usize;

#[derive(Clone, Copy, Debug, Default)]
pub struct PackedCodec {
    options: CodecOptions,
}

impl PackedCodec {
    pub fn new(options: CodecOptions) -> Self {
        PackedCodec { options }
    }

    /// NUL terminated; an absent string is written as the terminator alone
    fn write_string<W: Write>(
        &self,
        w: &mut W,
        field: &'static str,
        s: Option<&str>,
    ) -> Result<()> {
        if let Some(s) = s {
            if s.as_bytes().contains(&0) {
                return Err(Error::EmbeddedTerminator(field));
            }
            w.write_all(s.as_bytes())?;
        }
        w.write_u8(0)?;
        Ok(())
    }

    fn write_list<W: Write>(&self, w: &mut W, field: &'static str, list: &[String]) -> Result<()> {
        if list.len() > MAX_LIST_LEN {
            return Err(Error::Overflow {
                field,
                len: list.len(),
            });
        }
        if self.options.var_int {
            varint::write_varint(w, list.len() as u64)?;
        } else {
            w.write_u8(list.len() as u8)?;
        }
        for s in list {
            self.write_string(w, field, Some(s))?;
        }
        Ok(())
    }

    fn write_int<W: Write>(&self, w: &mut W, n: u64) -> Result<()> {
        if self.options.var_int {
            varint::write_varint(w, n)?;
        } else {
            w.write_u64::<NativeEndian>(n)?;
        }
        Ok(())
    }

    fn read_string<R: BufRead>(&self, r: &mut R, field: &'static str) -> Result<Option<String>> {
        let mut buf = Vec::new();
        r.read_until(0, &mut buf)?;
        if buf.pop() != Some(0) {
            return Err(Error::Truncated(field));
        }
        if buf.is_empty() {
            return Ok(None);
        }
        String::from_utf8(buf)
            .map(Some)
            .map_err(|_| Error::Utf8(field))
    }

    fn read_list<R: BufRead>(&self, r: &mut R, field: &'static str) -> Result<Vec<String>> {
        let len = if self.options.var_int {
            let len = varint::read_varint(r, field)?;
            if len > MAX_LIST_LEN as u64 {
                return Err(Error::Overflow {
                    field,
                    len: len as usize,
                });
            }
            len as usize
        } else {
            r.read_u8().map_err(|e| Error::from_read(field, e))? as usize
        };

        let mut list = Vec::with_capacity(len);
        for _ in 0..len {
            list.push(self.read_string(r, field)?.unwrap_or_default());
        }
        Ok(list)
    }

    fn read_int<R: BufRead>(&self, r: &mut R, field: &'static str) -> Result<u64> {
        if self.options.var_int {
            varint::read_varint(r, field)
        } else {
            r.read_u64::<NativeEndian>()
                .map_err(|e| Error::from_read(field, e))
        }
    }

    fn read_fixed<R: BufRead, const N: usize>(
        &self,
        r: &mut R,
        field: &'static str,
    ) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        r.read_exact(&mut buf)
            .map_err(|e| Error::from_read(field, e))?;
        Ok(buf)
    }
}

impl Codec for PackedCodec {
    fn parse<R: BufRead>(&self, r: &mut R) -> Result<Package> {
        let mut pkg = Package {
            filename: self.read_string(r, "filename")?,
            name: self.read_string(r, "name")?,
            base: self.read_string(r, "base")?,
            version: self.read_string(r, "version")?,
            description: self.read_string(r, "description")?,
            groups: self.read_list(r, "groups")?,
            download_size: self.read_int(r, "download_size")?,
            install_size: self.read_int(r, "install_size")?,
            ..Default::default()
        };
        if !self.options.skip_md5 {
            pkg.md5sum = Some(self.read_fixed::<_, MD5_LEN>(r, "md5sum")?);
        }
        pkg.sha256sum = self.read_fixed::<_, SHA256_LEN>(r, "sha256sum")?;
        if !self.options.skip_pgp {
            pkg.pgpsig = self.read_string(r, "pgpsig")?;
        }
        pkg.url = self.read_string(r, "url")?;
        pkg.license = self.read_list(r, "license")?;
        pkg.arch = self.read_string(r, "arch")?;
        pkg.builddate = self.read_int(r, "builddate")?;
        pkg.packager = self.read_string(r, "packager")?;
        pkg.replaces = self.read_list(r, "replaces")?;
        pkg.conflicts = self.read_list(r, "conflicts")?;
        pkg.provides = self.read_list(r, "provides")?;
        pkg.depends = self.read_list(r, "depends")?;
        pkg.optdepends = self.read_list(r, "optdepends")?;
        pkg.makedepends = self.read_list(r, "makedepends")?;
        pkg.checkdepends = self.read_list(r, "checkdepends")?;

        Ok(pkg)
    }

    fn dump<W: Write>(&self, w: &mut W, pkg: &Package) -> Result<()> {
        self.write_string(w, "filename", pkg.filename.as_deref())?;
        self.write_string(w, "name", pkg.name.as_deref())?;
        self.write_string(w, "base", pkg.base.as_deref())?;
        self.write_string(w, "version", pkg.version.as_deref())?;
        self.write_string(w, "description", pkg.description.as_deref())?;
        self.write_list(w, "groups", &pkg.groups)?;
        self.write_int(w, pkg.download_size)?;
        self.write_int(w, pkg.install_size)?;
        if !self.options.skip_md5 {
            let md5 = pkg.md5sum.as_ref().ok_or(Error::SizeMismatch {
                field: "md5sum",
                expected: MD5_LEN,
                actual: 0,
            })?;
            w.write_all(md5)?;
        }
        w.write_all(&pkg.sha256sum)?;
        if !self.options.skip_pgp {
            self.write_string(w, "pgpsig", pkg.pgpsig.as_deref())?;
        }
        self.write_string(w, "url", pkg.url.as_deref())?;
        self.write_list(w, "license", &pkg.license)?;
        self.write_string(w, "arch", pkg.arch.as_deref())?;
        self.write_int(w, pkg.builddate)?;
        self.write_string(w, "packager", pkg.packager.as_deref())?;
        self.write_list(w, "replaces", &pkg.replaces)?;
        self.write_list(w, "conflicts", &pkg.conflicts)?;
        self.write_list(w, "provides", &pkg.provides)?;
        self.write_list(w, "depends", &pkg.depends)?;
        self.write_list(w, "optdepends", &pkg.optdepends)?;
        self.write_list(w, "makedepends", &pkg.makedepends)?;
        self.write_list(w, "checkdepends", &pkg.checkdepends)?;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::codec::plaintext::{test::SAMPLE, PlainTextCodec};

    fn opts(skip_md5: bool, skip_pgp: bool, var_int: bool) -> CodecOptions {
        CodecOptions {
            skip_md5,
            skip_pgp,
            var_int,
        }
    }

    fn dump(codec: &PackedCodec, pkg: &Package) -> Vec<u8> {
        let mut buf = Vec::new();
        codec.dump(&mut buf, pkg).unwrap();
        buf
    }

    fn sample() -> Package {
        PlainTextCodec::default().parse_str(SAMPLE).unwrap()
    }

    #[test]
    fn minimal_package() {
        let pkg = Package {
            name: Some("pkg".to_string()),
            version: Some("1.0".to_string()),
            sha256sum: [0; 32],
            depends: vec!["a".to_string(), "b".to_string()],
            ..Default::default()
        };
        let codec = PackedCodec::new(opts(true, true, false));
        let buf = dump(&codec, &pkg);
        let parsed = codec.parse(&mut buf.as_slice()).unwrap();
        assert_eq!(parsed, pkg);
    }

    #[test]
    fn round_trip_all_options() {
        let pkg = sample();
        for skip_md5 in [false, true] {
            for skip_pgp in [false, true] {
                for var_int in [false, true] {
                    let codec = PackedCodec::new(opts(skip_md5, skip_pgp, var_int));
                    let buf = dump(&codec, &pkg);
                    let mut rest = buf.as_slice();
                    let parsed = codec.parse(&mut rest).unwrap();
                    assert!(rest.is_empty());

                    let mut expected = pkg.clone();
                    if skip_md5 {
                        expected.md5sum = None;
                    }
                    if skip_pgp {
                        expected.pgpsig = None;
                    }
                    assert_eq!(parsed, expected);
                }
            }
        }
    }

    #[test]
    fn layout() {
        let pkg = Package {
            name: Some("a".to_string()),
            download_size: 300,
            sha256sum: [0xee; 32],
            license: vec!["MIT".to_string()],
            ..Default::default()
        };
        let buf = dump(&PackedCodec::new(opts(true, true, true)), &pkg);
        let mut expected = vec![0, b'a', 0, 0, 0, 0, 0, 0xac, 0x02, 0];
        expected.extend_from_slice(&[0xee; 32]);
        expected.extend_from_slice(&[0, 1, b'M', b'I', b'T', 0, 0, 0, 0]);
        expected.extend_from_slice(&[0; 7]);
        assert_eq!(buf, expected);

        let fixed = dump(&PackedCodec::new(opts(true, true, false)), &pkg);
        assert_eq!(fixed.len(), expected.len() + 3 * 8 - 4);
        assert_eq!(&fixed[7..15], &300u64.to_ne_bytes());
    }

    #[test]
    fn absent_and_empty_strings() {
        let codec = PackedCodec::new(opts(true, false, false));
        let pkg = Package {
            base: Some(String::new()),
            url: None,
            ..Default::default()
        };
        let buf = dump(&codec, &pkg);
        let parsed = codec.parse(&mut buf.as_slice()).unwrap();
        assert_eq!(parsed.base, None);
        assert_eq!(parsed.url, None);
        assert_eq!(parsed.pgpsig, None);
    }

    #[test]
    fn list_cap() {
        let full: Vec<String> = (0..255).map(|i| i.to_string()).collect();
        for var_int in [false, true] {
            let codec = PackedCodec::new(opts(true, true, var_int));
            let pkg = Package {
                depends: full.clone(),
                ..Default::default()
            };
            let parsed = codec.parse(&mut dump(&codec, &pkg).as_slice()).unwrap();
            assert_eq!(parsed.depends, full);

            let mut too_long = full.clone();
            too_long.push("255".to_string());
            let mut buf = Vec::new();
            assert!(matches!(
                codec.write_list(&mut buf, "depends", &too_long),
                Err(Error::Overflow {
                    field: "depends",
                    len: 256
                })
            ));
            assert!(buf.is_empty());

            let pkg = Package {
                depends: too_long,
                ..Default::default()
            };
            assert!(codec.dump(&mut Vec::new(), &pkg).is_err());
        }
    }

    #[test]
    fn skip_md5_mismatch() {
        let pkg = Package {
            sha256sum: [0xab; 32],
            ..Default::default()
        };
        let writer = PackedCodec::new(opts(true, false, false));
        let mut buf = dump(&writer, &pkg);
        buf.extend(dump(&writer, &pkg));

        // Nothing in the stream tells the reader that md5sum was left out
        let reader = PackedCodec::new(opts(false, false, false));
        let misread = reader.parse(&mut buf.as_slice()).unwrap();
        assert_eq!(misread.md5sum, Some([0xab; 16]));
        assert_ne!(misread.sha256sum, pkg.sha256sum);
        assert_ne!(misread, pkg);
    }

    #[test]
    fn truncated() {
        let codec = PackedCodec::default();
        let mut buf = dump(&codec, &sample());
        buf.pop();
        assert!(matches!(
            codec.parse(&mut buf.as_slice()),
            Err(Error::Truncated("checkdepends"))
        ));
        buf.truncate(20);
        assert!(matches!(
            codec.parse(&mut buf.as_slice()),
            Err(Error::Truncated(_))
        ));
        assert!(matches!(
            codec.parse(&mut &b"abc"[..]),
            Err(Error::Truncated("filename"))
        ));
    }

    #[test]
    fn bad_values() {
        let codec = PackedCodec::new(opts(true, true, false));
        let pkg = Package {
            description: Some("nul\0inside".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            codec.dump(&mut Vec::new(), &pkg),
            Err(Error::EmbeddedTerminator("description"))
        ));

        let no_md5 = PackedCodec::default();
        assert!(matches!(
            no_md5.dump(&mut Vec::new(), &Package::default()),
            Err(Error::SizeMismatch {
                field: "md5sum",
                ..
            })
        ));

        assert!(matches!(
            codec.parse(&mut &b"\xff\xfe\0"[..]),
            Err(Error::Utf8("filename"))
        ));
    }

    #[test]
    fn varint_is_smaller() {
        let pkg = sample();
        let fixed = dump(&PackedCodec::new(opts(true, true, false)), &pkg);
        let var = dump(&PackedCodec::new(opts(true, true, true)), &pkg);
        assert!(var.len() < fixed.len());
    }
}
