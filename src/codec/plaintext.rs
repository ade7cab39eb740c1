/// Parse and generate pacman style package descriptions (the `desc` files of a sync database)
use super::{Codec, CodecOptions, Error, Result};
use crate::types::{from_hex, to_hex, Package, MD5_LEN, SHA256_LEN};

use nom::{
    character::complete::{alphanumeric1, char},
    combinator::eof,
    IResult,
};
use std::io::{BufRead, Write};

/// How the value lines of a block end up in a [`Package`]
enum Field {
    Text(fn(&mut Package) -> &mut Option<String>),
    Integer(fn(&mut Package) -> &mut u64),
    // Decodes the hex value into the right checksum slot
    Checksum(fn(&mut Package, &str) -> Result<()>),
    List(fn(&mut Package) -> &mut Vec<String>),
}

const FIELDS: &[(&str, Field)] = &[
    ("FILENAME", Field::Text(|p| &mut p.filename)),
    ("NAME", Field::Text(|p| &mut p.name)),
    ("BASE", Field::Text(|p| &mut p.base)),
    ("VERSION", Field::Text(|p| &mut p.version)),
    ("DESC", Field::Text(|p| &mut p.description)),
    ("GROUPS", Field::List(|p| &mut p.groups)),
    ("CSIZE", Field::Integer(|p| &mut p.download_size)),
    ("ISIZE", Field::Integer(|p| &mut p.install_size)),
    (
        "MD5SUM",
        Field::Checksum(|p, s| {
            p.md5sum = Some(from_hex::<MD5_LEN>("md5sum", s)?);
            Ok(())
        }),
    ),
    (
        "SHA256SUM",
        Field::Checksum(|p, s| {
            p.sha256sum = from_hex::<SHA256_LEN>("sha256sum", s)?;
            Ok(())
        }),
    ),
    ("PGPSIG", Field::Text(|p| &mut p.pgpsig)),
    ("URL", Field::Text(|p| &mut p.url)),
    ("LICENSE", Field::List(|p| &mut p.license)),
    ("ARCH", Field::Text(|p| &mut p.arch)),
    ("BUILDDATE", Field::Integer(|p| &mut p.builddate)),
    ("PACKAGER", Field::Text(|p| &mut p.packager)),
    ("REPLACES", Field::List(|p| &mut p.replaces)),
    ("CONFLICTS", Field::List(|p| &mut p.conflicts)),
    ("PROVIDES", Field::List(|p| &mut p.provides)),
    ("DEPENDS", Field::List(|p| &mut p.depends)),
    ("OPTDEPENDS", Field::List(|p| &mut p.optdepends)),
    ("MAKEDEPENDS", Field::List(|p| &mut p.makedepends)),
    ("CHECKDEPENDS", Field::List(|p| &mut p.checkdepends)),
];

/// Parse the key line of a paragraph, like `%NAME%`
fn parse_key(i: &str) -> IResult<&str, &str> {
    let (i, _) = char('%')(i)?;
    let (i, key) = alphanumeric1(i)?;
    let (i, _) = char('%')(i)?;
    let (i, _) = eof(i)?;

    Ok((i, key))
}

/// The lines of a description, walked one paragraph at a time
struct Paragraphs<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> Paragraphs<'a> {
    fn new(i: &'a str) -> Self {
        Paragraphs {
            lines: i.split('\n').collect(),
            pos: 0,
        }
    }

    /// Next run of non-empty lines, skipping the empty lines in between
    fn next_paragraph(&mut self) -> Option<&[&'a str]> {
        while self.pos < self.lines.len() && self.lines[self.pos].is_empty() {
            self.pos += 1;
        }
        if self.pos == self.lines.len() {
            return None;
        }
        let start = self.pos;
        while self.pos < self.lines.len() && !self.lines[self.pos].is_empty() {
            self.pos += 1;
        }
        Some(&self.lines[start..self.pos])
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PlainTextCodec {
    options: CodecOptions,
}

impl PlainTextCodec {
    pub fn new(options: CodecOptions) -> Self {
        PlainTextCodec { options }
    }

    pub fn parse_str(&self, i: &str) -> Result<Package> {
        let mut pkg = Package::default();
        let mut paragraphs = Paragraphs::new(i);
        while let Some(paragraph) = paragraphs.next_paragraph() {
            // A paragraph is never empty
            let (header, values) = paragraph.split_at(1);
            let key = match parse_key(header[0]) {
                Ok((_, key)) => key,
                Err(e) => {
                    return Err(Error::Grammar(format!(
                        "bad field header {:?}: {e}",
                        header[0]
                    )))
                }
            };
            let field = FIELDS
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, field)| field)
                .ok_or_else(|| Error::Grammar(format!("unknown field %{key}%")))?;

            match field {
                Field::List(slot) => {
                    *slot(&mut pkg) = values.iter().map(|s| s.to_string()).collect();
                }
                Field::Text(slot) => {
                    *slot(&mut pkg) = scalar(key, values)?.map(str::to_owned);
                }
                Field::Integer(slot) => {
                    let value = required(key, values)?;
                    *slot(&mut pkg) = value.parse().map_err(|_| {
                        Error::Grammar(format!("non-numeric value {value:?} for %{key}%"))
                    })?;
                }
                Field::Checksum(set) => set(&mut pkg, required(key, values)?)?,
            }
        }

        Ok(pkg)
    }

    pub fn dump_string(&self, pkg: &Package) -> Result<String> {
        let mut out = String::new();

        text(&mut out, "FILENAME", pkg.filename.as_deref())?;
        text(&mut out, "NAME", pkg.name.as_deref())?;
        optional_text(&mut out, "BASE", pkg.base.as_deref())?;
        text(&mut out, "VERSION", pkg.version.as_deref())?;
        text(&mut out, "DESC", pkg.description.as_deref())?;
        list(&mut out, "GROUPS", &pkg.groups)?;
        text(&mut out, "CSIZE", Some(pkg.download_size.to_string().as_str()))?;
        text(&mut out, "ISIZE", Some(pkg.install_size.to_string().as_str()))?;
        if !self.options.skip_md5 {
            let md5 = pkg.md5sum.as_ref().ok_or(Error::SizeMismatch {
                field: "md5sum",
                expected: MD5_LEN,
                actual: 0,
            })?;
            text(&mut out, "MD5SUM", Some(to_hex(md5).as_str()))?;
        }
        text(&mut out, "SHA256SUM", Some(to_hex(&pkg.sha256sum).as_str()))?;
        if !self.options.skip_pgp {
            text(&mut out, "PGPSIG", pkg.pgpsig.as_deref())?;
        }
        optional_text(&mut out, "URL", pkg.url.as_deref())?;
        list(&mut out, "LICENSE", &pkg.license)?;
        text(&mut out, "ARCH", pkg.arch.as_deref())?;
        text(&mut out, "BUILDDATE", Some(pkg.builddate.to_string().as_str()))?;
        text(&mut out, "PACKAGER", pkg.packager.as_deref())?;
        list(&mut out, "REPLACES", &pkg.replaces)?;
        list(&mut out, "CONFLICTS", &pkg.conflicts)?;
        list(&mut out, "PROVIDES", &pkg.provides)?;
        list(&mut out, "DEPENDS", &pkg.depends)?;
        list(&mut out, "OPTDEPENDS", &pkg.optdepends)?;
        list(&mut out, "MAKEDEPENDS", &pkg.makedepends)?;
        list(&mut out, "CHECKDEPENDS", &pkg.checkdepends)?;

        Ok(out)
    }
}

impl Codec for PlainTextCodec {
    fn parse<R: BufRead>(&self, r: &mut R) -> Result<Package> {
        let mut content = String::new();
        r.read_to_string(&mut content)?;
        self.parse_str(&content)
    }

    fn dump<W: Write>(&self, w: &mut W, pkg: &Package) -> Result<()> {
        w.write_all(self.dump_string(pkg)?.as_bytes())?;
        Ok(())
    }
}

/// Value of a single-line field. A field without value lines is absent.
fn scalar<'a>(key: &str, values: &[&'a str]) -> Result<Option<&'a str>> {
    if values.len() > 1 {
        return Err(Error::Grammar(format!(
            "unhandled lines {:?} after %{key}%",
            &values[1..]
        )));
    }
    Ok(values.first().copied())
}

fn required<'a>(key: &str, values: &[&'a str]) -> Result<&'a str> {
    scalar(key, values)?.ok_or_else(|| Error::Grammar(format!("missing value for %{key}%")))
}

fn check_line(key: &'static str, line: &str) -> Result<()> {
    if line.contains(|c: char| c == '\n' || c == '\0') {
        return Err(Error::EmbeddedTerminator(key));
    }
    Ok(())
}

/// Every block ends with an empty line, so the record ends with two newlines
fn text(out: &mut String, key: &'static str, value: Option<&str>) -> Result<()> {
    out.push('%');
    out.push_str(key);
    out.push_str("%\n");
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        check_line(key, value)?;
        out.push_str(value);
        out.push('\n');
    }
    out.push('\n');
    Ok(())
}

fn optional_text(out: &mut String, key: &'static str, value: Option<&str>) -> Result<()> {
    match value {
        Some(v) if !v.is_empty() => text(out, key, Some(v)),
        _ => Ok(()),
    }
}

fn list(out: &mut String, key: &'static str, values: &[String]) -> Result<()> {
    if values.is_empty() {
        return Ok(());
    }
    out.push('%');
    out.push_str(key);
    out.push_str("%\n");
    for value in values {
        // An empty element would end the block early
        if value.is_empty() {
            return Err(Error::EmbeddedTerminator(key));
        }
        check_line(key, value)?;
        out.push_str(value);
        out.push('\n');
    }
    out.push('\n');
    Ok(())
}
