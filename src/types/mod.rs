mod checksum;

pub use checksum::{from_hex, to_hex, Md5Sum, Sha256Sum, MD5_LEN, SHA256_LEN};

/// Metadata of one package, as found in a sync database `desc` entry.
///
/// Text fields distinguish "absent" from "present", but neither format can
/// carry an empty value: both codecs read an empty value back as `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Package {
    pub filename: Option<String>,
    pub name: Option<String>,
    pub base: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub groups: Vec<String>,
    pub download_size: u64,
    pub install_size: u64,
    pub md5sum: Option<Md5Sum>,
    pub sha256sum: Sha256Sum,
    pub pgpsig: Option<String>,
    pub url: Option<String>,
    pub license: Vec<String>,
    pub arch: Option<String>,
    pub builddate: u64,
    pub packager: Option<String>,
    pub depends: Vec<String>,
    pub optdepends: Vec<String>,
    pub makedepends: Vec<String>,
    pub checkdepends: Vec<String>,
    pub conflicts: Vec<String>,
    pub provides: Vec<String>,
    pub replaces: Vec<String>,
}

impl Package {
    /// `name-version`, the directory a package's `desc` lives in inside a sync database
    pub fn dir_name(&self) -> String {
        format!(
            "{}-{}",
            self.name.as_deref().unwrap_or_default(),
            self.version.as_deref().unwrap_or_default()
        )
    }
}

/// Packages in file order. No deduplication, no lookup by name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Database {
    pub packages: Vec<Package>,
}

impl Database {
    pub fn new() -> Self {
        Database::default()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Package> {
        self.packages.iter()
    }
}

impl FromIterator<Package> for Database {
    fn from_iter<I: IntoIterator<Item = Package>>(iter: I) -> Self {
        Database {
            packages: iter.into_iter().collect(),
        }
    }
}
