//! Archive extraction. The spec treats the extraction primitive as an
//! external collaborator (out of scope); this module defines the seam as a
//! trait and ships one concrete implementation — gzipped tar, the format
//! packages are actually distributed in — so the rest of the installer can
//! be exercised without a real mirror.

use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to open archive {path:?}: {source}")]
    Open {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to extract archive {path:?} to {dest:?}: {source}")]
    Unpack {
        path: std::path::PathBuf,
        dest: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub trait Extractor {
    fn extract(&self, archive: &Path, dest: &Path) -> Result<(), ExtractError>;
}

/// Extracts `.tar.gz` archives, the format produced by the distribution
/// mirror for every supported platform/arch pair.
#[derive(Debug, Default, Clone, Copy)]
pub struct TarGzExtractor;

impl Extractor for TarGzExtractor {
    fn extract(&self, archive: &Path, dest: &Path) -> Result<(), ExtractError> {
        let file = std::fs::File::open(archive).map_err(|source| ExtractError::Open {
            path: archive.to_path_buf(),
            source,
        })?;
        let decoder = flate2::read::GzDecoder::new(file);
        let mut tar = tar::Archive::new(decoder);
        tar.unpack(dest).map_err(|source| ExtractError::Unpack {
            path: archive.to_path_buf(),
            dest: dest.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_archive(path: &Path) {
        let file = std::fs::File::create(path).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        let mut header = tar::Header::new_gnu();
        header.set_size(5);
        header.set_cksum();
        builder.append_data(&mut header, "bin/hello", "hello".as_bytes()).unwrap();
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn extracts_a_tar_gz_archive() {
        let dir = tempfile::tempdir().unwrap();
        let archive_path = dir.path().join("package.tar.gz");
        make_archive(&archive_path);

        let dest = dir.path().join("out");
        std::fs::create_dir_all(&dest).unwrap();
        TarGzExtractor.extract(&archive_path, &dest).unwrap();

        let extracted = std::fs::read_to_string(dest.join("bin/hello")).unwrap();
        assert_eq!(extracted, "hello");
    }
}
