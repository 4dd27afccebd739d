pub mod fasta;
pub mod gxf;
pub mod output;
pub mod snv;

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Whether `path` starts with the gzip magic bytes.
pub fn is_gzipped<P: AsRef<Path>>(path: P) -> io::Result<bool> {
    let mut f = File::open(path)?;
    let mut magic = [0u8; 2];
    let mut n = 0;
    while n < magic.len() {
        match f.read(&mut magic[n..])? {
            0 => break,
            k => n += k,
        }
    }
    Ok(n == magic.len() && magic == GZIP_MAGIC)
}

/// Open a plain or gzip-compressed file for buffered reading.
pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let gz = is_gzipped(path)?;
    let f = File::open(path)?;
    if gz {
        log::debug!("reading {} as gzip", path.display());
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(f))))
    } else {
        Ok(Box::new(BufReader::new(f)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use flate2::write::GzEncoder;
    use flate2::Compression;
    use tempfile::NamedTempFile;

    #[test]
    fn test_open_plain_and_gzip() {
        let mut plain = NamedTempFile::new().unwrap();
        write!(plain, ">s1\nACGT\n").unwrap();
        plain.flush().unwrap();

        let mut gz = NamedTempFile::new().unwrap();
        {
            let mut enc = GzEncoder::new(gz.as_file_mut(), Compression::default());
            enc.write_all(b">s1\nACGT\n").unwrap();
            enc.finish().unwrap();
        }

        assert!(!is_gzipped(plain.path()).unwrap());
        assert!(is_gzipped(gz.path()).unwrap());

        for path in [plain.path(), gz.path()].iter() {
            let mut text = String::new();
            open(path).unwrap().read_to_string(&mut text).unwrap();
            assert_eq!(text, ">s1\nACGT\n");
        }
    }

    #[test]
    fn test_short_file_is_plain() {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "A").unwrap();
        f.flush().unwrap();
        assert!(!is_gzipped(f.path()).unwrap());
    }
}
