use std::fs::File;
use std::io::{self, Read};

use adler32::RollingAdler32;
use camino::Utf8Path;
use md5::{Digest, Md5};

use crate::domain::{Adler32Digest, Md5Digest};
use crate::error::RegError;

// Large inputs are streamed; this bounds memory regardless of file size.
const CHUNK_SIZE: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDigests {
    pub size_bytes: u64,
    pub md5: Md5Digest,
    pub adler32: Adler32Digest,
}

pub fn digest_file(path: &Utf8Path) -> Result<FileDigests, RegError> {
    let file = File::open(path.as_std_path())
        .map_err(|err| RegError::Filesystem(format!("open {path}: {err}")))?;
    digest_stream(file, CHUNK_SIZE)
}

pub fn digest_stream<R: Read>(mut reader: R, chunk_size: usize) -> Result<FileDigests, RegError> {
    let mut md5 = Md5::new();
    let mut adler = RollingAdler32::new();
    let mut size_bytes = 0u64;
    let mut buffer = vec![0u8; chunk_size.max(1)];
    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(RegError::Filesystem(err.to_string())),
        };
        md5.update(&buffer[..read]);
        adler.update_buffer(&buffer[..read]);
        size_bytes += read as u64;
    }
    Ok(FileDigests {
        size_bytes,
        md5: Md5Digest::from_digest(md5.finalize().into()),
        adler32: Adler32Digest::from_value(adler.hash()),
    })
}
