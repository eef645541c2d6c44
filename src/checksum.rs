use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::Context;
use crc32fast::Hasher as Crc32;
use md5::{Digest as Md5Digest, Md5};
use sha1_smol::Sha1;
use sha2::Sha256;

use crate::types::Checksum;

const STREAM_CHUNK_SIZE: usize = 512 * 1024; // 512 KiB chunks to better utilize disk I/O

fn stream_into<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
    mut update: impl FnMut(&[u8]),
) -> anyhow::Result<u64> {
    let mut processed: u64 = 0;
    loop {
        let n = reader.read(buf)?;
        if n == 0 {
            break;
        }
        processed = processed.saturating_add(n as u64);
        update(&buf[..n]);
    }

    Ok(processed)
}

/// Stream `reader` through the selected hasher and return the lowercase hex
/// digest along with the number of bytes consumed. Deterministic and
/// content-only: file metadata never influences the result.
pub fn compute_fingerprint_stream<R: Read>(
    mut reader: R,
    algorithm: Checksum,
) -> anyhow::Result<(String, u64)> {
    let mut buf = vec![0u8; STREAM_CHUNK_SIZE];

    match algorithm {
        Checksum::Crc32 => {
            let mut h = Crc32::new();
            let processed = stream_into(&mut reader, &mut buf, |slice| h.update(slice))?;
            Ok((format!("{:08x}", h.finalize()), processed))
        }
        Checksum::Md5 => {
            let mut h = Md5::new();
            let processed = stream_into(&mut reader, &mut buf, |slice| h.update(slice))?;
            Ok((format!("{:032x}", h.finalize()), processed))
        }
        Checksum::Sha1 => {
            let mut h = Sha1::new();
            let processed = stream_into(&mut reader, &mut buf, |slice| h.update(slice))?;
            Ok((h.digest().to_string(), processed))
        }
        Checksum::Sha256 => {
            let mut h = Sha256::new();
            let processed = stream_into(&mut reader, &mut buf, |slice| h.update(slice))?;
            Ok((format!("{:064x}", h.finalize()), processed))
        }
    }
}

/// Fingerprint a file on disk. Failure to open here is fatal to the caller's
/// run; skippable conditions are decided before this point.
pub fn compute_fingerprint(path: &Path, algorithm: Checksum) -> anyhow::Result<(String, u64)> {
    let file =
        File::open(path).with_context(|| format!("opening file for hashing: {path:?}"))?;
    compute_fingerprint_stream(file, algorithm)
}

/// Fingerprint an in-memory buffer. Mirrors `compute_fingerprint_stream`.
pub fn compute_fingerprint_from_bytes(buf: &[u8], algorithm: Checksum) -> anyhow::Result<String> {
    let cursor = std::io::Cursor::new(buf);
    let (digest, _) = compute_fingerprint_stream(cursor, algorithm)?;
    Ok(digest)
}
