//! Physical line counting: the number of `\n` bytes in a file, like `wc -l`.

use std::fs::File;
use std::io::{self, ErrorKind, Read};
use std::path::Path;

/// Read size for each chunk; memory use does not grow with file size.
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// Count newline bytes in the file at `path`.
///
/// Contents are never decoded, so binary files are fine. Trailing text after
/// the last newline does not add a line.
pub fn count_newlines(path: &Path) -> io::Result<u64> {
    let file = File::open(path)?;
    count_newlines_in(file, CHUNK_SIZE)
}

/// Count newline bytes from any reader, `chunk_size` bytes at a time.
pub fn count_newlines_in<R: Read>(mut reader: R, chunk_size: usize) -> io::Result<u64> {
    let mut buffer = vec![0u8; chunk_size.max(1)];
    let mut total = 0u64;
    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        total += bytecount::count(&buffer[..read], b'\n') as u64;
    }
    Ok(total)
}
