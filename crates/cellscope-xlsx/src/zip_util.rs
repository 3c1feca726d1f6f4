use std::io::{Read, Seek};

use thiserror::Error;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::{ContainerError, SheetError};

/// Failure while inflating a single ZIP part.
#[derive(Debug, Error)]
pub(crate) enum PartReadError {
    #[error("zip error: {0}")]
    Zip(#[from] ZipError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{part} is {size} bytes (max {max} bytes)")]
    TooLarge { part: String, size: u64, max: u64 },
}

impl From<PartReadError> for ContainerError {
    fn from(err: PartReadError) -> Self {
        match err {
            PartReadError::Zip(err) => ContainerError::Zip(err),
            PartReadError::Io(err) => ContainerError::Io(err),
            PartReadError::TooLarge { part, size, max } => {
                ContainerError::PartTooLarge { part, size, max }
            }
        }
    }
}

impl From<PartReadError> for SheetError {
    fn from(err: PartReadError) -> Self {
        match err {
            PartReadError::Zip(err) => SheetError::Zip(err),
            PartReadError::Io(err) => SheetError::Io(err),
            PartReadError::TooLarge { part, size, max } => {
                SheetError::PartTooLarge { part, size, max }
            }
        }
    }
}

/// Case-, separator- and leading-slash-insensitive part name comparison.
pub(crate) fn zip_part_names_equivalent(a: &str, b: &str) -> bool {
    fn normalized(name: &str) -> impl Iterator<Item = u8> + '_ {
        name.bytes()
            .skip_while(|b| matches!(b, b'/' | b'\\'))
            .map(|b| if b == b'\\' { b'/' } else { b.to_ascii_lowercase() })
    }
    normalized(a).eq(normalized(b))
}

/// Locate a ZIP entry by name, tolerating a leading `/`, `\` separators, and ASCII case
/// differences in the stored entry name. An exact match always wins.
///
/// Returns the entry index so the caller borrows the archive only once, through `by_index()`.
pub(crate) fn find_zip_part<R: Read + Seek>(archive: &ZipArchive<R>, name: &str) -> Option<usize> {
    let mut candidate = None::<usize>;
    for (idx, entry) in archive.file_names().enumerate() {
        if entry == name {
            return Some(idx);
        }
        if candidate.is_none() && zip_part_names_equivalent(entry, name) {
            candidate = Some(idx);
        }
    }
    candidate
}

/// Read a ZIP entry into memory with an uncompressed size limit.
///
/// The declared size is checked first, then reads go through `Read::take(max + 1)` so forged
/// metadata cannot inflate past the limit.
fn read_bytes_with_limit(
    reader: impl Read,
    declared_size: u64,
    part: &str,
    max_bytes: u64,
) -> Result<Vec<u8>, PartReadError> {
    if declared_size > max_bytes {
        return Err(PartReadError::TooLarge {
            part: part.to_string(),
            size: declared_size,
            max: max_bytes,
        });
    }

    let mut buf = Vec::new();
    let read_limit = max_bytes.checked_add(1).unwrap_or(u64::MAX);
    reader.take(read_limit).read_to_end(&mut buf)?;

    let observed = buf.len() as u64;
    if observed > max_bytes {
        return Err(PartReadError::TooLarge {
            part: part.to_string(),
            size: observed,
            max: max_bytes,
        });
    }
    Ok(buf)
}

/// Read a ZIP part by name, returning `Ok(None)` when the entry does not exist.
pub(crate) fn read_zip_part_optional_with_limit<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
    max_part_bytes: u64,
) -> Result<Option<Vec<u8>>, PartReadError> {
    let Some(idx) = find_zip_part(archive, name) else {
        return Ok(None);
    };
    let file = archive.by_index(idx)?;
    if file.is_dir() {
        return Ok(None);
    }
    let declared_size = file.size();
    read_bytes_with_limit(file, declared_size, name, max_part_bytes).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::{Cursor, Write};

    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let cursor = Cursor::new(Vec::new());
        let mut zip = ZipWriter::new(cursor);
        let options =
            FileOptions::<()>::default().compression_method(zip::CompressionMethod::Deflated);
        for (name, bytes) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(bytes).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn equivalent_handles_case_separators_and_leading_slashes() {
        assert!(zip_part_names_equivalent("XL\\Workbook.xml", "xl/workbook.xml"));
        assert!(zip_part_names_equivalent("/xl/workbook.xml", "xl/workbook.xml"));
        assert!(!zip_part_names_equivalent("xl/workbook.xml", "xl/workbook.xml.rels"));
    }

    #[test]
    fn limit_allows_exact_size_and_rejects_larger() {
        let bytes = build_zip(&[("a.txt", b"hello world")]); // 11 bytes
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();

        let part = read_zip_part_optional_with_limit(&mut archive, "a.txt", 11)
            .unwrap()
            .unwrap();
        assert_eq!(part, b"hello world");

        match read_zip_part_optional_with_limit(&mut archive, "a.txt", 10) {
            Err(PartReadError::TooLarge { part, .. }) => assert_eq!(part, "a.txt"),
            other => panic!("expected TooLarge, got {other:?}"),
        }
    }

    #[test]
    fn missing_part_is_none() {
        let bytes = build_zip(&[("a.txt", b"x")]);
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert!(read_zip_part_optional_with_limit(&mut archive, "b.txt", 10)
            .unwrap()
            .is_none());
        assert_eq!(find_zip_part(&archive, "b.txt"), None);
        assert_eq!(find_zip_part(&archive, "A.TXT"), Some(0));
    }

    #[test]
    fn exact_name_wins_over_equivalent() {
        let bytes = build_zip(&[
            ("XL\\Workbook.xml", b"equivalent"),
            ("xl/workbook.xml", b"exact"),
        ]);
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let part = read_zip_part_optional_with_limit(&mut archive, "xl/workbook.xml", 64)
            .unwrap()
            .unwrap();
        assert_eq!(part, b"exact");
    }
}
