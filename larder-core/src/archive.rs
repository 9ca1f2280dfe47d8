//! Recipe export archive decoding.
//!
//! Unpacks an opaque import payload into normalized recipes. A payload may
//! be a zip container, a gzip-compressed blob, or plain JSON, and archive
//! entries may themselves be archives (nested export formats). Detection is
//! by magic-byte sniffing, never by file extension.

use std::io::{Cursor, Read};

use flate2::read::GzDecoder;
use serde_json::Value;
use zip::ZipArchive;

use crate::error::DecodeError;
use crate::normalize::normalize_record;
use crate::types::NormalizedRecipe;

/// Limits applied to a decode pass.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Maximum nesting depth for archives-within-archives. A branch past
    /// the ceiling is skipped, not fatal.
    pub max_depth: u8,
    /// Ceiling on total decompressed bytes across the whole decode.
    /// Exceeding it aborts - deeply-nested archives are a
    /// resource-exhaustion risk, so nesting depth alone is not enough.
    pub max_decompressed_bytes: u64,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: 3,
            max_decompressed_bytes: 256 * 1024 * 1024,
        }
    }
}

/// Counters accumulated while decoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Leaf payloads that produced at least one recipe record.
    pub leaves_decoded: usize,
    /// Entries ignored: unrecognized bytes, corrupt leaves, non-object
    /// JSON elements.
    pub leaves_skipped: usize,
    /// Branches dropped for exceeding the depth ceiling.
    pub depth_skipped: usize,
}

/// Everything one decode pass produced.
#[derive(Debug, Default)]
pub struct DecodeOutput {
    pub recipes: Vec<NormalizedRecipe>,
    pub stats: DecodeStats,
}

const ZIP_MAGIC: [u8; 4] = [0x50, 0x4b, 0x03, 0x04];
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PayloadKind {
    Zip,
    Gzip,
    Json,
    Unknown,
}

fn sniff(payload: &[u8]) -> PayloadKind {
    if payload.starts_with(&ZIP_MAGIC) {
        return PayloadKind::Zip;
    }
    if payload.starts_with(&GZIP_MAGIC) {
        return PayloadKind::Gzip;
    }
    match payload.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'{') | Some(b'[') => PayloadKind::Json,
        _ => PayloadKind::Unknown,
    }
}

/// Decode an import payload into normalized recipes.
///
/// A structurally corrupt top-level payload is fatal; a corrupt entry
/// inside an otherwise-valid container is skipped and counted.
pub fn decode_archive(payload: &[u8], opts: &DecodeOptions) -> Result<DecodeOutput, DecodeError> {
    let mut out = DecodeOutput::default();
    let mut budget = opts.max_decompressed_bytes;
    decode_payload(payload, 0, opts, &mut out, &mut budget, true)?;
    Ok(out)
}

fn decode_payload(
    payload: &[u8],
    depth: u8,
    opts: &DecodeOptions,
    out: &mut DecodeOutput,
    budget: &mut u64,
    top_level: bool,
) -> Result<(), DecodeError> {
    if depth > opts.max_depth {
        tracing::warn!(
            depth,
            ceiling = opts.max_depth,
            "Archive nesting exceeds depth ceiling, skipping branch"
        );
        out.stats.depth_skipped += 1;
        return Ok(());
    }

    match sniff(payload) {
        PayloadKind::Zip => decode_zip(payload, depth, opts, out, budget, top_level),
        PayloadKind::Gzip => decode_gzip(payload, depth, opts, out, budget, top_level),
        PayloadKind::Json => decode_json(payload, out, top_level),
        PayloadKind::Unknown => {
            if top_level {
                Err(DecodeError::UnrecognizedPayload)
            } else {
                out.stats.leaves_skipped += 1;
                Ok(())
            }
        }
    }
}

fn decode_zip(
    payload: &[u8],
    depth: u8,
    opts: &DecodeOptions,
    out: &mut DecodeOutput,
    budget: &mut u64,
    top_level: bool,
) -> Result<(), DecodeError> {
    let mut archive = match ZipArchive::new(Cursor::new(payload)) {
        Ok(archive) => archive,
        Err(e) if top_level => return Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, "Skipping corrupt nested archive");
            out.stats.leaves_skipped += 1;
            return Ok(());
        }
    };

    for index in 0..archive.len() {
        let bytes = {
            let mut entry = match archive.by_index(index) {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(index, error = %e, "Skipping unreadable archive entry");
                    out.stats.leaves_skipped += 1;
                    continue;
                }
            };
            if entry.is_dir() {
                continue;
            }
            match read_bounded(&mut entry, budget, opts) {
                Ok(bytes) => bytes,
                Err(e @ DecodeError::TooLarge(_)) => return Err(e),
                Err(e) => {
                    tracing::warn!(index, error = %e, "Skipping corrupt archive entry");
                    out.stats.leaves_skipped += 1;
                    continue;
                }
            }
        };
        decode_payload(&bytes, depth + 1, opts, out, budget, false)?;
    }

    Ok(())
}

fn decode_gzip(
    payload: &[u8],
    depth: u8,
    opts: &DecodeOptions,
    out: &mut DecodeOutput,
    budget: &mut u64,
    top_level: bool,
) -> Result<(), DecodeError> {
    let mut decoder = GzDecoder::new(payload);
    let bytes = match read_bounded(&mut decoder, budget, opts) {
        Ok(bytes) => bytes,
        Err(e @ DecodeError::TooLarge(_)) => return Err(e),
        Err(e) if top_level => return Err(e),
        Err(e) => {
            tracing::warn!(error = %e, "Skipping corrupt compressed entry");
            out.stats.leaves_skipped += 1;
            return Ok(());
        }
    };

    // A gzip member may wrap another archive; re-sniff what came out.
    decode_payload(&bytes, depth + 1, opts, out, budget, top_level)
}

/// Read to the end of `reader`, charging the shared decompression budget.
fn read_bounded<R: Read>(
    reader: &mut R,
    budget: &mut u64,
    opts: &DecodeOptions,
) -> Result<Vec<u8>, DecodeError> {
    let mut buf = Vec::new();
    let read = reader.take(*budget + 1).read_to_end(&mut buf)?;
    if read as u64 > *budget {
        return Err(DecodeError::TooLarge(opts.max_decompressed_bytes));
    }
    *budget -= read as u64;
    Ok(buf)
}

fn decode_json(payload: &[u8], out: &mut DecodeOutput, top_level: bool) -> Result<(), DecodeError> {
    let value: Value = match serde_json::from_slice(payload) {
        Ok(value) => value,
        Err(e) if top_level => return Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, "Skipping malformed JSON entry");
            out.stats.leaves_skipped += 1;
            return Ok(());
        }
    };

    match value {
        Value::Array(items) => {
            for item in &items {
                push_record(item, out);
            }
        }
        other => push_record(&other, out),
    }

    Ok(())
}

fn push_record(value: &Value, out: &mut DecodeOutput) {
    match normalize_record(value) {
        Some(recipe) => {
            out.stats.leaves_decoded += 1;
            out.recipes.push(recipe);
        }
        None => {
            out.stats.leaves_skipped += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn recipe_json(title: &str) -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({
            "title": title,
            "ingredients": ["1 cup flour"],
        }))
        .unwrap()
    }

    fn zip_of(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, bytes) in entries {
            writer
                .start_file(name.to_string(), SimpleFileOptions::default())
                .unwrap();
            writer.write_all(bytes).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn gzip_of(bytes: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(bytes).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_plain_json_object() {
        let out = decode_archive(&recipe_json("Toast"), &DecodeOptions::default()).unwrap();
        assert_eq!(out.recipes.len(), 1);
        assert_eq!(out.recipes[0].title, "Toast");
        assert_eq!(out.stats.leaves_decoded, 1);
    }

    #[test]
    fn test_json_array_yields_one_record_per_element() {
        let payload = serde_json::to_vec(&serde_json::json!([
            {"title": "One"},
            {"title": "Two"},
            "not a recipe"
        ]))
        .unwrap();

        let out = decode_archive(&payload, &DecodeOptions::default()).unwrap();
        assert_eq!(out.recipes.len(), 2);
        assert_eq!(out.stats.leaves_skipped, 1);
    }

    #[test]
    fn test_zip_with_multiple_leaves() {
        let payload = zip_of(&[
            ("a.json", recipe_json("A").as_slice()),
            ("b.json", recipe_json("B").as_slice()),
            ("notes.txt", b"plain text, not a recipe"),
        ]);

        let out = decode_archive(&payload, &DecodeOptions::default()).unwrap();
        assert_eq!(out.recipes.len(), 2);
        assert_eq!(out.stats.leaves_skipped, 1);
    }

    #[test]
    fn test_gzipped_entries_inside_zip() {
        // The recipe-manager export shape: a zip of gzipped JSON blobs
        let payload = zip_of(&[
            ("one.recipe", gzip_of(&recipe_json("One")).as_slice()),
            ("two.recipe", gzip_of(&recipe_json("Two")).as_slice()),
        ]);

        let out = decode_archive(&payload, &DecodeOptions::default()).unwrap();
        assert_eq!(out.recipes.len(), 2);
    }

    #[test]
    fn test_nested_zip_within_ceiling() {
        let inner = zip_of(&[("r.json", recipe_json("Nested").as_slice())]);
        let outer = zip_of(&[("inner.zip", inner.as_slice())]);

        let out = decode_archive(&outer, &DecodeOptions::default()).unwrap();
        assert_eq!(out.recipes.len(), 1);
        assert_eq!(out.recipes[0].title, "Nested");
    }

    #[test]
    fn test_nesting_beyond_ceiling_skips_branch_only() {
        let deep = zip_of(&[("r.json", recipe_json("Too Deep").as_slice())]);
        let mid = zip_of(&[("deep.zip", deep.as_slice())]);
        let top = zip_of(&[
            ("mid.zip", mid.as_slice()),
            ("sibling.json", recipe_json("Sibling").as_slice()),
        ]);

        let opts = DecodeOptions {
            max_depth: 2,
            ..DecodeOptions::default()
        };
        let out = decode_archive(&top, &opts).unwrap();

        // The deep branch is dropped, the sibling still decodes
        assert_eq!(out.recipes.len(), 1);
        assert_eq!(out.recipes[0].title, "Sibling");
        assert_eq!(out.stats.depth_skipped, 1);
    }

    #[test]
    fn test_corrupt_top_level_is_fatal() {
        let mut corrupt = zip_of(&[("a.json", recipe_json("A").as_slice())]);
        corrupt.truncate(10);

        let result = decode_archive(&corrupt, &DecodeOptions::default());
        assert!(matches!(result, Err(DecodeError::InvalidArchive(_))));
    }

    #[test]
    fn test_malformed_top_level_json_is_fatal() {
        let result = decode_archive(b"{ not json", &DecodeOptions::default());
        assert!(matches!(result, Err(DecodeError::InvalidJson(_))));
    }

    #[test]
    fn test_corrupt_leaf_is_skipped() {
        let payload = zip_of(&[
            ("bad.json", b"{ truncated".as_slice()),
            ("good.json", recipe_json("Good").as_slice()),
        ]);

        let out = decode_archive(&payload, &DecodeOptions::default()).unwrap();
        assert_eq!(out.recipes.len(), 1);
        assert_eq!(out.stats.leaves_skipped, 1);
    }

    #[test]
    fn test_unrecognized_top_level_is_fatal() {
        let result = decode_archive(b"\x00\x01\x02\x03", &DecodeOptions::default());
        assert!(matches!(result, Err(DecodeError::UnrecognizedPayload)));
    }

    #[test]
    fn test_decompressed_byte_ceiling_aborts() {
        // 1 KiB ceiling; the gzip expands past it
        let big = vec![b' '; 4096];
        let payload = zip_of(&[("big.gz", gzip_of(&big).as_slice())]);

        let opts = DecodeOptions {
            max_decompressed_bytes: 1024,
            ..DecodeOptions::default()
        };
        let result = decode_archive(&payload, &opts);
        assert!(matches!(result, Err(DecodeError::TooLarge(_))));
    }

    #[test]
    fn test_empty_payload_unrecognized() {
        let result = decode_archive(b"", &DecodeOptions::default());
        assert!(matches!(result, Err(DecodeError::UnrecognizedPayload)));
    }
}
