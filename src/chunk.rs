//! Overlapping separator-hierarchy text chunker.
//!
//! Splits document text into fragments of at most `target_size` chars,
//! breaking preferentially on paragraph boundaries, then line boundaries,
//! sentence-ending punctuation, plain spaces, and finally between chars
//! when nothing else fits. Each chunk after the first carries the last
//! `overlap` chars of the preceding text as a prefix, so a sentence
//! straddling a boundary appears whole in at least one chunk.
//!
//! Separators stay attached to the piece they terminate and nothing is
//! trimmed, so concatenating the non-overlapping regions of the chunks
//! reconstructs the input exactly.
//!
//! All sizes are measured in chars (Unicode scalar values), not bytes —
//! Vietnamese text is multi-byte almost everywhere.

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::models::Chunk;

/// Break preference, strongest boundary first.
const SEPARATORS: [&str; 8] = ["\n\n", "\n", ". ", "! ", "? ", "; ", ", ", " "];

/// Split `text` into overlapping chunk strings.
///
/// Every chunk is at most `target_size` chars unless a single indivisible
/// unit exceeds it. `overlap` is clamped below `target_size`; callers
/// configure both (defaults 1000 / 200).
pub fn split(text: &str, target_size: usize, overlap: usize) -> Vec<String> {
    if text.is_empty() || target_size == 0 {
        return Vec::new();
    }
    let overlap = overlap.min(target_size.saturating_sub(1));
    // Budget for fresh content per chunk; the overlap prefix fills the rest.
    let body = (target_size - overlap).max(1);

    let units = split_units(text, body, 0);
    merge_units(&units, body, overlap)
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Recursively cut `text` into units of at most `limit` chars, trying
/// separators in priority order and keeping each separator attached to
/// the piece it terminates.
fn split_units(text: &str, limit: usize, sep_start: usize) -> Vec<String> {
    if char_len(text) <= limit {
        return vec![text.to_string()];
    }

    for (i, sep) in SEPARATORS.iter().enumerate().skip(sep_start) {
        if !text.contains(sep) {
            continue;
        }
        let mut units = Vec::new();
        for piece in text.split_inclusive(sep) {
            if char_len(piece) > limit {
                // Oversized piece: retry with the next-weaker separator.
                units.extend(split_units(piece, limit, i + 1));
            } else {
                units.push(piece.to_string());
            }
        }
        return units;
    }

    hard_split(text, limit)
}

/// Character-level fallback for a single indivisible run.
fn hard_split(text: &str, limit: usize) -> Vec<String> {
    let mut units = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let cut = rest
            .char_indices()
            .nth(limit)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        units.push(rest[..cut].to_string());
        rest = &rest[cut..];
    }
    units
}

/// Greedily pack units into chunks of at most `body` fresh chars each,
/// prefixing every chunk after the first with the trailing `overlap`
/// chars of the text consumed so far.
fn merge_units(units: &[String], body: usize, overlap: usize) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();
    let mut consumed = String::new();
    let mut seg = String::new();
    let mut seg_len = 0usize;

    let flush = |chunks: &mut Vec<String>, consumed: &mut String, seg: &mut String| {
        if seg.is_empty() {
            return;
        }
        if chunks.is_empty() {
            chunks.push(seg.clone());
        } else {
            let prefix = char_suffix(consumed, overlap);
            let mut chunk = String::with_capacity(prefix.len() + seg.len());
            chunk.push_str(prefix);
            chunk.push_str(seg);
            chunks.push(chunk);
        }
        consumed.push_str(seg);
        seg.clear();
    };

    for unit in units {
        let ulen = char_len(unit);
        if seg_len > 0 && seg_len + ulen > body {
            flush(&mut chunks, &mut consumed, &mut seg);
            seg_len = 0;
        }
        seg.push_str(unit);
        seg_len += ulen;
    }
    flush(&mut chunks, &mut consumed, &mut seg);

    chunks
}

/// The trailing `n` chars of `s` (all of `s` when shorter).
fn char_suffix(s: &str, n: usize) -> &str {
    let len = char_len(s);
    if len <= n {
        return s;
    }
    let idx = s
        .char_indices()
        .nth(len - n)
        .map(|(i, _)| i)
        .unwrap_or(0);
    &s[idx..]
}

/// Create a [`Chunk`] with a fresh UUID and a SHA-256 content hash.
pub fn make_chunk(document_id: &str, index: i64, text: &str, created_at: i64) -> Chunk {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let hash = format!("{:x}", hasher.finalize());

    Chunk {
        id: Uuid::new_v4().to_string(),
        document_id: document_id.to_string(),
        chunk_index: index,
        text: text.to_string(),
        hash,
        created_at,
    }
}
