//! Response body decoding
//!
//! Servers misreport compression and charsets often enough that trusting the
//! transport headers alone loses pages. The decode stage tries the declared
//! charset first and, when the result does not look like readable text,
//! falls through: brotli decompression, then gzip, then the raw bytes, each
//! crossed with a fixed list of candidate text encodings. The first decode
//! that both succeeds and passes the readability heuristic wins.

use encoding_rs::{Encoding, GBK, UTF_8, WINDOWS_1252};
use flate2::read::GzDecoder;
use std::io::Read;

/// Candidate encodings for the fallback passes. WINDOWS_1252 stands in for
/// the latin-1 family; GBK also covers gb2312 labels.
const CANDIDATE_ENCODINGS: &[&Encoding] = &[UTF_8, WINDOWS_1252, GBK];

/// Readability sample size in characters
const SAMPLE_CHARS: usize = 1000;

/// Weighted non-printable ratio above which text is considered garbled
const GARBLE_THRESHOLD: f64 = 0.20;

/// Checks whether text is plausibly readable (not garbled)
///
/// Scores the first 1000 characters: control characters (except newline,
/// carriage return, and tab) weigh 1.0; characters in the Latin-1 extended
/// byte range (128-255) weigh 0.5, since they often indicate mis-decoded
/// multi-byte text. Text passes when the sample has at least 10 characters
/// and the weighted score stays under 20% of the sample length.
///
/// This is a heuristic: false positives and negatives are expected.
pub fn is_plausibly_readable(text: &str) -> bool {
    let mut score = 0.0;
    let mut sample_len = 0usize;

    for ch in text.chars().take(SAMPLE_CHARS) {
        sample_len += 1;
        let code = ch as u32;
        if code < 32 && ch != '\n' && ch != '\r' && ch != '\t' {
            score += 1.0;
        } else if (128..256).contains(&code) {
            score += 0.5;
        }
    }

    if sample_len < 10 {
        return false;
    }

    score / (sample_len as f64) < GARBLE_THRESHOLD
}

/// Decodes a response body into readable text, trying multiple strategies
///
/// Order: transport-declared charset, brotli-decompressed candidates,
/// gzip-decompressed candidates, raw-byte candidates. Returns None when
/// every strategy either fails to decode or produces garbled text.
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> Option<String> {
    // Strategy 1: the charset the transport declared (UTF-8 when absent).
    let declared = content_type
        .and_then(charset_from_content_type)
        .unwrap_or(UTF_8);
    let (text, _, _) = declared.decode(bytes);
    if is_plausibly_readable(&text) {
        return Some(text.into_owned());
    }

    // Strategy 2: the body may be brotli-compressed despite the headers.
    if let Some(decompressed) = decompress_brotli(bytes) {
        if let Some(text) = decode_candidates(&decompressed) {
            return Some(text);
        }
    }

    // Strategy 3: same for gzip.
    if let Some(decompressed) = decompress_gzip(bytes) {
        if let Some(text) = decode_candidates(&decompressed) {
            return Some(text);
        }
    }

    // Strategy 4: raw bytes under each candidate encoding.
    decode_candidates(bytes)
}

/// Tries each candidate encoding strictly, returning the first readable text
fn decode_candidates(bytes: &[u8]) -> Option<String> {
    for encoding in CANDIDATE_ENCODINGS {
        let (text, _, had_errors) = encoding.decode(bytes);
        if !had_errors && is_plausibly_readable(&text) {
            return Some(text.into_owned());
        }
    }
    None
}

/// Extracts the charset parameter from a Content-Type header value
fn charset_from_content_type(content_type: &str) -> Option<&'static Encoding> {
    let lower = content_type.to_lowercase();
    let idx = lower.find("charset=")?;
    let label = lower[idx + "charset=".len()..]
        .split(';')
        .next()?
        .trim()
        .trim_matches('"');
    Encoding::for_label(label.as_bytes())
}

fn decompress_brotli(bytes: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    let mut reader = brotli::Decompressor::new(bytes, 4096);
    reader.read_to_end(&mut out).ok()?;
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

fn decompress_gzip(bytes: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    let mut reader = GzDecoder::new(bytes);
    reader.read_to_end(&mut out).ok()?;
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}
