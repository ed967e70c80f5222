//! Vietnamese-aware text normalization and keyword extraction.
//!
//! Two pipelines share the same tokenizer: the *raw* pipeline lowercases
//! and tokenizes the text as written, the *folded* pipeline first strips
//! Vietnamese diacritic and tone marks. Queries and documents mix accented
//! and unaccented spelling inconsistently, so the scorer consumes both
//! token streams and never assumes one form dominates.
//!
//! Diacritic folding is Unicode canonical decomposition (NFD) followed by
//! discarding all combining marks, so "học" folds to "hoc" and "café" to
//! "cafe". `đ`/`Đ` has no canonical decomposition and survives folding.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// High-frequency Vietnamese function words excluded from keyword
/// extraction: articles, pronouns, conjunctions, and common adverbs.
pub const VIETNAMESE_STOPWORDS: &[&str] = &[
    "là", "của", "và", "có", "được", "trong", "không", "một", "với", "để",
    "các", "này", "cho", "đã", "từ", "như", "về", "hoặc", "khi", "những",
    "hay", "cũng", "vào", "thì", "sẽ", "bị", "do", "nếu", "nào", "mà",
    "theo", "tại", "đến", "ra", "trên", "gì", "ai", "bởi", "nhưng", "cả",
    "lại", "rất", "quá", "hơn", "kém", "chỉ", "còn", "đều", "vẫn", "thường",
    "luôn", "chưa", "đang", "sắp", "vừa", "mới", "sau", "trước", "đâu",
    "đây", "kia", "đó", "ấy", "vậy", "thế", "sao", "bao", "nhiêu", "mấy",
    "từng", "mỗi", "mọi", "khác", "riêng", "chung", "toàn", "chính", "tự",
    "lấy", "làm", "nên", "phải", "cần", "muốn",
];

static STOPWORD_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| VIETNAMESE_STOPWORDS.iter().copied().collect());

/// Minimum token length (in chars) to count as a keyword.
const MIN_TOKEN_CHARS: usize = 3;

/// Strip diacritic and tone marks and lowercase.
///
/// Idempotent: folding an already-folded string is a no-op.
pub fn normalize_diacritics(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Extract keyword tokens from text.
///
/// Lowercases, replaces every non-word character with whitespace, splits
/// on whitespace, and drops stop-words and tokens shorter than three
/// chars. Returns tokens in document order, duplicates included.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let cleaned: String = lowered
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { ' ' })
        .collect();

    cleaned
        .split_whitespace()
        .filter(|w| w.chars().count() >= MIN_TOKEN_CHARS && !STOPWORD_SET.contains(w))
        .map(str::to_string)
        .collect()
}

/// Keyword tokens of the diacritic-folded text.
///
/// Folding happens before stop-word filtering, so a folded function word
/// ("cua" from "của") is not caught by the accented stop-word list. The
/// scorer weights folded matches below raw matches to compensate.
pub fn normalized_tokenize(text: &str) -> Vec<String> {
    tokenize(&normalize_diacritics(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_strips_tone_marks() {
        assert_eq!(normalize_diacritics("học sinh"), "hoc sinh");
        assert_eq!(normalize_diacritics("Trường Đại học"), "truong đai hoc");
        assert_eq!(normalize_diacritics("café"), "cafe");
    }

    #[test]
    fn test_fold_idempotent() {
        for s in ["quy chế thi", "hoc sinh", "", "Điểm Thi 2024", "ngữ văn"] {
            let once = normalize_diacritics(s);
            assert_eq!(normalize_diacritics(&once), once);
        }
    }

    #[test]
    fn test_tokenize_drops_stopwords_and_short_tokens() {
        let tokens = tokenize("Điểm thi của học sinh là 10");
        assert!(tokens.contains(&"điểm".to_string()));
        assert!(tokens.contains(&"thi".to_string()));
        assert!(tokens.contains(&"học".to_string()));
        assert!(tokens.contains(&"sinh".to_string()));
        // "của" and "là" are stop-words, "10" is too short
        assert!(!tokens.contains(&"của".to_string()));
        assert!(!tokens.contains(&"là".to_string()));
        assert!(!tokens.contains(&"10".to_string()));
    }

    #[test]
    fn test_tokenize_strips_punctuation() {
        let tokens = tokenize("Điều 12: nội-quy, (thi)!");
        assert_eq!(tokens, vec!["điều", "nội", "quy", "thi"]);
    }

    #[test]
    fn test_tokenize_keeps_duplicates_in_order() {
        let tokens = tokenize("thi rồi thi nữa thi mãi");
        assert_eq!(tokens, vec!["thi", "rồi", "thi", "nữa", "thi", "mãi"]);
    }

    #[test]
    fn test_all_stopwords_yields_empty() {
        assert!(tokenize("của và được trong").is_empty());
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_normalized_tokenize_folds_before_filtering() {
        let tokens = normalized_tokenize("học sinh của trường");
        assert!(tokens.contains(&"hoc".to_string()));
        assert!(tokens.contains(&"sinh".to_string()));
        assert!(tokens.contains(&"truong".to_string()));
        // folded "cua" survives: the stop-word list is accented
        assert!(tokens.contains(&"cua".to_string()));
    }

    #[test]
    fn test_stopword_list_size() {
        assert_eq!(VIETNAMESE_STOPWORDS.len(), 84);
    }
}
