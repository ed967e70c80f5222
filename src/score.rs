//! Multi-factor lexical relevance scoring.
//!
//! No embeddings: relevance is approximated from four cheap, deterministic
//! keyword signals computed over two pipelines (raw and diacritic-folded),
//! then blended with fixed weights:
//!
//! 1. Jaccard overlap of query and fragment token sets (max of the two
//!    pipelines), weight 0.35.
//! 2. Query-keyword frequency in the fragment, folded occurrences
//!    discounted to 0.8, length-normalized, weight 0.25.
//! 3. Position bonus for query keywords appearing in the first half of
//!    the fragment, weight 0.15.
//! 4. Verbatim phrase match of the whole query, weight 0.25.
//!
//! The weights sum to 1.0, but frequency and position are not capped at 1,
//! so a composite score can exceed 1. The weights and the default
//! threshold are empirically chosen tuning policy, not invariants.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::models::Chunk;
use crate::text::{normalize_diacritics, normalized_tokenize, tokenize};

pub const JACCARD_WEIGHT: f64 = 0.35;
pub const FREQUENCY_WEIGHT: f64 = 0.25;
pub const POSITION_WEIGHT: f64 = 0.15;
pub const PHRASE_WEIGHT: f64 = 0.25;

/// Discount applied to folded keyword occurrences in the frequency factor.
const FOLDED_FREQUENCY_DISCOUNT: f64 = 0.8;
/// Position bonus per raw keyword found in the fragment's first half.
const EARLY_RAW_BONUS: f64 = 0.15;
/// Position bonus per folded keyword found in the folded first half.
const EARLY_FOLDED_BONUS: f64 = 0.10;
/// Phrase factor when the raw query appears verbatim in the fragment.
const RAW_PHRASE_MATCH: f64 = 0.4;
/// Phrase factor when only the folded query appears verbatim.
const FOLDED_PHRASE_MATCH: f64 = 0.3;

/// Token list, set, and multiset for one pipeline of one text.
#[derive(Debug, Default)]
pub struct TermProfile {
    tokens: Vec<String>,
    set: HashSet<String>,
    counts: HashMap<String, usize>,
}

impl TermProfile {
    fn build(tokens: Vec<String>) -> Self {
        let mut set = HashSet::with_capacity(tokens.len());
        let mut counts: HashMap<String, usize> = HashMap::with_capacity(tokens.len());
        for t in &tokens {
            *counts.entry(t.clone()).or_insert(0) += 1;
            set.insert(t.clone());
        }
        Self { tokens, set, counts }
    }

    fn count(&self, token: &str) -> usize {
        self.counts.get(token).copied().unwrap_or(0)
    }

    fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Query terms extracted once and shared across every fragment scored in
/// a single search.
#[derive(Debug)]
pub struct QueryTerms {
    raw: TermProfile,
    folded: TermProfile,
    raw_phrase: String,
    folded_phrase: String,
}

impl QueryTerms {
    pub fn parse(query: &str) -> Self {
        Self {
            raw: TermProfile::build(tokenize(query)),
            folded: TermProfile::build(normalized_tokenize(query)),
            raw_phrase: query.to_lowercase(),
            folded_phrase: normalize_diacritics(query),
        }
    }

    /// A query with no surviving raw keywords cannot be matched.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

/// Per-factor values for one (query, fragment) pair, before weighting.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ScoreBreakdown {
    pub jaccard: f64,
    pub frequency: f64,
    pub position: f64,
    pub phrase: f64,
}

impl ScoreBreakdown {
    pub fn composite(&self) -> f64 {
        self.jaccard * JACCARD_WEIGHT
            + self.frequency * FREQUENCY_WEIGHT
            + self.position * POSITION_WEIGHT
            + self.phrase * PHRASE_WEIGHT
    }
}

/// A fragment that cleared the threshold, best first.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredFragment {
    pub chunk_id: String,
    pub document_id: String,
    pub text: String,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

/// Intersection-over-union of two token sets. Zero when either is empty.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

/// Compute the four factors for one fragment. Total over all inputs:
/// empty sets and empty texts produce zeros, never errors.
pub fn score_breakdown(query: &QueryTerms, fragment_text: &str) -> ScoreBreakdown {
    let raw = TermProfile::build(tokenize(fragment_text));
    let folded = TermProfile::build(normalized_tokenize(fragment_text));

    let text_lower = fragment_text.to_lowercase();
    let text_folded = normalize_diacritics(fragment_text);

    let jaccard_score = jaccard(&query.raw.set, &raw.set)
        .max(jaccard(&query.folded.set, &folded.set));

    let mut hits = 0.0;
    for kw in &query.raw.tokens {
        hits += raw.count(kw) as f64;
    }
    for kw in &query.folded.tokens {
        hits += folded.count(kw) as f64 * FOLDED_FREQUENCY_DISCOUNT;
    }
    // +1 keeps long fragments from winning on bulk alone.
    let frequency = hits / (raw.tokens.len() as f64 + 1.0);

    let half_lower = first_half(&text_lower);
    let half_folded = first_half(&text_folded);
    let mut position = 0.0;
    for kw in &query.raw.tokens {
        if half_lower.contains(kw.as_str()) {
            position += EARLY_RAW_BONUS;
        }
    }
    for kw in &query.folded.tokens {
        if half_folded.contains(kw.as_str()) {
            position += EARLY_FOLDED_BONUS;
        }
    }

    let phrase = if !query.raw_phrase.is_empty() && text_lower.contains(&query.raw_phrase) {
        RAW_PHRASE_MATCH
    } else if !query.folded_phrase.is_empty() && text_folded.contains(&query.folded_phrase) {
        FOLDED_PHRASE_MATCH
    } else {
        0.0
    };

    ScoreBreakdown {
        jaccard: jaccard_score,
        frequency,
        position,
        phrase,
    }
}

/// Composite relevance of one fragment for a parsed query.
pub fn score(query: &QueryTerms, fragment_text: &str) -> f64 {
    score_breakdown(query, fragment_text).composite()
}

/// Score every chunk, rank descending (stable: ties keep store order),
/// drop scores below `threshold`, and truncate to `top_k`.
///
/// Short-circuits to an empty result when the query has no surviving raw
/// keywords; that is the only early exit, and an empty result is a normal
/// "no relevant context" outcome, not an error.
pub fn search(query_text: &str, chunks: &[Chunk], top_k: usize, threshold: f64) -> Vec<ScoredFragment> {
    let query = QueryTerms::parse(query_text);
    if query.is_empty() {
        debug!("query has no meaningful keywords, skipping scan");
        return Vec::new();
    }
    debug!(
        raw_keywords = query.raw.tokens.len(),
        folded_keywords = query.folded.tokens.len(),
        fragments = chunks.len(),
        "scoring fragments"
    );

    let mut scored: Vec<ScoredFragment> = chunks
        .iter()
        .map(|c| {
            let breakdown = score_breakdown(&query, &c.text);
            ScoredFragment {
                chunk_id: c.id.clone(),
                document_id: c.document_id.clone(),
                text: c.text.clone(),
                score: breakdown.composite(),
                breakdown,
            }
        })
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored.retain(|s| s.score >= threshold);
    scored.truncate(top_k);
    scored
}

/// First half of `s` by char count.
fn first_half(s: &str) -> &str {
    let half = s.chars().count() / 2;
    match s.char_indices().nth(half) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::make_chunk;

    fn chunks_from(texts: &[&str]) -> Vec<Chunk> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| make_chunk("doc1", i as i64, t, 1_700_000_000))
            .collect()
    }

    fn set(words: &[&str]) -> HashSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_jaccard_symmetry_and_bounds() {
        let a = set(&["thi", "điểm", "học"]);
        let b = set(&["thi", "lịch"]);
        assert_eq!(jaccard(&a, &b), jaccard(&b, &a));
        assert!(jaccard(&a, &b) > 0.0 && jaccard(&a, &b) < 1.0);
        assert_eq!(jaccard(&a, &a), 1.0);
    }

    #[test]
    fn test_jaccard_empty_sets() {
        let empty = HashSet::new();
        let a = set(&["thi"]);
        assert_eq!(jaccard(&empty, &empty), 0.0);
        assert_eq!(jaccard(&a, &empty), 0.0);
        assert_eq!(jaccard(&empty, &a), 0.0);
    }

    #[test]
    fn test_empty_query_short_circuits() {
        let chunks = chunks_from(&["Nội quy thi cử của trường trung học phổ thông."]);
        assert!(search("", &chunks, 5, 0.08).is_empty());
        // every token is a stop-word
        assert!(search("của và được", &chunks, 5, 0.08).is_empty());
        // all tokens too short
        assert!(search("ab cd", &chunks, 5, 0.08).is_empty());
    }

    #[test]
    fn test_exact_phrase_scores_raw_match() {
        let query = QueryTerms::parse("quy chế thi của trường");
        let b = score_breakdown(
            &query,
            "Điều 5. Mọi học sinh tuân thủ quy chế thi của trường khi dự thi.",
        );
        assert_eq!(b.phrase, 0.4);
    }

    #[test]
    fn test_folded_phrase_scores_lower() {
        let query = QueryTerms::parse("quy che thi");
        let b = score_breakdown(&query, "Tài liệu về quy chế thi tốt nghiệp.");
        assert_eq!(b.phrase, 0.3);
    }

    #[test]
    fn test_phrase_hit_ranks_first() {
        let chunks = chunks_from(&[
            "Lịch nghỉ hè dành cho toàn thể giáo viên và nhân viên nhà trường.",
            "Học sinh vi phạm quy chế thi của trường sẽ bị lập biên bản.",
            "Thông báo mức thu học phí học kỳ hai năm học 2024-2025.",
        ]);
        let hits = search("quy chế thi của trường", &chunks, 5, 0.08);
        assert!(!hits.is_empty());
        assert!(hits[0].text.contains("quy chế thi của trường"));
        assert_eq!(hits[0].breakdown.phrase, 0.4);
    }

    #[test]
    fn test_diacritic_tolerant_retrieval() {
        let chunks = chunks_from(&[
            "Danh sách học sinh giỏi cấp thành phố năm nay.",
            "Thực đơn căng tin tuần tới gồm phở và cơm rang.",
        ]);
        let hits = search("hoc sinh", &chunks, 5, 0.08);
        assert!(!hits.is_empty());
        assert!(hits[0].text.contains("học sinh"));
    }

    #[test]
    fn test_irrelevant_query_returns_empty() {
        let chunks = chunks_from(&[
            "Máy bay phản lực cất cánh từ đường băng chính.",
            "Phi công kiểm tra hệ thống dẫn đường trước chuyến bay.",
        ]);
        let hits = search("giá vàng hôm nay tăng mạnh", &chunks, 5, 0.08);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_frequency_rewards_repetition_not_bulk() {
        let query = QueryTerms::parse("điểm thi");
        let dense = score_breakdown(&query, "Điểm thi, điểm thi lại, điểm thi bổ sung.");
        let padded = score_breakdown(
            &query,
            "Điểm thi nằm đâu đó giữa rất nhiều từ ngữ dông dài chẳng liên quan chút nào hết trơn.",
        );
        assert!(dense.frequency > padded.frequency);
    }

    #[test]
    fn test_position_bonus_favors_early_keywords() {
        let query = QueryTerms::parse("học phí");
        let early = score_breakdown(
            &query,
            "Học phí học kỳ này giữ nguyên. Phần còn lại của thông báo nói về đồng phục và sách giáo khoa.",
        );
        let late = score_breakdown(
            &query,
            "Phần đầu thông báo nói về đồng phục và sách giáo khoa cho năm tới. Cuối cùng: học phí giữ nguyên.",
        );
        assert!(early.position > late.position);
    }

    #[test]
    fn test_top_k_bound() {
        let chunks = chunks_from(&[
            "Điểm thi môn toán đã có.",
            "Điểm thi môn văn đã có.",
            "Điểm thi môn anh đã có.",
            "Điểm thi môn lý đã có.",
        ]);
        for k in 0..=5 {
            let hits = search("điểm thi", &chunks, k, 0.0);
            assert!(hits.len() <= k);
        }
    }

    #[test]
    fn test_threshold_monotonicity() {
        let chunks = chunks_from(&[
            "Điểm thi môn toán học kỳ một.",
            "Lịch thi đấu bóng đá giao hữu.",
            "Thông báo nghỉ tết nguyên đán.",
            "Quy định về điểm danh buổi sáng.",
        ]);
        let mut last = usize::MAX;
        for threshold in [0.0, 0.05, 0.08, 0.2, 0.5, 1.0] {
            let n = search("điểm thi môn toán", &chunks, 10, threshold).len();
            assert!(n <= last, "count rose from {} to {} at {}", last, n, threshold);
            last = n;
        }
    }

    #[test]
    fn test_ranking_is_descending() {
        let chunks = chunks_from(&[
            "Một dòng chẳng liên quan gì.",
            "Lịch thi học kỳ một môn toán lớp 12.",
            "Lịch thi thử tốt nghiệp sắp công bố.",
        ]);
        let hits = search("lịch thi học kỳ", &chunks, 10, 0.0);
        for pair in hits.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_tie_break_keeps_store_order() {
        let chunks = chunks_from(&["Bản sao y hệt nội dung thi.", "Bản sao y hệt nội dung thi."]);
        let hits = search("nội dung thi", &chunks, 10, 0.0);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].chunk_id, chunks[0].id);
        assert_eq!(hits[1].chunk_id, chunks[1].id);
    }

    #[test]
    fn test_weights_sum_to_one() {
        let total = JACCARD_WEIGHT + FREQUENCY_WEIGHT + POSITION_WEIGHT + PHRASE_WEIGHT;
        assert!((total - 1.0).abs() < 1e-12);
    }
}
