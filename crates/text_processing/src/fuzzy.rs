//! Fuzzy string scoring on a 0..100 scale
//!
//! Scores are normalized Indel similarities computed over Unicode scalar
//! values, so Malayalam text is compared sign by sign rather than byte by
//! byte.

/// Longest common subsequence length (two-row DP)
fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

fn ratio_chars(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let indel = total - 2 * lcs_len(a, b);
    100.0 * (1.0 - indel as f64 / total as f64)
}

/// Normalized Indel similarity
///
/// `100 * (1 - indel(a, b) / (|a| + |b|))`, 0 when either side is empty.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio_chars(&a, &b)
}

/// Best `ratio` of the shorter string against any window of the longer one
///
/// Windows are as long as the shorter string, sliding one character at a
/// time; near the ends they are truncated, so a prefix or suffix overlap
/// still scores. Equal-length inputs are scored in both directions, which
/// keeps the result symmetric.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    if a.len() == b.len() {
        let forward = best_window(&a, &b);
        if forward >= 100.0 {
            return 100.0;
        }
        return forward.max(best_window(&b, &a));
    }

    if a.len() < b.len() {
        best_window(&a, &b)
    } else {
        best_window(&b, &a)
    }
}

/// Slide `needle` over `hay` (`needle` no longer than `hay`)
fn best_window(needle: &[char], hay: &[char]) -> f64 {
    let m = needle.len();
    let n = hay.len();

    let mut best = 0.0f64;
    let mut consider = |window: &[char]| {
        let score = ratio_chars(needle, window);
        if score > best {
            best = score;
        }
        best >= 100.0
    };

    // Truncated prefixes
    for end in 1..m {
        if consider(&hay[..end]) {
            return 100.0;
        }
    }

    // Full-width windows
    for start in 0..=(n - m) {
        if consider(&hay[start..start + m]) {
            return 100.0;
        }
    }

    // Truncated suffixes
    for start in (n - m + 1)..n {
        if consider(&hay[start..]) {
            return 100.0;
        }
    }

    best
}

/// Scorer signature accepted by [`extract_one`]
pub type Scorer = fn(&str, &str) -> f64;

/// Highest scoring choice as `(index, score)`; the first one wins a tie
pub fn extract_one<S: AsRef<str>>(
    query: &str,
    choices: &[S],
    scorer: Scorer,
) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, choice) in choices.iter().enumerate() {
        let score = scorer(query, choice.as_ref());
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((idx, score)),
        }
    }
    best
}
