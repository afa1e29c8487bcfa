//! "Did you mean" suggestions for activity lookups.
//!
//! Activities can be addressed by id or by name on the command line. When a
//! lookup misses, the closest names by edit distance are offered back.

/// Compute the Levenshtein edit distance between two strings.
#[must_use]
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Single-row optimization
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1)
                .min(curr[j - 1] + 1)
                .min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Find candidates similar to the searched value.
///
/// Comparison is case-insensitive. Returns up to `max` suggestions with edit
/// distance ≤ 3, sorted by distance then alphabetically.
#[must_use]
pub fn find_similar<'a, I>(searched: &str, candidates: I, max: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let needle = searched.to_lowercase();
    let mut scored: Vec<(usize, &str)> = candidates
        .into_iter()
        .map(|c| (levenshtein_distance(&needle, &c.to_lowercase()), c))
        .filter(|(dist, _)| *dist <= 3)
        .collect();

    scored.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
    scored.dedup_by(|a, b| a.1 == b.1);

    scored
        .into_iter()
        .take(max)
        .map(|(_, c)| c.to_string())
        .collect()
}
