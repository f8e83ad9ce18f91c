//! Gestalt (Ratcliff/Obershelp) string similarity used by the column guesser.

/// 回傳兩字串的相似度比例（0.0 ~ 1.0）。 / Similarity ratio in `[0, 1]`.
///
/// `2 * M / T`, where `M` is the number of characters in the recursively found
/// longest common blocks and `T` the total length of both strings. Two empty strings
/// are identical.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = matching_characters(&a, &b);
    2.0 * matched as f64 / total as f64
}

fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut matched = 0usize;
    let mut pending = vec![(0usize, a.len(), 0usize, b.len())];
    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_match(a, b, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        matched += size;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            pending.push((i + size, ahi, j + size, bhi));
        }
    }
    matched
}

/// Longest common block inside `a[alo..ahi]` / `b[blo..bhi]`; ties resolve to the
/// earliest start in `a`, then in `b`.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0usize);
    // run lengths ending at (i - 1, j), indexed by j - blo
    let mut previous = vec![0usize; bhi - blo];
    let mut current = vec![0usize; bhi - blo];
    for i in alo..ahi {
        for j in blo..bhi {
            let slot = j - blo;
            current[slot] = if a[i] == b[j] {
                let run = if slot > 0 { previous[slot - 1] } else { 0 } + 1;
                if run > best_size {
                    best_i = i + 1 - run;
                    best_j = j + 1 - run;
                    best_size = run;
                }
                run
            } else {
                0
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }
    (best_i, best_j, best_size)
}
