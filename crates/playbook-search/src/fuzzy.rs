//! Bounded edit distance.

/// Share of a query term's length allowed as edits
pub const FUZZY_RATIO: f64 = 0.2;

/// Hard cap on the edit budget
pub const MAX_FUZZY_DISTANCE: usize = 6;

/// Edit budget for a query term of `chars` characters.
pub fn max_distance(chars: usize) -> usize {
    ((chars as f64 * FUZZY_RATIO).round() as usize).min(MAX_FUZZY_DISTANCE)
}

/// Levenshtein distance between `a` and `b`, or None if it exceeds `max`.
///
/// Stops as soon as every cell of the current row is above the budget.
pub fn bounded_levenshtein(a: &str, b: &str, max: usize) -> Option<usize> {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.len().abs_diff(b.len()) > max {
        return None;
    }
    if a.is_empty() || b.is_empty() {
        let d = a.len().max(b.len());
        return (d <= max).then_some(d);
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        let mut row_min = curr[0];
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
            row_min = row_min.min(curr[j + 1]);
        }
        if row_min > max {
            return None;
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    let distance = prev[b.len()];
    (distance <= max).then_some(distance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_distance() {
        assert_eq!(max_distance(2), 0);
        assert_eq!(max_distance(3), 1);
        assert_eq!(max_distance(12), 2);
        assert_eq!(max_distance(100), MAX_FUZZY_DISTANCE);
    }

    #[test]
    fn test_distances() {
        assert_eq!(bounded_levenshtein("kitten", "sitting", 3), Some(3));
        assert_eq!(bounded_levenshtein("kitten", "sitting", 2), None);
        assert_eq!(bounded_levenshtein("same", "same", 0), Some(0));
        assert_eq!(bounded_levenshtein("", "ab", 2), Some(2));
        assert_eq!(bounded_levenshtein("gamification", "gamificaton", 2), Some(1));
    }

    #[test]
    fn test_length_gap_short_circuits() {
        assert_eq!(bounded_levenshtein("a", "abcdef", 2), None);
    }
}
