//! "Did you mean" candidates for misspelled tool names, fields and enum values.

fn normalize(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

fn score(input: &str, candidate: &str) -> Option<usize> {
    let a = normalize(input);
    let b = normalize(candidate);
    if a.is_empty() || b.is_empty() {
        return None;
    }
    if a == b {
        return Some(0);
    }
    if a.contains(&b) || b.contains(&a) {
        return Some(1);
    }
    Some(edit_distance(&a, &b))
}

fn max_distance(input: &str) -> usize {
    match normalize(input).len() {
        0 => 0,
        1..=4 => 1,
        5..=8 => 2,
        len => ((len as f32) * 0.35).floor().max(3.0) as usize,
    }
}

pub fn suggest<'a, I>(input: &str, candidates: I, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let allowed = max_distance(input);
    if allowed == 0 {
        return Vec::new();
    }
    let mut scored: Vec<(&str, usize)> = candidates
        .into_iter()
        .filter_map(|candidate| {
            score(input, candidate)
                .filter(|distance| *distance <= allowed)
                .map(|distance| (candidate, distance))
        })
        .collect();
    scored.sort_by(|a, b| {
        a.1.cmp(&b.1)
            .then_with(|| a.0.len().cmp(&b.0.len()))
            .then_with(|| a.0.cmp(b.0))
    });
    scored.dedup_by(|a, b| a.0 == b.0);
    scored
        .into_iter()
        .take(limit.max(1))
        .map(|(candidate, _)| candidate.to_string())
        .collect()
}
