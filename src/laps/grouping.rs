// Gap-based grouping of sample indices

use itertools::Itertools;

/// Sorts `indices` and splits them into runs wherever two consecutive indices are more
/// than `max_gap` apart.
pub fn group_by_gap(indices: &[usize], max_gap: usize) -> Vec<Vec<usize>> {
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for index in indices.iter().copied().sorted_unstable().dedup() {
        match groups.last_mut() {
            Some(group) if group.last().is_some_and(|last| index - last <= max_gap) => {
                group.push(index)
            }
            _ => groups.push(vec![index]),
        }
    }
    groups
}

/// The member of each group with the smallest key; the first one on ties.
pub fn min_per_group<F>(groups: &[Vec<usize>], key: F) -> Vec<usize>
where
    F: Fn(usize) -> f64,
{
    groups
        .iter()
        .filter_map(|group| {
            group
                .iter()
                .copied()
                .min_by(|a, b| key(*a).total_cmp(&key(*b)))
        })
        .collect()
}
