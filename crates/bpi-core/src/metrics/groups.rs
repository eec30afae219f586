//! Critical group enumeration.
//!
//! A vertex `v` has a candidate list of distinct neighbours, each with the
//! weight it sends to (or receives from) `v`. A **group** is any subset of
//! that list with at most `order` members; the empty group is included. A
//! group is **critical** when its combined weight reaches `v`'s quota.
//!
//! Groups are visited in lexicographic order of candidate positions, so a
//! given input always produces the same visit sequence and the same
//! floating-point sums.

/// Visit every critical group of size at most `order`.
///
/// `visit` receives the member positions (indices into `weights`, ascending)
/// and the group's total weight.
pub fn for_each_critical_group<F>(weights: &[f64], quota: f64, order: usize, mut visit: F)
where
    F: FnMut(&[usize], f64),
{
    let mut members = Vec::with_capacity(order.min(weights.len()));
    walk(weights, quota, order, 0, 0.0, &mut members, &mut visit);
}

/// Collect every critical group of size at most `order`.
///
/// Intended for inspection and tests; the engines use
/// [`for_each_critical_group`] to avoid materializing the groups.
#[must_use]
pub fn critical_groups(weights: &[f64], quota: f64, order: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    for_each_critical_group(weights, quota, order, |members, _| out.push(members.to_vec()));
    out
}

fn walk<F>(
    weights: &[f64],
    quota: f64,
    order: usize,
    start: usize,
    sum: f64,
    members: &mut Vec<usize>,
    visit: &mut F,
) where
    F: FnMut(&[usize], f64),
{
    if sum >= quota {
        visit(members, sum);
    }
    if members.len() == order {
        return;
    }
    for next in start..weights.len() {
        members.push(next);
        walk(weights, quota, order, next + 1, sum + weights[next], members, visit);
        members.pop();
    }
}
