//! One-off sorting of start events.

use std::cmp::Ordering;

use crate::fixed::{self, Fixed};
use crate::Error;

fn next_gap(gap: usize) -> usize {
    match gap * 10 / 13 {
        9 | 10 => 11,
        0 => 1,
        g => g,
    }
}

/// Sorts by a shrinking-gap comb sort. Not stable.
pub(crate) fn combsort_by<T>(items: &mut [T], mut cmp: impl FnMut(&T, &T) -> Ordering) {
    let len = items.len();
    if len < 2 {
        return;
    }
    let mut gap = len;
    loop {
        gap = next_gap(gap);
        let mut swapped = gap > 1;
        for i in 0..len - gap.min(len) {
            if cmp(&items[i], &items[i + gap]).is_gt() {
                items.swap(i, i + gap);
                swapped = true;
            }
        }
        if !swapped {
            break;
        }
    }
}

/// Sorts items by a y key, first distributing them into one bucket per
/// integer row when there are fewer rows than items.
///
/// Within a row the items are ordered by `cmp`, which must agree with the
/// key order.
pub(crate) fn bucket_by_row<T: Copy>(
    items: &mut [T],
    key: impl Fn(&T) -> Fixed,
    mut cmp: impl FnMut(&T, &T) -> Ordering,
) -> Result<(), Error> {
    let Some(first) = items.first() else {
        return Ok(());
    };
    let (mut y_min, mut y_max) = (key(first), key(first));
    for it in items.iter() {
        y_min = y_min.min(key(it));
        y_max = y_max.max(key(it));
    }
    let row_min = fixed::integer_floor(y_min);
    let rows = (fixed::integer_floor(y_max) - row_min) as usize + 1;
    if rows >= items.len() {
        combsort_by(items, cmp);
        return Ok(());
    }

    let row = |it: &T| (fixed::integer_floor(key(it)) - row_min) as usize;
    let mut starts = Vec::new();
    starts
        .try_reserve_exact(rows + 1)
        .map_err(|_| Error::NoMemory)?;
    starts.resize(rows + 1, 0usize);
    for it in items.iter() {
        starts[row(it) + 1] += 1;
    }
    for r in 0..rows {
        starts[r + 1] += starts[r];
    }

    let mut sorted = Vec::new();
    sorted
        .try_reserve_exact(items.len())
        .map_err(|_| Error::NoMemory)?;
    sorted.extend_from_slice(items);
    let mut fill = starts.clone();
    for it in sorted.iter() {
        let r = row(it);
        items[fill[r]] = *it;
        fill[r] += 1;
    }

    for r in 0..rows {
        combsort_by(&mut items[starts[r]..starts[r + 1]], &mut cmp);
    }
    Ok(())
}
