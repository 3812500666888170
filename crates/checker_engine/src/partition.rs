use std::ops::Range;

use crate::WorkItem;

/// Split `[0, item_count)` into `worker_count` contiguous ranges whose sizes
/// differ by at most one. The first `item_count % worker_count` ranges take
/// the extra item; with more workers than items the trailing ranges are empty.
///
/// Returns no ranges for `worker_count == 0`.
pub fn partition(item_count: usize, worker_count: usize) -> Vec<Range<usize>> {
    if worker_count == 0 {
        return Vec::new();
    }
    let k = item_count / worker_count;
    let m = item_count % worker_count;
    (0..worker_count)
        .map(|i| {
            let start = i * k + i.min(m);
            let end = (i + 1) * k + (i + 1).min(m);
            start..end
        })
        .collect()
}

/// Materialise `partition` over a list of URLs, indexing items by their
/// position in `urls`.
pub fn split_items(urls: &[String], worker_count: usize) -> Vec<Vec<WorkItem>> {
    partition(urls.len(), worker_count)
        .into_iter()
        .map(|range| {
            range
                .map(|index| WorkItem::new(index, urls[index].clone()))
                .collect()
        })
        .collect()
}
