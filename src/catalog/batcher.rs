use serde::{Deserialize, Serialize};

/// A contiguous slice of records destined for one bulk write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch<T> {
    /// 1-based, matches the `_N` suffix of the batch file.
    pub number: usize,
    pub start: usize,
    pub end: usize,
    pub items: Vec<T>,
}

impl<T> Batch<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchRange {
    pub number: usize,
    pub start: usize,
    pub end: usize,
    pub is_last: bool,
}

impl BatchRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

pub struct Batcher {
    batch_size: usize,
}

impl Batcher {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn batch_count(&self, total: usize) -> usize {
        total.div_ceil(self.batch_size)
    }

    pub fn calculate_batches(&self, total: usize) -> Vec<BatchRange> {
        let mut ranges = Vec::with_capacity(self.batch_count(total));
        let mut start = 0;

        while start < total {
            let end = (start + self.batch_size).min(total);
            ranges.push(BatchRange {
                number: ranges.len() + 1,
                start,
                end,
                is_last: end >= total,
            });
            start = end;
        }

        ranges
    }

    pub fn split<T>(&self, items: Vec<T>) -> Vec<Batch<T>> {
        let ranges = self.calculate_batches(items.len());
        let mut iter = items.into_iter();

        ranges
            .into_iter()
            .map(|range| Batch {
                number: range.number,
                start: range.start,
                end: range.end,
                items: iter.by_ref().take(range.len()).collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_of_928_splits_into_19_batches() {
        let batcher = Batcher::new(50);
        let ranges = batcher.calculate_batches(928);

        assert_eq!(ranges.len(), 19);
        assert_eq!(ranges[0], BatchRange { number: 1, start: 0, end: 50, is_last: false });
        let last = ranges.last().unwrap();
        assert_eq!((last.number, last.start, last.end), (19, 900, 928));
        assert!(last.is_last);
        assert_eq!(last.len(), 28);
    }

    #[test]
    fn split_preserves_order_and_contents() {
        let batches = Batcher::new(3).split((0..8).collect::<Vec<_>>());

        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].items, vec![0, 1, 2]);
        assert_eq!(batches[2].items, vec![6, 7]);
        assert_eq!(batches[2].number, 3);

        let flattened: Vec<_> = batches.into_iter().flat_map(|b| b.items).collect();
        assert_eq!(flattened, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn empty_input_has_no_batches() {
        let batcher = Batcher::new(50);
        assert!(batcher.calculate_batches(0).is_empty());
        assert!(batcher.split(Vec::<u8>::new()).is_empty());
    }

    #[test]
    fn exact_multiple_has_no_short_batch() {
        let ranges = Batcher::new(50).calculate_batches(100);
        assert_eq!(ranges.len(), 2);
        assert!(ranges.iter().all(|r| r.len() == 50));
    }
}
