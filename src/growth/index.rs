//! `(identifier, period)` lookup table over a loaded dataset.

use std::collections::HashMap;

use crate::domain::Record;

/// Borrowed index from ticker and period to the first matching record.
///
/// Lookups agree with a linear scan: when a key repeats, the earliest record wins.
#[derive(Debug, Default)]
pub struct RecordIndex<'r> {
    by_ticker: HashMap<&'r str, HashMap<&'r str, &'r Record>>,
}

impl<'r> RecordIndex<'r> {
    pub fn build(records: &'r [Record]) -> Self {
        let mut by_ticker: HashMap<&'r str, HashMap<&'r str, &'r Record>> = HashMap::new();
        for r in records {
            by_ticker
                .entry(r.identifier.as_str())
                .or_default()
                .entry(r.period.as_str())
                .or_insert(r);
        }
        Self { by_ticker }
    }

    pub fn get(&self, identifier: &str, period: &str) -> Option<&'r Record> {
        self.by_ticker.get(identifier)?.get(period).copied()
    }

    /// Number of distinct tickers.
    pub fn len(&self) -> usize {
        self.by_ticker.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_ticker.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: &str, period: &str, eps: f64) -> Record {
        Record {
            identifier: id.to_string(),
            period: period.to_string(),
            price: Some(1.0),
            trailing_metric: Some(eps),
            attributes: Vec::new(),
        }
    }

    #[test]
    fn first_record_wins() {
        let data = vec![rec("A", "2016Q1", 1.0), rec("A", "2016Q1", 2.0), rec("B", "2016Q1", 3.0)];
        let index = RecordIndex::build(&data);
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("A", "2016Q1").and_then(|r| r.trailing_metric), Some(1.0));
        assert!(index.get("A", "2015Q1").is_none());
        assert!(index.get("C", "2016Q1").is_none());
    }
}
