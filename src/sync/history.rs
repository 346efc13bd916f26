use std::collections::VecDeque;

use crate::models::TrendPoint;

/// Number of runs kept for the execution-trend chart.
pub const TREND_CAPACITY: usize = 20;

/// Fixed-capacity FIFO of trend points, oldest first.
#[derive(Debug, Clone)]
pub struct TrendHistory {
    points: VecDeque<TrendPoint>,
    capacity: usize,
}

impl TrendHistory {
    pub fn new() -> Self {
        Self::with_capacity(TREND_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, point: TrendPoint) {
        while self.points.len() >= self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &TrendPoint> + ExactSizeIterator {
        self.points.iter()
    }

    pub fn latest(&self) -> Option<&TrendPoint> {
        self.points.back()
    }

    /// Largest pass or fail count, used to scale the chart's y-axis.
    pub fn peak(&self) -> usize {
        self.points
            .iter()
            .map(|p| p.pass.max(p.fail))
            .max()
            .unwrap_or(0)
    }
}

impl Default for TrendHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(i: usize) -> TrendPoint {
        TrendPoint {
            label: format!("run-{}", i),
            pass: i,
            fail: 0,
        }
    }

    #[test]
    fn test_push_below_capacity_keeps_everything() {
        let mut history = TrendHistory::new();
        for i in 0..5 {
            history.push(point(i));
        }
        assert_eq!(history.len(), 5);
        assert_eq!(history.latest().unwrap().pass, 4);
    }

    #[test]
    fn test_evicts_oldest_first() {
        let mut history = TrendHistory::new();
        for i in 0..45 {
            history.push(point(i));
            assert!(history.len() <= TREND_CAPACITY);
        }
        let passes: Vec<usize> = history.iter().map(|p| p.pass).collect();
        assert_eq!(passes, (25..45).collect::<Vec<_>>());
    }

    #[test]
    fn test_zero_capacity_still_holds_latest() {
        let mut history = TrendHistory::with_capacity(0);
        history.push(point(1));
        history.push(point(2));
        assert_eq!(history.len(), 1);
        assert_eq!(history.latest().unwrap().pass, 2);
    }

    #[test]
    fn test_peak() {
        let mut history = TrendHistory::new();
        assert_eq!(history.peak(), 0);
        history.push(TrendPoint {
            label: "a".into(),
            pass: 3,
            fail: 9,
        });
        history.push(point(5));
        assert_eq!(history.peak(), 9);
    }
}
