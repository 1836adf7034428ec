//! Per-slide stale-response discard for asynchronous ranking.
//!
//! Every ranking request gets a `RankTicket` carrying a sequence number from one
//! monotonically increasing counter. The board remembers the latest ticket issued per
//! slide; a completed ranking is applied only if its ticket is still the latest one.
//! In-flight requests are never cancelled, their results are just dropped.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::layout::ranker::Ranking;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankTicket {
    pub slide_id: String,
    pub seq: u64,
}

#[derive(Debug, Default)]
pub struct RankingBoard {
    next_seq: u64,
    latest: HashMap<String, u64>,
    displayed: HashMap<String, Ranking>,
}

impl RankingBoard {
    /// Issues a new ticket for `slide_id`, superseding any ticket still in flight.
    pub fn issue(&mut self, slide_id: &str) -> RankTicket {
        self.next_seq += 1;
        self.latest.insert(slide_id.to_string(), self.next_seq);
        RankTicket {
            slide_id: slide_id.to_string(),
            seq: self.next_seq,
        }
    }

    pub fn is_latest(&self, ticket: &RankTicket) -> bool {
        self.latest.get(&ticket.slide_id) == Some(&ticket.seq)
    }

    /// Applies `ranking` if `ticket` is the latest issued for its slide.
    /// Returns whether it was applied.
    pub fn complete(&mut self, ticket: RankTicket, ranking: Ranking) -> bool {
        if !self.is_latest(&ticket) {
            debug!(
                "Discarding stale ranking for slide {} (seq {})",
                ticket.slide_id, ticket.seq
            );
            return false;
        }
        self.displayed.insert(ticket.slide_id, ranking);
        true
    }

    pub fn displayed(&self, slide_id: &str) -> Option<&Ranking> {
        self.displayed.get(slide_id)
    }

    /// Drops everything known about a slide; outstanding tickets become stale.
    pub fn forget(&mut self, slide_id: &str) {
        self.latest.remove(slide_id);
        self.displayed.remove(slide_id);
    }

    pub fn clear(&mut self) {
        self.latest.clear();
        self.displayed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::model::{ContentShape, Layout, Supports};
    use crate::layout::ranker::{LayoutRanker, RankingError, RankingPath, RankingSource};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;

    fn ranking(ids: &[&str]) -> Ranking {
        Ranking {
            ids: ids.iter().map(|s| s.to_string()).collect(),
            path: RankingPath::Local,
        }
    }

    #[test]
    fn test_latest_ticket_wins_regardless_of_arrival_order() {
        let mut board = RankingBoard::default();
        let r1 = board.issue("s1");
        let r2 = board.issue("s1");

        assert!(board.complete(r2, ranking(&["b", "a"])));
        assert!(!board.complete(r1, ranking(&["a", "b"])));
        assert_eq!(board.displayed("s1").unwrap().ids, vec!["b", "a"]);
    }

    #[test]
    fn test_tickets_are_per_slide() {
        let mut board = RankingBoard::default();
        let a = board.issue("s1");
        let b = board.issue("s2");
        assert!(board.complete(b, ranking(&["x"])));
        assert!(board.complete(a, ranking(&["y"])));
        assert_eq!(board.displayed("s1").unwrap().ids, vec!["y"]);
        assert_eq!(board.displayed("s2").unwrap().ids, vec!["x"]);
    }

    #[test]
    fn test_forget_makes_in_flight_ticket_stale() {
        let mut board = RankingBoard::default();
        let t = board.issue("s1");
        board.forget("s1");
        assert!(!board.complete(t, ranking(&["a"])));
        assert!(board.displayed("s1").is_none());
    }

    /// Remote source whose latency depends on the requested text count.
    struct SlowSource;

    #[async_trait]
    impl RankingSource for SlowSource {
        async fn candidates(
            &self,
            shape: ContentShape,
            _top_k: usize,
        ) -> Result<Vec<String>, RankingError> {
            tokio::time::sleep(Duration::from_millis(shape.text_count as u64 * 10)).await;
            if shape.text_count > 3 {
                Ok(vec!["wide".to_string(), "narrow".to_string()])
            } else {
                Ok(vec!["narrow".to_string(), "wide".to_string()])
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_response_of_older_request_is_discarded() {
        let layouts: Vec<Layout> = ["narrow", "wide"]
            .iter()
            .map(|id| Layout {
                id: id.to_string(),
                name: id.to_string(),
                supports: Supports::default(),
                weight: 1.0,
                preview_url: None,
                frames: Default::default(),
                style: Default::default(),
            })
            .collect();
        let layouts = Arc::new(layouts);
        let ranker = Arc::new(LayoutRanker::with_remote(Arc::new(SlowSource)));
        let mut board = RankingBoard::default();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        // R1 (slow, 50ms) then R2 (fast, 20ms) for the same slide.
        for shape in [ContentShape::new(5, 0), ContentShape::new(2, 0)] {
            let ticket = board.issue("s1");
            let (ranker, layouts, tx) = (ranker.clone(), layouts.clone(), tx.clone());
            tokio::spawn(async move {
                let result = ranker.rank(&layouts, shape).await;
                let _ = tx.send((ticket, result));
            });
        }
        drop(tx);

        let mut applied = Vec::new();
        while let Some((ticket, result)) = rx.recv().await {
            applied.push((ticket.seq, board.complete(ticket, result)));
        }

        assert_eq!(applied, vec![(2, true), (1, false)]);
        assert_eq!(board.displayed("s1").unwrap().ids, vec!["narrow", "wide"]);
    }
}
