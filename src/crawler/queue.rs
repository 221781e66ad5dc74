use crate::models::CommunityLink;
use std::collections::VecDeque;
use tokio::sync::Mutex;

/// Shared FIFO of links still to visit. Workers pull from it until it runs dry,
/// so a slow page only holds up the worker that drew it.
pub struct WorkQueue {
    links: Mutex<VecDeque<CommunityLink>>,
}

impl WorkQueue {
    pub fn new(links: impl IntoIterator<Item = CommunityLink>) -> Self {
        Self {
            links: Mutex::new(links.into_iter().collect()),
        }
    }

    /// Take the next link, or None once the queue is drained
    pub async fn next(&self) -> Option<CommunityLink> {
        self.links.lock().await.pop_front()
    }

    pub async fn len(&self) -> usize {
        self.links.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(n: usize) -> CommunityLink {
        CommunityLink {
            origin_region: "Texas".to_string(),
            name: format!("Community {}", n),
            source_url: format!("https://example.com/{}", n),
        }
    }

    #[tokio::test]
    async fn test_queue_is_fifo_and_drains() {
        let queue = WorkQueue::new((0..3).map(link));
        assert_eq!(queue.len().await, 3);

        assert_eq!(queue.next().await, Some(link(0)));
        assert_eq!(queue.next().await, Some(link(1)));
        assert_eq!(queue.next().await, Some(link(2)));
        assert_eq!(queue.next().await, None);
        assert!(queue.is_empty().await);
    }
}
