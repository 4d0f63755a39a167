use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::Advisor;
use crate::error::AppError;

/// A scripted advisor for tests. Returns pre-defined replies in order.
pub struct MockAdvisor {
    replies: Vec<Result<String, String>>,
    index: AtomicUsize,
}

impl MockAdvisor {
    pub fn new(replies: Vec<&str>) -> Self {
        Self {
            replies: replies.into_iter().map(|r| Ok(r.to_string())).collect(),
            index: AtomicUsize::new(0),
        }
    }

    /// An advisor whose every call fails upstream with the given detail.
    pub fn failing(detail: &str) -> Self {
        Self {
            replies: vec![Err(detail.to_string())],
            index: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Advisor for MockAdvisor {
    async fn advise(&self, _prompt: &str) -> Result<String, AppError> {
        let i = self.index.fetch_add(1, Ordering::SeqCst);
        // A failing advisor keeps failing; a scripted one runs out.
        let reply = self.replies.get(i).or_else(|| self.replies.last());
        match reply {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(detail)) => Err(AppError::upstream(detail.clone())),
            None => Err(AppError::upstream(format!(
                "MockAdvisor: no more replies (called {} times)",
                i + 1
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replies_in_order_then_repeats_last() {
        let advisor = MockAdvisor::new(vec!["one", "two"]);
        assert_eq!(advisor.advise("q").await.unwrap(), "one");
        assert_eq!(advisor.advise("q").await.unwrap(), "two");
        assert_eq!(advisor.advise("q").await.unwrap(), "two");
    }

    #[tokio::test]
    async fn failing_advisor_fails_upstream() {
        let advisor = MockAdvisor::failing("boom");
        let err = advisor.advise("q").await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }
}
