//! Bounded polling of element states

use std::time::Duration;
use tracing::trace;

use crate::browser::{PageDriver, Selector};
use crate::core::{ElementState, Result, VerifyError, WaitState};

/// Poll `selector` until it reaches `state` or `timeout` elapses.
///
/// Query errors while polling are retried (the page may be mid-navigation),
/// except a missing browser engine, which is returned immediately. The whole
/// loop is bounded, so a query that never answers still ends at `timeout`.
pub async fn wait_for<D>(
    driver: &D,
    selector: &Selector,
    state: WaitState,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<ElementState>
where
    D: PageDriver + ?Sized,
{
    let mut last_error: Option<String> = None;

    let polling = async {
        loop {
            match driver.query(selector).await {
                Ok(observed) if state.is_satisfied_by(&observed) => return Ok(observed),
                Ok(observed) => trace!(%selector, %state, ?observed, "not yet"),
                Err(VerifyError::AgentBrowserNotFound) => {
                    return Err(VerifyError::AgentBrowserNotFound)
                }
                Err(e) => {
                    trace!(%selector, error = %e, "query failed, retrying");
                    last_error = Some(e.to_string());
                }
            }
            tokio::time::sleep(poll_interval).await;
        }
    };

    let outcome = tokio::time::timeout(timeout, polling).await;
    match outcome {
        Ok(result) => result,
        Err(_) => {
            let what = match last_error {
                Some(e) => format!("{} to be {} (last error: {})", selector, state, e),
                None => format!("{} to be {}", selector, state),
            };
            Err(VerifyError::timeout(what, timeout.as_millis() as u64))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::Mutex;

    use crate::core::Capture;

    /// Returns queued query results in order, repeating the last one
    struct QueuedPage {
        answers: Mutex<Vec<Result<ElementState>>>,
    }

    impl QueuedPage {
        fn new(mut answers: Vec<Result<ElementState>>) -> Self {
            answers.reverse();
            Self {
                answers: Mutex::new(answers),
            }
        }
    }

    #[async_trait]
    impl PageDriver for QueuedPage {
        async fn launch(&mut self) -> Result<()> {
            Ok(())
        }
        async fn navigate(&self, _url: &str) -> Result<()> {
            Ok(())
        }
        async fn click(&self, _selector: &Selector) -> Result<()> {
            Ok(())
        }
        async fn fill(&self, _selector: &Selector, _value: &str) -> Result<()> {
            Ok(())
        }
        async fn evaluate(&self, _script: &str) -> Result<serde_json::Value> {
            Ok(serde_json::Value::Null)
        }
        async fn query(&self, _selector: &Selector) -> Result<ElementState> {
            let mut answers = self.answers.lock().unwrap();
            if answers.len() > 1 {
                return answers.pop().unwrap();
            }
            match answers.last() {
                Some(Ok(state)) => Ok(state.clone()),
                Some(Err(_)) => Err(VerifyError::browser("page gone")),
                None => Ok(ElementState::missing()),
            }
        }
        async fn screenshot(&self, _path: &Path, _capture: &Capture) -> Result<()> {
            Ok(())
        }
        async fn close(&self) -> Result<()> {
            Ok(())
        }
        fn name(&self) -> &str {
            "queued"
        }
    }

    const POLL: Duration = Duration::from_millis(100);

    #[tokio::test(start_paused = true)]
    async fn test_resolves_once_state_reached() {
        let page = QueuedPage::new(vec![
            Ok(ElementState::missing()),
            Err(VerifyError::browser("navigating")),
            Ok(ElementState::visible()),
        ]);
        let selector = Selector::css("#bulkAddModal");

        let start = tokio::time::Instant::now();
        let state = wait_for(&page, &selector, WaitState::Visible, Duration::from_secs(5), POLL)
            .await
            .unwrap();
        assert_eq!(state, ElementState::visible());
        assert_eq!(start.elapsed(), POLL * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_with_last_error() {
        let page = QueuedPage::new(vec![Err(VerifyError::browser("page gone"))]);
        let selector = Selector::css("#loading");

        let err = wait_for(&page, &selector, WaitState::Hidden, Duration::from_secs(2), POLL)
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        let message = err.to_string();
        assert!(message.contains("#loading to be hidden"), "{}", message);
        assert!(message.contains("page gone"), "{}", message);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_engine_is_not_retried() {
        let page = QueuedPage::new(vec![Err(VerifyError::AgentBrowserNotFound), Ok(ElementState::visible())]);
        let selector = Selector::css("#loading");

        let start = tokio::time::Instant::now();
        let err = wait_for(&page, &selector, WaitState::Visible, Duration::from_secs(2), POLL)
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyError::AgentBrowserNotFound));
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_detached_accepts_missing() {
        let page = QueuedPage::new(vec![Ok(ElementState::missing())]);
        let selector = Selector::css(".modal-backdrop");
        let state = wait_for(&page, &selector, WaitState::Detached, Duration::from_secs(1), POLL)
            .await
            .unwrap();
        assert_eq!(state.count, 0);
    }
}
