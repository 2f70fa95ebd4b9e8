use super::helpers::*;
use crate::model::MockVlm;
use futures::future::join_all;
use std::sync::Arc;

// ── Cross-request isolation ─────────────────────────────────

/// Concurrent requests against one shared backend + registry must each get
/// their own reply back — the mock echoes the caller's message, so any
/// cross-request leakage shows up as the wrong token in the wrong reply.
#[tokio::test]
async fn test_concurrent_requests_get_independent_replies() {
    let service = service_with(Arc::new(MockVlm::new()));

    let tasks = (0..32).map(|i| {
        let service = service.clone();
        tokio::spawn(async move {
            let token = format!("call-token-{:02}", i);
            let reply = service.chat(text_request(&token)).await.unwrap();
            (i, token, reply)
        })
    });

    for result in join_all(tasks).await {
        let (i, token, reply) = result.unwrap();
        assert!(
            reply.text.contains(&token),
            "request {} got someone else's reply: {}",
            i,
            reply.text
        );
        for j in 0..32 {
            if j != i {
                assert!(
                    !reply.text.contains(&format!("call-token-{:02}", j)),
                    "reply {} interleaved with request {}",
                    i,
                    j
                );
            }
        }
    }
}

/// Mixed success/failure load: empty-message errors on some tasks must not
/// disturb concurrent successful requests.
#[tokio::test]
async fn test_errors_do_not_disturb_concurrent_successes() {
    let service = service_with(Arc::new(MockVlm::new()));

    let tasks = (0..20).map(|i| {
        let service = service.clone();
        tokio::spawn(async move {
            if i % 4 == 0 {
                service.chat(text_request("")).await.map(|_| String::new())
            } else {
                service
                    .chat(text_request(&format!("ok-{}", i)))
                    .await
                    .map(|r| r.text)
            }
        })
    });

    for (i, result) in join_all(tasks).await.into_iter().enumerate() {
        let outcome = result.unwrap();
        if i % 4 == 0 {
            assert!(outcome.is_err());
        } else {
            assert!(outcome.unwrap().contains(&format!("ok-{}", i)));
        }
    }
}
