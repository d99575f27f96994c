//! Single-flight supersession.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fetch_control::{
    create_single_flight, CancellationSignal, ChannelState, FetchError, FetchRequest, RetryFetch,
    RetryPolicy, SingleFlight, Transport, FETCH_REQUEST_ABORTED,
};

mod common;

#[tokio::test]
async fn test_new_call_aborts_previous_before_starting() {
    let seen: Arc<Mutex<Vec<CancellationSignal>>> = Arc::new(Mutex::new(Vec::new()));
    let events = Arc::new(Mutex::new(Vec::new()));

    let s = seen.clone();
    let e = events.clone();
    let channel = create_single_flight(move |req: FetchRequest| {
        let signal = req.signal.clone().expect("signal attached");
        {
            let mut seen = s.lock().unwrap();
            let previous_aborted = seen.last().map(CancellationSignal::is_aborted);
            e.lock().unwrap().push(format!(
                "start {} (previous aborted: {:?})",
                req.url.path(),
                previous_aborted
            ));
            seen.push(signal.clone());
        }
        async move {
            if req.url.path() == "/a" {
                Err(FetchError::aborted(signal.cancelled().await))
            } else {
                Ok(req.url.path().to_string())
            }
        }
    });

    let call_a = channel.fetch(common::request("/a"));
    assert_eq!(channel.state(), ChannelState::Loading);
    let call_b = channel.fetch(common::request("/b"));

    assert_eq!(call_b.await.unwrap(), "/b");
    let err = call_a.await.unwrap_err();
    assert_eq!(err.abort_reason(), Some(FETCH_REQUEST_ABORTED));

    assert_eq!(
        *events.lock().unwrap(),
        vec![
            "start /a (previous aborted: None)".to_string(),
            "start /b (previous aborted: Some(true))".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_superseded_call_does_not_reset_state() {
    let calls = Arc::new(AtomicU32::new(0));
    let channel = SingleFlight::new(common::hanging_transport(calls.clone()));

    let call_a = channel.fetch(common::request("/a"));
    let _call_b = channel.fetch(common::request("/b"));

    assert!(call_a.await.unwrap_err().is_abort());
    assert_eq!(channel.state(), ChannelState::Loading, "b is still outstanding");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_cancel_aborts_current_and_goes_idle() {
    let calls = Arc::new(AtomicU32::new(0));
    let channel = SingleFlight::new(common::hanging_transport(calls.clone()));

    let handle = tokio::spawn(channel.fetch(common::request("/slow")));
    tokio::time::sleep(Duration::from_millis(10)).await;
    channel.cancel();

    assert_eq!(channel.state(), ChannelState::Idle);
    let err = handle.await.unwrap().unwrap_err();
    assert_eq!(err.abort_reason(), Some(FETCH_REQUEST_ABORTED));
}

#[tokio::test]
async fn test_caller_signal_still_aborts() {
    let calls = Arc::new(AtomicU32::new(0));
    let channel = SingleFlight::new(common::hanging_transport(calls.clone()));
    let caller = CancellationSignal::new();

    let call = channel.fetch(common::request("/").signal(caller.clone()));
    caller.abort_with("user navigated away");

    let err = call.await.unwrap_err();
    assert_eq!(err.abort_reason(), Some("user navigated away"));
    assert_eq!(channel.state(), ChannelState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_supersession_reaches_through_retry_layer() {
    let calls = Arc::new(AtomicU32::new(0));
    let retry = RetryFetch::new(
        common::hanging_transport(calls.clone()),
        RetryPolicy::new(5, Duration::from_secs(1)).unwrap(),
    );
    let channel = SingleFlight::new(retry);

    let call_a = channel.fetch(common::request("/a"));
    let handle_a = tokio::spawn(call_a);
    tokio::time::sleep(Duration::from_millis(10)).await;

    let _call_b = channel.fetch(common::request("/b"));

    let err = handle_a.await.unwrap().unwrap_err();
    assert!(err.is_abort());
    // a was attempted once and never retried; b is never polled.
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
