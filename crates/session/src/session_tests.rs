use super::*;
use rt_core::collaborators::fake::{FakeEvalError, FakeEvaluator, FakeHost};
use std::io::Cursor;
use std::sync::Arc as StdArc;

struct NullHost;
impl FakeHost for NullHost {
    fn require(&self, _feature: &str) -> Result<(), FakeEvalError> {
        Ok(())
    }
    fn provide(&self, _feature: &str) {}
}

#[test]
fn restores_thread_state_on_normal_return() {
    assert_eq!(thread_state::history_depth(), 0);
    let stream = Arc::new(Mutex::new(Cursor::new(b"define x 1\n".to_vec())));
    {
        let mut session = LoadSession::open(&stream, "<test>", vec!["/a".into()]);
        assert_eq!(thread_state::history_depth(), 1);
        assert_eq!(thread_state::remaining_paths(), vec!["/a".to_string()]);

        let evaluator = FakeEvaluator::new(StdArc::new(NullHost));
        let result = session.run(&evaluator, &"user".to_string(), false);
        assert!(result.is_ok());
    }
    assert_eq!(thread_state::history_depth(), 0);
    assert!(thread_state::remaining_paths().is_empty());
}

#[test]
fn restores_thread_state_even_when_evaluation_fails() {
    assert_eq!(thread_state::history_depth(), 0);
    let stream = Arc::new(Mutex::new(Cursor::new(b"fail boom\n".to_vec())));
    {
        let mut session = LoadSession::open(&stream, "<test>", Vec::new());
        let evaluator = FakeEvaluator::new(StdArc::new(NullHost));
        let result = session.run(&evaluator, &"user".to_string(), false);
        assert!(result.is_err());
    }
    assert_eq!(thread_state::history_depth(), 0);
}

#[test]
fn nested_sessions_deepen_and_unwind_history_in_order() {
    let outer_stream = Arc::new(Mutex::new(Cursor::new(Vec::<u8>::new())));
    let outer = LoadSession::open(&outer_stream, "<outer>", Vec::new());
    assert_eq!(thread_state::history_depth(), 1);

    {
        let inner_stream = Arc::new(Mutex::new(Cursor::new(Vec::<u8>::new())));
        let _inner = LoadSession::open(&inner_stream, "<inner>", Vec::new());
        assert_eq!(thread_state::history_depth(), 2);
    }
    assert_eq!(thread_state::history_depth(), 1);

    drop(outer);
    assert_eq!(thread_state::history_depth(), 0);
}

#[test]
fn stream_is_locked_for_the_session_duration() {
    let stream = Arc::new(Mutex::new(Cursor::new(Vec::<u8>::new())));
    let session = LoadSession::open(&stream, "<test>", Vec::new());
    assert!(stream.try_lock().is_none());
    drop(session);
    assert!(stream.try_lock().is_some());
}

// Guards against a regression where a panic mid-run leaks thread-local
// state for the rest of the test binary: unwinding still runs `Drop`.
#[test]
fn restores_thread_state_when_unwinding() {
    let unwind_result = std::panic::catch_unwind(|| {
        let stream = Arc::new(Mutex::new(Cursor::new(Vec::<u8>::new())));
        let _session = LoadSession::<Cursor<Vec<u8>>>::open(&stream, "<test>", Vec::new());
        panic!("simulated failure mid-load");
    });
    assert!(unwind_result.is_err());
    assert_eq!(thread_state::history_depth(), 0);
}
