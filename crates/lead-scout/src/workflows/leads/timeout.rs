use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

/// Why a guarded collaborator call produced no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CallInterrupted {
    #[error("call exceeded {0:?}")]
    TimedOut(Duration),
    #[error("collaborator panicked before answering")]
    Aborted,
}

/// Run `call` on a helper thread and wait at most `timeout` for its answer.
///
/// A call that overruns keeps running detached; its late answer is dropped.
pub(crate) fn call_with_timeout<T, F>(timeout: Duration, call: F) -> Result<T, CallInterrupted>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let _ = sender.send(call());
    });

    match receiver.recv_timeout(timeout) {
        Ok(value) => Ok(value),
        Err(RecvTimeoutError::Timeout) => Err(CallInterrupted::TimedOut(timeout)),
        Err(RecvTimeoutError::Disconnected) => Err(CallInterrupted::Aborted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_value_when_call_is_fast() {
        let value = call_with_timeout(Duration::from_secs(1), || 42).expect("fast call");
        assert_eq!(value, 42);
    }

    #[test]
    fn reports_timeout_for_slow_call() {
        let result = call_with_timeout(Duration::from_millis(20), || {
            thread::sleep(Duration::from_millis(500));
            1
        });
        assert_eq!(
            result,
            Err(CallInterrupted::TimedOut(Duration::from_millis(20)))
        );
    }

    #[test]
    fn reports_abort_when_call_panics() {
        let result: Result<u8, _> =
            call_with_timeout(Duration::from_secs(1), || panic!("lookup exploded"));
        assert_eq!(result, Err(CallInterrupted::Aborted));
    }
}
