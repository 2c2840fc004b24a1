//! Session driver for log streaming.

use runwatch_core::{LogSink, Scope, SessionTarget};
use runwatch_input::{InputError, InputGate, Resolution};
use runwatch_transport::{
    ConnectOptions, DecodeError, Frame, FrameSource, TransportError, WsConnection, connect, decode,
};

/// Session error.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Input(#[from] InputError),
}

/// Counters of a finished session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionReport {
    /// Records decoded and rendered.
    pub records: usize,
    /// Input requests answered.
    pub inputs_submitted: usize,
    /// Input requests found stale.
    pub inputs_skipped: usize,
}

/// Drives one log streaming session.
///
/// Frames are handled strictly in order: each record is rendered, and any
/// input request it raises is resolved before the next frame is read.
pub struct SessionDriver<F, S> {
    scope: Scope,
    frames: F,
    sink: S,
    input_gate: Option<Box<dyn InputGate>>,
}

impl<S: LogSink> SessionDriver<WsConnection, S> {
    /// Connect to the log stream of `target`.
    ///
    /// # Errors
    /// Returns error if the connection cannot be established.
    pub async fn connect(
        target: &SessionTarget,
        server_url: &str,
        access_token: &str,
        options: ConnectOptions,
        sink: S,
    ) -> Result<Self, SessionError> {
        let conn = connect(server_url, &target.path, access_token, options).await?;
        tracing::info!(path = %target.path, "Session connected");
        Ok(Self::new(target, conn, sink))
    }
}

impl<F: FrameSource, S: LogSink> SessionDriver<F, S> {
    /// Create a driver over an open frame source.
    ///
    /// The record shape is fixed here from the target scope.
    #[must_use]
    pub fn new(target: &SessionTarget, frames: F, sink: S) -> Self {
        Self {
            scope: target.scope.clone(),
            frames,
            sink,
            input_gate: None,
        }
    }

    /// Resolve input requests with `gate`.
    #[must_use]
    pub fn with_input_gate(mut self, gate: Box<dyn InputGate>) -> Self {
        self.input_gate = Some(gate);
        self
    }

    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Stream until the peer closes or a fatal error occurs.
    ///
    /// The frame source is closed on every exit path.
    ///
    /// # Errors
    /// Returns the first transport, decode or input error.
    pub async fn run(&mut self) -> Result<SessionReport, SessionError> {
        let result = self.stream().await;
        self.frames.close().await;
        match &result {
            Ok(report) => tracing::info!(?report, "Session ended"),
            Err(e) => tracing::debug!("Session failed: {e}"),
        }
        result
    }

    async fn stream(&mut self) -> Result<SessionReport, SessionError> {
        let mut report = SessionReport::default();

        while let Some(frame) = self.frames.next_frame().await? {
            let text = match frame {
                Frame::Text(text) => text,
                Frame::Close => break,
                Frame::Ping | Frame::Pong => continue,
                Frame::Binary(data) => {
                    tracing::warn!(len = data.len(), "Skipping binary frame");
                    continue;
                }
            };

            let record = decode(&text, &self.scope)?;
            self.sink.render(&record);
            report.records += 1;

            let (Some(phase_id), Some(gate)) = (record.input_request(), self.input_gate.as_mut())
            else {
                continue;
            };
            match gate.on_input_requested(phase_id, &mut self.sink).await? {
                Resolution::Submitted { .. } => report.inputs_submitted += 1,
                Resolution::RunFinished | Resolution::PhaseMismatch { .. } => {
                    report.inputs_skipped += 1;
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::VecDeque,
        io,
        sync::{
            Arc, Mutex,
            atomic::{AtomicBool, AtomicUsize, Ordering},
        },
    };

    use async_trait::async_trait;
    use runwatch_core::{
        ApiError, InputSubmission, LogRecord, PendingInput, RunApi, RunStatus, RunSummary,
        Severity,
    };
    use runwatch_input::{BatchQueue, InputCoordinator, OperatorPrompt, PromptError};
    use tokio_tungstenite::tungstenite;

    use super::*;

    struct ScriptedFrames {
        frames: VecDeque<Result<Option<Frame>, TransportError>>,
        closed: Arc<AtomicBool>,
    }

    impl ScriptedFrames {
        fn new(frames: Vec<Result<Option<Frame>, TransportError>>) -> (Self, Arc<AtomicBool>) {
            let closed = Arc::new(AtomicBool::new(false));
            let source = Self {
                frames: frames.into(),
                closed: Arc::clone(&closed),
            };
            (source, closed)
        }
    }

    #[async_trait]
    impl FrameSource for ScriptedFrames {
        async fn next_frame(&mut self) -> Result<Option<Frame>, TransportError> {
            self.frames.pop_front().unwrap_or(Ok(None))
        }

        async fn close(&mut self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        lines: Vec<String>,
    }

    impl LogSink for RecordingSink {
        fn render(&mut self, record: &LogRecord) {
            self.lines.push(record.content().to_string());
        }

        fn notice(&mut self, _severity: Severity, msg: &str) {
            self.lines.push(msg.to_string());
        }
    }

    struct CountingGate {
        calls: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl InputGate for CountingGate {
        async fn on_input_requested(
            &mut self,
            phase_id: &str,
            sink: &mut dyn LogSink,
        ) -> Result<Resolution, InputError> {
            self.calls.lock().unwrap().push(phase_id.to_string());
            sink.notice(Severity::Warning, "resolved");
            Ok(Resolution::Submitted {
                phase_id: phase_id.to_string(),
                input_value: "confirm".to_string(),
                source: runwatch_input::AnswerSource::Batch,
            })
        }
    }

    #[derive(Default)]
    struct CountingApi {
        pending_calls: AtomicUsize,
        submissions: Mutex<Vec<InputSubmission>>,
    }

    #[async_trait]
    impl RunApi for CountingApi {
        async fn get_run(&self, run_name: &str) -> Result<RunSummary, ApiError> {
            Ok(RunSummary {
                run_name: run_name.to_string(),
                status: RunStatus::default(),
            })
        }

        async fn get_pending_input(&self, _run_name: &str) -> Result<PendingInput, ApiError> {
            self.pending_calls.fetch_add(1, Ordering::SeqCst);
            Ok(PendingInput {
                phase_id: "gate".to_string(),
                ..PendingInput::default()
            })
        }

        async fn submit_input(
            &self,
            _run_name: &str,
            submission: &InputSubmission,
        ) -> Result<(), ApiError> {
            self.submissions.lock().unwrap().push(submission.clone());
            Ok(())
        }
    }

    struct NoPrompt;

    #[async_trait]
    impl OperatorPrompt for NoPrompt {
        async fn read_line(&mut self) -> Result<String, PromptError> {
            panic!("operator prompted");
        }
    }

    fn run_frame(log_type: &str, phase_id: &str, content: &str) -> Result<Option<Frame>, TransportError> {
        Ok(Some(Frame::Text(format!(
            r#"{{"logType":"{log_type}","phaseID":"{phase_id}","content":"{content}","createTime":"t"}}"#
        ))))
    }

    fn read_failure() -> Result<Option<Frame>, TransportError> {
        Err(TransportError::WebSocket(tungstenite::Error::Io(io::Error::new(
            io::ErrorKind::ConnectionReset,
            "connection reset",
        ))))
    }

    fn gate() -> (Box<dyn InputGate>, Arc<Mutex<Vec<String>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let gate = CountingGate {
            calls: Arc::clone(&calls),
        };
        (Box::new(gate), calls)
    }

    #[tokio::test]
    async fn test_records_rendered_in_order_without_input() {
        let (frames, closed) = ScriptedFrames::new(vec![
            run_frame("INFO", "", "one"),
            run_frame("WARNING", "", "two"),
            run_frame("ERROR", "", "three"),
        ]);
        let (gate, calls) = gate();
        let mut driver = SessionDriver::new(&SessionTarget::run("r1"), frames, RecordingSink::default())
            .with_input_gate(gate);

        let report = driver.run().await.unwrap();

        assert_eq!(report.records, 3);
        assert_eq!(driver.sink().lines, vec!["one", "two", "three"]);
        assert!(calls.lock().unwrap().is_empty());
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_input_resolved_before_next_frame() {
        let (frames, _) = ScriptedFrames::new(vec![
            run_frame("INFO", "", "before"),
            run_frame("INPUT", "gate", "waiting"),
            run_frame("INFO", "", "after"),
        ]);
        let (gate, calls) = gate();
        let mut driver = SessionDriver::new(&SessionTarget::run("r1"), frames, RecordingSink::default())
            .with_input_gate(gate);

        let report = driver.run().await.unwrap();

        assert_eq!(report.inputs_submitted, 1);
        assert_eq!(*calls.lock().unwrap(), vec!["gate"]);
        assert_eq!(driver.sink().lines, vec!["before", "waiting", "resolved", "after"]);
    }

    #[tokio::test]
    async fn test_admin_scope_never_enters_gate() {
        let (frames, _) = ScriptedFrames::new(vec![Ok(Some(Frame::Text(
            r#"{"logType":"INPUT","phaseID":"gate","content":"odd","endTime":""}"#.to_string(),
        )))]);
        let (gate, calls) = gate();
        let mut driver =
            SessionDriver::new(&SessionTarget::admin_audit("a1"), frames, RecordingSink::default())
                .with_input_gate(gate);

        let report = driver.run().await.unwrap();

        assert_eq!(report.records, 1);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_close_frame_ends_session() {
        let (frames, closed) = ScriptedFrames::new(vec![
            run_frame("INFO", "", "one"),
            Ok(Some(Frame::Ping)),
            Ok(Some(Frame::Binary(vec![1, 2]))),
            Ok(Some(Frame::Close)),
            run_frame("INFO", "", "never"),
        ]);
        let mut driver = SessionDriver::new(&SessionTarget::run("r1"), frames, RecordingSink::default());

        let report = driver.run().await.unwrap();

        assert_eq!(report.records, 1);
        assert_eq!(driver.sink().lines, vec!["one"]);
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_malformed_frame_is_fatal() {
        let (frames, closed) = ScriptedFrames::new(vec![
            Ok(Some(Frame::Text("{broken".to_string()))),
            run_frame("INFO", "", "never"),
        ]);
        let mut driver = SessionDriver::new(&SessionTarget::run("r1"), frames, RecordingSink::default());

        let err = driver.run().await.unwrap_err();

        assert!(matches!(err, SessionError::Decode(_)));
        assert!(driver.sink().lines.is_empty());
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_read_failure_after_records_stops_side_calls() {
        let (frames, closed) = ScriptedFrames::new(vec![
            run_frame("INFO", "", "one"),
            run_frame("INFO", "", "two"),
            read_failure(),
            run_frame("INPUT", "gate", "never"),
        ]);
        let api = Arc::new(CountingApi::default());
        let coordinator = InputCoordinator::new(
            Arc::clone(&api) as Arc<dyn RunApi>,
            "r1",
            BatchQueue::new(["approve"]),
            Box::new(NoPrompt),
        );
        let mut driver = SessionDriver::new(&SessionTarget::run("r1"), frames, RecordingSink::default())
            .with_input_gate(Box::new(coordinator));

        let err = driver.run().await.unwrap_err();

        assert!(matches!(err, SessionError::Transport(TransportError::WebSocket(_))));
        assert_eq!(driver.sink().lines, vec!["one", "two"]);
        assert_eq!(api.pending_calls.load(Ordering::SeqCst), 0);
        assert!(api.submissions.lock().unwrap().is_empty());
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_batch_answers_through_driver() {
        let (frames, _) = ScriptedFrames::new(vec![
            run_frame("INPUT", "gate", "first gate"),
            run_frame("INPUT", "other", "superseded gate"),
        ]);
        let api = Arc::new(CountingApi::default());
        let coordinator = InputCoordinator::new(
            Arc::clone(&api) as Arc<dyn RunApi>,
            "r1",
            BatchQueue::new(["approve", "reject"]),
            Box::new(NoPrompt),
        );
        let mut driver = SessionDriver::new(&SessionTarget::run("r1"), frames, RecordingSink::default())
            .with_input_gate(Box::new(coordinator));

        let report = driver.run().await.unwrap();

        assert_eq!(report.inputs_submitted, 1);
        assert_eq!(report.inputs_skipped, 1);
        let submissions = api.submissions.lock().unwrap();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].input_value, "approve");
        assert_eq!(api.pending_calls.load(Ordering::SeqCst), 2);
    }
}
