use crate::{
    error::{Error, TransportError},
    file::{self, SelectedFile},
    mode::Mode,
    response::Prediction,
    transport::Transport,
    view::{PageView, PreviewView, ResultView},
};

/// Identifies one physical user action (a click, a drop).
///
/// Hosts hand out increasing ids. Native events that fire more than once for
/// the same action carry the same id and are suppressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActionId(pub u64);

/// Where a candidate file came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionSource {
    /// The file picker's change event.
    Picker,
    /// A drop on the upload area.
    Drop,
}

/// A candidate file coming from the picker or a drop.
#[derive(Clone, Debug)]
pub struct SelectionEvent {
    pub action: ActionId,
    pub source: SelectionSource,
    pub file: SelectedFile,
}

impl SelectionEvent {
    pub fn picker(action: ActionId, file: SelectedFile) -> Self {
        Self {
            action,
            source: SelectionSource::Picker,
            file,
        }
    }

    pub fn drop(action: ActionId, file: SelectedFile) -> Self {
        Self {
            action,
            source: SelectionSource::Drop,
            file,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectOutcome {
    /// The file is now selected. When `reset_picker` is set the host must
    /// clear the picker's value so the same file can be chosen again.
    Accepted { reset_picker: bool },
    /// The file failed validation; the banner shows why.
    Rejected(crate::error::ValidationError),
    /// The event repeats an action that was already handled.
    Duplicate,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SessionState {
    /// No request is outstanding.
    Idle,
    /// A request is outstanding and further submissions are ignored.
    Processing,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Processing => "processing",
        }
    }
}

/// A submission that has been started and is waiting for its response.
#[derive(Clone, Debug)]
pub struct PendingRequest {
    token: u64,
    generation: u64,
    mode: Mode,
    file: SelectedFile,
}

impl PendingRequest {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn file(&self) -> &SelectedFile {
        &self.file
    }
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// No file was selected or a request was already outstanding.
    Skipped,
    /// The result panel shows the prediction.
    Rendered,
    /// The error banner shows `error.user_message()`.
    Failed(Error),
    /// The response arrived after its file was removed or replaced.
    Discarded,
    /// The request is not the outstanding one.
    Stale,
}

/// One user's upload page: the selected file, the in-flight guard and the
/// rendered view.
///
/// The session is the single writer of all three. Hosts construct it once,
/// route every UI event into it and render [`Session::view`] afterwards.
#[derive(Debug)]
pub struct Session {
    file: Option<SelectedFile>,
    // bumped whenever the selected file changes
    generation: u64,
    last_action: Option<ActionId>,
    in_flight: Option<u64>,
    next_token: u64,
    view: PageView,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            file: None,
            generation: 0,
            last_action: None,
            in_flight: None,
            next_token: 0,
            view: PageView::default(),
        }
    }

    pub fn view(&self) -> &PageView {
        &self.view
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn state(&self) -> SessionState {
        match self.in_flight {
            Some(_) => SessionState::Processing,
            None => SessionState::Idle,
        }
    }

    pub fn drag_over(&mut self) {
        self.view.drag_over = true;
    }

    pub fn drag_leave(&mut self) {
        self.view.drag_over = false;
    }

    /// Handles a picker change or a drop.
    ///
    /// A rejected file leaves the current selection in place and shows the
    /// validation message.
    pub fn select(&mut self, event: SelectionEvent) -> SelectOutcome {
        if event.source == SelectionSource::Drop {
            self.view.drag_over = false;
        }

        if self.last_action.is_some_and(|last| event.action <= last) {
            log::debug!("Ignoring duplicate selection event {:?}", event.action);
            return SelectOutcome::Duplicate;
        }

        self.view.hide_error();
        if let Err(e) = file::validate(&event.file) {
            log::warn!("Rejected {}: {}", event.file.name(), e);
            self.view.show_error(e.user_message());
            return SelectOutcome::Rejected(e);
        }

        log::info!(
            "Selected {} ({}, {} bytes)",
            event.file.name(),
            event.file.mime(),
            event.file.size()
        );

        self.last_action = Some(event.action);
        self.generation += 1;
        self.view.show_preview(PreviewView::from_file(&event.file));
        self.view.hide_result();
        if self.in_flight.is_none() {
            self.view.set_buttons_enabled(true);
        }
        self.file = Some(event.file);

        SelectOutcome::Accepted {
            reset_picker: event.source == SelectionSource::Picker,
        }
    }

    /// Drops the selected file and returns the page to its empty state.
    pub fn remove(&mut self) {
        if let Some(file) = self.file.take() {
            log::debug!("Removed {}", file.name());
        }
        self.generation += 1;
        self.view.clear_preview();
        self.view.drag_over = false;
        self.view.set_buttons_enabled(false);
        self.view.hide_result();
        self.view.hide_error();
    }

    /// Starts a submission, or returns `None` when there is nothing to submit
    /// or a request is already outstanding.
    pub fn begin_submit(&mut self, mode: Mode) -> Option<PendingRequest> {
        let Some(file) = &self.file else {
            log::debug!("No file selected, ignoring {mode} request");
            return None;
        };
        if let Some(token) = self.in_flight {
            log::debug!("Request {token} still outstanding, ignoring {mode} request");
            return None;
        }

        let token = self.next_token;
        self.next_token += 1;
        self.in_flight = Some(token);

        let pending = PendingRequest {
            token,
            generation: self.generation,
            mode,
            file: file.clone(),
        };

        self.view.hide_error();
        self.view.hide_result();
        self.view.set_loading(mode);
        log::debug!("Started {mode} request {token}, session {}", self.state().as_str());

        Some(pending)
    }

    /// Finishes a submission with the transport's outcome.
    ///
    /// Unless the request is stale, the in-flight guard is released and the
    /// buttons return to their idle presentation on every path.
    pub fn complete_submit(
        &mut self,
        pending: PendingRequest,
        outcome: Result<Vec<u8>, TransportError>,
    ) -> SubmitOutcome {
        if self.in_flight != Some(pending.token) {
            log::warn!("Ignoring response to stale request {}", pending.token);
            return SubmitOutcome::Stale;
        }
        self.in_flight = None;
        self.view.set_idle(self.file.is_some());
        log::debug!("Request {} finished, session {}", pending.token, self.state().as_str());

        if pending.generation != self.generation {
            match &outcome {
                Ok(body) => log::debug!(
                    "Discarding {} byte response for {}, selection changed",
                    body.len(),
                    pending.file.name()
                ),
                Err(e) => log::debug!(
                    "Discarding failed response for {} ({}), selection changed",
                    pending.file.name(),
                    e
                ),
            }
            return SubmitOutcome::Discarded;
        }

        let prediction = outcome
            .map_err(Error::from)
            .and_then(|body| Prediction::from_json(&body).map_err(Error::from));

        match prediction {
            Ok(prediction) => {
                log::info!(
                    "{} classified as {} ({}%)",
                    pending.file.name(),
                    prediction.predicted_class,
                    prediction.confidence_percent()
                );
                self.view
                    .show_result(ResultView::render(&prediction, pending.mode));
                SubmitOutcome::Rendered
            }
            Err(e) => {
                log::error!("{} request for {} failed: {}", pending.mode, pending.file.name(), e);
                self.view.show_error(e.user_message());
                SubmitOutcome::Failed(e)
            }
        }
    }

    /// Runs a whole submission against `transport`.
    pub async fn submit<T: Transport>(&mut self, mode: Mode, transport: &T) -> SubmitOutcome {
        let Some(pending) = self.begin_submit(mode) else {
            return SubmitOutcome::Skipped;
        };
        let outcome = transport.send(pending.mode(), pending.file()).await;
        self.complete_submit(pending, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{GENERIC_FAILURE_MESSAGE, UNEXPECTED_RESPONSE_MESSAGE, ValidationError},
        mode::XaiMethod,
        view::ANALYZING_LABEL,
    };
    use std::sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    struct MockTransport {
        reply: Result<Vec<u8>, TransportError>,
        calls: AtomicUsize,
        modes: Mutex<Vec<Mode>>,
    }

    impl MockTransport {
        fn replying(body: &str) -> Self {
            Self::with(Ok(body.as_bytes().to_vec()))
        }

        fn with(reply: Result<Vec<u8>, TransportError>) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
                modes: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Transport for MockTransport {
        async fn send(&self, mode: Mode, _file: &SelectedFile) -> Result<Vec<u8>, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.modes.lock().unwrap().push(mode);
            self.reply.clone()
        }
    }

    fn jpeg(size: usize) -> SelectedFile {
        SelectedFile::new("photo.jpg", "image/jpeg", vec![0xffu8; size])
    }

    fn selected_session() -> Session {
        let mut session = Session::new();
        let outcome = session.select(SelectionEvent::picker(ActionId(1), jpeg(2 * 1024 * 1024)));
        assert_eq!(outcome, SelectOutcome::Accepted { reset_picker: true });
        session
    }

    fn assert_idle_with_file(session: &Session) {
        assert_eq!(session.state(), SessionState::Idle);
        for mode in Mode::ALL {
            let button = session.view().button(mode);
            assert_eq!(button.label, mode.idle_label());
            assert!(!button.spinner);
            assert!(!button.disabled);
        }
    }

    #[test]
    fn accepted_selection_renders_preview() {
        let session = selected_session();
        let view = session.view();
        assert!(!view.upload_area_visible);
        assert_eq!(view.preview.as_ref().unwrap().file_name, "photo.jpg");
        assert_idle_with_file(&session);
    }

    #[test]
    fn drop_does_not_reset_picker() {
        let mut session = Session::new();
        session.drag_over();
        assert!(session.view().drag_over);
        let outcome = session.select(SelectionEvent::drop(ActionId(1), jpeg(10)));
        assert_eq!(outcome, SelectOutcome::Accepted { reset_picker: false });
        assert!(!session.view().drag_over);
    }

    #[test]
    fn duplicate_events_are_ignored() {
        let mut session = selected_session();
        let other = SelectedFile::new("other.png", "image/png", vec![1u8; 10]);
        let outcome = session.select(SelectionEvent::drop(ActionId(1), other.clone()));
        assert_eq!(outcome, SelectOutcome::Duplicate);
        assert_eq!(session.selected_file().unwrap().name(), "photo.jpg");

        let outcome = session.select(SelectionEvent::picker(ActionId(2), other));
        assert_eq!(outcome, SelectOutcome::Accepted { reset_picker: true });
        assert_eq!(session.selected_file().unwrap().name(), "other.png");
    }

    #[test]
    fn same_file_can_be_picked_again() {
        let mut session = selected_session();
        session.remove();
        let outcome = session.select(SelectionEvent::picker(ActionId(2), jpeg(2 * 1024 * 1024)));
        assert_eq!(outcome, SelectOutcome::Accepted { reset_picker: true });
    }

    #[test]
    fn rejected_file_keeps_previous_selection() {
        let mut session = selected_session();
        let bad = SelectedFile::new("notes.txt", "text/plain", vec![0u8; 10]);
        let outcome = session.select(SelectionEvent::picker(ActionId(2), bad));
        assert_eq!(
            outcome,
            SelectOutcome::Rejected(ValidationError::InvalidType("text/plain".to_string()))
        );
        assert_eq!(session.view().error.as_deref(), Some("Invalid file type."));
        assert_eq!(session.selected_file().unwrap().name(), "photo.jpg");
    }

    #[tokio::test]
    async fn oversized_png_never_reaches_the_network() {
        let mut session = Session::new();
        let big = SelectedFile::new("big.png", "image/png", vec![0u8; 15 * 1024 * 1024]);
        let outcome = session.select(SelectionEvent::drop(ActionId(1), big));
        assert!(matches!(outcome, SelectOutcome::Rejected(ValidationError::TooLarge { .. })));
        assert_eq!(session.view().error.as_deref(), Some("File must be under 10MB."));
        assert!(session.view().preview.is_none());

        let transport = MockTransport::replying("{}");
        for mode in Mode::ALL {
            assert!(matches!(session.submit(mode, &transport).await, SubmitOutcome::Skipped));
        }
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn invalid_type_never_previews_or_reaches_the_network() {
        let transport = MockTransport::replying("{}");
        for mime in ["text/plain", "image/webp"] {
            let mut session = Session::new();
            let file = SelectedFile::new("upload", mime, vec![0u8; 1024]);
            let outcome = session.select(SelectionEvent::picker(ActionId(1), file));
            assert_eq!(
                outcome,
                SelectOutcome::Rejected(ValidationError::InvalidType(mime.to_string()))
            );
            assert!(session.selected_file().is_none());

            let view = session.view();
            assert!(view.preview.is_none());
            assert!(view.upload_area_visible);
            assert!(view.predict_button.disabled && view.explain_button.disabled);
            assert_eq!(view.error.as_deref(), Some("Invalid file type."));

            for mode in Mode::ALL {
                assert!(matches!(session.submit(mode, &transport).await, SubmitOutcome::Skipped));
            }
        }
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn session_state_names() {
        let mut session = selected_session();
        assert_eq!(session.state().as_str(), "idle");
        session.begin_submit(Mode::Predict).unwrap();
        assert_eq!(session.state().as_str(), "processing");
    }

    #[test]
    fn remove_restores_initial_view() {
        let mut session = selected_session();
        session.select(SelectionEvent::picker(
            ActionId(2),
            SelectedFile::new("a.bmp", "image/bmp", vec![0u8; 4]),
        ));
        assert!(session.view().error.is_some());
        session.remove();
        assert_eq!(session.view(), &PageView::default());
        assert!(session.selected_file().is_none());
    }

    #[tokio::test]
    async fn remove_after_result_restores_initial_view() {
        let mut session = selected_session();
        let transport =
            MockTransport::replying(r#"{"predicted_class":"cat","confidence_score":0.93}"#);
        session.submit(Mode::Predict, &transport).await;
        assert!(session.view().result.is_some());
        session.remove();
        assert_eq!(session.view(), &PageView::default());
    }

    #[tokio::test]
    async fn predict_renders_label_and_percentage() {
        let mut session = selected_session();
        let transport =
            MockTransport::replying(r#"{"predicted_class":"cat","confidence_score":0.93}"#);
        let outcome = session.submit(Mode::Predict, &transport).await;
        assert!(matches!(outcome, SubmitOutcome::Rendered));

        let result = session.view().result.as_ref().unwrap();
        assert_eq!(result.predicted_class, "cat");
        assert_eq!(result.confidence_percent, 93);
        assert!(session.view().to_string().contains("Confidence: 93%"));
        assert_eq!(*transport.modes.lock().unwrap(), vec![Mode::Predict]);
        assert_idle_with_file(&session);
    }

    #[tokio::test]
    async fn explain_renders_only_gradcam_card() {
        let mut session = selected_session();
        let transport = MockTransport::replying(
            r#"{"predicted_class":"dog","confidence_score":0.5,"xai":{"gradcam":"iVBORw0KGgo="}}"#,
        );
        let outcome = session.submit(Mode::Explain, &transport).await;
        assert!(matches!(outcome, SubmitOutcome::Rendered));

        let result = session.view().result.as_ref().unwrap();
        assert_eq!(result.predicted_class, "dog");
        assert_eq!(result.confidence_percent, 50);
        let cards = result.xai_cards.as_ref().unwrap();
        let methods: Vec<_> = cards.iter().map(|c| c.method).collect();
        assert_eq!(methods, vec![XaiMethod::GradCam]);
        assert_eq!(*transport.modes.lock().unwrap(), vec![Mode::Explain]);
    }

    #[tokio::test]
    async fn http_error_shows_generic_message_and_recovers() {
        let mut session = selected_session();
        let transport = MockTransport::with(Err(TransportError::Status { status: 500 }));
        let outcome = session.submit(Mode::Predict, &transport).await;
        assert!(matches!(
            outcome,
            SubmitOutcome::Failed(Error::Transport(TransportError::Status { status: 500 }))
        ));
        assert_eq!(session.view().error.as_deref(), Some(GENERIC_FAILURE_MESSAGE));
        assert!(session.view().result.is_none());
        assert_idle_with_file(&session);
    }

    #[tokio::test]
    async fn missing_fields_show_distinct_message() {
        let mut session = selected_session();
        let transport = MockTransport::replying(r#"{"predicted_class":"cat"}"#);
        let outcome = session.submit(Mode::Explain, &transport).await;
        assert!(matches!(outcome, SubmitOutcome::Failed(Error::Content(_))));
        assert_eq!(session.view().error.as_deref(), Some(UNEXPECTED_RESPONSE_MESSAGE));
        assert!(session.view().result.is_none());
        assert_idle_with_file(&session);
    }

    #[tokio::test]
    async fn new_submission_clears_previous_error() {
        let mut session = selected_session();
        let failing = MockTransport::with(Err(TransportError::Network("reset".to_string())));
        session.submit(Mode::Predict, &failing).await;
        assert!(session.view().error.is_some());

        let pending = session.begin_submit(Mode::Predict).unwrap();
        assert!(session.view().error.is_none());
        let body = br#"{"predicted_class":"cat","confidence_score":1}"#.to_vec();
        session.complete_submit(pending, Ok(body));
        assert!(session.view().error.is_none());
        assert_eq!(session.view().result.as_ref().unwrap().confidence_percent, 100);
    }

    #[test]
    fn loading_state_while_outstanding() {
        let mut session = selected_session();
        let pending = session.begin_submit(Mode::Explain).unwrap();
        assert_eq!(pending.mode(), Mode::Explain);
        assert_eq!(session.state(), SessionState::Processing);

        let view = session.view();
        assert_eq!(view.explain_button.label, ANALYZING_LABEL);
        assert!(view.explain_button.spinner);
        assert_eq!(view.predict_button.label, "Analyze Image");
        assert!(!view.predict_button.spinner);
        assert!(view.explain_button.disabled && view.predict_button.disabled);
    }

    #[test]
    fn second_submission_is_ignored_while_outstanding() {
        let mut session = selected_session();
        let pending = session.begin_submit(Mode::Predict).unwrap();
        assert!(session.begin_submit(Mode::Predict).is_none());
        assert!(session.begin_submit(Mode::Explain).is_none());

        let outcome = session.complete_submit(pending, Err(TransportError::Status { status: 503 }));
        assert!(matches!(outcome, SubmitOutcome::Failed(_)));
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.begin_submit(Mode::Explain).is_some());
    }

    #[test]
    fn stale_requests_are_ignored() {
        let mut session = selected_session();
        let first = session.begin_submit(Mode::Predict).unwrap();
        let replay = first.clone();
        session.complete_submit(first, Err(TransportError::Status { status: 500 }));

        let second = session.begin_submit(Mode::Predict).unwrap();
        let outcome = session.complete_submit(replay, Err(TransportError::Status { status: 500 }));
        assert!(matches!(outcome, SubmitOutcome::Stale));
        assert_eq!(session.state(), SessionState::Processing);

        let body = br#"{"predicted_class":"cat","confidence_score":0.2}"#.to_vec();
        assert!(matches!(session.complete_submit(second, Ok(body)), SubmitOutcome::Rendered));
    }

    #[test]
    fn selection_during_flight_keeps_buttons_disabled() {
        let mut session = selected_session();
        let pending = session.begin_submit(Mode::Predict).unwrap();
        session.select(SelectionEvent::drop(ActionId(2), jpeg(64)));
        assert!(session.view().predict_button.disabled);
        assert!(session.view().explain_button.disabled);

        let body = br#"{"predicted_class":"cat","confidence_score":0.2}"#.to_vec();
        let outcome = session.complete_submit(pending, Ok(body));
        assert!(matches!(outcome, SubmitOutcome::Discarded));
        assert!(session.view().result.is_none());
        assert_idle_with_file(&session);
    }

    #[test]
    fn removal_during_flight_discards_response() {
        let mut session = selected_session();
        let pending = session.begin_submit(Mode::Explain).unwrap();
        session.remove();

        let outcome = session.complete_submit(pending, Err(TransportError::Status { status: 500 }));
        assert!(matches!(outcome, SubmitOutcome::Discarded));
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.view(), &PageView::default());
    }
}
