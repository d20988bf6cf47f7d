//! Client side of an image classification service.
//!
//! A [`Session`] models one upload page: it accepts a file from the picker or
//! a drop, validates it, renders a preview, submits it to the inference
//! service through a [`Transport`] and renders the returned classification,
//! optionally with explainability maps. The page itself is the [`PageView`]
//! value the session keeps up to date; hosts only have to draw it.
//!
//! ```no_run
//! use infernum_lens::{
//!     ActionId, ClientConfig, HttpTransport, Mode, SelectedFile, SelectionEvent, Session,
//! };
//!
//! # async fn run() -> Result<(), infernum_lens::Error> {
//! let transport = HttpTransport::new(ClientConfig::default());
//! let mut session = Session::new();
//! session.select(SelectionEvent::picker(ActionId(1), SelectedFile::from_path("cat.jpg")?));
//! session.submit(Mode::Explain, &transport).await;
//! println!("{}", session.view());
//! # Ok(())
//! # }
//! ```

mod error;
mod file;
mod mode;
mod response;
mod session;
mod transport;
mod view;

pub use error::{
    ContentError, Error, GENERIC_FAILURE_MESSAGE, Result, TransportError,
    UNEXPECTED_RESPONSE_MESSAGE, ValidationError,
};
pub use file::{ALLOWED_MIME_TYPES, MAX_FILE_SIZE, SelectedFile, validate};
pub use mode::{Mode, XaiMethod};
pub use response::{Prediction, XaiMaps};
pub use session::{
    ActionId, PendingRequest, SelectOutcome, SelectionEvent, SelectionSource, Session,
    SessionState, SubmitOutcome,
};
pub use transport::{ClientConfig, DEFAULT_BASE_URL, HttpTransport, Transport};
pub use view::{ANALYZING_LABEL, ButtonView, PageView, PreviewView, ResultView, XaiCard};
