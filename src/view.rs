use std::fmt;

use base64::Engine;

use crate::{
    file::SelectedFile,
    mode::{Mode, XaiMethod},
    response::Prediction,
};

/// Label shown on the button of the mode being analyzed.
pub const ANALYZING_LABEL: &str = "Analyzing...";

fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!(
        "data:{mime};base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// One of the two action buttons.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ButtonView {
    /// The mode this button submits.
    pub mode: Mode,
    /// Either the mode's idle label or [`ANALYZING_LABEL`].
    pub label: &'static str,
    /// Whether the loading spinner is shown.
    pub spinner: bool,
    pub disabled: bool,
}

impl ButtonView {
    fn idle(mode: Mode, enabled: bool) -> Self {
        Self {
            mode,
            label: mode.idle_label(),
            spinner: false,
            disabled: !enabled,
        }
    }

    fn loading(mode: Mode) -> Self {
        Self {
            mode,
            label: ANALYZING_LABEL,
            spinner: true,
            disabled: true,
        }
    }
}

/// Thumbnail of the selected file with its remove control.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreviewView {
    pub file_name: String,
    /// `data:<mime>;base64,...` source for the thumbnail.
    pub data_url: String,
    /// Whether the overlay control that removes the file is shown.
    pub removable: bool,
}

impl PreviewView {
    pub fn from_file(file: &SelectedFile) -> Self {
        Self {
            file_name: file.name().to_string(),
            data_url: data_url(file.mime(), file.bytes()),
            removable: true,
        }
    }
}

/// One explainability map in the result panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XaiCard {
    pub method: XaiMethod,
    pub png: Vec<u8>,
}

impl XaiCard {
    pub fn data_url(&self) -> String {
        data_url("image/png", &self.png)
    }
}

/// The result panel.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultView {
    /// Heading, which depends on the mode.
    pub title: &'static str,
    pub predicted_class: String,
    /// `round(confidence_score * 100)`.
    pub confidence_percent: u32,
    /// Shown only when the response named the file.
    pub filename: Option<String>,
    /// Shown only when the response listed the classes.
    pub all_classes: Vec<String>,
    /// `Some` only for explain-mode responses that carried an `xai` object.
    pub xai_cards: Option<Vec<XaiCard>>,
}

impl ResultView {
    pub fn render(prediction: &Prediction, mode: Mode) -> Self {
        let xai_cards = match (mode, &prediction.xai) {
            (Mode::Explain, Some(maps)) => Some(
                maps.iter()
                    .map(|(method, png)| XaiCard {
                        method,
                        png: png.to_vec(),
                    })
                    .collect(),
            ),
            _ => None,
        };

        Self {
            title: mode.result_title(),
            predicted_class: prediction.predicted_class.clone(),
            confidence_percent: prediction.confidence_percent(),
            filename: prediction.filename.clone(),
            all_classes: prediction.all_classes.clone(),
            xai_cards,
        }
    }
}

/// Everything the page displays. `PageView::default()` is the initial,
/// empty page.
#[derive(Clone, Debug, PartialEq)]
pub struct PageView {
    pub upload_area_visible: bool,
    pub drag_over: bool,
    pub preview: Option<PreviewView>,
    pub predict_button: ButtonView,
    pub explain_button: ButtonView,
    pub error: Option<String>,
    pub result: Option<ResultView>,
}

impl Default for PageView {
    fn default() -> Self {
        Self {
            upload_area_visible: true,
            drag_over: false,
            preview: None,
            predict_button: ButtonView::idle(Mode::Predict, false),
            explain_button: ButtonView::idle(Mode::Explain, false),
            error: None,
            result: None,
        }
    }
}

impl PageView {
    pub fn button(&self, mode: Mode) -> &ButtonView {
        match mode {
            Mode::Predict => &self.predict_button,
            Mode::Explain => &self.explain_button,
        }
    }

    fn button_mut(&mut self, mode: Mode) -> &mut ButtonView {
        match mode {
            Mode::Predict => &mut self.predict_button,
            Mode::Explain => &mut self.explain_button,
        }
    }

    pub(crate) fn show_preview(&mut self, preview: PreviewView) {
        self.preview = Some(preview);
        self.upload_area_visible = false;
    }

    pub(crate) fn clear_preview(&mut self) {
        self.preview = None;
        self.upload_area_visible = true;
    }

    pub(crate) fn set_buttons_enabled(&mut self, enabled: bool) {
        for mode in Mode::ALL {
            self.button_mut(mode).disabled = !enabled;
        }
    }

    pub(crate) fn set_loading(&mut self, mode: Mode) {
        *self.button_mut(mode) = ButtonView::loading(mode);
        self.set_buttons_enabled(false);
    }

    pub(crate) fn set_idle(&mut self, enabled: bool) {
        for mode in Mode::ALL {
            *self.button_mut(mode) = ButtonView::idle(mode, enabled);
        }
    }

    pub(crate) fn show_error(&mut self, message: &str) {
        self.error = Some(message.to_string());
    }

    pub(crate) fn hide_error(&mut self) {
        self.error = None;
    }

    pub(crate) fn show_result(&mut self, result: ResultView) {
        self.result = Some(result);
    }

    pub(crate) fn hide_result(&mut self) {
        self.result = None;
    }
}

impl fmt::Display for ButtonView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.label)?;
        if self.spinner {
            f.write_str(" (spinner)")?;
        }
        if self.disabled {
            f.write_str(" (disabled)")?;
        }
        Ok(())
    }
}

impl fmt::Display for ResultView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        if let Some(filename) = &self.filename {
            writeln!(f, "  File: {filename}")?;
        }
        writeln!(f, "  Predicted Class: {}", self.predicted_class)?;
        writeln!(f, "  Confidence: {}%", self.confidence_percent)?;
        if !self.all_classes.is_empty() {
            writeln!(f, "  Classes: {}", self.all_classes.join(", "))?;
        }
        if let Some(cards) = &self.xai_cards {
            writeln!(f, "  Explainability Maps")?;
            for card in cards {
                writeln!(f, "    {}: {} byte PNG", card.method, card.png.len())?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for PageView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.upload_area_visible {
            let hint = if self.drag_over {
                "release to upload"
            } else {
                "drop an image or click to browse"
            };
            writeln!(f, "[upload] {hint}")?;
        }
        if let Some(preview) = &self.preview {
            writeln!(f, "[preview] {} [x]", preview.file_name)?;
        }
        writeln!(f, "{} {}", self.predict_button, self.explain_button)?;
        if let Some(error) = &self.error {
            writeln!(f, "error: {error}")?;
        }
        if let Some(result) = &self.result {
            write!(f, "{result}")?;
        }
        Ok(())
    }
}
