use std::fmt;

/// Selects the endpoint, the button and the result template of an analysis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Plain classification.
    Predict,
    /// Classification plus explainability maps.
    Explain,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Predict, Mode::Explain];

    /// Returns the mode as a string representation, which is also the
    /// endpoint path segment.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Predict => "predict",
            Mode::Explain => "explain",
        }
    }

    /// Label of the action button while no request is outstanding.
    pub fn idle_label(&self) -> &'static str {
        match self {
            Mode::Predict => "Analyze Image",
            Mode::Explain => "Analyze with XAI",
        }
    }

    /// Heading of the result panel.
    pub fn result_title(&self) -> &'static str {
        match self {
            Mode::Predict => "AI Analysis Results",
            Mode::Explain => "XAI Analysis Results",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Explainability methods the result renderer knows about, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum XaiMethod {
    /// Gradient-weighted class activation mapping.
    GradCam,
    /// Shapley additive explanations.
    Shap,
    /// Local interpretable model-agnostic explanations.
    Lime,
}

impl XaiMethod {
    pub const ALL: [XaiMethod; 3] = [XaiMethod::GradCam, XaiMethod::Shap, XaiMethod::Lime];

    /// Key of the method in the response's `xai` object.
    pub fn as_str(&self) -> &'static str {
        match self {
            XaiMethod::GradCam => "gradcam",
            XaiMethod::Shap => "shap",
            XaiMethod::Lime => "lime",
        }
    }
}

impl fmt::Display for XaiMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
