use base64::Engine;
use serde::Deserialize;

use crate::{error::ContentError, mode::XaiMethod};

#[derive(Debug, Deserialize)]
struct RawPrediction {
    predicted_class: Option<String>,
    confidence_score: Option<f64>,
    filename: Option<String>,
    all_classes: Option<Vec<String>>,
    xai: Option<RawXaiMaps>,
}

// unknown methods are dropped by serde
#[derive(Debug, Deserialize)]
struct RawXaiMaps {
    gradcam: Option<String>,
    shap: Option<String>,
    lime: Option<String>,
}

impl RawXaiMaps {
    fn get(&self, method: XaiMethod) -> Option<&str> {
        match method {
            XaiMethod::GradCam => self.gradcam.as_deref(),
            XaiMethod::Shap => self.shap.as_deref(),
            XaiMethod::Lime => self.lime.as_deref(),
        }
    }
}

/// Decoded explainability images, kept in [`XaiMethod::ALL`] order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct XaiMaps {
    maps: Vec<(XaiMethod, Vec<u8>)>,
}

impl XaiMaps {
    /// Returns the PNG for `method`, if the response carried one.
    pub fn get(&self, method: XaiMethod) -> Option<&[u8]> {
        self.maps
            .iter()
            .find(|(m, _)| *m == method)
            .map(|(_, png)| png.as_slice())
    }

    /// Iterates the present maps in display order.
    pub fn iter(&self) -> impl Iterator<Item = (XaiMethod, &[u8])> {
        self.maps.iter().map(|(m, png)| (*m, png.as_slice()))
    }
}

/// A classification as returned by the inference service.
#[derive(Clone, Debug, PartialEq)]
pub struct Prediction {
    /// Label of the most likely class.
    pub predicted_class: String,
    /// Always finite and within `[0, 1]`.
    pub confidence_score: f64,
    /// Name of the uploaded file as the service saw it.
    pub filename: Option<String>,
    /// Every class the model can predict; empty when not sent.
    pub all_classes: Vec<String>,
    /// Explainability maps, present only when the response had an `xai` object.
    pub xai: Option<XaiMaps>,
}

impl Prediction {
    /// Parses a response body.
    ///
    /// Parsing is strict: the label and score are required, the score must lie
    /// in `[0, 1]` and every non-empty XAI entry must be valid base64. Empty
    /// XAI entries count as absent.
    pub fn from_json(body: &[u8]) -> Result<Self, ContentError> {
        let raw: RawPrediction = serde_json::from_slice(body)?;

        let predicted_class = raw
            .predicted_class
            .ok_or(ContentError::MissingField("predicted_class"))?;
        let confidence_score = raw
            .confidence_score
            .ok_or(ContentError::MissingField("confidence_score"))?;
        if !(0.0..=1.0).contains(&confidence_score) {
            return Err(ContentError::ScoreOutOfRange(confidence_score));
        }

        let xai = raw.xai.map(decode_maps).transpose()?;

        Ok(Self {
            predicted_class,
            confidence_score,
            filename: raw.filename,
            all_classes: raw.all_classes.unwrap_or_default(),
            xai,
        })
    }

    /// Confidence as a whole percentage, `round(score * 100)`.
    pub fn confidence_percent(&self) -> u32 {
        (self.confidence_score * 100.0).round() as u32
    }
}

fn decode_maps(raw: RawXaiMaps) -> Result<XaiMaps, ContentError> {
    let mut maps = Vec::new();
    for method in XaiMethod::ALL {
        let Some(encoded) = raw.get(method).filter(|s| !s.is_empty()) else {
            continue;
        };
        let png = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|source| ContentError::InvalidImage { method, source })?;
        maps.push((method, png));
    }
    Ok(XaiMaps { maps })
}
