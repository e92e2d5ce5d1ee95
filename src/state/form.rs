//! Field state of the tasting sheet for a single round.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::dto::{
    evaluation::{ColorTone, ColorType, Condition, EvaluationCreate, Limpidity, Quality, Sweetness},
    origin::{Country, Grape},
};

/// Aggregate message shown whenever a required field is missing.
pub const INCOMPLETE_MESSAGE: &str = "Preencha todos os campos obrigatórios.";

/// Reasons a form cannot be turned into a submission.
#[derive(Debug, Error)]
pub enum FormError {
    /// At least one required field is unset.
    #[error("Preencha todos os campos obrigatórios.")]
    Incomplete {
        /// Names of the unset fields.
        missing: Vec<&'static str>,
    },
    /// Every field is set but some value breaks the evaluation rules.
    #[error("Avaliação inválida: {0}")]
    Invalid(#[from] ValidationErrors),
}

/// In-progress answers of a tasting sheet. Every field starts unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationForm {
    /// Visual clarity.
    pub limpidity: Option<Limpidity>,
    /// Color intensity, 1 to 5.
    pub visual_intensity: Option<u8>,
    /// Color family.
    pub color_type: Option<ColorType>,
    /// Hue within the color family.
    pub color_tone: Option<ColorTone>,

    /// Olfactory condition.
    pub condition: Option<Condition>,
    /// Aroma intensity, 1 to 5.
    pub aroma_intensity: Option<u8>,
    /// Aroma notes.
    pub aromas: Option<String>,

    /// Sweetness.
    pub sweetness: Option<Sweetness>,
    /// Tannin, 1 to 5. Cleared for white wines.
    pub tannin: Option<u8>,
    /// Alcohol, 1 to 5.
    pub alcohol: Option<u8>,
    /// Body, 1 to 5.
    pub consistence: Option<u8>,
    /// Acidity, 1 to 5.
    pub acidity: Option<u8>,
    /// Finish length, 1 to 5.
    pub persistence: Option<u8>,
    /// Flavor notes.
    pub flavors: Option<String>,

    /// Overall quality.
    pub quality: Option<Quality>,
    /// Grape variety.
    pub grape: Option<Grape>,
    /// Country of origin.
    pub country: Option<Country>,
    /// Vintage year.
    pub vintage: Option<i32>,
}

impl EvaluationForm {
    /// Select the color family. The tone is cleared, and so is tannin for white wines.
    pub fn set_color_type(&mut self, color_type: ColorType) {
        self.color_type = Some(color_type);
        self.color_tone = None;
        if !color_type.requires_tannin() {
            self.tannin = None;
        }
    }

    /// Clear every answer.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Names of the required fields that are still unset, in sheet order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let tannin_required = self.color_type.is_none_or(ColorType::requires_tannin);
        let checks: [(&'static str, bool); 15] = [
            ("limpidity", self.limpidity.is_some()),
            ("visual_intensity", self.visual_intensity.is_some()),
            ("color_type", self.color_type.is_some()),
            ("color_tone", self.color_tone.is_some()),
            ("condition", self.condition.is_some()),
            ("aroma_intensity", self.aroma_intensity.is_some()),
            ("sweetness", self.sweetness.is_some()),
            ("tannin", !tannin_required || self.tannin.is_some()),
            ("alcohol", self.alcohol.is_some()),
            ("consistence", self.consistence.is_some()),
            ("acidity", self.acidity.is_some()),
            ("persistence", self.persistence.is_some()),
            ("quality", self.quality.is_some()),
            ("grape", self.grape.is_some()),
            ("country", self.country.is_some()),
        ];
        checks
            .into_iter()
            .filter(|(_, present)| !present)
            .map(|(name, _)| name)
            .collect()
    }

    /// Whether every required field is set. Tannin is exempt exactly for white wines.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Build the submission payload for `round_id`, tagged with the caller's role.
    pub fn to_payload(
        &self,
        participant_id: Uuid,
        round_id: Uuid,
        is_answer_key: bool,
    ) -> Result<EvaluationCreate, FormError> {
        let missing = self.missing_fields();
        let (
            Some(limpidity),
            Some(visual_intensity),
            Some(color_type),
            Some(color_tone),
            Some(condition),
            Some(aroma_intensity),
            Some(sweetness),
            Some(alcohol),
            Some(consistence),
            Some(acidity),
            Some(persistence),
            Some(quality),
            Some(grape),
            Some(country),
        ) = (
            self.limpidity,
            self.visual_intensity,
            self.color_type,
            self.color_tone,
            self.condition,
            self.aroma_intensity,
            self.sweetness,
            self.alcohol,
            self.consistence,
            self.acidity,
            self.persistence,
            self.quality,
            self.grape,
            self.country,
        )
        else {
            return Err(FormError::Incomplete { missing });
        };
        if !missing.is_empty() {
            return Err(FormError::Incomplete { missing });
        }

        let payload = EvaluationCreate {
            participant_id,
            round_id,
            limpidity,
            visual_intensity,
            color_type,
            color_tone,
            condition,
            aroma_intensity,
            aromas: self.aromas.clone(),
            sweetness,
            tannin: self.tannin.filter(|_| color_type.requires_tannin()),
            alcohol,
            consistence,
            acidity,
            persistence,
            flavors: self.flavors.clone(),
            quality,
            grape,
            country,
            vintage: self.vintage.unwrap_or(0),
            is_answer_key,
        };
        payload.validate()?;
        Ok(payload)
    }
}
