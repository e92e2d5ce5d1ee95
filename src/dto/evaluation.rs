//! Sensory evaluation vocabulary and the payloads exchanged with `/evaluations`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::dto::{
    origin::{Country, Grape},
    validation::validate_evaluation_consistency,
};

/// Visual clarity of the sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Limpidity {
    /// Clear.
    Limpido,
    /// Hazy.
    Turvo,
}

/// Wine color family. Drives the allowed tones and whether tannin applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorType {
    /// White.
    Branco,
    /// Rosé.
    Rose,
    /// Red.
    Tinto,
}

impl ColorType {
    /// Tones that can be picked for this color family, in display order.
    pub fn tones(self) -> &'static [ColorTone] {
        match self {
            ColorType::Branco => &[
                ColorTone::Esverdeado,
                ColorTone::Palha,
                ColorTone::Dourado,
                ColorTone::Ambar,
            ],
            ColorType::Rose => &[
                ColorTone::Salmao,
                ColorTone::Alaranjado,
                ColorTone::CorDeRosa,
                ColorTone::Avermelhado,
            ],
            ColorType::Tinto => &[
                ColorTone::Purpura,
                ColorTone::Rubi,
                ColorTone::Granada,
                ColorTone::Acastanhado,
            ],
        }
    }

    /// White wines are exempt from the tannin attribute.
    pub fn requires_tannin(self) -> bool {
        !matches!(self, ColorType::Branco)
    }

    /// Display name.
    pub fn label(self) -> &'static str {
        match self {
            ColorType::Branco => "Branco",
            ColorType::Rose => "Rosé",
            ColorType::Tinto => "Tinto",
        }
    }
}

/// Hue within a color family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorTone {
    /// Greenish.
    Esverdeado,
    /// Straw.
    Palha,
    /// Golden.
    Dourado,
    /// Amber.
    Ambar,
    /// Salmon.
    Salmao,
    /// Orange.
    Alaranjado,
    /// Pink.
    CorDeRosa,
    /// Reddish.
    Avermelhado,
    /// Purple.
    Purpura,
    /// Ruby.
    Rubi,
    /// Garnet.
    Granada,
    /// Brownish.
    Acastanhado,
}

impl ColorTone {
    /// Color family this tone belongs to.
    pub fn color_type(self) -> ColorType {
        match self {
            ColorTone::Esverdeado | ColorTone::Palha | ColorTone::Dourado | ColorTone::Ambar => {
                ColorType::Branco
            }
            ColorTone::Salmao
            | ColorTone::Alaranjado
            | ColorTone::CorDeRosa
            | ColorTone::Avermelhado => ColorType::Rose,
            ColorTone::Purpura | ColorTone::Rubi | ColorTone::Granada | ColorTone::Acastanhado => {
                ColorType::Tinto
            }
        }
    }

    /// Display name.
    pub fn label(self) -> &'static str {
        match self {
            ColorTone::Esverdeado => "Esverdeado",
            ColorTone::Palha => "Palha",
            ColorTone::Dourado => "Dourado",
            ColorTone::Ambar => "Âmbar",
            ColorTone::Salmao => "Salmão",
            ColorTone::Alaranjado => "Alaranjado",
            ColorTone::CorDeRosa => "Cor-de-Rosa",
            ColorTone::Avermelhado => "Avermelhado",
            ColorTone::Purpura => "Púrpura",
            ColorTone::Rubi => "Rubi",
            ColorTone::Granada => "Granada",
            ColorTone::Acastanhado => "Acastanhado",
        }
    }
}

/// Olfactory condition of the sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    /// Sound.
    Correto,
    /// Faulty.
    Defeituoso,
}

/// Perceived sweetness on the palate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sweetness {
    /// Dry.
    #[serde(rename = "seco")]
    Seco,
    /// Off-dry.
    #[serde(rename = "demi-sec")]
    DemiSec,
    /// Sweet.
    #[serde(rename = "doce")]
    Doce,
}

/// Overall quality rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quality {
    /// Poor.
    #[serde(rename = "pobre")]
    Pobre,
    /// Acceptable.
    #[serde(rename = "aceitável")]
    Aceitavel,
    /// Good.
    #[serde(rename = "boa")]
    Boa,
    /// Very good.
    #[serde(rename = "muito boa")]
    MuitoBoa,
    /// Outstanding.
    #[serde(rename = "excelente")]
    Excelente,
}

/// Full sensory evaluation posted to `/evaluations`.
///
/// Field names follow the API contract, including its camel-cased intensities. Tannin is
/// omitted from the wire for white wines.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_evaluation_consistency"))]
pub struct EvaluationCreate {
    /// Author of the evaluation.
    pub participant_id: Uuid,
    /// Round being evaluated.
    pub round_id: Uuid,

    /// Visual clarity.
    pub limpidity: Limpidity,
    /// Color intensity, 1 to 5.
    #[serde(rename = "visualIntensity")]
    #[validate(range(min = 1, max = 5))]
    pub visual_intensity: u8,
    /// Color family.
    pub color_type: ColorType,
    /// Hue, which must belong to `color_type`.
    pub color_tone: ColorTone,

    /// Olfactory condition.
    pub condition: Condition,
    /// Aroma intensity, 1 to 5.
    #[serde(rename = "aromaIntensity")]
    #[validate(range(min = 1, max = 5))]
    pub aroma_intensity: u8,
    /// Free-text aroma notes.
    pub aromas: Option<String>,

    /// Sweetness.
    pub sweetness: Sweetness,
    /// Tannin, 1 to 5. Required unless the wine is white.
    #[validate(range(min = 1, max = 5))]
    pub tannin: Option<u8>,
    /// Alcohol, 1 to 5.
    #[validate(range(min = 1, max = 5))]
    pub alcohol: u8,
    /// Body, 1 to 5.
    #[validate(range(min = 1, max = 5))]
    pub consistence: u8,
    /// Acidity, 1 to 5.
    #[validate(range(min = 1, max = 5))]
    pub acidity: u8,
    /// Finish length, 1 to 5.
    #[validate(range(min = 1, max = 5))]
    pub persistence: u8,
    /// Free-text flavor notes.
    pub flavors: Option<String>,

    /// Overall quality.
    pub quality: Quality,
    /// Guessed grape variety.
    pub grape: Grape,
    /// Guessed country of origin.
    pub country: Country,
    /// Guessed vintage year.
    pub vintage: i32,

    /// Marks the organizer reference answers of the round.
    pub is_answer_key: bool,
}

/// Server acknowledgement of a stored evaluation.
///
/// Only the fields the client acts on are decoded; the echoed attributes are ignored.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct EvaluationReceipt {
    /// Identifier of the stored evaluation.
    pub id: Uuid,
    /// Author of the evaluation.
    pub participant_id: Uuid,
    /// Round evaluated.
    pub round_id: Uuid,
    /// Points earned, zero until the round is scored.
    #[serde(default)]
    pub score: i32,
    /// Whether this is the answer key of the round.
    #[serde(default)]
    pub is_answer_key: bool,
    /// Server timestamp, when reported.
    #[serde(default)]
    pub submitted_at: Option<String>,
}

/// Organizer reference answers for one round, as returned by `/events/{id}/answer-key`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AnswerKeyItem {
    /// Round these answers belong to.
    pub round_id: Uuid,
    /// Round name.
    pub round_name: String,
    /// Visual clarity.
    pub limpidity: Limpidity,
    /// Color intensity.
    #[serde(rename = "visualIntensity")]
    pub visual_intensity: u8,
    /// Color family.
    pub color_type: ColorType,
    /// Hue.
    pub color_tone: ColorTone,
    /// Olfactory condition.
    pub condition: Condition,
    /// Aroma intensity.
    #[serde(rename = "aromaIntensity")]
    pub aroma_intensity: u8,
    /// Aroma notes.
    #[serde(default)]
    pub aromas: Option<String>,
    /// Sweetness.
    pub sweetness: Sweetness,
    /// Tannin, absent for white wines.
    #[serde(default)]
    pub tannin: Option<u8>,
    /// Alcohol.
    pub alcohol: u8,
    /// Body.
    pub consistence: u8,
    /// Acidity.
    pub acidity: u8,
    /// Finish length.
    pub persistence: u8,
    /// Flavor notes.
    #[serde(default)]
    pub flavors: Option<String>,
    /// Overall quality.
    pub quality: Quality,
    /// Grape variety.
    #[serde(default)]
    pub grape: Option<Grape>,
    /// Country of origin.
    #[serde(default)]
    pub country: Option<Country>,
    /// Vintage year.
    #[serde(default)]
    pub vintage: Option<i32>,
}
