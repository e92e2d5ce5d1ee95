//! Validation helpers for evaluation payloads.

use validator::ValidationError;

use crate::dto::evaluation::{ColorTone, ColorType, EvaluationCreate};

/// Validates that the tone belongs to the selected color family.
///
/// # Examples
///
/// ```ignore
/// validate_color_tone(ColorType::Branco, ColorTone::Palha) // Ok
/// validate_color_tone(ColorType::Tinto, ColorTone::Palha)  // Err - white tone on a red
/// ```
pub fn validate_color_tone(color_type: ColorType, tone: ColorTone) -> Result<(), ValidationError> {
    if tone.color_type() == color_type {
        return Ok(());
    }

    let mut err = ValidationError::new("color_tone_mismatch");
    err.message = Some(
        format!(
            "Tom '{}' inválido para cor '{}'",
            tone.label(),
            color_type.label()
        )
        .into(),
    );
    Err(err)
}

/// Validates the tannin rule: required for rosé and red, forbidden for white.
pub fn validate_tannin(color_type: ColorType, tannin: Option<u8>) -> Result<(), ValidationError> {
    match (color_type.requires_tannin(), tannin) {
        (true, None) => {
            let mut err = ValidationError::new("tannin_required");
            err.message =
                Some(format!("Tanino é obrigatório para vinho {}", color_type.label()).into());
            Err(err)
        }
        (false, Some(_)) => {
            let mut err = ValidationError::new("tannin_not_applicable");
            err.message = Some("Vinho branco não deve ter valor de tanino".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

/// Cross-field checks run by `#[validate(schema(...))]` on [`EvaluationCreate`].
pub(crate) fn validate_evaluation_consistency(
    evaluation: &EvaluationCreate,
) -> Result<(), ValidationError> {
    validate_color_tone(evaluation.color_type, evaluation.color_tone)?;
    validate_tannin(evaluation.color_type, evaluation.tannin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_color_tone_matching_family() {
        assert!(validate_color_tone(ColorType::Branco, ColorTone::Palha).is_ok());
        assert!(validate_color_tone(ColorType::Rose, ColorTone::Salmao).is_ok());
        assert!(validate_color_tone(ColorType::Tinto, ColorTone::Rubi).is_ok());
    }

    #[test]
    fn test_validate_color_tone_mismatch() {
        let err = validate_color_tone(ColorType::Tinto, ColorTone::Palha).unwrap_err();
        assert_eq!(err.code, "color_tone_mismatch");
        assert!(validate_color_tone(ColorType::Branco, ColorTone::Rubi).is_err());
    }

    #[test]
    fn test_validate_tannin_rules() {
        assert!(validate_tannin(ColorType::Branco, None).is_ok());
        assert!(validate_tannin(ColorType::Tinto, Some(3)).is_ok());
        assert!(validate_tannin(ColorType::Rose, Some(1)).is_ok());

        assert_eq!(
            validate_tannin(ColorType::Tinto, None).unwrap_err().code,
            "tannin_required"
        );
        assert_eq!(
            validate_tannin(ColorType::Branco, Some(2)).unwrap_err().code,
            "tannin_not_applicable"
        );
    }
}
