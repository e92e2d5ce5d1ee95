//! Human-readable labels for the 1..=5 sensory scales.

/// The three label sets used by the tasting sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleType {
    /// Baixa to Alta.
    Intensity,
    /// Baixo to Alto.
    Structure,
    /// Pouco to Longo.
    Persistence,
}

impl ScaleType {
    /// Scale used by a given payload attribute, keyed by its wire name.
    pub fn for_attribute(attribute: &str) -> Option<Self> {
        match attribute {
            "visualIntensity" | "aromaIntensity" | "acidity" => Some(ScaleType::Intensity),
            "tannin" | "alcohol" | "consistence" => Some(ScaleType::Structure),
            "persistence" => Some(ScaleType::Persistence),
            _ => None,
        }
    }

    /// Label of `value` on this scale, for values 1 to 5.
    pub fn label(self, value: u8) -> Option<&'static str> {
        let labels: [&'static str; 5] = match self {
            ScaleType::Intensity => ["Baixa", "Média-Menos", "Média", "Média-Mais", "Alta"],
            ScaleType::Structure => ["Baixo", "Médio-Menos", "Médio", "Médio-Mais", "Alto"],
            ScaleType::Persistence => ["Pouco", "Médio-Menos", "Médio", "Médio-Mais", "Longo"],
        };
        usize::from(value)
            .checked_sub(1)
            .and_then(|index| labels.get(index).copied())
    }
}

/// Label for `value` on the scale of `attribute`, or an em dash when unknown.
pub fn scale_label(attribute: &str, value: Option<u8>) -> &'static str {
    ScaleType::for_attribute(attribute)
        .zip(value)
        .and_then(|(scale, value)| scale.label(value))
        .unwrap_or("—")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_attribute_scale() {
        assert_eq!(scale_label("visualIntensity", Some(1)), "Baixa");
        assert_eq!(scale_label("tannin", Some(5)), "Alto");
        assert_eq!(scale_label("persistence", Some(5)), "Longo");
    }

    #[test]
    fn out_of_range_or_unknown_yields_dash() {
        assert_eq!(scale_label("acidity", Some(0)), "—");
        assert_eq!(scale_label("acidity", Some(6)), "—");
        assert_eq!(scale_label("tannin", None), "—");
        assert_eq!(scale_label("grape", Some(2)), "—");
    }
}
