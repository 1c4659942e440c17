use super::super::domain::Kpi;

const SUMMARY: &str = "Resumen ejecutivo: Se observa un comportamiento estable en la mayoría de los indicadores clave, con oportunidades de optimización en las áreas de menor crecimiento.";

const CONCLUSION: &str = "Basado en los datos analizados, se recomienda mantener la estrategia actual con ajustes tácticos en los indicadores con tendencia negativa.";

const ANALYSIS_WITHOUT_INDICATORS: &str = "El periodo no presenta indicadores numéricos comparables; revise la fuente de datos para generar el análisis automático.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Narrative {
    pub(crate) summary: String,
    pub(crate) analysis: String,
    pub(crate) conclusion: String,
}

pub(crate) fn compose_narrative(top_mover: Option<&Kpi>) -> Narrative {
    let analysis = match top_mover {
        Some(kpi) => format!(
            "El desempeño del periodo muestra una tendencia {} liderada por {}, que registró una variación del {}%.",
            kpi.trend.narrative(),
            kpi.label,
            kpi.change
        ),
        None => ANALYSIS_WITHOUT_INDICATORS.to_string(),
    };

    Narrative {
        summary: SUMMARY.to_string(),
        analysis,
        conclusion: CONCLUSION.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::newsletter::domain::Trend;

    fn kpi(label: &str, change: f64) -> Kpi {
        Kpi {
            label: label.to_string(),
            value: "0".to_string(),
            change,
            trend: Trend::from_change(change),
        }
    }

    #[test]
    fn analysis_interpolates_mover_details() {
        let narrative = compose_narrative(Some(&kpi("Ventas", 50.0)));
        assert_eq!(
            narrative.analysis,
            "El desempeño del periodo muestra una tendencia positiva liderada por Ventas, que registró una variación del 50%."
        );
    }

    #[test]
    fn declining_and_flat_movers_use_their_own_wording() {
        let declining = compose_narrative(Some(&kpi("Costos", -12.35)));
        assert!(declining.analysis.contains("tendencia a la baja"));
        assert!(declining.analysis.contains("variación del -12.35%"));

        let flat = compose_narrative(Some(&kpi("Clientes", 0.0)));
        assert!(flat.analysis.contains("tendencia estable"));
    }

    #[test]
    fn missing_mover_falls_back_to_generic_analysis() {
        let narrative = compose_narrative(None);
        assert_eq!(narrative.analysis, ANALYSIS_WITHOUT_INDICATORS);
        assert_eq!(narrative.summary, SUMMARY);
        assert_eq!(narrative.conclusion, CONCLUSION);
    }
}
