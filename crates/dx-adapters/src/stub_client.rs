//! StubAnalysisClient (determinista)
//!
//! - Sin IO externo: responde con un guion de resultados o, si se agota,
//!   con el comportamiento por defecto.
//! - El comportamiento por defecto reproduce el análisis de ejemplo de la
//!   maqueta del dashboard (confianza 87, cuatro hallazgos) y devuelve la
//!   imagen enviada como imagen anotada.
//! - `with_delay` simula latencia con `tokio::time::sleep`, compatible con
//!   tiempo pausado en tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use dx_core::AnalysisClient;
use dx_domain::{AnalysisError, AnalysisResult, ValidatedInput};

type Outcome = Result<AnalysisResult, AnalysisError>;

pub const SAMPLE_CONFIDENCE: i64 = 87;

pub const SAMPLE_FINDINGS: [&str; 4] = ["Right upper lobe opacity",
                                        "Irregular borders detected",
                                        "Size: approximately 2.5cm",
                                        "Heterogeneous density pattern"];

pub const SAMPLE_NARRATIVE: &str = "Opacity detected in the right upper lobe of the lung, measuring approximately 2.5cm. \
                                    The lesion shows irregular borders and heterogeneous density, suggestive of possible \
                                    pneumonia or early-stage malignancy. Recommendation: Follow-up CT scan in 3 months and \
                                    clinical correlation advised.";

#[derive(Debug, Clone)]
enum Fallback {
    Sample,
    Fixed(Outcome),
}

#[derive(Debug)]
pub struct StubAnalysisClient {
    script: Mutex<VecDeque<Outcome>>,
    fallback: Fallback,
    delay: Duration,
    calls: AtomicU32,
}

impl Default for StubAnalysisClient {
    fn default() -> Self {
        Self::deterministic()
    }
}

impl StubAnalysisClient {
    /// Siempre devuelve el análisis de ejemplo.
    pub fn deterministic() -> Self {
        Self { script: Mutex::new(VecDeque::new()),
               fallback: Fallback::Sample,
               delay: Duration::ZERO,
               calls: AtomicU32::new(0) }
    }

    pub fn returning(result: AnalysisResult) -> Self {
        Self { fallback: Fallback::Fixed(Ok(result)),
               ..Self::deterministic() }
    }

    pub fn failing(error: AnalysisError) -> Self {
        Self { fallback: Fallback::Fixed(Err(error)),
               ..Self::deterministic() }
    }

    /// Consume `outcomes` en orden, una por llamada; después, el análisis de ejemplo.
    pub fn scripted(outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        Self { script: Mutex::new(outcomes.into_iter().collect()),
               ..Self::deterministic() }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Número de llamadas a `analyze` recibidas.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn sample_result(input: &ValidatedInput) -> Outcome {
        AnalysisResult::new(SAMPLE_CONFIDENCE,
                            Some(SAMPLE_FINDINGS.iter().map(|s| s.to_string()).collect()),
                            SAMPLE_NARRATIVE,
                            input.image().clone())
    }

    fn next_outcome(&self, input: &ValidatedInput) -> Outcome {
        let scripted = self.script
                           .lock()
                           .unwrap_or_else(|poisoned| poisoned.into_inner())
                           .pop_front();
        match scripted {
            Some(outcome) => outcome,
            None => match &self.fallback {
                Fallback::Sample => Self::sample_result(input),
                Fallback::Fixed(outcome) => outcome.clone(),
            },
        }
    }
}

#[async_trait]
impl AnalysisClient for StubAnalysisClient {
    fn name(&self) -> &str {
        "stub"
    }

    async fn analyze(&self, input: &ValidatedInput, _timeout: Duration) -> Result<AnalysisResult, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.next_outcome(input)
    }
}
