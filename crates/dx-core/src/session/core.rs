//! Core SubmissionSession implementation

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dx_domain::{AnalysisError, AnalysisResult, HistoryEntry, ImagePayload, ImagingModality, InputValidator, PatientLabel,
                ValidatedInput};
use log::{debug, info, warn};
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::{SessionEvent, SessionEventKind, SessionFailure, SessionStatus, Submission, SubmissionState};
use crate::client::AnalysisClient;
use crate::constants::{DEFAULT_ANALYSIS_TIMEOUT, SESSION_EVENT_CAPACITY};
use crate::errors::SessionError;
use crate::history::HistoryStore;
use crate::retry::{retry_with_backoff, RetryPolicy};

type Outcome = Result<AnalysisResult, AnalysisError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub validator: InputValidator,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { timeout: DEFAULT_ANALYSIS_TIMEOUT,
               retry: RetryPolicy::none(),
               validator: InputValidator::default() }
    }
}

impl SessionConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_validator(mut self, validator: InputValidator) -> Self {
        self.validator = validator;
        self
    }
}

struct PendingAnalysis {
    receiver: oneshot::Receiver<Outcome>,
    task: JoinHandle<()>,
}

/// Sesión de un único envío.
///
/// Responsable de la máquina de estados `Idle → Validating → Analyzing →
/// Completed | Failed`. Se construye una sesión nueva por envío; los estados
/// terminales no se abandonan.
///
/// Todas las operaciones que cambian estado toman `&mut self`: el único
/// escritor es el dueño de la sesión. La llamada al backend corre en una
/// tarea tokio aparte y entrega su resultado exactamente una vez por un
/// canal oneshot; cualquier resultado que llegue tras un estado terminal se
/// descarta.
pub struct SubmissionSession {
    id: Uuid,
    client: Arc<dyn AnalysisClient>,
    config: SessionConfig,
    state: SubmissionState,
    submission: Option<Submission>,
    pending: Option<PendingAnalysis>,
    completed_at: Option<DateTime<Utc>>,
    events: Vec<SessionEvent>,
    notifier: broadcast::Sender<SessionEvent>,
}

impl SubmissionSession {
    pub fn new(client: Arc<dyn AnalysisClient>, config: SessionConfig) -> Self {
        let (notifier, _) = broadcast::channel(SESSION_EVENT_CAPACITY);
        Self { id: Uuid::new_v4(),
               client,
               config,
               state: SubmissionState::Idle,
               submission: None,
               pending: None,
               completed_at: None,
               events: Vec::new(),
               notifier }
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn config(&self) -> &SessionConfig { &self.config }
    pub fn state(&self) -> &SubmissionState { &self.state }
    pub fn status(&self) -> SessionStatus { self.state.status() }
    pub fn submission(&self) -> Option<&Submission> { self.submission.as_ref() }

    /// Log de transiciones en orden de `seq`.
    pub fn events(&self) -> &[SessionEvent] { &self.events }

    /// Suscripción a las transiciones futuras de la sesión.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.notifier.subscribe()
    }

    /// Valida la entrada y, si es válida, lanza el análisis en segundo plano.
    ///
    /// Devuelve el id del `Submission` creado. Un error de validación deja la
    /// sesión en `Failed` y se devuelve también al caller. Llamar a `submit`
    /// fuera de `Idle` devuelve `SessionBusy` sin tocar el estado.
    ///
    /// Debe llamarse dentro de un runtime tokio.
    pub fn submit(&mut self, image: Option<ImagePayload>, report_text: &str) -> Result<Uuid, SessionError> {
        let status = self.status();
        if status != SessionStatus::Idle {
            warn!("session {} rejected submit while {status}", self.id);
            return Err(SessionError::SessionBusy { status });
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| SessionError::RuntimeUnavailable)?;

        self.transition(SubmissionState::Validating, SessionEventKind::ValidationStarted);
        let input = match self.config.validator.validate(image.as_ref(), report_text) {
            Ok(input) => input,
            Err(error) => {
                info!("session {} validation failed: {error}", self.id);
                self.transition(SubmissionState::Failed(SessionFailure::Validation(error.clone())),
                                SessionEventKind::ValidationFailed { error: error.clone() });
                return Err(SessionError::Validation(error));
            }
        };

        let submission = Submission::from_input(input.clone(), SessionStatus::Validating);
        let submission_id = submission.id();
        debug!("session {} accepted submission {submission_id} ({}, {} bytes)",
               self.id,
               submission.image().media_type(),
               submission.image().size_bytes());
        self.submission = Some(submission);
        self.pending = Some(self.spawn_analysis(&runtime, input));
        self.transition(SubmissionState::Analyzing,
                        SessionEventKind::AnalysisStarted { submission_id,
                                                            max_attempts: self.config.retry.max_attempts() });
        Ok(submission_id)
    }

    fn spawn_analysis(&self, runtime: &tokio::runtime::Handle, input: ValidatedInput) -> PendingAnalysis {
        let (tx, receiver) = oneshot::channel();
        let client = Arc::clone(&self.client);
        let timeout = self.config.timeout;
        let policy = self.config.retry;
        let task = runtime.spawn(async move {
            let outcome = retry_with_backoff(client.as_ref(), &input, timeout, policy).await;
            // el receptor ya no existe si la sesión se canceló o se descartó
            let _ = tx.send(outcome);
        });
        PendingAnalysis { receiver, task }
    }

    /// Espera al resultado del análisis en curso y lo aplica.
    ///
    /// Sin análisis pendiente devuelve el estado actual. Es cancel-safe: si el
    /// futuro se descarta, el resultado sigue pendiente.
    pub async fn wait(&mut self) -> &SubmissionState {
        if let Some(pending) = self.pending.as_mut() {
            let outcome = match (&mut pending.receiver).await {
                Ok(outcome) => outcome,
                Err(_) => Err(AnalysisError::ServiceUnavailable("analysis task ended without a response".into())),
            };
            self.pending = None;
            self.apply_outcome(outcome);
        }
        &self.state
    }

    /// Comprobación no bloqueante del análisis en curso. Devuelve `true` si se
    /// aplicó un resultado.
    pub fn poll_outcome(&mut self) -> bool {
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };
        let outcome = match pending.receiver.try_recv() {
            Ok(outcome) => outcome,
            Err(oneshot::error::TryRecvError::Empty) => return false,
            Err(oneshot::error::TryRecvError::Closed) => {
                Err(AnalysisError::ServiceUnavailable("analysis task ended without a response".into()))
            }
        };
        self.pending = None;
        self.apply_outcome(outcome)
    }

    /// Cancela el análisis en curso. Sólo tiene efecto en `Analyzing`.
    pub fn cancel(&mut self) -> bool {
        if self.status() != SessionStatus::Analyzing {
            debug!("session {} cancel ignored while {}", self.id, self.status());
            return false;
        }
        if let Some(pending) = self.pending.take() {
            pending.task.abort();
        }
        let submission_id = self.submission_id();
        info!("session {} cancelled submission {submission_id}", self.id);
        self.transition(SubmissionState::Failed(SessionFailure::Analysis(AnalysisError::Cancelled)),
                        SessionEventKind::Cancelled { submission_id });
        true
    }

    /// Aplica el resultado del backend. Fuera de `Analyzing` el resultado se
    /// ignora y el estado no cambia.
    pub(crate) fn apply_outcome(&mut self, outcome: Outcome) -> bool {
        if self.status() != SessionStatus::Analyzing {
            debug!("session {} ignored late analysis outcome while {}", self.id, self.status());
            return false;
        }
        let submission_id = self.submission_id();
        match outcome {
            Ok(result) => {
                info!("session {} completed submission {submission_id} with confidence {}",
                      self.id,
                      result.confidence());
                let kind = SessionEventKind::AnalysisCompleted { submission_id,
                                                                 confidence: result.confidence(),
                                                                 findings: result.findings().len() };
                self.completed_at = Some(self.transition(SubmissionState::Completed(result), kind));
            }
            Err(error) => {
                warn!("session {} analysis failed for {submission_id}: {error}", self.id);
                self.transition(SubmissionState::Failed(SessionFailure::Analysis(error.clone())),
                                SessionEventKind::AnalysisFailed { submission_id, error });
            }
        }
        true
    }

    /// Construye la entrada de historial de una sesión completada.
    pub fn history_entry(&self, patient: PatientLabel, modality: ImagingModality) -> Result<HistoryEntry, SessionError> {
        match (&self.state, &self.submission, self.completed_at) {
            (SubmissionState::Completed(result), Some(sub), Some(at)) => {
                Ok(HistoryEntry::new(sub.id(), at, patient, modality, result.clone()))
            }
            _ => Err(SessionError::NotCompleted { status: self.status() }),
        }
    }

    /// Archiva la sesión completada en `store`. Devuelve el `seq` asignado.
    pub fn archive(&self, store: &dyn HistoryStore, patient: PatientLabel, modality: ImagingModality) -> Result<u64, SessionError> {
        let entry = self.history_entry(patient, modality)?;
        Ok(store.record(entry)?)
    }

    fn submission_id(&self) -> Uuid {
        self.submission.as_ref().map(Submission::id).unwrap_or_else(Uuid::nil)
    }

    fn transition(&mut self, next: SubmissionState, kind: SessionEventKind) -> DateTime<Utc> {
        let from = self.state.status();
        let to = next.status();
        debug_assert!(from.can_transition_to(to), "invalid transition {from} -> {to}");
        self.state = next;
        if let Some(sub) = self.submission.as_mut() {
            sub.state = to;
        }
        let ev = SessionEvent { seq: self.events.len() as u64,
                                session_id: self.id,
                                from,
                                to,
                                kind,
                                ts: Utc::now() };
        let ts = ev.ts;
        self.events.push(ev.clone());
        // sin suscriptores `send` falla; no es un error
        let _ = self.notifier.send(ev);
        ts
    }
}

impl Drop for SubmissionSession {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.task.abort();
        }
    }
}

impl std::fmt::Debug for SubmissionSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionSession")
         .field("id", &self.id)
         .field("client", &self.client.name())
         .field("status", &self.status())
         .field("submission", &self.submission.as_ref().map(Submission::id))
         .field("events", &self.events.len())
         .finish()
    }
}
