use interaction_flow::{Context, ExecutionStatus, FlowRunner, Graph, GraphBuilder, Result, Task};
use secrecy::SecretString;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::{AppConfig, GenerationSettings};
use crate::llm::{GroqGenerator, TextGenerator, resolve_credential};
use crate::models::{InteractionOutcome, InteractionRequest, RunStatus, StructureView};
use crate::ncbi::EntrezClient;
use crate::tasks::*;
use crate::viewer::{StructureRenderer, ThreeDmolRenderer};

/// The lookup → report → render sequence, with its external collaborators.
///
/// The graph is rebuilt for every run because the credential can differ per
/// submission; the collaborators themselves are shared.
#[derive(Clone)]
pub struct InteractionWorkflow {
    entrez: Arc<EntrezClient>,
    generator: Arc<dyn TextGenerator>,
    renderer: Arc<dyn StructureRenderer>,
    generation: GenerationSettings,
    configured_credential: Option<Arc<SecretString>>,
}

impl InteractionWorkflow {
    pub fn new(
        entrez: EntrezClient,
        generator: Arc<dyn TextGenerator>,
        renderer: Arc<dyn StructureRenderer>,
        generation: GenerationSettings,
        configured_credential: Option<SecretString>,
    ) -> Self {
        Self {
            entrez: Arc::new(entrez),
            generator,
            renderer,
            generation,
            configured_credential: configured_credential.map(Arc::new),
        }
    }

    /// Production wiring: NCBI, Groq and 3Dmol.js.
    pub fn from_config(config: &AppConfig) -> Self {
        let configured = config
            .groq_api_key
            .as_ref()
            .and_then(|key| resolve_credential(None, Some(key)));

        Self::new(
            EntrezClient::new(&config.ncbi),
            Arc::new(GroqGenerator::new(&config.generation)),
            Arc::new(ThreeDmolRenderer::new(config.viewer.clone())),
            config.generation.clone(),
            configured,
        )
    }

    pub fn has_configured_credential(&self) -> bool {
        self.configured_credential.is_some()
    }

    pub fn build_graph(&self, credential: Option<SecretString>) -> Graph {
        let validate_task = Arc::new(ValidateRequestTask);
        let validate_id = validate_task.id().to_string();

        let lookup_task = Arc::new(DatabaseLookupTask::new(self.entrez.clone()));
        let lookup_id = lookup_task.id().to_string();

        let report_task = Arc::new(ReportGenerationTask::new(
            self.generator.clone(),
            self.generation.clone(),
            credential,
        ));
        let report_id = report_task.id().to_string();

        let render_task = Arc::new(StructureRenderTask::new(self.renderer.clone()));
        let render_id = render_task.id().to_string();

        let skipped_task = Arc::new(StructureSkippedTask);
        let skipped_id = skipped_task.id().to_string();

        GraphBuilder::new("interaction_workflow")
            .add_task(validate_task)
            .add_task(lookup_task)
            .add_task(report_task)
            .add_task(render_task)
            .add_task(skipped_task)
            .add_edge(&validate_id, &lookup_id)
            .add_edge(&lookup_id, &report_id)
            .add_conditional_edge(
                &report_id,
                |context| {
                    context
                        .get_sync::<InteractionRequest>(session_keys::REQUEST)
                        .is_some_and(|request| request.structure_id.is_some())
                },
                &render_id,
                &skipped_id,
            )
            .build()
    }

    /// Run the whole sequence for one submission. `form_key` takes precedence
    /// over the configured credential.
    pub async fn run(
        &self,
        request: InteractionRequest,
        form_key: Option<&str>,
    ) -> Result<InteractionOutcome> {
        let credential =
            resolve_credential(form_key, self.configured_credential.as_deref());
        let runner = FlowRunner::new(Arc::new(self.build_graph(credential)));

        let run_id = Uuid::new_v4().to_string();
        let context = create_interaction_context(&request).await?;
        let execution = runner.run(&run_id, context.clone()).await?;

        let status = match execution.status {
            ExecutionStatus::Completed => RunStatus::Completed,
            ExecutionStatus::Halted(_) => RunStatus::Halted,
        };

        Ok(InteractionOutcome {
            run_id,
            status,
            request,
            database_record: context.get(session_keys::DATABASE_RECORD).await,
            report: context.get(session_keys::REPORT).await,
            structure_view: context.get::<StructureView>(session_keys::STRUCTURE_VIEW).await,
            notices: context.get(session_keys::NOTICES).await.unwrap_or_default(),
            steps: execution.executed.iter().map(|id| short_task_name(id)).collect(),
        })
    }
}

pub async fn create_interaction_context(request: &InteractionRequest) -> Result<Context> {
    let context = Context::new();
    context.set(session_keys::REQUEST, request).await?;
    Ok(context)
}

/// `interaction_analyzer::tasks::database_lookup::DatabaseLookupTask` -> `DatabaseLookupTask`
fn short_task_name(task_id: &str) -> String {
    task_id.rsplit("::").next().unwrap_or(task_id).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalyzerError;
    use crate::llm::GenerationRequest;
    use crate::models::NoticeLevel;
    use crate::config::{NcbiSettings, ViewerSettings};
    use async_trait::async_trait;
    use axum::{Json, Router, http::StatusCode, routing::get};
    use secrecy::ExposeSecret;
    use serde_json::json;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::net::TcpListener;

    #[derive(Default)]
    struct RecordingGenerator {
        calls: Mutex<Vec<(String, GenerationRequest)>>,
        fail: bool,
    }

    #[async_trait]
    impl TextGenerator for RecordingGenerator {
        async fn generate(
            &self,
            credential: &SecretString,
            request: &GenerationRequest,
        ) -> std::result::Result<String, AnalyzerError> {
            self.calls
                .lock()
                .unwrap()
                .push((credential.expose_secret().to_string(), request.clone()));
            if self.fail {
                Err(AnalyzerError::ApiFailure("upstream 503".to_string()))
            } else {
                Ok("Gefitinib binds the EGFR ATP pocket.".to_string())
            }
        }
    }

    #[derive(Default)]
    struct RecordingRenderer {
        calls: Mutex<Vec<String>>,
    }

    impl StructureRenderer for RecordingRenderer {
        fn render(&self, structure_id: &str) -> std::result::Result<StructureView, AnalyzerError> {
            self.calls.lock().unwrap().push(structure_id.to_string());
            Ok(StructureView {
                structure_id: structure_id.to_string(),
                html: format!("<div>{structure_id}</div>"),
                height: 500,
            })
        }
    }

    struct Harness {
        workflow: InteractionWorkflow,
        generator: Arc<RecordingGenerator>,
        renderer: Arc<RecordingRenderer>,
        ncbi_hits: Arc<AtomicUsize>,
    }

    /// NCBI stand-in answering every esearch with `status`; returns its base URL.
    async fn spawn_ncbi(ncbi_status: StatusCode) -> (String, Arc<AtomicUsize>) {
        let ncbi_hits = Arc::new(AtomicUsize::new(0));
        let hits = ncbi_hits.clone();
        let app = Router::new().route(
            "/esearch.fcgi",
            get(move || {
                let hits = hits.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    (ncbi_status, Json(json!({ "esearchresult": { "idlist": ["1"] } })))
                }
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), ncbi_hits)
    }

    fn entrez_for(base_url: String) -> EntrezClient {
        EntrezClient::new(&NcbiSettings {
            base_url,
            database: "protein".to_string(),
        })
    }

    async fn harness(ncbi_status: StatusCode, generator: RecordingGenerator, key: Option<&str>) -> Harness {
        let (base_url, ncbi_hits) = spawn_ncbi(ncbi_status).await;
        let generator = Arc::new(generator);
        let renderer = Arc::new(RecordingRenderer::default());
        let workflow = InteractionWorkflow::new(
            entrez_for(base_url),
            generator.clone(),
            renderer.clone(),
            GenerationSettings::default(),
            key.map(SecretString::from),
        );

        Harness {
            workflow,
            generator,
            renderer,
            ncbi_hits,
        }
    }

    fn egfr_request(structure_id: Option<&str>) -> InteractionRequest {
        InteractionRequest::new(
            "EGFR",
            structure_id.map(str::to_string),
            "Gefitinib",
            "binding affinity",
        )
    }

    #[tokio::test]
    async fn test_full_run_with_structure() {
        let h = harness(StatusCode::OK, RecordingGenerator::default(), Some("gsk_env")).await;

        let outcome = h.workflow.run(egfr_request(Some("1M17")), None).await.unwrap();

        assert_eq!(outcome.status, RunStatus::Completed);
        assert!(outcome.notices.is_empty(), "{:?}", outcome.notices);
        assert_eq!(outcome.database_record.unwrap()["esearchresult"]["idlist"][0], "1");
        assert_eq!(outcome.report.as_deref(), Some("Gefitinib binds the EGFR ATP pocket."));
        assert_eq!(outcome.structure_view.unwrap().structure_id, "1M17");
        assert_eq!(
            outcome.steps,
            vec![
                "ValidateRequestTask",
                "DatabaseLookupTask",
                "ReportGenerationTask",
                "StructureRenderTask"
            ]
        );
        assert_eq!(*h.renderer.calls.lock().unwrap(), vec!["1M17".to_string()]);
    }

    #[tokio::test]
    async fn test_blank_fields_halt_before_network() {
        let h = harness(StatusCode::OK, RecordingGenerator::default(), Some("gsk_env")).await;

        for (protein, drug) in [("", "Gefitinib"), ("EGFR", "   ")] {
            let request = InteractionRequest::new(protein, Some("1M17".to_string()), drug, "");
            let outcome = h.workflow.run(request, None).await.unwrap();

            assert_eq!(outcome.status, RunStatus::Halted);
            assert_eq!(outcome.steps, vec!["ValidateRequestTask"]);
            assert_eq!(outcome.notices.len(), 1);
            assert_eq!(outcome.notices[0].level, NoticeLevel::Warning);
        }

        assert_eq!(h.ncbi_hits.load(Ordering::SeqCst), 0);
        assert!(h.generator.calls.lock().unwrap().is_empty());
        assert!(h.renderer.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_credential_is_unconfigured_and_run_continues() {
        let h = harness(StatusCode::OK, RecordingGenerator::default(), None).await;

        let outcome = h.workflow.run(egfr_request(Some("6LU7")), None).await.unwrap();

        assert_eq!(outcome.status, RunStatus::Completed);
        assert!(outcome.report.is_none());
        assert!(h.generator.calls.lock().unwrap().is_empty());
        assert_eq!(outcome.notices.len(), 1);
        assert_eq!(outcome.notices[0].level, NoticeLevel::Error);
        assert_eq!(outcome.notices[0].message, AnalyzerError::Unconfigured.to_string());
        assert_eq!(*h.renderer.calls.lock().unwrap(), vec!["6LU7".to_string()]);
    }

    #[tokio::test]
    async fn test_database_failure_still_generates_report() {
        let h = harness(
            StatusCode::INTERNAL_SERVER_ERROR,
            RecordingGenerator::default(),
            Some("gsk_env"),
        )
        .await;

        let outcome = h.workflow.run(egfr_request(None), None).await.unwrap();

        assert_eq!(h.ncbi_hits.load(Ordering::SeqCst), 1);
        assert!(outcome.database_record.is_none());
        assert_eq!(outcome.notices[0].step, "database_lookup");
        assert_eq!(outcome.notices[0].level, NoticeLevel::Error);
        assert!(outcome.report.is_some());
        assert_eq!(h.generator.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_report_failure_still_renders() {
        let failing = RecordingGenerator {
            fail: true,
            ..Default::default()
        };
        let h = harness(StatusCode::OK, failing, Some("gsk_env")).await;

        let outcome = h.workflow.run(egfr_request(Some("1M17")), None).await.unwrap();

        assert!(outcome.report.is_none());
        assert!(outcome.has_errors());
        assert!(outcome.structure_view.is_some());
        assert_eq!(h.renderer.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_absent_structure_never_renders() {
        let h = harness(StatusCode::OK, RecordingGenerator::default(), Some("gsk_env")).await;

        let outcome = h.workflow.run(egfr_request(None), None).await.unwrap();

        assert!(h.renderer.calls.lock().unwrap().is_empty());
        assert!(outcome.structure_view.is_none());
        assert_eq!(outcome.steps.last().map(String::as_str), Some("StructureSkippedTask"));
        assert_eq!(outcome.notices.len(), 1);
        assert_eq!(outcome.notices[0].level, NoticeLevel::Warning);
    }

    #[tokio::test]
    async fn test_user_content_carries_fields_literally() {
        let h = harness(StatusCode::OK, RecordingGenerator::default(), Some("gsk_env")).await;
        let request = InteractionRequest::new(
            "  tumor protein p53 ",
            None,
            "CID:123631 <SMILES>",
            "resistance mutations & off-target",
        );

        h.workflow.run(request, Some("gsk_form")).await.unwrap();

        let calls = h.generator.calls.lock().unwrap();
        let (credential, generation) = &calls[0];
        assert_eq!(credential, "gsk_form");
        assert_eq!(
            generation.user_content(),
            Some(
                "Protein:   tumor protein p53 \nDrug: CID:123631 <SMILES>\nInteraction Type: resistance mutations & off-target"
            )
        );
        assert_eq!(generation.model, GenerationSettings::default().model);
    }

    #[tokio::test]
    async fn test_malformed_structure_id_becomes_error_notice() {
        let (base_url, _) = spawn_ncbi(StatusCode::OK).await;
        let workflow = InteractionWorkflow::new(
            entrez_for(base_url),
            Arc::new(RecordingGenerator::default()),
            Arc::new(ThreeDmolRenderer::new(ViewerSettings::default())),
            GenerationSettings::default(),
            Some(SecretString::from("gsk_env")),
        );

        let outcome = workflow
            .run(egfr_request(Some("1M17\");x")), None)
            .await
            .unwrap();

        assert_eq!(outcome.status, RunStatus::Completed);
        assert!(outcome.structure_view.is_none());
        assert!(outcome.report.is_some());
        let errors: Vec<_> = outcome
            .notices
            .iter()
            .filter(|n| n.level == NoticeLevel::Error)
            .collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].step, "structure_render");
        assert!(errors[0].message.contains("Invalid PDB ID"));
    }
}
