//! In-memory collaborators for pipeline and handler tests. Every call is
//! appended to a shared [`CallLog`] so tests can assert ordering.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;

use crate::inference::{InferenceClient, InferenceResponse};
use crate::models::document::Document;
use crate::models::submission::SubmissionRequest;
use crate::render::DocumentRenderer;
use crate::storage::{DocumentStore, RecordStore, StoredDocument};
use crate::submission::pipeline::SubmissionPipeline;

pub fn acme_request() -> SubmissionRequest {
    SubmissionRequest {
        company_name: "Acme".to_string(),
        job_title: "Engineer".to_string(),
        job_description: "Build distributed systems at scale for our platform team.".to_string(),
        file: Some(Document::new(
            "cv.pdf",
            "application/pdf",
            Bytes::from_static(b"%PDF-1.7 fake resume"),
        )),
    }
}

#[derive(Default)]
pub struct CallLog(Mutex<Vec<String>>);

impl CallLog {
    fn push(&self, call: String) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

pub struct MemoryDocumentStore {
    log: Arc<CallLog>,
    files: Mutex<HashMap<String, Bytes>>,
    fail_for_content_type: Option<&'static str>,
}

impl MemoryDocumentStore {
    pub fn insert(&self, path: &str, bytes: Bytes) {
        self.files.lock().unwrap().insert(path.to_string(), bytes);
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn upload(&self, documents: &[Document]) -> Result<Option<StoredDocument>> {
        let names: Vec<_> = documents.iter().map(|d| d.file_name.as_str()).collect();
        self.log.push(format!("store.upload({})", names.join(",")));

        if documents
            .iter()
            .any(|d| Some(d.content_type.as_str()) == self.fail_for_content_type)
        {
            return Ok(None);
        }

        let mut files = self.files.lock().unwrap();
        let mut last = None;
        for document in documents {
            let path = format!("uploads/{}/{}", files.len(), document.file_name);
            files.insert(path.clone(), document.bytes.clone());
            last = Some(StoredDocument { path });
        }
        Ok(last)
    }

    async fn read(&self, path: &str) -> Result<Option<Bytes>> {
        Ok(self.files.lock().unwrap().get(path).cloned())
    }
}

pub struct StubRenderer {
    log: Arc<CallLog>,
    produce_image: bool,
}

#[async_trait]
impl DocumentRenderer for StubRenderer {
    async fn render(&self, document: &Document) -> Result<Option<Document>> {
        self.log.push(format!("renderer.render({})", document.file_name));
        Ok(self.produce_image.then(|| {
            Document::new(
                format!("{}.png", document.stem()),
                "image/png",
                Bytes::from_static(b"\x89PNG fake page"),
            )
        }))
    }
}

pub struct MemoryRecordStore {
    log: Arc<CallLog>,
    values: Mutex<HashMap<String, String>>,
    writes: Mutex<Vec<(String, String)>>,
    /// Writes beyond this many successful ones fail.
    write_budget: Option<usize>,
}

impl MemoryRecordStore {
    /// Every `set` in call order as `(key, value)`.
    pub fn writes(&self) -> Vec<(String, String)> {
        self.writes.lock().unwrap().clone()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.values.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    fn snapshot(&self) -> Vec<String> {
        self.values.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.log.push(format!("records.set({key})"));
        let mut writes = self.writes.lock().unwrap();
        if self.write_budget.is_some_and(|budget| writes.len() >= budget) {
            anyhow::bail!("connection refused");
        }
        writes.push((key.to_string(), value.to_string()));
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let values = self.values.lock().unwrap();
        let mut keys: Vec<_> = values.keys().filter(|k| k.starts_with(prefix)).collect();
        keys.sort();
        Ok(keys.into_iter().map(|k| values[k].clone()).collect())
    }
}

pub struct StubInference {
    log: Arc<CallLog>,
    response: Option<InferenceResponse>,
    fail: bool,
    records: Arc<MemoryRecordStore>,
    seen: Mutex<Vec<String>>,
}

impl StubInference {
    /// Record store contents observed at the moment each feedback call began.
    pub fn records_seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceClient for StubInference {
    async fn feedback(
        &self,
        document_path: &str,
        _instructions: &str,
    ) -> Result<Option<InferenceResponse>> {
        self.log.push(format!("inference.feedback({document_path})"));
        self.seen.lock().unwrap().extend(self.records.snapshot());
        if self.fail {
            anyhow::bail!("service unavailable");
        }
        Ok(self.response.clone())
    }
}

pub struct Harness {
    pub log: Arc<CallLog>,
    pub documents: Arc<MemoryDocumentStore>,
    pub records: Arc<MemoryRecordStore>,
    pub inference: Arc<StubInference>,
    pub pipeline: SubmissionPipeline,
}

pub struct HarnessBuilder {
    render_output: bool,
    response: Option<InferenceResponse>,
    fail_upload_for: Option<&'static str>,
    record_write_budget: Option<usize>,
    fail_inference: bool,
}

impl Harness {
    pub fn builder() -> HarnessBuilder {
        HarnessBuilder {
            render_output: true,
            response: Some(InferenceResponse::from_text(r#"{"score":80}"#)),
            fail_upload_for: None,
            record_write_budget: None,
            fail_inference: false,
        }
    }
}

impl HarnessBuilder {
    pub fn without_render_output(mut self) -> Self {
        self.render_output = false;
        self
    }

    pub fn with_response(mut self, response: Option<InferenceResponse>) -> Self {
        self.response = response;
        self
    }

    pub fn failing_upload_for(mut self, content_type: &'static str) -> Self {
        self.fail_upload_for = Some(content_type);
        self
    }

    pub fn failing_record_writes(mut self) -> Self {
        self.record_write_budget = Some(0);
        self
    }

    /// The pending write succeeds, the feedback write fails.
    pub fn failing_final_record_write(mut self) -> Self {
        self.record_write_budget = Some(1);
        self
    }

    pub fn failing_inference(mut self) -> Self {
        self.fail_inference = true;
        self
    }

    pub fn build(self) -> Harness {
        let log = Arc::new(CallLog::default());
        let documents = Arc::new(MemoryDocumentStore {
            log: log.clone(),
            files: Mutex::new(HashMap::new()),
            fail_for_content_type: self.fail_upload_for,
        });
        let renderer = Arc::new(StubRenderer {
            log: log.clone(),
            produce_image: self.render_output,
        });
        let records = Arc::new(MemoryRecordStore {
            log: log.clone(),
            values: Mutex::new(HashMap::new()),
            writes: Mutex::new(Vec::new()),
            write_budget: self.record_write_budget,
        });
        let inference = Arc::new(StubInference {
            log: log.clone(),
            response: self.response,
            fail: self.fail_inference,
            records: records.clone(),
            seen: Mutex::new(Vec::new()),
        });

        let pipeline = SubmissionPipeline::new(
            documents.clone(),
            renderer,
            records.clone(),
            inference.clone(),
        );

        Harness {
            log,
            documents,
            records,
            inference,
            pipeline,
        }
    }
}
