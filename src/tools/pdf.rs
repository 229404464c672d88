//! PDF question-answering tools over a shared [`PdfLibrary`].

use crate::pdf::PdfLibrary;
use crate::render;
use crate::tools::registry::{str_arg, Tool};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

fn path_schema(extra: Option<(&str, &str)>) -> Value {
    let mut properties = serde_json::Map::new();
    properties.insert(
        "file_path".to_string(),
        json!({ "type": "string", "description": "Full path to the PDF file" }),
    );
    let mut required = vec![json!("file_path")];
    if let Some((name, description)) = extra {
        properties.insert(
            name.to_string(),
            json!({ "type": "string", "description": description }),
        );
        required.push(json!(name));
    }
    json!({ "type": "object", "properties": properties, "required": required })
}

/// Run a library call on the blocking pool.
async fn blocking<T, F>(library: &Arc<PdfLibrary>, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&PdfLibrary) -> Result<T> + Send + 'static,
{
    let library = Arc::clone(library);
    tokio::task::spawn_blocking(move || f(&library))
        .await
        .map_err(|e| AppError::Internal(format!("PDF task failed: {}", e)))?
}

pub struct LoadPdf(pub Arc<PdfLibrary>);

#[async_trait]
impl Tool for LoadPdf {
    fn name(&self) -> &str {
        "load_pdf"
    }

    fn description(&self) -> &str {
        "Load and extract text from a PDF file so questions can be asked about it"
    }

    fn parameters_schema(&self) -> Value {
        path_schema(None)
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let path = str_arg(&args, "file_path")?.to_string();
        let outcome = blocking(&self.0, move |lib| lib.load(&path)).await?;
        Ok(Value::String(render::pdf_loaded(&outcome)))
    }
}

pub struct AskPdfQuestion(pub Arc<PdfLibrary>);

#[async_trait]
impl Tool for AskPdfQuestion {
    fn name(&self) -> &str {
        "ask_pdf_question"
    }

    fn description(&self) -> &str {
        "Answer a question about a loaded PDF using the most relevant sections"
    }

    fn parameters_schema(&self) -> Value {
        path_schema(Some(("question", "Question about the PDF content")))
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let path = str_arg(&args, "file_path")?;
        let question = str_arg(&args, "question")?;
        let answer = self.0.ask(path, question)?;
        Ok(Value::String(render::pdf_answer(&answer)))
    }
}

pub struct ListLoadedPdfs(pub Arc<PdfLibrary>);

#[async_trait]
impl Tool for ListLoadedPdfs {
    fn name(&self) -> &str {
        "list_loaded_pdfs"
    }

    fn description(&self) -> &str {
        "List all currently loaded PDF files"
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _args: Value) -> Result<Value> {
        Ok(Value::String(render::pdf_list(&self.0.loaded())))
    }
}

pub struct ClearPdfCache(pub Arc<PdfLibrary>);

#[async_trait]
impl Tool for ClearPdfCache {
    fn name(&self) -> &str {
        "clear_pdf_cache"
    }

    fn description(&self) -> &str {
        "Forget every loaded PDF"
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _args: Value) -> Result<Value> {
        blocking(&self.0, |lib| {
            lib.clear();
            Ok(())
        })
        .await?;
        Ok(Value::String(render::pdf_cleared()))
    }
}

pub struct GetPdfSummary(pub Arc<PdfLibrary>);

#[async_trait]
impl Tool for GetPdfSummary {
    fn name(&self) -> &str {
        "get_pdf_summary"
    }

    fn description(&self) -> &str {
        "Word and character counts plus the opening lines of a loaded PDF"
    }

    fn parameters_schema(&self) -> Value {
        path_schema(None)
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let summary = self.0.summary(str_arg(&args, "file_path")?)?;
        Ok(Value::String(render::pdf_summary(&summary)))
    }
}

pub fn pdf_tools(library: &Arc<PdfLibrary>) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(LoadPdf(Arc::clone(library))),
        Arc::new(AskPdfQuestion(Arc::clone(library))),
        Arc::new(ListLoadedPdfs(Arc::clone(library))),
        Arc::new(ClearPdfCache(Arc::clone(library))),
        Arc::new(GetPdfSummary(Arc::clone(library))),
    ]
}
