//! PDF tools over a file-backed text cache shared by two libraries, the way
//! separate `tooldeck serve pdf` processes share it.

use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tooldeck::pdf::{CacheLimits, PdfLibrary, TextCache, TextExtractor};
use tooldeck::tools::pdf::pdf_tools;
use tooldeck::tools::ToolRegistry;
use tooldeck::types::Result;

struct Pages(Vec<&'static str>);

impl TextExtractor for Pages {
    fn extract_pages(&self, _path: &Path) -> Result<Vec<String>> {
        Ok(self.0.iter().map(|p| p.to_string()).collect())
    }
}

fn registry(cache_file: &Path) -> ToolRegistry {
    let library = Arc::new(PdfLibrary::new(
        TextCache::persistent(CacheLimits::default(), cache_file),
        Arc::new(Pages(vec![
            "Turf Rules\nPlayers must wear studs or turf shoes at all times.",
            "Refunds are issued when a booking is cancelled 24 hours ahead.",
        ])),
    ));
    let mut registry = ToolRegistry::new();
    registry.register_all(pdf_tools(&library));
    registry
}

async fn text(registry: &ToolRegistry, tool: &str, args: serde_json::Value) -> String {
    registry
        .execute(tool, args)
        .await
        .unwrap()
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_loaded_pdf_is_visible_to_another_library() {
    let dir = tempfile::tempdir().unwrap();
    let cache_file = dir.path().join("pdf_cache.json");
    let pdf = dir.path().join("rules.pdf");
    std::fs::write(&pdf, b"%PDF-1.4").unwrap();
    let pdf = pdf.to_string_lossy().into_owned();

    let first = registry(&cache_file);
    let loaded = text(&first, "load_pdf", json!({"file_path": pdf})).await;
    assert!(loaded.starts_with("✅ PDF loaded successfully!\n📄 File: rules.pdf\n📊 Pages: 2"));

    let second = registry(&cache_file);
    let listed = text(&second, "list_loaded_pdfs", json!({})).await;
    assert!(listed.starts_with("📚 Currently loaded PDF files (1):"));
    assert!(listed.contains("📄 rules.pdf"));

    let answer = text(
        &second,
        "ask_pdf_question",
        json!({"file_path": pdf, "question": "when are refunds issued?"}),
    )
    .await;
    assert!(answer.starts_with("📖 Found "), "{}", answer);
    assert!(answer.contains("Refunds are issued"));

    let summary = text(&second, "get_pdf_summary", json!({"file_path": pdf})).await;
    assert!(summary.contains("2 pages"));

    assert_eq!(
        text(&second, "clear_pdf_cache", json!({})).await,
        "🗑️ PDF cache cleared successfully!"
    );
    assert!(!cache_file.exists());

    let third = registry(&cache_file);
    assert_eq!(
        text(&third, "list_loaded_pdfs", json!({})).await,
        "📭 No PDF files currently loaded."
    );
}

#[tokio::test]
async fn test_question_before_load_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry(&dir.path().join("cache.json"));

    let err = registry
        .execute(
            "ask_pdf_question",
            json!({"file_path": "/docs/rules.pdf", "question": "refunds"}),
        )
        .await
        .unwrap_err();
    assert_eq!(
        err.detail(),
        "PDF not loaded. Please use load_pdf first for: rules.pdf"
    );
}

#[tokio::test]
async fn test_libraries_opened_together_share_loads() {
    let dir = tempfile::tempdir().unwrap();
    let cache_file = dir.path().join("pdf_cache.json");
    let rules = dir.path().join("rules.pdf");
    let fees = dir.path().join("fees.pdf");
    std::fs::write(&rules, b"%PDF-1.4").unwrap();
    std::fs::write(&fees, b"%PDF-1.4").unwrap();

    let first = registry(&cache_file);
    let second = registry(&cache_file);

    text(&first, "load_pdf", json!({"file_path": rules.to_string_lossy()})).await;
    let listed = text(&second, "list_loaded_pdfs", json!({})).await;
    assert!(listed.contains("📄 rules.pdf"), "{}", listed);

    text(&second, "load_pdf", json!({"file_path": fees.to_string_lossy()})).await;
    let listed = text(&registry(&cache_file), "list_loaded_pdfs", json!({})).await;
    assert!(listed.starts_with("📚 Currently loaded PDF files (2):"), "{}", listed);
    assert!(listed.contains("📄 rules.pdf"));
    assert!(listed.contains("📄 fees.pdf"));
}
