use crate::catalog::ModelCatalog;
use crate::config::Config;
use crate::session::ChatSession;
use anyhow::{bail, Result};
use std::path::Path;

/// Catalog table for `multichat models`, marking the startup model.
pub fn format_model_list(catalog: &ModelCatalog, selected: &str) -> String {
    let width = catalog.labels().map(str::len).max().unwrap_or(0);
    let mut out = String::from("🤖 Available models:\n\n");
    for (i, entry) in catalog.entries().iter().enumerate() {
        let marker = if entry.label == selected { "▶" } else { " " };
        out.push_str(&format!(
            "{} {}. {:width$}  {}\n",
            marker,
            i + 1,
            entry.label,
            entry.id,
            width = width
        ));
    }
    out
}

/// Model to mark in `multichat models`. Listing needs no config, so a broken
/// file or unknown `default_model` only produces a warning here.
pub fn listing_selection(
    config_path: &Path,
    cli_model: Option<&str>,
    catalog: &ModelCatalog,
) -> &'static str {
    if let Some(query) = cli_model {
        match catalog.resolve(query) {
            Some(entry) => return entry.label,
            None => tracing::warn!(model = query, "unknown model, ignoring"),
        }
    }

    match Config::load_from(config_path).and_then(|config| config.startup_model(catalog)) {
        Ok(label) => label,
        Err(err) => {
            tracing::warn!(error = %err, "ignoring config for model listing");
            catalog.default_entry().label
        }
    }
}

pub fn list_models(catalog: &ModelCatalog, selected: &str) {
    print!("{}", format_model_list(catalog, selected));
}

/// One-shot, non-interactive completion. Prints the reply, or the error text.
pub async fn ask(mut session: ChatSession, prompt: &str) -> Result<()> {
    if prompt.trim().is_empty() {
        bail!("Prompt cannot be empty");
    }

    if let Some(reply) = session.submit(prompt).await? {
        println!("{}", reply.content());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::test_support::{client_with, StubTransport};
    use std::io::Write;

    #[test]
    fn listing_survives_broken_config() {
        let catalog = ModelCatalog::default();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default_model = [").unwrap();

        assert_eq!(listing_selection(file.path(), None, &catalog), "LLaMA 3 (8B)");
        assert_eq!(listing_selection(file.path(), Some("3"), &catalog), "DeepSeek Chat V3");
    }

    #[test]
    fn listing_ignores_unknown_default_model() {
        let catalog = ModelCatalog::default();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default_model = \"gpt-5\"").unwrap();

        assert_eq!(listing_selection(file.path(), None, &catalog), "LLaMA 3 (8B)");
        assert_eq!(listing_selection(file.path(), Some("nope"), &catalog), "LLaMA 3 (8B)");
    }

    #[test]
    fn listing_uses_configured_default() {
        let catalog = ModelCatalog::default();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default_model = \"Mistral Small\"").unwrap();

        assert_eq!(listing_selection(file.path(), None, &catalog), "Mistral Small");
    }

    #[tokio::test]
    async fn ask_rejects_blank_prompt() {
        let stub = StubTransport::new();
        let session =
            ChatSession::new(client_with(&stub), ModelCatalog::default(), "LLaMA 3 (8B)").unwrap();

        let err = ask(session, "   ").await.unwrap_err();
        assert_eq!(err.to_string(), "Prompt cannot be empty");
        assert!(stub.requests().is_empty());
    }

    #[test]
    fn model_list_marks_selection_and_shows_ids() {
        let catalog = ModelCatalog::default();
        let listing = format_model_list(&catalog, "Gemma 3 27B");

        assert!(listing.contains("▶ 4. Gemma 3 27B"));
        assert!(listing.contains("google/gemma-3-27b-it"));
        assert!(listing.contains("  1. LLaMA 3 (8B)"));
        assert_eq!(listing.lines().filter(|l| l.contains('/')).count(), 5);
    }
}
