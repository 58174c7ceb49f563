//! Fixed label → model identifier mapping offered in the model selector.

/// One selectable backend model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelEntry {
    pub label: &'static str,
    pub id: &'static str,
}

const OPENROUTER_MODELS: &[ModelEntry] = &[
    ModelEntry { label: "LLaMA 3 (8B)", id: "meta-llama/llama-3-8b-instruct" },
    ModelEntry { label: "DeepSeek R1", id: "deepseek/deepseek-r1" },
    ModelEntry { label: "DeepSeek Chat V3", id: "deepseek/deepseek-chat-v3-0324" },
    ModelEntry { label: "Gemma 3 27B", id: "google/gemma-3-27b-it" },
    ModelEntry { label: "Mistral Small", id: "mistralai/devstral-small" },
];

/// Read-only model catalog. Order is the display order.
#[derive(Debug, Clone, Copy)]
pub struct ModelCatalog {
    entries: &'static [ModelEntry],
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self { entries: OPENROUTER_MODELS }
    }
}

impl ModelCatalog {
    pub fn entries(&self) -> &'static [ModelEntry] {
        self.entries
    }

    pub fn labels(&self) -> impl Iterator<Item = &'static str> {
        self.entries.iter().map(|entry| entry.label)
    }

    /// Look up an entry by its exact label.
    pub fn find(&self, label: &str) -> Option<&'static ModelEntry> {
        self.entries.iter().find(|entry| entry.label == label)
    }

    pub fn id_for(&self, label: &str) -> Option<&'static str> {
        self.find(label).map(|entry| entry.id)
    }

    pub fn position(&self, label: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.label == label)
    }

    pub fn get(&self, index: usize) -> Option<&'static ModelEntry> {
        self.entries.get(index)
    }

    /// Resolve loose user input: exact label, case-insensitive label,
    /// model identifier, or a 1-based index into the list.
    pub fn resolve(&self, query: &str) -> Option<&'static ModelEntry> {
        let query = query.trim();
        if let Some(entry) = self.find(query) {
            return Some(entry);
        }
        if let Ok(index) = query.parse::<usize>() {
            return index.checked_sub(1).and_then(|i| self.get(i));
        }
        let lowered = query.to_lowercase();
        self.entries
            .iter()
            .find(|entry| entry.label.to_lowercase() == lowered || entry.id == query)
    }

    pub fn default_entry(&self) -> &'static ModelEntry {
        &self.entries[0]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
