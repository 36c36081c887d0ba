//! Prompt assembly for the text-generation step

use super::engine::FileNeighbors;
use super::similarity::ScoredChunk;

const PREAMBLE: &str = "\
You are an expert code analyst. Analyze the provided code snippets and file dependencies to answer the question.

IMPORTANT INSTRUCTIONS:
- Be specific and cite actual code, file names, and technical details
- If you see specific technologies, frameworks, or libraries, name them explicitly
- Describe the architecture, tech stack, and key features you observe
- Look for routes, API endpoints, database schemas, UI components, etc.
- Be concise but thorough - focus on the most important technical details";

const CLOSING: &str = "Provide a detailed, technical answer based on the code provided:";

/// Formats retrieved chunks and dependency context into one directive
#[derive(Debug, Clone, Default)]
pub struct PromptAssembler;

impl PromptAssembler {
    pub fn new() -> Self {
        Self
    }

    /// `FILE: <path>` blocks in selection order, separated by blank lines
    pub fn code_context(&self, chunks: &[ScoredChunk]) -> String {
        chunks
            .iter()
            .map(|c| format!("FILE: {}\n\n{}", c.chunk.file_path, c.chunk.content))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// One `source -> a, b` line per expanded file
    pub fn dependency_context(&self, graph: &[FileNeighbors]) -> String {
        if graph.is_empty() {
            return "(none)".to_string();
        }

        graph
            .iter()
            .map(|entry| {
                let targets = if entry.neighbors.is_empty() {
                    "(none)".to_string()
                } else {
                    entry.neighbors.join(", ")
                };
                format!("{} -> {}", entry.path, targets)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn assemble(&self, question: &str, chunks: &[ScoredChunk], graph: &[FileNeighbors]) -> String {
        format!(
            "{}\n\nCODE CONTEXT:\n{}\n\nFILE DEPENDENCIES:\n{}\n\nQUESTION: {}\n\n{}",
            PREAMBLE,
            self.code_context(chunks),
            self.dependency_context(graph),
            question,
            CLOSING
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StoredChunk;

    fn chunk(path: &str, content: &str) -> ScoredChunk {
        ScoredChunk {
            chunk: StoredChunk {
                file_path: path.to_string(),
                chunk_index: 0,
                content: content.to_string(),
                embedding: Vec::new(),
            },
            score: 0.5,
        }
    }

    #[test]
    fn test_prompt_layout() {
        let chunks = vec![chunk("app.py", "app = Flask(__name__)"), chunk("db.py", "engine = create_engine()")];
        let graph = vec![
            FileNeighbors { path: "app.py".into(), neighbors: vec!["db.py".into(), "models.py".into()] },
            FileNeighbors { path: "db.py".into(), neighbors: vec![] },
        ];

        let prompt = PromptAssembler::new().assemble("Which framework?", &chunks, &graph);

        assert!(prompt.starts_with("You are an expert code analyst."));
        assert!(prompt.contains(
            "CODE CONTEXT:\nFILE: app.py\n\napp = Flask(__name__)\n\nFILE: db.py\n\nengine = create_engine()\n\nFILE DEPENDENCIES:"
        ));
        assert!(prompt.contains("FILE DEPENDENCIES:\napp.py -> db.py, models.py\ndb.py -> (none)\n\nQUESTION: Which framework?"));
        assert!(prompt.ends_with("Provide a detailed, technical answer based on the code provided:"));
    }

    #[test]
    fn test_prompt_without_context() {
        let prompt = PromptAssembler::new().assemble("Anything?", &[], &[]);

        assert!(prompt.contains("CODE CONTEXT:\n\n\nFILE DEPENDENCIES:\n(none)\n\nQUESTION: Anything?"));
    }
}
