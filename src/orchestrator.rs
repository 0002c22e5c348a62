//! Builds the system instruction from the knowledge base and turns one user
//! question into one assistant reply.

use std::sync::Arc;
use tracing::{debug, error, instrument};

use crate::constants;
use crate::knowledge_base::KnowledgeBase;
use crate::llm_interaction::{GenerationRequest, GenerativeModel, SamplingParams};

#[derive(Clone)]
pub struct PromptOrchestrator {
    model: Arc<dyn GenerativeModel>,
    model_id: String,
    sampling: SamplingParams,
    system_instruction: String,
}

impl PromptOrchestrator {
    pub fn new(
        model: Arc<dyn GenerativeModel>,
        knowledge_base: &KnowledgeBase,
        model_id: impl Into<String>,
        sampling: SamplingParams,
    ) -> Self {
        Self {
            model,
            model_id: model_id.into(),
            sampling,
            system_instruction: build_system_instruction(knowledge_base),
        }
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Asks the model and returns its text. Never fails: an empty answer maps
    /// to [`constants::EMPTY_RESPONSE_FALLBACK`], any error to
    /// [`constants::ERROR_FALLBACK`].
    #[instrument(skip(self, user_text), fields(model = %self.model_id))]
    pub async fn get_response(&self, user_text: &str) -> String {
        let request = GenerationRequest {
            model: self.model_id.clone(),
            system_instruction: self.system_instruction.clone(),
            content: user_text.to_string(),
            sampling: self.sampling,
        };

        match self.model.generate(&request).await {
            Ok(Some(text)) if !text.is_empty() => {
                debug!(len = text.len(), "Model answered");
                text
            }
            Ok(_) => {
                debug!("Model answered without text");
                constants::EMPTY_RESPONSE_FALLBACK.to_string()
            }
            Err(e) => {
                error!(error = %e, "Generative API error");
                constants::ERROR_FALLBACK.to_string()
            }
        }
    }
}

pub fn build_system_instruction(knowledge_base: &KnowledgeBase) -> String {
    format!(
        "You are InsightHub Assistant, an AI expert focused on the user's personal knowledge base.\n\
         The user has notes on these subjects:\n\
         {}\n\
         \n\
         Instructions:\n\
         1. Use the provided context to answer questions about what is in the repository.\n\
         2. If asked about a specific topic, provide a brief, professional summary and how it relates to other topics in the index.\n\
         3. Keep responses concise, helpful, and academic in tone.\n\
         4. If a topic isn't in the index, you can still answer but mention it's outside the current repository.\n\
         5. Use Markdown for formatting.",
        knowledge_base.summary()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_interaction::GenerateError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Recording {
        reply: Result<Option<String>, ()>,
        seen: Mutex<Vec<GenerationRequest>>,
    }

    #[async_trait]
    impl GenerativeModel for Recording {
        async fn generate(&self, request: &GenerationRequest) -> Result<Option<String>, GenerateError> {
            self.seen.lock().unwrap().push(request.clone());
            self.reply.clone().map_err(|_| GenerateError::MissingApiKey)
        }
    }

    fn orchestrator(reply: Result<Option<String>, ()>) -> (PromptOrchestrator, Arc<Recording>) {
        let model = Arc::new(Recording { reply, seen: Mutex::new(Vec::new()) });
        let orch = PromptOrchestrator::new(
            model.clone(),
            &KnowledgeBase::builtin(),
            "gemini-test",
            SamplingParams::default(),
        );
        (orch, model)
    }

    #[test]
    fn test_system_instruction_embeds_summary_and_directives() {
        let kb = KnowledgeBase::builtin();
        let instruction = build_system_instruction(&kb);
        assert!(instruction.contains(&kb.summary()));
        assert!(instruction.starts_with("You are InsightHub Assistant"));
        for n in 1..=5 {
            assert!(instruction.contains(&format!("\n{}. ", n)), "missing directive {}", n);
        }
    }

    #[tokio::test]
    async fn test_sends_one_request_with_raw_text() {
        let (orch, model) = orchestrator(Ok(Some("answer".to_string())));
        let reply = orch.get_response("  What is SQL?  ").await;
        assert_eq!(reply, "answer");

        let seen = model.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].content, "  What is SQL?  ");
        assert_eq!(seen[0].model, "gemini-test");
        assert_eq!(seen[0].system_instruction, orch.system_instruction());
        assert_eq!(seen[0].sampling, SamplingParams { temperature: 0.7, top_p: 0.95 });
    }

    #[tokio::test]
    async fn test_empty_answer_falls_back() {
        let (orch, _) = orchestrator(Ok(None));
        assert_eq!(orch.get_response("x").await, constants::EMPTY_RESPONSE_FALLBACK);

        let (orch, _) = orchestrator(Ok(Some(String::new())));
        assert_eq!(orch.get_response("x").await, constants::EMPTY_RESPONSE_FALLBACK);
    }

    #[tokio::test]
    async fn test_error_is_absorbed() {
        let (orch, _) = orchestrator(Err(()));
        assert_eq!(orch.get_response("x").await, constants::ERROR_FALLBACK);
    }
}
