//! services/api/src/adapters/recommendation_llm.rs
//!
//! This module contains the adapter for the study-coach LLM.
//! It implements the `RecommendationService` port from the `core` crate. The model
//! only ever sees the summary text built by the core, never raw records.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use exam_tracker_core::ports::{PortError, PortResult, RecommendationKind, RecommendationService};
use tracing::debug;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `RecommendationService` using an OpenAI-compatible LLM.
/// Gemini is reached through its OpenAI-compatible endpoint with the same client.
#[derive(Clone)]
pub struct OpenAiRecommendationAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiRecommendationAdapter {
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

/// The coaching instructions for each recommendation kind.
pub fn system_prompt(kind: RecommendationKind) -> &'static str {
    match kind {
        RecommendationKind::StudyPlan => {
            "Sen YKS'ye hazırlanan öğrencilere koçluk yapan bir eğitim danışmanısın. \
             Aşağıda öğrencinin derslere göre doğru sayıları var. Zayıf dersleri öne alan, \
             günlere bölünmüş, uygulanabilir bir haftalık çalışma planı öner. \
             Yanıtı Türkçe ve madde işaretleriyle ver."
        }
        RecommendationKind::ExamStrategy => {
            "Sen YKS'ye hazırlanan öğrencilere koçluk yapan bir eğitim danışmanısın. \
             Aşağıda öğrencinin her dersteki son neti ve net eğilimi var. Netleri düşen \
             dersler için nedenleri ve sınav sırasında uygulanacak somut stratejileri \
             (soru sırası, zaman yönetimi, boş bırakma kararı) öner. Yanıtı Türkçe ver."
        }
        RecommendationKind::ErrorAnalysis => {
            "Sen YKS'ye hazırlanan öğrencilere koçluk yapan bir eğitim danışmanısın. \
             Aşağıda öğrencinin son denemesindeki ders bazında doğru, yanlış ve boş \
             sayıları var. Yanlış ve boşların yoğunlaştığı dersleri belirle, olası hata \
             türlerini açıkla ve her biri için tekrar önerisi ver. Yanıtı Türkçe ver."
        }
    }
}

fn build_messages(
    kind: RecommendationKind,
    summary: &str,
) -> PortResult<Vec<ChatCompletionRequestMessage>> {
    Ok(vec![
        ChatCompletionRequestSystemMessageArgs::default()
            .content(system_prompt(kind))
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .into(),
        ChatCompletionRequestUserMessageArgs::default()
            .content(summary.to_string())
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .into(),
    ])
}

//=========================================================================================
// `RecommendationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl RecommendationService for OpenAiRecommendationAdapter {
    async fn recommend(&self, kind: RecommendationKind, summary: &str) -> PortResult<String> {
        debug!(%kind, model = %self.model, "Requesting recommendation");

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(build_messages(kind, summary)?)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        match response.choices.into_iter().next() {
            Some(choice) => choice.message.content.ok_or_else(|| {
                PortError::Unexpected(
                    "Recommendation LLM response contained no text content.".to_string(),
                )
            }),
            None => Err(PortError::Unexpected(
                "Recommendation LLM returned no choices in its response.".to_string(),
            )),
        }
    }
}
