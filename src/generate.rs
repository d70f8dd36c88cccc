//! Answer synthesis against a hosted text-generation service.
//!
//! Builds a grounded prompt from the retrieved context and the question,
//! posts it to the configured endpoint, and strips any echo of the prompt
//! from the generated text. Every failure mode of the remote call (missing
//! network, non-success status, malformed body, empty output) degrades to
//! the same local fallback: the first sentence of the context. The
//! synthesizer never returns an error to its caller.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::GenerationConfig;

/// Answer returned when no credential has been set.
pub const NO_KEY_ANSWER: &str = "API key not set";
/// Answer returned when there is nothing to answer from.
pub const NO_ANSWER: &str = "No answer found";

#[derive(Serialize)]
struct GenerateRequest<'a> {
    inputs: &'a str,
    parameters: GenerateParameters,
}

#[derive(Serialize)]
struct GenerateParameters {
    max_length: u32,
}

#[derive(Deserialize)]
struct GeneratedText {
    generated_text: String,
}

/// Client for the hosted generation service.
pub struct AnswerSynthesizer {
    client: reqwest::Client,
    endpoint: String,
    max_length: u32,
}

impl AnswerSynthesizer {
    pub fn new(config: &GenerationConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            max_length: config.max_length,
        })
    }

    /// Synthesize an answer for `question` grounded in `context`.
    ///
    /// Without a credential this returns [`NO_KEY_ANSWER`] and makes no
    /// network call. The remote call is a single attempt; anything short of
    /// a 200 with non-empty generated text falls back to the first sentence
    /// of the context.
    pub async fn synthesize(
        &self,
        question: &str,
        context: &str,
        credential: Option<&str>,
    ) -> String {
        let credential = match credential {
            Some(c) if !c.is_empty() => c,
            _ => return NO_KEY_ANSWER.to_string(),
        };

        let prompt = format!("Context: {}\nQuestion: {}\nAnswer:", context, question);

        match self.call_service(&prompt, credential).await {
            Some(generated) => {
                let answer = generated.replace(&prompt, "").trim().to_string();
                if answer.is_empty() {
                    tracing::warn!("generation returned empty text, using context fallback");
                    fallback_answer(context)
                } else {
                    answer
                }
            }
            None => fallback_answer(context),
        }
    }

    /// One attempt against the generation endpoint. `None` covers every
    /// failure mode uniformly.
    async fn call_service(&self, prompt: &str, credential: &str) -> Option<String> {
        let request = GenerateRequest {
            inputs: prompt,
            parameters: GenerateParameters {
                max_length: self.max_length,
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", credential))
            .json(&request)
            .send()
            .await
            .map_err(|e| tracing::warn!(error = %e, "generation request failed"))
            .ok()?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "generation service returned non-success");
            return None;
        }

        let results: Vec<GeneratedText> = response
            .json()
            .await
            .map_err(|e| tracing::warn!(error = %e, "generation response was malformed"))
            .ok()?;

        results.into_iter().next().map(|r| r.generated_text)
    }
}

/// Best-effort local answer: the first sentence of the context.
///
/// An empty context yields [`NO_ANSWER`] rather than a lone period.
fn fallback_answer(context: &str) -> String {
    if context.trim().is_empty() {
        return NO_ANSWER.to_string();
    }
    match context.find('.') {
        Some(idx) => context[..=idx].to_string(),
        None => format!("{}.", context),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthesizer(endpoint: &str) -> AnswerSynthesizer {
        AnswerSynthesizer::new(&GenerationConfig {
            endpoint: endpoint.to_string(),
            max_length: 100,
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn missing_credential_short_circuits() {
        // An unresolvable endpoint proves no network call is attempted.
        let synth = synthesizer("http://192.0.2.1:1/generate");
        let answer = synth.synthesize("Why?", "Because. More text.", None).await;
        assert_eq!(answer, NO_KEY_ANSWER);
    }

    #[tokio::test]
    async fn unreachable_service_falls_back_to_first_sentence() {
        let synth = synthesizer("http://127.0.0.1:9/generate");
        let answer = synth
            .synthesize("What color is the sky?", "The sky is blue. Grass is green.", Some("tok"))
            .await;
        assert_eq!(answer, "The sky is blue.");
    }

    #[tokio::test]
    async fn empty_context_fallback_is_the_sentinel() {
        let synth = synthesizer("http://127.0.0.1:9/generate");
        let answer = synth.synthesize("Anything?", "", Some("tok")).await;
        assert_eq!(answer, NO_ANSWER);
    }

    #[test]
    fn fallback_takes_text_up_to_first_period() {
        assert_eq!(fallback_answer("One. Two. Three."), "One.");
        assert_eq!(fallback_answer("No period here"), "No period here.");
        assert_eq!(fallback_answer("   "), NO_ANSWER);
    }
}
