//! Deterministic in-process backend for frontend development and tests.
//!
//! Tokens are Unicode scalar values, so encode/decode are exact inverses and
//! the prompt-echo trim in the invoker is exercised for real: `generate`
//! returns the input ids followed by the reply ids, exactly like a
//! causal-LM `generate` call.

use crate::chat::{ChatMessage, ContentPart, MessageContent};
use crate::model::backend::{EncodedPrompt, GenerationParams, VlmBackend};
use crate::vision::NormalizedImage;

const USER_OPEN: &str = "<|im_start|>user\n";
const TURN_CLOSE: &str = "<|im_end|>";
const IMAGE_PAD: &str = "<|vision_start|><|image_pad|><|vision_end|>";

pub struct MockVlm {
    /// Fixed reply override; when unset the reply echoes the last user turn.
    canned: Option<String>,
}

impl MockVlm {
    pub fn new() -> Self {
        Self { canned: None }
    }

    /// Always reply with `text` regardless of the prompt.
    pub fn with_reply(text: &str) -> Self {
        Self {
            canned: Some(text.to_string()),
        }
    }

    fn reply_for(&self, prompt: &str, has_image: bool) -> String {
        if let Some(canned) = &self.canned {
            return canned.clone();
        }
        let user = last_user_text(prompt).unwrap_or_default();
        if has_image {
            format!("[情绪:开心]我看到你发的图片啦！{}", user)
        } else {
            format!("[情绪:开心]收到：{}", user)
        }
    }
}

impl Default for MockVlm {
    fn default() -> Self {
        Self::new()
    }
}

impl VlmBackend for MockVlm {
    fn apply_chat_template(&self, messages: &[ChatMessage]) -> anyhow::Result<String> {
        let mut prompt = String::new();
        for message in messages {
            prompt.push_str(&format!("<|im_start|>{}\n", message.role));
            match &message.content {
                MessageContent::Text(text) => prompt.push_str(text),
                MessageContent::Parts(parts) => {
                    for part in parts {
                        match part {
                            ContentPart::Image => prompt.push_str(IMAGE_PAD),
                            ContentPart::Text { text } => prompt.push_str(text),
                        }
                    }
                }
            }
            prompt.push_str(TURN_CLOSE);
            prompt.push('\n');
        }
        prompt.push_str("<|im_start|>assistant\n");
        Ok(prompt)
    }

    fn encode(
        &self,
        prompt: &str,
        image: Option<&NormalizedImage>,
    ) -> anyhow::Result<EncodedPrompt> {
        Ok(EncodedPrompt {
            input_ids: encode_text(prompt),
            has_image: image.is_some(),
        })
    }

    fn generate(
        &self,
        input: &EncodedPrompt,
        params: &GenerationParams,
    ) -> anyhow::Result<Vec<u32>> {
        let prompt = decode_text(&input.input_ids);
        let reply = self.reply_for(&prompt, input.has_image);

        let mut reply_ids = encode_text(&reply);
        reply_ids.truncate(params.max_tokens as usize);

        let mut output = input.input_ids.clone();
        output.extend(reply_ids);
        Ok(output)
    }

    fn decode(&self, token_ids: &[u32]) -> anyhow::Result<String> {
        Ok(decode_text(token_ids))
    }

    fn id(&self) -> &str {
        "mock"
    }

    fn model_id(&self) -> &str {
        "mock-vlm"
    }

    fn model_name(&self) -> &str {
        "Mock VLM"
    }

    fn device(&self) -> &str {
        "cpu"
    }
}

fn encode_text(text: &str) -> Vec<u32> {
    text.chars().map(|c| c as u32).collect()
}

fn decode_text(ids: &[u32]) -> String {
    ids.iter().filter_map(|&id| char::from_u32(id)).collect()
}

/// The text of the last user turn in a rendered prompt, image pad stripped.
fn last_user_text(prompt: &str) -> Option<&str> {
    let start = prompt.rfind(USER_OPEN)? + USER_OPEN.len();
    let rest = &prompt[start..];
    let end = rest.find(TURN_CLOSE).unwrap_or(rest.len());
    Some(rest[..end].trim_start_matches(IMAGE_PAD))
}
