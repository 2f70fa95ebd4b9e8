use crate::chat::{ChatMessage, ChatRequest, ChatService};
use crate::model::backend::{EncodedPrompt, GenerationParams, VlmBackend};
use crate::model::ModelService;
use crate::roles::{Live2dConfig, Role, RoleRegistry};
use crate::vision::{ImageLimits, NormalizedImage};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ── Fixtures ────────────────────────────────────────────────

/// Registry with one Live2D-enabled role ("kotoha", default emotion 平静)
/// and one Live2D-disabled role ("shizuko").
pub fn test_registry() -> Arc<RoleRegistry> {
    let kotoha = Role {
        name: "琴叶".to_string(),
        nickname: "小琴".to_string(),
        description: String::new(),
        personality: vec!["温柔".to_string()],
        system_prompt: "你是琴叶，一位温柔的虚拟角色。".to_string(),
        live2d: Live2dConfig {
            enabled: true,
            default_emotion: Some("平静".to_string()),
            model_path: None,
            extra: Default::default(),
        },
    };
    let shizuko = Role {
        name: "静子".to_string(),
        nickname: String::new(),
        description: String::new(),
        personality: vec![],
        system_prompt: String::new(),
        live2d: Live2dConfig::default(),
    };
    Arc::new(RoleRegistry::with_roles(vec![
        ("kotoha", kotoha),
        ("shizuko", shizuko),
    ]))
}

pub fn service_with(backend: Arc<dyn VlmBackend>) -> ChatService {
    ChatService::new(
        test_registry(),
        ModelService::with_backend(backend, GenerationParams::default()),
        ImageLimits::default(),
        4,
    )
}

pub fn text_request(message: &str) -> ChatRequest {
    ChatRequest {
        message: message.to_string(),
        image: None,
        history: vec![],
        role_id: None,
    }
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
        width,
        height,
        image::Rgba([40, 40, 220, 255]),
    ));
    let mut buf = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}

// ── Failure-injecting stub backend ──────────────────────────

/// Stub VLM with switchable failure points. The codec mirrors `MockVlm`
/// (one token per char) and records every encoded prompt so tests can
/// observe which render path produced it.
#[derive(Default)]
pub struct StubVlm {
    pub fail_template: bool,
    pub fail_encode: bool,
    pub fail_generate: bool,
    pub generate_calls: AtomicUsize,
    pub encoded_prompts: Mutex<Vec<String>>,
}

impl StubVlm {
    pub fn failing_template() -> Self {
        Self {
            fail_template: true,
            ..Default::default()
        }
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.encoded_prompts.lock().unwrap().last().cloned()
    }
}

impl VlmBackend for StubVlm {
    fn apply_chat_template(&self, messages: &[ChatMessage]) -> anyhow::Result<String> {
        if self.fail_template {
            anyhow::bail!("unsupported role shape in template");
        }
        let mut prompt = String::new();
        for message in messages {
            prompt.push_str(&format!(
                "<|im_start|>{}\n{}<|im_end|>\n",
                message.role,
                message.content.text()
            ));
        }
        prompt.push_str("<|im_start|>assistant\n");
        Ok(prompt)
    }

    fn encode(
        &self,
        prompt: &str,
        image: Option<&NormalizedImage>,
    ) -> anyhow::Result<EncodedPrompt> {
        if self.fail_encode {
            anyhow::bail!("processor rejected the prompt");
        }
        self.encoded_prompts
            .lock()
            .unwrap()
            .push(prompt.to_string());
        Ok(EncodedPrompt {
            input_ids: prompt.chars().map(|c| c as u32).collect(),
            has_image: image.is_some(),
        })
    }

    fn generate(
        &self,
        input: &EncodedPrompt,
        _params: &GenerationParams,
    ) -> anyhow::Result<Vec<u32>> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_generate {
            anyhow::bail!("CUDA out of memory");
        }
        let mut output = input.input_ids.clone();
        output.extend("好的。".chars().map(|c| c as u32));
        Ok(output)
    }

    fn decode(&self, token_ids: &[u32]) -> anyhow::Result<String> {
        Ok(token_ids
            .iter()
            .filter_map(|&id| char::from_u32(id))
            .collect())
    }

    fn id(&self) -> &str {
        "stub"
    }

    fn model_id(&self) -> &str {
        "stub-vlm"
    }

    fn model_name(&self) -> &str {
        "Stub VLM"
    }

    fn device(&self) -> &str {
        "cpu"
    }
}
