use super::helpers::*;
use crate::chat::{ChatRequest, ChatService, Turn};
use crate::error::ChatError;
use crate::model::{GenerationParams, MockVlm, ModelService};
use crate::vision::ImageLimits;
use std::sync::atomic::Ordering;
use std::sync::Arc;

// ── Full pipeline ───────────────────────────────────────────

#[tokio::test]
async fn test_text_pipeline_echo_and_emotion() {
    let service = service_with(Arc::new(MockVlm::new()));
    let reply = service.chat(text_request("今天吃什么？")).await.unwrap();

    assert!(reply.text.contains("今天吃什么？"));
    assert_eq!(reply.emotion.as_deref(), Some("开心"));
    assert_eq!(reply.role_id, None);
}

#[tokio::test]
async fn test_image_pipeline_reaches_backend() {
    let service = service_with(Arc::new(MockVlm::new()));
    let request = ChatRequest {
        message: "这是什么？".to_string(),
        image: Some(png_bytes(64, 64)),
        history: vec![],
        role_id: None,
    };

    let reply = service.chat(request).await.unwrap();
    assert!(reply.text.contains("图片"), "mock notes the image: {}", reply.text);
}

#[tokio::test]
async fn test_undecodable_image_degrades_to_text_only() {
    let service = service_with(Arc::new(MockVlm::new()));
    let request = ChatRequest {
        message: "还在吗".to_string(),
        image: Some(b"not an image at all".to_vec()),
        history: vec![],
        role_id: None,
    };

    let reply = service.chat(request).await.unwrap();
    assert!(reply.text.contains("还在吗"));
    assert!(!reply.text.contains("图片"), "image must have been dropped");
}

#[tokio::test]
async fn test_oversized_image_resized_inside_pipeline() {
    // End-to-end sanity for the normalizer inside the pipeline: a large
    // image goes through a real decode + resize before encoding.
    let service = ChatService::new(
        test_registry(),
        ModelService::with_backend(Arc::new(MockVlm::new()), GenerationParams::default()),
        ImageLimits {
            max_width: 32,
            max_height: 32,
            max_pixels: 1024,
        },
        4,
    );
    let request = ChatRequest {
        message: "看图".to_string(),
        image: Some(png_bytes(200, 120)),
        history: vec![],
        role_id: None,
    };

    let reply = service.chat(request).await.unwrap();
    assert!(reply.text.contains("图片"));
}

// ── Role handling ───────────────────────────────────────────

#[tokio::test]
async fn test_role_default_emotion_when_reply_has_no_tag() {
    let service = service_with(Arc::new(MockVlm::with_reply("好的，我知道了。")));
    let request = ChatRequest {
        role_id: Some("kotoha".to_string()),
        ..text_request("嗯")
    };

    let reply = service.chat(request).await.unwrap();
    assert_eq!(reply.emotion.as_deref(), Some("平静"));
    assert_eq!(reply.role_id.as_deref(), Some("kotoha"));
}

#[tokio::test]
async fn test_live2d_disabled_role_has_no_emotion() {
    let service = service_with(Arc::new(MockVlm::with_reply("好的，我知道了。")));
    let request = ChatRequest {
        role_id: Some("shizuko".to_string()),
        ..text_request("嗯")
    };

    let reply = service.chat(request).await.unwrap();
    assert_eq!(reply.emotion, None);
}

#[tokio::test]
async fn test_leaked_markers_are_cleaned() {
    let service = service_with(Arc::new(MockVlm::with_reply(
        "<|im_end|>assistant\n[情绪:害羞]那个……我没想好。<|im_start|>",
    )));

    let reply = service.chat(text_request("在吗")).await.unwrap();
    assert_eq!(reply.text, "那个……我没想好。");
    assert_eq!(reply.emotion.as_deref(), Some("害羞"));
}

// ── History threading ───────────────────────────────────────

#[tokio::test]
async fn test_history_is_windowed_into_prompt() {
    let stub = Arc::new(StubVlm::default());
    let service = service_with(stub.clone());

    let history: Vec<Turn> = (0..8)
        .map(|i| Turn {
            role: if i % 2 == 0 { "user" } else { "assistant" }.to_string(),
            content: format!("turn-{}", i),
        })
        .collect();
    let request = ChatRequest {
        history,
        ..text_request("current")
    };
    service.chat(request).await.unwrap();

    let prompt = stub.last_prompt().unwrap();
    for kept in ["turn-4", "turn-5", "turn-6", "turn-7"] {
        assert!(prompt.contains(kept), "windowed turn missing: {}", kept);
    }
    for dropped in ["turn-0", "turn-1", "turn-2", "turn-3"] {
        assert!(!prompt.contains(dropped), "stale turn leaked: {}", dropped);
    }
}

// ── Input validation ────────────────────────────────────────

#[tokio::test]
async fn test_empty_message_never_reaches_backend() {
    let stub = Arc::new(StubVlm::default());
    let service = service_with(stub.clone());

    let err = service.chat(text_request("   ")).await.unwrap_err();
    assert!(matches!(err, ChatError::EmptyMessage));
    assert_eq!(stub.generate_calls.load(Ordering::SeqCst), 0);
    assert!(stub.encoded_prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_no_backend_is_model_not_loaded() {
    let service = ChatService::new(
        test_registry(),
        ModelService::disabled(GenerationParams::default()),
        ImageLimits::default(),
        4,
    );

    let err = service.chat(text_request("在吗")).await.unwrap_err();
    assert!(matches!(err, ChatError::ModelNotLoaded));
}
