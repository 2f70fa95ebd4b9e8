//! Fixed prompt text used by the context builder.

/// System prompt when no role is selected or the role has no prompt of its own.
pub const GENERIC_SYSTEM_PROMPT: &str =
    "你是一个乐于助人的AI助手。请记住我们的对话历史，回答时参考之前提到的内容。";

/// Appended to a role's own system prompt so every persona keeps track of
/// the conversation.
pub const HISTORY_INSTRUCTION: &str = "请记住我们的对话历史，回答时参考之前提到的内容。";
