#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

/// The fragments from the "todo app" walkthrough: a status line split inside
/// its JSON object, and a code start marker split in half.
pub fn todo_app_fragments() -> Vec<&'static str> {
    return vec![
        "[AGENT_UPDATE]{",
        "\"agentName\":\"UI/UX Agent\",\"status\":\"working\",\"message\":\"designing\"}\n[AGENT_UPDATE]{\"agentName\":\"UI/UX Agent\",\"status\":\"complete\",\"message\":\"done\"}\n[CODE_",
        "START]<html></html>[CODE_END]",
    ];
}

/// A complete, well behaved model response.
pub fn model_response_fixture() -> &'static str {
    return r#"[AGENT_UPDATE]{"agentName": "UI/UX Agent", "status": "working", "message": "Crafting a {bold} visual blueprint..."}
[AGENT_UPDATE]{"agentName": "UI/UX Agent", "status": "complete", "message": "Blueprint ready."}
[AGENT_UPDATE]{"agentName": "Frontend Agent", "status": "working", "message": "Assembling \"responsive\" components."}
[AGENT_UPDATE]{"agentName": "Frontend Agent", "status": "complete", "message": "Components assembled."}
[AGENT_UPDATE]{"agentName": "Backend Agent", "status": "working", "message": "Wiring localStorage persistence."}
[AGENT_UPDATE]{"agentName": "Backend Agent", "status": "complete", "message": "Persistence wired."}
[AGENT_UPDATE]{"agentName": "Testing Agent", "status": "working", "message": "Clicking every button."}
[AGENT_UPDATE]{"agentName": "Testing Agent", "status": "complete", "message": "No bugs found."}
[CODE_START]<!DOCTYPE html>
<html>
<head><style>body { margin: 0; }</style></head>
<body>
<script>
  const todos = [];
  function add(item) { todos.push({ item, done: false }); }
</script>
</body>
</html>[CODE_END]"#;
}

/// The code carried by `model_response_fixture`.
pub fn model_response_code() -> &'static str {
    let response = model_response_fixture();
    let start = response.find("[CODE_START]").unwrap() + "[CODE_START]".len();
    let end = response.find("[CODE_END]").unwrap();
    return &response[start..end];
}

/// Every byte offset of `text` that is a char boundary, excluding both ends.
pub fn inner_boundaries(text: &str) -> Vec<usize> {
    return text
        .char_indices()
        .map(|(idx, _)| return idx)
        .filter(|idx| return *idx > 0)
        .collect();
}

/// Cuts `text` at the given ascending char boundaries.
pub fn split_at_offsets<'a>(text: &'a str, offsets: &[usize]) -> Vec<&'a str> {
    let mut fragments = vec![];
    let mut start = 0;
    for offset in offsets {
        fragments.push(&text[start..*offset]);
        start = *offset;
    }
    fragments.push(&text[start..]);

    return fragments;
}

/// Fixed-size chunks of `size` chars.
pub fn chunk_chars(text: &str, size: usize) -> Vec<String> {
    return text
        .chars()
        .collect::<Vec<char>>()
        .chunks(size)
        .map(|chunk| return chunk.iter().collect::<String>())
        .collect();
}
