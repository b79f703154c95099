/// Separates the base system prompt from the injected profile section.
pub const PROFILE_MARKER: &str = "\n\n[CURRENT STUDENT DATA]:";

pub const PROFILE_INSTRUCTION: &str = "INSTRUCTION: The user has uploaded the above student profile. Use this data to provide personalized admission prediction ('Chance Me') and specific improvement advice when asked.";

/// Text extracted from uploaded documents for the current student.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileBuffer {
    text: String,
}

impl ProfileBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn append(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Swap in a profile loaded from storage.
    pub fn replace(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// At most `max_chars` characters, with "..." when cut.
    pub fn preview(&self, max_chars: usize) -> String {
        if self.text.chars().count() > max_chars {
            let head: String = self.text.chars().take(max_chars).collect();
            format!("{}...", head)
        } else {
            self.text.clone()
        }
    }
}

/// Builds the system prompt for `profile`, discarding any section a
/// previous injection left behind.
pub fn inject_profile(system_content: &str, profile: &ProfileBuffer) -> String {
    let base = strip_profile(system_content);
    if profile.is_empty() {
        return base.to_string();
    }
    format!(
        "{}{}\n{}\n\n{}",
        base,
        PROFILE_MARKER,
        profile.as_str(),
        PROFILE_INSTRUCTION
    )
}

pub fn strip_profile(system_content: &str) -> &str {
    system_content
        .split(PROFILE_MARKER)
        .next()
        .unwrap_or(system_content)
}
