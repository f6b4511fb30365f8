//! Prompts for one-off file requests.

/// Instruction used by `file --refactor`.
pub const REFACTOR_PROMPT: &str = "Refactor following file, extract code, de-duplicate, apply all best practices that you can think off that would be valuable here and would improve readability";

/// A user instruction paired with the content of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInput {
    pub user_message: String,
    pub file_content: String,
}

impl FileInput {
    #[must_use]
    pub fn new(user_message: impl Into<String>, file_content: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
            file_content: file_content.into(),
        }
    }

    #[must_use]
    pub fn refactor(file_content: impl Into<String>) -> Self {
        Self::new(REFACTOR_PROMPT, file_content)
    }

    /// The instruction (if any) followed by the file in a fenced block.
    #[must_use]
    pub fn to_prompt(&self) -> String {
        let instruction = self.user_message.trim();
        let file_block = format!("File content:\n```\n{}\n```", self.file_content.trim_end());
        if instruction.is_empty() {
            file_block
        } else {
            format!("{instruction}\n\n{file_block}")
        }
    }
}
