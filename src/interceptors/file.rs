use super::Interceptor;
use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Writes each exchange to `<base_path>/quiz_<stage>_<timestamp>.md`.
#[derive(Debug)]
pub struct FileInterceptor {
    base_path: PathBuf,
}

impl FileInterceptor {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

#[async_trait]
impl Interceptor for FileInterceptor {
    async fn save(&self, stage: &str, prompt: &str, response: &str) -> std::io::Result<()> {
        let timestamp = Utc::now();
        let filename = format!("quiz_{}_{}.md", stage, timestamp.format("%Y%m%d_%H%M%S_%3f"));
        let file_path = self.base_path.join(filename);

        fs::create_dir_all(&self.base_path).await?;

        let content = format!("# Prompt\n\n{}\n\n# Response\n\n{}\n", prompt, response);

        let mut file = fs::File::create(&file_path).await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_prompt_and_response_as_markdown() {
        let dir = std::env::temp_dir().join(format!("quizgpt-transcripts-{}", std::process::id()));
        let interceptor = FileInterceptor::new(dir.clone());

        interceptor.save("questions", "the prompt", "the response").await.unwrap();

        let mut entries = std::fs::read_dir(&dir).unwrap();
        let path = entries.next().unwrap().unwrap().path();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("quiz_questions_"));
        assert!(name.ends_with(".md"));
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("# Prompt\n\nthe prompt"));
        assert!(content.contains("# Response\n\nthe response"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
