use async_trait::async_trait;
use std::fmt::Debug;

/// Observer for model exchanges, called once per prompt/response pair.
#[async_trait]
pub trait Interceptor: Send + Sync + Debug {
    /// `stage` names the call, e.g. "questions" or "formatting".
    async fn save(&self, stage: &str, prompt: &str, response: &str) -> std::io::Result<()>;
}

pub mod file;
pub use file::FileInterceptor;
