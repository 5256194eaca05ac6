use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for both embedding backends.
///
/// Deserialized as the `embedding` section of the server configuration;
/// every field carries a default so a bare config file still produces a
/// working (stub-capable) set of backends.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// Remote API backend (`openai_embedding` rows).
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Local inference backend (`hf_embedding` rows).
    #[serde(default)]
    pub local: LocalConfig,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            remote: RemoteConfig::default(),
            local: LocalConfig::default(),
        }
    }
}

/// Remote embedding API settings. The endpoint must speak the
/// OpenAI-compatible `POST /v1/embeddings` shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteConfig {
    /// Embeddings endpoint URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Bearer credential; requests go out unauthenticated when absent.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model name sent with every request.
    #[serde(default = "default_remote_model")]
    pub model: String,

    /// Overall per-call timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// TCP connect timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: None,
            model: default_remote_model(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

/// Local transformer settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocalConfig {
    /// `"onnx"` runs real inference; `"stub"` forces the deterministic
    /// embedder (useful for tests and model-less deployments).
    #[serde(default = "default_local_mode")]
    pub mode: String,

    /// Path to the exported ONNX model file.
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Path to the matching `tokenizer.json`.
    #[serde(default = "default_tokenizer_path")]
    pub tokenizer_path: PathBuf,

    /// Token budget per item; longer inputs are truncated.
    #[serde(default = "default_max_sequence_length")]
    pub max_sequence_length: usize,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            mode: default_local_mode(),
            model_path: default_model_path(),
            tokenizer_path: default_tokenizer_path(),
            max_sequence_length: default_max_sequence_length(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.openai.com/v1/embeddings".to_string()
}

fn default_remote_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_local_mode() -> String {
    "onnx".to_string()
}

fn default_model_path() -> PathBuf {
    PathBuf::from("./models/paraphrase-multilingual-MiniLM-L12-v2/model.onnx")
}

fn default_tokenizer_path() -> PathBuf {
    PathBuf::from("./models/paraphrase-multilingual-MiniLM-L12-v2/tokenizer.json")
}

fn default_max_sequence_length() -> usize {
    256
}
