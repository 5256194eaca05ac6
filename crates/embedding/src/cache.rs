use once_cell::sync::OnceCell;
use onnxruntime::{environment::Environment, session::Session};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use tokenizers::Tokenizer;

use crate::config::LocalConfig;
use crate::EmbeddingError;

static ORT_ENV: OnceCell<Environment> = OnceCell::new();

// Tokenizer + session handles are cached per worker thread. The first item
// embedded on any thread pays the load cost; everything after reuses the
// handle. Sessions are not Sync, so a thread-local keeps concurrent batches
// from contending on one session.
thread_local! {
    static MODEL_CACHE: RefCell<std::collections::HashMap<ModelCacheKey, Rc<CachedModel>>> =
        RefCell::new(std::collections::HashMap::new());
}

#[derive(Hash, PartialEq, Eq, Clone)]
struct ModelCacheKey {
    model_path: PathBuf,
    tokenizer_path: PathBuf,
}

pub(crate) struct CachedModel {
    pub(crate) tokenizer: Tokenizer,
    pub(crate) session: RefCell<Session<'static>>,
}

impl CachedModel {
    fn load(cfg: &LocalConfig) -> Result<Self, EmbeddingError> {
        let tokenizer = Tokenizer::from_file(&cfg.tokenizer_path)
            .map_err(|e| EmbeddingError::Inference(e.to_string()))?;

        let env = ort_environment()?;
        let session = env
            .new_session_builder()
            .map_err(|e| EmbeddingError::Inference(e.to_string()))?
            .with_model_from_file(cfg.model_path.clone())
            .map_err(|e| EmbeddingError::Inference(e.to_string()))?;

        Ok(Self {
            tokenizer,
            session: RefCell::new(session),
        })
    }
}

pub(crate) fn get_or_load_model_handle(
    cfg: &LocalConfig,
) -> Result<Rc<CachedModel>, EmbeddingError> {
    let key = ModelCacheKey {
        model_path: cfg.model_path.clone(),
        tokenizer_path: cfg.tokenizer_path.clone(),
    };

    MODEL_CACHE.with(|cache| {
        let mut cache = cache.borrow_mut();
        if let Some(handle) = cache.get(&key) {
            return Ok(handle.clone());
        }

        let handle = Rc::new(CachedModel::load(cfg)?);
        cache.insert(key, handle.clone());
        Ok(handle)
    })
}

fn ort_environment() -> Result<&'static Environment, EmbeddingError> {
    ORT_ENV.get_or_try_init(|| {
        Environment::builder()
            .with_name("embedrelay")
            .build()
            .map_err(|e| EmbeddingError::Inference(e.to_string()))
    })
}
