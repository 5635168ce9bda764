use derive_more::Display;
use thiserror::Error;

#[derive(Debug, Display, Error)]
#[display(fmt = "{self:?}")]
pub struct StoreError {
    pub key: String,
    pub function: &'static str,
    pub error: anyhow::Error,
}
