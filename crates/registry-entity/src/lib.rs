//! # registry-entity
//!
//! Domain entity models for the archive registry. Every struct in this
//! crate is the typed view of one record in a persisted collection and
//! derives `Debug`, `Clone`, `Serialize`, and `Deserialize`.
//!
//! Records written by earlier deployments used Portuguese keys
//! (`usuario`, `acao`, `nome_arquivo`, ...). These are accepted as serde
//! aliases when reading; writes always use the English names.

pub mod audit;
pub mod document;
pub mod export;
pub mod timestamp;
pub mod upload;
pub mod user;
