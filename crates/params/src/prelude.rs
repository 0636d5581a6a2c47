//! Re-exports of the commonly used parameter types.

pub use crate::{errors::ParamsError, keygen::KeyGenParams, tokens::TokenInfo, Params};
