use crate::error::Error;
use serde::{de::DeserializeOwned, Serialize};

pub trait Tokener {
    fn issue<C: Serialize>(&self, claims: &C) -> Result<String, Error>;
    fn verify<C: DeserializeOwned>(&self, token: &str) -> Result<C, Error>;
}
