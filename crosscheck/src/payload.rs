use crate::data::Payload;
use rand::{rngs::ThreadRng, Rng};
use serde_json::Value;
use std::fmt::Debug;

pub const DEFAULT_UNIQUE_FIELD: &str = "email";
pub const DEFAULT_UNIQUE_DOMAIN: &str = "example.com";

pub trait UniqueTokenSource: Debug {
    fn next_token(&mut self) -> String;
}

#[derive(Debug, Default)]
pub struct RandomTokenSource {
    rng: ThreadRng,
}

impl RandomTokenSource {
    pub fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }
}

impl UniqueTokenSource for RandomTokenSource {
    fn next_token(&mut self) -> String {
        format!("{:016x}", self.rng.gen::<u64>())
    }
}

pub fn inject_unique<S: UniqueTokenSource + ?Sized>(
    template: &Payload,
    field: &str,
    domain: &str,
    tokens: &mut S,
) -> Payload {
    let mut payload = template.clone();

    if let Some(value) = payload.get_mut(field) {
        *value = Value::String(format!("{}@{}", tokens.next_token(), domain));
    }

    payload
}
