//! JSON column helpers with consistent warning logs.
//!
//! List-valued columns (binding channels, modifier patterns) are stored as
//! JSON text. A corrupt column degrades to an empty list instead of failing
//! the whole request, and the degradation is logged with the owning row.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

#[derive(Debug, Clone, Copy)]
pub enum JsonContext<'a> {
    BindingField {
        binding_id: &'a str,
        field: &'static str,
    },
    ModifierField {
        modifier_id: &'a str,
        field: &'static str,
    },
}

impl JsonContext<'_> {
    fn parts(&self) -> (&'static str, &str, &'static str) {
        match *self {
            JsonContext::BindingField { binding_id, field } => ("repo_binding", binding_id, field),
            JsonContext::ModifierField { modifier_id, field } => {
                ("event_modifier", modifier_id, field)
            }
        }
    }
}

pub fn parse_or_default<T: DeserializeOwned + Default>(
    raw: &str,
    ctx: JsonContext<'_>,
    msg: &'static str,
) -> T {
    // Empty string means "no value"
    if raw.is_empty() {
        return T::default();
    }
    match serde_json::from_str(raw) {
        Ok(parsed) => parsed,
        Err(error) => {
            let (entity, id, field) = ctx.parts();
            warn!(
                entity,
                id = %id,
                field,
                raw_len = raw.len(),
                error = %error,
                "{msg}"
            );
            T::default()
        }
    }
}

pub fn to_string_or_fallback<T: Serialize + ?Sized>(
    value: &T,
    fallback: &'static str,
    ctx: JsonContext<'_>,
    msg: &'static str,
) -> String {
    match serde_json::to_string(value) {
        Ok(json) => json,
        Err(error) => {
            let (entity, id, field) = ctx.parts();
            warn!(entity, id = %id, field, error = %error, "{msg}");
            fallback.to_string()
        }
    }
}
