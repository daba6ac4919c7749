// src/models/mod.rs
pub mod culto;
pub mod estudo;
pub mod page;
pub mod photo;
pub mod schedule;
pub mod site_config;
pub mod user;

use serde::{Deserialize, Deserializer};

// --- Auxiliares de desserialização para colunas anuláveis do backend ---

/// `null` (ou ausente) vira o valor por omissão do tipo.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Flags `published`/`show_in_menu` são verdadeiras por omissão.
pub(crate) fn null_as_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
}

pub(crate) fn default_true() -> bool {
    true
}

/// Checkbox HTML: só vem no formulário quando marcado.
pub fn checked(value: &Option<String>) -> bool {
    matches!(value.as_deref(), Some("on") | Some("true") | Some("1"))
}

/// Campo de texto opcional: vazio (ou só espaços) vira `None`.
pub fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Junta as mensagens de erro do `validator` numa única frase.
pub fn validation_message(errors: &validator::ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Campo inválido: {}", field))
            })
        })
        .collect();
    messages.sort();
    messages.join(" ")
}
