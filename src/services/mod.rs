// src/services/mod.rs
pub mod auth_service;
pub mod config_service;
pub mod content;
pub mod culto_service;
pub mod editor;
pub mod estudo_service;
pub mod menu;
pub mod page_service;
pub mod photo_service;
pub mod schedule_service;

use crate::{
    error::{AppError, AppResult},
    models::validation_message,
};
use validator::Validate;

/// Valida um formulário, convertendo as falhas numa única mensagem para o utilizador.
pub(crate) fn validate_form<T: Validate>(form: &T) -> AppResult<()> {
    form.validate().map_err(|errors| {
        let message = validation_message(&errors);
        tracing::warn!("Formulário inválido: {}", message);
        AppError::Validation(message)
    })
}
