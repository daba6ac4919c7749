// src/web/upload.rs
//! Leitura de formulários multipart (campos de texto + ficheiros).

use crate::{
    error::{AppError, AppResult},
    models::photo::UploadedFile,
};
use axum::extract::Multipart;
use std::collections::HashMap;

/// Tamanho máximo do corpo nas rotas de envio.
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

#[derive(Debug, Default)]
pub struct UploadForm {
    pub fields: HashMap<String, String>,
    pub files: Vec<UploadedFile>,
}

impl UploadForm {
    pub fn field(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or_default()
    }
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Upload(e.body_text())
}

/// Campos com nome de ficheiro vão para `files`; os restantes são texto.
/// Inputs de ficheiro vazios (nada selecionado) são ignorados.
pub async fn read_upload_form(mut multipart: Multipart) -> AppResult<UploadForm> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                if file_name.is_empty() || bytes.is_empty() {
                    continue;
                }
                tracing::debug!("Ficheiro recebido: {} ({} bytes)", file_name, bytes.len());
                form.files.push(UploadedFile {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            None => {
                let value = field.text().await.map_err(multipart_error)?;
                form.fields.insert(name, value);
            }
        }
    }
    Ok(form)
}
