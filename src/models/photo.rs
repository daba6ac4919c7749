// src/models/photo.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Categorias fixas da galeria de aniversário.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoCategory {
    Sexta,
    Sabado,
    Domingo,
}

impl PhotoCategory {
    pub const ALL: [PhotoCategory; 3] = [
        PhotoCategory::Sexta,
        PhotoCategory::Sabado,
        PhotoCategory::Domingo,
    ];

    pub fn value(&self) -> &'static str {
        match self {
            PhotoCategory::Sexta => "sexta",
            PhotoCategory::Sabado => "sabado",
            PhotoCategory::Domingo => "domingo",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PhotoCategory::Sexta => "Culto de Sexta",
            PhotoCategory::Sabado => "Culto de Sábado",
            PhotoCategory::Domingo => "Companheirismo Domingo",
        }
    }
}

impl fmt::Display for PhotoCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

impl FromStr for PhotoCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sexta" => Ok(PhotoCategory::Sexta),
            "sabado" => Ok(PhotoCategory::Sabado),
            "domingo" => Ok(PhotoCategory::Domingo),
            other => Err(format!("Categoria desconhecida: {}", other)),
        }
    }
}

/// Linha da tabela `anniversary_photos`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnniversaryPhoto {
    pub id: String,
    pub category: PhotoCategory,
    pub photo_url: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub display_order: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhotoInput {
    pub category: PhotoCategory,
    pub photo_url: String,
    pub caption: Option<String>,
}

/// Ficheiro recebido num upload multipart.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Extensão do nome original (o que vem depois do último ponto).
    pub fn extension(&self) -> String {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or_else(|| "bin".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_through_its_value() {
        for cat in PhotoCategory::ALL {
            assert_eq!(cat.value().parse::<PhotoCategory>().unwrap(), cat);
        }
        assert!("quarta".parse::<PhotoCategory>().is_err());
    }

    #[test]
    fn category_deserialises_from_backend_string() {
        let cat: PhotoCategory = serde_json::from_str("\"sabado\"").unwrap();
        assert_eq!(cat, PhotoCategory::Sabado);
        assert_eq!(cat.label(), "Culto de Sábado");
    }

    #[test]
    fn extension_is_taken_from_file_name() {
        let file = UploadedFile {
            file_name: "Foto Culto.JPG".to_string(),
            content_type: "image/jpeg".to_string(),
            bytes: vec![],
        };
        assert_eq!(file.extension(), "jpg");
        let no_ext = UploadedFile { file_name: "foto".to_string(), ..file };
        assert_eq!(no_ext.extension(), "bin");
    }
}
