// src/models/culto.rs
use super::{checked, default_true, non_empty, null_as_default, null_as_true};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Linha da tabela `cultos`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Culto {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub teachings: Vec<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default = "default_true", deserialize_with = "null_as_true")]
    pub published: bool,
    #[serde(default)]
    pub preacher: Option<String>,
}

/// Dados enviados ao backend em insert/update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CultoInput {
    pub title: String,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub video_id: Option<String>,
    pub thumbnail_url: Option<String>,
    pub teachings: Option<Vec<String>>,
    pub year: Option<i32>,
    pub published: bool,
    pub preacher: Option<String>,
}

/// Formulário de criação/edição (admin).
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CultoForm {
    #[validate(length(min = 1, message = "Informe o título."))]
    pub title: String,
    #[validate(length(min = 1, message = "Informe a data."))]
    pub date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub summary: String,
    // URL completa do YouTube ou apenas o ID
    #[serde(default)]
    pub video_id: String,
    #[serde(default)]
    pub thumbnail_url: String,
    // Um ensinamento por linha
    #[serde(default)]
    pub teachings: String,
    #[serde(default)]
    pub preacher: String,
    #[serde(default)]
    pub published: Option<String>,
}

impl CultoForm {
    /// Pré-preenche o formulário de edição a partir de um registo.
    pub fn from_culto(culto: &Culto) -> Self {
        Self {
            title: culto.title.clone(),
            date: culto.date.format("%Y-%m-%d").to_string(),
            description: culto.description.clone().unwrap_or_default(),
            summary: culto.summary.clone().unwrap_or_default(),
            // Reconstrói a URL completa para edição
            video_id: culto
                .video_id
                .as_ref()
                .map(|id| format!("https://www.youtube.com/watch?v={}", id))
                .unwrap_or_default(),
            thumbnail_url: culto.thumbnail_url.clone().unwrap_or_default(),
            teachings: culto.teachings.join("\n"),
            preacher: culto.preacher.clone().unwrap_or_default(),
            published: culto.published.then(|| "on".to_string()),
        }
    }

    /// Formulário vazio para "Novo culto" (publicado por omissão).
    pub fn blank() -> Self {
        Self {
            published: Some("on".to_string()),
            ..Self::default()
        }
    }

    pub fn is_published(&self) -> bool {
        checked(&self.published)
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()
    }

    /// Normaliza os campos do formulário para o formato da tabela.
    /// `video_id` deve chegar já extraído da URL.
    pub fn to_input(&self, date: NaiveDate, video_id: Option<String>) -> CultoInput {
        let teachings: Vec<String> = self
            .teachings
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();

        CultoInput {
            title: self.title.trim().to_string(),
            date,
            description: non_empty(&self.description),
            summary: non_empty(&self.summary),
            video_id,
            thumbnail_url: non_empty(&self.thumbnail_url),
            teachings: if teachings.is_empty() { None } else { Some(teachings) },
            year: Some(date.year()),
            published: self.is_published(),
            preacher: non_empty(&self.preacher),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nullable_columns_are_normalised() {
        let culto: Culto = serde_json::from_value(json!({
            "id": "c1",
            "title": "Culto de Santa Ceia",
            "date": "2024-03-10",
            "description": null,
            "teachings": null,
            "published": null,
            "year": 2024
        }))
        .unwrap();
        assert!(culto.published);
        assert!(culto.teachings.is_empty());
        assert_eq!(culto.year, Some(2024));
        assert_eq!(culto.preacher, None);
    }

    #[test]
    fn form_splits_teachings_and_derives_year() {
        let form = CultoForm {
            title: " Culto de Domingo ".to_string(),
            date: "2025-02-24".to_string(),
            teachings: "Fé\n\n  Esperança \nAmor\n".to_string(),
            published: None,
            ..CultoForm::default()
        };
        let date = form.parsed_date().unwrap();
        let input = form.to_input(date, None);
        assert_eq!(input.title, "Culto de Domingo");
        assert_eq!(input.year, Some(2025));
        assert_eq!(
            input.teachings,
            Some(vec!["Fé".to_string(), "Esperança".to_string(), "Amor".to_string()])
        );
        assert!(!input.published);
        assert_eq!(input.description, None);
    }

    #[test]
    fn edit_form_rebuilds_youtube_url() {
        let culto = Culto {
            id: "c1".to_string(),
            title: "Culto".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
            description: None,
            summary: None,
            video_id: Some("dQw4w9WgXcQ".to_string()),
            thumbnail_url: None,
            teachings: vec!["Graça".to_string()],
            year: Some(2024),
            published: true,
            preacher: None,
        };
        let form = CultoForm::from_culto(&culto);
        assert_eq!(form.video_id, "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
        assert_eq!(form.date, "2024-01-07");
        assert!(form.is_published());
    }
}
