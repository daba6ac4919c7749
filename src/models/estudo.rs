// src/models/estudo.rs
use super::{checked, default_true, non_empty, null_as_true};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Linha da tabela `estudos`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estudo {
    pub id: String,
    pub title: String,
    pub author: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default = "default_true", deserialize_with = "null_as_true")]
    pub published: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstudoInput {
    pub title: String,
    pub author: String,
    pub date: NaiveDate,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub published: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct EstudoForm {
    #[validate(length(min = 1, message = "Informe o título."))]
    pub title: String,
    #[validate(length(min = 1, message = "Informe o autor."))]
    pub author: String,
    #[validate(length(min = 1, message = "Informe a data."))]
    pub date: String,
    #[serde(default)]
    pub excerpt: String,
    // Markdown ou HTML vindo do editor
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub published: Option<String>,
}

impl EstudoForm {
    pub fn from_estudo(estudo: &Estudo) -> Self {
        Self {
            title: estudo.title.clone(),
            author: estudo.author.clone(),
            date: estudo.date.format("%Y-%m-%d").to_string(),
            excerpt: estudo.excerpt.clone().unwrap_or_default(),
            content: estudo.content.clone().unwrap_or_default(),
            published: estudo.published.then(|| "on".to_string()),
        }
    }

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

    pub fn to_input(&self, date: NaiveDate) -> EstudoInput {
        EstudoInput {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            date,
            excerpt: non_empty(&self.excerpt),
            // O conteúdo não é aparado: espaços finais podem ser significativos em markdown
            content: if self.content.trim().is_empty() {
                None
            } else {
                Some(self.content.clone())
            },
            published: self.is_published(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn missing_author_fails_validation() {
        let form = EstudoForm {
            title: "Romanos 8".to_string(),
            date: "2024-05-01".to_string(),
            ..EstudoForm::blank()
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("author"));
    }

    #[test]
    fn content_keeps_markdown_line_breaks() {
        let form = EstudoForm {
            title: "Salmos".to_string(),
            author: "Pr. Silva".to_string(),
            date: "2024-05-01".to_string(),
            content: "# Salmo 23  \nO Senhor é o meu pastor".to_string(),
            ..EstudoForm::blank()
        };
        let input = form.to_input(form.parsed_date().unwrap());
        assert_eq!(input.content.as_deref(), Some("# Salmo 23  \nO Senhor é o meu pastor"));
        assert!(input.published);
    }
}
