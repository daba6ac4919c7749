// src/models/page.rs
use super::{checked, default_true, non_empty, null_as_default, null_as_true};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Linha da tabela `pages` (páginas dinâmicas).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub hero_title: Option<String>,
    #[serde(default)]
    pub hero_subtitle: Option<String>,
    #[serde(default)]
    pub section_title: Option<String>,
    #[serde(default)]
    pub section_subtitle: Option<String>,
    // Agrupa a página num dropdown do menu
    #[serde(default)]
    pub parent_menu: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub menu_order: i64,
    #[serde(default = "default_true", deserialize_with = "null_as_true")]
    pub show_in_menu: bool,
    #[serde(default = "default_true", deserialize_with = "null_as_true")]
    pub published: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Page {
    /// Rótulo do grupo de menu; string vazia conta como "sem grupo".
    pub fn menu_group(&self) -> Option<&str> {
        self.parent_menu
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn path(&self) -> String {
        format!("/pagina/{}", self.slug)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageInput {
    pub title: String,
    pub slug: String,
    pub content: Option<String>,
    pub hero_title: Option<String>,
    pub hero_subtitle: Option<String>,
    pub section_title: Option<String>,
    pub section_subtitle: Option<String>,
    pub parent_menu: Option<String>,
    pub menu_order: i64,
    pub show_in_menu: bool,
    pub published: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PageForm {
    #[validate(length(min = 1, message = "Informe o título."))]
    pub title: String,
    // Em branco: gerado a partir do título
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub hero_title: String,
    #[serde(default)]
    pub hero_subtitle: String,
    #[serde(default)]
    pub section_title: String,
    #[serde(default)]
    pub section_subtitle: String,
    #[serde(default)]
    pub parent_menu: String,
    #[serde(default)]
    pub menu_order: String,
    #[serde(default)]
    pub show_in_menu: Option<String>,
    #[serde(default)]
    pub published: Option<String>,
}

impl PageForm {
    pub fn from_page(page: &Page) -> Self {
        let flag = |b: bool| b.then(|| "on".to_string());
        Self {
            title: page.title.clone(),
            slug: page.slug.clone(),
            content: page.content.clone().unwrap_or_default(),
            hero_title: page.hero_title.clone().unwrap_or_default(),
            hero_subtitle: page.hero_subtitle.clone().unwrap_or_default(),
            section_title: page.section_title.clone().unwrap_or_default(),
            section_subtitle: page.section_subtitle.clone().unwrap_or_default(),
            parent_menu: page.parent_menu.clone().unwrap_or_default(),
            menu_order: page.menu_order.to_string(),
            show_in_menu: flag(page.show_in_menu),
            published: flag(page.published),
        }
    }

    pub fn blank() -> Self {
        Self {
            menu_order: "0".to_string(),
            show_in_menu: Some("on".to_string()),
            published: Some("on".to_string()),
            ..Self::default()
        }
    }

    pub fn shows_in_menu(&self) -> bool {
        checked(&self.show_in_menu)
    }

    pub fn is_published(&self) -> bool {
        checked(&self.published)
    }

    /// `slug` já normalizado pelo serviço.
    pub fn to_input(&self, slug: String) -> PageInput {
        PageInput {
            title: self.title.trim().to_string(),
            slug,
            content: if self.content.trim().is_empty() {
                None
            } else {
                Some(self.content.clone())
            },
            hero_title: non_empty(&self.hero_title),
            hero_subtitle: non_empty(&self.hero_subtitle),
            section_title: non_empty(&self.section_title),
            section_subtitle: non_empty(&self.section_subtitle),
            parent_menu: non_empty(&self.parent_menu),
            menu_order: self.menu_order.trim().parse().unwrap_or(0),
            show_in_menu: self.shows_in_menu(),
            published: self.is_published(),
        }
    }
}
