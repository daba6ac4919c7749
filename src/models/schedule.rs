// src/models/schedule.rs
use super::{checked, null_as_default};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Linha da tabela `schedule` (agenda semanal).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleItem {
    pub id: String,
    pub day: String,
    pub time: String,
    pub event: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_highlight: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub order_index: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleInput {
    pub day: String,
    pub time: String,
    pub event: String,
    pub is_highlight: bool,
    // Só preenchido na criação; atualizações não mexem na ordem
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_index: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ScheduleForm {
    #[validate(length(min = 1, message = "Informe o dia."))]
    pub day: String,
    #[validate(length(min = 1, message = "Informe o horário."))]
    pub time: String,
    #[validate(length(min = 1, message = "Informe o evento."))]
    pub event: String,
    #[serde(default)]
    pub is_highlight: Option<String>,
}

impl ScheduleForm {
    pub fn from_item(item: &ScheduleItem) -> Self {
        Self {
            day: item.day.clone(),
            time: item.time.clone(),
            event: item.event.clone(),
            is_highlight: item.is_highlight.then(|| "on".to_string()),
        }
    }

    pub fn is_highlight(&self) -> bool {
        checked(&self.is_highlight)
    }

    pub fn to_input(&self) -> ScheduleInput {
        ScheduleInput {
            day: self.day.trim().to_string(),
            time: self.time.trim().to_string(),
            event: self.event.trim().to_string(),
            is_highlight: self.is_highlight(),
            order_index: None,
        }
    }
}
