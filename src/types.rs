use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Chip {
    pub label: String,
    #[serde(default)]
    pub color_class: String,
}

impl Chip {
    pub fn new(label: impl Into<String>, color_class: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            color_class: color_class.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub chips: Vec<Chip>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<bool>,
}

impl Card {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlight.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<String>,
    #[serde(default)]
    pub cards: Vec<Card>,
}

impl Column {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_cards(mut self, cards: Vec<Card>) -> Self {
        self.cards = cards;
        self
    }

    pub fn card_ids(&self) -> Vec<&str> {
        self.cards.iter().map(|card| card.id.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_deserializes_camel_case_fields() {
        let card: Card = serde_json::from_str(
            r#"{
                "id": "c1",
                "title": "System design mock",
                "ownerLabel": "Mentor",
                "dueDate": "2026-10-20",
                "chips": [{"label": "Backend", "colorClass": "bg-blue-100"}],
                "progress": 40
            }"#,
        )
        .expect("card should parse");

        assert_eq!(card.owner_label.as_deref(), Some("Mentor"));
        assert_eq!(card.due_date.as_deref(), Some("2026-10-20"));
        assert_eq!(card.chips[0].color_class, "bg-blue-100");
        assert_eq!(card.progress, Some(40));
        assert!(card.description.is_none());
    }

    #[test]
    fn test_absent_optionals_are_not_serialized() {
        let card = Card::new("c1", "Behavioral stories");
        let value = serde_json::to_value(&card).expect("card should serialize");
        let object = value.as_object().expect("card should be an object");

        assert!(!object.contains_key("owner"));
        assert!(!object.contains_key("description"));
        assert_eq!(object.get("chips"), Some(&serde_json::json!([])));
    }

    #[test]
    fn test_column_without_cards_defaults_to_empty() {
        let column: Column =
            serde_json::from_str(r#"{"id": "done", "title": "Concluído", "accentColor": "green"}"#)
                .expect("column should parse");
        assert!(column.cards.is_empty());
        assert_eq!(column.accent_color.as_deref(), Some("green"));
    }

    #[test]
    fn test_card_ids_preserve_order() {
        let column = Column::new("todo", "Para estudar").with_cards(vec![
            Card::new("b", "B"),
            Card::new("a", "A"),
        ]);
        assert_eq!(column.card_ids(), vec!["b", "a"]);
    }
}
