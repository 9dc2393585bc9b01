use serde::{Deserialize, Serialize};

pub const DEFAULT_BADGE_CLASS: &str = "badge-secondary";
pub const DEFAULT_BACKGROUND: &str = "#6b7280";

/// Swatches offered by the editor's colour picker.
pub const PALETTE: &[&str] = &[
    "#3b82f6", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6", "#ec4899", "#14b8a6", "#6b7280",
];

/// A stage record as persisted in `pipeline.stages`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub label: String,
    pub value: String,
    pub badge_class: String,
    pub background: String,
}

/// Raw, untrimmed field values of one editor row.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StageRow {
    pub label: String,
    pub value: String,
    pub badge_class: String,
    pub background: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageField {
    Label,
    Value,
    BadgeClass,
    Background,
}

impl StageField {
    pub const ALL: [StageField; 4] = [
        StageField::Label,
        StageField::Value,
        StageField::BadgeClass,
        StageField::Background,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StageField::Label => "label",
            StageField::Value => "value",
            StageField::BadgeClass => "badge class",
            StageField::Background => "background",
        }
    }
}

impl StageRow {
    pub fn blank() -> Self {
        Self {
            background: DEFAULT_BACKGROUND.to_string(),
            ..Self::default()
        }
    }

    /// Initial row values for a stage object read from a loaded document.
    pub fn from_json(stage: &serde_json::Value) -> Self {
        let text = |key: &str| {
            stage
                .get(key)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };
        let background = text("background");
        Self {
            label: text("label"),
            value: text("value"),
            badge_class: text("badgeClass"),
            background: if background.is_empty() {
                DEFAULT_BACKGROUND.to_string()
            } else {
                background
            },
        }
    }

    pub fn field(&self, field: StageField) -> &str {
        match field {
            StageField::Label => &self.label,
            StageField::Value => &self.value,
            StageField::BadgeClass => &self.badge_class,
            StageField::Background => &self.background,
        }
    }

    pub fn field_mut(&mut self, field: StageField) -> &mut String {
        match field {
            StageField::Label => &mut self.label,
            StageField::Value => &mut self.value,
            StageField::BadgeClass => &mut self.badge_class,
            StageField::Background => &mut self.background,
        }
    }

    /// The stage this row contributes, if its label and value survive trimming.
    pub fn to_stage(&self) -> Option<Stage> {
        let label = self.label.trim();
        let value = self.value.trim();
        if label.is_empty() || value.is_empty() {
            return None;
        }
        let badge_class = self.badge_class.trim();
        let background = self.background.trim();
        Some(Stage {
            label: label.to_string(),
            value: value.to_string(),
            badge_class: if badge_class.is_empty() {
                DEFAULT_BADGE_CLASS.to_string()
            } else {
                badge_class.to_string()
            },
            background: if background.is_empty() {
                DEFAULT_BACKGROUND.to_string()
            } else {
                background.to_string()
            },
        })
    }
}

/// Collects stages in display order, silently dropping incomplete rows.
pub fn collect(rows: &[StageRow]) -> Vec<Stage> {
    rows.iter().filter_map(StageRow::to_stage).collect()
}

/// Ordered editor rows. Position in the list is the persisted array order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StageRows {
    rows: Vec<StageRow>,
}

impl StageRows {
    pub fn new(rows: Vec<StageRow>) -> Self {
        Self { rows }
    }

    pub fn as_slice(&self) -> &[StageRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut StageRow> {
        self.rows.get_mut(idx)
    }

    /// Appends a blank row and returns its index.
    pub fn push_blank(&mut self) -> usize {
        self.rows.push(StageRow::blank());
        self.rows.len() - 1
    }

    pub fn remove(&mut self, idx: usize) -> Option<StageRow> {
        (idx < self.rows.len()).then(|| self.rows.remove(idx))
    }

    pub fn move_up(&mut self, idx: usize) -> bool {
        if idx == 0 || idx >= self.rows.len() {
            return false;
        }
        self.rows.swap(idx - 1, idx);
        true
    }

    pub fn move_down(&mut self, idx: usize) -> bool {
        if idx + 1 >= self.rows.len() {
            return false;
        }
        self.rows.swap(idx, idx + 1);
        true
    }

    pub fn collect(&self) -> Vec<Stage> {
        collect(&self.rows)
    }
}

#[cfg(test)]
#[path = "../tests/model/stage_tests.rs"]
mod tests;
