//! Dynamic questions configured server-side per admission context.
//!
//! A [`FieldSet`] is built from the remote descriptors of one tab, renders the
//! initial values of a form from the stored answers and binds a submission back
//! into the answer mapping the remote service expects.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::forms::{normalize, prefixed, FormErrors, INVALID_CHOICE_MESSAGE, REQUIRED_MESSAGE};

/// Global message when a mandatory document request is left unanswered.
pub const REQUIRED_DOCUMENTS_MESSAGE: &str = "Please upload all the requested documents.";

pub const DEFAULT_MAX_DOCUMENTS: usize = 1;

/// Answers keyed by question name.
pub type Answers = IndexMap<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Text,
    Textarea,
    Checkbox,
    Radio,
    Document,
    /// Read-only message, never answered.
    Message,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionChoice {
    pub key: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub help_text: String,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub tab: String,
    #[serde(default)]
    pub values: Vec<QuestionChoice>,
    #[serde(default)]
    pub max_documents: Option<usize>,
    #[serde(default)]
    pub mime_types: Vec<String>,
}

impl QuestionDescriptor {
    pub fn is_read_only(&self) -> bool {
        self.kind == QuestionType::Message
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Submitted values and errors are nested per tab.
    pub group_fields_by_tab: bool,
    /// Document fields are required whatever their descriptor says.
    pub required_documents_on_form_submit: bool,
}

/// Native kind of a rendered field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum FieldKind {
    SingleLineText { placeholder: Option<String> },
    MultiLineText { placeholder: Option<String> },
    MultiSelect { choices: Vec<QuestionChoice> },
    SingleSelect { choices: Vec<QuestionChoice> },
    FileReference { max_files: usize, mime_types: Vec<String> },
    Message { text: String },
}

impl FieldKind {
    fn is_list(&self) -> bool {
        matches!(self, Self::MultiSelect { .. } | Self::FileReference { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Field {
    pub name: String,
    pub tab: String,
    pub label: String,
    pub help_text: String,
    pub required: bool,
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl Field {
    fn from_descriptor(descriptor: &QuestionDescriptor, options: RenderOptions) -> Self {
        let kind = match descriptor.kind {
            QuestionType::Text => FieldKind::SingleLineText {
                placeholder: descriptor.placeholder.clone(),
            },
            QuestionType::Textarea => FieldKind::MultiLineText {
                placeholder: descriptor.placeholder.clone(),
            },
            QuestionType::Checkbox => FieldKind::MultiSelect {
                choices: descriptor.values.clone(),
            },
            QuestionType::Radio => FieldKind::SingleSelect {
                choices: descriptor.values.clone(),
            },
            QuestionType::Document => FieldKind::FileReference {
                max_files: descriptor.max_documents.unwrap_or(DEFAULT_MAX_DOCUMENTS),
                mime_types: descriptor.mime_types.clone(),
            },
            QuestionType::Message => FieldKind::Message {
                text: descriptor.help_text.clone(),
            },
        };
        let promoted =
            options.required_documents_on_form_submit && descriptor.kind == QuestionType::Document;
        Self {
            name: descriptor.name.clone(),
            tab: descriptor.tab.clone(),
            label: descriptor.label.clone(),
            help_text: descriptor.help_text.clone(),
            required: !descriptor.is_read_only() && (descriptor.required || promoted),
            kind,
        }
    }

    fn is_read_only(&self) -> bool {
        matches!(self.kind, FieldKind::Message { .. })
    }

    fn is_document(&self) -> bool {
        matches!(self.kind, FieldKind::FileReference { .. })
    }

    /// Coerce a submitted value into the answer shape of this field.
    fn coerce(&self, value: Option<&Value>) -> Value {
        let value = value.map(normalize).unwrap_or(Value::Null);
        if self.kind.is_list() {
            match value {
                Value::Array(items) => Value::Array(items),
                Value::Null => Value::Array(Vec::new()),
                single => Value::Array(vec![single]),
            }
        } else {
            value
        }
    }

    fn validate(&self, value: &Value) -> Vec<String> {
        if is_empty_answer(value) {
            return if self.required {
                vec![REQUIRED_MESSAGE.to_string()]
            } else {
                Vec::new()
            };
        }
        match &self.kind {
            FieldKind::SingleLineText { .. } | FieldKind::MultiLineText { .. } => {
                if value.is_string() {
                    Vec::new()
                } else {
                    vec!["Enter a valid value.".to_string()]
                }
            }
            FieldKind::SingleSelect { choices } => {
                let known = value
                    .as_str()
                    .is_some_and(|key| choices.iter().any(|choice| choice.key == key));
                if known {
                    Vec::new()
                } else {
                    vec![INVALID_CHOICE_MESSAGE.to_string()]
                }
            }
            FieldKind::MultiSelect { choices } => {
                let all_known = as_items(value).all(|item| {
                    item.as_str()
                        .is_some_and(|key| choices.iter().any(|choice| choice.key == key))
                });
                if all_known {
                    Vec::new()
                } else {
                    vec![INVALID_CHOICE_MESSAGE.to_string()]
                }
            }
            FieldKind::FileReference { max_files, .. } => {
                let mut messages = Vec::new();
                if as_items(value).any(|token| !token.is_string()) {
                    messages.push("Enter a valid document reference.".to_string());
                }
                if as_items(value).count() > *max_files {
                    messages.push(format!("Ensure this field has at most {max_files} files."));
                }
                messages
            }
            FieldKind::Message { .. } => Vec::new(),
        }
    }
}

fn as_items(value: &Value) -> impl Iterator<Item = &Value> {
    value.as_array().into_iter().flatten()
}

fn is_empty_answer(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Runtime form built from question descriptors.
#[derive(Debug, Clone, Serialize)]
pub struct FieldSet {
    pub fields: Vec<Field>,
    #[serde(skip)]
    options: RenderOptions,
}

impl FieldSet {
    pub fn build(configurations: &[QuestionDescriptor], options: RenderOptions) -> Self {
        let fields = configurations
            .iter()
            .map(|descriptor| Field::from_descriptor(descriptor, options))
            .collect();
        Self { fields, options }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Name under which errors of a field are reported.
    pub fn error_key(&self, field: &Field) -> String {
        if self.options.group_fields_by_tab {
            prefixed(&field.tab, &field.name)
        } else {
            field.name.clone()
        }
    }

    fn submitted_value<'a>(&self, submitted: &'a Value, field: &Field) -> Option<&'a Value> {
        if self.options.group_fields_by_tab {
            submitted.get(&field.tab).and_then(|group| group.get(&field.name))
        } else {
            submitted.get(&field.name)
        }
    }

    /// Form values from the stored answers, in the submitted shape.
    pub fn initial_values(&self, answers: &Answers) -> Value {
        let mut root = Map::new();
        for field in self.fields.iter().filter(|field| !field.is_read_only()) {
            let value = field.coerce(answers.get(&field.name));
            if self.options.group_fields_by_tab {
                let group = root
                    .entry(field.tab.clone())
                    .or_insert_with(|| Value::Object(Map::new()));
                if let Value::Object(group) = group {
                    group.insert(field.name.clone(), value);
                }
            } else {
                root.insert(field.name.clone(), value);
            }
        }
        Value::Object(root)
    }

    /// Bind submitted values into answers, one entry per answerable field.
    pub fn bind(&self, submitted: &Value) -> Result<Answers, FormErrors> {
        let mut errors = FormErrors::new();
        let mut answers = Answers::new();
        let mut missing_document = false;

        for field in self.fields.iter().filter(|field| !field.is_read_only()) {
            let value = field.coerce(self.submitted_value(submitted, field));
            let messages = field.validate(&value);
            if field.is_document()
                && self.options.required_documents_on_form_submit
                && is_empty_answer(&value)
            {
                missing_document = true;
            }
            let key = self.error_key(field);
            for message in messages {
                errors.add(key.clone(), message);
            }
            answers.insert(field.name.clone(), value);
        }

        if missing_document {
            errors.add_non_field(REQUIRED_DOCUMENTS_MESSAGE);
        }
        errors.into_result().map(|()| answers)
    }
}

/// Keep the stored answers of other tabs next to the freshly bound ones.
pub fn merge_initial(mut answers: Answers, initial: &Answers) -> Answers {
    for (name, value) in initial {
        answers.entry(name.clone()).or_insert_with(|| value.clone());
    }
    answers
}

/// Parse the stored answers of an admission.
pub fn answers_from_value(value: &Value) -> Answers {
    value
        .as_object()
        .map(|answers| answers.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default()
}

/// Required questions left unanswered.
pub fn missing_required<'a>(
    configurations: &'a [QuestionDescriptor],
    answers: &Answers,
) -> Vec<&'a QuestionDescriptor> {
    configurations
        .iter()
        .filter(|descriptor| descriptor.required && !descriptor.is_read_only())
        .filter(|descriptor| {
            answers
                .get(&descriptor.name)
                .map_or(true, |value| is_empty_answer(&normalize(value)))
        })
        .collect()
}

/// Parse remote descriptors, skipping entries this portal cannot render.
pub fn descriptors_from_value(value: &Value) -> Vec<QuestionDescriptor> {
    value
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|item| serde_json::from_value(item.clone()).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn descriptor(name: &str, kind: QuestionType, required: bool) -> QuestionDescriptor {
        QuestionDescriptor {
            name: name.into(),
            kind,
            label: name.to_uppercase(),
            help_text: String::new(),
            placeholder: None,
            required,
            tab: "specific-questions".into(),
            values: Vec::new(),
            max_documents: None,
            mime_types: Vec::new(),
        }
    }

    fn mixed_configuration() -> Vec<QuestionDescriptor> {
        let mut checkbox = descriptor("hobbies", QuestionType::Checkbox, false);
        checkbox.values = vec![
            QuestionChoice { key: "chess".into(), label: "Chess".into() },
            QuestionChoice { key: "rowing".into(), label: "Rowing".into() },
        ];
        vec![
            descriptor("motivation", QuestionType::Text, true),
            checkbox,
            descriptor("transcript", QuestionType::Document, false),
        ]
    }

    #[test]
    fn field_kinds_follow_descriptor_type() {
        let mut config = mixed_configuration();
        config.push(descriptor("notice", QuestionType::Message, true));
        let set = FieldSet::build(&config, RenderOptions::default());
        assert_eq!(set.fields[0].kind, FieldKind::SingleLineText { placeholder: None });
        assert!(matches!(set.fields[1].kind, FieldKind::MultiSelect { .. }));
        assert_eq!(
            set.fields[2].kind,
            FieldKind::FileReference { max_files: 1, mime_types: Vec::new() }
        );
        assert!(!set.fields[3].required);
    }

    #[test]
    fn round_trip_reproduces_values() {
        let set = FieldSet::build(&mixed_configuration(), RenderOptions::default());
        let submitted = json!({
            "motivation": "Curiosity",
            "hobbies": ["rowing", "chess"],
            "transcript": ["0b6f3c5e-token"],
        });
        let answers = set.bind(&submitted).unwrap();
        let rendered = set.initial_values(&answers);
        assert_eq!(rendered, submitted);
        assert_eq!(set.bind(&rendered).unwrap(), answers);
    }

    #[test]
    fn required_field_missing() {
        let set = FieldSet::build(&mixed_configuration(), RenderOptions::default());
        let errors = set.bind(&json!({ "motivation": "  " })).unwrap_err();
        assert_eq!(errors.field("motivation"), [REQUIRED_MESSAGE]);
        assert!(errors.non_field().is_empty());
    }

    #[test]
    fn document_promotion_reports_global_message() {
        let options = RenderOptions {
            group_fields_by_tab: false,
            required_documents_on_form_submit: true,
        };
        let set = FieldSet::build(&[descriptor("id_copy", QuestionType::Document, false)], options);
        let errors = set.bind(&json!({ "id_copy": [] })).unwrap_err();
        assert_eq!(errors.non_field(), [REQUIRED_DOCUMENTS_MESSAGE]);
    }

    #[test]
    fn grouped_fields_nest_by_tab() {
        let options = RenderOptions {
            group_fields_by_tab: true,
            required_documents_on_form_submit: false,
        };
        let set = FieldSet::build(&mixed_configuration(), options);
        let errors = set
            .bind(&json!({ "specific-questions": { "hobbies": ["golf"] } }))
            .unwrap_err();
        assert!(errors.has("specific-questions-motivation"));
        assert_eq!(errors.field("specific-questions-hobbies"), [INVALID_CHOICE_MESSAGE]);
    }

    #[test]
    fn too_many_documents() {
        let set = FieldSet::build(&mixed_configuration(), RenderOptions::default());
        let errors = set
            .bind(&json!({ "motivation": "x", "transcript": ["a", "b"] }))
            .unwrap_err();
        assert_eq!(errors.field("transcript"), ["Ensure this field has at most 1 files."]);
    }

    #[test]
    fn merge_keeps_other_tabs() {
        let initial = answers_from_value(&json!({ "motivation": "old", "other_tab": "kept" }));
        let answers = answers_from_value(&json!({ "motivation": "new" }));
        let merged = merge_initial(answers, &initial);
        assert_eq!(merged["motivation"], "new");
        assert_eq!(merged["other_tab"], "kept");
    }

    #[test]
    fn missing_required_questions() {
        let config = mixed_configuration();
        let missing = missing_required(&config, &answers_from_value(&json!({ "hobbies": [] })));
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].name, "motivation");
        assert!(missing_required(&config, &answers_from_value(&json!({ "motivation": "x" }))).is_empty());
    }

    #[test]
    fn unknown_descriptor_types_are_skipped() {
        let descriptors = descriptors_from_value(&json!([
            { "name": "a", "type": "text" },
            { "name": "b", "type": "hologram" },
        ]));
        assert_eq!(descriptors.len(), 1);
    }
}
