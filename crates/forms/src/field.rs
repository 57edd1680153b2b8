//! Form fields and the UI collaborator contract.

use std::{collections::BTreeMap, fmt, str::FromStr};

use {
    formstash_common::{is_usable, usable},
    serde::{Deserialize, Serialize},
};

// ── NamedValueSet ───────────────────────────────────────────────────────────

/// Field name to value, as read from or written back to a form.
///
/// A field whose value is missing shows up with an empty string; the guard
/// treats both the same, so such entries never reach storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamedValueSet(BTreeMap<String, String>);

impl NamedValueSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for NamedValueSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for NamedValueSet {
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;
    type Item = (String, String);

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// ── Field kinds ─────────────────────────────────────────────────────────────

/// HTML input kinds a form can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    Text,
    Password,
    File,
    Hidden,
    Checkbox,
    Radio,
    Textarea,
    Email,
    Url,
    Number,
    Range,
    Date,
    Month,
    Week,
    Time,
    Datetime,
    DatetimeLocal,
    Search,
    Color,
    Select,
    Submit,
    Button,
    Reset,
    Image,
}

impl FieldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Password => "password",
            Self::File => "file",
            Self::Hidden => "hidden",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Textarea => "textarea",
            Self::Email => "email",
            Self::Url => "url",
            Self::Number => "number",
            Self::Range => "range",
            Self::Date => "date",
            Self::Month => "month",
            Self::Week => "week",
            Self::Time => "time",
            Self::Datetime => "datetime",
            Self::DatetimeLocal => "datetime-local",
            Self::Search => "search",
            Self::Color => "color",
            Self::Select => "select",
            Self::Submit => "submit",
            Self::Button => "button",
            Self::Reset => "reset",
            Self::Image => "image",
        }
    }

    /// Checkbox and radio inputs only carry a value when checked.
    pub fn is_checkable(self) -> bool {
        matches!(self, Self::Checkbox | Self::Radio)
    }

    /// Whether values of this kind are ever persisted. Buttons carry no user
    /// input and select lists are not part of the persisted set.
    pub fn is_persistable(self) -> bool {
        !matches!(
            self,
            Self::Select | Self::Submit | Self::Button | Self::Reset | Self::Image
        )
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKind {
    type Err = crate::error::Error;

    /// Parses an HTML `type` attribute. Like browsers, a missing or unknown
    /// type is a text input.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.to_ascii_lowercase().as_str() {
            "password" => Self::Password,
            "file" => Self::File,
            "hidden" => Self::Hidden,
            "checkbox" => Self::Checkbox,
            "radio" => Self::Radio,
            "textarea" => Self::Textarea,
            "email" => Self::Email,
            "url" => Self::Url,
            "number" => Self::Number,
            "range" => Self::Range,
            "date" => Self::Date,
            "month" => Self::Month,
            "week" => Self::Week,
            "time" => Self::Time,
            "datetime" => Self::Datetime,
            "datetime-local" => Self::DatetimeLocal,
            "search" => Self::Search,
            "color" => Self::Color,
            "select" => Self::Select,
            "submit" => Self::Submit,
            "button" => Self::Button,
            "reset" => Self::Reset,
            "image" => Self::Image,
            _ => Self::Text,
        };
        Ok(kind)
    }
}

// ── Field ───────────────────────────────────────────────────────────────────

/// One input of a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: Option<String>,
    pub kind: FieldKind,
    pub value: Option<String>,
    #[serde(default)]
    pub checked: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, kind: FieldKind, value: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            kind,
            value: Some(value.into()),
            checked: false,
        }
    }

    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text, value)
    }

    /// A checkbox or radio input with a fixed value.
    pub fn choice(
        name: impl Into<String>,
        kind: FieldKind,
        value: impl Into<String>,
        checked: bool,
    ) -> Self {
        Self {
            checked,
            ..Self::new(name, kind, value)
        }
    }

    /// Whether this field contributes to the persisted set right now.
    pub fn is_persistable(&self) -> bool {
        self.kind.is_persistable()
            && (!self.kind.is_checkable() || self.checked)
            && is_usable(self.name.as_deref())
    }
}

// ── FormScope ───────────────────────────────────────────────────────────────

/// The UI collaborator: one form whose values are persisted.
pub trait FormScope {
    /// Identifier of the form, used to scope records inside an app id.
    fn form_id(&self) -> &str;

    /// Current name/value pairs of every persistable field.
    fn list_persistable_fields(&self) -> NamedValueSet;

    fn has_field(&self, name: &str) -> bool;

    /// Put `value` into the field called `name`.
    fn set_value(&mut self, name: &str, value: &str);

    /// Push restored values onto matching fields. Unknown names and unusable
    /// values are skipped. Returns how many fields were set.
    fn populate(&mut self, values: &NamedValueSet) -> usize {
        let mut applied = 0;
        for (name, value) in values.iter() {
            if self.has_field(name) && is_usable(Some(value)) {
                self.set_value(name, value);
                applied += 1;
            }
        }
        applied
    }
}

/// A form held in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryForm {
    id: String,
    fields: Vec<Field>,
}

impl MemoryForm {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Value of the first field called `name`; for checkable groups, the
    /// checked member's value.
    pub fn value(&self, name: &str) -> Option<&str> {
        let mut matching = self
            .fields
            .iter()
            .filter(|f| f.name.as_deref() == Some(name));
        let first = matching.clone().next()?;
        if first.kind.is_checkable() {
            return matching.find(|f| f.checked)?.value.as_deref();
        }
        first.value.as_deref()
    }
}

impl FormScope for MemoryForm {
    fn form_id(&self) -> &str {
        &self.id
    }

    fn list_persistable_fields(&self) -> NamedValueSet {
        self.fields
            .iter()
            .filter(|f| f.is_persistable())
            .filter_map(|f| {
                let name = usable(f.name.as_deref())?;
                Some((name, f.value.as_deref().unwrap_or_default()))
            })
            .collect()
    }

    fn has_field(&self, name: &str) -> bool {
        self.fields
            .iter()
            .any(|f| f.kind.is_persistable() && f.name.as_deref() == Some(name))
    }

    /// Text-like fields take the value; checkbox and radio members become
    /// checked when their own value matches.
    fn set_value(&mut self, name: &str, value: &str) {
        for field in self
            .fields
            .iter_mut()
            .filter(|f| f.kind.is_persistable() && f.name.as_deref() == Some(name))
        {
            if field.kind.is_checkable() {
                field.checked = field.value.as_deref() == Some(value);
            } else {
                field.value = Some(value.to_string());
            }
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    fn signup() -> MemoryForm {
        MemoryForm::new("signup")
            .with_field(Field::text("name", "Ada"))
            .with_field(Field::new("email", FieldKind::Email, "ada@example.com"))
            .with_field(Field::new("password", FieldKind::Password, "pw"))
            .with_field(Field::new("note", FieldKind::Textarea, ""))
            .with_field(Field::choice("plan", FieldKind::Radio, "free", false))
            .with_field(Field::choice("plan", FieldKind::Radio, "pro", true))
            .with_field(Field::choice("news", FieldKind::Checkbox, "yes", false))
            .with_field(Field::new("go", FieldKind::Submit, "Sign up"))
            .with_field(Field {
                name: Some("nick".into()),
                kind: FieldKind::Text,
                value: None,
                checked: false,
            })
            .with_field(Field {
                name: None,
                kind: FieldKind::Text,
                value: Some("orphan".into()),
                checked: false,
            })
    }

    #[rstest]
    #[case("text", FieldKind::Text)]
    #[case("EMAIL", FieldKind::Email)]
    #[case("datetime-local", FieldKind::DatetimeLocal)]
    #[case("color", FieldKind::Color)]
    #[case("tel", FieldKind::Text)]
    #[case("", FieldKind::Text)]
    fn parses_type_attribute(#[case] attr: &str, #[case] expected: FieldKind) {
        assert_eq!(attr.parse::<FieldKind>().unwrap(), expected);
    }

    #[test]
    fn lists_only_persistable_fields() {
        let values = signup().list_persistable_fields();
        let names: Vec<&str> = values.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["email", "name", "nick", "note", "password", "plan"]);
        assert_eq!(values.get("plan"), Some("pro"));
        assert_eq!(values.get("note"), Some(""));
        assert_eq!(values.get("nick"), Some(""));
    }

    #[test]
    fn populate_skips_unknown_and_empty() {
        let mut form = signup();
        let restored: NamedValueSet = [
            ("name", "Grace"),
            ("ghost", "boo"),
            ("email", ""),
            ("go", "clicked"),
        ]
        .into_iter()
        .collect();
        assert_eq!(form.populate(&restored), 1);
        assert_eq!(form.value("name"), Some("Grace"));
        assert_eq!(form.value("email"), Some("ada@example.com"));
        assert_eq!(form.value("go"), Some("Sign up"));
    }

    #[test]
    fn restoring_a_radio_checks_the_matching_member() {
        let mut form = signup();
        form.set_value("plan", "free");
        assert_eq!(form.value("plan"), Some("free"));
        assert_eq!(form.list_persistable_fields().get("plan"), Some("free"));
    }

    #[test]
    fn unchecked_checkbox_has_no_value() {
        assert_eq!(signup().value("news"), None);
        let mut form = signup();
        form.set_value("news", "yes");
        assert_eq!(form.value("news"), Some("yes"));
    }

    #[test]
    fn kind_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&FieldKind::DatetimeLocal).unwrap(),
            "\"datetime-local\""
        );
    }
}
