//! Form Controls
//!
//! Input types and the value/checkedness model of `input`, `select` and
//! `textarea` elements.

use crate::node::Selection;
use crate::{DomTree, NodeId};

/// HTML input types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputType {
    #[default]
    Text,
    Password,
    Email,
    Number,
    Tel,
    Url,
    Search,
    Date,
    Time,
    DatetimeLocal,
    Month,
    Week,
    Color,
    Range,
    File,
    Hidden,
    Checkbox,
    Radio,
    Submit,
    Reset,
    Button,
    Image,
}

impl InputType {
    /// Parse from the `type` attribute. Unknown values fall back to text,
    /// as browsers do.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "text" => Self::Text,
            "password" => Self::Password,
            "email" => Self::Email,
            "number" => Self::Number,
            "tel" => Self::Tel,
            "url" => Self::Url,
            "search" => Self::Search,
            "date" => Self::Date,
            "time" => Self::Time,
            "datetime-local" => Self::DatetimeLocal,
            "month" => Self::Month,
            "week" => Self::Week,
            "color" => Self::Color,
            "range" => Self::Range,
            "file" => Self::File,
            "hidden" => Self::Hidden,
            "checkbox" => Self::Checkbox,
            "radio" => Self::Radio,
            "submit" => Self::Submit,
            "reset" => Self::Reset,
            "button" => Self::Button,
            "image" => Self::Image,
            _ => Self::Text,
        }
    }

    /// Canonical `type` keyword
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Password => "password",
            Self::Email => "email",
            Self::Number => "number",
            Self::Tel => "tel",
            Self::Url => "url",
            Self::Search => "search",
            Self::Date => "date",
            Self::Time => "time",
            Self::DatetimeLocal => "datetime-local",
            Self::Month => "month",
            Self::Week => "week",
            Self::Color => "color",
            Self::Range => "range",
            Self::File => "file",
            Self::Hidden => "hidden",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Submit => "submit",
            Self::Reset => "reset",
            Self::Button => "button",
            Self::Image => "image",
        }
    }

    /// Checkbox or radio
    pub fn is_checkable(&self) -> bool {
        matches!(self, Self::Checkbox | Self::Radio)
    }
}

impl DomTree {
    /// Input type of an `<input>`, None for other elements
    pub fn input_type(&self, id: NodeId) -> Option<InputType> {
        if self.tag(id)? != "input" {
            return None;
        }
        Some(self.get_attribute(id, "type").map_or(InputType::Text, InputType::parse))
    }

    /// `name` attribute, empty when absent
    pub fn control_name(&self, id: NodeId) -> &str {
        self.get_attribute(id, "name").unwrap_or("")
    }

    /// Current value of a form control (the `value` IDL property)
    pub fn value(&self, id: NodeId) -> String {
        let Some(elem) = self.element(id) else {
            return String::new();
        };
        match elem.tag.as_str() {
            "input" => match self.input_type(id).unwrap_or_default() {
                InputType::Hidden => elem.get_attr("value").unwrap_or("").to_string(),
                t if t.is_checkable() => elem.get_attr("value").unwrap_or("on").to_string(),
                _ => elem.props.value.clone()
                    .unwrap_or_else(|| elem.get_attr("value").unwrap_or("").to_string()),
            },
            "textarea" => elem.props.value.clone().unwrap_or_else(|| self.text_content(id)),
            "select" => self.selected_option(id)
                .map(|opt| self.option_value(opt))
                .unwrap_or_default(),
            "option" => self.option_value(id),
            _ => elem.props.value.clone().unwrap_or_default(),
        }
    }

    /// Assign the `value` IDL property.
    ///
    /// Hidden inputs reflect the value into their `value` attribute, which
    /// notifies attribute observers. Selects pick the first option with a
    /// matching value, or clear the selection if none matches.
    pub fn set_value(&mut self, id: NodeId, value: &str) {
        let Some(tag) = self.tag(id).map(str::to_string) else {
            return;
        };
        match tag.as_str() {
            "input" if self.input_type(id) == Some(InputType::Hidden) => {
                self.set_attribute(id, "value", value);
            }
            "input" if self.input_type(id).is_some_and(|t| t.is_checkable()) => {
                self.set_attribute(id, "value", value);
            }
            "select" => {
                let selection = self.options(id)
                    .iter()
                    .position(|&opt| self.option_value(opt) == value)
                    .map_or(Selection::Cleared, Selection::Index);
                if let Some(elem) = self.element_mut(id) {
                    elem.props.selection = selection;
                }
            }
            _ => {
                if let Some(elem) = self.element_mut(id) {
                    elem.props.value = Some(value.to_string());
                }
            }
        }
    }

    /// Checkedness of a checkbox or radio
    pub fn checked(&self, id: NodeId) -> bool {
        self.element(id)
            .map(|e| e.props.checked.unwrap_or_else(|| e.get_attr("checked").is_some()))
            .unwrap_or(false)
    }

    /// Set checkedness without touching other radios of the group
    pub fn set_checked(&mut self, id: NodeId, checked: bool) {
        if let Some(elem) = self.element_mut(id) {
            elem.props.checked = Some(checked);
        }
    }

    /// Check a radio and uncheck the other connected radios of its group
    pub fn check_radio(&mut self, radio: NodeId) {
        let name = self.control_name(radio).to_string();
        if !name.is_empty() {
            let group: Vec<NodeId> = self
                .elements_by_tag(self.root(), "input")
                .into_iter()
                .filter(|&id| id != radio)
                .filter(|&id| self.input_type(id) == Some(InputType::Radio))
                .filter(|&id| self.control_name(id) == name)
                .collect();
            for other in group {
                self.set_checked(other, false);
            }
        }
        self.set_checked(radio, true);
    }

    /// `<option>` descendants of a select, in document order
    pub fn options(&self, select: NodeId) -> Vec<NodeId> {
        self.elements_by_tag(select, "option")
    }

    fn option_value(&self, option: NodeId) -> String {
        self.get_attribute(option, "value")
            .map(str::to_string)
            .unwrap_or_else(|| self.text_content(option).trim().to_string())
    }

    /// Currently selected option of a select
    pub fn selected_option(&self, select: NodeId) -> Option<NodeId> {
        let options = self.options(select);
        match self.element(select)?.props.selection {
            Selection::Index(i) => options.get(i).copied(),
            Selection::Cleared => None,
            Selection::Default => options
                .iter()
                .copied()
                .find(|&opt| self.has_attribute(opt, "selected"))
                .or_else(|| options.first().copied()),
        }
    }
}
