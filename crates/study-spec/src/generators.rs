//! Builders for recurring survey pieces: localized strings, titles, help texts and page breaks.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::editor::{ComponentEditor, NewComponentProps, TITLE_ROLE};
use crate::error::EditorError;
use crate::expr::Expression;
use crate::key_path::child_key;
use crate::spec::{ItemComponent, LocalizedString, StyleEntry, SurveyItem, SurveySingleItem};

/// Text per language code.
pub type Translations = BTreeMap<String, String>;

/// Collects `(language, text)` pairs into [`Translations`].
pub fn translations<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Translations
where
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(code, text)| (code.into(), text.into()))
        .collect()
}

/// One localized string per entry, each with a single text part.
pub fn generate_loc_strings<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Vec<LocalizedString>
where
    K: Into<String>,
    V: Into<String>,
{
    entries
        .into_iter()
        .map(|(code, text)| LocalizedString::text(code, text))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct StyledText {
    pub content: Translations,
    pub class_name: Option<String>,
}

/// Date computed by `date`, rendered with `date_format` in each language.
#[derive(Debug, Clone, PartialEq)]
pub struct DateDisplay {
    pub date: Expression,
    pub date_format: String,
    pub language_codes: Vec<String>,
    pub class_name: Option<String>,
}

/// Result of `expression`, rendered as text in each language.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionDisplay {
    pub expression: Expression,
    pub language_codes: Vec<String>,
    pub class_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TitlePart {
    Text(StyledText),
    Date(DateDisplay),
    Expression(ExpressionDisplay),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TitleContent {
    Text(Translations),
    Parts(Vec<TitlePart>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HelpItem {
    pub content: Translations,
    pub style: Option<Vec<StyleEntry>>,
}

fn expression_parts(expression: &Expression, language_codes: &[String]) -> Vec<LocalizedString> {
    language_codes
        .iter()
        .map(|code| LocalizedString::expression(code.as_str(), expression.clone()))
        .collect()
}

fn class_style(class_name: Option<&str>) -> Option<Vec<StyleEntry>> {
    class_name.map(|class_name| vec![StyleEntry::class_name(class_name)])
}

pub fn generate_date_display_comp(key: &str, display: &DateDisplay) -> ItemComponent {
    let mut style = vec![StyleEntry::new("dateFormat", display.date_format.as_str())];
    style.extend(class_style(display.class_name.as_deref()).unwrap_or_default());
    ItemComponent {
        key: Some(key.to_string()),
        content: Some(expression_parts(&display.date, &display.language_codes)),
        style: Some(style),
        ..ItemComponent::new("dateDisplay")
    }
}

pub fn generate_expression_display_comp(key: &str, display: &ExpressionDisplay) -> ItemComponent {
    ItemComponent {
        key: Some(key.to_string()),
        content: Some(expression_parts(&display.expression, &display.language_codes)),
        style: class_style(display.class_name.as_deref()),
        ..ItemComponent::new("text")
    }
}

/// Title component: plain localized text, or a list of parts keyed by their position.
pub fn generate_title_component(
    content: TitleContent,
    description: Option<Translations>,
    class_name: Option<&str>,
) -> ItemComponent {
    let (text, items) = match content {
        TitleContent::Text(text) => (Some(generate_loc_strings(text)), None),
        TitleContent::Parts(parts) => {
            let items = parts
                .iter()
                .enumerate()
                .map(|(index, part)| {
                    let key = index.to_string();
                    match part {
                        TitlePart::Date(display) => generate_date_display_comp(&key, display),
                        TitlePart::Expression(display) => {
                            generate_expression_display_comp(&key, display)
                        }
                        TitlePart::Text(styled) => ItemComponent {
                            key: Some(key),
                            content: Some(generate_loc_strings(styled.content.clone())),
                            style: class_style(styled.class_name.as_deref()),
                            ..ItemComponent::new("text")
                        },
                    }
                })
                .collect();
            (None, Some(items))
        }
    };
    ItemComponent {
        content: text,
        items,
        style: class_style(class_name),
        description: description.map(generate_loc_strings),
        ..ItemComponent::new(TITLE_ROLE)
    }
}

/// `helpGroup` component with one text child per entry, shown in order.
pub fn generate_help_group_component(items: Vec<HelpItem>) -> Result<ItemComponent, EditorError> {
    let mut group = ComponentEditor::new(None, NewComponentProps::group("helpGroup"));
    group.set_order(Some(Expression::named("sequential")));
    for item in items {
        let mut editor = ComponentEditor::new(None, NewComponentProps::new("text"));
        editor.set_content(Some(generate_loc_strings(item.content)));
        editor.set_styles(item.style);
        group.add_item_component(editor.into_component(), None)?;
    }
    Ok(group.into_component())
}

/// Page break item below `parent_key`; without a key a random `PB_xxxx` one is used.
pub fn generate_page_break(parent_key: &str, key: Option<&str>) -> SurveyItem {
    let local = match key {
        Some(key) => key.to_string(),
        None => {
            let random = Uuid::new_v4().simple().to_string();
            format!("PB_{}", &random[..4])
        }
    };
    SurveyItem::Single(SurveySingleItem {
        key: child_key(parent_key, &local),
        item_type: Some("pageBreak".to_string()),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::ExpressionArg;

    #[test]
    fn loc_strings_keep_every_language() {
        let strings = generate_loc_strings(translations([("en", "Hello"), ("de", "Hallo")]));
        assert_eq!(strings.len(), 2);
        for (code, text) in [("en", "Hello"), ("de", "Hallo")] {
            let entry = strings
                .iter()
                .find(|entry| entry.code == code)
                .expect("language present");
            assert_eq!(entry.parts, vec![ExpressionArg::str(text)]);
        }
    }

    #[test]
    fn plain_title() {
        let title = generate_title_component(
            TitleContent::Text(translations([("en", "Question")])),
            Some(translations([("en", "More")])),
            Some("fw-bold"),
        );
        assert_eq!(title.role, "title");
        assert!(title.items.is_none());
        assert_eq!(title.style, Some(vec![StyleEntry::class_name("fw-bold")]));
        assert_eq!(title.description.map(|d| d.len()), Some(1));
    }

    #[test]
    fn title_parts_are_keyed_by_position() {
        let title = generate_title_component(
            TitleContent::Parts(vec![
                TitlePart::Text(StyledText {
                    content: translations([("en", "Since ")]),
                    class_name: None,
                }),
                TitlePart::Date(DateDisplay {
                    date: Expression::named("getLastSubmissionDate"),
                    date_format: "dd.MM.yyyy".into(),
                    language_codes: vec!["en".into(), "de".into()],
                    class_name: Some("fw-bold".into()),
                }),
            ]),
            None,
            None,
        );
        let items = title.items.expect("parts");
        assert_eq!(items[0].key.as_deref(), Some("0"));
        assert_eq!(items[1].key.as_deref(), Some("1"));
        assert_eq!(items[1].role, "dateDisplay");
        assert_eq!(items[1].content.as_ref().map(Vec::len), Some(2));
        assert_eq!(items[1].style.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn help_group_is_sequential() {
        let group = generate_help_group_component(vec![
            HelpItem {
                content: translations([("en", "Why we ask")]),
                style: None,
            },
            HelpItem {
                content: translations([("en", "Who sees it")]),
                style: Some(vec![StyleEntry::class_name("small")]),
            },
        ])
        .expect("help group");
        assert_eq!(group.role, "helpGroup");
        assert_eq!(group.order, Some(Expression::named("sequential")));
        let items = group.items.expect("children");
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|item| item.role == "text" && item.key.is_none()));
        assert_eq!(items[1].style, Some(vec![StyleEntry::class_name("small")]));
    }

    #[test]
    fn page_breaks() {
        let fixed = generate_page_break("s", Some("pb1"));
        assert_eq!(fixed.key(), "s.pb1");
        let random = generate_page_break("s", None);
        let local = random.key().strip_prefix("s.PB_").expect("random key");
        assert_eq!(local.len(), 4);
        assert_eq!(
            random.as_single().and_then(|s| s.item_type.as_deref()),
            Some("pageBreak")
        );
    }
}
