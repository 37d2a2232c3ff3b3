use std::borrow::Cow;

use schemars::{JsonSchema, Schema, SchemaGenerator, json_schema};
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Advisory result type attached to an expression for the consuming runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReturnType {
    Float,
    String,
}

/// Named node of the study engine expression language.
///
/// Nodes are plain values: builders always create new nodes and never touch an existing one, so a
/// node can be cloned into as many parents as needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Expression {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<ReturnType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<ExpressionArg>,
}

/// One positional argument of an [`Expression`], tagged by `dtype` on the wire.
///
/// A text argument without a `dtype` tag is read as `str`; the schema allows it too.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionArg {
    Str { str: String },
    Num { num: f64 },
    Exp { exp: Box<Expression> },
}

impl Expression {
    /// Expression without arguments, e.g. `{"name": "sequential"}`.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            return_type: None,
            data: Vec::new(),
        }
    }

    /// Visits this node and every nested `exp` argument, depth first.
    pub fn visit_mut(&mut self, visitor: &mut dyn FnMut(&mut Expression)) {
        visitor(self);
        for arg in &mut self.data {
            if let ExpressionArg::Exp { exp } = arg {
                exp.visit_mut(visitor);
            }
        }
    }

    /// Rewrites every `str` argument of the tree for which `rewrite` returns a replacement.
    ///
    /// Returns the number of rewritten arguments.
    pub fn rewrite_str_args(&mut self, rewrite: &dyn Fn(&str) -> Option<String>) -> usize {
        let mut count = 0;
        self.visit_mut(&mut |node| {
            for arg in &mut node.data {
                if let ExpressionArg::Str { str } = arg
                    && let Some(replacement) = rewrite(str)
                {
                    *str = replacement;
                    count += 1;
                }
            }
        });
        count
    }
}

impl ExpressionArg {
    pub fn str(value: impl Into<String>) -> Self {
        Self::Str { str: value.into() }
    }

    pub fn num(value: impl Into<f64>) -> Self {
        Self::Num { num: value.into() }
    }

    pub fn exp(value: Expression) -> Self {
        Self::Exp {
            exp: Box::new(value),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str { str } => Some(str),
            _ => None,
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            Self::Num { num } => Some(*num),
            _ => None,
        }
    }

    pub fn as_exp(&self) -> Option<&Expression> {
        match self {
            Self::Exp { exp } => Some(exp),
            _ => None,
        }
    }

    pub fn as_exp_mut(&mut self) -> Option<&mut Expression> {
        match self {
            Self::Exp { exp } => Some(exp),
            _ => None,
        }
    }
}

impl Serialize for ExpressionArg {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        match self {
            Self::Str { str } => {
                map.serialize_entry("dtype", "str")?;
                map.serialize_entry("str", str)?;
            }
            Self::Num { num } => {
                map.serialize_entry("dtype", "num")?;
                // integral values go out as JSON integers, the runtime compares them verbatim
                if num.fract() == 0.0 && num.abs() < i64::MAX as f64 {
                    map.serialize_entry("num", &(*num as i64))?;
                } else {
                    map.serialize_entry("num", num)?;
                }
            }
            Self::Exp { exp } => {
                map.serialize_entry("dtype", "exp")?;
                map.serialize_entry("exp", exp)?;
            }
        }
        map.end()
    }
}

impl JsonSchema for ExpressionArg {
    fn schema_name() -> Cow<'static, str> {
        "ExpressionArg".into()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        let expression = generator.subschema_for::<Expression>();
        json_schema!({
            "oneOf": [
                {
                    "type": "object",
                    "properties": {
                        "dtype": { "const": "str" },
                        "str": { "type": "string" }
                    },
                    "required": ["str"]
                },
                {
                    "type": "object",
                    "properties": {
                        "dtype": { "const": "num" },
                        "num": { "type": "number" }
                    },
                    "required": ["dtype", "num"]
                },
                {
                    "type": "object",
                    "properties": {
                        "dtype": { "const": "exp" },
                        "exp": expression
                    },
                    "required": ["dtype", "exp"]
                }
            ]
        })
    }
}

#[derive(Deserialize)]
struct RawExpressionArg {
    #[serde(default)]
    dtype: Option<String>,
    #[serde(default)]
    str: Option<String>,
    #[serde(default)]
    num: Option<f64>,
    #[serde(default)]
    exp: Option<Box<Expression>>,
}

impl<'de> Deserialize<'de> for ExpressionArg {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawExpressionArg::deserialize(deserializer)?;
        // older documents omit the tag on plain text parts
        match raw.dtype.as_deref().unwrap_or("str") {
            "str" => raw
                .str
                .map(|str| Self::Str { str })
                .ok_or_else(|| D::Error::missing_field("str")),
            "num" => raw
                .num
                .map(|num| Self::Num { num })
                .ok_or_else(|| D::Error::missing_field("num")),
            "exp" => raw
                .exp
                .map(|exp| Self::Exp { exp })
                .ok_or_else(|| D::Error::missing_field("exp")),
            other => Err(D::Error::unknown_variant(other, &["str", "num", "exp"])),
        }
    }
}

impl From<&str> for ExpressionArg {
    fn from(value: &str) -> Self {
        Self::str(value)
    }
}

impl From<String> for ExpressionArg {
    fn from(value: String) -> Self {
        Self::Str { str: value }
    }
}

impl From<&String> for ExpressionArg {
    fn from(value: &String) -> Self {
        Self::str(value.as_str())
    }
}

impl From<f64> for ExpressionArg {
    fn from(value: f64) -> Self {
        Self::Num { num: value }
    }
}

impl From<i32> for ExpressionArg {
    fn from(value: i32) -> Self {
        Self::num(value)
    }
}

impl From<u32> for ExpressionArg {
    fn from(value: u32) -> Self {
        Self::num(value)
    }
}

impl From<i64> for ExpressionArg {
    fn from(value: i64) -> Self {
        Self::Num { num: value as f64 }
    }
}

impl From<Expression> for ExpressionArg {
    fn from(value: Expression) -> Self {
        Self::exp(value)
    }
}

impl From<&Expression> for ExpressionArg {
    fn from(value: &Expression) -> Self {
        Self::exp(value.clone())
    }
}

/// Wraps a value as a present positional argument.
pub fn arg(value: impl Into<ExpressionArg>) -> Option<ExpressionArg> {
    Some(value.into())
}

/// Wraps an optional value; `None` is dropped by [`build_expression`].
pub fn opt_arg<T: Into<ExpressionArg>>(value: Option<T>) -> Option<ExpressionArg> {
    value.map(Into::into)
}

/// Builds an expression node from a name, an optional return type and positional arguments.
///
/// Absent arguments are removed before the node is assembled, wherever they appear, so
/// call sites can pass optional trailing parameters straight through.
pub fn build_expression<I>(
    name: impl Into<String>,
    return_type: Option<ReturnType>,
    args: I,
) -> Expression
where
    I: IntoIterator<Item = Option<ExpressionArg>>,
{
    Expression {
        name: name.into(),
        return_type,
        data: args.into_iter().flatten().collect(),
    }
}

/// Rewrites `key` when it equals `old_prefix` or lies below it.
pub fn rebase_reference(key: &str, old_prefix: &str, new_prefix: &str) -> Option<String> {
    if key == old_prefix {
        return Some(new_prefix.to_string());
    }
    key.strip_prefix(old_prefix)
        .filter(|rest| rest.starts_with('.'))
        .map(|rest| format!("{new_prefix}{rest}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn schema_accepts_untagged_text() {
        let schema = serde_json::to_value(schemars::schema_for!(ExpressionArg)).expect("schema");
        let variants = schema["oneOf"].as_array().expect("variants");
        assert_eq!(variants.len(), 3);
        assert_eq!(variants[0]["required"], json!(["str"]));
        assert_eq!(variants[1]["required"], json!(["dtype", "num"]));
        assert_eq!(variants[2]["required"], json!(["dtype", "exp"]));

        let untagged: ExpressionArg = serde_json::from_value(json!({"str": "x"})).expect("read");
        assert_eq!(untagged, ExpressionArg::str("x"));
    }

    #[test]
    fn marshals_strings_and_numbers() {
        let expr = build_expression("eq", None, [arg("x"), arg(3)]);
        assert_eq!(
            serde_json::to_value(&expr).expect("serialize"),
            json!({
                "name": "eq",
                "data": [{"dtype": "str", "str": "x"}, {"dtype": "num", "num": 3}]
            })
        );
    }

    #[test]
    fn drops_absent_arguments_anywhere() {
        let expr = build_expression("f", None, [arg("a"), None, arg("b")]);
        assert_eq!(expr.data.len(), 2);
        assert_eq!(expr.data[0].as_str(), Some("a"));
        assert_eq!(expr.data[1].as_str(), Some("b"));
    }

    #[test]
    fn nests_expressions() {
        let inner = Expression::named("h");
        let expr = build_expression("g", None, [arg(inner.clone())]);
        assert_eq!(expr.data, vec![ExpressionArg::exp(inner)]);
        assert_eq!(
            serde_json::to_value(&expr).expect("serialize"),
            json!({"name": "g", "data": [{"dtype": "exp", "exp": {"name": "h"}}]})
        );
    }

    #[test]
    fn keeps_fractional_numbers_as_floats() {
        let expr = build_expression("sum", Some(ReturnType::Float), [arg(1.5), arg(-2)]);
        assert_eq!(
            serde_json::to_value(&expr).expect("serialize"),
            json!({
                "name": "sum",
                "returnType": "float",
                "data": [{"dtype": "num", "num": 1.5}, {"dtype": "num", "num": -2}]
            })
        );
    }

    #[test]
    fn reads_untagged_text_parts() {
        let parsed: ExpressionArg =
            serde_json::from_value(json!({"str": "hello"})).expect("untagged str");
        assert_eq!(parsed, ExpressionArg::str("hello"));

        let err = serde_json::from_value::<ExpressionArg>(json!({"dtype": "bool"}))
            .expect_err("unknown dtype");
        assert!(err.to_string().contains("unknown variant"));
    }

    #[test]
    fn rewrites_nested_string_arguments() {
        let mut expr = build_expression(
            "and",
            None,
            [
                arg(build_expression("hasResponseKey", None, [arg("s.g.q1"), arg("rg")])),
                arg(build_expression("hasResponse", None, [arg("s.gx.q2")])),
            ],
        );
        let count = expr.rewrite_str_args(&|key| rebase_reference(key, "s.g", "s.h"));
        assert_eq!(count, 1);
        let first = expr.data[0].as_exp().expect("nested");
        assert_eq!(first.data[0].as_str(), Some("s.h.q1"));
        let second = expr.data[1].as_exp().expect("nested");
        assert_eq!(second.data[0].as_str(), Some("s.gx.q2"));
    }
}
