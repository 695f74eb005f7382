//! Runtime-named methods and per-value slicing.
//!
//! [`Methods`] lets `mapmethod` call an operation chosen by name at
//! construction time. Results are `serde_json::Value`s so one stage can
//! produce text, numbers, booleans or lists depending on the method.

use serde_json::Value;

use crate::error::{PipelineError, Result};
use crate::window::{Window, resolve_index};

/// A value that can answer method calls by name.
pub trait Methods {
    /// Call `name` with `args`.
    ///
    /// Unknown names fail with [`PipelineError::Attribute`], unusable
    /// arguments with [`PipelineError::Argument`].
    fn call_method(&self, name: &str, args: &[Value]) -> Result<Value>;
}

fn expect_args(args: &[Value], expected: usize) -> Result<()> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(PipelineError::arity(expected, args.len()))
    }
}

fn str_arg<'a>(args: &'a [Value], position: usize) -> Result<&'a str> {
    args.get(position).and_then(Value::as_str).ok_or_else(|| {
        PipelineError::Argument(format!("argument {position} must be a string"))
    })
}

/// Text methods shared by `String` and JSON strings. `None` if `name` is
/// not a text method.
fn text_method(text: &str, name: &str, args: &[Value]) -> Option<Result<Value>> {
    let result = match name {
        "trim" | "strip" => expect_args(args, 0).map(|_| Value::from(text.trim())),
        "upper" => expect_args(args, 0).map(|_| Value::from(text.to_uppercase())),
        "lower" => expect_args(args, 0).map(|_| Value::from(text.to_lowercase())),
        "len" => expect_args(args, 0).map(|_| Value::from(text.chars().count())),
        "split" => match args.len() {
            0 => Ok(Value::from(text.split_whitespace().collect::<Vec<_>>())),
            1 => str_arg(args, 0).map(|sep| Value::from(text.split(sep).collect::<Vec<_>>())),
            got => Err(PipelineError::arity(1, got)),
        },
        "contains" => expect_args(args, 1)
            .and_then(|_| str_arg(args, 0))
            .map(|needle| Value::from(text.contains(needle))),
        "starts_with" => expect_args(args, 1)
            .and_then(|_| str_arg(args, 0))
            .map(|prefix| Value::from(text.starts_with(prefix))),
        "ends_with" => expect_args(args, 1)
            .and_then(|_| str_arg(args, 0))
            .map(|suffix| Value::from(text.ends_with(suffix))),
        "replace" => expect_args(args, 2).and_then(|_| {
            let from = str_arg(args, 0)?;
            let to = str_arg(args, 1)?;
            Ok(Value::from(text.replace(from, to)))
        }),
        _ => return None,
    };
    Some(result)
}

impl Methods for String {
    fn call_method(&self, name: &str, args: &[Value]) -> Result<Value> {
        text_method(self, name, args).unwrap_or_else(|| Err(PipelineError::attribute("String", name)))
    }
}

impl Methods for &'static str {
    fn call_method(&self, name: &str, args: &[Value]) -> Result<Value> {
        text_method(self, name, args).unwrap_or_else(|| Err(PipelineError::attribute("str", name)))
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl Methods for Value {
    fn call_method(&self, name: &str, args: &[Value]) -> Result<Value> {
        match (self, name) {
            (Value::Array(values), "len") => expect_args(args, 0).map(|_| Value::from(values.len())),
            (Value::Object(map), "len") => expect_args(args, 0).map(|_| Value::from(map.len())),
            (Value::Array(values), "get") => {
                expect_args(args, 1)?;
                let position = args[0].as_u64().ok_or_else(|| {
                    PipelineError::Argument("array index must be a non-negative integer".to_string())
                })?;
                let found = usize::try_from(position).ok().and_then(|i| values.get(i));
                Ok(found.cloned().unwrap_or(Value::Null))
            }
            (Value::Object(map), "get") => {
                expect_args(args, 1)?;
                let key = str_arg(args, 0)?;
                Ok(map.get(key).cloned().unwrap_or(Value::Null))
            }
            (Value::Object(map), "keys") => {
                expect_args(args, 0)?;
                Ok(Value::from(map.keys().cloned().collect::<Vec<_>>()))
            }
            (Value::String(text), _) => text_method(text, name, args)
                .unwrap_or_else(|| Err(PipelineError::attribute("string", name))),
            _ => Err(PipelineError::attribute(kind(self), name)),
        }
    }
}

/// A value that can be sliced by position.
pub trait Sliceable: Sized {
    type Elem;

    /// Keep the positions selected by `window`.
    fn cut(self, window: &Window) -> Self;

    /// The element at `index`; negative indices count from the end.
    fn at(self, index: isize) -> Result<Self::Elem>;
}

impl<T> Sliceable for Vec<T> {
    type Elem = T;

    fn cut(self, window: &Window) -> Self {
        window.select(self)
    }

    fn at(self, index: isize) -> Result<T> {
        let available = self.len();
        resolve_index(index, available)
            .and_then(|i| self.into_iter().nth(i))
            .ok_or(PipelineError::Index { index, available })
    }
}

/// Strings slice by character, never by byte.
impl Sliceable for String {
    type Elem = char;

    fn cut(self, window: &Window) -> Self {
        window.select(self.chars().collect()).into_iter().collect()
    }

    fn at(self, index: isize) -> Result<char> {
        let available = self.chars().count();
        resolve_index(index, available)
            .and_then(|i| self.chars().nth(i))
            .ok_or(PipelineError::Index { index, available })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_methods() {
        let s = "  Hello World ".to_string();
        assert_eq!(s.call_method("strip", &[]), Ok(json!("Hello World")));
        assert_eq!(s.call_method("upper", &[]), Ok(json!("  HELLO WORLD ")));
        assert_eq!(s.call_method("split", &[]), Ok(json!(["Hello", "World"])));
        assert_eq!(s.call_method("contains", &[json!("lo W")]), Ok(json!(true)));
    }

    #[test]
    fn test_split_with_separator() {
        let s = "a,b,,c".to_string();
        assert_eq!(s.call_method("split", &[json!(",")]), Ok(json!(["a", "b", "", "c"])));
    }

    #[test]
    fn test_bad_arguments() {
        let s = "abc".to_string();
        assert!(matches!(
            s.call_method("strip", &[json!(1)]),
            Err(PipelineError::Argument(_))
        ));
        assert!(matches!(
            s.call_method("starts_with", &[json!(1)]),
            Err(PipelineError::Argument(_))
        ));
    }

    #[test]
    fn test_unknown_method() {
        let err = "abc".call_method("explode", &[]).unwrap_err();
        assert_eq!(err, PipelineError::attribute("str", "explode"));
    }

    #[test]
    fn test_json_methods() {
        let obj = json!({"name": "ada", "langs": ["en", "fr"]});
        assert_eq!(obj.call_method("get", &[json!("name")]), Ok(json!("ada")));
        assert_eq!(obj.call_method("get", &[json!("missing")]), Ok(Value::Null));
        assert_eq!(obj.call_method("len", &[]), Ok(json!(2)));

        let langs = json!(["en", "fr"]);
        assert_eq!(langs.call_method("get", &[json!(1)]), Ok(json!("fr")));
        assert_eq!(json!("Ada").call_method("lower", &[]), Ok(json!("ada")));
    }

    #[test]
    fn test_json_missing_method() {
        let err = json!(3).call_method("upper", &[]).unwrap_err();
        assert_eq!(err, PipelineError::attribute("number", "upper"));
    }

    #[test]
    fn test_vec_slicing() {
        let window = Window::new(None, None, Some(-1)).unwrap();
        assert_eq!(vec![1, 2, 3].cut(&window), vec![3, 2, 1]);
        assert_eq!(vec![1, 2, 3].at(1), Ok(2));
        assert_eq!(
            vec![1, 2, 3].at(5),
            Err(PipelineError::Index {
                index: 5,
                available: 3
            })
        );
    }

    #[test]
    fn test_string_slicing_by_char() {
        assert_eq!("héllo".to_string().cut(&Window::from(..2)), "hé");
        assert_eq!("héllo".to_string().at(-1), Ok('o'));
    }
}
