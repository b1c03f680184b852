use super::parser::{CompareOp, Filter};
use super::QueryError;
use serde_json::Value;
use std::cmp::Ordering;
use std::iter;

/// Lazily produced query results
pub type Results<'a> = Box<dyn Iterator<Item = Result<Value, QueryError>> + 'a>;

fn single<'a>(result: Result<Value, QueryError>) -> Results<'a> {
    Box::new(iter::once(result))
}

/// Evaluate `filter` against `input`, yielding results in document order
pub fn eval<'a>(filter: &'a Filter, input: Value) -> Results<'a> {
    match filter {
        Filter::Identity => single(Ok(input)),
        Filter::Literal(value) => single(Ok(value.clone())),
        Filter::Field(name) => single(field(&input, name)),
        Filter::Index(index) => single(index_of(&input, *index)),
        Filter::Iterate => iterate(input),
        Filter::Not => single(Ok(Value::Bool(!truthy(&input)))),
        Filter::Pipe(left, right) => Box::new(eval(left, input).flat_map(move |item| match item {
            Ok(value) => eval(right, value),
            Err(err) => single(Err(err)),
        })),
        Filter::Select(predicate) => {
            let keep = input.clone();
            Box::new(eval(predicate, input).filter_map(move |item| match item {
                Ok(value) if truthy(&value) => Some(Ok(keep.clone())),
                Ok(_) => None,
                Err(err) => Some(Err(err)),
            }))
        }
        Filter::Compare(left, op, right) => {
            let op = *op;
            binary(left, right, input, move |l, r| Value::Bool(compare(op, l, r)))
        }
        Filter::And(left, right) => {
            let right_input = input.clone();
            Box::new(eval(left, input).flat_map(move |item| -> Results<'a> {
                match item {
                    Ok(l) if !truthy(&l) => single(Ok(Value::Bool(false))),
                    Ok(_) => Box::new(
                        eval(right, right_input.clone()).map(|r| r.map(|r| Value::Bool(truthy(&r)))),
                    ),
                    Err(err) => single(Err(err)),
                }
            }))
        }
        Filter::Or(left, right) => {
            let right_input = input.clone();
            Box::new(eval(left, input).flat_map(move |item| -> Results<'a> {
                match item {
                    Ok(l) if truthy(&l) => single(Ok(Value::Bool(true))),
                    Ok(_) => Box::new(
                        eval(right, right_input.clone()).map(|r| r.map(|r| Value::Bool(truthy(&r)))),
                    ),
                    Err(err) => single(Err(err)),
                }
            }))
        }
    }
}

/// Cartesian combination of both sides' outputs
fn binary<'a, F>(left: &'a Filter, right: &'a Filter, input: Value, combine: F) -> Results<'a>
where
    F: Fn(&Value, &Value) -> Value + Copy + 'a,
{
    let right_input = input.clone();
    Box::new(eval(left, input).flat_map(move |item| -> Results<'a> {
        match item {
            Ok(l) => Box::new(
                eval(right, right_input.clone()).map(move |r| r.map(|r| combine(&l, &r))),
            ),
            Err(err) => single(Err(err)),
        }
    }))
}

fn field(input: &Value, name: &str) -> Result<Value, QueryError> {
    match input {
        Value::Object(map) => Ok(map.get(name).cloned().unwrap_or(Value::Null)),
        Value::Null => Ok(Value::Null),
        other => Err(QueryError::Type(format!(
            "cannot index {} with \"{}\"",
            type_name(other),
            name
        ))),
    }
}

fn index_of(input: &Value, index: i64) -> Result<Value, QueryError> {
    match input {
        Value::Array(items) => {
            let len = items.len() as i64;
            let position = if index < 0 { len + index } else { index };
            Ok(usize::try_from(position)
                .ok()
                .and_then(|i| items.get(i))
                .cloned()
                .unwrap_or(Value::Null))
        }
        Value::Null => Ok(Value::Null),
        other => Err(QueryError::Type(format!(
            "cannot index {} with number",
            type_name(other)
        ))),
    }
}

fn iterate<'a>(input: Value) -> Results<'a> {
    match input {
        Value::Array(items) => Box::new(items.into_iter().map(Ok)),
        Value::Object(map) => Box::new(map.into_iter().map(|(_, v)| Ok(v))),
        other => single(Err(QueryError::Type(format!(
            "cannot iterate over {}",
            type_name(&other)
        )))),
    }
}

fn truthy(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}

fn compare(op: CompareOp, left: &Value, right: &Value) -> bool {
    let ordering = order(left, right);
    match op {
        CompareOp::Equal => ordering == Ordering::Equal,
        CompareOp::NotEqual => ordering != Ordering::Equal,
        CompareOp::LessThan => ordering == Ordering::Less,
        CompareOp::LessEqual => ordering != Ordering::Greater,
        CompareOp::GreaterThan => ordering == Ordering::Greater,
        CompareOp::GreaterEqual => ordering != Ordering::Less,
    }
}

/// Total order across JSON types: null < false < true < numbers < strings < arrays < objects
fn order(left: &Value, right: &Value) -> Ordering {
    fn rank(value: &Value) -> u8 {
        match value {
            Value::Null => 0,
            Value::Bool(false) => 1,
            Value::Bool(true) => 2,
            Value::Number(_) => 3,
            Value::String(_) => 4,
            Value::Array(_) => 5,
            Value::Object(_) => 6,
        }
    }

    match (left, right) {
        (Value::Number(a), Value::Number(b)) => {
            let a = a.as_f64().unwrap_or(f64::NAN);
            let b = b.as_f64().unwrap_or(f64::NAN);
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Array(a), Value::Array(b)) => a
            .iter()
            .zip(b.iter())
            .map(|(x, y)| order(x, y))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or_else(|| a.len().cmp(&b.len())),
        (Value::Object(a), Value::Object(b)) => {
            if a == b {
                Ordering::Equal
            } else {
                left.to_string().cmp(&right.to_string())
            }
        }
        _ => rank(left).cmp(&rank(right)),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
