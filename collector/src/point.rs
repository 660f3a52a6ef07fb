use chrono::{
    DateTime,
    Utc,
};

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

/// A single time-series observation.
///
/// Tags keep their insertion order. A point without a timestamp is stamped by
/// the database when it is written.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub measurement: &'static str,
    pub tags: Vec<(&'static str, String)>,
    pub fields: Vec<(&'static str, FieldValue)>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Point {
    pub fn new(measurement: &'static str) -> Self {
        Self {
            measurement,
            tags: Vec::new(),
            fields: Vec::new(),
            timestamp: None,
        }
    }

    /// Adds a tag. Empty values are dropped since the line protocol cannot
    /// carry them.
    pub fn tag(mut self, key: &'static str, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.tags.push((key, value));
        }
        self
    }

    pub fn field(mut self, key: &'static str, value: impl Into<FieldValue>) -> Self {
        self.fields.push((key, value.into()));
        self
    }

    pub fn field_opt(self, key: &'static str, value: Option<impl Into<FieldValue>>) -> Self {
        match value {
            Some(value) => self.field(key, value),
            None => self,
        }
    }

    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn tag_value(&self, key: &str) -> Option<&str> {
        self.tags.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }

    pub fn field_value(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_tags_are_skipped() {
        let point = Point::new("m").tag("a", "x").tag("b", "").tag("c", "z");
        assert_eq!(point.tags, vec![("a", "x".to_string()), ("c", "z".to_string())]);
        assert_eq!(point.tag_value("b"), None);
    }

    #[test]
    fn absent_optional_field_is_not_recorded() {
        let point = Point::new("m").field_opt("a", None::<i64>).field_opt("b", Some(2i64));
        assert_eq!(point.field_value("a"), None);
        assert_eq!(point.field_value("b"), Some(&FieldValue::Integer(2)));
    }
}
