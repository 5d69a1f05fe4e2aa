use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("skip rule '{rule}' references field '{field}' which is missing from the event")]
    UnknownRuleField { rule: String, field: String },
}

#[derive(Debug, Error, PartialEq)]
pub enum TemplateError {
    #[error("unknown template field '{0}'")]
    UnknownField(String),

    #[error("format specification not supported for field '{0}'")]
    UnsupportedFormatSpec(String),

    #[error("invalid time format '{0}'")]
    InvalidTimeFormat(String),

    #[error("unbalanced brace at offset {0}")]
    UnbalancedBrace(usize),
}

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("Can't parse Frigate event message: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("'after' missing from payload")]
    MissingAfter,

    #[error("event has no entered zone to link to")]
    NoEnteredZone,

    #[error("attachment filename template: {0}")]
    Template(#[from] TemplateError),

    #[error("invalid events url: {0}")]
    Url(#[from] url::ParseError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid skip rules: {0}")]
    SkipRules(#[from] serde_json::Error),

    #[error("can't read skip rules file {path}: {source}")]
    SkipRulesFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
