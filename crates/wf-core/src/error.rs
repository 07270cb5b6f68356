use thiserror::Error;

pub type WfResult<T> = Result<T, WfError>;

/// Errors shared by every crate of the engine.
///
/// None of these are recoverable inside a calculation pass: a chunk either
/// completes or the whole pass fails with one of them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WfError {
    /// Incompatible model combination, detected when models are wired together.
    #[error("Configuration error in '{model}': {what}")]
    Configuration { model: String, what: String },

    /// Array shape does not match the `(state, turbine)` / `(state, point)` contract.
    #[error("Dimension mismatch for {what}: expected {expected}, got {got}")]
    Dimension {
        what: String,
        expected: String,
        got: String,
    },

    #[error("Missing data for variable '{var}' in {context}, available: [{available}]")]
    MissingData {
        var: String,
        context: String,
        available: String,
    },

    #[error("Missing input: {what}")]
    MissingInput { what: String },

    /// Two objects cannot be combined (e.g. states chains with different bases).
    #[error("Incompatible: {what}")]
    Incompatible { what: String },

    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    #[error("Index out of bounds: {what} (index={index}, len={len})")]
    IndexOob {
        what: &'static str,
        index: usize,
        len: usize,
    },
}

impl WfError {
    pub fn configuration(model: impl Into<String>, what: impl Into<String>) -> Self {
        WfError::Configuration {
            model: model.into(),
            what: what.into(),
        }
    }

    /// Shape error with `(rows, cols)` formatting.
    pub fn dimension(what: impl Into<String>, expected: (usize, usize), got: (usize, usize)) -> Self {
        WfError::Dimension {
            what: what.into(),
            expected: format!("({}, {})", expected.0, expected.1),
            got: format!("({}, {})", got.0, got.1),
        }
    }

    /// Missing variable, listing what was there instead.
    pub fn missing_data<V, I>(var: V, context: impl Into<String>, available: I) -> Self
    where
        V: std::fmt::Display,
        I: IntoIterator,
        I::Item: std::fmt::Display,
    {
        let available: Vec<String> = available.into_iter().map(|v| v.to_string()).collect();
        WfError::MissingData {
            var: var.to_string(),
            context: context.into(),
            available: available.join(", "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_display_contains_shapes() {
        let err = WfError::dimension("weights", (10, 3), (10, 2));
        let msg = err.to_string();
        assert!(msg.contains("weights"));
        assert!(msg.contains("(10, 3)"));
        assert!(msg.contains("(10, 2)"));
    }

    #[test]
    fn missing_data_lists_available() {
        let err = WfError::missing_data("WD", "ambient rotor results", ["WS", "TI"]);
        let msg = err.to_string();
        assert!(msg.contains("'WD'"));
        assert!(msg.contains("WS, TI"));
    }
}
