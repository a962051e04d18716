use super::expression::{self, Expr};
use crate::error::Result;
use std::fmt;
use std::sync::Arc;

type ObjectiveFn = dyn Fn(f64) -> f64 + Send + Sync;

/// Real-valued objective function of one variable.
///
/// Cloning is cheap and the function is shared read-only between threads.
#[derive(Clone)]
pub struct Objective {
    label: Arc<str>,
    function: Arc<ObjectiveFn>,
}

impl Objective {
    /// Parses a textual expression in `x`, e.g. `mod(x,1) * (cos(20*pi*x) - sin(x))`.
    pub fn parse(source: &str) -> Result<Self> {
        let expr: Expr = expression::parse(source)?;
        Ok(Self {
            label: Arc::from(source.trim()),
            function: Arc::new(move |x| expr.eval(x)),
        })
    }

    pub fn from_fn<F>(label: impl Into<String>, f: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self {
            label: Arc::from(label.into()),
            function: Arc::new(f),
        }
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        (self.function)(x)
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Objective").field("label", &self.label).finish()
    }
}
