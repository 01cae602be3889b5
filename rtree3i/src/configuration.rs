use std::sync::Arc;

use crate::errors::{RTreeError, RTreeResult};
use crate::selector::{MinimalVolumeIncreaseSelector, RStarSelector, Selector};
use crate::splitter::{QuadraticSplitter, RStarSplitter, Splitter};

/// Default maximum number of children per node, for both Guttman and R*-tree
/// configurations.
pub const DEFAULT_MAX_CHILDREN: usize = 4;

/// Default ratio between the minimum and maximum number of children.
pub const DEFAULT_FILLING_FACTOR: f64 = 0.4;

/// Parameters shared by every node of one logical tree.
///
/// A configuration bundles the minimum and maximum number of children per
/// node with the [`Selector`] and [`Splitter`] strategies. It is immutable;
/// a tree keeps the configuration it was created with for its whole life.
///
/// # Examples
///
/// ```rust
/// use rtree3i::Configuration;
///
/// let guttman = Configuration::default();
/// assert_eq!(guttman.max_children(), 4);
/// assert_eq!(guttman.min_children(), 2);
///
/// let star = Configuration::builder().star().max_children(8).build().unwrap();
/// assert_eq!(star.min_children(), 3);
/// ```
#[derive(Clone, Debug)]
pub struct Configuration {
    min_children: usize,
    max_children: usize,
    selector: Arc<dyn Selector>,
    splitter: Arc<dyn Splitter>,
}

impl Configuration {
    /// Creates a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RTreeError::InvalidConfiguration`] unless
    /// `max_children > 2`, `min_children >= 1` and
    /// `min_children < max_children`.
    pub fn new(
        min_children: usize,
        max_children: usize,
        selector: Arc<dyn Selector>,
        splitter: Arc<dyn Splitter>,
    ) -> RTreeResult<Configuration> {
        let problem = if max_children <= 2 {
            Some(format!("max_children must be greater than 2, got {}", max_children))
        } else if min_children < 1 {
            Some(format!("min_children must be at least 1, got {}", min_children))
        } else if min_children >= max_children {
            Some(format!(
                "min_children ({}) must be less than max_children ({})",
                min_children, max_children
            ))
        } else {
            None
        };

        if let Some(message) = problem {
            log::error!("Invalid configuration: {}", message);
            return Err(RTreeError::InvalidConfiguration(message));
        }

        Ok(Configuration {
            min_children,
            max_children,
            selector,
            splitter,
        })
    }

    /// Returns a builder starting from the Guttman defaults.
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::new()
    }

    pub fn min_children(&self) -> usize {
        self.min_children
    }

    pub fn max_children(&self) -> usize {
        self.max_children
    }

    pub fn selector(&self) -> &dyn Selector {
        self.selector.as_ref()
    }

    pub fn splitter(&self) -> &dyn Splitter {
        self.splitter.as_ref()
    }
}

impl Default for Configuration {
    /// Guttman's R-tree: at most 4 children, at least 2, minimal volume
    /// increase selection and quadratic splits.
    fn default() -> Self {
        Configuration {
            min_children: default_min_children(DEFAULT_MAX_CHILDREN),
            max_children: DEFAULT_MAX_CHILDREN,
            selector: Arc::new(MinimalVolumeIncreaseSelector),
            splitter: Arc::new(QuadraticSplitter),
        }
    }
}

fn default_min_children(max_children: usize) -> usize {
    (max_children as f64 * DEFAULT_FILLING_FACTOR).round() as usize
}

/// Builder for [`Configuration`].
///
/// Unset child limits fall back to [`DEFAULT_MAX_CHILDREN`] and
/// `round(max_children * DEFAULT_FILLING_FACTOR)`. Validation happens in
/// [`ConfigurationBuilder::build`].
#[derive(Clone, Debug)]
pub struct ConfigurationBuilder {
    min_children: Option<usize>,
    max_children: Option<usize>,
    selector: Arc<dyn Selector>,
    splitter: Arc<dyn Splitter>,
}

impl Default for ConfigurationBuilder {
    fn default() -> Self {
        ConfigurationBuilder::new()
    }
}

impl ConfigurationBuilder {
    pub fn new() -> Self {
        ConfigurationBuilder {
            min_children: None,
            max_children: None,
            selector: Arc::new(MinimalVolumeIncreaseSelector),
            splitter: Arc::new(QuadraticSplitter),
        }
    }

    pub fn min_children(mut self, min_children: usize) -> Self {
        self.min_children = Some(min_children);
        self
    }

    pub fn max_children(mut self, max_children: usize) -> Self {
        self.max_children = Some(max_children);
        self
    }

    pub fn selector<S: Selector + 'static>(mut self, selector: S) -> Self {
        self.selector = Arc::new(selector);
        self
    }

    pub fn splitter<S: Splitter + 'static>(mut self, splitter: S) -> Self {
        self.splitter = Arc::new(splitter);
        self
    }

    /// Switches to the R*-tree selector and splitter.
    pub fn star(mut self) -> Self {
        self.selector = Arc::new(RStarSelector);
        self.splitter = Arc::new(RStarSplitter);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RTreeError::InvalidConfiguration`] if the child limits are
    /// inconsistent, see [`Configuration::new`].
    pub fn build(self) -> RTreeResult<Configuration> {
        let max_children = self.max_children.unwrap_or(DEFAULT_MAX_CHILDREN);
        let min_children = self
            .min_children
            .unwrap_or_else(|| default_min_children(max_children));
        Configuration::new(min_children, max_children, self.selector, self.splitter)
    }
}
