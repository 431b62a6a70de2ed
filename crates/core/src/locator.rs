//! Locator chains.
//!
//! A [`Locator`] is a named, ordered set of [`LocatorSpec`] strategies. The
//! strategies are kept sorted by priority (text, attribute, CSS, structural
//! index) and [`resolve`] returns the first one that matches at least one
//! element. Nothing is cached: every call queries the live page.

use std::fmt;

use tracing::debug;

use crate::driver::PageDriver;
use crate::error::Result;

/// One way of finding an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocatorSpec {
	/// Visible text; `exact` requires the whole trimmed text to match.
	Text { text: String, exact: bool },
	/// `tag[name="value"]`, any tag when `tag` is `None`.
	Attribute {
		tag: Option<String>,
		name: String,
		value: String,
	},
	/// Raw CSS (or Playwright chain) selector.
	Css(String),
	/// The `index`-th element matching a structural CSS path.
	Structural { path: String, index: usize },
	/// `inner` searched only inside the first match of `scope`.
	Within { scope: Box<LocatorSpec>, inner: Box<LocatorSpec> },
}

impl LocatorSpec {
	/// Lower ranks are tried first.
	pub fn priority(&self) -> u8 {
		match self {
			LocatorSpec::Text { .. } => 0,
			LocatorSpec::Attribute { .. } => 1,
			LocatorSpec::Css(_) => 2,
			LocatorSpec::Structural { .. } => 3,
			LocatorSpec::Within { inner, .. } => inner.priority(),
		}
	}

	/// Renders the Playwright selector string for this strategy.
	pub fn selector(&self) -> String {
		match self {
			LocatorSpec::Text { text, exact: true } => format!("text={}", quote(text)),
			LocatorSpec::Text { text, exact: false } => format!("text={text}"),
			LocatorSpec::Attribute { tag, name, value } => {
				format!("{}[{name}={}]", tag.as_deref().unwrap_or(""), quote(value))
			}
			LocatorSpec::Css(css) => css.clone(),
			LocatorSpec::Structural { path, index } => format!("{path} >> nth={index}"),
			LocatorSpec::Within { scope, inner } => format!("{} >> nth=0 >> {}", scope.selector(), inner.selector()),
		}
	}

	/// Short strategy name used in logs.
	pub fn kind(&self) -> &'static str {
		match self {
			LocatorSpec::Text { exact: true, .. } => "text",
			LocatorSpec::Text { exact: false, .. } => "text-contains",
			LocatorSpec::Attribute { .. } => "attribute",
			LocatorSpec::Css(_) => "css",
			LocatorSpec::Structural { .. } => "structural",
			LocatorSpec::Within { .. } => "scoped",
		}
	}
}

/// Double-quoted selector literal with backslashes and quotes escaped.
pub fn quote(value: &str) -> String {
	format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// A named chain of strategies describing one UI element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
	label: String,
	strategies: Vec<LocatorSpec>,
}

impl Locator {
	/// Builds a single-strategy locator labeled by `label`.
	pub fn new(label: impl Into<String>, spec: LocatorSpec) -> Self {
		Self {
			label: label.into(),
			strategies: vec![spec],
		}
	}

	/// Exact visible text.
	pub fn text(text: &str) -> Self {
		Self::new(
			text,
			LocatorSpec::Text {
				text: text.to_string(),
				exact: true,
			},
		)
	}

	/// Case-insensitive substring of the visible text.
	pub fn contains(text: &str) -> Self {
		Self::new(
			text,
			LocatorSpec::Text {
				text: text.to_string(),
				exact: false,
			},
		)
	}

	pub fn css(label: impl Into<String>, css: &str) -> Self {
		Self::new(label, LocatorSpec::Css(css.to_string()))
	}

	pub fn attribute(label: impl Into<String>, tag: Option<&str>, name: &str, value: &str) -> Self {
		Self::new(
			label,
			LocatorSpec::Attribute {
				tag: tag.map(str::to_string),
				name: name.to_string(),
				value: value.to_string(),
			},
		)
	}

	/// Input located by its placeholder attribute.
	pub fn placeholder(value: &str) -> Self {
		Self::attribute(format!("input '{value}'"), Some("input"), "placeholder", value)
	}

	/// Button located by its title attribute.
	pub fn titled_button(title: &str) -> Self {
		Self::attribute(format!("button '{title}'"), Some("button"), "title", title)
	}

	pub fn structural(label: impl Into<String>, path: &str, index: usize) -> Self {
		Self::new(
			label,
			LocatorSpec::Structural {
				path: path.to_string(),
				index,
			},
		)
	}

	/// Adds a fallback strategy, keeping the chain in priority order.
	///
	/// Strategies of equal priority keep their insertion order.
	pub fn or(mut self, spec: LocatorSpec) -> Self {
		self.strategies.push(spec);
		self.strategies.sort_by_key(LocatorSpec::priority);
		self
	}

	/// Appends every strategy of `other` as fallbacks.
	pub fn or_locator(self, other: Locator) -> Self {
		other.strategies.into_iter().fold(self, Locator::or)
	}

	/// Restricts every strategy to the inside of `scope`'s primary strategy.
	pub fn within(self, scope: &Locator) -> Self {
		let scope_spec = scope.primary().clone();
		let strategies = self
			.strategies
			.into_iter()
			.map(|inner| LocatorSpec::Within {
				scope: Box::new(scope_spec.clone()),
				inner: Box::new(inner),
			})
			.collect();
		Self {
			label: format!("{} in {}", self.label, scope.label),
			strategies,
		}
	}

	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = label.into();
		self
	}

	pub fn label(&self) -> &str {
		&self.label
	}

	pub fn strategies(&self) -> &[LocatorSpec] {
		&self.strategies
	}

	/// The highest-priority strategy.
	pub fn primary(&self) -> &LocatorSpec {
		&self.strategies[0]
	}
}

impl fmt::Display for Locator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.label)
	}
}

/// A locator resolved against the live page at one point in time.
pub struct Resolved<'p> {
	page: &'p dyn PageDriver,
	label: String,
	strategy: LocatorSpec,
	selector: String,
	count: usize,
	depth: usize,
}

impl<'p> Resolved<'p> {
	/// Number of elements the chosen strategy matched.
	pub fn count(&self) -> usize {
		self.count
	}

	pub fn found(&self) -> bool {
		self.count > 0
	}

	/// Queries visibility of the first match now. Zero matches is not visible.
	pub async fn is_visible(&self) -> Result<bool> {
		if self.count == 0 {
			return Ok(false);
		}
		self.page.is_visible(&self.selector).await
	}

	pub fn selector(&self) -> &str {
		&self.selector
	}

	pub fn strategy(&self) -> &LocatorSpec {
		&self.strategy
	}

	pub fn label(&self) -> &str {
		&self.label
	}

	/// True when a strategy other than the primary one matched.
	pub fn used_fallback(&self) -> bool {
		self.depth > 0
	}
}

/// Resolves `locator` against `page`, falling back through its strategies.
///
/// A strategy whose query errors is treated as matching nothing. When no
/// strategy matches, the primary strategy is returned with a zero count.
pub async fn resolve<'p>(page: &'p dyn PageDriver, locator: &Locator) -> Resolved<'p> {
	for (depth, spec) in locator.strategies().iter().enumerate() {
		let selector = spec.selector();
		let count = match page.count(&selector).await {
			Ok(count) => count,
			Err(err) => {
				debug!(target = "sbv", locator = %locator, selector = %selector, error = %err, "strategy query failed");
				0
			}
		};

		if count > 0 {
			if depth > 0 {
				debug!(
					target = "sbv",
					locator = %locator,
					strategy = spec.kind(),
					selector = %selector,
					depth,
					"resolved via fallback"
				);
			}
			return Resolved {
				page,
				label: locator.label().to_string(),
				strategy: spec.clone(),
				selector,
				count,
				depth,
			};
		}
	}

	debug!(target = "sbv", locator = %locator, tried = locator.strategies().len(), "no strategy matched");
	let primary = locator.primary().clone();
	Resolved {
		page,
		label: locator.label().to_string(),
		selector: primary.selector(),
		strategy: primary,
		count: 0,
		depth: 0,
	}
}
