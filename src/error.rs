//! Error types for blueprint declaration and instance builds.
//!
//! Declaration problems ([`ConfigError`]) are detected once, when a
//! blueprint is frozen. Everything that can go wrong while building an
//! instance is a [`FactoryError`].

use thiserror::Error;

/// Boxed error raised by user-supplied generators, formatters and callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors detected while declaring a blueprint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
	/// A declaration referenced an attribute the model does not have.
	#[error("No such attribute name: {model}.{name}")]
	UnknownAttribute {
		/// Model the blueprint was declared for.
		model: &'static str,
		/// Attribute name used in the declaration.
		name: String,
	},

	/// The model exposes no fields to generate.
	#[error("Model {model} has no fields")]
	NoFields {
		/// Model the blueprint was declared for.
		model: &'static str,
	},

	/// Two fields resolve to the same attribute name.
	#[error("Duplicate attribute name: {model}.{name}")]
	DuplicateAttribute {
		/// Model the blueprint was declared for.
		model: &'static str,
		/// Attribute name shared by more than one field.
		name: String,
	},

	/// A formatter was attached to an attribute that has no generator.
	#[error("Attribute {model}.{name} has no generator to format")]
	MissingGenerator {
		/// Model the blueprint was declared for.
		model: &'static str,
		/// Attribute name the formatter targeted.
		name: String,
	},
}

/// Errors that abort a single build.
#[derive(Debug, Error)]
pub enum FactoryError {
	/// A generator or formatter failed.
	#[error("Generator error: {0}")]
	Generator(BoxError),

	/// The post-build callback failed.
	#[error("Callback error: {0}")]
	Callback(BoxError),

	/// A value did not have the type its destination expects.
	#[error("Type mismatch for {target}: expected {expected}, found {found}")]
	TypeMismatch {
		/// What was being assigned (a field, a formatter input, a build output).
		target: String,
		/// Type the destination accepts.
		expected: &'static str,
		/// Type that was supplied.
		found: &'static str,
	},

	/// No blueprint is registered under the name.
	#[error("Blueprint not registered: {0}")]
	NotRegistered(String),

	/// I/O failure inside a generator or callback.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	/// Declaration error surfaced through a build entry point.
	#[error(transparent)]
	Config(#[from] ConfigError),
}

impl FactoryError {
	/// Wraps any error (or message) raised by a generator.
	pub fn generator(error: impl Into<BoxError>) -> Self {
		Self::Generator(error.into())
	}

	/// Wraps any error (or message) raised by a post-build callback.
	pub fn callback(error: impl Into<BoxError>) -> Self {
		Self::Callback(error.into())
	}

	pub(crate) fn mismatch(
		target: impl Into<String>,
		expected: &'static str,
		found: &'static str,
	) -> Self {
		Self::TypeMismatch {
			target: target.into(),
			expected,
			found,
		}
	}
}

/// Result type alias for build operations.
pub type FactoryResult<T> = Result<T, FactoryError>;

/// Result type alias for declaration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
