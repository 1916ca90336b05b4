//! Convenience re-exports for common usage.
//!
//! # Example
//!
//! ```
//! use reinhardt_factory::prelude::*;
//!
//! #[derive(Debug, Clone, Default, Model)]
//! struct Tag {
//!     label: String,
//! }
//!
//! let tags = Blueprint::builder(Tag::default())
//!     .seq_string("label", |n| Ok(format!("tag-{n}")))
//!     .must_build();
//! assert_eq!(tags.must_create().label, "tag-1");
//! ```

// Error types
pub use crate::error::{ConfigError, ConfigResult, FactoryError, FactoryResult};

// Declaration and build
pub use crate::args::{AnyArgs, Args};
pub use crate::blueprint::{Blueprint, BlueprintBuilder};
pub use crate::context::Context;
pub use crate::generator::{AttributeGenerator, Formatter};
pub use crate::options::Options;
pub use crate::sequence::Sequence;

// Field values
pub use crate::model::Model;
pub use crate::value::{FieldValue, Value};

// Registry
pub use crate::registry::{BlueprintRegistry, register_blueprint};

// Derive macros
pub use reinhardt_factory_macros::{FieldValue, Model};
