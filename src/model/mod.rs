//! Structural model of tax-form templates and their filled data.
//!
//! - [`Field`]: one addressable, typed value location
//! - [`Section`]: a static list of fields or a dynamic row table
//! - [`Template`]: ordered sections plus form identity, immutable once built
//! - [`FormDataInstance`]: caller-owned values and rows with a lifecycle
//!
//! Dependencies between fields are stored as ids. The graph over them is
//! derived on demand by [`crate::resolver`].

pub mod control;
pub mod field;
pub mod instance;
pub mod section;
pub mod template;

pub use control::ControlType;
pub use field::{Field, is_resolvable_path, normalize_path, split_path};
pub use instance::{FormDataInstance, InstanceStatus, RowValues, Signature};
pub use section::{DynamicSection, LocationInfo, Section, SectionKind};
pub use template::{FieldLocation, Template};
