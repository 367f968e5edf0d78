//! Structural comparison of two versions of an object.
//!
//! [`compare`] walks a type's properties through its [`TypeDescriptor`] and
//! returns one [`CompareResult`] per changed leaf, named by its dotted path.
//! Types take part through the [`Inspect`] trait, which is implemented for
//! common library types here and for user types by
//! `#[derive(Comparable)]`.
//!
//! | Kind | Comparison |
//! |------|------------|
//! | primitive, enum, opaque | value equality |
//! | collection | canonical serialized form |
//! | complex object | recursive, per property |
mod compare;
mod descriptor;
mod inspect;
mod value;

pub use compare::*;
pub use descriptor::*;
pub use inspect::*;
pub use value::*;
