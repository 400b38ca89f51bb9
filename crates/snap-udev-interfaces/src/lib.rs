//! Interface registry and udev rule assembly for snap-udev.
//!
//! Interfaces contribute udev snippets and device tags through four optional
//! callbacks: connected plug / connected slot / permanent plug / permanent slot.
//! The udev `Specification` groups the tags of each plug or slot by the
//! runnables it confines and follows every group with one helper trigger rule.

pub mod connection;
pub mod decl;
pub mod interface;
pub mod registry;
pub mod specification;
pub mod udev;

pub use connection::{Connection, EndpointRef, ResolvedConnection};
pub use decl::{InterfaceDecl, UdevRulesDecl};
pub use interface::{ConnectedCallback, Interface, PermanentPlugCallback, PermanentSlotCallback};
pub use registry::InterfaceRegistry;
pub use specification::SecuritySpecification;
