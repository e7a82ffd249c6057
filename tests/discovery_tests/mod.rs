//! Discovery Test Suite
//!
//! ## Structure
//! - `common` - Module fixtures built from synthetic descriptors
//! - `naming` - Naming-convention strategy scenarios
//! - `declared` - Declared-list strategy scenarios
//! - `lineage` - Superclass resolution across module boundaries
//! - `lifecycle` - Registry kept in step with module lifecycle

pub mod common;
pub mod declared;
pub mod lifecycle;
pub mod lineage;
pub mod naming;
