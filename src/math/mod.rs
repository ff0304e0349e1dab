//! Numeric transforms behind the indicator views.
//!
//! Everything here is a pure function over in-memory inputs:
//! - period-over-period change (`change`)
//! - fixed-payment mortgage amortization (`mortgage`)
//! - personal impact estimates (`impact`)
//! - choropleth colour mapping (`color`)

pub mod change;
pub mod color;
pub mod impact;
pub mod mortgage;

pub use change::*;
pub use color::*;
pub use impact::*;
pub use mortgage::*;
