/*!
Exclusive, shared and weak handles to heap-allocated values.

- `HandleExclusive` is the only owner of its value. Ownership can be moved, but
  never duplicated.
- `HandleShared` counts its owners and drops the value when the last one goes.
- `HandleWeak` observes a shared value without owning it, and has to be locked
  to reach it.

The `demo` module walks through each of them.
*/

pub mod demo;
pub mod entity;
pub mod error;
pub mod handle;

pub use crate::entity::{Bar, Foo, FooBar, Identify};
pub use crate::error::{Error, Result};
pub use crate::handle::handle_exclusive::HandleExclusive;
pub use crate::handle::handle_shared::HandleShared;
pub use crate::handle::handle_weak::HandleWeak;
pub use crate::handle::is_null::IsNull;
