use crate::error::{Error, Result};
use crate::handle::is_null::IsNull;
use crate::{unsafe_block, unsafe_fn, unsafe_impl};
use std::any;
use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::panic::{RefUnwindSafe, UnwindSafe};
use std::ptr;

/**
A handle that is the only owner of a heap-allocated value.

The value is deallocated when the handle is dropped or reset. Ownership can be
moved to another handle with `transfer`, which leaves the source handle unbound
(its address is null) instead of invalidating it.

Exclusive handles can't be duplicated. There's no `Clone`:

```compile_fail
use handle_demo::HandleExclusive;

let a = HandleExclusive::alloc(5u8);
let b: HandleExclusive<u8> = a.clone();
```

and no implicit `Copy`:

```compile_fail
use handle_demo::HandleExclusive;

fn duplicate<T: Copy>(v: T) -> (T, T) {
    (v, v)
}

let a = HandleExclusive::alloc(5u8);
let _ = duplicate(a);
```

A native move makes the source binding unusable altogether:

```compile_fail
use handle_demo::HandleExclusive;

let a = HandleExclusive::alloc(5u8);
let b = a;
let _ = a.as_ptr();
```

`transfer` keeps the source around, but empty:

```
use handle_demo::HandleExclusive;

let mut a = HandleExclusive::alloc(5u8);
let before = a.as_ptr();

let b = a.transfer();

assert!(a.as_ptr().is_null());
assert_eq!(before, b.as_ptr());
assert_eq!(5, *b.try_as_ref().unwrap());
```
 */
pub struct HandleExclusive<T>(*mut T, PhantomData<T>);

unsafe_impl!("The handle is semantically `Box<T>`" => impl<T> Send for HandleExclusive<T> where T: Send {});
unsafe_impl!("The handle is semantically `Box<T>`" => impl<T> Sync for HandleExclusive<T> where T: Sync {});

impl<T: RefUnwindSafe> UnwindSafe for HandleExclusive<T> {}

impl<T> HandleExclusive<T> {
    pub fn alloc(value: T) -> Self {
        let v = Box::into_raw(Box::new(value));

        tracing::debug!("allocated exclusive {} at {:p}", any::type_name::<T>(), v);

        HandleExclusive(v, PhantomData)
    }

    /**
    A handle that isn't bound to anything.
     */
    pub fn null() -> Self {
        HandleExclusive(ptr::null_mut(), PhantomData)
    }

    /**
    The address of the owned value, or null if the handle is unbound.
     */
    pub fn as_ptr(&self) -> *const T {
        self.0
    }

    /**
    Move ownership into a new handle.

    The returned handle is bound to whatever this one was bound to, and this
    handle is left unbound.
     */
    pub fn transfer(&mut self) -> Self {
        let moved = mem::replace(self, HandleExclusive::null());

        tracing::debug!("transferred exclusive {} at {:p}", any::type_name::<T>(), moved.0);

        moved
    }

    pub fn try_as_ref(&self) -> Result<&T> {
        if self.0.is_null() {
            return Err(Error::unbound("exclusive"));
        }

        Ok(unsafe_block!("The handle is bound and owns the value" => &*self.0))
    }

    pub fn try_as_mut(&mut self) -> Result<&mut T> {
        if self.0.is_null() {
            return Err(Error::unbound("exclusive"));
        }

        Ok(unsafe_block!("The handle is bound and owns the value" => &mut *self.0))
    }

    unsafe_fn!("The handle is bound" =>
    /**
    Access the value without checking the handle is bound.

    Calling this on an unbound handle is undefined behaviour.
     */
    pub fn as_ref(&self) -> &T {
        &*self.0
    });

    unsafe_fn!("The handle is bound" =>
    /**
    Mutably access the value without checking the handle is bound.

    Calling this on an unbound handle is undefined behaviour.
     */
    pub fn as_mut(&mut self) -> &mut T {
        &mut *self.0
    });

    /**
    Give up ownership, returning the value if the handle was bound.
     */
    pub fn into_inner(mut self) -> Option<T> {
        let v = mem::replace(&mut self.0, ptr::null_mut());

        if v.is_null() {
            None
        } else {
            Some(*unsafe_block!("The pointer came from `Box::into_raw` and we own it" => Box::from_raw(v)))
        }
    }

    /**
    Deallocate the value now, leaving the handle unbound.
     */
    pub fn reset(&mut self) {
        drop(self.transfer());
    }
}

impl<T> Drop for HandleExclusive<T> {
    fn drop(&mut self) {
        if self.0.is_null() {
            return;
        }

        tracing::debug!("deallocating exclusive {} at {:p}", any::type_name::<T>(), self.0);

        unsafe_block!("The pointer came from `Box::into_raw` and this is its only owner" => drop(Box::from_raw(self.0)));
    }
}

impl<T> Default for HandleExclusive<T> {
    fn default() -> Self {
        HandleExclusive::null()
    }
}

impl<T> IsNull for HandleExclusive<T> {
    fn is_null(&self) -> bool {
        self.0.is_null()
    }
}

impl<T> fmt::Debug for HandleExclusive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HandleExclusive").field(&self.0).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::test::Probe;

    #[test]
    fn alloc_is_not_null() {
        let h = HandleExclusive::alloc(42u64);

        assert!(!h.is_null());
        assert!(!h.as_ptr().is_null());
    }

    #[test]
    fn transfer_empties_source() {
        let mut p1 = HandleExclusive::alloc(String::from("owned"));
        let before = p1.as_ptr();

        let p2 = p1.transfer();

        assert!(p1.as_ptr().is_null());
        assert!(p1.is_null());
        assert_eq!(before, p2.as_ptr());
        assert_eq!("owned", p2.try_as_ref().unwrap().as_str());
    }

    #[test]
    fn native_move_keeps_address() {
        let p1 = HandleExclusive::alloc(7i32);
        let before = p1.as_ptr();

        let p2 = p1;

        assert_eq!(before, p2.as_ptr());
    }

    #[test]
    fn unbound_access_is_checked() {
        let mut p1 = HandleExclusive::alloc(1u8);
        let _p2 = p1.transfer();

        assert!(p1.try_as_ref().unwrap_err().is_unbound());
        assert!(p1.try_as_mut().unwrap_err().is_unbound());
    }

    #[test]
    fn mutate_through_handle() {
        let mut h = HandleExclusive::alloc(vec![1, 2]);

        h.try_as_mut().unwrap().push(3);

        assert_eq!(&[1, 2, 3], &h.try_as_ref().unwrap()[..]);
        assert_eq!(3, unsafe { h.as_ref() }.len());
    }

    #[test]
    fn drop_deallocates_once() {
        let (probe, drops) = Probe::new(1);

        let mut p1 = HandleExclusive::alloc(probe);
        let p2 = p1.transfer();

        drop(p1);
        assert_eq!(0, drops.get());

        drop(p2);
        assert_eq!(1, drops.get());
    }

    #[test]
    fn reset_deallocates_immediately() {
        let (probe, drops) = Probe::new(1);

        let mut h = HandleExclusive::alloc(probe);
        h.reset();

        assert_eq!(1, drops.get());
        assert!(h.is_null());

        drop(h);
        assert_eq!(1, drops.get());
    }

    #[test]
    fn into_inner_returns_value() {
        let (probe, drops) = Probe::new(9);

        let probe = HandleExclusive::alloc(probe).into_inner().unwrap();
        assert_eq!(9, probe.id);
        assert_eq!(0, drops.get());

        drop(probe);
        assert_eq!(1, drops.get());

        assert!(HandleExclusive::<u8>::null().into_inner().is_none());
    }
}
