/*
Shared handles keep their value in a `Shared` block alongside two counts:

- `strong` is the number of live `HandleShared`s. The value is dropped as soon
  as it reaches zero.
- `weak` is the number of live `HandleWeak`s, plus one held jointly by all the
  strong handles. The block itself is freed when it reaches zero, so observers
  can still check the strong count after the value is gone.
*/

use crate::error::{Error, Result};
use crate::handle::handle_weak::HandleWeak;
use crate::handle::is_null::IsNull;
use crate::{unsafe_block, unsafe_fn, unsafe_impl};
use std::any;
use std::cell::UnsafeCell;
use std::fmt;
use std::marker::PhantomData;
use std::mem::{self, ManuallyDrop};
use std::panic::{RefUnwindSafe, UnwindSafe};
use std::process;
use std::ptr;
use std::sync::atomic::{self, AtomicUsize, Ordering};

const MAX_REFCOUNT: usize = isize::MAX as usize;

pub(crate) struct Shared<T> {
    strong: AtomicUsize,
    weak: AtomicUsize,
    value: UnsafeCell<ManuallyDrop<T>>,
}

impl<T> Shared<T> {
    fn alloc(value: T) -> *mut Self {
        Box::into_raw(Box::new(Shared {
            strong: AtomicUsize::new(1),
            weak: AtomicUsize::new(1),
            value: UnsafeCell::new(ManuallyDrop::new(value)),
        }))
    }

    pub(crate) fn strong(&self) -> usize {
        self.strong.load(Ordering::Acquire)
    }

    pub(crate) fn weak(&self) -> usize {
        self.weak.load(Ordering::Acquire)
    }

    fn value_ptr(&self) -> *const T {
        // `ManuallyDrop<T>` has the same layout as `T`
        self.value.get() as *const T
    }

    fn acquire_strong(&self) {
        let prev = self.strong.fetch_add(1, Ordering::Relaxed);
        if prev > MAX_REFCOUNT {
            process::abort();
        }

        tracing::trace!("strong count {} -> {}", prev, prev + 1);
    }

    /**
    Take a strong reference only if the value hasn't been dropped yet.
     */
    pub(crate) fn try_acquire_strong(&self) -> bool {
        let mut n = self.strong.load(Ordering::Relaxed);

        loop {
            if n == 0 {
                return false;
            }

            if n > MAX_REFCOUNT {
                process::abort();
            }

            match self
                .strong
                .compare_exchange_weak(n, n + 1, Ordering::Acquire, Ordering::Relaxed)
            {
                Ok(_) => {
                    tracing::trace!("strong count {} -> {}", n, n + 1);
                    return true;
                }
                Err(current) => n = current,
            }
        }
    }

    pub(crate) fn acquire_weak(&self) {
        let prev = self.weak.fetch_add(1, Ordering::Relaxed);
        if prev > MAX_REFCOUNT {
            process::abort();
        }

        tracing::trace!("weak count {} -> {}", prev, prev + 1);
    }

    unsafe_fn!("The block is live and the caller gives up one strong reference to it" =>
    pub(crate) fn release_strong(block: *mut Self) {
        let prev = (*block).strong.fetch_sub(1, Ordering::Release);

        tracing::trace!("strong count {} -> {}", prev, prev - 1);

        if prev != 1 {
            return;
        }

        atomic::fence(Ordering::Acquire);

        tracing::debug!("dropping shared {} at {:p}", any::type_name::<T>(), (*block).value_ptr());

        ManuallyDrop::drop(&mut *(*block).value.get());

        // The strong handles' joint weak reference goes with the last of them
        Shared::release_weak(block);
    });

    unsafe_fn!("The block is live and the caller gives up one weak reference to it" =>
    pub(crate) fn release_weak(block: *mut Self) {
        let prev = (*block).weak.fetch_sub(1, Ordering::Release);

        tracing::trace!("weak count {} -> {}", prev, prev - 1);

        if prev != 1 {
            return;
        }

        atomic::fence(Ordering::Acquire);

        tracing::debug!("freeing shared block for {} at {:p}", any::type_name::<T>(), block);

        drop(Box::from_raw(block));
    });
}

/**
A handle that shares ownership of a heap-allocated value with other handles.

Every `share` (or `clone`) adds one to the count of owners, and every handle
that is dropped or released takes one away. The value is dropped as soon as the
last owner lets go of it.

```
use handle_demo::HandleShared;

let mut a = HandleShared::alloc(String::from("shared"));
let b = a.share();

assert_eq!(a.as_ptr(), b.as_ptr());
assert_eq!(2, b.use_count());

a.release();

assert!(a.as_ptr().is_null());
assert_eq!(1, b.use_count());
assert_eq!("shared", b.try_as_ref().unwrap().as_str());
```
 */
pub struct HandleShared<T>(*mut Shared<T>, PhantomData<Shared<T>>);

unsafe_impl!("The handle is semantically `Arc<T>`" => impl<T> Send for HandleShared<T> where T: Send + Sync {});
unsafe_impl!("The handle is semantically `Arc<T>`" => impl<T> Sync for HandleShared<T> where T: Send + Sync {});

impl<T: RefUnwindSafe> UnwindSafe for HandleShared<T> {}

impl<T> HandleShared<T> {
    pub fn alloc(value: T) -> Self {
        let block = Shared::alloc(value);

        tracing::debug!("allocated shared {} at {:p}", any::type_name::<T>(), block);

        HandleShared(block, PhantomData)
    }

    /**
    A handle that isn't bound to anything. Its use count is zero.
     */
    pub fn null() -> Self {
        HandleShared(ptr::null_mut(), PhantomData)
    }

    unsafe_fn!("The block is live and the caller hands over one strong reference to it" =>
    pub(crate) fn from_block(block: *mut Shared<T>) -> Self {
        HandleShared(block, PhantomData)
    });

    pub(crate) fn block_ptr(&self) -> *mut Shared<T> {
        self.0
    }

    pub(crate) fn block(&self) -> Option<&Shared<T>> {
        if self.0.is_null() {
            None
        } else {
            Some(unsafe_block!("A bound handle keeps its block alive" => &*self.0))
        }
    }

    /**
    Another owner of the same value.
     */
    pub fn share(&self) -> Self {
        if let Some(block) = self.block() {
            block.acquire_strong();
        }

        HandleShared(self.0, PhantomData)
    }

    /**
    A weak handle to the same value that doesn't count as an owner.
     */
    pub fn observe(&self) -> HandleWeak<T> {
        HandleWeak::observe(self)
    }

    /**
    The address of the shared value, or null if the handle is unbound.
     */
    pub fn as_ptr(&self) -> *const T {
        match self.block() {
            Some(block) => block.value_ptr(),
            None => ptr::null(),
        }
    }

    /**
    The number of handles that currently own the value.
     */
    pub fn use_count(&self) -> usize {
        self.block().map(Shared::strong).unwrap_or(0)
    }

    /**
    The number of weak handles observing the value.
     */
    pub fn weak_count(&self) -> usize {
        // Discount the reference held jointly by the strong handles
        self.block()
            .map(|block| block.weak().saturating_sub(1))
            .unwrap_or(0)
    }

    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        a.0 == b.0
    }

    pub fn try_as_ref(&self) -> Result<&T> {
        match self.block() {
            Some(block) => Ok(unsafe_block!("A bound handle keeps the value alive" => &*block.value_ptr())),
            None => Err(Error::unbound("shared")),
        }
    }

    unsafe_fn!("The handle is bound" =>
    /**
    Access the value without checking the handle is bound.

    Calling this on an unbound handle is undefined behaviour.
     */
    pub fn as_ref(&self) -> &T {
        &*(*self.0).value_ptr()
    });

    /**
    Stop owning the value, leaving the handle unbound.

    If this was the last owner the value is dropped before `release` returns.
     */
    pub fn release(&mut self) {
        let block = mem::replace(&mut self.0, ptr::null_mut());

        if block.is_null() {
            return;
        }

        tracing::debug!("releasing shared {} at {:p}", any::type_name::<T>(), block);

        unsafe_block!("The handle held a strong reference to a live block" => Shared::release_strong(block));
    }

    /**
    The same as `release`.
     */
    pub fn reset(&mut self) {
        self.release();
    }
}

impl<T> Clone for HandleShared<T> {
    fn clone(&self) -> Self {
        self.share()
    }
}

impl<T> Drop for HandleShared<T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T> Default for HandleShared<T> {
    fn default() -> Self {
        HandleShared::null()
    }
}

impl<T> IsNull for HandleShared<T> {
    fn is_null(&self) -> bool {
        self.0.is_null()
    }
}

impl<T> fmt::Debug for HandleShared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandleShared")
            .field("ptr", &self.as_ptr())
            .field("use_count", &self.use_count())
            .finish()
    }
}
