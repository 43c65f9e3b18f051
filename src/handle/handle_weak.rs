use crate::handle::handle_shared::{HandleShared, Shared};
use crate::handle::is_null::IsNull;
use crate::{unsafe_block, unsafe_impl};
use std::any;
use std::fmt;
use std::marker::PhantomData;
use std::panic::{RefUnwindSafe, UnwindSafe};
use std::ptr;

/**
A handle that observes a shared value without owning it.

Observing doesn't change the value's use count, and doesn't keep it alive. The
only way to get at the value is `lock`, which hands back a new owner if the value
is still around and `None` if it has already been dropped.

```
use handle_demo::HandleShared;

let mut owner = HandleShared::alloc(5u8);
let observer = owner.observe();

assert_eq!(1, owner.use_count());

if let Some(locked) = observer.lock() {
    assert_eq!(5, *locked.try_as_ref().unwrap());
}

owner.release();

assert!(observer.expired());
assert!(observer.lock().is_none());
```
 */
pub struct HandleWeak<T>(*mut Shared<T>, PhantomData<Shared<T>>);

unsafe_impl!("The handle is semantically `sync::Weak<T>`" => impl<T> Send for HandleWeak<T> where T: Send + Sync {});
unsafe_impl!("The handle is semantically `sync::Weak<T>`" => impl<T> Sync for HandleWeak<T> where T: Send + Sync {});

impl<T: RefUnwindSafe> UnwindSafe for HandleWeak<T> {}

impl<T> HandleWeak<T> {
    /**
    A weak handle that doesn't observe anything. Locking it always fails.
     */
    pub fn new() -> Self {
        HandleWeak(ptr::null_mut(), PhantomData)
    }

    pub fn observe(shared: &HandleShared<T>) -> Self {
        match shared.block() {
            Some(block) => {
                block.acquire_weak();

                tracing::debug!("observing shared {} at {:p}", any::type_name::<T>(), shared.as_ptr());

                HandleWeak(shared.block_ptr(), PhantomData)
            }
            None => HandleWeak::new(),
        }
    }

    fn block(&self) -> Option<&Shared<T>> {
        if self.0.is_null() {
            None
        } else {
            Some(unsafe_block!("A weak reference keeps the block alive" => &*self.0))
        }
    }

    /**
    Try to become an owner of the observed value.

    Returns `None` if the value has already been dropped. The returned handle
    counts as an owner for as long as it lives.
     */
    pub fn lock(&self) -> Option<HandleShared<T>> {
        let block = self.block()?;

        if !block.try_acquire_strong() {
            tracing::debug!("lock on expired {}", any::type_name::<T>());
            return None;
        }

        Some(unsafe_block!("We just took a strong reference to the live block" => HandleShared::from_block(self.0)))
    }

    /**
    Whether the observed value has been dropped.
     */
    pub fn expired(&self) -> bool {
        self.use_count() == 0
    }

    /**
    The number of handles that own the observed value.
     */
    pub fn use_count(&self) -> usize {
        self.block().map(Shared::strong).unwrap_or(0)
    }
}

impl<T> Clone for HandleWeak<T> {
    fn clone(&self) -> Self {
        if let Some(block) = self.block() {
            block.acquire_weak();
        }

        HandleWeak(self.0, PhantomData)
    }
}

impl<T> Drop for HandleWeak<T> {
    fn drop(&mut self) {
        if self.0.is_null() {
            return;
        }

        unsafe_block!("The handle held a weak reference to a live block" => Shared::release_weak(self.0));
    }
}

impl<T> Default for HandleWeak<T> {
    fn default() -> Self {
        HandleWeak::new()
    }
}

impl<T> IsNull for HandleWeak<T> {
    fn is_null(&self) -> bool {
        self.0.is_null()
    }
}

impl<T> fmt::Debug for HandleWeak<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandleWeak")
            .field("expired", &self.expired())
            .finish()
    }
}
